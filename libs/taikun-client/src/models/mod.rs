// This file is part of the terraform-provider-taikun project
//
// Copyright (C) ANEO, 2024-2024. All rights reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License")
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Data transfer objects of the Taikun API, one module per family of entities

mod backups;
mod catalogs;
mod cloud_credentials;
mod organizations;
mod profiles;
mod projects;
mod rules;
mod service_credentials;
mod slack;
mod users;

pub use backups::*;
pub use catalogs::*;
pub use cloud_credentials::*;
pub use organizations::*;
pub use profiles::*;
pub use projects::*;
pub use rules::*;
pub use service_credentials::*;
pub use slack::*;
pub use users::*;

use serde::{Deserialize, Serialize};

/// Payload of update calls that only rename an entity
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameCommand {
    pub name: String,
}

/// Reference to a project, as embedded in profiles and catalogs
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectRef {
    #[serde(deserialize_with = "de::id")]
    pub id: i64,
    pub name: String,
}

/// Key/value pair used for tags and node labels
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

pub mod de {
    //! Lenient deserializers for identifiers the upstream encodes either as numbers or strings

    use serde::{de::Error, Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(i64),
        String(String),
    }

    fn parse<E: Error>(raw: NumberOrString) -> Result<i64, E> {
        match raw {
            NumberOrString::Number(id) => Ok(id),
            NumberOrString::String(id) => id
                .trim()
                .parse()
                .map_err(|_| E::custom(format!("`{id}` is not a numeric identifier"))),
        }
    }

    /// Identifier encoded as a number or a decimal string
    pub fn id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        parse(NumberOrString::deserialize(deserializer)?)
    }

    /// Optional identifier encoded as a number, a decimal string, or null
    pub fn opt_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
        match Option::<NumberOrString>::deserialize(deserializer)? {
            Some(NumberOrString::String(id)) if id.is_empty() => Ok(None),
            Some(raw) => parse(raw).map(Some),
            None => Ok(None),
        }
    }

    /// Null collapses to the default value
    pub fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: Default + Deserialize<'de>,
    {
        Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Deserialize)]
    struct Ids {
        #[serde(deserialize_with = "de::id")]
        a: i64,
        #[serde(deserialize_with = "de::opt_id", default)]
        b: Option<i64>,
        #[serde(deserialize_with = "de::null_default", default)]
        c: Vec<String>,
    }

    #[test]
    fn lenient_identifiers() {
        let ids: Ids = serde_json::from_value(json!({"a": "12", "b": 3, "c": null})).unwrap();
        assert_eq!((ids.a, ids.b, ids.c.len()), (12, Some(3), 0));

        let ids: Ids = serde_json::from_value(json!({"a": 4, "b": ""})).unwrap();
        assert_eq!((ids.a, ids.b), (4, None));

        assert!(serde_json::from_value::<Ids>(json!({"a": "x"})).is_err());
    }
}
