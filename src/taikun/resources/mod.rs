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

//! Resource kinds of the Taikun provider

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use taikun_client::{
    models::{ProjectRef, RenameCommand},
    Model,
};

use super::{
    error::{ProviderError, ProviderResult},
    ids,
    session::Context,
};
use crate::{
    Attribute, AttributeType, Validator, Value, ValueBool, ValueFloat, ValueList, ValueNumber,
    ValueString,
};

pub mod access_profile;
pub mod alerting_profile;
pub mod backup;
pub mod billing;
pub mod catalog;
pub mod cloud_credentials;
pub mod kubernetes_profile;
pub mod organization;
pub mod policy_profile;
pub mod project;
pub mod repository;
pub mod showback;
pub mod slack;
pub mod standalone_profile;
pub mod user;

pub use access_profile::AccessProfileKind;
pub use alerting_profile::AlertingProfileKind;
pub use backup::{BackupCredentialKind, BackupPolicyKind};
pub use billing::{BillingCredentialKind, BillingRuleKind};
pub use catalog::{CatalogKind, CatalogProjectBindingKind};
pub use cloud_credentials::{
    AwsCredentialKind, AzureCredentialKind, GcpCredentialKind, OpenstackCredentialKind,
    ProxmoxCredentialKind, VsphereCredentialKind, ZadaraCredentialKind,
};
pub use kubernetes_profile::KubernetesProfileKind;
pub use organization::OrganizationKind;
pub use policy_profile::PolicyProfileKind;
pub use project::ProjectKind;
pub use repository::RepositoryKind;
pub use showback::{ShowbackCredentialKind, ShowbackRuleKind};
pub use slack::SlackConfigurationKind;
pub use standalone_profile::StandaloneProfileKind;
pub use user::{ProjectUserAttachmentKind, UserKind};

/// Attributes every organization-scoped kind carries
pub(crate) fn scoped(description: &str) -> BTreeMap<String, Attribute> {
    crate::map! {
        "id" => Attribute::computed(AttributeType::String, format!("The {description} ID.")),
        "organization_id" => Attribute::optional_computed(
            AttributeType::String,
            "The ID of the organization which owns the resource, by default the caller's.",
        )
        .force_new()
        .validate(Validator::NumericId),
        "organization_name" => Attribute::computed(
            AttributeType::String,
            "The name of the organization which owns the resource.",
        ),
    }
}

/// `lock` attribute, defaulting to false
pub(crate) fn lock() -> Attribute {
    Attribute::optional(AttributeType::Bool, "Indicates whether to lock the resource.")
        .default_value(false)
}

/// Audit attributes reported by most kinds
pub(crate) fn audited(mut attributes: BTreeMap<String, Attribute>) -> BTreeMap<String, Attribute> {
    for (name, description) in [
        ("created_by", "The creator of the resource."),
        ("last_modified", "Time and date of last modification."),
        ("last_modified_by", "The last user to have modified the resource."),
    ] {
        attributes.insert(
            name.to_string(),
            Attribute::computed(AttributeType::String, description),
        );
    }
    attributes
}

/// Name validated like the upstream does: 3 to 30 characters out of letters, digits and `_.-`
pub(crate) fn name(description: &str) -> Attribute {
    Attribute::required(AttributeType::String, description)
        .validate(Validator::Length(3, 30))
        .validate(Validator::Regex(
            "^[a-zA-Z0-9_.-]+$",
            "expected only letters, digits, dashes, dots and underscores",
        ))
}

/// Optional reference to another entity, stored as a decimal string
pub(crate) fn reference(description: &str) -> Attribute {
    Attribute::optional(AttributeType::String, description).validate(Validator::NumericId)
}

/// Project reported as bound to a profile or catalog
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectRefState {
    pub id: ValueString,
    pub name: ValueString,
}

impl ProjectRefState {
    /// Computed list of the bound projects
    pub(crate) fn attribute(description: &str) -> Attribute {
        Attribute::computed(
            AttributeType::List(Box::new(AttributeType::Object(crate::map! {
                "id" => AttributeType::String,
                "name" => AttributeType::String,
            }))),
            description,
        )
    }

    pub(crate) fn observe(projects: Vec<ProjectRef>) -> ValueList<Self> {
        Value::Value(
            projects
                .into_iter()
                .map(|project| Self {
                    id: id(project.id),
                    name: string(project.name),
                })
                .collect(),
        )
    }
}

pub(crate) fn id(id: i64) -> ValueString {
    Value::Value(id.to_string())
}

pub(crate) fn opt_id(id: Option<i64>) -> ValueString {
    id.filter(|id| *id > 0).map(|id| id.to_string()).into()
}

/// Optional upstream text, empty strings being absent
pub(crate) fn text(text: Option<String>) -> ValueString {
    text.filter(|text| !text.is_empty()).into()
}

pub(crate) fn string(text: String) -> ValueString {
    Value::Value(text)
}

pub(crate) fn number(n: i64) -> ValueNumber {
    Value::Value(n)
}

pub(crate) fn float(f: f64) -> ValueFloat {
    Value::Value(f)
}

pub(crate) fn flag(b: bool) -> ValueBool {
    Value::Value(b)
}

/// Mandatory string of a planned state
pub(crate) fn required<'a>(value: &'a ValueString, name: &str) -> ProviderResult<&'a str> {
    match value.as_ref_option() {
        Some(value) => Ok(value),
        None => Err(ProviderError::ConfigInvalid(format!("{name} is required"))),
    }
}

/// Mandatory numeric reference of a planned state
pub(crate) fn required_id(value: &ValueString, name: &str) -> ProviderResult<i64> {
    ids::numeric(required(value, name)?)
}

/// Planned optional string, empty being absent
pub(crate) fn optional(value: &ValueString) -> Option<String> {
    value
        .as_ref_option()
        .filter(|value| !value.is_empty())
        .cloned()
}

/// Whether a planned flag is set
pub(crate) fn enabled(value: &ValueBool) -> bool {
    matches!(value, Value::Value(true))
}

/// Elements of a planned nested block or list
pub(crate) fn elements<T>(value: &Value<Vec<T>>) -> &[T] {
    value.as_ref_option().map_or(&[], Vec::as_slice)
}

/// Elements to remove from and add to `prior` to reach `planned`, matched by `key`
pub(crate) fn diff<'a, T, K: PartialEq>(
    prior: &'a [T],
    planned: &'a [T],
    key: impl Fn(&'a T) -> K,
) -> (Vec<&'a T>, Vec<&'a T>) {
    let removed = prior
        .iter()
        .filter(|old| !planned.iter().any(|new| key(new) == key(*old)))
        .collect();
    let added = planned
        .iter()
        .filter(|new| !prior.iter().any(|old| key(old) == key(*new)))
        .collect();
    (removed, added)
}

/// Rename through `update/{id}` when the name changed
pub(crate) async fn rename<M: Model>(
    cx: &Context<'_>,
    id: &str,
    prior: &ValueString,
    planned: &ValueString,
) -> ProviderResult<()> {
    let name = required(planned, "name")?;
    if prior.as_ref_option().map(String::as_str) == Some(name) {
        return Ok(());
    }
    cx.group::<M>()
        .update(
            ids::numeric(id)?,
            &RenameCommand {
                name: name.to_string(),
            },
        )
        .execute()
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_conversions() {
        assert_eq!(opt_id(Some(0)), Value::Null);
        assert_eq!(opt_id(Some(4)), Value::Value("4".to_string()));
        assert_eq!(text(Some(String::new())), Value::Null);
        assert_eq!(optional(&Value::Value(String::new())), None);
        assert!(required_id(&Value::Null, "project_id").is_err());
        assert_eq!(required_id(&"12".into(), "project_id").unwrap(), 12);
        assert!(elements::<String>(&Value::Unknown).is_empty());
    }

    #[test]
    fn set_differences() {
        let prior = ["a", "b", "c"];
        let planned = ["c", "d", "a"];
        let (removed, added) = diff(&prior, &planned, |s| *s);
        assert_eq!(removed, [&"b"]);
        assert_eq!(added, [&"d"]);
    }
}
