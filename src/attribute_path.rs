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

//! [`AttributePath`] module

use std::{borrow::Cow, fmt::Display};

/// Location of a value inside a configuration, a plan or a state
///
/// Rendered as `name.nested[0]["key"]`.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Default, PartialOrd, Ord)]
pub struct AttributePath {
    pub steps: Vec<AttributePathStep>,
}

#[derive(Clone, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub enum AttributePathStep {
    Attribute(Cow<'static, str>),
    Key(Cow<'static, str>),
    Index(i64),
}

impl AttributePath {
    /// Path starting at the top-level attribute `root`
    pub fn new<T: Into<Cow<'static, str>>>(root: T) -> Self {
        Self {
            steps: vec![AttributePathStep::Attribute(root.into())],
        }
    }
    /// Append `.name`
    pub fn attribute<T: Into<Cow<'static, str>>>(mut self, name: T) -> Self {
        self.steps.push(AttributePathStep::Attribute(name.into()));
        self
    }
    /// Append `["key"]`
    pub fn key<T: Into<Cow<'static, str>>>(mut self, key: T) -> Self {
        self.steps.push(AttributePathStep::Key(key.into()));
        self
    }
    /// Append `[idx]`
    pub fn index<T: Into<i64>>(mut self, idx: T) -> Self {
        self.steps.push(AttributePathStep::Index(idx.into()));
        self
    }
    /// Append every step of `other`
    pub fn join(mut self, other: &AttributePath) -> Self {
        self.steps.extend(other.steps.iter().cloned());
        self
    }

    /// Parse a dotted attribute path, like `public_network.gateway`
    ///
    /// Numeric segments become indices.
    pub fn parse(path: &str) -> Self {
        Self {
            steps: path
                .split('.')
                .filter(|segment| !segment.is_empty())
                .map(|segment| match segment.parse::<i64>() {
                    Ok(idx) => AttributePathStep::Index(idx),
                    Err(_) => AttributePathStep::Attribute(Cow::Owned(segment.to_owned())),
                })
                .collect(),
        }
    }

    /// Name of the top-level attribute, if the path starts with one
    pub fn root(&self) -> Option<&str> {
        match self.steps.first() {
            Some(AttributePathStep::Attribute(name)) => Some(name.as_ref()),
            _ => None,
        }
    }

    /// Check whether `self` is `prefix` or lies below it
    pub fn starts_with(&self, prefix: &AttributePath) -> bool {
        self.steps.starts_with(&prefix.steps)
    }
}

impl Display for AttributePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 && matches!(step, AttributePathStep::Attribute(_)) {
                f.write_str(".")?;
            }
            step.fmt(f)?;
        }
        Ok(())
    }
}

impl Display for AttributePathStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttributePathStep::Attribute(name) => f.write_str(name.as_ref()),
            AttributePathStep::Key(key) => write!(f, "[{:?}]", key),
            AttributePathStep::Index(idx) => write!(f, "[{}]", idx),
        }
    }
}

impl std::ops::Add<AttributePathStep> for AttributePath {
    type Output = Self;
    fn add(mut self, rhs: AttributePathStep) -> Self::Output {
        self.steps.push(rhs);
        self
    }
}

impl From<AttributePathStep> for AttributePath {
    fn from(value: AttributePathStep) -> Self {
        Self { steps: vec![value] }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        let path = AttributePath::new("networks")
            .index(2)
            .attribute("labels")
            .key("zone");
        assert_eq!(path.to_string(), r#"networks[2].labels["zone"]"#);
    }

    #[test]
    fn parse_and_prefix() {
        let path = AttributePath::parse("public_network.0.gateway");
        assert_eq!(path.to_string(), "public_network[0].gateway");
        assert_eq!(path.root(), Some("public_network"));
        assert!(path.starts_with(&AttributePath::new("public_network")));
        assert!(!path.starts_with(&AttributePath::new("private_network")));
    }
}
