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

//! Schema definitions for resources, data sources and the provider configuration

use std::{collections::BTreeMap, fmt::Display};

use serde::Serialize;

use crate::{validators::Validator, value::ValueAny};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StringKind {
    #[default]
    Plain,
    Markdown,
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Description {
    /// Kind of the description (either `Plain` or `Markdown`)
    pub kind: StringKind,
    /// Content of the description
    pub content: String,
}

impl Description {
    /// Create a plain description
    pub fn plain<T: ToString>(content: T) -> Self {
        Self {
            kind: StringKind::Plain,
            content: content.to_string(),
        }
    }
    /// Create a markdown description
    pub fn markdown<T: ToString>(content: T) -> Self {
        Self {
            kind: StringKind::Markdown,
            content: content.to_string(),
        }
    }
}

impl From<&str> for Description {
    fn from(value: &str) -> Self {
        Description::plain(value)
    }
}

impl From<String> for Description {
    fn from(value: String) -> Self {
        Description::plain(value)
    }
}

#[derive(Clone, Debug)]
pub enum NestedBlock {
    /// The nested block can appear multiple times
    List(Block),
    /// The nested block can appear multiple times (unordered)
    Set(Block),
    /// The nested block can appear at most once (if not given, it will be null)
    /// This is implemented with a list block, and must be serialized with `value::serde_as_vec`
    Optional(Block),
}

impl NestedBlock {
    /// Block definition, whatever the nesting
    pub fn block(&self) -> &Block {
        match self {
            NestedBlock::List(block) | NestedBlock::Set(block) | NestedBlock::Optional(block) => {
                block
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct Block {
    /// Version of the block
    pub version: i64,
    /// Attributes of the block
    pub attributes: BTreeMap<String, Attribute>,
    /// Nested blocks of the block
    pub blocks: BTreeMap<String, NestedBlock>,
    /// Description for the block
    pub description: Description,
    /// Is the block deprecated
    pub deprecated: bool,
}

impl Default for Block {
    /// Create an empty block (with a version of 1, and a description "empty")
    fn default() -> Block {
        Block {
            version: 1,
            attributes: Default::default(),
            blocks: Default::default(),
            description: "empty".into(),
            deprecated: false,
        }
    }
}

impl Block {
    /// Block with attributes and no nested block
    pub fn new<D: Into<Description>>(
        description: D,
        attributes: BTreeMap<String, Attribute>,
    ) -> Self {
        Self {
            attributes,
            description: description.into(),
            ..Default::default()
        }
    }

    /// Add a nested block
    pub fn with_block(mut self, name: &str, block: NestedBlock) -> Self {
        self.blocks.insert(name.to_owned(), block);
        self
    }

    /// Object type of the block, nested blocks becoming lists of objects
    pub fn object_type(&self) -> AttributeType {
        let mut fields: BTreeMap<String, AttributeType> = self
            .attributes
            .iter()
            .map(|(name, attr)| (name.clone(), attr.attr_type.clone()))
            .collect();
        for (name, nested) in &self.blocks {
            fields.insert(
                name.clone(),
                AttributeType::List(Box::new(nested.block().object_type())),
            );
        }
        AttributeType::Object(fields)
    }

    /// Read-only copy of the block: every attribute computed, sensitive ones dropped, nested
    /// blocks turned into computed lists of objects
    pub fn as_computed(&self) -> Block {
        let mut attributes = BTreeMap::new();
        for (name, attr) in &self.attributes {
            if attr.sensitive {
                continue;
            }
            attributes.insert(
                name.clone(),
                Attribute::computed(attr.attr_type.clone(), attr.description.clone()),
            );
        }
        for (name, nested) in &self.blocks {
            let block = nested.block().as_computed();
            attributes.insert(
                name.clone(),
                Attribute::computed(
                    AttributeType::List(Box::new(block.object_type())),
                    block.description.clone(),
                ),
            );
        }
        Block {
            version: self.version,
            attributes,
            blocks: BTreeMap::new(),
            description: self.description.clone(),
            deprecated: self.deprecated,
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum AttributeType {
    /// String
    String,
    /// Number (int or float)
    Number,
    /// Boolean
    Bool,
    /// List
    List(Box<AttributeType>),
    /// Set
    Set(Box<AttributeType>),
    /// Map
    Map(Box<AttributeType>),
    /// Object
    Object(BTreeMap<String, AttributeType>),
    /// Dynamic
    Any,
}

impl AttributeType {
    /// List of strings
    pub fn list_of_strings() -> Self {
        AttributeType::List(Box::new(AttributeType::String))
    }
    /// Set of strings
    pub fn set_of_strings() -> Self {
        AttributeType::Set(Box::new(AttributeType::String))
    }
    /// List of numbers
    pub fn list_of_numbers() -> Self {
        AttributeType::List(Box::new(AttributeType::Number))
    }
    /// Check whether the type is a list or a set
    pub fn is_collection(&self) -> bool {
        matches!(self, AttributeType::List(_) | AttributeType::Set(_))
    }
}

impl Serialize for AttributeType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            AttributeType::String => serializer.serialize_str("string"),
            AttributeType::Number => serializer.serialize_str("number"),
            AttributeType::Bool => serializer.serialize_str("bool"),
            AttributeType::List(attr) => ("list", attr).serialize(serializer),
            AttributeType::Set(attr) => ("set", attr).serialize(serializer),
            AttributeType::Map(attr) => ("map", attr).serialize(serializer),
            AttributeType::Object(attrs) => ("object", attrs).serialize(serializer),
            AttributeType::Any => serializer.serialize_str("dynamic"),
        }
    }
}

impl Display for AttributeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&serde_json::to_string(self).or(Err(std::fmt::Error))?)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum AttributeConstraint {
    /// The attribute is computed, but cannot be specified by the practitioner (output only)
    Computed,
    /// The attribute is optional, and the provider cannot generate a value for it
    Optional,
    /// The attribute is both optional and computed:
    /// the practitioner can omit the value, and the provider can generate a value for it
    OptionalComputed,
    /// The attribute is required
    Required,
}

impl AttributeConstraint {
    /// Can the practitioner set the attribute
    pub fn is_configurable(self) -> bool {
        !matches!(self, AttributeConstraint::Computed)
    }
    /// Can the provider set the attribute
    pub fn is_computed(self) -> bool {
        matches!(
            self,
            AttributeConstraint::Computed | AttributeConstraint::OptionalComputed
        )
    }
}

/// Differences the upstream normalises away, and that must not show in a plan
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum DiffSuppress {
    /// An empty string or collection is the same as no value
    EmptyEqualsNull,
    /// Strings only differing by case are the same
    CaseInsensitive,
}

impl DiffSuppress {
    /// Check whether `prior` and `config` are equivalent under this suppression
    pub fn equivalent(self, prior: &ValueAny, config: &ValueAny) -> bool {
        match self {
            DiffSuppress::EmptyEqualsNull => {
                let empty = |v: &ValueAny| v.is_empty() || v.as_str() == Some("");
                empty(prior) && empty(config)
            }
            DiffSuppress::CaseInsensitive => match (prior.as_str(), config.as_str()) {
                (Some(prior), Some(config)) => prior.eq_ignore_ascii_case(config),
                _ => false,
            },
        }
    }
}

#[derive(Clone, Debug)]
pub struct Attribute {
    /// Type of the Attribute
    pub attr_type: AttributeType,
    /// Description of the Attribute
    pub description: Description,
    /// Is the attribute required
    pub constraint: AttributeConstraint,
    /// Is the attribute sensitive
    pub sensitive: bool,
    /// Is the attribute deprecated
    pub deprecated: bool,
    /// Does a change of the attribute force the replacement of the resource
    pub force_new: bool,
    /// Value planned when the configuration leaves the attribute null
    pub default: Option<ValueAny>,
    /// Checks applied to the configured value
    pub validators: Vec<Validator>,
    /// Equivalence kept out of plans
    pub diff_suppress: Option<DiffSuppress>,
    /// Sibling attributes that cannot be set together with this one
    pub conflicts_with: &'static [&'static str],
}

impl Default for Attribute {
    fn default() -> Self {
        Self {
            attr_type: AttributeType::Any,
            description: "empty".into(),
            constraint: AttributeConstraint::OptionalComputed,
            sensitive: false,
            deprecated: false,
            force_new: false,
            default: None,
            validators: Vec::new(),
            diff_suppress: None,
            conflicts_with: &[],
        }
    }
}

impl Attribute {
    fn with_constraint<D: Into<Description>>(
        attr_type: AttributeType,
        description: D,
        constraint: AttributeConstraint,
    ) -> Self {
        Self {
            attr_type,
            description: description.into(),
            constraint,
            ..Default::default()
        }
    }
    pub fn required<D: Into<Description>>(attr_type: AttributeType, description: D) -> Self {
        Self::with_constraint(attr_type, description, AttributeConstraint::Required)
    }
    pub fn optional<D: Into<Description>>(attr_type: AttributeType, description: D) -> Self {
        Self::with_constraint(attr_type, description, AttributeConstraint::Optional)
    }
    pub fn optional_computed<D: Into<Description>>(
        attr_type: AttributeType,
        description: D,
    ) -> Self {
        Self::with_constraint(attr_type, description, AttributeConstraint::OptionalComputed)
    }
    pub fn computed<D: Into<Description>>(attr_type: AttributeType, description: D) -> Self {
        Self::with_constraint(attr_type, description, AttributeConstraint::Computed)
    }

    /// Mark as sensitive
    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }
    /// Mark as forcing replacement
    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }
    /// Set the planned default
    pub fn default_value<V: Into<ValueAny>>(mut self, value: V) -> Self {
        self.default = Some(value.into());
        self
    }
    /// Add a validator
    pub fn validate(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }
    /// Suppress a class of differences
    pub fn suppress(mut self, diff_suppress: DiffSuppress) -> Self {
        self.diff_suppress = Some(diff_suppress);
        self
    }
    /// Declare conflicting siblings
    pub fn conflicts_with(mut self, names: &'static [&'static str]) -> Self {
        self.conflicts_with = names;
        self
    }
}

#[derive(Clone, Debug)]
pub struct Schema {
    /// Version of the schema
    pub version: i64,
    /// Root block of the schema
    pub block: Block,
}

impl Schema {
    /// Schema at version 0 with the given root block
    pub fn new(block: Block) -> Self {
        Self { version: 0, block }
    }
}

// JSON dump, in the layout of `terraform providers schema -json`

#[derive(Serialize)]
struct AttributeDump<'a> {
    #[serde(rename = "type")]
    attr_type: &'a AttributeType,
    description: &'a str,
    description_kind: StringKind,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    required: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    optional: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    computed: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    sensitive: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    deprecated: bool,
}

#[derive(Serialize)]
struct NestedBlockDump<'a> {
    nesting_mode: &'static str,
    block: &'a Block,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_items: Option<i64>,
}

impl Serialize for Attribute {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        AttributeDump {
            attr_type: &self.attr_type,
            description: &self.description.content,
            description_kind: self.description.kind,
            required: self.constraint == AttributeConstraint::Required,
            optional: matches!(
                self.constraint,
                AttributeConstraint::Optional | AttributeConstraint::OptionalComputed
            ),
            computed: self.constraint.is_computed(),
            sensitive: self.sensitive,
            deprecated: self.deprecated,
        }
        .serialize(serializer)
    }
}

impl Serialize for NestedBlock {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let (nesting_mode, max_items) = match self {
            NestedBlock::List(_) => ("list", None),
            NestedBlock::Set(_) => ("set", None),
            NestedBlock::Optional(_) => ("list", Some(1)),
        };
        NestedBlockDump {
            nesting_mode,
            block: self.block(),
            max_items,
        }
        .serialize(serializer)
    }
}

impl Serialize for Block {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(None)?;
        if !self.attributes.is_empty() {
            map.serialize_entry("attributes", &self.attributes)?;
        }
        if !self.blocks.is_empty() {
            map.serialize_entry("block_types", &self.blocks)?;
        }
        map.serialize_entry("description", &self.description.content)?;
        map.serialize_entry("description_kind", &self.description.kind)?;
        if self.deprecated {
            map.serialize_entry("deprecated", &true)?;
        }
        map.end()
    }
}

impl Serialize for Schema {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("version", &self.version)?;
        map.serialize_entry("block", &self.block)?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::map;

    fn block() -> Block {
        Block::new(
            "A profile",
            map! {
                "name" => Attribute::required(AttributeType::String, "Name"),
                "secret" => Attribute::required(AttributeType::String, "Secret").sensitive(),
                "lock" => Attribute::optional(AttributeType::Bool, "Lock").default_value(false),
            },
        )
        .with_block(
            "rule",
            NestedBlock::List(Block::new(
                "Rule",
                map! {
                    "port" => Attribute::required(AttributeType::Number, "Port"),
                },
            )),
        )
    }

    #[test]
    fn dump_matches_host_layout() {
        let dump = serde_json::to_value(Schema::new(block())).unwrap();
        assert_eq!(dump["version"], json!(0));
        assert_eq!(
            dump["block"]["attributes"]["name"],
            json!({"type": "string", "description": "Name", "description_kind": "plain", "required": true})
        );
        assert_eq!(dump["block"]["attributes"]["secret"]["sensitive"], json!(true));
        assert_eq!(dump["block"]["block_types"]["rule"]["nesting_mode"], json!("list"));
        assert_eq!(
            dump["block"]["block_types"]["rule"]["block"]["attributes"]["port"]["type"],
            json!("number")
        );
    }

    #[test]
    fn computed_copy_drops_secrets_and_flattens_blocks() {
        let computed = block().as_computed();
        assert!(!computed.attributes.contains_key("secret"));
        assert!(computed.blocks.is_empty());
        let rule = &computed.attributes["rule"];
        assert_eq!(rule.constraint, AttributeConstraint::Computed);
        assert_eq!(rule.attr_type.to_string(), r#"["list",["object",{"port":"number"}]]"#);
    }
}
