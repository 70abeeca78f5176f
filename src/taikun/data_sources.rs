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

//! Read-only views over the resource kinds
//!
//! Every kind with a plural name gets two data sources: `taikun_<kind>`, which reads one entity
//! by id, and `taikun_<plural>`, which lists them. Both reuse the resource schema turned
//! read-only, so their rows carry the attributes of the resource minus the sensitive ones.

use std::{collections::BTreeMap, marker::PhantomData};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use taikun_client::models::{Flavor, Image};
use tracing::{debug, instrument};

use super::{
    error::{ProviderError, ProviderResult},
    ids,
    kind::Kind,
    session::{Context, Operation, Session},
};
use crate::{
    map, utils::to_any, Attribute, AttributePath, AttributeType, Block, DataSource, Diagnostics,
    Schema, Validator, Value, ValueAny, ValueList, ValueNumber, ValueString,
};

fn context<'a>(session: &'a Session, diags: &mut Diagnostics) -> Option<Context<'a>> {
    match session.context() {
        Ok(cx) => Some(cx),
        Err(err) => {
            err.report(diags);
            None
        }
    }
}

/// Keep only what the read-only schema exposes, recursing into nested blocks
fn project(block: &Block, value: &mut ValueAny) {
    let ValueAny::Map(fields) = value else {
        return;
    };
    fields.retain(|name, _| match block.attributes.get(name) {
        Some(attribute) => !attribute.sensitive,
        None => block.blocks.contains_key(name),
    });
    for (name, nested) in &block.blocks {
        match fields.get_mut(name) {
            Some(ValueAny::List(items)) => {
                for item in items {
                    project(nested.block(), item);
                }
            }
            Some(slot @ ValueAny::Null) => *slot = ValueAny::List(Vec::new()),
            _ => (),
        }
    }
}

/// Row of a data source, built from an observed resource state
fn row<K: Kind>(state: &K::State, diags: &mut Diagnostics) -> Option<ValueAny> {
    let mut any = to_any(state, diags)?;
    project(&K::schema(), &mut any);
    Some(any)
}

/// `taikun_<kind>`: one entity looked up by id
pub struct SingleDataSource<K> {
    session: Session,
    _kind: PhantomData<fn() -> K>,
}

impl<K: Kind> SingleDataSource<K> {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            _kind: PhantomData,
        }
    }

    pub fn block() -> Block {
        let mut block = K::schema().as_computed();
        block.description = format!("Read one Taikun {}", K::TYPE_NAME.replace('_', " ")).into();
        block.attributes.insert(
            "id".to_string(),
            Attribute::required(AttributeType::String, "The id of the entity.")
                .validate(Validator::NumericId),
        );
        block
    }
}

#[async_trait]
impl<K: Kind> DataSource for SingleDataSource<K> {
    type State = ValueAny;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(Schema::new(Self::block()))
    }

    async fn validate(&self, diags: &mut Diagnostics, config: Self::State) -> Option<()> {
        crate::plan::validate(&Self::block(), &config, diags);
        Some(())
    }

    #[instrument(skip_all, fields(kind = K::TYPE_NAME))]
    async fn read(&self, diags: &mut Diagnostics, config: Self::State) -> Option<Self::State> {
        let Some(id) = config.get("id").as_str().map(str::to_string) else {
            diags.error_short("Missing id", AttributePath::new("id"));
            return None;
        };
        let cx = context(&self.session, diags)?;
        let what = format!("{} {id}", K::TYPE_NAME);
        let found = cx
            .envelope(Operation::Read)
            .retry(&what, || K::read(&cx, &id))
            .await;
        match found {
            Ok(Some(state)) => row::<K>(&state, diags),
            Ok(None) | Err(ProviderError::NotFound(_)) => {
                diags.error(
                    format!("{} not found", K::TYPE_NAME),
                    format!("No {} with id {id}", K::TYPE_NAME),
                    AttributePath::new("id"),
                );
                None
            }
            Err(err) => {
                err.report(diags);
                None
            }
        }
    }
}

/// `taikun_<plural>`: every entity, optionally of one organization
pub struct ListDataSource<K> {
    session: Session,
    _kind: PhantomData<fn() -> K>,
}

impl<K: Kind> ListDataSource<K> {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            _kind: PhantomData,
        }
    }

    fn plural() -> &'static str {
        K::PLURAL.unwrap_or(K::TYPE_NAME)
    }

    pub fn block() -> Block {
        let rows = K::schema().as_computed();
        Block::new(
            format!("List Taikun {}", Self::plural().replace('_', " ")),
            map! {
                "id" => Attribute::computed(AttributeType::String, "`all`, or the organization id when filtered."),
                "organization_id" => Attribute::optional(AttributeType::String, "Only list the entities of this organization.")
                    .validate(Validator::NumericId),
                Self::plural() => Attribute::computed(
                    AttributeType::List(Box::new(rows.object_type())),
                    rows.description,
                ),
            },
        )
    }

    async fn rows(
        cx: &Context<'_>,
        organization_id: Option<i64>,
        diags: &mut Diagnostics,
    ) -> Option<Vec<ValueAny>> {
        let what = format!("{} list", K::TYPE_NAME);
        let listed = cx
            .envelope(Operation::Read)
            .retry(&what, || K::list(cx, organization_id))
            .await;
        match listed {
            Ok(states) => {
                debug!(count = states.len(), organization_id, "listed");
                states.iter().map(|state| row::<K>(state, diags)).collect()
            }
            Err(err) => {
                err.report(diags);
                None
            }
        }
    }
}

#[async_trait]
impl<K: Kind> DataSource for ListDataSource<K> {
    type State = ValueAny;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(Schema::new(Self::block()))
    }

    async fn validate(&self, diags: &mut Diagnostics, config: Self::State) -> Option<()> {
        crate::plan::validate(&Self::block(), &config, diags);
        Some(())
    }

    #[instrument(skip_all, fields(kind = K::TYPE_NAME))]
    async fn read(&self, diags: &mut Diagnostics, config: Self::State) -> Option<Self::State> {
        let organization = config.get("organization_id").clone();
        let organization_id = match organization.as_str() {
            Some(id) => match ids::numeric(id) {
                Ok(id) => Some(id),
                Err(err) => {
                    err.report_at(diags, AttributePath::new("organization_id"));
                    return None;
                }
            },
            None => None,
        };
        let cx = context(&self.session, diags)?;
        let rows = Self::rows(&cx, organization_id, diags).await?;
        let id = organization_id.map_or_else(|| "all".to_string(), |id| id.to_string());
        Some(ValueAny::Map(BTreeMap::from([
            ("id".to_string(), ValueAny::String(id)),
            ("organization_id".to_string(), organization),
            (Self::plural().to_string(), ValueAny::List(rows)),
        ])))
    }
}

fn credential_id(value: &ValueString, diags: &mut Diagnostics) -> Option<i64> {
    match ids::reference(value) {
        Ok(Some(id)) => Some(id),
        Ok(None) => {
            diags.error_short(
                "Missing cloud credential",
                AttributePath::new("cloud_credential_id"),
            );
            None
        }
        Err(err) => {
            err.report_at(diags, AttributePath::new("cloud_credential_id"));
            None
        }
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FlavorState {
    pub name: ValueString,
    pub cpu: ValueNumber,
    pub ram: ValueNumber,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlavorsState {
    pub id: ValueString,
    pub cloud_credential_id: ValueString,
    pub min_cpu: ValueNumber,
    pub max_cpu: ValueNumber,
    pub min_ram: ValueNumber,
    pub max_ram: ValueNumber,
    pub flavors: ValueList<FlavorState>,
}

impl FlavorsState {
    fn bounds(&self) -> ((i64, i64), (i64, i64)) {
        (
            (self.min_cpu.clone().unwrap_or(2), self.max_cpu.clone().unwrap_or(36)),
            (self.min_ram.clone().unwrap_or(2), self.max_ram.clone().unwrap_or(500)),
        )
    }

    /// Flavors within the cpu and ram bounds, in upstream order
    fn select(&self, flavors: Vec<Flavor>) -> Vec<FlavorState> {
        let ((min_cpu, max_cpu), (min_ram, max_ram)) = self.bounds();
        flavors
            .into_iter()
            .filter(|flavor| (min_cpu..=max_cpu).contains(&flavor.cpu))
            .filter(|flavor| (min_ram..=max_ram).contains(&flavor.ram))
            .map(|flavor| FlavorState {
                name: Value::Value(flavor.name),
                cpu: Value::Value(flavor.cpu),
                ram: Value::Value(flavor.ram),
            })
            .collect()
    }
}

/// `taikun_flavors`: flavors a cloud credential offers
pub struct FlavorsDataSource {
    session: Session,
}

impl FlavorsDataSource {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    async fn fetch(cx: &Context<'_>, credential: i64) -> ProviderResult<Vec<Flavor>> {
        cx.envelope(Operation::Read)
            .retry("flavors", || async {
                Ok(cx.flavors().list().filter("CloudId", credential).all().await?)
            })
            .await
    }
}

#[async_trait]
impl DataSource for FlavorsDataSource {
    type State = FlavorsState;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        let bound = |description: &str| {
            Attribute::optional(AttributeType::Number, description)
                .validate(Validator::IntBetween(0, i64::MAX))
        };
        Some(Schema::new(Block::new(
            "List the flavors offered by a cloud credential",
            map! {
                "id" => Attribute::computed(AttributeType::String, "The cloud credential id."),
                "cloud_credential_id" => Attribute::required(AttributeType::String, "The cloud credential to list flavors of.")
                    .validate(Validator::NumericId),
                "min_cpu" => bound("Minimal CPU count, 2 by default."),
                "max_cpu" => bound("Maximal CPU count, 36 by default."),
                "min_ram" => bound("Minimal RAM in GiB, 2 by default."),
                "max_ram" => bound("Maximal RAM in GiB, 500 by default."),
                "flavors" => Attribute::computed(
                    AttributeType::List(Box::new(AttributeType::Object(map! {
                        "name" => AttributeType::String,
                        "cpu" => AttributeType::Number,
                        "ram" => AttributeType::Number,
                    }))),
                    "Matching flavors.",
                ),
            },
        )))
    }

    async fn validate(&self, diags: &mut Diagnostics, config: Self::State) -> Option<()> {
        let ((min_cpu, max_cpu), (min_ram, max_ram)) = config.bounds();
        if min_cpu > max_cpu {
            diags.error_short("min_cpu exceeds max_cpu", AttributePath::new("min_cpu"));
        }
        if min_ram > max_ram {
            diags.error_short("min_ram exceeds max_ram", AttributePath::new("min_ram"));
        }
        Some(())
    }

    async fn read(&self, diags: &mut Diagnostics, mut config: Self::State) -> Option<Self::State> {
        let credential = credential_id(&config.cloud_credential_id, diags)?;
        let cx = context(&self.session, diags)?;
        match Self::fetch(&cx, credential).await {
            Ok(flavors) => {
                config.flavors = Value::Value(config.select(flavors));
                config.id = Value::Value(credential.to_string());
                Some(config)
            }
            Err(err) => {
                err.report(diags);
                None
            }
        }
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageState {
    pub id: ValueString,
    pub name: ValueString,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagesState {
    pub id: ValueString,
    pub cloud_credential_id: ValueString,
    pub images: ValueList<ImageState>,
}

/// `taikun_images`: images a cloud credential offers
pub struct ImagesDataSource {
    session: Session,
}

impl ImagesDataSource {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    async fn fetch(cx: &Context<'_>, credential: i64) -> ProviderResult<Vec<Image>> {
        cx.envelope(Operation::Read)
            .retry("images", || async {
                Ok(cx.images().list().filter("CloudId", credential).all().await?)
            })
            .await
    }
}

#[async_trait]
impl DataSource for ImagesDataSource {
    type State = ImagesState;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(Schema::new(Block::new(
            "List the images offered by a cloud credential",
            map! {
                "id" => Attribute::computed(AttributeType::String, "The cloud credential id."),
                "cloud_credential_id" => Attribute::required(AttributeType::String, "The cloud credential to list images of.")
                    .validate(Validator::NumericId),
                "images" => Attribute::computed(
                    AttributeType::List(Box::new(AttributeType::Object(map! {
                        "id" => AttributeType::String,
                        "name" => AttributeType::String,
                    }))),
                    "Images of the credential.",
                ),
            },
        )))
    }

    async fn read(&self, diags: &mut Diagnostics, mut config: Self::State) -> Option<Self::State> {
        let credential = credential_id(&config.cloud_credential_id, diags)?;
        let cx = context(&self.session, diags)?;
        match Self::fetch(&cx, credential).await {
            Ok(images) => {
                config.images = Value::Value(
                    images
                        .into_iter()
                        .map(|image| ImageState {
                            id: Value::Value(image.id),
                            name: Value::Value(image.name),
                        })
                        .collect(),
                );
                config.id = Value::Value(credential.to_string());
                Some(config)
            }
            Err(err) => {
                err.report(diags);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taikun::resources::{OrganizationKind, ProjectKind};

    fn flavor(name: &str, cpu: i64, ram: i64) -> Flavor {
        Flavor {
            name: name.to_string(),
            cpu,
            ram,
            description: None,
        }
    }

    #[test]
    fn flavors_are_filtered_on_bounds() {
        let config = FlavorsState {
            min_cpu: Value::Value(4),
            max_ram: Value::Value(16),
            ..Default::default()
        };
        let selected = config.select(vec![
            flavor("small", 2, 4),
            flavor("medium", 4, 16),
            flavor("large", 8, 32),
        ]);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].name.as_str(), "medium");
    }

    #[test]
    fn single_rows_hide_sensitive_attributes() {
        let mut value = ValueAny::Map(BTreeMap::from([
            ("id".to_string(), ValueAny::from("3")),
            ("password".to_string(), ValueAny::from("secret")),
            ("stray".to_string(), ValueAny::from("x")),
        ]));
        let block = Block::new(
            "test",
            map! {
                "id" => Attribute::computed(AttributeType::String, "id"),
                "password" => Attribute::optional(AttributeType::String, "password").sensitive(),
            },
        );
        project(&block, &mut value);
        assert_eq!(value.get("id").as_str(), Some("3"));
        assert!(value.get("password").is_null());
        assert!(value.get("stray").is_null());
    }

    #[test]
    fn single_schema_takes_an_id() {
        let block = SingleDataSource::<OrganizationKind>::block();
        let id = &block.attributes["id"];
        assert!(id.constraint.is_configurable());
        assert!(block.attributes["name"].constraint.is_computed());
        assert!(!block.attributes["name"].constraint.is_configurable());
    }

    #[test]
    fn list_schema_is_named_after_the_plural() {
        let block = ListDataSource::<ProjectKind>::block();
        assert!(block.attributes.contains_key("projects"));
        assert!(block.attributes["organization_id"].constraint.is_configurable());
        let AttributeType::List(rows) = &block.attributes["projects"].attr_type else {
            panic!("projects should be a list");
        };
        let AttributeType::Object(fields) = rows.as_ref() else {
            panic!("rows should be objects");
        };
        assert!(fields.contains_key("server_kubeworker"));
    }
}
