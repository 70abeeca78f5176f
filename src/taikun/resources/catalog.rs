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

//! Application catalogs, and their binding to projects

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use taikun_client::{
    models::{
        AddCatalogAppCommand, Catalog, CatalogCommand, CatalogProjectsCommand,
        DeleteCatalogAppCommand,
    },
    Created,
};
use tracing::debug;

use super::{diff, elements, flag, id, lock, name, required, required_id, scoped, string};
use crate::{
    map,
    taikun::{
        error::ProviderResult,
        ids,
        kind::{lock_model, Kind},
        session::Context,
    },
    Attribute, AttributeType, Block, NestedBlock, Validator, Value, ValueBool, ValueList,
    ValueString,
};

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationState {
    pub id: ValueString,
    pub name: ValueString,
    pub repository: ValueString,
}

impl ApplicationState {
    fn key(&self) -> (&str, &str) {
        (self.name.as_str(), self.repository.as_str())
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogState {
    pub id: ValueString,
    pub name: ValueString,
    pub description: ValueString,
    pub organization_id: ValueString,
    pub organization_name: ValueString,
    pub lock: ValueBool,
    pub default: ValueBool,
    pub projects: ValueList<String>,
    pub application: ValueList<ApplicationState>,
}

impl CatalogState {
    fn command(&self) -> ProviderResult<CatalogCommand> {
        Ok(CatalogCommand {
            name: required(&self.name, "name")?.to_string(),
            description: required(&self.description, "description")?.to_string(),
            organization_id: None,
        })
    }
}

async fn bind_projects(
    cx: &Context<'_>,
    catalog_id: i64,
    project_ids: Vec<i64>,
    bind: bool,
) -> ProviderResult<()> {
    if project_ids.is_empty() {
        return Ok(());
    }
    debug!(catalog_id, ?project_ids, bind, "catalog projects");
    let action = if bind { "bind-project" } else { "unbind-project" };
    cx.catalogs()
        .action(
            action,
            &CatalogProjectsCommand {
                catalog_id,
                project_ids,
            },
        )
        .execute()
        .await?;
    Ok(())
}

pub struct CatalogKind;

#[async_trait]
impl Kind for CatalogKind {
    const TYPE_NAME: &'static str = "catalog";
    const PLURAL: Option<&'static str> = Some("catalogs");

    type State = CatalogState;
    type Model = Catalog;

    fn schema() -> Block {
        let mut attributes = scoped("catalog");
        attributes.extend(map! {
            "name" => name("The name of the catalog."),
            "description" => Attribute::required(AttributeType::String, "The description of the catalog."),
            "lock" => lock(),
            "default" => Attribute::computed(AttributeType::Bool, "Indicates whether the catalog is the default one."),
            "projects" => Attribute::optional_computed(AttributeType::set_of_strings(), "IDs of the projects bound to the catalog.")
                .validate(Validator::NumericId),
        });
        Block::new("Taikun catalog", attributes).with_block(
            "application",
            NestedBlock::Set(Block::new(
                "Applications of the catalog.",
                map! {
                    "id" => Attribute::computed(AttributeType::String, "ID of the application in the catalog."),
                    "name" => Attribute::required(AttributeType::String, "Name of the application."),
                    "repository" => Attribute::required(AttributeType::String, "Name of the repository holding the application."),
                },
            )),
        )
    }

    fn observe(model: Catalog) -> CatalogState {
        CatalogState {
            id: id(model.id),
            name: string(model.name),
            description: string(model.description),
            organization_id: id(model.organization_id),
            organization_name: string(model.organization_name),
            lock: flag(model.is_locked),
            default: flag(model.is_default),
            projects: Value::Value(
                model
                    .bound_projects
                    .into_iter()
                    .map(|project| project.id.to_string())
                    .collect(),
            ),
            application: Value::Value(
                model
                    .bound_applications
                    .into_iter()
                    .map(|app| ApplicationState {
                        id: id(app.id),
                        name: string(app.name),
                        repository: string(app.repository),
                    })
                    .collect(),
            ),
        }
    }

    /// Applications and projects are attached by the update that follows
    async fn create(cx: &Context<'_>, planned: &CatalogState) -> ProviderResult<String> {
        let command = CatalogCommand {
            organization_id: ids::reference(&planned.organization_id)?,
            ..planned.command()?
        };
        let created: Created = cx.catalogs().create(&command).send().await?;
        Ok(created.id.to_string())
    }

    async fn update(
        cx: &Context<'_>,
        id: &str,
        prior: &CatalogState,
        planned: &CatalogState,
    ) -> ProviderResult<()> {
        let catalog_id = ids::numeric(id)?;
        let command = planned.command()?;
        if prior.command().ok().as_ref() != Some(&command) {
            cx.catalogs().update(catalog_id, &command).execute().await?;
        }

        let (removed, added) = diff(
            elements(&prior.application),
            elements(&planned.application),
            |app| app.key(),
        );
        for app in removed {
            cx.catalogs()
                .action(
                    "delete-app",
                    &DeleteCatalogAppCommand {
                        catalog_id,
                        catalog_app_id: ids::numeric(required(&app.id, "application.id")?)?,
                    },
                )
                .execute()
                .await?;
        }
        for app in added {
            cx.catalogs()
                .action(
                    "add-app",
                    &AddCatalogAppCommand {
                        catalog_id,
                        name: required(&app.name, "application.name")?.to_string(),
                        repository: required(&app.repository, "application.repository")?
                            .to_string(),
                    },
                )
                .execute()
                .await?;
        }

        if planned.projects.is_value() {
            let (removed, added) = diff(
                elements(&prior.projects),
                elements(&planned.projects),
                |p| p.clone(),
            );
            let numeric = |ids: Vec<&String>| {
                ids.into_iter()
                    .map(|id| ids::numeric(id))
                    .collect::<ProviderResult<Vec<_>>>()
            };
            bind_projects(cx, catalog_id, numeric(removed)?, false).await?;
            bind_projects(cx, catalog_id, numeric(added)?, true).await?;
        }
        Ok(())
    }

    async fn set_lock(cx: &Context<'_>, id: &str, lock: bool) -> ProviderResult<()> {
        lock_model::<Catalog>(cx, id, lock).await
    }
}

/// Binding of a project to a catalog, identified by `<catalog_id>/<project_id>`
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogProjectBindingState {
    pub id: ValueString,
    pub catalog_id: ValueString,
    pub project_id: ValueString,
}

const BINDING_ID: &str = "<catalog_id>/<project_id>";

pub struct CatalogProjectBindingKind;

#[async_trait]
impl Kind for CatalogProjectBindingKind {
    const TYPE_NAME: &'static str = "catalog_project_binding";

    type State = CatalogProjectBindingState;
    type Model = Catalog;

    fn schema() -> Block {
        Block::new(
            "Taikun catalog-project binding",
            map! {
                "id" => Attribute::computed(AttributeType::String, "The binding ID: `<catalog_id>/<project_id>`."),
                "catalog_id" => Attribute::required(AttributeType::String, "ID of the catalog.")
                    .force_new()
                    .validate(Validator::NumericId),
                "project_id" => Attribute::required(AttributeType::String, "ID of the project.")
                    .force_new()
                    .validate(Validator::NumericId),
            },
        )
    }

    fn observe(model: Catalog) -> CatalogProjectBindingState {
        CatalogProjectBindingState {
            catalog_id: id(model.id),
            ..Default::default()
        }
    }

    async fn create(
        cx: &Context<'_>,
        planned: &CatalogProjectBindingState,
    ) -> ProviderResult<String> {
        let catalog_id = required_id(&planned.catalog_id, "catalog_id")?;
        let project_id = required_id(&planned.project_id, "project_id")?;
        bind_projects(cx, catalog_id, vec![project_id], true).await?;
        Ok(ids::join(catalog_id, project_id))
    }

    async fn read(
        cx: &Context<'_>,
        id: &str,
    ) -> ProviderResult<Option<CatalogProjectBindingState>> {
        let (catalog_id, project_id) = ids::numeric_pair(id, BINDING_ID)?;
        let Some(catalog) = cx.catalogs().get(catalog_id).await? else {
            return Ok(None);
        };
        let bound = catalog
            .bound_projects
            .iter()
            .any(|project| project.id == project_id);
        Ok(bound.then(|| CatalogProjectBindingState {
            id: string(ids::join(catalog_id, project_id)),
            catalog_id: super::id(catalog_id),
            project_id: super::id(project_id),
        }))
    }

    async fn delete(
        cx: &Context<'_>,
        id: &str,
        _prior: &CatalogProjectBindingState,
    ) -> ProviderResult<()> {
        let (catalog_id, project_id) = ids::numeric_pair(id, BINDING_ID)?;
        bind_projects(cx, catalog_id, vec![project_id], false).await
    }

    fn parse_import_id(id: &str) -> ProviderResult<String> {
        let (catalog_id, project_id) = ids::numeric_pair(id, BINDING_ID)?;
        Ok(ids::join(catalog_id, project_id))
    }
}
