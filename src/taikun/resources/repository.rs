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

//! Helm repositories available to an organization
//!
//! Private repositories are imported with their URL and credentials. Public repositories already
//! exist upstream: the resource only looks them up by name and binds them to the organization.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use taikun_client::{
    models::{BindRepositoryCommand, ImportRepositoryCommand, Repository},
    Created,
};
use tracing::{debug, info};

use super::{enabled, flag, id, name, optional, required, scoped, string};
use crate::{
    map,
    taikun::{
        error::{ProviderError, ProviderResult},
        ids,
        kind::Kind,
        session::Context,
    },
    Attribute, AttributePath, AttributeType, Block, Diagnostics, Validator, Value, ValueBool,
    ValueString,
};

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryState {
    pub id: ValueString,
    pub name: ValueString,
    pub organization_id: ValueString,
    pub organization_name: ValueString,
    pub url: ValueString,
    pub private: ValueBool,
    pub username: ValueString,
    pub password: ValueString,
    pub enabled: ValueBool,
}

impl RepositoryState {
    fn is_private(&self) -> bool {
        enabled(&self.private)
    }
}

async fn bind(
    cx: &Context<'_>,
    repository_id: i64,
    organization_id: i64,
    bound: bool,
) -> ProviderResult<()> {
    info!(repository_id, organization_id, bound, "repository binding");
    let action = if bound { "bind" } else { "unbind" };
    cx.repositories()
        .action(
            action,
            &BindRepositoryCommand {
                repository_id,
                organization_id,
            },
        )
        .execute()
        .await?;
    Ok(())
}

/// Public repository of that name, as seen by an organization
async fn find_public(
    cx: &Context<'_>,
    name: &str,
    organization_id: Option<i64>,
) -> ProviderResult<Option<Repository>> {
    let mut list = cx.repositories().list().filter("Name", name);
    if let Some(organization_id) = organization_id {
        list = list.organization_id(organization_id);
    }
    let found = list
        .all()
        .await?
        .into_iter()
        .find(|repository| !repository.is_private && repository.name == name);
    debug!(name, found = found.is_some(), "public repository lookup");
    Ok(found)
}

pub struct RepositoryKind;

#[async_trait]
impl Kind for RepositoryKind {
    const TYPE_NAME: &'static str = "repository";
    const UNREADABLE: &'static [&'static str] = &["username", "password"];

    type State = RepositoryState;
    type Model = Repository;

    fn schema() -> Block {
        let mut attributes = scoped("repository");
        attributes.extend(map! {
            "name" => name("The name of the repository.").force_new(),
            "url" => Attribute::optional_computed(AttributeType::String, "URL of the repository, required for private repositories.")
                .force_new()
                .validate(Validator::Url),
            "private" => Attribute::optional(AttributeType::Bool, "Indicates whether the repository is private. Public repositories are looked up by name.")
                .default_value(false)
                .force_new(),
            "username" => Attribute::optional(AttributeType::String, "Username of a private repository.")
                .force_new()
                .sensitive(),
            "password" => Attribute::optional(AttributeType::String, "Password of a private repository.")
                .force_new()
                .sensitive(),
            "enabled" => Attribute::optional(AttributeType::Bool, "Indicates whether the repository is bound to the organization.")
                .default_value(true),
        });
        Block::new("Taikun repository", attributes)
    }

    fn check(state: &RepositoryState, diags: &mut Diagnostics) {
        if state.is_private() && state.url.is_null() {
            diags.error(
                "Missing repository URL",
                "Private repositories need a url",
                AttributePath::new("url"),
            );
        }
    }

    fn observe(model: Repository) -> RepositoryState {
        RepositoryState {
            id: id(model.id),
            name: string(model.name),
            organization_id: id(model.organization_id),
            organization_name: string(model.organization_name),
            url: string(model.url),
            private: flag(model.is_private),
            username: Value::Null,
            password: Value::Null,
            enabled: flag(model.is_bound),
        }
    }

    /// Binding follows in the update, from the observed `enabled`
    async fn create(cx: &Context<'_>, planned: &RepositoryState) -> ProviderResult<String> {
        let name = required(&planned.name, "name")?;
        let organization_id = ids::reference(&planned.organization_id)?;
        if !planned.is_private() {
            return match find_public(cx, name, organization_id).await? {
                Some(repository) => Ok(repository.id.to_string()),
                None => Err(ProviderError::NotFound(format!(
                    "public repository {name:?}"
                ))),
            };
        }
        let created: Created = cx
            .repositories()
            .action(
                "import",
                &ImportRepositoryCommand {
                    name: name.to_string(),
                    url: required(&planned.url, "url")?.to_string(),
                    username: optional(&planned.username),
                    password: optional(&planned.password),
                    organization_id,
                },
            )
            .send()
            .await?;
        Ok(created.id.to_string())
    }

    async fn update(
        cx: &Context<'_>,
        id: &str,
        prior: &RepositoryState,
        planned: &RepositoryState,
    ) -> ProviderResult<()> {
        let wanted = !matches!(planned.enabled, Value::Value(false));
        if enabled(&prior.enabled) == wanted {
            return Ok(());
        }
        let organization_id = super::required_id(&prior.organization_id, "organization_id")?;
        bind(cx, ids::numeric(id)?, organization_id, wanted).await
    }

    /// Public repositories outlive the resource: deleting one only unbinds it
    async fn delete(cx: &Context<'_>, id: &str, prior: &RepositoryState) -> ProviderResult<()> {
        let repository_id = ids::numeric(id)?;
        if prior.is_private() {
            cx.repositories().delete(repository_id).execute().await?;
            return Ok(());
        }
        if !enabled(&prior.enabled) {
            return Ok(());
        }
        let organization_id = super::required_id(&prior.organization_id, "organization_id")?;
        bind(cx, repository_id, organization_id, false).await
    }

    async fn gone(cx: &Context<'_>, id: &str, prior: &RepositoryState) -> ProviderResult<bool> {
        match Self::read(cx, id).await {
            Ok(Some(current)) => Ok(!prior.is_private() && !enabled(&current.enabled)),
            Ok(None) | Err(ProviderError::NotFound(_)) => Ok(true),
            Err(err) => Err(err),
        }
    }
}
