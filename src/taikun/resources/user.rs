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

//! Users, and their attachment to projects

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use taikun_client::{
    models::{
        BindProjectsCommand, CreateUserCommand, ProjectBinding, ToggleUserCommand,
        UpdateUserCommand, User,
    },
    Created,
};
use tracing::debug;

use super::{enabled, flag, id, optional, required, required_id, scoped, string, text};
use crate::{
    taikun::{error::ProviderResult, ids, kind::Kind, session::Context},
    Attribute, AttributeType, Block, Validator, ValueBool, ValueString,
};

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UserState {
    pub id: ValueString,
    pub user_name: ValueString,
    pub email: ValueString,
    pub role: ValueString,
    pub display_name: ValueString,
    pub organization_id: ValueString,
    pub organization_name: ValueString,
    pub user_disabled: ValueBool,
    pub approved_by_partner: ValueBool,
    pub is_owner: ValueBool,
    pub is_csm: ValueBool,
    pub email_confirmed: ValueBool,
    pub email_notification_enabled: ValueBool,
}

impl UserState {
    fn command(&self) -> ProviderResult<UpdateUserCommand> {
        Ok(UpdateUserCommand {
            username: required(&self.user_name, "user_name")?.to_string(),
            email: required(&self.email, "email")?.to_string(),
            role: required(&self.role, "role")?.to_string(),
            display_name: optional(&self.display_name),
        })
    }
}

pub struct UserKind;

#[async_trait]
impl Kind for UserKind {
    const TYPE_NAME: &'static str = "user";
    const PLURAL: Option<&'static str> = Some("users");

    type State = UserState;
    type Model = User;

    fn schema() -> Block {
        let mut attributes = scoped("user");
        attributes.extend(crate::map! {
            "user_name" => Attribute::required(AttributeType::String, "The name of the user.")
                .validate(Validator::Length(3, 30)),
            "email" => Attribute::required(AttributeType::String, "The email of the user.")
                .validate(Validator::Email),
            "role" => Attribute::required(AttributeType::String, "The role of the user: `User` or `Manager`.")
                .validate(Validator::OneOf(&["User", "Manager"])),
            "display_name" => Attribute::optional(AttributeType::String, "The user's display name."),
            "user_disabled" => Attribute::optional(AttributeType::Bool, "Indicates whether the user is locked.")
                .default_value(false),
            "approved_by_partner" => Attribute::computed(AttributeType::Bool, "Indicates whether the partner approved the user."),
            "is_owner" => Attribute::computed(AttributeType::Bool, "Indicates whether the user is the owner of their organization."),
            "is_csm" => Attribute::computed(AttributeType::Bool, "Indicates whether the user is a Customer Success Manager."),
            "email_confirmed" => Attribute::computed(AttributeType::Bool, "Indicates whether the email of the user has been confirmed."),
            "email_notification_enabled" => Attribute::computed(AttributeType::Bool, "Indicates whether the user has enabled notifications on their email."),
        });
        Block::new("Taikun user", attributes)
    }

    fn observe(model: User) -> UserState {
        UserState {
            id: id(model.id),
            user_name: string(model.username),
            email: string(model.email),
            role: string(model.role),
            display_name: text(model.display_name),
            organization_id: id(model.organization_id),
            organization_name: string(model.organization_name),
            user_disabled: flag(model.is_disabled),
            approved_by_partner: flag(model.is_approved_by_partner),
            is_owner: flag(model.is_owner),
            is_csm: flag(model.is_csm),
            email_confirmed: flag(model.is_email_confirmed),
            email_notification_enabled: flag(model.is_email_notification_enabled),
        }
    }

    async fn create(cx: &Context<'_>, planned: &UserState) -> ProviderResult<String> {
        let command = planned.command()?;
        let created: Created = cx
            .users()
            .create(&CreateUserCommand {
                username: command.username,
                email: command.email,
                role: command.role,
                display_name: command.display_name,
                organization_id: ids::reference(&planned.organization_id)?,
            })
            .send()
            .await?;
        Ok(created.id.to_string())
    }

    async fn update(
        cx: &Context<'_>,
        id: &str,
        prior: &UserState,
        planned: &UserState,
    ) -> ProviderResult<()> {
        let id = ids::numeric(id)?;
        let command = planned.command()?;
        if prior.command().ok().as_ref() != Some(&command) {
            cx.users().update(id, &command).execute().await?;
        }
        let disable = enabled(&planned.user_disabled);
        if enabled(&prior.user_disabled) != disable {
            cx.users()
                .action("disable", &ToggleUserCommand { id, disable })
                .execute()
                .await?;
        }
        Ok(())
    }
}

/// Binding of a user to a project, identified by `<project_id>/<user_id>`
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectUserAttachmentState {
    pub id: ValueString,
    pub project_id: ValueString,
    pub user_id: ValueString,
}

const ATTACHMENT_ID: &str = "<project_id>/<user_id>";

async fn bind(
    cx: &Context<'_>,
    project_id: i64,
    user_id: i64,
    is_bound: bool,
) -> ProviderResult<()> {
    debug!(project_id, user_id, is_bound, "project user binding");
    cx.users()
        .action(
            "bindprojects",
            &BindProjectsCommand {
                user_id,
                projects: vec![ProjectBinding {
                    project_id,
                    is_bound,
                }],
            },
        )
        .execute()
        .await?;
    Ok(())
}

pub struct ProjectUserAttachmentKind;

#[async_trait]
impl Kind for ProjectUserAttachmentKind {
    const TYPE_NAME: &'static str = "project_user_attachment";

    type State = ProjectUserAttachmentState;
    type Model = User;

    fn schema() -> Block {
        Block::new(
            "Taikun project-user attachment",
            crate::map! {
                "id" => Attribute::computed(AttributeType::String, "The attachment ID: `<project_id>/<user_id>`."),
                "project_id" => Attribute::required(AttributeType::String, "ID of the project.")
                    .force_new()
                    .validate(Validator::NumericId),
                "user_id" => Attribute::required(AttributeType::String, "ID of the user.")
                    .force_new()
                    .validate(Validator::NumericId),
            },
        )
    }

    /// Only the user side is known from a user row
    fn observe(model: User) -> ProjectUserAttachmentState {
        ProjectUserAttachmentState {
            user_id: id(model.id),
            ..Default::default()
        }
    }

    async fn create(
        cx: &Context<'_>,
        planned: &ProjectUserAttachmentState,
    ) -> ProviderResult<String> {
        let project_id = required_id(&planned.project_id, "project_id")?;
        let user_id = required_id(&planned.user_id, "user_id")?;
        bind(cx, project_id, user_id, true).await?;
        Ok(ids::join(project_id, user_id))
    }

    async fn read(
        cx: &Context<'_>,
        id: &str,
    ) -> ProviderResult<Option<ProjectUserAttachmentState>> {
        let (project_id, user_id) = ids::numeric_pair(id, ATTACHMENT_ID)?;
        let Some(user) = cx.users().get(user_id).await? else {
            return Ok(None);
        };
        let bound = user
            .bound_projects
            .iter()
            .any(|project| project.project_id == project_id);
        Ok(bound.then(|| ProjectUserAttachmentState {
            id: string(ids::join(project_id, user_id)),
            project_id: super::id(project_id),
            user_id: super::id(user_id),
        }))
    }

    async fn delete(
        cx: &Context<'_>,
        id: &str,
        _prior: &ProjectUserAttachmentState,
    ) -> ProviderResult<()> {
        let (project_id, user_id) = ids::numeric_pair(id, ATTACHMENT_ID)?;
        bind(cx, project_id, user_id, false).await
    }

    fn parse_import_id(id: &str) -> ProviderResult<String> {
        let (project_id, user_id) = ids::numeric_pair(id, ATTACHMENT_ID)?;
        Ok(ids::join(project_id, user_id))
    }
}
