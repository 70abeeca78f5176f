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

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use taikun_client::{
    models::{SlackConfiguration, SlackConfigurationCommand},
    Created,
};

use super::{id, name, required, scoped, string};
use crate::{
    map,
    taikun::{error::ProviderResult, ids, kind::Kind, session::Context},
    Attribute, AttributeType, Block, Validator, ValueString,
};

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SlackConfigurationState {
    pub id: ValueString,
    pub name: ValueString,
    pub organization_id: ValueString,
    pub organization_name: ValueString,
    pub url: ValueString,
    pub channel: ValueString,
    #[serde(rename = "type")]
    pub slack_type: ValueString,
}

impl SlackConfigurationState {
    fn command(&self) -> ProviderResult<SlackConfigurationCommand> {
        Ok(SlackConfigurationCommand {
            name: required(&self.name, "name")?.to_string(),
            url: required(&self.url, "url")?.to_string(),
            channel: required(&self.channel, "channel")?.to_string(),
            slack_type: required(&self.slack_type, "type")?.to_string(),
            organization_id: None,
        })
    }
}

/// The upstream checks the webhook URL on create and rejects invalid ones
pub struct SlackConfigurationKind;

#[async_trait]
impl Kind for SlackConfigurationKind {
    const TYPE_NAME: &'static str = "slack_configuration";
    const PLURAL: Option<&'static str> = Some("slack_configurations");

    type State = SlackConfigurationState;
    type Model = SlackConfiguration;

    fn schema() -> Block {
        let mut attributes = scoped("Slack configuration");
        attributes.extend(map! {
            "name" => name("The name of the Slack configuration."),
            "url" => Attribute::required(AttributeType::String, "Webhook URL from Slack app.")
                .validate(Validator::Url),
            "channel" => Attribute::required(AttributeType::String, "Slack channel for notifications."),
            "type" => Attribute::required(AttributeType::String, "The type of notifications to receive: `Alert` or `General`.")
                .validate(Validator::OneOf(&["Alert", "General"])),
        });
        Block::new("Taikun Slack configuration", attributes)
    }

    fn observe(model: SlackConfiguration) -> SlackConfigurationState {
        SlackConfigurationState {
            id: id(model.id),
            name: string(model.name),
            organization_id: id(model.organization_id),
            organization_name: string(model.organization_name),
            url: string(model.url),
            channel: string(model.channel),
            slack_type: string(model.slack_type),
        }
    }

    async fn create(cx: &Context<'_>, planned: &SlackConfigurationState) -> ProviderResult<String> {
        let command = SlackConfigurationCommand {
            organization_id: ids::reference(&planned.organization_id)?,
            ..planned.command()?
        };
        let created: Created = cx.slack_configurations().create(&command).send().await?;
        Ok(created.id.to_string())
    }

    async fn update(
        cx: &Context<'_>,
        id: &str,
        prior: &SlackConfigurationState,
        planned: &SlackConfigurationState,
    ) -> ProviderResult<()> {
        let command = planned.command()?;
        if prior.command().ok().as_ref() == Some(&command) {
            return Ok(());
        }
        cx.slack_configurations()
            .update(ids::numeric(id)?, &command)
            .execute()
            .await?;
        Ok(())
    }
}
