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

//! Alerting profiles
//!
//! Emails, webhooks and integrations have no partial update upstream: any change replays the
//! whole set.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use taikun_client::{
    models::{
        AlertingEmail, AlertingIntegration, AlertingProfile, AlertingWebhook,
        CreateAlertingProfileCommand, UpdateAlertingProfileCommand, WebhookHeader,
    },
    Created, Method,
};

use super::{
    audited, elements, flag, id, lock, name, opt_id, optional, reference, required, scoped,
    string, text,
};
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
pub struct HeaderState {
    pub key: ValueString,
    pub value: ValueString,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookState {
    pub url: ValueString,
    pub header: ValueList<HeaderState>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegrationState {
    pub id: ValueString,
    #[serde(rename = "type")]
    pub kind: ValueString,
    pub url: ValueString,
    pub token: ValueString,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertingProfileState {
    pub id: ValueString,
    pub name: ValueString,
    pub organization_id: ValueString,
    pub organization_name: ValueString,
    pub lock: ValueBool,
    pub reminder: ValueString,
    pub emails: ValueList<String>,
    pub slack_configuration_id: ValueString,
    pub slack_configuration_name: ValueString,
    pub created_by: ValueString,
    pub last_modified: ValueString,
    pub last_modified_by: ValueString,
    pub webhook: ValueList<WebhookState>,
    pub integration: ValueList<IntegrationState>,
}

impl AlertingProfileState {
    fn emails(&self) -> Vec<AlertingEmail> {
        elements(&self.emails)
            .iter()
            .map(|email| AlertingEmail {
                email: email.clone(),
            })
            .collect()
    }

    fn webhooks(&self) -> ProviderResult<Vec<AlertingWebhook>> {
        elements(&self.webhook)
            .iter()
            .map(|webhook| {
                Ok(AlertingWebhook {
                    url: required(&webhook.url, "url")?.to_string(),
                    headers: elements(&webhook.header)
                        .iter()
                        .map(|header| {
                            Ok(WebhookHeader {
                                key: required(&header.key, "key")?.to_string(),
                                value: required(&header.value, "value")?.to_string(),
                            })
                        })
                        .collect::<ProviderResult<_>>()?,
                })
            })
            .collect()
    }

    fn integrations(&self) -> ProviderResult<Vec<AlertingIntegration>> {
        elements(&self.integration)
            .iter()
            .map(|integration| {
                Ok(AlertingIntegration {
                    id: 0,
                    alerting_integration_type: required(&integration.kind, "type")?.to_string(),
                    url: required(&integration.url, "url")?.to_string(),
                    token: optional(&integration.token),
                })
            })
            .collect()
    }

    fn command(&self) -> ProviderResult<UpdateAlertingProfileCommand> {
        Ok(UpdateAlertingProfileCommand {
            name: required(&self.name, "name")?.to_string(),
            slack_configuration_id: ids::reference(&self.slack_configuration_id)?,
            reminder: self.reminder.as_str().to_string(),
        })
    }
}

pub struct AlertingProfileKind;

impl AlertingProfileKind {
    /// Replace one sub-resource set through `PUT AlertingProfiles/{endpoint}/{id}`
    async fn assign<T: Serialize + PartialEq + Sync>(
        cx: &Context<'_>,
        id: i64,
        endpoint: &str,
        prior: &[T],
        planned: &[T],
    ) -> ProviderResult<()> {
        if prior == planned {
            return Ok(());
        }
        cx.alerting_profiles()
            .request(Method::PUT, &format!("{endpoint}/{id}"))
            .json(planned)
            .execute()
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Kind for AlertingProfileKind {
    const TYPE_NAME: &'static str = "alerting_profile";
    const PLURAL: Option<&'static str> = Some("alerting_profiles");

    type State = AlertingProfileState;
    type Model = AlertingProfile;

    fn schema() -> Block {
        let mut attributes = audited(scoped("alerting profile"));
        attributes.extend(map! {
            "name" => name("The alerting profile's name."),
            "lock" => lock(),
            "reminder" => Attribute::optional(AttributeType::String, "HalfHour, Hourly, Daily or None.")
                .default_value("None")
                .validate(Validator::OneOf(&["HalfHour", "Hourly", "Daily", "None"])),
            "emails" => Attribute::optional(AttributeType::list_of_strings(), "List of e-mails to notify.")
                .validate(Validator::Email),
            "slack_configuration_id" => reference("The ID of the Slack configuration to notify."),
            "slack_configuration_name" => Attribute::computed(AttributeType::String, "The name of the Slack configuration to notify."),
        });
        Block::new("Taikun alerting profile", attributes)
            .with_block(
                "webhook",
                NestedBlock::List(
                    Block::new(
                        "List of webhooks to notify.",
                        map! {
                            "url" => Attribute::required(AttributeType::String, "URL of the webhook.")
                                .validate(Validator::Url),
                        },
                    )
                    .with_block(
                        "header",
                        NestedBlock::List(Block::new(
                            "List of headers.",
                            map! {
                                "key" => Attribute::required(AttributeType::String, "Key of the header."),
                                "value" => Attribute::required(AttributeType::String, "Value of the header."),
                            },
                        )),
                    ),
                ),
            )
            .with_block(
                "integration",
                NestedBlock::List(Block::new(
                    "List of integrations.",
                    map! {
                        "id" => Attribute::computed(AttributeType::String, "ID of the integration."),
                        "type" => Attribute::required(AttributeType::String, "Type of integration: Opsgenie, Pagerduty, Splunk or MicrosoftTeams.")
                            .validate(Validator::OneOf(&["Opsgenie", "Pagerduty", "Splunk", "MicrosoftTeams"])),
                        "url" => Attribute::required(AttributeType::String, "URL of the integration.")
                            .validate(Validator::Url),
                        "token" => Attribute::optional(AttributeType::String, "Token of the integration.")
                            .sensitive(),
                    },
                )),
            )
    }

    fn observe(model: AlertingProfile) -> AlertingProfileState {
        AlertingProfileState {
            id: id(model.id),
            name: string(model.name),
            organization_id: id(model.organization_id),
            organization_name: string(model.organization_name),
            lock: flag(model.is_locked),
            reminder: string(model.reminder),
            emails: Value::Value(model.emails.into_iter().map(|e| e.email).collect()),
            slack_configuration_id: opt_id(model.slack_configuration_id),
            slack_configuration_name: text(model.slack_configuration_name),
            created_by: text(model.created_by),
            last_modified: text(model.last_modified),
            last_modified_by: text(model.last_modified_by),
            webhook: Value::Value(
                model
                    .webhooks
                    .into_iter()
                    .map(|webhook| WebhookState {
                        url: string(webhook.url),
                        header: Value::Value(
                            webhook
                                .headers
                                .into_iter()
                                .map(|header| HeaderState {
                                    key: string(header.key),
                                    value: string(header.value),
                                })
                                .collect(),
                        ),
                    })
                    .collect(),
            ),
            integration: Value::Value(
                model
                    .integrations
                    .into_iter()
                    .map(|integration| IntegrationState {
                        id: id(integration.id),
                        kind: string(integration.alerting_integration_type),
                        url: string(integration.url),
                        token: text(integration.token),
                    })
                    .collect(),
            ),
        }
    }

    async fn create(cx: &Context<'_>, planned: &AlertingProfileState) -> ProviderResult<String> {
        let update = planned.command()?;
        let created: Created = cx
            .alerting_profiles()
            .create(&CreateAlertingProfileCommand {
                name: update.name,
                organization_id: ids::reference(&planned.organization_id)?,
                slack_configuration_id: update.slack_configuration_id,
                reminder: update.reminder,
                emails: planned.emails(),
                webhooks: planned.webhooks()?,
                integrations: planned.integrations()?,
            })
            .send()
            .await?;
        Ok(created.id.to_string())
    }

    async fn update(
        cx: &Context<'_>,
        id: &str,
        prior: &AlertingProfileState,
        planned: &AlertingProfileState,
    ) -> ProviderResult<()> {
        let id = ids::numeric(id)?;
        let command = planned.command()?;
        if prior.command().ok().as_ref() != Some(&command) {
            cx.alerting_profiles().update(id, &command).execute().await?;
        }
        Self::assign(cx, id, "assignemails", &prior.emails(), &planned.emails()).await?;
        Self::assign(cx, id, "assignwebhooks", &prior.webhooks()?, &planned.webhooks()?).await?;
        Self::assign(
            cx,
            id,
            "assignintegrations",
            &prior.integrations()?,
            &planned.integrations()?,
        )
        .await
    }

    async fn set_lock(cx: &Context<'_>, id: &str, lock: bool) -> ProviderResult<()> {
        lock_model::<AlertingProfile>(cx, id, lock).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integrations_keep_their_type() {
        let state = AlertingProfileState {
            integration: Value::Value(vec![IntegrationState {
                kind: "Pagerduty".into(),
                url: "https://events.pagerduty.com".into(),
                token: "secret".into(),
                ..Default::default()
            }]),
            ..Default::default()
        };
        let integrations = state.integrations().unwrap();
        assert_eq!(integrations[0].alerting_integration_type, "Pagerduty");
        assert_eq!(integrations[0].token.as_deref(), Some("secret"));

        let any = crate::utils::to_any(&state, &mut crate::Diagnostics::default()).unwrap();
        assert_eq!(any.get("integration").elements()[0].get("type").as_str(), Some("Pagerduty"));
    }

    #[test]
    fn missing_webhook_url_is_rejected() {
        let state = AlertingProfileState {
            webhook: Value::Value(vec![WebhookState::default()]),
            ..Default::default()
        };
        assert!(state.webhooks().is_err());
    }
}
