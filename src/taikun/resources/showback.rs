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

//! Showback credentials and rules

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use taikun_client::{
    models::{
        CreateShowbackCredentialCommand, ShowbackCredential, ShowbackRule, ShowbackRuleCommand,
    },
    Created,
};

use super::{
    audited, billing::LabelState, flag, float, id, lock, name, number, opt_id, reference, rename,
    required, scoped, string, text,
};
use crate::{
    map,
    taikun::{
        error::ProviderResult,
        ids,
        kind::{lock_model, Kind},
        session::Context,
    },
    Attribute, AttributePath, AttributeType, Block, Diagnostics, Validator, Value, ValueBool,
    ValueFloat, ValueList, ValueNumber, ValueString,
};

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShowbackCredentialState {
    pub id: ValueString,
    pub name: ValueString,
    pub organization_id: ValueString,
    pub organization_name: ValueString,
    pub lock: ValueBool,
    pub url: ValueString,
    pub username: ValueString,
    pub password: ValueString,
    pub created_by: ValueString,
    pub last_modified: ValueString,
    pub last_modified_by: ValueString,
}

pub struct ShowbackCredentialKind;

#[async_trait]
impl Kind for ShowbackCredentialKind {
    const TYPE_NAME: &'static str = "showback_credential";
    const PLURAL: Option<&'static str> = Some("showback_credentials");

    type State = ShowbackCredentialState;
    type Model = ShowbackCredential;

    fn schema() -> Block {
        let mut attributes = audited(scoped("showback credential"));
        attributes.extend(map! {
            "name" => name("The name of the showback credential."),
            "lock" => lock(),
            "url" => Attribute::required(AttributeType::String, "URL of the source.")
                .force_new()
                .validate(Validator::Url),
            "username" => Attribute::required(AttributeType::String, "The Prometheus username or other credential.")
                .force_new(),
            "password" => Attribute::required(AttributeType::String, "The Prometheus password or other credential.")
                .force_new()
                .sensitive(),
        });
        Block::new("Taikun showback credential", attributes)
    }

    fn observe(model: ShowbackCredential) -> ShowbackCredentialState {
        ShowbackCredentialState {
            id: id(model.id),
            name: string(model.name),
            organization_id: id(model.organization_id),
            organization_name: string(model.organization_name),
            lock: flag(model.is_locked),
            url: string(model.url),
            username: string(model.username),
            password: Value::Null,
            created_by: text(model.created_by),
            last_modified: text(model.last_modified),
            last_modified_by: text(model.last_modified_by),
        }
    }

    async fn create(cx: &Context<'_>, planned: &ShowbackCredentialState) -> ProviderResult<String> {
        let created: Created = cx
            .showback_credentials()
            .create(&CreateShowbackCredentialCommand {
                name: required(&planned.name, "name")?.to_string(),
                url: required(&planned.url, "url")?.to_string(),
                username: required(&planned.username, "username")?.to_string(),
                password: required(&planned.password, "password")?.to_string(),
                organization_id: ids::reference(&planned.organization_id)?,
            })
            .send()
            .await?;
        Ok(created.id.to_string())
    }

    async fn update(
        cx: &Context<'_>,
        id: &str,
        prior: &ShowbackCredentialState,
        planned: &ShowbackCredentialState,
    ) -> ProviderResult<()> {
        rename::<ShowbackCredential>(cx, id, &prior.name, &planned.name).await
    }

    async fn set_lock(cx: &Context<'_>, id: &str, lock: bool) -> ProviderResult<()> {
        lock_model::<ShowbackCredential>(cx, id, lock).await
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShowbackRuleState {
    pub id: ValueString,
    pub name: ValueString,
    pub organization_id: ValueString,
    pub organization_name: ValueString,
    pub metric_name: ValueString,
    pub kind: ValueString,
    #[serde(rename = "type")]
    pub rule_type: ValueString,
    pub price: ValueFloat,
    pub global_alert_limit: ValueNumber,
    pub project_alert_limit: ValueNumber,
    pub showback_credential_id: ValueString,
    pub showback_credential_name: ValueString,
    pub created_by: ValueString,
    pub last_modified: ValueString,
    pub last_modified_by: ValueString,
    pub label: ValueList<LabelState>,
}

const EXTERNAL: &str = "External";

impl ShowbackRuleState {
    fn command(&self) -> ProviderResult<ShowbackRuleCommand> {
        Ok(ShowbackRuleCommand {
            name: required(&self.name, "name")?.to_string(),
            metric_name: required(&self.metric_name, "metric_name")?.to_string(),
            kind: required(&self.kind, "kind")?.to_string(),
            rule_type: required(&self.rule_type, "type")?.to_string(),
            price: self.price.clone().unwrap_or_default(),
            global_alert_limit: self.global_alert_limit.clone().unwrap_or_default(),
            project_alert_limit: self.project_alert_limit.clone().unwrap_or_default(),
            showback_credential_id: ids::reference(&self.showback_credential_id)?,
            organization_id: None,
            labels: LabelState::commands(&self.label)?,
        })
    }
}

pub struct ShowbackRuleKind;

#[async_trait]
impl Kind for ShowbackRuleKind {
    const TYPE_NAME: &'static str = "showback_rule";
    const PLURAL: Option<&'static str> = Some("showback_rules");

    type State = ShowbackRuleState;
    type Model = ShowbackRule;

    fn schema() -> Block {
        let mut attributes = audited(scoped("showback rule"));
        attributes.extend(map! {
            "name" => name("The name of the showback rule."),
            "metric_name" => Attribute::required(AttributeType::String, "The metric name."),
            "kind" => Attribute::required(AttributeType::String, "The kind of showback rule: `General` or `External`.")
                .validate(Validator::OneOf(&["General", "External"])),
            "type" => Attribute::required(AttributeType::String, "The type of showback rule: `Count` or `Sum`.")
                .validate(Validator::OneOf(&["Count", "Sum"])),
            "price" => Attribute::required(AttributeType::Number, "Billing in CZK per selected unit.")
                .validate(Validator::FloatBetween(0.0, f64::MAX)),
            "global_alert_limit" => Attribute::optional(AttributeType::Number, "Set limit of alerts for all projects.")
                .default_value(0i64),
            "project_alert_limit" => Attribute::optional(AttributeType::Number, "Set limit of alerts for one project.")
                .default_value(0i64),
            "showback_credential_id" => reference("ID of the showback credential, for `External` rules.")
                .force_new(),
            "showback_credential_name" => Attribute::computed(AttributeType::String, "Name of the showback credential."),
        });
        Block::new("Taikun showback rule", attributes).with_block("label", LabelState::block())
    }

    fn check(state: &ShowbackRuleState, diags: &mut Diagnostics) {
        let Some(kind) = state.kind.as_ref_option() else {
            return;
        };
        let credential = !state.showback_credential_id.is_null();
        let path = AttributePath::new("showback_credential_id");
        if kind == EXTERNAL && !credential {
            diags.error(
                "Missing showback credential",
                "External showback rules need a showback_credential_id",
                path,
            );
        } else if kind != EXTERNAL && credential && !state.showback_credential_id.is_unknown() {
            diags.error(
                "Unexpected showback credential",
                "General showback rules cannot have a showback_credential_id",
                path,
            );
        }
    }

    fn observe(model: ShowbackRule) -> ShowbackRuleState {
        ShowbackRuleState {
            id: id(model.id),
            name: string(model.name),
            organization_id: id(model.organization_id),
            organization_name: string(model.organization_name),
            metric_name: string(model.metric_name),
            kind: string(model.kind),
            rule_type: string(model.rule_type),
            price: float(model.price),
            global_alert_limit: number(model.global_alert_limit),
            project_alert_limit: number(model.project_alert_limit),
            showback_credential_id: opt_id(model.showback_credential_id),
            showback_credential_name: text(model.showback_credential_name),
            created_by: text(model.created_by),
            last_modified: text(model.last_modified),
            last_modified_by: text(model.last_modified_by),
            label: LabelState::observe(model.labels),
        }
    }

    async fn create(cx: &Context<'_>, planned: &ShowbackRuleState) -> ProviderResult<String> {
        let command = ShowbackRuleCommand {
            organization_id: ids::reference(&planned.organization_id)?,
            ..planned.command()?
        };
        let created: Created = cx.showback_rules().create(&command).send().await?;
        Ok(created.id.to_string())
    }

    async fn update(
        cx: &Context<'_>,
        id: &str,
        prior: &ShowbackRuleState,
        planned: &ShowbackRuleState,
    ) -> ProviderResult<()> {
        let command = planned.command()?;
        if prior.command().ok().as_ref() == Some(&command) {
            return Ok(());
        }
        cx.showback_rules()
            .update(ids::numeric(id)?, &command)
            .execute()
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(kind: &str, credential: Option<&str>) -> bool {
        let mut diags = Diagnostics::default();
        ShowbackRuleKind::check(
            &ShowbackRuleState {
                kind: kind.into(),
                showback_credential_id: credential.map(str::to_string).into(),
                ..Default::default()
            },
            &mut diags,
        );
        diags.has_errors()
    }

    #[test]
    fn credential_follows_the_kind() {
        assert!(!check("External", Some("3")));
        assert!(check("External", None));
        assert!(!check("General", None));
        assert!(check("General", Some("3")));
    }
}
