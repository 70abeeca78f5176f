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

//! Prometheus billing credentials and the rules pricing their metrics

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use taikun_client::{
    models::{
        BillingCredential, BillingRule, BillingRuleCommand, CreateBillingCredentialCommand,
        RuleLabel,
    },
    Created,
};

use super::{
    audited, elements, flag, float, id, lock, name, rename, required, required_id, scoped,
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
    Attribute, AttributeType, Block, NestedBlock, Validator, Value, ValueBool, ValueFloat,
    ValueList, ValueString,
};

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BillingCredentialState {
    pub id: ValueString,
    pub name: ValueString,
    pub organization_id: ValueString,
    pub organization_name: ValueString,
    pub lock: ValueBool,
    pub is_default: ValueBool,
    pub prometheus_url: ValueString,
    pub prometheus_username: ValueString,
    pub prometheus_password: ValueString,
    pub created_by: ValueString,
    pub last_modified: ValueString,
    pub last_modified_by: ValueString,
}

pub struct BillingCredentialKind;

#[async_trait]
impl Kind for BillingCredentialKind {
    const TYPE_NAME: &'static str = "billing_credential";
    const PLURAL: Option<&'static str> = Some("billing_credentials");

    type State = BillingCredentialState;
    type Model = BillingCredential;

    fn schema() -> Block {
        let mut attributes = audited(scoped("billing credential"));
        attributes.extend(map! {
            "name" => name("The name of the billing credential."),
            "lock" => lock(),
            "is_default" => Attribute::computed(AttributeType::Bool, "Indicates whether the billing credential is the organization's default."),
            "prometheus_url" => Attribute::required(AttributeType::String, "The Prometheus URL.")
                .force_new()
                .validate(Validator::Url),
            "prometheus_username" => Attribute::required(AttributeType::String, "The Prometheus username.")
                .force_new(),
            "prometheus_password" => Attribute::required(AttributeType::String, "The Prometheus password.")
                .force_new()
                .sensitive(),
        });
        Block::new("Taikun billing credential", attributes)
    }

    fn observe(model: BillingCredential) -> BillingCredentialState {
        BillingCredentialState {
            id: id(model.id),
            name: string(model.name),
            organization_id: id(model.organization_id),
            organization_name: string(model.organization_name),
            lock: flag(model.is_locked),
            is_default: flag(model.is_default),
            prometheus_url: string(model.prometheus_url),
            prometheus_username: string(model.prometheus_username),
            prometheus_password: Value::Null,
            created_by: text(model.created_by),
            last_modified: text(model.last_modified),
            last_modified_by: text(model.last_modified_by),
        }
    }

    async fn create(cx: &Context<'_>, planned: &BillingCredentialState) -> ProviderResult<String> {
        let created: Created = cx
            .billing_credentials()
            .create(&CreateBillingCredentialCommand {
                name: required(&planned.name, "name")?.to_string(),
                prometheus_url: required(&planned.prometheus_url, "prometheus_url")?.to_string(),
                prometheus_username: required(&planned.prometheus_username, "prometheus_username")?
                    .to_string(),
                prometheus_password: required(&planned.prometheus_password, "prometheus_password")?
                    .to_string(),
                organization_id: ids::reference(&planned.organization_id)?,
            })
            .send()
            .await?;
        Ok(created.id.to_string())
    }

    async fn update(
        cx: &Context<'_>,
        id: &str,
        prior: &BillingCredentialState,
        planned: &BillingCredentialState,
    ) -> ProviderResult<()> {
        rename::<BillingCredential>(cx, id, &prior.name, &planned.name).await
    }

    async fn set_lock(cx: &Context<'_>, id: &str, lock: bool) -> ProviderResult<()> {
        lock_model::<BillingCredential>(cx, id, lock).await
    }
}

/// Prometheus label a rule matches on
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelState {
    pub id: ValueString,
    pub label: ValueString,
    pub value: ValueString,
}

impl LabelState {
    pub(crate) fn block() -> NestedBlock {
        NestedBlock::List(Block::new(
            "Labels linked to the billing rule.",
            map! {
                "id" => Attribute::computed(AttributeType::String, "ID of the label."),
                "label" => Attribute::required(AttributeType::String, "Label name."),
                "value" => Attribute::required(AttributeType::String, "Label value."),
            },
        ))
    }

    pub(crate) fn observe(labels: Vec<RuleLabel>) -> ValueList<Self> {
        Value::Value(
            labels
                .into_iter()
                .map(|label| Self {
                    id: id(label.id),
                    label: string(label.label),
                    value: string(label.value),
                })
                .collect(),
        )
    }

    pub(crate) fn commands(labels: &ValueList<Self>) -> ProviderResult<Vec<RuleLabel>> {
        elements(labels)
            .iter()
            .map(|label| {
                Ok(RuleLabel {
                    id: 0,
                    label: required(&label.label, "label")?.to_string(),
                    value: required(&label.value, "value")?.to_string(),
                })
            })
            .collect()
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BillingRuleState {
    pub id: ValueString,
    pub name: ValueString,
    pub metric_name: ValueString,
    #[serde(rename = "type")]
    pub rule_type: ValueString,
    pub price: ValueFloat,
    pub billing_credential_id: ValueString,
    pub created_by: ValueString,
    pub last_modified: ValueString,
    pub last_modified_by: ValueString,
    pub label: ValueList<LabelState>,
}

impl BillingRuleState {
    fn command(&self) -> ProviderResult<BillingRuleCommand> {
        Ok(BillingRuleCommand {
            name: required(&self.name, "name")?.to_string(),
            metric_name: required(&self.metric_name, "metric_name")?.to_string(),
            rule_type: required(&self.rule_type, "type")?.to_string(),
            price: self.price.clone().unwrap_or_default(),
            operation_credential_id: required_id(
                &self.billing_credential_id,
                "billing_credential_id",
            )?,
            labels: LabelState::commands(&self.label)?,
        })
    }
}

pub struct BillingRuleKind;

#[async_trait]
impl Kind for BillingRuleKind {
    const TYPE_NAME: &'static str = "billing_rule";
    const PLURAL: Option<&'static str> = Some("billing_rules");

    type State = BillingRuleState;
    type Model = BillingRule;

    fn schema() -> Block {
        Block::new(
            "Taikun billing rule",
            audited(map! {
                "id" => Attribute::computed(AttributeType::String, "The billing rule ID."),
                "name" => name("The name of the billing rule."),
                "metric_name" => Attribute::required(AttributeType::String, "The name of the Prometheus metric to bill."),
                "type" => Attribute::required(AttributeType::String, "The type of billing rule: `Count` or `Sum`.")
                    .validate(Validator::OneOf(&["Count", "Sum"])),
                "price" => Attribute::required(AttributeType::Number, "The price in CZK per selected unit.")
                    .validate(Validator::FloatBetween(0.0, f64::MAX)),
                "billing_credential_id" => Attribute::required(AttributeType::String, "The ID of the billing credential.")
                    .force_new()
                    .validate(Validator::NumericId),
            }),
        )
        .with_block("label", LabelState::block())
    }

    fn observe(model: BillingRule) -> BillingRuleState {
        BillingRuleState {
            id: id(model.id),
            name: string(model.name),
            metric_name: string(model.metric_name),
            rule_type: string(model.rule_type),
            price: float(model.price),
            billing_credential_id: id(model.operation_credential_id),
            created_by: text(model.created_by),
            last_modified: text(model.last_modified),
            last_modified_by: text(model.last_modified_by),
            label: LabelState::observe(model.labels),
        }
    }

    async fn create(cx: &Context<'_>, planned: &BillingRuleState) -> ProviderResult<String> {
        let created: Created = cx
            .billing_rules()
            .create(&planned.command()?)
            .send()
            .await?;
        Ok(created.id.to_string())
    }

    async fn update(
        cx: &Context<'_>,
        id: &str,
        prior: &BillingRuleState,
        planned: &BillingRuleState,
    ) -> ProviderResult<()> {
        let command = planned.command()?;
        if prior.command().ok().as_ref() == Some(&command) {
            return Ok(());
        }
        cx.billing_rules()
            .update(ids::numeric(id)?, &command)
            .execute()
            .await?;
        Ok(())
    }
}
