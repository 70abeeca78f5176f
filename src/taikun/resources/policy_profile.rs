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
    models::{PolicyProfile, PolicyProfileCommand},
    Created,
};

use super::{elements, enabled, flag, id, lock, name, required, scoped, string};
use crate::{
    map,
    taikun::{
        error::ProviderResult,
        ids,
        kind::{lock_model, Kind},
        session::Context,
    },
    Attribute, AttributeType, Block, DiffSuppress, Value, ValueBool, ValueList, ValueString,
};

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyProfileState {
    pub id: ValueString,
    pub name: ValueString,
    pub organization_id: ValueString,
    pub organization_name: ValueString,
    pub lock: ValueBool,
    pub is_default: ValueBool,
    pub forbid_node_port: ValueBool,
    pub forbid_http_ingress: ValueBool,
    pub require_probe: ValueBool,
    pub unique_ingress: ValueBool,
    pub unique_service_selector: ValueBool,
    pub allowed_repos: ValueList<String>,
    pub forbid_specific_tags: ValueList<String>,
    pub ingress_whitelist: ValueList<String>,
}

impl PolicyProfileState {
    fn command(&self) -> ProviderResult<PolicyProfileCommand> {
        let list = |list: &ValueList<String>| elements(list).to_vec();
        Ok(PolicyProfileCommand {
            name: required(&self.name, "name")?.to_string(),
            organization_id: None,
            forbid_node_port: enabled(&self.forbid_node_port),
            forbid_http_ingress: enabled(&self.forbid_http_ingress),
            require_probe: enabled(&self.require_probe),
            unique_ingresses: enabled(&self.unique_ingress),
            unique_service_selector: enabled(&self.unique_service_selector),
            allowed_repo: list(&self.allowed_repos),
            forbid_specific_tags: list(&self.forbid_specific_tags),
            ingress_whitelist: list(&self.ingress_whitelist),
        })
    }
}

fn policy(description: &str) -> Attribute {
    Attribute::optional(AttributeType::Bool, description).default_value(false)
}

fn patterns(description: &str) -> Attribute {
    Attribute::optional(AttributeType::set_of_strings(), description)
        .suppress(DiffSuppress::EmptyEqualsNull)
}

pub struct PolicyProfileKind;

#[async_trait]
impl Kind for PolicyProfileKind {
    const TYPE_NAME: &'static str = "policy_profile";
    const PLURAL: Option<&'static str> = Some("policy_profiles");

    type State = PolicyProfileState;
    type Model = PolicyProfile;

    fn schema() -> Block {
        let mut attributes = scoped("policy profile");
        attributes.extend(map! {
            "name" => name("The name of the policy profile."),
            "lock" => lock(),
            "is_default" => Attribute::computed(AttributeType::Bool, "Indicates whether the policy profile is the default one."),
            "forbid_node_port" => policy("Requires that services are not of type NodePort."),
            "forbid_http_ingress" => policy("Requires Ingress resources to be HTTPS only."),
            "require_probe" => policy("Requires Pods to have readiness and liveness probes."),
            "unique_ingress" => policy("Requires all Ingress rule hosts to be unique."),
            "unique_service_selector" => policy("Whether services must have globally unique service selectors or not."),
            "allowed_repos" => patterns("Requires container images to begin with a string from the specified list."),
            "forbid_specific_tags" => patterns("Container images must have an image tag different from the ones in the list."),
            "ingress_whitelist" => patterns("List of allowed Ingress IP addresses."),
        });
        Block::new("Taikun policy profile", attributes)
    }

    fn observe(model: PolicyProfile) -> PolicyProfileState {
        PolicyProfileState {
            id: id(model.id),
            name: string(model.name),
            organization_id: id(model.organization_id),
            organization_name: string(model.organization_name),
            lock: flag(model.is_locked),
            is_default: flag(model.is_default),
            forbid_node_port: flag(model.forbid_node_port),
            forbid_http_ingress: flag(model.forbid_http_ingress),
            require_probe: flag(model.require_probe),
            unique_ingress: flag(model.unique_ingresses),
            unique_service_selector: flag(model.unique_service_selector),
            allowed_repos: Value::Value(model.allowed_repo),
            forbid_specific_tags: Value::Value(model.forbid_specific_tags),
            ingress_whitelist: Value::Value(model.ingress_whitelist),
        }
    }

    async fn create(cx: &Context<'_>, planned: &PolicyProfileState) -> ProviderResult<String> {
        let command = PolicyProfileCommand {
            organization_id: ids::reference(&planned.organization_id)?,
            ..planned.command()?
        };
        let created: Created = cx.policy_profiles().create(&command).send().await?;
        Ok(created.id.to_string())
    }

    async fn update(
        cx: &Context<'_>,
        id: &str,
        prior: &PolicyProfileState,
        planned: &PolicyProfileState,
    ) -> ProviderResult<()> {
        let command = planned.command()?;
        let unordered = |a: &[String], b: &[String]| {
            a.len() == b.len() && a.iter().all(|x| b.contains(x))
        };
        let same = prior.command().is_ok_and(|before| {
            before.name == command.name
                && before.forbid_node_port == command.forbid_node_port
                && before.forbid_http_ingress == command.forbid_http_ingress
                && before.require_probe == command.require_probe
                && before.unique_ingresses == command.unique_ingresses
                && before.unique_service_selector == command.unique_service_selector
                && unordered(&before.allowed_repo, &command.allowed_repo)
                && unordered(&before.forbid_specific_tags, &command.forbid_specific_tags)
                && unordered(&before.ingress_whitelist, &command.ingress_whitelist)
        });
        if same {
            return Ok(());
        }
        cx.policy_profiles()
            .update(ids::numeric(id)?, &command)
            .execute()
            .await?;
        Ok(())
    }

    async fn set_lock(cx: &Context<'_>, id: &str, lock: bool) -> ProviderResult<()> {
        lock_model::<PolicyProfile>(cx, id, lock).await
    }
}
