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
    models::{CreateKubernetesProfileCommand, KubernetesProfile},
    Created,
};

use super::{audited, enabled, flag, id, lock, name, rename, required, scoped, string, text};
use crate::{
    map,
    taikun::{
        error::ProviderResult,
        ids,
        kind::{lock_model, Kind},
        session::Context,
    },
    Attribute, AttributeType, Block, Validator, ValueBool, ValueString,
};

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KubernetesProfileState {
    pub id: ValueString,
    pub name: ValueString,
    pub organization_id: ValueString,
    pub organization_name: ValueString,
    pub lock: ValueBool,
    pub cni: ValueString,
    pub load_balancing_solution: ValueString,
    pub bastion_proxy: ValueBool,
    pub schedule_on_master: ValueBool,
    pub unique_cluster_name: ValueBool,
    pub nvidia_gpu_operator: ValueBool,
    pub created_by: ValueString,
    pub last_modified: ValueString,
    pub last_modified_by: ValueString,
}

const OCTAVIA: &str = "Octavia";
const TAIKUN: &str = "Taikun";

fn flag_attribute(description: &str) -> Attribute {
    Attribute::optional(AttributeType::Bool, description)
        .default_value(false)
        .force_new()
}

pub struct KubernetesProfileKind;

#[async_trait]
impl Kind for KubernetesProfileKind {
    const TYPE_NAME: &'static str = "kubernetes_profile";
    const PLURAL: Option<&'static str> = Some("kubernetes_profiles");

    type State = KubernetesProfileState;
    type Model = KubernetesProfile;

    fn schema() -> Block {
        let mut attributes = audited(scoped("Kubernetes profile"));
        attributes.extend(map! {
            "name" => name("The name of the Kubernetes profile."),
            "lock" => lock(),
            "cni" => Attribute::computed(AttributeType::String, "Container Network Interface (CNI) of the Kubernetes profile."),
            "load_balancing_solution" => Attribute::optional(
                AttributeType::String,
                "Load-balancing solution: `None`, `Octavia` or `Taikun`. `Octavia` and `Taikun` are only available for OpenStack cloud.",
            )
            .default_value("Octavia")
            .force_new()
            .validate(Validator::OneOf(&["None", "Octavia", "Taikun"])),
            "bastion_proxy" => flag_attribute("Whether to expose the Service on each Node's IP at a static port, the NodePort."),
            "schedule_on_master" => flag_attribute("When enabled, the scheduler can place pods on master nodes."),
            "unique_cluster_name" => flag_attribute("If not enabled, the cluster name will be cluster.local."),
            "nvidia_gpu_operator" => flag_attribute("Whether to deploy the NVIDIA GPU operator."),
        });
        Block::new("Taikun Kubernetes profile", attributes)
    }

    fn observe(model: KubernetesProfile) -> KubernetesProfileState {
        let solution = if model.octavia_enabled {
            OCTAVIA
        } else if model.taikun_lb_enabled {
            TAIKUN
        } else {
            "None"
        };
        KubernetesProfileState {
            id: id(model.id),
            name: string(model.name),
            organization_id: id(model.organization_id),
            organization_name: string(model.organization_name),
            lock: flag(model.is_locked),
            cni: text(model.cni),
            load_balancing_solution: string(solution.to_string()),
            bastion_proxy: flag(model.expose_node_port_on_bastion),
            schedule_on_master: flag(model.allow_scheduling_on_master),
            unique_cluster_name: flag(model.unique_cluster_name),
            nvidia_gpu_operator: flag(model.nvidia_gpu_operator_enabled),
            created_by: text(model.created_by),
            last_modified: text(model.last_modified),
            last_modified_by: text(model.last_modified_by),
        }
    }

    async fn create(cx: &Context<'_>, planned: &KubernetesProfileState) -> ProviderResult<String> {
        let solution = planned.load_balancing_solution.as_str();
        let created: Created = cx
            .kubernetes_profiles()
            .create(&CreateKubernetesProfileCommand {
                name: required(&planned.name, "name")?.to_string(),
                organization_id: ids::reference(&planned.organization_id)?,
                octavia_enabled: solution == OCTAVIA,
                taikun_lb_enabled: solution == TAIKUN,
                expose_node_port_on_bastion: enabled(&planned.bastion_proxy),
                allow_scheduling_on_master: enabled(&planned.schedule_on_master),
                unique_cluster_name: enabled(&planned.unique_cluster_name),
                nvidia_gpu_operator_enabled: enabled(&planned.nvidia_gpu_operator),
            })
            .send()
            .await?;
        Ok(created.id.to_string())
    }

    async fn update(
        cx: &Context<'_>,
        id: &str,
        prior: &KubernetesProfileState,
        planned: &KubernetesProfileState,
    ) -> ProviderResult<()> {
        rename::<KubernetesProfile>(cx, id, &prior.name, &planned.name).await
    }

    async fn set_lock(cx: &Context<'_>, id: &str, lock: bool) -> ProviderResult<()> {
        lock_model::<KubernetesProfile>(cx, id, lock).await
    }
}
