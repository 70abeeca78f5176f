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

//! Kubernetes and standalone VM projects
//!
//! Creation only sends what the upstream accepts in its create call. Everything else is
//! reconciled by [`ProjectKind::update`] in a fixed order, the same for creations and updates:
//! flavors, images, alerting profile, backup, policy profile, monitoring, expiration, quotas,
//! kubernetes nodes, VMs and the autoscaler last.

mod nodes;
mod vms;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use taikun_client::{
    models::{
        AttachAlertingProfileCommand, Autoscaler, BindFlavorsCommand, BindImagesCommand,
        CreateProjectCommand, EditAutoscalerCommand, EnableAutoscalerCommand, EnablePolicyCommand,
        ExtendProjectCommand, KeyValue, Project, ProjectBackupCommand, ProjectIdCommand,
        ProjectQuota, UnbindCommand, UpdateQuotaCommand,
    },
    Created, Method,
};
use time::{format_description::well_known::Rfc3339, macros::format_description, OffsetDateTime};
use tracing::{debug, info};

pub use nodes::ServerState;
pub use vms::{DiskState, VmState};

use super::{
    elements, enabled, flag, id, lock, name, opt_id, optional, reference, required, required_id,
    scoped, string, text,
};
use crate::{
    map,
    taikun::{
        error::{ProviderError, ProviderResult},
        ids,
        kind::{lock_model, Kind},
        session::{Context, Operation},
        steps::Steps,
    },
    validators::parse_date,
    Attribute, AttributePath, AttributeType, Block, Diagnostics, DiffSuppress, NestedBlock,
    Validator, Value, ValueBool, ValueFloat, ValueList, ValueNumber, ValueString,
};

/// Key/value pair of node labels and VM tags
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyValueState {
    pub key: ValueString,
    pub value: ValueString,
}

impl KeyValueState {
    pub(crate) fn block(description: &str) -> NestedBlock {
        NestedBlock::Set(Block::new(
            description,
            map! {
                "key" => Attribute::required(AttributeType::String, "Key."),
                "value" => Attribute::required(AttributeType::String, "Value."),
            },
        ))
    }

    pub(crate) fn observe(pairs: Vec<KeyValue>) -> ValueList<Self> {
        Value::Value(
            pairs
                .into_iter()
                .map(|pair| Self {
                    key: string(pair.key),
                    value: string(pair.value),
                })
                .collect(),
        )
    }

    pub(crate) fn commands(pairs: &ValueList<Self>) -> ProviderResult<Vec<KeyValue>> {
        elements(pairs)
            .iter()
            .map(|pair| {
                Ok(KeyValue {
                    key: required(&pair.key, "key")?.to_string(),
                    value: required(&pair.value, "value")?.to_string(),
                })
            })
            .collect()
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectState {
    pub id: ValueString,
    pub name: ValueString,
    pub organization_id: ValueString,
    pub organization_name: ValueString,
    pub lock: ValueBool,
    pub status: ValueString,
    pub health: ValueString,
    pub access_ip: ValueString,
    pub cloud_type: ValueString,
    pub cloud_credential_id: ValueString,
    pub kubernetes_profile_id: ValueString,
    pub access_profile_id: ValueString,
    pub alerting_profile_id: ValueString,
    pub alerting_profile_name: ValueString,
    pub backup_credential_id: ValueString,
    pub policy_profile_id: ValueString,
    pub monitoring: ValueBool,
    pub auto_upgrade: ValueBool,
    pub expiration_date: ValueString,
    pub kubernetes_version: ValueString,
    pub quota_cpu_units: ValueNumber,
    pub quota_ram_size: ValueNumber,
    pub quota_disk_size: ValueNumber,
    pub quota_vm_cpu_units: ValueNumber,
    pub quota_vm_ram_size: ValueNumber,
    pub quota_vm_volume_size: ValueNumber,
    pub flavors: ValueList<String>,
    pub images: ValueList<String>,
    pub autoscaler_name: ValueString,
    pub autoscaler_flavor: ValueString,
    pub autoscaler_min_size: ValueNumber,
    pub autoscaler_max_size: ValueNumber,
    pub autoscaler_disk_size: ValueNumber,
    pub autoscaler_spot_enabled: ValueBool,
    pub spot_full: ValueBool,
    pub spot_worker: ValueBool,
    pub spot_vms: ValueBool,
    pub spot_max_price: ValueFloat,
    pub router_id_start_range: ValueNumber,
    pub router_id_end_range: ValueNumber,
    pub taikun_lb_flavor: ValueString,
    pub server_bastion: ValueList<ServerState>,
    pub server_kubemaster: ValueList<ServerState>,
    pub server_kubeworker: ValueList<ServerState>,
    pub vm: ValueList<VmState>,
}

impl ProjectState {
    fn quota(&self) -> ProjectQuota {
        let known = |value: &ValueNumber| value.as_ref_option().copied();
        ProjectQuota {
            server_cpu: known(&self.quota_cpu_units),
            server_ram: known(&self.quota_ram_size),
            server_disk_size: known(&self.quota_disk_size),
            vm_cpu: known(&self.quota_vm_cpu_units),
            vm_ram: known(&self.quota_vm_ram_size),
            vm_volume_size: known(&self.quota_vm_volume_size),
        }
    }

    fn autoscaler(&self) -> Option<Autoscaler> {
        Some(Autoscaler {
            name: self.autoscaler_name.as_ref_option()?.clone(),
            flavor: self.autoscaler_flavor.as_ref_option()?.clone(),
            min_size: *self.autoscaler_min_size.as_ref_option()?,
            max_size: *self.autoscaler_max_size.as_ref_option()?,
            disk_size: self.autoscaler_disk_size.as_ref_option().copied().unwrap_or(30),
            spot_enabled: enabled(&self.autoscaler_spot_enabled),
        })
    }
}

const AUTOSCALER: [&str; 4] = [
    "autoscaler_name",
    "autoscaler_flavor",
    "autoscaler_min_size",
    "autoscaler_max_size",
];

/// `dd/mm/yyyy` of an RFC 3339 instant
fn expiration(expired_at: Option<String>) -> ValueString {
    let Some(raw) = expired_at.filter(|raw| !raw.is_empty()) else {
        return Value::Null;
    };
    OffsetDateTime::parse(&raw, &Rfc3339)
        .ok()
        .and_then(|at| at.date().format(format_description!("[day]/[month]/[year]")).ok())
        .unwrap_or(raw)
        .into()
}

/// RFC 3339 midnight UTC of a `dd/mm/yyyy` date
fn expire_at(date: &ValueString) -> ProviderResult<Option<String>> {
    let Some(date) = optional(date) else {
        return Ok(None);
    };
    let date = parse_date(&date).map_err(ProviderError::ConfigInvalid)?;
    date.midnight()
        .assume_utc()
        .format(&Rfc3339)
        .map(Some)
        .map_err(|err| ProviderError::ConfigInvalid(err.to_string()))
}

/// `POST {collection}/commit`: apply the pending node or VM changes
async fn commit(cx: &Context<'_>, project_id: i64, collection: &str) -> ProviderResult<()> {
    info!(project_id, collection, "committing project changes");
    cx.request(Method::POST, format!("{collection}/commit"))
        .json(&ProjectIdCommand { project_id })
        .execute()
        .await?;
    Ok(())
}

/// Wait until the upstream reports the project ready; a failed commit stops the wait
async fn wait_ready(cx: &Context<'_>, project_id: i64) -> ProviderResult<()> {
    let what = format!("project {project_id} to be ready");
    cx.envelope(Operation::Update)
        .retry(&what, || async {
            let project = cx
                .projects()
                .get(project_id)
                .await?
                .ok_or_else(|| ProviderError::NotFound(format!("project {project_id}")))?;
            debug!(project_id, status = %project.status, "project status");
            match project.status.as_str() {
                Project::READY => Ok(()),
                Project::FAILURE => Err(ProviderError::UpstreamRejected {
                    status: None,
                    message: format!("project {project_id} failed to apply its changes"),
                }),
                _ => Err(ProviderError::EventuallyConsistentMiss(what.clone())),
            }
        })
        .await
}

async fn current(cx: &Context<'_>, project_id: i64) -> ProviderResult<Project> {
    cx.projects()
        .get(project_id)
        .await?
        .ok_or_else(|| ProviderError::NotFound(format!("project {project_id}")))
}

fn changed<T: PartialEq>(prior: &Value<T>, planned: &Value<T>) -> bool {
    planned.is_value() && prior != planned
}

fn same_set(prior: &ValueList<String>, planned: &ValueList<String>) -> bool {
    let (prior, planned) = (elements(prior), elements(planned));
    prior.len() == planned.len() && planned.iter().all(|name| prior.contains(name))
}

async fn sync_flavors(
    cx: &Context<'_>,
    project_id: i64,
    prior: &ProjectState,
    planned: &ProjectState,
) -> ProviderResult<()> {
    let (removed, added) = super::diff(
        elements(&prior.flavors),
        elements(&planned.flavors),
        |f| f.clone(),
    );
    if !removed.is_empty() {
        let ids = current(cx, project_id)
            .await?
            .flavors
            .into_iter()
            .filter(|bound| removed.contains(&&bound.name))
            .map(|bound| bound.id)
            .collect();
        cx.flavors()
            .action("unbind", &UnbindCommand { project_id, ids })
            .execute()
            .await?;
    }
    if !added.is_empty() {
        cx.flavors()
            .action(
                "bind",
                &BindFlavorsCommand {
                    project_id,
                    flavors: added.into_iter().cloned().collect(),
                },
            )
            .execute()
            .await?;
    }
    Ok(())
}

async fn sync_images(
    cx: &Context<'_>,
    project_id: i64,
    prior: &ProjectState,
    planned: &ProjectState,
) -> ProviderResult<()> {
    let (removed, added) = super::diff(
        elements(&prior.images),
        elements(&planned.images),
        |i| i.clone(),
    );
    if !removed.is_empty() {
        let ids = current(cx, project_id)
            .await?
            .images
            .into_iter()
            .filter(|bound| removed.contains(&&bound.image_id))
            .map(|bound| bound.id)
            .collect();
        cx.images()
            .action("unbind", &UnbindCommand { project_id, ids })
            .execute()
            .await?;
    }
    if !added.is_empty() {
        cx.images()
            .action(
                "bind",
                &BindImagesCommand {
                    project_id,
                    images: added.into_iter().cloned().collect(),
                },
            )
            .execute()
            .await?;
    }
    Ok(())
}

async fn sync_alerting(
    cx: &Context<'_>,
    project_id: i64,
    prior: Option<i64>,
    planned: Option<i64>,
) -> ProviderResult<()> {
    if prior.is_some() {
        cx.alerting_profiles()
            .action("detach", &ProjectIdCommand { project_id })
            .execute()
            .await?;
    }
    if let Some(alerting_profile_id) = planned {
        cx.alerting_profiles()
            .action(
                "attach",
                &AttachAlertingProfileCommand {
                    project_id,
                    alerting_profile_id,
                },
            )
            .execute()
            .await?;
    }
    Ok(())
}

async fn sync_backup(
    cx: &Context<'_>,
    project_id: i64,
    prior: Option<i64>,
    planned: Option<i64>,
) -> ProviderResult<()> {
    if let Some(s3_credential_id) = prior {
        cx.backup_policies()
            .action(
                "disable",
                &ProjectBackupCommand {
                    project_id,
                    s3_credential_id,
                },
            )
            .execute()
            .await?;
    }
    if let Some(s3_credential_id) = planned {
        cx.backup_policies()
            .action(
                "enable",
                &ProjectBackupCommand {
                    project_id,
                    s3_credential_id,
                },
            )
            .execute()
            .await?;
    }
    Ok(())
}

async fn sync_policy(
    cx: &Context<'_>,
    project_id: i64,
    prior: Option<i64>,
    planned: Option<i64>,
) -> ProviderResult<()> {
    if prior.is_some() {
        cx.policy_profiles()
            .action("disable", &ProjectIdCommand { project_id })
            .execute()
            .await?;
    }
    if let Some(opa_profile_id) = planned {
        cx.policy_profiles()
            .action(
                "enable",
                &EnablePolicyCommand {
                    project_id,
                    opa_profile_id,
                },
            )
            .execute()
            .await?;
    }
    Ok(())
}

async fn sync_autoscaler(
    cx: &Context<'_>,
    project_id: i64,
    prior: Option<Autoscaler>,
    planned: Option<Autoscaler>,
) -> ProviderResult<()> {
    let autoscaler = |action: &str| format!("autoscaler/{action}");
    match (prior, planned) {
        (Some(prior), Some(planned))
            if prior.name == planned.name
                && prior.flavor == planned.flavor
                && prior.disk_size == planned.disk_size
                && prior.spot_enabled == planned.spot_enabled =>
        {
            cx.projects()
                .action(
                    &autoscaler("edit"),
                    &EditAutoscalerCommand {
                        project_id,
                        min_size: planned.min_size,
                        max_size: planned.max_size,
                    },
                )
                .execute()
                .await?;
        }
        (prior, planned) => {
            if prior.is_some() {
                cx.projects()
                    .action(&autoscaler("disable"), &ProjectIdCommand { project_id })
                    .execute()
                    .await?;
            }
            if let Some(autoscaler_settings) = planned {
                cx.projects()
                    .action(
                        &autoscaler("enable"),
                        &EnableAutoscalerCommand {
                            project_id,
                            autoscaler: autoscaler_settings,
                        },
                    )
                    .execute()
                    .await?;
            }
        }
    }
    Ok(())
}

pub struct ProjectKind;

#[async_trait]
impl Kind for ProjectKind {
    const TYPE_NAME: &'static str = "project";
    const PLURAL: Option<&'static str> = Some("projects");

    type State = ProjectState;
    type Model = Project;

    fn schema() -> Block {
        let mut attributes = scoped("project");
        let number =
            |description: &str| Attribute::optional_computed(AttributeType::Number, description);
        let spot = |description: &str| {
            Attribute::optional(AttributeType::Bool, description)
                .default_value(false)
                .force_new()
        };
        attributes.extend(map! {
            "name" => name("The name of the project.").force_new(),
            "lock" => lock(),
            "status" => Attribute::computed(AttributeType::String, "Status of the project."),
            "health" => Attribute::computed(AttributeType::String, "Health of the project."),
            "access_ip" => Attribute::computed(AttributeType::String, "Public IP address of the bastion."),
            "cloud_type" => Attribute::computed(AttributeType::String, "Cloud type of the project's credential."),
            "cloud_credential_id" => Attribute::required(AttributeType::String, "ID of the cloud credential used to create the project's servers.")
                .force_new()
                .validate(Validator::NumericId),
            "kubernetes_profile_id" => Attribute::optional_computed(AttributeType::String, "ID of the project's kubernetes profile, by default the organization's default one.")
                .force_new()
                .validate(Validator::NumericId),
            "access_profile_id" => Attribute::optional_computed(AttributeType::String, "ID of the project's access profile, by default the organization's default one.")
                .force_new()
                .validate(Validator::NumericId),
            "alerting_profile_id" => reference("ID of the project's alerting profile."),
            "alerting_profile_name" => Attribute::computed(AttributeType::String, "Name of the project's alerting profile."),
            "backup_credential_id" => reference("ID of the backup credential. Backups are enabled when set."),
            "policy_profile_id" => reference("ID of the policy profile. Policies are enforced when set."),
            "monitoring" => Attribute::optional(AttributeType::Bool, "Kubernetes cluster monitoring.")
                .default_value(false),
            "auto_upgrade" => Attribute::optional(AttributeType::Bool, "Whether to upgrade the project's Kubernetes version automatically.")
                .default_value(false)
                .force_new(),
            "expiration_date" => Attribute::optional(AttributeType::String, "Project's expiration date in the format `dd/mm/yyyy`.")
                .validate(Validator::Date),
            "kubernetes_version" => Attribute::optional_computed(AttributeType::String, "Kubernetes version of the project.")
                .force_new(),
            "quota_cpu_units" => number("Maximum CPU units of the kubernetes servers."),
            "quota_ram_size" => number("Maximum RAM of the kubernetes servers, in GiB."),
            "quota_disk_size" => number("Maximum disk size of the kubernetes servers, in GiB."),
            "quota_vm_cpu_units" => number("Maximum CPU units of the standalone VMs."),
            "quota_vm_ram_size" => number("Maximum RAM of the standalone VMs, in GiB."),
            "quota_vm_volume_size" => number("Maximum volume size of the standalone VMs, in GiB."),
            "flavors" => Attribute::optional(AttributeType::set_of_strings(), "Flavors bound to the project.")
                .suppress(DiffSuppress::EmptyEqualsNull),
            "images" => Attribute::optional(AttributeType::set_of_strings(), "Images bound to the project.")
                .suppress(DiffSuppress::EmptyEqualsNull),
            "autoscaler_name" => Attribute::optional(AttributeType::String, "Name of the autoscaler group."),
            "autoscaler_flavor" => Attribute::optional(AttributeType::String, "Flavor of the autoscaled workers, bound in `flavors`."),
            "autoscaler_min_size" => Attribute::optional(AttributeType::Number, "Minimum number of autoscaled workers.")
                .validate(Validator::IntBetween(1, 1000)),
            "autoscaler_max_size" => Attribute::optional(AttributeType::Number, "Maximum number of autoscaled workers.")
                .validate(Validator::IntBetween(1, 1000)),
            "autoscaler_disk_size" => number("Disk size of the autoscaled workers, in GiB.")
                .validate(Validator::IntBetween(30, 8192)),
            "autoscaler_spot_enabled" => Attribute::optional_computed(AttributeType::Bool, "Whether the autoscaled workers are spot instances."),
            "spot_full" => spot("Whether every server of the project is a spot instance."),
            "spot_worker" => spot("Whether the workers are spot instances."),
            "spot_vms" => spot("Whether the standalone VMs are spot instances."),
            "spot_max_price" => Attribute::optional(AttributeType::Number, "Maximum spot price.")
                .force_new()
                .validate(Validator::FloatBetween(0.0, f64::MAX)),
            "router_id_start_range" => Attribute::optional(AttributeType::Number, "Start of the router ID range, for Taikun load balancers.")
                .force_new()
                .validate(Validator::IntBetween(1, 255)),
            "router_id_end_range" => Attribute::optional(AttributeType::Number, "End of the router ID range, for Taikun load balancers.")
                .force_new()
                .validate(Validator::IntBetween(1, 255)),
            "taikun_lb_flavor" => Attribute::optional(AttributeType::String, "Flavor of the Taikun load balancer.")
                .force_new(),
        });
        let mut block = Block::new("Taikun project", attributes);
        for (name, role) in nodes::ROLES {
            block = block.with_block(name, ServerState::block(role));
        }
        block.with_block("vm", VmState::block())
    }

    fn check(state: &ProjectState, diags: &mut Diagnostics) {
        nodes::check(state, diags);
        vms::check(state, diags);

        let set: Vec<_> = [
            state.autoscaler_name.is_null(),
            state.autoscaler_flavor.is_null(),
            state.autoscaler_min_size.is_null(),
            state.autoscaler_max_size.is_null(),
        ]
        .into_iter()
        .zip(AUTOSCALER)
        .collect();
        if set.iter().any(|(null, _)| *null) && set.iter().any(|(null, _)| !*null) {
            for (_, name) in set.iter().filter(|(null, _)| *null) {
                diags.error(
                    "Incomplete autoscaler",
                    format!("{name} is required with the other autoscaler attributes"),
                    AttributePath::new(*name),
                );
            }
        }
        if let (Some(min), Some(max)) = (
            state.autoscaler_min_size.as_ref_option(),
            state.autoscaler_max_size.as_ref_option(),
        ) {
            if min > max {
                diags.error(
                    "Invalid autoscaler range",
                    "autoscaler_min_size cannot exceed autoscaler_max_size",
                    AttributePath::new("autoscaler_min_size"),
                );
            }
        }
        if let (Some(flavor), Some(flavors)) = (
            state.autoscaler_flavor.as_ref_option(),
            state.flavors.as_ref_option(),
        ) {
            if !flavors.contains(flavor) {
                diags.error(
                    "Unbound flavor",
                    format!("Flavor {flavor:?} must be listed in flavors"),
                    AttributePath::new("autoscaler_flavor"),
                );
            }
        }
    }

    fn observe(model: Project) -> ProjectState {
        let autoscaler = model.autoscaler.clone();
        let mut servers: [Vec<ServerState>; 3] = Default::default();
        for server in model.servers {
            if let Some(slot) = nodes::ROLES
                .iter()
                .position(|(_, role)| *role == server.role)
            {
                servers[slot].push(ServerState::observe(server));
            }
        }
        let [bastion, kubemaster, kubeworker] = servers;
        let quota = model.quota;
        ProjectState {
            id: id(model.id),
            name: string(model.name),
            organization_id: id(model.organization_id),
            organization_name: string(model.organization_name),
            lock: flag(model.is_locked),
            status: string(model.status),
            health: text(model.health),
            access_ip: text(model.access_ip),
            cloud_type: text(model.cloud_type),
            cloud_credential_id: id(model.cloud_credential_id),
            kubernetes_profile_id: opt_id(model.kubernetes_profile_id),
            access_profile_id: opt_id(model.access_profile_id),
            alerting_profile_id: opt_id(model.alerting_profile_id),
            alerting_profile_name: text(model.alerting_profile_name),
            backup_credential_id: opt_id(
                model.s3_credential_id.filter(|_| model.is_backup_enabled),
            ),
            policy_profile_id: opt_id(model.opa_profile_id.filter(|_| model.is_opa_enabled)),
            monitoring: flag(model.is_monitoring_enabled),
            auto_upgrade: flag(model.is_auto_upgrade),
            expiration_date: expiration(model.expired_at),
            kubernetes_version: text(model.kubernetes_version),
            quota_cpu_units: quota.server_cpu.into(),
            quota_ram_size: quota.server_ram.into(),
            quota_disk_size: quota.server_disk_size.into(),
            quota_vm_cpu_units: quota.vm_cpu.into(),
            quota_vm_ram_size: quota.vm_ram.into(),
            quota_vm_volume_size: quota.vm_volume_size.into(),
            flavors: Value::Value(model.flavors.into_iter().map(|f| f.name).collect()),
            images: Value::Value(model.images.into_iter().map(|i| i.image_id).collect()),
            autoscaler_name: autoscaler.as_ref().map(|a| a.name.clone()).into(),
            autoscaler_flavor: autoscaler.as_ref().map(|a| a.flavor.clone()).into(),
            autoscaler_min_size: autoscaler.as_ref().map(|a| a.min_size).into(),
            autoscaler_max_size: autoscaler.as_ref().map(|a| a.max_size).into(),
            autoscaler_disk_size: autoscaler.as_ref().map(|a| a.disk_size).into(),
            autoscaler_spot_enabled: autoscaler.as_ref().map(|a| a.spot_enabled).into(),
            spot_full: flag(model.spot_full),
            spot_worker: flag(model.spot_worker),
            spot_vms: flag(model.spot_vms),
            spot_max_price: model.max_spot_price.into(),
            router_id_start_range: model.router_id_start_range.into(),
            router_id_end_range: model.router_id_end_range.into(),
            taikun_lb_flavor: text(model.taikun_lb_flavor),
            server_bastion: Value::Value(bastion),
            server_kubemaster: Value::Value(kubemaster),
            server_kubeworker: Value::Value(kubeworker),
            vm: Value::Value(model.vms.into_iter().map(VmState::observe).collect()),
        }
    }

    async fn create(cx: &Context<'_>, planned: &ProjectState) -> ProviderResult<String> {
        let command = CreateProjectCommand {
            name: required(&planned.name, "name")?.to_string(),
            organization_id: ids::reference(&planned.organization_id)?,
            cloud_credential_id: required_id(&planned.cloud_credential_id, "cloud_credential_id")?,
            kubernetes_profile_id: ids::reference(&planned.kubernetes_profile_id)?,
            access_profile_id: ids::reference(&planned.access_profile_id)?,
            is_auto_upgrade: enabled(&planned.auto_upgrade),
            kubernetes_version: optional(&planned.kubernetes_version),
            spot_full: enabled(&planned.spot_full),
            spot_worker: enabled(&planned.spot_worker),
            spot_vms: enabled(&planned.spot_vms),
            max_spot_price: planned.spot_max_price.as_ref_option().copied(),
            router_id_start_range: planned.router_id_start_range.as_ref_option().copied(),
            router_id_end_range: planned.router_id_end_range.as_ref_option().copied(),
            taikun_lb_flavor: optional(&planned.taikun_lb_flavor),
        };
        let created: Created = cx.projects().create(&command).send().await?;
        Ok(created.id.to_string())
    }

    async fn update(
        cx: &Context<'_>,
        id: &str,
        prior: &ProjectState,
        planned: &ProjectState,
    ) -> ProviderResult<()> {
        let project_id = ids::numeric(id)?;
        let reference = |value: &ValueString| ids::reference(value);
        let mut steps = Steps::new();

        steps
            .run_if(
                planned.flavors.is_value() && !same_set(&prior.flavors, &planned.flavors),
                "flavors",
                sync_flavors(cx, project_id, prior, planned),
            )
            .await?;
        steps
            .run_if(
                planned.images.is_value() && !same_set(&prior.images, &planned.images),
                "images",
                sync_images(cx, project_id, prior, planned),
            )
            .await?;

        let (old, new) = (
            reference(&prior.alerting_profile_id)?,
            reference(&planned.alerting_profile_id)?,
        );
        steps
            .run_if(old != new, "alerting profile", sync_alerting(cx, project_id, old, new))
            .await?;
        let (old, new) = (
            reference(&prior.backup_credential_id)?,
            reference(&planned.backup_credential_id)?,
        );
        steps
            .run_if(old != new, "backup", sync_backup(cx, project_id, old, new))
            .await?;
        let (old, new) = (
            reference(&prior.policy_profile_id)?,
            reference(&planned.policy_profile_id)?,
        );
        steps
            .run_if(old != new, "policy profile", sync_policy(cx, project_id, old, new))
            .await?;

        steps
            .run_if(
                enabled(&prior.monitoring) != enabled(&planned.monitoring),
                "monitoring",
                async {
                    cx.projects()
                        .action("monitoring", &ProjectIdCommand { project_id })
                        .execute()
                        .await?;
                    Ok(())
                },
            )
            .await?;

        steps
            .run_if(
                optional(&prior.expiration_date) != optional(&planned.expiration_date),
                "expiration",
                async {
                    cx.projects()
                        .action(
                            "extend",
                            &ExtendProjectCommand {
                                project_id,
                                expire_at: expire_at(&planned.expiration_date)?,
                            },
                        )
                        .execute()
                        .await?;
                    Ok(())
                },
            )
            .await?;

        let quotas = [
            (&prior.quota_cpu_units, &planned.quota_cpu_units),
            (&prior.quota_ram_size, &planned.quota_ram_size),
            (&prior.quota_disk_size, &planned.quota_disk_size),
            (&prior.quota_vm_cpu_units, &planned.quota_vm_cpu_units),
            (&prior.quota_vm_ram_size, &planned.quota_vm_ram_size),
            (&prior.quota_vm_volume_size, &planned.quota_vm_volume_size),
        ];
        steps
            .run_if(
                quotas.iter().any(|(prior, planned)| changed(prior, planned)),
                "quotas",
                async {
                    let mut quota = prior.quota();
                    let wanted = planned.quota();
                    for (slot, value) in [
                        (&mut quota.server_cpu, wanted.server_cpu),
                        (&mut quota.server_ram, wanted.server_ram),
                        (&mut quota.server_disk_size, wanted.server_disk_size),
                        (&mut quota.vm_cpu, wanted.vm_cpu),
                        (&mut quota.vm_ram, wanted.vm_ram),
                        (&mut quota.vm_volume_size, wanted.vm_volume_size),
                    ] {
                        if value.is_some() {
                            *slot = value;
                        }
                    }
                    cx.projects()
                        .action("editquota", &UpdateQuotaCommand { project_id, quota })
                        .execute()
                        .await?;
                    Ok(())
                },
            )
            .await?;

        steps
            .run("kubernetes nodes", async {
                if nodes::reconcile(cx, project_id, prior, planned).await? {
                    wait_ready(cx, project_id).await?;
                }
                Ok(())
            })
            .await?;
        steps
            .run("VMs", async {
                if vms::reconcile(cx, project_id, prior, planned).await? {
                    wait_ready(cx, project_id).await?;
                }
                Ok(())
            })
            .await?;

        let (old, new) = (prior.autoscaler(), planned.autoscaler());
        steps
            .run_if(old != new, "autoscaler", sync_autoscaler(cx, project_id, old, new))
            .await?;
        Ok(())
    }

    /// Nodes and VMs go first, then the project itself
    async fn delete(cx: &Context<'_>, id: &str, _prior: &ProjectState) -> ProviderResult<()> {
        let project_id = ids::numeric(id)?;
        let project = current(cx, project_id).await?;
        let server_ids: Vec<_> = project.servers.iter().map(|server| server.id).collect();
        let vm_ids: Vec<_> = project.vms.iter().map(|vm| vm.id).collect();
        if !server_ids.is_empty() {
            info!(project_id, count = server_ids.len(), "deleting kubernetes nodes");
            nodes::delete(cx, project_id, server_ids).await?;
            commit(cx, project_id, "Projects").await?;
        }
        if !vm_ids.is_empty() {
            info!(project_id, count = vm_ids.len(), "deleting standalone VMs");
            vms::delete(cx, project_id, vm_ids).await?;
            commit(cx, project_id, "StandAlone").await?;
        }
        if !project.servers.is_empty() || !project.vms.is_empty() {
            let what = format!("project {project_id} to be emptied");
            cx.envelope(Operation::Delete)
                .retry(&what, || async {
                    let project = current(cx, project_id).await?;
                    if project.servers.is_empty() && project.vms.is_empty() {
                        Ok(())
                    } else {
                        Err(ProviderError::EventuallyConsistentMiss(what.clone()))
                    }
                })
                .await?;
        }
        cx.projects().delete(project_id).execute().await?;
        Ok(())
    }

    async fn set_lock(cx: &Context<'_>, id: &str, lock: bool) -> ProviderResult<()> {
        lock_model::<Project>(cx, id, lock).await
    }
}
