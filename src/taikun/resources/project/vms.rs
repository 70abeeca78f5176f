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

//! Standalone VMs of a project

use serde::{Deserialize, Serialize};
use taikun_client::models::{
    CreateVmCommand, CreateVmDiskCommand, DeleteVmDisksCommand, DeleteVmsCommand,
    ResizeVmDiskCommand, StandaloneVm, VmDisk, VmPublicIpCommand, VmTagsCommand,
};
use tracing::{debug, info};

use super::{commit, KeyValueState, ProjectState};
use crate::{
    map,
    taikun::{
        error::ProviderResult,
        ids,
        resources::{
            diff, elements, enabled, flag, id, number, optional, required, required_id, string,
            text,
        },
        session::Context,
    },
    Attribute, AttributePath, AttributeType, Block, Diagnostics, NestedBlock, Validator, Value,
    ValueBool, ValueList, ValueNumber, ValueString,
};

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiskState {
    pub id: ValueString,
    pub name: ValueString,
    pub size: ValueNumber,
    pub volume_type: ValueString,
    pub device_name: ValueString,
    pub lun_id: ValueNumber,
}

impl DiskState {
    fn command(&self) -> ProviderResult<VmDisk> {
        Ok(VmDisk {
            id: 0,
            name: required(&self.name, "disk.name")?.to_string(),
            size: self.size.clone().unwrap_or_default(),
            volume_type: optional(&self.volume_type),
            device_name: optional(&self.device_name),
            lun_id: self.lun_id.as_ref_option().copied(),
        })
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VmState {
    pub id: ValueString,
    pub name: ValueString,
    pub flavor: ValueString,
    pub image_id: ValueString,
    pub image_name: ValueString,
    pub standalone_profile_id: ValueString,
    pub volume_size: ValueNumber,
    pub volume_type: ValueString,
    pub username: ValueString,
    pub cloud_init: ValueString,
    pub public_ip: ValueBool,
    pub ip: ValueString,
    pub public_ip_address: ValueString,
    pub status: ValueString,
    pub tag: ValueList<KeyValueState>,
    pub disk: ValueList<DiskState>,
}

type VmKey<'a> = (&'a str, &'a str, &'a str, &'a str, i64, &'a str);

impl VmState {
    pub(super) fn block() -> NestedBlock {
        NestedBlock::Set(
            Block::new(
                "Standalone VMs of the project. Tags, disks and public IP change in place; any other change recreates the VM.",
                map! {
                    "id" => Attribute::computed(AttributeType::String, "ID of the VM."),
                    "name" => Attribute::required(AttributeType::String, "Name of the VM.")
                        .validate(Validator::Length(1, 52))
                        .validate(Validator::Regex("^[a-z0-9-]+$", "expected lowercase letters, digits and dashes")),
                    "flavor" => Attribute::required(AttributeType::String, "Flavor of the VM, bound to the project in `flavors`."),
                    "image_id" => Attribute::required(AttributeType::String, "Image of the VM, bound to the project in `images`."),
                    "image_name" => Attribute::computed(AttributeType::String, "Name of the image."),
                    "standalone_profile_id" => Attribute::required(AttributeType::String, "ID of the standalone profile of the VM.")
                        .validate(Validator::NumericId),
                    "volume_size" => Attribute::required(AttributeType::Number, "Size of the boot volume in GiB.")
                        .validate(Validator::IntBetween(1, 65536)),
                    "volume_type" => Attribute::optional_computed(AttributeType::String, "Volume type of the boot volume."),
                    "username" => Attribute::optional_computed(AttributeType::String, "Username of the VM."),
                    "cloud_init" => Attribute::optional(AttributeType::String, "Cloud-init script of the VM.")
                        .default_value(""),
                    "public_ip" => Attribute::optional(AttributeType::Bool, "Indicates whether the VM has a public IP.")
                        .default_value(false),
                    "ip" => Attribute::computed(AttributeType::String, "Private IP of the VM."),
                    "public_ip_address" => Attribute::computed(AttributeType::String, "Public IP of the VM."),
                    "status" => Attribute::computed(AttributeType::String, "Status of the VM."),
                },
            )
            .with_block("tag", KeyValueState::block("Tags of the VM."))
            .with_block(
                "disk",
                NestedBlock::Set(Block::new(
                    "Additional disks of the VM.",
                    map! {
                        "id" => Attribute::computed(AttributeType::String, "ID of the disk."),
                        "name" => Attribute::required(AttributeType::String, "Name of the disk."),
                        "size" => Attribute::required(AttributeType::Number, "Size of the disk in GiB.")
                            .validate(Validator::IntBetween(1, 65536)),
                        "volume_type" => Attribute::optional_computed(AttributeType::String, "Volume type of the disk."),
                        "device_name" => Attribute::optional_computed(AttributeType::String, "Device name of the disk."),
                        "lun_id" => Attribute::optional_computed(AttributeType::Number, "LUN of the disk, for Azure."),
                    },
                )),
            ),
        )
    }

    pub(super) fn observe(vm: StandaloneVm) -> Self {
        Self {
            id: id(vm.id),
            name: string(vm.name),
            flavor: string(vm.flavor),
            image_id: string(vm.image_id),
            image_name: text(vm.image_name),
            standalone_profile_id: id(vm.standalone_profile_id),
            volume_size: number(vm.volume_size),
            volume_type: text(vm.volume_type),
            username: text(vm.username),
            cloud_init: string(vm.cloud_init.unwrap_or_default()),
            public_ip: flag(vm.public_ip),
            ip: text(vm.ip_address),
            public_ip_address: text(vm.public_ip_address),
            status: text(vm.status),
            tag: KeyValueState::observe(vm.tags),
            disk: Value::Value(
                vm.disks
                    .into_iter()
                    .map(|disk| DiskState {
                        id: id(disk.id),
                        name: string(disk.name),
                        size: number(disk.size),
                        volume_type: text(disk.volume_type),
                        device_name: text(disk.device_name),
                        lun_id: disk.lun_id.into(),
                    })
                    .collect(),
            ),
        }
    }

    /// Settings a VM is created with and cannot change afterwards
    fn key(&self) -> VmKey<'_> {
        (
            self.name.as_str(),
            self.flavor.as_str(),
            self.image_id.as_str(),
            self.standalone_profile_id.as_str(),
            self.volume_size.clone().unwrap_or_default(),
            self.cloud_init.as_str(),
        )
    }

    fn command(&self, project_id: i64) -> ProviderResult<CreateVmCommand> {
        Ok(CreateVmCommand {
            project_id,
            name: required(&self.name, "name")?.to_string(),
            flavor: required(&self.flavor, "flavor")?.to_string(),
            image_id: required(&self.image_id, "image_id")?.to_string(),
            stand_alone_profile_id: required_id(
                &self.standalone_profile_id,
                "standalone_profile_id",
            )?,
            volume_size: self.volume_size.clone().unwrap_or_default(),
            volume_type: optional(&self.volume_type),
            public_ip_enabled: enabled(&self.public_ip),
            username: optional(&self.username),
            cloud_init: optional(&self.cloud_init),
            tags: KeyValueState::commands(&self.tag)?,
            disks: elements(&self.disk)
                .iter()
                .map(DiskState::command)
                .collect::<ProviderResult<_>>()?,
        })
    }
}

/// VM flavors and images must be bound to the project
pub(super) fn check(state: &ProjectState, diags: &mut Diagnostics) {
    for (i, vm) in elements(&state.vm).iter().enumerate() {
        let path = AttributePath::new("vm").index(i as i64);
        for (name, value, bound, list) in [
            ("flavor", &vm.flavor, &state.flavors, "flavors"),
            ("image_id", &vm.image_id, &state.images, "images"),
        ] {
            let (Some(value), Some(bound)) = (value.as_ref_option(), bound.as_ref_option()) else {
                continue;
            };
            if !bound.contains(value) {
                diags.error(
                    "Unbound VM setting",
                    format!("{name} {value:?} must be listed in {list}"),
                    path.clone().attribute(name),
                );
            }
        }
    }
}

/// Replace the VMs whose immutable settings changed, update the others in place and commit
///
/// Returns whether anything was committed.
pub(super) async fn reconcile(
    cx: &Context<'_>,
    project_id: i64,
    prior: &ProjectState,
    planned: &ProjectState,
) -> ProviderResult<bool> {
    let prior_vms = elements(&prior.vm);
    let planned_vms = elements(&planned.vm);
    let (removed, added) = diff(prior_vms, planned_vms, VmState::key);

    let mut changed = false;
    if !removed.is_empty() {
        let vm_ids = removed
            .iter()
            .map(|vm| required_id(&vm.id, "vm id"))
            .collect::<ProviderResult<Vec<_>>>()?;
        info!(project_id, ?vm_ids, "deleting standalone VMs");
        delete(cx, project_id, vm_ids).await?;
        changed = true;
    }
    for vm in &added {
        info!(project_id, name = vm.name.as_str(), "adding standalone VM");
        cx.standalone_vms()
            .create(&vm.command(project_id)?)
            .execute()
            .await?;
        changed = true;
    }

    for vm in planned_vms {
        let Some(old) = prior_vms.iter().find(|old| old.key() == vm.key()) else {
            continue;
        };
        changed |= update_in_place(cx, old, vm).await?;
    }

    if changed {
        commit(cx, project_id, "StandAlone").await?;
    }
    Ok(changed)
}

async fn update_in_place(
    cx: &Context<'_>,
    prior: &VmState,
    planned: &VmState,
) -> ProviderResult<bool> {
    let vm_id = required_id(&prior.id, "vm id")?;
    let mut changed = false;

    if sorted(&prior.tag) != sorted(&planned.tag) {
        debug!(vm_id, "updating VM tags");
        cx.standalone_vms()
            .action(
                "update/tags",
                &VmTagsCommand {
                    id: vm_id,
                    tags: KeyValueState::commands(&planned.tag)?,
                },
            )
            .execute()
            .await?;
        changed = true;
    }

    let public_ip = enabled(&planned.public_ip);
    if enabled(&prior.public_ip) != public_ip {
        debug!(vm_id, public_ip, "toggling VM public IP");
        cx.standalone_vms()
            .action(
                "ip/mode",
                &VmPublicIpCommand {
                    id: vm_id,
                    mode: if public_ip { "enable" } else { "disable" },
                },
            )
            .execute()
            .await?;
        changed = true;
    }

    let (removed, added) = diff(elements(&prior.disk), elements(&planned.disk), |disk| {
        disk.name.as_str().to_string()
    });
    if !removed.is_empty() {
        let vm_disk_ids = removed
            .iter()
            .map(|disk| required_id(&disk.id, "disk id"))
            .collect::<ProviderResult<Vec<_>>>()?;
        cx.vm_disks()
            .action("delete", &DeleteVmDisksCommand { vm_id, vm_disk_ids })
            .execute()
            .await?;
        changed = true;
    }
    for disk in added {
        cx.vm_disks()
            .create(&CreateVmDiskCommand {
                standalone_vm_id: vm_id,
                disk: disk.command()?,
            })
            .execute()
            .await?;
        changed = true;
    }
    for disk in elements(&planned.disk) {
        let Some(old) = elements(&prior.disk)
            .iter()
            .find(|old| old.name.as_str() == disk.name.as_str())
        else {
            continue;
        };
        let size = disk.size.clone().unwrap_or_default();
        if old.size.clone().unwrap_or_default() != size {
            cx.vm_disks()
                .action(
                    "update/size",
                    &ResizeVmDiskCommand {
                        id: required_id(&old.id, "disk id")?,
                        size,
                    },
                )
                .execute()
                .await?;
            changed = true;
        }
    }
    Ok(changed)
}

fn sorted(tags: &ValueList<KeyValueState>) -> Vec<(&str, &str)> {
    let mut tags: Vec<_> = elements(tags)
        .iter()
        .map(|tag| (tag.key.as_str(), tag.value.as_str()))
        .collect();
    tags.sort_unstable();
    tags
}

pub(super) async fn delete(
    cx: &Context<'_>,
    project_id: i64,
    vm_ids: Vec<i64>,
) -> ProviderResult<()> {
    cx.standalone_vms()
        .action("delete", &DeleteVmsCommand { project_id, vm_ids })
        .execute()
        .await?;
    Ok(())
}
