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

//! Projects: kubernetes clusters and standalone VM workspaces

use serde::{Deserialize, Serialize};

use super::KeyValue;
use crate::group::Model;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Project {
    #[serde(deserialize_with = "super::de::id")]
    pub id: i64,
    pub name: String,
    #[serde(deserialize_with = "super::de::id")]
    pub organization_id: i64,
    pub organization_name: String,
    #[serde(deserialize_with = "super::de::id")]
    pub cloud_credential_id: i64,
    pub cloud_type: Option<String>,
    #[serde(deserialize_with = "super::de::opt_id")]
    pub kubernetes_profile_id: Option<i64>,
    #[serde(deserialize_with = "super::de::opt_id")]
    pub access_profile_id: Option<i64>,
    #[serde(deserialize_with = "super::de::opt_id")]
    pub alerting_profile_id: Option<i64>,
    pub alerting_profile_name: Option<String>,
    #[serde(deserialize_with = "super::de::opt_id")]
    pub opa_profile_id: Option<i64>,
    #[serde(deserialize_with = "super::de::opt_id")]
    pub s3_credential_id: Option<i64>,
    pub is_monitoring_enabled: bool,
    pub is_backup_enabled: bool,
    pub is_opa_enabled: bool,
    pub is_auto_upgrade: bool,
    /// RFC 3339 expiration instant, if any
    pub expired_at: Option<String>,
    pub is_locked: bool,
    pub status: String,
    pub health: Option<String>,
    pub kubernetes_version: Option<String>,
    pub access_ip: Option<String>,
    #[serde(deserialize_with = "super::de::null_default")]
    pub quota: ProjectQuota,
    #[serde(deserialize_with = "super::de::null_default")]
    pub flavors: Vec<BoundFlavor>,
    #[serde(deserialize_with = "super::de::null_default")]
    pub images: Vec<BoundImage>,
    #[serde(deserialize_with = "super::de::null_default")]
    pub servers: Vec<Server>,
    #[serde(deserialize_with = "super::de::null_default")]
    pub vms: Vec<StandaloneVm>,
    pub autoscaler: Option<Autoscaler>,
    pub spot_full: bool,
    pub spot_worker: bool,
    pub spot_vms: bool,
    pub max_spot_price: Option<f64>,
    pub router_id_start_range: Option<i64>,
    pub router_id_end_range: Option<i64>,
    pub taikun_lb_flavor: Option<String>,
}

impl Model for Project {
    const PATH: &'static str = "Projects";
}

impl Project {
    /// Status reported once every pending change is applied
    pub const READY: &'static str = "Ready";
    /// Status reported when the last commit failed
    pub const FAILURE: &'static str = "Failure";
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectQuota {
    pub server_cpu: Option<i64>,
    /// GiB
    pub server_ram: Option<i64>,
    /// GiB
    pub server_disk_size: Option<i64>,
    pub vm_cpu: Option<i64>,
    pub vm_ram: Option<i64>,
    pub vm_volume_size: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BoundFlavor {
    #[serde(deserialize_with = "super::de::id")]
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BoundImage {
    #[serde(deserialize_with = "super::de::id")]
    pub id: i64,
    pub image_id: String,
    pub name: String,
}

/// Kubernetes node of a project
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Server {
    #[serde(deserialize_with = "super::de::id")]
    pub id: i64,
    pub name: String,
    pub role: String,
    pub flavor: String,
    pub disk_size: i64,
    #[serde(deserialize_with = "super::de::null_default")]
    pub kubernetes_node_labels: Vec<KeyValue>,
    pub ip_address: Option<String>,
    pub status: Option<String>,
    pub created_by: Option<String>,
}

impl Model for Server {
    const PATH: &'static str = "Servers";
}

impl Server {
    pub const BASTION: &'static str = "Bastion";
    pub const KUBEMASTER: &'static str = "Kubemaster";
    pub const KUBEWORKER: &'static str = "Kubeworker";
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StandaloneVm {
    #[serde(deserialize_with = "super::de::id")]
    pub id: i64,
    pub name: String,
    pub flavor: String,
    pub image_id: String,
    pub image_name: Option<String>,
    #[serde(deserialize_with = "super::de::id")]
    pub standalone_profile_id: i64,
    pub volume_size: i64,
    pub volume_type: Option<String>,
    pub public_ip: bool,
    pub username: Option<String>,
    pub cloud_init: Option<String>,
    pub ip_address: Option<String>,
    pub public_ip_address: Option<String>,
    pub status: Option<String>,
    #[serde(deserialize_with = "super::de::null_default")]
    pub tags: Vec<KeyValue>,
    #[serde(deserialize_with = "super::de::null_default")]
    pub disks: Vec<VmDisk>,
}

impl Model for StandaloneVm {
    const PATH: &'static str = "StandAlone";
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VmDisk {
    #[serde(deserialize_with = "super::de::id", skip_serializing)]
    pub id: i64,
    pub name: String,
    pub size: i64,
    pub volume_type: Option<String>,
    pub device_name: Option<String>,
    pub lun_id: Option<i64>,
}

impl Model for VmDisk {
    const PATH: &'static str = "StandAloneVmDisks";
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Autoscaler {
    pub name: String,
    pub flavor: String,
    pub min_size: i64,
    pub max_size: i64,
    pub disk_size: i64,
    pub spot_enabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectCommand {
    pub name: String,
    pub organization_id: Option<i64>,
    pub cloud_credential_id: i64,
    pub kubernetes_profile_id: Option<i64>,
    pub access_profile_id: Option<i64>,
    pub is_auto_upgrade: bool,
    pub kubernetes_version: Option<String>,
    pub spot_full: bool,
    pub spot_worker: bool,
    pub spot_vms: bool,
    pub max_spot_price: Option<f64>,
    pub router_id_start_range: Option<i64>,
    pub router_id_end_range: Option<i64>,
    pub taikun_lb_flavor: Option<String>,
}

/// Body of the project-scoped actions that only need the project id
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectIdCommand {
    pub project_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendProjectCommand {
    pub project_id: i64,
    pub expire_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuotaCommand {
    pub project_id: i64,
    #[serde(flatten)]
    pub quota: ProjectQuota,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BindFlavorsCommand {
    pub project_id: i64,
    pub flavors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BindImagesCommand {
    pub project_id: i64,
    pub images: Vec<String>,
}

/// Body of `Flavors/unbind` and `Images/unbind`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnbindCommand {
    pub project_id: i64,
    pub ids: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateServerCommand {
    pub project_id: i64,
    pub name: String,
    pub role: String,
    pub flavor: String,
    pub disk_size: i64,
    pub kubernetes_node_labels: Vec<KeyValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteServersCommand {
    pub project_id: i64,
    pub server_ids: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVmCommand {
    pub project_id: i64,
    pub name: String,
    pub flavor: String,
    pub image_id: String,
    pub stand_alone_profile_id: i64,
    pub volume_size: i64,
    pub volume_type: Option<String>,
    pub public_ip_enabled: bool,
    pub username: Option<String>,
    pub cloud_init: Option<String>,
    pub tags: Vec<KeyValue>,
    pub disks: Vec<VmDisk>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteVmsCommand {
    pub project_id: i64,
    pub vm_ids: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VmTagsCommand {
    pub id: i64,
    pub tags: Vec<KeyValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VmPublicIpCommand {
    pub id: i64,
    pub mode: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVmDiskCommand {
    pub standalone_vm_id: i64,
    #[serde(flatten)]
    pub disk: VmDisk,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteVmDisksCommand {
    pub vm_id: i64,
    pub vm_disk_ids: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResizeVmDiskCommand {
    pub id: i64,
    pub size: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnableAutoscalerCommand {
    pub project_id: i64,
    #[serde(flatten)]
    pub autoscaler: Autoscaler,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditAutoscalerCommand {
    pub project_id: i64,
    pub min_size: i64,
    pub max_size: i64,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn null_quota_reads_as_unlimited() {
        let project: Project =
            serde_json::from_value(json!({"id": 3, "name": "p", "quota": null, "flavors": null}))
                .unwrap();
        assert_eq!(project.quota, ProjectQuota::default());
        assert!(project.flavors.is_empty());
    }

    #[test]
    fn quota_edit_is_flat() {
        let command = UpdateQuotaCommand {
            project_id: 3,
            quota: ProjectQuota {
                server_cpu: Some(8),
                ..Default::default()
            },
        };
        let body = serde_json::to_value(&command).unwrap();
        assert_eq!(body["projectId"], 3);
        assert_eq!(body["serverCpu"], 8);
        assert!(body.get("quota").is_none());
    }
}
