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

//! Cloud credentials, one collection per cloud or hypervisor

use serde::{Deserialize, Serialize};

use crate::group::Model;

macro_rules! cloud_credential {
    ($(#[$meta:meta])* $name:ident, $path:literal { $($(#[$fmeta:meta])* $field:ident : $ty:ty),* $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, Deserialize)]
        #[serde(rename_all = "camelCase", default)]
        pub struct $name {
            #[serde(deserialize_with = "super::de::id")]
            pub id: i64,
            pub name: String,
            #[serde(deserialize_with = "super::de::id")]
            pub organization_id: i64,
            pub organization_name: String,
            pub is_locked: bool,
            pub is_default: bool,
            pub created_by: Option<String>,
            pub last_modified: Option<String>,
            pub last_modified_by: Option<String>,
            $($(#[$fmeta])* pub $field: $ty,)*
        }

        impl Model for $name {
            const PATH: &'static str = $path;
        }
    };
}

cloud_credential!(AwsCredential, "Aws" {
    region: String,
    az_count: i64,
    #[serde(deserialize_with = "super::de::null_default")]
    availability_zones: Vec<String>,
});

cloud_credential!(AzureCredential, "Azure" {
    subscription_id: String,
    tenant_id: String,
    location: String,
    az_count: i64,
    #[serde(deserialize_with = "super::de::null_default")]
    availability_zones: Vec<String>,
});

cloud_credential!(GcpCredential, "Gcp" {
    region: String,
    az_count: i64,
    #[serde(deserialize_with = "super::de::null_default")]
    zones: Vec<String>,
    billing_account_id: Option<String>,
    billing_account_name: Option<String>,
    folder_id: Option<String>,
    import_project: bool,
});

cloud_credential!(OpenstackCredential, "Openstack" {
    url: String,
    domain: String,
    project_name: String,
    project_id: Option<String>,
    public_network_name: String,
    availability_zone: Option<String>,
    region: String,
    continent: Option<String>,
    volume_type_name: Option<String>,
    imported_network_subnet_id: Option<String>,
});

cloud_credential!(ProxmoxCredential, "Proxmox" {
    url: String,
    storage: String,
    vm_template_name: String,
    #[serde(deserialize_with = "super::de::null_default")]
    hypervisors: Vec<String>,
    continent: Option<String>,
    public_network: ProxmoxNetwork,
    private_network: ProxmoxNetwork,
});

cloud_credential!(VsphereCredential, "Vsphere" {
    url: String,
    datacenter_name: String,
    datacenter_id: Option<String>,
    resource_pool: String,
    data_store: String,
    vm_template_name: String,
    #[serde(deserialize_with = "super::de::null_default")]
    hypervisors: Vec<String>,
    drs_enabled: bool,
    continent: Option<String>,
    public_network: VsphereNetwork,
    private_network: VsphereNetwork,
});

cloud_credential!(ZadaraCredential, "Zadara" {
    url: String,
    region: String,
    volume_type: String,
    az_count: i64,
    #[serde(deserialize_with = "super::de::null_default")]
    availability_zones: Vec<String>,
});

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProxmoxNetwork {
    pub network: String,
    pub net_mask: i64,
    pub gateway: String,
    pub begin_allocation_range: String,
    pub end_allocation_range: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VsphereNetwork {
    pub name: String,
    pub ip_address: String,
    pub net_mask: i64,
    pub gateway: String,
    pub begin_allocation_range: String,
    pub end_allocation_range: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAwsCommand {
    pub name: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub region: String,
    pub az_count: i64,
    pub organization_id: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAzureCommand {
    pub name: String,
    pub client_id: String,
    pub client_secret: String,
    pub subscription_id: String,
    pub tenant_id: String,
    pub location: String,
    pub az_count: i64,
    pub organization_id: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGcpCommand {
    pub name: String,
    /// Content of the service account key file
    pub config: String,
    pub billing_account_id: Option<String>,
    pub folder_id: Option<String>,
    pub import_project: bool,
    pub region: String,
    pub az_count: i64,
    pub organization_id: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOpenstackCommand {
    pub name: String,
    pub user: String,
    pub password: String,
    pub url: String,
    pub domain: String,
    pub project_name: String,
    pub public_network_name: String,
    pub availability_zone: Option<String>,
    pub region: String,
    pub volume_type_name: Option<String>,
    pub imported_network_subnet_id: Option<String>,
    pub organization_id: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProxmoxCommand {
    pub name: String,
    pub url: String,
    pub token_id: String,
    pub token_secret: String,
    pub storage: String,
    pub vm_template_name: String,
    pub hypervisors: Vec<String>,
    pub public_network: ProxmoxNetwork,
    pub private_network: ProxmoxNetwork,
    pub organization_id: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVsphereCommand {
    pub name: String,
    pub url: String,
    pub username: String,
    pub password: String,
    pub datacenter_name: String,
    pub resource_pool: String,
    pub data_store: String,
    pub vm_template_name: String,
    pub hypervisors: Vec<String>,
    pub drs_enabled: bool,
    pub public_network: VsphereNetwork,
    pub private_network: VsphereNetwork,
    pub organization_id: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateZadaraCommand {
    pub name: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub url: String,
    pub region: String,
    pub volume_type: String,
    pub az_count: i64,
    pub organization_id: Option<i64>,
}

/// Flavor offered by a cloud credential
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Flavor {
    pub name: String,
    pub cpu: i64,
    /// Memory in GiB
    pub ram: i64,
    pub description: Option<String>,
}

impl Model for Flavor {
    const PATH: &'static str = "Flavors";
}

/// Image offered by a cloud credential
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Image {
    pub id: String,
    pub name: String,
}

impl Model for Image {
    const PATH: &'static str = "Images";
}
