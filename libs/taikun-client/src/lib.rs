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

//! Async client for the Taikun REST API
//!
//! A [`TaikunClient`] is a single session: it authenticates once, shares its bearer token
//! between concurrent requests, refreshes it on 401, and aborts in-flight calls when its
//! cancellation token fires. Entities are reached through typed method groups
//! (`client.access_profiles().list().organization_id(42).all().await`).
//!
//! The client never retries on its own (except the one retry after a token refresh):
//! retrying is a concern of the caller.

mod auth;
mod client;
mod error;
mod group;
mod request;

pub mod models;

pub use auth::Credentials;
pub use client::{ClientConfig, TaikunClient, DEFAULT_API_HOST, DEFAULT_PAGE_SIZE};
pub use error::{ApiError, ApiResult};
pub use group::{Created, Group, ListBuilder, Model, Page};
pub use request::RequestBuilder;

pub use reqwest::{Method, StatusCode};

macro_rules! groups {
    ($($name:ident => $model:ty),* $(,)?) => {
        impl TaikunClient {
            $(
                #[doc = concat!("Method group for [`", stringify!($model), "`]")]
                pub fn $name(&self) -> Group<$model> {
                    self.group()
                }
            )*
        }
    };
}

groups! {
    organizations => models::Organization,
    users => models::User,
    aws_credentials => models::AwsCredential,
    azure_credentials => models::AzureCredential,
    gcp_credentials => models::GcpCredential,
    openstack_credentials => models::OpenstackCredential,
    proxmox_credentials => models::ProxmoxCredential,
    vsphere_credentials => models::VsphereCredential,
    zadara_credentials => models::ZadaraCredential,
    flavors => models::Flavor,
    images => models::Image,
    access_profiles => models::AccessProfile,
    dns_servers => models::DnsServer,
    ntp_servers => models::NtpServer,
    ssh_users => models::SshUser,
    allowed_hosts => models::AllowedHost,
    kubernetes_profiles => models::KubernetesProfile,
    alerting_profiles => models::AlertingProfile,
    policy_profiles => models::PolicyProfile,
    standalone_profiles => models::StandaloneProfile,
    security_groups => models::SecurityGroup,
    backup_credentials => models::BackupCredential,
    backup_policies => models::BackupPolicy,
    billing_credentials => models::BillingCredential,
    billing_rules => models::BillingRule,
    showback_credentials => models::ShowbackCredential,
    showback_rules => models::ShowbackRule,
    slack_configurations => models::SlackConfiguration,
    projects => models::Project,
    servers => models::Server,
    standalone_vms => models::StandaloneVm,
    vm_disks => models::VmDisk,
    catalogs => models::Catalog,
    repositories => models::Repository,
}
