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

//! Access, kubernetes, alerting, policy and standalone profiles

use serde::{Deserialize, Serialize};

use super::ProjectRef;
use crate::group::Model;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AccessProfile {
    #[serde(deserialize_with = "super::de::id")]
    pub id: i64,
    pub name: String,
    #[serde(deserialize_with = "super::de::id")]
    pub organization_id: i64,
    pub organization_name: String,
    pub is_locked: bool,
    pub http_proxy: Option<String>,
    #[serde(deserialize_with = "super::de::null_default")]
    pub dns_servers: Vec<DnsServer>,
    #[serde(deserialize_with = "super::de::null_default")]
    pub ntp_servers: Vec<NtpServer>,
    #[serde(deserialize_with = "super::de::null_default")]
    pub ssh_users: Vec<SshUser>,
    #[serde(deserialize_with = "super::de::null_default")]
    pub allowed_hosts: Vec<AllowedHost>,
    #[serde(deserialize_with = "super::de::null_default")]
    pub projects: Vec<ProjectRef>,
    pub created_by: Option<String>,
    pub last_modified: Option<String>,
    pub last_modified_by: Option<String>,
}

impl Model for AccessProfile {
    const PATH: &'static str = "AccessProfiles";
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DnsServer {
    #[serde(deserialize_with = "super::de::id", skip_serializing)]
    pub id: i64,
    pub address: String,
}

impl Model for DnsServer {
    const PATH: &'static str = "DnsServers";
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NtpServer {
    #[serde(deserialize_with = "super::de::id", skip_serializing)]
    pub id: i64,
    pub address: String,
}

impl Model for NtpServer {
    const PATH: &'static str = "NtpServers";
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SshUser {
    #[serde(deserialize_with = "super::de::id", skip_serializing)]
    pub id: i64,
    pub name: String,
    pub ssh_public_key: String,
}

impl Model for SshUser {
    const PATH: &'static str = "SshUsers";
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AllowedHost {
    #[serde(deserialize_with = "super::de::id", skip_serializing)]
    pub id: i64,
    pub ip_address: String,
    pub mask_bits: i64,
    pub description: Option<String>,
}

impl Model for AllowedHost {
    const PATH: &'static str = "AllowedHost";
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccessProfileCommand {
    pub name: String,
    pub organization_id: Option<i64>,
    pub http_proxy: Option<String>,
    pub dns_servers: Vec<DnsServer>,
    pub ntp_servers: Vec<NtpServer>,
    pub ssh_users: Vec<SshUser>,
    pub allowed_hosts: Vec<AllowedHost>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccessProfileCommand {
    pub name: String,
    pub http_proxy: Option<String>,
}

/// Body of the per-item create calls of access profiles (`DnsServers/create`, ...)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessProfileItemCommand<T> {
    pub access_profile_id: i64,
    #[serde(flatten)]
    pub item: T,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KubernetesProfile {
    #[serde(deserialize_with = "super::de::id")]
    pub id: i64,
    pub name: String,
    #[serde(deserialize_with = "super::de::id")]
    pub organization_id: i64,
    pub organization_name: String,
    pub is_locked: bool,
    pub cni: Option<String>,
    pub octavia_enabled: bool,
    pub taikun_lb_enabled: bool,
    pub expose_node_port_on_bastion: bool,
    pub allow_scheduling_on_master: bool,
    pub unique_cluster_name: bool,
    pub nvidia_gpu_operator_enabled: bool,
    pub created_by: Option<String>,
    pub last_modified: Option<String>,
    pub last_modified_by: Option<String>,
}

impl Model for KubernetesProfile {
    const PATH: &'static str = "KubernetesProfiles";
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateKubernetesProfileCommand {
    pub name: String,
    pub organization_id: Option<i64>,
    pub octavia_enabled: bool,
    pub taikun_lb_enabled: bool,
    pub expose_node_port_on_bastion: bool,
    pub allow_scheduling_on_master: bool,
    pub unique_cluster_name: bool,
    pub nvidia_gpu_operator_enabled: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlertingProfile {
    #[serde(deserialize_with = "super::de::id")]
    pub id: i64,
    pub name: String,
    #[serde(deserialize_with = "super::de::id")]
    pub organization_id: i64,
    pub organization_name: String,
    #[serde(deserialize_with = "super::de::opt_id")]
    pub slack_configuration_id: Option<i64>,
    pub slack_configuration_name: Option<String>,
    pub reminder: String,
    #[serde(deserialize_with = "super::de::null_default")]
    pub emails: Vec<AlertingEmail>,
    #[serde(deserialize_with = "super::de::null_default")]
    pub webhooks: Vec<AlertingWebhook>,
    #[serde(deserialize_with = "super::de::null_default")]
    pub integrations: Vec<AlertingIntegration>,
    pub is_locked: bool,
    pub created_by: Option<String>,
    pub last_modified: Option<String>,
    pub last_modified_by: Option<String>,
}

impl Model for AlertingProfile {
    const PATH: &'static str = "AlertingProfiles";
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlertingEmail {
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlertingWebhook {
    pub url: String,
    #[serde(deserialize_with = "super::de::null_default")]
    pub headers: Vec<WebhookHeader>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WebhookHeader {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlertingIntegration {
    #[serde(deserialize_with = "super::de::id", skip_serializing)]
    pub id: i64,
    pub alerting_integration_type: String,
    pub url: String,
    pub token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAlertingProfileCommand {
    pub name: String,
    pub organization_id: Option<i64>,
    pub slack_configuration_id: Option<i64>,
    pub reminder: String,
    pub emails: Vec<AlertingEmail>,
    pub webhooks: Vec<AlertingWebhook>,
    pub integrations: Vec<AlertingIntegration>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAlertingProfileCommand {
    pub name: String,
    pub slack_configuration_id: Option<i64>,
    pub reminder: String,
}

/// Attach an alerting profile to a project (`AlertingProfiles/attach`)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachAlertingProfileCommand {
    pub project_id: i64,
    pub alerting_profile_id: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PolicyProfile {
    #[serde(deserialize_with = "super::de::id")]
    pub id: i64,
    pub name: String,
    #[serde(deserialize_with = "super::de::id")]
    pub organization_id: i64,
    pub organization_name: String,
    pub is_locked: bool,
    pub is_default: bool,
    pub forbid_node_port: bool,
    pub forbid_http_ingress: bool,
    pub require_probe: bool,
    pub unique_ingresses: bool,
    pub unique_service_selector: bool,
    #[serde(deserialize_with = "super::de::null_default")]
    pub allowed_repo: Vec<String>,
    #[serde(deserialize_with = "super::de::null_default")]
    pub forbid_specific_tags: Vec<String>,
    #[serde(deserialize_with = "super::de::null_default")]
    pub ingress_whitelist: Vec<String>,
}

impl Model for PolicyProfile {
    const PATH: &'static str = "OpaProfiles";
}

/// Body of `OpaProfiles/create` and `OpaProfiles/update/{id}`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyProfileCommand {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<i64>,
    pub forbid_node_port: bool,
    pub forbid_http_ingress: bool,
    pub require_probe: bool,
    pub unique_ingresses: bool,
    pub unique_service_selector: bool,
    pub allowed_repo: Vec<String>,
    pub forbid_specific_tags: Vec<String>,
    pub ingress_whitelist: Vec<String>,
}

/// Enable a policy profile on a project (`OpaProfiles/enable`)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnablePolicyCommand {
    pub project_id: i64,
    pub opa_profile_id: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StandaloneProfile {
    #[serde(deserialize_with = "super::de::id")]
    pub id: i64,
    pub name: String,
    #[serde(deserialize_with = "super::de::id")]
    pub organization_id: i64,
    pub organization_name: String,
    pub is_locked: bool,
    pub public_key: String,
    #[serde(deserialize_with = "super::de::null_default")]
    pub security_groups: Vec<SecurityGroup>,
}

impl Model for StandaloneProfile {
    const PATH: &'static str = "StandAloneProfile";
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SecurityGroup {
    #[serde(deserialize_with = "super::de::id", skip_serializing)]
    pub id: i64,
    pub name: String,
    pub protocol: String,
    pub port_min_range: Option<i64>,
    pub port_max_range: Option<i64>,
    pub remote_ip_prefix: String,
}

impl Model for SecurityGroup {
    const PATH: &'static str = "StandAloneProfile/securitygroup";
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStandaloneProfileCommand {
    pub name: String,
    pub organization_id: Option<i64>,
    pub public_key: String,
    pub security_groups: Vec<SecurityGroup>,
}

/// Body of `StandAloneProfile/securitygroup/create`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSecurityGroupCommand {
    pub stand_alone_profile_id: i64,
    #[serde(flatten)]
    pub group: SecurityGroup,
}
