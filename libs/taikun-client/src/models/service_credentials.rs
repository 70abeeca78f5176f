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

//! Credentials of external services: S3 backups, Prometheus billing, showback

use serde::{Deserialize, Serialize};

use crate::group::Model;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BackupCredential {
    #[serde(deserialize_with = "super::de::id")]
    pub id: i64,
    pub s3_name: String,
    pub s3_access_key_id: String,
    pub s3_endpoint: String,
    pub s3_region: String,
    #[serde(deserialize_with = "super::de::id")]
    pub organization_id: i64,
    pub organization_name: String,
    pub is_default: bool,
    pub is_locked: bool,
    pub created_by: Option<String>,
    pub last_modified: Option<String>,
    pub last_modified_by: Option<String>,
}

impl Model for BackupCredential {
    const PATH: &'static str = "S3Credentials";
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBackupCredentialCommand {
    pub s3_name: String,
    pub s3_access_key_id: String,
    pub s3_secret_access_key: String,
    pub s3_endpoint: String,
    pub s3_region: String,
    pub organization_id: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBackupCredentialCommand {
    pub s3_name: String,
    pub s3_access_key_id: String,
    pub s3_secret_access_key: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BillingCredential {
    #[serde(deserialize_with = "super::de::id")]
    pub id: i64,
    pub name: String,
    pub prometheus_url: String,
    pub prometheus_username: String,
    #[serde(deserialize_with = "super::de::id")]
    pub organization_id: i64,
    pub organization_name: String,
    pub is_default: bool,
    pub is_locked: bool,
    pub created_by: Option<String>,
    pub last_modified: Option<String>,
    pub last_modified_by: Option<String>,
}

impl Model for BillingCredential {
    const PATH: &'static str = "OperationCredentials";
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBillingCredentialCommand {
    pub name: String,
    pub prometheus_url: String,
    pub prometheus_username: String,
    pub prometheus_password: String,
    pub organization_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShowbackCredential {
    #[serde(deserialize_with = "super::de::id")]
    pub id: i64,
    pub name: String,
    pub url: String,
    pub username: String,
    #[serde(deserialize_with = "super::de::id")]
    pub organization_id: i64,
    pub organization_name: String,
    pub is_locked: bool,
    pub created_by: Option<String>,
    pub last_modified: Option<String>,
    pub last_modified_by: Option<String>,
}

impl Model for ShowbackCredential {
    const PATH: &'static str = "ShowbackCredentials";
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateShowbackCredentialCommand {
    pub name: String,
    pub url: String,
    pub username: String,
    pub password: String,
    pub organization_id: Option<i64>,
}
