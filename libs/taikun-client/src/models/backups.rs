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

use serde::{Deserialize, Serialize};

use crate::group::Model;

/// Backup schedule of a project, identified by its name within the project
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BackupPolicy {
    pub name: String,
    #[serde(deserialize_with = "super::de::id")]
    pub project_id: i64,
    pub cron_period: String,
    pub retention_period: String,
    #[serde(deserialize_with = "super::de::null_default")]
    pub included_namespaces: Vec<String>,
}

impl Model for BackupPolicy {
    const PATH: &'static str = "Backup";
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBackupPolicyCommand {
    pub project_id: i64,
    pub name: String,
    pub cron_period: String,
    pub retention_period: String,
    pub included_namespaces: Vec<String>,
}

/// Body of `Backup/delete/schedule`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteBackupPolicyCommand {
    pub project_id: i64,
    pub name: String,
}

/// Body of `Backup/enable` and `Backup/disable`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectBackupCommand {
    pub project_id: i64,
    pub s3_credential_id: i64,
}
