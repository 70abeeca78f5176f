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

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    #[serde(deserialize_with = "super::de::id")]
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: String,
    pub display_name: Option<String>,
    #[serde(deserialize_with = "super::de::id")]
    pub organization_id: i64,
    pub organization_name: String,
    pub is_disabled: bool,
    pub is_approved_by_partner: bool,
    pub is_owner: bool,
    pub is_csm: bool,
    pub is_email_confirmed: bool,
    pub is_email_notification_enabled: bool,
    #[serde(deserialize_with = "super::de::null_default")]
    pub bound_projects: Vec<BoundProject>,
}

impl Model for User {
    const PATH: &'static str = "Users";
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BoundProject {
    #[serde(deserialize_with = "super::de::id")]
    pub project_id: i64,
    pub project_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserCommand {
    pub username: String,
    pub email: String,
    pub role: String,
    pub display_name: Option<String>,
    pub organization_id: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserCommand {
    pub username: String,
    pub email: String,
    pub role: String,
    pub display_name: Option<String>,
}

/// Body of `Users/disable`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleUserCommand {
    pub id: i64,
    pub disable: bool,
}

/// Body of `Users/bindprojects`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BindProjectsCommand {
    pub user_id: i64,
    pub projects: Vec<ProjectBinding>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectBinding {
    pub project_id: i64,
    pub is_bound: bool,
}
