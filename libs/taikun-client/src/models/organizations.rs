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

/// Tenant scope owning credentials, profiles and projects
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Organization {
    #[serde(deserialize_with = "super::de::id")]
    pub id: i64,
    pub name: String,
    pub full_name: String,
    pub discount_rate: f64,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub billing_email: Option<String>,
    pub vat_number: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub is_locked: bool,
    pub is_read_only: bool,
    #[serde(deserialize_with = "super::de::opt_id")]
    pub partner_id: Option<i64>,
    pub partner_name: Option<String>,
    pub created_at: Option<String>,
    pub cloud_credentials: i64,
    pub projects: i64,
    pub users: i64,
    pub let_managers_change_subscription: bool,
}

impl Model for Organization {
    const PATH: &'static str = "Organizations";
}

/// Body of `Organizations/create` and `Organizations/update/{id}`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationCommand {
    pub name: String,
    pub full_name: String,
    pub discount_rate: f64,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub billing_email: Option<String>,
    pub vat_number: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub let_managers_change_subscription: bool,
}
