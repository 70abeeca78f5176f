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

//! Billing and showback rules: metric to price mappings

use serde::{Deserialize, Serialize};

use crate::group::Model;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RuleLabel {
    #[serde(deserialize_with = "super::de::id", skip_serializing)]
    pub id: i64,
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BillingRule {
    #[serde(deserialize_with = "super::de::id")]
    pub id: i64,
    pub name: String,
    pub metric_name: String,
    #[serde(rename = "type")]
    pub rule_type: String,
    pub price: f64,
    #[serde(deserialize_with = "super::de::id")]
    pub operation_credential_id: i64,
    #[serde(deserialize_with = "super::de::null_default")]
    pub labels: Vec<RuleLabel>,
    pub created_by: Option<String>,
    pub last_modified: Option<String>,
    pub last_modified_by: Option<String>,
}

impl Model for BillingRule {
    const PATH: &'static str = "PrometheusRules";
}

/// Body of `PrometheusRules/create` and `PrometheusRules/update/{id}`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingRuleCommand {
    pub name: String,
    pub metric_name: String,
    #[serde(rename = "type")]
    pub rule_type: String,
    pub price: f64,
    pub operation_credential_id: i64,
    pub labels: Vec<RuleLabel>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShowbackRule {
    #[serde(deserialize_with = "super::de::id")]
    pub id: i64,
    pub name: String,
    pub metric_name: String,
    pub kind: String,
    #[serde(rename = "type")]
    pub rule_type: String,
    pub price: f64,
    pub global_alert_limit: i64,
    pub project_alert_limit: i64,
    #[serde(deserialize_with = "super::de::opt_id")]
    pub showback_credential_id: Option<i64>,
    pub showback_credential_name: Option<String>,
    #[serde(deserialize_with = "super::de::id")]
    pub organization_id: i64,
    pub organization_name: String,
    #[serde(deserialize_with = "super::de::null_default")]
    pub labels: Vec<RuleLabel>,
    pub created_by: Option<String>,
    pub last_modified: Option<String>,
    pub last_modified_by: Option<String>,
}

impl Model for ShowbackRule {
    const PATH: &'static str = "ShowbackRules";
}

/// Body of `ShowbackRules/create` and `ShowbackRules/update/{id}`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowbackRuleCommand {
    pub name: String,
    pub metric_name: String,
    pub kind: String,
    #[serde(rename = "type")]
    pub rule_type: String,
    pub price: f64,
    pub global_alert_limit: i64,
    pub project_alert_limit: i64,
    pub showback_credential_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<i64>,
    pub labels: Vec<RuleLabel>,
}
