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

//! Application catalogs and repositories

use serde::{Deserialize, Serialize};

use super::ProjectRef;
use crate::group::Model;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Catalog {
    #[serde(deserialize_with = "super::de::id")]
    pub id: i64,
    pub name: String,
    pub description: String,
    pub is_default: bool,
    pub is_locked: bool,
    #[serde(deserialize_with = "super::de::id")]
    pub organization_id: i64,
    pub organization_name: String,
    #[serde(deserialize_with = "super::de::null_default")]
    pub bound_applications: Vec<CatalogApp>,
    #[serde(deserialize_with = "super::de::null_default")]
    pub bound_projects: Vec<ProjectRef>,
}

impl Model for Catalog {
    const PATH: &'static str = "Catalogs";
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogApp {
    #[serde(deserialize_with = "super::de::id")]
    pub id: i64,
    pub name: String,
    pub repository: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogCommand {
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<i64>,
}

/// Body of `Catalogs/add-app`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCatalogAppCommand {
    pub catalog_id: i64,
    pub name: String,
    pub repository: String,
}

/// Body of `Catalogs/delete-app`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteCatalogAppCommand {
    pub catalog_id: i64,
    pub catalog_app_id: i64,
}

/// Body of `Catalogs/bind-project` and `Catalogs/unbind-project`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogProjectsCommand {
    pub catalog_id: i64,
    pub project_ids: Vec<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Repository {
    #[serde(deserialize_with = "super::de::id")]
    pub id: i64,
    pub name: String,
    pub url: String,
    pub is_private: bool,
    pub is_bound: bool,
    #[serde(deserialize_with = "super::de::id")]
    pub organization_id: i64,
    pub organization_name: String,
}

impl Model for Repository {
    const PATH: &'static str = "Repositories";
}

/// Body of `Repositories/import`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRepositoryCommand {
    pub name: String,
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub organization_id: Option<i64>,
}

/// Body of `Repositories/bind` and `Repositories/unbind`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BindRepositoryCommand {
    pub repository_id: i64,
    pub organization_id: i64,
}
