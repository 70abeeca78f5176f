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

//! [`Registry`]: named resources and data sources of a provider

use std::collections::{BTreeMap, HashMap};

use serde_json::json;

use crate::{
    data_source::DynamicDataSource, diagnostics::Diagnostics, provider::DynamicProvider,
    resource::DynamicResource, schema::Schema,
};

/// Provider with its resources and data sources resolved by full type name (`<provider>_<kind>`)
pub struct Registry {
    provider_name: String,
    provider: Box<dyn DynamicProvider>,
    schema: Option<Schema>,
    resources: HashMap<String, (Box<dyn DynamicResource>, Schema)>,
    data_sources: HashMap<String, (Box<dyn DynamicDataSource>, Schema)>,
    /// Problems met while collecting schemas
    pub init_diags: Diagnostics,
}

impl Registry {
    pub fn new<P: Into<Box<dyn DynamicProvider>>>(provider_name: &str, provider: P) -> Self {
        let provider = provider.into();
        let mut diags = Diagnostics::default();
        let mut has_errors = false;
        let mut set_error = || {
            has_errors = true;
            None
        };
        let schema = provider.schema(&mut diags).or_else(&mut set_error);
        let resources = provider
            .get_resources(&mut diags)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(name, resource)| {
                let schema = resource.schema(&mut diags).or_else(&mut set_error)?;
                Some((format!("{provider_name}_{name}"), (resource, schema)))
            })
            .collect();
        let data_sources = provider
            .get_data_sources(&mut diags)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(name, data_source)| {
                let schema = data_source.schema(&mut diags).or_else(&mut set_error)?;
                Some((format!("{provider_name}_{name}"), (data_source, schema)))
            })
            .collect();
        if has_errors {
            diags.internal_error();
        }
        Self {
            provider_name: provider_name.to_owned(),
            provider,
            schema,
            resources,
            data_sources,
            init_diags: diags,
        }
    }

    /// The provider itself
    pub fn provider(&self) -> &dyn DynamicProvider {
        self.provider.as_ref()
    }

    /// Resource by full type name
    pub fn resource(&self, diags: &mut Diagnostics, name: &str) -> Option<&dyn DynamicResource> {
        match self.resources.get(name) {
            Some((resource, _)) => Some(resource.as_ref()),
            None => {
                diags.root_error_short(format!("Could not find resource `{name}` in provider"));
                None
            }
        }
    }

    /// Data source by full type name
    pub fn data_source(
        &self,
        diags: &mut Diagnostics,
        name: &str,
    ) -> Option<&dyn DynamicDataSource> {
        match self.data_sources.get(name) {
            Some((data_source, _)) => Some(data_source.as_ref()),
            None => {
                diags.root_error_short(format!("Could not find data source `{name}` in provider"));
                None
            }
        }
    }

    /// Schema of a resource by full type name
    pub fn resource_schema(&self, name: &str) -> Option<&Schema> {
        self.resources.get(name).map(|(_, schema)| schema)
    }

    /// Schema of a data source by full type name
    pub fn data_source_schema(&self, name: &str) -> Option<&Schema> {
        self.data_sources.get(name).map(|(_, schema)| schema)
    }

    /// Sorted names of every resource
    pub fn resource_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.resources.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Sorted names of every data source
    pub fn data_source_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.data_sources.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Every schema, in the layout of `terraform providers schema -json`
    pub fn schema_json(&self, source: &str) -> serde_json::Value {
        let resources: BTreeMap<&String, &Schema> =
            self.resources.iter().map(|(k, (_, s))| (k, s)).collect();
        let data_sources: BTreeMap<&String, &Schema> =
            self.data_sources.iter().map(|(k, (_, s))| (k, s)).collect();
        json!({
            "format_version": "1.0",
            "provider_schemas": {
                format!("{source}/{}", self.provider_name): {
                    "provider": self.schema,
                    "resource_schemas": resources,
                    "data_source_schemas": data_sources,
                }
            }
        })
    }
}
