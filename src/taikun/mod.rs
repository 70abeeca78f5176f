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

//! The Taikun provider: configuration, session and the resource catalogue

use std::collections::HashMap;

use async_trait::async_trait;
use taikun_client::{ClientConfig, TaikunClient};
use tracing::{info, warn};

use crate::{
    data_source::DynamicDataSource, plan, resource::DynamicResource, utils::to_any, Diagnostics,
    Provider, Schema,
};

pub mod config;
pub mod data_sources;
pub mod envelope;
pub mod error;
pub mod handler;
pub mod ids;
pub mod kind;
pub mod resources;
pub mod session;
pub mod steps;

use config::{ProviderConfig, Timeouts};
use data_sources::{FlavorsDataSource, ImagesDataSource, ListDataSource, SingleDataSource};
use error::ProviderError;
use handler::Handler;
use kind::Kind;
use resources::*;
use session::Session;

/// Terraform provider for the Taikun cloud platform
#[derive(Debug, Clone)]
pub struct TaikunProvider {
    session: Session,
}

impl Default for TaikunProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl TaikunProvider {
    pub fn new() -> Self {
        Self::with_timeouts(Timeouts::default())
    }

    /// Provider whose read-back windows are bounded by `timeouts`
    pub fn with_timeouts(timeouts: Timeouts) -> Self {
        Self {
            session: Session::new(timeouts),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }
}

/// Resources and data sources, by name without the provider prefix
#[derive(Default)]
struct Catalogue {
    resources: HashMap<String, Box<dyn DynamicResource>>,
    data_sources: HashMap<String, Box<dyn DynamicDataSource>>,
}

impl Catalogue {
    fn build(session: &Session) -> Self {
        let mut catalogue = Self::default();
        catalogue.kind::<OrganizationKind>(session);
        catalogue.kind::<UserKind>(session);
        catalogue.kind::<ProjectUserAttachmentKind>(session);
        catalogue.kind::<AwsCredentialKind>(session);
        catalogue.kind::<AzureCredentialKind>(session);
        catalogue.kind::<GcpCredentialKind>(session);
        catalogue.kind::<OpenstackCredentialKind>(session);
        catalogue.kind::<ProxmoxCredentialKind>(session);
        catalogue.kind::<VsphereCredentialKind>(session);
        catalogue.kind::<ZadaraCredentialKind>(session);
        catalogue.kind::<AccessProfileKind>(session);
        catalogue.kind::<KubernetesProfileKind>(session);
        catalogue.kind::<AlertingProfileKind>(session);
        catalogue.kind::<PolicyProfileKind>(session);
        catalogue.kind::<StandaloneProfileKind>(session);
        catalogue.kind::<BackupCredentialKind>(session);
        catalogue.kind::<BackupPolicyKind>(session);
        catalogue.kind::<BillingCredentialKind>(session);
        catalogue.kind::<BillingRuleKind>(session);
        catalogue.kind::<ShowbackCredentialKind>(session);
        catalogue.kind::<ShowbackRuleKind>(session);
        catalogue.kind::<SlackConfigurationKind>(session);
        catalogue.kind::<ProjectKind>(session);
        catalogue.kind::<CatalogKind>(session);
        catalogue.kind::<CatalogProjectBindingKind>(session);
        catalogue.kind::<RepositoryKind>(session);
        catalogue.data_sources.insert(
            "flavors".to_string(),
            FlavorsDataSource::new(session.clone()).into(),
        );
        catalogue.data_sources.insert(
            "images".to_string(),
            ImagesDataSource::new(session.clone()).into(),
        );
        catalogue
    }

    /// The resource of a kind, and its data sources when it has a plural name
    fn kind<K: Kind>(&mut self, session: &Session) {
        self.resources.insert(
            K::TYPE_NAME.to_string(),
            Handler::<K>::new(session.clone()).into(),
        );
        if let Some(plural) = K::PLURAL {
            self.data_sources.insert(
                K::TYPE_NAME.to_string(),
                SingleDataSource::<K>::new(session.clone()).into(),
            );
            self.data_sources.insert(
                plural.to_string(),
                ListDataSource::<K>::new(session.clone()).into(),
            );
        }
    }
}

#[async_trait]
impl Provider for TaikunProvider {
    type Config = ProviderConfig;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(ProviderConfig::schema())
    }

    async fn validate(&self, diags: &mut Diagnostics, config: Self::Config) -> Option<()> {
        let any = to_any(&config, diags)?;
        plan::validate(&ProviderConfig::schema().block, &any, diags);
        Some(())
    }

    async fn configure(
        &self,
        diags: &mut Diagnostics,
        terraform_version: String,
        config: Self::Config,
    ) -> Option<()> {
        let connected = async {
            let settings = config.resolve()?;
            info!(%terraform_version, api_host = settings.api_host, "configuring the provider");
            let client_config = ClientConfig::new(&settings.api_host, settings.credentials)?;
            let client = TaikunClient::connect(
                client_config,
                self.session.cancellation_token().clone(),
            )
            .await?;
            Ok::<_, ProviderError>(client)
        }
        .await;
        match connected {
            Ok(client) => {
                if !self.session.set_client(client) {
                    warn!("provider configured twice, keeping the first session");
                }
                Some(())
            }
            Err(err) => {
                err.report(diags);
                None
            }
        }
    }

    async fn stop(&self, _diags: &mut Diagnostics) -> Option<()> {
        info!("stopping: cancelling in-flight calls");
        self.session.cancellation_token().cancel();
        Some(())
    }

    fn get_resources(
        &self,
        _diags: &mut Diagnostics,
    ) -> Option<HashMap<String, Box<dyn DynamicResource>>> {
        Some(Catalogue::build(&self.session).resources)
    }

    fn get_data_sources(
        &self,
        _diags: &mut Diagnostics,
    ) -> Option<HashMap<String, Box<dyn DynamicDataSource>>> {
        Some(Catalogue::build(&self.session).data_sources)
    }
}
