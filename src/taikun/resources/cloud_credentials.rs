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

//! Cloud credentials: one kind per cloud or hypervisor
//!
//! Every credential can only be renamed and locked in place; anything else forces a new one.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use taikun_client::{
    models::{
        AwsCredential, AzureCredential, CreateAwsCommand, CreateAzureCommand, CreateGcpCommand,
        CreateOpenstackCommand, CreateProxmoxCommand, CreateVsphereCommand, CreateZadaraCommand,
        GcpCredential, OpenstackCredential, ProxmoxCredential, ProxmoxNetwork, VsphereCredential,
        VsphereNetwork, ZadaraCredential,
    },
    Created,
};

use super::{
    audited, elements, enabled, flag, id, lock, name, number, optional, rename, required, scoped,
    string, text,
};
use crate::{
    map,
    taikun::{
        error::{ProviderError, ProviderResult},
        ids,
        kind::{lock_model, Kind},
        session::Context,
    },
    value::serde_as_vec,
    Attribute, AttributeType, Block, Diagnostics, NestedBlock, Validator, Value, ValueBool,
    ValueList, ValueNumber, ValueString,
};

macro_rules! credential_state {
    ($(#[$meta:meta])* $name:ident { $($(#[$fmeta:meta])* $field:ident : $ty:ty),* $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Default, Clone, Serialize, Deserialize)]
        #[serde(default)]
        pub struct $name {
            pub id: ValueString,
            pub name: ValueString,
            pub organization_id: ValueString,
            pub organization_name: ValueString,
            pub lock: ValueBool,
            pub is_default: ValueBool,
            pub created_by: ValueString,
            pub last_modified: ValueString,
            pub last_modified_by: ValueString,
            $($(#[$fmeta])* pub $field: $ty,)*
        }
    };
}

/// Observed state: the shared fields from the model, plus the given ones
macro_rules! observed {
    ($state:ident, $model:ident { $($field:ident : $value:expr),* $(,)? }) => {
        $state {
            id: id($model.id),
            name: string($model.name),
            organization_id: id($model.organization_id),
            organization_name: string($model.organization_name),
            lock: flag($model.is_locked),
            is_default: flag($model.is_default),
            created_by: text($model.created_by),
            last_modified: text($model.last_modified),
            last_modified_by: text($model.last_modified_by),
            $($field: $value,)*
        }
    };
}

fn credential(description: &str, specific: BTreeMap<String, Attribute>) -> Block {
    let mut attributes = audited(scoped(description));
    attributes.extend(map! {
        "name" => name(&format!("The name of the {description}.")),
        "lock" => lock(),
        "is_default" => Attribute::computed(
            AttributeType::Bool,
            format!("Indicates whether the {description} is the default one."),
        ),
    });
    attributes.extend(specific);
    Block::new(format!("Taikun {description}"), attributes)
}

fn secret(description: &str) -> Attribute {
    Attribute::required(AttributeType::String, description)
        .sensitive()
        .force_new()
}

fn fixed(description: &str) -> Attribute {
    Attribute::required(AttributeType::String, description).force_new()
}

fn az_count() -> Attribute {
    Attribute::optional(
        AttributeType::Number,
        "The number of availability zones expected for the region.",
    )
    .default_value(1i64)
    .force_new()
    .validate(Validator::IntBetween(1, 3))
}

fn zones(description: &str) -> Attribute {
    Attribute::computed(AttributeType::list_of_strings(), description)
}

fn hypervisors() -> Attribute {
    Attribute::required(AttributeType::list_of_strings(), "Hypervisors of the cluster.")
        .force_new()
}

credential_state!(
    /// AWS credential
    AwsState {
        access_key_id: ValueString,
        secret_access_key: ValueString,
        region: ValueString,
        az_count: ValueNumber,
        availability_zones: ValueList<String>,
    }
);

pub struct AwsCredentialKind;

#[async_trait]
impl Kind for AwsCredentialKind {
    const TYPE_NAME: &'static str = "cloud_credential_aws";
    const PLURAL: Option<&'static str> = Some("cloud_credentials_aws");

    type State = AwsState;
    type Model = AwsCredential;

    fn schema() -> Block {
        credential(
            "AWS cloud credential",
            map! {
                "access_key_id" => secret("The AWS access key ID."),
                "secret_access_key" => secret("The AWS secret access key."),
                "region" => fixed("The AWS region."),
                "az_count" => az_count(),
                "availability_zones" => zones("The given AWS availability zones for the region."),
            },
        )
    }

    fn observe(model: AwsCredential) -> AwsState {
        observed!(AwsState, model {
            access_key_id: Value::Null,
            secret_access_key: Value::Null,
            region: string(model.region),
            az_count: number(model.az_count),
            availability_zones: Value::Value(model.availability_zones),
        })
    }

    async fn create(cx: &Context<'_>, planned: &AwsState) -> ProviderResult<String> {
        let created: Created = cx
            .aws_credentials()
            .create(&CreateAwsCommand {
                name: required(&planned.name, "name")?.to_string(),
                access_key_id: required(&planned.access_key_id, "access_key_id")?.to_string(),
                secret_access_key: required(&planned.secret_access_key, "secret_access_key")?
                    .to_string(),
                region: required(&planned.region, "region")?.to_string(),
                az_count: planned.az_count.unwrap_or(1),
                organization_id: ids::reference(&planned.organization_id)?,
            })
            .send()
            .await?;
        Ok(created.id.to_string())
    }

    async fn update(
        cx: &Context<'_>,
        id: &str,
        prior: &AwsState,
        planned: &AwsState,
    ) -> ProviderResult<()> {
        rename::<AwsCredential>(cx, id, &prior.name, &planned.name).await
    }

    async fn set_lock(cx: &Context<'_>, id: &str, lock: bool) -> ProviderResult<()> {
        lock_model::<AwsCredential>(cx, id, lock).await
    }
}

credential_state!(
    /// Azure credential
    AzureState {
        client_id: ValueString,
        client_secret: ValueString,
        subscription_id: ValueString,
        tenant_id: ValueString,
        location: ValueString,
        az_count: ValueNumber,
        availability_zones: ValueList<String>,
    }
);

pub struct AzureCredentialKind;

#[async_trait]
impl Kind for AzureCredentialKind {
    const TYPE_NAME: &'static str = "cloud_credential_azure";
    const PLURAL: Option<&'static str> = Some("cloud_credentials_azure");

    type State = AzureState;
    type Model = AzureCredential;

    fn schema() -> Block {
        credential(
            "Azure cloud credential",
            map! {
                "client_id" => secret("The Azure client ID."),
                "client_secret" => secret("The Azure client secret."),
                "subscription_id" => fixed("The Azure subscription ID."),
                "tenant_id" => fixed("The Azure tenant ID."),
                "location" => fixed("The Azure location."),
                "az_count" => az_count(),
                "availability_zones" => zones("The given Azure availability zones for the location."),
            },
        )
    }

    fn observe(model: AzureCredential) -> AzureState {
        observed!(AzureState, model {
            client_id: Value::Null,
            client_secret: Value::Null,
            subscription_id: string(model.subscription_id),
            tenant_id: string(model.tenant_id),
            location: string(model.location),
            az_count: number(model.az_count),
            availability_zones: Value::Value(model.availability_zones),
        })
    }

    async fn create(cx: &Context<'_>, planned: &AzureState) -> ProviderResult<String> {
        let created: Created = cx
            .azure_credentials()
            .create(&CreateAzureCommand {
                name: required(&planned.name, "name")?.to_string(),
                client_id: required(&planned.client_id, "client_id")?.to_string(),
                client_secret: required(&planned.client_secret, "client_secret")?.to_string(),
                subscription_id: required(&planned.subscription_id, "subscription_id")?.to_string(),
                tenant_id: required(&planned.tenant_id, "tenant_id")?.to_string(),
                location: required(&planned.location, "location")?.to_string(),
                az_count: planned.az_count.unwrap_or(1),
                organization_id: ids::reference(&planned.organization_id)?,
            })
            .send()
            .await?;
        Ok(created.id.to_string())
    }

    async fn update(
        cx: &Context<'_>,
        id: &str,
        prior: &AzureState,
        planned: &AzureState,
    ) -> ProviderResult<()> {
        rename::<AzureCredential>(cx, id, &prior.name, &planned.name).await
    }

    async fn set_lock(cx: &Context<'_>, id: &str, lock: bool) -> ProviderResult<()> {
        lock_model::<AzureCredential>(cx, id, lock).await
    }
}

credential_state!(
    /// GCP credential, created from a service account key file
    GcpState {
        config_file: ValueString,
        billing_account_id: ValueString,
        billing_account_name: ValueString,
        folder_id: ValueString,
        import_project: ValueBool,
        region: ValueString,
        az_count: ValueNumber,
        zones: ValueList<String>,
    }
);

pub struct GcpCredentialKind;

#[async_trait]
impl Kind for GcpCredentialKind {
    const TYPE_NAME: &'static str = "cloud_credential_gcp";
    const PLURAL: Option<&'static str> = Some("cloud_credentials_gcp");
    const UNREADABLE: &'static [&'static str] = &["config_file"];

    type State = GcpState;
    type Model = GcpCredential;

    fn schema() -> Block {
        credential(
            "GCP cloud credential",
            map! {
                "config_file" => fixed("The path of the GCP service account key file."),
                "billing_account_id" => Attribute::optional(AttributeType::String, "The ID of the GCP billing account.")
                    .force_new()
                    .conflicts_with(&["import_project"]),
                "billing_account_name" => Attribute::computed(AttributeType::String, "The name of the GCP billing account."),
                "folder_id" => Attribute::optional(AttributeType::String, "The folder ID of the GCP credential.")
                    .force_new()
                    .conflicts_with(&["import_project"]),
                "import_project" => Attribute::optional(AttributeType::Bool, "Whether to import a project or not.")
                    .default_value(false)
                    .force_new(),
                "region" => fixed("The region of the GCP credential."),
                "az_count" => az_count(),
                "zones" => zones("The given zones of the GCP credential."),
            },
        )
    }

    fn check(state: &GcpState, diags: &mut Diagnostics) {
        if matches!(state.import_project, Value::Value(true)) {
            return;
        }
        for (name, value) in [
            ("billing_account_id", &state.billing_account_id),
            ("folder_id", &state.folder_id),
        ] {
            if value.is_null() {
                diags.error(
                    "Missing required argument",
                    format!("\"{name}\" is required when import_project is false"),
                    crate::AttributePath::new(name.to_string()),
                );
            }
        }
    }

    fn observe(model: GcpCredential) -> GcpState {
        observed!(GcpState, model {
            config_file: Value::Null,
            billing_account_id: text(model.billing_account_id),
            billing_account_name: text(model.billing_account_name),
            folder_id: text(model.folder_id),
            import_project: flag(model.import_project),
            region: string(model.region),
            az_count: number(model.az_count),
            zones: Value::Value(model.zones),
        })
    }

    async fn create(cx: &Context<'_>, planned: &GcpState) -> ProviderResult<String> {
        let path = required(&planned.config_file, "config_file")?;
        let config = tokio::fs::read_to_string(path).await.map_err(|err| {
            ProviderError::ConfigInvalid(format!("cannot read config_file {path:?}: {err}"))
        })?;
        let created: Created = cx
            .gcp_credentials()
            .create(&CreateGcpCommand {
                name: required(&planned.name, "name")?.to_string(),
                config,
                billing_account_id: optional(&planned.billing_account_id),
                folder_id: optional(&planned.folder_id),
                import_project: enabled(&planned.import_project),
                region: required(&planned.region, "region")?.to_string(),
                az_count: planned.az_count.unwrap_or(1),
                organization_id: ids::reference(&planned.organization_id)?,
            })
            .send()
            .await?;
        Ok(created.id.to_string())
    }

    async fn update(
        cx: &Context<'_>,
        id: &str,
        prior: &GcpState,
        planned: &GcpState,
    ) -> ProviderResult<()> {
        rename::<GcpCredential>(cx, id, &prior.name, &planned.name).await
    }

    async fn set_lock(cx: &Context<'_>, id: &str, lock: bool) -> ProviderResult<()> {
        lock_model::<GcpCredential>(cx, id, lock).await
    }
}

credential_state!(
    /// OpenStack credential
    OpenstackState {
        user: ValueString,
        password: ValueString,
        url: ValueString,
        domain: ValueString,
        project_name: ValueString,
        project_id: ValueString,
        public_network_name: ValueString,
        availability_zone: ValueString,
        region: ValueString,
        continent: ValueString,
        volume_type_name: ValueString,
        imported_network_subnet_id: ValueString,
    }
);

pub struct OpenstackCredentialKind;

#[async_trait]
impl Kind for OpenstackCredentialKind {
    const TYPE_NAME: &'static str = "cloud_credential_openstack";
    const PLURAL: Option<&'static str> = Some("cloud_credentials_openstack");

    type State = OpenstackState;
    type Model = OpenstackCredential;

    fn schema() -> Block {
        credential(
            "OpenStack cloud credential",
            map! {
                "user" => secret("The OpenStack user."),
                "password" => secret("The OpenStack password."),
                "url" => fixed("The OpenStack authentication URL.").validate(Validator::Url),
                "domain" => fixed("The OpenStack domain."),
                "project_name" => fixed("The OpenStack project name."),
                "project_id" => Attribute::computed(AttributeType::String, "The OpenStack project ID."),
                "public_network_name" => fixed("The name of the public OpenStack network to use."),
                "availability_zone" => Attribute::optional_computed(AttributeType::String, "The OpenStack availability zone.")
                    .force_new(),
                "region" => fixed("The OpenStack region."),
                "continent" => Attribute::computed(AttributeType::String, "The OpenStack continent."),
                "volume_type_name" => Attribute::optional_computed(AttributeType::String, "The OpenStack type of volume.")
                    .force_new(),
                "imported_network_subnet_id" => Attribute::optional(AttributeType::String, "The OpenStack network subnet ID to import a network.")
                    .force_new(),
            },
        )
    }

    fn observe(model: OpenstackCredential) -> OpenstackState {
        observed!(OpenstackState, model {
            user: Value::Null,
            password: Value::Null,
            url: string(model.url),
            domain: string(model.domain),
            project_name: string(model.project_name),
            project_id: text(model.project_id),
            public_network_name: string(model.public_network_name),
            availability_zone: text(model.availability_zone),
            region: string(model.region),
            continent: text(model.continent),
            volume_type_name: text(model.volume_type_name),
            imported_network_subnet_id: text(model.imported_network_subnet_id),
        })
    }

    async fn create(cx: &Context<'_>, planned: &OpenstackState) -> ProviderResult<String> {
        let created: Created = cx
            .openstack_credentials()
            .create(&CreateOpenstackCommand {
                name: required(&planned.name, "name")?.to_string(),
                user: required(&planned.user, "user")?.to_string(),
                password: required(&planned.password, "password")?.to_string(),
                url: required(&planned.url, "url")?.to_string(),
                domain: required(&planned.domain, "domain")?.to_string(),
                project_name: required(&planned.project_name, "project_name")?.to_string(),
                public_network_name: required(&planned.public_network_name, "public_network_name")?
                    .to_string(),
                availability_zone: optional(&planned.availability_zone),
                region: required(&planned.region, "region")?.to_string(),
                volume_type_name: optional(&planned.volume_type_name),
                imported_network_subnet_id: optional(&planned.imported_network_subnet_id),
                organization_id: ids::reference(&planned.organization_id)?,
            })
            .send()
            .await?;
        Ok(created.id.to_string())
    }

    async fn update(
        cx: &Context<'_>,
        id: &str,
        prior: &OpenstackState,
        planned: &OpenstackState,
    ) -> ProviderResult<()> {
        rename::<OpenstackCredential>(cx, id, &prior.name, &planned.name).await
    }

    async fn set_lock(cx: &Context<'_>, id: &str, lock: bool) -> ProviderResult<()> {
        lock_model::<OpenstackCredential>(cx, id, lock).await
    }
}

/// Network of a Proxmox cluster
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxmoxNetworkState {
    pub network: ValueString,
    pub net_mask: ValueNumber,
    pub gateway: ValueString,
    pub begin_allocation_range: ValueString,
    pub end_allocation_range: ValueString,
}

impl ProxmoxNetworkState {
    fn block(description: &str) -> NestedBlock {
        NestedBlock::Optional(Block::new(
            description,
            map! {
                "network" => fixed("Network address.").validate(Validator::Ipv4),
                "net_mask" => Attribute::required(AttributeType::Number, "Network mask bits.")
                    .force_new()
                    .validate(Validator::IntBetween(0, 32)),
                "gateway" => fixed("Gateway address.").validate(Validator::Ipv4),
                "begin_allocation_range" => fixed("First address of the allocation range.")
                    .validate(Validator::Ipv4),
                "end_allocation_range" => fixed("Last address of the allocation range.")
                    .validate(Validator::Ipv4),
            },
        ))
    }

    fn observe(network: ProxmoxNetwork) -> Value<Self> {
        if network == ProxmoxNetwork::default() {
            return Value::Null;
        }
        Value::Value(Self {
            network: string(network.network),
            net_mask: number(network.net_mask),
            gateway: string(network.gateway),
            begin_allocation_range: string(network.begin_allocation_range),
            end_allocation_range: string(network.end_allocation_range),
        })
    }

    fn command(value: &Value<Self>, name: &str) -> ProviderResult<ProxmoxNetwork> {
        let Value::Value(network) = value else {
            return Err(ProviderError::ConfigInvalid(format!("{name} is required")));
        };
        Ok(ProxmoxNetwork {
            network: required(&network.network, "network")?.to_string(),
            net_mask: network.net_mask.unwrap_or(24),
            gateway: required(&network.gateway, "gateway")?.to_string(),
            begin_allocation_range: required(
                &network.begin_allocation_range,
                "begin_allocation_range",
            )?
            .to_string(),
            end_allocation_range: required(&network.end_allocation_range, "end_allocation_range")?
                .to_string(),
        })
    }
}

fn require_block<T>(value: &Value<T>, name: &str, diags: &mut Diagnostics) {
    if value.is_null() {
        diags.error(
            "Missing required block",
            format!("At least 1 \"{name}\" block is required."),
            crate::AttributePath::new(name.to_string()),
        );
    }
}

credential_state!(
    /// Proxmox credential
    ProxmoxState {
        api_host: ValueString,
        client_id: ValueString,
        client_secret: ValueString,
        storage: ValueString,
        vm_template_name: ValueString,
        hypervisors: ValueList<String>,
        continent: ValueString,
        #[serde(with = "serde_as_vec")]
        public_network: Value<ProxmoxNetworkState>,
        #[serde(with = "serde_as_vec")]
        private_network: Value<ProxmoxNetworkState>,
    }
);

pub struct ProxmoxCredentialKind;

#[async_trait]
impl Kind for ProxmoxCredentialKind {
    const TYPE_NAME: &'static str = "cloud_credential_proxmox";
    const PLURAL: Option<&'static str> = Some("cloud_credentials_proxmox");

    type State = ProxmoxState;
    type Model = ProxmoxCredential;

    fn schema() -> Block {
        credential(
            "Proxmox cloud credential",
            map! {
                "api_host" => fixed("The Proxmox API URL.").validate(Validator::Url),
                "client_id" => secret("The Proxmox API token ID."),
                "client_secret" => secret("The Proxmox API token secret."),
                "storage" => fixed("The Proxmox storage."),
                "vm_template_name" => fixed("The Proxmox VM template."),
                "hypervisors" => hypervisors(),
                "continent" => Attribute::computed(AttributeType::String, "The Proxmox continent."),
            },
        )
        .with_block(
            "public_network",
            ProxmoxNetworkState::block("Public network of the cluster."),
        )
        .with_block(
            "private_network",
            ProxmoxNetworkState::block("Private network of the cluster."),
        )
    }

    fn check(state: &ProxmoxState, diags: &mut Diagnostics) {
        require_block(&state.public_network, "public_network", diags);
        require_block(&state.private_network, "private_network", diags);
    }

    fn observe(model: ProxmoxCredential) -> ProxmoxState {
        observed!(ProxmoxState, model {
            api_host: string(model.url),
            client_id: Value::Null,
            client_secret: Value::Null,
            storage: string(model.storage),
            vm_template_name: string(model.vm_template_name),
            hypervisors: Value::Value(model.hypervisors),
            continent: text(model.continent),
            public_network: ProxmoxNetworkState::observe(model.public_network),
            private_network: ProxmoxNetworkState::observe(model.private_network),
        })
    }

    async fn create(cx: &Context<'_>, planned: &ProxmoxState) -> ProviderResult<String> {
        let created: Created = cx
            .proxmox_credentials()
            .create(&CreateProxmoxCommand {
                name: required(&planned.name, "name")?.to_string(),
                url: required(&planned.api_host, "api_host")?.to_string(),
                token_id: required(&planned.client_id, "client_id")?.to_string(),
                token_secret: required(&planned.client_secret, "client_secret")?.to_string(),
                storage: required(&planned.storage, "storage")?.to_string(),
                vm_template_name: required(&planned.vm_template_name, "vm_template_name")?
                    .to_string(),
                hypervisors: elements(&planned.hypervisors).to_vec(),
                public_network: ProxmoxNetworkState::command(
                    &planned.public_network,
                    "public_network",
                )?,
                private_network: ProxmoxNetworkState::command(
                    &planned.private_network,
                    "private_network",
                )?,
                organization_id: ids::reference(&planned.organization_id)?,
            })
            .send()
            .await?;
        Ok(created.id.to_string())
    }

    async fn update(
        cx: &Context<'_>,
        id: &str,
        prior: &ProxmoxState,
        planned: &ProxmoxState,
    ) -> ProviderResult<()> {
        rename::<ProxmoxCredential>(cx, id, &prior.name, &planned.name).await
    }

    async fn set_lock(cx: &Context<'_>, id: &str, lock: bool) -> ProviderResult<()> {
        lock_model::<ProxmoxCredential>(cx, id, lock).await
    }
}

/// Network of a vSphere datacenter
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VsphereNetworkState {
    pub name: ValueString,
    pub ip_address: ValueString,
    pub net_mask: ValueNumber,
    pub gateway: ValueString,
    pub begin_allocation_range: ValueString,
    pub end_allocation_range: ValueString,
}

impl VsphereNetworkState {
    fn block(description: &str) -> NestedBlock {
        NestedBlock::Optional(Block::new(
            description,
            map! {
                "name" => fixed("Name of the network."),
                "ip_address" => fixed("Network address.").validate(Validator::Ipv4),
                "net_mask" => Attribute::required(AttributeType::Number, "Network mask bits.")
                    .force_new()
                    .validate(Validator::IntBetween(0, 32)),
                "gateway" => fixed("Gateway address.").validate(Validator::Ipv4),
                "begin_allocation_range" => fixed("First address of the allocation range.")
                    .validate(Validator::Ipv4),
                "end_allocation_range" => fixed("Last address of the allocation range.")
                    .validate(Validator::Ipv4),
            },
        ))
    }

    fn observe(network: VsphereNetwork) -> Value<Self> {
        if network == VsphereNetwork::default() {
            return Value::Null;
        }
        Value::Value(Self {
            name: string(network.name),
            ip_address: string(network.ip_address),
            net_mask: number(network.net_mask),
            gateway: string(network.gateway),
            begin_allocation_range: string(network.begin_allocation_range),
            end_allocation_range: string(network.end_allocation_range),
        })
    }

    fn command(value: &Value<Self>, name: &str) -> ProviderResult<VsphereNetwork> {
        let Value::Value(network) = value else {
            return Err(ProviderError::ConfigInvalid(format!("{name} is required")));
        };
        Ok(VsphereNetwork {
            name: required(&network.name, "name")?.to_string(),
            ip_address: required(&network.ip_address, "ip_address")?.to_string(),
            net_mask: network.net_mask.unwrap_or(24),
            gateway: required(&network.gateway, "gateway")?.to_string(),
            begin_allocation_range: required(
                &network.begin_allocation_range,
                "begin_allocation_range",
            )?
            .to_string(),
            end_allocation_range: required(&network.end_allocation_range, "end_allocation_range")?
                .to_string(),
        })
    }
}

credential_state!(
    /// vSphere credential
    VsphereState {
        username: ValueString,
        password: ValueString,
        api_url: ValueString,
        datacenter_name: ValueString,
        datacenter_id: ValueString,
        resource_pool: ValueString,
        data_store: ValueString,
        vm_template_name: ValueString,
        hypervisors: ValueList<String>,
        drs_enabled: ValueBool,
        continent: ValueString,
        #[serde(with = "serde_as_vec")]
        public_network: Value<VsphereNetworkState>,
        #[serde(with = "serde_as_vec")]
        private_network: Value<VsphereNetworkState>,
    }
);

pub struct VsphereCredentialKind;

#[async_trait]
impl Kind for VsphereCredentialKind {
    const TYPE_NAME: &'static str = "cloud_credential_vsphere";
    const PLURAL: Option<&'static str> = Some("cloud_credentials_vsphere");

    type State = VsphereState;
    type Model = VsphereCredential;

    fn schema() -> Block {
        credential(
            "vSphere cloud credential",
            map! {
                "username" => secret("The vSphere username."),
                "password" => secret("The vSphere password."),
                "api_url" => fixed("The vSphere API URL.").validate(Validator::Url),
                "datacenter_name" => fixed("The vSphere datacenter name."),
                "datacenter_id" => Attribute::computed(AttributeType::String, "The vSphere datacenter ID."),
                "resource_pool" => fixed("The vSphere resource pool."),
                "data_store" => fixed("The vSphere data store."),
                "vm_template_name" => fixed("The vSphere VM template."),
                "hypervisors" => hypervisors(),
                "drs_enabled" => Attribute::optional(AttributeType::Bool, "Whether DRS is enabled.")
                    .default_value(false)
                    .force_new(),
                "continent" => Attribute::computed(AttributeType::String, "The vSphere continent."),
            },
        )
        .with_block(
            "public_network",
            VsphereNetworkState::block("Public network of the datacenter."),
        )
        .with_block(
            "private_network",
            VsphereNetworkState::block("Private network of the datacenter."),
        )
    }

    fn check(state: &VsphereState, diags: &mut Diagnostics) {
        require_block(&state.public_network, "public_network", diags);
        require_block(&state.private_network, "private_network", diags);
    }

    fn observe(model: VsphereCredential) -> VsphereState {
        observed!(VsphereState, model {
            username: Value::Null,
            password: Value::Null,
            api_url: string(model.url),
            datacenter_name: string(model.datacenter_name),
            datacenter_id: text(model.datacenter_id),
            resource_pool: string(model.resource_pool),
            data_store: string(model.data_store),
            vm_template_name: string(model.vm_template_name),
            hypervisors: Value::Value(model.hypervisors),
            drs_enabled: flag(model.drs_enabled),
            continent: text(model.continent),
            public_network: VsphereNetworkState::observe(model.public_network),
            private_network: VsphereNetworkState::observe(model.private_network),
        })
    }

    async fn create(cx: &Context<'_>, planned: &VsphereState) -> ProviderResult<String> {
        let created: Created = cx
            .vsphere_credentials()
            .create(&CreateVsphereCommand {
                name: required(&planned.name, "name")?.to_string(),
                url: required(&planned.api_url, "api_url")?.to_string(),
                username: required(&planned.username, "username")?.to_string(),
                password: required(&planned.password, "password")?.to_string(),
                datacenter_name: required(&planned.datacenter_name, "datacenter_name")?.to_string(),
                resource_pool: required(&planned.resource_pool, "resource_pool")?.to_string(),
                data_store: required(&planned.data_store, "data_store")?.to_string(),
                vm_template_name: required(&planned.vm_template_name, "vm_template_name")?
                    .to_string(),
                hypervisors: elements(&planned.hypervisors).to_vec(),
                drs_enabled: enabled(&planned.drs_enabled),
                public_network: VsphereNetworkState::command(
                    &planned.public_network,
                    "public_network",
                )?,
                private_network: VsphereNetworkState::command(
                    &planned.private_network,
                    "private_network",
                )?,
                organization_id: ids::reference(&planned.organization_id)?,
            })
            .send()
            .await?;
        Ok(created.id.to_string())
    }

    async fn update(
        cx: &Context<'_>,
        id: &str,
        prior: &VsphereState,
        planned: &VsphereState,
    ) -> ProviderResult<()> {
        rename::<VsphereCredential>(cx, id, &prior.name, &planned.name).await
    }

    async fn set_lock(cx: &Context<'_>, id: &str, lock: bool) -> ProviderResult<()> {
        lock_model::<VsphereCredential>(cx, id, lock).await
    }
}

credential_state!(
    /// Zadara credential
    ZadaraState {
        access_key_id: ValueString,
        secret_access_key: ValueString,
        url: ValueString,
        region: ValueString,
        volume_type: ValueString,
        az_count: ValueNumber,
        availability_zones: ValueList<String>,
    }
);

pub struct ZadaraCredentialKind;

#[async_trait]
impl Kind for ZadaraCredentialKind {
    const TYPE_NAME: &'static str = "cloud_credential_zadara";
    const PLURAL: Option<&'static str> = Some("cloud_credentials_zadara");

    type State = ZadaraState;
    type Model = ZadaraCredential;

    fn schema() -> Block {
        credential(
            "Zadara cloud credential",
            map! {
                "access_key_id" => secret("The Zadara access key ID."),
                "secret_access_key" => secret("The Zadara secret access key."),
                "url" => fixed("The Zadara API URL.").validate(Validator::Url),
                "region" => fixed("The Zadara region."),
                "volume_type" => fixed("The Zadara volume type."),
                "az_count" => az_count(),
                "availability_zones" => zones("The given Zadara availability zones for the region."),
            },
        )
    }

    fn observe(model: ZadaraCredential) -> ZadaraState {
        observed!(ZadaraState, model {
            access_key_id: Value::Null,
            secret_access_key: Value::Null,
            url: string(model.url),
            region: string(model.region),
            volume_type: string(model.volume_type),
            az_count: number(model.az_count),
            availability_zones: Value::Value(model.availability_zones),
        })
    }

    async fn create(cx: &Context<'_>, planned: &ZadaraState) -> ProviderResult<String> {
        let created: Created = cx
            .zadara_credentials()
            .create(&CreateZadaraCommand {
                name: required(&planned.name, "name")?.to_string(),
                access_key_id: required(&planned.access_key_id, "access_key_id")?.to_string(),
                secret_access_key: required(&planned.secret_access_key, "secret_access_key")?
                    .to_string(),
                url: required(&planned.url, "url")?.to_string(),
                region: required(&planned.region, "region")?.to_string(),
                volume_type: required(&planned.volume_type, "volume_type")?.to_string(),
                az_count: planned.az_count.unwrap_or(1),
                organization_id: ids::reference(&planned.organization_id)?,
            })
            .send()
            .await?;
        Ok(created.id.to_string())
    }

    async fn update(
        cx: &Context<'_>,
        id: &str,
        prior: &ZadaraState,
        planned: &ZadaraState,
    ) -> ProviderResult<()> {
        rename::<ZadaraCredential>(cx, id, &prior.name, &planned.name).await
    }

    async fn set_lock(cx: &Context<'_>, id: &str, lock: bool) -> ProviderResult<()> {
        lock_model::<ZadaraCredential>(cx, id, lock).await
    }
}
