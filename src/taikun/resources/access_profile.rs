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

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use taikun_client::{
    models::{
        AccessProfile, AccessProfileItemCommand, AllowedHost, CreateAccessProfileCommand,
        DnsServer, NtpServer, SshUser, UpdateAccessProfileCommand,
    },
    Created, Model,
};
use tracing::debug;

use super::{
    audited, diff, elements, flag, id, lock, name, number, optional, required, scoped, string,
    text, ProjectRefState,
};
use crate::{
    map,
    taikun::{
        error::ProviderResult,
        ids,
        kind::{lock_model, Kind},
        session::Context,
    },
    Attribute, AttributeType, Block, NestedBlock, Validator, Value, ValueBool, ValueList,
    ValueNumber, ValueString,
};

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressState {
    pub id: ValueString,
    pub address: ValueString,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SshUserState {
    pub id: ValueString,
    pub name: ValueString,
    pub public_key: ValueString,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AllowedHostState {
    pub id: ValueString,
    pub address: ValueString,
    pub mask_number: ValueNumber,
    pub description: ValueString,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessProfileState {
    pub id: ValueString,
    pub name: ValueString,
    pub organization_id: ValueString,
    pub organization_name: ValueString,
    pub http_proxy: ValueString,
    pub lock: ValueBool,
    pub created_by: ValueString,
    pub last_modified: ValueString,
    pub last_modified_by: ValueString,
    pub project: ValueList<ProjectRefState>,
    pub dns_server: ValueList<AddressState>,
    pub ntp_server: ValueList<AddressState>,
    pub ssh_user: ValueList<SshUserState>,
    pub allowed_host: ValueList<AllowedHostState>,
}

impl AddressState {
    fn command(&self) -> ProviderResult<String> {
        required(&self.address, "address").map(str::to_string)
    }
}

impl SshUserState {
    fn command(&self) -> ProviderResult<SshUser> {
        Ok(SshUser {
            id: 0,
            name: required(&self.name, "name")?.to_string(),
            ssh_public_key: required(&self.public_key, "public_key")?.to_string(),
        })
    }
}

impl AllowedHostState {
    fn command(&self) -> ProviderResult<AllowedHost> {
        Ok(AllowedHost {
            id: 0,
            ip_address: required(&self.address, "address")?.to_string(),
            mask_bits: self.mask_number.unwrap_or(32),
            description: optional(&self.description),
        })
    }
}

fn item(description: &str, mut attributes: BTreeMap<String, Attribute>) -> NestedBlock {
    attributes.insert(
        "id".to_string(),
        Attribute::computed(AttributeType::String, format!("ID of the {description}.")),
    );
    NestedBlock::Set(Block::new(format!("List of {description}s."), attributes))
}

/// Create one item of the profile under the collection of `M`
async fn add<M: Model, T: Serialize + Send + Sync>(
    cx: &Context<'_>,
    access_profile_id: i64,
    item: T,
) -> ProviderResult<()> {
    let _: Created = cx
        .group::<M>()
        .create(&AccessProfileItemCommand {
            access_profile_id,
            item,
        })
        .send()
        .await?;
    Ok(())
}

async fn remove<M: Model>(cx: &Context<'_>, id: &ValueString) -> ProviderResult<()> {
    let id = ids::numeric(required(id, "id")?)?;
    cx.group::<M>().delete(id).execute().await?;
    Ok(())
}

pub struct AccessProfileKind;

impl AccessProfileKind {
    async fn sync_addresses<M: Model>(
        cx: &Context<'_>,
        profile: i64,
        prior: &ValueList<AddressState>,
        planned: &ValueList<AddressState>,
        make: fn(String) -> M,
    ) -> ProviderResult<()>
    where
        M: Serialize + Sync,
    {
        let (removed, added) = diff(elements(prior), elements(planned), |s| s.address.clone());
        for server in removed {
            remove::<M>(cx, &server.id).await?;
        }
        for server in added {
            add::<M, M>(cx, profile, make(server.command()?)).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Kind for AccessProfileKind {
    const TYPE_NAME: &'static str = "access_profile";
    const PLURAL: Option<&'static str> = Some("access_profiles");

    type State = AccessProfileState;
    type Model = AccessProfile;

    fn schema() -> Block {
        let mut attributes = audited(scoped("access profile"));
        attributes.extend(map! {
            "name" => name("The name of the access profile."),
            "http_proxy" => Attribute::optional(AttributeType::String, "HTTP proxy of the access profile."),
            "lock" => lock(),
            "project" => ProjectRefState::attribute("List of associated projects."),
        });
        Block::new("Taikun access profile", attributes)
            .with_block(
                "dns_server",
                item("DNS server", map! {
                    "address" => Attribute::required(AttributeType::String, "Address of the DNS server."),
                }),
            )
            .with_block(
                "ntp_server",
                item("NTP server", map! {
                    "address" => Attribute::required(AttributeType::String, "Address of the NTP server."),
                }),
            )
            .with_block(
                "ssh_user",
                item("SSH user", map! {
                    "name" => Attribute::required(AttributeType::String, "Name of the SSH user."),
                    "public_key" => Attribute::required(AttributeType::String, "Public key of the SSH user."),
                }),
            )
            .with_block(
                "allowed_host",
                item("allowed host", map! {
                    "address" => Attribute::required(AttributeType::String, "IPv4 address of the host.")
                        .validate(Validator::Ipv4),
                    "mask_number" => Attribute::optional(AttributeType::Number, "Number of bits of the network mask.")
                        .default_value(32i64)
                        .validate(Validator::IntBetween(0, 32)),
                    "description" => Attribute::optional(AttributeType::String, "Description of the host."),
                }),
            )
    }

    fn observe(model: AccessProfile) -> AccessProfileState {
        let server = |server_id: i64, address: String| AddressState {
            id: id(server_id),
            address: string(address),
        };
        AccessProfileState {
            id: id(model.id),
            name: string(model.name),
            organization_id: id(model.organization_id),
            organization_name: string(model.organization_name),
            http_proxy: text(model.http_proxy),
            lock: flag(model.is_locked),
            created_by: text(model.created_by),
            last_modified: text(model.last_modified),
            last_modified_by: text(model.last_modified_by),
            project: ProjectRefState::observe(model.projects),
            dns_server: Value::Value(
                model
                    .dns_servers
                    .into_iter()
                    .map(|s| server(s.id, s.address))
                    .collect(),
            ),
            ntp_server: Value::Value(
                model
                    .ntp_servers
                    .into_iter()
                    .map(|s| server(s.id, s.address))
                    .collect(),
            ),
            ssh_user: Value::Value(
                model
                    .ssh_users
                    .into_iter()
                    .map(|user| SshUserState {
                        id: id(user.id),
                        name: string(user.name),
                        public_key: string(user.ssh_public_key),
                    })
                    .collect(),
            ),
            allowed_host: Value::Value(
                model
                    .allowed_hosts
                    .into_iter()
                    .map(|host| AllowedHostState {
                        id: id(host.id),
                        address: string(host.ip_address),
                        mask_number: number(host.mask_bits),
                        description: text(host.description),
                    })
                    .collect(),
            ),
        }
    }

    async fn create(cx: &Context<'_>, planned: &AccessProfileState) -> ProviderResult<String> {
        let addresses = |list: &ValueList<AddressState>| {
            elements(list)
                .iter()
                .map(AddressState::command)
                .collect::<ProviderResult<Vec<_>>>()
        };
        let command = CreateAccessProfileCommand {
            name: required(&planned.name, "name")?.to_string(),
            organization_id: ids::reference(&planned.organization_id)?,
            http_proxy: optional(&planned.http_proxy),
            dns_servers: addresses(&planned.dns_server)?
                .into_iter()
                .map(|address| DnsServer { id: 0, address })
                .collect(),
            ntp_servers: addresses(&planned.ntp_server)?
                .into_iter()
                .map(|address| NtpServer { id: 0, address })
                .collect(),
            ssh_users: elements(&planned.ssh_user)
                .iter()
                .map(SshUserState::command)
                .collect::<ProviderResult<_>>()?,
            allowed_hosts: elements(&planned.allowed_host)
                .iter()
                .map(AllowedHostState::command)
                .collect::<ProviderResult<_>>()?,
        };
        let created: Created = cx.access_profiles().create(&command).send().await?;
        Ok(created.id.to_string())
    }

    async fn update(
        cx: &Context<'_>,
        id: &str,
        prior: &AccessProfileState,
        planned: &AccessProfileState,
    ) -> ProviderResult<()> {
        let profile = ids::numeric(id)?;
        let command = UpdateAccessProfileCommand {
            name: required(&planned.name, "name")?.to_string(),
            http_proxy: optional(&planned.http_proxy),
        };
        let before = UpdateAccessProfileCommand {
            name: prior.name.as_str().to_string(),
            http_proxy: optional(&prior.http_proxy),
        };
        if before != command {
            cx.access_profiles().update(profile, &command).execute().await?;
        }

        Self::sync_addresses(cx, profile, &prior.dns_server, &planned.dns_server, |address| {
            DnsServer { id: 0, address }
        })
        .await?;
        Self::sync_addresses(cx, profile, &prior.ntp_server, &planned.ntp_server, |address| {
            NtpServer { id: 0, address }
        })
        .await?;

        let (removed, added) = diff(elements(&prior.ssh_user), elements(&planned.ssh_user), |u| {
            (u.name.clone(), u.public_key.clone())
        });
        for user in removed {
            remove::<SshUser>(cx, &user.id).await?;
        }
        for user in added {
            add::<SshUser, _>(cx, profile, user.command()?).await?;
        }

        let (removed, added) = diff(
            elements(&prior.allowed_host),
            elements(&planned.allowed_host),
            |h| (h.address.clone(), h.mask_number.clone(), h.description.clone()),
        );
        debug!(removed = removed.len(), added = added.len(), "allowed hosts");
        for host in removed {
            remove::<AllowedHost>(cx, &host.id).await?;
        }
        for host in added {
            add::<AllowedHost, _>(cx, profile, host.command()?).await?;
        }
        Ok(())
    }

    async fn set_lock(cx: &Context<'_>, id: &str, lock: bool) -> ProviderResult<()> {
        lock_model::<AccessProfile>(cx, id, lock).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{plan, utils::to_any, Diagnostics};

    #[test]
    fn bare_profile_plans_empty_blocks() {
        let config = to_any(
            &AccessProfileState {
                name: "ap-001".into(),
                ..Default::default()
            },
            &mut Diagnostics::default(),
        )
        .unwrap();
        let planned = plan::plan_create(&AccessProfileKind::schema(), &config);
        assert_eq!(planned.get("lock"), &crate::ValueAny::Bool(false));
        assert!(planned.get("ssh_user").elements().is_empty());
        assert!(planned.get("allowed_host").elements().is_empty());
        assert!(planned.get("organization_id").is_unknown());
    }

    #[test]
    fn host_defaults_to_a_single_address() {
        let host = AllowedHostState {
            address: "10.0.0.1".into(),
            ..Default::default()
        };
        assert_eq!(host.command().unwrap().mask_bits, 32);
    }
}
