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

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use taikun_client::{
    models::{
        CreateSecurityGroupCommand, CreateStandaloneProfileCommand, SecurityGroup,
        StandaloneProfile,
    },
    Created,
};

use super::{diff, elements, flag, id, lock, name, rename, required, scoped, string};
use crate::{
    map,
    taikun::{
        error::ProviderResult,
        ids,
        kind::{lock_model, Kind},
        session::Context,
    },
    Attribute, AttributePath, AttributeType, Block, Diagnostics, NestedBlock, Validator, Value,
    ValueBool, ValueList, ValueNumber, ValueString,
};

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityGroupState {
    pub id: ValueString,
    pub name: ValueString,
    pub protocol: ValueString,
    pub from_port: ValueNumber,
    pub to_port: ValueNumber,
    pub cidr: ValueString,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StandaloneProfileState {
    pub id: ValueString,
    pub name: ValueString,
    pub organization_id: ValueString,
    pub organization_name: ValueString,
    pub lock: ValueBool,
    pub public_key: ValueString,
    pub security_group: ValueList<SecurityGroupState>,
}

const ICMP: &str = "ICMP";

impl SecurityGroupState {
    fn command(&self) -> ProviderResult<SecurityGroup> {
        let protocol = required(&self.protocol, "protocol")?.to_uppercase();
        let icmp = protocol == ICMP;
        Ok(SecurityGroup {
            id: 0,
            name: required(&self.name, "name")?.to_string(),
            port_min_range: (!icmp).then(|| self.from_port.clone().as_option()).flatten(),
            port_max_range: (!icmp).then(|| self.to_port.clone().as_option()).flatten(),
            protocol,
            remote_ip_prefix: required(&self.cidr, "cidr")?.to_string(),
        })
    }
}

pub struct StandaloneProfileKind;

#[async_trait]
impl Kind for StandaloneProfileKind {
    const TYPE_NAME: &'static str = "standalone_profile";
    const PLURAL: Option<&'static str> = Some("standalone_profiles");

    type State = StandaloneProfileState;
    type Model = StandaloneProfile;

    fn schema() -> Block {
        let mut attributes = scoped("standalone profile");
        attributes.extend(map! {
            "name" => name("The name of the standalone profile."),
            "lock" => lock(),
            "public_key" => Attribute::required(AttributeType::String, "The public key of the standalone profile.")
                .force_new(),
        });
        Block::new("Taikun standalone profile", attributes).with_block(
            "security_group",
            NestedBlock::Set(Block::new(
                "List of security groups.",
                map! {
                    "id" => Attribute::computed(AttributeType::String, "ID of the security group."),
                    "name" => Attribute::required(AttributeType::String, "Name of the security group."),
                    "protocol" => Attribute::required(AttributeType::String, "Protocol: TCP, UDP or ICMP.")
                        .validate(Validator::OneOf(&["TCP", "UDP", "ICMP"])),
                    "from_port" => Attribute::optional(AttributeType::Number, "Minimum range port number.")
                        .validate(Validator::IntBetween(0, 65535)),
                    "to_port" => Attribute::optional(AttributeType::Number, "Maximum range port number.")
                        .validate(Validator::IntBetween(0, 65535)),
                    "cidr" => Attribute::required(AttributeType::String, "Remote IP prefix, for example 0.0.0.0/0.")
                        .validate(Validator::Cidr),
                },
            )),
        )
    }

    fn check(state: &StandaloneProfileState, diags: &mut Diagnostics) {
        for (i, group) in elements(&state.security_group).iter().enumerate() {
            let path = AttributePath::new("security_group").index(i as i64);
            let Some(protocol) = group.protocol.as_ref_option() else {
                continue;
            };
            let ports = [group.from_port.is_null(), group.to_port.is_null()];
            if protocol.eq_ignore_ascii_case(ICMP) {
                if ports.contains(&false) {
                    diags.error(
                        "Invalid security group",
                        "ICMP security groups cannot define ports",
                        path,
                    );
                }
            } else if ports.contains(&true) {
                diags.error(
                    "Invalid security group",
                    format!("{protocol} security groups need both from_port and to_port"),
                    path,
                );
            } else if let (Value::Value(from), Value::Value(to)) =
                (&group.from_port, &group.to_port)
            {
                if from > to {
                    diags.error(
                        "Invalid security group",
                        "from_port must not exceed to_port",
                        path,
                    );
                }
            }
        }
    }

    fn observe(model: StandaloneProfile) -> StandaloneProfileState {
        StandaloneProfileState {
            id: id(model.id),
            name: string(model.name),
            organization_id: id(model.organization_id),
            organization_name: string(model.organization_name),
            lock: flag(model.is_locked),
            public_key: string(model.public_key),
            security_group: Value::Value(
                model
                    .security_groups
                    .into_iter()
                    .map(|group| SecurityGroupState {
                        id: id(group.id),
                        name: string(group.name),
                        protocol: string(group.protocol.to_uppercase()),
                        from_port: group.port_min_range.into(),
                        to_port: group.port_max_range.into(),
                        cidr: string(group.remote_ip_prefix),
                    })
                    .collect(),
            ),
        }
    }

    async fn create(cx: &Context<'_>, planned: &StandaloneProfileState) -> ProviderResult<String> {
        let created: Created = cx
            .standalone_profiles()
            .create(&CreateStandaloneProfileCommand {
                name: required(&planned.name, "name")?.to_string(),
                organization_id: ids::reference(&planned.organization_id)?,
                public_key: required(&planned.public_key, "public_key")?.to_string(),
                security_groups: elements(&planned.security_group)
                    .iter()
                    .map(SecurityGroupState::command)
                    .collect::<ProviderResult<_>>()?,
            })
            .send()
            .await?;
        Ok(created.id.to_string())
    }

    async fn update(
        cx: &Context<'_>,
        id: &str,
        prior: &StandaloneProfileState,
        planned: &StandaloneProfileState,
    ) -> ProviderResult<()> {
        rename::<StandaloneProfile>(cx, id, &prior.name, &planned.name).await?;
        let profile = ids::numeric(id)?;
        let (removed, added) = diff(
            elements(&prior.security_group),
            elements(&planned.security_group),
            |group| group.command().ok(),
        );
        for group in removed {
            let group_id = ids::numeric(required(&group.id, "security_group.id")?)?;
            cx.security_groups().delete(group_id).execute().await?;
        }
        for group in added {
            let group = group.command()?;
            let _: Created = cx
                .security_groups()
                .create(&CreateSecurityGroupCommand {
                    stand_alone_profile_id: profile,
                    group,
                })
                .send()
                .await?;
        }
        Ok(())
    }

    async fn set_lock(cx: &Context<'_>, id: &str, lock: bool) -> ProviderResult<()> {
        lock_model::<StandaloneProfile>(cx, id, lock).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(protocol: &str, from: Option<i64>, to: Option<i64>) -> SecurityGroupState {
        SecurityGroupState {
            name: "sg".into(),
            protocol: protocol.into(),
            from_port: from.into(),
            to_port: to.into(),
            cidr: "0.0.0.0/0".into(),
            ..Default::default()
        }
    }

    fn check(groups: Vec<SecurityGroupState>) -> Diagnostics {
        let mut diags = Diagnostics::default();
        StandaloneProfileKind::check(
            &StandaloneProfileState {
                security_group: Value::Value(groups),
                ..Default::default()
            },
            &mut diags,
        );
        diags
    }

    #[test]
    fn port_rules_follow_the_protocol() {
        let valid = vec![group("ICMP", None, None), group("TCP", Some(22), Some(22))];
        assert!(!check(valid).has_errors());
        assert!(check(vec![group("ICMP", Some(1), None)]).has_errors());
        assert!(check(vec![group("UDP", Some(53), None)]).has_errors());
        assert!(check(vec![group("TCP", Some(90), Some(80))]).has_errors());
    }

    #[test]
    fn icmp_groups_drop_ports() {
        let command = group("icmp", Some(1), Some(2)).command().unwrap();
        assert_eq!(command.protocol, "ICMP");
        assert_eq!(command.port_min_range, None);
    }
}
