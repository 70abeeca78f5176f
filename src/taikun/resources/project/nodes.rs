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

//! Kubernetes nodes of a project
//!
//! Nodes never change in place: a node whose settings differ is deleted and added again, and
//! the project commits the changes once for the whole batch.

use serde::{Deserialize, Serialize};
use taikun_client::models::{CreateServerCommand, DeleteServersCommand, Server};
use tracing::info;

use super::{commit, KeyValueState, ProjectState};
use crate::{
    map,
    taikun::{
        error::ProviderResult,
        ids,
        resources::{diff, elements, id, number, required, string, text},
        session::Context,
    },
    Attribute, AttributePath, AttributeType, Block, Diagnostics, NestedBlock, Validator,
    ValueList, ValueNumber, ValueString,
};

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerState {
    pub id: ValueString,
    pub name: ValueString,
    pub flavor: ValueString,
    pub disk_size: ValueNumber,
    pub ip: ValueString,
    pub status: ValueString,
    pub created_by: ValueString,
    pub kubernetes_node_label: ValueList<KeyValueState>,
}

/// Node roles, with the block holding each
pub(super) const ROLES: [(&str, &str); 3] = [
    ("server_bastion", Server::BASTION),
    ("server_kubemaster", Server::KUBEMASTER),
    ("server_kubeworker", Server::KUBEWORKER),
];

type NodeKey<'a> = (&'a str, &'a str, i64, Vec<(&'a str, &'a str)>);

impl ServerState {
    pub(super) fn block(role: &str) -> NestedBlock {
        NestedBlock::Set(
            Block::new(
                format!("{role} nodes of the project. Changing a node recreates it."),
                map! {
                    "id" => Attribute::computed(AttributeType::String, "ID of the node."),
                    "name" => Attribute::required(AttributeType::String, "Name of the node.")
                        .validate(Validator::Length(1, 30))
                        .validate(Validator::Regex("^[a-z0-9-]+$", "expected lowercase letters, digits and dashes")),
                    "flavor" => Attribute::required(AttributeType::String, "Flavor of the node, bound to the project in `flavors`."),
                    "disk_size" => Attribute::optional(AttributeType::Number, "Disk size of the node in GiB.")
                        .default_value(30i64)
                        .validate(Validator::IntBetween(30, 8192)),
                    "ip" => Attribute::computed(AttributeType::String, "IP address of the node."),
                    "status" => Attribute::computed(AttributeType::String, "Status of the node."),
                    "created_by" => Attribute::computed(AttributeType::String, "The creator of the node."),
                },
            )
            .with_block(
                "kubernetes_node_label",
                KeyValueState::block("Kubernetes labels of the node."),
            ),
        )
    }

    pub(super) fn observe(server: Server) -> Self {
        Self {
            id: id(server.id),
            name: string(server.name),
            flavor: string(server.flavor),
            disk_size: number(server.disk_size),
            ip: text(server.ip_address),
            status: text(server.status),
            created_by: text(server.created_by),
            kubernetes_node_label: KeyValueState::observe(server.kubernetes_node_labels),
        }
    }

    /// Settings a node is created with; any difference means a new node
    fn key(&self) -> NodeKey<'_> {
        let mut labels: Vec<_> = elements(&self.kubernetes_node_label)
            .iter()
            .map(|label| (label.key.as_str(), label.value.as_str()))
            .collect();
        labels.sort_unstable();
        (
            self.name.as_str(),
            self.flavor.as_str(),
            self.disk_size.clone().unwrap_or(30),
            labels,
        )
    }

    fn command(&self, project_id: i64, role: &str) -> ProviderResult<CreateServerCommand> {
        Ok(CreateServerCommand {
            project_id,
            name: required(&self.name, "name")?.to_string(),
            role: role.to_string(),
            flavor: required(&self.flavor, "flavor")?.to_string(),
            disk_size: self.disk_size.clone().unwrap_or(30),
            kubernetes_node_labels: KeyValueState::commands(&self.kubernetes_node_label)?,
        })
    }
}

/// Nodes of one role, in a project state
pub(super) fn of_role<'a>(state: &'a ProjectState, block: &str) -> &'a ValueList<ServerState> {
    match block {
        "server_bastion" => &state.server_bastion,
        "server_kubemaster" => &state.server_kubemaster,
        _ => &state.server_kubeworker,
    }
}

/// Whether the project has kubernetes nodes at all
pub(super) fn any(state: &ProjectState) -> bool {
    ROLES
        .iter()
        .any(|(block, _)| !elements(of_role(state, block)).is_empty())
}

/// One bastion, at least one master and one worker, all of them on bound flavors
pub(super) fn check(state: &ProjectState, diags: &mut Diagnostics) {
    if !any(state) {
        return;
    }
    let count = |block| elements(of_role(state, block)).len();
    if !state.server_bastion.is_unknown() && count("server_bastion") != 1 {
        diags.error(
            "Invalid bastion",
            "A kubernetes project needs exactly one bastion",
            AttributePath::new("server_bastion"),
        );
    }
    for block in ["server_kubemaster", "server_kubeworker"] {
        if !of_role(state, block).is_unknown() && count(block) == 0 {
            diags.error(
                "Missing nodes",
                format!("A kubernetes project needs at least one {block} node"),
                AttributePath::new(block),
            );
        }
    }
    let Some(flavors) = state.flavors.as_ref_option() else {
        return;
    };
    for (block, _) in ROLES {
        for (i, server) in elements(of_role(state, block)).iter().enumerate() {
            if let Some(flavor) = server.flavor.as_ref_option() {
                if !flavors.contains(flavor) {
                    diags.error(
                        "Unbound flavor",
                        format!("Flavor {flavor:?} must be listed in flavors"),
                        AttributePath::new(block)
                            .index(i as i64)
                            .attribute("flavor"),
                    );
                }
            }
        }
    }
}

/// Delete the nodes that changed, add the new ones and commit
///
/// Returns whether anything was committed.
pub(super) async fn reconcile(
    cx: &Context<'_>,
    project_id: i64,
    prior: &ProjectState,
    planned: &ProjectState,
) -> ProviderResult<bool> {
    let mut removed = Vec::new();
    let mut added = Vec::new();
    for (block, role) in ROLES {
        let (gone, new) = diff(
            elements(of_role(prior, block)),
            elements(of_role(planned, block)),
            ServerState::key,
        );
        for server in gone {
            removed.push(ids::numeric(required(&server.id, "server id")?)?);
        }
        for server in new {
            added.push(server.command(project_id, role)?);
        }
    }
    if removed.is_empty() && added.is_empty() {
        return Ok(false);
    }
    info!(project_id, removed = removed.len(), added = added.len(), "reconciling kubernetes nodes");

    if !removed.is_empty() {
        delete(cx, project_id, removed).await?;
    }
    for command in &added {
        cx.servers().create(command).execute().await?;
    }
    commit(cx, project_id, "Projects").await?;
    Ok(true)
}

pub(super) async fn delete(
    cx: &Context<'_>,
    project_id: i64,
    server_ids: Vec<i64>,
) -> ProviderResult<()> {
    cx.servers()
        .action(
            "delete",
            &DeleteServersCommand {
                project_id,
                server_ids,
            },
        )
        .execute()
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Value;

    fn node(name: &str, flavor: &str) -> ServerState {
        ServerState {
            name: name.into(),
            flavor: flavor.into(),
            disk_size: Value::Value(30),
            kubernetes_node_label: Value::Value(vec![]),
            ..Default::default()
        }
    }

    #[test]
    fn changed_nodes_are_replaced() {
        let prior = [
            ServerState {
                id: "1".into(),
                ..node("w1", "m1.small")
            },
            ServerState {
                id: "2".into(),
                ..node("w2", "m1.small")
            },
        ];
        let planned = [node("w1", "m1.small"), node("w2", "m1.large")];
        let (removed, added) = diff(&prior, &planned, ServerState::key);
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].id.as_str(), "2");
        assert_eq!(added[0].flavor.as_str(), "m1.large");
    }

    #[test]
    fn incomplete_clusters_are_rejected() {
        let mut state = ProjectState {
            flavors: Value::Value(vec!["m1.small".to_string()]),
            server_bastion: Value::Value(vec![node("b", "m1.small")]),
            server_kubemaster: Value::Value(vec![node("m", "m1.small")]),
            server_kubeworker: Value::Value(vec![]),
            ..Default::default()
        };
        let mut diags = Diagnostics::default();
        check(&state, &mut diags);
        assert!(diags.find_error("server_kubeworker").is_some());

        state.server_kubeworker = Value::Value(vec![node("w", "m1.xlarge")]);
        let mut diags = Diagnostics::default();
        check(&state, &mut diags);
        assert!(diags.find_error("must be listed in flavors").is_some());

        state.flavors = Value::Value(vec!["m1.small".to_string(), "m1.xlarge".to_string()]);
        let mut diags = Diagnostics::default();
        check(&state, &mut diags);
        assert!(!diags.has_errors(), "{diags}");
    }
}
