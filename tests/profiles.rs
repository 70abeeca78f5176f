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

mod common;

use common::{id_of, Host};
use serde_json::json;
use terraform_provider_taikun::ValueAny;

fn addresses(state: &ValueAny, block: &str) -> Vec<String> {
    let mut addresses: Vec<String> = state
        .get(block)
        .elements()
        .iter()
        .filter_map(|item| item.get("address").as_str().map(str::to_string))
        .collect();
    addresses.sort();
    addresses
}

#[tokio::test]
async fn bare_access_profile() {
    let host = Host::start().await;
    let state = host
        .apply("access_profile", None, json!({"name": "ap-001"}))
        .await
        .ok();
    let id = id_of(&state);
    assert_eq!(host.fake.writes(), vec!["POST AccessProfiles/create"]);
    assert_eq!(state.get("lock"), &ValueAny::Bool(false));
    assert_eq!(state.get("organization_id").as_str(), Some("1"));
    assert_eq!(state.get("organization_name").as_str(), Some("acme"));
    assert!(state.get("ssh_user").elements().is_empty());
    assert!(state.get("allowed_host").elements().is_empty());

    let imported = host.import("access_profile", &id.to_string()).await.ok();
    assert!(imported.same_as(&state), "{imported:?} != {state:?}");
}

#[tokio::test]
async fn access_profile_items_are_added_and_removed_one_by_one() {
    let host = Host::start().await;
    let ssh_user = json!([{"name": "ops", "public_key": "ssh-ed25519 AAAAC3Nz ops@acme"}]);
    let allowed_host = json!([{"address": "10.0.0.1", "description": "bastion"}]);
    let state = host
        .apply(
            "access_profile",
            None,
            json!({
                "name": "ap-002",
                "dns_server": [{"address": "8.8.8.8"}],
                "ssh_user": ssh_user,
                "allowed_host": allowed_host,
            }),
        )
        .await
        .ok();
    let id = id_of(&state);
    assert_eq!(host.fake.writes(), vec!["POST AccessProfiles/create"]);
    let host_entry = &state.get("allowed_host").elements()[0];
    assert_eq!(host_entry.get("mask_number").as_f64(), Some(32.0));
    let dns_id = state.get("dns_server").elements()[0]
        .get("id")
        .as_str()
        .unwrap()
        .to_string();
    let ssh_id = state.get("ssh_user").elements()[0]
        .get("id")
        .as_str()
        .unwrap()
        .to_string();

    host.fake.forget_calls();
    let state = host
        .apply(
            "access_profile",
            Some(&state),
            json!({
                "name": "ap-002",
                "dns_server": [{"address": "1.1.1.1"}, {"address": "8.8.8.8"}],
                "allowed_host": allowed_host,
            }),
        )
        .await
        .ok();
    assert_eq!(id_of(&state), id);
    assert_eq!(
        host.fake.writes(),
        vec![
            "POST DnsServers/create".to_string(),
            format!("DELETE SshUsers/{ssh_id}"),
        ]
    );
    assert_eq!(addresses(&state, "dns_server"), vec!["1.1.1.1", "8.8.8.8"]);
    assert!(state
        .get("dns_server")
        .elements()
        .iter()
        .any(|server| server.get("id").as_str() == Some(dns_id.as_str())));
    assert!(state.get("ssh_user").elements().is_empty());
    assert_eq!(state.get("allowed_host").elements().len(), 1);

    let imported = host.import("access_profile", &id.to_string()).await.ok();
    assert!(imported.same_as(&state), "{imported:?} != {state:?}");
}

#[tokio::test]
async fn allowed_hosts_must_be_ipv4() {
    let host = Host::start().await;
    let diags = host
        .validate(
            "access_profile",
            json!({"name": "ap-003", "allowed_host": [{"address": "bastion.acme.io"}]}),
        )
        .await;
    assert!(diags.has_errors(), "{diags}");
}

fn kubernetes_profile(name: &str, gpu: bool) -> serde_json::Value {
    json!({
        "name": name,
        "schedule_on_master": true,
        "nvidia_gpu_operator": gpu,
    })
}

#[tokio::test]
async fn kubernetes_profile_renames_in_place_and_replaces_on_flags() {
    let host = Host::start().await;
    let state = host
        .apply("kubernetes_profile", None, kubernetes_profile("kp-dev", false))
        .await
        .ok();
    let id = id_of(&state);
    assert_eq!(host.fake.writes(), vec!["POST KubernetesProfiles/create"]);
    assert_eq!(state.get("load_balancing_solution").as_str(), Some("Octavia"));
    assert_eq!(state.get("schedule_on_master"), &ValueAny::Bool(true));
    assert_eq!(state.get("bastion_proxy"), &ValueAny::Bool(false));
    let row = host.fake.row("KubernetesProfiles", id).unwrap();
    assert_eq!(row["octaviaEnabled"], true);
    assert_eq!(row["allowSchedulingOnMaster"], true);

    host.fake.forget_calls();
    let state = host
        .apply(
            "kubernetes_profile",
            Some(&state),
            kubernetes_profile("kp-prod", false),
        )
        .await
        .ok();
    assert_eq!(id_of(&state), id);
    assert_eq!(
        host.fake.writes(),
        vec![format!("PUT KubernetesProfiles/update/{id}")]
    );
    assert_eq!(state.get("name").as_str(), Some("kp-prod"));

    let imported = host.import("kubernetes_profile", &id.to_string()).await.ok();
    assert!(imported.same_as(&state), "{imported:?} != {state:?}");

    let (_, replace) = host
        .plan("kubernetes_profile", &state, kubernetes_profile("kp-prod", true))
        .await;
    assert_eq!(replace.len(), 1, "{replace:?}");
    host.fake.forget_calls();
    let replaced = host
        .apply(
            "kubernetes_profile",
            Some(&state),
            kubernetes_profile("kp-prod", true),
        )
        .await
        .ok();
    assert_ne!(id_of(&replaced), id);
    assert_eq!(
        host.fake.writes(),
        vec![
            format!("DELETE KubernetesProfiles/{id}"),
            "POST KubernetesProfiles/create".to_string(),
        ]
    );
    assert_eq!(replaced.get("nvidia_gpu_operator"), &ValueAny::Bool(true));
}

fn policy_profile(repos: &[&str], require_probe: bool) -> serde_json::Value {
    json!({
        "name": "opa-strict",
        "forbid_node_port": true,
        "require_probe": require_probe,
        "allowed_repos": repos,
        "ingress_whitelist": ["10.0.0.0/8"],
    })
}

#[tokio::test]
async fn policy_profile_updates_every_policy_at_once() {
    let host = Host::start().await;
    let repos = ["docker.io/acme/", "quay.io/acme/"];
    let state = host
        .apply("policy_profile", None, policy_profile(&repos, false))
        .await
        .ok();
    let id = id_of(&state);
    assert_eq!(host.fake.writes(), vec!["POST OpaProfiles/create"]);
    assert_eq!(state.get("is_default"), &ValueAny::Bool(false));
    assert!(state.get("forbid_specific_tags").elements().is_empty());

    host.fake.forget_calls();
    let reordered = ["quay.io/acme/", "docker.io/acme/"];
    let state = host
        .apply("policy_profile", Some(&state), policy_profile(&reordered, false))
        .await
        .ok();
    assert!(host.fake.writes().is_empty(), "{:?}", host.fake.writes());

    let state = host
        .apply("policy_profile", Some(&state), policy_profile(&repos, true))
        .await
        .ok();
    assert_eq!(host.fake.writes(), vec![format!("PUT OpaProfiles/update/{id}")]);
    assert_eq!(state.get("require_probe"), &ValueAny::Bool(true));
    let row = host.fake.row("OpaProfiles", id).unwrap();
    assert_eq!(row["requireProbe"], true);
    assert_eq!(row["forbidNodePort"], true);

    let imported = host.import("policy_profile", &id.to_string()).await.ok();
    assert!(imported.same_as(&state), "{imported:?} != {state:?}");
}

fn security_group(name: &str, protocol: &str, port: Option<i64>) -> serde_json::Value {
    json!({
        "name": name,
        "protocol": protocol,
        "from_port": port,
        "to_port": port,
        "cidr": "0.0.0.0/0",
    })
}

fn standalone_profile(groups: Vec<serde_json::Value>) -> serde_json::Value {
    json!({
        "name": "sp-web",
        "public_key": "ssh-ed25519 AAAAC3Nz web@acme",
        "security_group": groups,
    })
}

#[tokio::test]
async fn standalone_security_groups_are_swapped_one_by_one() {
    let host = Host::start().await;
    let ssh = security_group("ssh", "TCP", Some(22));
    let icmp = security_group("ping", "ICMP", None);
    let state = host
        .apply(
            "standalone_profile",
            None,
            standalone_profile(vec![ssh.clone(), icmp.clone()]),
        )
        .await
        .ok();
    let id = id_of(&state);
    assert_eq!(host.fake.writes(), vec!["POST StandAloneProfile/create"]);
    let groups = state.get("security_group").elements();
    assert_eq!(groups.len(), 2);
    let ssh_id = groups
        .iter()
        .find(|group| group.get("name").as_str() == Some("ssh"))
        .and_then(|group| group.get("id").as_str())
        .unwrap()
        .to_string();
    let ping = groups
        .iter()
        .find(|group| group.get("name").as_str() == Some("ping"))
        .unwrap();
    assert!(ping.get("from_port").is_null());

    host.fake.forget_calls();
    let state = host
        .apply(
            "standalone_profile",
            Some(&state),
            standalone_profile(vec![icmp.clone(), ssh]),
        )
        .await
        .ok();
    assert!(host.fake.writes().is_empty(), "{:?}", host.fake.writes());

    let https = security_group("https", "TCP", Some(443));
    let state = host
        .apply(
            "standalone_profile",
            Some(&state),
            standalone_profile(vec![icmp, https]),
        )
        .await
        .ok();
    assert_eq!(id_of(&state), id);
    assert_eq!(
        host.fake.writes(),
        vec![
            format!("DELETE StandAloneProfile/securitygroup/{ssh_id}"),
            "POST StandAloneProfile/securitygroup/create".to_string(),
        ]
    );
    let names: Vec<_> = state
        .get("security_group")
        .elements()
        .iter()
        .filter_map(|group| group.get("name").as_str())
        .collect();
    assert!(names.contains(&"https") && names.contains(&"ping"), "{names:?}");
    assert_eq!(names.len(), 2);

    let imported = host.import("standalone_profile", &id.to_string()).await.ok();
    assert!(imported.same_as(&state), "{imported:?} != {state:?}");
}

#[tokio::test]
async fn icmp_groups_cannot_have_ports() {
    let host = Host::start().await;
    let diags = host
        .validate(
            "standalone_profile",
            standalone_profile(vec![security_group("ping", "ICMP", Some(8))]),
        )
        .await;
    assert!(diags.find_error("cannot define ports").is_some(), "{diags}");
}
