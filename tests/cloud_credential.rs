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

use std::io::Write;

use common::{id_of, Host};
use serde_json::json;
use terraform_provider_taikun::{utils::random_name, ValueAny};

const KEY_FILE: &str = r#"{"type": "service_account", "project_id": "acme-dev"}"#;

fn key_file() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(KEY_FILE.as_bytes()).unwrap();
    file
}

fn gcp(name: &str, config_file: &str) -> serde_json::Value {
    json!({
        "name": name,
        "config_file": config_file,
        "import_project": true,
        "region": "europe-west1",
        "organization_id": "2",
    })
}

#[tokio::test]
async fn key_file_is_uploaded_and_its_path_kept() {
    let host = Host::start().await;
    let file = key_file();
    let path = file.path().to_str().unwrap().to_string();
    let name = random_name("tf-acc");

    let state = host
        .apply("cloud_credential_gcp", None, gcp(&name, &path))
        .await
        .ok();
    let id = id_of(&state);
    let row = host.fake.row("Gcp", id).unwrap();
    assert_eq!(row["config"], KEY_FILE);
    assert_eq!(row["azCount"], 1);
    assert_eq!(state.get("config_file").as_str(), Some(path.as_str()));
    assert_eq!(state.get("organization_name").as_str(), Some("globex"));

    let refreshed = host.read("cloud_credential_gcp", &state).await.ok();
    assert_eq!(refreshed.get("config_file").as_str(), Some(path.as_str()));

    host.fake.forget_calls();
    let renamed = random_name("tf-acc");
    let (_, replace) = host
        .plan("cloud_credential_gcp", &refreshed, gcp(&renamed, &path))
        .await;
    assert!(replace.is_empty(), "{replace:?}");
    let state = host
        .apply("cloud_credential_gcp", Some(&refreshed), gcp(&renamed, &path))
        .await
        .ok();
    assert_eq!(host.fake.writes(), vec![format!("PUT Gcp/update/{id}")]);
    assert_eq!(state.get("name").as_str(), Some(renamed.as_str()));
}

#[tokio::test]
async fn unreadable_key_file_fails_before_any_call() {
    let host = Host::start().await;
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.json");

    host.apply(
        "cloud_credential_gcp",
        None,
        gcp("gcp-dev", missing.to_str().unwrap()),
    )
    .await
    .err("cannot read config_file");
    assert!(host.fake.writes().is_empty());
}

#[tokio::test]
async fn billing_is_required_unless_a_project_is_imported() {
    let host = Host::start().await;
    let mut config = gcp("gcp-dev", "/nonexistent/key.json");
    config["import_project"] = json!(false);
    let diags = host.validate("cloud_credential_gcp", config).await;
    assert!(diags.find_error("billing_account_id").is_some(), "{diags}");
    assert!(diags.find_error("folder_id").is_some(), "{diags}");
}

/// Create, rename in place, then import a credential whose secrets are never read back
async fn renamed_in_place(kind: &str, path: &str, mut config: serde_json::Value, secrets: &[&str]) {
    let host = Host::start().await;
    let kind = format!("cloud_credential_{kind}");
    let state = host.apply(&kind, None, config.clone()).await.ok();
    let id = id_of(&state);
    assert_eq!(host.fake.writes(), vec![format!("POST {path}/create")]);
    for secret in secrets {
        assert_eq!(state.get(secret).as_str(), config[*secret].as_str(), "{secret}");
    }
    assert_eq!(state.get("lock"), &ValueAny::Bool(false));
    assert_eq!(state.get("is_default"), &ValueAny::Bool(false));

    host.fake.forget_calls();
    config["name"] = json!("renamed-credential");
    let (_, replace) = host.plan(&kind, &state, config.clone()).await;
    assert!(replace.is_empty(), "{replace:?}");
    let state = host.apply(&kind, Some(&state), config).await.ok();
    assert_eq!(id_of(&state), id);
    assert_eq!(host.fake.writes(), vec![format!("PUT {path}/update/{id}")]);
    assert_eq!(state.get("name").as_str(), Some("renamed-credential"));

    let imported = host.import(&kind, &id.to_string()).await.ok();
    let mut expected = state.clone();
    for secret in secrets {
        if let Some(value) = expected.get_mut(secret) {
            *value = ValueAny::Null;
        }
    }
    assert!(imported.same_as(&expected), "{imported:?} != {expected:?}");
}

#[tokio::test]
async fn aws_credential_keeps_its_id_when_renamed() {
    let host = Host::start().await;
    let config = |name: &str| {
        json!({
            "name": name,
            "access_key_id": "AKIAEXAMPLE",
            "secret_access_key": "wJalrXUtnFEMI",
            "region": "eu-west-1",
            "az_count": 3,
        })
    };
    let state = host
        .apply("cloud_credential_aws", None, config("cc-aws"))
        .await
        .ok();
    let id = id_of(&state);
    assert_eq!(state.get("az_count").as_f64(), Some(3.0));
    assert_eq!(host.fake.row("Aws", id).unwrap()["azCount"], 3);

    host.fake.forget_calls();
    let state = host
        .apply("cloud_credential_aws", Some(&state), config("cc-aws-2"))
        .await
        .ok();
    assert_eq!(id_of(&state), id);
    assert_eq!(host.fake.writes(), vec![format!("PUT Aws/update/{id}")]);
    assert_eq!(state.get("name").as_str(), Some("cc-aws-2"));
    assert_eq!(state.get("access_key_id").as_str(), Some("AKIAEXAMPLE"));
    assert_eq!(state.get("az_count").as_f64(), Some(3.0));
}

#[tokio::test]
async fn aws_zone_count_is_bounded() {
    let host = Host::start().await;
    let diags = host
        .validate(
            "cloud_credential_aws",
            json!({
                "name": "cc-aws",
                "access_key_id": "AKIAEXAMPLE",
                "secret_access_key": "wJalrXUtnFEMI",
                "region": "eu-west-1",
                "az_count": 4,
            }),
        )
        .await;
    assert!(diags.has_errors(), "{diags}");
}

#[tokio::test]
async fn azure_credential_round_trip() {
    renamed_in_place(
        "azure",
        "Azure",
        json!({
            "name": "cc-azure",
            "client_id": "00000000-client",
            "client_secret": "azure-secret",
            "subscription_id": "00000000-subscription",
            "tenant_id": "00000000-tenant",
            "location": "westeurope",
            "az_count": 2,
        }),
        &["client_id", "client_secret"],
    )
    .await;
}

#[tokio::test]
async fn openstack_credential_round_trip() {
    renamed_in_place(
        "openstack",
        "Openstack",
        json!({
            "name": "cc-openstack",
            "user": "admin",
            "password": "openstack-secret",
            "url": "https://keystone.acme.io:5000/v3",
            "domain": "default",
            "project_name": "k8s",
            "public_network_name": "public",
            "region": "RegionOne",
            "volume_type_name": "ssd",
        }),
        &["user", "password"],
    )
    .await;
}

fn network(prefix: &str) -> serde_json::Value {
    json!({
        "net_mask": 24,
        "gateway": format!("{prefix}.1"),
        "begin_allocation_range": format!("{prefix}.10"),
        "end_allocation_range": format!("{prefix}.100"),
    })
}

#[tokio::test]
async fn proxmox_credential_round_trip() {
    let mut public = network("192.168.1");
    public["network"] = json!("192.168.1.0");
    let mut private = network("10.0.0");
    private["network"] = json!("10.0.0.0");
    renamed_in_place(
        "proxmox",
        "Proxmox",
        json!({
            "name": "cc-proxmox",
            "api_host": "https://pve.acme.io:8006/api2/json",
            "client_id": "terraform@pve!taikun",
            "client_secret": "proxmox-secret",
            "storage": "local-lvm",
            "vm_template_name": "ubuntu-22.04",
            "hypervisors": ["pve-1", "pve-2"],
            "public_network": [public],
            "private_network": [private],
        }),
        &["client_id", "client_secret"],
    )
    .await;
}

#[tokio::test]
async fn proxmox_needs_both_networks() {
    let host = Host::start().await;
    let diags = host
        .validate(
            "cloud_credential_proxmox",
            json!({
                "name": "cc-proxmox",
                "api_host": "https://pve.acme.io:8006/api2/json",
                "client_id": "terraform@pve!taikun",
                "client_secret": "proxmox-secret",
                "storage": "local-lvm",
                "vm_template_name": "ubuntu-22.04",
                "hypervisors": ["pve-1"],
            }),
        )
        .await;
    assert!(diags.find_error("public_network").is_some(), "{diags}");
    assert!(diags.find_error("private_network").is_some(), "{diags}");
}

#[tokio::test]
async fn vsphere_credential_round_trip() {
    let mut public = network("192.168.1");
    public["name"] = json!("VM Network");
    public["ip_address"] = json!("192.168.1.0");
    let mut private = network("10.0.0");
    private["name"] = json!("k8s-private");
    private["ip_address"] = json!("10.0.0.0");
    renamed_in_place(
        "vsphere",
        "Vsphere",
        json!({
            "name": "cc-vsphere",
            "username": "administrator@vsphere.local",
            "password": "vsphere-secret",
            "api_url": "https://vcenter.acme.io",
            "datacenter_name": "dc-1",
            "resource_pool": "k8s",
            "data_store": "datastore1",
            "vm_template_name": "ubuntu-22.04",
            "hypervisors": ["esxi-1"],
            "public_network": [public],
            "private_network": [private],
        }),
        &["username", "password"],
    )
    .await;
}

#[tokio::test]
async fn zadara_credential_round_trip() {
    renamed_in_place(
        "zadara",
        "Zadara",
        json!({
            "name": "cc-zadara",
            "access_key_id": "zadara-key",
            "secret_access_key": "zadara-secret",
            "url": "https://cloud.zadara.acme.io",
            "region": "eu-central",
            "volume_type": "gp2",
        }),
        &["access_key_id", "secret_access_key"],
    )
    .await;
}
