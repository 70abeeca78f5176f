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
use terraform_provider_taikun::{AttributePath, ValueAny};

const CREDENTIAL: &str = "5";

fn project(monitoring: bool, quota: i64, flavors: &[&str]) -> serde_json::Value {
    json!({
        "name": "k8s-dev",
        "cloud_credential_id": CREDENTIAL,
        "monitoring": monitoring,
        "quota_cpu_units": quota,
        "flavors": flavors,
        "expiration_date": "01/04/2999",
    })
}

fn strings(value: &ValueAny) -> Vec<&str> {
    let mut strings: Vec<&str> = value.elements().iter().filter_map(ValueAny::as_str).collect();
    strings.sort_unstable();
    strings
}

#[tokio::test]
async fn creation_reconciles_what_create_cannot_carry() {
    let host = Host::start().await;
    let state = host
        .apply("project", None, project(true, 8, &["m1.small", "m1.large"]))
        .await
        .ok();
    let id = id_of(&state);

    assert_eq!(
        host.fake.writes(),
        vec![
            "POST Projects/create",
            "POST Flavors/bind",
            "POST Projects/monitoring",
            "POST Projects/extend",
            "POST Projects/editquota",
        ]
    );
    assert_eq!(state.get("organization_id").as_str(), Some("1"));
    assert_eq!(state.get("organization_name").as_str(), Some("acme"));
    assert_eq!(state.get("status").as_str(), Some("Ready"));
    assert_eq!(state.get("monitoring"), &ValueAny::Bool(true));
    assert_eq!(state.get("expiration_date").as_str(), Some("01/04/2999"));
    assert_eq!(state.get("quota_cpu_units"), &ValueAny::Number(8));
    assert!(state.get("quota_ram_size").is_null());
    assert_eq!(strings(state.get("flavors")), vec!["m1.large", "m1.small"]);
    assert!(state.get("server_kubeworker").is_empty());

    let row = host.fake.row("Projects", id).unwrap();
    assert_eq!(row["expiredAt"], "2999-04-01T00:00:00Z");
    assert_eq!(row["quota"], json!({"serverCpu": 8}));

    let (planned, replace) = host
        .plan("project", &state, project(true, 8, &["m1.small", "m1.large"]))
        .await;
    assert!(planned.same_as(&state), "{planned:?} != {state:?}");
    assert!(replace.is_empty());
}

#[tokio::test]
async fn updates_only_touch_what_changed() {
    let host = Host::start().await;
    let state = host
        .apply("project", None, project(true, 8, &["m1.small", "m1.large"]))
        .await
        .ok();

    host.fake.forget_calls();
    let state = host
        .apply("project", Some(&state), project(false, 8, &["m1.small"]))
        .await
        .ok();
    assert_eq!(
        host.fake.writes(),
        vec!["POST Flavors/unbind", "POST Projects/monitoring"]
    );
    assert_eq!(state.get("monitoring"), &ValueAny::Bool(false));
    assert_eq!(strings(state.get("flavors")), vec!["m1.small"]);
}

#[tokio::test]
async fn failed_step_reports_what_was_applied() {
    let host = Host::start().await;
    let state = host
        .apply("project", None, project(true, 8, &["m1.small"]))
        .await
        .ok();
    host.fake
        .fail("POST Projects/editquota", 400, "quota is below the current usage");

    let outcome = host
        .apply("project", Some(&state), project(false, 4, &["m1.small"]))
        .await;
    let error = outcome
        .diags
        .find_error("Update partially applied")
        .expect("a partial failure")
        .clone();
    assert!(error.detail.contains("monitoring"), "{}", error.detail);
    assert!(error.detail.contains("below the current usage"), "{}", error.detail);

    let saved = outcome.state.expect("the state reached upstream");
    assert_eq!(saved.get("monitoring"), &ValueAny::Bool(false));
    assert_eq!(saved.get("quota_cpu_units"), &ValueAny::Number(8));
}

#[tokio::test]
async fn renaming_replaces_the_project() {
    let host = Host::start().await;
    let state = host
        .apply("project", None, project(false, 8, &[]))
        .await
        .ok();
    let old = id_of(&state);

    let mut renamed = project(false, 8, &[]);
    renamed["name"] = json!("k8s-prod");
    let (_, replace) = host.plan("project", &state, renamed.clone()).await;
    assert_eq!(replace, vec![AttributePath::new("name")]);

    let state = host.apply("project", Some(&state), renamed).await.ok();
    assert_ne!(id_of(&state), old);
    assert_eq!(state.get("name").as_str(), Some("k8s-prod"));
    assert!(host.fake.row("Projects", old).is_none());
}

#[tokio::test]
async fn incomplete_autoscaler_is_rejected() {
    let host = Host::start().await;
    let mut config = project(false, 8, &["m1.small"]);
    config["autoscaler_name"] = json!("scaler");
    config["autoscaler_flavor"] = json!("m1.medium");
    let diags = host.validate("project", config).await;
    assert!(diags.find_error("autoscaler_min_size is required").is_some(), "{diags}");
    assert!(diags.find_error("must be listed in flavors").is_some(), "{diags}");
}

#[tokio::test]
async fn data_sources_match_the_resource() {
    let host = Host::start().await;
    let state = host
        .apply("project", None, project(true, 8, &["m1.small"]))
        .await
        .ok();
    let id = id_of(&state);
    host.fake.seed(
        "Projects",
        json!({"name": "other", "organizationId": 2, "cloudCredentialId": 9}),
    );

    let single = host
        .data("project", json!({"id": id.to_string()}))
        .await
        .ok();
    for attribute in [
        "name",
        "organization_id",
        "monitoring",
        "expiration_date",
        "quota_cpu_units",
    ] {
        assert!(
            single.get(attribute).same_as(state.get(attribute)),
            "{attribute}: {:?} != {:?}",
            single.get(attribute),
            state.get(attribute)
        );
    }
    assert_eq!(strings(single.get("flavors")), vec!["m1.small"]);

    let all = host.data("projects", json!({})).await.ok();
    assert_eq!(all.get("id").as_str(), Some("all"));
    assert_eq!(all.get("projects").elements().len(), 2);

    let acme = host
        .data("projects", json!({"organization_id": "1"}))
        .await
        .ok();
    assert_eq!(acme.get("id").as_str(), Some("1"));
    let names: Vec<_> = acme
        .get("projects")
        .elements()
        .iter()
        .filter_map(|row| row.get("name").as_str())
        .collect();
    assert_eq!(names, vec!["k8s-dev"]);

    host.data("project", json!({"id": "999999"}))
        .await
        .err("project not found");
}

#[tokio::test]
async fn flavors_are_listed_within_bounds() {
    let host = Host::start().await;
    for (name, cpu, ram) in [("m1.tiny", 1, 1), ("m1.small", 2, 4), ("m1.xlarge", 16, 64)] {
        host.fake.seed(
            "Flavors",
            json!({"cloudId": 5, "name": name, "cpu": cpu, "ram": ram}),
        );
    }
    host.fake
        .seed("Flavors", json!({"cloudId": 6, "name": "other", "cpu": 4, "ram": 8}));

    let listed = host
        .data("flavors", json!({"cloud_credential_id": CREDENTIAL, "max_cpu": 8}))
        .await
        .ok();
    assert_eq!(listed.get("id").as_str(), Some(CREDENTIAL));
    let names: Vec<_> = listed
        .get("flavors")
        .elements()
        .iter()
        .filter_map(|flavor| flavor.get("name").as_str())
        .collect();
    assert_eq!(names, vec!["m1.small"]);

    host.data(
        "flavors",
        json!({"cloud_credential_id": CREDENTIAL, "min_ram": 16, "max_ram": 8}),
    )
    .await
    .err("min_ram exceeds max_ram");
}
