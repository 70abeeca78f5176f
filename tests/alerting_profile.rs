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

fn profile(emails: &[&str]) -> serde_json::Value {
    json!({
        "name": "on-call",
        "reminder": "Daily",
        "emails": emails,
        "webhook": [{
            "url": "https://hooks.acme.io/alerts",
            "header": [{"key": "X-Source", "value": "taikun"}],
        }],
        "integration": [{
            "type": "Pagerduty",
            "url": "https://events.pagerduty.com",
            "token": "pd-secret",
        }],
    })
}

#[tokio::test]
async fn nested_lists_are_created_then_assigned_one_by_one() {
    let host = Host::start().await;
    let state = host
        .apply("alerting_profile", None, profile(&["ops@acme.io"]))
        .await
        .ok();
    let id = id_of(&state);
    assert_eq!(host.fake.writes(), vec!["POST AlertingProfiles/create"]);

    let webhook = &state.get("webhook").elements()[0];
    assert_eq!(webhook.get("url").as_str(), Some("https://hooks.acme.io/alerts"));
    assert_eq!(
        webhook.get("header").elements()[0].get("value").as_str(),
        Some("taikun")
    );
    let integration = &state.get("integration").elements()[0];
    assert_eq!(integration.get("type").as_str(), Some("Pagerduty"));
    assert!(integration.get("id").as_str().is_some_and(|id| !id.is_empty()));

    host.fake.forget_calls();
    let state = host
        .apply(
            "alerting_profile",
            Some(&state),
            profile(&["ops@acme.io", "oncall@acme.io"]),
        )
        .await
        .ok();
    assert_eq!(
        host.fake.writes(),
        vec![format!("PUT AlertingProfiles/assignemails/{id}")]
    );
    let emails: Vec<_> = state
        .get("emails")
        .elements()
        .iter()
        .filter_map(|email| email.as_str())
        .collect();
    assert_eq!(emails, vec!["ops@acme.io", "oncall@acme.io"]);
}

#[tokio::test]
async fn integration_tokens_survive_refresh() {
    let host = Host::start().await;
    let state = host
        .apply("alerting_profile", None, profile(&[]))
        .await
        .ok();
    let id = id_of(&state);
    host.fake.edit("AlertingProfiles", id, |row| {
        if let Some(integrations) = row["integrations"].as_array_mut() {
            for integration in integrations {
                integration["token"] = json!(null);
            }
        }
    });

    let refreshed = host.read("alerting_profile", &state).await.ok();
    let integration = &refreshed.get("integration").elements()[0];
    assert_eq!(integration.get("token").as_str(), Some("pd-secret"));

    let data = host
        .data("alerting_profile", json!({"id": id.to_string()}))
        .await
        .ok();
    let integration = &data.get("integration").elements()[0];
    assert!(integration.get("token").is_null());
    assert_eq!(integration.get("type").as_str(), Some("Pagerduty"));
}

#[tokio::test]
async fn invalid_nested_values_are_reported_with_their_path() {
    let host = Host::start().await;
    let mut config = profile(&["not-an-email"]);
    config["integration"][0]["type"] = json!("Nagios");
    let diags = host.validate("alerting_profile", config).await;
    assert!(diags.errors.len() >= 2, "{diags}");
    assert!(diags
        .errors
        .iter()
        .any(|error| format!("{}", error.attribute).contains("integration")));
}

fn integrations(count: usize) -> serde_json::Value {
    let kinds = ["Pagerduty", "Opsgenie", "Splunk", "MicrosoftTeams"];
    let integrations: Vec<_> = kinds
        .iter()
        .take(count)
        .enumerate()
        .map(|(i, kind)| {
            json!({
                "type": kind,
                "url": format!("https://alerts-{i}.acme.io"),
                "token": format!("token-{i}"),
            })
        })
        .collect();
    let mut config = profile(&["ops@acme.io"]);
    config["integration"] = json!(integrations);
    config
}

#[tokio::test]
async fn growing_integrations_reassigns_them_in_place() {
    let host = Host::start().await;
    let state = host
        .apply("alerting_profile", None, integrations(2))
        .await
        .ok();
    let id = id_of(&state);
    assert_eq!(state.get("integration").elements().len(), 2);

    host.fake.forget_calls();
    let state = host
        .apply("alerting_profile", Some(&state), integrations(4))
        .await
        .ok();
    assert_eq!(id_of(&state), id);
    assert_eq!(
        host.fake.writes(),
        vec![format!("PUT AlertingProfiles/assignintegrations/{id}")]
    );
    let integrations = state.get("integration").elements();
    assert_eq!(integrations.len(), 4);
    assert_eq!(integrations[3].get("type").as_str(), Some("MicrosoftTeams"));
    assert_eq!(integrations[3].get("token").as_str(), Some("token-3"));
    let row = host.fake.row("AlertingProfiles", id).unwrap();
    assert_eq!(row["integrations"].as_array().map(Vec::len), Some(4));
}
