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

/// State as an import sees it: secrets are never read back
fn without(state: &ValueAny, secrets: &[&str]) -> ValueAny {
    let mut state = state.clone();
    for secret in secrets {
        if let Some(value) = state.get_mut(secret) {
            *value = ValueAny::Null;
        }
    }
    state
}

fn backup_credential(lock: bool) -> serde_json::Value {
    json!({
        "name": "bc-42",
        "s3_access_key_id": "AKIAEXAMPLE",
        "s3_secret_access_key": "wJalrXUtnFEMI",
        "s3_endpoint": "https://s3.eu-west-1.amazonaws.com",
        "s3_region": "eu-west-1",
        "lock": lock,
    })
}

#[tokio::test]
async fn backup_credential_is_locked_without_touching_its_keys() {
    let host = Host::start().await;
    let state = host
        .apply("backup_credential", None, backup_credential(false))
        .await
        .ok();
    let id = id_of(&state);
    assert_eq!(host.fake.writes(), vec!["POST S3Credentials/create"]);
    assert_eq!(state.get("is_default"), &ValueAny::Bool(false));
    assert_eq!(state.get("s3_access_key_id").as_str(), Some("AKIAEXAMPLE"));
    let row = host.fake.row("S3Credentials", id).unwrap();
    assert_eq!(row["s3SecretAccessKey"], "wJalrXUtnFEMI");

    host.fake.forget_calls();
    let locked = host
        .apply("backup_credential", Some(&state), backup_credential(true))
        .await
        .ok();
    assert_eq!(host.fake.writes(), vec!["POST S3Credentials/lockmanager"]);
    assert_eq!(locked.get("lock"), &ValueAny::Bool(true));
    for attribute in ["name", "s3_endpoint", "s3_region", "s3_secret_access_key"] {
        assert!(
            locked.get(attribute).same_as(state.get(attribute)),
            "{attribute} changed"
        );
    }

    let imported = host.import("backup_credential", &id.to_string()).await.ok();
    let expected = without(&locked, &["s3_access_key_id", "s3_secret_access_key"]);
    assert!(imported.same_as(&expected), "{imported:?} != {expected:?}");

    host.fake.forget_calls();
    let diags = host.destroy("backup_credential", &locked).await;
    assert!(!diags.has_errors(), "{diags}");
    assert_eq!(
        host.fake.writes(),
        vec![
            "POST S3Credentials/lockmanager".to_string(),
            format!("DELETE S3Credentials/{id}"),
        ]
    );
    assert!(host.fake.row("S3Credentials", id).is_none());
}

fn billing_rule(credential_id: i64, price: f64) -> serde_json::Value {
    json!({
        "name": "cpu-hours",
        "metric_name": "node_cpu_seconds_total",
        "type": "Sum",
        "price": price,
        "billing_credential_id": credential_id.to_string(),
        "label": [{"label": "namespace", "value": "prod"}],
    })
}

#[tokio::test]
async fn billing_rule_prices_a_metric_of_its_credential() {
    let host = Host::start().await;
    let credential = host
        .apply(
            "billing_credential",
            None,
            json!({
                "name": "prom-billing",
                "prometheus_url": "https://prometheus.acme.io",
                "prometheus_username": "reader",
                "prometheus_password": "s3cret",
            }),
        )
        .await
        .ok();
    let credential_id = id_of(&credential);
    assert_eq!(host.fake.writes(), vec!["POST OperationCredentials/create"]);
    assert_eq!(credential.get("prometheus_password").as_str(), Some("s3cret"));
    let imported = host
        .import("billing_credential", &credential_id.to_string())
        .await
        .ok();
    let expected = without(&credential, &["prometheus_password"]);
    assert!(imported.same_as(&expected), "{imported:?} != {expected:?}");

    host.fake.forget_calls();
    let rule = host
        .apply("billing_rule", None, billing_rule(credential_id, 1.5))
        .await
        .ok();
    let id = id_of(&rule);
    assert_eq!(host.fake.writes(), vec!["POST PrometheusRules/create"]);
    let labels = rule.get("label").elements();
    assert_eq!(labels.len(), 1);
    assert_eq!(labels[0].get("value").as_str(), Some("prod"));
    let row = host.fake.row("PrometheusRules", id).unwrap();
    assert_eq!(row["operationCredentialId"], credential_id);

    host.fake.forget_calls();
    let rule = host
        .apply("billing_rule", Some(&rule), billing_rule(credential_id, 2.5))
        .await
        .ok();
    assert_eq!(id_of(&rule), id);
    assert_eq!(
        host.fake.writes(),
        vec![format!("PUT PrometheusRules/update/{id}")]
    );
    assert_eq!(rule.get("price").as_f64(), Some(2.5));
    assert_eq!(rule.get("label").elements().len(), 1);

    let imported = host.import("billing_rule", &id.to_string()).await.ok();
    assert!(imported.same_as(&rule), "{imported:?} != {rule:?}");
}

#[tokio::test]
async fn external_showback_rules_point_at_their_credential() {
    let host = Host::start().await;
    let credential = host
        .apply(
            "showback_credential",
            None,
            json!({
                "name": "sb-prom",
                "url": "https://prometheus.acme.io",
                "username": "reader",
                "password": "s3cret",
            }),
        )
        .await
        .ok();
    let credential_id = id_of(&credential);
    let imported = host
        .import("showback_credential", &credential_id.to_string())
        .await
        .ok();
    let expected = without(&credential, &["password"]);
    assert!(imported.same_as(&expected), "{imported:?} != {expected:?}");

    host.fake.forget_calls();
    let rule = host
        .apply(
            "showback_rule",
            None,
            json!({
                "name": "ext-cpu",
                "metric_name": "container_cpu_usage_seconds_total",
                "kind": "External",
                "type": "Count",
                "price": 0.5,
                "project_alert_limit": 10,
                "showback_credential_id": credential_id.to_string(),
            }),
        )
        .await
        .ok();
    let id = id_of(&rule);
    assert_eq!(host.fake.writes(), vec!["POST ShowbackRules/create"]);
    assert_eq!(rule.get("global_alert_limit").as_f64(), Some(0.0));
    assert_eq!(rule.get("project_alert_limit").as_f64(), Some(10.0));
    let credential_ref = credential_id.to_string();
    assert_eq!(
        rule.get("showback_credential_id").as_str(),
        Some(credential_ref.as_str())
    );

    let imported = host.import("showback_rule", &id.to_string()).await.ok();
    assert!(imported.same_as(&rule), "{imported:?} != {rule:?}");
}

#[tokio::test]
async fn showback_credential_follows_the_rule_kind() {
    let host = Host::start().await;
    let rule = |kind: &str, credential: Option<&str>| {
        json!({
            "name": "cpu",
            "metric_name": "cpu",
            "kind": kind,
            "type": "Count",
            "price": 1,
            "showback_credential_id": credential,
        })
    };
    let diags = host.validate("showback_rule", rule("General", Some("4"))).await;
    assert!(
        diags
            .find_error("General showback rules cannot have a showback_credential_id")
            .is_some(),
        "{diags}"
    );
    let diags = host.validate("showback_rule", rule("External", None)).await;
    assert!(diags.find_error("need a showback_credential_id").is_some(), "{diags}");
    let diags = host.validate("showback_rule", rule("General", None)).await;
    assert!(!diags.has_errors(), "{diags}");
}

fn slack(channel: &str) -> serde_json::Value {
    json!({
        "name": "ops-alerts",
        "url": "https://hooks.slack.com/services/T000/B000/XXXX",
        "channel": channel,
        "type": "Alert",
    })
}

#[tokio::test]
async fn slack_configuration_is_updated_in_place() {
    let host = Host::start().await;
    let state = host
        .apply("slack_configuration", None, slack("ops"))
        .await
        .ok();
    let id = id_of(&state);
    assert_eq!(host.fake.writes(), vec!["POST SlackConfiguration/create"]);
    assert_eq!(state.get("type").as_str(), Some("Alert"));

    host.fake.forget_calls();
    let state = host
        .apply("slack_configuration", Some(&state), slack("on-call"))
        .await
        .ok();
    assert_eq!(id_of(&state), id);
    assert_eq!(
        host.fake.writes(),
        vec![format!("PUT SlackConfiguration/update/{id}")]
    );
    assert_eq!(state.get("channel").as_str(), Some("on-call"));

    let imported = host
        .import("slack_configuration", &id.to_string())
        .await
        .ok();
    assert!(imported.same_as(&state), "{imported:?} != {state:?}");
}

#[tokio::test]
async fn backup_policy_is_named_within_its_project() {
    let host = Host::start().await;
    let project_id = host.fake.seed("Projects", json!({"name": "k8s-dev"}));
    let state = host
        .apply(
            "backup_policy",
            None,
            json!({
                "name": "nightly",
                "project_id": project_id.to_string(),
                "cron_period": "0 2 * * *",
                "retention_period": "7d",
                "included_namespaces": ["default", "prod"],
            }),
        )
        .await
        .ok();
    let composite = format!("{project_id}/nightly");
    assert_eq!(state.get("id").as_str(), Some(composite.as_str()));
    assert_eq!(host.fake.writes(), vec!["POST Backup/create"]);

    let imported = host.import("backup_policy", &composite).await.ok();
    assert!(imported.same_as(&state), "{imported:?} != {state:?}");
    host.import("backup_policy", "nightly")
        .await
        .err("<project_id>/<name>");

    host.fake.forget_calls();
    let diags = host.destroy("backup_policy", &state).await;
    assert!(!diags.has_errors(), "{diags}");
    assert_eq!(host.fake.writes(), vec!["POST Backup/delete/schedule"]);
    let refreshed = host.read("backup_policy", &state).await.ok();
    assert!(refreshed.is_null());
}

#[tokio::test]
async fn backup_retention_needs_a_unit() {
    let host = Host::start().await;
    let diags = host
        .validate(
            "backup_policy",
            json!({
                "name": "nightly",
                "project_id": "12",
                "cron_period": "0 2 * * *",
                "retention_period": "7",
                "included_namespaces": ["default"],
            }),
        )
        .await;
    assert!(diags.find_error("30m, 3h or 2d").is_some(), "{diags}");
}
