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

fn user(role: &str, disabled: bool) -> serde_json::Value {
    json!({
        "user_name": "jdoe",
        "email": "jdoe@acme.io",
        "role": role,
        "display_name": "Jane Doe",
        "user_disabled": disabled,
    })
}

#[tokio::test]
async fn user_is_updated_then_disabled() {
    let host = Host::start().await;
    let state = host.apply("user", None, user("User", false)).await.ok();
    let id = id_of(&state);
    assert_eq!(host.fake.writes(), vec!["POST Users/create"]);
    assert_eq!(state.get("user_disabled"), &ValueAny::Bool(false));
    assert_eq!(state.get("organization_name").as_str(), Some("acme"));

    host.fake.forget_calls();
    let state = host
        .apply("user", Some(&state), user("Manager", true))
        .await
        .ok();
    assert_eq!(id_of(&state), id);
    assert_eq!(
        host.fake.writes(),
        vec![format!("PUT Users/update/{id}"), "POST Users/disable".to_string()]
    );
    assert_eq!(state.get("role").as_str(), Some("Manager"));
    assert_eq!(state.get("user_disabled"), &ValueAny::Bool(true));

    let imported = host.import("user", &id.to_string()).await.ok();
    assert!(imported.same_as(&state), "{imported:?} != {state:?}");

    host.fake.forget_calls();
    let diags = host.destroy("user", &state).await;
    assert!(!diags.has_errors(), "{diags}");
    assert_eq!(host.fake.writes(), vec![format!("DELETE Users/{id}")]);
    assert!(host.fake.row("Users", id).is_none());
}

#[tokio::test]
async fn user_role_is_checked() {
    let host = Host::start().await;
    let diags = host.validate("user", user("Owner", false)).await;
    assert!(diags.has_errors(), "{diags}");
    let diags = host
        .validate(
            "user",
            json!({"user_name": "jd", "email": "jdoe@acme.io", "role": "User"}),
        )
        .await;
    assert!(diags.has_errors(), "{diags}");
}

#[tokio::test]
async fn users_are_attached_to_projects() {
    let host = Host::start().await;
    let user_id = host.fake.seed(
        "Users",
        json!({"username": "jdoe", "email": "jdoe@acme.io", "role": "User"}),
    );
    let project_id = host.fake.seed("Projects", json!({"name": "k8s-dev"}));

    let state = host
        .apply(
            "project_user_attachment",
            None,
            json!({
                "project_id": project_id.to_string(),
                "user_id": user_id.to_string(),
            }),
        )
        .await
        .ok();
    let composite = format!("{project_id}/{user_id}");
    assert_eq!(state.get("id").as_str(), Some(composite.as_str()));
    assert_eq!(host.fake.writes(), vec!["POST Users/bindprojects"]);
    let row = host.fake.row("Users", user_id).unwrap();
    assert_eq!(row["boundProjects"][0]["projectId"], project_id);

    let imported = host
        .import("project_user_attachment", &composite)
        .await
        .ok();
    assert!(imported.same_as(&state), "{imported:?} != {state:?}");
    host.import("project_user_attachment", &user_id.to_string())
        .await
        .err("<project_id>/<user_id>");

    host.fake.forget_calls();
    let diags = host.destroy("project_user_attachment", &state).await;
    assert!(!diags.has_errors(), "{diags}");
    assert_eq!(host.fake.writes(), vec!["POST Users/bindprojects"]);
    let row = host.fake.row("Users", user_id).unwrap();
    assert_eq!(row["boundProjects"], json!([]));
    let refreshed = host.read("project_user_attachment", &state).await.ok();
    assert!(refreshed.is_null());
}
