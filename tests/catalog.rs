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

fn catalog(apps: &[&str]) -> serde_json::Value {
    let apps: Vec<_> = apps
        .iter()
        .map(|app| json!({"name": app, "repository": "taikun-managed-apps"}))
        .collect();
    json!({
        "name": "cat-1",
        "description": "Applications of the dev team",
        "application": apps,
    })
}

#[tokio::test]
async fn applications_are_swapped_in_place() {
    let host = Host::start().await;
    let state = host
        .apply("catalog", None, catalog(&["wordpress"]))
        .await
        .ok();
    let id = id_of(&state);
    assert_eq!(
        host.fake.writes(),
        vec!["POST Catalogs/create", "POST Catalogs/add-app"]
    );
    let apps = state.get("application").elements();
    assert_eq!(apps.len(), 1);
    assert_eq!(apps[0].get("name").as_str(), Some("wordpress"));
    let wordpress = apps[0].get("id").as_str().unwrap().to_string();
    assert!(state.get("projects").elements().is_empty());

    host.fake.forget_calls();
    let state = host
        .apply("catalog", Some(&state), catalog(&["nginx"]))
        .await
        .ok();
    assert_eq!(id_of(&state), id);
    assert_eq!(
        host.fake.writes(),
        vec!["POST Catalogs/delete-app", "POST Catalogs/add-app"]
    );
    let apps = state.get("application").elements();
    assert_eq!(apps.len(), 1);
    assert_eq!(apps[0].get("name").as_str(), Some("nginx"));
    assert_eq!(apps[0].get("repository").as_str(), Some("taikun-managed-apps"));
    assert_ne!(apps[0].get("id").as_str(), Some(wordpress.as_str()));

    let imported = host.import("catalog", &id.to_string()).await.ok();
    assert!(imported.same_as(&state), "{imported:?} != {state:?}");
}

#[tokio::test]
async fn reordered_applications_plan_no_change() {
    let host = Host::start().await;
    let state = host
        .apply("catalog", None, catalog(&["wordpress", "nginx"]))
        .await
        .ok();

    let (planned, replace) = host
        .plan("catalog", &state, catalog(&["nginx", "wordpress"]))
        .await;
    assert!(replace.is_empty(), "{replace:?}");
    assert!(planned.same_as(&state), "{planned:?} != {state:?}");

    host.fake.forget_calls();
    host.apply("catalog", Some(&state), catalog(&["nginx", "wordpress"]))
        .await
        .ok();
    assert!(host.fake.writes().is_empty(), "{:?}", host.fake.writes());
}

#[tokio::test]
async fn projects_are_bound_through_a_binding() {
    let host = Host::start().await;
    let catalog = host.apply("catalog", None, catalog(&[])).await.ok();
    let catalog_id = id_of(&catalog);
    let project_id = host.fake.seed("Projects", json!({"name": "k8s-dev"}));

    host.fake.forget_calls();
    let binding = host
        .apply(
            "catalog_project_binding",
            None,
            json!({
                "catalog_id": catalog_id.to_string(),
                "project_id": project_id.to_string(),
            }),
        )
        .await
        .ok();
    let composite = format!("{catalog_id}/{project_id}");
    assert_eq!(binding.get("id").as_str(), Some(composite.as_str()));
    assert_eq!(host.fake.writes(), vec!["POST Catalogs/bind-project"]);
    let row = host.fake.row("Catalogs", catalog_id).unwrap();
    assert_eq!(row["boundProjects"][0]["id"], project_id);

    let refreshed = host.read("catalog", &catalog).await.ok();
    let projects: Vec<_> = refreshed
        .get("projects")
        .elements()
        .iter()
        .filter_map(|project| project.as_str())
        .collect();
    assert_eq!(projects, vec![project_id.to_string()]);

    let imported = host.import("catalog_project_binding", &composite).await.ok();
    assert!(imported.same_as(&binding), "{imported:?} != {binding:?}");
    host.import("catalog_project_binding", &catalog_id.to_string())
        .await
        .err("<catalog_id>/<project_id>");

    let diags = host.destroy("catalog_project_binding", &binding).await;
    assert!(!diags.has_errors(), "{diags}");
    let row = host.fake.row("Catalogs", catalog_id).unwrap();
    assert_eq!(row["boundProjects"], json!([]));
    let refreshed = host.read("catalog_project_binding", &binding).await.ok();
    assert!(refreshed.is_null());
}

#[tokio::test]
async fn public_repositories_are_bound_and_unbound() {
    let host = Host::start().await;
    let repository_id = host.fake.seed(
        "Repositories",
        json!({
            "name": "bitnami",
            "url": "https://charts.bitnami.com/bitnami",
            "isPrivate": false,
            "isBound": false,
        }),
    );

    let state = host
        .apply("repository", None, json!({"name": "bitnami"}))
        .await
        .ok();
    assert_eq!(id_of(&state), repository_id);
    assert_eq!(host.fake.writes(), vec!["POST Repositories/bind"]);
    assert_eq!(
        state.get("url").as_str(),
        Some("https://charts.bitnami.com/bitnami")
    );
    assert_eq!(state.get("enabled"), &ValueAny::Bool(true));

    host.fake.forget_calls();
    let state = host
        .apply(
            "repository",
            Some(&state),
            json!({"name": "bitnami", "enabled": false}),
        )
        .await
        .ok();
    assert_eq!(host.fake.writes(), vec!["POST Repositories/unbind"]);
    assert_eq!(state.get("enabled"), &ValueAny::Bool(false));

    let imported = host
        .import("repository", &repository_id.to_string())
        .await
        .ok();
    assert!(imported.same_as(&state), "{imported:?} != {state:?}");

    host.fake.forget_calls();
    let diags = host.destroy("repository", &state).await;
    assert!(!diags.has_errors(), "{diags}");
    assert!(host.fake.writes().is_empty());
    assert!(host.fake.row("Repositories", repository_id).is_some());
}

#[tokio::test]
async fn unknown_public_repository_is_reported() {
    let host = Host::start().await;
    host.apply("repository", None, json!({"name": "nonexistent"}))
        .await
        .err("nonexistent");
}

#[tokio::test]
async fn private_repositories_are_imported_then_deleted() {
    let host = Host::start().await;
    let config = json!({
        "name": "acme-charts",
        "private": true,
        "url": "https://charts.acme.io",
        "username": "ci",
        "password": "s3cret",
    });
    let state = host.apply("repository", None, config).await.ok();
    let id = id_of(&state);
    assert_eq!(
        host.fake.writes(),
        vec!["POST Repositories/import", "POST Repositories/bind"]
    );
    assert_eq!(state.get("password").as_str(), Some("s3cret"));
    assert_eq!(state.get("username").as_str(), Some("ci"));
    let row = host.fake.row("Repositories", id).unwrap();
    assert_eq!(row["isPrivate"], true);
    assert_eq!(row["isBound"], true);

    let refreshed = host.read("repository", &state).await.ok();
    assert_eq!(refreshed.get("password").as_str(), Some("s3cret"));

    let diags = host.destroy("repository", &state).await;
    assert!(!diags.has_errors(), "{diags}");
    assert!(host.fake.row("Repositories", id).is_none());
}

#[tokio::test]
async fn private_repositories_need_a_url() {
    let host = Host::start().await;
    let diags = host
        .validate("repository", json!({"name": "acme-charts", "private": true}))
        .await;
    assert!(diags.find_error("need a url").is_some(), "{diags}");
}
