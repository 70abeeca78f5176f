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

//! In-process Taikun API and a minimal host driving the provider through its registry

#![allow(dead_code)]

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use serde_json::{json, Map, Value};
use terraform_provider_taikun::{
    taikun::config::Timeouts, AttributePath, Diagnostics, DynamicResource, RawValue, Registry,
    TaikunProvider, ValueAny,
};
use wiremock::{matchers::any, Mock, MockServer, Request, Respond, ResponseTemplate};

/// Organization of the caller, used when a create call names none
pub const DEFAULT_ORGANIZATION: i64 = 1;

fn organization_name(id: i64) -> String {
    match id {
        1 => "acme".to_string(),
        2 => "globex".to_string(),
        id => format!("org-{id}"),
    }
}

#[derive(Default)]
struct Store {
    next_id: i64,
    collections: BTreeMap<String, Vec<Value>>,
    calls: Vec<String>,
    failures: BTreeMap<String, (u16, String)>,
    /// Rows invisible to the next list calls, by (collection, id)
    hidden: BTreeMap<(String, i64), usize>,
    lag: usize,
}

fn as_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn strip_nulls(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|_, v| !v.is_null());
            map.values_mut().for_each(strip_nulls);
        }
        Value::Array(items) => items.iter_mut().for_each(strip_nulls),
        _ => (),
    }
}

/// `OrganizationId` query filter to `organizationId` field
fn field_name(filter: &str) -> String {
    let mut chars = filter.chars();
    match chars.next() {
        Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

fn matches(row: &Value, field: &str, wanted: &str) -> bool {
    match &row[field] {
        Value::String(s) => s == wanted,
        Value::Number(n) => n.to_string() == wanted,
        Value::Bool(b) => b.to_string() == wanted,
        _ => false,
    }
}

fn push(row: &mut Value, field: &str, item: Value) {
    if !row[field].is_array() {
        row[field] = json!([]);
    }
    if let Some(items) = row[field].as_array_mut() {
        items.push(item);
    }
}

fn retain(row: &mut Value, field: &str, keep: impl Fn(&Value) -> bool) {
    if let Some(items) = row[field].as_array_mut() {
        items.retain(|item| keep(item));
    }
}

fn ids(value: &Value) -> Vec<i64> {
    value
        .as_array()
        .map(|ids| ids.iter().filter_map(as_id).collect())
        .unwrap_or_default()
}

fn is_access_profile_item(collection: &str) -> bool {
    matches!(collection, "DnsServers" | "NtpServers" | "SshUsers" | "AllowedHost")
}

/// Field of an access profile holding the items of `collection`
fn access_profile_field(collection: &str) -> &'static str {
    match collection {
        "DnsServers" => "dnsServers",
        "NtpServers" => "ntpServers",
        "SshUsers" => "sshUsers",
        _ => "allowedHosts",
    }
}

fn ok() -> ResponseTemplate {
    ResponseTemplate::new(200)
}

fn ok_json(body: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(body)
}

fn problem(status: u16, detail: impl Into<String>) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({"title": "Error", "detail": detail.into()}))
}

fn not_found(collection: &str, id: i64) -> ResponseTemplate {
    problem(404, format!("{collection} {id} does not exist"))
}

fn locked(collection: &str, id: i64) -> ResponseTemplate {
    problem(400, format!("{collection} {id} is locked"))
}

impl Store {
    fn allocate(&mut self) -> i64 {
        self.next_id += 1;
        100 + self.next_id
    }

    fn rows(&self, collection: &str) -> &[Value] {
        self.collections
            .get(collection)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn find_mut(&mut self, collection: &str, id: i64) -> Option<&mut Value> {
        self.collections
            .get_mut(collection)?
            .iter_mut()
            .find(|row| as_id(&row["id"]) == Some(id))
    }

    /// Ids for objects nested in arrays, like the upstream gives its sub-entities
    fn number_elements(&mut self, value: &mut Value) {
        if let Value::Array(items) = value {
            for item in items {
                if let Value::Object(map) = item {
                    if !map.contains_key("id") {
                        let id = self.allocate();
                        map.insert("id".to_string(), json!(id));
                    }
                }
            }
        }
    }

    fn insert(&mut self, collection: &str, body: Value) -> i64 {
        let id = self.allocate();
        let mut row = match body {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        for value in row.values_mut() {
            self.number_elements(value);
        }
        row.insert("id".to_string(), json!(id));
        if collection != "Organizations" {
            let organization = row
                .get("organizationId")
                .and_then(as_id)
                .unwrap_or(DEFAULT_ORGANIZATION);
            row.insert("organizationId".to_string(), json!(organization));
            row.insert(
                "organizationName".to_string(),
                json!(organization_name(organization)),
            );
        }
        row.entry("isLocked").or_insert(json!(false));
        if collection == "Projects" {
            row.entry("status").or_insert(json!("Ready"));
        }
        let mut row = Value::Object(row);
        strip_nulls(&mut row);
        if self.lag > 0 {
            self.hidden.insert((collection.to_string(), id), self.lag);
        }
        self.collections
            .entry(collection.to_string())
            .or_default()
            .push(row);
        id
    }

    fn list(&mut self, collection: &str, query: &BTreeMap<String, String>) -> ResponseTemplate {
        let offset: usize = query
            .get("Offset")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        let limit: usize = query
            .get("Limit")
            .and_then(|v| v.parse().ok())
            .unwrap_or(usize::MAX);
        let filtered: Vec<Value> = self
            .rows(collection)
            .iter()
            .filter(|row| {
                query
                    .iter()
                    .filter(|(key, _)| *key != "Offset" && *key != "Limit")
                    .all(|(key, value)| matches(row, &field_name(key), value))
            })
            .cloned()
            .collect();
        let mut visible = Vec::new();
        for row in filtered {
            let key = (collection.to_string(), as_id(&row["id"]).unwrap_or_default());
            match self.hidden.get_mut(&key) {
                Some(remaining) if *remaining > 0 => *remaining -= 1,
                _ => visible.push(row),
            }
        }
        let total = visible.len();
        let data: Vec<Value> = visible.into_iter().skip(offset).take(limit).collect();
        ok_json(json!({"data": data, "totalCount": total}))
    }

    fn update(&mut self, collection: &str, id: i64, body: Value) -> ResponseTemplate {
        let Some(row) = self.find_mut(collection, id) else {
            return not_found(collection, id);
        };
        if row["isLocked"] == json!(true) {
            return locked(collection, id);
        }
        if let (Value::Object(row), Value::Object(body)) = (row, body) {
            for (key, value) in body {
                if value.is_null() {
                    row.remove(&key);
                } else {
                    row.insert(key, value);
                }
            }
        }
        ok()
    }

    fn lock(&mut self, collection: &str, body: Value) -> ResponseTemplate {
        let id = as_id(&body["id"]).unwrap_or_default();
        let mode = body["mode"].as_str() == Some("lock");
        match self.find_mut(collection, id) {
            Some(row) => {
                row["isLocked"] = json!(mode);
                ok()
            }
            None => not_found(collection, id),
        }
    }

    fn delete(&mut self, collection: &str, id: i64) -> ResponseTemplate {
        let is_locked = self
            .find_mut(collection, id)
            .map(|row| row["isLocked"] == json!(true));
        match is_locked {
            None => not_found(collection, id),
            Some(true) => locked(collection, id),
            Some(false) => {
                if let Some(rows) = self.collections.get_mut(collection) {
                    rows.retain(|row| as_id(&row["id"]) != Some(id));
                }
                ok()
            }
        }
    }

    /// `PUT AlertingProfiles/assign*/{id}`: replace one list of the profile
    fn assign(&mut self, endpoint: &str, id: i64, mut body: Value) -> ResponseTemplate {
        let field = match endpoint {
            "assignemails" => "emails",
            "assignwebhooks" => "webhooks",
            "assignintegrations" => "integrations",
            _ => return problem(404, format!("no route for {endpoint}")),
        };
        self.number_elements(&mut body);
        strip_nulls(&mut body);
        match self.find_mut("AlertingProfiles", id) {
            Some(row) => {
                row[field] = body;
                ok()
            }
            None => not_found("AlertingProfiles", id),
        }
    }

    fn project_action(&mut self, action: &str, body: Value) -> ResponseTemplate {
        let id = as_id(&body["projectId"]).unwrap_or_default();
        let Some(project) = self.find_mut("Projects", id) else {
            return not_found("Projects", id);
        };
        match action {
            "monitoring" => {
                let enabled = project["isMonitoringEnabled"] == json!(true);
                project["isMonitoringEnabled"] = json!(!enabled);
            }
            "extend" => project["expiredAt"] = body["expireAt"].clone(),
            "editquota" => {
                let mut quota = body;
                if let Some(fields) = quota.as_object_mut() {
                    fields.remove("projectId");
                }
                strip_nulls(&mut quota);
                project["quota"] = quota;
            }
            "commit" => project["status"] = json!("Ready"),
            _ => return problem(404, format!("no route for Projects/{action}")),
        }
        ok()
    }

    /// `Flavors/bind`, `Flavors/unbind`, `Images/bind` and `Images/unbind`
    fn binding(&mut self, collection: &str, action: &str, body: Value) -> ResponseTemplate {
        let project_id = as_id(&body["projectId"]).unwrap_or_default();
        let (field, key) = match collection {
            "Flavors" => ("flavors", "name"),
            _ => ("images", "imageId"),
        };
        let count = body[field].as_array().map_or(0, Vec::len);
        let new_ids: Vec<i64> = (0..count).map(|_| self.allocate()).collect();
        let Some(project) = self.find_mut("Projects", project_id) else {
            return not_found("Projects", project_id);
        };
        let mut bound = project[field].as_array().cloned().unwrap_or_default();
        match action {
            "bind" => {
                let names = body[field].as_array().cloned().unwrap_or_default();
                for (name, id) in names.into_iter().zip(new_ids) {
                    let mut row = Map::new();
                    row.insert("id".to_string(), json!(id));
                    row.insert(key.to_string(), name.clone());
                    row.insert("name".to_string(), name);
                    bound.push(Value::Object(row));
                }
            }
            "unbind" => {
                let ids: Vec<i64> = body["ids"]
                    .as_array()
                    .map(|ids| ids.iter().filter_map(as_id).collect())
                    .unwrap_or_default();
                bound.retain(|row| !as_id(&row["id"]).is_some_and(|id| ids.contains(&id)));
            }
            _ => return problem(404, format!("no route for {collection}/{action}")),
        }
        project[field] = Value::Array(bound);
        ok()
    }

    /// `Catalogs/add-app`, `Catalogs/delete-app` and the project (un)binding of catalogs
    fn catalog_action(&mut self, action: &str, body: Value) -> ResponseTemplate {
        let id = as_id(&body["catalogId"]).unwrap_or_default();
        let app_id = self.allocate();
        let Some(catalog) = self.find_mut("Catalogs", id) else {
            return not_found("Catalogs", id);
        };
        if catalog["isLocked"] == json!(true) {
            return locked("Catalogs", id);
        }
        match action {
            "add-app" => {
                let app = json!({
                    "id": app_id,
                    "name": body["name"],
                    "repository": body["repository"],
                });
                push(catalog, "boundApplications", app);
            }
            "delete-app" => {
                let app = as_id(&body["catalogAppId"]);
                retain(catalog, "boundApplications", |row| as_id(&row["id"]) != app);
            }
            "bind-project" => {
                for project in ids(&body["projectIds"]) {
                    retain(catalog, "boundProjects", |row| as_id(&row["id"]) != Some(project));
                    push(catalog, "boundProjects", json!({"id": project}));
                }
            }
            "unbind-project" => {
                let projects = ids(&body["projectIds"]);
                retain(catalog, "boundProjects", |row| {
                    !as_id(&row["id"]).is_some_and(|id| projects.contains(&id))
                });
            }
            _ => return problem(404, format!("no route for Catalogs/{action}")),
        }
        ok()
    }

    /// `Users/bindprojects` and `Users/disable`
    fn user_action(&mut self, action: &str, body: Value) -> ResponseTemplate {
        let key = if action == "bindprojects" { "userId" } else { "id" };
        let id = as_id(&body[key]).unwrap_or_default();
        let Some(user) = self.find_mut("Users", id) else {
            return not_found("Users", id);
        };
        match action {
            "bindprojects" => {
                for binding in body["projects"].as_array().cloned().unwrap_or_default() {
                    let project = as_id(&binding["projectId"]);
                    retain(user, "boundProjects", |row| as_id(&row["projectId"]) != project);
                    if binding["isBound"] == json!(true) {
                        push(user, "boundProjects", json!({"projectId": project}));
                    }
                }
            }
            "disable" => user["isDisabled"] = body["disable"].clone(),
            _ => return problem(404, format!("no route for Users/{action}")),
        }
        ok()
    }

    /// `Repositories/import`, `Repositories/bind` and `Repositories/unbind`
    fn repository_action(&mut self, action: &str, mut body: Value) -> ResponseTemplate {
        if action == "import" {
            body["isPrivate"] = json!(true);
            body["isBound"] = json!(false);
            let id = self.insert("Repositories", body);
            return ok_json(json!({"id": id}));
        }
        let id = as_id(&body["repositoryId"]).unwrap_or_default();
        let Some(repository) = self.find_mut("Repositories", id) else {
            return not_found("Repositories", id);
        };
        match action {
            "bind" => repository["isBound"] = json!(true),
            "unbind" => repository["isBound"] = json!(false),
            _ => return problem(404, format!("no route for Repositories/{action}")),
        }
        ok()
    }

    /// Item created inside its parent row, `parent_key` naming the parent in the body
    fn add_item(
        &mut self,
        parent: &str,
        parent_key: &str,
        field: &str,
        mut body: Value,
    ) -> ResponseTemplate {
        let parent_id = as_id(&body[parent_key]).unwrap_or_default();
        let id = self.allocate();
        if let Some(item) = body.as_object_mut() {
            item.remove(parent_key);
            item.insert("id".to_string(), json!(id));
        }
        strip_nulls(&mut body);
        let Some(row) = self.find_mut(parent, parent_id) else {
            return not_found(parent, parent_id);
        };
        push(row, field, body);
        ok_json(json!({"id": id}))
    }

    fn remove_item(&mut self, parent: &str, field: &str, id: i64) -> ResponseTemplate {
        let holds = |row: &Value| {
            row[field]
                .as_array()
                .is_some_and(|items| items.iter().any(|item| as_id(&item["id"]) == Some(id)))
        };
        let holder = self
            .collections
            .get_mut(parent)
            .and_then(|rows| rows.iter_mut().find(|row| holds(row)));
        match holder {
            Some(row) => {
                retain(row, field, |item| as_id(&item["id"]) != Some(id));
                ok()
            }
            None => not_found(field, id),
        }
    }

    /// `Backup/delete/schedule`: policies are named within their project
    fn delete_backup_policy(&mut self, body: Value) -> ResponseTemplate {
        let project = as_id(&body["projectId"]);
        let Some(rows) = self.collections.get_mut("Backup") else {
            return problem(404, "no backup policy");
        };
        rows.retain(|row| !(as_id(&row["projectId"]) == project && row["name"] == body["name"]));
        ok()
    }

    fn route(
        &mut self,
        method: &str,
        path: &str,
        query: &BTreeMap<String, String>,
        body: Value,
    ) -> ResponseTemplate {
        let segments: Vec<&str> = path.split('/').collect();
        let id = |raw: &str| raw.parse::<i64>().unwrap_or_default();
        match (method, segments.as_slice()) {
            ("POST", [collection, "create"]) if is_access_profile_item(collection) => {
                let field = access_profile_field(collection);
                self.add_item("AccessProfiles", "accessProfileId", field, body)
            }
            ("DELETE", [collection, raw]) if is_access_profile_item(collection) => {
                self.remove_item("AccessProfiles", access_profile_field(collection), id(raw))
            }
            ("POST", ["StandAloneProfile", "securitygroup", "create"]) => self.add_item(
                "StandAloneProfile",
                "standAloneProfileId",
                "securityGroups",
                body,
            ),
            ("DELETE", ["StandAloneProfile", "securitygroup", raw]) => {
                self.remove_item("StandAloneProfile", "securityGroups", id(raw))
            }
            ("POST", ["Backup", "delete", "schedule"]) => self.delete_backup_policy(body),
            ("GET", [collection]) => self.list(collection, query),
            ("POST", [collection, "create"]) => {
                let id = self.insert(collection, body);
                ok_json(json!({"id": id}))
            }
            ("PUT", [collection, "update", raw]) => self.update(collection, id(raw), body),
            ("POST", [collection, "lockmanager"]) => self.lock(collection, body),
            ("DELETE", [collection, raw]) => self.delete(collection, id(raw)),
            ("PUT", ["AlertingProfiles", endpoint, raw]) => self.assign(endpoint, id(raw), body),
            ("POST", ["Projects", action]) => self.project_action(action, body),
            ("POST", ["Catalogs", action]) => self.catalog_action(action, body),
            ("POST", ["Users", action]) => self.user_action(action, body),
            ("POST", ["Repositories", action]) => self.repository_action(action, body),
            ("POST", [collection @ ("Flavors" | "Images"), action]) => {
                self.binding(collection, action, body)
            }
            _ => problem(404, format!("no route for {method} {path}")),
        }
    }
}

/// Stateful stand-in for the Taikun REST API
#[derive(Clone, Default)]
pub struct FakeTaikun {
    store: Arc<Mutex<Store>>,
}

impl FakeTaikun {
    fn store(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Insert a row the way a create call would, returning its id
    pub fn seed(&self, collection: &str, row: Value) -> i64 {
        self.store().insert(collection, row)
    }

    pub fn row(&self, collection: &str, id: i64) -> Option<Value> {
        self.store().find_mut(collection, id).cloned()
    }

    pub fn edit(&self, collection: &str, id: i64, edit: impl FnOnce(&mut Value)) {
        if let Some(row) = self.store().find_mut(collection, id) {
            edit(row);
        }
    }

    /// Drop a row behind the provider's back
    pub fn remove(&self, collection: &str, id: i64) {
        if let Some(rows) = self.store().collections.get_mut(collection) {
            rows.retain(|row| as_id(&row["id"]) != Some(id));
        }
    }

    /// Answer every `call` (`METHOD Collection/suffix`) with an error
    pub fn fail(&self, call: &str, status: u16, message: &str) {
        self.store()
            .failures
            .insert(call.to_string(), (status, message.to_string()));
    }

    /// Hide the rows created from now on from the next `reads` list calls
    pub fn lag(&self, reads: usize) {
        self.store().lag = reads;
    }

    pub fn calls(&self) -> Vec<String> {
        self.store().calls.clone()
    }

    /// Calls that are neither list nor login calls
    pub fn writes(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|call| !call.starts_with("GET "))
            .collect()
    }

    pub fn forget_calls(&self) {
        self.store().calls.clear();
    }
}

impl Respond for FakeTaikun {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let path = request
            .url
            .path()
            .trim_start_matches("/api/v1/")
            .to_string();
        let method = request.method.as_str().to_string();
        let call = format!("{method} {path}");
        let mut store = self.store();
        store.calls.push(call.clone());
        if let Some((status, message)) = store.failures.get(&call).cloned() {
            return problem(status, message);
        }
        let body: Value = serde_json::from_slice(&request.body).unwrap_or(Value::Null);
        let query: BTreeMap<String, String> = request
            .url
            .query_pairs()
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();
        store.route(&method, &path, &query, body)
    }
}

pub fn encode(value: Value) -> RawValue {
    let any: ValueAny = serde_json::from_value(value).expect("valid value");
    encode_any(&any)
}

pub fn encode_any(value: &ValueAny) -> RawValue {
    RawValue::serialize(&mut Diagnostics::default(), value).expect("encodable value")
}

pub fn decode(raw: &RawValue) -> ValueAny {
    raw.deserialize(&mut Diagnostics::default())
        .expect("decodable value")
}

/// Result of one host call
#[derive(Debug)]
pub struct Outcome {
    pub state: Option<ValueAny>,
    pub diags: Diagnostics,
}

impl Outcome {
    /// State of a successful call
    #[track_caller]
    pub fn ok(self) -> ValueAny {
        assert!(!self.diags.has_errors(), "{}", self.diags);
        self.state.expect("a state")
    }

    #[track_caller]
    pub fn err(self, pattern: &str) -> Option<ValueAny> {
        assert!(
            self.diags.find_error(pattern).is_some(),
            "no error matching {pattern:?} in: {}",
            self.diags
        );
        self.state
    }
}

/// Numeric id of a state
pub fn id_of(state: &ValueAny) -> i64 {
    state
        .get("id")
        .as_str()
        .and_then(|id| id.parse().ok())
        .expect("numeric id")
}

/// Minimal stand-in for Terraform: configure once, then plan and apply
pub struct Host {
    pub fake: FakeTaikun,
    registry: Registry,
    _server: MockServer,
}

impl Host {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let fake = FakeTaikun::default();
        Mock::given(any())
            .respond_with(fake.clone())
            .mount(&server)
            .await;
        let provider = TaikunProvider::with_timeouts(Timeouts::uniform(Duration::from_secs(2)));
        let registry = Registry::new("taikun", provider);
        assert!(!registry.init_diags.has_errors(), "{}", registry.init_diags);

        let mut diags = Diagnostics::default();
        let config = encode(json!({"token": "t", "api_host": server.uri()}));
        registry
            .provider()
            .configure(&mut diags, "1.9.0".to_string(), config)
            .await;
        assert!(!diags.has_errors(), "{diags}");
        Self {
            fake,
            registry,
            _server: server,
        }
    }

    fn resource(&self, kind: &str) -> &dyn DynamicResource {
        self.registry
            .resource(&mut Diagnostics::default(), &format!("taikun_{kind}"))
            .expect("known resource")
    }

    /// `terraform plan` for one resource
    pub async fn plan(
        &self,
        kind: &str,
        prior: &ValueAny,
        config: Value,
    ) -> (ValueAny, Vec<AttributePath>) {
        let mut diags = Diagnostics::default();
        let planned = self
            .resource(kind)
            .plan_update(&mut diags, encode_any(prior), encode(config))
            .await;
        assert!(!diags.has_errors(), "{diags}");
        let (planned, replace) = planned.expect("a plan");
        (decode(&planned), replace)
    }

    /// `terraform apply` for one resource: create, update, or replace
    pub async fn apply(&self, kind: &str, prior: Option<&ValueAny>, config: Value) -> Outcome {
        let mut diags = Diagnostics::default();
        let resource = self.resource(kind);
        let state = Self::apply_raw(
            resource,
            &mut diags,
            prior.map(encode_any),
            encode(config),
        )
        .await;
        Outcome {
            state: state.map(|raw| decode(&raw)),
            diags,
        }
    }

    async fn apply_raw(
        resource: &dyn DynamicResource,
        diags: &mut Diagnostics,
        prior: Option<RawValue>,
        config: RawValue,
    ) -> Option<RawValue> {
        resource.validate(diags, config.clone()).await?;
        if diags.has_errors() {
            return None;
        }
        let Some(prior) = prior else {
            let planned = resource.plan_create(diags, config).await?;
            return resource.create(diags, planned).await;
        };
        let (planned, replace) = resource
            .plan_update(diags, prior.clone(), config.clone())
            .await?;
        if decode(&planned).same_as(&decode(&prior)) {
            return Some(prior);
        }
        if replace.is_empty() {
            return resource.update(diags, prior, planned).await;
        }
        resource.destroy(diags, prior).await?;
        let planned = resource.plan_create(diags, config).await?;
        resource.create(diags, planned).await
    }

    /// `terraform validate` for one resource
    pub async fn validate(&self, kind: &str, config: Value) -> Diagnostics {
        let mut diags = Diagnostics::default();
        self.resource(kind).validate(&mut diags, encode(config)).await;
        diags
    }

    /// Refresh; the state is [`ValueAny::Null`] once the entity is gone
    pub async fn read(&self, kind: &str, state: &ValueAny) -> Outcome {
        let mut diags = Diagnostics::default();
        let state = self.resource(kind).read(&mut diags, encode_any(state)).await;
        Outcome {
            state: state.map(|raw| decode(&raw)),
            diags,
        }
    }

    pub async fn destroy(&self, kind: &str, state: &ValueAny) -> Diagnostics {
        let mut diags = Diagnostics::default();
        self.resource(kind)
            .destroy(&mut diags, encode_any(state))
            .await;
        diags
    }

    pub async fn import(&self, kind: &str, id: &str) -> Outcome {
        let mut diags = Diagnostics::default();
        let state = self.resource(kind).import(&mut diags, id.to_string()).await;
        Outcome {
            state: state.map(|raw| decode(&raw)),
            diags,
        }
    }

    /// Read a data source, `name` without the provider prefix
    pub async fn data(&self, name: &str, config: Value) -> Outcome {
        let mut diags = Diagnostics::default();
        let state = match self
            .registry
            .data_source(&mut diags, &format!("taikun_{name}"))
        {
            Some(data_source) => {
                let config = encode(config);
                match data_source.validate(&mut diags, config.clone()).await {
                    Some(()) if !diags.has_errors() => data_source.read(&mut diags, config).await,
                    _ => None,
                }
            }
            None => None,
        };
        Outcome {
            state: state.map(|raw| decode(&raw)),
            diags,
        }
    }
}
