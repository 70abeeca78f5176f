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

//! Typed method groups: one per kind of upstream entity

use std::marker::PhantomData;

use async_stream::try_stream;
use futures::{Stream, TryStreamExt};
use reqwest::Method;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{client::TaikunClient, error::ApiResult, request::RequestBuilder};

/// Upstream entity reachable under `/api/v1/{PATH}`
pub trait Model: DeserializeOwned + Send + Unpin + 'static {
    /// Path of the entity collection, relative to `/api/v1/`
    const PATH: &'static str;
}

/// One page of a list call
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<M> {
    #[serde(default = "Vec::new")]
    pub data: Vec<M>,
    #[serde(default)]
    pub total_count: i64,
}

/// Identifier returned by create calls
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub struct Created {
    #[serde(deserialize_with = "crate::models::de::id")]
    pub id: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LockCommand {
    id: i64,
    mode: &'static str,
}

/// Method group of a [`Model`]
#[derive(Debug, Clone)]
pub struct Group<M> {
    client: TaikunClient,
    _model: PhantomData<fn() -> M>,
}

impl<M: Model> Group<M> {
    pub(crate) fn new(client: TaikunClient) -> Self {
        Self {
            client,
            _model: PhantomData,
        }
    }

    /// List entities, filtered and paged
    pub fn list(&self) -> ListBuilder<M> {
        ListBuilder {
            client: self.client.clone(),
            query: Vec::new(),
            _model: PhantomData,
        }
    }

    /// Fetch one entity by id; `None` when the list filtered by id is empty
    pub async fn get(&self, id: i64) -> ApiResult<Option<M>> {
        self.list().id(id).first().await
    }

    /// `POST {PATH}/create`
    pub fn create<B: Serialize + ?Sized>(&self, body: &B) -> RequestBuilder {
        self.request(Method::POST, "create").json(body)
    }

    /// `PUT {PATH}/update/{id}`
    pub fn update<B: Serialize + ?Sized>(&self, id: i64, body: &B) -> RequestBuilder {
        self.request(Method::PUT, &format!("update/{id}")).json(body)
    }

    /// `POST {PATH}/lockmanager`
    pub fn lock(&self, id: i64, lock: bool) -> RequestBuilder {
        let mode = if lock { "lock" } else { "unlock" };
        self.request(Method::POST, "lockmanager")
            .json(&LockCommand { id, mode })
    }

    /// `DELETE {PATH}/{id}`
    pub fn delete(&self, id: i64) -> RequestBuilder {
        self.request(Method::DELETE, &id.to_string())
    }

    /// `POST {PATH}/{action}`
    pub fn action<B: Serialize + ?Sized>(&self, action: &str, body: &B) -> RequestBuilder {
        self.request(Method::POST, action).json(body)
    }

    /// Arbitrary request below the collection path
    pub fn request(&self, method: Method, suffix: &str) -> RequestBuilder {
        let path = if suffix.is_empty() {
            M::PATH.to_string()
        } else {
            format!("{}/{}", M::PATH, suffix)
        };
        self.client.request(method, path)
    }
}

/// List call under construction
#[must_use = "a list does nothing until it is consumed"]
#[derive(Debug)]
pub struct ListBuilder<M> {
    client: TaikunClient,
    query: Vec<(String, String)>,
    _model: PhantomData<fn() -> M>,
}

impl<M: Model> ListBuilder<M> {
    /// Restrict to the entity with this id
    pub fn id(self, id: i64) -> Self {
        self.filter("Id", id)
    }

    /// Restrict to one organization
    pub fn organization_id(self, organization_id: i64) -> Self {
        self.filter("OrganizationId", organization_id)
    }

    /// Restrict with an arbitrary upstream filter
    pub fn filter<V: ToString>(mut self, key: &str, value: V) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Stream every row, fetching pages until the upstream cursor is drained
    pub fn stream(self) -> impl Stream<Item = ApiResult<M>> + Send + 'static {
        let Self { client, query, .. } = self;
        let limit = client.page_size().max(1);
        try_stream! {
            let mut offset: i64 = 0;
            loop {
                let mut request = client.request(Method::GET, M::PATH);
                for (key, value) in &query {
                    request = request.query(key, value);
                }
                let page: Page<M> = request
                    .query("Offset", offset)
                    .query("Limit", limit)
                    .send()
                    .await?;
                let fetched = page.data.len() as i64;
                for row in page.data {
                    yield row;
                }
                offset += fetched;
                if fetched == 0 || offset >= page.total_count {
                    break;
                }
            }
        }
    }

    /// Collect every row, in upstream order
    pub async fn all(self) -> ApiResult<Vec<M>> {
        self.stream().try_collect().await
    }

    /// First row, if any
    pub async fn first(self) -> ApiResult<Option<M>> {
        let stream = self.stream();
        futures::pin_mut!(stream);
        stream.try_next().await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tokio_util::sync::CancellationToken;
    use wiremock::{
        matchers::{body_json, method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    use super::*;
    use crate::{ClientConfig, Credentials};

    #[derive(Debug, Deserialize, PartialEq)]
    struct Thing {
        id: i64,
    }

    impl Model for Thing {
        const PATH: &'static str = "Things";
    }

    async fn client(server: &MockServer, page_size: u32) -> TaikunClient {
        let mut config = ClientConfig::new(
            &server.uri(),
            Credentials::Token {
                token: "token".into(),
                refresh_token: None,
            },
        )
        .unwrap();
        config.page_size = page_size;
        TaikunClient::connect(config, CancellationToken::new())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_list_drains_pages() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/Things"))
            .and(query_param("Offset", "0"))
            .and(query_param("OrganizationId", "7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                json!({"data": [{"id": 3}, {"id": 1}], "totalCount": 3}),
            ))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/Things"))
            .and(query_param("Offset", "2"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"data": [{"id": 2}], "totalCount": 3})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server, 2).await;
        let rows = client
            .group::<Thing>()
            .list()
            .organization_id(7)
            .all()
            .await
            .unwrap();
        assert_eq!(rows, vec![Thing { id: 3 }, Thing { id: 1 }, Thing { id: 2 }]);
    }

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/Things"))
            .and(query_param("Id", "42"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"data": [], "totalCount": 0})),
            )
            .mount(&server)
            .await;

        let client = client(&server, 50).await;
        assert_eq!(client.group::<Thing>().get(42).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_lock_and_create() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/Things/lockmanager"))
            .and(body_json(json!({"id": 5, "mode": "unlock"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v1/Things/create"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "17"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server, 50).await;
        let things = client.group::<Thing>();
        things.lock(5, false).execute().await.unwrap();
        let created: Created = things.create(&json!({"name": "x"})).send().await.unwrap();
        assert_eq!(created.id, 17);
    }
}
