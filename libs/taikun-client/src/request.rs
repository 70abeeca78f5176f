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

use reqwest::Method;
use serde::{de::DeserializeOwned, Serialize};

use crate::{client::TaikunClient, error::ApiResult};

#[derive(Clone, Debug)]
pub(crate) struct RequestParts {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

/// Request prepared by a method group; nothing is sent until [`send`](Self::send) or
/// [`execute`](Self::execute) is awaited.
#[must_use = "a request does nothing until it is sent"]
#[derive(Debug)]
pub struct RequestBuilder {
    client: TaikunClient,
    parts: RequestParts,
    encode_error: Option<serde_json::Error>,
}

impl RequestBuilder {
    pub(crate) fn new(client: TaikunClient, method: Method, path: String) -> Self {
        Self {
            client,
            parts: RequestParts {
                method,
                path,
                query: Vec::new(),
                body: None,
            },
            encode_error: None,
        }
    }

    /// Append a query parameter
    pub fn query<V: ToString>(mut self, key: &str, value: V) -> Self {
        self.parts.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Append a query parameter when the value is present
    pub fn query_opt<V: ToString>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    /// Set the JSON body
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Self {
        match serde_json::to_value(body) {
            Ok(body) => self.parts.body = Some(body),
            Err(err) => self.encode_error = Some(err),
        }
        self
    }

    /// Send the request and decode the response body
    pub async fn send<T: DeserializeOwned>(self) -> ApiResult<T> {
        if let Some(err) = self.encode_error {
            return Err(err.into());
        }
        let body = self.client.execute(&self.parts).await?;
        let body = if body.trim().is_empty() {
            "null"
        } else {
            body.as_str()
        };
        Ok(serde_json::from_str(body)?)
    }

    /// Send the request and discard the response body
    pub async fn execute(self) -> ApiResult<()> {
        if let Some(err) = self.encode_error {
            return Err(err.into());
        }
        self.client.execute(&self.parts).await.map(|_| ())
    }
}
