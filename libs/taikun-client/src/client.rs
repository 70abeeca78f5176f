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

//! Session against the Taikun API: authentication, token refresh and request dispatch

use std::{future::Future, sync::Arc};

use reqwest::{Client, Method, Response, StatusCode};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};
use url::Url;

use crate::{
    auth::{
        is_expired, AuthState, Credentials, LoginCommand, RefreshCommand, TokenResponse,
        EXPIRY_SKEW,
    },
    error::{extract_message, ApiError, ApiResult},
    group::{Group, Model},
    request::{RequestBuilder, RequestParts},
};

/// Host used when none is configured
pub const DEFAULT_API_HOST: &str = "api.taikun.cloud";
/// Number of rows requested per page by list calls
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Connection settings of a [`TaikunClient`]
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub base_url: Url,
    pub credentials: Credentials,
    pub page_size: u32,
}

impl ClientConfig {
    /// Build a configuration from an API host.
    ///
    /// A bare host name is reached over https; a host that already carries a scheme is
    /// used verbatim.
    pub fn new(api_host: &str, credentials: Credentials) -> ApiResult<Self> {
        let base = if api_host.contains("://") {
            api_host.to_string()
        } else {
            format!("https://{api_host}")
        };
        Ok(Self {
            base_url: Url::parse(&base)?,
            credentials,
            page_size: DEFAULT_PAGE_SIZE,
        })
    }
}

/// Single process-wide session against the Taikun API.
///
/// Cloning is cheap: every clone shares the HTTP pool, the bearer token and the
/// cancellation token.
#[derive(Clone, Debug)]
pub struct TaikunClient {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    http: Client,
    config: ClientConfig,
    auth: RwLock<AuthState>,
    refresh_lock: Mutex<()>,
    cancel: CancellationToken,
}

impl TaikunClient {
    /// Open a session: log in with a password, or adopt a pre-issued token.
    ///
    /// # Errors
    /// [`ApiError::Authentication`] when the upstream rejects the credentials.
    pub async fn connect(config: ClientConfig, cancel: CancellationToken) -> ApiResult<Self> {
        let http = Client::builder()
            .user_agent(concat!("terraform-provider-taikun/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let client = Self {
            inner: Arc::new(Inner {
                http,
                config,
                auth: RwLock::new(AuthState::default()),
                refresh_lock: Mutex::new(()),
                cancel,
            }),
        };

        let initial = match &client.inner.config.credentials {
            Credentials::Token {
                token,
                refresh_token,
            } => TokenResponse {
                token: token.clone(),
                refresh_token: refresh_token.clone(),
            },
            Credentials::Password { .. } => client.login().await?,
        };
        *client.inner.auth.write().await = AuthState {
            token: initial.token,
            refresh_token: initial.refresh_token,
            generation: 1,
        };
        debug!(base_url = %client.inner.config.base_url, "Taikun session opened");
        Ok(client)
    }

    /// Cancellation token raced by every request of this session
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.inner.cancel
    }

    /// Start a request on an arbitrary path below `/api/v1/`
    pub fn request(&self, method: Method, path: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(self.clone(), method, path.into())
    }

    /// Typed method group for a kind of upstream entity
    pub fn group<M: Model>(&self) -> Group<M> {
        Group::new(self.clone())
    }

    pub(crate) fn page_size(&self) -> u32 {
        self.inner.config.page_size
    }

    fn url(&self, parts: &RequestParts) -> ApiResult<Url> {
        let mut url = self
            .inner
            .config
            .base_url
            .join(&format!("api/v1/{}", parts.path.trim_start_matches('/')))?;
        if !parts.query.is_empty() {
            url.query_pairs_mut().extend_pairs(parts.query.iter());
        }
        Ok(url)
    }

    /// Execute an authenticated request and return the response body.
    ///
    /// A 401 triggers one single-flight refresh and one retry; nothing else is retried here.
    pub(crate) async fn execute(&self, parts: &RequestParts) -> ApiResult<String> {
        self.cancellable(async {
            let generation = self.ensure_authenticated().await?;
            let response = self.dispatch(parts, true).await?;
            let response = if response.status() == StatusCode::UNAUTHORIZED {
                debug!(path = %parts.path, "bearer token rejected, refreshing");
                self.refresh(generation).await?;
                let retried = self.dispatch(parts, true).await?;
                if retried.status() == StatusCode::UNAUTHORIZED {
                    return Err(ApiError::Authentication(
                        "bearer token rejected after refresh".into(),
                    ));
                }
                retried
            } else {
                response
            };
            read_body(response).await
        })
        .await
    }

    async fn cancellable<T, F>(&self, fut: F) -> ApiResult<T>
    where
        F: Future<Output = ApiResult<T>>,
    {
        tokio::select! {
            _ = self.inner.cancel.cancelled() => Err(ApiError::Cancelled),
            result = fut => result,
        }
    }

    async fn dispatch(&self, parts: &RequestParts, authenticated: bool) -> ApiResult<Response> {
        let url = self.url(parts)?;
        trace!(method = %parts.method, %url, "sending request");
        let mut builder = self.inner.http.request(parts.method.clone(), url);
        if authenticated {
            let auth = self.inner.auth.read().await;
            builder = builder.bearer_auth(&auth.token);
        }
        if let Some(body) = &parts.body {
            builder = builder.json(body);
        }
        let response = builder.send().await?;
        debug!(
            method = %parts.method,
            path = %parts.path,
            status = %response.status(),
            "upstream answered"
        );
        Ok(response)
    }

    /// Refresh proactively when the current token is known to be expired
    async fn ensure_authenticated(&self) -> ApiResult<u64> {
        let (expired, generation) = {
            let auth = self.inner.auth.read().await;
            (is_expired(&auth.token, EXPIRY_SKEW), auth.generation)
        };
        if expired {
            debug!("bearer token expired, refreshing");
            self.refresh(generation).await?;
            return Ok(self.inner.auth.read().await.generation);
        }
        Ok(generation)
    }

    /// Renew the bearer token unless another request already did since `seen`
    async fn refresh(&self, seen: u64) -> ApiResult<()> {
        let _guard = self.inner.refresh_lock.lock().await;
        let current = self.inner.auth.read().await.clone();
        if current.generation != seen {
            trace!("token already refreshed by a concurrent request");
            return Ok(());
        }

        let renewed = match current.refresh_token.as_deref() {
            Some(refresh_token) => {
                let command = RefreshCommand {
                    token: &current.token,
                    refresh_token,
                };
                match self.post_token("Auth/refresh", &command).await {
                    Ok(renewed) => renewed,
                    Err(err) => {
                        warn!("token refresh failed: {err}");
                        self.login().await?
                    }
                }
            }
            None => self.login().await?,
        };

        *self.inner.auth.write().await = AuthState {
            token: renewed.token,
            refresh_token: renewed.refresh_token.or(current.refresh_token),
            generation: seen + 1,
        };
        Ok(())
    }

    async fn login(&self) -> ApiResult<TokenResponse> {
        match &self.inner.config.credentials {
            Credentials::Password { email, password } => {
                self.post_token("Auth/login", &LoginCommand { email, password })
                    .await
            }
            Credentials::Token { .. } => Err(ApiError::Authentication(
                "the pre-issued token was rejected and cannot be renewed".into(),
            )),
        }
    }

    async fn post_token<B: Serialize>(&self, path: &str, body: &B) -> ApiResult<TokenResponse> {
        let parts = RequestParts {
            method: Method::POST,
            path: path.to_string(),
            query: Vec::new(),
            body: Some(serde_json::to_value(body)?),
        };
        let response = self.dispatch(&parts, false).await?;
        let status = response.status();
        if status.is_client_error() {
            let text = response.text().await.unwrap_or_default();
            return Err(ApiError::Authentication(extract_message(&text)));
        }
        let text = read_body(response).await?;
        Ok(serde_json::from_str(&text)?)
    }
}

async fn read_body(response: Response) -> ApiResult<String> {
    let status = response.status();
    let text = response.text().await?;
    if status.is_success() {
        Ok(text)
    } else {
        Err(ApiError::Status {
            status,
            message: extract_message(&text),
        })
    }
}
