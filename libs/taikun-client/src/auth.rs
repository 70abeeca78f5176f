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

//! Credentials and bearer token bookkeeping

use std::{
    fmt::Debug,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use base64::Engine;
use serde::{Deserialize, Serialize};

/// Margin applied when checking token expiry
pub(crate) const EXPIRY_SKEW: Duration = Duration::from_secs(30);

/// How the client authenticates against the API
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Log in with an account email and password
    Password { email: String, password: String },
    /// Use a pre-issued bearer token, optionally with its refresh token
    Token {
        token: String,
        refresh_token: Option<String>,
    },
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::Password { email, .. } => f
                .debug_struct("Password")
                .field("email", email)
                .field("password", &"<redacted>")
                .finish(),
            Credentials::Token { .. } => f
                .debug_struct("Token")
                .field("token", &"<redacted>")
                .finish(),
        }
    }
}

/// Current bearer token shared by every request of a session.
///
/// `generation` is bumped on each refresh so that concurrent requests that saw the same
/// 401 only trigger one refresh.
#[derive(Clone, Default)]
pub(crate) struct AuthState {
    pub token: String,
    pub refresh_token: Option<String>,
    pub generation: u64,
}

impl Debug for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthState")
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginCommand<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RefreshCommand<'a> {
    pub token: &'a str,
    pub refresh_token: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TokenResponse {
    pub token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Deserialize)]
struct Claims {
    exp: Option<i64>,
}

/// Check whether a JWT bearer token is expired (or about to be).
///
/// Tokens that are not JWTs, or carry no `exp` claim, are considered valid; the upstream
/// answers 401 for those and the refresh path takes over.
pub(crate) fn is_expired(token: &str, skew: Duration) -> bool {
    let Some(payload) = token.split('.').nth(1) else {
        return false;
    };
    let Ok(decoded) =
        base64::engine::general_purpose::URL_SAFE_NO_PAD.decode(payload.trim_end_matches('='))
    else {
        return false;
    };
    let Ok(Claims { exp: Some(exp) }) = serde_json::from_slice::<Claims>(&decoded) else {
        return false;
    };
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64;
    exp <= now + skew.as_secs() as i64
}

#[cfg(test)]
pub(crate) fn forge_jwt(exp: i64) -> String {
    let engine = base64::engine::general_purpose::URL_SAFE_NO_PAD;
    format!(
        "{}.{}.signature",
        engine.encode(r#"{"alg":"HS256","typ":"JWT"}"#),
        engine.encode(format!(r#"{{"sub":"tester","exp":{exp}}}"#)),
    )
}
