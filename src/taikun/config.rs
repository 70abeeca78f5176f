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

//! Provider configuration: credentials, API host and operation timeouts

use std::time::Duration;

use serde::{Deserialize, Serialize};
use taikun_client::{Credentials, DEFAULT_API_HOST};

use super::error::{ProviderError, ProviderResult};
use crate::{map, Attribute, AttributeType, Block, Schema, ValueString};

pub const ENV_EMAIL: &str = "TAIKUN_EMAIL";
pub const ENV_PASSWORD: &str = "TAIKUN_PASSWORD";
pub const ENV_TOKEN: &str = "TAIKUN_TOKEN";
pub const ENV_API_HOST: &str = "TAIKUN_API_HOST";

/// Provider block
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub email: ValueString,
    pub password: ValueString,
    pub token: ValueString,
    pub api_host: ValueString,
}

/// Settings resolved from the provider block and the environment
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_host: String,
    pub credentials: Credentials,
}

impl ProviderConfig {
    pub fn schema() -> Schema {
        Schema::new(Block::new(
            "Taikun provider: credentials fall back to the TAIKUN_* environment variables",
            map! {
                "email" => Attribute::optional(
                    AttributeType::String,
                    "Taikun email, or `TAIKUN_EMAIL`",
                ).conflicts_with(&["token"]),
                "password" => Attribute::optional(
                    AttributeType::String,
                    "Taikun password, or `TAIKUN_PASSWORD`",
                ).sensitive().conflicts_with(&["token"]),
                "token" => Attribute::optional(
                    AttributeType::String,
                    "Pre-issued bearer token, or `TAIKUN_TOKEN`",
                ).sensitive(),
                "api_host" => Attribute::optional(
                    AttributeType::String,
                    "Taikun API host, or `TAIKUN_API_HOST` (default api.taikun.cloud)",
                ),
            },
        ))
    }

    /// Merge the block with the environment and pick the credentials
    pub fn resolve(&self) -> ProviderResult<Settings> {
        let configured = |value: &ValueString| {
            value
                .as_ref_option()
                .filter(|v| !v.is_empty())
                .cloned()
        };
        let from_env = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());

        let email = configured(&self.email);
        let password = configured(&self.password);
        let token = configured(&self.token);
        if token.is_some() && (email.is_some() || password.is_some()) {
            return Err(ProviderError::ConfigInvalid(
                "`token` cannot be combined with `email` or `password`".into(),
            ));
        }

        let api_host = configured(&self.api_host)
            .or_else(|| from_env(ENV_API_HOST))
            .unwrap_or_else(|| DEFAULT_API_HOST.to_string());

        let credentials = if email.is_none() && password.is_none() {
            token.or_else(|| from_env(ENV_TOKEN)).map(|token| Credentials::Token {
                token,
                refresh_token: None,
            })
        } else {
            None
        };
        let credentials = match credentials {
            Some(credentials) => credentials,
            None => {
                let email = email.or_else(|| from_env(ENV_EMAIL));
                let password = password.or_else(|| from_env(ENV_PASSWORD));
                match (email, password) {
                    (Some(email), Some(password)) => Credentials::Password { email, password },
                    _ => {
                        return Err(ProviderError::ConfigInvalid(format!(
                            "either `token` ({ENV_TOKEN}) or both `email` ({ENV_EMAIL}) and `password` ({ENV_PASSWORD}) must be set"
                        )))
                    }
                }
            }
        };

        Ok(Settings {
            api_host,
            credentials,
        })
    }
}

/// Bounds of the read-back envelope, per operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub create: Duration,
    pub read: Duration,
    pub update: Duration,
    pub delete: Duration,
    pub backoff_initial: Duration,
    pub backoff_max: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            create: Duration::from_secs(10 * 60),
            read: Duration::from_secs(60),
            update: Duration::from_secs(10 * 60),
            delete: Duration::from_secs(10 * 60),
            backoff_initial: Duration::from_millis(500),
            backoff_max: Duration::from_secs(10),
        }
    }
}

impl Timeouts {
    /// Same window for every operation, with a fast back-off
    pub fn uniform(window: Duration) -> Self {
        Self {
            create: window,
            read: window,
            update: window,
            delete: window,
            backoff_initial: Duration::from_millis(10),
            backoff_max: Duration::from_millis(100),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Value;

    fn clear_env() -> [(&'static str, Option<&'static str>); 4] {
        [
            (ENV_EMAIL, None),
            (ENV_PASSWORD, None),
            (ENV_TOKEN, None),
            (ENV_API_HOST, None),
        ]
    }

    #[test]
    fn environment_fallback() {
        temp_env::with_vars(
            [
                (ENV_EMAIL, Some("ops@example.com")),
                (ENV_PASSWORD, Some("secret")),
                (ENV_TOKEN, None),
                (ENV_API_HOST, None),
            ],
            || {
                let settings = ProviderConfig::default().resolve().unwrap();
                assert_eq!(settings.api_host, DEFAULT_API_HOST);
                assert!(matches!(
                    settings.credentials,
                    Credentials::Password { ref email, .. } if email == "ops@example.com"
                ));
            },
        );
    }

    #[test]
    fn block_wins_over_environment() {
        temp_env::with_vars(
            [
                (ENV_EMAIL, None),
                (ENV_PASSWORD, None),
                (ENV_TOKEN, Some("env-token")),
                (ENV_API_HOST, Some("http://127.0.0.1:1234")),
            ],
            || {
                let config = ProviderConfig {
                    email: Value::Value("a@b.c".into()),
                    password: Value::Value("p".into()),
                    ..Default::default()
                };
                let settings = config.resolve().unwrap();
                assert_eq!(settings.api_host, "http://127.0.0.1:1234");
                assert!(matches!(settings.credentials, Credentials::Password { .. }));

                let settings = ProviderConfig::default().resolve().unwrap();
                assert!(matches!(
                    settings.credentials,
                    Credentials::Token { ref token, .. } if token == "env-token"
                ));
            },
        );
    }

    #[test]
    fn invalid_combinations() {
        temp_env::with_vars(clear_env(), || {
            let config = ProviderConfig {
                token: Value::Value("t".into()),
                email: Value::Value("a@b.c".into()),
                ..Default::default()
            };
            assert!(matches!(
                config.resolve(),
                Err(ProviderError::ConfigInvalid(_))
            ));

            let config = ProviderConfig {
                email: Value::Value("a@b.c".into()),
                ..Default::default()
            };
            assert!(matches!(
                config.resolve(),
                Err(ProviderError::ConfigInvalid(_))
            ));
        });
    }
}
