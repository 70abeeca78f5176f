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

use std::time::Duration;

use taikun_client::{ApiError, StatusCode};
use thiserror::Error;

use crate::{AttributePath, Diagnostics};

/// Failures of a provider operation, classified for retry and reporting
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The desired state violates a constraint
    #[error("{0}")]
    ConfigInvalid(String),

    /// The upstream refused a well-formed request
    #[error("Taikun rejected the request ({}): {message}", .status.map_or("no status".to_string(), |s| s.to_string()))]
    UpstreamRejected {
        status: Option<StatusCode>,
        message: String,
    },

    /// The upstream failed or could not be reached
    #[error("Taikun is unavailable: {0}")]
    UpstreamUnavailable(String),

    /// A freshly written entity is not visible yet
    #[error("{0} is not visible yet")]
    EventuallyConsistentMiss(String),

    /// The entity does not exist
    #[error("{0} not found")]
    NotFound(String),

    /// The entity is locked and refuses mutations
    #[error("{0} is locked")]
    LockedResource(String),

    /// A multi-step update stopped after some steps succeeded
    #[error("update stopped after {}: {source}", .completed.join(", "))]
    PartialFailure {
        completed: Vec<String>,
        source: Box<ProviderError>,
    },

    /// The read-back window closed
    #[error("timed out after {after:?} waiting for {what}: {last}")]
    Timeout {
        what: String,
        after: Duration,
        last: String,
    },

    #[error("operation cancelled")]
    Cancelled,

    #[error("the provider has not been configured")]
    NotConfigured,
}

pub type ProviderResult<T> = Result<T, ProviderError>;

impl ProviderError {
    /// Transient failures the read-back envelope retries
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProviderError::UpstreamUnavailable(_) | ProviderError::EventuallyConsistentMiss(_)
        )
    }

    /// Error without completed steps, looking through partial failures
    pub fn root_cause(&self) -> &ProviderError {
        match self {
            ProviderError::PartialFailure { source, .. } => source.root_cause(),
            other => other,
        }
    }

    fn summary(&self) -> &'static str {
        match self {
            ProviderError::ConfigInvalid(_) => "Invalid configuration",
            ProviderError::UpstreamRejected { .. } => "Request rejected by Taikun",
            ProviderError::UpstreamUnavailable(_) => "Taikun unavailable",
            ProviderError::EventuallyConsistentMiss(_) => "Entity not visible yet",
            ProviderError::NotFound(_) => "Entity not found",
            ProviderError::LockedResource(_) => "Entity locked",
            ProviderError::PartialFailure { .. } => "Update partially applied",
            ProviderError::Timeout { .. } => "Timeout",
            ProviderError::Cancelled => "Operation cancelled",
            ProviderError::NotConfigured => "Provider not configured",
        }
    }

    /// Report as one error diagnostic
    pub fn report(&self, diags: &mut Diagnostics) {
        diags.root_error(self.summary(), self.to_string());
    }

    /// Report as one error diagnostic on an attribute
    pub fn report_at(&self, diags: &mut Diagnostics, attribute: AttributePath) {
        diags.error(self.summary(), self.to_string(), attribute);
    }
}

impl From<ApiError> for ProviderError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Cancelled => ProviderError::Cancelled,
            ApiError::Url(err) => ProviderError::ConfigInvalid(format!("invalid API host: {err}")),
            ApiError::Authentication(message) => ProviderError::UpstreamRejected {
                status: Some(StatusCode::UNAUTHORIZED),
                message,
            },
            ApiError::Json(err) => ProviderError::UpstreamRejected {
                status: None,
                message: format!("unexpected payload: {err}"),
            },
            ApiError::Transport(err) => ProviderError::UpstreamUnavailable(err.to_string()),
            ApiError::Status { status, message } => {
                if status.is_server_error() {
                    ProviderError::UpstreamUnavailable(format!("{status}: {message}"))
                } else if status == StatusCode::NOT_FOUND {
                    ProviderError::NotFound(message)
                } else if status == StatusCode::LOCKED
                    || message.to_ascii_lowercase().contains("locked")
                {
                    ProviderError::LockedResource(message)
                } else {
                    ProviderError::UpstreamRejected {
                        status: Some(status),
                        message,
                    }
                }
            }
        }
    }
}
