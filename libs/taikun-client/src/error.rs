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

use reqwest::StatusCode;
use thiserror::Error;

/// Errors raised while talking to the Taikun API
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request could not be sent or the response could not be received
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The upstream answered with a non-success status
    ///
    /// # Fields
    /// * `status` - HTTP status returned by the upstream
    /// * `message` - error message extracted from the response body
    #[error("upstream returned {status}: {message}")]
    Status { status: StatusCode, message: String },

    /// A payload could not be encoded or decoded
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    /// Credentials were rejected and could not be refreshed
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The session was cancelled while the request was in flight
    #[error("request cancelled")]
    Cancelled,

    /// The API host could not be turned into a valid URL
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// HTTP status of the failure, if the upstream answered at all
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(err) => err.status(),
            _ => None,
        }
    }

    /// Message as reported by the upstream, or the display form of the error
    pub fn message(&self) -> String {
        match self {
            ApiError::Status { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Type alias for results of API calls
pub type ApiResult<T> = Result<T, ApiError>;

/// Extract a human readable message from an error body.
///
/// The upstream answers with problem details (`title`, `detail`), but older endpoints
/// use `message` or a bare string.
pub(crate) fn extract_message(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::Object(obj)) => {
            for key in ["detail", "message", "title"] {
                if let Some(serde_json::Value::String(msg)) = obj.get(key) {
                    if !msg.is_empty() {
                        return msg.clone();
                    }
                }
            }
            body.to_string()
        }
        Ok(serde_json::Value::String(msg)) => msg,
        _ if body.is_empty() => "no message".to_string(),
        _ => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_prefers_detail() {
        let body = r#"{"title":"Bad Request","detail":"Slack url is invalid","status":400}"#;
        assert_eq!(extract_message(body), "Slack url is invalid");
    }

    #[test]
    fn message_falls_back_to_title_then_raw() {
        assert_eq!(extract_message(r#"{"title":"Conflict"}"#), "Conflict");
        assert_eq!(extract_message("plain failure"), "plain failure");
        assert_eq!(extract_message(""), "no message");
        assert_eq!(extract_message(r#""quoted""#), "quoted");
    }

    #[test]
    fn status_is_exposed() {
        let err = ApiError::Status {
            status: StatusCode::LOCKED,
            message: "locked".into(),
        };
        assert_eq!(err.status(), Some(StatusCode::LOCKED));
        assert_eq!(err.message(), "locked");
        assert_eq!(ApiError::Cancelled.status(), None);
    }
}
