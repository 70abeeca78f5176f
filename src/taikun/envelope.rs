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

//! Read-back envelope: bounded retry of upstream lookups that may lag behind writes

use std::{future::Future, time::Duration};

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use super::error::{ProviderError, ProviderResult};

/// Retry window of one operation
#[derive(Debug, Clone)]
pub struct Envelope {
    pub timeout: Duration,
    pub backoff_initial: Duration,
    pub backoff_max: Duration,
    pub cancel: CancellationToken,
}

impl Envelope {
    /// Run `attempt` until it succeeds, fails for good, the window closes or the operation is
    /// cancelled
    ///
    /// Only [retryable](ProviderError::is_retryable) errors are retried, with an exponential
    /// back-off capped by `backoff_max` and by the remaining window.
    pub async fn retry<T, F, Fut>(&self, what: &str, mut attempt: F) -> ProviderResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ProviderResult<T>>,
    {
        let deadline = Instant::now() + self.timeout;
        let mut delay = self.backoff_initial;
        let mut attempts = 0u32;
        loop {
            if self.cancel.is_cancelled() {
                return Err(ProviderError::Cancelled);
            }
            attempts += 1;
            let err = match attempt().await {
                Ok(value) => {
                    trace!(what, attempts, "read-back succeeded");
                    return Ok(value);
                }
                Err(err) if err.is_retryable() => err,
                Err(err) => return Err(err),
            };
            let now = Instant::now();
            if now >= deadline {
                return Err(ProviderError::Timeout {
                    what: what.to_string(),
                    after: self.timeout,
                    last: err.to_string(),
                });
            }
            let sleep = delay.min(deadline - now);
            debug!(what, attempts, ?sleep, error = %err, "read-back retry");
            tokio::select! {
                _ = self.cancel.cancelled() => return Err(ProviderError::Cancelled),
                _ = tokio::time::sleep(sleep) => {}
            }
            delay = (delay * 2).min(self.backoff_max);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn envelope(timeout_ms: u64) -> Envelope {
        Envelope {
            timeout: Duration::from_millis(timeout_ms),
            backoff_initial: Duration::from_millis(5),
            backoff_max: Duration::from_millis(20),
            cancel: CancellationToken::new(),
        }
    }

    #[tokio::test]
    async fn retries_transient_misses() {
        let calls = AtomicU32::new(0);
        let result = envelope(2_000)
            .retry("entity", || async {
                match calls.fetch_add(1, Ordering::SeqCst) {
                    0 => Err(ProviderError::EventuallyConsistentMiss("entity".into())),
                    1 => Err(ProviderError::UpstreamUnavailable("502".into())),
                    n => Ok(n),
                }
            })
            .await;
        assert_eq!(result.unwrap(), 2);
    }

    #[tokio::test]
    async fn stops_on_permanent_errors() {
        let calls = AtomicU32::new(0);
        let result: ProviderResult<()> = envelope(2_000)
            .retry("entity", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(ProviderError::ConfigInvalid("bad".into()))
            })
            .await;
        assert!(matches!(result, Err(ProviderError::ConfigInvalid(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn times_out() {
        let result: ProviderResult<()> = envelope(50)
            .retry("entity", || async {
                Err(ProviderError::EventuallyConsistentMiss("entity".into()))
            })
            .await;
        match result {
            Err(ProviderError::Timeout { what, last, .. }) => {
                assert_eq!(what, "entity");
                assert!(last.contains("not visible"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn cancellation_interrupts_the_wait() {
        let envelope = Envelope {
            backoff_initial: Duration::from_secs(30),
            backoff_max: Duration::from_secs(30),
            ..envelope(60_000)
        };
        let cancel = envelope.cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            cancel.cancel();
        });
        let started = std::time::Instant::now();
        let result: ProviderResult<()> = envelope
            .retry("entity", || async {
                Err(ProviderError::UpstreamUnavailable("down".into()))
            })
            .await;
        assert!(matches!(result, Err(ProviderError::Cancelled)));
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
