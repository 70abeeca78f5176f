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

use std::{ops::Deref, sync::Arc};

use taikun_client::TaikunClient;
use tokio::sync::OnceCell;
use tokio_util::sync::CancellationToken;

use super::{
    config::Timeouts,
    envelope::Envelope,
    error::{ProviderError, ProviderResult},
};

/// Provider-wide state shared by every resource and data source
#[derive(Debug, Clone)]
pub struct Session {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    client: OnceCell<TaikunClient>,
    cancel: CancellationToken,
    timeouts: Timeouts,
}

/// Operation whose read-back window is being chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
}

impl Session {
    pub fn new(timeouts: Timeouts) -> Self {
        Self {
            inner: Arc::new(Inner {
                client: OnceCell::new(),
                cancel: CancellationToken::new(),
                timeouts,
            }),
        }
    }

    /// Client opened at configure time
    pub fn client(&self) -> ProviderResult<&TaikunClient> {
        self.inner.client.get().ok_or(ProviderError::NotConfigured)
    }

    /// Client and read-back windows, for one operation
    pub fn context(&self) -> ProviderResult<Context<'_>> {
        Ok(Context {
            session: self,
            client: self.client()?,
        })
    }

    /// Install the client; a second configuration keeps the first session
    pub fn set_client(&self, client: TaikunClient) -> bool {
        self.inner.client.set(client).is_ok()
    }

    /// Cancelled when the host stops the provider
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.inner.cancel
    }

    pub fn timeouts(&self) -> &Timeouts {
        &self.inner.timeouts
    }

    /// Read-back envelope sized for an operation
    pub fn envelope(&self, operation: Operation) -> Envelope {
        let timeouts = &self.inner.timeouts;
        Envelope {
            timeout: match operation {
                Operation::Create => timeouts.create,
                Operation::Read => timeouts.read,
                Operation::Update => timeouts.update,
                Operation::Delete => timeouts.delete,
            },
            backoff_initial: timeouts.backoff_initial,
            backoff_max: timeouts.backoff_max,
            cancel: self.inner.cancel.clone(),
        }
    }
}

/// What a resource kind needs to talk to the upstream: the client, plus read-back envelopes for
/// the kinds that wait on the upstream between calls
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    session: &'a Session,
    client: &'a TaikunClient,
}

impl<'a> Context<'a> {
    pub fn client(&self) -> &'a TaikunClient {
        self.client
    }

    pub fn envelope(&self, operation: Operation) -> Envelope {
        self.session.envelope(operation)
    }
}

impl Deref for Context<'_> {
    type Target = TaikunClient;

    fn deref(&self) -> &TaikunClient {
        self.client
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn unconfigured_session() {
        let session = Session::new(Timeouts::uniform(Duration::from_secs(3)));
        assert!(matches!(session.context(), Err(ProviderError::NotConfigured)));
        assert_eq!(session.envelope(Operation::Read).timeout, Duration::from_secs(3));
        session.cancellation_token().cancel();
        assert!(session.envelope(Operation::Delete).cancel.is_cancelled());
    }
}
