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

use std::future::Future;

use tracing::debug;

use super::error::{ProviderError, ProviderResult};

/// Sequence of upstream calls making one reconciliation
///
/// A failure after at least one completed step becomes [`ProviderError::PartialFailure`].
#[derive(Debug, Default)]
pub struct Steps {
    completed: Vec<String>,
}

impl Steps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one named step
    pub async fn run<F>(&mut self, name: &str, step: F) -> ProviderResult<()>
    where
        F: Future<Output = ProviderResult<()>>,
    {
        debug!(step = name, "reconciliation step");
        match step.await {
            Ok(()) => {
                self.completed.push(name.to_string());
                Ok(())
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    /// Run a step only when `needed`
    pub async fn run_if<F>(&mut self, needed: bool, name: &str, step: F) -> ProviderResult<()>
    where
        F: Future<Output = ProviderResult<()>>,
    {
        if needed {
            self.run(name, step).await
        } else {
            Ok(())
        }
    }

    /// Names of the steps completed so far
    pub fn completed(&self) -> &[String] {
        &self.completed
    }

    fn fail(&self, err: ProviderError) -> ProviderError {
        if self.completed.is_empty() {
            return err;
        }
        match err {
            ProviderError::PartialFailure {
                mut completed,
                source,
            } => {
                let mut all = self.completed.clone();
                all.append(&mut completed);
                ProviderError::PartialFailure {
                    completed: all,
                    source,
                }
            }
            err => ProviderError::PartialFailure {
                completed: self.completed.clone(),
                source: Box::new(err),
            },
        }
    }
}
