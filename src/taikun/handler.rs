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

//! Generic resource lifecycle shared by every [`Kind`]

use std::{marker::PhantomData, sync::Mutex};

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use super::{
    error::{ProviderError, ProviderResult},
    kind::Kind,
    session::{Context, Operation, Session},
    steps::Steps,
};
use crate::{
    plan,
    utils::{from_any, to_any},
    AttributePath, Diagnostics, Resource, Schema, Value, ValueAny,
};

/// [`Resource`] implementation driving a [`Kind`]
pub struct Handler<K> {
    session: Session,
    _kind: PhantomData<fn() -> K>,
}

impl<K: Kind> Handler<K> {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            _kind: PhantomData,
        }
    }

    fn context(&self, diags: &mut Diagnostics) -> Option<Context<'_>> {
        match self.session.context() {
            Ok(cx) => Some(cx),
            Err(err) => {
                err.report(diags);
                None
            }
        }
    }

    fn state_id(state: &ValueAny, diags: &mut Diagnostics) -> Option<String> {
        match state.get("id").as_str() {
            Some(id) if !id.is_empty() => Some(id.to_string()),
            _ => {
                diags.error_short("Missing resource id", AttributePath::new("id"));
                None
            }
        }
    }

    fn locked(state: &ValueAny) -> bool {
        state.get("lock") == &ValueAny::Bool(true)
    }

    /// Observed state completed with what the upstream never returns
    fn restore(
        reference: &ValueAny,
        observed: &K::State,
        diags: &mut Diagnostics,
    ) -> Option<K::State> {
        let mut observed = to_any(observed, diags)?;
        plan::preserve_sensitive(&K::schema(), reference, &mut observed, K::UNREADABLE);
        from_any(&observed, diags)
    }

    /// State saved when an apply fails half-way: what we know, unknowns dropped
    fn fallback(mut state: ValueAny, id: &str, diags: &mut Diagnostics) -> Option<K::State> {
        plan::unknown_as_null(&mut state);
        if let Some(slot) = state.get_mut("id") {
            *slot = ValueAny::String(id.to_string());
        }
        from_any(&state, diags)
    }

    /// Read until the entity is visible
    async fn read_back(
        &self,
        cx: &Context<'_>,
        id: &str,
        operation: Operation,
    ) -> ProviderResult<K::State> {
        let what = format!("{} {id}", K::TYPE_NAME);
        cx.envelope(operation)
            .retry(&what, || async {
                K::read(cx, id)
                    .await?
                    .ok_or_else(|| ProviderError::EventuallyConsistentMiss(what.clone()))
            })
            .await
    }

    /// Read until the entity reflects `planned`
    ///
    /// When the window closes first, the last observation is returned with a warning.
    async fn settle(
        &self,
        diags: &mut Diagnostics,
        cx: &Context<'_>,
        id: &str,
        planned: &ValueAny,
        operation: Operation,
    ) -> ProviderResult<ValueAny> {
        let block = K::schema();
        let what = format!("{} {id} to converge", K::TYPE_NAME);
        let last = Mutex::new(None);
        let result = cx
            .envelope(operation)
            .retry(&what, || async {
                let observed = K::read(cx, id)
                    .await?
                    .ok_or_else(|| ProviderError::NotFound(format!("{} {id}", K::TYPE_NAME)))?;
                let mut inner = Diagnostics::default();
                let Some(mut observed) = to_any(&observed, &mut inner) else {
                    return Err(ProviderError::ConfigInvalid(inner.to_string()));
                };
                plan::preserve_sensitive(&block, planned, &mut observed, K::UNREADABLE);
                let done = plan::converged(&block, planned, &observed);
                if let Ok(mut last) = last.lock() {
                    *last = Some(observed.clone());
                }
                if done {
                    Ok(observed)
                } else {
                    Err(ProviderError::EventuallyConsistentMiss(what.clone()))
                }
            })
            .await;
        let last = last.into_inner().ok().flatten();
        match (result, last) {
            (Ok(observed), _) => Ok(observed),
            (Err(ProviderError::Timeout { .. }), Some(observed)) => {
                warn!(kind = K::TYPE_NAME, id, "upstream did not converge in time");
                diags.root_warning(
                    "Upstream still converging",
                    format!(
                        "{} {id} did not reflect every change before the timeout; \
                         the next refresh will show the remaining drift",
                        K::TYPE_NAME
                    ),
                );
                Ok(observed)
            }
            (Err(err), _) => Err(err),
        }
    }

    /// Apply the kind update, unlocking and retrying once when the entity turns out locked
    async fn update_unlocked(
        cx: &Context<'_>,
        id: &str,
        prior: &K::State,
        planned: &K::State,
    ) -> ProviderResult<()> {
        match K::update(cx, id, prior, planned).await {
            Err(ProviderError::LockedResource(message)) => {
                info!(kind = K::TYPE_NAME, id, %message, "entity locked, unlocking before retry");
                K::set_lock(cx, id, false).await?;
                K::update(cx, id, prior, planned).await
            }
            result => result,
        }
    }

    /// Unlock first, update, lock last
    async fn apply(
        cx: &Context<'_>,
        id: &str,
        prior: &K::State,
        planned: &K::State,
        was_locked: bool,
        want_locked: bool,
    ) -> ProviderResult<()> {
        let mut steps = Steps::new();
        steps
            .run_if(was_locked, "unlock", K::set_lock(cx, id, false))
            .await?;
        steps
            .run("update", Self::update_unlocked(cx, id, prior, planned))
            .await?;
        steps
            .run_if(want_locked, "lock", K::set_lock(cx, id, true))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl<K: Kind> Resource for Handler<K> {
    type State = K::State;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(Schema::new(K::schema()))
    }

    async fn validate(&self, diags: &mut Diagnostics, config: Self::State) -> Option<()> {
        let any = to_any(&config, diags)?;
        plan::validate(&K::schema(), &any, diags);
        K::check(&config, diags);
        Some(())
    }

    #[instrument(skip_all, fields(kind = K::TYPE_NAME))]
    async fn read(
        &self,
        diags: &mut Diagnostics,
        state: Self::State,
    ) -> Option<Value<Self::State>> {
        let reference = to_any(&state, diags)?;
        let id = Self::state_id(&reference, diags)?;
        let cx = self.context(diags)?;
        let what = format!("{} {id}", K::TYPE_NAME);
        let observed = cx
            .envelope(Operation::Read)
            .retry(&what, || K::read(&cx, &id))
            .await;
        match observed {
            Ok(Some(observed)) => Self::restore(&reference, &observed, diags).map(Value::Value),
            Ok(None) | Err(ProviderError::NotFound(_)) => {
                info!(id, "entity disappeared upstream, dropping it from the state");
                Some(Value::Null)
            }
            Err(err) => {
                err.report(diags);
                None
            }
        }
    }

    async fn plan_create(
        &self,
        diags: &mut Diagnostics,
        config: Self::State,
    ) -> Option<Self::State> {
        let config = to_any(&config, diags)?;
        let planned = plan::plan_create(&K::schema(), &config);
        from_any(&planned, diags)
    }

    async fn plan_update(
        &self,
        diags: &mut Diagnostics,
        prior_state: Self::State,
        config: Self::State,
    ) -> Option<(Self::State, Vec<AttributePath>)> {
        let (prior, config) = (to_any(&prior_state, diags)?, to_any(&config, diags)?);
        let (planned, replace) = plan::plan_update(&K::schema(), &prior, &config);
        if !replace.is_empty() {
            debug!(kind = K::TYPE_NAME, ?replace, "replacement required");
        }
        Some((from_any(&planned, diags)?, replace))
    }

    #[instrument(skip_all, fields(kind = K::TYPE_NAME))]
    async fn create(
        &self,
        diags: &mut Diagnostics,
        planned_state: Self::State,
    ) -> Option<Self::State> {
        let planned = to_any(&planned_state, diags)?;
        let cx = self.context(diags)?;
        let id = match K::create(&cx, &planned_state).await {
            Ok(id) => id,
            Err(err) => {
                err.report(diags);
                return None;
            }
        };
        info!(id, "created");

        let observed = match self.read_back(&cx, &id, Operation::Create).await {
            Ok(observed) => observed,
            Err(err) => {
                err.report(diags);
                return Self::fallback(planned, &id, diags);
            }
        };
        let Some(observed) = Self::restore(&planned, &observed, diags) else {
            return Self::fallback(planned, &id, diags);
        };
        let applied = Self::apply(
            &cx,
            &id,
            &observed,
            &planned_state,
            false,
            Self::locked(&planned),
        )
        .await;
        if let Err(err) = applied {
            err.report(diags);
            return Self::restore(&planned, &observed, diags);
        }
        match self
            .settle(diags, &cx, &id, &planned, Operation::Create)
            .await
        {
            Ok(observed) => from_any(&observed, diags),
            Err(err) => {
                err.report(diags);
                Self::fallback(planned, &id, diags)
            }
        }
    }

    #[instrument(skip_all, fields(kind = K::TYPE_NAME))]
    async fn update(
        &self,
        diags: &mut Diagnostics,
        prior_state: Self::State,
        planned_state: Self::State,
    ) -> Option<Self::State> {
        let prior = to_any(&prior_state, diags)?;
        let planned = to_any(&planned_state, diags)?;
        let id = Self::state_id(&prior, diags)?;
        let cx = self.context(diags)?;

        let applied = Self::apply(
            &cx,
            &id,
            &prior_state,
            &planned_state,
            Self::locked(&prior),
            Self::locked(&planned),
        )
        .await;
        if let Err(err) = applied {
            err.report(diags);
            return match K::read(&cx, &id).await {
                Ok(Some(observed)) => Self::restore(&planned, &observed, diags),
                _ => Some(prior_state),
            };
        }

        match self
            .settle(diags, &cx, &id, &planned, Operation::Update)
            .await
        {
            Ok(observed) => from_any(&observed, diags),
            Err(err) => {
                err.report(diags);
                Self::fallback(planned, &id, diags)
            }
        }
    }

    #[instrument(skip_all, fields(kind = K::TYPE_NAME))]
    async fn destroy(&self, diags: &mut Diagnostics, prior_state: Self::State) -> Option<()> {
        let prior = to_any(&prior_state, diags)?;
        let id = Self::state_id(&prior, diags)?;
        let cx = self.context(diags)?;
        let what = format!("{} {id} to disappear", K::TYPE_NAME);
        let result = async {
            if Self::locked(&prior) {
                K::set_lock(&cx, &id, false).await?;
            }
            match K::delete(&cx, &id, &prior_state).await {
                Err(ProviderError::LockedResource(_)) => {
                    K::set_lock(&cx, &id, false).await?;
                    K::delete(&cx, &id, &prior_state).await?;
                }
                Err(ProviderError::NotFound(_)) => return Ok(()),
                result => result?,
            }
            cx.envelope(Operation::Delete)
                .retry(&what, || async {
                    if K::gone(&cx, &id, &prior_state).await? {
                        Ok(())
                    } else {
                        Err(ProviderError::EventuallyConsistentMiss(what.clone()))
                    }
                })
                .await
        }
        .await;
        match result {
            Ok(()) => {
                info!(id, "deleted");
                Some(())
            }
            Err(err) => {
                err.report(diags);
                None
            }
        }
    }

    async fn import(&self, diags: &mut Diagnostics, id: String) -> Option<Self::State> {
        let id = match K::parse_import_id(&id) {
            Ok(id) => id,
            Err(err) => {
                err.report_at(diags, AttributePath::new("id"));
                return None;
            }
        };
        let cx = self.context(diags)?;
        match K::read(&cx, &id).await {
            Ok(Some(state)) => Some(state),
            Ok(None) | Err(ProviderError::NotFound(_)) => {
                diags.root_error(
                    "Cannot import non-existent remote object",
                    format!("{} {id} does not exist", K::TYPE_NAME),
                );
                None
            }
            Err(err) => {
                err.report(diags);
                None
            }
        }
    }
}
