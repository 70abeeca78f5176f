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

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use taikun_client::Model;

use super::{
    error::{ProviderError, ProviderResult},
    ids,
    session::Context,
};
use crate::{Block, Diagnostics};

/// One kind of Taikun entity exposed as a resource
///
/// Implementations only describe the upstream calls; [`Handler`](super::handler::Handler) owns
/// the lifecycle around them (read-back, locking, sensitive values, partial failures).
#[async_trait]
pub trait Kind: Send + Sync + 'static {
    /// Type name without the provider prefix
    const TYPE_NAME: &'static str;
    /// Name of the list data source, when the kind has data sources
    const PLURAL: Option<&'static str> = None;
    /// Top-level attributes the upstream accepts but never returns
    const UNREADABLE: &'static [&'static str] = &[];

    type State: Serialize + DeserializeOwned + Clone + Default + Send + Sync;
    type Model: Model;

    /// Root block of the resource schema
    fn schema() -> Block;

    /// Checks the schema cannot express
    fn check(state: &Self::State, diags: &mut Diagnostics) {
        _ = state;
        _ = diags;
    }

    /// Observed state of an upstream entity
    fn observe(model: Self::Model) -> Self::State;

    /// Create the entity and return its id
    ///
    /// Settings the create call cannot carry are applied right after by [`update`](Self::update),
    /// from the freshly observed state.
    async fn create(cx: &Context<'_>, planned: &Self::State) -> ProviderResult<String>;

    /// Current state, `None` when the entity does not exist
    async fn read(cx: &Context<'_>, id: &str) -> ProviderResult<Option<Self::State>> {
        let id = ids::numeric(id)?;
        Ok(cx.group::<Self::Model>().get(id).await?.map(Self::observe))
    }

    /// Apply the changes between `prior` and `planned`, lock excluded
    ///
    /// Every call is gated on the attributes it carries actually differing.
    async fn update(
        cx: &Context<'_>,
        id: &str,
        prior: &Self::State,
        planned: &Self::State,
    ) -> ProviderResult<()> {
        _ = (cx, id, prior, planned);
        Ok(())
    }

    async fn delete(cx: &Context<'_>, id: &str, prior: &Self::State) -> ProviderResult<()> {
        _ = prior;
        let id = ids::numeric(id)?;
        Ok(cx.group::<Self::Model>().delete(id).execute().await?)
    }

    /// Whether a deleted entity has disappeared upstream
    async fn gone(cx: &Context<'_>, id: &str, prior: &Self::State) -> ProviderResult<bool> {
        _ = prior;
        match Self::read(cx, id).await {
            Ok(found) => Ok(found.is_none()),
            Err(ProviderError::NotFound(_)) => Ok(true),
            Err(err) => Err(err),
        }
    }

    /// Toggle the upstream lock, for kinds that have one
    async fn set_lock(cx: &Context<'_>, id: &str, lock: bool) -> ProviderResult<()> {
        _ = (cx, id, lock);
        Ok(())
    }

    /// Validate an import id and return the state id
    fn parse_import_id(id: &str) -> ProviderResult<String> {
        ids::numeric(id).map(|id| id.to_string())
    }

    /// Every entity, optionally restricted to one organization, in upstream order
    async fn list(
        cx: &Context<'_>,
        organization_id: Option<i64>,
    ) -> ProviderResult<Vec<Self::State>> {
        let mut list = cx.group::<Self::Model>().list();
        if let Some(organization_id) = organization_id {
            list = list.organization_id(organization_id);
        }
        Ok(list.all().await?.into_iter().map(Self::observe).collect())
    }
}

/// Lock through the `lockmanager` endpoint of the kind's model
pub async fn lock_model<M: Model>(cx: &Context<'_>, id: &str, lock: bool) -> ProviderResult<()> {
    let id = ids::numeric(id)?;
    Ok(cx.group::<M>().lock(id, lock).execute().await?)
}
