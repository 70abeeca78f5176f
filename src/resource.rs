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

//! [`Resource`] module

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    attribute_path::AttributePath, diagnostics::Diagnostics, raw::RawValue, schema::Schema,
    utils::OptionFactor, value::Value,
};

/// Managed resource, with its states strongly typed
///
/// Every function reports problems in `diags`. A [`None`] return must come with an error.
#[async_trait]
pub trait Resource: Send + Sync {
    /// State of the resource
    type State: Serialize + DeserializeOwned + Send;

    /// Get the schema of the resource
    fn schema(&self, diags: &mut Diagnostics) -> Option<Schema>;

    /// Validate the configuration of the resource
    async fn validate(&self, diags: &mut Diagnostics, config: Self::State) -> Option<()>;

    /// Read the new state of the resource
    ///
    /// [`Value::Null`] means the resource is gone and must be dropped from the state.
    async fn read(&self, diags: &mut Diagnostics, state: Self::State)
        -> Option<Value<Self::State>>;

    /// Plan the creation of a new resource
    async fn plan_create(&self, diags: &mut Diagnostics, config: Self::State)
        -> Option<Self::State>;

    /// Plan the changes on the resource
    ///
    /// Also returns the attributes whose change requires a replacement.
    async fn plan_update(
        &self,
        diags: &mut Diagnostics,
        prior_state: Self::State,
        config: Self::State,
    ) -> Option<(Self::State, Vec<AttributePath>)>;

    /// Create a new resource
    async fn create(&self, diags: &mut Diagnostics, planned_state: Self::State)
        -> Option<Self::State>;

    /// Apply the changes on the resource
    ///
    /// A partially applied update returns the state reached together with an error.
    async fn update(
        &self,
        diags: &mut Diagnostics,
        prior_state: Self::State,
        planned_state: Self::State,
    ) -> Option<Self::State>;

    /// Destroy the resource
    async fn destroy(&self, diags: &mut Diagnostics, prior_state: Self::State) -> Option<()>;

    /// Import an existing resource
    async fn import(&self, diags: &mut Diagnostics, id: String) -> Option<Self::State> {
        _ = id;
        diags.root_error_short("Import is not supported");
        None
    }
}

/// Managed resource, with its states encoded as the host sends them
#[async_trait]
pub trait DynamicResource: Send + Sync {
    /// Get the schema of the resource
    fn schema(&self, diags: &mut Diagnostics) -> Option<Schema>;
    /// Validate the configuration of the resource
    async fn validate(&self, diags: &mut Diagnostics, config: RawValue) -> Option<()>;
    /// Read the new state of the resource
    async fn read(&self, diags: &mut Diagnostics, state: RawValue) -> Option<RawValue>;
    /// Plan the creation of a new resource
    async fn plan_create(&self, diags: &mut Diagnostics, config: RawValue) -> Option<RawValue>;
    /// Plan the changes on the resource
    async fn plan_update(
        &self,
        diags: &mut Diagnostics,
        prior_state: RawValue,
        config: RawValue,
    ) -> Option<(RawValue, Vec<AttributePath>)>;
    /// Create a new resource
    async fn create(&self, diags: &mut Diagnostics, planned_state: RawValue) -> Option<RawValue>;
    /// Apply the changes on the resource
    async fn update(
        &self,
        diags: &mut Diagnostics,
        prior_state: RawValue,
        planned_state: RawValue,
    ) -> Option<RawValue>;
    /// Destroy the resource
    async fn destroy(&self, diags: &mut Diagnostics, prior_state: RawValue) -> Option<()>;
    /// Import an existing resource
    async fn import(&self, diags: &mut Diagnostics, id: String) -> Option<RawValue>;
}

#[async_trait]
impl<T: Resource> DynamicResource for T {
    fn schema(&self, diags: &mut Diagnostics) -> Option<Schema> {
        <T as Resource>::schema(self, diags)
    }
    async fn validate(&self, diags: &mut Diagnostics, config: RawValue) -> Option<()> {
        let config = config.deserialize(diags)?;
        <T as Resource>::validate(self, diags, config).await
    }
    async fn read(&self, diags: &mut Diagnostics, state: RawValue) -> Option<RawValue> {
        let state = state.deserialize(diags)?;
        let state = <T as Resource>::read(self, diags, state).await?;
        RawValue::serialize(diags, &state)
    }
    async fn plan_create(&self, diags: &mut Diagnostics, config: RawValue) -> Option<RawValue> {
        let config = config.deserialize(diags)?;
        let state = <T as Resource>::plan_create(self, diags, config).await?;
        RawValue::serialize(diags, &state)
    }
    async fn plan_update(
        &self,
        diags: &mut Diagnostics,
        prior_state: RawValue,
        config: RawValue,
    ) -> Option<(RawValue, Vec<AttributePath>)> {
        let (prior_state, config) =
            (prior_state.deserialize(diags), config.deserialize(diags)).factor()?;
        let (state, replace) =
            <T as Resource>::plan_update(self, diags, prior_state, config).await?;
        Some((RawValue::serialize(diags, &state)?, replace))
    }
    async fn create(&self, diags: &mut Diagnostics, planned_state: RawValue) -> Option<RawValue> {
        let planned_state = planned_state.deserialize(diags)?;
        let state = <T as Resource>::create(self, diags, planned_state).await?;
        RawValue::serialize(diags, &state)
    }
    async fn update(
        &self,
        diags: &mut Diagnostics,
        prior_state: RawValue,
        planned_state: RawValue,
    ) -> Option<RawValue> {
        let (prior_state, planned_state) = (
            prior_state.deserialize(diags),
            planned_state.deserialize(diags),
        )
            .factor()?;
        let state = <T as Resource>::update(self, diags, prior_state, planned_state).await?;
        RawValue::serialize(diags, &state)
    }
    async fn destroy(&self, diags: &mut Diagnostics, prior_state: RawValue) -> Option<()> {
        let prior_state = prior_state.deserialize(diags)?;
        <T as Resource>::destroy(self, diags, prior_state).await
    }
    async fn import(&self, diags: &mut Diagnostics, id: String) -> Option<RawValue> {
        let state = <T as Resource>::import(self, diags, id).await?;
        RawValue::serialize(diags, &state)
    }
}

impl<T: Resource + 'static> From<T> for Box<dyn DynamicResource> {
    fn from(value: T) -> Self {
        Box::new(value)
    }
}
