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

//! Terraform provider for the Taikun cloud platform
//!
//! The crate has two halves. The framework modules model what the host runtime exchanges with a
//! provider: tri-state values, schemas, diagnostics and the [`Resource`], [`DataSource`] and
//! [`Provider`] traits. The [`taikun`] module implements those traits for every Taikun entity
//! on top of the `taikun-client` crate.
//!
//! The crate does not speak the plugin gRPC protocol. The `terraform-provider-taikun` binary builds
//! the provider, checks its schema and prints it as JSON; it cannot be loaded by Terraform or ToFu.

#[macro_export]
/// Build an ordered map
///
/// # Examples
///
/// ```
/// # use terraform_provider_taikun::map;
/// # use std::collections::BTreeMap;
/// let m: BTreeMap<String, String> = map!{
///     "key1" => "value1",
///     "key2" => "value2",
/// };
/// ```
///
/// # Remarks
///
/// Keys and Values are converted with [`Into::into`] to build the map.
/// Because of that, type annotations are usually required.
macro_rules! map {
    {$($key:expr => $value:expr),*} => {
        {
            let mut map = std::collections::BTreeMap::default();
            $(
                map.insert($key.into(), $value.into());
            )*
            map
        }
    };

    {$($key:expr => $value:expr),+ ,} => { $crate::map!{$($key => $value),+} };
}

mod attribute_path;
mod diagnostics;
mod registry;

pub mod data_source;
pub mod plan;
pub mod provider;
pub mod raw;
pub mod resource;
pub mod schema;
pub mod taikun;
pub mod utils;
pub mod validators;
pub mod value;

pub use attribute_path::{AttributePath, AttributePathStep};
pub use data_source::{DataSource, DynamicDataSource};
pub use diagnostics::{Diagnostic, Diagnostics};
pub use provider::{DynamicProvider, Provider};
pub use raw::RawValue;
pub use registry::Registry;
pub use resource::{DynamicResource, Resource};
pub use schema::{
    Attribute, AttributeConstraint, AttributeType, Block, Description, DiffSuppress, NestedBlock,
    Schema,
};
pub use taikun::TaikunProvider;
pub use validators::Validator;
pub use value::{
    Value, ValueAny, ValueBool, ValueEmpty, ValueFloat, ValueList, ValueMap, ValueNumber, ValueSet,
    ValueString,
};
