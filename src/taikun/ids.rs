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

//! Identifiers as stored in the state: decimal numbers, or `<left>/<right>` pairs

use super::error::{ProviderError, ProviderResult};

/// Parse a numeric identifier
pub fn numeric(id: &str) -> ProviderResult<i64> {
    match id.trim().parse::<i64>() {
        Ok(id) if id >= 0 => Ok(id),
        _ => Err(ProviderError::ConfigInvalid(format!(
            "invalid id {id:?}: expected a decimal number"
        ))),
    }
}

/// Split a composite identifier `<left>/<right>`
///
/// Anything but exactly two non-empty parts is rejected.
pub fn split<'a>(id: &'a str, expected: &str) -> ProviderResult<(&'a str, &'a str)> {
    match id.split('/').collect::<Vec<_>>().as_slice() {
        [left, right] if !left.is_empty() && !right.is_empty() => Ok((left, right)),
        _ => Err(ProviderError::ConfigInvalid(format!(
            "invalid id {id:?}: expected {expected}"
        ))),
    }
}

/// Split a composite identifier made of two numbers
pub fn numeric_pair(id: &str, expected: &str) -> ProviderResult<(i64, i64)> {
    let (left, right) = split(id, expected)?;
    let invalid =
        |_| ProviderError::ConfigInvalid(format!("invalid id {id:?}: expected {expected}"));
    Ok((numeric(left).map_err(invalid)?, numeric(right).map_err(invalid)?))
}

/// Build a composite identifier
pub fn join(left: impl std::fmt::Display, right: impl std::fmt::Display) -> String {
    format!("{left}/{right}")
}

/// Parse an optional numeric reference held by a string attribute
pub fn reference(value: &crate::ValueString) -> ProviderResult<Option<i64>> {
    match value.as_ref_option() {
        Some(id) if !id.is_empty() => numeric(id).map(Some),
        _ => Ok(None),
    }
}
