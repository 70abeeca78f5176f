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

//! [`RawValue`] module

use serde::{Deserialize, Serialize};

use crate::diagnostics::Diagnostics;

/// Encoded value exchanged with the host, before it is decoded into a typed state
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum RawValue {
    /// Message Pack encoded value
    MessagePack(Vec<u8>),
    /// JSON encoded value
    Json(Vec<u8>),
}

const NULL_MESSAGE_PACK: &[u8] = &[0xc0_u8];
const NULL_JSON: &[u8] = b"null";

impl RawValue {
    /// Check if the encoded value is null
    pub fn is_null(&self) -> bool {
        match self {
            RawValue::MessagePack(mp) => mp.is_empty() || mp.as_slice() == NULL_MESSAGE_PACK,
            RawValue::Json(json) => json.is_empty() || json.as_slice() == NULL_JSON,
        }
    }

    /// Deserialize a [`RawValue`] into a concrete type
    ///
    /// An empty payload decodes as null.
    /// Returns [`None`] iff an error has been reported in `diags`.
    pub fn deserialize<'a, T>(&'a self, diags: &mut Diagnostics) -> Option<T>
    where
        T: Deserialize<'a>,
    {
        let decoded = match self {
            Self::MessagePack(mp) if mp.is_empty() => {
                rmp_serde::from_slice::<T>(NULL_MESSAGE_PACK).map_err(|err| err.to_string())
            }
            Self::MessagePack(mp) => rmp_serde::from_slice::<T>(mp).map_err(|err| err.to_string()),
            Self::Json(json) if json.is_empty() => {
                serde_json::from_slice::<T>(NULL_JSON).map_err(|err| err.to_string())
            }
            Self::Json(json) => serde_json::from_slice::<T>(json).map_err(|err| err.to_string()),
        };
        match decoded {
            Ok(value) => Some(value),
            Err(err) => {
                diags.root_error("Could not decode value", err);
                None
            }
        }
    }

    /// Serialize `value` into a Message Pack encoded [`Vec<u8>`]
    ///
    /// Returns [`None`] iff an error has been reported in `diags`.
    pub fn serialize_vec<T>(diags: &mut Diagnostics, value: &T) -> Option<Vec<u8>>
    where
        T: Serialize,
    {
        match rmp_serde::to_vec_named(value) {
            Ok(value) => Some(value),
            Err(err) => {
                diags.root_error("Could not encode value", err.to_string());
                None
            }
        }
    }

    /// Serialize `value` into a Message Pack [`RawValue`]
    ///
    /// Returns [`None`] iff an error has been reported in `diags`.
    pub fn serialize<T>(diags: &mut Diagnostics, value: &T) -> Option<RawValue>
    where
        T: Serialize,
    {
        Self::serialize_vec(diags, value).map(Self::MessagePack)
    }
}

impl Default for RawValue {
    fn default() -> Self {
        RawValue::MessagePack(NULL_MESSAGE_PACK.to_vec())
    }
}
