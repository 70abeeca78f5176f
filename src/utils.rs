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

//! Small helpers shared by the framework and the provider

use rand::{distributions::Alphanumeric, thread_rng, Rng};
use serde::{de::DeserializeOwned, Serialize};

use crate::{diagnostics::Diagnostics, value::ValueAny};

/// Turn a tuple of options into an option of tuple
pub trait OptionFactor {
    type Output;
    fn factor(self) -> Self::Output;
}

macro_rules! impl_factor {
    ($($e:ident)+) => {
        impl<$($e),+> OptionFactor for ($(Option<$e>,)+) {
            type Output = Option<($($e,)+)>;
            #[allow(non_snake_case)]
            fn factor(self) -> Self::Output {
                let ($($e,)+) = self;
                Some(($($e?,)+))
            }
        }
    };
}

impl_factor!(A B);
impl_factor!(A B C);
impl_factor!(A B C D);

/// Move an error into diagnostics, keeping the value if there is one
pub trait ExtractDiagnostics {
    type Output;
    fn extract_diagnostics(self, diags: &mut Diagnostics) -> Self::Output;
}

impl<T> ExtractDiagnostics for Option<T> {
    type Output = Self;
    fn extract_diagnostics(self, diags: &mut Diagnostics) -> Self::Output {
        if self.is_none() {
            diags.internal_error();
        }
        self
    }
}

impl<T, E> ExtractDiagnostics for Result<T, E>
where
    E: ToString,
{
    type Output = Option<T>;
    fn extract_diagnostics(self, diags: &mut Diagnostics) -> Self::Output {
        match self {
            Ok(value) => Some(value),
            Err(err) => {
                diags.root_error_short(err.to_string());
                None
            }
        }
    }
}

/// Convert a typed state into its dynamic form
///
/// Goes through Message Pack so unknown values survive the trip.
pub fn to_any<T: Serialize>(value: &T, diags: &mut Diagnostics) -> Option<ValueAny> {
    rmp_serde::to_vec_named(value)
        .map_err(|err| err.to_string())
        .and_then(|bytes| rmp_serde::from_slice(&bytes).map_err(|err| err.to_string()))
        .extract_diagnostics(diags)
}

/// Convert a dynamic value back into a typed state
pub fn from_any<T: DeserializeOwned>(value: &ValueAny, diags: &mut Diagnostics) -> Option<T> {
    rmp_serde::to_vec_named(value)
        .map_err(|err| err.to_string())
        .and_then(|bytes| rmp_serde::from_slice(&bytes).map_err(|err| err.to_string()))
        .extract_diagnostics(diags)
}

/// Random name with a recognisable prefix, like `tf-acc-x4Tq0aZb`
pub fn random_name(prefix: &str) -> String {
    let suffix: String = thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();
    format!("{prefix}-{}", suffix.to_lowercase())
}
