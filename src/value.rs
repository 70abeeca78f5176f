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

//! [`Value`] module

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt::{Debug, Display},
    marker::PhantomData,
    ops::Deref,
    str::from_utf8,
};

use serde::{de::Visitor, Deserialize, Serialize};

/// Encode either a known value, a null value, or an unknown value as the Terraform protocol does.
///
/// [`Value`] is modeled after [`Option`]:
/// - [`Value::Value`] is equivalent to [`Option::Some`],
/// - [`Value::Null`] is equivalent to [`Option::None`],
/// - [`Value::Unknown`] has no option counterpart: the value will only be known after apply.
#[derive(Clone, Copy, PartialEq, PartialOrd, Eq, Ord, Hash, Default, Serialize)]
#[serde(untagged)]
pub enum Value<T> {
    /// Value is present
    Value(T),
    /// No value is present
    #[default]
    Null,
    /// Value is unknown
    #[serde(with = "serde_unknown")]
    Unknown,
}

macro_rules! forward_visit {
    ([ -> ]) => {
        serde::de::IntoDeserializer::into_deserializer
    };
    ([ -> $de:ident]) => {
        serde::de::value::$de::new
    };
    ($($visit:ident($value:ty)$(-> $de:ident)?),*$(,)?) => {
        $(
            fn $visit<E>(self, v: $value) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                T::deserialize(forward_visit!([-> $($de)?])(v)).map(Value::Value)
            }
        )*
    };
}

macro_rules! forward_visit_access {
    ($($visit:ident($($trait:tt)*) -> $de:ident),*$(,)?) => {
        $(
            fn $visit<A>(self, access: A) -> Result<Self::Value, A::Error>
            where
                A: $($trait)*,
            {
                T::deserialize(serde::de::value::$de::new(access)).map(Value::Value)
            }
        )*
    };
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Value<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct ValueVisitor<T>(PhantomData<T>);
        impl<'de, T: Deserialize<'de>> Visitor<'de> for ValueVisitor<T> {
            type Value = Value<T>;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(formatter, "any value")
            }

            forward_visit!(
                visit_bool(bool),
                visit_borrowed_str(&'de str) -> BorrowedStrDeserializer,
                visit_borrowed_bytes(&'de [u8]) -> BorrowedBytesDeserializer,
                visit_byte_buf(Vec<u8>),
                visit_bytes(&[u8]),
                visit_f32(f32),
                visit_f64(f64),
                visit_i8(i8),
                visit_i16(i16),
                visit_i32(i32),
                visit_i64(i64),
                visit_u8(u8),
                visit_u16(u16),
                visit_u32(u32),
                visit_u64(u64),
                visit_str(&str),
                visit_string(String),
            );
            forward_visit_access!(
                visit_map(serde::de::MapAccess<'de>) -> MapAccessDeserializer,
                visit_seq(serde::de::SeqAccess<'de>) -> SeqAccessDeserializer,
            );

            fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                T::deserialize(deserializer).map(Value::Value)
            }
            fn visit_newtype_struct<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                serde_unknown::deserialize(deserializer).map(|()| Value::Unknown)
            }
            fn visit_none<E>(self) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(Value::Null)
            }
            fn visit_unit<E>(self) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(Value::Null)
            }
        }
        deserializer.deserialize_any(ValueVisitor(PhantomData))
    }
}

/// Dynamically typed value, as found in configurations and states
#[derive(Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum ValueAny {
    String(String),
    Number(i64),
    Float(f64),
    Bool(bool),
    List(Vec<ValueAny>),
    Map(BTreeMap<String, ValueAny>),
    #[default]
    Null,
    #[serde(with = "serde_unknown")]
    Unknown,
}

macro_rules! visit_integer {
    ($($visit:ident($ty:ty)),*$(,)?) => {
        $(
            fn $visit<E>(self, v: $ty) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                i64::try_from(v)
                    .map(ValueAny::Number)
                    .map_err(serde::de::Error::custom)
            }
        )*
    };
}

impl<'de> Deserialize<'de> for ValueAny {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct ValueAnyVisitor;

        impl<'de> Visitor<'de> for ValueAnyVisitor {
            type Value = ValueAny;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(formatter, "any value")
            }
            fn visit_bool<E>(self, v: bool) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(ValueAny::Bool(v))
            }
            visit_integer!(
                visit_i8(i8),
                visit_i16(i16),
                visit_i32(i32),
                visit_i64(i64),
                visit_u8(u8),
                visit_u16(u16),
                visit_u32(u32),
                visit_u64(u64),
            );
            fn visit_f32<E>(self, v: f32) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(ValueAny::Float(v.into()))
            }
            fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(ValueAny::Float(v))
            }
            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(ValueAny::String(v.to_owned()))
            }
            fn visit_string<E>(self, v: String) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(ValueAny::String(v))
            }
            fn visit_bytes<E>(self, v: &[u8]) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(ValueAny::String(
                    from_utf8(v).map_err(serde::de::Error::custom)?.to_owned(),
                ))
            }
            fn visit_byte_buf<E>(self, v: Vec<u8>) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                String::from_utf8(v)
                    .map(ValueAny::String)
                    .map_err(serde::de::Error::custom)
            }
            fn visit_seq<A>(self, seq: A) -> Result<Self::Value, A::Error>
            where
                A: serde::de::SeqAccess<'de>,
            {
                Vec::<ValueAny>::deserialize(serde::de::value::SeqAccessDeserializer::new(seq))
                    .map(ValueAny::List)
            }
            fn visit_map<A>(self, map: A) -> Result<Self::Value, A::Error>
            where
                A: serde::de::MapAccess<'de>,
            {
                BTreeMap::<String, ValueAny>::deserialize(
                    serde::de::value::MapAccessDeserializer::new(map),
                )
                .map(ValueAny::Map)
            }
            fn visit_newtype_struct<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                serde_unknown::deserialize(deserializer).map(|()| ValueAny::Unknown)
            }
            fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                ValueAny::deserialize(deserializer)
            }
            fn visit_none<E>(self) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(ValueAny::Null)
            }
            fn visit_unit<E>(self) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(ValueAny::Null)
            }
        }

        deserializer.deserialize_any(ValueAnyVisitor)
    }
}

impl ValueAny {
    /// Dump the json representation of the value
    pub fn json(&self) -> String {
        serde_json::to_string(self).unwrap_or("<invalid>".into())
    }

    /// Check if the value is null, or an empty list or map
    pub fn is_empty(&self) -> bool {
        match self {
            ValueAny::Null => true,
            ValueAny::List(list) => list.is_empty(),
            ValueAny::Map(map) => map.is_empty(),
            _ => false,
        }
    }

    /// Check if the value is unknown
    pub fn is_unknown(&self) -> bool {
        matches!(self, ValueAny::Unknown)
    }

    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, ValueAny::Null)
    }

    /// Field of an object, [`ValueAny::Null`] when absent
    pub fn get(&self, key: &str) -> &ValueAny {
        static NULL: ValueAny = ValueAny::Null;
        match self {
            ValueAny::Map(map) => map.get(key).unwrap_or(&NULL),
            _ => &NULL,
        }
    }

    /// Mutable field of an object, inserted as null when absent
    pub fn get_mut(&mut self, key: &str) -> Option<&mut ValueAny> {
        match self {
            ValueAny::Map(map) => Some(map.entry(key.to_owned()).or_default()),
            _ => None,
        }
    }

    /// String content, if the value is a known string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ValueAny::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Numeric content, integers and floats alike
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ValueAny::Number(n) => Some(*n as f64),
            ValueAny::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Elements of a list, empty for anything else
    pub fn elements(&self) -> &[ValueAny] {
        match self {
            ValueAny::List(list) => list.as_slice(),
            _ => &[],
        }
    }

    /// Semantic equality: numbers compare numerically, and null equals an empty collection
    pub fn same_as(&self, other: &ValueAny) -> bool {
        match (self, other) {
            (ValueAny::List(a), ValueAny::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(a, b)| a.same_as(b))
            }
            (ValueAny::Map(a), ValueAny::Map(b)) => {
                let keys: BTreeSet<&String> = a.keys().chain(b.keys()).collect();
                keys.into_iter().all(|key| {
                    let a = a.get(key).unwrap_or(&ValueAny::Null);
                    let b = b.get(key).unwrap_or(&ValueAny::Null);
                    a.same_as(b)
                })
            }
            (a, b) if a.is_empty() && b.is_empty() => true,
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(a), Some(b)) => (a - b).abs() < f64::EPSILON * a.abs().max(1.0),
                _ => a == b,
            },
        }
    }
}

impl From<&str> for ValueAny {
    fn from(value: &str) -> Self {
        ValueAny::String(value.to_owned())
    }
}

impl From<i64> for ValueAny {
    fn from(value: i64) -> Self {
        ValueAny::Number(value)
    }
}

impl From<f64> for ValueAny {
    fn from(value: f64) -> Self {
        ValueAny::Float(value)
    }
}

impl From<bool> for ValueAny {
    fn from(value: bool) -> Self {
        ValueAny::Bool(value)
    }
}

/// Struct without any field
#[derive(
    Copy, Clone, PartialEq, PartialOrd, Eq, Ord, Debug, Hash, Default, Serialize, Deserialize,
)]
pub struct StructEmpty {}

pub type ValueEmpty = Value<StructEmpty>;
pub type ValueString = Value<String>;
pub type ValueNumber = Value<i64>;
pub type ValueFloat = Value<f64>;
pub type ValueBool = Value<bool>;
pub type ValueList<T> = Value<Vec<T>>;
pub type ValueSet<T> = Value<BTreeSet<T>>;
pub type ValueMap<T> = Value<BTreeMap<String, T>>;

/// Serde codec for the unknown marker: the MessagePack extension 0 used by Terraform
pub(crate) mod serde_unknown {
    use serde::{Deserialize, Deserializer, Serializer};

    type ExtStruct = (i8, serde_bytes::ByteBuf);

    pub fn serialize<S>(serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_newtype_struct(
            rmp_serde::MSGPACK_EXT_STRUCT_NAME,
            &(0i8, serde_bytes::Bytes::new(&[0])),
        )
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<(), D::Error>
    where
        D: Deserializer<'de>,
    {
        ExtStruct::deserialize(deserializer).map(|_| ())
    }
}

/// Serde codec to encode a nullable as a vec that has either zero or one element
///
/// Nested blocks limited to one element are lists on the wire.
pub mod serde_as_vec {
    use serde::{de::Error, ser::SerializeSeq, Deserialize, Serialize};

    use super::Value;

    /// Serialize a nullable Value into a Vec of Values with 0 or 1 element
    pub fn serialize<T, S>(value: &Value<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
        T: Serialize,
    {
        let mut seq = serializer.serialize_seq(Some(value.is_value() as usize))?;
        if let Value::Value(value) = value {
            seq.serialize_element(value)?;
        }
        seq.end()
    }

    /// Deserialize a Vec of values into a single, nullable, Value
    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Value<T>, D::Error>
    where
        D: serde::Deserializer<'de>,
        T: Deserialize<'de>,
    {
        let vec: Value<Vec<Value<T>>> = Deserialize::deserialize(deserializer)?;
        match vec {
            Value::Value(vec) => {
                let mut iter = vec.into_iter();
                match (iter.next(), iter.next()) {
                    (Some(value), None) => Ok(value),
                    (None, _) => Ok(Value::Null),
                    (Some(_), Some(_)) => Err(D::Error::custom(
                        "Try to store multiple elements in a single Value",
                    )),
                }
            }
            Value::Null => Ok(Value::Null),
            Value::Unknown => Ok(Value::Unknown),
        }
    }
}

impl<T> Value<T> {
    /// Check if the value is known and present
    #[inline]
    pub const fn is_value(&self) -> bool {
        matches!(self, Self::Value(_))
    }

    /// Check if the value is null
    #[inline]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Check if the value is unknown
    #[inline]
    pub const fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// Converts from `&Value<T>` to `Value<&T>`
    #[inline]
    pub const fn as_ref(&self) -> Value<&T> {
        match *self {
            Self::Value(ref x) => Value::Value(x),
            Self::Null => Value::Null,
            Self::Unknown => Value::Unknown,
        }
    }

    /// Converts from `&Value<T>` to `Value<&T::Target>`
    #[inline]
    pub fn as_deref(&self) -> Value<&T::Target>
    where
        T: Deref,
    {
        self.as_ref().map(|t| t.deref())
    }

    /// Maps a `Value<T>` to `Value<U>` by applying a function to a contained value
    #[inline]
    pub fn map<U, F>(self, f: F) -> Value<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Self::Value(x) => Value::Value(f(x)),
            Self::Null => Value::Null,
            Self::Unknown => Value::Unknown,
        }
    }

    /// Returns the provided default (if null or unknown), or applies a function to the contained
    /// value
    #[inline]
    pub fn map_or<U, F>(self, default: U, f: F) -> U
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Self::Value(x) => f(x),
            _ => default,
        }
    }

    /// Returns the contained value or a provided default
    #[inline]
    pub fn unwrap_or(self, default: T) -> T {
        match self {
            Self::Value(x) => x,
            _ => default,
        }
    }

    /// Returns the contained value or the default of `T`
    #[inline]
    pub fn unwrap_or_default(self) -> T
    where
        T: Default,
    {
        match self {
            Self::Value(x) => x,
            _ => Default::default(),
        }
    }

    /// Converts into an [`Option`], unknown becoming [`None`]
    #[inline]
    pub fn as_option(self) -> Option<T> {
        match self {
            Self::Value(x) => Some(x),
            _ => None,
        }
    }

    /// Converts `&Value<T>` into an `Option<&T>`, unknown becoming [`None`]
    #[inline]
    pub fn as_ref_option(&self) -> Option<&T> {
        self.as_ref().as_option()
    }

    /// Returns `self` if it contains a value, otherwise `rhs`
    #[inline]
    pub fn or(self, rhs: Self) -> Self {
        match self {
            x @ Self::Value(_) => x,
            _ => rhs,
        }
    }
}

impl<T: Clone> Value<&T> {
    /// Maps a `Value<&T>` to a `Value<T>` by cloning the contents
    #[inline]
    pub fn cloned(self) -> Value<T> {
        self.map(Clone::clone)
    }
}

impl Value<String> {
    /// Borrow the string, empty when null or unknown
    pub fn as_str(&self) -> &str {
        match self {
            Value::Value(s) => s.as_str(),
            _ => "",
        }
    }
}

impl<T: Debug> Debug for Value<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Value(value) => value.fmt(f),
            Self::Null => f.write_str("Null"),
            Self::Unknown => f.write_str("Unknown"),
        }
    }
}

impl Debug for ValueAny {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String(value) => Debug::fmt(value, f),
            Self::Number(value) => Debug::fmt(value, f),
            Self::Float(value) => Debug::fmt(value, f),
            Self::Bool(value) => Debug::fmt(value, f),
            Self::List(value) => Debug::fmt(value, f),
            Self::Map(value) => Debug::fmt(value, f),
            Self::Null => f.write_str("Null"),
            Self::Unknown => f.write_str("Unknown"),
        }
    }
}

impl<T: Display> Display for Value<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Value(value) => value.fmt(f),
            Self::Null => f.write_str("null"),
            Self::Unknown => f.write_str("(known after apply)"),
        }
    }
}

impl<T> From<T> for Value<T> {
    fn from(value: T) -> Self {
        Self::Value(value)
    }
}

impl<T> From<Option<T>> for Value<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Self::Value(value),
            None => Self::Null,
        }
    }
}

impl From<&str> for Value<String> {
    fn from(value: &str) -> Self {
        Self::Value(value.to_owned())
    }
}
