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

//! Checks attached to schema attributes

use std::{fmt::Display, net::Ipv4Addr};

use regex::Regex;
use time::{macros::format_description, Date};

use crate::value::ValueAny;

/// Constraint on the value of an attribute
///
/// Unknown and null values always pass: they are checked once known, or by the required flag.
#[derive(Clone, Debug)]
pub enum Validator {
    /// String among a fixed set
    OneOf(&'static [&'static str]),
    /// Integer within an inclusive range
    IntBetween(i64, i64),
    /// Number within an inclusive range
    FloatBetween(f64, f64),
    /// String length within an inclusive range
    Length(usize, usize),
    /// String matching a pattern, with a human readable explanation
    Regex(&'static str, &'static str),
    /// IPv4 network in CIDR notation
    Cidr,
    /// IPv4 address
    Ipv4,
    /// Email address
    Email,
    /// Five field cron expression
    Cron,
    /// Date formatted as `dd/mm/yyyy`
    Date,
    /// http(s) URL
    Url,
    /// Positive decimal identifier, as a string
    NumericId,
}

impl Validator {
    /// Check a known, non-null, scalar value
    pub fn check(&self, value: &ValueAny) -> Result<(), String> {
        if value.is_null() || value.is_unknown() {
            return Ok(());
        }
        match self {
            Validator::OneOf(values) => {
                let s = expect_str(value)?;
                if values.contains(&s) {
                    Ok(())
                } else {
                    Err(format!("expected one of {}, got {s:?}", values.join(", ")))
                }
            }
            Validator::IntBetween(min, max) => match value {
                ValueAny::Number(n) if n >= min && n <= max => Ok(()),
                ValueAny::Number(n) => Err(format!("expected between {min} and {max}, got {n}")),
                ValueAny::Float(f) => Err(format!("expected an integer, got {f}")),
                other => Err(format!("expected a number, got {}", other.json())),
            },
            Validator::FloatBetween(min, max) => match value.as_f64() {
                Some(f) if f >= *min && f <= *max => Ok(()),
                Some(f) => Err(format!("expected between {min} and {max}, got {f}")),
                None => Err(format!("expected a number, got {}", value.json())),
            },
            Validator::Length(min, max) => {
                let len = expect_str(value)?.chars().count();
                if len >= *min && len <= *max {
                    Ok(())
                } else {
                    Err(format!(
                        "expected a length between {min} and {max}, got {len}"
                    ))
                }
            }
            Validator::Regex(pattern, explanation) => {
                let s = expect_str(value)?;
                let re = Regex::new(pattern).map_err(|err| err.to_string())?;
                if re.is_match(s) {
                    Ok(())
                } else {
                    Err(format!("{explanation}, got {s:?}"))
                }
            }
            Validator::Cidr => check_cidr(expect_str(value)?),
            Validator::Ipv4 => {
                let s = expect_str(value)?;
                s.parse::<Ipv4Addr>()
                    .map(|_| ())
                    .map_err(|_| format!("expected an IPv4 address, got {s:?}"))
            }
            Validator::Email => {
                let s = expect_str(value)?;
                let re = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").map_err(|err| err.to_string())?;
                if re.is_match(s) {
                    Ok(())
                } else {
                    Err(format!("expected an email address, got {s:?}"))
                }
            }
            Validator::Cron => check_cron(expect_str(value)?),
            Validator::Date => parse_date(expect_str(value)?).map(|_| ()),
            Validator::Url => {
                let s = expect_str(value)?;
                match url::Url::parse(s) {
                    Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
                    _ => Err(format!("expected an http(s) URL, got {s:?}")),
                }
            }
            Validator::NumericId => {
                let s = expect_str(value)?;
                match s.parse::<i64>() {
                    Ok(id) if id > 0 => Ok(()),
                    _ => Err(format!("expected a numeric identifier, got {s:?}")),
                }
            }
        }
    }
}

impl Display for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Validator::OneOf(values) => write!(f, "one of {}", values.join(", ")),
            Validator::IntBetween(min, max) => write!(f, "integer between {min} and {max}"),
            Validator::FloatBetween(min, max) => write!(f, "number between {min} and {max}"),
            Validator::Length(min, max) => write!(f, "length between {min} and {max}"),
            Validator::Regex(_, explanation) => f.write_str(explanation),
            Validator::Cidr => f.write_str("CIDR"),
            Validator::Ipv4 => f.write_str("IPv4 address"),
            Validator::Email => f.write_str("email"),
            Validator::Cron => f.write_str("cron expression"),
            Validator::Date => f.write_str("date dd/mm/yyyy"),
            Validator::Url => f.write_str("URL"),
            Validator::NumericId => f.write_str("numeric id"),
        }
    }
}

fn expect_str(value: &ValueAny) -> Result<&str, String> {
    value
        .as_str()
        .ok_or_else(|| format!("expected a string, got {}", value.json()))
}

/// Parse a `dd/mm/yyyy` date
pub fn parse_date(s: &str) -> Result<Date, String> {
    Date::parse(s, format_description!("[day]/[month]/[year]"))
        .map_err(|err| format!("expected a date formatted as dd/mm/yyyy, got {s:?}: {err}"))
}

fn check_cidr(s: &str) -> Result<(), String> {
    let invalid = || format!("expected an IPv4 CIDR like 10.0.0.0/24, got {s:?}");
    let (addr, bits) = s.split_once('/').ok_or_else(invalid)?;
    addr.parse::<Ipv4Addr>().map_err(|_| invalid())?;
    match bits.parse::<u8>() {
        Ok(bits) if bits <= 32 => Ok(()),
        _ => Err(invalid()),
    }
}

fn check_cron(s: &str) -> Result<(), String> {
    const BOUNDS: [(u32, u32); 5] = [(0, 59), (0, 23), (1, 31), (1, 12), (0, 7)];
    let fields: Vec<&str> = s.split_whitespace().collect();
    if fields.len() != BOUNDS.len() {
        return Err(format!("expected 5 cron fields, got {} in {s:?}", fields.len()));
    }
    for (field, (min, max)) in fields.iter().zip(BOUNDS) {
        if !cron_field(field, min, max) {
            return Err(format!("invalid cron field {field:?} in {s:?}"));
        }
    }
    Ok(())
}

fn cron_field(field: &str, min: u32, max: u32) -> bool {
    let in_range = |n: &str| matches!(n.parse::<u32>(), Ok(n) if n >= min && n <= max);
    field.split(',').all(|item| {
        let (range, step) = match item.split_once('/') {
            Some((range, step)) => (range, Some(step)),
            None => (item, None),
        };
        let step_ok = step.map_or(true, |step| matches!(step.parse::<u32>(), Ok(n) if n > 0));
        let range_ok = match range.split_once('-') {
            _ if range == "*" => true,
            Some((lo, hi)) => {
                in_range(lo) && in_range(hi) && lo.parse::<u32>().ok() <= hi.parse::<u32>().ok()
            }
            None => in_range(range),
        };
        step_ok && range_ok
    })
}
