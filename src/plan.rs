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

//! Schema driven planning
//!
//! Everything here works on the dynamic [`ValueAny`] form of a state, where nested blocks are
//! always lists of objects, so the same logic serves every resource kind.

use std::collections::BTreeMap;

use crate::{
    attribute_path::AttributePath,
    diagnostics::Diagnostics,
    schema::{Attribute, AttributeConstraint, AttributeType, Block, NestedBlock},
    value::ValueAny,
};

/// Attributes kept across updates even though they are computed only
const STABLE: &[&str] = &["id", "organization_id", "organization_name"];

/// Check a configuration against a block: required attributes, validators and conflicts
pub fn validate(block: &Block, config: &ValueAny, diags: &mut Diagnostics) {
    validate_block(block, config, &AttributePath::default(), diags)
}

fn validate_block(block: &Block, config: &ValueAny, path: &AttributePath, diags: &mut Diagnostics) {
    for (name, attr) in &block.attributes {
        let value = config.get(name);
        let attr_path = path.clone().attribute(name.clone());
        if value.is_null() {
            if attr.constraint == AttributeConstraint::Required {
                diags.error(
                    "Missing required argument",
                    format!("The argument \"{name}\" is required, but no definition was found."),
                    attr_path,
                );
            }
            continue;
        }
        if attr.constraint == AttributeConstraint::Computed && !value.is_unknown() {
            diags.error_short(
                format!("Value for unconfigurable attribute \"{name}\""),
                attr_path.clone(),
            );
        }
        check_validators(attr, value, &attr_path, diags);
        for other in attr.conflicts_with {
            if is_set(config.get(other)) && is_set(value) {
                diags.error(
                    "Conflicting configuration arguments",
                    format!("\"{name}\": conflicts with {other}"),
                    attr_path.clone(),
                );
            }
        }
    }
    for (name, nested) in &block.blocks {
        for (i, element) in config.get(name).elements().iter().enumerate() {
            let element_path = path.clone().attribute(name.clone()).index(i as i64);
            validate_block(nested.block(), element, &element_path, diags);
        }
    }
}

fn is_set(value: &ValueAny) -> bool {
    !value.is_empty() && value.as_str() != Some("")
}

fn check_validators(
    attr: &Attribute,
    value: &ValueAny,
    path: &AttributePath,
    diags: &mut Diagnostics,
) {
    let elements: Vec<(Option<usize>, &ValueAny)> = if attr.attr_type.is_collection() {
        value.elements().iter().enumerate().map(|(i, v)| (Some(i), v)).collect()
    } else {
        vec![(None, value)]
    };
    for validator in &attr.validators {
        for (index, element) in &elements {
            if let Err(detail) = validator.check(element) {
                let path = match index {
                    Some(i) => path.clone().index(*i as i64),
                    None => path.clone(),
                };
                diags.error(format!("Invalid value, expected {validator}"), detail, path);
            }
        }
    }
}

/// Plan a creation: defaults for null attributes, unknown for computed ones
pub fn plan_create(block: &Block, config: &ValueAny) -> ValueAny {
    let mut planned = BTreeMap::new();
    for (name, attr) in &block.attributes {
        let value = config.get(name);
        let value = match (&attr.default, attr.constraint) {
            _ if !value.is_null() => value.clone(),
            (Some(default), _) => default.clone(),
            (None, constraint) if constraint.is_computed() => ValueAny::Unknown,
            _ => ValueAny::Null,
        };
        planned.insert(name.clone(), value);
    }
    for (name, nested) in &block.blocks {
        let elements = config
            .get(name)
            .elements()
            .iter()
            .map(|element| plan_create(nested.block(), element))
            .collect();
        planned.insert(name.clone(), ValueAny::List(elements));
    }
    ValueAny::Map(planned)
}

/// Plan an update from `prior` to `config`
///
/// Returns the planned state and the paths of changed attributes that force a replacement.
pub fn plan_update(
    block: &Block,
    prior: &ValueAny,
    config: &ValueAny,
) -> (ValueAny, Vec<AttributePath>) {
    let mut replace = Vec::new();
    let root = AttributePath::default();
    let mut planned = plan_update_block(block, prior, config, &root, &mut replace);
    if !planned.same_as(prior) {
        for (name, attr) in &block.attributes {
            if attr.constraint == AttributeConstraint::Computed && !STABLE.contains(&name.as_str())
            {
                if let Some(value) = planned.get_mut(name) {
                    *value = ValueAny::Unknown;
                }
            }
        }
    }
    (planned, replace)
}

fn plan_update_block(
    block: &Block,
    prior: &ValueAny,
    config: &ValueAny,
    path: &AttributePath,
    replace: &mut Vec<AttributePath>,
) -> ValueAny {
    let mut planned = BTreeMap::new();
    for (name, attr) in &block.attributes {
        let old = prior.get(name);
        let new = config.get(name);
        let value = if attr.constraint == AttributeConstraint::Computed
            || attr
                .diff_suppress
                .is_some_and(|suppress| suppress.equivalent(old, new))
        {
            old.clone()
        } else if new.is_null() {
            match &attr.default {
                Some(default) => default.clone(),
                None if attr.constraint.is_computed() => old.clone(),
                None => ValueAny::Null,
            }
        } else {
            new.clone()
        };
        let unchanged = same_values(&attr.attr_type, &value, old);
        if attr.force_new && !unchanged {
            replace.push(path.clone().attribute(name.clone()));
        }
        planned.insert(name.clone(), if unchanged { old.clone() } else { value });
    }
    for (name, nested) in &block.blocks {
        let old = prior.get(name).elements();
        let new = config.get(name).elements();
        let nested_path = path.clone().attribute(name.clone());
        let elements = match nested {
            NestedBlock::Set(block) => plan_update_set(block, old, new, &nested_path, replace),
            _ => new
                .iter()
                .enumerate()
                .map(|(i, element)| match old.get(i) {
                    Some(old) => plan_update_block(
                        nested.block(),
                        old,
                        element,
                        &nested_path.clone().index(i as i64),
                        replace,
                    ),
                    None => plan_create(nested.block(), element),
                })
                .collect(),
        };
        planned.insert(name.clone(), ValueAny::List(elements));
    }
    ValueAny::Map(planned)
}

/// Plan a nested set: each configured element is paired with the prior element it plans to
///
/// Paired elements keep the prior order so an unchanged set plans exactly as its prior state.
/// Elements without a counterpart are planned as new ones and come last.
fn plan_update_set(
    block: &Block,
    old: &[ValueAny],
    new: &[ValueAny],
    path: &AttributePath,
    replace: &mut Vec<AttributePath>,
) -> Vec<ValueAny> {
    let mut paired: Vec<Option<ValueAny>> = vec![None; old.len()];
    let mut added = Vec::new();
    for (i, element) in new.iter().enumerate() {
        let element_path = path.clone().index(i as i64);
        let found = old.iter().enumerate().find_map(|(j, prior)| {
            if paired[j].is_some() {
                return None;
            }
            let mut scratch = Vec::new();
            let candidate = plan_update_block(block, prior, element, &element_path, &mut scratch);
            readable_equal(block, &candidate, prior).then_some(j)
        });
        match found {
            Some(j) => {
                paired[j] = Some(plan_update_block(block, &old[j], element, &element_path, replace))
            }
            None => added.push(plan_create(block, element)),
        }
    }
    paired.into_iter().flatten().chain(added).collect()
}

/// Check whether a value contains unknowns at any depth
pub fn contains_unknown(value: &ValueAny) -> bool {
    match value {
        ValueAny::Unknown => true,
        ValueAny::List(list) => list.iter().any(contains_unknown),
        ValueAny::Map(map) => map.values().any(contains_unknown),
        _ => false,
    }
}

/// Replace unknowns with nulls, for states saved after a failed apply
pub fn unknown_as_null(value: &mut ValueAny) {
    match value {
        ValueAny::Unknown => *value = ValueAny::Null,
        ValueAny::List(list) => list.iter_mut().for_each(unknown_as_null),
        ValueAny::Map(map) => map.values_mut().for_each(unknown_as_null),
        _ => (),
    }
}

fn same_values(attr_type: &AttributeType, a: &ValueAny, b: &ValueAny) -> bool {
    match attr_type {
        AttributeType::Set(_) => {
            let (a, b) = (a.elements(), b.elements());
            a.len() == b.len() && a.iter().all(|x| b.iter().any(|y| x.same_as(y)))
        }
        _ => a.same_as(b),
    }
}

/// Check whether the upstream reflects the planned configuration
///
/// Only configurable, known, non-null and non-sensitive attributes are compared.
pub fn converged(block: &Block, planned: &ValueAny, observed: &ValueAny) -> bool {
    for (name, attr) in &block.attributes {
        let expected = planned.get(name);
        if !attr.constraint.is_configurable() || attr.sensitive || contains_unknown(expected) {
            continue;
        }
        if expected.is_null() {
            continue;
        }
        if !same_values(&attr.attr_type, expected, observed.get(name)) {
            return false;
        }
    }
    for (name, nested) in &block.blocks {
        let expected = planned.get(name).elements();
        let actual = observed.get(name).elements();
        if expected.len() != actual.len() {
            return false;
        }
        let block = nested.block();
        let matched = match nested {
            NestedBlock::Set(_) => expected
                .iter()
                .all(|e| actual.iter().any(|a| converged(block, e, a))),
            _ => expected
                .iter()
                .zip(actual)
                .all(|(e, a)| converged(block, e, a)),
        };
        if !matched {
            return false;
        }
    }
    true
}

/// Copy values the upstream never returns from `reference` into `observed`
///
/// Covers sensitive attributes at any depth plus the top-level `unreadable` ones. Nested
/// elements are paired by their readable attributes, then by position.
pub fn preserve_sensitive(
    block: &Block,
    reference: &ValueAny,
    observed: &mut ValueAny,
    unreadable: &[&str],
) {
    for (name, attr) in &block.attributes {
        if !(attr.sensitive || unreadable.contains(&name.as_str())) {
            continue;
        }
        let kept = reference.get(name);
        if let Some(value) = observed.get_mut(name) {
            if (value.is_empty() || value.as_str() == Some("")) && !kept.is_unknown() {
                *value = kept.clone();
            }
        }
    }
    for (name, nested) in &block.blocks {
        let block = nested.block();
        let references = reference.get(name).elements();
        let Some(ValueAny::List(elements)) = observed.get_mut(name) else {
            continue;
        };
        for (i, element) in elements.iter_mut().enumerate() {
            let paired = references
                .iter()
                .find(|r| readable_equal(block, r, element))
                .or_else(|| references.get(i));
            if let Some(paired) = paired {
                preserve_sensitive(block, paired, element, &[]);
            }
        }
    }
}

fn readable_equal(block: &Block, a: &ValueAny, b: &ValueAny) -> bool {
    block
        .attributes
        .iter()
        .filter(|(_, attr)| !attr.sensitive && attr.constraint.is_configurable())
        .all(|(name, _)| a.get(name).same_as(b.get(name)))
}
