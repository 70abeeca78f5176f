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
use serde::{Deserialize, Serialize};
use taikun_client::{
    models::{Organization, OrganizationCommand},
    Created,
};

use super::{flag, float, id, lock, name, number, opt_id, optional, required, string, text};
use crate::{
    map,
    taikun::{
        error::ProviderResult,
        ids,
        kind::{lock_model, Kind},
        session::Context,
    },
    Attribute, AttributeType, Block, Validator, ValueBool, ValueFloat, ValueNumber, ValueString,
};

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganizationState {
    pub id: ValueString,
    pub name: ValueString,
    pub full_name: ValueString,
    pub discount_rate: ValueFloat,
    pub phone: ValueString,
    pub email: ValueString,
    pub billing_email: ValueString,
    pub vat_number: ValueString,
    pub address: ValueString,
    pub city: ValueString,
    pub country: ValueString,
    pub managers_can_change_subscription: ValueBool,
    pub lock: ValueBool,
    pub is_read_only: ValueBool,
    pub partner_id: ValueString,
    pub partner_name: ValueString,
    pub created_at: ValueString,
    pub cloud_credentials: ValueNumber,
    pub projects: ValueNumber,
    pub users: ValueNumber,
}

impl OrganizationState {
    fn command(&self) -> ProviderResult<OrganizationCommand> {
        Ok(OrganizationCommand {
            name: required(&self.name, "name")?.to_string(),
            full_name: required(&self.full_name, "full_name")?.to_string(),
            discount_rate: self.discount_rate.unwrap_or(100.0),
            phone: optional(&self.phone),
            email: optional(&self.email),
            billing_email: optional(&self.billing_email),
            vat_number: optional(&self.vat_number),
            address: optional(&self.address),
            city: optional(&self.city),
            country: optional(&self.country),
            let_managers_change_subscription: self.managers_can_change_subscription.unwrap_or(true),
        })
    }
}

pub struct OrganizationKind;

#[async_trait]
impl Kind for OrganizationKind {
    const TYPE_NAME: &'static str = "organization";
    const PLURAL: Option<&'static str> = Some("organizations");

    type State = OrganizationState;
    type Model = Organization;

    fn schema() -> Block {
        Block::new(
            "Taikun organization",
            map! {
                "id" => Attribute::computed(AttributeType::String, "The organization ID."),
                "name" => name("The name of the organization."),
                "full_name" => Attribute::required(AttributeType::String, "The full name of the organization."),
                "discount_rate" => Attribute::optional(AttributeType::Number, "The discount rate of the organization.")
                    .default_value(100.0)
                    .validate(Validator::FloatBetween(0.0, 100.0)),
                "phone" => Attribute::optional(AttributeType::String, "Phone number."),
                "email" => Attribute::optional(AttributeType::String, "Email.")
                    .validate(Validator::Email),
                "billing_email" => Attribute::optional(AttributeType::String, "Billing email.")
                    .validate(Validator::Email),
                "vat_number" => Attribute::optional(AttributeType::String, "VAT number."),
                "address" => Attribute::optional(AttributeType::String, "Address."),
                "city" => Attribute::optional(AttributeType::String, "City."),
                "country" => Attribute::optional(AttributeType::String, "Country."),
                "managers_can_change_subscription" => Attribute::optional(
                    AttributeType::Bool,
                    "Allow subscription to be changed by managers.",
                )
                .default_value(true),
                "lock" => lock(),
                "is_read_only" => Attribute::computed(AttributeType::Bool, "Whether the organization is in read-only mode."),
                "partner_id" => Attribute::computed(AttributeType::String, "ID of the organization's partner."),
                "partner_name" => Attribute::computed(AttributeType::String, "Name of the organization's partner."),
                "created_at" => Attribute::computed(AttributeType::String, "Time of creation."),
                "cloud_credentials" => Attribute::computed(AttributeType::Number, "Number of associated cloud credentials."),
                "projects" => Attribute::computed(AttributeType::Number, "Number of associated projects."),
                "users" => Attribute::computed(AttributeType::Number, "Number of associated users."),
            },
        )
    }

    fn observe(model: Organization) -> OrganizationState {
        OrganizationState {
            id: id(model.id),
            name: string(model.name),
            full_name: string(model.full_name),
            discount_rate: float(model.discount_rate),
            phone: text(model.phone),
            email: text(model.email),
            billing_email: text(model.billing_email),
            vat_number: text(model.vat_number),
            address: text(model.address),
            city: text(model.city),
            country: text(model.country),
            managers_can_change_subscription: flag(model.let_managers_change_subscription),
            lock: flag(model.is_locked),
            is_read_only: flag(model.is_read_only),
            partner_id: opt_id(model.partner_id),
            partner_name: text(model.partner_name),
            created_at: text(model.created_at),
            cloud_credentials: number(model.cloud_credentials),
            projects: number(model.projects),
            users: number(model.users),
        }
    }

    async fn create(cx: &Context<'_>, planned: &OrganizationState) -> ProviderResult<String> {
        let created: Created = cx
            .organizations()
            .create(&planned.command()?)
            .send()
            .await?;
        Ok(created.id.to_string())
    }

    async fn update(
        cx: &Context<'_>,
        id: &str,
        prior: &OrganizationState,
        planned: &OrganizationState,
    ) -> ProviderResult<()> {
        let command = planned.command()?;
        if prior.command().ok().as_ref() == Some(&command) {
            return Ok(());
        }
        cx.organizations()
            .update(ids::numeric(id)?, &command)
            .execute()
            .await?;
        Ok(())
    }

    async fn set_lock(cx: &Context<'_>, id: &str, lock: bool) -> ProviderResult<()> {
        lock_model::<Organization>(cx, id, lock).await
    }
}
