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

//! S3 backup credentials and project backup policies

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use taikun_client::{
    models::{
        BackupCredential, BackupPolicy, CreateBackupCredentialCommand, CreateBackupPolicyCommand,
        DeleteBackupPolicyCommand, UpdateBackupCredentialCommand,
    },
    Created,
};
use tracing::debug;

use super::{
    audited, elements, flag, id, lock, name, required, required_id, scoped, string, text,
};
use crate::{
    map,
    taikun::{
        error::{ProviderError, ProviderResult},
        ids,
        kind::{lock_model, Kind},
        session::Context,
    },
    Attribute, AttributeType, Block, Validator, Value, ValueBool, ValueList, ValueString,
};

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupCredentialState {
    pub id: ValueString,
    pub name: ValueString,
    pub organization_id: ValueString,
    pub organization_name: ValueString,
    pub lock: ValueBool,
    pub is_default: ValueBool,
    pub s3_access_key_id: ValueString,
    pub s3_secret_access_key: ValueString,
    pub s3_endpoint: ValueString,
    pub s3_region: ValueString,
    pub created_by: ValueString,
    pub last_modified: ValueString,
    pub last_modified_by: ValueString,
}

impl BackupCredentialState {
    fn command(&self) -> ProviderResult<UpdateBackupCredentialCommand> {
        Ok(UpdateBackupCredentialCommand {
            s3_name: required(&self.name, "name")?.to_string(),
            s3_access_key_id: required(&self.s3_access_key_id, "s3_access_key_id")?.to_string(),
            s3_secret_access_key: required(&self.s3_secret_access_key, "s3_secret_access_key")?
                .to_string(),
        })
    }
}

pub struct BackupCredentialKind;

#[async_trait]
impl Kind for BackupCredentialKind {
    const TYPE_NAME: &'static str = "backup_credential";
    const PLURAL: Option<&'static str> = Some("backup_credentials");

    type State = BackupCredentialState;
    type Model = BackupCredential;

    fn schema() -> Block {
        let mut attributes = audited(scoped("backup credential"));
        attributes.extend(map! {
            "name" => name("The name of the backup credential."),
            "lock" => lock(),
            "is_default" => Attribute::computed(AttributeType::Bool, "Indicates whether the backup credential is the organization's default."),
            "s3_access_key_id" => Attribute::required(AttributeType::String, "The S3 access key ID.")
                .sensitive(),
            "s3_secret_access_key" => Attribute::required(AttributeType::String, "The S3 secret access key.")
                .sensitive(),
            "s3_endpoint" => Attribute::required(AttributeType::String, "The S3 endpoint URL.")
                .force_new()
                .validate(Validator::Url),
            "s3_region" => Attribute::required(AttributeType::String, "The S3 region.")
                .force_new(),
        });
        Block::new("Taikun backup credential", attributes)
    }

    fn observe(model: BackupCredential) -> BackupCredentialState {
        BackupCredentialState {
            id: id(model.id),
            name: string(model.s3_name),
            organization_id: id(model.organization_id),
            organization_name: string(model.organization_name),
            lock: flag(model.is_locked),
            is_default: flag(model.is_default),
            s3_access_key_id: Value::Null,
            s3_secret_access_key: Value::Null,
            s3_endpoint: string(model.s3_endpoint),
            s3_region: string(model.s3_region),
            created_by: text(model.created_by),
            last_modified: text(model.last_modified),
            last_modified_by: text(model.last_modified_by),
        }
    }

    async fn create(cx: &Context<'_>, planned: &BackupCredentialState) -> ProviderResult<String> {
        let secrets = planned.command()?;
        let created: Created = cx
            .backup_credentials()
            .create(&CreateBackupCredentialCommand {
                s3_name: secrets.s3_name,
                s3_access_key_id: secrets.s3_access_key_id,
                s3_secret_access_key: secrets.s3_secret_access_key,
                s3_endpoint: required(&planned.s3_endpoint, "s3_endpoint")?.to_string(),
                s3_region: required(&planned.s3_region, "s3_region")?.to_string(),
                organization_id: ids::reference(&planned.organization_id)?,
            })
            .send()
            .await?;
        Ok(created.id.to_string())
    }

    /// Name and keys travel together: the upstream wants the keys on every update
    async fn update(
        cx: &Context<'_>,
        id: &str,
        prior: &BackupCredentialState,
        planned: &BackupCredentialState,
    ) -> ProviderResult<()> {
        let command = planned.command()?;
        if prior.command().ok().as_ref() == Some(&command) {
            return Ok(());
        }
        cx.backup_credentials()
            .update(ids::numeric(id)?, &command)
            .execute()
            .await?;
        Ok(())
    }

    async fn set_lock(cx: &Context<'_>, id: &str, lock: bool) -> ProviderResult<()> {
        lock_model::<BackupCredential>(cx, id, lock).await
    }
}

/// Backup schedule of a project, identified by `<project_id>/<name>`
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupPolicyState {
    pub id: ValueString,
    pub name: ValueString,
    pub project_id: ValueString,
    pub cron_period: ValueString,
    pub retention_period: ValueString,
    pub included_namespaces: ValueList<String>,
}

const POLICY_ID: &str = "<project_id>/<name>";

fn policy_id(id: &str) -> ProviderResult<(i64, &str)> {
    let (project_id, name) = ids::split(id, POLICY_ID)?;
    let project_id = ids::numeric(project_id).map_err(|_| {
        ProviderError::ConfigInvalid(format!("invalid id {id:?}: expected {POLICY_ID}"))
    })?;
    Ok((project_id, name))
}

pub struct BackupPolicyKind;

#[async_trait]
impl Kind for BackupPolicyKind {
    const TYPE_NAME: &'static str = "backup_policy";

    type State = BackupPolicyState;
    type Model = BackupPolicy;

    fn schema() -> Block {
        Block::new(
            "Taikun backup policy",
            map! {
                "id" => Attribute::computed(AttributeType::String, "The backup policy ID: `<project_id>/<name>`."),
                "name" => name("The name of the backup policy.").force_new(),
                "project_id" => Attribute::required(AttributeType::String, "ID of the project to back up.")
                    .force_new()
                    .validate(Validator::NumericId),
                "cron_period" => Attribute::required(AttributeType::String, "Frequency of backups, as a cron expression.")
                    .force_new()
                    .validate(Validator::Cron),
                "retention_period" => Attribute::required(AttributeType::String, "Retention period of backups, for example `3h`.")
                    .force_new()
                    .validate(Validator::Regex("^[0-9]+[smhd]$", "expected a duration like 30m, 3h or 2d")),
                "included_namespaces" => Attribute::required(AttributeType::list_of_strings(), "Namespaces to back up.")
                    .force_new(),
            },
        )
    }

    fn observe(model: BackupPolicy) -> BackupPolicyState {
        BackupPolicyState {
            id: string(ids::join(model.project_id, &model.name)),
            name: string(model.name),
            project_id: id(model.project_id),
            cron_period: string(model.cron_period),
            retention_period: string(model.retention_period),
            included_namespaces: Value::Value(model.included_namespaces),
        }
    }

    async fn create(cx: &Context<'_>, planned: &BackupPolicyState) -> ProviderResult<String> {
        let project_id = required_id(&planned.project_id, "project_id")?;
        let name = required(&planned.name, "name")?;
        cx.backup_policies()
            .create(&CreateBackupPolicyCommand {
                project_id,
                name: name.to_string(),
                cron_period: required(&planned.cron_period, "cron_period")?.to_string(),
                retention_period: required(&planned.retention_period, "retention_period")?
                    .to_string(),
                included_namespaces: elements(&planned.included_namespaces).to_vec(),
            })
            .execute()
            .await?;
        Ok(ids::join(project_id, name))
    }

    async fn read(cx: &Context<'_>, id: &str) -> ProviderResult<Option<BackupPolicyState>> {
        let (project_id, name) = policy_id(id)?;
        let policy = cx
            .backup_policies()
            .list()
            .filter("ProjectId", project_id)
            .all()
            .await?
            .into_iter()
            .find(|policy| policy.name == name);
        debug!(project_id, name, found = policy.is_some(), "backup policy lookup");
        Ok(policy.map(Self::observe))
    }

    async fn delete(cx: &Context<'_>, id: &str, _prior: &BackupPolicyState) -> ProviderResult<()> {
        let (project_id, name) = policy_id(id)?;
        cx.backup_policies()
            .action(
                "delete/schedule",
                &DeleteBackupPolicyCommand {
                    project_id,
                    name: name.to_string(),
                },
            )
            .execute()
            .await?;
        Ok(())
    }

    fn parse_import_id(id: &str) -> ProviderResult<String> {
        let (project_id, name) = policy_id(id)?;
        Ok(ids::join(project_id, name))
    }
}
