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

use std::{env, fs::File, sync::Mutex};

use anyhow::{bail, Result};
use terraform_provider_taikun::{Registry, TaikunProvider};

const SOURCE: &str = "registry.terraform.io/itera-io";

/// Prints the provider schema as JSON; this binary is not a loadable plugin
#[tokio::main]
async fn main() -> Result<()> {
    if let Ok(path) = env::var("PLUGIN_LOG_FILE") {
        let log_file = File::create(path)?;
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .with_writer(Mutex::new(log_file))
            .init();
    }

    let registry = Registry::new("taikun", TaikunProvider::new());
    if registry.init_diags.has_errors() {
        bail!("invalid provider schema: {}", registry.init_diags);
    }
    tracing::info!(
        resources = registry.resource_names().len(),
        data_sources = registry.data_source_names().len(),
        "provider schema built"
    );
    println!("{:#}", registry.schema_json(SOURCE));
    Ok(())
}
