// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
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

//! Loads the resources named on the command line and reports the caches.
//!
//! ```text
//! sandbox [--config loader.ron] <path>...
//! ```

use anyhow::{bail, Context, Result};
use khora_agents::{LoaderConfig, ResourceAgent};
use khora_core::event::ResourceEvent;
use khora_core::resource::ResourceType;

struct Args {
    config: Option<String>,
    paths: Vec<String>,
}

fn parse_args() -> Result<Args> {
    let mut config = None;
    let mut paths = Vec::new();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                config = Some(args.next().context("--config expects a file")?);
            }
            _ => paths.push(arg),
        }
    }
    if paths.is_empty() {
        bail!("usage: sandbox [--config loader.ron] <path>...");
    }
    Ok(Args { config, paths })
}

#[tokio::main]
async fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = parse_args()?;
    let config = match &args.config {
        Some(path) => LoaderConfig::from_file(path)?,
        None => LoaderConfig::default(),
    };

    let agent = ResourceAgent::builder()
        .config(config)
        .with_default_lanes()
        .build()?;
    let events = agent.subscribe_events();

    for handle in agent.load_all(&args.paths) {
        match handle.wait().await {
            Ok(resource) => log::info!(
                "{} -> {} ({} dependencies)",
                handle.path(),
                resource.resource_type(),
                resource.dependencies().len()
            ),
            Err(error) => log::error!("{error}"),
        }
    }

    // Dependencies may still be in flight once the requested paths are done.
    while agent.is_loading() {
        match events.recv_async().await {
            Ok(ResourceEvent::AllSettled { .. }) | Err(_) => break,
            Ok(_) => {}
        }
    }

    for resource_type in [
        ResourceType::TEXTURE,
        ResourceType::MESH,
        ResourceType::MATERIAL,
        ResourceType::SCENE,
    ] {
        let cached = agent.resources_of(&resource_type);
        if !cached.is_empty() {
            log::info!("{} {}(s) cached", cached.len(), resource_type);
        }
    }
    Ok(())
}
