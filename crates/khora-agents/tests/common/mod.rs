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

//! Shared fixtures of the resource agent integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use khora_agents::{LoaderConfig, ResourceAgent, ResourceAgentBuilder};
use khora_core::asset::Mesh;
use khora_core::event::ResourceEvent;
use khora_core::fetch::Fetcher;
use khora_core::resource::{Payload, PayloadShape, Resource, ResourceType};
use khora_core::{DecodeError, TransportError};
use khora_io::fetcher::shape_payload;
use khora_lanes::asset_lane::{pre_processor, Decoded};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const BASE: &str = "assets";

/// An in-memory transport that counts and records its fetches.
#[derive(Default)]
pub struct MemoryFetcher {
    files: Mutex<HashMap<String, Vec<u8>>>,
    addresses: Mutex<Vec<String>>,
    fetches: AtomicUsize,
}

impl MemoryFetcher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Stores `bytes` at the address `path` resolves to under [`BASE`].
    pub fn insert(&self, path: &str, bytes: impl Into<Vec<u8>>) {
        self.files
            .lock()
            .unwrap()
            .insert(format!("{BASE}/{path}"), bytes.into());
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn addresses(&self) -> Vec<String> {
        self.addresses.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for MemoryFetcher {
    async fn fetch(&self, address: &str, shape: PayloadShape) -> Result<Payload, TransportError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.addresses.lock().unwrap().push(address.to_string());
        // Give concurrent requests a chance to join this load.
        tokio::task::yield_now().await;
        let key = address.split('?').next().unwrap_or(address);
        let bytes = self
            .files
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| TransportError::NotFound(address.to_string()))?;
        shape_payload(address, bytes, shape)
    }
}

pub fn config() -> LoaderConfig {
    LoaderConfig {
        base_path: BASE.to_string(),
        ..LoaderConfig::default()
    }
}

pub fn builder(fetcher: &Arc<MemoryFetcher>) -> ResourceAgentBuilder {
    ResourceAgent::builder()
        .config(config())
        .shared_fetcher(fetcher.clone())
}

/// Decodes `{"positions": [[x, y, z], ...]}` documents into meshes.
pub fn builder_with_mesh_format(fetcher: &Arc<MemoryFetcher>) -> ResourceAgentBuilder {
    builder(fetcher).with_default_lanes().format(
        ["mesh"],
        pre_processor(|_path, payload, _options| {
            let Payload::Structured(document) = payload else {
                return Err(DecodeError::Invalid("expected a document".to_string()));
            };
            let positions: Vec<[f32; 3]> = serde_json::from_value(document["positions"].clone())
                .map_err(|e| DecodeError::Other(e.into()))?;
            Ok(Decoded::Ready(Resource::new(
                ResourceType::MESH,
                Mesh::from_positions(positions),
            )))
        }),
        PayloadShape::Structured,
        Some(ResourceType::MESH),
    )
}

pub const TRIANGLE: &str = r#"{"positions": [[0, 0, 0], [1, 0, 0], [0, 1, 0]]}"#;

/// Waits until every outstanding load of `agent` has settled.
pub async fn settle(agent: &ResourceAgent) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while agent.is_loading() {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("loads did not settle in time");
}

pub fn drain(events: &flume::Receiver<ResourceEvent>) -> Vec<ResourceEvent> {
    events.try_iter().collect()
}
