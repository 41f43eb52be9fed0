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

//! Loader configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Settings of a [`ResourceAgent`](super::ResourceAgent).
///
/// Usually read from a RON file:
///
/// ```ron
/// (
///     base_path: "assets",
///     proxy: Some("http://localhost:8080/proxy?url="),
///     file_systems: { "shared": "/srv/shared" },
///     keep_files: true,
/// )
/// ```
///
/// Missing fields take their default value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Root relative paths are fetched from.
    pub base_path: String,
    /// Prefix `http`/`https` fetches are routed through.
    pub proxy: Option<String>,
    /// Virtual file system aliases and their roots.
    pub file_systems: BTreeMap<String, String>,
    /// Append a unique `nocache` parameter to every fetch.
    pub ignore_cache: bool,
    /// Keep the fetched bytes on every resource, for saving it back unchanged.
    pub keep_files: bool,
    /// Free CPU-side buffers once they are uploaded to the GPU.
    pub free_data: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            base_path: khora_io::resolver::DEFAULT_BASE_PATH.to_string(),
            proxy: None,
            file_systems: BTreeMap::new(),
            ignore_cache: false,
            keep_files: false,
            free_data: false,
        }
    }
}

impl LoaderConfig {
    /// Parses a configuration from RON text.
    pub fn from_ron(text: &str) -> Result<Self> {
        ron::de::from_str(text).context("Failed to parse loader configuration")
    }

    /// Reads a configuration from a RON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read loader configuration {:?}", path))?;
        Self::from_ron(&text).with_context(|| format!("In {:?}", path))
    }
}
