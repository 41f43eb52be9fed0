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

//! Maps file extensions to the way their payload is fetched and decoded.

use super::PreProcessor;
use khora_core::resource::{PayloadShape, ResourceType};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// How files with a given extension are loaded.
#[derive(Clone)]
pub struct FormatHandler {
    shape: PayloadShape,
    pre_processor: Option<Arc<dyn PreProcessor>>,
    produces: Option<ResourceType>,
}

impl FormatHandler {
    /// The shape the transport should deliver.
    pub fn shape(&self) -> PayloadShape {
        self.shape
    }

    /// The decoder, or `None` if the payload is kept as it was fetched.
    pub fn pre_processor(&self) -> Option<&Arc<dyn PreProcessor>> {
        self.pre_processor.as_ref()
    }

    /// The type the decoder is expected to produce.
    pub fn produces(&self) -> Option<&ResourceType> {
        self.produces.as_ref()
    }
}

impl fmt::Debug for FormatHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatHandler")
            .field("shape", &self.shape)
            .field("has_pre_processor", &self.pre_processor.is_some())
            .field("produces", &self.produces)
            .finish()
    }
}

/// The extension table. Lookups are case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct FormatRegistry {
    handlers: HashMap<String, FormatHandler>,
}

impl FormatRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `pre_processor` for every extension in `extensions`.
    /// `produces` is `None` for self-describing formats that may yield any type.
    ///
    /// Registering an extension twice replaces the previous handler.
    pub fn register<'a>(
        &mut self,
        extensions: impl IntoIterator<Item = &'a str>,
        pre_processor: impl PreProcessor + 'static,
        shape: PayloadShape,
        produces: Option<ResourceType>,
    ) {
        let pre_processor: Arc<dyn PreProcessor> = Arc::new(pre_processor);
        for extension in extensions {
            self.insert(
                extension,
                FormatHandler {
                    shape,
                    pre_processor: Some(pre_processor.clone()),
                    produces: produces.clone(),
                },
            );
        }
    }

    /// Registers a format whose payload is kept as it was fetched.
    pub fn register_shape(&mut self, extension: &str, shape: PayloadShape) {
        self.insert(
            extension,
            FormatHandler {
                shape,
                pre_processor: None,
                produces: None,
            },
        );
    }

    fn insert(&mut self, extension: &str, handler: FormatHandler) {
        let extension = normalize(extension);
        if self.handlers.insert(extension.clone(), handler).is_some() {
            log::debug!("Format handler for '.{}' replaced", extension);
        }
    }

    /// Adds every handler of `other`, replacing handlers for the same extensions.
    pub fn extend(&mut self, other: FormatRegistry) {
        self.handlers.extend(other.handlers);
    }

    /// The handler for `extension`.
    pub fn lookup(&self, extension: &str) -> Option<&FormatHandler> {
        self.handlers.get(&normalize(extension))
    }

    /// The shape to fetch `extension` with, if the extension is known.
    pub fn payload_shape(&self, extension: &str) -> Option<PayloadShape> {
        self.lookup(extension).map(FormatHandler::shape)
    }

    /// All registered extensions, sorted.
    pub fn extensions(&self) -> Vec<&str> {
        let mut extensions: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        extensions.sort_unstable();
        extensions
    }
}

fn normalize(extension: &str) -> String {
    extension.trim().trim_start_matches('.').to_ascii_lowercase()
}
