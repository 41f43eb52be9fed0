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

//! Reference loader lanes and their default registration.

mod document_loader_lane;
mod mesh_loader_lane;
mod texture_loader_lane;

pub use document_loader_lane::*;
pub use mesh_loader_lane::*;
pub use texture_loader_lane::*;

use super::{FormatRegistry, TypeFactoryRegistry};
use khora_core::resource::{PayloadShape, ResourceType};
use std::sync::Arc;

/// Registers every reference lane: images, OBJ meshes, JSON documents and
/// packed containers.
pub fn register_default_lanes(formats: &mut FormatRegistry, factories: Arc<TypeFactoryRegistry>) {
    formats.register(
        TEXTURE_EXTENSIONS,
        TextureLoaderLane,
        PayloadShape::Binary,
        Some(ResourceType::TEXTURE),
    );
    formats.register(
        ["obj"],
        ObjLoaderLane,
        PayloadShape::Text,
        Some(ResourceType::MESH),
    );
    formats.register(
        DOCUMENT_EXTENSIONS,
        DocumentLoaderLane::new(factories.clone()),
        PayloadShape::Structured,
        None,
    );
    formats.register(
        CONTAINER_EXTENSIONS,
        ContainerLoaderLane::new(factories),
        PayloadShape::Binary,
        None,
    );
}
