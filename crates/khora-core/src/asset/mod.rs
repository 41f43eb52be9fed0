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

//! Built-in resource payloads.
//!
//! These are the engine-ready objects the reference decoders and finalizers
//! produce. Plugin crates can add their own payloads by implementing
//! [`ResourceData`](crate::resource::ResourceData) and registering a type tag.

mod animation;
mod material;
mod mesh;
mod raw;
mod scene;
mod texture;

pub use animation::*;
pub use material::*;
pub use mesh::*;
pub use raw::*;
pub use scene::*;
pub use texture::*;

use crate::resource::ResourceType;
use serde::Serialize;
use serde_json::Value;

/// The key under which self-describing documents carry their type tag.
pub const OBJECT_TYPE_KEY: &str = "object_type";

/// Serializes `value` into a structured document tagged with `resource_type`.
///
/// Returns `None` when the value does not serialize to a JSON object.
pub fn tagged_document<T: Serialize>(resource_type: &ResourceType, value: &T) -> Option<Value> {
    let mut document = serde_json::to_value(value).ok()?;
    document.as_object_mut()?.insert(
        OBJECT_TYPE_KEY.to_string(),
        Value::String(resource_type.as_str().to_string()),
    );
    Some(document)
}

/// Reads the type tag of a self-describing document.
pub fn document_type(document: &Value) -> Option<ResourceType> {
    document
        .get(OBJECT_TYPE_KEY)
        .and_then(Value::as_str)
        .map(ResourceType::from)
}
