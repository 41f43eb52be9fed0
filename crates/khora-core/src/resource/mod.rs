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

//! The resource model shared by every stage of the loading pipeline.
//!
//! A [`Resource`] is an opaque, typed payload (anything implementing
//! [`ResourceData`]) wrapped with the metadata the cache needs: its type tag,
//! its canonical filename, whether it came from a fetch, and optionally the raw
//! bytes it was decoded from.
//!
//! Once registered, a resource is shared as a [`ResourceRef`]. The few fields that
//! may still change afterwards (filename on rename, editor flags) use interior
//! mutability, the payload itself is frozen.

mod path;
mod payload;

pub use path::ResourcePath;
pub use payload::{Payload, PayloadShape};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::any::Any;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// A shared handle to a registered resource.
pub type ResourceRef = Arc<Resource>;

/// The type tag of a resource, e.g. `"Texture"` or `"Mesh"`.
///
/// Tags select the post-processor and the secondary cache of a resource, and
/// are embedded in self-describing documents as `object_type`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceType(Cow<'static, str>);

impl ResourceType {
    /// Decoded images.
    pub const TEXTURE: Self = Self(Cow::Borrowed("Texture"));
    /// Vertex and index data.
    pub const MESH: Self = Self(Cow::Borrowed("Mesh"));
    /// Shading parameters referencing textures.
    pub const MATERIAL: Self = Self(Cow::Borrowed("Material"));
    /// A fragment of a scene graph.
    pub const SCENE: Self = Self(Cow::Borrowed("Scene"));
    /// Keyframed animation data.
    pub const ANIMATION: Self = Self(Cow::Borrowed("Animation"));
    /// Undecoded payloads.
    pub const RAW: Self = Self(Cow::Borrowed("Raw"));

    /// Creates a tag for a plugin-defined type.
    pub fn new(tag: impl Into<String>) -> Self {
        Self(Cow::Owned(tag.into()))
    }

    /// The tag as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceType {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Helper trait to allow downcasting `dyn ResourceData` trait objects to their concrete types.
pub trait AsAny {
    /// Returns a reference to the inner value as `&dyn Any`.
    fn as_any(&self) -> &dyn Any;

    /// Returns a mutable reference to the inner value as `&mut dyn Any`.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// The payload of a resource.
///
/// Implementors are the engine-ready objects (textures, meshes, ...). The
/// supertraits allow resources to be decoded on worker threads and shared
/// across the engine.
pub trait ResourceData: AsAny + Send + Sync + fmt::Debug + 'static {
    /// Further resources this one references, mapped to the type expected at
    /// each path. The loader fetches them after decoding this resource.
    fn dependencies(&self) -> BTreeMap<String, ResourceType> {
        BTreeMap::new()
    }

    /// A structured representation of the payload, used when the resource has
    /// to be written back and no source bytes were kept.
    fn to_document(&self) -> Option<Value> {
        None
    }
}

/// Per-request options carried through the pipeline down to the decoders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Fetch relative paths from this root instead of the configured base path.
    pub base_path: Option<String>,
    /// Fetch relative paths from the working directory (`.`).
    pub force_local: bool,
    /// Free-form decoder parameters.
    pub params: BTreeMap<String, String>,
    /// Filename stamped on the loaded resource instead of its canonical path.
    /// The cache key is not affected.
    pub filename: Option<String>,
}

impl LoadOptions {
    /// Options that fetch relative paths from `base_path`.
    pub fn with_base_path(base_path: impl Into<String>) -> Self {
        Self {
            base_path: Some(base_path.into()),
            ..Default::default()
        }
    }

    /// Stamps `filename` on the loaded resource.
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Adds a decoder parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

/// The best available representation of a resource for saving it.
#[derive(Debug, Clone, PartialEq)]
pub enum InternalData {
    /// The bytes the resource was originally decoded from.
    Source(Arc<[u8]>),
    /// A structured document produced by the payload.
    Document(Value),
}

/// A typed resource plus the metadata the cache tracks for it.
pub struct Resource {
    resource_type: ResourceType,
    filename: RwLock<ResourcePath>,
    remote: bool,
    original_bytes: RwLock<Option<Arc<[u8]>>>,
    modified: AtomicBool,
    data: Box<dyn ResourceData>,
}

impl Resource {
    /// Wraps a payload. The filename is stamped when the resource is registered.
    pub fn new<T: ResourceData>(resource_type: ResourceType, data: T) -> Self {
        Self::from_boxed(resource_type, Box::new(data))
    }

    /// Wraps an already boxed payload, as produced by type factories.
    pub fn from_boxed(resource_type: ResourceType, data: Box<dyn ResourceData>) -> Self {
        Self {
            resource_type,
            filename: RwLock::new(ResourcePath::default()),
            remote: false,
            original_bytes: RwLock::new(None),
            modified: AtomicBool::new(false),
            data,
        }
    }

    /// The type tag.
    pub fn resource_type(&self) -> &ResourceType {
        &self.resource_type
    }

    /// The canonical path this resource is registered under.
    pub fn filename(&self) -> ResourcePath {
        self.filename
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Updates the canonical path, used when the resource is registered or renamed.
    pub fn set_filename(&self, filename: ResourcePath) {
        *self
            .filename
            .write()
            .unwrap_or_else(PoisonError::into_inner) = filename;
    }

    /// Whether the resource was fetched rather than constructed in-process.
    pub fn is_remote(&self) -> bool {
        self.remote
    }

    /// Marks the resource as fetched or constructed in-process.
    pub fn set_remote(&mut self, remote: bool) {
        self.remote = remote;
    }

    /// The raw bytes the resource was decoded from, if they were kept.
    pub fn original_bytes(&self) -> Option<Arc<[u8]>> {
        self.original_bytes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Keeps the raw bytes the resource was decoded from.
    pub fn set_original_bytes(&mut self, bytes: Vec<u8>) {
        *self
            .original_bytes
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner) = Some(bytes.into());
    }

    /// Whether the resource was edited since it was loaded or last saved.
    pub fn is_modified(&self) -> bool {
        self.modified.load(Ordering::Acquire)
    }

    /// Flags the resource as edited. The kept source bytes no longer match
    /// the payload and are dropped.
    pub fn mark_modified(&self) {
        self.original_bytes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        self.modified.store(true, Ordering::Release);
    }

    /// Clears the modified flag.
    pub fn mark_saved(&self) {
        self.modified.store(false, Ordering::Release);
    }

    /// The payload as a trait object.
    pub fn payload(&self) -> &dyn ResourceData {
        self.data.as_ref()
    }

    /// Downcasts the payload.
    pub fn data<T: ResourceData>(&self) -> Option<&T> {
        AsAny::as_any(&*self.data).downcast_ref::<T>()
    }

    /// Downcasts the payload mutably. Only possible before the resource is shared.
    pub fn data_mut<T: ResourceData>(&mut self) -> Option<&mut T> {
        AsAny::as_any_mut(&mut *self.data).downcast_mut::<T>()
    }

    /// The resources this one references.
    pub fn dependencies(&self) -> BTreeMap<String, ResourceType> {
        self.data.dependencies()
    }

    /// The best representation for saving: kept source bytes first, then the
    /// payload's own document.
    pub fn internal_data(&self) -> Option<InternalData> {
        if let Some(bytes) = self.original_bytes() {
            return Some(InternalData::Source(bytes));
        }
        self.data.to_document().map(InternalData::Document)
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("resource_type", &self.resource_type)
            .field("filename", &self.filename())
            .field("remote", &self.remote)
            .field("modified", &self.is_modified())
            .field("data", &self.data)
            .finish()
    }
}
