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

//! The GPU upload capability used by finalizers.
//!
//! The loader does not know how textures or meshes end up on the GPU. A
//! renderer hands an implementation of [`GpuUploader`] to the finalizers, which
//! call it once a resource is decoded.

use crate::asset::{Mesh, Texture};
use crate::resource::ResourcePath;

/// An opaque handle to an uploaded GPU object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GpuHandle(pub u64);

/// Uploads decoded resources to the GPU.
pub trait GpuUploader: Send + Sync {
    /// Creates a GPU texture from decoded pixels.
    fn upload_texture(&self, path: &ResourcePath, texture: &Texture) -> anyhow::Result<GpuHandle>;

    /// Creates GPU buffers for a mesh.
    fn upload_mesh(&self, path: &ResourcePath, mesh: &Mesh) -> anyhow::Result<GpuHandle>;
}
