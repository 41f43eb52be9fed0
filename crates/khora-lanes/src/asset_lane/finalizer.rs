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

//! The post-processor slot: type-specific setup after decoding.

use khora_core::asset::{Material, Mesh, Texture, TextureMetadata};
use khora_core::error::DecodeError;
use khora_core::gpu::GpuUploader;
use khora_core::resource::{Resource, ResourceData, ResourcePath, ResourceType};
use std::collections::HashMap;
use std::sync::Arc;

/// What a finalizer may rely on besides the resource itself.
#[derive(Clone, Default)]
pub struct FinalizeContext {
    /// Drop CPU-side buffers once they are uploaded.
    pub free_data: bool,
    /// The GPU upload capability, when a renderer is attached.
    pub uploader: Option<Arc<dyn GpuUploader>>,
}

/// Prepares a decoded resource for use and picks its secondary cache.
pub trait Finalizer: Send + Sync {
    /// Finishes `resource`, loaded from `path`. Returns the type of the
    /// secondary cache the resource is indexed under, if any.
    fn finalize(
        &self,
        path: &ResourcePath,
        resource: &mut Resource,
        ctx: &FinalizeContext,
    ) -> Result<Option<ResourceType>, DecodeError>;
}

impl<F> Finalizer for F
where
    F: Fn(&ResourcePath, &mut Resource, &FinalizeContext) -> Result<Option<ResourceType>, DecodeError>
        + Send
        + Sync,
{
    fn finalize(
        &self,
        path: &ResourcePath,
        resource: &mut Resource,
        ctx: &FinalizeContext,
    ) -> Result<Option<ResourceType>, DecodeError> {
        self(path, resource, ctx)
    }
}

/// Pins down the signature of a closure used as a [`Finalizer`].
pub fn finalizer<F>(f: F) -> F
where
    F: Fn(&ResourcePath, &mut Resource, &FinalizeContext) -> Result<Option<ResourceType>, DecodeError>
        + Send
        + Sync,
{
    f
}

/// Resource type to finalizer table.
#[derive(Clone, Default)]
pub struct PostProcessorRegistry {
    finalizers: HashMap<ResourceType, Arc<dyn Finalizer>>,
}

impl PostProcessorRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with the mesh, texture and material finalizers.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(ResourceType::MESH, MeshFinalizer);
        registry.register(ResourceType::TEXTURE, TextureFinalizer);
        registry.register(ResourceType::MATERIAL, MaterialFinalizer);
        registry
    }

    /// Registers the finalizer for `resource_type`, replacing any previous one.
    pub fn register(&mut self, resource_type: ResourceType, finalizer: impl Finalizer + 'static) {
        self.finalizers.insert(resource_type, Arc::new(finalizer));
    }

    /// Adds every finalizer of `other`, replacing finalizers for the same types.
    pub fn extend(&mut self, other: PostProcessorRegistry) {
        self.finalizers.extend(other.finalizers);
    }

    /// The finalizer for `resource_type`.
    pub fn lookup(&self, resource_type: &ResourceType) -> Option<&Arc<dyn Finalizer>> {
        self.finalizers.get(resource_type)
    }
}

fn payload_mut<'a, T: ResourceData>(
    resource: &'a mut Resource,
    expected: &ResourceType,
) -> Result<&'a mut T, DecodeError> {
    resource.data_mut::<T>().ok_or_else(|| {
        DecodeError::Invalid(format!(
            "resource tagged {expected} does not hold a {expected} payload"
        ))
    })
}

/// Repairs bounding boxes, generates missing normals and uploads meshes.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeshFinalizer;

impl Finalizer for MeshFinalizer {
    fn finalize(
        &self,
        path: &ResourcePath,
        resource: &mut Resource,
        ctx: &FinalizeContext,
    ) -> Result<Option<ResourceType>, DecodeError> {
        let mesh = payload_mut::<Mesh>(resource, &ResourceType::MESH)?;

        if !mesh.has_valid_bounding_box() {
            if mesh.bounding_box.is_some() {
                log::warn!("Discarding malformed bounding box of '{}'", path);
            }
            mesh.compute_bounding_box();
        }

        let normals_match = mesh
            .normals
            .as_ref()
            .is_some_and(|normals| normals.len() == mesh.positions.len());
        if !normals_match {
            mesh.compute_normals();
        }

        if let Some(uploader) = &ctx.uploader {
            let handle = uploader.upload_mesh(path, mesh)?;
            mesh.gpu = Some(handle);
            if ctx.free_data {
                mesh.free_data();
            }
        }

        Ok(Some(ResourceType::MESH))
    }
}

/// Generates texture metadata and uploads textures.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextureFinalizer;

impl Finalizer for TextureFinalizer {
    fn finalize(
        &self,
        path: &ResourcePath,
        resource: &mut Resource,
        ctx: &FinalizeContext,
    ) -> Result<Option<ResourceType>, DecodeError> {
        let texture = payload_mut::<Texture>(resource, &ResourceType::TEXTURE)?;
        if !texture.is_consistent() {
            return Err(DecodeError::Invalid(format!(
                "{}x{} texture does not match its pixel buffer",
                texture.width, texture.height
            )));
        }

        texture.metadata = Some(TextureMetadata {
            width: texture.width,
            height: texture.height,
        });

        if let Some(uploader) = &ctx.uploader {
            let handle = uploader.upload_texture(path, texture)?;
            texture.gpu = Some(handle);
            if ctx.free_data {
                texture.free_data();
            }
        }

        Ok(Some(ResourceType::TEXTURE))
    }
}

/// Clamps material factors into their valid range.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaterialFinalizer;

impl Finalizer for MaterialFinalizer {
    fn finalize(
        &self,
        _path: &ResourcePath,
        resource: &mut Resource,
        _ctx: &FinalizeContext,
    ) -> Result<Option<ResourceType>, DecodeError> {
        let material = payload_mut::<Material>(resource, &ResourceType::MATERIAL)?;
        material.metallic = material.metallic.clamp(0.0, 1.0);
        material.roughness = material.roughness.clamp(0.0, 1.0);
        material.alpha_cutoff = material.alpha_cutoff.clamp(0.0, 1.0);
        Ok(Some(ResourceType::MATERIAL))
    }
}
