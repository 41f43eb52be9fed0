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

//! The resource cache: canonical path to shared resource.

use khora_core::error::LoadError;
use khora_core::resource::{ResourcePath, ResourceRef, ResourceType};
use std::collections::HashMap;

/// The central in-memory cache of loaded resources.
///
/// Every registered resource lives in the primary map under its canonical
/// path. A resource may also be indexed in one type-keyed secondary map (all
/// meshes, all textures, ...), chosen by its finalizer. Both maps hold clones
/// of the same [`ResourceRef`].
///
/// The registry also remembers which paths failed to load, so they are not
/// fetched again until the failures are cleared. A path is never both
/// registered and failed.
#[derive(Debug, Clone, Default)]
pub struct ResourceRegistry {
    resources: HashMap<ResourcePath, ResourceRef>,
    secondary: HashMap<ResourceType, HashMap<ResourcePath, ResourceRef>>,
    indexed_under: HashMap<ResourcePath, ResourceType>,
    failures: HashMap<ResourcePath, LoadError>,
}

impl ResourceRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `resource` under `path`, and in the `secondary` cache if one
    /// is given. Returns the resource previously registered under `path`.
    ///
    /// Registering a path forgets any failure recorded for it.
    pub fn insert(
        &mut self,
        path: ResourcePath,
        resource: ResourceRef,
        secondary: Option<ResourceType>,
    ) -> Option<ResourceRef> {
        self.failures.remove(&path);
        self.unindex(&path);
        if let Some(resource_type) = secondary {
            self.secondary
                .entry(resource_type.clone())
                .or_default()
                .insert(path.clone(), resource.clone());
            self.indexed_under.insert(path.clone(), resource_type);
        }
        self.resources.insert(path, resource)
    }

    /// The resource registered under `path`.
    pub fn get(&self, path: &ResourcePath) -> Option<&ResourceRef> {
        self.resources.get(path)
    }

    /// The resource registered under `path` in the secondary cache of `resource_type`.
    pub fn get_typed(
        &self,
        resource_type: &ResourceType,
        path: &ResourcePath,
    ) -> Option<&ResourceRef> {
        self.secondary.get(resource_type)?.get(path)
    }

    /// Every resource in the secondary cache of `resource_type`, sorted by path.
    pub fn resources_of(&self, resource_type: &ResourceType) -> Vec<(ResourcePath, ResourceRef)> {
        let mut resources: Vec<_> = self
            .secondary
            .get(resource_type)
            .map(|cache| {
                cache
                    .iter()
                    .map(|(path, resource)| (path.clone(), resource.clone()))
                    .collect()
            })
            .unwrap_or_default();
        resources.sort_by(|(a, _), (b, _)| a.cmp(b));
        resources
    }

    /// The secondary cache `path` is indexed under.
    pub fn secondary_type(&self, path: &ResourcePath) -> Option<&ResourceType> {
        self.indexed_under.get(path)
    }

    /// Whether a resource is registered under `path`.
    pub fn contains(&self, path: &ResourcePath) -> bool {
        self.resources.contains_key(path)
    }

    /// The number of registered resources.
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// All registered paths, sorted.
    pub fn paths(&self) -> Vec<ResourcePath> {
        let mut paths: Vec<_> = self.resources.keys().cloned().collect();
        paths.sort();
        paths
    }

    /// Removes `path` from every cache. Shared handles stay valid.
    pub fn remove(&mut self, path: &ResourcePath) -> Option<ResourceRef> {
        self.unindex(path);
        self.resources.remove(path)
    }

    /// Moves the resource registered under `old` to `new`, in the primary
    /// and the secondary cache, and updates its filename.
    ///
    /// Returns `None` if nothing is registered under `old`. A resource
    /// already registered under `new` is replaced.
    pub fn rename(&mut self, old: &ResourcePath, new: ResourcePath) -> Option<ResourceRef> {
        let resource = self.resources.get(old)?.clone();
        if *old != new {
            let secondary = self.indexed_under.get(old).cloned();
            self.remove(old);
            if let Some(replaced) = self.insert(new.clone(), resource.clone(), secondary) {
                log::warn!(
                    "Renaming '{}' to '{}' replaced {:?}",
                    old,
                    new,
                    replaced.resource_type()
                );
            }
        }
        resource.set_filename(new);
        Some(resource)
    }

    fn unindex(&mut self, path: &ResourcePath) {
        if let Some(resource_type) = self.indexed_under.remove(path) {
            if let Some(cache) = self.secondary.get_mut(&resource_type) {
                cache.remove(path);
                if cache.is_empty() {
                    self.secondary.remove(&resource_type);
                }
            }
        }
    }

    /// Remembers that `path` failed with `error`.
    pub fn mark_failed(&mut self, path: ResourcePath, error: LoadError) {
        self.failures.insert(path, error);
    }

    /// The error `path` failed with, if it did.
    pub fn failure(&self, path: &ResourcePath) -> Option<&LoadError> {
        self.failures.get(path)
    }

    /// The number of remembered failures.
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Forgets every failure. Returns how many there were.
    pub fn clear_failures(&mut self) -> usize {
        let count = self.failures.len();
        self.failures.clear();
        count
    }

    /// Drops every cached resource and failure.
    pub fn reset(&mut self) {
        self.resources.clear();
        self.secondary.clear();
        self.indexed_under.clear();
        self.failures.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use khora_core::asset::{Material, Mesh};
    use khora_core::resource::Resource;
    use std::sync::Arc;

    fn mesh() -> ResourceRef {
        Arc::new(Resource::new(ResourceType::MESH, Mesh::default()))
    }

    fn material() -> ResourceRef {
        Arc::new(Resource::new(ResourceType::MATERIAL, Material::default()))
    }

    #[test]
    fn insert_indexes_primary_and_secondary() {
        let mut registry = ResourceRegistry::new();
        let cube = mesh();
        assert!(registry
            .insert("cube.obj".into(), cube.clone(), Some(ResourceType::MESH))
            .is_none());

        let path = ResourcePath::new("cube.obj");
        assert!(Arc::ptr_eq(registry.get(&path).unwrap(), &cube));
        assert!(Arc::ptr_eq(
            registry.get_typed(&ResourceType::MESH, &path).unwrap(),
            &cube
        ));
        assert!(registry.get_typed(&ResourceType::TEXTURE, &path).is_none());
        assert_eq!(registry.secondary_type(&path), Some(&ResourceType::MESH));
    }

    #[test]
    fn resources_without_secondary_stay_primary_only() {
        let mut registry = ResourceRegistry::new();
        registry.insert("wood.json".into(), material(), None);
        assert!(registry.contains(&"wood.json".into()));
        assert!(registry.resources_of(&ResourceType::MATERIAL).is_empty());
    }

    #[test]
    fn reinserting_moves_the_secondary_index() {
        let mut registry = ResourceRegistry::new();
        registry.insert("a".into(), mesh(), Some(ResourceType::MESH));
        let previous = registry.insert("a".into(), material(), Some(ResourceType::MATERIAL));
        assert!(previous.is_some());
        assert!(registry.resources_of(&ResourceType::MESH).is_empty());
        assert_eq!(registry.resources_of(&ResourceType::MATERIAL).len(), 1);
    }

    #[test]
    fn rename_moves_every_key_and_the_filename() {
        let mut registry = ResourceRegistry::new();
        let cube = mesh();
        registry.insert("old/cube.obj".into(), cube.clone(), Some(ResourceType::MESH));

        let renamed = registry
            .rename(&"old/cube.obj".into(), "new/cube.obj".into())
            .unwrap();
        assert!(Arc::ptr_eq(&renamed, &cube));
        assert_eq!(cube.filename().as_str(), "new/cube.obj");

        assert!(!registry.contains(&"old/cube.obj".into()));
        assert!(registry.contains(&"new/cube.obj".into()));
        let meshes = registry.resources_of(&ResourceType::MESH);
        assert_eq!(meshes.len(), 1);
        assert_eq!(meshes[0].0.as_str(), "new/cube.obj");
    }

    #[test]
    fn rename_of_unknown_path_is_refused() {
        let mut registry = ResourceRegistry::new();
        assert!(registry.rename(&"ghost".into(), "other".into()).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn failures_are_cleared_by_registration() {
        let mut registry = ResourceRegistry::new();
        let error = LoadError::Transport {
            path: "a.png".into(),
            message: "offline".into(),
        };
        registry.mark_failed("a.png".into(), error.clone());
        assert_eq!(registry.failure(&"a.png".into()), Some(&error));

        registry.insert("a.png".into(), mesh(), None);
        assert!(registry.failure(&"a.png".into()).is_none());
    }

    #[test]
    fn reset_drops_everything() {
        let mut registry = ResourceRegistry::new();
        let cube = mesh();
        registry.insert("cube.obj".into(), cube.clone(), Some(ResourceType::MESH));
        registry.mark_failed(
            "b.png".into(),
            LoadError::Parse {
                path: "b.png".into(),
                message: "bad".into(),
            },
        );
        registry.reset();
        assert!(registry.is_empty());
        assert_eq!(registry.failure_count(), 0);
        assert!(registry.resources_of(&ResourceType::MESH).is_empty());
        assert_eq!(Arc::strong_count(&cube), 1);
    }

    #[test]
    fn clear_failures_reports_the_count() {
        let mut registry = ResourceRegistry::new();
        for path in ["a", "b"] {
            registry.mark_failed(
                path.into(),
                LoadError::UnknownFormat {
                    path: path.into(),
                    detail: "?".into(),
                },
            );
        }
        assert_eq!(registry.clear_failures(), 2);
        assert_eq!(registry.failure_count(), 0);
    }
}
