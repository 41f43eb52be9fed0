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

//! Interfaces for consumers that hold references to cached resources.

use crate::resource::{ResourcePath, ResourceRef};

/// A consumer that refers to resources by path and must follow cache changes.
///
/// The scene layer registers its nodes, components and materials (or a single
/// visitor walking them) with the loader at startup.
pub trait ResourceObserver: Send + Sync {
    /// Called once per rename of a registered resource.
    fn on_resource_renamed(&self, old: &ResourcePath, new: &ResourcePath, resource: &ResourceRef);

    /// Called when a resource is evicted. The instance stays valid for
    /// whoever still holds it, only path lookups will miss.
    fn on_resource_unregistered(&self, _path: &ResourcePath, _resource: &ResourceRef) {}
}
