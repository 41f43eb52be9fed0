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

//! # Khora Core
//!
//! Foundational crate containing the traits, core types, and interface contracts
//! shared by every layer of the resource pipeline.
//!
//! Nothing in here knows how a resource is fetched, decoded, or cached. It only
//! defines the vocabulary: what a [`resource::Resource`] is, how a request path
//! becomes a canonical [`resource::ResourcePath`], which errors a load can end
//! with, and the plugin seams (transport, observers, GPU upload) that other
//! crates implement.

#![warn(missing_docs)]

pub mod asset;
pub mod error;
pub mod event;
pub mod fetch;
pub mod gpu;
pub mod observer;
pub mod resource;

pub use error::{DecodeError, LoadError, LoadErrorKind, TransportError};
pub use resource::{
    AsAny, LoadOptions, Payload, PayloadShape, Resource, ResourceData, ResourcePath, ResourceRef,
    ResourceType,
};
