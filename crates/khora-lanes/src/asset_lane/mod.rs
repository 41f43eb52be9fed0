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

//! Asset lanes: the data plane of resource loading.
//!
//! The registries in here are filled once, when a loader is built, and then
//! only read:
//!
//! - [`FormatRegistry`]: file extension to payload shape and [`PreProcessor`].
//! - [`TypeFactoryRegistry`]: type tag to [`ResourceFactory`], for payloads
//!   that describe their own type.
//! - [`PostProcessorRegistry`]: resource type to [`Finalizer`].

mod factory;
mod finalizer;
mod format;
mod loader;
pub mod loading;

pub use factory::*;
pub use finalizer::*;
pub use format::*;
pub use loader::*;
