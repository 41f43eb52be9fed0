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

//! # Khora I/O
//!
//! Everything between a canonical resource path and the bytes behind it:
//!
//! - [`resolver::PathResolver`] expands a path into a fetchable address
//!   (virtual file systems, proxy, base path, cache busting).
//! - [`fetcher::FileSystemFetcher`] is the default transport.
//! - [`container`] reads and writes the packed binary container format.

#![warn(missing_docs)]

pub mod container;
pub mod fetcher;
pub mod resolver;

pub use container::{ContainerError, ContainerHeader, CONTAINER_MAGIC};
pub use fetcher::FileSystemFetcher;
pub use resolver::PathResolver;
