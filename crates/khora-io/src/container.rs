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

//! The packed binary container format.
//!
//! A container is a self-describing resource file:
//!
//! ```text
//! b"KPAK" | bincode(ContainerHeader) | body
//! ```
//!
//! The header names the type tag of the packed resource, the body is handed
//! untouched to the factory registered for that tag.

use bincode::config;
use khora_core::resource::ResourceType;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The four bytes every container starts with.
pub const CONTAINER_MAGIC: &[u8; 4] = b"KPAK";

/// The container layout written by [`encode`].
pub const CONTAINER_VERSION: u32 = 1;

/// The header following the magic bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerHeader {
    /// The type tag of the packed resource.
    pub object_type: ResourceType,
    /// The container layout version.
    pub version: u32,
}

/// Errors raised while reading or writing a container.
#[derive(Debug, Error)]
pub enum ContainerError {
    /// The bytes do not start with [`CONTAINER_MAGIC`].
    #[error("missing container magic")]
    MissingMagic,
    /// The header could not be decoded.
    #[error("malformed container header: {0}")]
    Header(#[from] bincode::error::DecodeError),
    /// The header could not be encoded.
    #[error("failed to encode container header: {0}")]
    Encode(#[from] bincode::error::EncodeError),
    /// The container was written by a newer layout.
    #[error("unsupported container version {0}")]
    UnsupportedVersion(u32),
}

/// Returns `true` if `bytes` look like a packed container.
pub fn is_container(bytes: &[u8]) -> bool {
    bytes.starts_with(CONTAINER_MAGIC)
}

/// Packs `body` as a resource of type `object_type`.
pub fn encode(object_type: &ResourceType, body: &[u8]) -> Result<Vec<u8>, ContainerError> {
    let header = ContainerHeader {
        object_type: object_type.clone(),
        version: CONTAINER_VERSION,
    };
    let encoded = bincode::serde::encode_to_vec(&header, config::standard())?;

    let mut bytes = Vec::with_capacity(CONTAINER_MAGIC.len() + encoded.len() + body.len());
    bytes.extend_from_slice(CONTAINER_MAGIC);
    bytes.extend_from_slice(&encoded);
    bytes.extend_from_slice(body);
    Ok(bytes)
}

/// Splits a container into its header and body.
pub fn decode(bytes: &[u8]) -> Result<(ContainerHeader, &[u8]), ContainerError> {
    let rest = bytes
        .strip_prefix(CONTAINER_MAGIC.as_slice())
        .ok_or(ContainerError::MissingMagic)?;
    let (header, read): (ContainerHeader, usize) =
        bincode::serde::decode_from_slice(rest, config::standard())?;
    if header.version > CONTAINER_VERSION {
        return Err(ContainerError::UnsupportedVersion(header.version));
    }
    Ok((header, &rest[read..]))
}
