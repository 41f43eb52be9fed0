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

//! Raw payloads handed over by the transport layer.

use serde_json::Value;

/// The shape a fetch is expected to produce for a given format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadShape {
    /// UTF-8 text (OBJ, shaders, ...).
    Text,
    /// A structured document. Transports fall back to [`Payload::Binary`]
    /// when the bytes are not a valid document, e.g. for packed containers.
    Structured,
    /// Raw bytes (images, packed containers, ...).
    Binary,
}

/// The raw data returned by a fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// UTF-8 text.
    Text(String),
    /// A parsed structured document.
    Structured(Value),
    /// Raw bytes.
    Binary(Vec<u8>),
}

impl Payload {
    /// The shape of this payload.
    pub fn shape(&self) -> PayloadShape {
        match self {
            Payload::Text(_) => PayloadShape::Text,
            Payload::Structured(_) => PayloadShape::Structured,
            Payload::Binary(_) => PayloadShape::Binary,
        }
    }

    /// The bytes worth keeping as the resource's source, if this payload
    /// still is in its original file form.
    pub fn source_bytes(&self) -> Option<Vec<u8>> {
        match self {
            Payload::Text(text) => Some(text.as_bytes().to_vec()),
            Payload::Binary(bytes) => Some(bytes.clone()),
            Payload::Structured(_) => None,
        }
    }

    /// Converts the payload into bytes, serializing structured documents.
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Payload::Text(text) => text.into_bytes(),
            Payload::Binary(bytes) => bytes,
            Payload::Structured(value) => value.to_string().into_bytes(),
        }
    }

    /// Byte length of the payload as it came off the wire.
    pub fn len(&self) -> usize {
        match self {
            Payload::Text(text) => text.len(),
            Payload::Binary(bytes) => bytes.len(),
            Payload::Structured(value) => value.to_string().len(),
        }
    }

    /// Returns `true` when the payload carries no data.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
