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

//! The default transport: reads resolved addresses from the local filesystem.

use async_trait::async_trait;
use khora_core::error::TransportError;
use khora_core::fetch::Fetcher;
use khora_core::resource::{Payload, PayloadShape};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Reads addresses as filesystem paths.
///
/// Addresses produced by the resolver already carry the base path, so by
/// default they are read as they are. An optional root is joined in front of
/// relative addresses. Query suffixes are ignored and remote schemes are
/// reported as not found.
#[derive(Debug, Clone, Default)]
pub struct FileSystemFetcher {
    root: Option<PathBuf>,
}

impl FileSystemFetcher {
    /// Creates a fetcher reading addresses relative to the working directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a fetcher reading relative addresses below `root`.
    pub fn with_root(root: impl AsRef<Path>) -> Self {
        Self {
            root: Some(root.as_ref().to_path_buf()),
        }
    }

    fn file_path(&self, address: &str) -> Result<PathBuf, TransportError> {
        let path = match address.split_once('?') {
            Some((path, _)) => path,
            None => address,
        };
        if path.contains("://") || path.starts_with(':') || path.starts_with("blob:") {
            return Err(TransportError::NotFound(address.to_string()));
        }
        Ok(match &self.root {
            Some(root) => root.join(path),
            None => PathBuf::from(path),
        })
    }
}

#[async_trait]
impl Fetcher for FileSystemFetcher {
    async fn fetch(&self, address: &str, shape: PayloadShape) -> Result<Payload, TransportError> {
        let path = self.file_path(address)?;
        let bytes = tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => TransportError::NotFound(address.to_string()),
            _ => TransportError::Io {
                address: address.to_string(),
                message: e.to_string(),
            },
        })?;
        log::trace!("Read {} bytes from {:?}", bytes.len(), path);
        shape_payload(address, bytes, shape)
    }
}

/// Converts raw bytes into the requested payload shape.
///
/// Bytes that do not parse as a structured document are handed over as
/// [`Payload::Binary`], which is how packed containers reach the loader.
/// Text that is not valid UTF-8 is a transport error.
pub fn shape_payload(
    address: &str,
    bytes: Vec<u8>,
    shape: PayloadShape,
) -> Result<Payload, TransportError> {
    match shape {
        PayloadShape::Binary => Ok(Payload::Binary(bytes)),
        PayloadShape::Text => String::from_utf8(bytes)
            .map(Payload::Text)
            .map_err(|_| TransportError::Shape {
                address: address.to_string(),
                expected: PayloadShape::Text,
            }),
        PayloadShape::Structured => match serde_json::from_slice(&bytes) {
            Ok(document) => Ok(Payload::Structured(document)),
            Err(_) => Ok(Payload::Binary(bytes)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[tokio::test]
    async fn reads_files_in_every_shape() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("doc.json"), br#"{ "object_type": "Mesh" }"#).unwrap();
        fs::write(dir.path().join("cube.obj"), "v 0 0 0\n").unwrap();
        let fetcher = FileSystemFetcher::with_root(dir.path());

        let document = fetcher
            .fetch("doc.json", PayloadShape::Structured)
            .await
            .unwrap();
        assert_eq!(
            document,
            Payload::Structured(serde_json::json!({ "object_type": "Mesh" }))
        );

        let text = fetcher.fetch("cube.obj", PayloadShape::Text).await.unwrap();
        assert_eq!(text, Payload::Text("v 0 0 0\n".to_string()));

        let bytes = fetcher
            .fetch("cube.obj?nocache=1.0", PayloadShape::Binary)
            .await
            .unwrap();
        assert_eq!(bytes, Payload::Binary(b"v 0 0 0\n".to_vec()));
    }

    #[tokio::test]
    async fn missing_files_are_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = FileSystemFetcher::with_root(dir.path());
        let error = fetcher
            .fetch("missing.png", PayloadShape::Binary)
            .await
            .unwrap_err();
        assert_eq!(error, TransportError::NotFound("missing.png".to_string()));
    }

    #[tokio::test]
    async fn remote_addresses_are_not_served() {
        let fetcher = FileSystemFetcher::new();
        let error = fetcher
            .fetch("https://cdn.example/a.png", PayloadShape::Binary)
            .await
            .unwrap_err();
        assert!(matches!(error, TransportError::NotFound(_)));
    }

    #[test]
    fn structured_falls_back_to_binary() {
        let payload = shape_payload("a.bin", vec![0, 159, 146, 150], PayloadShape::Structured);
        assert_eq!(payload.unwrap(), Payload::Binary(vec![0, 159, 146, 150]));
    }

    #[test]
    fn invalid_text_is_a_shape_error() {
        let error = shape_payload("a.obj", vec![0xff, 0xfe], PayloadShape::Text).unwrap_err();
        assert!(matches!(
            error,
            TransportError::Shape {
                expected: PayloadShape::Text,
                ..
            }
        ));
    }
}
