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

//! Error types of the resource pipeline.
//!
//! [`LoadError`] is what a subscriber or a load handle ends up observing. The
//! narrower [`TransportError`] and [`DecodeError`] are returned by plugins
//! (transports, pre-processors, finalizers, factories) and are mapped to a
//! `LoadError` by the loader.

use crate::resource::PayloadShape;
use thiserror::Error;

/// The terminal failure of a load attempt.
///
/// Cloneable so the same failure can be handed to every caller waiting on a path.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoadError {
    /// The transport could not deliver the payload.
    #[error("failed to fetch '{path}': {message}")]
    Transport {
        /// The canonical path of the failed load.
        path: String,
        /// The transport's description of the failure.
        message: String,
    },
    /// No pre-processor for the extension, or an unrecognized type tag.
    #[error("unknown format for '{path}': {detail}")]
    UnknownFormat {
        /// The canonical path of the failed load.
        path: String,
        /// What was not recognized.
        detail: String,
    },
    /// A pre-processor or finalizer rejected the payload.
    #[error("failed to decode '{path}': {message}")]
    Parse {
        /// The canonical path of the failed load.
        path: String,
        /// The decoder's description of the failure.
        message: String,
    },
    /// The path already resolves to a different resource.
    #[error("'{path}' is already bound to another resource")]
    DuplicateRegistration {
        /// The contested canonical path.
        path: String,
    },
}

/// The kind of a [`LoadError`], convenient for matching in tests and callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadErrorKind {
    /// See [`LoadError::Transport`].
    Transport,
    /// See [`LoadError::UnknownFormat`].
    UnknownFormat,
    /// See [`LoadError::Parse`].
    Parse,
    /// See [`LoadError::DuplicateRegistration`].
    DuplicateRegistration,
}

impl LoadError {
    /// The kind of this error.
    pub fn kind(&self) -> LoadErrorKind {
        match self {
            LoadError::Transport { .. } => LoadErrorKind::Transport,
            LoadError::UnknownFormat { .. } => LoadErrorKind::UnknownFormat,
            LoadError::Parse { .. } => LoadErrorKind::Parse,
            LoadError::DuplicateRegistration { .. } => LoadErrorKind::DuplicateRegistration,
        }
    }

    /// The canonical path the error refers to.
    pub fn path(&self) -> &str {
        match self {
            LoadError::Transport { path, .. }
            | LoadError::UnknownFormat { path, .. }
            | LoadError::Parse { path, .. }
            | LoadError::DuplicateRegistration { path } => path,
        }
    }

    /// Whether the path should be remembered as failed.
    pub fn is_memoized(&self) -> bool {
        !matches!(self, LoadError::DuplicateRegistration { .. })
    }

    /// Maps a plugin decode error to the load error of `path`.
    pub fn from_decode(path: impl Into<String>, error: DecodeError) -> Self {
        let path = path.into();
        match error {
            DecodeError::UnknownFormat(detail) => LoadError::UnknownFormat { path, detail },
            other => LoadError::Parse {
                path,
                message: other.to_string(),
            },
        }
    }

    /// Maps a transport error to the load error of `path`.
    pub fn from_transport(path: impl Into<String>, error: TransportError) -> Self {
        LoadError::Transport {
            path: path.into(),
            message: error.to_string(),
        }
    }
}

/// A failed fetch.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// Nothing exists at the address.
    #[error("nothing found at '{0}'")]
    NotFound(String),
    /// The read itself failed.
    #[error("i/o error while reading '{address}': {message}")]
    Io {
        /// The address that was read.
        address: String,
        /// The underlying error.
        message: String,
    },
    /// The bytes could not be delivered in the requested shape.
    #[error("'{address}' cannot be delivered as {expected:?}")]
    Shape {
        /// The address that was read.
        address: String,
        /// The requested shape.
        expected: PayloadShape,
    },
}

/// A failure reported by a decoding plugin.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The payload is of a type nobody knows how to build.
    #[error("unknown format: {0}")]
    UnknownFormat(String),
    /// The payload is malformed.
    #[error("invalid data: {0}")]
    Invalid(String),
    /// Any other failure, usually raised through `anyhow::Context`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_errors_keep_their_kind() {
        let unknown = LoadError::from_decode("a.xyz", DecodeError::UnknownFormat("xyz".into()));
        assert_eq!(unknown.kind(), LoadErrorKind::UnknownFormat);

        let parse = LoadError::from_decode("a.obj", DecodeError::Invalid("no vertices".into()));
        assert_eq!(parse.kind(), LoadErrorKind::Parse);
        assert_eq!(parse.path(), "a.obj");
    }

    #[test]
    fn duplicate_registration_is_not_memoized() {
        let duplicate = LoadError::DuplicateRegistration {
            path: "a.png".into(),
        };
        assert!(!duplicate.is_memoized());
        assert!(LoadError::from_transport("a.png", TransportError::NotFound("a.png".into()))
            .is_memoized());
    }
}
