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

//! Canonical resource paths.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A normalized resource path, used as the cache key for a resource.
///
/// Normalization collapses repeated `/` separators and drops leading and
/// trailing ones. `.` and `..` segments are kept as written. A `scheme://`
/// prefix is preserved and only the remainder is collapsed.
///
/// A query suffix (`?v=2`) is not part of the key: it is kept aside and only
/// reappears in [`ResourcePath::fetch_path`]. Equality, ordering and hashing
/// only look at the key, so `a//b.png?v=1` and `a/b.png` are the same entry.
#[derive(Clone, Default)]
pub struct ResourcePath {
    key: String,
    query: Option<String>,
}

impl ResourcePath {
    /// Normalizes `raw` into a canonical path.
    pub fn new(raw: &str) -> Self {
        let (body, query) = match raw.split_once('?') {
            Some((body, query)) if !query.is_empty() => (body, Some(query.to_string())),
            Some((body, _)) => (body, None),
            None => (raw, None),
        };

        let key = match body.find("://") {
            Some(pos) => {
                let (scheme, rest) = body.split_at(pos + 3);
                format!("{scheme}{}", collapse_separators(rest))
            }
            None => collapse_separators(body),
        };

        Self { key, query }
    }

    /// The canonical cache key.
    pub fn as_str(&self) -> &str {
        &self.key
    }

    /// The query suffix that was stripped from the key, if any.
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// The path that should be handed to the resolver: the key with its query restored.
    pub fn fetch_path(&self) -> String {
        match &self.query {
            Some(query) => format!("{}?{}", self.key, query),
            None => self.key.clone(),
        }
    }

    /// Returns `true` for the empty path.
    pub fn is_empty(&self) -> bool {
        self.key.is_empty()
    }

    /// The scheme or virtual file system token in front of the first `:`.
    ///
    /// `http://host/a.png` yields `http`, `assets:hero.png` yields `assets`.
    /// A path whose first `:` comes after a `/` has no scheme.
    pub fn scheme(&self) -> Option<&str> {
        let pos = self.key.find(':')?;
        let scheme = &self.key[..pos];
        if scheme.is_empty() || scheme.contains('/') {
            return None;
        }
        Some(scheme)
    }

    /// The last path segment.
    pub fn filename(&self) -> &str {
        match self.key.rfind('/') {
            Some(pos) => &self.key[pos + 1..],
            None => &self.key,
        }
    }

    /// Everything in front of the last path segment, without the trailing separator.
    pub fn folder(&self) -> &str {
        match self.key.rfind('/') {
            Some(pos) => &self.key[..pos],
            None => "",
        }
    }

    /// The filename up to its first `.`.
    pub fn basename(&self) -> &str {
        let filename = self.filename();
        match filename.find('.') {
            Some(pos) => &filename[..pos],
            None => filename,
        }
    }

    /// The lower-cased extension of the filename, if it has one.
    pub fn extension(&self) -> Option<String> {
        let filename = self.filename();
        let pos = filename.rfind('.')?;
        let extension = &filename[pos + 1..];
        if extension.is_empty() {
            None
        } else {
            Some(extension.to_ascii_lowercase())
        }
    }
}

fn collapse_separators(path: &str) -> String {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

impl PartialEq for ResourcePath {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for ResourcePath {}

impl Hash for ResourcePath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl PartialOrd for ResourcePath {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ResourcePath {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

impl fmt::Debug for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResourcePath({:?})", self.key)
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

impl From<&str> for ResourcePath {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ResourcePath {
    fn from(value: String) -> Self {
        Self::new(&value)
    }
}

impl From<&String> for ResourcePath {
    fn from(value: &String) -> Self {
        Self::new(value)
    }
}

impl From<&ResourcePath> for ResourcePath {
    fn from(value: &ResourcePath) -> Self {
        value.clone()
    }
}
