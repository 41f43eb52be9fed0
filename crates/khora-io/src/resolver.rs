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

//! Expands canonical resource paths into fetchable addresses.

use khora_core::resource::{LoadOptions, ResourcePath};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Base path used when none is configured.
pub const DEFAULT_BASE_PATH: &str = ".";

/// Turns request paths into addresses the transport understands.
///
/// The resolver is stateless with respect to loads: addresses are recomputed
/// on every call, so changing the base path or the proxy affects every later
/// fetch.
///
/// | path                | address                               |
/// |---------------------|---------------------------------------|
/// | `http(s)://host/x`  | unchanged, or `proxy + host/x`        |
/// | `blob:...`, `:name` | unchanged                             |
/// | `alias://x`         | alias root + `/x` (virtual file system) |
/// | `other://x`         | active base path + `/x`               |
/// | `x`                 | active base path + `/x`               |
#[derive(Debug)]
pub struct PathResolver {
    base_path: String,
    proxy: Option<String>,
    file_systems: HashMap<String, String>,
    ignore_cache: bool,
    nocache_sequence: AtomicU64,
}

impl Default for PathResolver {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_PATH)
    }
}

impl PathResolver {
    /// Creates a resolver fetching relative paths from `base_path`.
    pub fn new(base_path: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
            proxy: None,
            file_systems: HashMap::new(),
            ignore_cache: false,
            nocache_sequence: AtomicU64::new(0),
        }
    }

    /// The root relative paths are fetched from.
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Changes the root relative paths are fetched from.
    pub fn set_base_path(&mut self, base_path: impl Into<String>) {
        self.base_path = base_path.into();
        log::debug!("Resource base path set to '{}'", self.base_path);
    }

    /// The proxy prefix used for `http`/`https` addresses.
    pub fn proxy(&self) -> Option<&str> {
        self.proxy.as_deref()
    }

    /// Routes `http`/`https` fetches through `proxy`, or stops doing so with `None`.
    pub fn set_proxy(&mut self, proxy: Option<String>) {
        self.proxy = proxy;
    }

    /// Maps `alias://rest` to `root/rest`.
    pub fn register_file_system(&mut self, alias: impl Into<String>, root: impl Into<String>) {
        let alias = alias.into();
        let root = root.into();
        log::debug!("Virtual file system '{}' mapped to '{}'", alias, root);
        self.file_systems.insert(alias, root);
    }

    /// The root registered for a virtual file system alias.
    pub fn file_system(&self, alias: &str) -> Option<&str> {
        self.file_systems.get(alias).map(String::as_str)
    }

    /// Whether a cache-busting parameter is appended to every address.
    pub fn ignore_cache(&self) -> bool {
        self.ignore_cache
    }

    /// Enables or disables cache busting.
    pub fn set_ignore_cache(&mut self, ignore_cache: bool) {
        self.ignore_cache = ignore_cache;
    }

    /// Computes the address to fetch `path` from.
    pub fn resolve(&self, path: &ResourcePath, options: &LoadOptions) -> String {
        let address = self.expand(&path.fetch_path(), options);
        if self.ignore_cache {
            self.with_nocache(address)
        } else {
            address
        }
    }

    fn expand(&self, url: &str, options: &LoadOptions) -> String {
        if url.starts_with(':') {
            return url.to_string();
        }

        let base_path = self.active_base_path(options);
        let Some((scheme, rest)) = split_scheme(url) else {
            return join(base_path, url);
        };

        match scheme {
            "http" | "https" => match &self.proxy {
                Some(proxy) => format!("{proxy}{rest}"),
                None => url.to_string(),
            },
            "blob" => url.to_string(),
            alias => match self.file_systems.get(alias) {
                Some(root) => join(root, rest),
                None => join(base_path, rest),
            },
        }
    }

    fn active_base_path<'a>(&'a self, options: &'a LoadOptions) -> &'a str {
        if let Some(base_path) = &options.base_path {
            base_path
        } else if options.force_local {
            DEFAULT_BASE_PATH
        } else {
            &self.base_path
        }
    }

    fn with_nocache(&self, address: String) -> String {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis())
            .unwrap_or_default();
        let sequence = self.nocache_sequence.fetch_add(1, Ordering::Relaxed);
        let separator = if address.contains('?') { '&' } else { '?' };
        format!("{address}{separator}nocache={millis}.{sequence}")
    }
}

/// Splits `scheme://rest` or `scheme:rest`.
fn split_scheme(url: &str) -> Option<(&str, &str)> {
    if let Some(pos) = url.find("://") {
        let scheme = &url[..pos];
        if is_scheme(scheme) {
            return Some((scheme, &url[pos + 3..]));
        }
    }
    let (scheme, rest) = url.split_once(':')?;
    is_scheme(scheme).then_some((scheme, rest))
}

fn is_scheme(token: &str) -> bool {
    !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.' | '_'))
}

fn join(root: &str, rest: &str) -> String {
    let rest = rest.trim_start_matches('/');
    if root.is_empty() {
        return rest.to_string();
    }
    format!("{}/{}", root.trim_end_matches('/'), rest)
}
