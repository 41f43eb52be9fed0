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

//! The pre-processor slot: raw payload in, typed resource out.

use khora_core::error::DecodeError;
use khora_core::resource::{LoadOptions, Payload, Resource, ResourcePath};
use std::fmt;
use std::future::Future;
use std::pin::Pin;

/// A decode that finishes later, e.g. on a blocking worker thread.
pub type DecodeFuture = Pin<Box<dyn Future<Output = Result<Resource, DecodeError>> + Send>>;

/// The outcome of a pre-processor.
pub enum Decoded {
    /// The resource is ready.
    Ready(Resource),
    /// The resource will be produced by the future. The loader awaits it
    /// without holding up other loads.
    Deferred(DecodeFuture),
}

impl Decoded {
    /// Wraps a future as a deferred decode.
    pub fn deferred<F>(future: F) -> Self
    where
        F: Future<Output = Result<Resource, DecodeError>> + Send + 'static,
    {
        Decoded::Deferred(Box::pin(future))
    }

    /// Waits for the resource, whichever way it is produced.
    pub async fn resolve(self) -> Result<Resource, DecodeError> {
        match self {
            Decoded::Ready(resource) => Ok(resource),
            Decoded::Deferred(future) => future.await,
        }
    }
}

impl fmt::Debug for Decoded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decoded::Ready(resource) => f.debug_tuple("Ready").field(resource).finish(),
            Decoded::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

/// Turns a fetched payload into a typed resource.
///
/// This is the CPU-heavy part of loading. Implementations that would block
/// for long should return [`Decoded::Deferred`] and do the work on a
/// blocking thread.
pub trait PreProcessor: Send + Sync {
    /// Decodes `payload`, fetched for `path` with the given `options`.
    fn process(
        &self,
        path: &ResourcePath,
        payload: Payload,
        options: &LoadOptions,
    ) -> Result<Decoded, DecodeError>;
}

impl<F> PreProcessor for F
where
    F: Fn(&ResourcePath, Payload, &LoadOptions) -> Result<Decoded, DecodeError> + Send + Sync,
{
    fn process(
        &self,
        path: &ResourcePath,
        payload: Payload,
        options: &LoadOptions,
    ) -> Result<Decoded, DecodeError> {
        self(path, payload, options)
    }
}

/// Pins down the signature of a closure used as a [`PreProcessor`].
///
/// ```
/// use khora_core::asset::RawData;
/// use khora_core::resource::{Resource, ResourceType};
/// use khora_lanes::asset_lane::{pre_processor, Decoded};
///
/// let shaders = pre_processor(|_path, payload, _options| {
///     Ok(Decoded::Ready(Resource::new(ResourceType::new("Shader"), RawData(payload))))
/// });
/// # let _ = shaders;
/// ```
pub fn pre_processor<F>(f: F) -> F
where
    F: Fn(&ResourcePath, Payload, &LoadOptions) -> Result<Decoded, DecodeError> + Send + Sync,
{
    f
}
