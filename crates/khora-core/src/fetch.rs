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

//! The transport boundary of the loader.

use crate::error::TransportError;
use crate::resource::{Payload, PayloadShape};
use async_trait::async_trait;

/// Performs the actual byte fetch for a resolved address.
///
/// A fetch is a single attempt: implementations must not retry on their own.
/// Adding a timeout is fine, as long as it surfaces as a [`TransportError`].
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches `address`, delivering the payload in the requested `shape` when possible.
    async fn fetch(&self, address: &str, shape: PayloadShape) -> Result<Payload, TransportError>;
}
