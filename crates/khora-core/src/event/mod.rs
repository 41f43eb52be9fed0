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

//! Provides the event stream of the resource pipeline.
//!
//! The [`EventHub`] is a generic fan-out channel: every subscriber gets its own
//! receiver and sees every event published after it subscribed. [`ResourceEvent`]
//! is the event type published by the loader.

mod hub;

pub use self::hub::EventHub;

/// Something that happened to the resource cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceEvent {
    /// The outstanding count left zero: a batch of loads begins.
    LoadingStarted,
    /// A fetch was issued for a path.
    Loading(String),
    /// A path finished loading and is registered.
    Loaded(String),
    /// A load failed.
    LoadFailed {
        /// The canonical path.
        path: String,
        /// The failure, as displayed text.
        reason: String,
    },
    /// The outstanding count returned to zero. `success` is false when the
    /// last load to settle failed.
    AllSettled {
        /// Outcome of the last settled load.
        success: bool,
    },
    /// A resource was stored in the cache.
    Registered(String),
    /// A resource was removed from the cache.
    Unregistered(String),
    /// A resource changed its path.
    Renamed {
        /// The previous path.
        old: String,
        /// The new path.
        new: String,
    },
    /// A resource was flagged as edited.
    Modified(String),
    /// A resource was flagged as saved.
    Saved(String),
}
