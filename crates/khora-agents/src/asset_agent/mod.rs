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

//! Acts as the **[A]gent** for resource loading.
//!
//! The agent owns every cache of the pipeline and is the public face of it: it
//! accepts load requests, deduplicates them, drives the lanes of
//! `khora_lanes::asset_lane` for each fetched payload, and notifies callbacks,
//! handles, observers and the event stream when loads settle.
//!
//! The primary entry point is [`ResourceAgent`], configured through
//! [`ResourceAgentBuilder`] and optionally a [`LoaderConfig`] file.

mod agent;
mod config;
mod handle;
mod inflight;

pub use self::agent::{ResourceAgent, ResourceAgentBuilder};
pub use self::config::LoaderConfig;
pub use self::handle::{LoadHandle, LoadOutcome};
pub use self::inflight::Subscriber;
