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

use std::sync::{Mutex, PoisonError};

/// A thread-safe, multi-subscriber event channel.
///
/// Each call to [`EventHub::subscribe`] creates an unbounded `flume` channel.
/// Publishing clones the event into every live channel. Channels whose
/// receiver was dropped are pruned on the next publish.
#[derive(Debug)]
pub struct EventHub<T: Clone + Send + 'static> {
    subscribers: Mutex<Vec<flume::Sender<T>>>,
}

impl<T: Clone + Send + 'static> EventHub<T> {
    /// Creates a hub without subscribers.
    pub fn new() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Opens a new receiver that sees every event published from now on.
    pub fn subscribe(&self) -> flume::Receiver<T> {
        let (sender, receiver) = flume::unbounded();
        self.lock().push(sender);
        receiver
    }

    /// Sends `event` to every live subscriber.
    pub fn publish(&self, event: T) {
        let mut subscribers = self.lock();
        subscribers.retain(|sender| sender.send(event.clone()).is_ok());
        log::trace!("Event published to {} subscriber(s).", subscribers.len());
    }

    /// Number of live subscribers, as of the last publish.
    pub fn subscriber_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<flume::Sender<T>>> {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Clone + Send + 'static> Default for EventHub<T> {
    fn default() -> Self {
        Self::new()
    }
}
