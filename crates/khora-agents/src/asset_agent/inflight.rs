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

//! Per-path bookkeeping of loads that have not settled yet.

use super::handle::{LoadHandle, LoadOutcome, OutcomeSender};
use khora_core::error::LoadError;
use khora_core::resource::{LoadOptions, ResourcePath, ResourceRef};
use std::collections::HashMap;

/// A callback invoked with the resource once its load succeeds.
pub type Subscriber = Box<dyn FnOnce(&ResourceRef) + Send>;

struct PendingLoad {
    subscribers: Vec<(LoadOptions, Option<Subscriber>)>,
    sender: OutcomeSender,
    handle: LoadHandle,
}

/// The result of [`InFlightTracker::begin`].
pub(crate) struct Begin {
    /// `true` if the caller started the load and must drive it.
    pub is_new: bool,
    /// The handle on the shared completion channel.
    pub handle: LoadHandle,
}

/// The subscribers and channel of a load that just settled.
///
/// Returned from the tracker under the agent lock and consumed after the
/// lock is released, so subscribers may call back into the agent.
pub(crate) struct Completion {
    subscribers: Vec<(LoadOptions, Option<Subscriber>)>,
    sender: OutcomeSender,
}

impl Completion {
    /// Invokes every subscriber in registration order, then `also`, then
    /// settles the handles.
    pub fn succeed(self, resource: &ResourceRef, also: Vec<Subscriber>) {
        let subscribers = self.subscribers.into_iter().filter_map(|(_, s)| s);
        for subscriber in subscribers.chain(also) {
            subscriber(resource);
        }
        self.sender.send_replace(Some(Ok(resource.clone())));
    }

    /// Drops the subscribers and settles the handles with `error`.
    pub fn fail(self, error: LoadError) {
        log::trace!(
            "Dropping {} subscriber(s) of failed load '{}'",
            self.subscribers.len(),
            error.path()
        );
        self.sender.send_replace(Some(Err(error)));
    }

    /// Settles the handles without touching the subscribers.
    #[cfg(test)]
    fn outcome(self, outcome: LoadOutcome) {
        self.sender.send_replace(Some(outcome));
    }
}

/// Deduplicates concurrent loads of the same path.
#[derive(Default)]
pub(crate) struct InFlightTracker {
    pending: HashMap<ResourcePath, PendingLoad>,
}

impl InFlightTracker {
    /// Joins the load of `path`, starting it if nobody else has.
    pub fn begin(
        &mut self,
        path: &ResourcePath,
        options: LoadOptions,
        subscriber: Option<Subscriber>,
    ) -> Begin {
        if let Some(pending) = self.pending.get_mut(path) {
            pending.subscribers.push((options, subscriber));
            return Begin {
                is_new: false,
                handle: pending.handle.clone(),
            };
        }

        let (sender, handle) = LoadHandle::channel(path.clone());
        self.pending.insert(
            path.clone(),
            PendingLoad {
                subscribers: vec![(options, subscriber)],
                sender,
                handle: handle.clone(),
            },
        );
        Begin {
            is_new: true,
            handle,
        }
    }

    /// Whether `path` is being loaded.
    pub fn contains(&self, path: &ResourcePath) -> bool {
        self.pending.contains_key(path)
    }

    /// The number of paths being loaded.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Ends the load of `path`.
    pub fn complete(&mut self, path: &ResourcePath) -> Option<Completion> {
        let pending = self.pending.remove(path)?;
        Some(Completion {
            subscribers: pending.subscribers,
            sender: pending.sender,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use khora_core::asset::Mesh;
    use khora_core::resource::{Resource, ResourceType};
    use std::sync::{Arc, Mutex};

    fn recorder(log: &Arc<Mutex<Vec<u32>>>, id: u32) -> Option<Subscriber> {
        let log = log.clone();
        Some(Box::new(move |_: &ResourceRef| log.lock().unwrap().push(id)))
    }

    #[test]
    fn joiners_share_the_first_handle() {
        let mut tracker = InFlightTracker::default();
        let path = ResourcePath::new("a.png");

        let first = tracker.begin(&path, LoadOptions::default(), None);
        let second = tracker.begin(&path, LoadOptions::default(), None);
        assert!(first.is_new);
        assert!(!second.is_new);
        assert_eq!(tracker.len(), 1);

        tracker
            .complete(&path)
            .unwrap()
            .outcome(Ok(Arc::new(Resource::new(ResourceType::MESH, Mesh::default()))));
        assert!(first.handle.is_settled());
        assert!(second.handle.is_settled());
        assert!(!tracker.contains(&path));
    }

    #[test]
    fn subscribers_run_in_registration_order() {
        let mut tracker = InFlightTracker::default();
        let path = ResourcePath::new("a.png");
        let log = Arc::new(Mutex::new(Vec::new()));

        for id in 0..3 {
            tracker.begin(&path, LoadOptions::default(), recorder(&log, id));
        }
        let resource = Arc::new(Resource::new(ResourceType::MESH, Mesh::default()));
        tracker
            .complete(&path)
            .unwrap()
            .succeed(&resource, vec![recorder(&log, 9).unwrap()]);
        assert_eq!(*log.lock().unwrap(), [0, 1, 2, 9]);
    }

    #[test]
    fn failures_discard_subscribers() {
        let mut tracker = InFlightTracker::default();
        let path = ResourcePath::new("a.png");
        let log = Arc::new(Mutex::new(Vec::new()));

        let begin = tracker.begin(&path, LoadOptions::default(), recorder(&log, 1));
        tracker.complete(&path).unwrap().fail(LoadError::Parse {
            path: "a.png".into(),
            message: "truncated".into(),
        });
        assert!(log.lock().unwrap().is_empty());
        assert!(matches!(begin.handle.outcome(), Some(Err(LoadError::Parse { .. }))));
    }

    #[test]
    fn completing_an_idle_path_is_a_no_op() {
        let mut tracker = InFlightTracker::default();
        assert!(tracker.complete(&"idle.png".into()).is_none());
    }
}
