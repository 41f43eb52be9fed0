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

//! Handles returned to callers of [`ResourceAgent::load`](super::ResourceAgent::load).

use khora_core::error::LoadError;
use khora_core::resource::{ResourcePath, ResourceRef};
use std::future::{Future, IntoFuture};
use std::pin::Pin;
use tokio::sync::watch;

/// The final outcome of a load.
pub type LoadOutcome = Result<ResourceRef, LoadError>;

pub(crate) type OutcomeSender = watch::Sender<Option<LoadOutcome>>;

/// A future-like view of a load.
///
/// Every caller that requested the same path while it was in flight holds a
/// handle on the same completion channel, so they all observe the same
/// outcome. Handles can be cloned, polled with [`LoadHandle::outcome`], or
/// awaited.
#[derive(Debug, Clone)]
pub struct LoadHandle {
    path: ResourcePath,
    receiver: watch::Receiver<Option<LoadOutcome>>,
}

impl LoadHandle {
    /// A handle on a new completion channel.
    pub(crate) fn channel(path: ResourcePath) -> (OutcomeSender, Self) {
        let (sender, receiver) = watch::channel(None);
        (sender, Self { path, receiver })
    }

    /// A handle that is already settled.
    pub(crate) fn settled(path: ResourcePath, outcome: LoadOutcome) -> Self {
        let (_, receiver) = watch::channel(Some(outcome));
        Self { path, receiver }
    }

    /// The canonical path being loaded.
    pub fn path(&self) -> &ResourcePath {
        &self.path
    }

    /// Whether the load has finished, successfully or not.
    pub fn is_settled(&self) -> bool {
        self.receiver.borrow().is_some()
    }

    /// The outcome, if the load has finished.
    pub fn outcome(&self) -> Option<LoadOutcome> {
        self.receiver.borrow().clone()
    }

    /// Waits for the load to finish.
    pub async fn wait(&self) -> LoadOutcome {
        if let Some(outcome) = self.outcome() {
            return outcome;
        }
        let mut receiver = self.receiver.clone();
        let settled = receiver
            .wait_for(Option::is_some)
            .await
            .map(|outcome| (*outcome).clone());
        match settled {
            Ok(Some(outcome)) => outcome,
            _ => Err(self.abandoned()),
        }
    }

    fn abandoned(&self) -> LoadError {
        LoadError::Transport {
            path: self.path.to_string(),
            message: "the load was abandoned before it settled".to_string(),
        }
    }
}

impl IntoFuture for LoadHandle {
    type Output = LoadOutcome;
    type IntoFuture = Pin<Box<dyn Future<Output = LoadOutcome> + Send>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(async move { self.wait().await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use khora_core::asset::Mesh;
    use khora_core::resource::{Resource, ResourceType};
    use std::sync::Arc;

    fn mesh() -> ResourceRef {
        Arc::new(Resource::new(ResourceType::MESH, Mesh::default()))
    }

    #[tokio::test]
    async fn settled_handles_resolve_immediately() {
        let resource = mesh();
        let handle = LoadHandle::settled("a.obj".into(), Ok(resource.clone()));
        assert!(handle.is_settled());
        assert!(Arc::ptr_eq(&handle.await.unwrap(), &resource));
    }

    #[tokio::test]
    async fn clones_share_the_outcome() {
        let (sender, handle) = LoadHandle::channel("a.obj".into());
        let other = handle.clone();
        assert!(handle.outcome().is_none());

        let waiter = tokio::spawn(async move { other.await });
        let resource = mesh();
        sender.send_replace(Some(Ok(resource.clone())));

        let joined = waiter.await.unwrap().unwrap();
        assert!(Arc::ptr_eq(&joined, &resource));
        assert!(Arc::ptr_eq(&handle.wait().await.unwrap(), &resource));
    }

    #[tokio::test]
    async fn dropped_channels_surface_as_errors() {
        let (sender, handle) = LoadHandle::channel("lost.obj".into());
        drop(sender);
        let error = handle.wait().await.unwrap_err();
        assert_eq!(error.path(), "lost.obj");
    }
}
