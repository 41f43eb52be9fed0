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

mod common;

use anyhow::Result;
use common::*;
use khora_core::event::ResourceEvent;
use khora_core::resource::{LoadOptions, ResourceRef, ResourceType};
use khora_core::{asset::Mesh, LoadErrorKind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

#[tokio::test]
async fn concurrent_requests_share_one_fetch() -> Result<()> {
    let fetcher = MemoryFetcher::new();
    fetcher.insert("cube.mesh", TRIANGLE);
    let agent = builder_with_mesh_format(&fetcher).build()?;

    let order = Arc::new(Mutex::new(Vec::new()));
    let handles: Vec<_> = (0..3)
        .map(|i| {
            let order = order.clone();
            agent.load_with("cube.mesh", LoadOptions::default(), move |_: &ResourceRef| {
                order.lock().unwrap().push(i)
            })
        })
        .collect();

    let first = handles[0].wait().await?;
    for handle in &handles[1..] {
        assert!(Arc::ptr_eq(&first, &handle.wait().await?));
    }
    assert_eq!(fetcher.fetch_count(), 1);
    assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
    Ok(())
}

#[tokio::test]
async fn cached_paths_settle_synchronously() -> Result<()> {
    let fetcher = MemoryFetcher::new();
    fetcher.insert("cube.mesh", TRIANGLE);
    let agent = builder_with_mesh_format(&fetcher).build()?;
    let loaded = agent.load("cube.mesh", LoadOptions::default()).await?;

    let called = Arc::new(AtomicBool::new(false));
    let flag = called.clone();
    let handle = agent.load_with("cube.mesh", LoadOptions::default(), move |_: &ResourceRef| {
        flag.store(true, Ordering::SeqCst)
    });

    assert!(handle.is_settled());
    assert!(called.load(Ordering::SeqCst));
    assert!(Arc::ptr_eq(&loaded, &handle.wait().await?));
    assert_eq!(fetcher.fetch_count(), 1);
    assert!(!agent.is_loading());
    Ok(())
}

#[tokio::test]
async fn spellings_of_a_path_share_one_entry() -> Result<()> {
    let fetcher = MemoryFetcher::new();
    fetcher.insert("models/cube.mesh", TRIANGLE);
    let agent = builder_with_mesh_format(&fetcher).build()?;

    let noisy = agent.load("/models//cube.mesh?v=2", LoadOptions::default());
    let clean = agent.load("models/cube.mesh", LoadOptions::default());
    assert!(Arc::ptr_eq(&noisy.wait().await?, &clean.wait().await?));

    assert_eq!(noisy.path().as_str(), "models/cube.mesh");
    assert_eq!(fetcher.fetch_count(), 1);
    assert_eq!(fetcher.addresses(), vec!["assets/models/cube.mesh?v=2"]);
    assert!(agent.contains("models/cube.mesh/"));
    Ok(())
}

#[tokio::test]
async fn failures_are_remembered_until_cleared() -> Result<()> {
    let fetcher = MemoryFetcher::new();
    let agent = builder_with_mesh_format(&fetcher).build()?;

    let error = agent
        .load("missing.mesh", LoadOptions::default())
        .await
        .unwrap_err();
    assert_eq!(error.kind(), LoadErrorKind::Transport);
    assert_eq!(error.path(), "missing.mesh");

    let again = agent.load("missing.mesh", LoadOptions::default());
    assert!(again.is_settled());
    assert_eq!(again.outcome().map(|o| o.unwrap_err()), Some(error.clone()));
    assert_eq!(agent.failure("missing.mesh"), Some(error));
    assert_eq!(fetcher.fetch_count(), 1);

    fetcher.insert("missing.mesh", TRIANGLE);
    assert_eq!(agent.clear_failures(), 1);
    agent.load("missing.mesh", LoadOptions::default()).await?;
    assert_eq!(fetcher.fetch_count(), 2);
    Ok(())
}

#[tokio::test]
async fn unknown_extensions_fail_without_fetching() -> Result<()> {
    let fetcher = MemoryFetcher::new();
    fetcher.insert("notes.xyz", "hello");
    let agent = builder(&fetcher).build()?;

    let error = agent
        .load("notes.xyz", LoadOptions::default())
        .await
        .unwrap_err();
    assert_eq!(error.kind(), LoadErrorKind::UnknownFormat);
    assert_eq!(fetcher.fetch_count(), 0);
    Ok(())
}

#[tokio::test]
async fn empty_paths_are_rejected_up_front() -> Result<()> {
    let fetcher = MemoryFetcher::new();
    let agent = builder(&fetcher).build()?;

    let handle = agent.load("//", LoadOptions::default());
    assert!(handle.is_settled());
    let error = handle.await.unwrap_err();
    assert_eq!(error.kind(), LoadErrorKind::UnknownFormat);
    assert!(!agent.is_loading());
    assert_eq!(agent.failure(""), None);
    Ok(())
}

#[tokio::test]
async fn loaded_meshes_are_finalized_and_indexed() -> Result<()> {
    let fetcher = MemoryFetcher::new();
    fetcher.insert("cube.mesh", TRIANGLE);
    let agent = builder_with_mesh_format(&fetcher).build()?;
    let events = agent.subscribe_events();

    agent.load("cube.mesh", LoadOptions::default()).await?;
    settle(&agent).await;

    let resource = agent
        .get_typed(&ResourceType::MESH, "cube.mesh")
        .expect("mesh is in the secondary cache");
    assert_eq!(resource.filename().as_str(), "cube.mesh");
    assert!(resource.is_remote());

    let mesh = resource.data::<Mesh>().expect("payload is a mesh");
    assert_eq!(mesh.vertex_count(), 3);
    assert_eq!(mesh.normals.as_ref().map(Vec::len), Some(3));
    assert!(mesh.has_valid_bounding_box());
    assert_eq!(agent.resources_of(&ResourceType::MESH).len(), 1);

    let events = drain(&events);
    assert_eq!(
        events,
        vec![
            ResourceEvent::LoadingStarted,
            ResourceEvent::Loading("cube.mesh".to_string()),
            ResourceEvent::Registered("cube.mesh".to_string()),
            ResourceEvent::Loaded("cube.mesh".to_string()),
            ResourceEvent::AllSettled { success: true },
        ]
    );
    Ok(())
}

#[tokio::test]
async fn a_batch_settles_once() -> Result<()> {
    let fetcher = MemoryFetcher::new();
    fetcher.insert("a.mesh", TRIANGLE);
    fetcher.insert("b.mesh", TRIANGLE);
    let agent = builder_with_mesh_format(&fetcher).build()?;
    let events = agent.subscribe_events();

    let handles = agent.load_all(["a.mesh", "b.mesh", "missing.mesh", ":builtin"]);
    assert_eq!(handles.len(), 3);
    assert_eq!(agent.outstanding(), 3);
    for handle in &handles {
        let _ = handle.wait().await;
    }
    settle(&agent).await;

    let events = drain(&events);
    let started = events
        .iter()
        .filter(|e| **e == ResourceEvent::LoadingStarted)
        .count();
    let settled: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, ResourceEvent::AllSettled { .. }))
        .collect();
    assert_eq!(started, 1);
    assert_eq!(settled.len(), 1);
    assert!(events.iter().any(|e| matches!(
        e,
        ResourceEvent::LoadFailed { path, .. } if path == "missing.mesh"
    )));
    Ok(())
}

#[tokio::test]
async fn once_loaded_fires_for_the_next_load_only() -> Result<()> {
    let fetcher = MemoryFetcher::new();
    fetcher.insert("cube.mesh", TRIANGLE);
    let agent = builder_with_mesh_format(&fetcher).build()?;

    let calls = Arc::new(Mutex::new(0));
    let counter = calls.clone();
    agent.once_loaded("cube.mesh", move |resource: &ResourceRef| {
        assert_eq!(resource.filename().as_str(), "cube.mesh");
        *counter.lock().unwrap() += 1;
    });

    agent.load("cube.mesh", LoadOptions::default()).await?;
    agent.load("cube.mesh", LoadOptions::default()).await?;
    assert_eq!(*calls.lock().unwrap(), 1);
    Ok(())
}

#[tokio::test]
async fn once_loaded_callbacks_do_not_outlive_failures_or_resets() -> Result<()> {
    let fetcher = MemoryFetcher::new();
    let agent = builder_with_mesh_format(&fetcher).build()?;

    let calls = Arc::new(Mutex::new(0));
    for path in ["cube.mesh", "other.mesh"] {
        let counter = calls.clone();
        agent.once_loaded(path, move |_: &ResourceRef| *counter.lock().unwrap() += 1);
    }

    // The failed load consumes the callback of cube.mesh.
    assert!(agent.load("cube.mesh", LoadOptions::default()).await.is_err());
    // The reset drops the callback of other.mesh.
    agent.reset();

    fetcher.insert("cube.mesh", TRIANGLE);
    fetcher.insert("other.mesh", TRIANGLE);
    agent.load("cube.mesh", LoadOptions::default()).await?;
    agent.load("other.mesh", LoadOptions::default()).await?;
    assert_eq!(*calls.lock().unwrap(), 0);
    Ok(())
}
