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

//! The `ResourceAgent` turns request paths into registered resources.
//!
//! Each uncached path goes through the same stages, driven by one tokio task:
//!
//! ```text
//! Resolving -> DedupChecking -> Fetching -> PreProcessing
//!           -> RecursingDependencies -> PostProcessing -> Registered | Failed
//! ```
//!
//! Requests for a path that is already cached settle synchronously, requests
//! for a path that failed settle with the remembered error, and requests for a
//! path that is in flight join the running load. All cache, in-flight and
//! failure bookkeeping happens behind a single lock, callbacks always run after
//! it is released.

use super::config::LoaderConfig;
use super::handle::LoadHandle;
use super::inflight::{InFlightTracker, Subscriber};
use anyhow::{Context, Result};
use khora_core::asset::RawData;
use khora_core::error::LoadError;
use khora_core::event::{EventHub, ResourceEvent};
use khora_core::fetch::Fetcher;
use khora_core::gpu::GpuUploader;
use khora_core::observer::ResourceObserver;
use khora_core::resource::{
    InternalData, LoadOptions, PayloadShape, Resource, ResourcePath, ResourceRef, ResourceType,
};
use khora_data::assets::ResourceRegistry;
use khora_io::{FileSystemFetcher, PathResolver};
use khora_lanes::asset_lane::loading::{decode_self_describing, register_default_lanes};
use khora_lanes::asset_lane::{
    FinalizeContext, Finalizer, FormatHandler, FormatRegistry, PostProcessorRegistry,
    PreProcessor, ResourceFactory, TypeFactoryRegistry,
};
use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use tokio::runtime::Handle;
use tokio::task::JoinError;

#[derive(Debug, Clone, Copy)]
enum LoadStage {
    Resolving,
    DedupChecking,
    Fetching,
    PreProcessing,
    RecursingDependencies,
    PostProcessing,
}

fn enter(path: &ResourcePath, stage: LoadStage) {
    log::trace!("'{}': {:?}", path, stage);
}

struct LoaderState {
    registry: ResourceRegistry,
    in_flight: InFlightTracker,
    once_loaded: HashMap<ResourcePath, Vec<Subscriber>>,
    outstanding: usize,
}

impl LoaderState {
    /// Counts one load as settled. Returns `true` if it was the last one.
    fn settle(&mut self) -> bool {
        self.outstanding = self.outstanding.saturating_sub(1);
        self.outstanding == 0
    }
}

struct AgentInner {
    state: Mutex<LoaderState>,
    resolver: RwLock<PathResolver>,
    fetcher: Arc<dyn Fetcher>,
    formats: FormatRegistry,
    factories: Arc<TypeFactoryRegistry>,
    post_processors: PostProcessorRegistry,
    finalize: FinalizeContext,
    keep_files: bool,
    observers: RwLock<Vec<Arc<dyn ResourceObserver>>>,
    events: EventHub<ResourceEvent>,
    runtime: Handle,
}

/// The loader orchestrator and resource cache.
///
/// Cloning the agent is cheap and every clone drives the same caches. Separate
/// agents built from separate builders share nothing.
#[derive(Clone)]
pub struct ResourceAgent {
    inner: Arc<AgentInner>,
}

impl ResourceAgent {
    /// Starts configuring an agent.
    pub fn builder() -> ResourceAgentBuilder {
        ResourceAgentBuilder::new()
    }

    /// Requests `path`.
    ///
    /// Never fails directly: the outcome is observed through the returned
    /// handle and the event stream. If the resource is already cached the
    /// handle is settled when this returns.
    pub fn load(&self, path: impl Into<ResourcePath>, options: LoadOptions) -> LoadHandle {
        self.request(path.into(), options, None)
    }

    /// Requests `path` and calls `on_loaded` once it is registered.
    ///
    /// For a cached path, `on_loaded` runs before this returns. Callbacks of
    /// concurrent requests for the same path run in request order. On failure
    /// the callback is dropped without being called.
    pub fn load_with<F>(
        &self,
        path: impl Into<ResourcePath>,
        options: LoadOptions,
        on_loaded: F,
    ) -> LoadHandle
    where
        F: FnOnce(&ResourceRef) + Send + 'static,
    {
        self.request(path.into(), options, Some(Box::new(on_loaded)))
    }

    /// Requests every path with default options. Names starting with `:` are
    /// in-process resources and are skipped.
    pub fn load_all<I, S>(&self, paths: I) -> Vec<LoadHandle>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        paths
            .into_iter()
            .filter(|path| !path.as_ref().starts_with(':'))
            .map(|path| self.load(path.as_ref(), LoadOptions::default()))
            .collect()
    }

    /// Calls `callback` the next time `path` finishes loading successfully.
    /// The callback is dropped if that load fails.
    pub fn once_loaded<F>(&self, path: impl Into<ResourcePath>, callback: F)
    where
        F: FnOnce(&ResourceRef) + Send + 'static,
    {
        self.lock()
            .once_loaded
            .entry(path.into())
            .or_default()
            .push(Box::new(callback));
    }

    fn request(
        &self,
        path: ResourcePath,
        options: LoadOptions,
        subscriber: Option<Subscriber>,
    ) -> LoadHandle {
        enter(&path, LoadStage::Resolving);
        if path.is_empty() {
            let error = LoadError::UnknownFormat {
                path: String::new(),
                detail: "empty path".to_string(),
            };
            return LoadHandle::settled(path, Err(error));
        }

        enter(&path, LoadStage::DedupChecking);
        let mut state = self.lock();
        if let Some(resource) = state.registry.get(&path).cloned() {
            drop(state);
            log::debug!("Cache hit for '{}'", path);
            if let Some(subscriber) = subscriber {
                subscriber(&resource);
            }
            return LoadHandle::settled(path, Ok(resource));
        }
        if let Some(error) = state.registry.failure(&path).cloned() {
            drop(state);
            log::debug!("'{}' is known to fail: {}", path, error);
            return LoadHandle::settled(path, Err(error));
        }

        let begin = state.in_flight.begin(&path, options.clone(), subscriber);
        if !begin.is_new {
            log::trace!("Joining the in-flight load of '{}'", path);
            return begin.handle;
        }
        state.outstanding += 1;
        let started = state.outstanding == 1;
        drop(state);

        if started {
            self.inner.events.publish(ResourceEvent::LoadingStarted);
        }
        self.inner
            .events
            .publish(ResourceEvent::Loading(path.to_string()));

        let agent = self.clone();
        self.inner
            .runtime
            .spawn(async move { agent.drive(path, options).await });
        begin.handle
    }

    /// Runs one load cycle to completion. The cycle runs as its own task so
    /// a panicking plugin still settles the path.
    async fn drive(self, path: ResourcePath, options: LoadOptions) {
        let agent = self.clone();
        let cycle_path = path.clone();
        let cycle = self
            .inner
            .runtime
            .spawn(async move { agent.fetch_and_decode(&cycle_path, &options).await });

        match cycle.await {
            Ok(Ok((resource, secondary))) => self.finish_loaded(path, resource, secondary),
            Ok(Err(error)) => self.finish_failed(path, error),
            Err(error) => {
                let error = LoadError::Parse {
                    path: path.to_string(),
                    message: abort_reason(error),
                };
                self.finish_failed(path, error);
            }
        }
    }

    async fn fetch_and_decode(
        &self,
        path: &ResourcePath,
        options: &LoadOptions,
    ) -> Result<(Resource, Option<ResourceType>), LoadError> {
        let handler = match path.extension() {
            Some(extension) => Some(self.inner.formats.lookup(&extension).ok_or_else(|| {
                LoadError::UnknownFormat {
                    path: path.to_string(),
                    detail: format!("no format registered for '.{extension}'"),
                }
            })?),
            None => None,
        };

        enter(path, LoadStage::Fetching);
        let shape = handler.map_or(PayloadShape::Structured, FormatHandler::shape);
        let address = self.resolve(path, options);
        log::trace!("Fetching '{}' as {:?}", address, shape);
        let payload = self
            .inner
            .fetcher
            .fetch(&address, shape)
            .await
            .map_err(|e| LoadError::from_transport(path.as_str(), e))?;
        let source = if self.inner.keep_files {
            payload.source_bytes()
        } else {
            None
        };

        enter(path, LoadStage::PreProcessing);
        let decode_error = |e| LoadError::from_decode(path.as_str(), e);
        let mut resource = match handler {
            None => decode_self_describing(&self.inner.factories, payload)
                .map_err(decode_error)?
                .resolve()
                .await
                .map_err(decode_error)?,
            Some(handler) => match handler.pre_processor() {
                Some(pre_processor) => pre_processor
                    .process(path, payload, options)
                    .map_err(decode_error)?
                    .resolve()
                    .await
                    .map_err(decode_error)?,
                None => Resource::new(ResourceType::RAW, RawData(payload)),
            },
        };
        if let Some(expected) = handler.and_then(FormatHandler::produces) {
            if expected != resource.resource_type() {
                log::warn!(
                    "'{}' was expected to produce {} but produced {}",
                    path,
                    expected,
                    resource.resource_type()
                );
            }
        }

        enter(path, LoadStage::RecursingDependencies);
        for (dependency, expected) in resource.dependencies() {
            log::trace!("'{}' depends on '{}' ({})", path, dependency, expected);
            self.load(dependency.as_str(), LoadOptions::default());
        }

        enter(path, LoadStage::PostProcessing);
        resource.set_filename(match &options.filename {
            Some(filename) => ResourcePath::new(filename),
            None => path.clone(),
        });
        resource.set_remote(true);
        if let Some(bytes) = source {
            resource.set_original_bytes(bytes);
        }
        let secondary = self.finalize(path, &mut resource)?;
        Ok((resource, secondary))
    }

    fn finalize(
        &self,
        path: &ResourcePath,
        resource: &mut Resource,
    ) -> Result<Option<ResourceType>, LoadError> {
        let Some(finalizer) = self
            .inner
            .post_processors
            .lookup(resource.resource_type())
            .cloned()
        else {
            log::trace!("No finalizer for {} '{}'", resource.resource_type(), path);
            return Ok(None);
        };
        finalizer
            .finalize(path, resource, &self.inner.finalize)
            .map_err(|e| LoadError::Parse {
                path: path.to_string(),
                message: e.to_string(),
            })
    }

    fn finish_loaded(
        &self,
        path: ResourcePath,
        resource: Resource,
        secondary: Option<ResourceType>,
    ) {
        let resource: ResourceRef = Arc::new(resource);
        let (completion, once, settled) = {
            let mut state = self.lock();
            if state
                .registry
                .insert(path.clone(), resource.clone(), secondary)
                .is_some()
            {
                log::warn!(
                    "{}, replacing it",
                    LoadError::DuplicateRegistration {
                        path: path.to_string()
                    }
                );
            }
            let completion = state.in_flight.complete(&path);
            let once = state.once_loaded.remove(&path).unwrap_or_default();
            (completion, once, state.settle())
        };

        log::debug!("Registered {} '{}'", resource.resource_type(), path);
        self.inner
            .events
            .publish(ResourceEvent::Registered(path.to_string()));
        self.inner
            .events
            .publish(ResourceEvent::Loaded(path.to_string()));

        match completion {
            Some(completion) => completion.succeed(&resource, once),
            None => once.into_iter().for_each(|callback| callback(&resource)),
        }
        if settled {
            self.all_settled(true);
        }
    }

    fn finish_failed(&self, path: ResourcePath, error: LoadError) {
        log::warn!("Failed to load '{}': {}", path, error);
        let (completion, settled) = {
            let mut state = self.lock();
            if error.is_memoized() {
                state.registry.mark_failed(path.clone(), error.clone());
            }
            if let Some(dropped) = state.once_loaded.remove(&path) {
                log::debug!(
                    "Dropping {} once-loaded callback(s) of '{}'",
                    dropped.len(),
                    path
                );
            }
            (state.in_flight.complete(&path), state.settle())
        };

        self.inner.events.publish(ResourceEvent::LoadFailed {
            path: path.to_string(),
            reason: error.to_string(),
        });
        if let Some(completion) = completion {
            completion.fail(error);
        }
        if settled {
            self.all_settled(false);
        }
    }

    fn all_settled(&self, success: bool) {
        log::info!("All pending resources settled (last load succeeded: {})", success);
        self.inner
            .events
            .publish(ResourceEvent::AllSettled { success });
    }

    /// Registers a resource constructed in-process under `path`.
    ///
    /// The resource is finalized like a fetched one. A resource already
    /// registered under `path` is replaced. Fails with
    /// [`LoadError::DuplicateRegistration`] while `path` is being loaded, or
    /// with [`LoadError::Parse`] if the finalizer rejects the resource.
    pub fn register_resource(
        &self,
        path: impl Into<ResourcePath>,
        mut resource: Resource,
    ) -> Result<ResourceRef, LoadError> {
        let path = path.into();
        if self.lock().in_flight.contains(&path) {
            return Err(refuse_registration(&path));
        }

        resource.set_filename(path.clone());
        resource.set_remote(false);
        let secondary = self.finalize(&path, &mut resource)?;
        let resource = Arc::new(resource);

        {
            let mut state = self.lock();
            if state.in_flight.contains(&path) {
                return Err(refuse_registration(&path));
            }
            if state
                .registry
                .insert(path.clone(), resource.clone(), secondary)
                .is_some()
            {
                log::warn!(
                    "{}, replacing it",
                    LoadError::DuplicateRegistration {
                        path: path.to_string()
                    }
                );
            }
        }

        self.inner
            .events
            .publish(ResourceEvent::Registered(path.to_string()));
        Ok(resource)
    }

    /// Moves the resource registered under `old` to `new` and notifies every
    /// observer. Returns `false` if nothing is registered under `old`.
    pub fn rename(&self, old: impl Into<ResourcePath>, new: impl Into<ResourcePath>) -> bool {
        self.rename_inner(old.into(), new.into(), true)
    }

    /// Like [`ResourceAgent::rename`], without notifying observers.
    pub fn rename_silently(
        &self,
        old: impl Into<ResourcePath>,
        new: impl Into<ResourcePath>,
    ) -> bool {
        self.rename_inner(old.into(), new.into(), false)
    }

    fn rename_inner(&self, old: ResourcePath, new: ResourcePath, notify: bool) -> bool {
        if old == new {
            return self.contains(&old);
        }

        let renamed = {
            let mut state = self.lock();
            if state.in_flight.contains(&new) {
                log::warn!("Cannot rename '{}' to '{}' while it is loading", old, new);
                return false;
            }
            state.registry.rename(&old, new.clone())
        };
        let Some(resource) = renamed else {
            log::debug!("Nothing registered under '{}' to rename", old);
            return false;
        };

        log::debug!("Renamed '{}' to '{}'", old, new);
        self.inner.events.publish(ResourceEvent::Renamed {
            old: old.to_string(),
            new: new.to_string(),
        });
        if notify {
            for observer in self.observers() {
                observer.on_resource_renamed(&old, &new, &resource);
            }
        }
        true
    }

    /// Removes `path` from every cache. Handles already given out stay valid.
    /// Returns `false` if nothing is registered under `path`.
    pub fn evict(&self, path: impl Into<ResourcePath>) -> bool {
        let path = path.into();
        let Some(resource) = self.lock().registry.remove(&path) else {
            return false;
        };

        log::debug!("Evicted '{}'", path);
        self.inner
            .events
            .publish(ResourceEvent::Unregistered(path.to_string()));
        for observer in self.observers() {
            observer.on_resource_unregistered(&path, &resource);
        }
        true
    }

    /// Flags the resource as edited, dropping its kept source bytes.
    pub fn mark_modified(&self, path: impl Into<ResourcePath>) -> bool {
        let path = path.into();
        let Some(resource) = self.get(&path) else {
            return false;
        };
        resource.mark_modified();
        self.inner
            .events
            .publish(ResourceEvent::Modified(path.to_string()));
        true
    }

    /// Clears the edited flag of the resource.
    pub fn mark_saved(&self, path: impl Into<ResourcePath>) -> bool {
        let path = path.into();
        let Some(resource) = self.get(&path) else {
            return false;
        };
        resource.mark_saved();
        self.inner
            .events
            .publish(ResourceEvent::Saved(path.to_string()));
        true
    }

    /// The best representation of the resource under `path` for saving it.
    pub fn internal_data(&self, path: impl Into<ResourcePath>) -> Option<InternalData> {
        self.get(path)?.internal_data()
    }

    /// The resource registered under `path`.
    pub fn get(&self, path: impl Into<ResourcePath>) -> Option<ResourceRef> {
        self.lock().registry.get(&path.into()).cloned()
    }

    /// The resource registered under `path` in the secondary cache of `resource_type`.
    pub fn get_typed(
        &self,
        resource_type: &ResourceType,
        path: impl Into<ResourcePath>,
    ) -> Option<ResourceRef> {
        self.lock()
            .registry
            .get_typed(resource_type, &path.into())
            .cloned()
    }

    /// Every resource in the secondary cache of `resource_type`, sorted by path.
    pub fn resources_of(&self, resource_type: &ResourceType) -> Vec<(ResourcePath, ResourceRef)> {
        self.lock().registry.resources_of(resource_type)
    }

    /// Whether a resource is registered under `path`.
    pub fn contains(&self, path: impl Into<ResourcePath>) -> bool {
        self.lock().registry.contains(&path.into())
    }

    /// The error `path` failed with, if it is remembered as failed.
    pub fn failure(&self, path: impl Into<ResourcePath>) -> Option<LoadError> {
        self.lock().registry.failure(&path.into()).cloned()
    }

    /// Whether any load has not settled yet.
    pub fn is_loading(&self) -> bool {
        self.outstanding() > 0
    }

    /// The number of loads that have not settled yet.
    pub fn outstanding(&self) -> usize {
        self.lock().outstanding
    }

    /// Forgets every remembered failure so those paths are fetched again.
    pub fn clear_failures(&self) -> usize {
        let cleared = self.lock().registry.clear_failures();
        log::debug!("Cleared {} remembered failure(s)", cleared);
        cleared
    }

    /// Drops every cached resource, failure and pending `once_loaded`
    /// callback. Loads in flight still complete and register their resource.
    pub fn reset(&self) {
        let mut state = self.lock();
        state.registry.reset();
        state.once_loaded.clear();
        log::info!(
            "Resource caches reset, {} load(s) still in flight",
            state.in_flight.len()
        );
    }

    /// Opens a receiver for every event published from now on.
    pub fn subscribe_events(&self) -> flume::Receiver<ResourceEvent> {
        self.inner.events.subscribe()
    }

    /// Registers a consumer that follows renames and evictions.
    pub fn add_observer(&self, observer: Arc<dyn ResourceObserver>) {
        self.inner
            .observers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(observer);
    }

    fn observers(&self) -> Vec<Arc<dyn ResourceObserver>> {
        self.inner
            .observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The address `path` would be fetched from with `options`.
    pub fn resolve(&self, path: &ResourcePath, options: &LoadOptions) -> String {
        self.inner
            .resolver
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .resolve(path, options)
    }

    /// The root relative paths are fetched from.
    pub fn base_path(&self) -> String {
        self.with_resolver(|resolver| resolver.base_path().to_string())
    }

    /// Changes the root relative paths are fetched from.
    pub fn set_base_path(&self, base_path: impl Into<String>) {
        self.with_resolver(|resolver| resolver.set_base_path(base_path));
    }

    /// Routes `http`/`https` fetches through `proxy`, or stops doing so with `None`.
    pub fn set_proxy(&self, proxy: Option<String>) {
        self.with_resolver(|resolver| resolver.set_proxy(proxy));
    }

    /// Maps `alias://rest` to `root/rest`.
    pub fn register_file_system(&self, alias: impl Into<String>, root: impl Into<String>) {
        self.with_resolver(|resolver| resolver.register_file_system(alias, root));
    }

    fn with_resolver<T>(&self, f: impl FnOnce(&mut PathResolver) -> T) -> T {
        f(&mut self
            .inner
            .resolver
            .write()
            .unwrap_or_else(PoisonError::into_inner))
    }

    fn lock(&self) -> MutexGuard<'_, LoaderState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

fn abort_reason(error: JoinError) -> String {
    if !error.is_panic() {
        return "load task was cancelled".to_string();
    }
    let payload: Box<dyn Any + Send> = error.into_panic();
    let message = payload
        .downcast_ref::<&str>()
        .map(|message| message.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    format!("decoder panicked: {message}")
}

fn refuse_registration(path: &ResourcePath) -> LoadError {
    let error = LoadError::DuplicateRegistration {
        path: path.to_string(),
    };
    log::warn!("{} by a load in flight", error);
    error
}

/// Configures and builds a [`ResourceAgent`].
///
/// Registries are filled here and frozen by [`ResourceAgentBuilder::build`].
pub struct ResourceAgentBuilder {
    config: LoaderConfig,
    fetcher: Option<Arc<dyn Fetcher>>,
    formats: FormatRegistry,
    factories: TypeFactoryRegistry,
    post_processors: PostProcessorRegistry,
    default_lanes: bool,
    uploader: Option<Arc<dyn GpuUploader>>,
    observers: Vec<Arc<dyn ResourceObserver>>,
    runtime: Option<Handle>,
}

impl Default for ResourceAgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceAgentBuilder {
    /// A builder with default configuration and empty registries.
    pub fn new() -> Self {
        Self {
            config: LoaderConfig::default(),
            fetcher: None,
            formats: FormatRegistry::new(),
            factories: TypeFactoryRegistry::new(),
            post_processors: PostProcessorRegistry::new(),
            default_lanes: false,
            uploader: None,
            observers: Vec::new(),
            runtime: None,
        }
    }

    /// Replaces the configuration.
    pub fn config(mut self, config: LoaderConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the transport. Defaults to a [`FileSystemFetcher`].
    pub fn fetcher(self, fetcher: impl Fetcher + 'static) -> Self {
        self.shared_fetcher(Arc::new(fetcher))
    }

    /// Sets a transport that is shared with other owners.
    pub fn shared_fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Registers a pre-processor for `extensions`.
    pub fn format<'a>(
        mut self,
        extensions: impl IntoIterator<Item = &'a str>,
        pre_processor: impl PreProcessor + 'static,
        shape: PayloadShape,
        produces: Option<ResourceType>,
    ) -> Self {
        self.formats
            .register(extensions, pre_processor, shape, produces);
        self
    }

    /// Registers an extension whose payload is kept as it was fetched.
    pub fn format_shape(mut self, extension: &str, shape: PayloadShape) -> Self {
        self.formats.register_shape(extension, shape);
        self
    }

    /// Registers the factory building self-describing payloads of `resource_type`.
    pub fn factory(
        mut self,
        resource_type: ResourceType,
        factory: impl ResourceFactory + 'static,
    ) -> Self {
        self.factories.register(resource_type, factory);
        self
    }

    /// Registers the finalizer of `resource_type`.
    pub fn finalizer(
        mut self,
        resource_type: ResourceType,
        finalizer: impl Finalizer + 'static,
    ) -> Self {
        self.post_processors.register(resource_type, finalizer);
        self
    }

    /// Adds the reference lanes, the built-in type factories and the
    /// built-in finalizers. Explicit registrations take precedence.
    pub fn with_default_lanes(mut self) -> Self {
        self.default_lanes = true;
        self
    }

    /// Lets finalizers upload resources to the GPU.
    pub fn gpu_uploader(mut self, uploader: Arc<dyn GpuUploader>) -> Self {
        self.uploader = Some(uploader);
        self
    }

    /// Registers a consumer that follows renames and evictions.
    pub fn observer(mut self, observer: Arc<dyn ResourceObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Runs loads on `runtime` instead of the runtime current at build time.
    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Freezes the registries and creates the agent.
    pub fn build(self) -> Result<ResourceAgent> {
        let runtime = match self.runtime {
            Some(runtime) => runtime,
            None => Handle::try_current()
                .context("A ResourceAgent needs a tokio runtime to drive its loads")?,
        };

        let mut factories = if self.default_lanes {
            TypeFactoryRegistry::with_builtin()
        } else {
            TypeFactoryRegistry::new()
        };
        factories.extend(self.factories);
        let factories = Arc::new(factories);

        let mut formats = FormatRegistry::new();
        if self.default_lanes {
            register_default_lanes(&mut formats, factories.clone());
        }
        formats.extend(self.formats);

        let mut post_processors = if self.default_lanes {
            PostProcessorRegistry::with_builtin()
        } else {
            PostProcessorRegistry::new()
        };
        post_processors.extend(self.post_processors);

        let config = self.config;
        let mut resolver = PathResolver::new(config.base_path.clone());
        resolver.set_proxy(config.proxy.clone());
        resolver.set_ignore_cache(config.ignore_cache);
        for (alias, root) in &config.file_systems {
            resolver.register_file_system(alias.clone(), root.clone());
        }

        log::info!(
            "Resource agent ready: {} format(s), base path '{}'",
            formats.extensions().len(),
            config.base_path
        );

        Ok(ResourceAgent {
            inner: Arc::new(AgentInner {
                state: Mutex::new(LoaderState {
                    registry: ResourceRegistry::new(),
                    in_flight: InFlightTracker::default(),
                    once_loaded: HashMap::new(),
                    outstanding: 0,
                }),
                resolver: RwLock::new(resolver),
                fetcher: self
                    .fetcher
                    .unwrap_or_else(|| Arc::new(FileSystemFetcher::new())),
                formats,
                factories,
                post_processors,
                finalize: FinalizeContext {
                    free_data: config.free_data,
                    uploader: self.uploader,
                },
                keep_files: config.keep_files,
                observers: RwLock::new(self.observers),
                events: EventHub::new(),
                runtime,
            }),
        })
    }
}
