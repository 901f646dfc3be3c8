//! Render Context
//!
//! [`RenderContext`] owns the backend, the resource manager and the
//! allocation tracker, and ties their lifetimes together:
//!
//! ```text
//!  new() ──▶ init() ──▶ create / dispatch / destroy ... ──▶ shutdown()
//!                                                            (or drop)
//! ```
//!
//! `shutdown()` releases every resource still alive, logging each one as a
//! leak, before the backend itself is shut down.

use std::sync::Arc;

use stratum_core::memory::AllocationTracker;

use crate::backend::Backend;
use crate::dispatcher::{DispatchStatus, LayerDispatcher};
use crate::errors::{RenderError, Result};
use crate::queue::{QueueConfig, SortMode};
use crate::resources::{Handle, ManagedResource, ResourceManager};
use crate::settings::RenderSettings;

pub struct RenderContext<B: Backend> {
    backend: B,
    resources: ResourceManager,
    settings: RenderSettings,
    tracker: Arc<AllocationTracker>,
    initialized: bool,
}

impl<B: Backend> RenderContext<B> {
    #[must_use]
    pub fn new(backend: B, settings: RenderSettings) -> Self {
        let tracker = Arc::new(AllocationTracker::new(settings.track_allocations));
        let resources = ResourceManager::new(settings.resource_pool_capacity, Some(Arc::clone(&tracker)));
        Self {
            backend,
            resources,
            settings,
            tracker,
            initialized: false,
        }
    }

    pub fn init(&mut self) -> Result<()> {
        if self.initialized {
            return Err(RenderError::AlreadyInitialized);
        }
        self.backend.init()?;
        if self.tracker.is_enabled() {
            self.tracker.start();
        }
        self.initialized = true;
        log::info!("Render context initialized ({} backend)", self.backend.name());
        Ok(())
    }

    /// Releases every live resource and shuts the backend down.
    pub fn shutdown(&mut self) {
        if !self.initialized {
            log::warn!("RenderContext::shutdown() on a context that is not initialized");
            return;
        }

        let released = self.resources.release_all(&mut self.backend);
        if released > 0 {
            log::warn!("{released} resource(s) were still alive at shutdown");
        }
        self.tracker.report_leaks();
        self.tracker.stop();

        self.backend.shutdown();
        self.initialized = false;
        log::info!("Render context shut down");
    }

    #[inline]
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    #[inline]
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[inline]
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    #[inline]
    #[must_use]
    pub fn resources(&self) -> &ResourceManager {
        &self.resources
    }

    #[inline]
    pub fn resources_mut(&mut self) -> &mut ResourceManager {
        &mut self.resources
    }

    /// Backend and resource manager borrowed together, for APIs that need
    /// both.
    #[inline]
    pub fn split_mut(&mut self) -> (&mut B, &mut ResourceManager) {
        (&mut self.backend, &mut self.resources)
    }

    #[inline]
    #[must_use]
    pub fn tracker(&self) -> &Arc<AllocationTracker> {
        &self.tracker
    }

    /// A dispatcher using this context's dispatch settings.
    #[must_use]
    pub fn new_dispatcher(&self) -> LayerDispatcher {
        LayerDispatcher::with_settings(self.settings.dispatch)
    }

    /// Queue configuration using this context's page size.
    #[must_use]
    pub fn queue_config(&self, sort_mode: SortMode) -> QueueConfig {
        QueueConfig {
            sort_mode,
            page_size: self.settings.queue_page_size,
        }
    }

    /// Creates a resource. Returns [`Handle::INVALID`] before `init()`.
    #[track_caller]
    pub fn create<R: ManagedResource>(&mut self, name: &str, desc: R::Desc) -> Handle<R> {
        if !self.initialized {
            log::error!("Cannot create {:?} '{name}': context not initialized", R::KIND);
            return Handle::INVALID;
        }
        self.resources.create(&mut self.backend, name, desc)
    }

    pub fn destroy<R: ManagedResource>(&mut self, handle: Handle<R>) -> bool {
        self.resources.destroy(&mut self.backend, handle)
    }

    /// Runs one frame of `dispatcher` against this context's backend.
    pub fn dispatch(&mut self, dispatcher: &mut LayerDispatcher) -> Result<DispatchStatus> {
        if !self.initialized {
            return Err(RenderError::NotInitialized);
        }
        Ok(dispatcher.dispatch(&mut self.backend, &self.resources))
    }
}

impl<B: Backend> Drop for RenderContext<B> {
    fn drop(&mut self) {
        if self.initialized {
            self.shutdown();
        }
    }
}
