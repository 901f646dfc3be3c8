//! Layer Dispatcher
//!
//! Submits registered layers to a backend in pass order.
//!
//! # Ordering
//!
//! Layers are kept sorted by pass; registration order is preserved within a
//! pass. One `dispatch()` call walks the passes in ascending order:
//!
//! ```text
//!  pass 0: [shadow A (O)] [shadow B (O)] [particles (U)]
//!  pass 1: [opaque (O)]   [decals (O)]
//!  pass 2: [tonemap (O)]
//!
//!  O = Ordered: executed in registration order as soon as it is ready; a
//!      layer that is not ready holds back the rest of its pass, and the
//!      next pass starts only when every Ordered layer of this one ran.
//!  U = Unordered: executed whenever it is found ready once its pass has
//!      been reached. Never holds anything back.
//! ```
//!
//! Unordered layers still unready after the last pass are skipped for the
//! frame.
//!
//! # Waiting
//!
//! Producers fill queues on other threads, so the dispatcher polls. Each
//! polling round that executes nothing counts as idle and is followed by the
//! configured [`IdleStrategy`](crate::IdleStrategy). After
//! `max_idle_rounds` idle rounds in a row, `dispatch()` returns
//! [`DispatchStatus::Stalled`]. Progress is kept, so calling `dispatch()`
//! again resumes the same frame; [`LayerDispatcher::reset_progress`]
//! abandons it.
//!
//! Layers may be added or removed between two `dispatch()` calls, including
//! while a stalled frame is pending. Layers that already ran keep their
//! executed flag, and the resumed frame restarts at the first pass that
//! still has Ordered layers to run.

use std::sync::Arc;

use stratum_core::limits::MAX_PASSES;

use crate::backend::SubmissionBackend;
use crate::layer::{Layer, LayerOrder};
use crate::resources::ResourceManager;
use crate::settings::DispatchSettings;

/// Outcome of one [`LayerDispatcher::dispatch`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchStatus {
    /// Every pass ran. Progress has been reset for the next frame.
    Complete,
    /// Gave up waiting on pass `pass`, where `pending` Ordered layers have
    /// not run yet.
    Stalled { pass: u32, pending: usize },
}

impl DispatchStatus {
    #[inline]
    #[must_use]
    pub fn is_complete(self) -> bool {
        self == Self::Complete
    }
}

#[derive(Debug, Default)]
pub struct LayerDispatcher {
    layers: Vec<Arc<Layer>>,
    /// Per-layer flag for the frame in flight.
    executed: Vec<bool>,
    /// Index of the first layer of the current pass.
    pass_start: usize,
    settings: DispatchSettings,
}

impl LayerDispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_settings(settings: DispatchSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &DispatchSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: DispatchSettings) {
        self.settings = settings;
    }

    /// Registered layers in dispatch order.
    #[inline]
    #[must_use]
    pub fn layers(&self) -> &[Arc<Layer>] {
        &self.layers
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    #[must_use]
    pub fn contains(&self, layer: &Arc<Layer>) -> bool {
        self.layers.iter().any(|l| Arc::ptr_eq(l, layer))
    }

    /// Layers already executed in the frame in flight.
    #[must_use]
    pub fn executed_count(&self) -> usize {
        self.executed.iter().filter(|&&done| done).count()
    }

    /// Registers a layer. Duplicates and passes `>= MAX_PASSES` are refused.
    pub fn add_layer(&mut self, layer: Arc<Layer>) -> bool {
        if layer.pass() >= MAX_PASSES {
            log::error!(
                "Layer '{}': pass {} exceeds the limit of {MAX_PASSES} passes",
                layer.label(),
                layer.pass()
            );
            return false;
        }
        if self.contains(&layer) {
            log::warn!("Layer '{}' is already registered", layer.label());
            return false;
        }

        log::info!("New layer '{}': pass({})", layer.label(), layer.pass());
        self.layers.push(layer);
        self.executed.push(false);
        self.validate_layers();
        true
    }

    pub fn remove_layer(&mut self, layer: &Arc<Layer>) -> bool {
        let Some(position) = self.layers.iter().position(|l| Arc::ptr_eq(l, layer)) else {
            log::error!("Tried to remove unregistered layer '{}'", layer.label());
            return false;
        };

        self.layers.remove(position);
        if position < self.executed.len() {
            self.executed.remove(position);
        }
        self.validate_layers();
        log::info!("Removed layer '{}': pass({})", layer.label(), layer.pass());
        true
    }

    /// Forgets which layers ran in the frame in flight.
    pub fn reset_progress(&mut self) {
        self.executed.clear();
        self.executed.resize(self.layers.len(), false);
        self.pass_start = 0;
    }

    /// Runs every registered layer once, in pass order.
    pub fn dispatch<B: SubmissionBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        resources: &ResourceManager,
    ) -> DispatchStatus {
        if self.executed.len() != self.layers.len() {
            self.reset_progress();
        }

        let mut idle_rounds = 0u32;
        while self.pass_start < self.layers.len() {
            let pass = self.layers[self.pass_start].pass();
            let pass_end = self.pass_start
                + self.layers[self.pass_start..].partition_point(|layer| layer.pass() == pass);
            let mut progressed = false;

            // Ordered layers of the current pass, in registration order.
            for index in self.pass_start..pass_end {
                let layer = &self.layers[index];
                if layer.order() != LayerOrder::Ordered || self.executed[index] {
                    continue;
                }
                if !layer.is_ready() {
                    break;
                }
                execute_layer(backend, resources, layer);
                self.executed[index] = true;
                progressed = true;
            }

            // Unordered layers of every pass reached so far.
            progressed |= self.sweep_unordered(backend, resources, pass_end);

            let pending = self.pending_ordered(self.pass_start, pass_end);
            if pending == 0 {
                log::debug!("Pass {pass} complete");
                self.pass_start = pass_end;
                idle_rounds = 0;
                continue;
            }

            if progressed {
                idle_rounds = 0;
                continue;
            }

            idle_rounds += 1;
            if idle_rounds >= self.settings.max_idle_rounds {
                log::warn!(
                    "Dispatch stalled on pass {pass}: {pending} ordered layer(s) not ready after {idle_rounds} idle rounds"
                );
                return DispatchStatus::Stalled { pass, pending };
            }
            self.settings.idle.idle();
        }

        self.sweep_unordered(backend, resources, self.layers.len());
        for (layer, _) in self
            .layers
            .iter()
            .zip(&self.executed)
            .filter(|(_, done)| !**done)
        {
            log::debug!("Unordered layer '{}' not ready, skipped this frame", layer.label());
        }

        self.reset_progress();
        DispatchStatus::Complete
    }

    fn sweep_unordered<B: SubmissionBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        resources: &ResourceManager,
        end: usize,
    ) -> bool {
        let mut progressed = false;
        for index in 0..end {
            let layer = &self.layers[index];
            if layer.order() == LayerOrder::Unordered && !self.executed[index] && layer.is_ready() {
                execute_layer(backend, resources, layer);
                self.executed[index] = true;
                progressed = true;
            }
        }
        progressed
    }

    /// Index of the first layer of the earliest pass that still has an
    /// Ordered layer to run, or `len()` when there is none.
    fn first_pending_pass(&self) -> usize {
        let Some(pending) = (0..self.layers.len())
            .find(|&index| self.layers[index].order() == LayerOrder::Ordered && !self.executed[index])
        else {
            return self.layers.len();
        };
        let pass = self.layers[pending].pass();
        self.layers.partition_point(|layer| layer.pass() < pass)
    }

    fn pending_ordered(&self, start: usize, end: usize) -> usize {
        (start..end)
            .filter(|&index| self.layers[index].order() == LayerOrder::Ordered && !self.executed[index])
            .count()
    }

    /// Sorts by pass, keeping registration order within a pass, and warns
    /// about passes that no Ordered layer covers. Executed flags follow
    /// their layers through the sort.
    fn validate_layers(&mut self) {
        if self.executed.len() == self.layers.len() {
            let mut entries: Vec<(Arc<Layer>, bool)> = self
                .layers
                .drain(..)
                .zip(self.executed.drain(..))
                .collect();
            entries.sort_by_key(|(layer, _)| layer.pass());
            (self.layers, self.executed) = entries.into_iter().unzip();
            self.pass_start = self.first_pending_pass();
        } else {
            self.layers.sort_by_key(|layer| layer.pass());
            self.reset_progress();
        }

        let mut covered = 0u32;
        let mut max_pass = 0;
        for layer in &self.layers {
            if layer.order() == LayerOrder::Ordered {
                covered |= 1 << layer.pass();
            }
            max_pass = max_pass.max(layer.pass());
        }

        for pass in 0..max_pass {
            if covered & (1 << pass) == 0 {
                log::warn!("Pass {pass} has no ordered layer and will be skipped");
            }
        }
    }
}

fn execute_layer<B: SubmissionBackend + ?Sized>(
    backend: &mut B,
    resources: &ResourceManager,
    layer: &Layer,
) {
    match layer {
        Layer::Render(render) => backend.execute_render(render, resources),
        Layer::Compute(compute) => backend.execute_compute(compute, resources),
        Layer::PostProcess(post) => backend.execute_post_process(post, resources),
    }
    layer.tag_executed();
    log::debug!("Executed layer '{}' (pass {})", layer.label(), layer.pass());
}
