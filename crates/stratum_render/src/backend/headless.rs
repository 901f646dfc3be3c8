//! In-memory backend.
//!
//! Creates no GPU objects. Native objects are byte buffers in a
//! [`PagedPool`], and every executed layer is appended to an execution log
//! together with the number of draws, dispatches and state changes it
//! produced. Tests read the log to check dispatch order; the demo reads
//! [`FrameStats`].

use stratum_core::memory::{LinearArena, PagedKey, PagedPool};

use super::state_tracker::StateTracker;
use super::{Backend, NativeId, ResourceBackend, SubmissionBackend};
use crate::errors::BackendError;
use crate::items::{DrawCall, ShaderProgram};
use crate::layer::{ComputeLayer, LayerDesc, LayerType, PostProcessLayer, RenderLayer};
use crate::resources::{ResourceDesc, ResourceKind, ResourceManager};

#[derive(Debug)]
struct NativeObject {
    kind: ResourceKind,
    size: usize,
    data: Vec<u8>,
    uploads: usize,
}

/// One layer execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRecord {
    pub label: String,
    pub pass: u32,
    pub layer_type: LayerType,
    pub draws: usize,
    pub dispatches: usize,
    pub state_changes: usize,
}

/// Counters since the last [`HeadlessBackend::begin_frame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    pub layers: usize,
    pub draw_calls: usize,
    pub dispatches: usize,
    pub post_process_passes: usize,
    pub state_changes: usize,
    pub uploads: usize,
}

/// A draw as it would be encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrawCommand {
    pub queue: usize,
    pub key: u64,
    pub elements: u32,
    pub instances: u32,
    pub indexed: bool,
}

impl DrawCommand {
    fn encode(queue: usize, key: u64, draw: &DrawCall) -> Self {
        let (elements, instances, indexed) = match *draw {
            DrawCall::Default { vertex_count, .. } => (vertex_count, 1, false),
            DrawCall::Indexed { index_count, .. } => (index_count, 1, true),
            DrawCall::Instanced {
                vertex_count,
                instance_count,
                ..
            } => (vertex_count, instance_count, false),
            DrawCall::IndexedInstanced {
                index_count,
                instance_count,
                ..
            } => (index_count, instance_count, true),
        };
        Self {
            queue,
            key,
            elements,
            instances,
            indexed,
        }
    }
}

#[derive(Debug, Default)]
pub struct HeadlessBackend {
    objects: PagedPool<NativeObject>,
    initialized: bool,
    log: Vec<ExecutionRecord>,
    stats: FrameStats,
    commands: LinearArena<DrawCommand>,
    tracker: StateTracker,
}

impl HeadlessBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the execution log, the counters and the recorded commands.
    pub fn begin_frame(&mut self) {
        self.log.clear();
        self.stats = FrameStats::default();
        self.commands.reset();
        self.tracker.invalidate();
    }

    /// Labels of the executed layers, in execution order.
    #[must_use]
    pub fn execution_order(&self) -> Vec<String> {
        self.log.iter().map(|record| record.label.clone()).collect()
    }

    #[must_use]
    pub fn log(&self) -> &[ExecutionRecord] {
        &self.log
    }

    pub fn take_log(&mut self) -> Vec<ExecutionRecord> {
        std::mem::take(&mut self.log)
    }

    #[inline]
    #[must_use]
    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// Draws encoded since the last `begin_frame()`.
    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        self.commands.as_slice()
    }

    #[must_use]
    pub fn live_objects(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn object_data(&self, native: NativeId) -> Option<&[u8]> {
        self.objects
            .try_get(PagedKey::from_bits(native.0))
            .map(|object| object.data.as_slice())
    }

    #[must_use]
    pub fn upload_count(&self, native: NativeId) -> Option<usize> {
        self.objects
            .try_get(PagedKey::from_bits(native.0))
            .map(|object| object.uploads)
    }

    fn record(&mut self, desc: &LayerDesc, layer_type: LayerType, draws: usize, dispatches: usize, changes: usize) {
        self.stats.layers += 1;
        self.stats.state_changes += changes;
        self.log.push(ExecutionRecord {
            label: desc.label.clone(),
            pass: desc.pass,
            layer_type,
            draws,
            dispatches,
            state_changes: changes,
        });
    }
}

impl ResourceBackend for HeadlessBackend {
    fn create_resource(&mut self, desc: ResourceDesc<'_>) -> Result<NativeId, BackendError> {
        desc.validate()?;
        let key = self.objects.allocate(NativeObject {
            kind: desc.kind(),
            size: desc.byte_size(),
            data: Vec::new(),
            uploads: 0,
        });
        Ok(NativeId(key.to_bits()))
    }

    fn destroy_resource(&mut self, kind: ResourceKind, native: NativeId) {
        let key = PagedKey::from_bits(native.0);
        match self.objects.try_get(key) {
            Some(object) if object.kind == kind => {
                self.objects.deallocate(key);
            }
            Some(object) => {
                log::error!(
                    "HeadlessBackend: destroy of {native:?} as {kind:?}, but it is a {:?}",
                    object.kind
                );
            }
            None => log::error!("HeadlessBackend: destroy of unknown {native:?}"),
        }
    }

    fn upload(&mut self, native: NativeId, data: &[u8]) -> Result<(), BackendError> {
        let object = self
            .objects
            .try_get_mut(PagedKey::from_bits(native.0))
            .ok_or(BackendError::UnknownObject(native))?;
        if data.len() > object.size {
            return Err(BackendError::UploadTooLarge {
                len: data.len(),
                size: object.size,
            });
        }
        object.data.clear();
        object.data.extend_from_slice(data);
        object.uploads += 1;
        self.stats.uploads += 1;
        Ok(())
    }
}

impl SubmissionBackend for HeadlessBackend {
    fn execute_render(&mut self, layer: &RenderLayer, resources: &ResourceManager) {
        let changes_before = self.tracker.state_changes();
        let mut draws = 0;

        layer.for_each_queue(|queue_index, queue| {
            for item in queue.iter_sorted() {
                if resources.try_get(item.program.vertex).is_none() {
                    log::warn!(
                        "Layer '{}': skipping draw without a live vertex shader ({:?})",
                        layer.desc().label,
                        item.program.vertex
                    );
                    continue;
                }

                self.tracker.set_program(item.program);
                self.tracker.set_states(item.states);
                for (slot, &buffer) in item.vertex_buffers.iter().enumerate() {
                    if buffer.is_valid() {
                        self.tracker.set_vertex_buffer(slot, buffer);
                    }
                }
                if item.draw.is_indexed() {
                    self.tracker.set_index_buffer(item.index_buffer);
                }

                self.commands
                    .append(DrawCommand::encode(queue_index, item.key.bits(), &item.draw));
                draws += 1;
            }
        });

        self.stats.draw_calls += draws;
        let changes = self.tracker.state_changes() - changes_before;
        self.record(layer.desc(), LayerType::Render, draws, 0, changes);
    }

    fn execute_compute(&mut self, layer: &ComputeLayer, resources: &ResourceManager) {
        let changes_before = self.tracker.state_changes();
        let mut dispatches = 0;

        {
            let queue = layer.queue();
            for item in queue.iter_sorted() {
                if resources.try_get(item.shader).is_none() {
                    log::warn!(
                        "Layer '{}': skipping dispatch without a live compute shader",
                        layer.desc().label
                    );
                    continue;
                }
                self.tracker.set_compute_shader(item.shader);
                dispatches += 1;
            }
        }

        self.stats.dispatches += dispatches;
        let changes = self.tracker.state_changes() - changes_before;
        self.record(layer.desc(), LayerType::Compute, 0, dispatches, changes);
    }

    fn execute_post_process(&mut self, layer: &PostProcessLayer, _resources: &ResourceManager) {
        let changes_before = self.tracker.state_changes();
        let passes = {
            let items = layer.items();
            for item in items.iter() {
                self.tracker.set_program(ShaderProgram {
                    pixel: item.pixel_shader,
                    ..Default::default()
                });
            }
            items.len()
        };

        self.stats.post_process_passes += passes;
        let changes = self.tracker.state_changes() - changes_before;
        self.record(layer.desc(), LayerType::PostProcess, passes, 0, changes);
    }
}

impl Backend for HeadlessBackend {
    fn name(&self) -> &str {
        "headless"
    }

    fn init(&mut self) -> Result<(), BackendError> {
        if self.initialized {
            return Err(BackendError::InitFailed("headless backend already initialized".into()));
        }
        self.initialized = true;
        log::info!("Headless backend initialized");
        Ok(())
    }

    fn shutdown(&mut self) {
        if !self.objects.is_empty() {
            log::warn!("Headless backend shut down with {} live objects", self.objects.len());
        }
        self.objects.clear();
        self.initialized = false;
        log::info!("Headless backend shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::{ConstantBufferDesc, SurfaceDesc};

    #[test]
    fn test_invalid_descriptor_is_rejected() {
        let mut backend = HeadlessBackend::new();
        let empty = SurfaceDesc::default();
        let err = backend.create_resource(ResourceDesc::Surface(&empty)).unwrap_err();
        assert!(matches!(err, BackendError::InvalidDescriptor { kind: ResourceKind::Surface, .. }));
        assert_eq!(backend.live_objects(), 0);
    }

    #[test]
    fn test_upload_is_bounded_by_object_size() {
        let mut backend = HeadlessBackend::new();
        let desc = ConstantBufferDesc { size: 16 };
        let native = backend.create_resource(ResourceDesc::ConstantBuffer(&desc)).unwrap();

        backend.upload(native, &[7; 16]).unwrap();
        assert_eq!(backend.object_data(native), Some(&[7u8; 16][..]));
        assert_eq!(
            backend.upload(native, &[0; 32]),
            Err(BackendError::UploadTooLarge { len: 32, size: 16 })
        );

        backend.destroy_resource(ResourceKind::ConstantBuffer, native);
        assert_eq!(backend.upload(native, &[0; 4]), Err(BackendError::UnknownObject(native)));
    }

    #[test]
    fn test_destroy_with_wrong_kind_keeps_object() {
        let mut backend = HeadlessBackend::new();
        let desc = ConstantBufferDesc { size: 32 };
        let native = backend.create_resource(ResourceDesc::ConstantBuffer(&desc)).unwrap();
        backend.destroy_resource(ResourceKind::Surface, native);
        assert_eq!(backend.live_objects(), 1);
    }
}
