//! Constant Buffer Cache
//!
//! Constant data attached to items is not given a buffer of its own.
//! Instead it is copied into one of a fixed set of preallocated buffers,
//! indexed by binding slot and by size class:
//!
//! ```text
//!            16 B   32 B   64 B   ...   128 KiB
//!  slot 0   [cb00] [cb01] [cb02]  ...   [cb0D]
//!  slot 1   [cb10] [cb11] [cb12]  ...   [cb1D]
//!   ...
//!  slot 5   [cb50] [cb51] [cb52]  ...   [cb5D]
//! ```
//!
//! A request for `n` bytes picks the smallest class that holds `n`. Each
//! buffer keeps a copy of its last contents and skips identical uploads.
//! The hash only short-cuts the comparison; the bytes decide.

use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;
use stratum_core::collections::Grid;
use stratum_core::limits::{MAX_CONSTANT_BUFFERS, MAX_CONSTANT_BUFFER_SIZE, MIN_CONSTANT_BUFFER_SIZE};

use crate::backend::ResourceBackend;
use crate::errors::{RenderError, Result};
use crate::resources::{ConstantBuffer, ConstantBufferDesc, Handle, ResourceManager};

/// Number of power-of-two classes between the smallest and largest buffer.
pub const SIZE_CLASSES: usize =
    (MAX_CONSTANT_BUFFER_SIZE.trailing_zeros() - MIN_CONSTANT_BUFFER_SIZE.trailing_zeros() + 1) as usize;

/// Size class holding `size` bytes, or `None` if no class is large enough.
#[must_use]
pub fn size_class(size: usize) -> Option<usize> {
    if size == 0 || size > MAX_CONSTANT_BUFFER_SIZE {
        return None;
    }
    let rounded = size.max(MIN_CONSTANT_BUFFER_SIZE).next_power_of_two();
    Some((rounded.trailing_zeros() - MIN_CONSTANT_BUFFER_SIZE.trailing_zeros()) as usize)
}

#[derive(Debug, Clone, Default)]
pub struct CachedConstantBuffer {
    handle: Handle<ConstantBuffer>,
    size: usize,
    last_upload: Option<u64>,
    contents: Vec<u8>,
}

impl CachedConstantBuffer {
    #[inline]
    #[must_use]
    pub fn handle(&self) -> Handle<ConstantBuffer> {
        self.handle
    }

    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Forces the next upload through.
    pub fn invalidate(&mut self) {
        self.last_upload = None;
        self.contents.clear();
    }

    fn holds(&self, hash: u64, data: &[u8]) -> bool {
        self.last_upload == Some(hash) && self.contents == data
    }
}

#[derive(Debug)]
pub struct ConstantBufferCache {
    buffers: Grid<CachedConstantBuffer>,
    loaded: bool,
}

impl Default for ConstantBufferCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstantBufferCache {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffers: Grid::new(MAX_CONSTANT_BUFFERS, SIZE_CLASSES),
            loaded: false,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Creates every buffer. On failure the ones already created are
    /// destroyed again.
    pub fn load<B: ResourceBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        resources: &mut ResourceManager,
    ) -> Result<()> {
        if self.loaded {
            log::warn!("ConstantBufferCache::load() called twice");
            return Ok(());
        }

        for slot in 0..MAX_CONSTANT_BUFFERS {
            for class in 0..SIZE_CLASSES {
                let size = MIN_CONSTANT_BUFFER_SIZE << class;
                let handle = resources.create::<ConstantBuffer, B>(
                    backend,
                    &format!("cbuffer[{slot}][{size}]"),
                    ConstantBufferDesc { size: size as u32 },
                );
                if !handle.is_valid() {
                    self.unload(backend, resources);
                    return Err(RenderError::ConstantBufferCache { slot, size });
                }
                if let Some(entry) = self.buffers.get_mut(slot, class) {
                    *entry = CachedConstantBuffer {
                        handle,
                        size,
                        last_upload: None,
                        contents: Vec::new(),
                    };
                }
            }
        }

        self.loaded = true;
        log::debug!("Loaded {} cached constant buffers", MAX_CONSTANT_BUFFERS * SIZE_CLASSES);
        Ok(())
    }

    /// Destroys every buffer created by `load()`.
    pub fn unload<B: ResourceBackend + ?Sized>(&mut self, backend: &mut B, resources: &mut ResourceManager) {
        for entry in self.buffers.iter_mut() {
            if entry.handle.is_valid() {
                resources.destroy(backend, entry.handle);
            }
            *entry = CachedConstantBuffer::default();
        }
        self.loaded = false;
    }

    /// Smallest buffer of `slot` that holds `size` bytes.
    pub fn get(&mut self, slot: usize, size: usize) -> Option<&mut CachedConstantBuffer> {
        if !self.loaded {
            log::error!("ConstantBufferCache::get() before load()");
            return None;
        }
        if slot >= MAX_CONSTANT_BUFFERS {
            log::error!("Constant buffer slot {slot} out of range (max {MAX_CONSTANT_BUFFERS})");
            return None;
        }
        let Some(class) = size_class(size) else {
            log::error!("Constant buffer size {size} outside 1..={MAX_CONSTANT_BUFFER_SIZE}");
            return None;
        };
        self.buffers.get_mut(slot, class)
    }

    /// Copies `data` into the buffer chosen for `slot`. Returns `true` when
    /// the buffer holds `data` afterwards, whether or not an upload was
    /// needed.
    pub fn upload<B: ResourceBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        resources: &ResourceManager,
        slot: usize,
        data: &[u8],
    ) -> bool {
        let Some(entry) = self.get(slot, data.len()) else {
            return false;
        };

        let hash = content_hash(data);
        if entry.holds(hash, data) {
            return true;
        }

        let Some(native) = resources.native(entry.handle) else {
            log::error!("Cached constant buffer {:?} is no longer live", entry.handle);
            return false;
        };
        match backend.upload(native, data) {
            Ok(()) => {
                entry.last_upload = Some(hash);
                entry.contents.clear();
                entry.contents.extend_from_slice(data);
                true
            }
            Err(err) => {
                log::error!("Constant buffer upload failed: {err}");
                false
            }
        }
    }
}

fn content_hash(data: &[u8]) -> u64 {
    let mut hasher = FxHasher::default();
    data.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::HeadlessBackend;

    #[test]
    fn test_size_classes() {
        assert_eq!(SIZE_CLASSES, 14);
        assert_eq!(size_class(1), Some(0));
        assert_eq!(size_class(16), Some(0));
        assert_eq!(size_class(17), Some(1));
        assert_eq!(size_class(64), Some(2));
        assert_eq!(size_class(MAX_CONSTANT_BUFFER_SIZE), Some(SIZE_CLASSES - 1));
        assert_eq!(size_class(0), None);
        assert_eq!(size_class(MAX_CONSTANT_BUFFER_SIZE + 1), None);
    }

    #[test]
    fn test_load_get_unload() {
        let mut backend = HeadlessBackend::new();
        let mut resources = ResourceManager::default();
        let mut cache = ConstantBufferCache::new();

        assert!(cache.get(0, 16).is_none());
        cache.load(&mut backend, &mut resources).unwrap();
        assert_eq!(resources.count::<ConstantBuffer>(), MAX_CONSTANT_BUFFERS * SIZE_CLASSES);

        assert_eq!(cache.get(2, 48).map(|entry| entry.size()), Some(64));
        assert!(cache.get(MAX_CONSTANT_BUFFERS, 16).is_none());
        assert!(cache.get(0, 0).is_none());

        cache.unload(&mut backend, &mut resources);
        assert_eq!(resources.count::<ConstantBuffer>(), 0);
        assert_eq!(backend.live_objects(), 0);
    }

    #[test]
    fn test_identical_upload_is_skipped() {
        let mut backend = HeadlessBackend::new();
        let mut resources = ResourceManager::default();
        let mut cache = ConstantBufferCache::new();
        cache.load(&mut backend, &mut resources).unwrap();

        let data = [1u8; 32];
        assert!(cache.upload(&mut backend, &resources, 0, &data));
        assert!(cache.upload(&mut backend, &resources, 0, &data));
        assert!(cache.upload(&mut backend, &resources, 0, &[2u8; 32]));

        let handle = cache.get(0, 32).unwrap().handle();
        let native = resources.native(handle).unwrap();
        assert_eq!(backend.upload_count(native), Some(2));
        assert_eq!(backend.object_data(native), Some(&[2u8; 32][..]));
    }

    #[test]
    fn test_matching_hash_with_different_bytes_still_uploads() {
        let mut backend = HeadlessBackend::new();
        let mut resources = ResourceManager::default();
        let mut cache = ConstantBufferCache::new();
        cache.load(&mut backend, &mut resources).unwrap();

        let old = [3u8; 64];
        let new = [4u8; 64];
        assert!(cache.upload(&mut backend, &resources, 1, &old));

        // Colliding digest: the stored hash already matches `new`.
        let entry = cache.get(1, 64).unwrap();
        entry.last_upload = Some(content_hash(&new));
        let handle = entry.handle();

        assert!(cache.upload(&mut backend, &resources, 1, &new));
        let native = resources.native(handle).unwrap();
        assert_eq!(backend.upload_count(native), Some(2));
        assert_eq!(backend.object_data(native), Some(&new[..]));
    }

    #[test]
    fn test_invalidate_forces_upload() {
        let mut backend = HeadlessBackend::new();
        let mut resources = ResourceManager::default();
        let mut cache = ConstantBufferCache::new();
        cache.load(&mut backend, &mut resources).unwrap();

        let data = [9u8; 16];
        assert!(cache.upload(&mut backend, &resources, 0, &data));
        cache.get(0, 16).unwrap().invalidate();
        assert!(cache.upload(&mut backend, &resources, 0, &data));

        let handle = cache.get(0, 16).unwrap().handle();
        let native = resources.native(handle).unwrap();
        assert_eq!(backend.upload_count(native), Some(2));
    }
}
