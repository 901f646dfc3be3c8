//! Typed resource handles.
//!
//! A [`Handle`] is a bare `u32` pool index. The resource kind exists only at
//! the type level, so `Handle<Surface>` and `Handle<Shader>` cannot be mixed
//! up at compile time but cost the same as an integer at runtime.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Opaque reference to a pooled resource record of kind `R`.
pub struct Handle<R> {
    index: u32,
    _kind: PhantomData<fn() -> R>,
}

impl<R> Handle<R> {
    /// Sentinel returned by failed creations.
    pub const INVALID: Self = Self::from_raw(u32::MAX);

    #[inline]
    #[must_use]
    pub const fn from_raw(index: u32) -> Self {
        Self {
            index,
            _kind: PhantomData,
        }
    }

    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.index
    }

    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.index as usize
    }

    /// `false` only for [`Handle::INVALID`]. A valid-looking handle may still
    /// be stale; liveness is checked by the resource manager.
    #[inline]
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.index != u32::MAX
    }
}

impl<R> Default for Handle<R> {
    fn default() -> Self {
        Self::INVALID
    }
}

impl<R> Clone for Handle<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for Handle<R> {}

impl<R> PartialEq for Handle<R> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<R> Eq for Handle<R> {}

impl<R> Hash for Handle<R> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl<R> fmt::Debug for Handle<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = std::any::type_name::<R>().rsplit("::").next().unwrap_or("?");
        if self.is_valid() {
            write!(f, "Handle<{kind}>({})", self.index)
        } else {
            write!(f, "Handle<{kind}>(INVALID)")
        }
    }
}
