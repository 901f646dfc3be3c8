//! Redundant bind suppression.
//!
//! Items are sorted so that neighbours tend to share a program and states.
//! The tracker remembers what is bound and reports whether a bind would
//! actually change anything; only changes count as state changes.

use stratum_core::limits::MAX_VERTEX_BUFFERS;

use crate::items::{CommonStates, ShaderProgram};
use crate::resources::{Handle, IndexBuffer, Shader, VertexBuffer};

#[derive(Debug, Default)]
pub struct StateTracker {
    current_program: Option<ShaderProgram>,
    current_compute: Option<Handle<Shader>>,
    current_states: Option<CommonStates>,
    current_vertex_buffers: [Option<Handle<VertexBuffer>>; MAX_VERTEX_BUFFERS],
    current_index_buffer: Option<Handle<IndexBuffer>>,
    state_changes: usize,
}

impl StateTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets every binding. The change counter is kept.
    pub fn invalidate(&mut self) {
        self.current_program = None;
        self.current_compute = None;
        self.current_states = None;
        self.current_vertex_buffers = [None; MAX_VERTEX_BUFFERS];
        self.current_index_buffer = None;
    }

    pub fn set_program(&mut self, program: ShaderProgram) -> bool {
        Self::track(&mut self.current_program, program, &mut self.state_changes)
    }

    pub fn set_compute_shader(&mut self, shader: Handle<Shader>) -> bool {
        Self::track(&mut self.current_compute, shader, &mut self.state_changes)
    }

    pub fn set_states(&mut self, states: CommonStates) -> bool {
        Self::track(&mut self.current_states, states, &mut self.state_changes)
    }

    pub fn set_vertex_buffer(&mut self, slot: usize, buffer: Handle<VertexBuffer>) -> bool {
        let Some(current) = self.current_vertex_buffers.get_mut(slot) else {
            log::warn!("StateTracker: vertex buffer slot {slot} out of range");
            return false;
        };
        Self::track(current, buffer, &mut self.state_changes)
    }

    pub fn set_index_buffer(&mut self, buffer: Handle<IndexBuffer>) -> bool {
        Self::track(&mut self.current_index_buffer, buffer, &mut self.state_changes)
    }

    #[inline]
    #[must_use]
    pub fn state_changes(&self) -> usize {
        self.state_changes
    }

    fn track<T: PartialEq + Copy>(current: &mut Option<T>, value: T, changes: &mut usize) -> bool {
        if *current == Some(value) {
            return false;
        }
        *current = Some(value);
        *changes += 1;
        true
    }
}
