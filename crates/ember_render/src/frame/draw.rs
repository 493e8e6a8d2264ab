//! The current-draw scratch state and committed draw calls.

use ember_core::Mat4;

use crate::limits::MAX_TEXTURE_UNITS;
use crate::resource::flags::STATE_DEFAULT;
use crate::resource::{GpuProgramId, IndexBufferId, TextureId, UniformId, VertexBufferId};

/// A texture bound to one texture unit of a draw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextureBinding {
    /// The sampler uniform the texture feeds.
    pub sampler: UniformId,
    /// The bound texture.
    pub texture: TextureId,
    /// Backend-interpreted sampling flags (filter/wrap).
    pub flags: u32,
}

/// The accumulated state of the draw currently being assembled.
///
/// The simulation thread mutates this through the `set_*` calls; `commit`
/// snapshots it into a [`DrawCall`] and resets it, so bindings never leak
/// from one draw into the next.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawState {
    /// Render state bit flags (`STATE_*`).
    pub state_flags: u64,
    /// Model (pose) matrix.
    pub pose: Mat4,
    /// Bound GPU program.
    pub program: Option<GpuProgramId>,
    /// Bound vertex buffer.
    pub vertex_buffer: Option<VertexBufferId>,
    /// Bound index buffer.
    pub index_buffer: Option<IndexBufferId>,
    /// First index to draw.
    pub index_start: u32,
    /// Number of indices to draw. `u32::MAX` means "all of them".
    pub index_count: u32,
    /// Texture units.
    pub textures: [Option<TextureBinding>; MAX_TEXTURE_UNITS],
}

impl DrawState {
    /// Restores the defaults a fresh draw starts from.
    #[inline]
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            state_flags: STATE_DEFAULT,
            pose: Mat4::IDENTITY,
            program: None,
            vertex_buffer: None,
            index_buffer: None,
            index_start: 0,
            index_count: u32::MAX,
            textures: [None; MAX_TEXTURE_UNITS],
        }
    }
}

/// One committed draw: a layer plus a snapshot of the scratch state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawCall {
    /// The layer whose state this draw inherits.
    pub layer: u8,
    /// The draw state at commit time.
    pub state: DrawState,
}
