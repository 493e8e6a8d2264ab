//! # The Backend Collaborator Interface
//!
//! The command queue does not talk to any graphics API itself. It replays
//! every decoded command into a [`RenderBackend`] - the trait an external
//! graphics binding implements - strictly on the render thread.
//!
//! Backend failures (a driver refusing to create a resource, a lost
//! device) are the binding's own invariant violations: this core performs
//! no retries, no backoff, and no partial rollback.

use crate::frame::{DrawCall, FrameContext, LayerState};
use crate::resource::{
    GpuProgramId, IndexBufferId, PixelFormat, ShaderId, ShaderType, TextureId, UniformId,
    UniformType, VertexBufferId, VertexFormat,
};

/// Read-only view of an executed frame, handed to
/// [`RenderBackend::render`] once all commands and constants for the
/// frame have been applied.
#[derive(Clone, Copy)]
pub struct FrameView<'a> {
    /// The per-layer render state table.
    pub layers: &'a [LayerState],
    /// The frame's committed draws, in submission order.
    pub draws: &'a [DrawCall],
}

impl<'a> FrameView<'a> {
    /// Builds the view over an executed frame context.
    #[must_use]
    pub fn new(context: &'a FrameContext) -> Self {
        Self {
            layers: context.layers(),
            draws: context.draw_calls(),
        }
    }
}

/// The operations a graphics binding implements, one per command opcode
/// plus the frame lifecycle.
///
/// Every method is invoked on the render thread only. Ids arrive already
/// allocated and validated by the simulation thread; the binding maps
/// them to its own objects.
pub trait RenderBackend: Send {
    /// Creates the backend device. First call the backend ever receives.
    fn init(&mut self);

    /// Destroys the backend device. Last call the backend ever receives.
    fn shutdown(&mut self);

    /// Draws the frame: applies each layer's clear/view/projection/
    /// viewport/scissor state and submits the committed draws, then
    /// presents. Invoked once per frame, after commands and constants.
    fn render(&mut self, frame: &FrameView<'_>);

    /// Creates a static vertex buffer from `data`.
    fn create_vertex_buffer(
        &mut self,
        id: VertexBufferId,
        count: u32,
        format: VertexFormat,
        data: &[u8],
    );

    /// Allocates storage for a dynamic vertex buffer.
    fn create_dynamic_vertex_buffer(&mut self, id: VertexBufferId, count: u32, format: VertexFormat);

    /// Overwrites `count` vertices of `id` starting at `offset`.
    fn update_vertex_buffer(&mut self, id: VertexBufferId, offset: u32, count: u32, data: &[u8]);

    /// Destroys a vertex buffer.
    fn destroy_vertex_buffer(&mut self, id: VertexBufferId);

    /// Creates a static index buffer from `data`.
    fn create_index_buffer(&mut self, id: IndexBufferId, count: u32, data: &[u8]);

    /// Allocates storage for a dynamic index buffer.
    fn create_dynamic_index_buffer(&mut self, id: IndexBufferId, count: u32);

    /// Overwrites `count` indices of `id` starting at `offset`.
    fn update_index_buffer(&mut self, id: IndexBufferId, offset: u32, count: u32, data: &[u8]);

    /// Destroys an index buffer.
    fn destroy_index_buffer(&mut self, id: IndexBufferId);

    /// Creates a texture from `data`.
    fn create_texture(&mut self, id: TextureId, width: u32, height: u32, format: PixelFormat, data: &[u8]);

    /// Overwrites the `(x, y, width, height)` region of texture `id`.
    fn update_texture(&mut self, id: TextureId, x: u32, y: u32, width: u32, height: u32, data: &[u8]);

    /// Destroys a texture.
    fn destroy_texture(&mut self, id: TextureId);

    /// Creates a shader from an opaque source blob (text or bytecode;
    /// the resource loader that produced it decides).
    fn create_shader(&mut self, id: ShaderId, ty: ShaderType, source: &[u8]);

    /// Destroys a shader.
    fn destroy_shader(&mut self, id: ShaderId);

    /// Links a GPU program from a vertex and a fragment shader.
    fn create_gpu_program(&mut self, id: GpuProgramId, vertex: ShaderId, fragment: ShaderId);

    /// Destroys a GPU program.
    fn destroy_gpu_program(&mut self, id: GpuProgramId);

    /// Declares a named uniform with `num` elements of `ty`.
    fn create_uniform(&mut self, id: UniformId, name: &str, ty: UniformType, num: u8);

    /// Applies a decoded uniform update.
    fn update_uniform(&mut self, id: UniformId, ty: UniformType, data: &[u8]);

    /// Destroys a uniform.
    fn destroy_uniform(&mut self, id: UniformId);
}
