//! The per-frame handoff unit: streams + layers + draws.

use ember_core::{Color4, Mat4, Rect, StreamWriter};

use crate::frame::{DrawCall, DrawState, LayerState, TextureBinding};
use crate::limits::{MAX_LAYERS, MAX_TEXTURE_UNITS};
use crate::protocol::{finish_constants, write_constant, Command};
use crate::resource::{
    GpuProgramId, IndexBufferId, RenderTargetId, TextureId, UniformId, UniformType, VertexBufferId,
};

/// Everything one in-flight frame carries across the thread boundary.
///
/// The context is allocated once, boxed, and then rotated between the two
/// threads for the renderer's whole lifetime. `reset()` puts it back into
/// the freshly-constructed state without releasing a single allocation.
pub struct FrameContext {
    /// Encoded command records, terminated by `End` once finished.
    commands: StreamWriter,
    /// Encoded constant records, terminated by the `End` tag once finished.
    constants: StreamWriter,
    /// Per-layer render state, applied immediately (not streamed).
    layers: [LayerState; MAX_LAYERS],
    /// The draw currently being assembled.
    current: DrawState,
    /// Draws committed this frame, in submission order.
    draws: Vec<DrawCall>,
}

impl FrameContext {
    /// Creates a context with all frame storage reserved up front.
    #[must_use]
    pub fn new(
        command_capacity: usize,
        constant_capacity: usize,
        draw_capacity: usize,
    ) -> Self {
        Self {
            commands: StreamWriter::with_capacity(command_capacity),
            constants: StreamWriter::with_capacity(constant_capacity),
            layers: [LayerState::default(); MAX_LAYERS],
            current: DrawState::default(),
            draws: Vec::with_capacity(draw_capacity),
        }
    }

    // =========================================================================
    // COMMAND RECORDING (producer side)
    // =========================================================================

    /// Appends a command record to this frame's command stream.
    pub fn record(&mut self, command: &Command<'_>) {
        command.encode(&mut self.commands);
    }

    /// Closes both streams for transmission: exactly one `End` command and
    /// the constant sentinel. Called once per frame, at the handoff.
    pub fn finish(&mut self) {
        self.record(&Command::End);
        finish_constants(&mut self.constants);
    }

    // =========================================================================
    // DRAW STATE (producer side)
    // =========================================================================

    /// Sets the render state flags for the current draw.
    #[inline]
    pub fn set_state(&mut self, flags: u64) {
        self.current.state_flags = flags;
    }

    /// Sets the pose (model matrix) for the current draw.
    #[inline]
    pub fn set_pose(&mut self, pose: Mat4) {
        self.current.pose = pose;
    }

    /// Binds a GPU program to the current draw.
    #[inline]
    pub fn set_program(&mut self, id: GpuProgramId) {
        self.current.program = Some(id);
    }

    /// Binds a vertex buffer to the current draw.
    #[inline]
    pub fn set_vertex_buffer(&mut self, id: VertexBufferId) {
        self.current.vertex_buffer = Some(id);
    }

    /// Binds an index buffer to the current draw, drawing `count` indices
    /// starting at `start` (`u32::MAX` count means all).
    #[inline]
    pub fn set_index_buffer(&mut self, id: IndexBufferId, start: u32, count: u32) {
        self.current.index_buffer = Some(id);
        self.current.index_start = start;
        self.current.index_count = count;
    }

    /// Appends a uniform update for this frame.
    ///
    /// `data` must be exactly `ty.element_size() * num` bytes as declared
    /// at creation time - a producer contract the stream does not check.
    pub fn set_uniform(&mut self, id: UniformId, ty: UniformType, data: &[u8]) {
        write_constant(&mut self.constants, id, ty, data);
    }

    /// Binds `texture` to texture unit `unit`, feeding `sampler`.
    ///
    /// # Panics
    ///
    /// Panics if `unit` is not below [`MAX_TEXTURE_UNITS`].
    pub fn set_texture(&mut self, unit: u8, sampler: UniformId, texture: TextureId, flags: u32) {
        let slot = usize::from(unit);
        assert!(
            slot < MAX_TEXTURE_UNITS,
            "Texture unit {unit} out of range (max {MAX_TEXTURE_UNITS})"
        );

        self.current.textures[slot] = Some(TextureBinding {
            sampler,
            texture,
            flags,
        });
    }

    /// Commits the current draw against `layer` and resets the scratch
    /// state for the next draw.
    ///
    /// # Panics
    ///
    /// Panics if `layer` is not below [`MAX_LAYERS`].
    pub fn commit(&mut self, layer: u8) {
        assert!(
            usize::from(layer) < MAX_LAYERS,
            "Layer index {layer} out of range (max {MAX_LAYERS})"
        );

        self.draws.push(DrawCall {
            layer,
            state: self.current,
        });
        self.current.reset();
    }

    // =========================================================================
    // LAYER STATE (producer side, applied immediately)
    // =========================================================================

    /// Routes `layer` into an offscreen render target.
    pub fn set_layer_render_target(&mut self, layer: u8, id: RenderTargetId) {
        self.layer_mut(layer).render_target = Some(id);
    }

    /// Sets the clear behavior of `layer`.
    pub fn set_layer_clear(&mut self, layer: u8, flags: u8, color: Color4, depth: f32) {
        let state = self.layer_mut(layer);
        state.clear_flags = flags;
        state.clear_color = color;
        state.clear_depth = depth;
    }

    /// Sets the view matrix of `layer`.
    pub fn set_layer_view(&mut self, layer: u8, view: Mat4) {
        self.layer_mut(layer).view = view;
    }

    /// Sets the projection matrix of `layer`.
    pub fn set_layer_projection(&mut self, layer: u8, projection: Mat4) {
        self.layer_mut(layer).projection = projection;
    }

    /// Sets the viewport rectangle of `layer`.
    pub fn set_layer_viewport(&mut self, layer: u8, viewport: Rect) {
        self.layer_mut(layer).viewport = viewport;
    }

    /// Sets the scissor rectangle of `layer`.
    pub fn set_layer_scissor(&mut self, layer: u8, scissor: Rect) {
        self.layer_mut(layer).scissor = scissor;
    }

    fn layer_mut(&mut self, layer: u8) -> &mut LayerState {
        assert!(
            usize::from(layer) < MAX_LAYERS,
            "Layer index {layer} out of range (max {MAX_LAYERS})"
        );
        &mut self.layers[usize::from(layer)]
    }

    // =========================================================================
    // CONSUMPTION (render-thread side)
    // =========================================================================

    /// The encoded command stream.
    #[inline]
    #[must_use]
    pub fn command_bytes(&self) -> &[u8] {
        self.commands.as_slice()
    }

    /// The encoded constant stream.
    #[inline]
    #[must_use]
    pub fn constant_bytes(&self) -> &[u8] {
        self.constants.as_slice()
    }

    /// The per-layer render state table.
    #[inline]
    #[must_use]
    pub fn layers(&self) -> &[LayerState] {
        &self.layers
    }

    /// The draws committed this frame, in submission order.
    #[inline]
    #[must_use]
    pub fn draw_calls(&self) -> &[DrawCall] {
        &self.draws
    }

    /// Returns true if no commands, constants, or draws are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty() && self.constants.is_empty() && self.draws.is_empty()
    }

    /// Puts the context back into the freshly-constructed state, retaining
    /// every allocation. Called on the render thread after execution.
    pub fn reset(&mut self) {
        self.commands.clear();
        self.constants.clear();
        self.draws.clear();
        self.current.reset();
        self.layers = [LayerState::default(); MAX_LAYERS];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::flags::{CLEAR_COLOR, CLEAR_DEPTH};
    use ember_core::{RawHandle, StreamReader};

    fn context() -> FrameContext {
        FrameContext::new(1024, 1024, 64)
    }

    #[test]
    fn test_commit_snapshots_and_resets() {
        let mut ctx = context();
        let program = GpuProgramId::from_raw(RawHandle::new(0, 0));

        ctx.set_program(program);
        ctx.set_state(0);
        ctx.commit(5);

        // The snapshot carries the bindings...
        let draws = ctx.draw_calls();
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].layer, 5);
        assert_eq!(draws[0].state.program, Some(program));
        assert_eq!(draws[0].state.state_flags, 0);

        // ...and the scratch state is back to defaults.
        ctx.commit(5);
        assert_eq!(ctx.draw_calls()[1].state, DrawState::default());
    }

    #[test]
    fn test_layer_setters_apply_immediately() {
        let mut ctx = context();

        ctx.set_layer_clear(2, CLEAR_COLOR | CLEAR_DEPTH, Color4::WHITE, 0.0);
        ctx.set_layer_viewport(2, Rect::new(0, 0, 1280, 720));

        let layer = &ctx.layers()[2];
        assert_eq!(layer.clear_flags, CLEAR_COLOR | CLEAR_DEPTH);
        assert_eq!(layer.clear_color, Color4::WHITE);
        assert_eq!(layer.viewport, Rect::new(0, 0, 1280, 720));

        // Nothing was streamed.
        assert!(ctx.command_bytes().is_empty());
    }

    #[test]
    fn test_finish_terminates_both_streams() {
        let mut ctx = context();
        ctx.finish();

        let mut commands = StreamReader::new(ctx.command_bytes());
        assert_eq!(Command::decode(&mut commands), Command::End);
        assert_eq!(commands.remaining(), 0);

        assert_eq!(ctx.constant_bytes(), &[UniformType::End as u8]);
    }

    #[test]
    fn test_reset_equals_fresh() {
        let mut ctx = context();
        ctx.set_uniform(
            UniformId::from_raw(RawHandle::new(0, 0)),
            UniformType::Float1,
            &4.0f32.to_le_bytes(),
        );
        ctx.set_layer_view(0, Mat4::from_cols_array([2.0; 16]));
        ctx.commit(0);
        ctx.finish();

        ctx.reset();

        assert!(ctx.is_empty());
        assert_eq!(ctx.layers()[0], LayerState::default());
        assert!(ctx.command_bytes().is_empty());
        assert!(ctx.constant_bytes().is_empty());
    }

    #[test]
    #[should_panic(expected = "Texture unit 8 out of range")]
    fn test_texture_unit_bounds() {
        let mut ctx = context();
        ctx.set_texture(
            8,
            UniformId::from_raw(RawHandle::new(0, 0)),
            TextureId::from_raw(RawHandle::new(0, 0)),
            0,
        );
    }

    #[test]
    #[should_panic(expected = "Layer index 64 out of range")]
    fn test_layer_bounds() {
        let mut ctx = context();
        ctx.set_layer_view(64, Mat4::IDENTITY);
    }

    #[test]
    #[should_panic(expected = "Layer index 64 out of range")]
    fn test_commit_layer_bounds() {
        let mut ctx = context();
        ctx.commit(64);
    }
}
