//! Per-layer render state.

use ember_core::{Color4, Mat4, Rect};

use crate::resource::flags::CLEAR_NONE;
use crate::resource::RenderTargetId;

/// Render state for one layer.
///
/// Layer state is not streamed: the per-layer setters on the submit
/// context mutate this table directly, and the backend reads the table of
/// the frame being drawn during its render pass. Draw calls are committed
/// against a layer and inherit this state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayerState {
    /// Offscreen target for this layer, or `None` for the default target.
    pub render_target: Option<RenderTargetId>,
    /// Which attachments to clear before the layer's first draw.
    pub clear_flags: u8,
    /// Clear color, if `CLEAR_COLOR` is set.
    pub clear_color: Color4,
    /// Clear depth, if `CLEAR_DEPTH` is set.
    pub clear_depth: f32,
    /// View matrix.
    pub view: Mat4,
    /// Projection matrix.
    pub projection: Mat4,
    /// Viewport rectangle. Zero means "full target extent".
    pub viewport: Rect,
    /// Scissor rectangle. Zero means "no scissor".
    pub scissor: Rect,
}

impl Default for LayerState {
    fn default() -> Self {
        Self {
            render_target: None,
            clear_flags: CLEAR_NONE,
            clear_color: Color4::BLACK,
            clear_depth: 1.0,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            viewport: Rect::ZERO,
            scissor: Rect::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layer_draws_everything() {
        let layer = LayerState::default();
        assert_eq!(layer.clear_flags, CLEAR_NONE);
        assert_eq!(layer.view, Mat4::IDENTITY);
        assert_eq!(layer.viewport, Rect::ZERO);
        assert!(layer.render_target.is_none());
        assert!((layer.clear_depth - 1.0).abs() < f32::EPSILON);
    }
}
