//! # Frame Contexts
//!
//! A [`FrameContext`] bundles everything one in-flight frame needs: the
//! command stream, the constant stream, the per-layer render state, the
//! current-draw scratch state, and the committed draw list.
//!
//! Exactly two contexts exist for the renderer's lifetime. At any instant
//! the simulation thread owns one (the *submit* context) and the render
//! thread owns the other (the *draw* context); ownership flips at the
//! frame handoff, never concurrently.

mod context;
mod draw;
mod layer;

pub use context::FrameContext;
pub use draw::{DrawCall, DrawState, TextureBinding};
pub use layer::LayerState;
