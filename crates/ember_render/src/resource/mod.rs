//! # Resource Identity and Formats
//!
//! Typed handles for every resource kind the command queue manages, plus
//! the closed format/type enums that travel inside command records.
//!
//! A handle is only meaningful to the [`Renderer`](crate::renderer::Renderer)
//! that issued it; validity is checked against the issuing table on the
//! simulation thread before any command is encoded.

pub mod flags;
mod ids;
mod types;

pub use ids::{
    GpuProgramId, IndexBufferId, RenderTargetId, ShaderId, TextureId, UniformId, VertexBufferId,
};
pub use types::{PixelFormat, ShaderType, StockUniform, UniformType, VertexFormat};
