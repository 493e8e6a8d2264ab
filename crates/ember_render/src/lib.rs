//! # EMBER Render Command Queue
//!
//! The command-submission and execution core of the EMBER engine: the
//! simulation thread records resource and draw commands, a dedicated render
//! thread replays them against a graphics backend, and the two sides never
//! touch the same buffer concurrently.
//!
//! ## Architecture
//!
//! ```text
//!  simulation thread                      render thread
//!  ┌───────────────────┐   submit ctx    ┌───────────────────┐
//!  │ Renderer          │ ──────────────► │ consumer loop     │
//!  │  handle tables    │                 │  CommandDispatcher│
//!  │  submit context   │ ◄────────────── │  RenderBackend    │
//!  └───────────────────┘   recycled ctx  └───────────────────┘
//! ```
//!
//! Exactly two [`FrameContext`]s exist. Each `frame()` call hands the
//! submitted context to the render thread and blocks until the render
//! thread has finished the *previous* frame, so the two threads are at most
//! one frame out of phase.
//!
//! ## Thread Safety
//!
//! - Handle tables live on the simulation thread only; every command is
//!   validated there before it is encoded
//! - Frame contexts move by value through bounded channels; ownership is
//!   total, there is no shared mutable state and no `unsafe`

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod backend;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod frame;
pub mod limits;
pub mod protocol;
pub mod renderer;
pub mod resource;
pub mod stats;

pub use backend::{FrameView, RenderBackend};
pub use config::RendererConfig;
pub use error::RenderError;
pub use frame::{DrawCall, DrawState, FrameContext, LayerState, TextureBinding};
pub use renderer::Renderer;
pub use resource::{
    GpuProgramId, IndexBufferId, PixelFormat, RenderTargetId, ShaderId, ShaderType, StockUniform,
    TextureId, UniformId, UniformType, VertexBufferId, VertexFormat,
};
pub use stats::RenderStats;
