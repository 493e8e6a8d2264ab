//! # Render Core Limits
//!
//! Compile-time maxima for every fixed-capacity structure in the core.
//!
//! **CRITICAL:** These values size the handle tables and the per-frame
//! state that both threads carry. Changes require a rebuild of everything
//! that embeds the renderer.

// =============================================================================
// RESOURCE TABLE CAPACITIES
// =============================================================================

/// Maximum number of live vertex buffers.
pub const MAX_VERTEX_BUFFERS: usize = 4096;

/// Maximum number of live index buffers.
pub const MAX_INDEX_BUFFERS: usize = 4096;

/// Maximum number of live textures.
pub const MAX_TEXTURES: usize = 4096;

/// Maximum number of live shaders.
pub const MAX_SHADERS: usize = 512;

/// Maximum number of live GPU programs.
pub const MAX_GPU_PROGRAMS: usize = 512;

/// Maximum number of live uniforms.
pub const MAX_UNIFORMS: usize = 128;

/// Maximum number of live render targets.
pub const MAX_RENDER_TARGETS: usize = 64;

// =============================================================================
// FRAME STATE
// =============================================================================

/// Number of render layers per frame. Draw calls are committed against a
/// layer; layers are drawn in index order.
pub const MAX_LAYERS: usize = 64;

/// Number of texture units a single draw can bind.
pub const MAX_TEXTURE_UNITS: usize = 8;

/// Maximum length of a user uniform name, in bytes.
pub const MAX_UNIFORM_NAME_LENGTH: usize = 64;
