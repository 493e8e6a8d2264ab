//! Renderer configuration - loaded once at startup.
//!
//! The hard capacity maxima live in [`limits`](crate::limits) and are
//! compile-time; this config only tunes how much frame storage is
//! reserved up front and when the render thread complains about a slow
//! frame.

use serde::Deserialize;

use crate::error::{RenderError, RenderResult};

/// Startup tunables for the renderer.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RendererConfig {
    /// Bytes reserved for each frame context's command stream.
    pub command_stream_capacity: usize,
    /// Bytes reserved for each frame context's constant stream.
    pub constant_stream_capacity: usize,
    /// Draw calls reserved per frame context.
    pub draw_call_capacity: usize,
    /// Render-thread frames slower than this are logged as warnings.
    pub slow_frame_warn_ms: f32,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            command_stream_capacity: 1 << 20, // 1 MiB of commands per frame
            constant_stream_capacity: 64 << 10,
            draw_call_capacity: 4096,
            slow_frame_warn_ms: 33.0,
        }
    }
}

impl RendererConfig {
    /// Parses a config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::InvalidConfig`] when the text is not valid
    /// TOML, names unknown fields, or carries a zero capacity.
    pub fn from_toml_str(text: &str) -> RenderResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| RenderError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> RenderResult<()> {
        if self.command_stream_capacity == 0 {
            return Err(RenderError::InvalidConfig(
                "command_stream_capacity must be non-zero".to_string(),
            ));
        }
        if self.constant_stream_capacity == 0 {
            return Err(RenderError::InvalidConfig(
                "constant_stream_capacity must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}
