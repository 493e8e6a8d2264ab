//! Closed format and type enumerations carried inside command records.
//!
//! Every enum here is `#[repr(u8)]` with explicit discriminants: the byte
//! value IS the wire encoding. Decoding an unknown byte is a protocol
//! violation and aborts - the stream format and the dispatcher are a
//! single-version pair.

/// Layout of one vertex in a vertex buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum VertexFormat {
    /// 2D position.
    Position2 = 0,
    /// 3D position.
    Position3 = 1,
    /// 3D position + normal.
    Position3Normal3 = 2,
    /// 3D position + RGBA color.
    Position3Color4 = 3,
    /// 3D position + texture coordinates.
    Position3TexCoord2 = 4,
    /// 3D position + normal + texture coordinates.
    Position3Normal3TexCoord2 = 5,
}

impl VertexFormat {
    /// Returns the size in bytes of a single vertex of this format.
    #[must_use]
    pub const fn stride(self) -> u32 {
        match self {
            VertexFormat::Position2 => 8,
            VertexFormat::Position3 => 12,
            VertexFormat::Position3Normal3 => 24,
            VertexFormat::Position3Color4 => 28,
            VertexFormat::Position3TexCoord2 => 20,
            VertexFormat::Position3Normal3TexCoord2 => 32,
        }
    }

    /// Decodes a wire byte.
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(VertexFormat::Position2),
            1 => Some(VertexFormat::Position3),
            2 => Some(VertexFormat::Position3Normal3),
            3 => Some(VertexFormat::Position3Color4),
            4 => Some(VertexFormat::Position3TexCoord2),
            5 => Some(VertexFormat::Position3Normal3TexCoord2),
            _ => None,
        }
    }
}

/// Memory format of the pixels in a texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PixelFormat {
    /// One 8-bit channel.
    R8 = 0,
    /// Three 8-bit channels.
    Rgb8 = 1,
    /// Four 8-bit channels.
    Rgba8 = 2,
    /// Four 16-bit float channels.
    Rgba16F = 3,
    /// Four 32-bit float channels.
    Rgba32F = 4,
    /// 24-bit depth.
    Depth24 = 5,
    /// 32-bit float depth.
    Depth32F = 6,
}

impl PixelFormat {
    /// Returns the size in bytes of a single pixel of this format.
    #[must_use]
    pub const fn bytes_per_pixel(self) -> u32 {
        match self {
            PixelFormat::R8 => 1,
            PixelFormat::Rgb8 => 3,
            PixelFormat::Rgba8 | PixelFormat::Depth24 | PixelFormat::Depth32F => 4,
            PixelFormat::Rgba16F => 8,
            PixelFormat::Rgba32F => 16,
        }
    }

    /// Decodes a wire byte.
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(PixelFormat::R8),
            1 => Some(PixelFormat::Rgb8),
            2 => Some(PixelFormat::Rgba8),
            3 => Some(PixelFormat::Rgba16F),
            4 => Some(PixelFormat::Rgba32F),
            5 => Some(PixelFormat::Depth24),
            6 => Some(PixelFormat::Depth32F),
            _ => None,
        }
    }
}

/// Programmable pipeline stage a shader is compiled for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ShaderType {
    /// Vertex shader.
    Vertex = 0,
    /// Fragment (pixel) shader.
    Fragment = 1,
}

impl ShaderType {
    /// Decodes a wire byte.
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(ShaderType::Vertex),
            1 => Some(ShaderType::Fragment),
            _ => None,
        }
    }
}

/// Data type of a uniform, as declared at creation time.
///
/// `End` is the constant-stream sentinel; it never names a real uniform
/// and has no element size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum UniformType {
    /// One 32-bit integer.
    Integer1 = 0,
    /// One float.
    Float1 = 1,
    /// Two floats.
    Float2 = 2,
    /// Three floats.
    Float3 = 3,
    /// Four floats.
    Float4 = 4,
    /// 3x3 float matrix.
    Matrix3 = 5,
    /// 4x4 float matrix.
    Matrix4 = 6,
    /// Constant-stream terminator. Not a uniform type.
    End = 7,
}

impl UniformType {
    /// Returns the size in bytes of a single element of this type.
    ///
    /// # Panics
    ///
    /// Panics on [`UniformType::End`], which carries no data.
    #[must_use]
    pub const fn element_size(self) -> u32 {
        match self {
            UniformType::Integer1 | UniformType::Float1 => 4,
            UniformType::Float2 => 8,
            UniformType::Float3 => 12,
            UniformType::Float4 => 16,
            UniformType::Matrix3 => 36,
            UniformType::Matrix4 => 64,
            UniformType::End => panic!("The End sentinel has no element size"),
        }
    }

    /// Decodes a wire byte.
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(UniformType::Integer1),
            1 => Some(UniformType::Float1),
            2 => Some(UniformType::Float2),
            3 => Some(UniformType::Float3),
            4 => Some(UniformType::Float4),
            5 => Some(UniformType::Matrix3),
            6 => Some(UniformType::Matrix4),
            7 => Some(UniformType::End),
            _ => None,
        }
    }
}

/// Uniforms the engine manages itself.
///
/// Their names are reserved: creating a user uniform under one of these
/// names is a submission-time precondition violation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StockUniform {
    /// The active layer's view matrix.
    View,
    /// The committed draw's model (pose) matrix.
    Model,
    /// Model-view product.
    ModelView,
    /// Model-view-projection product.
    ModelViewProjection,
    /// Seconds since engine start.
    TimeSinceStart,
}

impl StockUniform {
    /// Returns the reserved shader-facing name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            StockUniform::View => "u_view",
            StockUniform::Model => "u_model",
            StockUniform::ModelView => "u_model_view",
            StockUniform::ModelViewProjection => "u_model_view_projection",
            StockUniform::TimeSinceStart => "u_time_since_start",
        }
    }

    /// Looks a name up against the reserved set.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "u_view" => Some(StockUniform::View),
            "u_model" => Some(StockUniform::Model),
            "u_model_view" => Some(StockUniform::ModelView),
            "u_model_view_projection" => Some(StockUniform::ModelViewProjection),
            "u_time_since_start" => Some(StockUniform::TimeSinceStart),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_format_wire_roundtrip() {
        for format in [
            VertexFormat::Position2,
            VertexFormat::Position3,
            VertexFormat::Position3Normal3,
            VertexFormat::Position3Color4,
            VertexFormat::Position3TexCoord2,
            VertexFormat::Position3Normal3TexCoord2,
        ] {
            assert_eq!(VertexFormat::from_u8(format as u8), Some(format));
        }
        assert_eq!(VertexFormat::from_u8(200), None);
    }

    #[test]
    fn test_uniform_type_sizes() {
        assert_eq!(UniformType::Integer1.element_size(), 4);
        assert_eq!(UniformType::Float4.element_size(), 16);
        assert_eq!(UniformType::Matrix3.element_size(), 36);
        assert_eq!(UniformType::Matrix4.element_size(), 64);
    }

    #[test]
    #[should_panic(expected = "End sentinel has no element size")]
    fn test_end_sentinel_has_no_size() {
        let _ = UniformType::End.element_size();
    }

    #[test]
    fn test_stock_uniform_names_are_reserved() {
        assert_eq!(StockUniform::from_name("u_view"), Some(StockUniform::View));
        assert_eq!(
            StockUniform::from_name("u_model_view_projection"),
            Some(StockUniform::ModelViewProjection)
        );
        assert_eq!(StockUniform::from_name("u_player_color"), None);

        for stock in [
            StockUniform::View,
            StockUniform::Model,
            StockUniform::ModelView,
            StockUniform::ModelViewProjection,
            StockUniform::TimeSinceStart,
        ] {
            assert_eq!(StockUniform::from_name(stock.name()), Some(stock));
        }
    }

    #[test]
    fn test_pixel_format_sizes() {
        assert_eq!(PixelFormat::R8.bytes_per_pixel(), 1);
        assert_eq!(PixelFormat::Rgba8.bytes_per_pixel(), 4);
        assert_eq!(PixelFormat::Rgba32F.bytes_per_pixel(), 16);
    }
}
