//! Command records: the closed opcode set and its operand encoding.
//!
//! Wire shape per record: `[op:1]` followed by operands in a fixed order.
//! Scalars are little-endian, ids are 4-byte Pod writes, bulk payloads are
//! length-prefixed blobs (`[len:4][bytes:len]`). Every record's total
//! length is determined by its opcode plus its embedded length fields, so
//! the stream is self-delimiting.

use ember_core::{StreamReader, StreamWriter};

use crate::resource::{
    GpuProgramId, IndexBufferId, PixelFormat, ShaderId, ShaderType, TextureId, UniformId,
    UniformType, VertexBufferId, VertexFormat,
};

/// Opcode byte for every command record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CommandOp {
    /// Initialize the backend device.
    Init = 0,
    /// Tear the backend device down and stop the render thread.
    Shutdown = 1,
    /// Create a static vertex buffer (payload included).
    CreateVertexBuffer = 2,
    /// Create a dynamic vertex buffer (storage only).
    CreateDynamicVertexBuffer = 3,
    /// Update a region of a vertex buffer.
    UpdateVertexBuffer = 4,
    /// Destroy a vertex buffer.
    DestroyVertexBuffer = 5,
    /// Create a static index buffer (payload included).
    CreateIndexBuffer = 6,
    /// Create a dynamic index buffer (storage only).
    CreateDynamicIndexBuffer = 7,
    /// Update a region of an index buffer.
    UpdateIndexBuffer = 8,
    /// Destroy an index buffer.
    DestroyIndexBuffer = 9,
    /// Create a texture (payload included).
    CreateTexture = 10,
    /// Update a rectangular region of a texture.
    UpdateTexture = 11,
    /// Destroy a texture.
    DestroyTexture = 12,
    /// Create a shader from source bytes.
    CreateShader = 13,
    /// Destroy a shader.
    DestroyShader = 14,
    /// Link a GPU program from two shaders.
    CreateGpuProgram = 15,
    /// Destroy a GPU program.
    DestroyGpuProgram = 16,
    /// Declare a named uniform.
    CreateUniform = 17,
    /// Destroy a uniform.
    DestroyUniform = 18,
    /// Stream terminator. Exactly one per frame.
    End = 255,
}

impl CommandOp {
    /// Decodes a wire byte.
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(CommandOp::Init),
            1 => Some(CommandOp::Shutdown),
            2 => Some(CommandOp::CreateVertexBuffer),
            3 => Some(CommandOp::CreateDynamicVertexBuffer),
            4 => Some(CommandOp::UpdateVertexBuffer),
            5 => Some(CommandOp::DestroyVertexBuffer),
            6 => Some(CommandOp::CreateIndexBuffer),
            7 => Some(CommandOp::CreateDynamicIndexBuffer),
            8 => Some(CommandOp::UpdateIndexBuffer),
            9 => Some(CommandOp::DestroyIndexBuffer),
            10 => Some(CommandOp::CreateTexture),
            11 => Some(CommandOp::UpdateTexture),
            12 => Some(CommandOp::DestroyTexture),
            13 => Some(CommandOp::CreateShader),
            14 => Some(CommandOp::DestroyShader),
            15 => Some(CommandOp::CreateGpuProgram),
            16 => Some(CommandOp::DestroyGpuProgram),
            17 => Some(CommandOp::CreateUniform),
            18 => Some(CommandOp::DestroyUniform),
            255 => Some(CommandOp::End),
            _ => None,
        }
    }
}

/// One decoded command record.
///
/// Bulk payloads borrow straight out of the stream buffer; they are valid
/// until the owning context is reset after execution.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command<'a> {
    /// Initialize the backend device.
    Init,
    /// Tear the backend device down and stop the render thread.
    Shutdown,
    /// Create a static vertex buffer filled with `data`.
    CreateVertexBuffer {
        /// Target id (already allocated on the simulation thread).
        id: VertexBufferId,
        /// Number of vertices in `data`.
        count: u32,
        /// Vertex layout.
        format: VertexFormat,
        /// Raw vertex bytes (`count * format.stride()`).
        data: &'a [u8],
    },
    /// Allocate storage for a dynamic vertex buffer.
    CreateDynamicVertexBuffer {
        /// Target id.
        id: VertexBufferId,
        /// Number of vertices to reserve.
        count: u32,
        /// Vertex layout.
        format: VertexFormat,
    },
    /// Overwrite `count` vertices starting at `offset`.
    UpdateVertexBuffer {
        /// Target id.
        id: VertexBufferId,
        /// First vertex to overwrite.
        offset: u32,
        /// Number of vertices in `data`.
        count: u32,
        /// Raw vertex bytes.
        data: &'a [u8],
    },
    /// Destroy a vertex buffer.
    DestroyVertexBuffer {
        /// Target id.
        id: VertexBufferId,
    },
    /// Create a static index buffer filled with `data`.
    CreateIndexBuffer {
        /// Target id.
        id: IndexBufferId,
        /// Number of 16-bit indices in `data`.
        count: u32,
        /// Raw index bytes.
        data: &'a [u8],
    },
    /// Allocate storage for a dynamic index buffer.
    CreateDynamicIndexBuffer {
        /// Target id.
        id: IndexBufferId,
        /// Number of indices to reserve.
        count: u32,
    },
    /// Overwrite `count` indices starting at `offset`.
    UpdateIndexBuffer {
        /// Target id.
        id: IndexBufferId,
        /// First index to overwrite.
        offset: u32,
        /// Number of indices in `data`.
        count: u32,
        /// Raw index bytes.
        data: &'a [u8],
    },
    /// Destroy an index buffer.
    DestroyIndexBuffer {
        /// Target id.
        id: IndexBufferId,
    },
    /// Create a texture filled with `data`.
    CreateTexture {
        /// Target id.
        id: TextureId,
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
        /// Pixel layout.
        format: PixelFormat,
        /// Raw pixel bytes (`width * height * format.bytes_per_pixel()`).
        data: &'a [u8],
    },
    /// Overwrite a rectangular region of a texture.
    UpdateTexture {
        /// Target id.
        id: TextureId,
        /// Region left edge.
        x: u32,
        /// Region top edge.
        y: u32,
        /// Region width.
        width: u32,
        /// Region height.
        height: u32,
        /// Raw pixel bytes for the region.
        data: &'a [u8],
    },
    /// Destroy a texture.
    DestroyTexture {
        /// Target id.
        id: TextureId,
    },
    /// Create a shader from source bytes.
    CreateShader {
        /// Target id.
        id: ShaderId,
        /// Pipeline stage.
        ty: ShaderType,
        /// Opaque source blob (text or bytecode - the loader decides).
        source: &'a [u8],
    },
    /// Destroy a shader.
    DestroyShader {
        /// Target id.
        id: ShaderId,
    },
    /// Link a GPU program from a vertex and a fragment shader.
    CreateGpuProgram {
        /// Target id.
        id: GpuProgramId,
        /// Vertex stage.
        vertex: ShaderId,
        /// Fragment stage.
        fragment: ShaderId,
    },
    /// Destroy a GPU program.
    DestroyGpuProgram {
        /// Target id.
        id: GpuProgramId,
    },
    /// Declare a named uniform with `num` elements of `ty`.
    CreateUniform {
        /// Target id.
        id: UniformId,
        /// Shader-facing name.
        name: &'a str,
        /// Element type.
        ty: UniformType,
        /// Element count.
        num: u8,
    },
    /// Destroy a uniform.
    DestroyUniform {
        /// Target id.
        id: UniformId,
    },
    /// Stream terminator.
    End,
}

impl<'a> Command<'a> {
    /// Returns this command's opcode.
    #[must_use]
    pub const fn op(&self) -> CommandOp {
        match self {
            Command::Init => CommandOp::Init,
            Command::Shutdown => CommandOp::Shutdown,
            Command::CreateVertexBuffer { .. } => CommandOp::CreateVertexBuffer,
            Command::CreateDynamicVertexBuffer { .. } => CommandOp::CreateDynamicVertexBuffer,
            Command::UpdateVertexBuffer { .. } => CommandOp::UpdateVertexBuffer,
            Command::DestroyVertexBuffer { .. } => CommandOp::DestroyVertexBuffer,
            Command::CreateIndexBuffer { .. } => CommandOp::CreateIndexBuffer,
            Command::CreateDynamicIndexBuffer { .. } => CommandOp::CreateDynamicIndexBuffer,
            Command::UpdateIndexBuffer { .. } => CommandOp::UpdateIndexBuffer,
            Command::DestroyIndexBuffer { .. } => CommandOp::DestroyIndexBuffer,
            Command::CreateTexture { .. } => CommandOp::CreateTexture,
            Command::UpdateTexture { .. } => CommandOp::UpdateTexture,
            Command::DestroyTexture { .. } => CommandOp::DestroyTexture,
            Command::CreateShader { .. } => CommandOp::CreateShader,
            Command::DestroyShader { .. } => CommandOp::DestroyShader,
            Command::CreateGpuProgram { .. } => CommandOp::CreateGpuProgram,
            Command::DestroyGpuProgram { .. } => CommandOp::DestroyGpuProgram,
            Command::CreateUniform { .. } => CommandOp::CreateUniform,
            Command::DestroyUniform { .. } => CommandOp::DestroyUniform,
            Command::End => CommandOp::End,
        }
    }

    /// Appends this command to `writer` in wire format.
    #[allow(clippy::too_many_lines)]
    pub fn encode(&self, writer: &mut StreamWriter) {
        writer.write_u8(self.op() as u8);

        match *self {
            Command::Init | Command::Shutdown | Command::End => {}
            Command::CreateVertexBuffer {
                id,
                count,
                format,
                data,
            } => {
                writer.write_pod(&id);
                writer.write_u32(count);
                writer.write_u8(format as u8);
                writer.write_blob(data);
            }
            Command::CreateDynamicVertexBuffer { id, count, format } => {
                writer.write_pod(&id);
                writer.write_u32(count);
                writer.write_u8(format as u8);
            }
            Command::UpdateVertexBuffer {
                id,
                offset,
                count,
                data,
            } => {
                writer.write_pod(&id);
                writer.write_u32(offset);
                writer.write_u32(count);
                writer.write_blob(data);
            }
            Command::DestroyVertexBuffer { id } => writer.write_pod(&id),
            Command::CreateIndexBuffer { id, count, data } => {
                writer.write_pod(&id);
                writer.write_u32(count);
                writer.write_blob(data);
            }
            Command::CreateDynamicIndexBuffer { id, count } => {
                writer.write_pod(&id);
                writer.write_u32(count);
            }
            Command::UpdateIndexBuffer {
                id,
                offset,
                count,
                data,
            } => {
                writer.write_pod(&id);
                writer.write_u32(offset);
                writer.write_u32(count);
                writer.write_blob(data);
            }
            Command::DestroyIndexBuffer { id } => writer.write_pod(&id),
            Command::CreateTexture {
                id,
                width,
                height,
                format,
                data,
            } => {
                writer.write_pod(&id);
                writer.write_u32(width);
                writer.write_u32(height);
                writer.write_u8(format as u8);
                writer.write_blob(data);
            }
            Command::UpdateTexture {
                id,
                x,
                y,
                width,
                height,
                data,
            } => {
                writer.write_pod(&id);
                writer.write_u32(x);
                writer.write_u32(y);
                writer.write_u32(width);
                writer.write_u32(height);
                writer.write_blob(data);
            }
            Command::DestroyTexture { id } => writer.write_pod(&id),
            Command::CreateShader { id, ty, source } => {
                writer.write_pod(&id);
                writer.write_u8(ty as u8);
                writer.write_blob(source);
            }
            Command::DestroyShader { id } => writer.write_pod(&id),
            Command::CreateGpuProgram {
                id,
                vertex,
                fragment,
            } => {
                writer.write_pod(&id);
                writer.write_pod(&vertex);
                writer.write_pod(&fragment);
            }
            Command::DestroyGpuProgram { id } => writer.write_pod(&id),
            Command::CreateUniform { id, name, ty, num } => {
                writer.write_pod(&id);
                writer.write_blob(name.as_bytes());
                writer.write_u8(ty as u8);
                writer.write_u8(num);
            }
            Command::DestroyUniform { id } => writer.write_pod(&id),
        }
    }

    /// Decodes the next command record from `reader`.
    ///
    /// # Panics
    ///
    /// Panics on an unrecognized opcode or format byte, or on a truncated
    /// record - all fatal protocol violations between the two threads.
    #[allow(clippy::too_many_lines)]
    #[must_use]
    pub fn decode(reader: &mut StreamReader<'a>) -> Self {
        let byte = reader.read_u8();
        let op = CommandOp::from_u8(byte)
            .unwrap_or_else(|| panic!("Unknown command opcode {byte:#04x}"));

        match op {
            CommandOp::Init => Command::Init,
            CommandOp::Shutdown => Command::Shutdown,
            CommandOp::CreateVertexBuffer => Command::CreateVertexBuffer {
                id: reader.read_pod(),
                count: reader.read_u32(),
                format: decode_vertex_format(reader),
                data: reader.read_blob(),
            },
            CommandOp::CreateDynamicVertexBuffer => Command::CreateDynamicVertexBuffer {
                id: reader.read_pod(),
                count: reader.read_u32(),
                format: decode_vertex_format(reader),
            },
            CommandOp::UpdateVertexBuffer => Command::UpdateVertexBuffer {
                id: reader.read_pod(),
                offset: reader.read_u32(),
                count: reader.read_u32(),
                data: reader.read_blob(),
            },
            CommandOp::DestroyVertexBuffer => Command::DestroyVertexBuffer {
                id: reader.read_pod(),
            },
            CommandOp::CreateIndexBuffer => Command::CreateIndexBuffer {
                id: reader.read_pod(),
                count: reader.read_u32(),
                data: reader.read_blob(),
            },
            CommandOp::CreateDynamicIndexBuffer => Command::CreateDynamicIndexBuffer {
                id: reader.read_pod(),
                count: reader.read_u32(),
            },
            CommandOp::UpdateIndexBuffer => Command::UpdateIndexBuffer {
                id: reader.read_pod(),
                offset: reader.read_u32(),
                count: reader.read_u32(),
                data: reader.read_blob(),
            },
            CommandOp::DestroyIndexBuffer => Command::DestroyIndexBuffer {
                id: reader.read_pod(),
            },
            CommandOp::CreateTexture => Command::CreateTexture {
                id: reader.read_pod(),
                width: reader.read_u32(),
                height: reader.read_u32(),
                format: decode_pixel_format(reader),
                data: reader.read_blob(),
            },
            CommandOp::UpdateTexture => Command::UpdateTexture {
                id: reader.read_pod(),
                x: reader.read_u32(),
                y: reader.read_u32(),
                width: reader.read_u32(),
                height: reader.read_u32(),
                data: reader.read_blob(),
            },
            CommandOp::DestroyTexture => Command::DestroyTexture {
                id: reader.read_pod(),
            },
            CommandOp::CreateShader => Command::CreateShader {
                id: reader.read_pod(),
                ty: decode_shader_type(reader),
                source: reader.read_blob(),
            },
            CommandOp::DestroyShader => Command::DestroyShader {
                id: reader.read_pod(),
            },
            CommandOp::CreateGpuProgram => Command::CreateGpuProgram {
                id: reader.read_pod(),
                vertex: reader.read_pod(),
                fragment: reader.read_pod(),
            },
            CommandOp::DestroyGpuProgram => Command::DestroyGpuProgram {
                id: reader.read_pod(),
            },
            CommandOp::CreateUniform => {
                let id = reader.read_pod();
                let name = std::str::from_utf8(reader.read_blob())
                    .expect("Uniform name on the wire is not UTF-8");
                Command::CreateUniform {
                    id,
                    name,
                    ty: decode_uniform_type(reader),
                    num: reader.read_u8(),
                }
            }
            CommandOp::DestroyUniform => Command::DestroyUniform {
                id: reader.read_pod(),
            },
            CommandOp::End => Command::End,
        }
    }
}

fn decode_vertex_format(reader: &mut StreamReader<'_>) -> VertexFormat {
    let byte = reader.read_u8();
    VertexFormat::from_u8(byte).unwrap_or_else(|| panic!("Unknown vertex format byte {byte:#04x}"))
}

fn decode_pixel_format(reader: &mut StreamReader<'_>) -> PixelFormat {
    let byte = reader.read_u8();
    PixelFormat::from_u8(byte).unwrap_or_else(|| panic!("Unknown pixel format byte {byte:#04x}"))
}

fn decode_shader_type(reader: &mut StreamReader<'_>) -> ShaderType {
    let byte = reader.read_u8();
    ShaderType::from_u8(byte).unwrap_or_else(|| panic!("Unknown shader type byte {byte:#04x}"))
}

fn decode_uniform_type(reader: &mut StreamReader<'_>) -> UniformType {
    let byte = reader.read_u8();
    UniformType::from_u8(byte).unwrap_or_else(|| panic!("Unknown uniform type byte {byte:#04x}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_core::RawHandle;

    fn vb(index: u16) -> VertexBufferId {
        VertexBufferId::from_raw(RawHandle::new(index, 0))
    }

    #[test]
    fn test_command_sequence_roundtrip() {
        let vertices = [0u8; 36]; // 3 vertices of Position3
        let commands = [
            Command::Init,
            Command::CreateVertexBuffer {
                id: vb(1),
                count: 3,
                format: VertexFormat::Position3,
                data: &vertices,
            },
            Command::CreateDynamicIndexBuffer {
                id: IndexBufferId::from_raw(RawHandle::new(0, 2)),
                count: 128,
            },
            Command::CreateUniform {
                id: UniformId::from_raw(RawHandle::new(3, 1)),
                name: "u_tint",
                ty: UniformType::Float4,
                num: 1,
            },
            Command::DestroyVertexBuffer { id: vb(1) },
            Command::End,
        ];

        let mut writer = ember_core::StreamWriter::with_capacity(256);
        for command in &commands {
            command.encode(&mut writer);
        }

        let mut reader = StreamReader::new(writer.as_slice());
        for expected in &commands {
            assert_eq!(Command::decode(&mut reader), *expected);
        }
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_texture_operands_survive() {
        let pixels = [7u8; 16];
        let original = Command::UpdateTexture {
            id: TextureId::from_raw(RawHandle::new(9, 4)),
            x: 1,
            y: 2,
            width: 2,
            height: 2,
            data: &pixels,
        };

        let mut writer = ember_core::StreamWriter::with_capacity(64);
        original.encode(&mut writer);

        let mut reader = StreamReader::new(writer.as_slice());
        assert_eq!(Command::decode(&mut reader), original);
    }

    #[test]
    fn test_lifecycle_commands_are_one_byte() {
        let mut writer = ember_core::StreamWriter::with_capacity(8);
        Command::End.encode(&mut writer);
        assert_eq!(writer.as_slice(), &[CommandOp::End as u8]);
    }

    #[test]
    #[should_panic(expected = "Unknown command opcode")]
    fn test_unknown_opcode_is_fatal() {
        let bytes = [0x7Fu8];
        let mut reader = StreamReader::new(&bytes);
        let _ = Command::decode(&mut reader);
    }

    #[test]
    #[should_panic(expected = "Read past the end of a stream")]
    fn test_truncated_record_is_fatal() {
        let mut writer = ember_core::StreamWriter::with_capacity(16);
        Command::DestroyShader {
            id: ShaderId::from_raw(RawHandle::new(1, 0)),
        }
        .encode(&mut writer);

        let truncated = &writer.as_slice()[..3];
        let mut reader = StreamReader::new(truncated);
        let _ = Command::decode(&mut reader);
    }
}
