//! Constant records: per-draw uniform updates.
//!
//! Wire shape per record: `[type:1][id:4][size:4][payload:size]`, repeated,
//! terminated by the [`UniformType::End`] tag on its own. `size` must match
//! the byte width declared at uniform creation time (`element_size * num`);
//! the stream itself does not enforce this - it is a producer contract.

use ember_core::{StreamReader, StreamWriter};

use crate::resource::{UniformId, UniformType};

/// One decoded uniform update.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConstantRecord<'a> {
    /// The uniform to update.
    pub id: UniformId,
    /// Declared type of the uniform.
    pub ty: UniformType,
    /// Raw value bytes.
    pub data: &'a [u8],
}

/// Appends one uniform update to `writer`.
///
/// # Panics
///
/// Panics if `ty` is the [`UniformType::End`] sentinel - that tag is
/// written by [`finish_constants`] only.
pub fn write_constant(writer: &mut StreamWriter, id: UniformId, ty: UniformType, data: &[u8]) {
    assert!(
        ty != UniformType::End,
        "The End sentinel is not a writable constant type"
    );

    writer.write_u8(ty as u8);
    writer.write_pod(&id);
    writer.write_blob(data);
}

/// Appends the terminating type tag. Required exactly once, after all
/// records for the frame.
pub fn finish_constants(writer: &mut StreamWriter) {
    writer.write_u8(UniformType::End as u8);
}

/// Iterator over the records of a constant stream, up to the sentinel.
pub struct ConstantReader<'a> {
    reader: StreamReader<'a>,
    finished: bool,
}

impl<'a> ConstantReader<'a> {
    /// Creates a reader over a finished constant stream.
    #[must_use]
    pub const fn new(buffer: &'a [u8]) -> Self {
        Self {
            reader: StreamReader::new(buffer),
            finished: false,
        }
    }
}

impl<'a> Iterator for ConstantReader<'a> {
    type Item = ConstantRecord<'a>;

    /// Decodes the next record, or `None` once the sentinel is reached.
    ///
    /// # Panics
    ///
    /// Panics on an unknown type tag or a truncated record - fatal
    /// protocol violations.
    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let byte = self.reader.read_u8();
        let ty = UniformType::from_u8(byte)
            .unwrap_or_else(|| panic!("Unknown uniform type tag {byte:#04x}"));

        if ty == UniformType::End {
            self.finished = true;
            return None;
        }

        Some(ConstantRecord {
            id: self.reader.read_pod(),
            ty,
            data: self.reader.read_blob(),
        })
    }
}
