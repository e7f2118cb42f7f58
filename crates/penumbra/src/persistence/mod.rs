//! Binary persistence.
//!
//! The stream classes only know primitives; every structured value writes
//! and reads itself through [`Persistable`]. Numbers are little-endian,
//! lengths and strings are u32-prefixed.

mod impls;
pub mod reader;
pub mod writer;

use std::io::{Read, Write};

pub use reader::BinaryReader;
pub use writer::BinaryWriter;

use crate::error::PersistResult;

/// A value that knows its own binary layout.
pub trait Persistable: Sized {
    fn persist<W: Write>(&self, writer: &mut BinaryWriter<W>) -> PersistResult<()>;

    fn recover<R: Read>(reader: &mut BinaryReader<R>) -> PersistResult<Self>;
}

/// Serialize a value into a fresh buffer.
pub fn save<T: Persistable>(value: &T) -> PersistResult<Vec<u8>> {
    let mut writer = BinaryWriter::new(Vec::new());
    writer.write_persistable(value)?;
    Ok(writer.into_inner())
}

/// Deserialize a value from a byte slice. Trailing bytes are ignored.
pub fn load<T: Persistable>(bytes: &[u8]) -> PersistResult<T> {
    BinaryReader::new(bytes).read_persistable()
}
