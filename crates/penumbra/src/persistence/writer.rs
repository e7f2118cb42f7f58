use std::io::Write;

use glam::Vec2;

use super::Persistable;
use crate::error::PersistResult;

/// Little-endian binary writer. Values with structure write themselves
/// through [`Persistable::persist`].
pub struct BinaryWriter<W: Write> {
    inner: W,
}

impl<W: Write> BinaryWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn write_u8(&mut self, value: u8) -> PersistResult<()> {
        self.inner.write_all(&[value])?;
        Ok(())
    }

    pub fn write_u32(&mut self, value: u32) -> PersistResult<()> {
        self.inner.write_all(&value.to_le_bytes())?;
        Ok(())
    }

    pub fn write_i32(&mut self, value: i32) -> PersistResult<()> {
        self.inner.write_all(&value.to_le_bytes())?;
        Ok(())
    }

    pub fn write_f32(&mut self, value: f32) -> PersistResult<()> {
        self.inner.write_all(&value.to_le_bytes())?;
        Ok(())
    }

    pub fn write_bool(&mut self, value: bool) -> PersistResult<()> {
        self.write_u8(value as u8)
    }

    /// u32 byte length, then UTF-8 bytes.
    pub fn write_str(&mut self, value: &str) -> PersistResult<()> {
        self.write_len(value.len())?;
        self.inner.write_all(value.as_bytes())?;
        Ok(())
    }

    pub fn write_vec2(&mut self, value: Vec2) -> PersistResult<()> {
        self.write_f32(value.x)?;
        self.write_f32(value.y)
    }

    /// Collection length as u32.
    pub fn write_len(&mut self, len: usize) -> PersistResult<()> {
        let len = u32::try_from(len).map_err(|_| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "length exceeds u32")
        })?;
        self.write_u32(len)
    }

    pub fn write_persistable<T: Persistable>(&mut self, value: &T) -> PersistResult<()> {
        value.persist(self)
    }

    pub fn flush(&mut self) -> PersistResult<()> {
        self.inner.flush()?;
        Ok(())
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitives_are_little_endian() {
        let mut w = BinaryWriter::new(Vec::new());
        w.write_u32(0x0102_0304).unwrap();
        w.write_i32(-2).unwrap();
        w.write_bool(true).unwrap();
        w.write_f32(1.0).unwrap();
        let bytes = w.into_inner();
        assert_eq!(&bytes[0..4], &[4, 3, 2, 1]);
        assert_eq!(&bytes[4..8], &[0xfe, 0xff, 0xff, 0xff]);
        assert_eq!(bytes[8], 1);
        assert_eq!(&bytes[9..13], &1.0f32.to_le_bytes());
    }

    #[test]
    fn strings_are_length_prefixed() {
        let mut w = BinaryWriter::new(Vec::new());
        w.write_str("hé").unwrap();
        assert_eq!(w.get_ref().as_slice(), &[3, 0, 0, 0, b'h', 0xc3, 0xa9]);
    }
}
