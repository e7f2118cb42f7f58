use std::io::Read;

use glam::Vec2;

use super::Persistable;
use crate::error::{PersistError, PersistResult};

/// Counterpart of [`BinaryWriter`](super::BinaryWriter). Truncated input
/// surfaces as an `UnexpectedEof` IO error.
pub struct BinaryReader<R: Read> {
    inner: R,
}

impl<R: Read> BinaryReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    fn read_array<const N: usize>(&mut self) -> PersistResult<[u8; N]> {
        let mut buf = [0u8; N];
        self.inner.read_exact(&mut buf)?;
        Ok(buf)
    }

    pub fn read_u8(&mut self) -> PersistResult<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u32(&mut self) -> PersistResult<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_i32(&mut self) -> PersistResult<i32> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    pub fn read_f32(&mut self) -> PersistResult<f32> {
        Ok(f32::from_le_bytes(self.read_array()?))
    }

    pub fn read_bool(&mut self) -> PersistResult<bool> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(PersistError::InvalidBool(other)),
        }
    }

    pub fn read_str(&mut self) -> PersistResult<String> {
        let len = self.read_len()?;
        let mut bytes = Vec::new();
        // `take` keeps a corrupt length from allocating up front.
        (&mut self.inner).take(len as u64).read_to_end(&mut bytes)?;
        if bytes.len() != len {
            return Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof).into());
        }
        Ok(String::from_utf8(bytes)?)
    }

    pub fn read_vec2(&mut self) -> PersistResult<Vec2> {
        let x = self.read_f32()?;
        let y = self.read_f32()?;
        Ok(Vec2::new(x, y))
    }

    pub fn read_len(&mut self) -> PersistResult<usize> {
        Ok(self.read_u32()? as usize)
    }

    pub fn read_persistable<T: Persistable>(&mut self) -> PersistResult<T> {
        T::recover(self)
    }

    /// Read `len` then that many values.
    pub fn read_vec<T: Persistable>(&mut self) -> PersistResult<Vec<T>> {
        let len = self.read_len()?;
        let mut out = Vec::with_capacity(len.min(1024));
        for _ in 0..len {
            out.push(T::recover(self)?);
        }
        Ok(out)
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use std::io::ErrorKind;

    use super::*;

    #[test]
    fn reads_what_was_written() {
        let bytes = [4u8, 3, 2, 1, 0xfe, 0xff, 0xff, 0xff, 0, 2, 0, 0, 0, b'o', b'k'];
        let mut r = BinaryReader::new(&bytes[..]);
        assert_eq!(r.read_u32().unwrap(), 0x0102_0304);
        assert_eq!(r.read_i32().unwrap(), -2);
        assert!(!r.read_bool().unwrap());
        assert_eq!(r.read_str().unwrap(), "ok");
    }

    #[test]
    fn bad_bool_and_utf8() {
        let mut r = BinaryReader::new(&[7u8][..]);
        assert!(matches!(r.read_bool(), Err(PersistError::InvalidBool(7))));

        let mut r = BinaryReader::new(&[2u8, 0, 0, 0, 0xff, 0xfe][..]);
        assert!(matches!(r.read_str(), Err(PersistError::Utf8 { .. })));
    }

    #[test]
    fn truncated_input_is_eof() {
        let mut r = BinaryReader::new(&[1u8, 2][..]);
        match r.read_u32() {
            Err(PersistError::Io { source }) => assert_eq!(source.kind(), ErrorKind::UnexpectedEof),
            other => panic!("expected eof, got {other:?}"),
        }

        // Claims 100 bytes, has 3.
        let mut r = BinaryReader::new(&[100u8, 0, 0, 0, b'a', b'b', b'c'][..]);
        assert!(matches!(r.read_str(), Err(PersistError::Io { .. })));
    }
}
