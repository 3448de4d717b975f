use byteorder::{ByteOrder, LittleEndian};

use crate::error::SourceQueryError;

/// Sequential little-endian reader over a received packet.
///
/// Every read is checked. A read that would run past the end returns
/// [SourceQueryError::ShortBuffer] and leaves the position where it was.
#[derive(Debug, Clone)]
pub struct PacketReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> PacketReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        PacketReader { data, pos: 0 }
    }

    /// Offset of the next unread byte.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// The unread bytes, without consuming them.
    pub fn rest(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    /// Take the next `n` bytes as a view into the underlying buffer.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], SourceQueryError> {
        let remaining = self.remaining();
        if remaining < n {
            return Err(SourceQueryError::ShortBuffer { needed: n, remaining });
        }
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], SourceQueryError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, SourceQueryError> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, SourceQueryError> {
        self.read_bytes(2).map(LittleEndian::read_u16)
    }

    pub fn read_u32(&mut self) -> Result<u32, SourceQueryError> {
        self.read_bytes(4).map(LittleEndian::read_u32)
    }

    pub fn read_i32(&mut self) -> Result<i32, SourceQueryError> {
        self.read_bytes(4).map(LittleEndian::read_i32)
    }

    /// Read a null-terminated UTF-8 string and step past the terminator.
    ///
    /// A missing terminator is a short buffer, not an implicit end of string.
    pub fn read_string(&mut self) -> Result<String, SourceQueryError> {
        let rest = self.rest();
        let len = rest.iter().position(|&c| c == 0).ok_or(SourceQueryError::ShortBuffer {
            needed: rest.len() + 1,
            remaining: rest.len(),
        })?;
        let value = std::str::from_utf8(&rest[..len])?.to_owned();
        self.pos += len + 1;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_little_endian_widths_in_sequence() {
        let data = [0xFF, 0xFF, 0xFF, 0xFF, 0x41, 0x34, 0x12, 0x78, 0x56, 0x34, 0x12];
        let mut reader = PacketReader::new(&data);

        assert_eq!(reader.read_i32().unwrap(), -1);
        assert_eq!(reader.read_u8().unwrap(), 0x41);
        assert_eq!(reader.read_u16().unwrap(), 0x1234);
        assert_eq!(reader.position(), 7);
        assert_eq!(reader.read_u32().unwrap(), 0x1234_5678);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn failed_read_keeps_position() {
        let data = [1u8, 2, 3];
        let mut reader = PacketReader::new(&data);
        reader.read_u8().unwrap();

        match reader.read_u32() {
            Err(SourceQueryError::ShortBuffer { needed: 4, remaining: 2 }) => {}
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(reader.position(), 1);
        assert_eq!(reader.read_u16().unwrap(), 0x0302);
    }

    #[test]
    fn read_bytes_is_a_view() {
        let data = [9u8, 8, 7, 6, 5];
        let mut reader = PacketReader::new(&data);
        reader.read_u8().unwrap();

        let view = reader.read_bytes(3).unwrap();
        assert_eq!(view, &data[1..4]);
        assert_eq!(reader.rest(), &[5]);
        assert_eq!(reader.read_array::<1>().unwrap(), [5]);
    }

    #[test]
    fn strings_stop_at_terminator() {
        let data = b"de_dust2\0cstrike\0";
        let mut reader = PacketReader::new(data);

        assert_eq!(reader.read_string().unwrap(), "de_dust2");
        assert_eq!(reader.read_string().unwrap(), "cstrike");
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn unterminated_string_is_short() {
        let data = b"no end";
        let mut reader = PacketReader::new(data);

        assert!(matches!(reader.read_string(), Err(SourceQueryError::ShortBuffer { .. })));
        assert_eq!(reader.position(), 0);
    }
}
