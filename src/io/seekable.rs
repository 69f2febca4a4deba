//! Random-access byte sources
//!
//! TIFF parsing jumps between the header, IFDs and strip data, so every
//! decoder works against this trait instead of a concrete `File`.

use std::io::{self, Read, Seek, SeekFrom};

/// A source that can both read and seek
///
/// Covers buffered files as well as in-memory cursors used by tests.
pub trait SeekableReader: Read + Seek + Send + Sync {}

impl<T: Read + Seek + Send + Sync> SeekableReader for T {}

/// Reads exactly `length` bytes starting at `offset`
///
/// Callers validate the range against the file size first; a short read
/// here surfaces as `UnexpectedEof`.
pub fn read_bytes_at(reader: &mut dyn SeekableReader, offset: u64, length: u64) -> io::Result<Vec<u8>> {
    let length = usize::try_from(length)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "block larger than address space"))?;
    reader.seek(SeekFrom::Start(offset))?;
    let mut buffer = vec![0u8; length];
    reader.read_exact(&mut buffer)?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reads_a_range() {
        let mut cursor = Cursor::new((0u8..16).collect::<Vec<_>>());
        assert_eq!(read_bytes_at(&mut cursor, 4, 3).unwrap(), vec![4, 5, 6]);
    }

    #[test]
    fn short_range_is_unexpected_eof() {
        let mut cursor = Cursor::new(vec![0u8; 4]);
        let err = read_bytes_at(&mut cursor, 2, 8).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
