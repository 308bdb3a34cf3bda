//! Byte streams handed out by `open_stream`.

use std::fs::File;
use std::io::{self, Cursor, Read, Seek, SeekFrom};

use bytes::Bytes;

/// A readable, seekable view of an asset's content, positioned at offset 0
/// when returned.
#[derive(Debug)]
pub enum AssetStream {
    /// Served straight from an in-memory buffer.
    Memory(Cursor<Bytes>),
    /// Served from a host file: the asset's own file or its spilled copy.
    File(File),
}

impl AssetStream {
    pub fn from_bytes(bytes: Bytes) -> Self {
        AssetStream::Memory(Cursor::new(bytes))
    }

    /// Read the rest of the stream into a vector.
    pub fn read_to_vec(&mut self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.read_to_end(&mut buf)?;
        Ok(buf)
    }
}

impl Read for AssetStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            AssetStream::Memory(cursor) => cursor.read(buf),
            AssetStream::File(file) => file.read(buf),
        }
    }
}

impl Seek for AssetStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match self {
            AssetStream::Memory(cursor) => cursor.seek(pos),
            AssetStream::File(file) => file.seek(pos),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_stream_reads_and_seeks() {
        let mut stream = AssetStream::from_bytes(Bytes::from_static(b"0123456789"));
        let mut head = [0u8; 3];
        stream.read_exact(&mut head).unwrap();
        assert_eq!(&head, b"012");

        stream.seek(SeekFrom::Start(7)).unwrap();
        assert_eq!(stream.read_to_vec().unwrap(), b"789");
    }

    #[test]
    fn file_stream_reads() {
        let mut tmp = tempfile::tempfile().unwrap();
        std::io::Write::write_all(&mut tmp, b"from disk").unwrap();
        tmp.seek(SeekFrom::Start(0)).unwrap();

        let mut stream = AssetStream::File(tmp);
        assert_eq!(stream.read_to_vec().unwrap(), b"from disk");
    }
}
