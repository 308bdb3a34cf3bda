//! Byte-producing sources held by asset leaves.

use std::fmt;
use std::fs::File;
use std::io::{self, Cursor, Read};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;

static ASSET_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Most bytes `read_all` will preallocate from a declared length.
const PREALLOC_LIMIT: u64 = 1 << 20;

/// Process-unique identity of an [`Asset`].
///
/// Caches that need "the same leaf" semantics key on this rather than on the
/// path, so an asset shared between archives (or re-added under another path)
/// keeps one identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetId(u64);

impl AssetId {
    fn next() -> Self {
        AssetId(ASSET_ID_COUNTER.fetch_add(1, Ordering::SeqCst))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "asset-{}", self.0)
    }
}

/// A boxed reader returned when an asset source is opened.
pub type AssetReader = Box<dyn Read + Send>;

/// A lazily-evaluated producer of asset content.
///
/// Generators may have side effects (consuming a socket, running a build
/// step), so consumers must not assume invoking one twice is harmless.
pub type Generator = Box<dyn Fn() -> io::Result<AssetReader> + Send + Sync>;

/// Where an asset's bytes come from.
pub enum AssetSource {
    /// In-memory buffer. Random access, re-openable.
    Bytes(Bytes),
    /// A file on the host filesystem, reopened on every open.
    File(PathBuf),
    /// A generator closure. Not safely re-openable.
    Generated(Generator),
}

impl fmt::Debug for AssetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetSource::Bytes(b) => f.debug_tuple("Bytes").field(&b.len()).finish(),
            AssetSource::File(p) => f.debug_tuple("File").field(p).finish(),
            AssetSource::Generated(_) => f.write_str("Generated(..)"),
        }
    }
}

/// The content of an asset leaf.
#[derive(Debug)]
pub struct Asset {
    id: AssetId,
    source: AssetSource,
    declared_len: Option<u64>,
}

impl Asset {
    fn with_source(source: AssetSource, declared_len: Option<u64>) -> Self {
        Self {
            id: AssetId::next(),
            source,
            declared_len,
        }
    }

    /// An asset backed by an in-memory buffer.
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        let len = bytes.len() as u64;
        Self::with_source(AssetSource::Bytes(bytes), Some(len))
    }

    /// An asset backed by a static byte slice.
    pub fn from_static(bytes: &'static [u8]) -> Self {
        Self::from_bytes(Bytes::from_static(bytes))
    }

    /// An asset backed by a UTF-8 string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self::from_bytes(Bytes::from(s.into()))
    }

    /// An asset backed by a host file.
    ///
    /// The length is taken from the file's metadata if it can be read now;
    /// the file itself is only opened when the asset is opened.
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let declared_len = std::fs::metadata(&path).ok().map(|m| m.len());
        Self::with_source(AssetSource::File(path), declared_len)
    }

    /// An asset produced on demand by `generator`.
    pub fn generated<F>(generator: F) -> Self
    where
        F: Fn() -> io::Result<AssetReader> + Send + Sync + 'static,
    {
        Self::with_source(AssetSource::Generated(Box::new(generator)), None)
    }

    /// Override the declared content length.
    #[must_use]
    pub fn with_len(mut self, len: u64) -> Self {
        self.declared_len = Some(len);
        self
    }

    pub fn id(&self) -> AssetId {
        self.id
    }

    pub fn source(&self) -> &AssetSource {
        &self.source
    }

    /// The declared content length, if known.
    pub fn declared_len(&self) -> Option<u64> {
        self.declared_len
    }

    /// Whether the source may be opened again on every read without
    /// re-running a possibly side-effecting producer.
    pub fn is_repeatable(&self) -> bool {
        match self.source {
            AssetSource::Bytes(_) | AssetSource::File(_) => true,
            AssetSource::Generated(_) => false,
        }
    }

    /// Open the source directly.
    ///
    /// For [`AssetSource::Generated`] this invokes the generator; callers
    /// that need repeatable reads should go through a cache instead.
    pub fn open(&self) -> io::Result<AssetReader> {
        match &self.source {
            AssetSource::Bytes(bytes) => Ok(Box::new(Cursor::new(bytes.clone()))),
            AssetSource::File(path) => Ok(Box::new(File::open(path)?)),
            AssetSource::Generated(generator) => generator(),
        }
    }

    /// Read the whole content into memory.
    pub fn read_all(&self) -> io::Result<Bytes> {
        if let AssetSource::Bytes(bytes) = &self.source {
            return Ok(bytes.clone());
        }
        let hint = self.declared_len.unwrap_or(0).min(PREALLOC_LIMIT);
        let mut buf = Vec::with_capacity(usize::try_from(hint).unwrap_or(0));
        self.open()?.read_to_end(&mut buf)?;
        Ok(Bytes::from(buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    #[test]
    fn ids_are_unique() {
        let a = Asset::from_static(b"a");
        let b = Asset::from_static(b"a");
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn bytes_asset_is_repeatable() {
        let asset = Asset::from_static(b"hello");
        assert!(asset.is_repeatable());
        assert_eq!(asset.declared_len(), Some(5));
        assert_eq!(&asset.read_all().unwrap()[..], b"hello");
        assert_eq!(&asset.read_all().unwrap()[..], b"hello");
    }

    #[test]
    fn file_asset_reads_host_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("payload.bin");
        std::fs::write(&path, b"on disk").unwrap();

        let asset = Asset::from_file(&path);
        assert!(asset.is_repeatable());
        assert_eq!(asset.declared_len(), Some(7));
        assert_eq!(&asset.read_all().unwrap()[..], b"on disk");
    }

    #[test]
    fn missing_file_fails_on_open() {
        let asset = Asset::from_file("/definitely/not/here");
        assert_eq!(asset.declared_len(), None);
        let err = asset.open().err().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn generated_asset_invokes_generator_per_open() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let asset = Asset::generated(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(Cursor::new(b"gen".to_vec())) as AssetReader)
        });

        assert!(!asset.is_repeatable());
        assert_eq!(&asset.read_all().unwrap()[..], b"gen");
        assert_eq!(&asset.read_all().unwrap()[..], b"gen");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn with_len_overrides() {
        let asset = Asset::generated(|| Ok(Box::new(io::empty()) as AssetReader)).with_len(42);
        assert_eq!(asset.declared_len(), Some(42));
    }

    #[test]
    fn declared_len_is_only_a_hint() {
        let asset = Asset::generated(|| Ok(Box::new(Cursor::new(b"x".to_vec())) as AssetReader))
            .with_len(u64::MAX);
        assert_eq!(&asset.read_all().unwrap()[..], b"x");
    }

    #[test]
    fn debug_hides_generator() {
        let asset = Asset::generated(|| Ok(Box::new(io::empty()) as AssetReader));
        assert!(format!("{:?}", asset).contains("Generated(..)"));
    }
}
