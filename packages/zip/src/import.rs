//! Populate archives from zip containers and host directories.

use std::fs::File;
use std::io::{self, Cursor, Read, Seek};
use std::path::Path as HostPath;

use bytes::Bytes;
use shrinkfs_archive::{Archive, ArchivePath, Asset};
use zip::ZipArchive;

use crate::error::ImportError;

/// Upper bound on how much of an entry's declared size is trusted for
/// preallocation. The header value is untrusted input.
const SIZE_HINT_LIMIT: u64 = 1 << 20;

/// Import a zip container held in memory.
///
/// Directory entries become directories and file entries become in-memory
/// assets, so the result has the same shape as an archive built by hand
/// with `add_directory`/`add_asset`.
pub fn import_bytes(
    archive: &mut Archive,
    source_id: &str,
    bytes: impl Into<Bytes>,
) -> Result<(), ImportError> {
    import_reader(archive, source_id, Cursor::new(bytes.into()))
}

/// Import a zip container from a host file.
pub fn import_file(archive: &mut Archive, path: impl AsRef<HostPath>) -> Result<(), ImportError> {
    let path = path.as_ref();
    let source_id = path.display().to_string();
    let file = File::open(path).map_err(|error| ImportError::Io {
        source_id: source_id.clone(),
        error,
    })?;
    import_reader(archive, &source_id, file)
}

/// Import a zip container from any seekable reader.
pub fn import_reader<R: Read + Seek>(
    archive: &mut Archive,
    source_id: &str,
    reader: R,
) -> Result<(), ImportError> {
    let malformed = |error| ImportError::Malformed {
        source_id: source_id.to_string(),
        error,
    };

    let mut zip = ZipArchive::new(reader).map_err(malformed)?;
    log::debug!(
        "Importing {} entries from {} into {}",
        zip.len(),
        source_id,
        archive.name()
    );

    for index in 0..zip.len() {
        let mut entry = zip.by_index(index).map_err(malformed)?;
        let name = entry.name().to_string();
        let place = |error| ImportError::Entry {
            source_id: source_id.to_string(),
            entry: name.clone(),
            error,
        };

        let path = ArchivePath::parse(&name).map_err(|e| place(e.into()))?;
        if entry.is_dir() {
            archive.add_directory(&path).map_err(place)?;
            continue;
        }
        if path.is_root() {
            // A nameless file entry has nowhere to go.
            return Err(place(shrinkfs_archive::ArchiveError::RootPath));
        }

        let hint = usize::try_from(entry.size().min(SIZE_HINT_LIMIT)).unwrap_or(0);
        let mut content = Vec::with_capacity(hint);
        entry
            .read_to_end(&mut content)
            .map_err(|error| ImportError::Io {
                source_id: source_id.to_string(),
                error,
            })?;
        archive
            .add_asset(&path, Asset::from_bytes(content))
            .map_err(place)?;
    }
    Ok(())
}

/// Import the content of a host directory.
///
/// Files are added as lazily-read [`Asset::from_file`] assets; nothing is
/// read until an asset is opened. Entries are visited in file-name order.
/// Symlinks are followed; other non-regular entries are skipped.
pub fn import_directory(archive: &mut Archive, root: impl AsRef<HostPath>) -> Result<(), ImportError> {
    let root = root.as_ref();
    let source_id = root.display().to_string();
    let io_error = |error: io::Error| ImportError::Io {
        source_id: source_id.clone(),
        error,
    };

    for entry in walkdir::WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| io_error(e.into()))?;
        if entry.depth() == 0 {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(root)
            .map_err(|e| io_error(io::Error::other(e)))?;
        let segments: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        let path = ArchivePath::try_from_segments(segments).map_err(|e| ImportError::Entry {
            source_id: source_id.clone(),
            entry: relative.display().to_string(),
            error: e.into(),
        })?;

        let file_type = entry.file_type();
        let placed = if file_type.is_dir() {
            archive.add_directory(&path)
        } else if file_type.is_file() {
            archive
                .add_asset(&path, Asset::from_file(entry.path()))
                .map(|_| ())
        } else {
            log::warn!("Skipping {} in {}: not a regular file", path, source_id);
            continue;
        };
        placed.map_err(|error| ImportError::Entry {
            source_id: source_id.clone(),
            entry: relative.display().to_string(),
            error,
        })?;
    }
    Ok(())
}
