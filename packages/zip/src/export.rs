//! Serialize archives as zip containers.

use std::io::{self, Cursor, Seek, Write};

use bytes::Bytes;
use shrinkfs_archive::{Archive, Node};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::ExportError;

/// Write `archive` as a zip container into `writer` and hand the writer back.
///
/// Entries follow `Archive::walk` order. Directories are written as
/// `name/` entries so empty directories survive a round trip.
pub fn export_to<W: Write + Seek>(archive: &Archive, writer: W) -> Result<W, ExportError> {
    let mut zip = ZipWriter::new(writer);

    for (path, node) in archive.walk() {
        let name = path.to_relative_string();
        match node {
            Node::Directory(_) => {
                zip.add_directory(format!("{name}/"), SimpleFileOptions::default())?
            }
            Node::Asset(asset) => {
                let options =
                    SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
                zip.start_file(name, options)?;
                let mut reader = asset.open()?;
                io::copy(&mut reader, &mut zip)?;
            }
        }
    }

    log::debug!("Exported {} as zip", archive.name());
    Ok(zip.finish()?)
}

/// Serialize `archive` into an in-memory zip container.
pub fn export_bytes(archive: &Archive) -> Result<Bytes, ExportError> {
    let cursor = export_to(archive, Cursor::new(Vec::new()))?;
    Ok(Bytes::from(cursor.into_inner()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shrinkfs_archive::{archive_path, Asset};
    use std::io::Read;
    use zip::ZipArchive;

    fn entry_names(bytes: Bytes) -> Vec<String> {
        let mut zip = ZipArchive::new(Cursor::new(bytes)).unwrap();
        (0..zip.len())
            .map(|i| zip.by_index(i).unwrap().name().to_string())
            .collect()
    }

    #[test]
    fn exports_files_and_directories_in_walk_order() {
        let mut archive = Archive::new("t");
        archive
            .add_asset(&archive_path!("my/target/file.ext"), Asset::from_static(b"x"))
            .unwrap();
        archive.add_directory(&archive_path!("empty")).unwrap();

        let names = entry_names(export_bytes(&archive).unwrap());
        assert_eq!(names, vec!["my/", "my/target/", "my/target/file.ext", "empty/"]);
    }

    #[test]
    fn exported_content_matches() {
        let mut archive = Archive::new("t");
        archive
            .add_asset(&archive_path!("data.bin"), Asset::from_static(b"payload bytes"))
            .unwrap();

        let bytes = export_bytes(&archive).unwrap();
        let mut zip = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut content = String::new();
        zip.by_name("data.bin")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "payload bytes");
    }

    #[test]
    fn reimport_preserves_shape() {
        let mut archive = Archive::new("t");
        archive.add_asset(&archive_path!("a/b"), Asset::from_static(b"b")).unwrap();
        archive.add_directory(&archive_path!("c/d")).unwrap();

        let mut copy = Archive::new("copy");
        crate::import_bytes(&mut copy, "t", export_bytes(&archive).unwrap()).unwrap();

        let original: Vec<(String, bool)> =
            archive.walk().map(|(p, n)| (p.to_string(), n.is_asset())).collect();
        let imported: Vec<(String, bool)> =
            copy.walk().map(|(p, n)| (p.to_string(), n.is_asset())).collect();
        assert_eq!(original, imported);
    }

    #[test]
    fn failing_generator_aborts_export() {
        let mut archive = Archive::new("t");
        archive
            .add_asset(
                &archive_path!("broken"),
                Asset::generated(|| Err(io::Error::other("producer failed"))),
            )
            .unwrap();
        let err = export_bytes(&archive).unwrap_err();
        assert!(matches!(err, ExportError::Io(_)));
    }
}
