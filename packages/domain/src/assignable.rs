//! Typed façades over an [`Archive`].

use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path as HostPath;
use std::sync::Arc;

use bytes::Bytes;
use shrinkfs_archive::{Archive, ArchivePath, Asset, Result as ArchiveResult};
use shrinkfs_zip::ExportError;

use crate::domain::Domain;
use crate::error::Result;

/// A typed view of an archive that a domain can construct.
///
/// Every façade owns exactly one `Archive`; converting between façades
/// with [`Assignable::view_as`] hands that archive over unchanged.
pub trait Assignable: Send + Sized + 'static {
    /// Appended to generated archive names, e.g. `".jar"`.
    const EXTENSION: &'static str;

    fn from_archive(archive: Archive) -> Self;

    fn archive(&self) -> &Archive;

    fn archive_mut(&mut self) -> &mut Archive;

    fn into_archive(self) -> Archive;

    fn name(&self) -> &str {
        self.archive().name()
    }

    /// Re-wrap this archive as another façade type resolved through `domain`.
    fn view_as<U: Assignable>(self, domain: &Domain) -> Result<U> {
        domain.archive_factory().wrap(self.into_archive())
    }
}

macro_rules! assignable {
    ($ty:ident, $ext:expr) => {
        impl Assignable for $ty {
            const EXTENSION: &'static str = $ext;

            fn from_archive(archive: Archive) -> Self {
                Self { archive }
            }

            fn archive(&self) -> &Archive {
                &self.archive
            }

            fn archive_mut(&mut self) -> &mut Archive {
                &mut self.archive
            }

            fn into_archive(self) -> Archive {
                self.archive
            }
        }
    };
}

/// An archive with no particular layout.
#[derive(Debug)]
pub struct GenericArchive {
    archive: Archive,
}

assignable!(GenericArchive, "");

impl GenericArchive {
    /// Add `asset` at `path`, creating intermediate directories.
    pub fn add(&mut self, path: &ArchivePath, asset: Asset) -> ArchiveResult<&mut Self> {
        self.archive.add_asset(path, asset)?;
        Ok(self)
    }

    pub fn add_directory(&mut self, path: &ArchivePath) -> ArchiveResult<&mut Self> {
        self.archive.add_directory(path)?;
        Ok(self)
    }
}

/// Location of the manifest inside a Java archive.
pub const MANIFEST_PATH: &str = "META-INF/MANIFEST.MF";

/// A Java archive (`.jar`).
#[derive(Debug)]
pub struct JavaArchive {
    archive: Archive,
}

assignable!(JavaArchive, ".jar");

impl JavaArchive {
    /// Add a resource at a path relative to the archive root.
    pub fn add_resource(&mut self, resource: &str, asset: Asset) -> ArchiveResult<&mut Self> {
        let path = ArchivePath::parse(resource)?;
        self.archive.add_asset(&path, asset)?;
        Ok(self)
    }

    /// Add a resource under `META-INF/`.
    pub fn add_meta_inf_resource(
        &mut self,
        resource: &str,
        asset: Asset,
    ) -> ArchiveResult<&mut Self> {
        let path = ArchivePath::parse("META-INF")?.join(&ArchivePath::parse(resource)?);
        self.archive.add_asset(&path, asset)?;
        Ok(self)
    }

    /// Set `META-INF/MANIFEST.MF`, replacing any previous manifest.
    pub fn set_manifest(&mut self, asset: Asset) -> ArchiveResult<&mut Self> {
        self.add_resource(MANIFEST_PATH, asset)
    }

    pub fn manifest(&self) -> Option<&Arc<Asset>> {
        let path = ArchivePath::parse(MANIFEST_PATH).ok()?;
        self.archive.get(&path)?.as_asset()
    }
}

/// Serializes the wrapped archive as a zip container.
#[derive(Debug)]
pub struct ZipExporter {
    archive: Archive,
}

assignable!(ZipExporter, ".zip");

impl ZipExporter {
    pub fn export_bytes(&self) -> std::result::Result<Bytes, ExportError> {
        shrinkfs_zip::export_bytes(&self.archive)
    }

    pub fn export_to<W: Write + Seek>(&self, writer: W) -> std::result::Result<W, ExportError> {
        shrinkfs_zip::export_to(&self.archive, writer)
    }

    /// Write the container to a host file, replacing it if present.
    pub fn export_to_file(
        &self,
        path: impl AsRef<HostPath>,
    ) -> std::result::Result<(), ExportError> {
        let path = path.as_ref();
        let writer = self.export_to(BufWriter::new(File::create(path)?))?;
        writer.into_inner().map_err(|e| e.into_error())?.sync_all()?;
        log::debug!("Exported {} to {}", self.archive.name(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shrinkfs_archive::{archive_path, ArchiveError};

    #[test]
    fn java_archive_resources() {
        let mut jar = JavaArchive::from_archive(Archive::new("app.jar"));
        jar.add_resource("com/acme/App.class", Asset::from_static(b"cafebabe"))
            .unwrap()
            .set_manifest(Asset::from_static(b"Manifest-Version: 1.0\n"))
            .unwrap()
            .add_meta_inf_resource("services/x", Asset::from_static(b"impl"))
            .unwrap();

        assert!(jar.archive().contains(&archive_path!("com/acme/App.class")));
        assert!(jar.archive().contains(&archive_path!("META-INF/services/x")));
        let manifest = jar.manifest().unwrap().read_all().unwrap();
        assert_eq!(&manifest[..], b"Manifest-Version: 1.0\n");
        assert_eq!(jar.name(), "app.jar");
    }

    #[test]
    fn add_resource_rejects_escaping_path() {
        let mut jar = JavaArchive::from_archive(Archive::new("app.jar"));
        assert!(matches!(
            jar.add_resource("../outside", Asset::from_static(b"x")),
            Err(ArchiveError::Path(_))
        ));
    }

    #[test]
    fn generic_archive_adds() {
        let mut generic = GenericArchive::from_archive(Archive::new("bundle"));
        generic
            .add_directory(&archive_path!("empty"))
            .unwrap()
            .add(&archive_path!("a/b"), Asset::from_static(b"b"))
            .unwrap();
        assert_eq!(generic.archive().walk().count(), 3);
        assert_eq!(generic.into_archive().name(), "bundle");
    }

    #[test]
    fn zip_exporter_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.zip");

        let mut archive = Archive::new("out.zip");
        archive
            .add_asset(&archive_path!("a/b/c/d.txt"), Asset::from_static(b"d"))
            .unwrap();
        let exporter = ZipExporter::from_archive(archive);
        exporter.export_to_file(&target).unwrap();

        let mut copy = Archive::new("copy");
        shrinkfs_zip::import_file(&mut copy, &target).unwrap();
        assert!(copy.contains(&archive_path!("a/b/c/d.txt")));
        assert!(exporter.export_bytes().unwrap().starts_with(b"PK"));
    }
}
