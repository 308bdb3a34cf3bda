//! Lazily-created temp storage for single-use asset sources.
//!
//! A generated asset may only be produced once per mount. The first open
//! copies its bytes into a temp file; every later open reads that file.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use shrinkfs_archive::{Asset, AssetId};
use tempfile::TempDir;

use crate::settings::SpillSettings;

/// One spilled asset. `None` until the first successful spill.
type Slot = Arc<Mutex<Option<PathBuf>>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Per-mount spill storage keyed by asset identity.
///
/// The temp directory is only created on the first spill. Concurrent opens
/// of the same asset spill exactly once: the map lock is held just long
/// enough to fetch the asset's slot, and the slot lock just long enough to
/// fill it.
pub struct SpillCache {
    settings: SpillSettings,
    dir: Mutex<Option<TempDir>>,
    slots: Mutex<HashMap<AssetId, Slot>>,
    spills: AtomicUsize,
    closed: AtomicBool,
}

impl SpillCache {
    pub fn new(settings: SpillSettings) -> Self {
        Self {
            settings,
            dir: Mutex::new(None),
            slots: Mutex::new(HashMap::new()),
            spills: AtomicUsize::new(0),
            closed: AtomicBool::new(false),
        }
    }

    /// Open the cached copy of `asset`, spilling it first if needed.
    pub fn open(&self, asset: &Asset) -> io::Result<File> {
        if self.is_closed() {
            return Err(io::Error::other("spill cache is closed"));
        }

        let slot = Arc::clone(lock(&self.slots).entry(asset.id()).or_default());
        let path = {
            let mut spilled = lock(&slot);
            match spilled.as_ref() {
                Some(path) => path.clone(),
                None => {
                    let path = self.spill(asset)?;
                    *spilled = Some(path.clone());
                    path
                }
            }
        };
        File::open(path)
    }

    fn spill(&self, asset: &Asset) -> io::Result<PathBuf> {
        let dir = self.ensure_dir()?;
        let mut file = tempfile::Builder::new()
            .prefix(&format!("{}-", asset.id()))
            .tempfile_in(&dir)?;

        let mut reader = asset.open()?;
        let written = io::copy(&mut reader, file.as_file_mut())?;
        let (_, path) = file.keep().map_err(|e| e.error)?;

        self.spills.fetch_add(1, Ordering::SeqCst);
        log::debug!("Spilled {} ({} bytes) to {}", asset.id(), written, path.display());
        Ok(path)
    }

    fn ensure_dir(&self) -> io::Result<PathBuf> {
        let mut dir = lock(&self.dir);
        // `close` sets the flag before taking the directory, so checking under
        // the lock keeps a racing open from creating a fresh one afterwards.
        if self.is_closed() {
            return Err(io::Error::other("spill cache is closed"));
        }
        if let Some(existing) = dir.as_ref() {
            return Ok(existing.path().to_path_buf());
        }

        let mut builder = tempfile::Builder::new();
        builder.prefix(&self.settings.temp_prefix);
        let created = match &self.settings.temp_root {
            Some(root) => builder.tempdir_in(root)?,
            None => builder.tempdir()?,
        };
        let path = created.path().to_path_buf();
        log::debug!("Created spill directory {}", path.display());
        *dir = Some(created);
        Ok(path)
    }

    /// How many times an asset source has been spilled.
    pub fn spill_count(&self) -> usize {
        self.spills.load(Ordering::SeqCst)
    }

    /// Number of assets currently held in spill storage.
    pub fn len(&self) -> usize {
        lock(&self.slots)
            .values()
            .filter(|slot| lock(slot).is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The spill directory, if one has been created.
    pub fn directory(&self) -> Option<PathBuf> {
        lock(&self.dir).as_ref().map(|d| d.path().to_path_buf())
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Release all spill storage.
    ///
    /// Safe to call repeatedly. Cleanup is best effort: failures are logged
    /// and the remaining entries are still released.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }

        let slots = std::mem::take(&mut *lock(&self.slots));
        for (id, slot) in slots {
            if let Some(path) = lock(&slot).take() {
                if let Err(e) = fs::remove_file(&path) {
                    log::warn!("Could not remove spilled {} at {}: {}", id, path.display(), e);
                }
            }
        }

        if let Some(dir) = lock(&self.dir).take() {
            let path = dir.path().to_path_buf();
            if let Err(e) = dir.close() {
                log::warn!("Could not remove spill directory {}: {}", path.display(), e);
            }
        }
    }
}

impl Drop for SpillCache {
    fn drop(&mut self) {
        self.close();
    }
}

impl Default for SpillCache {
    fn default() -> Self {
        Self::new(SpillSettings::default())
    }
}
