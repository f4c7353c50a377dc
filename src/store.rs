//! Single-slot storage for the trained artifact.
//!
//! Exactly one artifact exists at a time. A save replaces it wholesale and a
//! load observes either the previous or the new artifact, never a mix.

use crate::artifact::ModelArtifact;
use crate::error::StoreError;
use log::{debug, info};
use parking_lot::RwLock;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;

pub trait ArtifactStore: Send + Sync {
    /// Replace the stored artifact.
    fn save(&self, artifact: &ModelArtifact) -> Result<(), StoreError>;

    /// The stored artifact, or `None` if nothing has been trained yet.
    fn load(&self) -> Result<Option<Arc<ModelArtifact>>, StoreError>;

    fn clear(&self) -> Result<(), StoreError>;
}

/// Artifact kept as JSON at a fixed path.
///
/// Every save writes a uniquely named temporary file in the target's
/// directory, syncs it and renames it over the target. Concurrent writers,
/// whether other handles or other processes, never share a temporary file,
/// and readers see a complete artifact or the previous one. Within one
/// handle a read-write lock serializes writers against readers.
pub struct FileArtifactStore {
    path: PathBuf,
    lock: RwLock<()>,
}

impl FileArtifactStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: RwLock::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    /// Dropping the returned file before `persist` removes it from disk.
    fn write_temp(&self, artifact: &ModelArtifact) -> Result<NamedTempFile, StoreError> {
        let temp = NamedTempFile::new_in(self.dir())?;
        let mut writer = BufWriter::new(temp);
        serde_json::to_writer(&mut writer, artifact)?;
        writer.flush()?;

        let temp = writer.into_inner().map_err(|e| e.into_error())?;
        temp.as_file().sync_all()?;
        Ok(temp)
    }
}

impl ArtifactStore for FileArtifactStore {
    fn save(&self, artifact: &ModelArtifact) -> Result<(), StoreError> {
        let _guard = self.lock.write();

        fs::create_dir_all(self.dir())?;

        let temp = self.write_temp(artifact)?;
        temp.persist(&self.path).map_err(|e| e.error)?;
        info!(
            "Saved artifact (k={}, features={}) to {:?}",
            artifact.k_value(),
            artifact.features().len(),
            self.path
        );
        Ok(())
    }

    fn load(&self) -> Result<Option<Arc<ModelArtifact>>, StoreError> {
        let _guard = self.lock.read();

        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No artifact at {:?}", self.path);
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let artifact: ModelArtifact = serde_json::from_reader(BufReader::new(file))?;
        artifact.validate()?;
        Ok(Some(Arc::new(artifact)))
    }

    fn clear(&self) -> Result<(), StoreError> {
        let _guard = self.lock.write();

        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process slot, for tests and embedding.
#[derive(Default)]
pub struct MemoryArtifactStore {
    slot: RwLock<Option<Arc<ModelArtifact>>>,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ArtifactStore for MemoryArtifactStore {
    fn save(&self, artifact: &ModelArtifact) -> Result<(), StoreError> {
        *self.slot.write() = Some(Arc::new(artifact.clone()));
        Ok(())
    }

    fn load(&self) -> Result<Option<Arc<ModelArtifact>>, StoreError> {
        Ok(self.slot.read().clone())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.slot.write() = None;
        Ok(())
    }
}
