//! Gallery storage capability and its two implementations.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use log::{debug, info};
use uuid::Uuid;

use super::{GalleryError, Screenshot};

/// Storage capability for gallery records.
///
/// Implementations must tolerate concurrent callers: overlapping captures
/// from a short interval may insert at the same time.
pub trait GalleryStore: Send + Sync {
    /// All records, newest first.
    fn list(&self) -> Result<Vec<Screenshot>, GalleryError>;

    fn get(&self, id: Uuid) -> Result<Screenshot, GalleryError>;

    /// Adds a record at the front (newest first, like the original gallery).
    fn insert(&self, shot: Screenshot) -> Result<(), GalleryError>;

    fn rename(&self, id: Uuid, name: &str) -> Result<(), GalleryError>;

    /// Adds a tag; duplicates and blank tags are ignored.
    fn add_tag(&self, id: Uuid, tag: &str) -> Result<(), GalleryError>;

    fn remove_tag(&self, id: Uuid, tag: &str) -> Result<(), GalleryError>;

    fn delete(&self, id: Uuid) -> Result<(), GalleryError>;

    fn clear(&self) -> Result<(), GalleryError>;
}

/// Resolve a full or prefix id string against the store.
///
/// # Errors
/// [`GalleryError::NotFound`] when nothing matches,
/// [`GalleryError::Ambiguous`] when a prefix matches several records.
pub fn resolve_id(store: &dyn GalleryStore, id_or_prefix: &str) -> Result<Uuid, GalleryError> {
    let needle = id_or_prefix.to_ascii_lowercase();
    let matches: Vec<Uuid> = store
        .list()?
        .iter()
        .map(|s| s.id)
        .filter(|id| id.to_string().starts_with(&needle))
        .collect();

    match matches.as_slice() {
        [] => Err(GalleryError::NotFound(id_or_prefix.to_string())),
        [id] => Ok(*id),
        _ => Err(GalleryError::Ambiguous(id_or_prefix.to_string())),
    }
}

/// Flat JSON blob on disk.
///
/// Every mutation rewrites the whole document; a mutex serializes the
/// read-modify-write cycle so concurrent captures cannot clobber each other.
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_records(&self) -> Result<Vec<Screenshot>, GalleryError> {
        if !self.path.exists() {
            debug!("gallery blob {} not found, starting empty", self.path.display());
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&raw)?)
    }

    fn save_records(&self, records: &[Screenshot]) -> Result<(), GalleryError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write-then-rename keeps the blob intact if we die mid-write.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec(records)?)?;
        fs::rename(&tmp, &self.path)?;

        debug!(
            "gallery blob {} now holds {} record(s)",
            self.path.display(),
            records.len()
        );
        Ok(())
    }

    fn with_records<T>(
        &self,
        f: impl FnOnce(&mut Vec<Screenshot>) -> Result<T, GalleryError>,
    ) -> Result<T, GalleryError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut records = self.load_records()?;
        let value = f(&mut records)?;
        self.save_records(&records)?;
        Ok(value)
    }
}

impl GalleryStore for JsonFileStore {
    fn list(&self) -> Result<Vec<Screenshot>, GalleryError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        self.load_records()
    }

    fn get(&self, id: Uuid) -> Result<Screenshot, GalleryError> {
        self.list()?
            .into_iter()
            .find(|s| s.id == id)
            .ok_or_else(|| GalleryError::NotFound(id.to_string()))
    }

    fn insert(&self, shot: Screenshot) -> Result<(), GalleryError> {
        info!("storing screenshot '{}' ({} bytes)", shot.name, shot.data.len());
        self.with_records(|records| {
            records.insert(0, shot);
            Ok(())
        })
    }

    fn rename(&self, id: Uuid, name: &str) -> Result<(), GalleryError> {
        self.with_records(|records| {
            let shot = find_mut(records, id)?;
            shot.name = name.trim().to_string();
            Ok(())
        })
    }

    fn add_tag(&self, id: Uuid, tag: &str) -> Result<(), GalleryError> {
        self.with_records(|records| {
            let shot = find_mut(records, id)?;
            push_tag(shot, tag);
            Ok(())
        })
    }

    fn remove_tag(&self, id: Uuid, tag: &str) -> Result<(), GalleryError> {
        self.with_records(|records| {
            let shot = find_mut(records, id)?;
            shot.tags.retain(|t| t != tag);
            Ok(())
        })
    }

    fn delete(&self, id: Uuid) -> Result<(), GalleryError> {
        self.with_records(|records| {
            let before = records.len();
            records.retain(|s| s.id != id);
            if records.len() == before {
                return Err(GalleryError::NotFound(id.to_string()));
            }
            Ok(())
        })
    }

    fn clear(&self) -> Result<(), GalleryError> {
        self.with_records(|records| {
            records.clear();
            Ok(())
        })
    }
}

/// In-memory store for tests and for running without a data directory.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<Vec<Screenshot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GalleryStore for MemoryStore {
    fn list(&self) -> Result<Vec<Screenshot>, GalleryError> {
        Ok(self.records.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn get(&self, id: Uuid) -> Result<Screenshot, GalleryError> {
        self.list()?
            .into_iter()
            .find(|s| s.id == id)
            .ok_or_else(|| GalleryError::NotFound(id.to_string()))
    }

    fn insert(&self, shot: Screenshot) -> Result<(), GalleryError> {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(0, shot);
        Ok(())
    }

    fn rename(&self, id: Uuid, name: &str) -> Result<(), GalleryError> {
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        find_mut(&mut records, id)?.name = name.trim().to_string();
        Ok(())
    }

    fn add_tag(&self, id: Uuid, tag: &str) -> Result<(), GalleryError> {
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        push_tag(find_mut(&mut records, id)?, tag);
        Ok(())
    }

    fn remove_tag(&self, id: Uuid, tag: &str) -> Result<(), GalleryError> {
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        find_mut(&mut records, id)?.tags.retain(|t| t != tag);
        Ok(())
    }

    fn delete(&self, id: Uuid) -> Result<(), GalleryError> {
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        let before = records.len();
        records.retain(|s| s.id != id);
        if records.len() == before {
            return Err(GalleryError::NotFound(id.to_string()));
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), GalleryError> {
        self.records.lock().unwrap_or_else(|e| e.into_inner()).clear();
        Ok(())
    }
}

fn find_mut(records: &mut [Screenshot], id: Uuid) -> Result<&mut Screenshot, GalleryError> {
    records
        .iter_mut()
        .find(|s| s.id == id)
        .ok_or_else(|| GalleryError::NotFound(id.to_string()))
}

fn push_tag(shot: &mut Screenshot, tag: &str) {
    let tag = tag.trim();
    if !tag.is_empty() && !shot.tags.iter().any(|t| t == tag) {
        shot.tags.push(tag.to_string());
    }
}
