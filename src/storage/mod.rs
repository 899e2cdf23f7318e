//! # Storage Module - Pet Record Persistence
//!
//! The pet lives in a single JSON document, by default `<data_dir>/tamagotchi.json`.
//!
//! - **Whole-record writes**: every save truncates and rewrites the file; last write wins
//! - **File Locking**: fs2 advisory locks (shared for read, exclusive for write)
//! - **Scoped handles**: files are opened per call and closed on return
//! - **Lazy creation**: the first load creates and saves a fresh egg
//!
//! ```text
//! data/
//! └── tamagotchi.json   ← the one and only pet
//! ```
//!
//! Callers that run read-modify-write cycles concurrently must serialize them
//! themselves; [`crate::service::PetService`] does so with a single mutex.

use chrono::{DateTime, Utc};
use fs2::FileExt;
use log::{debug, info};
use std::fs;
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::config::StorageConfig;
use crate::logutil::escape_log;
use crate::pet::{PetRecord, PetResult};

/// File-backed store for the single pet record.
#[derive(Debug, Clone)]
pub struct PetStore {
    path: PathBuf,
    default_name: String,
}

impl PetStore {
    pub fn new(path: impl Into<PathBuf>, default_name: &str) -> Self {
        PetStore {
            path: path.into(),
            default_name: default_name.to_string(),
        }
    }

    /// Build a store from the `[storage]` section.
    pub fn from_config(storage: &StorageConfig, default_name: &str) -> Self {
        Self::new(Path::new(&storage.data_dir).join(&storage.pet_file), default_name)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn default_name(&self) -> &str {
        &self.default_name
    }

    /// Read the stored record, or `None` when no pet has been created yet.
    pub fn load(&self) -> PetResult<Option<PetRecord>> {
        let mut f = match fs::OpenOptions::new().read(true).open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        f.lock_shared()?;
        let mut s = String::new();
        let read = f.read_to_string(&mut s);
        f.unlock()?;
        read?;
        let cleaned = s.trim_start_matches('\0').trim();
        if cleaned.is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(cleaned)?))
    }

    /// Load the pet, laying a fresh egg on first access.
    pub fn load_or_create(&self, now: DateTime<Utc>) -> PetResult<PetRecord> {
        match self.load()? {
            Some(pet) => Ok(pet),
            None => {
                let pet = PetRecord::new(&self.default_name, now);
                self.save(&pet)?;
                info!(
                    "storage: created new pet '{}' at {}",
                    escape_log(&pet.name),
                    self.path.display()
                );
                Ok(pet)
            }
        }
    }

    /// Overwrite the stored record with `pet`.
    pub fn save(&self, pet: &PetRecord) -> PetResult<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }
        let data = serde_json::to_string_pretty(pet)?;
        let mut f = fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&self.path)?;
        f.lock_exclusive()?;
        // Truncate only once the lock is held so readers never see a half-empty file
        let written = f
            .set_len(0)
            .and_then(|_| f.seek(SeekFrom::Start(0)))
            .and_then(|_| f.write_all(data.as_bytes()))
            .and_then(|_| f.flush())
            .and_then(|_| f.sync_all());
        f.unlock()?;
        written?;
        debug!("storage: saved pet record ({} bytes)", data.len());
        Ok(())
    }

    /// Discard the current pet and store a fresh egg.
    pub fn reset(&self, now: DateTime<Utc>) -> PetResult<PetRecord> {
        let pet = PetRecord::new(&self.default_name, now);
        self.save(&pet)?;
        info!("storage: pet reset at {}", self.path.display());
        Ok(pet)
    }
}
