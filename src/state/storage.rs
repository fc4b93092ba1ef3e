// File system operations for storing project documents
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::models::{LoadError, RhythmData};

const PROJECT_EXTENSION: &str = "json";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Project data error: {0}")]
    Data(#[from] LoadError),
    #[error("Failed to get app data directory")]
    NoAppDataDir,
    #[error("Invalid project name: {0:?}")]
    InvalidName(String),
    #[error("Project not found: {0}")]
    NotFound(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Result of a save request
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    Written(PathBuf),
    /// Content matched the last save or load; nothing was written
    Unchanged,
}

/// Get the app data directory for Orbitone
pub fn get_app_data_dir() -> StorageResult<PathBuf> {
    let data_dir = dirs::data_dir().ok_or(StorageError::NoAppDataDir)?;
    let app_dir = data_dir.join("com.orbitone.app");
    fs::create_dir_all(&app_dir)?;
    Ok(app_dir)
}

/// Calculate SHA256 hash of data
pub fn calculate_sha256(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Write through a sibling temp file so readers never see a partial document
fn write_atomic(path: &Path, data: &[u8]) -> StorageResult<()> {
    let tmp_path = path.with_extension("json.tmp");
    {
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(data)?;
        file.sync_all()?;
    }
    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Named project documents in one directory
#[derive(Debug)]
pub struct ProjectStore {
    dir: PathBuf,
    /// Content hash per project name as of the last save or load
    last_hashes: HashMap<String, String>,
}

impl ProjectStore {
    pub fn open(dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(ProjectStore {
            dir,
            last_hashes: HashMap::new(),
        })
    }

    /// Store under `<data dir>/com.orbitone.app/projects`
    pub fn open_default() -> StorageResult<Self> {
        Self::open(get_app_data_dir()?.join("projects"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, name: &str) -> StorageResult<PathBuf> {
        let valid = !name.trim().is_empty()
            && !name.starts_with('.')
            && !name.contains(['/', '\\', ':']);
        if !valid {
            return Err(StorageError::InvalidName(name.to_string()));
        }
        Ok(self.dir.join(format!("{}.{}", name, PROJECT_EXTENSION)))
    }

    /// Save a project, stamping `saved_at` on the written copy.
    /// Skips the write when the content hash matches the last save or load.
    pub fn save(&mut self, name: &str, data: &RhythmData) -> StorageResult<SaveOutcome> {
        let path = self.path_for(name)?;
        let content = data.to_json()?;
        let hash = calculate_sha256(content.as_bytes());

        if path.exists() && self.last_hashes.get(name) == Some(&hash) {
            log::debug!("Project '{}' unchanged, skipping write", name);
            return Ok(SaveOutcome::Unchanged);
        }

        let mut stamped = data.clone();
        stamped.saved_at = Some(Utc::now());
        let json = stamped.to_json()?;
        write_atomic(&path, json.as_bytes())?;

        self.last_hashes.insert(name.to_string(), hash);
        log::info!("Saved project '{}' ({} bytes)", name, json.len());
        Ok(SaveOutcome::Written(path))
    }

    pub fn load(&mut self, name: &str) -> StorageResult<RhythmData> {
        let path = self.path_for(name)?;
        if !path.exists() {
            return Err(StorageError::NotFound(name.to_string()));
        }

        let json = fs::read_to_string(&path)?;
        let data = RhythmData::from_json(&json)?;

        // Hash the normalized form so an immediate save is a no-op
        let hash = calculate_sha256(data.to_json()?.as_bytes());
        self.last_hashes.insert(name.to_string(), hash);
        Ok(data)
    }

    /// Saved project names, sorted
    pub fn list(&self) -> StorageResult<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(PROJECT_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    pub fn delete(&mut self, name: &str) -> StorageResult<()> {
        let path = self.path_for(name)?;
        if !path.exists() {
            return Err(StorageError::NotFound(name.to_string()));
        }
        fs::remove_file(&path)?;
        self.last_hashes.remove(name);
        log::info!("Deleted project '{}'", name);
        Ok(())
    }
}
