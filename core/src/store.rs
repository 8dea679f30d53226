//! Saved run storage
//!
//! One UTF-8 `.ghost` file per named run, holding the text form of the
//! recording. Writes go through a temp file and a rename so a crash never
//! leaves a half-written run behind.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{ReplayError, Result};
use crate::replay::Recording;

/// File extension of stored runs
pub const RUN_EXTENSION: &str = "ghost";

/// Directory of serialized recordings
#[derive(Debug, Clone)]
pub struct RecordingStore {
    dir: PathBuf,
}

impl RecordingStore {
    /// Open the store rooted at `dir`, creating the directory if needed
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `name`
    pub fn path_for(&self, name: &str) -> Result<PathBuf> {
        validate_name(name)?;
        Ok(self.dir.join(format!("{name}.{RUN_EXTENSION}")))
    }

    /// Write `recording` under `name`, replacing any previous run
    pub fn save(&self, name: &str, recording: &Recording) -> Result<PathBuf> {
        let path = self.path_for(name)?;
        let tmp = path.with_extension(format!("{RUN_EXTENSION}.tmp"));

        fs::write(&tmp, recording.serialize())?;
        if let Err(e) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }

        debug!(run = name, duration = recording.duration(), path = %path.display(), "run saved");
        Ok(path)
    }

    /// Read the run stored under `name`.
    ///
    /// A missing run is `Ok(None)`; a file that does not parse is
    /// [`ReplayError::MalformedData`].
    pub fn load(&self, name: &str) -> Result<Option<Recording>> {
        let path = self.path_for(name)?;
        let data = match fs::read_to_string(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match Recording::deserialize(&data) {
            Ok(recording) => Ok(Some(recording)),
            Err(e) => {
                warn!(run = name, error = %e, "stored run is corrupt");
                Err(e)
            }
        }
    }

    /// Delete the run stored under `name`. Returns whether it existed.
    pub fn remove(&self, name: &str) -> Result<bool> {
        let path = self.path_for(name)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Names of all stored runs, sorted
    pub fn list(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(RUN_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str())
                && validate_name(stem).is_ok()
            {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

fn validate_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(ReplayError::InvalidName(name.to_string()))
    }
}
