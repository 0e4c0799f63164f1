use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("output directory {path:?} unusable: {message}")]
    OutputDir { path: PathBuf, message: String },
    #[error("writing {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Creates `dir` and any missing parents. An existing non-directory is an error.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    let unusable = |message: String| PersistError::OutputDir {
        path: dir.to_path_buf(),
        message,
    };
    if dir.exists() {
        if !dir.is_dir() {
            return Err(unusable("path is not a directory".into()));
        }
        return Ok(());
    }
    fs::create_dir_all(dir).map_err(|e| unusable(e.to_string()))
}

/// Writes whole files into one directory: temp file first, then rename, so a
/// reader never sees a half-written chunk or image.
#[derive(Debug, Clone)]
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn exists(&self, filename: &str) -> bool {
        self.dir.join(filename).exists()
    }

    /// Writes `{dir}/{filename}`, replacing any existing file.
    pub fn write(&self, filename: &str, content: &[u8]) -> Result<PathBuf, PersistError> {
        ensure_output_dir(&self.dir)?;

        let target = self.dir.join(filename);
        let io_err = |source: io::Error| PersistError::Io {
            path: target.clone(),
            source,
        };
        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(io_err)?;
        tmp.write_all(content).map_err(io_err)?;
        tmp.flush().map_err(io_err)?;
        tmp.as_file_mut().sync_all().map_err(io_err)?;

        // persist() does not replace an existing file on every platform.
        if target.exists() {
            fs::remove_file(&target).map_err(io_err)?;
        }
        tmp.persist(&target).map_err(|e| io_err(e.error))?;
        Ok(target)
    }
}
