use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

use crate::filename::{base_name, resolve_name, retry_path};

const MAX_CLAIM_ATTEMPTS: u32 = 16;
#[cfg(unix)]
const STORED_FILE_MODE: u32 = 0o644;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("output directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("no free file name for {url} after {attempts} attempts")]
    NameExhausted { url: String, attempts: u32 },
    #[error("invalid file name {0:?}")]
    InvalidName(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Ensure output directory exists; create if missing.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::OutputDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    }
    // Basic writability probe: try creating a temp file.
    NamedTempFile::new_in(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    Ok(())
}

/// Stores the body fetched from `url` under a name nobody else holds.
///
/// The body goes to a temp file first and is then linked into place with
/// no-clobber semantics, so concurrent writers that resolved the same name
/// cannot overwrite each other; the loser retries with a fresh disambiguator.
pub fn claim_and_write(target_dir: &Path, url: &str, content: &[u8]) -> Result<PathBuf, PersistError> {
    let mut tmp = NamedTempFile::new_in(target_dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    make_readable(&tmp)?;

    let base = base_name(url);
    let mut target = resolve_name(url, target_dir);
    for attempt in 1..=MAX_CLAIM_ATTEMPTS {
        match tmp.persist_noclobber(&target) {
            Ok(_) => return Ok(target),
            Err(err) if err.error.kind() == io::ErrorKind::AlreadyExists => {
                tmp = err.file;
                target = retry_path(&base, target_dir, attempt);
            }
            Err(err) => return Err(PersistError::Io(err.error)),
        }
    }
    Err(PersistError::NameExhausted {
        url: url.to_string(),
        attempts: MAX_CLAIM_ATTEMPTS,
    })
}

/// Atomically write content to `{dir}/{filename}` by writing a temp file then renaming.
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// `filename` must be a single path component.
    pub fn write(&self, filename: &str, content: &[u8]) -> Result<PathBuf, PersistError> {
        if !is_plain_file_name(filename) {
            return Err(PersistError::InvalidName(filename.to_string()));
        }
        ensure_output_dir(&self.dir)?;

        let target = self.dir.join(filename);
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(content)?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;
        make_readable(&tmp)?;

        // Later uploads of the same name replace earlier ones.
        tmp.persist(&target).map_err(|e| PersistError::Io(e.error))?;
        Ok(target)
    }
}

/// Temp files are created owner-only; stored images are `rw-r--r--` like any other download.
#[cfg(unix)]
fn make_readable(tmp: &NamedTempFile) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    tmp.as_file()
        .set_permissions(fs::Permissions::from_mode(STORED_FILE_MODE))
}

#[cfg(not(unix))]
fn make_readable(_tmp: &NamedTempFile) -> io::Result<()> {
    Ok(())
}

pub(crate) fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}
