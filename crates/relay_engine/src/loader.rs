use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use relay_core::{parse_url_list, UrlSet};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("url list {0:?} does not exist")]
    Missing(PathBuf),
    #[error("url list {0:?} is not a regular file")]
    NotAFile(PathBuf),
    #[error("error reading url list {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Reads the URL list file into a fresh [`UrlSet`].
pub fn load_url_set(path: &Path) -> Result<UrlSet, LoadError> {
    let meta = match fs::metadata(path) {
        Ok(meta) => meta,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(LoadError::Missing(path.to_path_buf()));
        }
        Err(source) => {
            return Err(LoadError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    if !meta.is_file() {
        return Err(LoadError::NotAFile(path.to_path_buf()));
    }

    let raw = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_url_list(&raw))
}
