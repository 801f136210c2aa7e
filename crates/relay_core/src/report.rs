use std::path::{Path, PathBuf};

/// A downloaded image on local disk.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FetchedImage {
    path: PathBuf,
}

impl FetchedImage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Base name used as the remote name when the image is distributed.
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|name| name.to_str())
    }
}

/// Outcome of one distribution phase.
///
/// `attempted` counts every (server, image) pair that finished, successful or
/// not, so progress always reaches `total`. `delivered` and `failed` split it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DistributionReport {
    pub total: usize,
    pub attempted: usize,
    pub delivered: usize,
    pub failed: usize,
}

/// What one scheduler cycle did.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CycleSummary {
    pub cycle: u64,
    pub url_count: usize,
    pub fetched: usize,
    pub distribution: Option<DistributionReport>,
}
