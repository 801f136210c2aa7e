use std::fmt;

use relay_core::FetchedImage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Fetch,
    Distribution,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Fetch => write!(f, "fetch"),
            Phase::Distribution => write!(f, "distribution"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseProgress {
    pub phase: Phase,
    pub done: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineEvent {
    PhaseStarted { phase: Phase, total: usize },
    Progress(PhaseProgress),
    PhaseFinished { phase: Phase },
}

/// Outcome of one fetch phase.
///
/// `total_urls` starts at the URL count and loses one for every network-level
/// failure; HTTP and storage failures leave it alone.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FetchReport {
    pub images: Vec<FetchedImage>,
    pub total_urls: usize,
    pub network_failures: usize,
    pub http_failures: usize,
    pub storage_failures: usize,
}

impl FetchReport {
    pub(crate) fn new(total_urls: usize) -> Self {
        Self {
            total_urls,
            ..Self::default()
        }
    }
}

/// Per-item failure of a GET or POST.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Network,
    Storage,
}

impl FailureKind {
    /// True for failures where no HTTP response was received.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            FailureKind::InvalidUrl | FailureKind::Timeout | FailureKind::Network
        )
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Storage => write!(f, "storage error"),
        }
    }
}
