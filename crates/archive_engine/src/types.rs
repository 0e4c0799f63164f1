use std::fmt;

use archive_core::TaskState;

use crate::extract::ExtractError;
use crate::persist::PersistError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutput {
    pub bytes: Vec<u8>,
    pub metadata: FetchMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchMetadata {
    pub original_url: String,
    pub final_url: String,
    pub content_type: Option<String>,
    pub byte_len: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self.kind {
            FailureKind::HttpStatus(code) => Some(code),
            _ => None,
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for FetchError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

/// Anything that ends a running job early. There is no retry: the first
/// one aborts the job and only chunks flushed before it stay on disk.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("fetch failed for {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: FetchError,
    },
    #[error("extraction failed for {url}: {source}")]
    Extract {
        url: String,
        #[source]
        source: ExtractError,
    },
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error("worker runtime: {0}")]
    Runtime(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobProgress {
    /// 1-based page number within the current pass.
    pub page: usize,
    /// Known only for bounded sources.
    pub total_pages: Option<usize>,
    /// Records kept so far across the whole job.
    pub records: usize,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobEvent {
    Progress(JobProgress),
}

/// Terminal summary of one run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobReport {
    pub state: TaskState,
    pub pages: usize,
    pub records: usize,
    pub duplicates: usize,
    pub chunks_written: usize,
    pub images_written: usize,
    /// Display form of the fatal error when `state` is `Failed`.
    pub error: Option<String>,
}
