use std::path::PathBuf;

/// Items per output file when the caller does not say otherwise.
pub const DEFAULT_CHUNK_SIZE: usize = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    /// A forum thread with a known page count. `maximum` caps pages.
    ForumThread,
    /// A user's journal activity feed. `maximum` caps records.
    Journals,
    /// A user's image gallery and albums. `maximum` caps images.
    Images,
}

impl ContentKind {
    /// Feed sources can re-serve items across pages and are deduplicated.
    pub fn is_feed(self) -> bool {
        matches!(self, ContentKind::Journals)
    }

    pub fn label(self) -> &'static str {
        match self {
            ContentKind::ForumThread => "forum",
            ContentKind::Journals => "journals",
            ContentKind::Images => "images",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobConfig {
    /// Thread URL or account name.
    pub target: String,
    /// Output root. May be empty, see [`JobConfig::user_root`].
    pub destination: PathBuf,
    /// `None` means unlimited.
    pub maximum: Option<usize>,
    /// Units per output file; 0 writes a single file at job end.
    pub chunk_size: usize,
    pub verbose: bool,
    /// Replaces the thread title as output directory name.
    pub name_override: Option<String>,
}

impl JobConfig {
    pub fn new(target: impl Into<String>, destination: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
            destination: destination.into(),
            maximum: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
            verbose: false,
            name_override: None,
        }
    }

    /// Front ends pass 0 for "no limit".
    pub fn with_maximum(mut self, maximum: usize) -> Self {
        self.maximum = (maximum > 0).then_some(maximum);
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_name_override(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.name_override = (!name.trim().is_empty()).then_some(name);
        self
    }

    /// Root for per-user output: the destination, or the account name when
    /// no destination was given.
    pub fn user_root(&self) -> PathBuf {
        if self.destination.as_os_str().is_empty() {
            PathBuf::from(&self.target)
        } else {
            self.destination.clone()
        }
    }
}
