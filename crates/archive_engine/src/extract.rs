use archive_core::ContentHash;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("invalid selector {0:?}")]
    Selector(String),
    #[error("missing {0}")]
    Missing(&'static str),
    #[error("unparsable {what}: {value:?}")]
    Invalid { what: &'static str, value: String },
}

/// One formatted content unit plus the hash its dedup identity is based on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub content: String,
    pub hash: ContentHash,
}

impl Record {
    /// `identity` is the raw body the hash is computed over; `content` is
    /// what ends up in the output.
    pub fn new(content: String, identity: &str) -> Self {
        Self {
            content,
            hash: ContentHash::of(identity),
        }
    }
}

/// What one page yielded.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageResult {
    /// Elements matching the page's item selector, including ones that were
    /// filtered out. Zero on an unbounded source means end of feed.
    pub matched: usize,
    pub records: Vec<Record>,
}

impl PageResult {
    pub fn is_end_of_feed(&self) -> bool {
        self.matched == 0
    }
}

/// Markup-specific rules that turn a parsed page into ordered records.
pub trait RecordExtractor: Send + Sync {
    fn extract(&self, document: &Html, page_url: &Url) -> Result<PageResult, ExtractError>;
}

pub(crate) fn selector(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|_| ExtractError::Selector(css.to_string()))
}

pub(crate) fn first<'a>(
    scope: ElementRef<'a>,
    css: &str,
) -> Result<Option<ElementRef<'a>>, ExtractError> {
    let sel = selector(css)?;
    Ok(scope.select(&sel).next())
}

pub(crate) fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
