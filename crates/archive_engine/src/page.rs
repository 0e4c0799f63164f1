use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use engine_logging::{job_debug, job_error, JobLogger};
use scraper::Html;
use url::Url;

use crate::{FailureKind, FetchError, FetchOutput, Fetcher, JobError};

/// A fetched page decoded to UTF-8.
///
/// Parsing is deferred to [`Page::document`] so the parsed tree never has to
/// live across an await point.
#[derive(Debug, Clone)]
pub struct Page {
    url: Url,
    html: String,
}

impl Page {
    pub fn from_fetch(output: FetchOutput) -> Result<Self, FetchError> {
        let url = Url::parse(&output.metadata.final_url)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
        let html = decode_body(&output.bytes, output.metadata.content_type.as_deref());
        Ok(Self { url, html })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn document(&self) -> Html {
        Html::parse_document(&self.html)
    }
}

/// GETs and decodes one page, logging the request and any failure.
pub async fn fetch_page(
    fetcher: &dyn Fetcher,
    url: &str,
    logger: &JobLogger,
) -> Result<Page, JobError> {
    job_debug!(logger, "Getting page at {}", url);
    let page = fetcher.fetch(url).await.and_then(Page::from_fetch);
    page.map_err(|source| {
        job_error!(logger, "Failed to get page {} ({})", url, source.kind);
        JobError::Fetch {
            url: url.to_string(),
            source,
        }
    })
}

/// BOM, then the Content-Type charset, then detection. Malformed sequences
/// are replaced rather than rejected.
fn decode_body(bytes: &[u8], content_type: Option<&str>) -> String {
    let encoding = Encoding::for_bom(bytes)
        .map(|(encoding, _)| encoding)
        .or_else(|| {
            content_type
                .and_then(charset_label)
                .and_then(|label| Encoding::for_label(label.as_bytes()))
        })
        .unwrap_or_else(|| {
            let mut detector = EncodingDetector::new();
            detector.feed(bytes, true);
            detector.guess(None, true)
        });
    let (text, _, _) = encoding.decode(bytes);
    text.into_owned()
}

fn charset_label(content_type: &str) -> Option<&str> {
    content_type.split(';').find_map(|part| {
        let (key, value) = part.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches(['"', '\'']))
    })
}
