use archive_core::DEFAULT_NAME;
use scraper::{ElementRef, Html};
use url::Url;

use crate::extract::{first, selector, text_of, ExtractError, PageResult, Record, RecordExtractor};
use crate::markup::escaped;

use super::mods_line;

/// Label that marks a feed item as a journal entry.
const JOURNAL_TAG: &str = "News";

/// Journal entries of a user's activity feed. Other feed items count as
/// matched, so a page of only non-journal items does not end the feed.
#[derive(Debug, Default, Clone, Copy)]
pub struct JournalExtractor;

impl JournalExtractor {
    fn title(item: ElementRef<'_>) -> Result<String, ExtractError> {
        let title = first(item, "h3.feed-item-title a")?
            .map(text_of)
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| DEFAULT_NAME.to_string());
        Ok(title)
    }
}

impl RecordExtractor for JournalExtractor {
    fn extract(&self, document: &Html, _page_url: &Url) -> Result<PageResult, ExtractError> {
        let item_sel = selector("div.media-content")?;

        let mut result = PageResult::default();
        for item in document.select(&item_sel) {
            result.matched += 1;

            let is_journal = first(item, "p.post-tag-label")?
                .is_some_and(|tag| text_of(tag) == JOURNAL_TAG);
            if !is_journal {
                continue;
            }

            let body = first(item, "div.post-content")?
                .ok_or(ExtractError::Missing("journal body"))?
                .inner_html();
            let mut content = format!(
                "<h3>{title}</h3>\n{body}\n",
                title = escaped(&Self::title(item)?),
                body = body.trim(),
            );
            if let Some(mods) = mods_line(item)? {
                content.push_str(&mods);
                content.push('\n');
            }
            content.push_str("<hr>");

            result.records.push(Record::new(content, &body));
        }
        Ok(result)
    }
}
