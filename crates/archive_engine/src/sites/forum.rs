use scraper::Html;
use url::Url;

use crate::extract::{first, selector, text_of, ExtractError, PageResult, Record, RecordExtractor};
use crate::markup::{attr_escaped, escaped, inner_html_with_local_replies};

use super::mods_line;

/// Posts of a forum thread page.
#[derive(Debug, Default, Clone, Copy)]
pub struct ForumPostExtractor;

impl ForumPostExtractor {
    /// Raw thread title from `h1.content-title`, if any.
    pub fn thread_title(document: &Html) -> Option<String> {
        let sel = selector("h1.content-title").ok()?;
        document
            .select(&sel)
            .next()
            .map(|title| title.inner_html().trim().to_string())
            .filter(|title| !title.is_empty())
    }

    /// Number shown on the last class-less entry of the pagination control;
    /// 1 when the thread has a single page or the control is unreadable.
    pub fn last_page(document: &Html) -> usize {
        let (Ok(section_sel), Ok(item_sel)) = (selector("section.pagination"), selector("li"))
        else {
            return 1;
        };
        let Some(section) = document.select(&section_sel).next() else {
            return 1;
        };
        section
            .select(&item_sel)
            .filter(|li| li.value().attr("class").map_or(true, |c| c.trim().is_empty()))
            .last()
            .and_then(|li| first(li, "a").ok().flatten())
            .and_then(|a| text_of(a).parse::<usize>().ok())
            .unwrap_or(1)
            .max(1)
    }
}

impl RecordExtractor for ForumPostExtractor {
    fn extract(&self, document: &Html, _page_url: &Url) -> Result<PageResult, ExtractError> {
        let post_sel = selector("div.media-content")?;
        let link_sel = selector("a")?;

        let mut result = PageResult::default();
        for post in document.select(&post_sel) {
            result.matched += 1;

            let mut links = post.select(&link_sel);
            let poster = links
                .next()
                .ok_or(ExtractError::Missing("poster link"))?
                .inner_html();
            let number = links
                .next()
                .map(text_of)
                .ok_or(ExtractError::Missing("post number link"))?;
            let timestamp = first(post, "p.post-stamp")?
                .and_then(|stamp| stamp.value().attr("title"))
                .ok_or(ExtractError::Missing("post timestamp"))?;
            let body = first(post, "div.post-body")?.ok_or(ExtractError::Missing("post body"))?;

            let anchor: String = number.chars().skip(1).collect();
            let mut content = format!(
                "<h3><a name=\"{anchor}\">{poster}</a></h3>\n<p><a href=\"{href}\">{number}</a> - {timestamp}</p>\n{body}\n",
                anchor = attr_escaped(&anchor),
                poster = poster.trim(),
                href = attr_escaped(&number),
                number = escaped(&number),
                timestamp = escaped(timestamp),
                body = inner_html_with_local_replies(body).trim(),
            );
            if let Some(mods) = mods_line(post)? {
                content.push_str(&mods);
                content.push('\n');
            }
            content.push_str("<hr>");

            result.records.push(Record::new(content, &body.inner_html()));
        }
        Ok(result)
    }
}
