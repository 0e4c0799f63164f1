use archive_core::sanitize_name;
use scraper::{ElementRef, Html};
use url::Url;

use crate::extract::{first, selector, text_of, ExtractError, PageResult, Record, RecordExtractor};

/// Marker in the href of album links.
const ALBUM_MARKER: &str = "album";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Album {
    /// Sanitised, usable as a directory name.
    pub name: String,
    pub url: Url,
}

/// Image-page links of one gallery page. Gallery blocks list loose images
/// first and albums after them, so a block is read up to its first album.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageLinkExtractor;

impl RecordExtractor for ImageLinkExtractor {
    fn extract(&self, document: &Html, page_url: &Url) -> Result<PageResult, ExtractError> {
        let mut result = PageResult::default();
        for_each_block_link(document, |_link, href| {
            if href.contains(ALBUM_MARKER) {
                return Ok(false);
            }
            let url = resolve(page_url, href)?;
            result.matched += 1;
            result.records.push(Record::new(url.to_string(), url.as_str()));
            Ok(true)
        })?;
        Ok(result)
    }
}

/// Album links on the gallery root, read up to the first loose image.
pub fn albums(document: &Html, page_url: &Url) -> Result<Vec<Album>, ExtractError> {
    let mut found = Vec::new();
    for_each_block_link(document, |link, href| {
        if !href.contains(ALBUM_MARKER) {
            return Ok(false);
        }
        let name = first(link, "p.name")?.map(text_of);
        found.push(Album {
            name: sanitize_name(name.as_deref()),
            url: resolve(page_url, href)?,
        });
        Ok(true)
    })?;
    Ok(found)
}

/// Source of `img.full-image` on an image page. Protocol-relative sources
/// take the page's scheme.
pub fn full_image_url(document: &Html, page_url: &Url) -> Result<Url, ExtractError> {
    let sel = selector("img.full-image")?;
    let src = document
        .select(&sel)
        .next()
        .and_then(|img| img.value().attr("src"))
        .ok_or(ExtractError::Missing("full image source"))?;
    resolve(page_url, src)
}

/// Last non-empty path segment, used as the on-disk file name.
pub fn image_file_name(url: &Url) -> Option<String> {
    url.path_segments()?
        .filter(|segment| !segment.is_empty())
        .last()
        .map(str::to_string)
}

/// Visits `<a href>` elements of every `ul.large-image-blocks` in order.
/// The visitor returns `Ok(false)` to stop reading the current block.
fn for_each_block_link<'a, F>(document: &'a Html, mut visit: F) -> Result<(), ExtractError>
where
    F: FnMut(ElementRef<'a>, &'a str) -> Result<bool, ExtractError>,
{
    let block_sel = selector("ul.large-image-blocks")?;
    let link_sel = selector("a[href]")?;
    for block in document.select(&block_sel) {
        for link in block.select(&link_sel) {
            let Some(href) = link.value().attr("href") else {
                continue;
            };
            if !visit(link, href)? {
                break;
            }
        }
    }
    Ok(())
}

fn resolve(base: &Url, reference: &str) -> Result<Url, ExtractError> {
    base.join(reference.trim()).map_err(|_| ExtractError::Invalid {
        what: "link",
        value: reference.to_string(),
    })
}
