//! Site rules: which element holds what, per content type.
mod forum;
mod gallery;
mod journal;

pub use forum::ForumPostExtractor;
pub use gallery::{albums, full_image_url, image_file_name, Album, ImageLinkExtractor};
pub use journal::JournalExtractor;

use scraper::ElementRef;

use crate::extract::{first, ExtractError};

/// `<p><em>Mods: N</em></p>` from `p.overall-mod`, or nothing when the
/// counter is absent.
fn mods_line(item: ElementRef<'_>) -> Result<Option<String>, ExtractError> {
    let Some(mods) = first(item, "p.overall-mod")? else {
        return Ok(None);
    };
    let Some(raw) = mods.value().attr("data-value") else {
        return Ok(None);
    };
    let value: i64 = raw.trim().parse().map_err(|_| ExtractError::Invalid {
        what: "mod count",
        value: raw.to_string(),
    })?;
    Ok(Some(format!("<p><em>Mods: {value}</em></p>")))
}
