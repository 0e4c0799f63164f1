use std::path::PathBuf;
use std::sync::Arc;

use engine_logging::{job_debug, job_error, JobLogger};

use crate::extract::{ExtractError, Record};
use crate::page::fetch_page;
use crate::persist::AtomicFileWriter;
use crate::sink::{RecordSink, Tally};
use crate::sites::{full_image_url, image_file_name};
use crate::{Fetcher, JobError};

/// Resolves each image page record to its full-size image and downloads it
/// into one directory. Files already on disk are left alone.
pub struct ImageSink {
    files: AtomicFileWriter,
    fetcher: Arc<dyn Fetcher>,
    logger: JobLogger,
}

impl ImageSink {
    pub fn new(dir: PathBuf, fetcher: Arc<dyn Fetcher>, logger: JobLogger) -> Self {
        Self {
            files: AtomicFileWriter::new(dir),
            fetcher,
            logger,
        }
    }
}

#[async_trait::async_trait]
impl RecordSink for ImageSink {
    async fn accept(&mut self, record: Record, tally: &mut Tally) -> Result<(), JobError> {
        let image_page_url = record.content;
        let page = fetch_page(self.fetcher.as_ref(), &image_page_url, &self.logger).await?;
        let extract_err = |source: ExtractError| JobError::Extract {
            url: image_page_url.clone(),
            source,
        };
        let image_url = {
            let document = page.document();
            full_image_url(&document, page.url())
        }
        .map_err(extract_err)?;
        let file_name = image_file_name(&image_url)
            .ok_or_else(|| extract_err(ExtractError::Missing("image file name")))?;

        if self.files.exists(&file_name) {
            job_debug!(self.logger, "File exists, skipping {}", file_name);
            return Ok(());
        }

        job_debug!(
            self.logger,
            "Downloading image at {} to {}",
            image_url,
            self.files.dir().join(&file_name).display()
        );
        let image = self
            .fetcher
            .fetch(image_url.as_str())
            .await
            .map_err(|source| {
                job_error!(self.logger, "Could not access {} ({})", image_url, source.kind);
                JobError::Fetch {
                    url: image_url.to_string(),
                    source,
                }
            })?;
        self.files.write(&file_name, &image.bytes)?;
        tally.images_written += 1;
        Ok(())
    }
}
