use std::sync::Arc;

use archive_core::{Deduplicator, Flow, RecordLimit};
use engine_logging::{job_debug, job_info, JobLogger};

use crate::extract::{PageResult, RecordExtractor};
use crate::page::{fetch_page, Page};
use crate::paginate::Paginator;
use crate::sink::{RecordSink, Tally};
use crate::task::{emit_guarded, ProgressSink, StopHandle};
use crate::{Fetcher, JobError, JobEvent, JobProgress};

/// How a pass over one listing ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassEnd {
    /// Last known page done, or an empty page on an unbounded listing.
    Exhausted,
    LimitReached,
    /// A stop request was seen at a page boundary.
    Stopped,
}

/// Worker-side state shared by every pass of one job.
pub struct RunContext {
    pub fetcher: Arc<dyn Fetcher>,
    pub logger: JobLogger,
    pub stop: StopHandle,
    pub progress: Arc<dyn ProgressSink>,
    pub limit: RecordLimit,
    /// Present for feed sources only.
    pub dedup: Option<Deduplicator>,
    pub pages: usize,
    pub tally: Tally,
}

impl RunContext {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        logger: JobLogger,
        stop: StopHandle,
        progress: Arc<dyn ProgressSink>,
        limit: RecordLimit,
    ) -> Self {
        Self {
            fetcher,
            logger,
            stop,
            progress,
            limit,
            dedup: None,
            pages: 0,
            tally: Tally::default(),
        }
    }

    /// Samples the stop flag. Only called between pages.
    pub fn stop_requested(&self) -> bool {
        let requested = self.stop.is_requested();
        if requested {
            job_info!(self.logger, "Stop requested, ending after {} pages", self.pages);
        }
        requested
    }

    pub async fn fetch(&self, url: &str) -> Result<Page, JobError> {
        fetch_page(self.fetcher.as_ref(), url, &self.logger).await
    }

    fn report_progress(&self, page: usize, total_pages: Option<usize>) {
        let records = self.limit.count();
        let message = match total_pages {
            Some(total) => format!("page {page} of {total}"),
            None => format!("page {page} ({records} items)"),
        };
        let event = JobEvent::Progress(JobProgress {
            page,
            total_pages,
            records,
            message,
        });
        emit_guarded(self.progress.as_ref(), event, &self.logger);
    }
}

/// Drives one listing through fetch, extract, dedup and the sink.
///
/// The stop flag is sampled before each page is fetched, never during a
/// fetch or write, and only while pages remain: a stop that lands after
/// the last page of a bounded listing leaves the pass exhausted. Any fetch
/// or extraction error ends the pass at once; the sink is not finished
/// here, callers decide that.
pub async fn run_pass(
    ctx: &mut RunContext,
    mut paginator: Paginator,
    extractor: &dyn RecordExtractor,
    sink: &mut dyn RecordSink,
) -> Result<PassEnd, JobError> {
    if ctx.limit.is_reached() {
        return Ok(PassEnd::LimitReached);
    }
    loop {
        let Some((number, url)) = paginator.next_page() else {
            return Ok(PassEnd::Exhausted);
        };
        if ctx.stop_requested() {
            return Ok(PassEnd::Stopped);
        }

        let page = ctx.fetch(&url).await?;
        let result = extract_page(&page, extractor).map_err(|source| JobError::Extract {
            url: url.clone(),
            source,
        })?;
        if !paginator.is_bounded() && result.is_end_of_feed() {
            job_debug!(ctx.logger, "Page {} is empty, end of listing", number);
            return Ok(PassEnd::Exhausted);
        }

        let mut flow = Flow::Continue;
        for record in result.records {
            if let Some(dedup) = ctx.dedup.as_mut() {
                if !dedup.admit(record.hash) {
                    job_debug!(ctx.logger, "Found duplicate hash {}", record.hash.short_hex());
                    continue;
                }
            }
            sink.accept(record, &mut ctx.tally).await?;
            flow = ctx.limit.admit();
            if flow == Flow::LimitReached {
                break;
            }
        }
        sink.end_page(&mut ctx.tally).await?;
        ctx.pages += 1;
        ctx.report_progress(number, paginator.total());

        if flow == Flow::LimitReached {
            job_info!(ctx.logger, "Reached maximum of {} items", ctx.limit.count());
            return Ok(PassEnd::LimitReached);
        }
    }
}

fn extract_page(
    page: &Page,
    extractor: &dyn RecordExtractor,
) -> Result<PageResult, crate::extract::ExtractError> {
    let document = page.document();
    extractor.extract(&document, page.url())
}
