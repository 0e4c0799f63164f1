use std::path::Path;
use std::sync::Arc;

use archive_core::{
    sanitize_name, ChunkPolicy, ContentKind, Deduplicator, JobConfig, RecordLimit, TaskState,
    ThreadTarget, Username,
};
use engine_logging::{build_job_logger, job_debug, job_error, job_info, JobLogger};

use crate::extract::ExtractError;
use crate::images::ImageSink;
use crate::paginate::Paginator;
use crate::pipeline::{run_pass, PassEnd, RunContext};
use crate::preflight::{block_on, probe, PreflightError};
use crate::sink::{ChunkWriter, RecordSink};
use crate::sites::{albums, ForumPostExtractor, ImageLinkExtractor, JournalExtractor};
use crate::task::{CompletionCallback, JobHandle, ProgressSink, StopHandle};
use crate::{
    FetchError, FetchSettings, Fetcher, JobError, JobReport, ReqwestFetcher, SiteConfig,
};

/// Log file used by [`Archiver::with_defaults`].
pub const LOG_FILE: &str = "archive.log";

#[derive(Debug, Clone)]
enum Target {
    Thread(ThreadTarget),
    User(Username),
}

/// Orchestrates one archive job for one content type.
///
/// `verify` and `start` are the only calls that do work on the caller's
/// thread; everything else happens on the worker. An archiver runs at most
/// one job, `start` consumes it.
pub struct Archiver {
    kind: ContentKind,
    config: JobConfig,
    site: SiteConfig,
    fetcher: Arc<dyn Fetcher>,
    logger: JobLogger,
    stop: StopHandle,
}

impl Archiver {
    pub fn new(
        kind: ContentKind,
        config: JobConfig,
        fetcher: Arc<dyn Fetcher>,
        logger: JobLogger,
    ) -> Self {
        Self {
            kind,
            config,
            site: SiteConfig::default(),
            fetcher,
            logger,
            stop: StopHandle::new(),
        }
    }

    /// Live site, reqwest transport, and the dual terminal/file logger.
    pub fn with_defaults(kind: ContentKind, config: JobConfig) -> Result<Self, FetchError> {
        let fetcher = ReqwestFetcher::new(FetchSettings::default())?;
        let logger = build_job_logger(config.verbose, Some(Path::new(LOG_FILE)));
        Ok(Self::new(kind, config, Arc::new(fetcher), logger))
    }

    pub fn with_site(mut self, site: SiteConfig) -> Self {
        self.site = site;
        self
    }

    pub fn kind(&self) -> ContentKind {
        self.kind
    }

    pub fn config(&self) -> &JobConfig {
        &self.config
    }

    /// The job's stop flag, available before the job starts. A stop
    /// requested before `start` ends the job at its first page boundary.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Synchronous existence check of the target. Must be called from a
    /// thread that is not driving an async runtime.
    pub fn verify(&self) -> Result<(), PreflightError> {
        let target = self.resolve_target()?;
        self.probe_target(&target)
    }

    /// Verifies the target, then runs the job on a background worker.
    /// Nothing is spawned and nothing is written if verification fails.
    pub fn start(
        self,
        progress: Arc<dyn ProgressSink>,
        on_complete: Option<CompletionCallback>,
    ) -> Result<JobHandle, PreflightError> {
        let target = self.resolve_target()?;
        self.probe_target(&target)?;

        job_debug!(self.logger, "Target: {}", self.config.target);
        job_debug!(self.logger, "Path: {}", self.config.destination.display());
        job_debug!(self.logger, "Max items: {:?}", self.config.maximum);
        job_debug!(self.logger, "Items per file: {}", self.config.chunk_size);
        job_debug!(self.logger, "Content type: {}", self.kind.label());

        let stop = self.stop.clone();
        let limit = match self.kind {
            // Thread maximum caps pages, handled by the paginator.
            ContentKind::ForumThread => RecordLimit::unlimited(),
            ContentKind::Journals | ContentKind::Images => RecordLimit::new(self.config.maximum),
        };
        let mut ctx = RunContext::new(
            self.fetcher.clone(),
            self.logger.clone(),
            stop.clone(),
            progress,
            limit,
        );
        if self.kind.is_feed() {
            ctx.dedup = Some(Deduplicator::new());
        }

        let logger = self.logger.clone();
        let job = Job {
            kind: self.kind,
            config: self.config,
            site: self.site,
            target,
        };
        JobHandle::spawn(stop, logger, on_complete, move || job.execute(ctx))
            .map_err(|err| PreflightError::Runtime(err.to_string()))
    }

    fn resolve_target(&self) -> Result<Target, PreflightError> {
        let target = match self.kind {
            ContentKind::ForumThread => Target::Thread(ThreadTarget::parse(&self.config.target)?),
            ContentKind::Journals | ContentKind::Images => {
                Target::User(Username::parse(&self.config.target)?)
            }
        };
        Ok(target)
    }

    fn probe_target(&self, target: &Target) -> Result<(), PreflightError> {
        let url = match target {
            Target::Thread(thread) => thread.base_url().to_string(),
            Target::User(user) => self.site.user_url(user),
        };
        let outcome =
            block_on(probe(self.fetcher.as_ref(), &url)).map_err(PreflightError::Runtime)?;
        if let Err(err) = &outcome {
            job_error!(self.logger, "Pre-flight check failed: {}", err);
        }
        outcome
    }
}

/// Everything the worker needs, moved onto its thread.
struct Job {
    kind: ContentKind,
    config: JobConfig,
    site: SiteConfig,
    target: Target,
}

impl Job {
    fn execute(self, mut ctx: RunContext) -> JobReport {
        let outcome = block_on(self.run(&mut ctx))
            .map_err(JobError::Runtime)
            .and_then(|result| result);

        let state = match &outcome {
            Ok(PassEnd::Stopped) => TaskState::StoppedEarly,
            Ok(PassEnd::Exhausted | PassEnd::LimitReached) => TaskState::Completed,
            Err(_) => TaskState::Failed,
        };
        let report = JobReport {
            state,
            pages: ctx.pages,
            records: ctx.limit.count(),
            duplicates: ctx.dedup.as_ref().map_or(0, Deduplicator::dropped),
            chunks_written: ctx.tally.chunks_written,
            images_written: ctx.tally.images_written,
            error: outcome.err().map(|err| err.to_string()),
        };
        match &report.error {
            Some(err) => job_error!(ctx.logger, "Job failed after {} pages: {}", report.pages, err),
            None => job_info!(
                ctx.logger,
                "Job {:?}: {} pages, {} items, {} duplicates dropped",
                report.state,
                report.pages,
                report.records,
                report.duplicates
            ),
        }
        report
    }

    async fn run(&self, ctx: &mut RunContext) -> Result<PassEnd, JobError> {
        match (&self.target, self.kind) {
            (Target::Thread(thread), _) => self.run_thread(thread, ctx).await,
            (Target::User(user), ContentKind::Journals) => self.run_journals(user, ctx).await,
            (Target::User(user), _) => self.run_gallery(user, ctx).await,
        }
    }

    /// Bounded: the root page gives the title and page count, then pages
    /// `1..=N` are walked and chunked every `chunk_size` pages.
    async fn run_thread(
        &self,
        thread: &ThreadTarget,
        ctx: &mut RunContext,
    ) -> Result<PassEnd, JobError> {
        if ctx.stop_requested() {
            return Ok(PassEnd::Stopped);
        }
        let root = ctx.fetch(thread.base_url()).await?;
        let (title, last_page) = {
            let document = root.document();
            (
                ForumPostExtractor::thread_title(&document),
                ForumPostExtractor::last_page(&document),
            )
        };
        let name = match &self.config.name_override {
            Some(name) => sanitize_name(Some(name)),
            None => sanitize_name(title.as_deref()),
        };

        let dir = self.config.destination.join(name);
        let mut writer = ChunkWriter::new(
            dir,
            ChunkPolicy::pages(self.config.chunk_size),
            ctx.logger.clone(),
        );
        let paginator = Paginator::bounded(thread.base_url(), last_page, self.config.maximum);
        job_debug!(ctx.logger, "Thread has {} pages", last_page);

        let end = run_pass(ctx, paginator, &ForumPostExtractor, &mut writer).await?;
        writer.finish(&mut ctx.tally).await?;
        Ok(end)
    }

    /// Unbounded, deduplicated, chunked every `chunk_size` records.
    async fn run_journals(
        &self,
        user: &Username,
        ctx: &mut RunContext,
    ) -> Result<PassEnd, JobError> {
        let dir = self.config.user_root().join("journals");
        let mut writer = ChunkWriter::new(
            dir,
            ChunkPolicy::records(self.config.chunk_size),
            ctx.logger.clone(),
        );
        let paginator = Paginator::unbounded(self.site.user_url(user));

        let end = run_pass(ctx, paginator, &JournalExtractor, &mut writer).await?;
        writer.finish(&mut ctx.tally).await?;
        Ok(end)
    }

    /// Loose gallery images first, then each album into its own directory.
    /// The item cap spans all of them.
    async fn run_gallery(
        &self,
        user: &Username,
        ctx: &mut RunContext,
    ) -> Result<PassEnd, JobError> {
        let root = self.config.user_root().join("images");
        let gallery = self.site.gallery_url(user);

        let mut sink = ImageSink::new(root.clone(), ctx.fetcher.clone(), ctx.logger.clone());
        let paginator = Paginator::unbounded(gallery.as_str());
        let end = run_pass(ctx, paginator, &ImageLinkExtractor, &mut sink).await?;
        if end != PassEnd::Exhausted {
            return Ok(end);
        }
        if ctx.stop_requested() {
            return Ok(PassEnd::Stopped);
        }

        let listing = ctx.fetch(&gallery).await?;
        let found = {
            let document = listing.document();
            albums(&document, listing.url())
        }
        .map_err(|source: ExtractError| JobError::Extract {
            url: gallery.clone(),
            source,
        })?;
        job_debug!(ctx.logger, "Found {} albums", found.len());

        for album in found {
            job_debug!(ctx.logger, "Downloading album {} from {}", album.name, album.url);
            let dir = root.join(&album.name);
            let mut sink = ImageSink::new(dir, ctx.fetcher.clone(), ctx.logger.clone());
            let paginator = Paginator::unbounded(album.url.as_str());
            let end = run_pass(ctx, paginator, &ImageLinkExtractor, &mut sink).await?;
            if end != PassEnd::Exhausted {
                return Ok(end);
            }
        }
        Ok(PassEnd::Exhausted)
    }
}
