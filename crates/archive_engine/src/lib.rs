//! Archive engine: fetching, extraction, output and the background job.
mod archiver;
mod extract;
mod fetch;
mod images;
mod markup;
mod page;
mod paginate;
mod persist;
mod pipeline;
mod preflight;
mod sink;
mod site;
mod sites;
mod task;
mod types;

pub use archiver::{Archiver, LOG_FILE};
pub use extract::{ExtractError, PageResult, Record, RecordExtractor};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher, USER_AGENT};
pub use images::ImageSink;
pub use markup::inner_html_with_local_replies;
pub use page::{fetch_page, Page};
pub use paginate::{page_url, Paginator};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use pipeline::{run_pass, PassEnd, RunContext};
pub use preflight::{probe, PreflightError};
pub use sink::{ChunkWriter, RecordSink, Tally};
pub use site::{SiteConfig, DEFAULT_SITE_ROOT};
pub use sites::{
    albums, full_image_url, image_file_name, Album, ForumPostExtractor, ImageLinkExtractor,
    JournalExtractor,
};
pub use task::{
    ChannelProgressSink, CompletionCallback, JobHandle, NoProgress, ProgressSink, StopHandle,
};
pub use types::{
    FailureKind, FetchError, FetchMetadata, FetchOutput, JobError, JobEvent, JobProgress,
    JobReport,
};
