use std::path::{Path, PathBuf};

use archive_core::{Chunk, ChunkBuffer, ChunkPolicy};
use engine_logging::{job_debug, JobLogger};

use crate::extract::Record;
use crate::persist::{AtomicFileWriter, PersistError};
use crate::JobError;

/// Output written so far by every sink of a job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub chunks_written: usize,
    pub images_written: usize,
}

/// Where kept records go.
#[async_trait::async_trait]
pub trait RecordSink: Send {
    async fn accept(&mut self, record: Record, tally: &mut Tally) -> Result<(), JobError>;

    async fn end_page(&mut self, _tally: &mut Tally) -> Result<(), JobError> {
        Ok(())
    }

    /// Called once after the last page, including after a stop request.
    /// Not called when the job failed.
    async fn finish(&mut self, _tally: &mut Tally) -> Result<(), JobError> {
        Ok(())
    }
}

/// Buffers formatted records and writes each sealed chunk to
/// `{dir}/{index}.html`.
pub struct ChunkWriter {
    buffer: ChunkBuffer,
    files: AtomicFileWriter,
    logger: JobLogger,
}

impl ChunkWriter {
    pub fn new(dir: PathBuf, policy: ChunkPolicy, logger: JobLogger) -> Self {
        Self {
            buffer: ChunkBuffer::new(policy),
            files: AtomicFileWriter::new(dir),
            logger,
        }
    }

    pub fn dir(&self) -> &Path {
        self.files.dir()
    }

    pub fn add(&mut self, record: String) -> Result<Option<PathBuf>, PersistError> {
        let sealed = self.buffer.push(record);
        self.write(sealed)
    }

    pub fn page_done(&mut self) -> Result<Option<PathBuf>, PersistError> {
        let sealed = self.buffer.end_page();
        self.write(sealed)
    }

    /// Writes the remaining records, if any, as the last chunk.
    pub fn flush_remaining(&mut self) -> Result<Option<PathBuf>, PersistError> {
        let sealed = self.buffer.finish();
        self.write(sealed)
    }

    fn write(&self, chunk: Option<Chunk>) -> Result<Option<PathBuf>, PersistError> {
        let Some(chunk) = chunk else {
            return Ok(None);
        };
        let path = self.files.write(&chunk.file_name(), chunk.render().as_bytes())?;
        job_debug!(
            self.logger,
            "Wrote {} records as chunk {} to {}",
            chunk.records.len(),
            chunk.index,
            path.display()
        );
        Ok(Some(path))
    }
}

fn count(written: Option<PathBuf>, tally: &mut Tally) {
    if written.is_some() {
        tally.chunks_written += 1;
    }
}

#[async_trait::async_trait]
impl RecordSink for ChunkWriter {
    async fn accept(&mut self, record: Record, tally: &mut Tally) -> Result<(), JobError> {
        count(self.add(record.content)?, tally);
        Ok(())
    }

    async fn end_page(&mut self, tally: &mut Tally) -> Result<(), JobError> {
        count(self.page_done()?, tally);
        Ok(())
    }

    async fn finish(&mut self, tally: &mut Tally) -> Result<(), JobError> {
        count(self.flush_remaining()?, tally);
        Ok(())
    }
}
