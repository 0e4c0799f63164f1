use crate::naming::chunk_file_name;

/// When the open chunk is sealed.
///
/// Page-oriented sources count pages (a page with no records still counts),
/// record-oriented sources count records. The two are kept distinct because
/// they produce different file boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkPolicy {
    EveryPages(usize),
    EveryRecords(usize),
    /// Everything goes into one file written at job end.
    Single,
}

impl ChunkPolicy {
    pub fn pages(size: usize) -> Self {
        if size == 0 {
            ChunkPolicy::Single
        } else {
            ChunkPolicy::EveryPages(size)
        }
    }

    pub fn records(size: usize) -> Self {
        if size == 0 {
            ChunkPolicy::Single
        } else {
            ChunkPolicy::EveryRecords(size)
        }
    }
}

/// Ordered records destined for one output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// 1-based.
    pub index: usize,
    pub records: Vec<String>,
}

impl Chunk {
    pub fn file_name(&self) -> String {
        chunk_file_name(self.index)
    }

    /// Wraps the records, in discovery order, in a minimal document.
    pub fn render(&self) -> String {
        let mut out = String::from("<body>\n");
        out.push_str(&self.records.join("\n"));
        out.push_str("\n</body>\n");
        out
    }
}

/// Accumulates formatted records and seals chunks according to a policy.
#[derive(Debug)]
pub struct ChunkBuffer {
    policy: ChunkPolicy,
    records: Vec<String>,
    pages_in_chunk: usize,
    sealed: usize,
}

impl ChunkBuffer {
    pub fn new(policy: ChunkPolicy) -> Self {
        Self {
            policy,
            records: Vec::new(),
            pages_in_chunk: 0,
            sealed: 0,
        }
    }

    /// Adds a record; returns a sealed chunk when a record boundary is hit.
    pub fn push(&mut self, record: String) -> Option<Chunk> {
        self.records.push(record);
        match self.policy {
            ChunkPolicy::EveryRecords(size) if self.records.len() >= size => Some(self.seal()),
            _ => None,
        }
    }

    /// Marks the end of a processed page; returns a sealed chunk when a page
    /// boundary is hit.
    pub fn end_page(&mut self) -> Option<Chunk> {
        self.pages_in_chunk += 1;
        match self.policy {
            ChunkPolicy::EveryPages(size) if self.pages_in_chunk >= size => Some(self.seal()),
            _ => None,
        }
    }

    /// Seals whatever is left. Nothing is produced for an empty buffer.
    pub fn finish(&mut self) -> Option<Chunk> {
        if self.records.is_empty() {
            return None;
        }
        Some(self.seal())
    }

    pub fn sealed(&self) -> usize {
        self.sealed
    }

    pub fn pending(&self) -> usize {
        self.records.len()
    }

    fn seal(&mut self) -> Chunk {
        self.sealed += 1;
        self.pages_in_chunk = 0;
        Chunk {
            index: self.sealed,
            records: std::mem::take(&mut self.records),
        }
    }
}
