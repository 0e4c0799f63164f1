/// Loop control returned at every record boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// The cap was hit by the record just admitted. Not an error: callers
    /// break out of their loops and finish normally.
    LimitReached,
}

/// Cumulative record cap shared by every pass of a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordLimit {
    maximum: Option<usize>,
    count: usize,
}

impl RecordLimit {
    pub fn new(maximum: Option<usize>) -> Self {
        Self { maximum, count: 0 }
    }

    pub fn unlimited() -> Self {
        Self::new(None)
    }

    /// Counts one kept record.
    pub fn admit(&mut self) -> Flow {
        self.count += 1;
        if self.is_reached() {
            Flow::LimitReached
        } else {
            Flow::Continue
        }
    }

    pub fn is_reached(&self) -> bool {
        self.maximum.is_some_and(|max| self.count >= max)
    }

    pub fn count(&self) -> usize {
        self.count
    }
}
