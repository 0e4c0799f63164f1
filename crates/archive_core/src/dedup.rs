use std::collections::HashSet;

use sha2::{Digest, Sha256};

/// SHA-256 of a record's body content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    pub fn of(content: &str) -> Self {
        let digest = Sha256::digest(content.as_bytes());
        Self(digest.into())
    }

    pub fn short_hex(&self) -> String {
        let mut hex = String::with_capacity(8);
        for byte in self.0.iter().take(4) {
            use std::fmt::Write;
            let _ = write!(&mut hex, "{byte:02x}");
        }
        hex
    }
}

/// Job-wide set of seen content hashes. Activity feeds shift under the
/// crawler when new items are posted, so the same item can be served twice.
#[derive(Debug, Default)]
pub struct Deduplicator {
    seen: HashSet<ContentHash>,
    dropped: usize,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if the hash was new. The set never shrinks.
    pub fn admit(&mut self, hash: ContentHash) -> bool {
        let fresh = self.seen.insert(hash);
        if !fresh {
            self.dropped += 1;
        }
        fresh
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }
}
