//! Monotonic request ids used to discard superseded responses.

use std::sync::atomic::{AtomicU64, Ordering};

/// Issues strictly increasing request ids, starting at 1.
///
/// Views stamp each outgoing request with an id and record the current id in
/// their state; a response is applied only while its id is still current (or,
/// for polls, newer than the last one applied).
#[derive(Debug, Default)]
pub struct RequestSequence {
    last: AtomicU64,
}

impl RequestSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> u64 {
        self.last.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Most recently issued id, 0 before the first request
    pub fn latest(&self) -> u64 {
        self.last.load(Ordering::SeqCst)
    }
}
