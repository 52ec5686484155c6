// screens/src/seq.rs

use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonically increasing request tokens. A list response is applied
/// only while its token is still the newest one issued, so a slow older
/// response can never overwrite a newer one.
#[derive(Debug, Default)]
pub struct RequestSeq(AtomicU64);

impl RequestSeq {
    pub fn begin(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_current(&self, token: u64) -> bool {
        self.0.load(Ordering::SeqCst) == token
    }
}
