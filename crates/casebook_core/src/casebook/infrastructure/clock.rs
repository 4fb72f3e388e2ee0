//! Dates and file stamps.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use chrono::{Local, NaiveDate, Utc};

/// Calendar date used for upload, comment and submission records.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Source of strictly increasing millisecond stamps.
///
/// The stamp follows wall-clock time but never repeats: when two uploads land
/// in the same millisecond, the second one gets `last + 1`. Clones share the
/// last stamp handed out.
#[derive(Debug, Clone, Default)]
pub struct FileStamper {
    last: Arc<AtomicU64>,
}

impl FileStamper {
    pub fn next_stamp(&self) -> u64 {
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();
        let mut last = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(last + 1);
            match self.last.compare_exchange_weak(
                last,
                candidate,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return candidate,
                Err(actual) => last = actual,
            }
        }
    }
}
