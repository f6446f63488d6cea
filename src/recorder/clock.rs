//! Server-side timestamps.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};

/// Wall-clock source.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Never hands out a timestamp earlier than one it already issued, even if
/// the underlying clock steps backwards. Resolution is one microsecond.
pub struct MonotonicClock {
    source: Arc<dyn Clock>,
    last_micros: AtomicI64,
}

impl MonotonicClock {
    pub fn new(source: Arc<dyn Clock>) -> Self {
        Self {
            source,
            last_micros: AtomicI64::new(i64::MIN),
        }
    }

    pub fn next(&self) -> DateTime<Utc> {
        let now = self.source.now();
        let now_micros = now.timestamp_micros();
        let prev = self.last_micros.fetch_max(now_micros, Ordering::SeqCst);
        DateTime::from_timestamp_micros(prev.max(now_micros)).unwrap_or(now)
    }
}
