use chrono::{DateTime, Utc};

/// Wall-clock seam. Components that schedule retries or stamp timestamps
/// read time through this trait so tests can advance a fake clock instead
/// of sleeping.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
