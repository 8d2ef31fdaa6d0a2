use chrono::{DateTime, Utc};

use tally_core::Clock;

/// Wall clock used by the binary; tests pin time with `FixedClock` instead.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
