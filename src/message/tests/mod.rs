//! Unit tests for the message module.
//!
//! Organised by component: field store and validator, codec, version
//! bridge. Covers happy paths, error cases and the documented edge cases.

mod versioning_tests;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

/// Clock pinned to a fixed instant, for deterministic timestamps.
pub(super) struct FixedClock(DateTime<Utc>);

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

pub(super) fn fixed_clock() -> FixedClock {
    let instant = Utc
        .with_ymd_and_hms(2024, 5, 17, 12, 30, 45)
        .single()
        .expect("valid instant");
    FixedClock(instant)
}
