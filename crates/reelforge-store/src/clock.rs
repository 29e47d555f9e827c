//! The real-wall-clock [`Clock`] implementation, used only by production
//! callers (`reelforge-cli`); every core algorithm takes a `Clock` as a
//! parameter instead of reading this directly.

use reelforge_core::clock::Clock;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> String {
        OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
    }
}
