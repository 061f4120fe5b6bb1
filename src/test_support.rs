//! Shared fixtures for unit tests.

use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use mockable::Clock;
use std::sync::Mutex;

use crate::progress::domain::{Level, LevelCatalog, LevelName, Xp};

/// Clock pinned to a settable instant.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().expect("clock lock");
        *now += by;
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock lock")
    }
}

/// 2026-03-14 09:30 UTC.
pub fn reference_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0)
        .single()
        .expect("valid reference instant")
}

pub fn level(name: &str, xp: u64) -> Level {
    Level::new(LevelName::new(name).expect("valid level name"), Xp::new(xp))
}

/// Newbie 0, Beginner 100, Intermediate 500.
pub fn small_catalog() -> LevelCatalog {
    LevelCatalog::new([
        level("Newbie", 0),
        level("Beginner", 100),
        level("Intermediate", 500),
    ])
    .expect("valid catalog")
}
