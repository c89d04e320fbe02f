//! Dose scheduling arithmetic: how long until the next dose, and how a
//! medication's next-dose instant reads against the clock.
//!
//! Everything here is a pure function of its arguments. The current time is
//! always passed in by the caller, never read from the system clock, so the
//! classification a screen shows is exactly reproducible in a test.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Doses due within this window ahead of the clock count as "due soon".
const DUE_SOON_WINDOW_MINUTES: i64 = 60;

/// Doses due within this window behind the clock count as "pending" on the
/// dashboard stat card.
const PENDING_LOOKBACK_HOURS: i64 = 24;

/// The closed set of schedule labels a medication form can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoseFrequency {
    OnceDaily,
    TwiceDaily,
    ThreeTimesDaily,
    FourTimesDaily,
}

impl DoseFrequency {
    /// Match a display label case-insensitively. Returns `None` for anything
    /// outside the recognized set.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.to_lowercase().as_str() {
            "once daily" => Some(Self::OnceDaily),
            "twice daily" => Some(Self::TwiceDaily),
            "three times daily" => Some(Self::ThreeTimesDaily),
            "four times daily" => Some(Self::FourTimesDaily),
            _ => None,
        }
    }

    pub fn interval_hours(self) -> i64 {
        match self {
            Self::OnceDaily => 24,
            Self::TwiceDaily => 12,
            Self::ThreeTimesDaily => 8,
            Self::FourTimesDaily => 6,
        }
    }
}

/// Hours between doses for a frequency label.
///
/// Total over all strings: an unrecognized label falls back to the
/// once-daily cadence rather than erroring, so a typo in a medication
/// record degrades to a conservative schedule instead of breaking the list.
pub fn hours_until_next_dose(frequency: &str) -> i64 {
    DoseFrequency::from_label(frequency)
        .unwrap_or(DoseFrequency::OnceDaily)
        .interval_hours()
}

/// The next-dose instant after a dose is taken at `now`.
pub fn next_dose_after(now: DateTime<Utc>, frequency: &str) -> DateTime<Utc> {
    now + Duration::hours(hours_until_next_dose(frequency))
}

/// Alert classification of a medication against the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoseStatus {
    Normal,
    DueSoon,
    Overdue,
}

impl DoseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::DueSoon => "due_soon",
            Self::Overdue => "overdue",
        }
    }

    /// Suffix text shown next to the next-dose time, if any.
    pub fn suffix(&self) -> Option<&'static str> {
        match self {
            Self::Normal => None,
            Self::DueSoon => Some("Due soon"),
            Self::Overdue => Some("Overdue"),
        }
    }
}

/// Classify a next-dose instant against `now`.
///
/// Boundary rules, load-bearing for every badge and alert in the app: both
/// comparisons are strict, so a dose exactly at `now` is neither overdue nor
/// due soon — it is exactly due, shown without a suffix. Due-soon covers the
/// open interval `(now, now + 1h)`.
pub fn classify(next_dose_time: DateTime<Utc>, now: DateTime<Utc>) -> DoseStatus {
    if now > next_dose_time {
        DoseStatus::Overdue
    } else if now < next_dose_time
        && next_dose_time < now + Duration::minutes(DUE_SOON_WINDOW_MINUTES)
    {
        DoseStatus::DueSoon
    } else {
        DoseStatus::Normal
    }
}

/// Dashboard "pending" rule: the dose came due within the last 24 hours,
/// boundary-inclusive at `now`, exclusive at `now - 24h`.
pub fn is_pending(next_dose_time: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    next_dose_time <= now && next_dose_time > now - Duration::hours(PENDING_LOOKBACK_HOURS)
}
