use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, SubsecRound, Utc};

use crate::models::Booking;

/// Half-open interval `[start, end)` with `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Self> {
        (start < end).then_some(Self { start, end })
    }

    pub fn parse(start: &str, end: &str) -> Option<Self> {
        Self::new(parse_instant(start)?, parse_instant(end)?)
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Touching ranges do not overlap.
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start < other.end && self.end > other.start
    }
}

/// Accepts RFC 3339, a naive date-time (taken as UTC) or a bare date
/// (midnight UTC). Results are truncated to milliseconds and limited to
/// years 0000..=9999, the precision and range bookings are stored with.
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    parse_any(raw.trim())
        .map(|dt| dt.trunc_subsecs(3))
        .filter(|dt| (0..=9999).contains(&dt.year()))
}

fn parse_any(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// First non-cancelled booking whose range collides with `candidate`.
pub fn find_conflict<'a>(existing: &'a [Booking], candidate: &DateRange) -> Option<&'a Booking> {
    existing.iter().filter(|b| b.is_active()).find(|b| {
        DateRange::new(b.start_date, b.end_date)
            .map(|range| range.overlaps(candidate))
            .unwrap_or(false)
    })
}
