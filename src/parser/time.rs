//! Start-end time resolution. The source tables print a meridiem only once
//! per range (on the end time), so the start's AM/PM has to be reconstructed
//! from the constraint that a schedule's end time falls after its start time
//! within the same day.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

static NON_DIGIT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\D").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Meridiem {
    Am,
    Pm,
}

impl Meridiem {
    pub fn as_str(self) -> &'static str {
        match self {
            Meridiem::Am => "am",
            Meridiem::Pm => "pm",
        }
    }
}

/// One endpoint of a range, kept in both 12h and 24h form. `raw_minutes` is
/// minutes since midnight and always falls within [0, 1439].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimePoint {
    pub raw: String,
    pub hour12: u32,
    pub hour24: u32,
    pub minute: u32,
    pub meridiem: Meridiem,
    pub raw_minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeRange {
    pub raw_range: String,
    pub start: TimePoint,
    pub end: TimePoint,
}

#[derive(Debug, Error)]
enum TimeParseError {
    #[error("missing '-' separator")]
    MissingSeparator,
    #[error("segment has no usable digits")]
    NoDigits,
    #[error("minute out of range")]
    MinuteOutOfRange,
    #[error("end time not after start under either meridiem")]
    Unorderable,
}

/// Resolve a raw range like `"6:00-8:45pm"`. Malformed input yields the zero
/// sentinel (endpoints marked `"error"`) instead of an error; the record is
/// still emitted with degraded time data.
pub fn resolve(raw: &str) -> TimeRange {
    parse_range(raw).unwrap_or_else(|_| sentinel(raw))
}

struct Segment {
    raw: String,
    hour: u32,
    minute: u32,
    meridiem: Meridiem,
}

fn parse_range(raw: &str) -> Result<TimeRange, TimeParseError> {
    let (start_raw, end_raw) = raw.split_once('-').ok_or(TimeParseError::MissingSeparator)?;

    let start = parse_segment(start_raw)?;
    let end = parse_segment(end_raw)?;

    // The end segment's meridiem is printed in the source; the start's is
    // not. Convert the start both ways and keep whichever ordering puts it
    // before the end.
    let start_as_am = to_24h(start.hour, start.minute, Meridiem::Am).1;
    let start_as_pm = to_24h(start.hour, start.minute, Meridiem::Pm).1;
    let end_point = time_point(&end, end.meridiem);

    let am_ok = end_point.raw_minutes > start_as_am;
    let pm_ok = end_point.raw_minutes > start_as_pm;

    // Both orderings hold only when the hours coincide, in which case the
    // start shares the end's meridiem.
    let start_meridiem = match (am_ok, pm_ok) {
        (true, true) => end.meridiem,
        (true, false) => Meridiem::Am,
        (false, true) => Meridiem::Pm,
        (false, false) => return Err(TimeParseError::Unorderable),
    };

    Ok(TimeRange {
        raw_range: raw.to_string(),
        start: time_point(&start, start_meridiem),
        end: end_point,
    })
}

fn parse_segment(raw: &str) -> Result<Segment, TimeParseError> {
    let mut parts = raw.splitn(2, ':');
    let hour_part = parts.next().unwrap_or("");
    let minute_part = parts.next();

    let hour = digits(hour_part).ok_or(TimeParseError::NoDigits)?;
    let minute = match minute_part {
        Some(part) => digits(part).ok_or(TimeParseError::NoDigits)?,
        None => 0,
    };
    if minute > 59 {
        return Err(TimeParseError::MinuteOutOfRange);
    }

    let meridiem = if raw.to_lowercase().contains("pm") {
        Meridiem::Pm
    } else {
        Meridiem::Am
    };

    Ok(Segment {
        raw: raw.to_string(),
        hour,
        minute,
        meridiem,
    })
}

fn digits(s: &str) -> Option<u32> {
    NON_DIGIT_RE.replace_all(s, "").parse().ok()
}

fn to_24h(hour: u32, minute: u32, meridiem: Meridiem) -> (u32, u32) {
    let hour24 = hour % 12 + if meridiem == Meridiem::Pm { 12 } else { 0 };
    (hour24, hour24 * 60 + minute)
}

fn time_point(seg: &Segment, meridiem: Meridiem) -> TimePoint {
    let (hour24, raw_minutes) = to_24h(seg.hour, seg.minute, meridiem);
    TimePoint {
        raw: seg.raw.clone(),
        hour12: seg.hour,
        hour24,
        minute: seg.minute,
        meridiem,
        raw_minutes,
    }
}

fn sentinel(raw: &str) -> TimeRange {
    let zero = || TimePoint {
        raw: "error".to_string(),
        hour12: 0,
        hour24: 0,
        minute: 0,
        meridiem: Meridiem::Am,
        raw_minutes: 0,
    };
    TimeRange {
        raw_range: raw.to_string(),
        start: zero(),
        end: zero(),
    }
}
