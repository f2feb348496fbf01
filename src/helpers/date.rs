//! Date helper functions

use anyhow::{anyhow, Result};
use chrono::{
    DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone,
    Timelike, Utc,
};
use chrono_tz::Tz;

/// Moment.js tokens understood by [`format_date`], longest first within each prefix
const MOMENT_TOKENS: &[&str] = &[
    "YYYY", "YY", "MMMM", "MMM", "MM", "M", "Do", "DD", "D", "dddd", "ddd", "HH", "H", "hh", "h",
    "mm", "m", "ss", "s", "SSS", "A", "a", "ZZ", "Z",
];

/// Format a date using a Moment.js-compatible format string
///
/// Text inside square brackets is copied verbatim.
///
/// # Examples
/// ```ignore
/// format_date(&date, "MMMM Do, YYYY") // -> "June 1st, 2024"
/// format_date(&date, "YYYY-MM-DD")    // -> "2024-06-01"
/// ```
pub fn format_date<Tz2: TimeZone>(date: &DateTime<Tz2>, format: &str) -> String
where
    Tz2::Offset: std::fmt::Display,
{
    let mut output = String::with_capacity(format.len() * 2);
    let mut rest = format;

    while let Some(c) = rest.chars().next() {
        if c == '[' {
            if let Some(end) = rest.find(']') {
                output.push_str(&rest[1..end]);
                rest = &rest[end + 1..];
                continue;
            }
        }

        match MOMENT_TOKENS.iter().find(|token| rest.starts_with(**token)) {
            Some(token) => {
                output.push_str(&render_token(date, token));
                rest = &rest[token.len()..];
            }
            None => {
                output.push(c);
                rest = &rest[c.len_utf8()..];
            }
        }
    }

    output
}

fn render_token<Tz2: TimeZone>(date: &DateTime<Tz2>, token: &str) -> String
where
    Tz2::Offset: std::fmt::Display,
{
    match token {
        "YYYY" => date.format("%Y").to_string(),
        "YY" => date.format("%y").to_string(),
        "MMMM" => date.format("%B").to_string(),
        "MMM" => date.format("%b").to_string(),
        "MM" => date.format("%m").to_string(),
        "M" => date.month().to_string(),
        "Do" => ordinal(date.day()),
        "DD" => date.format("%d").to_string(),
        "D" => date.day().to_string(),
        "dddd" => date.format("%A").to_string(),
        "ddd" => date.format("%a").to_string(),
        "HH" => date.format("%H").to_string(),
        "H" => date.hour().to_string(),
        "hh" => date.format("%I").to_string(),
        "h" => date.hour12().1.to_string(),
        "mm" => date.format("%M").to_string(),
        "m" => date.minute().to_string(),
        "ss" => date.format("%S").to_string(),
        "s" => date.second().to_string(),
        "SSS" => date.format("%3f").to_string(),
        "A" => date.format("%p").to_string(),
        "a" => date.format("%P").to_string(),
        "ZZ" => date.format("%z").to_string(),
        "Z" => date.format("%:z").to_string(),
        other => other.to_string(),
    }
}

/// English ordinal for a day of the month: 1st, 2nd, 3rd, 4th, 11th, 21st...
pub fn ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}

/// The time zone the site's clock and naive front-matter dates live in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SiteZone {
    /// The host's local time zone
    #[default]
    System,
    /// An IANA time zone such as `Europe/Paris`
    Named(Tz),
}

impl SiteZone {
    /// Resolve a zone from the `timezone` config value; empty means system local time
    pub fn from_name(name: &str) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(SiteZone::System);
        }
        name.parse::<Tz>()
            .map(SiteZone::Named)
            .map_err(|e| anyhow!("unknown time zone `{}`: {}", name, e))
    }

    /// Current instant, expressed in this zone
    pub fn now(&self) -> DateTime<FixedOffset> {
        match self {
            SiteZone::System => fix(chrono::Local::now()),
            SiteZone::Named(tz) => fix(Utc::now().with_timezone(tz)),
        }
    }

    /// Interpret a wall-clock time in this zone
    ///
    /// Ambiguous times (DST fold) resolve to the earlier instant. Times that
    /// fall in a DST gap are pushed forward by the length of the gap, so a
    /// midnight switch turns `00:00` into the first valid wall-clock time.
    pub fn localize(&self, naive: &NaiveDateTime) -> Option<DateTime<FixedOffset>> {
        match self {
            SiteZone::System => resolve_local(&chrono::Local, naive),
            SiteZone::Named(tz) => resolve_local(tz, naive),
        }
    }
}

/// Largest DST gap tried when a wall-clock time does not exist
const MAX_GAP_MINUTES: i64 = 120;

fn resolve_local<Z: TimeZone>(zone: &Z, naive: &NaiveDateTime) -> Option<DateTime<FixedOffset>> {
    if let Some(date) = zone.from_local_datetime(naive).earliest() {
        return Some(fix(date));
    }

    (1..=MAX_GAP_MINUTES / 30).find_map(|step| {
        let shifted = naive.checked_add_signed(Duration::minutes(step * 30))?;
        zone.from_local_datetime(&shifted).earliest().map(fix)
    })
}

fn fix<Z: TimeZone>(date: DateTime<Z>) -> DateTime<FixedOffset> {
    let offset = date.offset().fix();
    date.with_timezone(&offset)
}

/// Parse a front-matter date string in various formats
///
/// Values carrying an offset keep it; naive values are read in `zone`.
pub fn parse_date_string(s: &str, zone: &SiteZone) -> Option<DateTime<FixedOffset>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }

    let offset_formats = ["%Y-%m-%d %H:%M:%S %z", "%Y-%m-%dT%H:%M:%S%z"];
    for fmt in offset_formats {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    let datetime_formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
    ];
    for fmt in datetime_formats {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return zone.localize(&naive);
        }
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return zone.localize(&date.and_hms_opt(0, 0, 0)?);
        }
    }

    None
}
