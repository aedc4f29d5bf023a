//! Rendering of API records into terminal text.
//!
//! All functions are pure: they take records plus the reference time and
//! return strings, so identical input always yields byte-identical output.

use chrono::{DateTime, Utc};

use crate::twitter::{DirectMessage, Status, User};
use crate::error::Result;

/// Minimum width of the right-aligned name column (longest allowed screen name).
pub const NAME_COLUMN_WIDTH: usize = 20;

const MINUTES_PER_HOUR: i64 = 60;
const MINUTES_PER_DAY: i64 = 1440;
const MINUTES_PER_MONTH: i64 = 43_200;
const MINUTES_PER_YEAR: i64 = 525_600;

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", count, unit)
    }
}

fn rounded(minutes: i64, per_unit: i64) -> i64 {
    (minutes as f64 / per_unit as f64).round() as i64
}

/// Describes the distance between `then` and `now` in words, e.g. `7 months`.
///
/// Minutes are rounded to the nearest whole minute, then bucketed:
///
/// | minutes          | rendering                         |
/// |------------------|-----------------------------------|
/// | 0                | less than a minute                |
/// | 1..=44           | N minute(s)                       |
/// | 45..=89          | about 1 hour                      |
/// | 90..=1439        | about N hours                     |
/// | 1440..=2519      | 1 day                             |
/// | 2520..=43199     | N days                            |
/// | 43200..=86399    | about 1 month                     |
/// | 86400..=525599   | N months                          |
/// | beyond           | about / over / almost N year(s)   |
///
/// Past one year, a quarter-year into the current year switches "about" to
/// "over", and three quarters switches to "almost" the next year. Every
/// fourth year contributes one leap day to the offset.
pub fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - then).num_seconds().abs();
    let minutes = (seconds as f64 / 60.0).round() as i64;

    match minutes {
        0 => "less than a minute".to_string(),
        1..=44 => plural(minutes, "minute"),
        45..=89 => "about 1 hour".to_string(),
        90..=1439 => format!("about {}", plural(rounded(minutes, MINUTES_PER_HOUR), "hour")),
        1440..=2519 => "1 day".to_string(),
        2520..=43199 => plural(rounded(minutes, MINUTES_PER_DAY), "day"),
        43200..=86399 => "about 1 month".to_string(),
        86400..=525599 => plural(rounded(minutes, MINUTES_PER_MONTH), "month"),
        _ => {
            let years = minutes / MINUTES_PER_YEAR;
            let leap_offset = (years / 4) * MINUTES_PER_DAY;
            let remainder = (minutes - leap_offset) % MINUTES_PER_YEAR;
            if remainder < 131_400 {
                format!("about {}", plural(years, "year"))
            } else if remainder < 394_200 {
                format!("over {}", plural(years, "year"))
            } else {
                format!("almost {}", plural(years + 1, "year"))
            }
        }
    }
}

/// One row of a status or message listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry<'a> {
    pub handle: &'a str,
    pub text: &'a str,
    pub created_at: DateTime<Utc>,
}

impl<'a> Entry<'a> {
    pub fn from_status(status: &'a Status) -> Result<Self> {
        Ok(Entry {
            handle: status.author()?,
            text: &status.text,
            created_at: status.created_at,
        })
    }

    pub fn from_sender(message: &'a DirectMessage) -> Self {
        Entry {
            handle: &message.sender_screen_name,
            text: &message.text,
            created_at: message.created_at,
        }
    }

    pub fn from_recipient(message: &'a DirectMessage) -> Self {
        Entry {
            handle: &message.recipient_screen_name,
            text: &message.text,
            created_at: message.created_at,
        }
    }
}

/// Renders `<handle>: <text> (<time> ago)` lines with the handles right-aligned.
///
/// The name column is as wide as the widest handle, but never narrower than
/// [`NAME_COLUMN_WIDTH`]. Line breaks inside the text become spaces.
pub fn entry_lines(entries: &[Entry<'_>], now: DateTime<Utc>) -> Vec<String> {
    let width = entries
        .iter()
        .map(|e| e.handle.chars().count())
        .max()
        .unwrap_or(0)
        .max(NAME_COLUMN_WIDTH);

    entries
        .iter()
        .map(|entry| {
            let text: String = entry
                .text
                .chars()
                .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
                .collect();
            format!(
                "{:>width$}: {} ({} ago)",
                entry.handle,
                text,
                relative_time(entry.created_at, now),
                width = width
            )
        })
        .collect()
}

/// Lays out `items` in columns `widest + 2` wide across `terminal_width`.
///
/// Items keep their input order, filling each row left to right. Rows carry
/// no trailing whitespace. An empty input renders no lines.
pub fn columns<S: AsRef<str>>(items: &[S], terminal_width: usize) -> Vec<String> {
    let Some(widest) = items.iter().map(|i| i.as_ref().chars().count()).max() else {
        return Vec::new();
    };
    let column_width = widest + 2;
    let per_row = (terminal_width / column_width).max(1);

    items
        .chunks(per_row)
        .map(|row| {
            let line: String = row
                .iter()
                .map(|item| format!("{:<width$}", item.as_ref(), width = column_width))
                .collect();
            line.trim_end().to_string()
        })
        .collect()
}

/// Formats an integer with comma thousands separators: `7505382` → `7,505,382`.
pub fn number_with_delimiter(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// The five-line profile block shown by `whois`.
pub fn whois(user: &User) -> Vec<String> {
    vec![
        format!("id: #{}", number_with_delimiter(user.id)),
        format!("{}, since {}.", user.name, user.created_at.format("%b %Y")),
        format!("bio: {}", user.description.as_deref().unwrap_or_default()),
        format!("location: {}", user.location.as_deref().unwrap_or_default()),
        format!("web: {}", user.url.as_deref().unwrap_or_default()),
    ]
}

/// `1 user` / `N users`.
pub fn users_count(count: usize) -> String {
    plural(count as i64, "user")
}
