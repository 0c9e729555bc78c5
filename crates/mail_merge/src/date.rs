//! Date context and Word date-time pictures

use chrono::{Locale, NaiveDate, NaiveDateTime};
use std::fmt::Write;

/// Default long-form date: `1 April 2020`
pub const LONG_DATE_PICTURE: &str = "d MMMM yyyy";

/// Caller-supplied date information for one merge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateContext<'a> {
    /// Point in time DATE fields display
    pub now: Option<NaiveDateTime>,
    /// Picture that overrides any `\@` switch on DATE fields
    pub picture: Option<&'a str>,
    /// Locale for month and day names
    pub locale: Locale,
}

impl Default for DateContext<'_> {
    fn default() -> Self {
        Self {
            now: None,
            picture: None,
            locale: Locale::en_US,
        }
    }
}

impl<'a> DateContext<'a> {
    pub fn at(now: NaiveDateTime) -> Self {
        Self {
            now: Some(now),
            ..Default::default()
        }
    }

    pub fn with_picture(mut self, picture: &'a str) -> Self {
        self.picture = Some(picture);
        self
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }
}

/// Resolve a locale name such as `fr_FR`
pub fn parse_locale(name: &str) -> Option<Locale> {
    Locale::try_from(name.replace('-', "_").as_str()).ok()
}

/// Convert a Word date-time picture to a chrono format string.
///
/// Runs of `d M y h H m s` map to their strftime equivalents, `AM/PM` and
/// `am/pm` map to the meridiem, text in single quotes is literal and every
/// other character is copied as is.
pub fn picture_to_strftime(picture: &str) -> String {
    let chars: Vec<char> = picture.chars().collect();
    let mut out = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '\'' {
            i += 1;
            while i < chars.len() && chars[i] != '\'' {
                push_literal(&mut out, chars[i]);
                i += 1;
            }
            i += 1;
            continue;
        }

        let rest: String = chars[i..].iter().take(5).collect();
        if rest == "AM/PM" {
            out.push_str("%p");
            i += 5;
            continue;
        }
        if rest == "am/pm" {
            out.push_str("%P");
            i += 5;
            continue;
        }

        let run = chars[i..].iter().take_while(|x| **x == c).count();
        let spec = match (c, run) {
            ('d', 1) => "%-d",
            ('d', 2) => "%d",
            ('d', 3) => "%a",
            ('d', _) => "%A",
            ('M', 1) => "%-m",
            ('M', 2) => "%m",
            ('M', 3) => "%b",
            ('M', _) => "%B",
            ('y', 1 | 2) => "%y",
            ('y', _) => "%Y",
            ('h', 1) => "%-I",
            ('h', _) => "%I",
            ('H', 1) => "%-H",
            ('H', _) => "%H",
            ('m', 1) => "%-M",
            ('m', _) => "%M",
            ('s', 1) => "%-S",
            ('s', _) => "%S",
            _ => {
                push_literal(&mut out, c);
                i += 1;
                continue;
            }
        };
        out.push_str(spec);
        i += run;
    }

    out
}

fn push_literal(out: &mut String, c: char) {
    if c == '%' {
        out.push_str("%%");
    } else {
        out.push(c);
    }
}

/// Render a point in time with a Word picture
pub fn format_date(value: NaiveDateTime, picture: &str, locale: Locale) -> Option<String> {
    let format = picture_to_strftime(picture);
    let mut out = String::new();
    write!(out, "{}", value.and_utc().format_localized(&format, locale)).ok()?;
    Some(out)
}

/// Parse a value that looks like an ISO date or date-time
pub fn parse_date_value(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}
