//! Date format strings in the `Y-m-d\TH:i:s` notation.
//!
//! Date formats are configured with single-letter tokens (`Y`, `m`, `d`, `H`,
//! `i`, `s`, `u`, ...) where a backslash escapes the next character. A
//! [`DateFormat`] compiles such a string into a chrono `strftime` pattern once
//! and then formats and parses with it.
//!
//! Parsing fills missing time fields with midnight and treats a pattern
//! without an offset token as UTC.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};

/// A compiled date format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFormat {
    source: String,
    pattern: String,
    has_time: bool,
    has_offset: bool,
    has_timestamp: bool,
}

impl DateFormat {
    /// Compile a format string. Unknown letters are kept as literals.
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let mut pattern = String::with_capacity(source.len() * 2);
        let mut has_time = false;
        let mut has_offset = false;
        let mut has_timestamp = false;

        let mut chars = source.chars();
        while let Some(c) = chars.next() {
            let token = match c {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        push_literal(&mut pattern, escaped);
                    }
                    continue;
                }
                'd' => "%d",
                'j' => "%-d",
                'D' => "%a",
                'l' => "%A",
                'N' => "%u",
                'w' => "%w",
                'm' => "%m",
                'n' => "%-m",
                'M' => "%b",
                'F' => "%B",
                'Y' => "%Y",
                'y' => "%y",
                'a' => "%P",
                'A' => "%p",
                'g' | 'G' | 'h' | 'H' | 'i' | 's' | 'u' | 'v' => {
                    has_time = true;
                    match c {
                        'g' => "%-I",
                        'G' => "%-H",
                        'h' => "%I",
                        'H' => "%H",
                        'i' => "%M",
                        's' => "%S",
                        'u' => "%6f",
                        _ => "%3f",
                    }
                }
                'O' => {
                    has_offset = true;
                    "%z"
                }
                'P' | 'p' => {
                    has_offset = true;
                    "%:z"
                }
                'c' => {
                    has_time = true;
                    has_offset = true;
                    "%Y-%m-%dT%H:%M:%S%:z"
                }
                'U' => {
                    has_timestamp = true;
                    "%s"
                }
                other => {
                    push_literal(&mut pattern, other);
                    continue;
                }
            };
            pattern.push_str(token);
        }

        Self {
            source,
            pattern,
            has_time,
            has_offset,
            has_timestamp,
        }
    }

    /// The format string as configured.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// The compiled chrono pattern.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn format(&self, value: &DateTime<FixedOffset>) -> String {
        value.format(&self.pattern).to_string()
    }

    /// Parse `value`, returning the instant it denotes.
    pub fn parse(&self, value: &str) -> Option<DateTime<FixedOffset>> {
        if self.has_offset || self.has_timestamp {
            return DateTime::parse_from_str(value, &self.pattern).ok();
        }

        let naive = if self.has_time {
            NaiveDateTime::parse_from_str(value, &self.pattern).ok()?
        } else {
            NaiveDate::parse_from_str(value, &self.pattern)
                .ok()?
                .and_time(NaiveTime::MIN)
        };
        Some(naive.and_utc().fixed_offset())
    }

    /// Parse `value` and normalize it to UTC.
    pub fn parse_utc(&self, value: &str) -> Option<DateTime<FixedOffset>> {
        self.parse(value)
            .map(|parsed| parsed.with_timezone(&Utc).fixed_offset())
    }
}

fn push_literal(pattern: &mut String, c: char) {
    if c == '%' {
        pattern.push_str("%%");
    } else {
        pattern.push(c);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32, i: u32, s: u32) -> DateTime<FixedOffset> {
        Utc.with_ymd_and_hms(y, m, d, h, i, s)
            .unwrap()
            .fixed_offset()
    }

    #[test]
    fn test_compiles_escaped_literals() {
        let format = DateFormat::new(r"Y-m-d\TH:i:s\Z");
        assert_eq!(format.pattern(), "%Y-%m-%dT%H:%M:%SZ");
        assert_eq!(format.as_str(), r"Y-m-d\TH:i:s\Z");
    }

    #[test]
    fn test_percent_is_escaped() {
        assert_eq!(DateFormat::new("Y%").pattern(), "%Y%%");
    }

    #[test]
    fn test_format_and_parse() {
        let format = DateFormat::new(r"Y-m-d\TH:i:s\Z");
        let value = utc(2023, 12, 31, 12, 34, 56);
        assert_eq!(format.format(&value), "2023-12-31T12:34:56Z");
        assert_eq!(format.parse("2023-12-31T12:34:56Z"), Some(value));
    }

    #[test]
    fn test_microseconds() {
        let format = DateFormat::new(r"Y-m-d\TH:i:s.u\Z");
        let value = Utc
            .with_ymd_and_hms(2024, 2, 29, 8, 0, 1)
            .unwrap()
            .fixed_offset()
            + chrono::Duration::microseconds(123_456);
        let text = format.format(&value);
        assert_eq!(text, "2024-02-29T08:00:01.123456Z");
        assert_eq!(format.parse(&text), Some(value));
    }

    #[test]
    fn test_date_only_is_midnight() {
        let format = DateFormat::new("Y-m-d");
        assert_eq!(format.parse("2022-12-31"), Some(utc(2022, 12, 31, 0, 0, 0)));
    }

    #[test]
    fn test_offset_is_normalized_to_utc() {
        let format = DateFormat::new(r"Y-m-d\TH:i:sP");
        let parsed = format.parse_utc("2023-12-31T14:34:56+02:00").unwrap();
        assert_eq!(parsed, utc(2023, 12, 31, 12, 34, 56));
        assert_eq!(parsed.offset().local_minus_utc(), 0);
    }

    #[test]
    fn test_unparsable_value() {
        let format = DateFormat::new(r"Y-m-d\TH:i:s\Z");
        assert_eq!(format.parse("31.12.2023"), None);
    }
}
