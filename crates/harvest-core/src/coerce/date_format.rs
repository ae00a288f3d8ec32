//! Token based date patterns (`YYYY-MM-DD HH:mm:ss`, `[at] h A`, ...), used
//! both to render dates and to parse input against a known layout.

use chrono::{
    DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike,
    Utc,
};
use regex::Regex;

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const WEEKDAYS: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Literal(String),
    Year4,
    Year2,
    Month,
    Month2,
    MonthShort,
    MonthLong,
    Day,
    Day2,
    Weekday,
    WeekdayMin,
    WeekdayShort,
    WeekdayLong,
    Hour,
    Hour2,
    Hour12,
    Hour12Pad,
    Minute,
    Minute2,
    Second,
    Second2,
    Millis,
    Meridiem,
    MeridiemLower,
    Offset,
    OffsetCompact,
    UnixSeconds,
    UnixMillis,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatePattern {
    tokens: Vec<Token>,
}

impl DatePattern {
    pub fn compile(pattern: &str) -> Self {
        let chars: Vec<char> = pattern.chars().collect();
        let mut tokens = Vec::new();
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            if c == '[' {
                let close = chars[i + 1..].iter().position(|&c| c == ']');
                if let Some(offset) = close {
                    let text: String = chars[i + 1..i + 1 + offset].iter().collect();
                    push_literal(&mut tokens, &text);
                    i += offset + 2;
                    continue;
                }
            }

            let run = chars[i..].iter().take_while(|&&r| r == c).count();
            let (token, width) = match (c, run) {
                ('Y', n) if n >= 4 => (Some(Token::Year4), 4),
                ('Y', n) if n >= 2 => (Some(Token::Year2), 2),
                ('M', 1) => (Some(Token::Month), 1),
                ('M', 2) => (Some(Token::Month2), 2),
                ('M', 3) => (Some(Token::MonthShort), 3),
                ('M', _) => (Some(Token::MonthLong), 4),
                ('D', 1) => (Some(Token::Day), 1),
                ('D', _) => (Some(Token::Day2), 2),
                ('d', 1) => (Some(Token::Weekday), 1),
                ('d', 2) => (Some(Token::WeekdayMin), 2),
                ('d', 3) => (Some(Token::WeekdayShort), 3),
                ('d', _) => (Some(Token::WeekdayLong), 4),
                ('H', 1) => (Some(Token::Hour), 1),
                ('H', _) => (Some(Token::Hour2), 2),
                ('h', 1) => (Some(Token::Hour12), 1),
                ('h', _) => (Some(Token::Hour12Pad), 2),
                ('m', 1) => (Some(Token::Minute), 1),
                ('m', _) => (Some(Token::Minute2), 2),
                ('s', 1) => (Some(Token::Second), 1),
                ('s', _) => (Some(Token::Second2), 2),
                ('S', n) if n >= 3 => (Some(Token::Millis), 3),
                ('A', _) => (Some(Token::Meridiem), 1),
                ('a', _) => (Some(Token::MeridiemLower), 1),
                ('Z', 1) => (Some(Token::Offset), 1),
                ('Z', _) => (Some(Token::OffsetCompact), 2),
                ('X', _) => (Some(Token::UnixSeconds), 1),
                ('x', _) => (Some(Token::UnixMillis), 1),
                _ => (None, 1),
            };
            match token {
                Some(token) => tokens.push(token),
                None => push_literal(&mut tokens, &c.to_string()),
            }
            i += width;
        }

        Self { tokens }
    }

    /// Renders `date` in UTC.
    pub fn render(&self, date: &DateTime<Utc>) -> String {
        let mut out = String::new();
        for token in &self.tokens {
            match token {
                Token::Literal(text) => out.push_str(text),
                Token::Year4 => out.push_str(&format!("{:04}", date.year())),
                Token::Year2 => out.push_str(&format!("{:02}", date.year().rem_euclid(100))),
                Token::Month => out.push_str(&date.month().to_string()),
                Token::Month2 => out.push_str(&format!("{:02}", date.month())),
                Token::MonthShort => out.push_str(&MONTHS[date.month0() as usize][..3]),
                Token::MonthLong => out.push_str(MONTHS[date.month0() as usize]),
                Token::Day => out.push_str(&date.day().to_string()),
                Token::Day2 => out.push_str(&format!("{:02}", date.day())),
                Token::Weekday => {
                    out.push_str(&date.weekday().num_days_from_sunday().to_string())
                }
                Token::WeekdayMin => out.push_str(&weekday_name(date)[..2]),
                Token::WeekdayShort => out.push_str(&weekday_name(date)[..3]),
                Token::WeekdayLong => out.push_str(weekday_name(date)),
                Token::Hour => out.push_str(&date.hour().to_string()),
                Token::Hour2 => out.push_str(&format!("{:02}", date.hour())),
                Token::Hour12 => out.push_str(&hour12(date.hour()).to_string()),
                Token::Hour12Pad => out.push_str(&format!("{:02}", hour12(date.hour()))),
                Token::Minute => out.push_str(&date.minute().to_string()),
                Token::Minute2 => out.push_str(&format!("{:02}", date.minute())),
                Token::Second => out.push_str(&date.second().to_string()),
                Token::Second2 => out.push_str(&format!("{:02}", date.second())),
                Token::Millis => out.push_str(&format!("{:03}", date.timestamp_subsec_millis())),
                Token::Meridiem => out.push_str(if date.hour() < 12 { "AM" } else { "PM" }),
                Token::MeridiemLower => out.push_str(if date.hour() < 12 { "am" } else { "pm" }),
                Token::Offset => out.push_str("+00:00"),
                Token::OffsetCompact => out.push_str("+0000"),
                Token::UnixSeconds => out.push_str(&date.timestamp().to_string()),
                Token::UnixMillis => out.push_str(&date.timestamp_millis().to_string()),
            }
        }
        out
    }

    /// Parses `input` laid out exactly as this pattern. Fields the pattern
    /// does not mention default to the start of their unit, and the current
    /// year when no year is given.
    pub fn parse(&self, input: &str) -> Option<DateTime<Utc>> {
        let mut source = String::from(r"^\s*");
        for token in &self.tokens {
            source.push_str(&token_regex(token));
        }
        source.push_str(r"\s*$");
        let re = Regex::new(&source).ok()?;
        let caps = re.captures(input)?;

        let mut parts = DateParts::default();
        let mut group = 1;
        for token in &self.tokens {
            if matches!(token, Token::Literal(_)) {
                continue;
            }
            let text = caps.get(group)?.as_str();
            group += 1;
            parts.apply(token, text)?;
        }
        parts.build()
    }
}

fn push_literal(tokens: &mut Vec<Token>, text: &str) {
    if let Some(Token::Literal(existing)) = tokens.last_mut() {
        existing.push_str(text);
    } else {
        tokens.push(Token::Literal(text.to_string()));
    }
}

fn weekday_name(date: &DateTime<Utc>) -> &'static str {
    WEEKDAYS[date.weekday().num_days_from_sunday() as usize]
}

fn hour12(hour: u32) -> u32 {
    match hour % 12 {
        0 => 12,
        h => h,
    }
}

fn token_regex(token: &Token) -> String {
    match token {
        Token::Literal(text) => regex::escape(text),
        Token::Year4 => r"(\d{4})".into(),
        Token::Year2 | Token::Month2 | Token::Day2 => r"(\d{2})".into(),
        Token::Month
        | Token::Day
        | Token::Hour
        | Token::Hour2
        | Token::Hour12
        | Token::Hour12Pad
        | Token::Minute
        | Token::Minute2
        | Token::Second
        | Token::Second2 => r"(\d{1,2})".into(),
        Token::MonthShort | Token::MonthLong => r"([A-Za-z]+)".into(),
        Token::Weekday => r"(\d)".into(),
        Token::WeekdayMin | Token::WeekdayShort | Token::WeekdayLong => r"([A-Za-z]+)".into(),
        Token::Millis => r"(\d{3})".into(),
        Token::Meridiem | Token::MeridiemLower => r"([AaPp][Mm])".into(),
        Token::Offset | Token::OffsetCompact => r"(Z|[+-]\d{2}:?\d{2})".into(),
        Token::UnixSeconds => r"([+-]?\d+(?:\.\d{1,3})?)".into(),
        Token::UnixMillis => r"([+-]?\d+)".into(),
    }
}

#[derive(Debug, Default)]
struct DateParts {
    year: Option<i32>,
    month: Option<u32>,
    day: Option<u32>,
    hour: Option<u32>,
    minute: Option<u32>,
    second: Option<u32>,
    millis: Option<u32>,
    pm: Option<bool>,
    offset_seconds: Option<i32>,
    epoch_millis: Option<i64>,
}

impl DateParts {
    fn apply(&mut self, token: &Token, text: &str) -> Option<()> {
        match token {
            Token::Year4 => self.year = Some(text.parse().ok()?),
            Token::Year2 => {
                let yy: i32 = text.parse().ok()?;
                self.year = Some(yy + if yy > 68 { 1900 } else { 2000 });
            }
            Token::Month | Token::Month2 => self.month = Some(text.parse().ok()?),
            Token::MonthShort | Token::MonthLong => self.month = Some(month_from_name(text)?),
            Token::Day | Token::Day2 => self.day = Some(text.parse().ok()?),
            Token::Hour | Token::Hour2 | Token::Hour12 | Token::Hour12Pad => {
                self.hour = Some(text.parse().ok()?)
            }
            Token::Minute | Token::Minute2 => self.minute = Some(text.parse().ok()?),
            Token::Second | Token::Second2 => self.second = Some(text.parse().ok()?),
            Token::Millis => self.millis = Some(text.parse().ok()?),
            Token::Meridiem | Token::MeridiemLower => {
                self.pm = Some(text.eq_ignore_ascii_case("pm"))
            }
            Token::Offset | Token::OffsetCompact => self.offset_seconds = Some(parse_offset(text)?),
            Token::UnixSeconds => {
                let seconds: f64 = text.parse().ok()?;
                self.epoch_millis = Some((seconds * 1000.0).round() as i64);
            }
            Token::UnixMillis => self.epoch_millis = Some(text.parse().ok()?),
            Token::Weekday
            | Token::WeekdayMin
            | Token::WeekdayShort
            | Token::WeekdayLong
            | Token::Literal(_) => {}
        }
        Some(())
    }

    fn build(self) -> Option<DateTime<Utc>> {
        if let Some(millis) = self.epoch_millis {
            return Utc.timestamp_millis_opt(millis).single();
        }

        let year = self.year.unwrap_or_else(|| Utc::now().year());
        let mut hour = self.hour.unwrap_or(0);
        match self.pm {
            Some(true) if hour < 12 => hour += 12,
            Some(false) if hour == 12 => hour = 0,
            _ => {}
        }

        let date = NaiveDate::from_ymd_opt(year, self.month.unwrap_or(1), self.day.unwrap_or(1))?;
        let time = NaiveTime::from_hms_milli_opt(
            hour,
            self.minute.unwrap_or(0),
            self.second.unwrap_or(0),
            self.millis.unwrap_or(0),
        )?;
        naive_to_utc(NaiveDateTime::new(date, time), self.offset_seconds)
    }
}

/// Interprets a wall clock time at the given UTC offset, UTC when absent.
pub(crate) fn naive_to_utc(naive: NaiveDateTime, offset_seconds: Option<i32>) -> Option<DateTime<Utc>> {
    match offset_seconds {
        Some(seconds) => FixedOffset::east_opt(seconds)?
            .from_local_datetime(&naive)
            .single()
            .map(|dt| dt.with_timezone(&Utc)),
        None => Some(Utc.from_utc_datetime(&naive)),
    }
}

/// `Z`, `+05:30` or `-0800` as seconds east of UTC.
pub(crate) fn parse_offset(text: &str) -> Option<i32> {
    if text.eq_ignore_ascii_case("z") {
        return Some(0);
    }
    let sign = match text.chars().next()? {
        '+' => 1,
        '-' => -1,
        _ => return None,
    };
    let digits: String = text[1..].chars().filter(char::is_ascii_digit).collect();
    if digits.len() != 4 {
        return None;
    }
    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    Some(sign * (hours * 3600 + minutes * 60))
}

fn month_from_name(text: &str) -> Option<u32> {
    let lower = text.to_ascii_lowercase();
    if lower.len() < 3 {
        return None;
    }
    MONTHS
        .iter()
        .position(|month| month.to_ascii_lowercase().starts_with(&lower[..3]))
        .map(|index| index as u32 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_render_common_tokens() {
        let date = utc(2020, 1, 2, 15, 4, 5);
        assert_eq!(DatePattern::compile("YYYY/MM/DD").render(&date), "2020/01/02");
        assert_eq!(
            DatePattern::compile("ddd, D MMM YY h:mm A").render(&date),
            "Thu, 2 Jan 20 3:04 PM"
        );
        assert_eq!(
            DatePattern::compile("[Year] YYYY [at] HH[h]").render(&date),
            "Year 2020 at 15h"
        );
        assert_eq!(DatePattern::compile("X").render(&date), "1577977445");
    }

    #[test]
    fn test_parse_layouts() {
        assert_eq!(
            DatePattern::compile("YYYY/MM/DD").parse("2020/01/02"),
            Some(utc(2020, 1, 2, 0, 0, 0))
        );
        assert_eq!(
            DatePattern::compile("YYYY-MM").parse("2020-01"),
            Some(utc(2020, 1, 1, 0, 0, 0))
        );
        assert_eq!(
            DatePattern::compile("D MMMM YYYY h:mm a").parse("5 March 2021 7:30 pm"),
            Some(utc(2021, 3, 5, 19, 30, 0))
        );
    }

    #[test]
    fn test_parse_with_offset() {
        assert_eq!(
            DatePattern::compile("YYYY/MM/DD HH:mm Z").parse("2020/01/01 10:00 +02:00"),
            Some(utc(2020, 1, 1, 8, 0, 0))
        );
        assert_eq!(
            DatePattern::compile("YYYY/MM/DD Z").parse("2020/01/01 Z"),
            Some(utc(2020, 1, 1, 0, 0, 0))
        );
    }

    #[test]
    fn test_parse_rejects_mismatch() {
        assert_eq!(DatePattern::compile("YYYY/MM/DD").parse("2020-01"), None);
        assert_eq!(DatePattern::compile("YYYY-MM-DD").parse("2020-13-01"), None);
    }

    #[test]
    fn test_parse_epoch_tokens() {
        assert_eq!(
            DatePattern::compile("x").parse("1577840461000"),
            Some(utc(2020, 1, 1, 1, 1, 1))
        );
    }
}
