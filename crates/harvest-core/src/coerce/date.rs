use super::date_format::{DatePattern, naive_to_utc, parse_offset};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use harvest_common::Value;
use harvest_common::value::format_iso;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static ISO_LIKE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(\d{4})(?:[-/ ](\d{1,2})(?:[-/ ](\d{1,2}))?)?(?:[Tt ]+(\d{1,2}):(\d{2})(?::(\d{2})(?:[.:](\d+))?)?)?\s*(Z|z|[+-]\d{2}:?\d{2})?$",
    )
    .unwrap()
});

/// A default date, given as text or as epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateInput {
    Epoch(f64),
    Text(String),
}

impl DateInput {
    fn to_date(&self) -> Option<DateTime<Utc>> {
        match self {
            DateInput::Epoch(millis) => from_epoch_millis(*millis),
            DateInput::Text(text) => parse_default(text),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateOptions {
    pub default: Option<DateInput>,
    /// Accepted input layouts, tried in order.
    #[serde(deserialize_with = "super::one_or_many")]
    pub parse: Vec<String>,
    /// `iso` (default), `date`, `dayjs`, `timestamp` or a token pattern.
    pub format: Option<String>,
}

pub fn parse_date(raw: &Value, options: &DateOptions) -> Value {
    let parsed = match raw {
        Value::Date(date) => Some(*date),
        Value::Number(millis) => from_epoch_millis(*millis),
        Value::String(text) if options.parse.is_empty() => parse_default(text),
        Value::String(text) => options
            .parse
            .iter()
            .find_map(|layout| DatePattern::compile(layout).parse(text)),
        _ => None,
    };

    parsed
        .or_else(|| options.default.as_ref().and_then(DateInput::to_date))
        .map(|date| render(date, options.format.as_deref()))
        .unwrap_or(Value::Null)
}

fn render(date: DateTime<Utc>, format: Option<&str>) -> Value {
    match format {
        None | Some("iso") => Value::String(format_iso(&date)),
        Some("date") | Some("dayjs") => Value::Date(date),
        Some("timestamp") => Value::Number(date.timestamp_millis() as f64),
        Some(pattern) => Value::String(DatePattern::compile(pattern).render(&date)),
    }
}

fn from_epoch_millis(millis: f64) -> Option<DateTime<Utc>> {
    if !millis.is_finite() {
        return None;
    }
    Utc.timestamp_millis_opt(millis.round() as i64).single()
}

/// Parses RFC 3339, RFC 2822 and ISO-like `YYYY[-MM[-DD]][ HH:mm[:ss[.SSS]]][Z]`
/// text. Wall clock times without an offset are taken as UTC.
pub fn parse_default(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(text) {
        return Some(date.with_timezone(&Utc));
    }
    if let Ok(date) = DateTime::parse_from_rfc2822(text) {
        return Some(date.with_timezone(&Utc));
    }

    let caps = ISO_LIKE.captures(text)?;
    let number = |i: usize, fallback: u32| -> Option<u32> {
        match caps.get(i) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(fallback),
        }
    };

    let year: i32 = caps.get(1)?.as_str().parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, number(2, 1)?, number(3, 1)?)?;
    let millis = caps
        .get(7)
        .map(|m| {
            let digits: String = m.as_str().chars().chain("000".chars()).take(3).collect();
            digits.parse::<u32>().unwrap_or(0)
        })
        .unwrap_or(0);
    let time = NaiveTime::from_hms_milli_opt(number(4, 0)?, number(5, 0)?, number(6, 0)?, millis)?;
    let offset = match caps.get(8) {
        Some(m) => Some(parse_offset(m.as_str())?),
        None => None,
    };
    naive_to_utc(NaiveDateTime::new(date, time), offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_format(format: &str) -> DateOptions {
        DateOptions {
            format: Some(format.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_epoch_millis_to_iso() {
        let value = parse_date(&Value::Number(1577840461000.0), &DateOptions::default());
        assert_eq!(value, Value::from("2020-01-01T01:01:01.000Z"));
    }

    #[test]
    fn test_default_layouts() {
        let options = DateOptions::default();
        assert_eq!(
            parse_date(&Value::from("2020 01 02"), &options),
            Value::from("2020-01-02T00:00:00.000Z")
        );
        assert_eq!(
            parse_date(&Value::from("2020-01-02T03:04:05+01:00"), &options),
            Value::from("2020-01-02T02:04:05.000Z")
        );
        assert_eq!(
            parse_date(&Value::from("2020-01-02 03:04:05.5"), &options),
            Value::from("2020-01-02T03:04:05.500Z")
        );
        assert_eq!(
            parse_date(&Value::from("Wed, 01 Jan 2020 00:00:00 GMT"), &options),
            Value::from("2020-01-01T00:00:00.000Z")
        );
        assert_eq!(parse_date(&Value::from("nanaha"), &options), Value::Null);
    }

    #[test]
    fn test_parse_layouts_in_order() {
        let options = DateOptions {
            parse: vec!["YYYY/MM/DD".into(), "YYYY-MM".into()],
            format: Some("YYYY-MM-DD".into()),
            ..Default::default()
        };
        assert_eq!(parse_date(&Value::from("2020/03/04"), &options), Value::from("2020-03-04"));
        assert_eq!(parse_date(&Value::from("2020-01"), &options), Value::from("2020-01-01"));
        assert_eq!(parse_date(&Value::from("04.03.2020"), &options), Value::Null);
    }

    #[test]
    fn test_output_formats() {
        let raw = Value::from("2020-01-01T01:01:01Z");
        assert_eq!(
            parse_date(&raw, &with_format("timestamp")),
            Value::Number(1577840461000.0)
        );
        assert!(matches!(parse_date(&raw, &with_format("date")), Value::Date(_)));
        assert!(matches!(parse_date(&raw, &with_format("dayjs")), Value::Date(_)));
        assert_eq!(parse_date(&raw, &with_format("DD/MM/YYYY")), Value::from("01/01/2020"));
    }

    #[test]
    fn test_default_goes_through_formatting() {
        let options = DateOptions {
            default: Some(DateInput::Text("2018".into())),
            format: Some("YYYY/MM/DD".into()),
            ..Default::default()
        };
        assert_eq!(parse_date(&Value::from("garbage"), &options), Value::from("2018/01/01"));
        assert_eq!(parse_date(&Value::Null, &options), Value::from("2018/01/01"));

        let iso_default = DateOptions {
            default: Some(DateInput::Text("2018".into())),
            ..Default::default()
        };
        assert_eq!(
            parse_date(&Value::Null, &iso_default),
            Value::from("2018-01-01T00:00:00.000Z")
        );
    }

    #[test]
    fn test_invalid_default_is_null() {
        let options = DateOptions {
            default: Some(DateInput::Text("Invalid date".into())),
            ..Default::default()
        };
        assert_eq!(parse_date(&Value::from(""), &options), Value::Null);
    }

    #[test]
    fn test_default_matches_parsed_value() {
        let options = DateOptions {
            default: Some(DateInput::Epoch(1577840461000.0)),
            format: Some("YYYY-MM-DD HH:mm".into()),
            ..Default::default()
        };
        assert_eq!(
            parse_date(&Value::Null, &options),
            parse_date(&Value::Number(1577840461000.0), &options)
        );
    }
}
