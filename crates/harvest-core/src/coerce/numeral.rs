//! Human formatted number parsing and rendering.
//!
//! Understands thousands separators, currency symbols, percentages, byte
//! units, `k/m/b/t` abbreviations, ordinals and `h:mm:ss` durations.

use regex::Regex;
use std::sync::LazyLock;

static DURATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+):(\d+)(?::(\d+(?:\.\d+)?))?$").unwrap());

const DECIMAL_BYTES: [&str; 9] = ["B", "KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];
const BINARY_BYTES: [&str; 9] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB", "EiB", "ZiB", "YiB"];
const ABBREVIATIONS: [(char, i32); 4] = [('k', 3), ('m', 6), ('b', 9), ('t', 12)];
const CURRENCY: [char; 4] = ['$', '€', '£', '¥'];

enum Scale {
    /// Multiply by a power of ten, applied to the decimal text so the result
    /// stays correctly rounded.
    Pow10(i32),
    Binary(i32),
}

/// Parses a formatted number. `None` when the text carries no number.
pub fn unformat(input: &str) -> Option<f64> {
    let text = input
        .trim()
        .trim_matches(|c| c == '\'' || c == '"')
        .trim();
    if text.is_empty() {
        return None;
    }

    if let Some(caps) = DURATION.captures(text) {
        let part = |i: usize| {
            caps.get(i)
                .and_then(|m| m.as_str().parse::<f64>().ok())
                .unwrap_or(0.0)
        };
        return Some(match caps.get(3) {
            Some(_) => part(1) * 3600.0 + part(2) * 60.0 + part(3),
            None => part(1) * 60.0 + part(2),
        });
    }

    let negative =
        text.matches('-').count() % 2 == 1 || (text.starts_with('(') && text.ends_with(')'));

    let mut body: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '+' | '(' | ')' | ','))
        .filter(|c| !CURRENCY.contains(c))
        .collect();

    let mut scale = Scale::Pow10(0);
    if let Some(rest) = body.strip_suffix('%') {
        scale = Scale::Pow10(-2);
        body = rest.to_string();
    } else if let Some((rest, power)) = strip_unit(&body, &BINARY_BYTES[1..]) {
        scale = Scale::Binary(power + 1);
        body = rest;
    } else if let Some((rest, power)) = strip_unit(&body, &DECIMAL_BYTES[1..]) {
        scale = Scale::Pow10((power + 1) * 3);
        body = rest;
    } else if let Some(rest) = body.strip_suffix('B') {
        body = rest.to_string();
    } else if let Some(rest) = strip_ordinal(&body) {
        body = rest;
    } else if let Some((rest, exp)) = strip_abbreviation(&body) {
        scale = Scale::Pow10(exp);
        body = rest;
    }

    if !body.chars().any(|c| c.is_ascii_digit())
        || !body.chars().all(|c| c.is_ascii_digit() || c == '.')
    {
        return None;
    }

    let magnitude = match scale {
        Scale::Pow10(exp) => format!("{}e{}", body, exp).parse::<f64>().ok()?,
        Scale::Binary(power) => body.parse::<f64>().ok()? * 1024f64.powi(power),
    };
    Some(if negative { -magnitude } else { magnitude })
}

fn strip_unit(body: &str, units: &[&str]) -> Option<(String, i32)> {
    units.iter().enumerate().find_map(|(i, unit)| {
        body.strip_suffix(unit)
            .map(|rest| (rest.to_string(), i as i32))
    })
}

fn strip_abbreviation(body: &str) -> Option<(String, i32)> {
    ABBREVIATIONS.iter().find_map(|(suffix, exp)| {
        body.strip_suffix(*suffix)
            .map(|rest| (rest.to_string(), *exp))
    })
}

fn strip_ordinal(body: &str) -> Option<String> {
    ["st", "nd", "rd", "th"].iter().find_map(|suffix| {
        body.strip_suffix(suffix)
            .filter(|rest| rest.ends_with(|c: char| c.is_ascii_digit()))
            .map(str::to_string)
    })
}

/// Where a removed marker sat in the pattern.
struct Marker {
    index: usize,
    spaced: bool,
}

fn take_marker(pattern: &mut String, marker: &str) -> Option<Marker> {
    let index = pattern.find(marker)?;
    let before = pattern[..index].ends_with(' ');
    let after = pattern[index + marker.len()..].starts_with(' ');
    let start = if before { index - 1 } else { index };
    let end = index + marker.len() + usize::from(after);
    pattern.replace_range(start..end, "");
    Some(Marker {
        index: start,
        spaced: before || after,
    })
}

/// Renders `value` following a numeral-style `pattern` such as `0,0.00`,
/// `$0,0`, `0%`, `0.0b`, `0ib`, `0.0a`, `0o`, `+0`, `(0)` or `00:00:00`.
pub fn format(value: f64, pattern: &str) -> String {
    if pattern.contains(':') {
        return format_duration(value);
    }

    let mut pattern = pattern.to_string();
    let parens = pattern.contains('(');
    let plus = pattern.contains('+');
    pattern.retain(|c| !matches!(c, '(' | ')' | '+'));

    let currency = take_marker(&mut pattern, "$").map(|marker| {
        let first_digit = pattern.find(['0', '#']).unwrap_or(pattern.len());
        (marker.index <= first_digit, marker.spaced)
    });

    let mut magnitude = value.abs();
    let mut unit = String::new();
    let mut unit_spaced = false;

    if let Some(marker) = take_marker(&mut pattern, "%") {
        magnitude *= 100.0;
        unit.push('%');
        unit_spaced = marker.spaced;
    } else if let Some(marker) = take_marker(&mut pattern, "ib") {
        let (scaled, index) = scale_down(magnitude, 1024.0);
        magnitude = scaled;
        unit.push_str(BINARY_BYTES[index]);
        unit_spaced = marker.spaced;
    } else if let Some(marker) = take_marker(&mut pattern, "b") {
        let (scaled, index) = scale_down(magnitude, 1000.0);
        magnitude = scaled;
        unit.push_str(DECIMAL_BYTES[index]);
        unit_spaced = marker.spaced;
    } else if let Some(marker) = take_marker(&mut pattern, "a") {
        if let Some((suffix, exp)) = ABBREVIATIONS
            .iter()
            .rev()
            .find(|(_, exp)| magnitude >= 10f64.powi(*exp))
        {
            magnitude /= 10f64.powi(*exp);
            unit.push(*suffix);
        }
        unit_spaced = marker.spaced;
    } else if let Some(marker) = take_marker(&mut pattern, "o") {
        unit.push_str(ordinal_suffix(magnitude.round()));
        unit_spaced = marker.spaced;
    }

    let number = format_plain(magnitude, &pattern);
    let unit = if unit_spaced && !unit.is_empty() {
        format!(" {}", unit)
    } else {
        unit
    };

    let body = match currency {
        Some((true, spaced)) => format!("${}{}{}", if spaced { " " } else { "" }, number, unit),
        Some((false, spaced)) => format!("{}{}{}$", number, unit, if spaced { " " } else { "" }),
        None => format!("{}{}", number, unit),
    };

    let is_zero = !number.chars().any(|c| matches!(c, '1'..='9'));
    if value < 0.0 && !is_zero {
        if parens {
            format!("({})", body)
        } else {
            format!("-{}", body)
        }
    } else if plus && value > 0.0 {
        format!("+{}", body)
    } else {
        body
    }
}

fn scale_down(mut magnitude: f64, base: f64) -> (f64, usize) {
    let mut index = 0;
    while magnitude >= base && index < DECIMAL_BYTES.len() - 1 {
        magnitude /= base;
        index += 1;
    }
    (magnitude, index)
}

fn ordinal_suffix(n: f64) -> &'static str {
    let n = n as u64;
    if (11..=13).contains(&(n % 100)) {
        return "th";
    }
    match n % 10 {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    }
}

/// Digits-only pattern: `0`, `0,0`, `0.00`, `0.0[00]`, `0[.]00`.
fn format_plain(magnitude: f64, pattern: &str) -> String {
    let thousands = pattern.contains(',');
    let (min_decimals, max_decimals) = decimal_places(pattern);

    let fixed = format!("{:.*}", max_decimals, magnitude);
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((int_part, frac_part)) => (int_part.to_string(), frac_part.to_string()),
        None => (fixed.clone(), String::new()),
    };

    let mut frac = frac_part;
    while frac.len() > min_decimals && frac.ends_with('0') {
        frac.pop();
    }

    let int_part = if thousands {
        group_thousands(&int_part)
    } else {
        int_part
    };

    if frac.is_empty() {
        int_part
    } else {
        format!("{}.{}", int_part, frac)
    }
}

fn decimal_places(pattern: &str) -> (usize, usize) {
    let Some(dot) = pattern.find('.') else {
        return (0, 0);
    };
    let optional_point = pattern[..dot].ends_with('[');
    let after = &pattern[dot + 1..];
    let (fixed, optional) = match after.find('[') {
        Some(open) => (&after[..open], &after[open..]),
        None => (after, ""),
    };
    let fixed = fixed.chars().filter(|c| *c == '0').count();
    let optional = optional.chars().filter(|c| *c == '0').count();
    if optional_point {
        (0, fixed + optional)
    } else {
        (fixed, fixed + optional)
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn format_duration(seconds: f64) -> String {
    let total = seconds.abs();
    let hours = (total / 3600.0).floor();
    let minutes = ((total - hours * 3600.0) / 60.0).floor();
    let secs = (total - hours * 3600.0 - minutes * 60.0).round();
    let sign = if seconds < 0.0 { "-" } else { "" };
    format!("{}{}:{:02}:{:02}", sign, hours, minutes as u64, secs as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unformat_plain_and_grouped() {
        assert_eq!(unformat("10,000.12"), Some(10000.12));
        assert_eq!(unformat("  42 "), Some(42.0));
        assert_eq!(unformat("$1,000"), Some(1000.0));
        assert_eq!(unformat("(50)"), Some(-50.0));
    }

    #[test]
    fn test_unformat_units() {
        assert_eq!(unformat("3.467TB"), Some(3_467_000_000_000.0));
        assert_eq!(unformat("2KiB"), Some(2048.0));
        assert_eq!(unformat("12B"), Some(12.0));
        assert_eq!(unformat("1.2k"), Some(1200.0));
        assert_eq!(unformat("3m"), Some(3_000_000.0));
        assert_eq!(unformat("1st"), Some(1.0));
    }

    #[test]
    fn test_unformat_percent_and_duration() {
        assert_eq!(unformat("'-76%"), Some(-0.76));
        assert_eq!(unformat("2:23:57"), Some(8637.0));
        assert_eq!(unformat("3:30"), Some(210.0));
    }

    #[test]
    fn test_unformat_rejects_non_numbers() {
        assert_eq!(unformat(""), None);
        assert_eq!(unformat("not a number"), None);
        assert_eq!(unformat("1.2.3"), None);
        assert_eq!(unformat("-"), None);
    }

    #[test]
    fn test_format_currency_and_grouping() {
        assert_eq!(format(1000.234, "$0,0.00"), "$1,000.23");
        assert_eq!(format(1234567.0, "0,0"), "1,234,567");
        assert_eq!(format(-1000.0, "(0,0)"), "(1,000)");
        assert_eq!(format(-5.5, "0.0"), "-5.5");
        assert_eq!(format(5.0, "+0"), "+5");
        assert_eq!(format(12.0, "0 $"), "12 $");
    }

    #[test]
    fn test_format_units() {
        assert_eq!(format(100.1, "0.0b"), "100.1B");
        assert_eq!(format(100.0, "0.0b"), "100.0B");
        assert_eq!(format(2048.0, "0ib"), "2KiB");
        assert_eq!(format(3_467_000_000_000.0, "0.000 b"), "3.467 TB");
        assert_eq!(format(0.1, "0%"), "10%");
        assert_eq!(format(1234.0, "0.0a"), "1.2k");
    }

    #[test]
    fn test_format_optional_decimals_and_ordinals() {
        assert_eq!(format(1.5, "0.00[00]"), "1.50");
        assert_eq!(format(1.23456, "0.00[00]"), "1.2346");
        assert_eq!(format(3.0, "0[.]00"), "3");
        assert_eq!(format(22.0, "0o"), "22nd");
        assert_eq!(format(13.0, "0o"), "13th");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format(8637.0, "00:00:00"), "2:23:57");
    }

    #[test]
    fn test_display_round_trip() {
        let first = unformat("1000.10").unwrap();
        let again = unformat(&harvest_common::value::format_number(first)).unwrap();
        assert_eq!(first, again);
    }
}
