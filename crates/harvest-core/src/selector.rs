//! Selector string grammar: `<query>[@<attribute>][| transform]*`.

use regex::Regex;
use std::sync::LazyLock;

static LEADING_SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([^@]*)(?:@\s*([\w\-:]+))?$").unwrap()
});

/// A selector string broken into its parts.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedSelector {
    /// Query handed to the document adapter. `None` when the string has no
    /// leading segment or the segment is malformed.
    pub selector: Option<String>,
    pub attribute: Option<String>,
    /// Raw transform specs in written order.
    pub transforms: Vec<String>,
}

impl ParsedSelector {
    /// The query, if present and non-empty.
    pub fn query(&self) -> Option<&str> {
        self.selector.as_deref().filter(|s| !s.is_empty())
    }
}

pub fn parse_selector_string(raw: &str) -> ParsedSelector {
    let mut segments = split_pipes(raw).into_iter();
    let leading = segments.next().unwrap_or_default();
    let transforms = segments.collect();

    if leading.is_empty() {
        return ParsedSelector {
            transforms,
            ..Default::default()
        };
    }

    match LEADING_SEGMENT.captures(&leading) {
        Some(caps) => ParsedSelector {
            selector: caps.get(1).map(|m| m.as_str().trim().to_string()),
            attribute: caps.get(2).map(|m| m.as_str().to_string()),
            transforms,
        },
        None => ParsedSelector {
            transforms,
            ..Default::default()
        },
    }
}

/// Splits on `|` not followed by `=`, dropping whitespace around each split.
fn split_pipes(raw: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '|' && chars.peek() != Some(&'=') {
            segments.push(current.trim_end().to_string());
            current.clear();
            while chars.peek().is_some_and(|c| c.is_whitespace()) {
                chars.next();
            }
        } else {
            current.push(c);
        }
    }
    segments.push(current);
    segments
}
