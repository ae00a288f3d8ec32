//! Type coercion: raw extracted values to typed results.
//!
//! Every coercer is a pure function of the raw value and its options. A raw
//! value the coercer cannot handle yields the configured default.

pub mod boolean;
pub mod date;
pub mod date_format;
pub mod number;
pub mod numeral;
pub mod string;

pub use boolean::{BooleanOptions, parse_boolean};
pub use date::{DateInput, DateOptions, parse_date};
pub use number::{NumberOptions, RoundMode, parse_number};
pub use string::{StringOptions, parse_string};

use serde::{Deserialize, Deserializer};

/// Accepts either a single string or a list of strings.
pub(crate) fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
        None(()),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(value) => vec![value],
        OneOrMany::Many(values) => values,
        OneOrMany::None(()) => Vec::new(),
    })
}
