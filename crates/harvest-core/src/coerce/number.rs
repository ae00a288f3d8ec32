use super::numeral;
use harvest_common::Value;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundMode {
    #[default]
    Round,
    Floor,
    Ceil,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NumberOptions {
    pub default: Option<f64>,
    pub int: bool,
    pub round_mode: RoundMode,
    /// Render the result with a numeral pattern. `"number"` keeps the number.
    pub format: Option<String>,
}

pub fn parse_number(raw: &Value, options: &NumberOptions) -> Value {
    let parsed = match raw {
        Value::Number(n) if !n.is_nan() => Some(*n),
        Value::String(s) => numeral::unformat(s),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };
    let Some(mut number) = parsed else {
        return Value::from(options.default);
    };

    if options.int && number != 0.0 {
        number = match options.round_mode {
            RoundMode::Round => round_half_up(number),
            RoundMode::Floor => number.floor(),
            RoundMode::Ceil => number.ceil(),
        };
    }

    match options.format.as_deref() {
        None | Some("number") => Value::Number(number),
        Some(pattern) => Value::String(numeral::format(number, pattern)),
    }
}

/// Halves round towards positive infinity.
fn round_half_up(n: f64) -> f64 {
    let floor = n.floor();
    if n - floor >= 0.5 { floor + 1.0 } else { floor }
}
