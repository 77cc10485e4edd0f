use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HhValue {
    Number(f64),
    String(String),
}

impl HhValue {
    /// Numeric view used by arithmetic. Strings only qualify when their whole
    /// content is a plain decimal literal.
    pub fn as_arith_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::String(value) => parse_decimal_literal(value),
        }
    }

    pub fn to_text(&self) -> String {
        match self {
            Self::Number(value) => format_number(*value),
            Self::String(value) => value.clone(),
        }
    }
}

/// Minimal decimal rendering: no exponent, no trailing `.0`, no `-0`.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    value.to_string()
}

pub fn parse_decimal_literal(text: &str) -> Option<f64> {
    let text = text.trim();
    let digits = text.strip_prefix('-').unwrap_or(text);
    if digits.is_empty() || !digits.chars().any(|ch| ch.is_ascii_digit()) {
        return None;
    }
    let mut seen_dot = false;
    for ch in digits.chars() {
        match ch {
            '0'..='9' => {}
            '.' if !seen_dot => seen_dot = true,
            _ => return None,
        }
    }
    text.parse::<f64>().ok()
}
