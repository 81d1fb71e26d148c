//! Numeric Tokens - Snapping and Canonical Formatting
//!
//! Path data and polyline points are opaque strings. Numbers inside them are
//! found with a single token pattern and rewritten in place.

use once_cell::sync::Lazy;
use regex::Regex;

static NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[-+]?(?:[0-9]*\.[0-9]+|[0-9]+)(?:[eE][-+]?[0-9]+)?").unwrap());

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Tolerance, in grid units, for treating a value as a grid multiple.
pub const GRID_EPSILON: f64 = 1e-6;

/// Format a number canonically: shortest round-trip form, no trailing
/// zeros, and negative zero printed as `0`.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    format!("{}", value)
}

/// Round to the nearest multiple of `grid_size`. Halves round toward
/// positive infinity.
pub fn snap(value: f64, grid_size: f64) -> f64 {
    if !(grid_size > 0.0) || !value.is_finite() {
        return value;
    }
    let snapped = (value / grid_size + 0.5).floor() * grid_size;
    if snapped == 0.0 {
        0.0
    } else {
        snapped
    }
}

pub fn is_grid_multiple(value: f64, grid_size: f64) -> bool {
    let scaled = value / grid_size;
    (scaled - scaled.round()).abs() < GRID_EPSILON
}

/// Every number token in `text`, in order. Tokens that overflow parse as
/// infinities and are kept so grid checks can reject them.
pub fn extract_numbers(text: &str) -> Vec<f64> {
    NUMBER_RE
        .find_iter(text)
        .filter_map(|m| m.as_str().parse::<f64>().ok())
        .collect()
}

/// Rewrite every finite number token through `adjust` and format it
/// canonically. Non-finite tokens are copied through untouched.
///
/// A space is inserted when a rewritten token would otherwise fuse with the
/// preceding digits (`1.82-.33` snapped must not become `20`).
pub fn rewrite_numbers(text: &str, adjust: impl Fn(f64) -> f64) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;

    for m in NUMBER_RE.find_iter(text) {
        out.push_str(&text[last..m.start()]);
        last = m.end();

        let token = match m.as_str().parse::<f64>() {
            Ok(value) if value.is_finite() => format_number(adjust(value)),
            _ => m.as_str().to_string(),
        };

        let fuses = out.ends_with(|c: char| c.is_ascii_digit() || c == '.')
            && token.starts_with(|c: char| c.is_ascii_digit() || c == '.');
        if fuses {
            out.push(' ');
        }
        out.push_str(&token);
    }

    out.push_str(&text[last..]);
    out
}

/// Collapse whitespace runs to a single space and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text, " ").trim().to_string()
}

/// Count of command letters in path data.
pub fn count_path_commands(path_data: &str) -> usize {
    path_data.chars().filter(|c| c.is_ascii_alphabetic()).count()
}
