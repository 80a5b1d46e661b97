//! Forgiving numeric literal parsing.
//!
//! Model output writes numbers the way people do: `$1,200`, `3/4`, ` 42 `.
//! [`parse_number`] strips currency dressing, resolves simple fractions, and
//! falls back to the standard float parser.

use thiserror::Error;

/// A string could not be read as a number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid numeric literal '{raw}'")]
pub struct NumberError {
    /// The rejected input, trimmed but otherwise as received.
    pub raw: String,
}

/// Parse a human-ish numeric literal into an `f64`.
///
/// `$` and `,` are stripped wherever they appear. A literal containing
/// exactly one `/` is treated as a fraction when both halves parse as floats
/// and the denominator is nonzero. Everything else goes through `f64`'s
/// standard parser.
pub fn parse_number(raw: &str) -> Result<f64, NumberError> {
    let trimmed = raw.trim();
    let stripped = trimmed.replace(['$', ','], "");

    if let Some((numerator, denominator)) = split_fraction(&stripped) {
        return Ok(numerator / denominator);
    }

    stripped.parse::<f64>().map_err(|_| NumberError {
        raw: trimmed.to_owned(),
    })
}

/// Split `a/b` into parsed halves. Returns `None` unless the input contains
/// exactly one `/`, both halves parse, and the denominator is nonzero.
fn split_fraction(s: &str) -> Option<(f64, f64)> {
    let mut halves = s.split('/');
    let numerator = halves.next()?;
    let denominator = halves.next()?;
    if halves.next().is_some() {
        return None;
    }
    let numerator: f64 = numerator.trim().parse().ok()?;
    let denominator: f64 = denominator.trim().parse().ok()?;
    if denominator == 0.0 {
        return None;
    }
    Some((numerator, denominator))
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
