//! salvage-coerce: schema-directed coercion and the salvage parse pipeline.
//!
//! This crate is the semantic side of salvage. Given loose text and a
//! [`Shape`] describing the layout the caller wants back, [`parse`] runs
//! the full pipeline:
//!
//! 1. extract candidate JSON substrings (`salvage-core`)
//! 2. strict-parse each candidate, repairing first when strict parsing
//!    fails and repair is allowed
//! 3. coerce the parsed value against the shape, accumulating a penalty
//!    [`Score`]
//! 4. keep the best-scoring result across all candidates
//!
//! The pipeline is synchronous and per-call, with no shared state and no
//! I/O. Identical inputs produce identical outputs and scores.

pub mod coerce;
pub mod error;
mod fold;
pub mod score;
pub mod shape;
pub mod value;

pub use salvage_core::{extract_candidates, parse_number, repair_json};
pub use salvage_core::{Candidate, ExtractError, NumberError};

pub use coerce::{coerce, Coerced, Coercer};
pub use error::{CandidateError, CoerceError, ParseError};
pub use score::{Flag, Score};
pub use shape::{Field, FloatWidth, IntWidth, Primitive, Shape};
pub use value::Value;

use serde::{Deserialize, Serialize};

/// Per-call parsing options.
///
/// `allow_incomplete_json` and `track_completion_state` are reserved: they
/// are accepted for forward compatibility with a streaming mode but have no
/// behavioral effect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Skip repair: candidates that fail strict parsing are dropped.
    pub strict: bool,
    /// Reserved.
    pub allow_incomplete_json: bool,
    /// Reserved.
    pub track_completion_state: bool,
}

/// Parse `input` against `shape` with default options.
///
/// Returns the best-scoring coerced value together with its score. A clean
/// strict-JSON input that fits the shape always scores zero.
pub fn parse(input: &str, shape: &Shape) -> Result<(Coerced, Score), ParseError> {
    parse_with_options(input, shape, &ParseOptions::default())
}

/// Parse `input` against `shape`.
///
/// Candidates are tried in extraction order. For each: strict parse, then
/// (unless `options.strict`) repair and strict-parse the repaired text,
/// then coerce. The candidate with the strictly lowest score total wins;
/// ties keep the earlier candidate. When every candidate fails, the most
/// recent failure is surfaced.
pub fn parse_with_options(
    input: &str,
    shape: &Shape,
    options: &ParseOptions,
) -> Result<(Coerced, Score), ParseError> {
    let candidates = extract_candidates(input)?;
    tracing::debug!(count = candidates.len(), "extracted candidates");

    let mut best: Option<(Coerced, Score)> = None;
    let mut last_failure: Option<CandidateError> = None;

    for (index, candidate) in candidates.iter().enumerate() {
        let parsed = match serde_json::from_str::<serde_json::Value>(&candidate.text) {
            Ok(v) => v,
            Err(strict_err) => {
                if options.strict {
                    tracing::trace!(index, error = %strict_err, "strict mode: dropping candidate");
                    last_failure = Some(CandidateError::Syntax(strict_err));
                    continue;
                }
                let repaired = repair_json(&candidate.text);
                match serde_json::from_str::<serde_json::Value>(&repaired) {
                    Ok(v) => v,
                    Err(repair_err) => {
                        tracing::trace!(index, error = %repair_err, "candidate unparseable after repair");
                        last_failure = Some(CandidateError::Syntax(repair_err));
                        continue;
                    }
                }
            }
        };

        let value = Value::from(parsed);
        let mut score = Score::new();
        let coerced = match coerce::coerce(&value, shape, &mut score) {
            Ok(c) => c,
            Err(e) => {
                tracing::trace!(index, error = %e, "candidate does not coerce");
                last_failure = Some(CandidateError::Coerce(e));
                continue;
            }
        };

        let adopt = match &best {
            None => true,
            Some((_, best_score)) => score.total() < best_score.total(),
        };
        if adopt {
            tracing::debug!(index, total = score.total(), "adopted candidate");
            best = Some((coerced, score));
        }
    }

    match best {
        Some(found) => Ok(found),
        None => Err(match last_failure {
            Some(last) => ParseError::AllCandidatesFailed { last },
            None => ParseError::NoJsonFound,
        }),
    }
}

/// An options-holding handle for repeated parses.
///
/// `Parser` values are cheap and carry no state beyond their options, so
/// calls are reentrant and safe to run from any number of threads over
/// distinct inputs.
#[derive(Debug, Clone, Copy, Default)]
pub struct Parser {
    options: ParseOptions,
}

impl Parser {
    pub fn new() -> Parser {
        Parser::default()
    }

    pub fn with_options(options: ParseOptions) -> Parser {
        Parser { options }
    }

    /// Toggle strict mode: no repair, strictly parseable candidates only.
    pub fn strict(mut self, strict: bool) -> Parser {
        self.options.strict = strict;
        self
    }

    /// Reserved streaming toggle; accepted but without effect.
    pub fn allow_incomplete_json(mut self, allow: bool) -> Parser {
        self.options.allow_incomplete_json = allow;
        self
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    pub fn parse(&self, input: &str, shape: &Shape) -> Result<(Coerced, Score), ParseError> {
        parse_with_options(input, shape, &self.options)
    }
}

/// Thin adapter for byte-oriented callers: decode `data` (lossy UTF-8),
/// parse against `shape`, and write the coerced value into `out`.
///
/// Returns the score of the adopted candidate.
pub fn unmarshal(data: &[u8], shape: &Shape, out: &mut Coerced) -> Result<Score, ParseError> {
    let text = String::from_utf8_lossy(data);
    let (coerced, score) = parse(&text, shape)?;
    *out = coerced;
    Ok(score)
}

// ──────────────────────────────────────────────
// Integration tests
// ──────────────────────────────────────────────
