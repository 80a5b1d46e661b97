//! Candidate extraction: locating plausible JSON substrings in free text.
//!
//! Probes run from strongest signal to weakest, and the returned order is
//! the search priority downstream:
//!
//! 1. Whole input (after trimming) is already strict JSON -- the only
//!    candidate, nothing else is probed.
//! 2. Interiors of markdown code fences tagged `json` (any case) or
//!    untagged.
//! 3. Balanced `{ ... }` regions, one sweep per opening brace.
//! 4. Balanced `[ ... ]` regions, one sweep per opening bracket.
//!
//! Offsets are UTF-8 byte offsets into the original input. The balanced
//! sweeps are O(n * k) for k open brackets, which is bounded in practice by
//! how much JSON-looking text a model emits.

use thiserror::Error;

/// A substring of the input that might be a JSON value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// The candidate text, exactly as it appears in the input.
    pub text: String,
    /// Byte offset of `text` within the original input.
    pub offset: usize,
}

/// Extraction failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// No probe produced a candidate.
    #[error("no JSON found in input")]
    NoJsonFound,
}

/// Produce candidates in search-priority order.
///
/// Returns `NoJsonFound` when every probe comes up empty.
pub fn extract_candidates(input: &str) -> Result<Vec<Candidate>, ExtractError> {
    // Whole-input probe: a clean document short-circuits everything else,
    // so inputs that are already strict JSON never grow false candidates
    // from their own nested containers.
    let leading = input.len() - input.trim_start_matches(|c: char| c.is_ascii_whitespace()).len();
    let trimmed = input.trim_matches(|c: char| c.is_ascii_whitespace());
    if is_strict_json(trimmed) {
        return Ok(vec![Candidate {
            text: trimmed.to_owned(),
            offset: leading,
        }]);
    }

    let mut candidates = fenced_blocks(input);
    candidates.extend(balanced_regions(input, '{', '}'));
    candidates.extend(balanced_regions(input, '[', ']'));

    if candidates.is_empty() {
        return Err(ExtractError::NoJsonFound);
    }
    Ok(candidates)
}

fn is_strict_json(s: &str) -> bool {
    !s.is_empty() && serde_json::from_str::<serde_json::Value>(s).is_ok()
}

/// Scan for fenced code regions. A line beginning with three backticks
/// opens a region (the rest of the line is its tag) and the next such line
/// closes it. Interiors become candidates when the opening tag is empty or
/// `json` in any case; other tags still delimit a region but contribute
/// nothing.
fn fenced_blocks(input: &str) -> Vec<Candidate> {
    let mut candidates = Vec::new();
    // (interior start, opening tag qualifies)
    let mut open: Option<(usize, bool)> = None;
    let mut line_start = 0usize;

    for line in input.split_inclusive('\n') {
        let line_end = line_start + line.len();
        let content = line.strip_suffix('\n').unwrap_or(line);
        let content = content.strip_suffix('\r').unwrap_or(content);

        if let Some(rest) = content.strip_prefix("```") {
            match open.take() {
                None => {
                    let tag = rest.trim();
                    let qualifies = tag.is_empty() || tag.eq_ignore_ascii_case("json");
                    open = Some((line_end, qualifies));
                }
                Some((start, qualifies)) => {
                    if qualifies && start <= line_start {
                        let interior = &input[start..line_start];
                        let lead = interior.len()
                            - interior
                                .trim_start_matches(|c: char| c.is_ascii_whitespace())
                                .len();
                        let text = interior.trim_matches(|c: char| c.is_ascii_whitespace());
                        if !text.is_empty() {
                            candidates.push(Candidate {
                                text: text.to_owned(),
                                offset: start + lead,
                            });
                        }
                    }
                }
            }
        }
        line_start = line_end;
    }

    candidates
}

/// Sweep for balanced bracket regions. Every occurrence of `open` starts
/// its own scan, so nested containers surface as candidates at their own
/// offsets. The scan honors a two-state string scanner: brackets inside
/// `"`-delimited strings do not count, and `\` consumes the following
/// character. Regions whose depth never returns to zero are ignored.
fn balanced_regions(input: &str, open: char, close: char) -> Vec<Candidate> {
    let chars: Vec<(usize, char)> = input.char_indices().collect();
    let mut candidates = Vec::new();

    for i in 0..chars.len() {
        if chars[i].1 != open {
            continue;
        }
        let mut depth = 1usize;
        let mut in_string = false;
        let mut escaped = false;
        let mut j = i + 1;

        while j < chars.len() && depth > 0 {
            let c = chars[j].1;
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = !in_string;
            } else if !in_string {
                if c == open {
                    depth += 1;
                } else if c == close {
                    depth -= 1;
                    if depth == 0 {
                        let start = chars[i].0;
                        let end = chars[j].0 + c.len_utf8();
                        candidates.push(Candidate {
                            text: input[start..end].to_owned(),
                            offset: start,
                        });
                    }
                }
            }
            j += 1;
        }
    }

    candidates
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
