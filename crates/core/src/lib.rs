//! salvage-core: locating and repairing JSON embedded in loose text.
//!
//! Model output rarely arrives as a clean JSON document. It comes wrapped in
//! prose, inside markdown fences, with unquoted keys, single quotes, trailing
//! commas, or comments. This crate is the syntax side of the salvage
//! pipeline:
//!
//! - [`extract_candidates`] -- find every plausible JSON substring in a text
//!   blob, ordered from strongest signal to weakest
//! - [`repair_json`] -- rewrite a malformed JSON-ish string into strict JSON
//! - [`parse_number`] -- read numeric literals the way people write them
//!   (currency symbols, thousands separators, simple fractions)
//!
//! The semantic side (shape-directed coercion, scoring, orchestration) lives
//! in the `salvage-coerce` crate.

pub mod extract;
pub mod number;
pub mod repair;

pub use extract::{extract_candidates, Candidate, ExtractError};
pub use number::{parse_number, NumberError};
pub use repair::repair_json;
