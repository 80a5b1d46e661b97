//! Penalty scoring for coercion work.
//!
//! Every liberty the coercer takes (string-to-int, fuzzy field match, ...)
//! adds a penalty. Scores compose additively during nested coercion and
//! candidates are ranked by total, lower first. The per-flag counts exist
//! for diagnostics; the hot-path comparison only reads the total.

use std::collections::BTreeMap;
use std::fmt;

/// Names one kind of interpretive liberty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Flag {
    FloatToInt,
    StringToInt,
    BoolToInt,
    StringToFloat,
    StringToBool,
    NumberToBool,
    FuzzyFieldMatch,
    EnumCaseInsensitive,
    EnumFuzzyMatch,
}

impl Flag {
    pub fn name(self) -> &'static str {
        match self {
            Flag::FloatToInt => "FloatToInt",
            Flag::StringToInt => "StringToInt",
            Flag::BoolToInt => "BoolToInt",
            Flag::StringToFloat => "StringToFloat",
            Flag::StringToBool => "StringToBool",
            Flag::NumberToBool => "NumberToBool",
            Flag::FuzzyFieldMatch => "FuzzyFieldMatch",
            Flag::EnumCaseInsensitive => "EnumCaseInsensitive",
            Flag::EnumFuzzyMatch => "EnumFuzzyMatch",
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accumulated penalties for one coercion attempt. Lower is better.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Score {
    flags: BTreeMap<Flag, u32>,
    total: u64,
}

impl Score {
    pub fn new() -> Score {
        Score::default()
    }

    /// Add a penalty. Totals only ever grow.
    pub fn add(&mut self, flag: Flag, delta: u32) {
        *self.flags.entry(flag).or_insert(0) += delta;
        self.total += u64::from(delta);
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Accumulated penalty for one flag.
    pub fn count(&self, flag: Flag) -> u32 {
        self.flags.get(&flag).copied().unwrap_or(0)
    }

    /// True when no coercion liberty was taken.
    pub fn is_clean(&self) -> bool {
        self.total == 0
    }

    pub fn flags(&self) -> impl Iterator<Item = (Flag, u32)> + '_ {
        self.flags.iter().map(|(f, c)| (*f, *c))
    }

    /// Diagnostic rendering: per-flag counts plus the total.
    pub fn to_json(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        for (flag, count) in &self.flags {
            map.insert(flag.name().to_owned(), serde_json::json!(count));
        }
        map.insert("total".to_owned(), serde_json::json!(self.total));
        serde_json::Value::Object(map)
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
