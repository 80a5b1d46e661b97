//! Shape-directed coercion of generic values.
//!
//! The coercer is a mutual recursion over [`Value`] and [`Shape`]. It
//! either produces a [`Coerced`] carrier matching the shape or a typed
//! error; it never panics on well-formed inputs. Every liberty taken along
//! the way is charged to the caller's [`Score`].
//!
//! Numeric conversions truncate toward zero; conversion into a declared
//! integer width wraps per two's complement.

use crate::error::CoerceError;
use crate::fold;
use crate::score::{Flag, Score};
use crate::shape::{Field, FloatWidth, IntWidth, Primitive, Shape};
use crate::value::Value;
use salvage_core::parse_number;

/// A value conforming to some [`Shape`].
///
/// Integer variants hold the value after narrowing to the declared width,
/// widened back into the carrier. `None` is the no-value state of an
/// optional shape; a present optional materializes as the inner variant
/// directly.
#[derive(Debug, Clone, PartialEq)]
pub enum Coerced {
    None,
    Any(Value),
    Str(String),
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
    Seq(Vec<Coerced>),
    Map(Vec<(String, Coerced)>),
    Record(Vec<(String, Coerced)>),
    Enum(String),
}

impl Coerced {
    /// The zero value of a shape: what record slots hold before (or
    /// instead of) a successful field coercion, and what pads a
    /// fixed-length sequence.
    pub fn zero_of(shape: &Shape) -> Coerced {
        match shape {
            Shape::Any => Coerced::Any(Value::Null),
            Shape::Primitive(Primitive::String) => Coerced::Str(String::new()),
            Shape::Primitive(Primitive::Int(_)) => Coerced::Int(0),
            Shape::Primitive(Primitive::Uint(_)) => Coerced::Uint(0),
            Shape::Primitive(Primitive::Float(_)) => Coerced::Float(0.0),
            Shape::Primitive(Primitive::Bool) => Coerced::Bool(false),
            Shape::Optional(_) => Coerced::None,
            Shape::Sequence { element, len } => {
                let n = len.unwrap_or(0);
                Coerced::Seq((0..n).map(|_| Coerced::zero_of(element)).collect())
            }
            Shape::Mapping { .. } => Coerced::Map(Vec::new()),
            Shape::Record(fields) => Coerced::Record(
                fields
                    .iter()
                    .map(|f| (f.name.clone(), Coerced::zero_of(&f.shape)))
                    .collect(),
            ),
            Shape::Enum(_) => Coerced::Enum(String::new()),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Coerced::None)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Coerced::Str(s) | Coerced::Enum(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Coerced::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Coerced::Uint(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Coerced::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Coerced::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&[Coerced]> {
        match self {
            Coerced::Seq(items) => Some(items),
            _ => None,
        }
    }

    /// Look up a record field by name.
    pub fn field(&self, name: &str) -> Option<&Coerced> {
        match self {
            Coerced::Record(fields) | Coerced::Map(fields) => fields
                .iter()
                .find_map(|(k, v)| (k == name).then_some(v)),
            _ => None,
        }
    }

    /// Diagnostic rendering as JSON.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Coerced::None => serde_json::Value::Null,
            Coerced::Any(v) => v.to_json(),
            Coerced::Str(s) | Coerced::Enum(s) => serde_json::Value::String(s.clone()),
            Coerced::Int(v) => serde_json::json!(v),
            Coerced::Uint(v) => serde_json::json!(v),
            Coerced::Float(v) => serde_json::Number::from_f64(*v)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Coerced::Bool(b) => serde_json::Value::Bool(*b),
            Coerced::Seq(items) => {
                serde_json::Value::Array(items.iter().map(Coerced::to_json).collect())
            }
            Coerced::Map(entries) | Coerced::Record(entries) => {
                let mut map = serde_json::Map::new();
                for (k, v) in entries {
                    map.insert(k.clone(), v.to_json());
                }
                serde_json::Value::Object(map)
            }
        }
    }
}

/// Coerce `value` under `shape`, charging penalties to `score`.
pub fn coerce(value: &Value, shape: &Shape, score: &mut Score) -> Result<Coerced, CoerceError> {
    Coercer::new().coerce(value, shape, score)
}

/// Reusable coercion driver.
///
/// Holds only the path of shape nodes currently being visited, used to
/// break self-referential shape descriptions: a node seen again on the same
/// path coerces as `Any` instead of recursing.
#[derive(Debug, Default)]
pub struct Coercer {
    path: Vec<*const Shape>,
}

impl Coercer {
    pub fn new() -> Coercer {
        Coercer::default()
    }

    pub fn coerce(
        &mut self,
        value: &Value,
        shape: &Shape,
        score: &mut Score,
    ) -> Result<Coerced, CoerceError> {
        let marker: *const Shape = shape;
        if self.path.contains(&marker) {
            return Ok(Coerced::Any(value.clone()));
        }
        self.path.push(marker);
        let result = self.dispatch(value, shape, score);
        self.path.pop();
        result
    }

    fn dispatch(
        &mut self,
        value: &Value,
        shape: &Shape,
        score: &mut Score,
    ) -> Result<Coerced, CoerceError> {
        match shape {
            Shape::Any => Ok(Coerced::Any(value.clone())),

            Shape::Optional(inner) => {
                if matches!(value, Value::Null) {
                    return Ok(Coerced::None);
                }
                self.coerce(value, inner, score)
            }

            Shape::Primitive(Primitive::String) => Ok(Coerced::Str(match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => format_number(*n),
                Value::Bool(b) => bool_text(*b),
                other => other.to_string(),
            })),

            Shape::Primitive(Primitive::Int(width)) => {
                let raw = int_from(value, shape, score)?;
                Ok(Coerced::Int(wrap_int(raw, *width)))
            }

            Shape::Primitive(Primitive::Uint(width)) => {
                let raw = int_from(value, shape, score)?;
                Ok(Coerced::Uint(wrap_uint(raw as u64, *width)))
            }

            Shape::Primitive(Primitive::Float(width)) => {
                let raw = match value {
                    Value::Number(n) => *n,
                    Value::String(s) => {
                        let parsed = parse_number(s)?;
                        score.add(Flag::StringToFloat, 2);
                        parsed
                    }
                    other => return Err(mismatch(other, shape)),
                };
                let narrowed = match width {
                    FloatWidth::W32 => f64::from(raw as f32),
                    FloatWidth::W64 => raw,
                };
                Ok(Coerced::Float(narrowed))
            }

            Shape::Primitive(Primitive::Bool) => match value {
                Value::Bool(b) => Ok(Coerced::Bool(*b)),
                Value::String(s) => match s.trim().to_lowercase().as_str() {
                    "true" | "yes" | "1" | "on" => {
                        score.add(Flag::StringToBool, 1);
                        Ok(Coerced::Bool(true))
                    }
                    "false" | "no" | "0" | "off" => {
                        score.add(Flag::StringToBool, 1);
                        Ok(Coerced::Bool(false))
                    }
                    _ => Err(mismatch(value, shape)),
                },
                Value::Number(n) => {
                    score.add(Flag::NumberToBool, 1);
                    Ok(Coerced::Bool(*n != 0.0))
                }
                other => Err(mismatch(other, shape)),
            },

            Shape::Sequence { element, len } => {
                let singleton;
                let items: &[Value] = match value {
                    Value::Array(a) => a,
                    other => {
                        // Anything that isn't an array coerces as a
                        // one-element sequence of itself.
                        singleton = [other.clone()];
                        &singleton
                    }
                };
                let take = len.map_or(items.len(), |n| n.min(items.len()));
                let mut out = Vec::with_capacity(len.unwrap_or(take));
                for item in &items[..take] {
                    out.push(self.coerce(item, element, score)?);
                }
                if let Some(n) = *len {
                    while out.len() < n {
                        out.push(Coerced::zero_of(element));
                    }
                }
                Ok(Coerced::Seq(out))
            }

            Shape::Mapping {
                key: key_shape,
                value: value_shape,
            } => {
                let Value::Object(entries) = value else {
                    return Err(mismatch(value, shape));
                };
                if !matches!(
                    key_shape.as_ref(),
                    Shape::Primitive(Primitive::String) | Shape::Enum(_)
                ) {
                    return Err(CoerceError::UnsupportedShape {
                        what: format!("mapping key shape {}", key_shape),
                    });
                }
                let mut out = Vec::with_capacity(entries.len());
                for (k, v) in entries {
                    let key_value = Value::String(k.clone());
                    let key = match self.coerce(&key_value, key_shape, score)? {
                        Coerced::Str(s) | Coerced::Enum(s) => s,
                        _ => {
                            return Err(CoerceError::UnsupportedShape {
                                what: format!("mapping key shape {}", key_shape),
                            })
                        }
                    };
                    out.push((key, self.coerce(v, value_shape, score)?));
                }
                Ok(Coerced::Map(out))
            }

            Shape::Record(fields) => {
                let Value::Object(entries) = value else {
                    return Err(mismatch(value, shape));
                };
                let mut consumed = vec![false; entries.len()];
                let mut out: Vec<(String, Coerced)> = fields
                    .iter()
                    .map(|f| (f.name.clone(), Coerced::zero_of(&f.shape)))
                    .collect();
                for (slot, field) in fields.iter().enumerate() {
                    let Some(idx) = resolve_field(field, entries, &mut consumed, score) else {
                        continue;
                    };
                    // A field that fails to coerce keeps its zero value.
                    if let Ok(coerced) = self.coerce(&entries[idx].1, &field.shape, score) {
                        out[slot].1 = coerced;
                    }
                }
                Ok(Coerced::Record(out))
            }

            Shape::Enum(labels) => {
                let raw = enum_query(value, shape)?;
                if labels.iter().any(|l| *l == raw) {
                    return Ok(Coerced::Enum(raw));
                }
                let lower = raw.to_lowercase();
                if let Some(label) = labels.iter().find(|l| l.to_lowercase() == lower) {
                    score.add(Flag::EnumCaseInsensitive, 1);
                    return Ok(Coerced::Enum(label.clone()));
                }
                if let Some(label) = fold::closest_label(&raw, labels) {
                    score.add(Flag::EnumFuzzyMatch, 2);
                    return Ok(Coerced::Enum(label.to_owned()));
                }
                // No match: hand the raw string through; a stricter caller
                // can still reject it.
                Ok(Coerced::Enum(raw))
            }
        }
    }
}

/// Resolve which object entry feeds a record field: the declared name, then
/// each alias in priority order, then a case-insensitive pass over the
/// same names. Only entries not consumed by an earlier field are
/// considered; the winning entry is marked consumed.
fn resolve_field(
    field: &Field,
    entries: &[(String, Value)],
    consumed: &mut [bool],
    score: &mut Score,
) -> Option<usize> {
    for name in field_names(field) {
        if let Some(idx) = (0..entries.len()).find(|&i| !consumed[i] && entries[i].0 == name) {
            consumed[idx] = true;
            return Some(idx);
        }
    }
    for name in field_names(field) {
        let lower = name.to_lowercase();
        if let Some(idx) =
            (0..entries.len()).find(|&i| !consumed[i] && entries[i].0.to_lowercase() == lower)
        {
            consumed[idx] = true;
            score.add(Flag::FuzzyFieldMatch, 1);
            return Some(idx);
        }
    }
    None
}

fn field_names(field: &Field) -> impl Iterator<Item = &str> {
    std::iter::once(field.name.as_str()).chain(field.aliases.iter().map(String::as_str))
}

/// Gather an integer from a value, charging the appropriate flag.
/// Truncation is toward zero.
fn int_from(value: &Value, shape: &Shape, score: &mut Score) -> Result<i64, CoerceError> {
    match value {
        Value::Number(n) => {
            let truncated = n.trunc();
            if truncated != *n {
                score.add(Flag::FloatToInt, 1);
            }
            Ok(truncated as i64)
        }
        Value::String(s) => {
            let parsed = parse_number(s)?;
            score.add(Flag::StringToInt, 2);
            Ok(parsed as i64)
        }
        Value::Bool(b) => {
            score.add(Flag::BoolToInt, 2);
            Ok(i64::from(*b))
        }
        other => Err(mismatch(other, shape)),
    }
}

fn wrap_int(v: i64, width: IntWidth) -> i64 {
    match width {
        IntWidth::W8 => v as i8 as i64,
        IntWidth::W16 => v as i16 as i64,
        IntWidth::W32 => v as i32 as i64,
        IntWidth::W64 => v,
    }
}

fn wrap_uint(v: u64, width: IntWidth) -> u64 {
    match width {
        IntWidth::W8 => v as u8 as u64,
        IntWidth::W16 => v as u16 as u64,
        IntWidth::W32 => v as u32 as u64,
        IntWidth::W64 => v,
    }
}

/// Enum queries accept only scalars that have an obvious string form.
fn enum_query(value: &Value, shape: &Shape) -> Result<String, CoerceError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(format_number(*n)),
        Value::Bool(b) => Ok(bool_text(*b)),
        other => Err(mismatch(other, shape)),
    }
}

/// Integral floats render in integer form, everything else in the shortest
/// round-trippable decimal form.
fn format_number(n: f64) -> String {
    if n.is_finite() && n == n.trunc() && n.abs() < 9.2e18 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

fn bool_text(b: bool) -> String {
    if b { "true" } else { "false" }.to_owned()
}

fn mismatch(value: &Value, shape: &Shape) -> CoerceError {
    CoerceError::TypeMismatch {
        from: value.type_name(),
        to: shape.to_string(),
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
