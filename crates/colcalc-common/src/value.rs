use std::fmt::{self, Display};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Missing sentinel for Integer columns.
pub const MISSING_INT: i32 = i32::MIN;

/// Storage type of a column.
///
/// The declaration order is the widening order used when several inputs
/// feed one output: Integer widens to Decimal, Decimal widens to Text.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DataType {
    Integer,
    Decimal,
    Text,
}

impl DataType {
    /// The widest of two storage types.
    pub fn widen(self, other: DataType) -> DataType {
        self.max(other)
    }
}

impl Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DataType::Integer => "integer",
            DataType::Decimal => "decimal",
            DataType::Text => "text",
        })
    }
}

/// Measurement level of a column.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeasureType {
    Nominal,
    Ordinal,
    Continuous,
    Id,
}

impl Display for MeasureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MeasureType::Nominal => "nominal",
            MeasureType::Ordinal => "ordinal",
            MeasureType::Continuous => "continuous",
            MeasureType::Id => "id",
        })
    }
}

/// A single cell value.
///
/// Each variant carries its own missing sentinel: `NaN` for `Decimal`,
/// [`MISSING_INT`] for `Int` and the empty string for `Text` (only when the
/// caller asks for empty text to count as missing). Never compare values
/// with `==` to detect missingness; use [`is_missing`] and [`is_equal`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i32),
    Decimal(f64),
    Text(String),
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) if *i == MISSING_INT => Ok(()),
            Value::Int(i) => write!(f, "{i}"),
            Value::Decimal(d) if d.is_nan() => Ok(()),
            Value::Decimal(d) => write!(f, "{d}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Decimal(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl Value {
    /// The missing sentinel for a storage type.
    pub fn missing(data_type: DataType) -> Value {
        match data_type {
            DataType::Integer => Value::Int(MISSING_INT),
            DataType::Decimal => Value::Decimal(f64::NAN),
            DataType::Text => Value::Text(String::new()),
        }
    }

    pub fn data_type(&self) -> DataType {
        match self {
            Value::Int(_) => DataType::Integer,
            Value::Decimal(_) => DataType::Decimal,
            Value::Text(_) => DataType::Text,
        }
    }

    pub fn is_missing(&self, empty_text_is_missing: bool) -> bool {
        is_missing(self, empty_text_is_missing)
    }

    /// Truthiness used by conditions: non-zero numbers and non-empty text.
    /// Callers must rule out missing values first.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Int(i) => *i != 0,
            Value::Decimal(d) => *d != 0.0,
            Value::Text(s) => !s.is_empty(),
        }
    }

    /// Numeric view; `None` for text and for missing numbers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) if *i == MISSING_INT => None,
            Value::Int(i) => Some(*i as f64),
            Value::Decimal(d) if d.is_nan() => None,
            Value::Decimal(d) => Some(*d),
            Value::Text(_) => None,
        }
    }

    /// Integer view; `None` for text, missing values and non-integral decimals
    /// outside the `i32` range.
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Int(i) if *i == MISSING_INT => None,
            Value::Int(i) => Some(*i),
            Value::Decimal(d) => decimal_to_int(*d),
            Value::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Convert into another storage type as parameter binding does.
    ///
    /// Missing maps to the target's missing sentinel. Text that fails to parse
    /// becomes missing rather than an error.
    pub fn coerce(&self, target: DataType) -> Value {
        if self.data_type() == target {
            return self.clone();
        }
        match (self, target) {
            (Value::Int(i), DataType::Decimal) => {
                if *i == MISSING_INT {
                    Value::Decimal(f64::NAN)
                } else {
                    Value::Decimal(*i as f64)
                }
            }
            (Value::Decimal(d), DataType::Integer) => {
                Value::Int(decimal_to_int(*d).unwrap_or(MISSING_INT))
            }
            (Value::Text(s), DataType::Decimal) => Value::Decimal(parse_decimal(s).unwrap_or(f64::NAN)),
            (Value::Text(s), DataType::Integer) => Value::Int(parse_int(s).unwrap_or(MISSING_INT)),
            (number, DataType::Text) => Value::Text(number.to_string()),
            (v, _) => v.clone(),
        }
    }

    /// Convert a computed result into the storage type of its destination
    /// column. Missing sentinels of any type become the destination's
    /// sentinel; everything else goes through [`Value::coerce`].
    pub fn cast_for_column(self, target: DataType, empty_text_is_missing: bool) -> Value {
        if self.data_type() == target {
            return self;
        }
        if is_missing(&self, empty_text_is_missing) {
            return Value::missing(target);
        }
        self.coerce(target)
    }
}

fn decimal_to_int(d: f64) -> Option<i32> {
    if !d.is_finite() {
        return None;
    }
    let t = d.trunc();
    if t <= MISSING_INT as f64 || t > i32::MAX as f64 {
        None
    } else {
        Some(t as i32)
    }
}

/// Lenient decimal parse: surrounding whitespace is ignored.
pub fn parse_decimal(s: &str) -> Option<f64> {
    let t = s.trim();
    if t.is_empty() {
        return None;
    }
    t.parse::<f64>().ok()
}

/// Integer parse accepting decimal text, truncated toward zero.
pub fn parse_int(s: &str) -> Option<i32> {
    let t = s.trim();
    if let Ok(i) = t.parse::<i32>() {
        return (i != MISSING_INT).then_some(i);
    }
    parse_decimal(t).and_then(decimal_to_int)
}

/// True when `value` holds the missing sentinel of its storage type.
///
/// Empty text only counts as missing when `empty_text_is_missing` is set.
pub fn is_missing(value: &Value, empty_text_is_missing: bool) -> bool {
    match value {
        Value::Int(i) => *i == MISSING_INT,
        Value::Decimal(d) => d.is_nan(),
        Value::Text(s) => empty_text_is_missing && s.is_empty(),
    }
}

/// Value equality for lookups.
///
/// Integers and decimals compare numerically, text compares exactly and
/// never equals a number. A missing operand is unequal to everything,
/// another missing value included.
pub fn is_equal(a: &Value, b: &Value) -> bool {
    if is_missing(a, false) || is_missing(b, false) {
        return false;
    }
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => x == y,
        (Value::Text(x), Value::Text(y)) => x == y,
        (Value::Text(_), _) | (_, Value::Text(_)) => false,
        (x, y) => x.as_f64() == y.as_f64(),
    }
}
