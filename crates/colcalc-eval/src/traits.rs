//! colcalc-eval – argument columns and the context builtins evaluate in

use std::borrow::Cow;

use colcalc_common::{ArgMeta, DataType, MeasureType, Value};
use rand::rngs::SmallRng;

/* ───────────────────────────── ArgColumn ───────────────────────────── */

/// One argument of a call, as a column.
///
/// Literal arguments and defaults are `Constant` and broadcast to any
/// length; references to data are `Values`.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgColumn {
    Values(Vec<Value>),
    Constant(Value),
}

impl ArgColumn {
    /// Value at `row`. Rows past the end of a `Values` column read as
    /// missing decimals.
    pub fn at(&self, row: usize) -> Value {
        match self {
            ArgColumn::Values(vs) => vs
                .get(row)
                .cloned()
                .unwrap_or(Value::Decimal(f64::NAN)),
            ArgColumn::Constant(v) => v.clone(),
        }
    }

    pub fn first(&self) -> Option<&Value> {
        match self {
            ArgColumn::Values(vs) => vs.first(),
            ArgColumn::Constant(v) => Some(v),
        }
    }

    /// The column materialised to `rows` values.
    pub fn values(&self, rows: usize) -> Cow<'_, [Value]> {
        match self {
            ArgColumn::Values(vs) => Cow::Borrowed(vs.as_slice()),
            ArgColumn::Constant(v) => Cow::Owned(vec![v.clone(); rows]),
        }
    }

    /// Numeric view of `rows` values; anything non-numeric reads as `NaN`.
    pub fn decimals(&self, rows: usize) -> Vec<f64> {
        self.values(rows)
            .iter()
            .map(|v| v.as_f64().unwrap_or(f64::NAN))
            .collect()
    }

    /// The subset of rows belonging to one group.
    pub fn take(&self, rows: &[usize]) -> ArgColumn {
        match self {
            ArgColumn::Values(_) => ArgColumn::Values(rows.iter().map(|&r| self.at(r)).collect()),
            ArgColumn::Constant(v) => ArgColumn::Constant(v.clone()),
        }
    }

    pub fn data_type(&self) -> DataType {
        match self {
            ArgColumn::Values(vs) => vs.first().map_or(DataType::Decimal, Value::data_type),
            ArgColumn::Constant(v) => v.data_type(),
        }
    }

    /// Metadata assumed when the engine supplies none: decimals are
    /// continuous, integers and text nominal.
    pub fn default_meta(&self) -> ArgMeta {
        let dt = self.data_type();
        let measure = match dt {
            DataType::Decimal => MeasureType::Continuous,
            DataType::Integer | DataType::Text => MeasureType::Nominal,
        };
        ArgMeta::new(dt, measure)
    }
}

impl From<Vec<Value>> for ArgColumn {
    fn from(vs: Vec<Value>) -> Self {
        ArgColumn::Values(vs)
    }
}

impl From<Value> for ArgColumn {
    fn from(v: Value) -> Self {
        ArgColumn::Constant(v)
    }
}

/* ─────────────────────────── FunctionContext ───────────────────────── */

/// What a builtin may ask of its surroundings.
///
/// Everything here is read-only or hands out fresh state, so one context
/// can serve concurrent evaluations of independent columns.
pub trait FunctionContext: Send + Sync {
    /// An independent random stream for one call. `salt` distinguishes
    /// calls (function, row, group) so that seeded contexts replay exactly.
    fn rng_for(&self, salt: u64) -> SmallRng;

    /// strftime pattern used when a date function gets no format argument.
    fn date_format(&self) -> &str {
        "%Y-%m-%d"
    }

    fn empty_text_is_missing(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_broadcasts() {
        let c = ArgColumn::Constant(Value::Int(4));
        assert_eq!(c.at(10), Value::Int(4));
        assert_eq!(c.values(3).len(), 3);
        assert_eq!(c.take(&[0, 5]), c);
    }

    #[test]
    fn take_selects_group_rows() {
        let c = ArgColumn::from(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
        assert_eq!(
            c.take(&[2, 0]),
            ArgColumn::Values(vec![Value::Int(3), Value::Int(1)])
        );
        assert_eq!(c.default_meta().measure, MeasureType::Nominal);
    }

    #[test]
    fn decimals_view_marks_missing() {
        let c = ArgColumn::from(vec![Value::Decimal(1.5), Value::from("x")]);
        let d = c.decimals(2);
        assert_eq!(d[0], 1.5);
        assert!(d[1].is_nan());
    }
}
