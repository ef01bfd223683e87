use super::super::utils::{ARG_ANY_ONE, ARG_DEC_ONE, decimal, int, num};
use crate::args::ParamSpec;
use crate::func_caps;
use crate::function::{Function, RowArgs};
use crate::traits::FunctionContext;
use colcalc_common::{
    ArgSet, DataType, EvalError, MISSING_INT, MeasureType, OutputRule, Value, parse_decimal,
};
use std::sync::LazyLock;

/// Numeric reading of an uncoerced argument: integers stay exact, text is
/// parsed, anything unreadable is `None` (missing).
fn numeric(v: Option<&Value>) -> Option<Value> {
    match v? {
        v if v.is_missing(false) => None,
        Value::Int(i) => Some(Value::Int(*i)),
        Value::Decimal(d) => Some(Value::Decimal(*d)),
        Value::Text(s) => parse_decimal(s).map(Value::Decimal),
    }
}

fn to_int(x: f64) -> Value {
    if x.is_finite() && x > MISSING_INT as f64 && x <= i32::MAX as f64 {
        Value::Int(x as i32)
    } else {
        Value::Int(MISSING_INT)
    }
}

/// Absolute value. Keeps the storage type of its argument.
#[derive(Debug)]
pub struct AbsFn;

impl Function for AbsFn {
    func_caps!(PURE, ROW_WISE);

    fn name(&self) -> &'static str {
        "ABS"
    }
    fn params(&self) -> &'static [ParamSpec] {
        &ARG_ANY_ONE[..]
    }
    fn output(&self) -> OutputRule {
        OutputRule::FromArgs {
            data_type: DataType::Decimal,
            measure: MeasureType::Continuous,
            sources: ArgSet::Indices(&[0]),
        }
    }
    fn eval_row(&self, _row: usize, args: &RowArgs, _ctx: &dyn FunctionContext) -> Result<Value, EvalError> {
        Ok(match numeric(args.get(0)) {
            Some(Value::Int(i)) => Value::Int(i.abs()),
            Some(Value::Decimal(d)) => Value::Decimal(d.abs()),
            _ => Value::Decimal(f64::NAN),
        })
    }
}

/* ─────────────────────────── ROUND() ──────────────────────────── */

static ARG_ROUND: LazyLock<Vec<ParamSpec>> = LazyLock::new(|| {
    vec![
        ParamSpec::required("value"),
        ParamSpec::optional("digits", 0).integer(),
    ]
});

/// Round to `digits` decimal places, ties to even. Negative `digits` round
/// to tens, hundreds, and so on.
pub fn round_half_even(x: f64, digits: i32) -> f64 {
    if !x.is_finite() {
        return x;
    }
    if digits >= 0 {
        let factor = 10f64.powi(digits);
        let scaled = x * factor;
        if !scaled.is_finite() {
            return x;
        }
        scaled.round_ties_even() / factor
    } else {
        let factor = 10f64.powi(-digits);
        (x / factor).round_ties_even() * factor
    }
}

/// Rounds a number to a given count of decimal places.
///
/// # Remarks
/// - Halfway cases round to the even neighbour: `ROUND(2.5)` is 2.
/// - A missing `digits` counts as zero.
///
/// [colcalc-docgen:schema:start]
/// Name: ROUND
/// Type: RoundFn
/// Mode: row-wise
/// Signature: ROUND(value, digits: integer = 0)
/// Output: decimal, continuous
/// [colcalc-docgen:schema:end]
#[derive(Debug)]
pub struct RoundFn;

impl Function for RoundFn {
    func_caps!(PURE, ROW_WISE, NUMERIC_ONLY);

    fn name(&self) -> &'static str {
        "ROUND"
    }
    fn params(&self) -> &'static [ParamSpec] {
        &ARG_ROUND[..]
    }
    fn output(&self) -> OutputRule {
        OutputRule::Fixed {
            data_type: DataType::Decimal,
            measure: MeasureType::Continuous,
        }
    }
    fn eval_row(&self, _row: usize, args: &RowArgs, _ctx: &dyn FunctionContext) -> Result<Value, EvalError> {
        let digits = match int(args.get(1)) {
            MISSING_INT => 0,
            d => d,
        };
        Ok(match numeric(args.get(0)) {
            Some(v) => decimal(round_half_even(num(Some(&v)), digits)),
            None => decimal(f64::NAN),
        })
    }
}

/* ─────────────────────────── FLOOR() / CEILING() ──────────────────────────── */

/// Largest integer not above the argument.
#[derive(Debug)]
pub struct FloorFn;

impl Function for FloorFn {
    func_caps!(PURE, ROW_WISE, NUMERIC_ONLY);

    fn name(&self) -> &'static str {
        "FLOOR"
    }
    fn params(&self) -> &'static [ParamSpec] {
        &ARG_ANY_ONE[..]
    }
    fn output(&self) -> OutputRule {
        OutputRule::Fixed {
            data_type: DataType::Integer,
            measure: MeasureType::Continuous,
        }
    }
    fn eval_row(&self, _row: usize, args: &RowArgs, _ctx: &dyn FunctionContext) -> Result<Value, EvalError> {
        Ok(match numeric(args.get(0)) {
            Some(Value::Int(i)) => Value::Int(i),
            Some(v) => to_int(num(Some(&v)).floor()),
            None => Value::Int(MISSING_INT),
        })
    }
}

/// Smallest integer not below the argument.
#[derive(Debug)]
pub struct CeilingFn;

impl Function for CeilingFn {
    func_caps!(PURE, ROW_WISE, NUMERIC_ONLY);

    fn name(&self) -> &'static str {
        "CEILING"
    }
    fn params(&self) -> &'static [ParamSpec] {
        &ARG_ANY_ONE[..]
    }
    fn output(&self) -> OutputRule {
        OutputRule::Fixed {
            data_type: DataType::Integer,
            measure: MeasureType::Continuous,
        }
    }
    fn eval_row(&self, _row: usize, args: &RowArgs, _ctx: &dyn FunctionContext) -> Result<Value, EvalError> {
        Ok(match numeric(args.get(0)) {
            Some(Value::Int(i)) => Value::Int(i),
            Some(v) => to_int(num(Some(&v)).ceil()),
            None => Value::Int(MISSING_INT),
        })
    }
}

/* ─────────────────────────── EXP / LN / LOG10 / SQRT ──────────────────────────── */

// Missing input passes through as missing; a finite input outside the
// function's domain is an error.

#[derive(Debug)]
pub struct ExpFn;

impl Function for ExpFn {
    func_caps!(PURE, ROW_WISE, NUMERIC_ONLY);

    fn name(&self) -> &'static str {
        "EXP"
    }
    fn params(&self) -> &'static [ParamSpec] {
        &ARG_DEC_ONE[..]
    }
    fn eval_row(&self, _row: usize, args: &RowArgs, _ctx: &dyn FunctionContext) -> Result<Value, EvalError> {
        let x = num(args.get(0));
        let y = x.exp();
        if x.is_finite() && y.is_infinite() {
            return Err(EvalError::domain(format!("EXP({x}) overflows")));
        }
        Ok(decimal(y))
    }
}

fn log_like(x: f64, f: fn(f64) -> f64, name: &str) -> Result<Value, EvalError> {
    if x.is_nan() {
        return Ok(decimal(f64::NAN));
    }
    if x <= 0.0 {
        return Err(EvalError::domain(format!("{name} of non-positive value {x}")));
    }
    Ok(decimal(f(x)))
}

#[derive(Debug)]
pub struct LnFn;

impl Function for LnFn {
    func_caps!(PURE, ROW_WISE, NUMERIC_ONLY);

    fn name(&self) -> &'static str {
        "LN"
    }
    fn params(&self) -> &'static [ParamSpec] {
        &ARG_DEC_ONE[..]
    }
    fn eval_row(&self, _row: usize, args: &RowArgs, _ctx: &dyn FunctionContext) -> Result<Value, EvalError> {
        log_like(num(args.get(0)), f64::ln, "LN")
    }
}

#[derive(Debug)]
pub struct Log10Fn;

impl Function for Log10Fn {
    func_caps!(PURE, ROW_WISE, NUMERIC_ONLY);

    fn name(&self) -> &'static str {
        "LOG10"
    }
    fn params(&self) -> &'static [ParamSpec] {
        &ARG_DEC_ONE[..]
    }
    fn eval_row(&self, _row: usize, args: &RowArgs, _ctx: &dyn FunctionContext) -> Result<Value, EvalError> {
        log_like(num(args.get(0)), f64::log10, "LOG10")
    }
}

#[derive(Debug)]
pub struct SqrtFn;

impl Function for SqrtFn {
    func_caps!(PURE, ROW_WISE, NUMERIC_ONLY);

    fn name(&self) -> &'static str {
        "SQRT"
    }
    fn params(&self) -> &'static [ParamSpec] {
        &ARG_DEC_ONE[..]
    }
    fn eval_row(&self, _row: usize, args: &RowArgs, _ctx: &dyn FunctionContext) -> Result<Value, EvalError> {
        let x = num(args.get(0));
        if x < 0.0 {
            return Err(EvalError::domain(format!("SQRT of negative value {x}")));
        }
        Ok(decimal(x.sqrt()))
    }
}

pub fn register_builtins() {
    crate::register_functions!(
        AbsFn, RoundFn, FloorFn, CeilingFn, ExpFn, LnFn, Log10Fn, SqrtFn
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::{Call, bind};
    use crate::test_table::TestTable;
    use colcalc_common::EvalErrorKind;

    fn row(f: &dyn Function, args: Vec<Value>) -> Result<Value, EvalError> {
        let bound = bind(f.name(), f.params(), Call::new(args)).unwrap();
        f.eval_row(0, &bound, &TestTable::new().context())
    }

    #[test]
    fn abs_keeps_storage_type() {
        assert_eq!(row(&AbsFn, vec![Value::Int(-3)]).unwrap(), Value::Int(3));
        assert_eq!(row(&AbsFn, vec![Value::Decimal(-2.5)]).unwrap(), Value::Decimal(2.5));
        assert!(row(&AbsFn, vec![Value::Int(MISSING_INT)]).unwrap().is_missing(false));
    }

    #[test]
    fn round_ties_to_even() {
        assert_eq!(round_half_even(2.5, 0), 2.0);
        assert_eq!(round_half_even(3.5, 0), 4.0);
        assert_eq!(round_half_even(-0.5, 0), -0.0);
        assert_eq!(round_half_even(1250.0, -2), 1200.0);
        assert_eq!(round_half_even(1.234, 2), 1.23);
        assert_eq!(
            row(&RoundFn, vec![Value::Decimal(0.125), Value::Int(2)]).unwrap(),
            Value::Decimal(0.12)
        );
    }

    #[test]
    fn floor_and_ceiling_are_integers() {
        assert_eq!(row(&FloorFn, vec![Value::Decimal(-1.5)]).unwrap(), Value::Int(-2));
        assert_eq!(row(&CeilingFn, vec![Value::Decimal(1.2)]).unwrap(), Value::Int(2));
        assert_eq!(row(&FloorFn, vec![Value::Decimal(f64::NAN)]).unwrap(), Value::Int(MISSING_INT));
        assert_eq!(row(&CeilingFn, vec![Value::Decimal(1e12)]).unwrap(), Value::Int(MISSING_INT));
    }

    #[test]
    fn logs_reject_non_positive() {
        assert_eq!(row(&LnFn, vec![Value::Decimal(0.0)]).unwrap_err().kind, EvalErrorKind::Domain);
        assert_eq!(row(&Log10Fn, vec![Value::Int(100)]).unwrap(), Value::Decimal(2.0));
        assert!(row(&LnFn, vec![Value::Decimal(f64::NAN)]).unwrap().is_missing(false));
        assert_eq!(row(&SqrtFn, vec![Value::Int(-4)]).unwrap_err().kind, EvalErrorKind::Domain);
        assert_eq!(row(&ExpFn, vec![Value::Decimal(1000.0)]).unwrap_err().kind, EvalErrorKind::Domain);
        assert_eq!(row(&ExpFn, vec![Value::Decimal(0.0)]).unwrap(), Value::Decimal(1.0));
    }
}
