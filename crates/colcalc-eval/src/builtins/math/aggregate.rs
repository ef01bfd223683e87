use super::super::utils::{decimal, drop_nan, flag, int, row_decimals};
use crate::args::ParamSpec;
use crate::func_caps;
use crate::function::{Function, RowArgs};
use crate::stats;
use crate::traits::FunctionContext;
use colcalc_common::{DataType, EvalError, MeasureType, OutputRule, Value};
use std::sync::LazyLock;

/// `arg0, *args` as decimals plus the `ignore_missing` keyword.
fn spread_params(ignore_default: i32) -> Vec<ParamSpec> {
    vec![
        ParamSpec::required("arg0").decimal(),
        ParamSpec::variadic("args").decimal(),
        ParamSpec::keyword("ignore_missing", ignore_default).integer(),
    ]
}

static ARG_EXTREMA: LazyLock<Vec<ParamSpec>> = LazyLock::new(|| spread_params(1));

static ARG_SPREAD: LazyLock<Vec<ParamSpec>> = LazyLock::new(|| spread_params(0));

static ARG_TOTAL: LazyLock<Vec<ParamSpec>> = LazyLock::new(|| {
    let mut p = spread_params(0);
    p.push(ParamSpec::keyword("min_valid", 0).integer());
    p
});

/// Values left after the `ignore_missing` / `min_valid` filtering shared by
/// SUM and MEAN, or `None` when fewer than `min_valid` remain.
fn filtered_total_inputs(args: &RowArgs) -> Option<Vec<f64>> {
    let values = row_decimals(args);
    let min_valid = int(args.keyword("min_valid")).max(0) as usize;
    let values = if min_valid > 0 || flag(args, "ignore_missing") {
        drop_nan(&values)
    } else {
        values
    };
    (values.len() >= min_valid).then_some(values)
}

fn extremum(args: &RowArgs, pick: fn(f64, f64) -> f64, name: &str) -> Result<Value, EvalError> {
    let mut values = row_decimals(args);
    if flag(args, "ignore_missing") {
        values = drop_nan(&values);
    } else if values.iter().any(|x| x.is_nan()) {
        return Ok(decimal(f64::NAN));
    }
    values
        .into_iter()
        .reduce(pick)
        .map(decimal)
        .ok_or_else(|| EvalError::empty(format!("{name} of no values")))
}

/* ─────────────────────────── MAX() / MIN() ──────────────────────────── */

/// Largest of its arguments.
///
/// # Remarks
/// - Missing arguments are skipped unless `ignore_missing=0`, in which case
///   any missing argument makes the result missing.
/// - With every argument missing there is nothing to compare and the call
///   fails with an empty-aggregate error.
///
/// [colcalc-docgen:schema:start]
/// Name: MAX
/// Type: MaxFn
/// Mode: row-wise
/// Signature: MAX(arg0: decimal, args...: decimal, ignore_missing=1)
/// Output: inherit
/// [colcalc-docgen:schema:end]
#[derive(Debug)]
pub struct MaxFn;

impl Function for MaxFn {
    func_caps!(PURE, ROW_WISE, NUMERIC_ONLY);

    fn name(&self) -> &'static str {
        "MAX"
    }
    fn params(&self) -> &'static [ParamSpec] {
        &ARG_EXTREMA[..]
    }
    fn eval_row(&self, _row: usize, args: &RowArgs, _ctx: &dyn FunctionContext) -> Result<Value, EvalError> {
        extremum(args, f64::max, "MAX")
    }
}

/// Smallest of its arguments; missing handling as for `MAX`.
///
/// [colcalc-docgen:schema:start]
/// Name: MIN
/// Type: MinFn
/// Mode: row-wise
/// Signature: MIN(arg0: decimal, args...: decimal, ignore_missing=1)
/// Output: inherit
/// [colcalc-docgen:schema:end]
#[derive(Debug)]
pub struct MinFn;

impl Function for MinFn {
    func_caps!(PURE, ROW_WISE, NUMERIC_ONLY);

    fn name(&self) -> &'static str {
        "MIN"
    }
    fn params(&self) -> &'static [ParamSpec] {
        &ARG_EXTREMA[..]
    }
    fn eval_row(&self, _row: usize, args: &RowArgs, _ctx: &dyn FunctionContext) -> Result<Value, EvalError> {
        extremum(args, f64::min, "MIN")
    }
}

/* ─────────────────────────── SUM() ──────────────────────────── */

/// Compensated sum of its arguments.
///
/// # Remarks
/// - By default a missing argument makes the sum missing.
/// - `ignore_missing=1` drops missing arguments first.
/// - `min_valid=k` also drops them, and yields missing unless at least `k`
///   values remain.
///
/// [colcalc-docgen:schema:start]
/// Name: SUM
/// Type: SumFn
/// Mode: row-wise
/// Signature: SUM(arg0: decimal, args...: decimal, ignore_missing=0, min_valid=0)
/// Output: inherit
/// [colcalc-docgen:schema:end]
#[derive(Debug)]
pub struct SumFn;

impl Function for SumFn {
    func_caps!(PURE, ROW_WISE, NUMERIC_ONLY);

    fn name(&self) -> &'static str {
        "SUM"
    }
    fn params(&self) -> &'static [ParamSpec] {
        &ARG_TOTAL[..]
    }
    fn eval_row(&self, _row: usize, args: &RowArgs, _ctx: &dyn FunctionContext) -> Result<Value, EvalError> {
        Ok(decimal(match filtered_total_inputs(args) {
            Some(values) => stats::fsum(values),
            None => f64::NAN,
        }))
    }
}

/* ─────────────────────────── MEAN() ──────────────────────────── */

/// Arithmetic mean of its arguments, with the same keywords as `SUM`.
#[derive(Debug)]
pub struct MeanFn;

impl Function for MeanFn {
    func_caps!(PURE, ROW_WISE, NUMERIC_ONLY);

    fn name(&self) -> &'static str {
        "MEAN"
    }
    fn params(&self) -> &'static [ParamSpec] {
        &ARG_TOTAL[..]
    }
    fn eval_row(&self, _row: usize, args: &RowArgs, _ctx: &dyn FunctionContext) -> Result<Value, EvalError> {
        match filtered_total_inputs(args) {
            Some(values) => stats::mean(&values).map(decimal),
            None => Ok(decimal(f64::NAN)),
        }
    }
}

/* ─────────────────────────── STDEV() / VAR() ──────────────────────────── */

fn spread_inputs(args: &RowArgs) -> Vec<f64> {
    let values = row_decimals(args);
    if flag(args, "ignore_missing") {
        drop_nan(&values)
    } else {
        values
    }
}

/// Sample standard deviation of its arguments. Fewer than two values is an
/// error.
#[derive(Debug)]
pub struct StdevFn;

impl Function for StdevFn {
    func_caps!(PURE, ROW_WISE, NUMERIC_ONLY);

    fn name(&self) -> &'static str {
        "STDEV"
    }
    fn params(&self) -> &'static [ParamSpec] {
        &ARG_SPREAD[..]
    }
    fn eval_row(&self, _row: usize, args: &RowArgs, _ctx: &dyn FunctionContext) -> Result<Value, EvalError> {
        stats::stdev(&spread_inputs(args)).map(decimal)
    }
}

/// Sample variance of its arguments.
#[derive(Debug)]
pub struct VarFn;

impl Function for VarFn {
    func_caps!(PURE, ROW_WISE, NUMERIC_ONLY);

    fn name(&self) -> &'static str {
        "VAR"
    }
    fn params(&self) -> &'static [ParamSpec] {
        &ARG_SPREAD[..]
    }
    fn eval_row(&self, _row: usize, args: &RowArgs, _ctx: &dyn FunctionContext) -> Result<Value, EvalError> {
        stats::variance(&spread_inputs(args)).map(decimal)
    }
}

/* ─────────────────────────── COUNT() ──────────────────────────── */

static ARG_COUNT: LazyLock<Vec<ParamSpec>> =
    LazyLock::new(|| vec![ParamSpec::variadic("args")]);

/// Number of non-missing arguments.
#[derive(Debug)]
pub struct CountFn;

impl Function for CountFn {
    func_caps!(PURE, ROW_WISE);

    fn name(&self) -> &'static str {
        "COUNT"
    }
    fn params(&self) -> &'static [ParamSpec] {
        &ARG_COUNT[..]
    }
    fn output(&self) -> OutputRule {
        OutputRule::Fixed {
            data_type: DataType::Integer,
            measure: MeasureType::Continuous,
        }
    }
    fn eval_row(&self, _row: usize, args: &RowArgs, _ctx: &dyn FunctionContext) -> Result<Value, EvalError> {
        let n = args.rest().iter().filter(|v| !v.is_missing(false)).count();
        Ok(Value::Int(n as i32))
    }
}

pub fn register_builtins() {
    crate::register_functions!(MaxFn, MinFn, SumFn, MeanFn, StdevFn, VarFn, CountFn);
}
