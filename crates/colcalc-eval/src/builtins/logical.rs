// colcalc-eval/src/builtins/logical.rs
// --------------------------------------------------
// Predicate-gated pass-through: IF, IFMISS, NOT, FILTER and the `_FILTER`
// helper used by row filters. A missing condition is neither true nor
// false.

use super::utils::ARG_ANY_ONE;
use crate::args::ParamSpec;
use crate::func_caps;
use crate::function::{Function, RowArgs};
use crate::traits::FunctionContext;
use colcalc_common::{
    ArgSet, DataType, EvalError, MISSING_INT, MeasureType, OutputRule, Value, is_missing,
};
use std::sync::LazyLock;

const MISSING: Value = Value::Int(MISSING_INT);

fn from_args(sources: &'static [usize]) -> OutputRule {
    OutputRule::FromArgs {
        data_type: DataType::Integer,
        measure: MeasureType::Nominal,
        sources: ArgSet::Indices(sources),
    }
}

fn branch_params(cond_integer: bool) -> Vec<ParamSpec> {
    let cond = ParamSpec::required("cond");
    vec![
        if cond_integer { cond.integer() } else { cond },
        ParamSpec::optional("x", 1),
        ParamSpec::optional("y", MISSING_INT),
    ]
}

fn arg(args: &RowArgs, slot: usize) -> Value {
    args.get(slot).cloned().unwrap_or(MISSING)
}

/* ─────────────────────────── IF() ──────────────────────────── */

static ARG_IF: LazyLock<Vec<ParamSpec>> = LazyLock::new(|| branch_params(true));

/// `x` when `cond` holds, `y` otherwise; missing when `cond` is missing.
///
/// [colcalc-docgen:schema:start]
/// Name: IF
/// Type: IfFn
/// Mode: row-wise
/// Signature: IF(cond: integer, x = 1, y = missing)
/// Output: from args [1, 2], else integer, nominal
/// Levels: [1, 2]
/// [colcalc-docgen:schema:end]
#[derive(Debug)]
pub struct IfFn;

impl Function for IfFn {
    func_caps!(PURE, ROW_WISE);

    fn name(&self) -> &'static str {
        "IF"
    }
    fn params(&self) -> &'static [ParamSpec] {
        &ARG_IF[..]
    }
    fn output(&self) -> OutputRule {
        from_args(&[1, 2])
    }
    fn levels(&self) -> Option<ArgSet> {
        Some(ArgSet::Indices(&[1, 2]))
    }
    fn eval_row(&self, _row: usize, args: &RowArgs, _ctx: &dyn FunctionContext) -> Result<Value, EvalError> {
        let cond = arg(args, 0);
        if is_missing(&cond, true) {
            return Ok(MISSING);
        }
        Ok(if cond.is_truthy() { arg(args, 1) } else { arg(args, 2) })
    }
}

/* ─────────────────────────── IFMISS() ──────────────────────────── */

static ARG_IFMISS: LazyLock<Vec<ParamSpec>> = LazyLock::new(|| branch_params(false));

/// `x` when `cond` is missing (empty text included), `y` otherwise.
#[derive(Debug)]
pub struct IfMissFn;

impl Function for IfMissFn {
    func_caps!(PURE, ROW_WISE);

    fn name(&self) -> &'static str {
        "IFMISS"
    }
    fn params(&self) -> &'static [ParamSpec] {
        &ARG_IFMISS[..]
    }
    fn output(&self) -> OutputRule {
        from_args(&[1, 2])
    }
    fn eval_row(&self, _row: usize, args: &RowArgs, _ctx: &dyn FunctionContext) -> Result<Value, EvalError> {
        let cond = arg(args, 0);
        Ok(if is_missing(&cond, true) { arg(args, 1) } else { arg(args, 2) })
    }
}

/* ─────────────────────────── _FILTER() ──────────────────────────── */

static ARG_FILTER_COND: LazyLock<Vec<ParamSpec>> =
    LazyLock::new(|| vec![ParamSpec::required("cond").integer()]);

/// Row-filter helper: 0 for a missing condition, otherwise the condition.
#[derive(Debug)]
pub struct FilterCondFn;

impl Function for FilterCondFn {
    func_caps!(PURE, ROW_WISE);

    fn name(&self) -> &'static str {
        "_FILTER"
    }
    fn params(&self) -> &'static [ParamSpec] {
        &ARG_FILTER_COND[..]
    }
    fn output(&self) -> OutputRule {
        OutputRule::Fixed {
            data_type: DataType::Integer,
            measure: MeasureType::Nominal,
        }
    }
    fn eval_row(&self, _row: usize, args: &RowArgs, _ctx: &dyn FunctionContext) -> Result<Value, EvalError> {
        let cond = arg(args, 0);
        Ok(if is_missing(&cond, true) { Value::Int(0) } else { cond })
    }
}

/* ─────────────────────────── NOT() ──────────────────────────── */

/// 1 for a false argument, 0 for a true one; missing passes through.
#[derive(Debug)]
pub struct NotFn;

impl Function for NotFn {
    func_caps!(PURE, ROW_WISE);

    fn name(&self) -> &'static str {
        "NOT"
    }
    fn params(&self) -> &'static [ParamSpec] {
        &ARG_ANY_ONE[..]
    }
    fn output(&self) -> OutputRule {
        from_args(&[0])
    }
    fn eval_row(&self, _row: usize, args: &RowArgs, _ctx: &dyn FunctionContext) -> Result<Value, EvalError> {
        let x = arg(args, 0);
        if is_missing(&x, false) {
            return Ok(x);
        }
        Ok(Value::Int(if x.is_truthy() { 0 } else { 1 }))
    }
}

/* ─────────────────────────── FILTER() ──────────────────────────── */

static ARG_FILTER: LazyLock<Vec<ParamSpec>> = LazyLock::new(|| {
    vec![
        ParamSpec::required("x"),
        ParamSpec::variadic("conds").integer(),
    ]
});

/// `x` when every condition holds; missing as soon as one is false or
/// missing.
#[derive(Debug)]
pub struct FilterFn;

impl Function for FilterFn {
    func_caps!(PURE, ROW_WISE);

    fn name(&self) -> &'static str {
        "FILTER"
    }
    fn params(&self) -> &'static [ParamSpec] {
        &ARG_FILTER[..]
    }
    fn output(&self) -> OutputRule {
        from_args(&[0])
    }
    fn eval_row(&self, _row: usize, args: &RowArgs, _ctx: &dyn FunctionContext) -> Result<Value, EvalError> {
        let pass = args
            .rest()
            .iter()
            .all(|c| !is_missing(c, true) && c.is_truthy());
        Ok(if pass { arg(args, 0) } else { MISSING })
    }
}

pub fn register_builtins() {
    crate::register_functions!(IfFn, IfMissFn, FilterCondFn, NotFn, FilterFn);
}
