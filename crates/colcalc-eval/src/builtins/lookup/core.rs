//! MATCH and HLOOKUP.
//!
//! Both compare with the shared value-model predicates: a missing needle
//! never matches, integers and decimals compare numerically, and a miss is
//! reported as the missing integer rather than an error.

use super::super::utils::{flag, int};
use crate::args::ParamSpec;
use crate::func_caps;
use crate::function::{Function, RowArgs};
use crate::traits::FunctionContext;
use colcalc_common::{
    ArgSet, DataType, EvalError, MISSING_INT, MeasureType, OutputRule, Value, is_equal, is_missing,
};
use std::sync::LazyLock;

/* ─────────────────────────── MATCH() ──────────────────────────── */

static ARG_MATCH: LazyLock<Vec<ParamSpec>> = LazyLock::new(|| {
    vec![
        ParamSpec::required("needle"),
        ParamSpec::variadic("haystack"),
    ]
});

/// 1-based position of the first haystack argument equal to `needle`.
///
/// # Remarks
/// - A missing needle, or one found nowhere, yields the missing integer.
/// - `1` and `1.0` are equal; text never equals a number.
///
/// [colcalc-docgen:schema:start]
/// Name: MATCH
/// Type: MatchFn
/// Mode: row-wise
/// Signature: MATCH(needle, haystack...)
/// Output: integer, ordinal
/// [colcalc-docgen:schema:end]
#[derive(Debug)]
pub struct MatchFn;

impl Function for MatchFn {
    func_caps!(PURE, ROW_WISE, LOOKUP);

    fn name(&self) -> &'static str {
        "MATCH"
    }
    fn params(&self) -> &'static [ParamSpec] {
        &ARG_MATCH[..]
    }
    fn output(&self) -> OutputRule {
        OutputRule::Fixed {
            data_type: DataType::Integer,
            measure: MeasureType::Ordinal,
        }
    }
    fn eval_row(&self, _row: usize, args: &RowArgs, _ctx: &dyn FunctionContext) -> Result<Value, EvalError> {
        let Some(needle) = args.get(0).filter(|v| !is_missing(v, false)) else {
            return Ok(Value::Int(MISSING_INT));
        };
        let pos = args
            .rest()
            .iter()
            .position(|v| is_equal(needle, v))
            .map_or(MISSING_INT, |i| i as i32 + 1);
        Ok(Value::Int(pos))
    }
}

/* ─────────────────────────── HLOOKUP() ──────────────────────────── */

static ARG_HLOOKUP: LazyLock<Vec<ParamSpec>> = LazyLock::new(|| {
    vec![
        ParamSpec::required("index").integer(),
        ParamSpec::variadic("args"),
        ParamSpec::keyword("ignore_missing", 0).integer(),
    ]
});

/// The `index`-th (1-based) of the remaining arguments.
///
/// With `ignore_missing=1`, missing arguments are skipped when counting, so
/// `HLOOKUP(1, NaN, 5, 7, ignore_missing=1)` is 5. An index outside the
/// arguments yields the missing integer.
#[derive(Debug)]
pub struct HLookupFn;

impl Function for HLookupFn {
    func_caps!(PURE, ROW_WISE, LOOKUP);

    fn name(&self) -> &'static str {
        "HLOOKUP"
    }
    fn params(&self) -> &'static [ParamSpec] {
        &ARG_HLOOKUP[..]
    }
    fn output(&self) -> OutputRule {
        OutputRule::FromArgs {
            data_type: DataType::Integer,
            measure: MeasureType::Nominal,
            sources: ArgSet::Stepped { start: 1, step: 1 },
        }
    }
    fn levels(&self) -> Option<ArgSet> {
        Some(ArgSet::Stepped { start: 1, step: 1 })
    }
    fn eval_row(&self, _row: usize, args: &RowArgs, _ctx: &dyn FunctionContext) -> Result<Value, EvalError> {
        let miss = Value::Int(MISSING_INT);
        let index = int(args.get(0));
        let choices = args.rest();
        if index == MISSING_INT || index < 1 || index as usize > choices.len() {
            return Ok(miss);
        }
        let index = index as usize - 1;
        if !flag(args, "ignore_missing") {
            return Ok(choices[index].clone());
        }
        Ok(choices
            .iter()
            .filter(|v| !is_missing(v, false))
            .nth(index)
            .cloned()
            .unwrap_or(miss))
    }
}

pub fn register_builtins() {
    crate::register_functions!(MatchFn, HLookupFn);
}
