//! RECODE: cascading condition/value pairs.
use crate::args::ParamSpec;
use crate::func_caps;
use crate::function::{Function, RowArgs};
use crate::traits::FunctionContext;
use colcalc_common::{ArgSet, DataType, EvalError, MeasureType, OutputRule, Value, is_missing};
use std::sync::LazyLock;

static ARG_RECODE: LazyLock<Vec<ParamSpec>> = LazyLock::new(|| {
    vec![ParamSpec::required("x"), ParamSpec::variadic("args")]
});

/// `RECODE(x, cond1, val1, cond2, val2, …, [else])`
///
/// Returns the value paired with the first condition that is non-missing
/// and true. With an odd number of arguments after `x`, the last one is the
/// catch-all; otherwise `x` itself passes through.
///
/// # Remarks
/// - `RECODE(5, 1, 10, 0, 20)` is 10.
/// - The `_RECODE_NOM`, `_RECODE_ORD`, `_RECODE_CONT` and `_RECODE_ID`
///   names resolve to this function.
///
/// [colcalc-docgen:schema:start]
/// Name: RECODE
/// Type: RecodeFn
/// Mode: row-wise
/// Signature: RECODE(x, args...)
/// Output: from args 2, 4, 6…, else integer, nominal
/// Levels: 0, 2, 4…
/// [colcalc-docgen:schema:end]
#[derive(Debug)]
pub struct RecodeFn;

impl Function for RecodeFn {
    func_caps!(PURE, ROW_WISE);

    fn name(&self) -> &'static str {
        "RECODE"
    }
    fn aliases(&self) -> &'static [&'static str] {
        &["_RECODE_NOM", "_RECODE_ORD", "_RECODE_CONT", "_RECODE_ID"]
    }
    fn params(&self) -> &'static [ParamSpec] {
        &ARG_RECODE[..]
    }
    fn output(&self) -> OutputRule {
        OutputRule::FromArgs {
            data_type: DataType::Integer,
            measure: MeasureType::Nominal,
            sources: ArgSet::Stepped { start: 2, step: 2 },
        }
    }
    fn levels(&self) -> Option<ArgSet> {
        Some(ArgSet::Stepped { start: 0, step: 2 })
    }
    fn eval_row(&self, _row: usize, args: &RowArgs, _ctx: &dyn FunctionContext) -> Result<Value, EvalError> {
        let pairs = args.rest();
        let hit = pairs
            .chunks_exact(2)
            .find(|pair| !is_missing(&pair[0], false) && pair[0].is_truthy())
            .map(|pair| pair[1].clone());
        if let Some(v) = hit {
            return Ok(v);
        }
        if pairs.len() % 2 == 1 {
            return Ok(pairs[pairs.len() - 1].clone());
        }
        Ok(args.get(0).cloned().unwrap_or(Value::Int(colcalc_common::MISSING_INT)))
    }
}

pub fn register_builtins() {
    crate::register_functions!(RecodeFn);
}
