use crate::args::ParamSpec;
use crate::function::{ColumnArgs, RowArgs};
use colcalc_common::{MISSING_INT, Value};
use std::sync::LazyLock;

/// Numeric view of an optional bound value; absent and non-numeric read as `NaN`.
pub fn num(v: Option<&Value>) -> f64 {
    v.and_then(Value::as_f64).unwrap_or(f64::NAN)
}

/// Integer view of an optional bound value; absent and non-numeric read as
/// the missing integer.
pub fn int(v: Option<&Value>) -> i32 {
    v.and_then(Value::as_i32).unwrap_or(MISSING_INT)
}

/// Keyword flag such as `ignore_missing`: non-zero, non-missing means set.
pub fn flag(args: &RowArgs, name: &str) -> bool {
    args.keyword(name)
        .is_some_and(|v| !v.is_missing(false) && v.is_truthy())
}

/// `arg0` followed by the variadic tail, as decimals.
pub fn row_decimals(args: &RowArgs) -> Vec<f64> {
    args.first_and_rest().map(|v| num(Some(v))).collect()
}

pub fn drop_nan(values: &[f64]) -> Vec<f64> {
    values.iter().copied().filter(|x| !x.is_nan()).collect()
}

/// The `values` column of a column-wise call as decimals, missing dropped.
pub fn column_decimals(args: &ColumnArgs, rows: usize) -> Vec<f64> {
    args.get(0)
        .map(|c| drop_nan(&c.decimals(rows)))
        .unwrap_or_default()
}

pub fn decimal(x: f64) -> Value {
    Value::Decimal(x)
}

// ─────────────────────────────── ParamSpec presets ───────────────────────────────

/// One decimal column, the shape of every `V*` summary.
pub static ARG_VALUES_DEC: LazyLock<Vec<ParamSpec>> =
    LazyLock::new(|| vec![ParamSpec::required("values").decimal()]);

/// One column of any storage type.
pub static ARG_VALUES_ANY: LazyLock<Vec<ParamSpec>> =
    LazyLock::new(|| vec![ParamSpec::required("values")]);

/// A single decimal scalar.
pub static ARG_DEC_ONE: LazyLock<Vec<ParamSpec>> =
    LazyLock::new(|| vec![ParamSpec::required("value").decimal()]);

/// A single scalar of any storage type.
pub static ARG_ANY_ONE: LazyLock<Vec<ParamSpec>> =
    LazyLock::new(|| vec![ParamSpec::required("value")]);
