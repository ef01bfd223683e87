use crate::args::ParamSpec;
use crate::func_caps;
use crate::function::{Function, RowArgs};
use crate::traits::FunctionContext;
use colcalc_common::{DataType, EvalError, MeasureType, OutputRule, Value};
use std::sync::LazyLock;

/* Row-position builtins. */

/// 1-based number of the row being computed.
///
/// [colcalc-docgen:schema:start]
/// Name: ROW
/// Type: RowFn
/// Mode: row-wise
/// Signature: ROW()
/// Output: integer, ordinal
/// [colcalc-docgen:schema:end]
#[derive(Debug)]
pub struct RowFn;

impl Function for RowFn {
    func_caps!(PURE, ROW_WISE);
    fn name(&self) -> &'static str {
        "ROW"
    }
    fn params(&self) -> &'static [ParamSpec] {
        &[]
    }
    fn output(&self) -> OutputRule {
        OutputRule::Fixed {
            data_type: DataType::Integer,
            measure: MeasureType::Ordinal,
        }
    }
    fn eval_row(&self, row: usize, _args: &RowArgs, _ctx: &dyn FunctionContext) -> Result<Value, EvalError> {
        let n = i32::try_from(row + 1)
            .map_err(|_| EvalError::domain(format!("row {row} exceeds the integer range")))?;
        Ok(Value::Int(n))
    }
}

static ARG_NOTROW: LazyLock<Vec<ParamSpec>> = LazyLock::new(|| {
    vec![
        ParamSpec::required("arg0").integer(),
        ParamSpec::variadic("args").integer(),
    ]
});

/// 0 on the listed 1-based rows, 1 everywhere else; a filter that drops
/// specific rows.
#[derive(Debug)]
pub struct NotRowFn;

impl Function for NotRowFn {
    func_caps!(PURE, ROW_WISE);
    fn name(&self) -> &'static str {
        "NOTROW"
    }
    fn params(&self) -> &'static [ParamSpec] {
        &ARG_NOTROW[..]
    }
    fn output(&self) -> OutputRule {
        OutputRule::Fixed {
            data_type: DataType::Integer,
            measure: MeasureType::Nominal,
        }
    }
    fn eval_row(&self, row: usize, args: &RowArgs, _ctx: &dyn FunctionContext) -> Result<Value, EvalError> {
        let here = row as i64 + 1;
        let listed = args
            .first_and_rest()
            .filter_map(Value::as_i32)
            .any(|r| i64::from(r) == here);
        Ok(Value::Int(if listed { 0 } else { 1 }))
    }
}

pub fn register_builtins() {
    crate::register_functions!(RowFn, NotRowFn);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::{Call, bind};
    use crate::test_table::TestTable;
    use colcalc_common::MISSING_INT;

    fn at(f: &dyn Function, row: usize, args: Vec<Value>) -> Value {
        let bound = bind(f.name(), f.params(), Call::new(args)).unwrap();
        f.eval_row(row, &bound, &TestTable::new().context()).unwrap()
    }

    #[test]
    fn row_is_one_based() {
        assert_eq!(at(&RowFn, 0, vec![]), Value::Int(1));
        assert_eq!(at(&RowFn, 41, vec![]), Value::Int(42));
    }

    #[test]
    fn notrow_flags_listed_rows() {
        let rows = || vec![Value::Int(2), Value::Decimal(5.0), Value::Int(MISSING_INT)];
        assert_eq!(at(&NotRowFn, 1, rows()), Value::Int(0));
        assert_eq!(at(&NotRowFn, 4, rows()), Value::Int(0));
        assert_eq!(at(&NotRowFn, 0, rows()), Value::Int(1));
        assert_eq!(at(&NotRowFn, 2, vec![Value::Int(3)]), Value::Int(0));
    }
}
