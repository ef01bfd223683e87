use super::super::utils::ARG_ANY_ONE;
use crate::args::ParamSpec;
use crate::func_caps;
use crate::function::{Function, RowArgs};
use crate::traits::FunctionContext;
use colcalc_common::{DataType, EvalError, MeasureType, OutputRule, Value};
use std::sync::LazyLock;

static ARG_TEXT_ONE: LazyLock<Vec<ParamSpec>> =
    LazyLock::new(|| vec![ParamSpec::required("x").text()]);

fn converted(args: &RowArgs, target: DataType) -> Value {
    args.get(0)
        .map(|v| v.coerce(target))
        .unwrap_or_else(|| Value::missing(target))
}

// VALUE(x) - parse text as a decimal
/// Parses `x` as a decimal number.
///
/// # Remarks
/// - Surrounding whitespace is ignored.
/// - Text that does not parse yields `NaN`, never an error.
///
/// [colcalc-docgen:schema:start]
/// Name: VALUE
/// Type: ValueFn
/// Mode: row-wise
/// Signature: VALUE(x: text)
/// Output: decimal, continuous
/// [colcalc-docgen:schema:end]
#[derive(Debug)]
pub struct ValueFn;

impl Function for ValueFn {
    func_caps!(PURE, ROW_WISE);
    fn name(&self) -> &'static str {
        "VALUE"
    }
    fn params(&self) -> &'static [ParamSpec] {
        &ARG_TEXT_ONE[..]
    }
    fn output(&self) -> OutputRule {
        OutputRule::Fixed {
            data_type: DataType::Decimal,
            measure: MeasureType::Continuous,
        }
    }
    fn eval_row(&self, _row: usize, args: &RowArgs, _ctx: &dyn FunctionContext) -> Result<Value, EvalError> {
        Ok(converted(args, DataType::Decimal))
    }
}

// INT(x) - truncate toward zero
/// Truncates `x` toward zero; text is parsed as a decimal first.
///
/// Unparsable text, non-finite numbers and values outside the integer range
/// yield the missing integer.
#[derive(Debug)]
pub struct IntFn;

impl Function for IntFn {
    func_caps!(PURE, ROW_WISE);
    fn name(&self) -> &'static str {
        "INT"
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
        Ok(converted(args, DataType::Integer))
    }
}

// TEXT(x) - text rendering
#[derive(Debug)]
pub struct TextFn;
impl Function for TextFn {
    func_caps!(PURE, ROW_WISE);
    fn name(&self) -> &'static str {
        "TEXT"
    }
    fn params(&self) -> &'static [ParamSpec] {
        &ARG_TEXT_ONE[..]
    }
    fn output(&self) -> OutputRule {
        OutputRule::Fixed {
            data_type: DataType::Text,
            measure: MeasureType::Nominal,
        }
    }
    fn eval_row(&self, _row: usize, args: &RowArgs, _ctx: &dyn FunctionContext) -> Result<Value, EvalError> {
        Ok(converted(args, DataType::Text))
    }
}

pub fn register_builtins() {
    crate::register_functions!(ValueFn, IntFn, TextFn);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::{Call, bind};
    use crate::test_table::TestTable;
    use colcalc_common::MISSING_INT;

    fn row(f: &dyn Function, x: Value) -> Value {
        let args = bind(f.name(), f.params(), Call::new(vec![x])).unwrap();
        f.eval_row(0, &args, &TestTable::new().context()).unwrap()
    }

    #[test]
    fn value_parses_or_nan() {
        assert_eq!(row(&ValueFn, Value::from(" 3.25 ")), Value::Decimal(3.25));
        assert_eq!(row(&ValueFn, Value::Int(4)), Value::Decimal(4.0));
        assert!(row(&ValueFn, Value::from("abc")).is_missing(false));
        assert!(row(&ValueFn, Value::from("")).is_missing(false));
    }

    #[test]
    fn int_truncates() {
        assert_eq!(row(&IntFn, Value::from("7.9")), Value::Int(7));
        assert_eq!(row(&IntFn, Value::from("-2.5")), Value::Int(-2));
        assert_eq!(row(&IntFn, Value::Decimal(3.99)), Value::Int(3));
        assert_eq!(row(&IntFn, Value::from("x")), Value::Int(MISSING_INT));
        assert_eq!(row(&IntFn, Value::Decimal(f64::INFINITY)), Value::Int(MISSING_INT));
        assert_eq!(row(&IntFn, Value::Decimal(1e12)), Value::Int(MISSING_INT));
    }

    #[test]
    fn text_renders_numbers() {
        assert_eq!(row(&TextFn, Value::Int(12)), Value::from("12"));
        assert_eq!(row(&TextFn, Value::Decimal(2.5)), Value::from("2.5"));
        assert_eq!(row(&TextFn, Value::Decimal(f64::NAN)), Value::from(""));
    }
}
