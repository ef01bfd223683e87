use crate::{ArgColumn, Call, Dispatcher, EvalConfig, EvalError, Value};

/// Evaluate `function` over literal argument columns and return the
/// computed values.
///
/// Every column must have the same length; that length is the row count.
/// Random streams are seeded so examples are reproducible.
///
/// # Example
///
/// ```rust
/// # use colcalc::doc_examples::eval_values;
/// # use colcalc::Value;
/// let xs = vec![Value::Decimal(1.0), Value::Decimal(f64::NAN), Value::Decimal(5.0)];
/// let out = eval_values("VMEAN", vec![xs])?;
/// assert_eq!(out, vec![Value::Decimal(3.0); 3]);
/// # Ok::<(), colcalc::EvalError>(())
/// ```
pub fn eval_values(function: &str, columns: Vec<Vec<Value>>) -> Result<Vec<Value>, EvalError> {
    let rows = columns.first().map(Vec::len).unwrap_or(0);
    let args = columns.into_iter().map(ArgColumn::Values).collect();
    let dispatcher = Dispatcher::new(EvalConfig::default().with_seed(0));
    dispatcher
        .evaluate(function, Call::new(args), &[], rows, None)
        .map(|c| c.values)
}
