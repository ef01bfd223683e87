//! Runs a catalog function over columns according to its evaluation mode.

use super::{EvalConfig, EvalContext, GroupPartition};
use crate::args::{Call, bind};
use crate::function::{ColumnArgs, ColumnResult, EvalMode, Function};
use crate::function_registry;
use crate::traits::{ArgColumn, FunctionContext};
use colcalc_common::{ArgMeta, EvalError, EvalErrorKind, OutputMeta, Value};
use rand::rngs::SmallRng;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// A computed column together with the metadata it was typed with.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluatedColumn {
    pub meta: OutputMeta,
    pub values: Vec<Value>,
}

/// Context for one `evaluate` call. Random streams are keyed by the call's
/// sequence number, so two volatile calls in one formula draw independently
/// while a seeded dispatcher still replays the same sequence of calls.
struct CallContext<'a> {
    base: &'a EvalContext,
    call: u64,
}

impl FunctionContext for CallContext<'_> {
    fn rng_for(&self, salt: u64) -> SmallRng {
        self.base
            .rng_for(salt ^ self.call.wrapping_mul(0xD6E8_FEB8_6659_FD93))
    }

    fn date_format(&self) -> &str {
        self.base.date_format()
    }

    fn empty_text_is_missing(&self) -> bool {
        self.base.empty_text_is_missing()
    }
}

pub struct Dispatcher {
    ctx: EvalContext,
    calls: AtomicU64,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(EvalConfig::default())
    }
}

impl Dispatcher {
    /// New dispatcher over the built-in catalog.
    pub fn new(config: EvalConfig) -> Self {
        function_registry::load_builtins();
        Self {
            ctx: EvalContext::new(config),
            calls: AtomicU64::new(0),
        }
    }

    pub fn context(&self) -> &EvalContext {
        &self.ctx
    }

    fn lookup(name: &str) -> Result<Arc<dyn Function>, EvalError> {
        function_registry::get(name).ok_or_else(|| {
            EvalError::new(EvalErrorKind::Unknown).with_message(format!("no function named {name}"))
        })
    }

    /// Output metadata of `name` applied to arguments described by `args`.
    /// Needs no row data.
    pub fn infer(&self, name: &str, args: &[ArgMeta]) -> Result<OutputMeta, EvalError> {
        let f = Self::lookup(name)?;
        Ok(f.descriptor().infer_output(args))
    }

    /// Evaluate `name` over `rows` rows.
    ///
    /// `arg_meta` describes the positional arguments; entries it lacks fall
    /// back to [`ArgColumn::default_meta`]. `groups`, when given, must
    /// assign a group to every row.
    pub fn evaluate(
        &self,
        name: &str,
        call: Call<ArgColumn>,
        arg_meta: &[ArgMeta],
        rows: usize,
        groups: Option<&GroupPartition>,
    ) -> Result<EvaluatedColumn, EvalError> {
        let f = Self::lookup(name)?;
        let fname = f.name();

        #[cfg(feature = "tracing")]
        let _span = tracing::info_span!("evaluate", function = fname, rows).entered();

        let ctx = CallContext {
            base: &self.ctx,
            call: self.calls.fetch_add(1, Ordering::Relaxed),
        };

        Self::check_shapes(&call, rows, groups).map_err(|e| e.with_function(fname))?;

        let metas: Vec<ArgMeta> = call
            .positional
            .iter()
            .enumerate()
            .map(|(i, c)| arg_meta.get(i).copied().unwrap_or_else(|| c.default_meta()))
            .collect();
        let meta = f.descriptor().infer_output(&metas);

        let mut args = bind(fname, f.params(), call)
            .map_err(|e| EvalError::from(e).with_function(fname))?;
        self.resolve_derived(&mut args, rows, &ctx)
            .map_err(|e| e.with_function(fname))?;

        let raw = match f.mode() {
            EvalMode::RowWise => Self::run_rows(f.as_ref(), &args, rows, &ctx),
            EvalMode::ColumnWise => match groups {
                Some(p) => Self::run_groups(f.as_ref(), &args, p, &ctx),
                None => Self::run_column(f.as_ref(), &args, rows, &ctx),
            },
            EvalMode::ColumnWiseNoGroupBy => Self::run_column(f.as_ref(), &args, rows, &ctx),
        }
        .map_err(|e| e.with_function(fname))?;

        let empty_is_missing = ctx.empty_text_is_missing();
        let values = raw
            .into_iter()
            .map(|v| v.cast_for_column(meta.data_type, empty_is_missing))
            .collect();
        Ok(EvaluatedColumn { meta, values })
    }

    fn check_shapes(
        call: &Call<ArgColumn>,
        rows: usize,
        groups: Option<&GroupPartition>,
    ) -> Result<(), EvalError> {
        if let Some(p) = groups {
            if p.len() != rows {
                return Err(EvalError::new(EvalErrorKind::Shape).with_message(format!(
                    "group partition covers {} rows, column has {rows}",
                    p.len()
                )));
            }
        }
        let columns = call
            .positional
            .iter()
            .chain(call.keywords.iter().map(|(_, c)| c));
        for c in columns {
            if let ArgColumn::Values(vs) = c {
                if vs.len() != rows {
                    return Err(EvalError::new(EvalErrorKind::Shape).with_message(format!(
                        "argument column has {} rows, expected {rows}",
                        vs.len()
                    )));
                }
            }
        }
        Ok(())
    }

    /// Fill slots whose default is computed from the first argument column.
    fn resolve_derived(
        &self,
        args: &mut ColumnArgs,
        rows: usize,
        ctx: &dyn FunctionContext,
    ) -> Result<(), EvalError> {
        let pending = args.pending().to_vec();
        for (slot, source) in pending {
            let Some(column) = args.get(0).cloned() else {
                continue;
            };
            let f = Self::lookup(source)?;
            let derived_args = bind(f.name(), f.params(), Call::new(vec![column]))?;
            let value = match f.eval_column(rows, &derived_args, ctx)? {
                ColumnResult::Scalar(v) => ArgColumn::Constant(v),
                ColumnResult::Column(vs) => ArgColumn::Values(vs),
            };
            args.resolve(slot, value);
        }
        Ok(())
    }

    fn run_rows(
        f: &dyn Function,
        args: &ColumnArgs,
        rows: usize,
        ctx: &dyn FunctionContext,
    ) -> Result<Vec<Value>, EvalError> {
        (0..rows)
            .map(|row| {
                let row_args = args.map(|c| c.at(row));
                f.eval_row(row, &row_args, ctx).map_err(|e| e.with_row(row))
            })
            .collect()
    }

    fn run_column(
        f: &dyn Function,
        args: &ColumnArgs,
        rows: usize,
        ctx: &dyn FunctionContext,
    ) -> Result<Vec<Value>, EvalError> {
        let result = f.eval_column(rows, args, ctx)?;
        Self::align(result, rows)
    }

    fn run_groups(
        f: &dyn Function,
        args: &ColumnArgs,
        partition: &GroupPartition,
        ctx: &dyn FunctionContext,
    ) -> Result<Vec<Value>, EvalError> {
        let groups = partition.groups();

        #[cfg(feature = "tracing")]
        tracing::debug!(groups = groups.len(), "column-wise fan-out");

        let mut out = vec![Value::Decimal(f64::NAN); partition.len()];
        for (gid, members) in groups {
            let group_args = args.map(|c| c.take(&members));
            let result = f
                .eval_column(members.len(), &group_args, ctx)
                .and_then(|r| Self::align(r, members.len()))
                .map_err(|e| e.with_group(gid))?;
            for (row, v) in members.into_iter().zip(result) {
                out[row] = v;
            }
        }
        Ok(out)
    }

    fn align(result: ColumnResult, rows: usize) -> Result<Vec<Value>, EvalError> {
        match result {
            ColumnResult::Scalar(v) => Ok(vec![v; rows]),
            ColumnResult::Column(vs) if vs.len() == rows => Ok(vs),
            ColumnResult::Column(vs) => Err(EvalError::new(EvalErrorKind::Shape).with_message(
                format!("returned {} values for {rows} rows", vs.len()),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use colcalc_common::{DataType, MeasureType};

    fn dec(vs: &[f64]) -> ArgColumn {
        ArgColumn::Values(vs.iter().map(|&v| Value::Decimal(v)).collect())
    }

    #[test]
    fn unknown_function_is_configuration_error() {
        let d = Dispatcher::default();
        let err = d
            .evaluate("NOPE", Call::new(vec![]), &[], 0, None)
            .unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::Unknown);
        assert!(err.kind.is_configuration());
    }

    #[test]
    fn column_scalar_is_broadcast_per_group() {
        let d = Dispatcher::default();
        let groups = GroupPartition::new(vec![0, 1, 0, 1]);
        let out = d
            .evaluate(
                "VSUM",
                Call::new(vec![dec(&[1.0, 10.0, 2.0, 20.0])]),
                &[],
                4,
                Some(&groups),
            )
            .unwrap();
        assert_eq!(
            out.values,
            vec![
                Value::Decimal(3.0),
                Value::Decimal(30.0),
                Value::Decimal(3.0),
                Value::Decimal(30.0)
            ]
        );
    }

    #[test]
    fn column_sequence_is_scattered_back_per_group() {
        let d = Dispatcher::default();
        let groups = GroupPartition::new(vec![0, 1, 0, 1, 0]);
        let out = d
            .evaluate(
                "RANK",
                Call::new(vec![dec(&[3.0, 10.0, 1.0, 20.0, 2.0])]),
                &[],
                5,
                Some(&groups),
            )
            .unwrap();
        let ranks: Vec<Value> = [3.0, 1.0, 1.0, 2.0, 2.0].map(Value::Decimal).to_vec();
        assert_eq!(out.values, ranks);
    }

    /// Column function that always answers with a single value.
    #[derive(Debug)]
    struct OneValue;

    impl Function for OneValue {
        crate::func_caps!(PURE, COLUMN_WISE);

        fn name(&self) -> &'static str {
            "ONEVALUE"
        }
        fn params(&self) -> &'static [crate::args::ParamSpec] {
            &[]
        }
        fn eval_column(
            &self,
            _rows: usize,
            _args: &ColumnArgs,
            _ctx: &dyn FunctionContext,
        ) -> Result<ColumnResult, EvalError> {
            Ok(ColumnResult::Column(vec![Value::Int(1)]))
        }
    }

    #[test]
    fn short_group_result_is_shape_error_with_group() {
        let d = Dispatcher::default();
        let groups = GroupPartition::new(vec![4, 7, 4]);
        let args = bind("ONEVALUE", &[], Call::new(vec![])).unwrap();
        let err = Dispatcher::run_groups(&OneValue, &args, &groups, d.context()).unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::Shape);
        assert_eq!(err.context.expect("group context").group, Some(4));
    }

    #[test]
    fn mismatched_partition_is_shape_error() {
        let d = Dispatcher::default();
        let groups = GroupPartition::new(vec![0, 1]);
        let err = d
            .evaluate("VSUM", Call::new(vec![dec(&[1.0, 2.0, 3.0])]), &[], 3, Some(&groups))
            .unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::Shape);
    }

    #[test]
    fn results_are_cast_to_inferred_type() {
        let d = Dispatcher::default();
        // FILTER yields the missing integer for dropped rows; the column is
        // typed after its first argument.
        let meta = [
            ArgMeta::continuous(DataType::Decimal),
            ArgMeta::new(DataType::Integer, MeasureType::Nominal),
        ];
        let out = d
            .evaluate(
                "FILTER",
                Call::new(vec![
                    dec(&[1.5, 2.5]),
                    ArgColumn::Values(vec![Value::Int(1), Value::Int(0)]),
                ]),
                &meta,
                2,
                None,
            )
            .unwrap();
        assert_eq!(out.meta.data_type, DataType::Decimal);
        assert_eq!(out.values[0], Value::Decimal(1.5));
        assert!(out.values[1].is_missing(false));
        assert_eq!(out.values[1].data_type(), DataType::Decimal);
    }

    #[test]
    fn row_errors_carry_row_and_function() {
        let d = Dispatcher::default();
        let err = d
            .evaluate("LN", Call::new(vec![dec(&[1.0, -1.0])]), &[], 2, None)
            .unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::Domain);
        let ctx = err.context.expect("context attached");
        assert_eq!(ctx.row, Some(1));
        assert_eq!(ctx.function.as_deref(), Some("LN"));
    }
}
