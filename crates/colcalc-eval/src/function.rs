//! colcalc-eval/src/function.rs
// Home of the `Function` trait, its capability flags and the immutable
// descriptor the scheduler queries before running anything.

use crate::args::{BoundArgs, ParamSpec, arity, param_for_position};
use crate::traits::{ArgColumn, FunctionContext};
use colcalc_common::{ArgMeta, ArgSet, EvalError, EvalErrorKind, OutputMeta, OutputRule, Value};

bitflags::bitflags! {
    /// Describes the capabilities and calling convention of a function.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct FnCaps: u16 {
        // --- Semantics ---
        /// Same output for the same input, no side effects.
        const PURE          = 0b0000_0000_0001;
        /// Draws from the random source; results differ between runs
        /// unless the context is seeded.
        const VOLATILE      = 0b0000_0000_0010;

        // --- Calling convention ---
        /// Called once per row with scalar arguments.
        const ROW_WISE      = 0b0000_0000_0100;
        /// Called once per column (per group when the formula is grouped).
        const COLUMN_WISE   = 0b0000_0000_1000;
        /// With `COLUMN_WISE`: always receives the whole column, even in a
        /// grouped formula.
        const UNGROUPED     = 0b0000_0001_0000;

        // --- Input hints ---
        /// Works on decimals; arguments are coerced before the body runs.
        const NUMERIC_ONLY  = 0b0000_0010_0000;
        /// Searches its arguments for a value.
        const LOOKUP        = 0b0000_0100_0000;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EvalMode {
    RowWise,
    ColumnWise,
    ColumnWiseNoGroupBy,
}

/// Result of a column-wise call: one value broadcast over the group, or
/// one value per input row.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnResult {
    Scalar(Value),
    Column(Vec<Value>),
}

pub type RowArgs = BoundArgs<Value>;
pub type ColumnArgs = BoundArgs<ArgColumn>;

/// Object-safe trait for every catalog function.
///
/// A function declares its calling convention through `caps`, its
/// parameters through `params` and its result metadata through `output`
/// and `levels`; the dispatcher does the rest.
pub trait Function: Send + Sync + 'static {
    fn caps(&self) -> FnCaps {
        FnCaps::PURE | FnCaps::ROW_WISE
    }

    fn name(&self) -> &'static str;

    fn aliases(&self) -> &'static [&'static str] {
        &[]
    }

    fn params(&self) -> &'static [ParamSpec];

    fn output(&self) -> OutputRule {
        OutputRule::Inherit
    }

    /// Arguments whose levels label the result's categories.
    fn levels(&self) -> Option<ArgSet> {
        None
    }

    fn mode(&self) -> EvalMode {
        let caps = self.caps();
        if caps.contains(FnCaps::COLUMN_WISE) {
            if caps.contains(FnCaps::UNGROUPED) {
                EvalMode::ColumnWiseNoGroupBy
            } else {
                EvalMode::ColumnWise
            }
        } else {
            EvalMode::RowWise
        }
    }

    /// Row-wise body. `row` is the 0-based row index.
    fn eval_row(
        &self,
        _row: usize,
        _args: &RowArgs,
        _ctx: &dyn FunctionContext,
    ) -> Result<Value, EvalError> {
        Err(EvalError::new(EvalErrorKind::Type)
            .with_message(format!("{} is not a row-wise function", self.name())))
    }

    /// Column-wise body over `rows` rows (the group, or the whole column).
    fn eval_column(
        &self,
        _rows: usize,
        _args: &ColumnArgs,
        _ctx: &dyn FunctionContext,
    ) -> Result<ColumnResult, EvalError> {
        Err(EvalError::new(EvalErrorKind::Type)
            .with_message(format!("{} is not a column-wise function", self.name())))
    }

    fn descriptor(&self) -> FunctionDescriptor {
        let params = self.params();
        let (min_args, max_args) = arity(params);
        FunctionDescriptor {
            name: self.name(),
            aliases: self.aliases(),
            caps: self.caps(),
            mode: self.mode(),
            params,
            min_args,
            max_args,
            output: self.output(),
            levels: self.levels(),
        }
    }
}

/// Immutable registration record of a function.
#[derive(Debug, Clone)]
pub struct FunctionDescriptor {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub caps: FnCaps,
    pub mode: EvalMode,
    pub params: &'static [ParamSpec],
    pub min_args: usize,
    pub max_args: Option<usize>,
    pub output: OutputRule,
    pub levels: Option<ArgSet>,
}

impl FunctionDescriptor {
    pub fn is_volatile(&self) -> bool {
        self.caps.contains(FnCaps::VOLATILE)
    }

    pub fn keywords(&self) -> impl Iterator<Item = &'static str> {
        self.params.iter().filter(|p| p.is_keyword()).map(|p| p.name)
    }

    /// Infer the result column's metadata from the positional arguments'
    /// metadata. Arguments bound to a coercing parameter count as the
    /// coerced storage type.
    pub fn infer_output(&self, args: &[ArgMeta]) -> OutputMeta {
        let effective: Vec<ArgMeta> = args
            .iter()
            .enumerate()
            .map(|(i, meta)| match param_for_position(self.params, i).and_then(|p| p.coercion) {
                Some(dt) if dt != meta.data_type => ArgMeta::new(dt, meta.measure),
                _ => *meta,
            })
            .collect();
        self.output.infer(self.levels.as_ref(), &effective)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use colcalc_common::{DataType, MeasureType};
    use std::sync::LazyLock;

    struct Probe;

    impl Function for Probe {
        crate::func_caps!(PURE, COLUMN_WISE, UNGROUPED);

        fn name(&self) -> &'static str {
            "PROBE"
        }

        fn params(&self) -> &'static [ParamSpec] {
            static P: LazyLock<Vec<ParamSpec>> =
                LazyLock::new(|| vec![ParamSpec::required("values").decimal()]);
            &P[..]
        }
    }

    #[test]
    fn mode_follows_caps() {
        assert_eq!(Probe.mode(), EvalMode::ColumnWiseNoGroupBy);
        let d = Probe.descriptor();
        assert_eq!((d.min_args, d.max_args), (1, Some(1)));
        assert!(!d.is_volatile());
    }

    #[test]
    fn coerced_parameters_change_inferred_type() {
        let d = Probe.descriptor();
        let m = d.infer_output(&[ArgMeta::new(DataType::Integer, MeasureType::Nominal)]);
        assert_eq!(m.data_type, DataType::Decimal);
        assert_eq!(m.measure, MeasureType::Continuous);
    }

    #[test]
    fn default_bodies_reject_wrong_mode() {
        struct Ctx;
        impl FunctionContext for Ctx {
            fn rng_for(&self, salt: u64) -> rand::rngs::SmallRng {
                use rand::SeedableRng;
                rand::rngs::SmallRng::seed_from_u64(salt)
            }
        }
        let args = crate::args::bind("PROBE", Probe.params(), crate::args::Call::new(vec![Value::Int(1)])).unwrap();
        let err = Probe.eval_row(0, &args, &Ctx).unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::Type);
    }
}
