//! Column summaries (`V*`), quartiles, ranks and the Box-Cox family.
//!
//! Every summary drops missing values before computing; `VN` and `VROWS`
//! are the exceptions, they count. A summary returns one value, which the
//! dispatcher broadcasts over the group.

mod boxcox;

pub use boxcox::*;

use super::utils::{ARG_VALUES_ANY, ARG_VALUES_DEC, column_decimals, decimal, num};
use crate::args::ParamSpec;
use crate::func_caps;
use crate::function::{ColumnArgs, ColumnResult, Function, RowArgs};
use crate::stats;
use crate::traits::FunctionContext;
use colcalc_common::{DataType, EvalError, MeasureType, OutputRule, Value};
use std::sync::LazyLock;

/// Defines a column-wise summary over the non-missing decimals of its one
/// argument.
macro_rules! decimal_summary {
    ($(#[$doc:meta])* $ty:ident, $name:literal, $kernel:expr) => {
        $(#[$doc])*
        #[derive(Debug)]
        pub struct $ty;

        impl Function for $ty {
            func_caps!(PURE, COLUMN_WISE, NUMERIC_ONLY);

            fn name(&self) -> &'static str {
                $name
            }
            fn params(&self) -> &'static [ParamSpec] {
                &ARG_VALUES_DEC[..]
            }
            fn eval_column(
                &self,
                rows: usize,
                args: &ColumnArgs,
                _ctx: &dyn FunctionContext,
            ) -> Result<ColumnResult, EvalError> {
                let values = column_decimals(args, rows);
                let kernel: fn(&[f64]) -> Result<f64, EvalError> = $kernel;
                kernel(&values).map(|x| ColumnResult::Scalar(decimal(x)))
            }
        }
    };
}

fn extreme(values: &[f64], pick: fn(f64, f64) -> f64) -> Result<f64, EvalError> {
    values
        .iter()
        .copied()
        .reduce(pick)
        .ok_or_else(|| EvalError::empty("extreme of no values"))
}

decimal_summary!(
    /// Mean of the column.
    VMeanFn, "VMEAN", stats::mean
);
decimal_summary!(
    /// Sample standard deviation of the column.
    VStdevFn, "VSTDEV", stats::stdev
);
decimal_summary!(
    /// Sample variance of the column.
    VVarFn, "VVAR", stats::variance
);
decimal_summary!(
    /// Compensated sum of the column; zero when nothing is left.
    VSumFn, "VSUM", |v| Ok(stats::fsum(v.iter().copied()))
);
decimal_summary!(VMinFn, "VMIN", |v| extreme(v, f64::min));
decimal_summary!(VMaxFn, "VMAX", |v| extreme(v, f64::max));
decimal_summary!(
    /// Median of the column.
    VMedFn, "VMED", stats::median
);
decimal_summary!(
    /// Most frequent value; on a tie the value that appears first wins.
    VModeFn, "VMODE", stats::mode
);
decimal_summary!(
    /// Median absolute deviation from the median.
    VMadFn, "VMAD", stats::mad
);
decimal_summary!(
    /// `VMAD` scaled by 1.4826, a consistent estimator of the standard
    /// deviation for normal data.
    VMadrFn, "VMADR", |v| stats::mad(v).map(|m| m * 1.4826)
);
decimal_summary!(
    /// Standard error of the mean, `sqrt(var / n)`.
    VSeFn, "VSE", |v| stats::variance(v).map(|var| (var / v.len() as f64).sqrt())
);
decimal_summary!(
    /// First quartile, linear interpolation between closest ranks.
    Q1Fn, "Q1", |v| stats::quantile(v, 0.25)
);
decimal_summary!(
    /// Third quartile.
    Q3Fn, "Q3", |v| stats::quantile(v, 0.75)
);

/* ─────────────────────────── VN() / VROWS() ──────────────────────────── */

const COUNT_OUTPUT: OutputRule = OutputRule::Fixed {
    data_type: DataType::Integer,
    measure: MeasureType::Ordinal,
};

/// Number of non-missing values in the column, of any storage type.
#[derive(Debug)]
pub struct VnFn;

impl Function for VnFn {
    func_caps!(PURE, COLUMN_WISE);

    fn name(&self) -> &'static str {
        "VN"
    }
    fn params(&self) -> &'static [ParamSpec] {
        &ARG_VALUES_ANY[..]
    }
    fn output(&self) -> OutputRule {
        COUNT_OUTPUT
    }
    fn eval_column(
        &self,
        rows: usize,
        args: &ColumnArgs,
        _ctx: &dyn FunctionContext,
    ) -> Result<ColumnResult, EvalError> {
        let n = args
            .get(0)
            .map(|c| c.values(rows).iter().filter(|v| !v.is_missing(false)).count())
            .unwrap_or(0);
        Ok(ColumnResult::Scalar(Value::Int(n as i32)))
    }
}

/// Number of rows, missing or not.
#[derive(Debug)]
pub struct VRowsFn;

impl Function for VRowsFn {
    func_caps!(PURE, COLUMN_WISE);

    fn name(&self) -> &'static str {
        "VROWS"
    }
    fn params(&self) -> &'static [ParamSpec] {
        &ARG_VALUES_ANY[..]
    }
    fn output(&self) -> OutputRule {
        COUNT_OUTPUT
    }
    fn eval_column(
        &self,
        rows: usize,
        _args: &ColumnArgs,
        _ctx: &dyn FunctionContext,
    ) -> Result<ColumnResult, EvalError> {
        Ok(ColumnResult::Scalar(Value::Int(rows as i32)))
    }
}

/* ─────────────────────────── RANK() ──────────────────────────── */

/// Rank of each value within the column (group), ties averaged.
///
/// # Remarks
/// - Ranks are 1-based; three values tied for second place all get 3.
/// - Missing values are not ranked and stay missing in the result.
///
/// [colcalc-docgen:schema:start]
/// Name: RANK
/// Type: RankFn
/// Mode: column-wise
/// Signature: RANK(values: decimal)
/// Output: decimal, continuous
/// [colcalc-docgen:schema:end]
#[derive(Debug)]
pub struct RankFn;

impl Function for RankFn {
    func_caps!(PURE, COLUMN_WISE, NUMERIC_ONLY);

    fn name(&self) -> &'static str {
        "RANK"
    }
    fn params(&self) -> &'static [ParamSpec] {
        &ARG_VALUES_DEC[..]
    }
    fn output(&self) -> OutputRule {
        OutputRule::Fixed {
            data_type: DataType::Decimal,
            measure: MeasureType::Continuous,
        }
    }
    fn eval_column(
        &self,
        rows: usize,
        args: &ColumnArgs,
        _ctx: &dyn FunctionContext,
    ) -> Result<ColumnResult, EvalError> {
        #[cfg(feature = "tracing")]
        let _span = tracing::info_span!("RANK", rows).entered();

        let values = args.get(0).map(|c| c.decimals(rows)).unwrap_or_default();
        Ok(ColumnResult::Column(
            stats::rank_average(&values).into_iter().map(decimal).collect(),
        ))
    }
}

/* ─────────────────────────── IIQR() ──────────────────────────── */

static ARG_IIQR: LazyLock<Vec<ParamSpec>> = LazyLock::new(|| {
    vec![
        ParamSpec::required("value").decimal(),
        ParamSpec::required("q1").decimal(),
        ParamSpec::required("q3").decimal(),
    ]
});

/// Distance outside the interquartile range, in units of that range.
///
/// Below `q1` the result is `(value - q1) / (q3 - q1)`, above `q3` it is
/// `(value - q3) / (q3 - q1)`, and inside the range it is 0. A missing
/// value stays missing.
#[derive(Debug)]
pub struct IiqrFn;

impl Function for IiqrFn {
    func_caps!(PURE, ROW_WISE, NUMERIC_ONLY);

    fn name(&self) -> &'static str {
        "IIQR"
    }
    fn params(&self) -> &'static [ParamSpec] {
        &ARG_IIQR[..]
    }
    fn eval_row(&self, _row: usize, args: &RowArgs, _ctx: &dyn FunctionContext) -> Result<Value, EvalError> {
        let (x, q1, q3) = (num(args.get(0)), num(args.get(1)), num(args.get(2)));
        if x.is_nan() {
            return Ok(decimal(f64::NAN));
        }
        let outside = if x < q1 {
            x - q1
        } else if x > q3 {
            x - q3
        } else {
            return Ok(decimal(0.0));
        };
        let iqr = q3 - q1;
        if iqr == 0.0 {
            return Err(EvalError::domain("IIQR with an empty interquartile range"));
        }
        Ok(decimal(outside / iqr))
    }
}

pub fn register_builtins() {
    crate::register_functions!(
        VMeanFn, VStdevFn, VVarFn, VSumFn, VMinFn, VMaxFn, VMedFn, VModeFn, VMadFn, VMadrFn,
        VSeFn, Q1Fn, Q3Fn, VnFn, VRowsFn, RankFn, IiqrFn, VBoxCoxLambdaFn, BoxCoxFn
    );
}
