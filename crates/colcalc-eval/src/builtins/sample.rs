//! SAMPLE: keep a uniform random subset of rows.
use crate::args::ParamSpec;
use crate::func_caps;
use crate::function::{ColumnArgs, ColumnResult, Function};
use crate::rng::call_salt;
use crate::traits::FunctionContext;
use colcalc_common::{ArgSet, DataType, EvalError, MeasureType, OutputRule, Value};
use rand::Rng;
use std::sync::LazyLock;

static ARG_SAMPLE: LazyLock<Vec<ParamSpec>> = LazyLock::new(|| {
    vec![
        ParamSpec::required("v"),
        ParamSpec::required("n").integer(),
        ParamSpec::absent("otherwise"),
    ]
});

/// Mark exactly `n` of `len` positions, uniformly, by rejection sampling.
/// Expects `n <= len / 2` so that rejections stay rare.
fn mark(len: usize, n: usize, rng: &mut impl Rng) -> Vec<bool> {
    let mut mask = vec![false; len];
    let mut marked = 0;
    while marked < n {
        let i = rng.gen_range(0..len);
        if !mask[i] {
            mask[i] = true;
            marked += 1;
        }
    }
    mask
}

/// Keeps `n` rows of `v` chosen uniformly at random; the other rows take the
/// value of `otherwise` in the same row, or go missing.
///
/// # Remarks
/// - `n` is read from the first row only. Missing or negative `n` keeps no
///   rows; `n` at or above the row count keeps them all.
/// - Always samples the whole column, even in a grouped formula.
/// - When more than half the rows are kept, the rows to drop are drawn
///   instead.
///
/// [colcalc-docgen:schema:start]
/// Name: SAMPLE
/// Type: SampleFn
/// Mode: column-wise, ungrouped
/// Signature: SAMPLE(v, n: integer, otherwise?)
/// Output: from args [0, 2], else decimal, continuous
/// [colcalc-docgen:schema:end]
#[derive(Debug)]
pub struct SampleFn;

impl Function for SampleFn {
    func_caps!(VOLATILE, COLUMN_WISE, UNGROUPED);

    fn name(&self) -> &'static str {
        "SAMPLE"
    }
    fn params(&self) -> &'static [ParamSpec] {
        &ARG_SAMPLE[..]
    }
    fn output(&self) -> OutputRule {
        OutputRule::FromArgs {
            data_type: DataType::Decimal,
            measure: MeasureType::Continuous,
            sources: ArgSet::Indices(&[0, 2]),
        }
    }
    fn eval_column(
        &self,
        rows: usize,
        args: &ColumnArgs,
        ctx: &dyn FunctionContext,
    ) -> Result<ColumnResult, EvalError> {
        #[cfg(feature = "tracing")]
        let _span = tracing::info_span!("SAMPLE", rows).entered();

        let mut values = args
            .get(0)
            .map(|c| c.values(rows).into_owned())
            .unwrap_or_default();
        let len = values.len();
        if len == 0 {
            return Ok(ColumnResult::Column(values));
        }

        let n = args
            .get(1)
            .and_then(|c| c.first())
            .and_then(Value::as_i32)
            .map_or(0, |n| n.max(0) as usize);
        if n >= len {
            return Ok(ColumnResult::Column(values));
        }

        let invert = len - n < n;
        let draw = if invert { len - n } else { n };

        #[cfg(feature = "tracing")]
        tracing::debug!(len, n, invert, "sampling rows");

        let mut rng = ctx.rng_for(call_salt(self.name(), 0));
        let mask = mark(len, draw, &mut rng);

        let otherwise = args.get(2);
        for (i, v) in values.iter_mut().enumerate() {
            if mask[i] == invert {
                *v = match otherwise {
                    Some(o) => o.at(i),
                    None => Value::missing(v.data_type()),
                };
            }
        }
        Ok(ColumnResult::Column(values))
    }
}

pub fn register_builtins() {
    crate::register_functions!(SampleFn);
}
