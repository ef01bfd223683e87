//! Volatile functions drawing one variate per row: UNIF, NORM, BETA, GAMMA.
//!
//! Each row gets its own stream from the context, keyed by function and row,
//! so a seeded context reproduces a column exactly.
use super::utils::{decimal, num};
use crate::args::ParamSpec;
use crate::func_caps;
use crate::function::{Function, RowArgs};
use crate::rng::call_salt;
use crate::traits::FunctionContext;
use colcalc_common::{EvalError, Value};
use rand::Rng;
use rand::distributions::Distribution;
use rand::rngs::SmallRng;
use statrs::distribution::{Beta, Gamma, Normal};
use std::sync::LazyLock;

fn two_params(a: &'static str, da: f64, b: &'static str, db: f64) -> Vec<ParamSpec> {
    vec![
        ParamSpec::optional(a, da).decimal(),
        ParamSpec::optional(b, db).decimal(),
    ]
}

static ARG_UNIF: LazyLock<Vec<ParamSpec>> = LazyLock::new(|| two_params("a", 0.0, "b", 1.0));
static ARG_NORM: LazyLock<Vec<ParamSpec>> = LazyLock::new(|| two_params("mu", 0.0, "sd", 1.0));
static ARG_SHAPES: LazyLock<Vec<ParamSpec>> =
    LazyLock::new(|| two_params("alpha", 1.0, "beta", 1.0));

/// Both parameters, or `None` when either is missing.
fn params2(args: &RowArgs) -> Option<(f64, f64)> {
    let (a, b) = (num(args.get(0)), num(args.get(1)));
    (!a.is_nan() && !b.is_nan()).then_some((a, b))
}

fn stream(ctx: &dyn FunctionContext, name: &str, row: usize) -> SmallRng {
    ctx.rng_for(call_salt(name, row as u64))
}

/// Uniform variate on `[a, b)`.
#[derive(Debug)]
pub struct UnifFn;

impl Function for UnifFn {
    func_caps!(VOLATILE, ROW_WISE, NUMERIC_ONLY);

    fn name(&self) -> &'static str {
        "UNIF"
    }
    fn params(&self) -> &'static [ParamSpec] {
        &ARG_UNIF[..]
    }
    fn eval_row(&self, row: usize, args: &RowArgs, ctx: &dyn FunctionContext) -> Result<Value, EvalError> {
        let Some((a, b)) = params2(args) else {
            return Ok(decimal(f64::NAN));
        };
        let u: f64 = stream(ctx, self.name(), row).r#gen();
        Ok(decimal(a + (b - a) * u))
    }
}

/// Normal variate with mean `mu` and standard deviation `sd`.
#[derive(Debug)]
pub struct NormFn;

impl Function for NormFn {
    func_caps!(VOLATILE, ROW_WISE, NUMERIC_ONLY);

    fn name(&self) -> &'static str {
        "NORM"
    }
    fn params(&self) -> &'static [ParamSpec] {
        &ARG_NORM[..]
    }
    fn eval_row(&self, row: usize, args: &RowArgs, ctx: &dyn FunctionContext) -> Result<Value, EvalError> {
        let Some((mu, sd)) = params2(args) else {
            return Ok(decimal(f64::NAN));
        };
        let standard = Normal::new(0.0, 1.0)
            .map_err(|e| EvalError::domain(format!("NORM: {e}")))?;
        let z = standard.sample(&mut stream(ctx, self.name(), row));
        Ok(decimal(mu + sd * z))
    }
}

/// Beta variate; both shapes must be positive.
#[derive(Debug)]
pub struct BetaFn;

impl Function for BetaFn {
    func_caps!(VOLATILE, ROW_WISE, NUMERIC_ONLY);

    fn name(&self) -> &'static str {
        "BETA"
    }
    fn params(&self) -> &'static [ParamSpec] {
        &ARG_SHAPES[..]
    }
    fn eval_row(&self, row: usize, args: &RowArgs, ctx: &dyn FunctionContext) -> Result<Value, EvalError> {
        let Some((alpha, beta)) = params2(args) else {
            return Ok(decimal(f64::NAN));
        };
        let dist = Beta::new(alpha, beta)
            .map_err(|e| EvalError::domain(format!("BETA({alpha}, {beta}): {e}")))?;
        Ok(decimal(dist.sample(&mut stream(ctx, self.name(), row))))
    }
}

/// Gamma variate with shape `alpha` and scale `beta`.
#[derive(Debug)]
pub struct GammaFn;

impl Function for GammaFn {
    func_caps!(VOLATILE, ROW_WISE, NUMERIC_ONLY);

    fn name(&self) -> &'static str {
        "GAMMA"
    }
    fn params(&self) -> &'static [ParamSpec] {
        &ARG_SHAPES[..]
    }
    fn eval_row(&self, row: usize, args: &RowArgs, ctx: &dyn FunctionContext) -> Result<Value, EvalError> {
        let Some((alpha, beta)) = params2(args) else {
            return Ok(decimal(f64::NAN));
        };
        if beta <= 0.0 {
            return Err(EvalError::domain(format!("GAMMA scale must be positive, got {beta}")));
        }
        let dist = Gamma::new(alpha, 1.0 / beta)
            .map_err(|e| EvalError::domain(format!("GAMMA({alpha}, {beta}): {e}")))?;
        Ok(decimal(dist.sample(&mut stream(ctx, self.name(), row))))
    }
}

pub fn register_builtins() {
    crate::register_functions!(UnifFn, NormFn, BetaFn, GammaFn);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::{Call, bind};
    use crate::test_table::TestTable;
    use colcalc_common::EvalErrorKind;

    fn draw(f: &dyn Function, args: Vec<Value>, seed: u64, row: usize) -> Result<Value, EvalError> {
        let bound = bind(f.name(), f.params(), Call::new(args)).unwrap();
        f.eval_row(row, &bound, &TestTable::new().with_seed(seed).context())
    }

    fn x(v: Value) -> f64 {
        v.as_f64().expect("a number")
    }

    #[test]
    fn seeded_draws_replay() {
        let a = draw(&NormFn, vec![], 11, 3).unwrap();
        let b = draw(&NormFn, vec![], 11, 3).unwrap();
        assert_eq!(a, b);
        let c = draw(&NormFn, vec![], 11, 4).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn unif_stays_in_range() {
        for row in 0..200 {
            let v = x(draw(&UnifFn, vec![Value::Int(5), Value::Int(7)], 1, row).unwrap());
            assert!((5.0..7.0).contains(&v), "{v}");
        }
    }

    #[test]
    fn beta_in_unit_interval_and_gamma_positive() {
        for row in 0..100 {
            let b = x(draw(&BetaFn, vec![Value::Decimal(2.0), Value::Decimal(5.0)], 2, row).unwrap());
            assert!((0.0..=1.0).contains(&b));
            let g = x(draw(&GammaFn, vec![Value::Decimal(2.0), Value::Decimal(3.0)], 2, row).unwrap());
            assert!(g > 0.0);
        }
    }

    #[test]
    fn bad_parameters() {
        let err = draw(&BetaFn, vec![Value::Decimal(-1.0)], 0, 0).unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::Domain);
        let err = draw(&GammaFn, vec![Value::Decimal(1.0), Value::Decimal(0.0)], 0, 0).unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::Domain);
        let v = draw(&UnifFn, vec![Value::Decimal(f64::NAN)], 0, 0).unwrap();
        assert!(v.is_missing(false));
    }
}
