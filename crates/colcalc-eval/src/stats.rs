//! Numeric primitives shared by the statistical builtins.
//!
//! Inputs are plain `f64` slices that the caller has already filtered of
//! missing values where the function's contract says so. Preconditions a
//! caller can violate (too few values, non-positive data) come back as
//! `EvalError`s of kind `Empty` or `Domain`.

use colcalc_common::EvalError;
use rustc_hash::FxHashMap;

/// Compensated (Neumaier) summation.
pub fn fsum(values: impl IntoIterator<Item = f64>) -> f64 {
    let mut sum = 0.0_f64;
    let mut comp = 0.0_f64;
    let mut naive = 0.0_f64;
    for x in values {
        naive += x;
        let t = sum + x;
        if sum.abs() >= x.abs() {
            comp += (sum - t) + x;
        } else {
            comp += (x - t) + sum;
        }
        sum = t;
    }
    // Compensation is meaningless once an infinity or NaN has been added.
    if naive.is_finite() { sum + comp } else { naive }
}

pub fn mean(values: &[f64]) -> Result<f64, EvalError> {
    if values.is_empty() {
        return Err(EvalError::empty("mean requires at least one value"));
    }
    Ok(fsum(values.iter().copied()) / values.len() as f64)
}

/// Sample variance (n - 1 denominator).
pub fn variance(values: &[f64]) -> Result<f64, EvalError> {
    if values.len() < 2 {
        return Err(EvalError::empty("variance requires at least two values"));
    }
    let m = mean(values)?;
    let ss = fsum(values.iter().map(|x| (x - m) * (x - m)));
    Ok(ss / (values.len() - 1) as f64)
}

pub fn stdev(values: &[f64]) -> Result<f64, EvalError> {
    variance(values).map(f64::sqrt)
}

/// Population variance; zero for a single value.
fn pvariance(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let m = fsum(values.iter().copied()) / n;
    fsum(values.iter().map(|x| (x - m) * (x - m))) / n
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut v = values.to_vec();
    v.sort_by(f64::total_cmp);
    v
}

pub fn median(values: &[f64]) -> Result<f64, EvalError> {
    if values.is_empty() {
        return Err(EvalError::empty("median requires at least one value"));
    }
    let v = sorted(values);
    let mid = v.len() / 2;
    if v.len() % 2 == 1 {
        Ok(v[mid])
    } else {
        Ok((v[mid - 1] + v[mid]) / 2.0)
    }
}

/// Most frequent value; ties go to the value seen first.
pub fn mode(values: &[f64]) -> Result<f64, EvalError> {
    let mut counts: FxHashMap<u64, (usize, usize)> = FxHashMap::default();
    for (i, &x) in values.iter().enumerate() {
        let x = if x == 0.0 { 0.0 } else { x };
        counts.entry(x.to_bits()).or_insert((0, i)).0 += 1;
    }
    counts
        .into_iter()
        .max_by(|(_, (ca, fa)), (_, (cb, fb))| ca.cmp(cb).then(fb.cmp(fa)))
        .map(|(bits, _)| f64::from_bits(bits))
        .ok_or_else(|| EvalError::empty("mode requires at least one value"))
}

/// Quantile by linear interpolation between closest ranks, `p` in `[0, 1]`.
pub fn quantile(values: &[f64], p: f64) -> Result<f64, EvalError> {
    if values.is_empty() {
        return Err(EvalError::empty("quantile requires at least one value"));
    }
    if !(0.0..=1.0).contains(&p) {
        return Err(EvalError::domain(format!("quantile {p} outside [0, 1]")));
    }
    let v = sorted(values);
    if v.len() == 1 {
        return Ok(v[0]);
    }
    let rank = p * (v.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return Ok(v[lo]);
    }
    let frac = rank - lo as f64;
    Ok(v[lo] + (v[hi] - v[lo]) * frac)
}

/// Median absolute deviation from the median.
pub fn mad(values: &[f64]) -> Result<f64, EvalError> {
    let m = median(values)?;
    let dev: Vec<f64> = values.iter().map(|x| (x - m).abs()).collect();
    median(&dev)
}

/// 1-based ranks, ties receiving the average of the ranks they span. `NaN`
/// entries are left out of the ranking and stay `NaN`.
pub fn rank_average(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).filter(|&i| !values[i].is_nan()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![f64::NAN; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && values[order[end]] == values[order[start]] {
            end += 1;
        }
        // ranks start+1 ..= end share their mean
        let avg = (start + 1 + end) as f64 / 2.0;
        for &i in &order[start..end] {
            ranks[i] = avg;
        }
        start = end;
    }
    ranks
}

/* ───────────────────────────── Box-Cox ───────────────────────────── */

pub fn ln_checked(x: f64) -> Result<f64, EvalError> {
    if x > 0.0 {
        Ok(x.ln())
    } else {
        Err(EvalError::domain(format!("logarithm of non-positive value {x}")))
    }
}

/// Box-Cox transform of a single positive value.
pub fn boxcox_transform(x: f64, lmbda: f64) -> f64 {
    if lmbda == 0.0 {
        x.ln()
    } else {
        (x.powf(lmbda) - 1.0) / lmbda
    }
}

/// Box-Cox profile log-likelihood of `lmbda` for positive data.
pub fn boxcox_llf(lmbda: f64, values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let log_sum = fsum(values.iter().map(|x| x.ln()));
    let y: Vec<f64> = values.iter().map(|&x| boxcox_transform(x, lmbda)).collect();
    (lmbda - 1.0) * log_sum - n / 2.0 * pvariance(&y).ln()
}

const GOLD: f64 = 1.618_034;
const GROW_LIMIT: f64 = 110.0;
const TINY: f64 = 1e-21;
const BRACKET_MAX_ITER: usize = 1000;
const BRENT_TOL: f64 = 1.48e-8;
const BRENT_MIN_TOL: f64 = 1.0e-11;
const BRENT_MAX_ITER: usize = 500;
const CGOLD: f64 = 0.381_966_0;

/// Downhill bracketing from `(xa, xb)`: returns `(a, b, c)` with
/// `f(b) <= f(a)` and `f(b) <= f(c)`.
fn bracket(f: &impl Fn(f64) -> f64, xa: f64, xb: f64) -> Result<(f64, f64, f64, f64), EvalError> {
    let (mut xa, mut xb) = (xa, xb);
    let (mut fa, mut fb) = (f(xa), f(xb));
    if fa < fb {
        std::mem::swap(&mut xa, &mut xb);
        std::mem::swap(&mut fa, &mut fb);
    }
    let mut xc = xb + GOLD * (xb - xa);
    let mut fc = f(xc);
    let mut iter = 0;
    while fc < fb {
        let tmp1 = (xb - xa) * (fb - fc);
        let tmp2 = (xb - xc) * (fb - fa);
        let val = tmp2 - tmp1;
        let denom = if val.abs() < TINY { 2.0 * TINY } else { 2.0 * val };
        let mut w = xb - ((xb - xc) * tmp2 - (xb - xa) * tmp1) / denom;
        let wlim = xb + GROW_LIMIT * (xc - xb);
        if iter > BRACKET_MAX_ITER {
            return Err(EvalError::domain("no minimum could be bracketed"));
        }
        iter += 1;
        let mut fw;
        if (w - xc) * (xb - w) > 0.0 {
            fw = f(w);
            if fw < fc {
                return Ok((xb, w, xc, fw));
            } else if fw > fb {
                return Ok((xa, xb, w, fb));
            }
            w = xc + GOLD * (xc - xb);
            fw = f(w);
        } else if (w - wlim) * (wlim - xc) >= 0.0 {
            w = wlim;
            fw = f(w);
        } else if (w - wlim) * (xc - w) > 0.0 {
            fw = f(w);
            if fw < fc {
                xb = xc;
                xc = w;
                w = xc + GOLD * (xc - xb);
                fb = fc;
                fc = fw;
                fw = f(w);
            }
        } else {
            w = xc + GOLD * (xc - xb);
            fw = f(w);
        }
        xa = xb;
        xb = xc;
        xc = w;
        fa = fb;
        fb = fc;
        fc = fw;
    }
    Ok((xa, xb, xc, fb))
}

/// Brent's parabolic minimisation inside a bracket.
fn brent(f: &impl Fn(f64) -> f64, xa: f64, xb: f64, xc: f64, fb: f64) -> f64 {
    let (mut a, mut b) = if xa < xc { (xa, xc) } else { (xc, xa) };
    let (mut x, mut w, mut v) = (xb, xb, xb);
    let (mut fx, mut fw, mut fv) = (fb, fb, fb);
    let mut deltax: f64 = 0.0;
    let mut rat: f64 = 0.0;

    for _ in 0..BRENT_MAX_ITER {
        let tol1 = BRENT_TOL * x.abs() + BRENT_MIN_TOL;
        let tol2 = 2.0 * tol1;
        let xmid = 0.5 * (a + b);
        if (x - xmid).abs() < tol2 - 0.5 * (b - a) {
            break;
        }
        if deltax.abs() <= tol1 {
            deltax = if x >= xmid { a - x } else { b - x };
            rat = CGOLD * deltax;
        } else {
            let tmp1 = (x - w) * (fx - fv);
            let mut tmp2 = (x - v) * (fx - fw);
            let mut p = (x - v) * tmp2 - (x - w) * tmp1;
            tmp2 = 2.0 * (tmp2 - tmp1);
            if tmp2 > 0.0 {
                p = -p;
            }
            tmp2 = tmp2.abs();
            let dx_prev = deltax;
            deltax = rat;
            if p > tmp2 * (a - x) && p < tmp2 * (b - x) && p.abs() < (0.5 * tmp2 * dx_prev).abs() {
                rat = p / tmp2;
                let u = x + rat;
                if (u - a) < tol2 || (b - u) < tol2 {
                    rat = if xmid - x >= 0.0 { tol1 } else { -tol1 };
                }
            } else {
                deltax = if x >= xmid { a - x } else { b - x };
                rat = CGOLD * deltax;
            }
        }
        let u = if rat.abs() < tol1 {
            if rat >= 0.0 { x + tol1 } else { x - tol1 }
        } else {
            x + rat
        };
        let fu = f(u);
        if fu > fx {
            if u < x {
                a = u;
            } else {
                b = u;
            }
            if fu <= fw || w == x {
                v = w;
                w = u;
                fv = fw;
                fw = fu;
            } else if fu <= fv || v == x || v == w {
                v = u;
                fv = fu;
            }
        } else {
            if u >= x {
                a = x;
            } else {
                b = x;
            }
            v = w;
            w = x;
            x = u;
            fv = fw;
            fw = fx;
            fx = fu;
        }
    }
    x
}

/// Maximum-likelihood Box-Cox lambda.
pub fn boxcox_lambda(values: &[f64]) -> Result<f64, EvalError> {
    if values.is_empty() {
        return Err(EvalError::empty("Box-Cox lambda of no values"));
    }
    if values.iter().any(|&x| x <= 0.0) {
        return Err(EvalError::domain("Box-Cox data must be positive"));
    }
    let first = values[0];
    if values.iter().all(|&x| x == first) {
        return Err(EvalError::domain("Box-Cox data must not be constant"));
    }
    let objective = |l: f64| {
        let llf = boxcox_llf(l, values);
        if llf.is_finite() { -llf } else { f64::INFINITY }
    };
    let (a, b, c, fb) = bracket(&objective, -2.0, 2.0)?;
    Ok(brent(&objective, a, b, c, fb))
}

#[cfg(test)]
mod tests {
    use super::*;
    use colcalc_common::EvalErrorKind;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn fsum_compensates() {
        let v = [1e16, 1.0, -1e16];
        assert_eq!(fsum(v), 1.0);
        assert_eq!(fsum([0.1; 10]), 1.0);
        assert!(fsum([f64::INFINITY, 1.0]).is_infinite());
    }

    #[test]
    fn moments() {
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!(close(mean(&v).unwrap(), 5.0));
        assert!(close(variance(&v).unwrap(), 32.0 / 7.0));
        assert_eq!(variance(&[1.0]).unwrap_err().kind, EvalErrorKind::Empty);
        assert_eq!(mean(&[]).unwrap_err().kind, EvalErrorKind::Empty);
    }

    #[test]
    fn median_mode_quantile() {
        assert_eq!(median(&[3.0, 1.0, 2.0]).unwrap(), 2.0);
        assert_eq!(median(&[4.0, 1.0, 2.0, 3.0]).unwrap(), 2.5);
        assert_eq!(mode(&[3.0, 1.0, 1.0, 3.0, 2.0]).unwrap(), 3.0);
        assert_eq!(mode(&[-0.0, 0.0, 5.0]).unwrap(), 0.0);
        assert!(close(quantile(&[1.0, 2.0, 3.0, 4.0], 0.25).unwrap(), 1.75));
        assert!(close(quantile(&[1.0, 2.0, 3.0, 4.0], 0.75).unwrap(), 3.25));
        assert!(close(mad(&[1.0, 1.0, 2.0, 2.0, 4.0, 6.0, 9.0]).unwrap(), 1.0));
    }

    #[test]
    fn ranks_average_ties_and_keep_nan() {
        let r = rank_average(&[10.0, f64::NAN, 20.0, 10.0, 5.0]);
        assert_eq!(r[0], 2.5);
        assert!(r[1].is_nan());
        assert_eq!(r[2], 4.0);
        assert_eq!(r[3], 2.5);
        assert_eq!(r[4], 1.0);
    }

    #[test]
    fn boxcox_lambda_maximises_llf() {
        let v = [1.0, 2.0, 3.0, 4.0, 5.0, 8.0, 13.0, 21.0, 34.0];
        let l = boxcox_lambda(&v).unwrap();
        assert!(l.is_finite());
        let best = boxcox_llf(l, &v);
        assert!(best >= boxcox_llf(l + 0.05, &v));
        assert!(best >= boxcox_llf(l - 0.05, &v));
    }

    #[test]
    fn boxcox_lambda_of_lognormal_shape_is_near_zero() {
        let v: Vec<f64> = (-5..=5).map(|k| (k as f64 * 0.4).exp()).collect();
        let l = boxcox_lambda(&v).unwrap();
        assert!(l.abs() < 1e-3, "lambda {l}");

        let v: Vec<f64> = (1..=10).map(f64::from).collect();
        let l = boxcox_lambda(&v).unwrap();
        assert!((l - 0.72196).abs() < 1e-4, "lambda {l}");
    }

    #[test]
    fn boxcox_lambda_rejects_bad_data() {
        assert_eq!(boxcox_lambda(&[1.0, -1.0]).unwrap_err().kind, EvalErrorKind::Domain);
        assert_eq!(boxcox_lambda(&[2.0, 2.0]).unwrap_err().kind, EvalErrorKind::Domain);
        assert_eq!(boxcox_lambda(&[]).unwrap_err().kind, EvalErrorKind::Empty);
        assert_eq!(ln_checked(0.0).unwrap_err().kind, EvalErrorKind::Domain);
    }
}
