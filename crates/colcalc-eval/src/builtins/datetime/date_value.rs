//! DATEVALUE and DATE: conversions between text and day numbers.

use crate::args::ParamSpec;
use crate::func_caps;
use crate::function::{Function, RowArgs};
use crate::traits::FunctionContext;
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use colcalc_common::{DataType, EvalError, MISSING_INT, MeasureType, OutputRule, Value};
use std::fmt::Write;
use std::sync::LazyLock;

const SECONDS_PER_DAY: i64 = 86_400;

/// The pattern argument, or the context default when it was omitted.
fn pattern<'a>(args: &'a RowArgs, ctx: &'a dyn FunctionContext) -> &'a str {
    match args.get(1) {
        Some(v) => v.as_text().unwrap_or(""),
        None => ctx.date_format(),
    }
}

/// Day number of `text` under `fmt`. Patterns without a time of day are
/// read as midnight.
pub fn parse_days(text: &str, fmt: &str) -> Option<i32> {
    let stamp = NaiveDateTime::parse_from_str(text, fmt)
        .or_else(|_| NaiveDate::parse_from_str(text, fmt).map(|d| d.and_time(NaiveTime::MIN)))
        .ok()?;
    let days = stamp.and_utc().timestamp().div_euclid(SECONDS_PER_DAY);
    i32::try_from(days).ok().filter(|d| *d != MISSING_INT)
}

/// Text for day number `days` under `fmt`; `None` for an invalid pattern or
/// an unrepresentable date.
pub fn format_days(days: i32, fmt: &str) -> Option<String> {
    let items: Vec<Item<'_>> = StrftimeItems::new(fmt).collect();
    if items.iter().any(|i| matches!(i, Item::Error)) {
        return None;
    }
    let stamp = DateTime::from_timestamp(i64::from(days) * SECONDS_PER_DAY, 0)?;
    let mut out = String::new();
    write!(out, "{}", stamp.format_with_items(items.iter())).ok()?;
    Some(out)
}

/* ─────────────────────────── DATEVALUE() ──────────────────────────── */

static ARG_DATEVALUE: LazyLock<Vec<ParamSpec>> = LazyLock::new(|| {
    vec![
        ParamSpec::required("x").text(),
        ParamSpec::absent("fmt").text(),
    ]
});

/// Days since 1970-01-01 (UTC) for a date written as text.
///
/// # Remarks
/// - `fmt` is a strftime pattern; without it the context default applies
///   (`%Y-%m-%d` unless configured otherwise).
/// - A time of day in the text is floored to its day.
/// - Text that does not match the pattern yields the missing integer.
///
/// [colcalc-docgen:schema:start]
/// Name: DATEVALUE
/// Type: DateValueFn
/// Mode: row-wise
/// Signature: DATEVALUE(x: text, fmt?: text)
/// Output: integer, continuous
/// [colcalc-docgen:schema:end]
#[derive(Debug)]
pub struct DateValueFn;

impl Function for DateValueFn {
    func_caps!(PURE, ROW_WISE);

    fn name(&self) -> &'static str {
        "DATEVALUE"
    }
    fn params(&self) -> &'static [ParamSpec] {
        &ARG_DATEVALUE[..]
    }
    fn output(&self) -> OutputRule {
        OutputRule::Fixed {
            data_type: DataType::Integer,
            measure: MeasureType::Continuous,
        }
    }
    fn eval_row(&self, _row: usize, args: &RowArgs, ctx: &dyn FunctionContext) -> Result<Value, EvalError> {
        let text = args.get(0).and_then(Value::as_text).unwrap_or("");
        if text.is_empty() {
            return Ok(Value::Int(MISSING_INT));
        }
        let days = parse_days(text, pattern(args, ctx)).unwrap_or(MISSING_INT);
        Ok(Value::Int(days))
    }
}

/* ─────────────────────────── DATE() ──────────────────────────── */

static ARG_DATE: LazyLock<Vec<ParamSpec>> = LazyLock::new(|| {
    vec![
        ParamSpec::required("x").integer(),
        ParamSpec::absent("fmt").text(),
    ]
});

/// Formats a day number as text; the inverse of DATEVALUE.
///
/// A missing day number, an invalid pattern or a date chrono cannot
/// represent all yield empty text.
#[derive(Debug)]
pub struct DateFn;

impl Function for DateFn {
    func_caps!(PURE, ROW_WISE);

    fn name(&self) -> &'static str {
        "DATE"
    }
    fn params(&self) -> &'static [ParamSpec] {
        &ARG_DATE[..]
    }
    fn output(&self) -> OutputRule {
        OutputRule::Fixed {
            data_type: DataType::Text,
            measure: MeasureType::Ordinal,
        }
    }
    fn eval_row(&self, _row: usize, args: &RowArgs, ctx: &dyn FunctionContext) -> Result<Value, EvalError> {
        let Some(days) = args.get(0).and_then(Value::as_i32) else {
            return Ok(Value::Text(String::new()));
        };
        Ok(Value::Text(format_days(days, pattern(args, ctx)).unwrap_or_default()))
    }
}

pub fn register_builtins() {
    crate::register_functions!(DateValueFn, DateFn);
}
