//! SPLIT and CONTAINS: substring work on text arguments.
use crate::args::ParamSpec;
use crate::func_caps;
use crate::function::{Function, RowArgs};
use crate::traits::FunctionContext;
use colcalc_common::{DataType, EvalError, MISSING_INT, MeasureType, OutputRule, Value};
use smallvec::SmallVec;
use std::sync::LazyLock;

fn text_arg(v: Option<&Value>) -> &str {
    v.and_then(Value::as_text).unwrap_or("")
}

const TEXT_NOMINAL: OutputRule = OutputRule::Fixed {
    data_type: DataType::Text,
    measure: MeasureType::Nominal,
};

/* ─────────────────────────── SPLIT() ──────────────────────────── */

static ARG_SPLIT: LazyLock<Vec<ParamSpec>> = LazyLock::new(|| {
    vec![
        ParamSpec::required("x").text(),
        ParamSpec::optional("sep", ",").text(),
        ParamSpec::optional("piece", MISSING_INT).integer(),
    ]
});

/// Splits `x` on `sep` and returns the `piece`-th (1-based) part.
///
/// # Remarks
/// - Without `piece`, the parts are rejoined with single spaces.
/// - A non-positive or out-of-range `piece` yields empty text.
/// - An empty separator leaves `x` whole.
///
/// [colcalc-docgen:schema:start]
/// Name: SPLIT
/// Type: SplitFn
/// Mode: row-wise
/// Signature: SPLIT(x: text, sep: text = ",", piece: integer = missing)
/// Output: text, nominal
/// [colcalc-docgen:schema:end]
#[derive(Debug)]
pub struct SplitFn;

impl Function for SplitFn {
    func_caps!(PURE, ROW_WISE);

    fn name(&self) -> &'static str {
        "SPLIT"
    }
    fn params(&self) -> &'static [ParamSpec] {
        &ARG_SPLIT[..]
    }
    fn output(&self) -> OutputRule {
        TEXT_NOMINAL
    }
    fn eval_row(&self, _row: usize, args: &RowArgs, _ctx: &dyn FunctionContext) -> Result<Value, EvalError> {
        let x = text_arg(args.get(0));
        let sep = text_arg(args.get(1));
        let pieces: SmallVec<[&str; 8]> = if sep.is_empty() {
            SmallVec::from_slice(&[x])
        } else {
            x.split(sep).collect()
        };

        let piece = args.get(2).and_then(Value::as_i32);
        let out = match piece {
            None => pieces.join(" "),
            Some(p) if p <= 0 => String::new(),
            Some(p) => pieces
                .get(p as usize - 1)
                .map(|s| s.to_string())
                .unwrap_or_default(),
        };
        Ok(Value::Text(out))
    }
}

/* ─────────────────────────── CONTAINS() ──────────────────────────── */

const HAYSTACK_KEYWORDS: [&str; 8] = ["in2", "in3", "in4", "in5", "in6", "in7", "in8", "in9"];

static ARG_CONTAINS: LazyLock<Vec<ParamSpec>> = LazyLock::new(|| {
    let mut params = vec![
        ParamSpec::required("item1").text(),
        ParamSpec::required("in1").text(),
        ParamSpec::variadic("args").text(),
    ];
    params.extend(HAYSTACK_KEYWORDS.iter().map(|k| ParamSpec::keyword(*k, "").text()));
    params
});

/// 1 when any needle occurs in any haystack, else 0.
///
/// The positional arguments are the needles except the last one, which is
/// searched first; the `in2`…`in9` keywords are searched after it. So
/// `CONTAINS("a", "b", "cat")` looks for `"a"` and `"b"` in `"cat"`.
/// An empty (missing) needle occurs in every haystack.
#[derive(Debug)]
pub struct ContainsFn;

impl Function for ContainsFn {
    func_caps!(PURE, ROW_WISE);

    fn name(&self) -> &'static str {
        "CONTAINS"
    }
    fn params(&self) -> &'static [ParamSpec] {
        &ARG_CONTAINS[..]
    }
    fn output(&self) -> OutputRule {
        OutputRule::Fixed {
            data_type: DataType::Integer,
            measure: MeasureType::Nominal,
        }
    }
    fn eval_row(&self, _row: usize, args: &RowArgs, _ctx: &dyn FunctionContext) -> Result<Value, EvalError> {
        let mut needles: SmallVec<[&str; 4]> = args.first_and_rest().map(|v| text_arg(Some(v))).collect();
        needles.insert(1, text_arg(args.get(1)));
        let Some(first_haystack) = needles.pop() else {
            return Ok(Value::Int(0));
        };

        let mut haystacks: SmallVec<[&str; 9]> = SmallVec::new();
        haystacks.push(first_haystack);
        haystacks.extend(HAYSTACK_KEYWORDS.iter().map(|k| text_arg(args.keyword(k))));

        let found = needles
            .iter()
            .any(|n| haystacks.iter().any(|h| h.contains(*n)));
        Ok(Value::Int(found as i32))
    }
}

pub fn register_builtins() {
    crate::register_functions!(SplitFn, ContainsFn);
}
