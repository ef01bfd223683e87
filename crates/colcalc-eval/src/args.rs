//! Parameter declarations and the binding step that turns a call's
//! positional and keyword arguments into a fixed-shape argument list.
//!
//! Binding is generic over the argument representation: the dispatcher binds
//! whole argument columns once, then projects each row out of the bound
//! columns for row-wise functions.

use crate::traits::ArgColumn;
use colcalc_common::{DataType, EvalError, EvalErrorKind, Value};
use smallvec::SmallVec;
use thiserror::Error;

/// Where an omitted optional parameter gets its value from.
#[derive(Clone, Debug, PartialEq)]
pub enum ParamDefault {
    /// A literal default.
    Value(Value),
    /// No value; the function decides what absence means.
    Absent,
    /// Computed by running the named column-wise function over the first
    /// argument column of the same call.
    Derived(&'static str),
}

#[derive(Clone, Debug, PartialEq)]
pub enum ParamKind {
    Required,
    Optional(ParamDefault),
    /// Collects every remaining positional argument.
    Variadic,
    /// Only settable by name; never part of the variadic tail.
    Keyword(Value),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    /// Storage type the argument is converted to before the body runs.
    pub coercion: Option<DataType>,
}

impl ParamSpec {
    pub fn required(name: &'static str) -> Self {
        Self {
            name,
            kind: ParamKind::Required,
            coercion: None,
        }
    }

    pub fn optional(name: &'static str, default: impl Into<Value>) -> Self {
        Self {
            name,
            kind: ParamKind::Optional(ParamDefault::Value(default.into())),
            coercion: None,
        }
    }

    pub fn absent(name: &'static str) -> Self {
        Self {
            name,
            kind: ParamKind::Optional(ParamDefault::Absent),
            coercion: None,
        }
    }

    pub fn derived(name: &'static str, function: &'static str) -> Self {
        Self {
            name,
            kind: ParamKind::Optional(ParamDefault::Derived(function)),
            coercion: None,
        }
    }

    pub fn variadic(name: &'static str) -> Self {
        Self {
            name,
            kind: ParamKind::Variadic,
            coercion: None,
        }
    }

    pub fn keyword(name: &'static str, default: impl Into<Value>) -> Self {
        Self {
            name,
            kind: ParamKind::Keyword(default.into()),
            coercion: None,
        }
    }

    pub fn decimal(mut self) -> Self {
        self.coercion = Some(DataType::Decimal);
        self
    }

    pub fn integer(mut self) -> Self {
        self.coercion = Some(DataType::Integer);
        self
    }

    pub fn text(mut self) -> Self {
        self.coercion = Some(DataType::Text);
        self
    }

    pub fn is_keyword(&self) -> bool {
        matches!(self.kind, ParamKind::Keyword(_))
    }

    pub fn is_variadic(&self) -> bool {
        matches!(self.kind, ParamKind::Variadic)
    }
}

/// Positional arity implied by a parameter list: `(min, max)`, `max` is
/// `None` when a variadic parameter is present.
pub fn arity(params: &[ParamSpec]) -> (usize, Option<usize>) {
    let min = params
        .iter()
        .filter(|p| matches!(p.kind, ParamKind::Required))
        .count();
    if params.iter().any(ParamSpec::is_variadic) {
        (min, None)
    } else {
        (min, Some(params.iter().filter(|p| !p.is_keyword()).count()))
    }
}

/// The parameter that receives positional argument `index`.
pub fn param_for_position(params: &[ParamSpec], index: usize) -> Option<&ParamSpec> {
    params
        .iter()
        .filter(|p| !p.is_keyword())
        .enumerate()
        .find(|(i, p)| p.is_variadic() || *i == index)
        .map(|(_, p)| p)
}

/// Argument representations the binder can work with.
pub trait Bindable: Clone {
    fn from_default(value: Value) -> Self;
    fn coerce_to(self, target: DataType) -> Self;
}

impl Bindable for Value {
    fn from_default(value: Value) -> Self {
        value
    }

    fn coerce_to(self, target: DataType) -> Self {
        if self.data_type() == target {
            self
        } else {
            self.coerce(target)
        }
    }
}

impl Bindable for ArgColumn {
    fn from_default(value: Value) -> Self {
        ArgColumn::Constant(value)
    }

    fn coerce_to(self, target: DataType) -> Self {
        match self {
            ArgColumn::Constant(v) => ArgColumn::Constant(v.coerce_to(target)),
            ArgColumn::Values(vs) => {
                if vs.iter().all(|v| v.data_type() == target) {
                    ArgColumn::Values(vs)
                } else {
                    ArgColumn::Values(vs.into_iter().map(|v| v.coerce_to(target)).collect())
                }
            }
        }
    }
}

/// Arguments as supplied by the caller.
#[derive(Clone, Debug, PartialEq)]
pub struct Call<T> {
    pub positional: Vec<T>,
    pub keywords: Vec<(String, T)>,
}

impl<T> Default for Call<T> {
    fn default() -> Self {
        Self {
            positional: Vec::new(),
            keywords: Vec::new(),
        }
    }
}

impl<T> Call<T> {
    pub fn new(positional: Vec<T>) -> Self {
        Self {
            positional,
            keywords: Vec::new(),
        }
    }

    pub fn with_keyword(mut self, name: impl Into<String>, value: T) -> Self {
        self.keywords.push((name.into(), value));
        self
    }
}

/// Arguments after binding.
///
/// `slots` holds one entry per declared non-variadic positional parameter
/// (`None` when omitted without a literal default), `rest` the variadic
/// tail and `keywords` every keyword parameter with defaults applied.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundArgs<T> {
    slots: SmallVec<[Option<T>; 4]>,
    rest: Vec<T>,
    keywords: SmallVec<[(&'static str, T); 2]>,
    pending: SmallVec<[(usize, &'static str); 1]>,
}

impl<T> BoundArgs<T> {
    pub fn get(&self, slot: usize) -> Option<&T> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    pub fn rest(&self) -> &[T] {
        &self.rest
    }

    pub fn keyword(&self, name: &str) -> Option<&T> {
        self.keywords.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    /// First slot followed by the variadic tail; the shape of `f(arg0, *args)`.
    pub fn first_and_rest(&self) -> impl Iterator<Item = &T> {
        self.get(0).into_iter().chain(self.rest.iter())
    }

    /// Slots still waiting for a derived default, with the function that
    /// computes each.
    pub fn pending(&self) -> &[(usize, &'static str)] {
        &self.pending
    }

    pub fn resolve(&mut self, slot: usize, value: T) {
        if let Some(s) = self.slots.get_mut(slot) {
            *s = Some(value);
        }
        self.pending.retain(|(i, _)| *i != slot);
    }

    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> BoundArgs<U> {
        BoundArgs {
            slots: self.slots.iter().map(|s| s.as_ref().map(&mut f)).collect(),
            rest: self.rest.iter().map(&mut f).collect(),
            keywords: self.keywords.iter().map(|(n, v)| (*n, f(v))).collect(),
            pending: self.pending.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    #[error("{function} expects at least {min} argument(s), got {got}")]
    TooFew {
        function: &'static str,
        min: usize,
        got: usize,
    },
    #[error("{function} expects at most {max} argument(s), got {got}")]
    TooMany {
        function: &'static str,
        max: usize,
        got: usize,
    },
    #[error("{function} has no parameter named `{keyword}`")]
    UnknownKeyword {
        function: &'static str,
        keyword: String,
    },
    #[error("{function}: `{keyword}` given more than once")]
    DuplicateKeyword {
        function: &'static str,
        keyword: String,
    },
}

impl From<BindError> for EvalError {
    fn from(e: BindError) -> Self {
        EvalError::new(EvalErrorKind::Arity).with_message(e.to_string())
    }
}

fn coerce<T: Bindable>(spec: &ParamSpec, value: T) -> T {
    match spec.coercion {
        Some(dt) => value.coerce_to(dt),
        None => value,
    }
}

/// Bind a call against a parameter list.
pub fn bind<T: Bindable>(
    function: &'static str,
    params: &[ParamSpec],
    call: Call<T>,
) -> Result<BoundArgs<T>, BindError> {
    let got = call.positional.len();
    let (min, max) = arity(params);
    if got < min {
        return Err(BindError::TooFew { function, min, got });
    }
    if let Some(max) = max {
        if got > max {
            return Err(BindError::TooMany { function, max, got });
        }
    }

    let mut slots: SmallVec<[Option<T>; 4]> = SmallVec::new();
    let mut rest = Vec::new();
    let mut pending: SmallVec<[(usize, &'static str); 1]> = SmallVec::new();
    let mut supplied = call.positional.into_iter();

    for spec in params.iter().filter(|p| !p.is_keyword()) {
        if spec.is_variadic() {
            rest.extend(supplied.by_ref().map(|v| coerce(spec, v)));
            break;
        }
        let slot = match (supplied.next(), &spec.kind) {
            (Some(v), _) => Some(coerce(spec, v)),
            (None, ParamKind::Optional(ParamDefault::Value(d))) => {
                Some(coerce(spec, T::from_default(d.clone())))
            }
            (None, ParamKind::Optional(ParamDefault::Derived(f))) => {
                pending.push((slots.len(), *f));
                None
            }
            (None, _) => None,
        };
        slots.push(slot);
    }

    let mut given = call.keywords;
    let mut keywords: SmallVec<[(&'static str, T); 2]> = SmallVec::new();
    for spec in params.iter().filter(|p| p.is_keyword()) {
        let mut matches = given.iter().filter(|(n, _)| n == spec.name);
        let found = matches.next().map(|(_, v)| v.clone());
        if matches.next().is_some() {
            return Err(BindError::DuplicateKeyword {
                function,
                keyword: spec.name.to_string(),
            });
        }
        let value = match (found, &spec.kind) {
            (Some(v), _) => v,
            (None, ParamKind::Keyword(d)) => T::from_default(d.clone()),
            (None, _) => continue,
        };
        keywords.push((spec.name, coerce(spec, value)));
        given.retain(|(n, _)| n != spec.name);
    }
    if let Some((name, _)) = given.into_iter().next() {
        return Err(BindError::UnknownKeyword {
            function,
            keyword: name,
        });
    }

    Ok(BoundArgs {
        slots,
        rest,
        keywords,
        pending,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use colcalc_common::MISSING_INT;

    fn sum_params() -> Vec<ParamSpec> {
        vec![
            ParamSpec::required("arg0").decimal(),
            ParamSpec::variadic("args").decimal(),
            ParamSpec::keyword("ignore_missing", 0).integer(),
            ParamSpec::keyword("min_valid", 0).integer(),
        ]
    }

    #[test]
    fn variadic_tail_excludes_keywords() {
        let call = Call::new(vec![Value::Int(1), Value::Int(2), Value::Decimal(3.5)])
            .with_keyword("min_valid", Value::Int(2));
        let b = bind("SUM", &sum_params(), call).unwrap();
        assert_eq!(b.get(0), Some(&Value::Decimal(1.0)));
        assert_eq!(b.rest(), &[Value::Decimal(2.0), Value::Decimal(3.5)]);
        assert_eq!(b.keyword("min_valid"), Some(&Value::Int(2)));
        assert_eq!(b.keyword("ignore_missing"), Some(&Value::Int(0)));
    }

    #[test]
    fn defaults_fill_omitted_optionals() {
        let params = vec![
            ParamSpec::required("cond").integer(),
            ParamSpec::optional("x", 1),
            ParamSpec::optional("y", MISSING_INT),
        ];
        let b = bind("IF", &params, Call::new(vec![Value::Int(1)])).unwrap();
        assert_eq!(b.get(1), Some(&Value::Int(1)));
        assert_eq!(b.get(2), Some(&Value::Int(MISSING_INT)));
    }

    #[test]
    fn absent_and_derived_defaults() {
        let params = vec![
            ParamSpec::required("x").decimal(),
            ParamSpec::derived("lmbda", "VBOXCOXLAMBDA").decimal(),
            ParamSpec::absent("fmt"),
        ];
        let mut b = bind("T", &params, Call::new(vec![Value::Int(3)])).unwrap();
        assert_eq!(b.get(1), None);
        assert_eq!(b.get(2), None);
        assert_eq!(b.pending(), &[(1, "VBOXCOXLAMBDA")]);
        b.resolve(1, Value::Decimal(0.5));
        assert!(b.pending().is_empty());
        assert_eq!(b.get(1), Some(&Value::Decimal(0.5)));
    }

    #[test]
    fn arity_and_keyword_errors() {
        let params = sum_params();
        assert!(matches!(
            bind::<Value>("SUM", &params, Call::new(vec![])),
            Err(BindError::TooFew { min: 1, got: 0, .. })
        ));
        let call = Call::new(vec![Value::Int(1)]).with_keyword("ignore", Value::Int(1));
        assert!(matches!(
            bind("SUM", &params, call),
            Err(BindError::UnknownKeyword { .. })
        ));
        let call = Call::new(vec![Value::Int(1)])
            .with_keyword("min_valid", Value::Int(1))
            .with_keyword("min_valid", Value::Int(2));
        assert!(matches!(
            bind("SUM", &params, call),
            Err(BindError::DuplicateKeyword { .. })
        ));
        let fixed = vec![ParamSpec::required("x")];
        assert!(matches!(
            bind("ABS", &fixed, Call::new(vec![Value::Int(1), Value::Int(2)])),
            Err(BindError::TooMany { max: 1, got: 2, .. })
        ));
    }

    #[test]
    fn column_binding_coerces_once() {
        let params = vec![ParamSpec::required("values").decimal()];
        let call = Call::new(vec![ArgColumn::Values(vec![Value::Int(1), Value::Int(MISSING_INT)])]);
        let b = bind("VSUM", &params, call).unwrap();
        match b.get(0) {
            Some(ArgColumn::Values(vs)) => {
                assert_eq!(vs[0], Value::Decimal(1.0));
                assert!(matches!(vs[1], Value::Decimal(d) if d.is_nan()));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn arity_summary() {
        assert_eq!(arity(&sum_params()), (1, None));
        let p = vec![ParamSpec::required("x"), ParamSpec::optional("d", 0)];
        assert_eq!(arity(&p), (1, Some(2)));
        assert_eq!(param_for_position(&sum_params(), 5).map(|p| p.name), Some("args"));
        assert_eq!(param_for_position(&p, 2), None);
    }
}
