//! Evaluation errors surfaced to the recompute scheduler.
//!
//! Expected anomalies (missing input, lookup miss, unparsable text) never
//! reach this type; functions answer those with a missing sentinel. An
//! `EvalError` means either a configuration problem (unknown function,
//! wrong arity) or a numeric precondition the user data violates.
//!
//! - **`EvalErrorKind`**: what went wrong
//! - **`ErrorContext`**: where (row or group) the dispatcher saw it
//! - **`EvalError`**: the struct that carries both plus a message

use std::{error::Error, fmt};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum EvalErrorKind {
    /// Numeric precondition violated (log of a non-positive number, …).
    Domain,
    /// Aggregate or estimator over too few values.
    Empty,
    /// Wrong number of arguments or unknown keyword.
    Arity,
    /// Argument of an unusable type.
    Type,
    /// Column-wise result whose length matches neither 1 nor the input.
    Shape,
    /// No function registered under the requested name.
    Unknown,
}

impl fmt::Display for EvalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Domain => "domain error",
            Self::Empty => "not enough values",
            Self::Arity => "bad arguments",
            Self::Type => "type error",
            Self::Shape => "shape mismatch",
            Self::Unknown => "unknown function",
        })
    }
}

impl EvalErrorKind {
    /// Configuration errors are the scheduler's to report as formula
    /// problems; the rest come from the data.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Arity | Self::Unknown | Self::Shape)
    }
}

/// Location metadata attached by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ErrorContext {
    pub row: Option<usize>,
    pub group: Option<u32>,
    pub function: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EvalError {
    pub kind: EvalErrorKind,
    pub message: Option<String>,
    pub context: Option<ErrorContext>,
}

impl From<EvalErrorKind> for EvalError {
    fn from(kind: EvalErrorKind) -> Self {
        Self {
            kind,
            message: None,
            context: None,
        }
    }
}

impl EvalError {
    pub fn new(kind: EvalErrorKind) -> Self {
        kind.into()
    }

    pub fn domain<S: Into<String>>(msg: S) -> Self {
        Self::new(EvalErrorKind::Domain).with_message(msg)
    }

    pub fn empty<S: Into<String>>(msg: S) -> Self {
        Self::new(EvalErrorKind::Empty).with_message(msg)
    }

    pub fn with_message<S: Into<String>>(mut self, msg: S) -> Self {
        self.message = Some(msg.into());
        self
    }

    pub fn with_row(mut self, row: usize) -> Self {
        self.context.get_or_insert_with(ErrorContext::default).row = Some(row);
        self
    }

    pub fn with_group(mut self, group: u32) -> Self {
        self.context.get_or_insert_with(ErrorContext::default).group = Some(group);
        self
    }

    pub fn with_function<S: Into<String>>(mut self, name: S) -> Self {
        self.context.get_or_insert_with(ErrorContext::default).function = Some(name.into());
        self
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = self.context.as_ref().and_then(|c| c.function.as_deref()) {
            write!(f, "{name}: ")?;
        }
        write!(f, "{}", self.kind)?;

        if let Some(ref msg) = self.message {
            write!(f, ": {msg}")?;
        }

        if let Some(ref ctx) = self.context {
            if let Some(r) = ctx.row {
                write!(f, " (row {r})")?;
            }
            if let Some(g) = ctx.group {
                write!(f, " (group {g})")?;
            }
        }
        Ok(())
    }
}

impl Error for EvalError {}

impl From<EvalError> for String {
    fn from(error: EvalError) -> Self {
        format!("{error}")
    }
}
