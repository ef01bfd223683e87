//! Meta crate that re-exports the colcalc building blocks. Depend on this
//! crate for the full catalog, or on `colcalc-common` alone when only the
//! value model is needed.

#[cfg(feature = "common")]
pub use colcalc_common as common;

#[cfg(feature = "eval")]
pub use colcalc_eval as eval;

#[cfg(feature = "common")]
pub use colcalc_common::{
    ArgMeta, DataType, EvalError, EvalErrorKind, MISSING_INT, MeasureType, OutputMeta, Value,
    is_equal, is_missing,
};

#[cfg(feature = "eval")]
pub use colcalc_eval::{
    ArgColumn, Call, Dispatcher, EvalConfig, EvaluatedColumn, GroupPartition, function_registry,
};

#[cfg(feature = "eval")]
pub mod doc_examples;
