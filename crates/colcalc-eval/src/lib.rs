//! Function catalog and calling conventions for computed columns.
//!
//! Every builtin implements [`Function`]: it declares its parameters, how
//! its output column is typed, and whether it runs once per row or once per
//! column (per group when a grouping is given). The [`Dispatcher`] binds
//! argument columns, fills derived defaults, runs the function in its mode
//! and casts the result into the inferred column type.

mod macros;

pub mod args;
pub mod function;
pub mod function_registry;
pub mod rng;
pub mod stats;
pub mod traits;

pub mod builtins;
pub mod engine;

pub use args::{Call, ParamSpec};
pub use engine::{Dispatcher, EvalConfig, EvalContext, EvaluatedColumn, GroupPartition};
pub use function::{ColumnResult, EvalMode, FnCaps, Function, FunctionDescriptor};
pub use traits::{ArgColumn, FunctionContext};

#[cfg(test)]
pub mod test_table;

#[cfg(test)]
mod tests;
