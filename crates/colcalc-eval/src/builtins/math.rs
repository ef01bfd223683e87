//! Row-wise arithmetic: aggregates across a row's arguments and
//! single-value numeric transforms.

mod aggregate;
mod numeric;

pub use aggregate::*;
pub use numeric::*;

pub fn register_builtins() {
    aggregate::register_builtins();
    numeric::register_builtins();
}
