//! Date functions: DATEVALUE and DATE.
//!
//! Dates are stored as whole days since 1970-01-01 (UTC) in integer
//! columns and converted with strftime patterns.

mod date_value;

pub use date_value::*;

pub fn register_builtins() {
    date_value::register_builtins();
}
