//! Lookup by value (MATCH) and by position (HLOOKUP).

mod core;

pub use self::core::*;

pub fn register_builtins() {
    self::core::register_builtins();
}
