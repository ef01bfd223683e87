//! Text functions: VALUE, INT, TEXT, SPLIT, CONTAINS.

mod split_contains;
mod value_text;

pub use split_contains::*;
pub use value_text::*;

pub fn register_builtins() {
    value_text::register_builtins();
    split_contains::register_builtins();
}
