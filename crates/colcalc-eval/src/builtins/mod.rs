pub mod datetime;
pub mod info;
pub mod logical;
pub mod logical_ext;
pub mod lookup;
pub mod math;
pub mod random;
pub mod sample;
pub mod stats;
pub mod text;
mod utils;

pub fn load_builtins() {
    math::register_builtins();
    stats::register_builtins();
    logical::register_builtins();
    logical_ext::register_builtins();
    lookup::register_builtins();
    random::register_builtins();
    sample::register_builtins();
    text::register_builtins();
    datetime::register_builtins();
    info::register_builtins();
}
