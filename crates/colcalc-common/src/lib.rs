pub mod error;
pub mod output;
pub mod value;

pub use error::*;
pub use output::*;
pub use value::*;
