pub mod patch;
pub mod query;
pub mod validate;

pub use patch::*;
pub use query::*;
pub use validate::*;
