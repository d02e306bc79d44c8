pub mod changes;
pub mod memory;
pub mod postgres;
pub mod repository;
pub mod traits;

pub use changes::*;
pub use memory::*;
pub use postgres::*;
pub use repository::*;
pub use traits::*;
