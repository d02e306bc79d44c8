pub mod city;
pub mod common;
pub mod pagination;
pub mod patch;
pub mod point_of_interest;

pub use city::*;
pub use common::*;
pub use pagination::*;
pub use patch::*;
pub use point_of_interest::*;
