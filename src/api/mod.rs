pub mod city_handlers;
pub mod error;
pub mod handlers;
pub mod point_of_interest_handlers;
pub mod routes;
pub mod state;

pub use error::*;
pub use handlers::*;
pub use routes::*;
pub use state::*;
