pub mod routes;
pub mod startup;
pub mod errors;
pub mod openapi;
pub mod observability;

pub use routes::ServerState;
pub use startup::{run, run_with_config};
