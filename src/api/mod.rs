//! HTTP API module for the token faucet, health and metrics endpoints.

pub mod handlers;
pub mod routes;
pub mod types;

pub use handlers::AppState;
pub use routes::create_router;
