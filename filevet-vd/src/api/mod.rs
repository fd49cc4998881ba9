//! HTTP API handlers for filevet-vd

pub mod health;
pub mod validate;

pub use health::health_routes;
pub use validate::validate_routes;
