//! HTTP handlers for the upload gateway

pub mod form;
pub mod handler;
pub mod types;

pub use form::FormFiles;
pub use handler::{build_router, configure_routes, GatewayApiDoc};
pub use types::*;
