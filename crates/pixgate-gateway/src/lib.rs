//! pixgate-gateway: Image upload gateway
//!
//! Accepts image uploads over HTTP, gives each file a collision-resistant
//! name and forwards the bytes to a [`pixgate_storage::BlobStore`].

pub mod error;
pub mod handlers;
pub mod services;

pub use error::GatewayError;
pub use handlers::{build_router, configure_routes, GatewayAppState, GatewayApiDoc};
pub use services::{IncomingFile, UploadService, UploadedFile};
