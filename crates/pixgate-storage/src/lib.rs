//! pixgate-storage: Blob store backends for the upload gateway
//!
//! The gateway only ever talks to a [`BlobStore`]. Backends:
//! - [`SupabaseStore`]: Supabase Storage REST API
//! - [`S3Store`]: any S3-compatible endpoint (RustFS, MinIO, AWS)
//! - [`MemoryStore`]: in-process map, for tests and local runs

pub mod error;
pub mod memory;
pub mod s3;
pub mod supabase;
pub mod traits;

pub use error::{StoreError, ALREADY_EXISTS_MESSAGE};
pub use memory::{MemoryStore, StoredBlob};
pub use s3::{S3Config, S3Store};
pub use supabase::{SupabaseConfig, SupabaseStore};
pub use traits::{BlobStore, PutOptions, DEFAULT_CONTENT_TYPE};
