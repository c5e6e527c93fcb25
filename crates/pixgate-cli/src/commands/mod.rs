mod serve;

pub use serve::{ServeCommand, StorageBackend};
