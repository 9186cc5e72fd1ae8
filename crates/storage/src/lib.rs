pub mod backend;
pub mod error;

pub use crate::backend::{ObjectReader, StorageBackend};
use std::sync::Arc;

pub type BackendHandle = Arc<dyn StorageBackend + Send + Sync>;
