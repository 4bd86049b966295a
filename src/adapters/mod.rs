// Adapters layer: concrete implementations for external systems (storage, http).

pub mod http;
pub mod storage;

pub use http::HttpMarkupSource;
pub use storage::{FileStore, MemoryStore};
