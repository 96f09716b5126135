//! Persistence for the piniPLM backend: the part catalog snapshot and the
//! uploaded model files.

pub mod error;
pub mod file_storage;
pub mod part_store;
pub mod snapshot;

pub use error::StoreError;
pub use file_storage::FileStorage;
pub use part_store::PartStore;
