//! Domain model for the piniPLM backend.
//!
//! Pure logic with no I/O: the part catalog, assembly graph mutations,
//! scene flattening, selection routing and upload validation. Persistence
//! lives in `piniplm-store`, HTTP in `piniplm-api`.

pub mod assembly;
pub mod catalog;
pub mod error;
pub mod flatten;
pub mod part;
pub mod selection;
pub mod types;
pub mod upload;
