//! # Cairn Storage
//!
//! Document storage abstraction layer for Cairn.
//!
//! Provides the [`DocumentStore`] trait that plugins and the startup sequence
//! talk to, the document/filter types it exchanges, and an in-memory
//! implementation used in dev mode and tests.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod backend;
pub mod document;
pub mod error;
pub mod memory;

pub use backend::DocumentStore;
pub use document::{check_query, validate_collection_name, Document, DocumentId, Filter, ItemList};
pub use error::StorageError;
pub use memory::MemoryStore;
