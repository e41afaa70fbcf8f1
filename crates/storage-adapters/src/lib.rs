//! # Storage Adapters
//!
//! Implementations of the document-store ports. The hosted store itself is
//! an external collaborator; [`memory::MemoryStore`] realizes the consumed
//! contract in-process with the same update semantics (per-document
//! atomicity, array-union/array-remove, conditional transition, change
//! streams) for development and tests.

pub mod memory;

pub use memory::MemoryStore;
