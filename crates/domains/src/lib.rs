//! # OgiriHub Domain Crate
//!
//! The central domain logic and interface definitions for OgiriHub:
//! models, port traits, and the error taxonomy. This crate performs no I/O;
//! adapters implement the ports, services consume them.

pub mod error;
pub mod models;
pub mod ports;

// Re-exporting for easier access in other crates
pub use error::*;
pub use models::*;
pub use ports::*;
