//! # OgiriHub Services
//!
//! Business logic over the domain ports: thread operations, the Ogiri event
//! lifecycle, pre-store validation, and the expiry sweeper. Everything here
//! is written against trait objects so it can be unit-tested with the mocks
//! the `domains` crate exposes behind its `testing` feature.

pub mod clock;
pub mod ogiri_service;
pub mod snapshot;
pub mod sweeper;
pub mod thread_service;
pub mod validation;

pub use clock::{ManualClock, SystemClock};
pub use ogiri_service::{remaining_time, select_best_answer, Completion, OgiriService, RemainingTime};
pub use sweeper::ExpirySweeper;
pub use thread_service::ThreadService;
