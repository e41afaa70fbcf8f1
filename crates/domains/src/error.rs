//! # DomainError
//!
//! Centralized error taxonomy for OgiriHub. Validation failures are caught
//! before any store call; business-rule violations carry user-facing
//! messages; store and auth failures are wrapped, never retried.

use thiserror::Error;

/// The primary error type for all domain operations.
#[derive(Error, Debug)]
pub enum DomainError {
    /// Input rejected before any store call.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Resource not found (e.g. thread, event, answer)
    #[error("{kind} not found with id {id}")]
    NotFound { kind: &'static str, id: String },

    /// The answer window has closed.
    #[error("this ogiri event has already ended")]
    EventExpired,

    /// The caller already submitted `max_responses` answers.
    #[error("answer limit reached: at most {max_responses} answers per user")]
    AnswerLimitReached { max_responses: u32 },

    /// Answer text was empty after trimming.
    #[error("answer text cannot be empty")]
    EmptyAnswer,

    /// No authenticated session.
    #[error("not signed in")]
    Unauthorized,

    /// Wrong email/password pair.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Authenticated, but not permitted to perform this operation.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// State conflict (e.g. completing an already-completed event).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Document store failure. Propagated to the caller, no retry policy.
    #[error("store error: {0}")]
    Store(String),
}

/// One variant per pre-store validation rule.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("title cannot be empty")]
    EmptyTitle,
    #[error("title is too long (max {max} characters)")]
    TitleTooLong { max: usize },
    #[error("content is too long (max {max} characters)")]
    ContentTooLong { max: usize },
    #[error("too many tags (max {max})")]
    TooManyTags { max: usize },
    #[error("tag is too long (max {max} characters)")]
    TagTooLong { max: usize },
    #[error("comment cannot be empty")]
    EmptyComment,
    #[error("comment is too long (max {max} characters)")]
    CommentTooLong { max: usize },
    #[error("comments may not contain URLs")]
    CommentContainsUrl,
    #[error("odai cannot be empty")]
    EmptyOdai,
    #[error("duration must be between {min} and {max} minutes")]
    InvalidDuration { min: u32, max: u32 },
    #[error("max responses must be between {min} and {max}")]
    InvalidMaxResponses { min: u32, max: u32 },
}

/// A specialized Result type for OgiriHub domain logic.
pub type DomainResult<T> = std::result::Result<T, DomainError>;
