//! # Domain Models
//!
//! These structs represent the core entities of OgiriHub. Serialization uses
//! camelCase field names so documents keep the shape the hosted store holds
//! them in.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque user identifier issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// The top-level discussion unit containing comments and zero or more
/// Ogiri events.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thread {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    /// Set semantics: joins go through array-union, so re-joining is a no-op.
    pub participants: Vec<UserId>,
    pub comments: Vec<Comment>,
    pub tags: Vec<String>,
}

/// A comment owned by exactly one thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub created_by: UserId,
    /// Denormalized author fields so comments render without a user lookup.
    pub created_by_username: String,
    pub user_photo_url: Option<String>,
}

/// Input for creating a thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewThread {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Partial update applied to a thread by its creator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// The prompt an Ogiri event poses to its participants.
///
/// Documents carry an `odaiType` discriminator next to a `title` or
/// `selectedImage` field; the tagged enum keeps the pair coherent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "odaiType", rename_all = "camelCase")]
pub enum Odai {
    Text {
        title: String,
    },
    Image {
        #[serde(rename = "selectedImage")]
        image_url: String,
    },
}

impl Odai {
    /// The user-visible prompt text (the image URL for image odai).
    pub fn prompt(&self) -> &str {
        match self {
            Odai::Text { title } => title,
            Odai::Image { image_url } => image_url,
        }
    }
}

/// Lifecycle state of an Ogiri event. Transitions `Active → Completed`
/// exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Active,
    Completed,
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventStatus::Active => f.write_str("active"),
            EventStatus::Completed => f.write_str("completed"),
        }
    }
}

/// A timed community mini-event attached to a thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OgiriEvent {
    pub id: Uuid,
    pub thread_id: Uuid,
    pub created_by: UserId,
    #[serde(flatten)]
    pub odai: Odai,
    /// Length of the answer window, in whole minutes.
    pub duration_minutes: u32,
    /// Per-user cap on submitted answers.
    pub max_responses: u32,
    pub participants: Vec<UserId>,
    pub status: EventStatus,
    /// Fixed permanently by the one expiration-triggered selection.
    pub best_answer_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl OgiriEvent {
    /// The instant the answer window closes.
    pub fn end_time(&self) -> DateTime<Utc> {
        self.created_at + Duration::minutes(i64::from(self.duration_minutes))
    }

    /// Whether the answer window has closed at `now`.
    ///
    /// Expiration is a property of the clock, not of `status`: an event can
    /// be expired but not yet transitioned.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.end_time()
    }

    pub fn is_completed(&self) -> bool {
        self.status == EventStatus::Completed
    }
}

/// Input for creating an Ogiri event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOgiriEvent {
    #[serde(flatten)]
    pub odai: Odai,
    pub duration_minutes: u32,
    pub max_responses: u32,
}

/// An answer submitted to an Ogiri event.
///
/// Invariant: `likes == liked_by.len()` at every observable point; the store
/// applies both fields in one per-document mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OgiriAnswer {
    pub id: Uuid,
    pub event_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub user_id: UserId,
    pub likes: u32,
    pub liked_by: BTreeSet<UserId>,
}

/// An authenticated session as exposed by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub uid: UserId,
    pub display_name: String,
    pub email: String,
    pub photo_url: Option<String>,
}

/// Opaque bearer token naming a live session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(pub String);

impl SessionToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
