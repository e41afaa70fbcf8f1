//! # Core Ports
//!
//! Boundary contracts consumed by the services. The document store and the
//! identity provider are external collaborators; adapters implement these
//! traits, and services never see anything more concrete.
//!
//! Update semantics mirror what the hosted store offers: per-document atomic
//! mutations (array-union, array-remove, combined counter/set updates), a
//! conditional state transition, and change-subscription streams. There are
//! no cross-document transactions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, watch};
use uuid::Uuid;

use crate::error::DomainResult;
use crate::models::{
    Comment, OgiriAnswer, OgiriEvent, Session, SessionToken, Thread, ThreadPatch, UserId,
};

/// Change notification emitted by the store, keyed by document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    ThreadChanged(Uuid),
    ThreadDeleted(Uuid),
    EventChanged(Uuid),
    AnswerChanged { event_id: Uuid, answer_id: Uuid },
}

/// Result of an atomically applied like toggle.
#[derive(Debug, Clone)]
pub struct LikeOutcome {
    /// True if the toggle added a like, false if it removed one.
    pub liked: bool,
    /// The answer as it stands after the mutation.
    pub answer: OgiriAnswer,
}

/// Persistence contract for thread documents.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ThreadRepo: Send + Sync {
    async fn insert(&self, thread: Thread) -> DomainResult<()>;
    async fn get(&self, id: Uuid) -> DomainResult<Option<Thread>>;
    async fn list(&self) -> DomainResult<Vec<Thread>>;
    async fn update(&self, id: Uuid, patch: ThreadPatch) -> DomainResult<Thread>;
    async fn delete(&self, id: Uuid) -> DomainResult<()>;

    /// Array-union append: adding a user already present is a no-op.
    async fn add_participant(&self, thread_id: Uuid, user: &UserId) -> DomainResult<Thread>;

    /// Array-union append of a comment element.
    async fn push_comment(&self, thread_id: Uuid, comment: Comment) -> DomainResult<Thread>;

    /// Array-remove of the comment with the given id.
    async fn remove_comment(&self, thread_id: Uuid, comment_id: Uuid) -> DomainResult<Thread>;

    /// Change-subscription stream over the thread collection.
    fn changes(&self) -> broadcast::Receiver<StoreEvent>;
}

/// Persistence contract for Ogiri events and their answers.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait OgiriRepo: Send + Sync {
    async fn insert_event(&self, event: OgiriEvent) -> DomainResult<()>;
    async fn get_event(&self, thread_id: Uuid, event_id: Uuid)
        -> DomainResult<Option<OgiriEvent>>;
    async fn list_events(&self, thread_id: Uuid) -> DomainResult<Vec<OgiriEvent>>;

    /// Every event still in the `Active` state, across all threads. Feeds
    /// the expiry sweeper.
    async fn list_active_events(&self) -> DomainResult<Vec<OgiriEvent>>;

    /// Array-union append: joining twice is a no-op.
    async fn add_participant(
        &self,
        thread_id: Uuid,
        event_id: Uuid,
        user: &UserId,
    ) -> DomainResult<OgiriEvent>;

    async fn insert_answer(&self, answer: OgiriAnswer) -> DomainResult<()>;

    /// Answers in store enumeration order (insertion order).
    async fn list_answers(&self, event_id: Uuid) -> DomainResult<Vec<OgiriAnswer>>;

    async fn count_answers_by(&self, event_id: Uuid, user: &UserId) -> DomainResult<u32>;

    /// Toggles `user`'s like on an answer as ONE per-document mutation:
    /// membership change and counter move together, so
    /// `likes == |liked_by|` can never be observed violated.
    async fn apply_like(
        &self,
        event_id: Uuid,
        answer_id: Uuid,
        user: &UserId,
    ) -> DomainResult<LikeOutcome>;

    /// Compare-and-swap transition `Active → Completed`.
    ///
    /// Returns `true` for the one caller that performed the transition and
    /// `false` for every caller that found the event already completed.
    /// `best_answer_id` and `ended_at` are only written by the winner.
    async fn complete_event(
        &self,
        thread_id: Uuid,
        event_id: Uuid,
        best_answer_id: Option<Uuid>,
        ended_at: DateTime<Utc>,
    ) -> DomainResult<bool>;

    /// Change-subscription stream over events and answers.
    fn changes(&self) -> broadcast::Receiver<StoreEvent>;
}

/// Identity and session contract.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Email/password sign-in. Issues a bearer token naming the session.
    async fn sign_in(&self, email: &str, password: &str) -> DomainResult<(SessionToken, Session)>;

    async fn sign_out(&self, token: &SessionToken) -> DomainResult<()>;

    /// Resolves a bearer token to the session it names, if still live.
    async fn current(&self, token: &SessionToken) -> DomainResult<Option<Session>>;

    /// Bumped on every sign-in/sign-out; subscribers re-read their session.
    fn subscribe(&self) -> watch::Receiver<u64>;
}

/// Injected time source so lifecycle logic is testable without sleeping.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
