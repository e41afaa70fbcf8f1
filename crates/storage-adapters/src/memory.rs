//! # MemoryStore
//!
//! In-process document store implementing `ThreadRepo` and `OgiriRepo`.
//!
//! Mutations hold the document's map entry for their whole duration, which
//! gives the per-document atomicity the hosted store guarantees: array
//! unions dedupe, the like toggle moves counter and membership together,
//! and event completion is a conditional write on `status`. There are no
//! cross-document transactions, matching the consumed contract.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use domains::{
    Comment, DomainError, DomainResult, EventStatus, LikeOutcome, OgiriAnswer, OgiriEvent,
    OgiriRepo, StoreEvent, Thread, ThreadPatch, ThreadRepo, UserId,
};
use tokio::sync::broadcast;
use uuid::Uuid;

pub struct MemoryStore {
    threads: DashMap<Uuid, Thread>,
    events: DashMap<Uuid, OgiriEvent>,
    /// Answers per event, in insertion order. Enumeration order is what
    /// best-answer tie-breaking observes.
    answers: DashMap<Uuid, Vec<OgiriAnswer>>,
    changes: broadcast::Sender<StoreEvent>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(256);
        Self {
            threads: DashMap::new(),
            events: DashMap::new(),
            answers: DashMap::new(),
            changes,
        }
    }

    /// Change-subscription stream shared by both collections.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.changes.subscribe()
    }

    fn emit(&self, event: StoreEvent) {
        // Nobody listening is fine.
        let _ = self.changes.send(event);
    }

    fn thread_not_found(id: Uuid) -> DomainError {
        DomainError::NotFound {
            kind: "thread",
            id: id.to_string(),
        }
    }

    fn event_not_found(id: Uuid) -> DomainError {
        DomainError::NotFound {
            kind: "ogiri event",
            id: id.to_string(),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ThreadRepo for MemoryStore {
    async fn insert(&self, thread: Thread) -> DomainResult<()> {
        let id = thread.id;
        self.threads.insert(id, thread);
        self.emit(StoreEvent::ThreadChanged(id));
        Ok(())
    }

    async fn get(&self, id: Uuid) -> DomainResult<Option<Thread>> {
        Ok(self.threads.get(&id).map(|t| t.clone()))
    }

    async fn list(&self) -> DomainResult<Vec<Thread>> {
        Ok(self.threads.iter().map(|t| t.clone()).collect())
    }

    async fn update(&self, id: Uuid, patch: ThreadPatch) -> DomainResult<Thread> {
        let mut entry = self
            .threads
            .get_mut(&id)
            .ok_or_else(|| Self::thread_not_found(id))?;
        if let Some(title) = patch.title {
            entry.title = title;
        }
        if let Some(content) = patch.content {
            entry.content = content;
        }
        if let Some(tags) = patch.tags {
            entry.tags = tags;
        }
        let updated = entry.clone();
        drop(entry);
        self.emit(StoreEvent::ThreadChanged(id));
        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> DomainResult<()> {
        self.threads
            .remove(&id)
            .ok_or_else(|| Self::thread_not_found(id))?;

        // Orphaned events and answers go with the thread.
        let dead: Vec<Uuid> = self
            .events
            .iter()
            .filter(|e| e.thread_id == id)
            .map(|e| e.id)
            .collect();
        for event_id in dead {
            self.events.remove(&event_id);
            self.answers.remove(&event_id);
        }

        self.emit(StoreEvent::ThreadDeleted(id));
        Ok(())
    }

    async fn add_participant(&self, thread_id: Uuid, user: &UserId) -> DomainResult<Thread> {
        let mut entry = self
            .threads
            .get_mut(&thread_id)
            .ok_or_else(|| Self::thread_not_found(thread_id))?;
        // array-union: re-join is a no-op
        if !entry.participants.contains(user) {
            entry.participants.push(user.clone());
        }
        let updated = entry.clone();
        drop(entry);
        self.emit(StoreEvent::ThreadChanged(thread_id));
        Ok(updated)
    }

    async fn push_comment(&self, thread_id: Uuid, comment: Comment) -> DomainResult<Thread> {
        let mut entry = self
            .threads
            .get_mut(&thread_id)
            .ok_or_else(|| Self::thread_not_found(thread_id))?;
        if !entry.comments.iter().any(|c| c.id == comment.id) {
            entry.comments.push(comment);
        }
        let updated = entry.clone();
        drop(entry);
        self.emit(StoreEvent::ThreadChanged(thread_id));
        Ok(updated)
    }

    async fn remove_comment(&self, thread_id: Uuid, comment_id: Uuid) -> DomainResult<Thread> {
        let mut entry = self
            .threads
            .get_mut(&thread_id)
            .ok_or_else(|| Self::thread_not_found(thread_id))?;
        entry.comments.retain(|c| c.id != comment_id);
        let updated = entry.clone();
        drop(entry);
        self.emit(StoreEvent::ThreadChanged(thread_id));
        Ok(updated)
    }

    fn changes(&self) -> broadcast::Receiver<StoreEvent> {
        self.subscribe()
    }
}

#[async_trait]
impl OgiriRepo for MemoryStore {
    async fn insert_event(&self, event: OgiriEvent) -> DomainResult<()> {
        let id = event.id;
        self.events.insert(id, event);
        self.emit(StoreEvent::EventChanged(id));
        Ok(())
    }

    async fn get_event(
        &self,
        thread_id: Uuid,
        event_id: Uuid,
    ) -> DomainResult<Option<OgiriEvent>> {
        Ok(self
            .events
            .get(&event_id)
            .filter(|e| e.thread_id == thread_id)
            .map(|e| e.clone()))
    }

    async fn list_events(&self, thread_id: Uuid) -> DomainResult<Vec<OgiriEvent>> {
        Ok(self
            .events
            .iter()
            .filter(|e| e.thread_id == thread_id)
            .map(|e| e.clone())
            .collect())
    }

    async fn list_active_events(&self) -> DomainResult<Vec<OgiriEvent>> {
        Ok(self
            .events
            .iter()
            .filter(|e| e.status == EventStatus::Active)
            .map(|e| e.clone())
            .collect())
    }

    async fn add_participant(
        &self,
        thread_id: Uuid,
        event_id: Uuid,
        user: &UserId,
    ) -> DomainResult<OgiriEvent> {
        let mut entry = self
            .events
            .get_mut(&event_id)
            .ok_or_else(|| Self::event_not_found(event_id))?;
        if entry.thread_id != thread_id {
            return Err(Self::event_not_found(event_id));
        }
        if !entry.participants.contains(user) {
            entry.participants.push(user.clone());
        }
        let updated = entry.clone();
        drop(entry);
        self.emit(StoreEvent::EventChanged(event_id));
        Ok(updated)
    }

    async fn insert_answer(&self, answer: OgiriAnswer) -> DomainResult<()> {
        let event_id = answer.event_id;
        let answer_id = answer.id;
        self.answers.entry(event_id).or_default().push(answer);
        self.emit(StoreEvent::AnswerChanged {
            event_id,
            answer_id,
        });
        Ok(())
    }

    async fn list_answers(&self, event_id: Uuid) -> DomainResult<Vec<OgiriAnswer>> {
        Ok(self
            .answers
            .get(&event_id)
            .map(|a| a.clone())
            .unwrap_or_default())
    }

    async fn count_answers_by(&self, event_id: Uuid, user: &UserId) -> DomainResult<u32> {
        Ok(self
            .answers
            .get(&event_id)
            .map(|answers| answers.iter().filter(|a| a.user_id == *user).count() as u32)
            .unwrap_or(0))
    }

    async fn apply_like(
        &self,
        event_id: Uuid,
        answer_id: Uuid,
        user: &UserId,
    ) -> DomainResult<LikeOutcome> {
        let mut entry = self
            .answers
            .get_mut(&event_id)
            .ok_or(DomainError::NotFound {
                kind: "answer",
                id: answer_id.to_string(),
            })?;
        let answer = entry
            .iter_mut()
            .find(|a| a.id == answer_id)
            .ok_or(DomainError::NotFound {
                kind: "answer",
                id: answer_id.to_string(),
            })?;

        // Counter and membership move together under the entry lock, so the
        // likes == |liked_by| invariant holds at every observable point.
        let liked = if answer.liked_by.remove(user) {
            false
        } else {
            answer.liked_by.insert(user.clone());
            true
        };
        answer.likes = answer.liked_by.len() as u32;
        let snapshot = answer.clone();
        drop(entry);

        self.emit(StoreEvent::AnswerChanged {
            event_id,
            answer_id,
        });
        Ok(LikeOutcome {
            liked,
            answer: snapshot,
        })
    }

    async fn complete_event(
        &self,
        thread_id: Uuid,
        event_id: Uuid,
        best_answer_id: Option<Uuid>,
        ended_at: DateTime<Utc>,
    ) -> DomainResult<bool> {
        let mut entry = self
            .events
            .get_mut(&event_id)
            .ok_or_else(|| Self::event_not_found(event_id))?;
        if entry.thread_id != thread_id {
            return Err(Self::event_not_found(event_id));
        }

        // Conditional write: only the first observer flips the status.
        if entry.status != EventStatus::Active {
            return Ok(false);
        }
        entry.status = EventStatus::Completed;
        entry.best_answer_id = best_answer_id;
        entry.ended_at = Some(ended_at);
        drop(entry);

        self.emit(StoreEvent::EventChanged(event_id));
        Ok(true)
    }

    fn changes(&self) -> broadcast::Receiver<StoreEvent> {
        self.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::Odai;
    use std::collections::BTreeSet;

    fn thread(created_by: &str) -> Thread {
        Thread {
            id: Uuid::new_v4(),
            title: "title".into(),
            content: "content".into(),
            created_by: UserId::from(created_by),
            created_at: Utc::now(),
            participants: vec![UserId::from(created_by)],
            comments: vec![],
            tags: vec![],
        }
    }

    fn event(thread_id: Uuid) -> OgiriEvent {
        OgiriEvent {
            id: Uuid::new_v4(),
            thread_id,
            created_by: UserId::from("host"),
            odai: Odai::Text {
                title: "odai".into(),
            },
            duration_minutes: 1,
            max_responses: 3,
            participants: vec![],
            status: EventStatus::Active,
            best_answer_id: None,
            created_at: Utc::now(),
            ended_at: None,
        }
    }

    fn answer(event_id: Uuid, uid: &str) -> OgiriAnswer {
        OgiriAnswer {
            id: Uuid::new_v4(),
            event_id,
            content: "ha".into(),
            created_at: Utc::now(),
            user_id: UserId::from(uid),
            likes: 0,
            liked_by: BTreeSet::new(),
        }
    }

    #[tokio::test]
    async fn join_is_idempotent() {
        let store = MemoryStore::new();
        let t = thread("creator");
        let id = t.id;
        store.insert(t).await.unwrap();

        let u = UserId::from("joiner");
        ThreadRepo::add_participant(&store, id, &u).await.unwrap();
        let after = ThreadRepo::add_participant(&store, id, &u).await.unwrap();
        assert_eq!(
            after.participants,
            vec![UserId::from("creator"), UserId::from("joiner")]
        );
    }

    #[tokio::test]
    async fn like_toggle_keeps_counter_and_membership_in_step() {
        let store = MemoryStore::new();
        let e = event(Uuid::new_v4());
        let a = answer(e.id, "author");
        let (event_id, answer_id) = (e.id, a.id);
        store.insert_event(e).await.unwrap();
        store.insert_answer(a).await.unwrap();

        let fan = UserId::from("fan");
        let liked = store.apply_like(event_id, answer_id, &fan).await.unwrap();
        assert!(liked.liked);
        assert_eq!(liked.answer.likes, 1);
        assert_eq!(liked.answer.likes as usize, liked.answer.liked_by.len());

        // toggling again returns the answer to its original state
        let unliked = store.apply_like(event_id, answer_id, &fan).await.unwrap();
        assert!(!unliked.liked);
        assert_eq!(unliked.answer.likes, 0);
        assert!(unliked.answer.liked_by.is_empty());
    }

    #[tokio::test]
    async fn completion_is_exactly_once() {
        let store = MemoryStore::new();
        let e = event(Uuid::new_v4());
        let (thread_id, event_id) = (e.thread_id, e.id);
        store.insert_event(e).await.unwrap();

        let best = Some(Uuid::new_v4());
        let now = Utc::now();
        assert!(store
            .complete_event(thread_id, event_id, best, now)
            .await
            .unwrap());

        // second observer loses and must not overwrite the selection
        let other = Some(Uuid::new_v4());
        assert!(!store
            .complete_event(thread_id, event_id, other, now)
            .await
            .unwrap());

        let stored = store.get_event(thread_id, event_id).await.unwrap().unwrap();
        assert_eq!(stored.status, EventStatus::Completed);
        assert_eq!(stored.best_answer_id, best);
    }

    #[tokio::test]
    async fn answers_keep_insertion_order() {
        let store = MemoryStore::new();
        let e = event(Uuid::new_v4());
        let event_id = e.id;
        store.insert_event(e).await.unwrap();

        for uid in ["u1", "u2", "u3"] {
            store.insert_answer(answer(event_id, uid)).await.unwrap();
        }
        let listed = store.list_answers(event_id).await.unwrap();
        let authors: Vec<&str> = listed.iter().map(|a| a.user_id.as_str()).collect();
        assert_eq!(authors, vec!["u1", "u2", "u3"]);
    }

    #[tokio::test]
    async fn count_answers_is_per_user() {
        let store = MemoryStore::new();
        let e = event(Uuid::new_v4());
        let event_id = e.id;
        store.insert_event(e).await.unwrap();

        store.insert_answer(answer(event_id, "u1")).await.unwrap();
        store.insert_answer(answer(event_id, "u1")).await.unwrap();
        store.insert_answer(answer(event_id, "u2")).await.unwrap();

        let u1 = UserId::from("u1");
        assert_eq!(store.count_answers_by(event_id, &u1).await.unwrap(), 2);
        let ghost = UserId::from("ghost");
        assert_eq!(store.count_answers_by(event_id, &ghost).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn mutations_reach_the_change_stream() {
        let store = MemoryStore::new();
        let mut changes = store.subscribe();

        let t = thread("creator");
        let id = t.id;
        store.insert(t).await.unwrap();

        assert_eq!(changes.recv().await.unwrap(), StoreEvent::ThreadChanged(id));
    }

    #[tokio::test]
    async fn deleting_a_thread_takes_its_events_along() {
        let store = MemoryStore::new();
        let t = thread("creator");
        let thread_id = t.id;
        store.insert(t).await.unwrap();

        let e = event(thread_id);
        let event_id = e.id;
        store.insert_event(e).await.unwrap();
        store.insert_answer(answer(event_id, "u1")).await.unwrap();

        ThreadRepo::delete(&store, thread_id).await.unwrap();
        assert!(store
            .get_event(thread_id, event_id)
            .await
            .unwrap()
            .is_none());
        assert!(store.list_answers(event_id).await.unwrap().is_empty());
    }
}
