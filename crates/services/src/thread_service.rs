//! # Thread Service
//!
//! CRUD and membership operations over thread documents. Every operation
//! that acts on behalf of a user takes the session explicitly; nothing here
//! reads ambient identity state.

use std::sync::Arc;

use domains::{
    Clock, Comment, DomainError, DomainResult, NewThread, Session, Thread, ThreadPatch, ThreadRepo,
    UserId,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::snapshot;
use crate::validation;

pub struct ThreadService {
    repo: Arc<dyn ThreadRepo>,
    clock: Arc<dyn Clock>,
}

impl ThreadService {
    pub fn new(repo: Arc<dyn ThreadRepo>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    /// Creates a thread. The creator is its first participant.
    pub async fn create(&self, session: &Session, input: NewThread) -> DomainResult<Thread> {
        validation::validate_new_thread(&input)?;

        let thread = Thread {
            id: Uuid::new_v4(),
            title: input.title,
            content: input.content,
            created_by: session.uid.clone(),
            created_at: self.clock.now(),
            participants: vec![session.uid.clone()],
            comments: vec![],
            tags: input.tags,
        };
        self.repo.insert(thread.clone()).await?;
        info!(thread_id = %thread.id, user = %session.uid, "thread created");
        Ok(thread)
    }

    /// All threads, newest first.
    pub async fn list(&self) -> DomainResult<Vec<Thread>> {
        Ok(snapshot::threads_newest_first(self.repo.list().await?))
    }

    pub async fn get(&self, id: Uuid) -> DomainResult<Thread> {
        self.repo.get(id).await?.ok_or(DomainError::NotFound {
            kind: "thread",
            id: id.to_string(),
        })
    }

    /// Creator-only partial update.
    pub async fn update(
        &self,
        session: &Session,
        id: Uuid,
        patch: ThreadPatch,
    ) -> DomainResult<Thread> {
        validation::validate_thread_patch(&patch)?;
        let thread = self.get(id).await?;
        if !Self::is_owner(&thread, &session.uid) {
            return Err(DomainError::Forbidden(
                "only the thread creator can edit it".into(),
            ));
        }
        self.repo.update(id, patch).await
    }

    /// Creator-only delete. Exists for completeness; main flows never
    /// hard-delete threads.
    pub async fn delete(&self, session: &Session, id: Uuid) -> DomainResult<()> {
        let thread = self.get(id).await?;
        if !Self::is_owner(&thread, &session.uid) {
            return Err(DomainError::Forbidden(
                "only the thread creator can delete it".into(),
            ));
        }
        self.repo.delete(id).await?;
        info!(thread_id = %id, "thread deleted");
        Ok(())
    }

    /// Adds the user to `participants`. Idempotent: array-union dedupes.
    pub async fn join(&self, thread_id: Uuid, user: &UserId) -> DomainResult<Thread> {
        let thread = self.repo.add_participant(thread_id, user).await?;
        debug!(thread_id = %thread_id, user = %user, "joined thread");
        Ok(thread)
    }

    pub async fn add_comment(
        &self,
        session: &Session,
        thread_id: Uuid,
        text: &str,
    ) -> DomainResult<Thread> {
        validation::validate_comment_text(text)?;

        let comment = Comment {
            id: Uuid::new_v4(),
            text: text.trim().to_owned(),
            created_at: self.clock.now(),
            created_by: session.uid.clone(),
            created_by_username: session.display_name.clone(),
            user_photo_url: session.photo_url.clone(),
        };
        self.repo.push_comment(thread_id, comment).await
    }

    /// Removes a comment. Permitted to the comment's author or the thread's
    /// creator, nobody else.
    pub async fn delete_comment(
        &self,
        session: &Session,
        thread_id: Uuid,
        comment_id: Uuid,
    ) -> DomainResult<Thread> {
        let thread = self.get(thread_id).await?;
        let comment = thread
            .comments
            .iter()
            .find(|c| c.id == comment_id)
            .ok_or(DomainError::NotFound {
                kind: "comment",
                id: comment_id.to_string(),
            })?;

        let permitted =
            comment.created_by == session.uid || Self::is_owner(&thread, &session.uid);
        if !permitted {
            return Err(DomainError::Forbidden(
                "only the comment author or the thread creator can remove it".into(),
            ));
        }
        self.repo.remove_comment(thread_id, comment_id).await
    }

    /// Route-guard predicate: is `uid` the creator of this thread?
    pub fn is_owner(thread: &Thread, uid: &UserId) -> bool {
        thread.created_by == *uid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domains::{MockClock, MockThreadRepo};

    fn session(uid: &str) -> Session {
        Session {
            uid: UserId::from(uid),
            display_name: format!("{uid}-name"),
            email: format!("{uid}@example.com"),
            photo_url: None,
        }
    }

    fn fixed_clock() -> MockClock {
        let mut clock = MockClock::new();
        clock.expect_now().returning(Utc::now);
        clock
    }

    fn thread_by(uid: &str) -> Thread {
        Thread {
            id: Uuid::new_v4(),
            title: "title".into(),
            content: "content".into(),
            created_by: UserId::from(uid),
            created_at: Utc::now(),
            participants: vec![UserId::from(uid)],
            comments: vec![],
            tags: vec![],
        }
    }

    fn comment_by(uid: &str) -> Comment {
        Comment {
            id: Uuid::new_v4(),
            text: "nice".into(),
            created_at: Utc::now(),
            created_by: UserId::from(uid),
            created_by_username: uid.into(),
            user_photo_url: None,
        }
    }

    #[tokio::test]
    async fn create_rejects_invalid_input_before_any_store_call() {
        let mut repo = MockThreadRepo::new();
        repo.expect_insert().never();

        let svc = ThreadService::new(Arc::new(repo), Arc::new(fixed_clock()));
        let err = svc
            .create(
                &session("u1"),
                NewThread {
                    title: "".into(),
                    content: "c".into(),
                    tags: vec![],
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn create_stamps_creator_as_first_participant() {
        let mut repo = MockThreadRepo::new();
        repo.expect_insert()
            .withf(|t: &Thread| t.participants == vec![UserId::from("u1")])
            .returning(|_| Ok(()));

        let svc = ThreadService::new(Arc::new(repo), Arc::new(fixed_clock()));
        let thread = svc
            .create(
                &session("u1"),
                NewThread {
                    title: "hello".into(),
                    content: "world".into(),
                    tags: vec!["tag".into()],
                },
            )
            .await
            .unwrap();
        assert_eq!(thread.created_by, UserId::from("u1"));
    }

    #[tokio::test]
    async fn update_is_creator_only() {
        let thread = thread_by("owner");
        let id = thread.id;

        let mut repo = MockThreadRepo::new();
        repo.expect_get().returning(move |_| Ok(Some(thread.clone())));
        repo.expect_update().never();

        let svc = ThreadService::new(Arc::new(repo), Arc::new(fixed_clock()));
        let err = svc
            .update(&session("intruder"), id, ThreadPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[tokio::test]
    async fn delete_comment_permits_author_and_thread_creator_only() {
        let mut thread = thread_by("owner");
        let comment = comment_by("author");
        let comment_id = comment.id;
        thread.comments.push(comment);
        let id = thread.id;

        let mut repo = MockThreadRepo::new();
        let returned = thread.clone();
        repo.expect_get().returning(move |_| Ok(Some(returned.clone())));
        let removed = thread.clone();
        repo.expect_remove_comment()
            .times(2)
            .returning(move |_, _| Ok(removed.clone()));

        let svc = ThreadService::new(Arc::new(repo), Arc::new(fixed_clock()));

        svc.delete_comment(&session("author"), id, comment_id)
            .await
            .expect("author may remove");
        svc.delete_comment(&session("owner"), id, comment_id)
            .await
            .expect("thread creator may remove");

        let err = svc
            .delete_comment(&session("bystander"), id, comment_id)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[tokio::test]
    async fn list_returns_newest_first() {
        let mut older = thread_by("u");
        older.created_at = Utc::now() - chrono::Duration::minutes(5);
        let newer = thread_by("u");
        let (old_id, new_id) = (older.id, newer.id);

        let mut repo = MockThreadRepo::new();
        repo.expect_list()
            .returning(move || Ok(vec![older.clone(), newer.clone()]));

        let svc = ThreadService::new(Arc::new(repo), Arc::new(fixed_clock()));
        let listed = svc.list().await.unwrap();
        assert_eq!(listed[0].id, new_id);
        assert_eq!(listed[1].id, old_id);
    }
}
