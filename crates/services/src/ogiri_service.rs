//! # Ogiri Event Lifecycle
//!
//! Event creation, participation, the gated answer window, like toggling,
//! and the `Active → Completed` transition with best-answer selection.
//!
//! The transition runs as a compare-and-swap in the store port: any number
//! of observers may notice expiry (the sweeper, a submit on an expired
//! event, a direct call), compute the best answer, and race to complete —
//! exactly one wins, and `best_answer_id` is written only by the winner.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use domains::{
    Clock, DomainError, DomainResult, EventStatus, LikeOutcome, NewOgiriEvent, OgiriAnswer,
    OgiriEvent, OgiriRepo, Session, ThreadRepo, UserId,
};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::snapshot;
use crate::validation;

pub struct OgiriService {
    threads: Arc<dyn ThreadRepo>,
    repo: Arc<dyn OgiriRepo>,
    clock: Arc<dyn Clock>,
}

/// Record of a performed `Active → Completed` transition.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Completion {
    pub event_id: Uuid,
    pub best_answer_id: Option<Uuid>,
    pub ended_at: DateTime<Utc>,
}

impl OgiriService {
    pub fn new(
        threads: Arc<dyn ThreadRepo>,
        repo: Arc<dyn OgiriRepo>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            threads,
            repo,
            clock,
        }
    }

    /// Creates an event under an existing thread. The creator is its first
    /// participant.
    pub async fn create_event(
        &self,
        session: &Session,
        thread_id: Uuid,
        input: NewOgiriEvent,
    ) -> DomainResult<OgiriEvent> {
        validation::validate_new_event(&input)?;

        if self.threads.get(thread_id).await?.is_none() {
            return Err(DomainError::NotFound {
                kind: "thread",
                id: thread_id.to_string(),
            });
        }

        let event = OgiriEvent {
            id: Uuid::new_v4(),
            thread_id,
            created_by: session.uid.clone(),
            odai: input.odai,
            duration_minutes: input.duration_minutes,
            max_responses: input.max_responses,
            participants: vec![session.uid.clone()],
            status: EventStatus::Active,
            best_answer_id: None,
            created_at: self.clock.now(),
            ended_at: None,
        };
        self.repo.insert_event(event.clone()).await?;
        info!(
            event_id = %event.id,
            thread_id = %thread_id,
            duration_minutes = event.duration_minutes,
            "ogiri event created"
        );
        Ok(event)
    }

    pub async fn get_event(&self, thread_id: Uuid, event_id: Uuid) -> DomainResult<OgiriEvent> {
        self.repo
            .get_event(thread_id, event_id)
            .await?
            .ok_or(DomainError::NotFound {
                kind: "ogiri event",
                id: event_id.to_string(),
            })
    }

    /// Events under a thread, newest first.
    pub async fn list_events(&self, thread_id: Uuid) -> DomainResult<Vec<OgiriEvent>> {
        Ok(snapshot::events_newest_first(
            self.repo.list_events(thread_id).await?,
        ))
    }

    /// Adds the user to the event's participants. Idempotent.
    pub async fn join_event(
        &self,
        thread_id: Uuid,
        event_id: Uuid,
        user: &UserId,
    ) -> DomainResult<OgiriEvent> {
        let event = self.repo.add_participant(thread_id, event_id, user).await?;
        debug!(event_id = %event_id, user = %user, "joined ogiri event");
        Ok(event)
    }

    /// Submits an answer, gated in order by: window still open, caller under
    /// the per-user cap, non-empty trimmed text. No write happens on any
    /// violation.
    ///
    /// Observing an expired event here also triggers the completion
    /// transition, so expiry makes progress even without the sweeper.
    pub async fn submit_answer(
        &self,
        session: &Session,
        thread_id: Uuid,
        event_id: Uuid,
        content: &str,
    ) -> DomainResult<OgiriAnswer> {
        let event = self.get_event(thread_id, event_id).await?;
        let now = self.clock.now();

        if event.is_completed() || event.is_expired(now) {
            self.complete_if_expired(thread_id, event_id).await?;
            return Err(DomainError::EventExpired);
        }

        let submitted = self.repo.count_answers_by(event_id, &session.uid).await?;
        if submitted >= event.max_responses {
            return Err(DomainError::AnswerLimitReached {
                max_responses: event.max_responses,
            });
        }

        let text = content.trim();
        if text.is_empty() {
            return Err(DomainError::EmptyAnswer);
        }

        let answer = OgiriAnswer {
            id: Uuid::new_v4(),
            event_id,
            content: text.to_owned(),
            created_at: now,
            user_id: session.uid.clone(),
            likes: 0,
            liked_by: BTreeSet::new(),
        };
        self.repo.insert_answer(answer.clone()).await?;
        info!(event_id = %event_id, user = %session.uid, "answer submitted");
        Ok(answer)
    }

    /// Answers in store enumeration order.
    pub async fn list_answers(&self, event_id: Uuid) -> DomainResult<Vec<OgiriAnswer>> {
        self.repo.list_answers(event_id).await
    }

    /// Countdown for an event against this service's clock.
    pub fn remaining(&self, event: &OgiriEvent) -> RemainingTime {
        remaining_time(event, self.clock.now())
    }

    /// Toggle semantics: likes if the user hasn't, unlikes if they have.
    /// The store applies counter and membership in one mutation.
    pub async fn toggle_like(
        &self,
        event_id: Uuid,
        answer_id: Uuid,
        user: &UserId,
    ) -> DomainResult<LikeOutcome> {
        let outcome = self.repo.apply_like(event_id, answer_id, user).await?;
        debug!(
            answer_id = %answer_id,
            user = %user,
            liked = outcome.liked,
            likes = outcome.answer.likes,
            "like toggled"
        );
        Ok(outcome)
    }

    /// Completes the event if its window has closed: selects the best
    /// answer and attempts the compare-and-swap transition.
    ///
    /// Returns the completion record if THIS call performed the transition;
    /// `None` if the event is still open, already completed, or another
    /// observer won the race. An event expiring with zero answers still
    /// completes, with no best answer.
    pub async fn complete_if_expired(
        &self,
        thread_id: Uuid,
        event_id: Uuid,
    ) -> DomainResult<Option<Completion>> {
        let event = self.get_event(thread_id, event_id).await?;
        let now = self.clock.now();
        if event.is_completed() || !event.is_expired(now) {
            return Ok(None);
        }

        let answers = self.repo.list_answers(event_id).await?;
        let best_answer_id = select_best_answer(&answers).map(|a| a.id);

        let won = self
            .repo
            .complete_event(thread_id, event_id, best_answer_id, now)
            .await?;
        if !won {
            debug!(event_id = %event_id, "completion already performed by another observer");
            return Ok(None);
        }

        info!(
            event_id = %event_id,
            best_answer = ?best_answer_id,
            answers = answers.len(),
            "ogiri event completed"
        );
        Ok(Some(Completion {
            event_id,
            best_answer_id,
            ended_at: now,
        }))
    }
}

/// The answer with the maximum like count; the first one in enumeration
/// order wins ties. `None` for an empty slate.
pub fn select_best_answer(answers: &[OgiriAnswer]) -> Option<&OgiriAnswer> {
    let mut best: Option<&OgiriAnswer> = None;
    for answer in answers {
        match best {
            Some(current) if answer.likes <= current.likes => {}
            _ => best = Some(answer),
        }
    }
    best
}

/// Display-only countdown, clamped at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RemainingTime {
    pub minutes: i64,
    pub seconds: i64,
}

impl fmt::Display for RemainingTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02}", self.minutes, self.seconds)
    }
}

/// Whole minutes/seconds until the answer window closes. Presentational
/// only; never a source of lifecycle authority.
pub fn remaining_time(event: &OgiriEvent, now: DateTime<Utc>) -> RemainingTime {
    let left = (event.end_time() - now).num_seconds().max(0);
    RemainingTime {
        minutes: left / 60,
        seconds: left % 60,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use domains::{MockClock, MockOgiriRepo, MockThreadRepo, Odai};

    fn session(uid: &str) -> Session {
        Session {
            uid: UserId::from(uid),
            display_name: uid.into(),
            email: format!("{uid}@example.com"),
            photo_url: None,
        }
    }

    fn clock_at(t: DateTime<Utc>) -> MockClock {
        let mut clock = MockClock::new();
        clock.expect_now().returning(move || t);
        clock
    }

    fn active_event(created_at: DateTime<Utc>, duration_minutes: u32) -> OgiriEvent {
        OgiriEvent {
            id: Uuid::new_v4(),
            thread_id: Uuid::new_v4(),
            created_by: UserId::from("host"),
            odai: Odai::Text {
                title: "What did the cat actually mean?".into(),
            },
            duration_minutes,
            max_responses: 1,
            participants: vec![UserId::from("host")],
            status: EventStatus::Active,
            best_answer_id: None,
            created_at,
            ended_at: None,
        }
    }

    fn answer(event_id: Uuid, uid: &str, likes: u32) -> OgiriAnswer {
        let liked_by: BTreeSet<UserId> =
            (0..likes).map(|i| UserId(format!("fan{i}"))).collect();
        OgiriAnswer {
            id: Uuid::new_v4(),
            event_id,
            content: "punchline".into(),
            created_at: Utc::now(),
            user_id: UserId::from(uid),
            likes,
            liked_by,
        }
    }

    fn service(
        threads: MockThreadRepo,
        repo: MockOgiriRepo,
        clock: MockClock,
    ) -> OgiriService {
        OgiriService::new(Arc::new(threads), Arc::new(repo), Arc::new(clock))
    }

    #[tokio::test]
    async fn submit_past_expiry_errors_and_triggers_completion() {
        let t0 = Utc::now();
        let event = active_event(t0, 1);
        let (thread_id, event_id) = (event.thread_id, event.id);

        let mut repo = MockOgiriRepo::new();
        let ev = event.clone();
        repo.expect_get_event()
            .returning(move |_, _| Ok(Some(ev.clone())));
        repo.expect_list_answers().returning(move |_| Ok(vec![]));
        repo.expect_complete_event()
            .times(1)
            .returning(|_, _, _, _| Ok(true));
        repo.expect_insert_answer().never();

        let svc = service(
            MockThreadRepo::new(),
            repo,
            clock_at(t0 + Duration::seconds(65)),
        );
        let err = svc
            .submit_answer(&session("u1"), thread_id, event_id, "late")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::EventExpired));
    }

    #[tokio::test]
    async fn submit_over_limit_errors_and_writes_nothing() {
        let t0 = Utc::now();
        let event = active_event(t0, 10);
        let (thread_id, event_id) = (event.thread_id, event.id);

        let mut repo = MockOgiriRepo::new();
        let ev = event.clone();
        repo.expect_get_event()
            .returning(move |_, _| Ok(Some(ev.clone())));
        repo.expect_count_answers_by().returning(|_, _| Ok(1));
        repo.expect_insert_answer().never();

        let svc = service(MockThreadRepo::new(), repo, clock_at(t0));
        let err = svc
            .submit_answer(&session("u1"), thread_id, event_id, "again")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::AnswerLimitReached { max_responses: 1 }
        ));
    }

    #[tokio::test]
    async fn submit_blank_text_errors_and_writes_nothing() {
        let t0 = Utc::now();
        let event = active_event(t0, 10);
        let (thread_id, event_id) = (event.thread_id, event.id);

        let mut repo = MockOgiriRepo::new();
        let ev = event.clone();
        repo.expect_get_event()
            .returning(move |_, _| Ok(Some(ev.clone())));
        repo.expect_count_answers_by().returning(|_, _| Ok(0));
        repo.expect_insert_answer().never();

        let svc = service(MockThreadRepo::new(), repo, clock_at(t0));
        let err = svc
            .submit_answer(&session("u1"), thread_id, event_id, "   ")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::EmptyAnswer));
    }

    #[tokio::test]
    async fn open_window_submission_is_stored_trimmed() {
        let t0 = Utc::now();
        let event = active_event(t0, 10);
        let (thread_id, event_id) = (event.thread_id, event.id);

        let mut repo = MockOgiriRepo::new();
        let ev = event.clone();
        repo.expect_get_event()
            .returning(move |_, _| Ok(Some(ev.clone())));
        repo.expect_count_answers_by().returning(|_, _| Ok(0));
        repo.expect_insert_answer()
            .withf(|a: &OgiriAnswer| a.content == "boke" && a.likes == 0)
            .returning(|_| Ok(()));

        let svc = service(MockThreadRepo::new(), repo, clock_at(t0));
        let stored = svc
            .submit_answer(&session("u1"), thread_id, event_id, "  boke  ")
            .await
            .unwrap();
        assert_eq!(stored.content, "boke");
        assert!(stored.liked_by.is_empty());
    }

    #[tokio::test]
    async fn completion_race_loser_gets_none() {
        let t0 = Utc::now();
        let event = active_event(t0, 1);
        let (thread_id, event_id) = (event.thread_id, event.id);

        let mut repo = MockOgiriRepo::new();
        let ev = event.clone();
        repo.expect_get_event()
            .returning(move |_, _| Ok(Some(ev.clone())));
        repo.expect_list_answers()
            .returning(move |id| Ok(vec![answer(id, "u1", 2)]));
        // another observer already performed the transition
        repo.expect_complete_event().returning(|_, _, _, _| Ok(false));

        let svc = service(
            MockThreadRepo::new(),
            repo,
            clock_at(t0 + Duration::minutes(2)),
        );
        let outcome = svc.complete_if_expired(thread_id, event_id).await.unwrap();
        assert!(outcome.is_none());
    }

    #[tokio::test]
    async fn zero_answer_expiry_completes_with_no_best_answer() {
        let t0 = Utc::now();
        let event = active_event(t0, 1);
        let (thread_id, event_id) = (event.thread_id, event.id);

        let mut repo = MockOgiriRepo::new();
        let ev = event.clone();
        repo.expect_get_event()
            .returning(move |_, _| Ok(Some(ev.clone())));
        repo.expect_list_answers().returning(|_| Ok(vec![]));
        repo.expect_complete_event()
            .withf(|_, _, best, _| best.is_none())
            .returning(|_, _, _, _| Ok(true));

        let svc = service(
            MockThreadRepo::new(),
            repo,
            clock_at(t0 + Duration::minutes(2)),
        );
        let completion = svc
            .complete_if_expired(thread_id, event_id)
            .await
            .unwrap()
            .expect("this observer should win");
        assert_eq!(completion.best_answer_id, None);
    }

    #[tokio::test]
    async fn still_open_event_is_left_alone() {
        let t0 = Utc::now();
        let event = active_event(t0, 10);
        let (thread_id, event_id) = (event.thread_id, event.id);

        let mut repo = MockOgiriRepo::new();
        let ev = event.clone();
        repo.expect_get_event()
            .returning(move |_, _| Ok(Some(ev.clone())));
        repo.expect_complete_event().never();

        let svc = service(MockThreadRepo::new(), repo, clock_at(t0));
        assert!(svc
            .complete_if_expired(thread_id, event_id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn create_event_requires_existing_thread() {
        let mut threads = MockThreadRepo::new();
        threads.expect_get().returning(|_| Ok(None));
        let mut repo = MockOgiriRepo::new();
        repo.expect_insert_event().never();

        let svc = service(threads, repo, clock_at(Utc::now()));
        let err = svc
            .create_event(
                &session("u1"),
                Uuid::new_v4(),
                NewOgiriEvent {
                    odai: Odai::Text {
                        title: "odai".into(),
                    },
                    duration_minutes: 5,
                    max_responses: 3,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { kind: "thread", .. }));
    }

    #[test]
    fn best_answer_is_max_likes_first_wins_ties() {
        let event_id = Uuid::new_v4();
        let a = answer(event_id, "a", 2);
        let b = answer(event_id, "b", 5);
        let c = answer(event_id, "c", 5);

        let answers = vec![a.clone(), b.clone(), c.clone()];
        assert_eq!(select_best_answer(&answers).unwrap().id, b.id);

        assert!(select_best_answer(&[]).is_none());

        // uniquely maximal
        let answers = vec![a.clone(), answer(event_id, "d", 1)];
        assert_eq!(select_best_answer(&answers).unwrap().id, a.id);
    }

    #[test]
    fn remaining_time_formats_and_clamps() {
        let t0 = Utc::now();
        let event = active_event(t0, 2);

        let left = remaining_time(&event, t0 + Duration::seconds(15));
        assert_eq!((left.minutes, left.seconds), (1, 45));
        assert_eq!(left.to_string(), "1:45");

        let past = remaining_time(&event, t0 + Duration::minutes(5));
        assert_eq!((past.minutes, past.seconds), (0, 0));
        assert_eq!(past.to_string(), "0:00");
    }
}
