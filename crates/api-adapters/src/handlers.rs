//! # Handlers
//!
//! Thin coordination between HTTP requests and the services. Handlers do no
//! business logic of their own: they extract the session, call a service,
//! and shape the response.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use domains::{
    NewOgiriEvent, NewThread, OgiriAnswer, OgiriEvent, Session, Thread, ThreadPatch,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::guards::{is_thread_owner, BearerToken, CurrentUser};
use crate::AppState;

// ── Session ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInResponse {
    pub token: String,
    pub session: Session,
}

pub async fn sign_in(
    State(state): State<AppState>,
    Json(req): Json<SignInRequest>,
) -> Result<Json<SignInResponse>, ApiError> {
    let (token, session) = state.auth.sign_in(&req.email, &req.password).await?;
    Ok(Json(SignInResponse {
        token: token.0,
        session,
    }))
}

pub async fn sign_out(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> Result<StatusCode, ApiError> {
    state.auth.sign_out(&token).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn current_session(CurrentUser(session): CurrentUser) -> Json<Session> {
    Json(session)
}

// ── Threads ──────────────────────────────────────────────────────────────────

pub async fn list_threads(State(state): State<AppState>) -> Result<Json<Vec<Thread>>, ApiError> {
    Ok(Json(state.threads.list().await?))
}

pub async fn create_thread(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Json(input): Json<NewThread>,
) -> Result<(StatusCode, Json<Thread>), ApiError> {
    let thread = state.threads.create(&session, input).await?;
    state.metrics.threads_created.inc();
    Ok((StatusCode::CREATED, Json(thread)))
}

pub async fn get_thread(
    State(state): State<AppState>,
    Path(thread_id): Path<Uuid>,
) -> Result<Json<Thread>, ApiError> {
    Ok(Json(state.threads.get(thread_id).await?))
}

pub async fn update_thread(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(thread_id): Path<Uuid>,
    Json(patch): Json<ThreadPatch>,
) -> Result<Json<Thread>, ApiError> {
    Ok(Json(state.threads.update(&session, thread_id, patch).await?))
}

pub async fn delete_thread(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(thread_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.threads.delete(&session, thread_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// What the route guards need to know about the current user's relation to
/// a thread.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionsResponse {
    pub is_owner: bool,
    pub is_participant: bool,
}

pub async fn thread_permissions(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(thread_id): Path<Uuid>,
) -> Result<Json<PermissionsResponse>, ApiError> {
    let thread = state.threads.get(thread_id).await?;
    Ok(Json(PermissionsResponse {
        is_owner: is_thread_owner(&thread, &session.uid),
        is_participant: thread.participants.contains(&session.uid),
    }))
}

pub async fn join_thread(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(thread_id): Path<Uuid>,
) -> Result<Json<Thread>, ApiError> {
    Ok(Json(state.threads.join(thread_id, &session.uid).await?))
}

// ── Comments ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub text: String,
}

pub async fn add_comment(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(thread_id): Path<Uuid>,
    Json(req): Json<CommentRequest>,
) -> Result<(StatusCode, Json<Thread>), ApiError> {
    let thread = state
        .threads
        .add_comment(&session, thread_id, &req.text)
        .await?;
    Ok((StatusCode::CREATED, Json(thread)))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path((thread_id, comment_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Thread>, ApiError> {
    Ok(Json(
        state
            .threads
            .delete_comment(&session, thread_id, comment_id)
            .await?,
    ))
}

// ── Ogiri events ─────────────────────────────────────────────────────────────

/// Event document plus the display-only countdown.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventView {
    #[serde(flatten)]
    pub event: OgiriEvent,
    pub remaining: String,
}

pub async fn create_event(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(thread_id): Path<Uuid>,
    Json(input): Json<NewOgiriEvent>,
) -> Result<(StatusCode, Json<OgiriEvent>), ApiError> {
    let event = state.ogiri.create_event(&session, thread_id, input).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn list_events(
    State(state): State<AppState>,
    Path(thread_id): Path<Uuid>,
) -> Result<Json<Vec<OgiriEvent>>, ApiError> {
    Ok(Json(state.ogiri.list_events(thread_id).await?))
}

/// Reading an event is also an expiry observation: an expired-but-active
/// event is completed before it is returned.
pub async fn get_event(
    State(state): State<AppState>,
    Path((thread_id, event_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<EventView>, ApiError> {
    if let Some(_completion) = state.ogiri.complete_if_expired(thread_id, event_id).await? {
        state.metrics.events_completed.inc();
    }
    let event = state.ogiri.get_event(thread_id, event_id).await?;
    let remaining = state.ogiri.remaining(&event).to_string();
    Ok(Json(EventView { event, remaining }))
}

pub async fn join_event(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path((thread_id, event_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<OgiriEvent>, ApiError> {
    Ok(Json(
        state
            .ogiri
            .join_event(thread_id, event_id, &session.uid)
            .await?,
    ))
}

// ── Answers & likes ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub content: String,
}

pub async fn submit_answer(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path((thread_id, event_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<AnswerRequest>,
) -> Result<(StatusCode, Json<OgiriAnswer>), ApiError> {
    let answer = state
        .ogiri
        .submit_answer(&session, thread_id, event_id, &req.content)
        .await?;
    state.metrics.answers_submitted.inc();
    Ok((StatusCode::CREATED, Json(answer)))
}

pub async fn list_answers(
    State(state): State<AppState>,
    Path((_thread_id, event_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Vec<OgiriAnswer>>, ApiError> {
    Ok(Json(state.ogiri.list_answers(event_id).await?))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeResponse {
    pub liked: bool,
    pub answer: OgiriAnswer,
}

pub async fn toggle_like(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path((event_id, answer_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<LikeResponse>, ApiError> {
    let outcome = state
        .ogiri
        .toggle_like(event_id, answer_id, &session.uid)
        .await?;
    state.metrics.likes_toggled.inc();
    Ok(Json(LikeResponse {
        liked: outcome.liked,
        answer: outcome.answer,
    }))
}

// ── Operational ──────────────────────────────────────────────────────────────

pub async fn health() -> &'static str {
    "ok"
}

pub async fn metrics(State(state): State<AppState>) -> Result<String, ApiError> {
    state
        .metrics
        .render()
        .map_err(|e| ApiError(domains::DomainError::Store(format!("metrics encoding: {e}"))))
}
