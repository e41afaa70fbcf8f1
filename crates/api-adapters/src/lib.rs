//! # API Adapters
//!
//! The JSON service boundary: axum handlers over the services, the two
//! route-guard predicates (authenticated session, thread owner), error to
//! status-code mapping, and the metrics endpoint.

pub mod error;
pub mod guards;
pub mod handlers;
pub mod metrics;

use std::sync::Arc;

use axum::routing::{delete, get, post};
use axum::Router;
use domains::AuthProvider;
use services::{OgiriService, ThreadService};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::metrics::Metrics;

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<dyn AuthProvider>,
    pub threads: Arc<ThreadService>,
    pub ogiri: Arc<OgiriService>,
    pub metrics: Arc<Metrics>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .route(
            "/api/session",
            post(handlers::sign_in)
                .get(handlers::current_session)
                .delete(handlers::sign_out),
        )
        .route(
            "/api/threads",
            get(handlers::list_threads).post(handlers::create_thread),
        )
        .route(
            "/api/threads/{thread_id}",
            get(handlers::get_thread)
                .patch(handlers::update_thread)
                .delete(handlers::delete_thread),
        )
        .route(
            "/api/threads/{thread_id}/permissions",
            get(handlers::thread_permissions),
        )
        .route("/api/threads/{thread_id}/join", post(handlers::join_thread))
        .route(
            "/api/threads/{thread_id}/comments",
            post(handlers::add_comment),
        )
        .route(
            "/api/threads/{thread_id}/comments/{comment_id}",
            delete(handlers::delete_comment),
        )
        .route(
            "/api/threads/{thread_id}/events",
            get(handlers::list_events).post(handlers::create_event),
        )
        .route(
            "/api/threads/{thread_id}/events/{event_id}",
            get(handlers::get_event),
        )
        .route(
            "/api/threads/{thread_id}/events/{event_id}/join",
            post(handlers::join_event),
        )
        .route(
            "/api/threads/{thread_id}/events/{event_id}/answers",
            get(handlers::list_answers).post(handlers::submit_answer),
        )
        .route(
            "/api/events/{event_id}/answers/{answer_id}/like",
            post(handlers::toggle_like),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
