//! Shared fixtures for the cross-crate scenario tests.

use std::sync::Arc;

use chrono::Utc;
use domains::{Session, UserId};
use services::{ManualClock, OgiriService, ThreadService};
use storage_adapters::MemoryStore;

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub clock: Arc<ManualClock>,
    pub threads: Arc<ThreadService>,
    pub ogiri: Arc<OgiriService>,
}

/// A store, a manual clock pinned to now, and both services wired to them.
pub fn harness() -> Harness {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::at(Utc::now()));
    let threads = Arc::new(ThreadService::new(store.clone(), clock.clone()));
    let ogiri = Arc::new(OgiriService::new(store.clone(), store.clone(), clock.clone()));
    Harness {
        store,
        clock,
        threads,
        ogiri,
    }
}

pub fn session(uid: &str) -> Session {
    Session {
        uid: UserId::from(uid),
        display_name: format!("{uid}-name"),
        email: format!("{uid}@example.com"),
        photo_url: None,
    }
}
