//! Pure snapshot ordering.
//!
//! List reads always re-fetch and re-sort; these functions make that cycle
//! an explicit, testable step instead of ambient view-layer state.

use domains::{OgiriEvent, Thread};

/// Threads ordered newest-first for the index view.
pub fn threads_newest_first(mut threads: Vec<Thread>) -> Vec<Thread> {
    threads.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    threads
}

/// Events under a thread, newest-first.
pub fn events_newest_first(mut events: Vec<OgiriEvent>) -> Vec<OgiriEvent> {
    events.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    events
}
