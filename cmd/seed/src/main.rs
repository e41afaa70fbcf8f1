//! # Seed
//!
//! Populates a fresh store with demo data and walks one Ogiri event through
//! its whole lifecycle on a manual clock, printing the resulting documents.
//! Useful as a smoke run and as executable documentation of the flow.

use std::sync::Arc;

use anyhow::Result;
use chrono::{Duration, Utc};
use domains::{NewOgiriEvent, NewThread, Odai, Session, UserId};
use fake::faker::lorem::en::Sentence;
use fake::faker::name::en::Name;
use fake::Fake;
use services::{ManualClock, OgiriService, ThreadService};
use storage_adapters::MemoryStore;

fn demo_session(n: usize) -> Session {
    let display_name: String = Name().fake();
    Session {
        uid: UserId(format!("demo-user-{n}")),
        display_name,
        email: format!("demo{n}@ogirihub.local"),
        photo_url: None,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::at(Utc::now()));
    let threads = ThreadService::new(store.clone(), clock.clone());
    let ogiri = OgiriService::new(store.clone(), store.clone(), clock.clone());

    let host = demo_session(0);
    let players: Vec<Session> = (1..=3usize).map(demo_session).collect();

    let thread = threads
        .create(
            &host,
            NewThread {
                title: "Friday Ogiri night".into(),
                content: Sentence(5..10).fake(),
                tags: vec!["ogiri".into(), "demo".into()],
            },
        )
        .await?;
    println!("thread {} — {}", thread.id, thread.title);

    for player in &players {
        threads.join(thread.id, &player.uid).await?;
        threads
            .add_comment(player, thread.id, &Sentence(3..8).fake::<String>())
            .await?;
    }

    let event = ogiri
        .create_event(
            &host,
            thread.id,
            NewOgiriEvent {
                odai: Odai::Text {
                    title: "Give the worst possible opening line for a wedding speech.".into(),
                },
                duration_minutes: 1,
                max_responses: 2,
            },
        )
        .await?;
    println!("event  {} — window {}", event.id, ogiri.remaining(&event));

    let mut answers = Vec::new();
    for player in &players {
        ogiri.join_event(thread.id, event.id, &player.uid).await?;
        let answer = ogiri
            .submit_answer(player, thread.id, event.id, &Sentence(4..9).fake::<String>())
            .await?;
        answers.push(answer);
    }

    // everyone likes the first answer, the host likes the second
    for player in &players {
        ogiri.toggle_like(event.id, answers[0].id, &player.uid).await?;
    }
    ogiri.toggle_like(event.id, answers[1].id, &host.uid).await?;

    clock.advance(Duration::seconds(90));
    let completion = ogiri
        .complete_if_expired(thread.id, event.id)
        .await?
        .expect("window elapsed, this observer completes the event");

    println!(
        "completed at {} — best answer {:?}",
        completion.ended_at, completion.best_answer_id
    );
    for answer in ogiri.list_answers(event.id).await? {
        let marker = if Some(answer.id) == completion.best_answer_id {
            "★"
        } else {
            " "
        };
        println!("  {marker} {:>2} likes  {}", answer.likes, answer.content);
    }

    Ok(())
}
