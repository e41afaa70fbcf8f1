//! Thread operations against the real store: creation, idempotent joins,
//! comment permissions, and the unused-but-present delete path.

use domains::{DomainError, NewThread, ThreadPatch, ThreadRepo, UserId};
use integration_tests::{harness, session};

fn new_thread(title: &str) -> NewThread {
    NewThread {
        title: title.into(),
        content: "content".into(),
        tags: vec!["tag".into()],
    }
}

#[tokio::test]
async fn joining_twice_adds_one_participant() {
    let h = harness();
    let creator = session("creator");
    let thread = h.threads.create(&creator, new_thread("hello")).await.unwrap();

    let joiner = UserId::from("joiner");
    h.threads.join(thread.id, &joiner).await.unwrap();
    let after = h.threads.join(thread.id, &joiner).await.unwrap();

    assert_eq!(after.participants.len(), 2);
    assert!(after.participants.contains(&joiner));
}

#[tokio::test]
async fn comments_carry_the_author_snapshot() {
    let h = harness();
    let creator = session("creator");
    let commenter = session("commenter");
    let thread = h.threads.create(&creator, new_thread("hello")).await.unwrap();

    let updated = h
        .threads
        .add_comment(&commenter, thread.id, "  good one  ")
        .await
        .unwrap();

    let comment = &updated.comments[0];
    assert_eq!(comment.text, "good one");
    assert_eq!(comment.created_by, commenter.uid);
    assert_eq!(comment.created_by_username, commenter.display_name);
}

#[tokio::test]
async fn comment_removal_respects_authorship() {
    let h = harness();
    let creator = session("creator");
    let commenter = session("commenter");
    let stranger = session("stranger");
    let thread = h.threads.create(&creator, new_thread("hello")).await.unwrap();

    let updated = h
        .threads
        .add_comment(&commenter, thread.id, "first")
        .await
        .unwrap();
    let comment_id = updated.comments[0].id;

    let err = h
        .threads
        .delete_comment(&stranger, thread.id, comment_id)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden(_)));

    // the thread creator may moderate other users' comments
    let after = h
        .threads
        .delete_comment(&creator, thread.id, comment_id)
        .await
        .unwrap();
    assert!(after.comments.is_empty());
}

#[tokio::test]
async fn updates_are_validated_and_owner_gated() {
    let h = harness();
    let creator = session("creator");
    let thread = h.threads.create(&creator, new_thread("hello")).await.unwrap();

    let err = h
        .threads
        .update(
            &creator,
            thread.id,
            ThreadPatch {
                title: Some(String::new()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));

    let updated = h
        .threads
        .update(
            &creator,
            thread.id,
            ThreadPatch {
                title: Some("renamed".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.title, "renamed");
}

#[tokio::test]
async fn delete_removes_the_document() {
    let h = harness();
    let creator = session("creator");
    let thread = h.threads.create(&creator, new_thread("hello")).await.unwrap();

    h.threads.delete(&creator, thread.id).await.unwrap();
    let err = h.threads.get(thread.id).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound { kind: "thread", .. }));

    assert!(ThreadRepo::list(&*h.store).await.unwrap().is_empty());
}
