use domains::{BoardError, CommentId, Resource};
use integration_tests::{Fixture, PASSCODE};
use services::{Authority, Edit, PageRequest};

#[tokio::test]
async fn comment_under_another_memorial_is_a_mismatch_not_missing() {
    let fx = Fixture::new();
    let home = fx.memorial().await;
    let elsewhere = fx.memorial().await;
    let comment = fx.comment(home, "hello").await;

    let err = fx
        .board
        .update_comment(elsewhere, comment, Edit::content("hijack", Authority::passcode(PASSCODE)))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        BoardError::OwnershipMismatch {
            resource: Resource::Comment,
            parent: Resource::Memorial,
            ..
        }
    ));
    assert_eq!(err.code(), "comment.ownership_mismatch");

    let err = fx
        .board
        .update_comment(home, CommentId(9_999), Edit::content("x", Authority::passcode(PASSCODE)))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "comment.not_found");

    let view = fx
        .board
        .list_comments(home, &PageRequest::first(5))
        .await
        .unwrap();
    assert_eq!(view.items[0].content, "hello");
}

#[tokio::test]
async fn reply_paths_check_both_parents() {
    let fx = Fixture::new();
    let home = fx.memorial().await;
    let elsewhere = fx.memorial().await;
    let first = fx.comment(home, "first").await;
    let second = fx.comment(home, "second").await;
    let reply = fx.reply(home, first).await;

    let err = fx
        .board
        .delete_reply(home, second, reply, Authority::passcode(PASSCODE))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "reply.ownership_mismatch");

    let err = fx
        .board
        .delete_reply(elsewhere, first, reply, Authority::passcode(PASSCODE))
        .await
        .unwrap_err();
    assert!(matches!(err, BoardError::OwnershipMismatch { .. }));

    let err = fx
        .board
        .create_reply(elsewhere, first, services::Draft::new("x", "y", PASSCODE))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "comment.ownership_mismatch");
}

#[tokio::test]
async fn foreign_comment_listing_is_a_mismatch() {
    let fx = Fixture::new();
    let home = fx.memorial().await;
    let elsewhere = fx.memorial().await;
    let comment = fx.comment(home, "hello").await;

    let err = fx
        .board
        .list_replies(elsewhere, comment, &PageRequest::first(5))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "comment.ownership_mismatch");
}
