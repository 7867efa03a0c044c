use std::collections::HashSet;
use std::sync::Arc;

use domains::{CommentId, MemorialId};
use integration_tests::{Fixture, PASSCODE};
use services::{Authority, Cursor, PageRequest};

const SIZE: usize = 3;

async fn walk_comments(fx: &Fixture, id: MemorialId, first: PageRequest) -> Vec<Vec<CommentId>> {
    let mut pages = Vec::new();
    let mut request = first;
    loop {
        let page = fx.board.list_comments(id, &request).await.unwrap();
        assert_eq!(page.has_more, page.next_cursor.is_some());
        assert!(page.items.len() <= SIZE);
        pages.push(page.items.iter().map(|c| c.id).collect());
        match page.next_cursor {
            Some(cursor) => request = request.after(cursor),
            None => return pages,
        }
    }
}

#[tokio::test]
async fn every_live_comment_appears_exactly_once() {
    for n in [0, 1, SIZE, SIZE + 1, 2 * SIZE, 2 * SIZE + 1] {
        let fx = Fixture::new();
        let id = fx.memorial().await;
        let mut created = Vec::new();
        for i in 0..n {
            created.push(fx.comment(id, &format!("comment {i}")).await);
        }

        let pages = walk_comments(&fx, id, PageRequest::first(SIZE).oldest_first()).await;
        let seen: Vec<CommentId> = pages.iter().flatten().copied().collect();
        assert_eq!(seen, created, "n = {n}");
        assert_eq!(pages.len(), n.div_ceil(SIZE).max(1), "n = {n}");
        assert!(pages[..pages.len() - 1].iter().all(|p| p.len() == SIZE), "n = {n}");
    }
}

#[tokio::test]
async fn three_comments_in_pages_of_two() {
    let fx = Fixture::new();
    let id = fx.memorial().await;
    let c1 = fx.comment(id, "first").await;
    let c2 = fx.comment(id, "second").await;
    let c3 = fx.comment(id, "third").await;

    let request = PageRequest::first(2).oldest_first();
    let first = fx.board.list_comments(id, &request).await.unwrap();
    assert_eq!(first.items.iter().map(|c| c.id).collect::<Vec<_>>(), vec![c1, c2]);
    assert!(first.has_more);
    let cursor = first.next_cursor.unwrap();
    assert_eq!(cursor, Cursor::encode(&c2));

    let second = fx.board.list_comments(id, &request.after(cursor)).await.unwrap();
    assert_eq!(second.items.iter().map(|c| c.id).collect::<Vec<_>>(), vec![c3]);
    assert!(!second.has_more);
    assert!(second.next_cursor.is_none());
}

#[tokio::test]
async fn newest_first_walks_backwards() {
    let fx = Fixture::new();
    let id = fx.memorial().await;
    let mut created = Vec::new();
    for i in 0..7 {
        created.push(fx.comment(id, &format!("comment {i}")).await);
    }
    created.reverse();

    let pages = walk_comments(&fx, id, PageRequest::first(SIZE)).await;
    let seen: Vec<CommentId> = pages.into_iter().flatten().collect();
    assert_eq!(seen, created);
}

#[tokio::test]
async fn soft_deleted_comments_never_appear() {
    let fx = Fixture::new();
    let id = fx.memorial().await;
    let mut live = Vec::new();
    for i in 0..8 {
        let comment = fx.comment(id, &format!("comment {i}")).await;
        if i % 3 == 1 {
            fx.board
                .delete_comment(id, comment, Authority::passcode(PASSCODE))
                .await
                .unwrap();
        } else {
            live.push(comment);
        }
    }

    let pages = walk_comments(&fx, id, PageRequest::first(SIZE).oldest_first()).await;
    let seen: Vec<CommentId> = pages.into_iter().flatten().collect();
    assert_eq!(seen, live);
    assert_eq!(fx.board.memorial(id).await.unwrap().comment_count, live.len() as u64);
}

#[tokio::test]
async fn cursor_survives_deletion_of_its_row() {
    let fx = Fixture::new();
    let id = fx.memorial().await;
    let ids: Vec<CommentId> = {
        let mut ids = Vec::new();
        for i in 0..5 {
            ids.push(fx.comment(id, &format!("comment {i}")).await);
        }
        ids
    };

    let request = PageRequest::first(2).oldest_first();
    let first = fx.board.list_comments(id, &request).await.unwrap();
    fx.board
        .delete_comment(id, ids[1], Authority::Administrator)
        .await
        .unwrap();

    let cursor = first.next_cursor.unwrap();
    let second = fx.board.list_comments(id, &request.after(cursor)).await.unwrap();
    assert_eq!(second.items.iter().map(|c| c.id).collect::<Vec<_>>(), vec![ids[2], ids[3]]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_appends_never_duplicate_or_skip_existing_rows() {
    let fx = Fixture::new();
    let id = fx.memorial().await;
    let mut before = Vec::new();
    for i in 0..10 {
        before.push(fx.comment(id, &format!("before {i}")).await);
    }

    let writer = {
        let board = Arc::clone(&fx.board);
        tokio::spawn(async move {
            for i in 0..20 {
                board
                    .create_comment(id, services::Draft::new("late", format!("late {i}"), PASSCODE))
                    .await
                    .expect("comment created");
                tokio::task::yield_now().await;
            }
        })
    };

    let pages = walk_comments(&fx, id, PageRequest::first(SIZE).oldest_first()).await;
    writer.await.unwrap();

    let seen: Vec<CommentId> = pages.into_iter().flatten().collect();
    let unique: HashSet<CommentId> = seen.iter().copied().collect();
    assert_eq!(unique.len(), seen.len(), "duplicate row across pages");
    assert!(before.iter().all(|c| unique.contains(c)), "pre-existing row skipped");
    assert!(seen.windows(2).all(|w| w[0] < w[1]));
}

#[tokio::test]
async fn invalid_requests_are_validation_errors() {
    let fx = Fixture::new();
    let id = fx.memorial().await;

    let err = fx
        .board
        .list_comments(id, &PageRequest::first(0))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "validation.page_size");

    let err = fx
        .board
        .list_comments(id, &PageRequest::first(2).after(Cursor::from_token("not a cursor")))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "validation.invalid_cursor");

    // A reply cursor cannot resume a comment listing.
    let reply_cursor = Cursor::encode(&domains::ReplyId(3));
    let err = fx
        .board
        .list_comments(id, &PageRequest::first(2).after(reply_cursor))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "validation.invalid_cursor");
}

#[tokio::test]
async fn memorial_listing_pages_by_creation_time() {
    let fx = Fixture::new();
    let mut created = Vec::new();
    for _ in 0..5 {
        created.push(fx.memorial().await);
    }
    fx.board
        .delete_memorial(created[2], Authority::passcode(PASSCODE))
        .await
        .unwrap();
    created.remove(2);
    created.reverse();

    let mut seen = Vec::new();
    let mut request = PageRequest::first(2);
    loop {
        let page = fx.board.list_memorials(&request).await.unwrap();
        seen.extend(page.items.iter().map(|m| m.id));
        match page.next_cursor {
            Some(cursor) => request = request.after(cursor),
            None => break,
        }
    }
    assert_eq!(seen, created);
}

#[tokio::test]
async fn replies_page_under_their_comment() {
    let fx = Fixture::new();
    let id = fx.memorial().await;
    let comment = fx.comment(id, "parent").await;
    let other = fx.comment(id, "sibling").await;
    let mut replies = Vec::new();
    for _ in 0..4 {
        replies.push(fx.reply(id, comment).await);
    }
    fx.reply(id, other).await;

    let request = PageRequest::first(3).oldest_first();
    let first = fx.board.list_replies(id, comment, &request).await.unwrap();
    let cursor = first.next_cursor.clone().unwrap();
    let second = fx
        .board
        .list_replies(id, comment, &request.after(cursor))
        .await
        .unwrap();

    let seen: Vec<_> = first.items.iter().chain(&second.items).map(|r| r.id).collect();
    assert_eq!(seen, replies);
    assert!(!second.has_more);
}
