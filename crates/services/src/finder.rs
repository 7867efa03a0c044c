//! # Resource Finder
//!
//! Resolves identifiers to live records. Callers get a typed error for each
//! way a lookup can fail: absent, soft-deleted, or attached to a different
//! parent than the one named in the request.

use domains::{
    BoardError, BoardResult, Comment, CommentId, CommentRepository, Memorial, MemorialId,
    MemorialRepository, Reply, ReplyId, ReplyRepository, Resource,
};

#[derive(Clone, Copy)]
pub struct ResourceFinder<'a> {
    memorials: &'a dyn MemorialRepository,
    comments: &'a dyn CommentRepository,
    replies: &'a dyn ReplyRepository,
}

impl<'a> ResourceFinder<'a> {
    pub fn new(
        memorials: &'a dyn MemorialRepository,
        comments: &'a dyn CommentRepository,
        replies: &'a dyn ReplyRepository,
    ) -> Self {
        Self {
            memorials,
            comments,
            replies,
        }
    }

    pub async fn memorial(&self, id: MemorialId) -> BoardResult<Memorial> {
        let memorial = self
            .memorials
            .find_by_id(id)
            .await?
            .ok_or_else(|| BoardError::not_found(Resource::Memorial, id.get()))?;
        if memorial.deleted {
            return Err(BoardError::already_deleted(Resource::Memorial, id.get()));
        }
        Ok(memorial)
    }

    /// Ownership is checked before the deleted flag: a comment under another
    /// memorial is a mismatch whatever its state.
    pub async fn comment(&self, memorial_id: MemorialId, id: CommentId) -> BoardResult<Comment> {
        let comment = self
            .comments
            .find_by_id(id)
            .await?
            .ok_or_else(|| BoardError::not_found(Resource::Comment, id.get()))?;
        if comment.memorial_id != memorial_id {
            return Err(BoardError::OwnershipMismatch {
                resource: Resource::Comment,
                id: id.get(),
                parent: Resource::Memorial,
                parent_id: memorial_id.get(),
            });
        }
        if comment.deleted {
            return Err(BoardError::already_deleted(Resource::Comment, id.get()));
        }
        Ok(comment)
    }

    pub async fn reply(
        &self,
        memorial_id: MemorialId,
        comment_id: CommentId,
        id: ReplyId,
    ) -> BoardResult<Reply> {
        let reply = self
            .replies
            .find_by_id(id)
            .await?
            .ok_or_else(|| BoardError::not_found(Resource::Reply, id.get()))?;
        if reply.memorial_id != memorial_id {
            return Err(BoardError::OwnershipMismatch {
                resource: Resource::Reply,
                id: id.get(),
                parent: Resource::Memorial,
                parent_id: memorial_id.get(),
            });
        }
        if reply.comment_id != comment_id {
            return Err(BoardError::OwnershipMismatch {
                resource: Resource::Reply,
                id: id.get(),
                parent: Resource::Comment,
                parent_id: comment_id.get(),
            });
        }
        if reply.deleted {
            return Err(BoardError::already_deleted(Resource::Reply, id.get()));
        }
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domains::{
        MockCommentRepository, MockMemorialRepository, MockReplyRepository, PasscodeHash,
        RepositoryError,
    };

    fn comment(id: i64, memorial_id: i64, deleted: bool) -> Comment {
        Comment {
            id: CommentId(id),
            memorial_id: MemorialId(memorial_id),
            name: "guest".into(),
            content: "hello".into(),
            passcode_hash: PasscodeHash::new("hash"),
            written_at: Utc::now(),
            updated_at: None,
            deleted,
        }
    }

    fn with_comment(found: Option<Comment>) -> MockCommentRepository {
        let mut comments = MockCommentRepository::new();
        comments.expect_find_by_id().returning(move |_| Ok(found.clone()));
        comments
    }

    #[tokio::test]
    async fn missing_comment_is_not_found() {
        let (memorials, replies) = (MockMemorialRepository::new(), MockReplyRepository::new());
        let comments = with_comment(None);
        let finder = ResourceFinder::new(&memorials, &comments, &replies);

        let err = finder.comment(MemorialId(1), CommentId(5)).await.unwrap_err();
        assert_eq!(err.code(), "comment.not_found");
    }

    #[tokio::test]
    async fn foreign_comment_is_a_mismatch_even_when_deleted() {
        let (memorials, replies) = (MockMemorialRepository::new(), MockReplyRepository::new());
        let comments = with_comment(Some(comment(5, 2, true)));
        let finder = ResourceFinder::new(&memorials, &comments, &replies);

        let err = finder.comment(MemorialId(1), CommentId(5)).await.unwrap_err();
        assert!(matches!(
            err,
            BoardError::OwnershipMismatch { id: 5, parent_id: 1, .. }
        ));
    }

    #[tokio::test]
    async fn deleted_comment_is_already_deleted() {
        let (memorials, replies) = (MockMemorialRepository::new(), MockReplyRepository::new());
        let comments = with_comment(Some(comment(5, 1, true)));
        let finder = ResourceFinder::new(&memorials, &comments, &replies);

        let err = finder.comment(MemorialId(1), CommentId(5)).await.unwrap_err();
        assert_eq!(err.code(), "comment.already_deleted");
    }

    #[tokio::test]
    async fn repository_failure_propagates() {
        let (comments, replies) = (MockCommentRepository::new(), MockReplyRepository::new());
        let mut memorials = MockMemorialRepository::new();
        memorials
            .expect_find_by_id()
            .returning(|_| Err(RepositoryError::Unavailable("offline".into())));
        let finder = ResourceFinder::new(&memorials, &comments, &replies);

        let err = finder.memorial(MemorialId(1)).await.unwrap_err();
        assert!(matches!(err, BoardError::Repository(_)));
    }
}
