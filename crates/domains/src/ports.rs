//! # Ports
//!
//! Contracts the core consumes. Adapters must provide at least
//! read-committed isolation per call; the core serializes multi-step
//! mutations itself through per-memorial locks.

use async_trait::async_trait;

use crate::errors::{PasscodeError, RepoResult};
use crate::models::{
    Comment, CommentId, Memorial, MemorialId, NewComment, NewMemorial, NewReply, PasscodeHash,
    Reply, ReplyId,
};
use crate::paging::{KeysetQuery, MemorialKey};

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait MemorialRepository: Send + Sync {
    /// Returns the record whether or not it is soft-deleted.
    async fn find_by_id(&self, id: MemorialId) -> RepoResult<Option<Memorial>>;
    async fn insert(&self, memorial: NewMemorial) -> RepoResult<Memorial>;
    async fn save(&self, memorial: &Memorial) -> RepoResult<()>;
    /// Live memorials past the query's exclusive bound, in query order.
    async fn list_live(&self, query: &KeysetQuery<MemorialKey>) -> RepoResult<Vec<Memorial>>;
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn find_by_id(&self, id: CommentId) -> RepoResult<Option<Comment>>;
    async fn insert(&self, comment: NewComment) -> RepoResult<Comment>;
    async fn save(&self, comment: &Comment) -> RepoResult<()>;
    async fn count_live(&self, memorial_id: MemorialId) -> RepoResult<u64>;
    async fn list_live(
        &self,
        memorial_id: MemorialId,
        query: &KeysetQuery<CommentId>,
    ) -> RepoResult<Vec<Comment>>;
    async fn live_ids(&self, memorial_id: MemorialId) -> RepoResult<Vec<CommentId>>;
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ReplyRepository: Send + Sync {
    async fn find_by_id(&self, id: ReplyId) -> RepoResult<Option<Reply>>;
    async fn insert(&self, reply: NewReply) -> RepoResult<Reply>;
    async fn save(&self, reply: &Reply) -> RepoResult<()>;
    async fn list_live(
        &self,
        comment_id: CommentId,
        query: &KeysetQuery<ReplyId>,
    ) -> RepoResult<Vec<Reply>>;
    async fn live_ids_for_comment(&self, comment_id: CommentId) -> RepoResult<Vec<ReplyId>>;
    async fn live_ids_for_memorial(&self, memorial_id: MemorialId) -> RepoResult<Vec<ReplyId>>;
}

/// One-way passcode hashing. Both operations are pure.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait PasscodeHasher: Send + Sync {
    fn hash(&self, passcode: &str) -> Result<PasscodeHash, PasscodeError>;
    fn verify(&self, passcode: &str, hash: &PasscodeHash) -> bool;
}

/// Resolves an error code (see `BoardError::code`) to user-facing text.
pub trait MessageResolver: Send + Sync {
    fn resolve(&self, code: &str, locale: &str) -> String;
}
