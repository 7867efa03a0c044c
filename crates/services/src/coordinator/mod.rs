//! # Mutation Coordinator
//!
//! Every change to a memorial, its comments or its replies follows the same
//! sequence:
//!
//! 1. format validation, before any lock
//! 2. the memorial's write lock
//! 3. re-resolution of the targets under the lock
//! 4. state-dependent checks (deleted, passcode, ownership)
//! 5. the write
//! 6. release, by dropping the session on every exit path
//!
//! Listings skip the lock unless the caller asks for the read-locked variant.

mod comments;
mod listing;
mod memorials;
mod replies;

use std::sync::Arc;

use domains::{
    BoardError, BoardResult, CommentRepository, MemorialId, MemorialRepository, PasscodeError,
    PasscodeHash, PasscodeHasher, ReplyRepository, Resource,
};

use crate::finder::ResourceFinder;
use crate::lock_registry::LockRegistry;
use crate::pagination::Paginator;
use crate::requests::{Authority, Mutation, Updated};
use crate::session::WriteSession;
use crate::validation::{self, Limits};

/// The adapters the coordinator drives. Kept private to the board so writes
/// cannot bypass the lock.
#[derive(Clone)]
pub struct Backends {
    pub(crate) memorials: Arc<dyn MemorialRepository>,
    pub(crate) comments: Arc<dyn CommentRepository>,
    pub(crate) replies: Arc<dyn ReplyRepository>,
    pub(crate) hasher: Arc<dyn PasscodeHasher>,
}

impl Backends {
    pub fn new(
        memorials: Arc<dyn MemorialRepository>,
        comments: Arc<dyn CommentRepository>,
        replies: Arc<dyn ReplyRepository>,
        hasher: Arc<dyn PasscodeHasher>,
    ) -> Self {
        Self {
            memorials,
            comments,
            replies,
            hasher,
        }
    }

    pub(crate) fn finder(&self) -> ResourceFinder<'_> {
        ResourceFinder::new(
            self.memorials.as_ref(),
            self.comments.as_ref(),
            self.replies.as_ref(),
        )
    }
}

/// Entry point for the request layer. Cheap to share behind an `Arc`.
pub struct MemorialBoard {
    backends: Backends,
    locks: Arc<LockRegistry<MemorialId>>,
    limits: Limits,
    paginator: Paginator,
}

impl MemorialBoard {
    pub fn new(
        backends: Backends,
        locks: Arc<LockRegistry<MemorialId>>,
        limits: Limits,
        paginator: Paginator,
    ) -> Self {
        Self {
            backends,
            locks,
            limits,
            paginator,
        }
    }

    pub fn locks(&self) -> &Arc<LockRegistry<MemorialId>> {
        &self.locks
    }

    /// Lock-free lookups, for pre-checks and read views.
    pub fn finder(&self) -> ResourceFinder<'_> {
        self.backends.finder()
    }

    /// Applies any mutation to an existing memorial.
    pub async fn mutate(&self, memorial_id: MemorialId, mutation: Mutation) -> BoardResult<Updated> {
        tracing::debug!(%memorial_id, kind = mutation.kind(), "mutate");
        match mutation {
            Mutation::IncrementEmotion(emotion) => self
                .increment_emotion(memorial_id, emotion)
                .await
                .map(Updated::Memorial),
            Mutation::UpdateMemorial(edit) => self
                .update_memorial(memorial_id, edit)
                .await
                .map(Updated::Memorial),
            Mutation::DeleteMemorial(authority) => self
                .delete_memorial(memorial_id, authority)
                .await
                .map(Updated::Deleted),
            Mutation::CreateComment(draft) => self
                .create_comment(memorial_id, draft)
                .await
                .map(Updated::Comment),
            Mutation::UpdateComment { comment_id, edit } => self
                .update_comment(memorial_id, comment_id, edit)
                .await
                .map(Updated::Comment),
            Mutation::DeleteComment { comment_id, authority } => self
                .delete_comment(memorial_id, comment_id, authority)
                .await
                .map(Updated::Deleted),
            Mutation::CreateReply { comment_id, draft } => self
                .create_reply(memorial_id, comment_id, draft)
                .await
                .map(Updated::Reply),
            Mutation::UpdateReply { comment_id, reply_id, edit } => self
                .update_reply(memorial_id, comment_id, reply_id, edit)
                .await
                .map(Updated::Reply),
            Mutation::DeleteReply { comment_id, reply_id, authority } => self
                .delete_reply(memorial_id, comment_id, reply_id, authority)
                .await
                .map(Updated::Deleted),
        }
    }

    async fn session(&self, memorial_id: MemorialId) -> BoardResult<WriteSession<'_>> {
        let guard = self.locks.write(memorial_id).await.map_err(|timeout| {
            tracing::warn!(%memorial_id, waited = ?timeout.waited, "memorial lock timed out");
            BoardError::LockTimeout(memorial_id)
        })?;
        Ok(WriteSession::new(guard, &self.backends))
    }

    /// Argon2 is CPU-bound, so hashing runs on the blocking pool.
    async fn hash_passcode(&self, passcode: &str) -> BoardResult<PasscodeHash> {
        let hasher = Arc::clone(&self.backends.hasher);
        let passcode = passcode.to_string();
        let hash = tokio::task::spawn_blocking(move || hasher.hash(&passcode))
            .await
            .map_err(|e| PasscodeError::Hashing(format!("spawn_blocking failed: {e}")))??;
        Ok(hash)
    }

    async fn authorize(
        &self,
        authority: &Authority,
        hash: &PasscodeHash,
        resource: Resource,
        id: i64,
    ) -> BoardResult<()> {
        let passcode = match authority {
            Authority::Administrator => {
                tracing::info!(%resource, id, "administrative override");
                return Ok(());
            }
            Authority::Passcode(passcode) => passcode.clone(),
        };
        let hasher = Arc::clone(&self.backends.hasher);
        let hash = hash.clone();
        let matched = tokio::task::spawn_blocking(move || hasher.verify(&passcode, &hash))
            .await
            .map_err(|e| PasscodeError::Hashing(format!("spawn_blocking failed: {e}")))?;
        if matched {
            Ok(())
        } else {
            tracing::warn!(%resource, id, "passcode mismatch");
            Err(BoardError::AuthorizationFailed { resource, id })
        }
    }
}

fn check_id(field: &'static str, value: i64) -> BoardResult<()> {
    Ok(validation::id(field, value)?)
}
