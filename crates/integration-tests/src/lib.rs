//! Shared fixtures for the end-to-end suites: a board wired to the
//! in-memory store with a cheap Argon2 hasher, plus a reply repository that
//! can be told to fail.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use auth_adapters::Argon2Hasher;
use domains::{
    CommentId, KeysetQuery, MemorialId, NewReply, Reply, ReplyId, ReplyRepository, RepoResult,
    RepositoryError,
};
use services::{
    Backends, Draft, Limits, LockRegistry, MemorialBoard, Paginator, RegistrySettings,
};
use storage_adapters::InMemoryStore;

pub const PASSCODE: &str = "1234";

pub struct Fixture {
    pub board: Arc<MemorialBoard>,
    pub store: Arc<InMemoryStore>,
}

impl Fixture {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let board = build(store.clone(), store.clone());
        Self { board, store }
    }

    /// Same wiring, with replies routed through `replies` instead of the store.
    pub fn with_replies(replies: Arc<dyn ReplyRepository>) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let board = build(store.clone(), replies);
        Self { board, store }
    }

    pub async fn memorial(&self) -> MemorialId {
        self.board
            .create_memorial(Draft::new("memorial", "in loving memory", PASSCODE))
            .await
            .expect("memorial created")
            .id
    }

    pub async fn comment(&self, memorial_id: MemorialId, content: &str) -> CommentId {
        self.board
            .create_comment(memorial_id, Draft::new("guest", content, PASSCODE))
            .await
            .expect("comment created")
            .id
    }

    pub async fn reply(&self, memorial_id: MemorialId, comment_id: CommentId) -> ReplyId {
        self.board
            .create_reply(memorial_id, comment_id, Draft::new("family", "thank you", PASSCODE))
            .await
            .expect("reply created")
            .id
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

pub fn cheap_hasher() -> Argon2Hasher {
    Argon2Hasher::new(8, 1, 1, None).expect("valid argon2 params")
}

fn build(store: Arc<InMemoryStore>, replies: Arc<dyn ReplyRepository>) -> Arc<MemorialBoard> {
    let locks = LockRegistry::new(RegistrySettings {
        acquire_timeout: Some(Duration::from_secs(10)),
        ..RegistrySettings::default()
    });
    Arc::new(MemorialBoard::new(
        Backends::new(store.clone(), store, replies, Arc::new(cheap_hasher())),
        Arc::new(locks),
        Limits::default(),
        Paginator::new(10, 50),
    ))
}

/// Delegates to an inner store but fails every `save` after the first
/// `budget` successful ones until re-armed.
pub struct FlakyReplies {
    inner: Arc<InMemoryStore>,
    remaining: AtomicUsize,
}

impl FlakyReplies {
    pub fn new(inner: Arc<InMemoryStore>) -> Self {
        Self {
            inner,
            remaining: AtomicUsize::new(usize::MAX),
        }
    }

    pub fn fail_after(&self, budget: usize) {
        self.remaining.store(budget, Ordering::SeqCst);
    }

    pub fn heal(&self) {
        self.remaining.store(usize::MAX, Ordering::SeqCst);
    }
}

#[async_trait]
impl ReplyRepository for FlakyReplies {
    async fn find_by_id(&self, id: ReplyId) -> RepoResult<Option<Reply>> {
        ReplyRepository::find_by_id(self.inner.as_ref(), id).await
    }

    async fn insert(&self, reply: NewReply) -> RepoResult<Reply> {
        ReplyRepository::insert(self.inner.as_ref(), reply).await
    }

    async fn save(&self, reply: &Reply) -> RepoResult<()> {
        let allowed = self
            .remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if !allowed {
            return Err(RepositoryError::Unavailable("injected failure".into()));
        }
        ReplyRepository::save(self.inner.as_ref(), reply).await
    }

    async fn list_live(
        &self,
        comment_id: CommentId,
        query: &KeysetQuery<ReplyId>,
    ) -> RepoResult<Vec<Reply>> {
        ReplyRepository::list_live(self.inner.as_ref(), comment_id, query).await
    }

    async fn live_ids_for_comment(&self, comment_id: CommentId) -> RepoResult<Vec<ReplyId>> {
        self.inner.live_ids_for_comment(comment_id).await
    }

    async fn live_ids_for_memorial(&self, memorial_id: MemorialId) -> RepoResult<Vec<ReplyId>> {
        self.inner.live_ids_for_memorial(memorial_id).await
    }
}
