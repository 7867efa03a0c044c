//! In-process store backed by sharded concurrent maps.
//!
//! Each call is atomic on its own (a single map operation), which matches the
//! per-call read-committed contract of the ports. Multi-step atomicity is the
//! coordinator's job.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use domains::{
    Comment, CommentId, CommentRepository, EmotionCounts, KeysetQuery, Memorial, MemorialId,
    MemorialKey, MemorialRepository, NewComment, NewMemorial, NewReply, Reply, ReplyId,
    ReplyRepository, RepoResult, RepositoryError,
};

#[derive(Debug, Default)]
pub struct InMemoryStore {
    memorials: DashMap<MemorialId, Memorial>,
    comments: DashMap<CommentId, Comment>,
    replies: DashMap<ReplyId, Reply>,
    memorial_seq: AtomicI64,
    comment_seq: AtomicI64,
    reply_seq: AtomicI64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next(seq: &AtomicI64) -> i64 {
        seq.fetch_add(1, Ordering::SeqCst) + 1
    }
}

fn unknown(resource: &str, id: i64) -> RepositoryError {
    RepositoryError::Rejected(format!("{resource} {id} was never inserted"))
}

#[async_trait]
impl MemorialRepository for InMemoryStore {
    async fn find_by_id(&self, id: MemorialId) -> RepoResult<Option<Memorial>> {
        Ok(self.memorials.get(&id).map(|m| m.clone()))
    }

    async fn insert(&self, memorial: NewMemorial) -> RepoResult<Memorial> {
        let record = Memorial {
            id: MemorialId(Self::next(&self.memorial_seq)),
            name: memorial.name,
            content: memorial.content,
            passcode_hash: memorial.passcode_hash,
            emotions: EmotionCounts::default(),
            created_at: memorial.created_at,
            updated_at: None,
            deleted: false,
        };
        self.memorials.insert(record.id, record.clone());
        tracing::trace!(id = %record.id, "memorial stored");
        Ok(record)
    }

    async fn save(&self, memorial: &Memorial) -> RepoResult<()> {
        let mut slot = self
            .memorials
            .get_mut(&memorial.id)
            .ok_or_else(|| unknown("memorial", memorial.id.get()))?;
        *slot = memorial.clone();
        Ok(())
    }

    async fn list_live(&self, query: &KeysetQuery<MemorialKey>) -> RepoResult<Vec<Memorial>> {
        let live = self
            .memorials
            .iter()
            .filter(|m| !m.deleted)
            .map(|m| m.value().clone());
        Ok(query.apply(live))
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn find_by_id(&self, id: CommentId) -> RepoResult<Option<Comment>> {
        Ok(self.comments.get(&id).map(|c| c.clone()))
    }

    async fn insert(&self, comment: NewComment) -> RepoResult<Comment> {
        let record = Comment {
            id: CommentId(Self::next(&self.comment_seq)),
            memorial_id: comment.memorial_id,
            name: comment.name,
            content: comment.content,
            passcode_hash: comment.passcode_hash,
            written_at: comment.written_at,
            updated_at: None,
            deleted: false,
        };
        self.comments.insert(record.id, record.clone());
        Ok(record)
    }

    async fn save(&self, comment: &Comment) -> RepoResult<()> {
        let mut slot = self
            .comments
            .get_mut(&comment.id)
            .ok_or_else(|| unknown("comment", comment.id.get()))?;
        *slot = comment.clone();
        Ok(())
    }

    async fn count_live(&self, memorial_id: MemorialId) -> RepoResult<u64> {
        let count = self
            .comments
            .iter()
            .filter(|c| c.memorial_id == memorial_id && !c.deleted)
            .count();
        Ok(count as u64)
    }

    async fn list_live(
        &self,
        memorial_id: MemorialId,
        query: &KeysetQuery<CommentId>,
    ) -> RepoResult<Vec<Comment>> {
        let live = self
            .comments
            .iter()
            .filter(|c| c.memorial_id == memorial_id && !c.deleted)
            .map(|c| c.value().clone());
        Ok(query.apply(live))
    }

    async fn live_ids(&self, memorial_id: MemorialId) -> RepoResult<Vec<CommentId>> {
        let mut ids: Vec<CommentId> = self
            .comments
            .iter()
            .filter(|c| c.memorial_id == memorial_id && !c.deleted)
            .map(|c| c.id)
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }
}

#[async_trait]
impl ReplyRepository for InMemoryStore {
    async fn find_by_id(&self, id: ReplyId) -> RepoResult<Option<Reply>> {
        Ok(self.replies.get(&id).map(|r| r.clone()))
    }

    async fn insert(&self, reply: NewReply) -> RepoResult<Reply> {
        let record = Reply {
            id: ReplyId(Self::next(&self.reply_seq)),
            memorial_id: reply.memorial_id,
            comment_id: reply.comment_id,
            name: reply.name,
            content: reply.content,
            passcode_hash: reply.passcode_hash,
            written_at: reply.written_at,
            updated_at: None,
            deleted: false,
        };
        self.replies.insert(record.id, record.clone());
        Ok(record)
    }

    async fn save(&self, reply: &Reply) -> RepoResult<()> {
        let mut slot = self
            .replies
            .get_mut(&reply.id)
            .ok_or_else(|| unknown("reply", reply.id.get()))?;
        *slot = reply.clone();
        Ok(())
    }

    async fn list_live(
        &self,
        comment_id: CommentId,
        query: &KeysetQuery<ReplyId>,
    ) -> RepoResult<Vec<Reply>> {
        let live = self
            .replies
            .iter()
            .filter(|r| r.comment_id == comment_id && !r.deleted)
            .map(|r| r.value().clone());
        Ok(query.apply(live))
    }

    async fn live_ids_for_comment(&self, comment_id: CommentId) -> RepoResult<Vec<ReplyId>> {
        let mut ids: Vec<ReplyId> = self
            .replies
            .iter()
            .filter(|r| r.comment_id == comment_id && !r.deleted)
            .map(|r| r.id)
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }

    async fn live_ids_for_memorial(&self, memorial_id: MemorialId) -> RepoResult<Vec<ReplyId>> {
        let mut ids: Vec<ReplyId> = self
            .replies
            .iter()
            .filter(|r| r.memorial_id == memorial_id && !r.deleted)
            .map(|r| r.id)
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use domains::{PasscodeHash, SortOrder};

    fn new_comment(memorial_id: i64) -> NewComment {
        NewComment {
            memorial_id: MemorialId(memorial_id),
            name: "guest".into(),
            content: "hello".into(),
            passcode_hash: PasscodeHash::new("hash"),
            written_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn ids_are_sequential_per_table() {
        let store = InMemoryStore::new();
        let first = CommentRepository::insert(&store, new_comment(1)).await.unwrap();
        let second = CommentRepository::insert(&store, new_comment(2)).await.unwrap();
        assert_eq!((first.id, second.id), (CommentId(1), CommentId(2)));
    }

    #[tokio::test]
    async fn saving_unknown_record_is_rejected() {
        let store = InMemoryStore::new();
        let mut comment = CommentRepository::insert(&store, new_comment(1)).await.unwrap();
        comment.id = CommentId(99);
        assert!(matches!(
            CommentRepository::save(&store, &comment).await,
            Err(RepositoryError::Rejected(_))
        ));
    }

    #[tokio::test]
    async fn listing_skips_deleted_and_other_memorials() {
        let store = InMemoryStore::new();
        for memorial in [1, 1, 2, 1] {
            CommentRepository::insert(&store, new_comment(memorial)).await.unwrap();
        }
        let mut second = CommentRepository::find_by_id(&store, CommentId(2))
            .await
            .unwrap()
            .unwrap();
        second.deleted = true;
        CommentRepository::save(&store, &second).await.unwrap();

        let query = KeysetQuery { after: None, order: SortOrder::Oldest, limit: 10 };
        let ids: Vec<_> = CommentRepository::list_live(&store, MemorialId(1), &query)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![CommentId(1), CommentId(4)]);
        assert_eq!(CommentRepository::count_live(&store, MemorialId(1)).await.unwrap(), 2);
        assert_eq!(
            CommentRepository::live_ids(&store, MemorialId(1)).await.unwrap(),
            vec![CommentId(1), CommentId(4)]
        );
    }

    #[tokio::test]
    async fn memorials_order_by_creation_time_then_id() {
        let store = InMemoryStore::new();
        let now = Utc::now();
        for offset in [0, 0, -1] {
            MemorialRepository::insert(
                &store,
                NewMemorial {
                    name: "name".into(),
                    content: "content".into(),
                    passcode_hash: PasscodeHash::new("hash"),
                    created_at: now + Duration::seconds(offset),
                },
            )
            .await
            .unwrap();
        }
        let query = KeysetQuery { after: None, order: SortOrder::Newest, limit: 10 };
        let ids: Vec<_> = MemorialRepository::list_live(&store, &query)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.id.get())
            .collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }
}
