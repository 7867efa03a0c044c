//! Write access to one memorial's records, available only while its write
//! lock is held. The session owns the guard, so every write it performs is
//! covered by the lock, and it refuses records of any other memorial.

use domains::{
    BoardError, BoardResult, Comment, CommentId, Memorial, MemorialId, NewComment, NewReply,
    Reply, ReplyId, Resource,
};

use crate::coordinator::Backends;
use crate::finder::ResourceFinder;
use crate::lock_registry::WriteGuard;

pub(crate) struct WriteSession<'a> {
    guard: WriteGuard<MemorialId>,
    backends: &'a Backends,
}

impl<'a> WriteSession<'a> {
    pub(crate) fn new(guard: WriteGuard<MemorialId>, backends: &'a Backends) -> Self {
        Self { guard, backends }
    }

    pub(crate) fn memorial_id(&self) -> MemorialId {
        *self.guard.key()
    }

    fn finder(&self) -> ResourceFinder<'a> {
        self.backends.finder()
    }

    fn ensure_owned(&self, resource: Resource, id: i64, owner: MemorialId) -> BoardResult<()> {
        if owner != self.memorial_id() {
            return Err(BoardError::OwnershipMismatch {
                resource,
                id,
                parent: Resource::Memorial,
                parent_id: self.memorial_id().get(),
            });
        }
        Ok(())
    }

    pub(crate) async fn live_memorial(&self) -> BoardResult<Memorial> {
        self.finder().memorial(self.memorial_id()).await
    }

    pub(crate) async fn live_comment(&self, id: CommentId) -> BoardResult<Comment> {
        self.finder().comment(self.memorial_id(), id).await
    }

    pub(crate) async fn live_reply(&self, comment_id: CommentId, id: ReplyId) -> BoardResult<Reply> {
        self.finder().reply(self.memorial_id(), comment_id, id).await
    }

    pub(crate) async fn save_memorial(&self, memorial: &Memorial) -> BoardResult<()> {
        self.ensure_owned(Resource::Memorial, memorial.id.get(), memorial.id)?;
        Ok(self.backends.memorials.save(memorial).await?)
    }

    pub(crate) async fn insert_comment(&self, comment: NewComment) -> BoardResult<Comment> {
        self.ensure_owned(Resource::Comment, 0, comment.memorial_id)?;
        Ok(self.backends.comments.insert(comment).await?)
    }

    pub(crate) async fn save_comment(&self, comment: &Comment) -> BoardResult<()> {
        self.ensure_owned(Resource::Comment, comment.id.get(), comment.memorial_id)?;
        Ok(self.backends.comments.save(comment).await?)
    }

    pub(crate) async fn insert_reply(&self, reply: NewReply) -> BoardResult<Reply> {
        self.ensure_owned(Resource::Reply, 0, reply.memorial_id)?;
        Ok(self.backends.replies.insert(reply).await?)
    }

    pub(crate) async fn save_reply(&self, reply: &Reply) -> BoardResult<()> {
        self.ensure_owned(Resource::Reply, reply.id.get(), reply.memorial_id)?;
        Ok(self.backends.replies.save(reply).await?)
    }

    pub(crate) async fn count_comments(&self) -> BoardResult<u64> {
        Ok(self.backends.comments.count_live(self.memorial_id()).await?)
    }

    pub(crate) async fn comment_by_id(&self, id: CommentId) -> BoardResult<Option<Comment>> {
        Ok(self.backends.comments.find_by_id(id).await?)
    }

    pub(crate) async fn reply_by_id(&self, id: ReplyId) -> BoardResult<Option<Reply>> {
        Ok(self.backends.replies.find_by_id(id).await?)
    }

    pub(crate) async fn live_comment_ids(&self) -> BoardResult<Vec<CommentId>> {
        Ok(self.backends.comments.live_ids(self.memorial_id()).await?)
    }

    pub(crate) async fn live_reply_ids(&self) -> BoardResult<Vec<ReplyId>> {
        Ok(self.backends.replies.live_ids_for_memorial(self.memorial_id()).await?)
    }

    pub(crate) async fn live_reply_ids_of(&self, comment_id: CommentId) -> BoardResult<Vec<ReplyId>> {
        Ok(self.backends.replies.live_ids_for_comment(comment_id).await?)
    }
}
