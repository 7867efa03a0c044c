use std::sync::Arc;

use domains::{BoardError, BoardResult, CommentId, KeysetQuery, MemorialId, MemorialKey, ReplyId};

use super::{check_id, MemorialBoard};
use crate::pagination::{Page, PageRequest};
use crate::views::{CommentView, MemorialSummary, ReplyView};

impl MemorialBoard {
    /// Live comments of a live memorial, without taking the lock.
    pub async fn list_comments(
        &self,
        memorial_id: MemorialId,
        request: &PageRequest,
    ) -> BoardResult<Page<CommentView>> {
        check_id("memorial_id", memorial_id.get())?;
        self.finder().memorial(memorial_id).await?;

        let comments = Arc::clone(&self.backends.comments);
        let page = self
            .paginator
            .page(request, |query: KeysetQuery<CommentId>| async move {
                comments.list_live(memorial_id, &query).await
            })
            .await?;
        Ok(page.map(CommentView::from))
    }

    /// Same as [`list_comments`](Self::list_comments) but under the read
    /// lock, so the page reflects every mutation that finished before it.
    pub async fn list_comments_consistent(
        &self,
        memorial_id: MemorialId,
        request: &PageRequest,
    ) -> BoardResult<Page<CommentView>> {
        check_id("memorial_id", memorial_id.get())?;
        let _guard = self
            .locks
            .read(memorial_id)
            .await
            .map_err(|_| BoardError::LockTimeout(memorial_id))?;
        self.list_comments(memorial_id, request).await
    }

    pub async fn list_replies(
        &self,
        memorial_id: MemorialId,
        comment_id: CommentId,
        request: &PageRequest,
    ) -> BoardResult<Page<ReplyView>> {
        check_id("memorial_id", memorial_id.get())?;
        check_id("comment_id", comment_id.get())?;
        let finder = self.finder();
        finder.memorial(memorial_id).await?;
        finder.comment(memorial_id, comment_id).await?;

        let replies = Arc::clone(&self.backends.replies);
        let page = self
            .paginator
            .page(request, |query: KeysetQuery<ReplyId>| async move {
                replies.list_live(comment_id, &query).await
            })
            .await?;
        Ok(page.map(ReplyView::from))
    }

    /// Live memorials ordered by creation time, then id.
    pub async fn list_memorials(&self, request: &PageRequest) -> BoardResult<Page<MemorialSummary>> {
        let memorials = Arc::clone(&self.backends.memorials);
        let page = self
            .paginator
            .page(request, |query: KeysetQuery<MemorialKey>| async move {
                memorials.list_live(&query).await
            })
            .await?;
        Ok(page.map(MemorialSummary::from))
    }
}
