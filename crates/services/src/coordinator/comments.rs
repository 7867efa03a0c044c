use chrono::Utc;
use domains::{BoardResult, CommentId, MemorialId, NewComment, Resource};

use super::{check_id, MemorialBoard};
use crate::cascade;
use crate::requests::{Authority, Draft, Edit};
use crate::views::{CommentView, DeletionReport};

impl MemorialBoard {
    #[tracing::instrument(skip_all, fields(%memorial_id))]
    pub async fn create_comment(
        &self,
        memorial_id: MemorialId,
        draft: Draft,
    ) -> BoardResult<CommentView> {
        check_id("memorial_id", memorial_id.get())?;
        draft.validate(&self.limits)?;
        // Hashing is pure and slow; keep it outside the critical section.
        let passcode_hash = self.hash_passcode(&draft.passcode).await?;

        let session = self.session(memorial_id).await?;
        session.live_memorial().await?;
        let comment = session
            .insert_comment(NewComment {
                memorial_id,
                name: draft.name,
                content: draft.content,
                passcode_hash,
                written_at: Utc::now(),
            })
            .await?;
        tracing::debug!(comment = %comment.id, "comment created");
        Ok(comment.into())
    }

    #[tracing::instrument(skip_all, fields(%memorial_id, %comment_id))]
    pub async fn update_comment(
        &self,
        memorial_id: MemorialId,
        comment_id: CommentId,
        edit: Edit,
    ) -> BoardResult<CommentView> {
        check_id("memorial_id", memorial_id.get())?;
        check_id("comment_id", comment_id.get())?;
        edit.validate(&self.limits)?;

        let session = self.session(memorial_id).await?;
        session.live_memorial().await?;
        let mut comment = session.live_comment(comment_id).await?;
        self.authorize(
            &edit.authority,
            &comment.passcode_hash,
            Resource::Comment,
            comment_id.get(),
        )
        .await?;
        if let Some(name) = edit.name {
            comment.name = name;
        }
        comment.content = edit.content;
        comment.updated_at = Some(Utc::now());
        session.save_comment(&comment).await?;
        Ok(comment.into())
    }

    /// Soft-deletes the comment and its live replies.
    #[tracing::instrument(skip_all, fields(%memorial_id, %comment_id))]
    pub async fn delete_comment(
        &self,
        memorial_id: MemorialId,
        comment_id: CommentId,
        authority: Authority,
    ) -> BoardResult<DeletionReport> {
        check_id("memorial_id", memorial_id.get())?;
        check_id("comment_id", comment_id.get())?;
        authority.validate(&self.limits)?;

        let session = self.session(memorial_id).await?;
        session.live_memorial().await?;
        let comment = session.live_comment(comment_id).await?;
        self.authorize(
            &authority,
            &comment.passcode_hash,
            Resource::Comment,
            comment_id.get(),
        )
        .await?;
        cascade::delete_comment(&session, comment).await
    }
}
