use chrono::Utc;
use domains::{BoardResult, CommentId, MemorialId, NewReply, ReplyId, Resource};

use super::{check_id, MemorialBoard};
use crate::requests::{Authority, Draft, Edit};
use crate::views::{DeletionReport, ReplyView};

impl MemorialBoard {
    /// Replies hang off a live comment of a live memorial.
    #[tracing::instrument(skip_all, fields(%memorial_id, %comment_id))]
    pub async fn create_reply(
        &self,
        memorial_id: MemorialId,
        comment_id: CommentId,
        draft: Draft,
    ) -> BoardResult<ReplyView> {
        check_id("memorial_id", memorial_id.get())?;
        check_id("comment_id", comment_id.get())?;
        draft.validate(&self.limits)?;
        let passcode_hash = self.hash_passcode(&draft.passcode).await?;

        let session = self.session(memorial_id).await?;
        session.live_memorial().await?;
        session.live_comment(comment_id).await?;
        let reply = session
            .insert_reply(NewReply {
                memorial_id,
                comment_id,
                name: draft.name,
                content: draft.content,
                passcode_hash,
                written_at: Utc::now(),
            })
            .await?;
        tracing::debug!(reply = %reply.id, "reply created");
        Ok(reply.into())
    }

    #[tracing::instrument(skip_all, fields(%memorial_id, %comment_id, %reply_id))]
    pub async fn update_reply(
        &self,
        memorial_id: MemorialId,
        comment_id: CommentId,
        reply_id: ReplyId,
        edit: Edit,
    ) -> BoardResult<ReplyView> {
        check_id("memorial_id", memorial_id.get())?;
        check_id("comment_id", comment_id.get())?;
        check_id("reply_id", reply_id.get())?;
        edit.validate(&self.limits)?;

        let session = self.session(memorial_id).await?;
        session.live_memorial().await?;
        let mut reply = session.live_reply(comment_id, reply_id).await?;
        self.authorize(
            &edit.authority,
            &reply.passcode_hash,
            Resource::Reply,
            reply_id.get(),
        )
        .await?;
        if let Some(name) = edit.name {
            reply.name = name;
        }
        reply.content = edit.content;
        reply.updated_at = Some(Utc::now());
        session.save_reply(&reply).await?;
        Ok(reply.into())
    }

    #[tracing::instrument(skip_all, fields(%memorial_id, %comment_id, %reply_id))]
    pub async fn delete_reply(
        &self,
        memorial_id: MemorialId,
        comment_id: CommentId,
        reply_id: ReplyId,
        authority: Authority,
    ) -> BoardResult<DeletionReport> {
        check_id("memorial_id", memorial_id.get())?;
        check_id("comment_id", comment_id.get())?;
        check_id("reply_id", reply_id.get())?;
        authority.validate(&self.limits)?;

        let session = self.session(memorial_id).await?;
        session.live_memorial().await?;
        let mut reply = session.live_reply(comment_id, reply_id).await?;
        self.authorize(&authority, &reply.passcode_hash, Resource::Reply, reply_id.get()).await?;
        reply.deleted = true;
        reply.updated_at = Some(Utc::now());
        session.save_reply(&reply).await?;
        Ok(DeletionReport {
            replies: 1,
            ..DeletionReport::default()
        })
    }
}
