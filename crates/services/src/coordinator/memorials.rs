use chrono::Utc;
use domains::{BoardResult, Emotion, MemorialId, NewMemorial, Resource};

use super::{check_id, MemorialBoard};
use crate::cascade;
use crate::requests::{Authority, Draft, Edit};
use crate::views::{DeletionReport, MemorialView};

impl MemorialBoard {
    /// New memorials have no lock yet; the id is assigned by storage.
    #[tracing::instrument(skip_all)]
    pub async fn create_memorial(&self, draft: Draft) -> BoardResult<MemorialView> {
        draft.validate(&self.limits)?;
        let passcode_hash = self.hash_passcode(&draft.passcode).await?;
        let memorial = self
            .backends
            .memorials
            .insert(NewMemorial {
                name: draft.name,
                content: draft.content,
                passcode_hash,
                created_at: Utc::now(),
            })
            .await?;
        tracing::debug!(memorial = %memorial.id, "memorial created");
        Ok(MemorialView::new(memorial, 0))
    }

    /// Unlocked read of a live memorial with its live comment count.
    pub async fn memorial(&self, memorial_id: MemorialId) -> BoardResult<MemorialView> {
        check_id("memorial_id", memorial_id.get())?;
        let memorial = self.finder().memorial(memorial_id).await?;
        let comments = self.backends.comments.count_live(memorial_id).await?;
        Ok(MemorialView::new(memorial, comments))
    }

    #[tracing::instrument(skip_all, fields(%memorial_id, %emotion))]
    pub async fn increment_emotion(
        &self,
        memorial_id: MemorialId,
        emotion: Emotion,
    ) -> BoardResult<MemorialView> {
        check_id("memorial_id", memorial_id.get())?;

        let session = self.session(memorial_id).await?;
        let mut memorial = session.live_memorial().await?;
        let count = memorial.emotions.increment(emotion);
        session.save_memorial(&memorial).await?;
        let comments = session.count_comments().await?;
        drop(session);

        tracing::trace!(count, "emotion counted");
        Ok(MemorialView::new(memorial, comments))
    }

    #[tracing::instrument(skip_all, fields(%memorial_id))]
    pub async fn update_memorial(
        &self,
        memorial_id: MemorialId,
        edit: Edit,
    ) -> BoardResult<MemorialView> {
        check_id("memorial_id", memorial_id.get())?;
        edit.validate(&self.limits)?;

        let session = self.session(memorial_id).await?;
        let mut memorial = session.live_memorial().await?;
        self.authorize(
            &edit.authority,
            &memorial.passcode_hash,
            Resource::Memorial,
            memorial_id.get(),
        )
        .await?;
        if let Some(name) = edit.name {
            memorial.name = name;
        }
        memorial.content = edit.content;
        memorial.updated_at = Some(Utc::now());
        session.save_memorial(&memorial).await?;
        let comments = session.count_comments().await?;
        Ok(MemorialView::new(memorial, comments))
    }

    /// Soft-deletes the memorial together with all of its live comments and
    /// replies.
    #[tracing::instrument(skip_all, fields(%memorial_id))]
    pub async fn delete_memorial(
        &self,
        memorial_id: MemorialId,
        authority: Authority,
    ) -> BoardResult<DeletionReport> {
        check_id("memorial_id", memorial_id.get())?;
        authority.validate(&self.limits)?;

        let session = self.session(memorial_id).await?;
        let memorial = session.live_memorial().await?;
        self.authorize(
            &authority,
            &memorial.passcode_hash,
            Resource::Memorial,
            memorial_id.get(),
        )
        .await?;
        cascade::delete_memorial(&session, memorial).await
    }
}
