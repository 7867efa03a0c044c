//! # Soft-Delete Cascade
//!
//! Children are flagged before their parent, all under the memorial's write
//! lock. A storage failure part-way leaves the parent live, so repeating the
//! delete resumes where it stopped; children already flagged are skipped.

use chrono::Utc;
use domains::{BoardResult, Comment, Memorial};

use crate::session::WriteSession;
use crate::views::DeletionReport;

/// Flags every live reply and comment of the memorial, then the memorial.
pub(crate) async fn delete_memorial(
    session: &WriteSession<'_>,
    mut memorial: Memorial,
) -> BoardResult<DeletionReport> {
    let now = Utc::now();
    let mut report = DeletionReport::default();

    for reply_id in session.live_reply_ids().await? {
        let Some(mut reply) = session.reply_by_id(reply_id).await? else {
            continue;
        };
        if reply.deleted {
            continue;
        }
        reply.deleted = true;
        reply.updated_at = Some(now);
        if let Err(err) = session.save_reply(&reply).await {
            tracing::warn!(%reply_id, done = ?report, "memorial cascade aborted");
            return Err(err);
        }
        report.replies += 1;
    }

    for comment_id in session.live_comment_ids().await? {
        let Some(mut comment) = session.comment_by_id(comment_id).await? else {
            continue;
        };
        if comment.deleted {
            continue;
        }
        comment.deleted = true;
        comment.updated_at = Some(now);
        if let Err(err) = session.save_comment(&comment).await {
            tracing::warn!(%comment_id, done = ?report, "memorial cascade aborted");
            return Err(err);
        }
        report.comments += 1;
    }

    memorial.deleted = true;
    memorial.updated_at = Some(now);
    session.save_memorial(&memorial).await?;
    report.memorials = 1;

    tracing::debug!(memorial = %memorial.id, ?report, "memorial cascade complete");
    Ok(report)
}

/// Flags the comment's live replies, then the comment itself.
pub(crate) async fn delete_comment(
    session: &WriteSession<'_>,
    mut comment: Comment,
) -> BoardResult<DeletionReport> {
    let now = Utc::now();
    let mut report = DeletionReport::default();

    for reply_id in session.live_reply_ids_of(comment.id).await? {
        let Some(mut reply) = session.reply_by_id(reply_id).await? else {
            continue;
        };
        if reply.deleted {
            continue;
        }
        reply.deleted = true;
        reply.updated_at = Some(now);
        if let Err(err) = session.save_reply(&reply).await {
            tracing::warn!(%reply_id, comment = %comment.id, "comment cascade aborted");
            return Err(err);
        }
        report.replies += 1;
    }

    comment.deleted = true;
    comment.updated_at = Some(now);
    session.save_comment(&comment).await?;
    report.comments = 1;
    Ok(report)
}
