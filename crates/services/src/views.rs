//! Read models returned to the request layer. Passcode hashes never leave
//! the core.

use chrono::{DateTime, Utc};
use domains::{Comment, CommentId, EmotionCounts, Memorial, MemorialId, Reply, ReplyId};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemorialView {
    pub id: MemorialId,
    pub name: String,
    pub content: String,
    pub emotions: EmotionCounts,
    pub comment_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl MemorialView {
    pub fn new(memorial: Memorial, comment_count: u64) -> Self {
        Self {
            id: memorial.id,
            name: memorial.name,
            content: memorial.content,
            emotions: memorial.emotions,
            comment_count,
            created_at: memorial.created_at,
            updated_at: memorial.updated_at,
        }
    }
}

/// Listing entry for memorials; counts are omitted to keep pages to one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemorialSummary {
    pub id: MemorialId,
    pub name: String,
    pub emotions: EmotionCounts,
    pub created_at: DateTime<Utc>,
}

impl From<Memorial> for MemorialSummary {
    fn from(memorial: Memorial) -> Self {
        Self {
            id: memorial.id,
            name: memorial.name,
            emotions: memorial.emotions,
            created_at: memorial.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentView {
    pub id: CommentId,
    pub memorial_id: MemorialId,
    pub name: String,
    pub content: String,
    pub written_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<Comment> for CommentView {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            memorial_id: comment.memorial_id,
            name: comment.name,
            content: comment.content,
            written_at: comment.written_at,
            updated_at: comment.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplyView {
    pub id: ReplyId,
    pub memorial_id: MemorialId,
    pub comment_id: CommentId,
    pub name: String,
    pub content: String,
    pub written_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<Reply> for ReplyView {
    fn from(reply: Reply) -> Self {
        Self {
            id: reply.id,
            memorial_id: reply.memorial_id,
            comment_id: reply.comment_id,
            name: reply.name,
            content: reply.content,
            written_at: reply.written_at,
            updated_at: reply.updated_at,
        }
    }
}

/// What a soft-delete touched, children included.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeletionReport {
    pub memorials: u64,
    pub comments: u64,
    pub replies: u64,
}
