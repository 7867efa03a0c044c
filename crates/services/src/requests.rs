//! Inbound payloads for the mutation coordinator.

use std::fmt;

use domains::{CommentId, Emotion, ReplyId, ValidationError};

use crate::validation::Limits;
use crate::views::{CommentView, DeletionReport, MemorialView, ReplyView};

/// Who is asking to change or delete a record.
#[derive(Clone, PartialEq, Eq)]
pub enum Authority {
    /// The author, proving ownership with the passcode chosen at creation.
    Passcode(String),
    /// An administrative action. Minting this is the request layer's job.
    Administrator,
}

impl Authority {
    pub fn passcode(passcode: impl Into<String>) -> Self {
        Authority::Passcode(passcode.into())
    }

    pub(crate) fn validate(&self, limits: &Limits) -> Result<(), ValidationError> {
        match self {
            Authority::Passcode(passcode) => limits.passcode(passcode),
            Authority::Administrator => Ok(()),
        }
    }
}

impl fmt::Debug for Authority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Authority::Passcode(_) => f.write_str("Passcode(<redacted>)"),
            Authority::Administrator => f.write_str("Administrator"),
        }
    }
}

/// Author-supplied fields for a new memorial, comment or reply.
#[derive(Clone)]
pub struct Draft {
    pub name: String,
    pub content: String,
    pub passcode: String,
}

impl Draft {
    pub fn new(
        name: impl Into<String>,
        content: impl Into<String>,
        passcode: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            passcode: passcode.into(),
        }
    }

    pub(crate) fn validate(&self, limits: &Limits) -> Result<(), ValidationError> {
        limits.name(&self.name)?;
        limits.content(&self.content)?;
        limits.passcode(&self.passcode)
    }
}

impl fmt::Debug for Draft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Draft")
            .field("name", &self.name)
            .field("content_len", &self.content.len())
            .finish_non_exhaustive()
    }
}

/// A content edit, optionally renaming the author.
#[derive(Debug, Clone)]
pub struct Edit {
    pub name: Option<String>,
    pub content: String,
    pub authority: Authority,
}

impl Edit {
    pub fn content(content: impl Into<String>, authority: Authority) -> Self {
        Self {
            name: None,
            content: content.into(),
            authority,
        }
    }

    pub(crate) fn validate(&self, limits: &Limits) -> Result<(), ValidationError> {
        if let Some(name) = &self.name {
            limits.name(name)?;
        }
        limits.content(&self.content)?;
        self.authority.validate(limits)
    }
}

/// Every state change that can be applied to an existing memorial.
#[derive(Debug, Clone)]
pub enum Mutation {
    IncrementEmotion(Emotion),
    UpdateMemorial(Edit),
    DeleteMemorial(Authority),
    CreateComment(Draft),
    UpdateComment {
        comment_id: CommentId,
        edit: Edit,
    },
    DeleteComment {
        comment_id: CommentId,
        authority: Authority,
    },
    CreateReply {
        comment_id: CommentId,
        draft: Draft,
    },
    UpdateReply {
        comment_id: CommentId,
        reply_id: ReplyId,
        edit: Edit,
    },
    DeleteReply {
        comment_id: CommentId,
        reply_id: ReplyId,
        authority: Authority,
    },
}

impl Mutation {
    pub fn kind(&self) -> &'static str {
        match self {
            Mutation::IncrementEmotion(_) => "increment_emotion",
            Mutation::UpdateMemorial(_) => "update_memorial",
            Mutation::DeleteMemorial(_) => "delete_memorial",
            Mutation::CreateComment(_) => "create_comment",
            Mutation::UpdateComment { .. } => "update_comment",
            Mutation::DeleteComment { .. } => "delete_comment",
            Mutation::CreateReply { .. } => "create_reply",
            Mutation::UpdateReply { .. } => "update_reply",
            Mutation::DeleteReply { .. } => "delete_reply",
        }
    }
}

/// The state a mutation left behind.
#[derive(Debug, Clone, PartialEq)]
pub enum Updated {
    Memorial(MemorialView),
    Comment(CommentView),
    Reply(ReplyView),
    Deleted(DeletionReport),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secrets_are_redacted_in_debug() {
        let draft = Draft::new("mina", "rest well", "hunter22");
        let rendered = format!("{draft:?} {:?}", Authority::passcode("hunter22"));
        assert!(!rendered.contains("hunter22"));
        assert!(rendered.contains("mina"));
    }

    #[test]
    fn administrator_skips_passcode_format() {
        let limits = Limits::default();
        assert!(Authority::Administrator.validate(&limits).is_ok());
        assert!(Authority::passcode("no").validate(&limits).is_err());
    }

    #[test]
    fn edit_checks_optional_name() {
        let limits = Limits::default();
        let mut edit = Edit::content("updated", Authority::passcode("1234"));
        assert!(edit.validate(&limits).is_ok());
        edit.name = Some(" ".into());
        assert_eq!(
            edit.validate(&limits),
            Err(ValidationError::Blank { field: "name" })
        );
    }
}
