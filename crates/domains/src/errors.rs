//! # Errors
//!
//! Centralized error taxonomy for the memorial board. Every condition a
//! caller must tell apart is its own variant; `code()` gives the stable key
//! the request layer maps to a status and a localized message.

use std::fmt;

use thiserror::Error;

use crate::models::MemorialId;

/// The kind of record an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Memorial,
    Comment,
    Reply,
}

impl Resource {
    pub fn as_str(self) -> &'static str {
        match self {
            Resource::Memorial => "memorial",
            Resource::Comment => "comment",
            Resource::Reply => "reply",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Format-level failures, detected before any lock is taken.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} must be a positive identifier, got {value}")]
    InvalidId { field: &'static str, value: i64 },

    #[error("{field} must not be blank")]
    Blank { field: &'static str },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("passcode must be between {min} and {max} characters")]
    PasscodeLength { min: usize, max: usize },

    #[error("unknown emotion: {0}")]
    UnknownEmotion(String),

    #[error("page size must be between 1 and {max}, got {size}")]
    PageSize { size: usize, max: usize },

    #[error("invalid cursor: {0}")]
    InvalidCursor(String),
}

impl ValidationError {
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::InvalidId { .. } => "validation.invalid_id",
            ValidationError::Blank { .. } => "validation.blank",
            ValidationError::TooLong { .. } => "validation.too_long",
            ValidationError::PasscodeLength { .. } => "validation.passcode_length",
            ValidationError::UnknownEmotion(_) => "validation.unknown_emotion",
            ValidationError::PageSize { .. } => "validation.page_size",
            ValidationError::InvalidCursor(_) => "validation.invalid_cursor",
        }
    }
}

/// Infrastructure failure reported by a repository adapter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("storage rejected write: {0}")]
    Rejected(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PasscodeError {
    #[error("passcode hashing failed: {0}")]
    Hashing(String),
}

/// The primary error type for all memorial board operations.
#[derive(Error, Debug)]
pub enum BoardError {
    #[error("{resource} {id} not found")]
    NotFound { resource: Resource, id: i64 },

    #[error("{resource} {id} is already deleted")]
    AlreadyDeleted { resource: Resource, id: i64 },

    #[error("{resource} {id} does not belong to {parent} {parent_id}")]
    OwnershipMismatch {
        resource: Resource,
        id: i64,
        parent: Resource,
        parent_id: i64,
    },

    #[error("validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    #[error("passcode does not match {resource} {id}")]
    AuthorizationFailed { resource: Resource, id: i64 },

    #[error("timed out waiting for the lock of memorial {0}")]
    LockTimeout(MemorialId),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Passcode(#[from] PasscodeError),
}

impl BoardError {
    pub fn not_found(resource: Resource, id: i64) -> Self {
        BoardError::NotFound { resource, id }
    }

    pub fn already_deleted(resource: Resource, id: i64) -> Self {
        BoardError::AlreadyDeleted { resource, id }
    }

    /// Stable key for status mapping and message lookup.
    pub fn code(&self) -> &'static str {
        match self {
            BoardError::NotFound { resource, .. } => match resource {
                Resource::Memorial => "memorial.not_found",
                Resource::Comment => "comment.not_found",
                Resource::Reply => "reply.not_found",
            },
            BoardError::AlreadyDeleted { resource, .. } => match resource {
                Resource::Memorial => "memorial.already_deleted",
                Resource::Comment => "comment.already_deleted",
                Resource::Reply => "reply.already_deleted",
            },
            BoardError::OwnershipMismatch { resource, .. } => match resource {
                Resource::Memorial => "memorial.ownership_mismatch",
                Resource::Comment => "comment.ownership_mismatch",
                Resource::Reply => "reply.ownership_mismatch",
            },
            BoardError::ValidationFailed(inner) => inner.code(),
            BoardError::AuthorizationFailed { .. } => "auth.passcode_mismatch",
            BoardError::LockTimeout(_) => "lock.timeout",
            BoardError::Repository(_) | BoardError::Passcode(_) => "internal",
        }
    }

    /// Expected conditions the caller caused, as opposed to infrastructure faults.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            BoardError::LockTimeout(_) | BoardError::Repository(_) | BoardError::Passcode(_)
        )
    }
}

/// A specialized Result type for memorial board logic.
pub type BoardResult<T> = std::result::Result<T, BoardError>;

pub type RepoResult<T> = std::result::Result<T, RepositoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_distinguish_every_condition() {
        let errors = [
            BoardError::not_found(Resource::Comment, 1),
            BoardError::already_deleted(Resource::Comment, 1),
            BoardError::OwnershipMismatch {
                resource: Resource::Comment,
                id: 1,
                parent: Resource::Memorial,
                parent_id: 2,
            },
            BoardError::from(ValidationError::Blank { field: "content" }),
            BoardError::AuthorizationFailed {
                resource: Resource::Comment,
                id: 1,
            },
        ];
        let mut codes: Vec<_> = errors.iter().map(BoardError::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
        assert!(errors.iter().all(BoardError::is_client_error));
    }

    #[test]
    fn infrastructure_errors_are_not_client_errors() {
        let err = BoardError::from(RepositoryError::Unavailable("db down".into()));
        assert_eq!(err.code(), "internal");
        assert!(!err.is_client_error());
        assert!(!BoardError::LockTimeout(MemorialId(3)).is_client_error());
    }

    #[test]
    fn ownership_message_names_both_parties() {
        let err = BoardError::OwnershipMismatch {
            resource: Resource::Reply,
            id: 9,
            parent: Resource::Comment,
            parent_id: 4,
        };
        assert_eq!(err.to_string(), "reply 9 does not belong to comment 4");
    }
}
