//! # Domain Models
//!
//! These structs represent the core entities of the memorial board.
//! Identifiers are integer sequences assigned by the repository on insert;
//! records are never physically removed, only flagged as deleted.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

macro_rules! sequence_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

sequence_id!(
    /// Identity of a memorial; also the key of its lock.
    MemorialId
);
sequence_id!(CommentId);
sequence_id!(ReplyId);

/// The seven reactions a visitor can leave on a memorial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Flower,
    Love,
    See,
    Miss,
    Proud,
    Hard,
    Sad,
}

impl Emotion {
    pub const ALL: [Emotion; 7] = [
        Emotion::Flower,
        Emotion::Love,
        Emotion::See,
        Emotion::Miss,
        Emotion::Proud,
        Emotion::Hard,
        Emotion::Sad,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Emotion::Flower => "flower",
            Emotion::Love => "love",
            Emotion::See => "see",
            Emotion::Miss => "miss",
            Emotion::Proud => "proud",
            Emotion::Hard => "hard",
            Emotion::Sad => "sad",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Emotion {
    type Err = ValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase();
        Emotion::ALL
            .into_iter()
            .find(|emotion| emotion.as_str() == normalized)
            .ok_or_else(|| ValidationError::UnknownEmotion(raw.to_string()))
    }
}

/// Independent reaction counters. Counters only ever grow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmotionCounts {
    pub flower: u64,
    pub love: u64,
    pub see: u64,
    pub miss: u64,
    pub proud: u64,
    pub hard: u64,
    pub sad: u64,
}

impl EmotionCounts {
    pub fn get(&self, emotion: Emotion) -> u64 {
        match emotion {
            Emotion::Flower => self.flower,
            Emotion::Love => self.love,
            Emotion::See => self.see,
            Emotion::Miss => self.miss,
            Emotion::Proud => self.proud,
            Emotion::Hard => self.hard,
            Emotion::Sad => self.sad,
        }
    }

    /// Adds exactly one reaction and returns the new value.
    pub fn increment(&mut self, emotion: Emotion) -> u64 {
        let counter = match emotion {
            Emotion::Flower => &mut self.flower,
            Emotion::Love => &mut self.love,
            Emotion::See => &mut self.see,
            Emotion::Miss => &mut self.miss,
            Emotion::Proud => &mut self.proud,
            Emotion::Hard => &mut self.hard,
            Emotion::Sad => &mut self.sad,
        };
        *counter = counter.saturating_add(1);
        *counter
    }

    pub fn total(&self) -> u64 {
        Emotion::ALL.iter().map(|e| self.get(*e)).sum()
    }
}

/// An Argon2 PHC string. The plaintext passcode is never stored.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PasscodeHash(String);

impl PasscodeHash {
    pub fn new(phc: impl Into<String>) -> Self {
        Self(phc.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PasscodeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PasscodeHash").field(&"<redacted>").finish()
    }
}

/// A memorial: the top-level post owning counters, comments and replies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Memorial {
    pub id: MemorialId,
    pub name: String,
    pub content: String,
    pub passcode_hash: PasscodeHash,
    pub emotions: EmotionCounts,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub deleted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub memorial_id: MemorialId,
    pub name: String,
    pub content: String,
    pub passcode_hash: PasscodeHash,
    pub written_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub deleted: bool,
}

/// A reply threaded under a comment. Carries both parent references so the
/// owning memorial can be checked without loading the comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    pub id: ReplyId,
    pub memorial_id: MemorialId,
    pub comment_id: CommentId,
    pub name: String,
    pub content: String,
    pub passcode_hash: PasscodeHash,
    pub written_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub deleted: bool,
}

/// Insert payloads: everything but the identifier, which the repository assigns.
#[derive(Debug, Clone)]
pub struct NewMemorial {
    pub name: String,
    pub content: String,
    pub passcode_hash: PasscodeHash,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub memorial_id: MemorialId,
    pub name: String,
    pub content: String,
    pub passcode_hash: PasscodeHash,
    pub written_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewReply {
    pub memorial_id: MemorialId,
    pub comment_id: CommentId,
    pub name: String,
    pub content: String,
    pub passcode_hash: PasscodeHash,
    pub written_at: DateTime<Utc>,
}
