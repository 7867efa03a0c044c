//! Keyset ordering shared by the pagination engine and repository adapters.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Comment, CommentId, Memorial, MemorialId, Reply, ReplyId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
}

impl SortOrder {
    /// Orders two keys the way rows appear in a page.
    pub fn compare<K: Ord>(self, a: &K, b: &K) -> Ordering {
        match self {
            SortOrder::Oldest => a.cmp(b),
            SortOrder::Newest => b.cmp(a),
        }
    }
}

/// Composite ordering key for the memorial listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MemorialKey {
    pub created_at: DateTime<Utc>,
    pub id: MemorialId,
}

/// Records with a stable, unique ordering key.
pub trait Keyed {
    type Key: Ord + Copy + Send + Sync;

    fn key(&self) -> Self::Key;
}

impl Keyed for Memorial {
    type Key = MemorialKey;

    fn key(&self) -> MemorialKey {
        MemorialKey {
            created_at: self.created_at,
            id: self.id,
        }
    }
}

impl Keyed for Comment {
    type Key = CommentId;

    fn key(&self) -> CommentId {
        self.id
    }
}

impl Keyed for Reply {
    type Key = ReplyId;

    fn key(&self) -> ReplyId {
        self.id
    }
}

/// An ordered range request with an exclusive lower (or upper) bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeysetQuery<K> {
    /// Key of the last row the caller has already seen.
    pub after: Option<K>,
    pub order: SortOrder,
    /// Maximum rows to return. The engine asks for one more than it shows.
    pub limit: usize,
}

impl<K: Ord> KeysetQuery<K> {
    /// Whether `key` lies strictly past the boundary in the query's direction.
    pub fn admits(&self, key: &K) -> bool {
        match &self.after {
            None => true,
            Some(bound) => self.order.compare(bound, key) == Ordering::Less,
        }
    }

    /// Filters, orders and truncates `rows` in memory.
    pub fn apply<T>(&self, rows: impl IntoIterator<Item = T>) -> Vec<T>
    where
        T: Keyed<Key = K>,
    {
        let mut selected: Vec<T> = rows.into_iter().filter(|row| self.admits(&row.key())).collect();
        selected.sort_by(|a, b| self.order.compare(&a.key(), &b.key()));
        selected.truncate(self.limit);
        selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Row(i64);

    impl Keyed for Row {
        type Key = i64;

        fn key(&self) -> i64 {
            self.0
        }
    }

    #[test]
    fn bound_is_exclusive_in_both_directions() {
        let oldest = KeysetQuery { after: Some(5), order: SortOrder::Oldest, limit: 10 };
        assert!(!oldest.admits(&5));
        assert!(oldest.admits(&6));
        assert!(!oldest.admits(&4));

        let newest = KeysetQuery { after: Some(5), order: SortOrder::Newest, limit: 10 };
        assert!(!newest.admits(&5));
        assert!(newest.admits(&4));
        assert!(!newest.admits(&6));
    }

    #[test]
    fn apply_orders_and_truncates() {
        let query = KeysetQuery { after: Some(2), order: SortOrder::Newest, limit: 2 };
        let rows = query.apply((1..=6).map(Row));
        assert_eq!(rows, vec![Row(1)]);

        let query = KeysetQuery { after: None, order: SortOrder::Newest, limit: 2 };
        assert_eq!(query.apply((1..=6).map(Row)), vec![Row(6), Row(5)]);
    }
}
