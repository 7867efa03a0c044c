//! # Cursor Pagination Engine
//!
//! Keyset paging with the `size + 1` trick: one extra row is requested past
//! the visible page, and its presence alone decides `has_more`. No count
//! query is issued.

use std::future::Future;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::DateTime;
use domains::{
    CommentId, Keyed, KeysetQuery, MemorialId, MemorialKey, ReplyId, RepositoryError, SortOrder,
    ValidationError,
};
use serde::{Deserialize, Serialize};

/// Encoded cursors longer than this are rejected before decoding.
pub const MAX_CURSOR_LEN: usize = 128;

/// An opaque continuation token naming the last row a client has seen.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    pub fn encode<K: CursorKey>(key: &K) -> Self {
        let payload = format!("{}:{}", K::TAG, key.to_payload());
        Cursor(URL_SAFE_NO_PAD.encode(payload))
    }

    /// Wraps a token received from a client. Decoding happens on use.
    pub fn from_token(token: impl Into<String>) -> Self {
        Cursor(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn decode<K: CursorKey>(&self) -> Result<K, ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidCursor(reason.to_string());
        if self.0.len() > MAX_CURSOR_LEN {
            return Err(invalid("too long"));
        }
        let bytes = URL_SAFE_NO_PAD
            .decode(self.0.as_bytes())
            .map_err(|_| invalid("not base64"))?;
        let text = String::from_utf8(bytes).map_err(|_| invalid("not utf-8"))?;
        let payload = text
            .strip_prefix(K::TAG)
            .and_then(|rest| rest.strip_prefix(':'))
            .ok_or_else(|| invalid("issued for a different listing"))?;
        K::from_payload(payload).ok_or_else(|| invalid("malformed key"))
    }
}

/// Ordering keys that can round-trip through a [`Cursor`].
pub trait CursorKey: Sized {
    /// Distinguishes listings so a cursor cannot be replayed against another.
    const TAG: &'static str;

    fn to_payload(&self) -> String;
    fn from_payload(payload: &str) -> Option<Self>;
}

fn positive(raw: &str) -> Option<i64> {
    raw.parse::<i64>().ok().filter(|id| *id > 0)
}

impl CursorKey for CommentId {
    const TAG: &'static str = "comment";

    fn to_payload(&self) -> String {
        self.0.to_string()
    }

    fn from_payload(payload: &str) -> Option<Self> {
        positive(payload).map(CommentId)
    }
}

impl CursorKey for ReplyId {
    const TAG: &'static str = "reply";

    fn to_payload(&self) -> String {
        self.0.to_string()
    }

    fn from_payload(payload: &str) -> Option<Self> {
        positive(payload).map(ReplyId)
    }
}

impl CursorKey for MemorialKey {
    const TAG: &'static str = "memorial";

    // Full nanosecond precision: a truncated timestamp would move the
    // exclusive bound and repeat the boundary row.
    fn to_payload(&self) -> String {
        format!(
            "{}.{}:{}",
            self.created_at.timestamp(),
            self.created_at.timestamp_subsec_nanos(),
            self.id
        )
    }

    fn from_payload(payload: &str) -> Option<Self> {
        let (stamp, id) = payload.split_once(':')?;
        let (secs, nanos) = stamp.split_once('.')?;
        let created_at = DateTime::from_timestamp(secs.parse().ok()?, nanos.parse().ok()?)?;
        Some(MemorialKey {
            created_at,
            id: MemorialId(positive(id)?),
        })
    }
}

/// What a client asks for: where to resume, how many, in which order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    #[serde(default)]
    pub cursor: Option<Cursor>,
    #[serde(default)]
    pub size: Option<usize>,
    #[serde(default)]
    pub order: SortOrder,
}

impl PageRequest {
    pub fn first(size: usize) -> Self {
        Self {
            cursor: None,
            size: Some(size),
            order: SortOrder::default(),
        }
    }

    pub fn oldest_first(mut self) -> Self {
        self.order = SortOrder::Oldest;
        self
    }

    pub fn after(mut self, cursor: Cursor) -> Self {
        self.cursor = Some(cursor);
        self
    }
}

/// A bounded page. `has_more` is true exactly when `next_cursor` is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub has_more: bool,
    pub next_cursor: Option<Cursor>,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            has_more: false,
            next_cursor: None,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            has_more: self.has_more,
            next_cursor: self.next_cursor,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    default_size: usize,
    max_size: usize,
}

impl Default for Paginator {
    fn default() -> Self {
        Self {
            default_size: 20,
            max_size: 100,
        }
    }
}

impl Paginator {
    pub fn new(default_size: usize, max_size: usize) -> Self {
        let max_size = max_size.max(1);
        Self {
            default_size: default_size.clamp(1, max_size),
            max_size,
        }
    }

    /// Validates the request and builds the `size + 1` range query for it.
    pub fn plan<K: CursorKey>(
        &self,
        request: &PageRequest,
    ) -> Result<(KeysetQuery<K>, usize), ValidationError> {
        let size = request.size.unwrap_or(self.default_size);
        if size == 0 || size > self.max_size {
            return Err(ValidationError::PageSize {
                size,
                max: self.max_size,
            });
        }
        let after = request.cursor.as_ref().map(Cursor::decode::<K>).transpose()?;
        Ok((
            KeysetQuery {
                after,
                order: request.order,
                limit: size + 1,
            },
            size,
        ))
    }

    /// Cuts fetched rows down to a page of `size`.
    pub fn finish<T>(mut rows: Vec<T>, size: usize) -> Page<T>
    where
        T: Keyed,
        T::Key: CursorKey,
    {
        if rows.len() <= size {
            return Page {
                items: rows,
                has_more: false,
                next_cursor: None,
            };
        }
        rows.truncate(size);
        let next_cursor = rows.last().map(|row| Cursor::encode(&row.key()));
        Page {
            has_more: next_cursor.is_some(),
            items: rows,
            next_cursor,
        }
    }

    /// Plans the query, runs `fetch` against storage and builds the page.
    pub async fn page<T, F, Fut>(
        &self,
        request: &PageRequest,
        fetch: F,
    ) -> Result<Page<T>, PageError>
    where
        T: Keyed,
        T::Key: CursorKey,
        F: FnOnce(KeysetQuery<T::Key>) -> Fut,
        Fut: Future<Output = Result<Vec<T>, RepositoryError>>,
    {
        let (query, size) = self.plan::<T::Key>(request)?;
        let rows = fetch(query).await?;
        Ok(Self::finish(rows, size))
    }
}

/// Failure of a single page fetch.
#[derive(thiserror::Error, Debug)]
pub enum PageError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<PageError> for domains::BoardError {
    fn from(err: PageError) -> Self {
        match err {
            PageError::Invalid(e) => domains::BoardError::ValidationFailed(e),
            PageError::Repository(e) => domains::BoardError::Repository(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[derive(Debug, Clone, PartialEq)]
    struct Row(CommentId);

    impl Keyed for Row {
        type Key = CommentId;

        fn key(&self) -> CommentId {
            self.0
        }
    }

    fn rows(ids: impl IntoIterator<Item = i64>) -> Vec<Row> {
        ids.into_iter().map(|id| Row(CommentId(id))).collect()
    }

    #[test]
    fn cursor_round_trips_and_is_opaque() {
        let cursor = Cursor::encode(&CommentId(42));
        assert!(!cursor.as_str().contains("42"));
        assert_eq!(cursor.decode::<CommentId>().unwrap(), CommentId(42));
    }

    #[test]
    fn cursor_for_one_listing_is_rejected_by_another() {
        let cursor = Cursor::encode(&CommentId(42));
        assert!(matches!(
            cursor.decode::<ReplyId>(),
            Err(ValidationError::InvalidCursor(_))
        ));
    }

    #[test]
    fn garbage_cursors_are_validation_errors() {
        for token in ["%%%", "", &"A".repeat(MAX_CURSOR_LEN + 1)] {
            assert!(Cursor::from_token(token).decode::<CommentId>().is_err(), "{token}");
        }
        let negative = Cursor(URL_SAFE_NO_PAD.encode("comment:-3"));
        assert!(negative.decode::<CommentId>().is_err());
    }

    #[test]
    fn memorial_key_keeps_nanoseconds() {
        let key = MemorialKey {
            created_at: Utc.timestamp_opt(1_700_000_000, 123_456_789).unwrap(),
            id: MemorialId(9),
        };
        assert_eq!(Cursor::encode(&key).decode::<MemorialKey>().unwrap(), key);
    }

    #[test]
    fn plan_asks_for_one_extra_row() {
        let paginator = Paginator::new(20, 100);
        let (query, size) = paginator.plan::<CommentId>(&PageRequest::default()).unwrap();
        assert_eq!(size, 20);
        assert_eq!(query.limit, 21);
        assert_eq!(query.after, None);
        assert_eq!(query.order, SortOrder::Newest);
    }

    #[test]
    fn plan_rejects_out_of_range_sizes() {
        let paginator = Paginator::new(20, 100);
        for size in [0, 101] {
            assert_eq!(
                paginator.plan::<CommentId>(&PageRequest::first(size)).unwrap_err(),
                ValidationError::PageSize { size, max: 100 }
            );
        }
    }

    #[test]
    fn finish_without_extra_row_has_no_cursor() {
        let page = Paginator::finish(rows([1, 2]), 2);
        assert_eq!(page.items.len(), 2);
        assert!(!page.has_more);
        assert!(page.next_cursor.is_none());

        let empty = Paginator::finish(Vec::<Row>::new(), 5);
        assert_eq!(empty, Page::empty());
    }

    #[test]
    fn finish_with_extra_row_points_at_last_visible() {
        let page = Paginator::finish(rows([1, 2, 3]), 2);
        assert_eq!(page.items, rows([1, 2]));
        assert!(page.has_more);
        assert_eq!(
            page.next_cursor.unwrap().decode::<CommentId>().unwrap(),
            CommentId(2)
        );
    }

    #[tokio::test]
    async fn page_passes_decoded_bound_to_fetch() {
        let paginator = Paginator::default();
        let request = PageRequest::first(2).oldest_first().after(Cursor::encode(&CommentId(5)));
        let page = paginator
            .page(&request, |query: KeysetQuery<CommentId>| async move {
                assert_eq!(query.after, Some(CommentId(5)));
                assert_eq!(query.limit, 3);
                Ok(query.apply(rows(1..=7)))
            })
            .await
            .unwrap();
        assert_eq!(page.items, rows([6, 7]));
        assert!(!page.has_more);
    }
}
