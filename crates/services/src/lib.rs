//! # services
//!
//! The concurrency core of the memorial board: per-memorial locks, the
//! mutation coordinator that sequences every write under them, cursor
//! pagination, and the soft-delete cascade.

pub mod coordinator;
pub mod finder;
pub mod lock_registry;
pub mod messages;
pub mod pagination;
pub mod requests;
pub mod validation;
pub mod views;

mod cascade;
mod session;

pub use coordinator::{Backends, MemorialBoard};
pub use finder::ResourceFinder;
pub use lock_registry::{LockRegistry, LockTimeout, ReadGuard, RegistrySettings, WriteGuard};
pub use messages::Catalog;
pub use pagination::{Cursor, CursorKey, Page, PageError, PageRequest, Paginator};
pub use requests::{Authority, Draft, Edit, Mutation, Updated};
pub use validation::Limits;
pub use views::{CommentView, DeletionReport, MemorialSummary, MemorialView, ReplyView};
