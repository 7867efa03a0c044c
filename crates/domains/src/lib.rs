//! # domains
//!
//! Domain models, error taxonomy and port traits for the memorial board.
//! Nothing in this crate performs I/O; adapters implement the ports.

pub mod errors;
pub mod models;
pub mod paging;
pub mod ports;

// Re-exporting for easier access in other crates
pub use errors::*;
pub use models::*;
pub use paging::*;
pub use ports::*;
