//! # storage-adapters
//!
//! Repository implementations for the memorial board ports.

pub mod memory;

pub use memory::InMemoryStore;
