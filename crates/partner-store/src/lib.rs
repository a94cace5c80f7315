//! SupportPartner Store Layer
//!
//! This crate provides the store abstraction shared by the hosted
//! backend and the relational pool: the `Store` trait, the generic
//! query envelope, and an in-memory store.

pub mod backend;
pub mod error;
pub mod memory;
pub mod query;

pub use backend::{Store, StoreKind, StoreOutput};
pub use error::StoreError;
pub use memory::MemoryStore;
pub use query::{Condition, Filter, OrderBy, Returning, Row, SelectOptions, is_identifier};
