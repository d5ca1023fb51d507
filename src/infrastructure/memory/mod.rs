//! In-process repository implementations.
//!
//! Used by integration tests and local experiments without PostgreSQL.
//! Aggregations go through [`crate::domain::aggregation`], the same rules the
//! SQL queries follow.

pub mod memory_event_repository;
pub mod memory_link_repository;
pub mod memory_token_repository;

pub use memory_event_repository::MemoryEventRepository;
pub use memory_link_repository::MemoryLinkRepository;
pub use memory_token_repository::MemoryTokenRepository;
