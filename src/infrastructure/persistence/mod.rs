//! PostgreSQL repository implementations.
//!
//! Concrete implementations of domain repository traits using SQLx runtime
//! queries mapped onto `FromRow` structs.
//!
//! # Repositories
//!
//! - [`PgEventRepository`] - Event log appends and aggregation queries
//! - [`PgLinkRepository`] - Owner link listing
//! - [`PgTokenRepository`] - API token storage and lookup

pub mod pg_event_repository;
pub mod pg_link_repository;
pub mod pg_token_repository;

pub use pg_event_repository::PgEventRepository;
pub use pg_link_repository::PgLinkRepository;
pub use pg_token_repository::PgTokenRepository;
