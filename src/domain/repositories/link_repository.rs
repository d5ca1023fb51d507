//! Repository trait for reading an owner's links.

use crate::domain::entities::OwnedLink;
use crate::error::AppError;
use async_trait::async_trait;

/// Read access to the links collaborator.
///
/// Link management lives outside this service; analytics only lists an
/// owner's links to attach titles and count totals.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::memory::MemoryLinkRepository`] - in-process implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Lists all links of an owner, in display order.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn list_for_owner(&self, owner_id: i64) -> Result<Vec<OwnedLink>, AppError>;
}
