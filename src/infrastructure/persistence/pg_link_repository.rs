//! PostgreSQL implementation of link repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::OwnedLink;
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

/// PostgreSQL repository reading the `links` table.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct LinkRow {
    id: i64,
    owner_id: i64,
    title: String,
    url: String,
    link_type: String,
    is_active: bool,
    clicks: i64,
}

impl From<LinkRow> for OwnedLink {
    fn from(row: LinkRow) -> Self {
        OwnedLink::new(
            row.id,
            row.owner_id,
            row.title,
            row.url,
            row.link_type,
            row.is_active,
            row.clicks,
        )
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn list_for_owner(&self, owner_id: i64) -> Result<Vec<OwnedLink>, AppError> {
        let rows: Vec<LinkRow> = sqlx::query_as(
            r#"
            SELECT id, owner_id, title, url, link_type, is_active, clicks
            FROM links
            WHERE owner_id = $1
            ORDER BY position ASC, id ASC
            "#,
        )
        .bind(owner_id)
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(|e| AppError::storage("list_links", e))?;

        Ok(rows.into_iter().map(OwnedLink::from).collect())
    }
}
