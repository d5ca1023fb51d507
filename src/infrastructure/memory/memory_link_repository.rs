//! In-process link repository.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::entities::OwnedLink;
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

/// Links kept in insertion order, which doubles as display order.
#[derive(Debug, Default)]
pub struct MemoryLinkRepository {
    links: RwLock<Vec<OwnedLink>>,
}

impl MemoryLinkRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_links(links: Vec<OwnedLink>) -> Self {
        Self {
            links: RwLock::new(links),
        }
    }

    pub async fn insert(&self, link: OwnedLink) {
        self.links.write().await.push(link);
    }
}

#[async_trait]
impl LinkRepository for MemoryLinkRepository {
    async fn list_for_owner(&self, owner_id: i64) -> Result<Vec<OwnedLink>, AppError> {
        Ok(self
            .links
            .read()
            .await
            .iter()
            .filter(|l| l.owner_id == owner_id)
            .cloned()
            .collect())
    }
}
