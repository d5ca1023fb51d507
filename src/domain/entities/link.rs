//! Link entity as seen by the analytics core.

/// A link on an owner's profile page.
///
/// Owned by the links service; analytics only reads it to attach titles to
/// reports and to count total/active links. `clicks` is the link's own running
/// counter, kept separately from the event log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedLink {
    pub id: i64,
    pub owner_id: i64,
    pub title: String,
    pub url: String,
    pub link_type: String,
    pub is_active: bool,
    pub clicks: i64,
}

impl OwnedLink {
    /// Creates a new OwnedLink instance.
    pub fn new(
        id: i64,
        owner_id: i64,
        title: impl Into<String>,
        url: impl Into<String>,
        link_type: impl Into<String>,
        is_active: bool,
        clicks: i64,
    ) -> Self {
        Self {
            id,
            owner_id,
            title: title.into(),
            url: url.into(),
            link_type: link_type.into(),
            is_active,
            clicks,
        }
    }
}
