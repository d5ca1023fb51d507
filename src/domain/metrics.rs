//! Derived metrics computed from link counters and view counts.

use serde::{Serialize, Serializer};
use std::fmt;

use crate::domain::entities::OwnedLink;

/// Title reported when no link has any clicks.
pub const NO_TOP_LINK: &str = "None yet";

/// Clicks per profile view as a percentage with one decimal place.
///
/// Stored as an integer number of tenths so that formatting is exact.
/// Serializes as a string, e.g. `"500.0"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct ConversionRate {
    tenths: i64,
}

impl ConversionRate {
    /// `total_clicks / max(profile_views, 1) * 100`, rounded half up to one decimal.
    pub fn compute(total_clicks: i64, profile_views: i64) -> Self {
        if total_clicks <= 0 {
            return Self::default();
        }
        let views = profile_views.max(1);
        let tenths = (total_clicks * 2000 + views) / (2 * views);
        Self { tenths }
    }

}

impl fmt::Display for ConversionRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.tenths / 10, self.tenths % 10)
    }
}

impl Serialize for ConversionRate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Integer percentage change from `previous` to `current`.
///
/// With no previous activity the growth is 100 when anything happened now and 0
/// otherwise. Halves round towards positive infinity.
pub fn growth_rate(current: i64, previous: i64) -> i64 {
    if previous <= 0 {
        return if current > 0 { 100 } else { 0 };
    }
    let delta = (current - previous) * 100;
    (2 * delta + previous).div_euclid(2 * previous)
}

/// Title of the most clicked link; the first one wins a tie.
///
/// Only an owner without links gets [`NO_TOP_LINK`].
pub fn top_link_title(links: &[OwnedLink]) -> String {
    let Some(first) = links.first() else {
        return NO_TOP_LINK.to_string();
    };

    links
        .iter()
        .fold(first, |best, link| if link.clicks > best.clicks { link } else { best })
        .title
        .clone()
}

/// Totals over an owner's links, taken from the links' own counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkTotals {
    pub total_links: i64,
    pub active_links: i64,
    pub total_clicks: i64,
}

impl LinkTotals {
    pub fn from_links(links: &[OwnedLink]) -> Self {
        links.iter().fold(Self::default(), |mut acc, link| {
            acc.total_links += 1;
            if link.is_active {
                acc.active_links += 1;
            }
            acc.total_clicks += link.clicks;
            acc
        })
    }
}
