//! User-agent classification into device class, browser and OS.
//!
//! Matching is deliberately coarse: ordered, first-match-wins, case-insensitive
//! substring checks. Real browser strings carry several tokens (Chrome user agents
//! also mention Safari), so the order of the checks decides the outcome.

use regex::Regex;
use std::sync::LazyLock;

use crate::domain::entities::{DeviceClass, DeviceInfo};

static MOBILE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)mobile|android|iphone|ipod|blackberry|windows phone")
        .expect("mobile pattern is a valid regex")
});

static TABLET_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)tablet|ipad").expect("tablet pattern is a valid regex"));

/// Browser tokens in precedence order.
const BROWSERS: [(&str, &str); 5] = [
    ("chrome", "Chrome"),
    ("firefox", "Firefox"),
    ("safari", "Safari"),
    ("edge", "Edge"),
    ("opera", "Opera"),
];

/// OS tokens in precedence order. Several tokens may map to the same name.
const OPERATING_SYSTEMS: [(&str, &str); 7] = [
    ("windows", "Windows"),
    ("mac", "macOS"),
    ("linux", "Linux"),
    ("android", "Android"),
    ("ios", "iOS"),
    ("iphone", "iOS"),
    ("ipad", "iOS"),
];

const UNKNOWN: &str = "unknown";

/// Classifies a raw `User-Agent` header value.
///
/// Never fails. Anything that is neither mobile nor tablet is `Desktop`,
/// including the empty string; browser and OS fall back to `"unknown"`.
///
/// # Examples
///
/// ```
/// use linkstats::domain::entities::DeviceClass;
/// use linkstats::domain::user_agent::classify;
///
/// let info = classify("Mozilla/5.0 (iPhone; CPU iPhone OS 14_0) AppleWebKit Safari");
/// assert_eq!(info.device_class, DeviceClass::Mobile);
/// assert_eq!(info.browser, "Safari");
/// assert_eq!(info.os, "iOS");
/// ```
pub fn classify(user_agent: &str) -> DeviceInfo {
    let ua = user_agent.to_lowercase();

    let device_class = if MOBILE_PATTERN.is_match(&ua) {
        DeviceClass::Mobile
    } else if TABLET_PATTERN.is_match(&ua) {
        DeviceClass::Tablet
    } else {
        DeviceClass::Desktop
    };

    DeviceInfo {
        device_class,
        browser: first_match(&ua, &BROWSERS).to_string(),
        os: first_match(&ua, &OPERATING_SYSTEMS).to_string(),
    }
}

fn first_match(ua: &str, table: &[(&str, &'static str)]) -> &'static str {
    table
        .iter()
        .find(|(token, _)| ua.contains(token))
        .map(|(_, name)| *name)
        .unwrap_or(UNKNOWN)
}
