//! MQTT topic scheme and parsing.
//!
//! All pothub traffic lives under a configurable base topic:
//!
//! ```text
//! {base}/users/{owner}/pots/{pot}/moisture/check     command to the device
//! {base}/users/{owner}/pots/{pot}/moisture/reading   device reply
//! {base}/users/{owner}/pots                          pot-list fan-out
//! ```
//!
//! The owner and pot segments *are* the correlation data: a reply is
//! routed back purely by where it arrives.

use std::str::FromStr;

use pothub_domain::id::{PotId, UserId};

/// Topic for a moisture-check command addressed to one pot's device.
#[must_use]
pub fn moisture_check(base: &str, owner: UserId, pot: PotId) -> String {
    format!("{base}/users/{owner}/pots/{pot}/moisture/check")
}

/// Topic a device publishes its reading reply on.
#[must_use]
pub fn moisture_reading(base: &str, owner: UserId, pot: PotId) -> String {
    format!("{base}/users/{owner}/pots/{pot}/moisture/reading")
}

/// Topic carrying an owner's full pot list.
#[must_use]
pub fn pot_list(base: &str, owner: UserId) -> String {
    format!("{base}/users/{owner}/pots")
}

/// Subscription filter matching every reading reply under `base`.
#[must_use]
pub fn reading_filter(base: &str) -> String {
    format!("{base}/users/+/pots/+/moisture/reading")
}

/// Subscription filter matching every check command under `base` — what a
/// device (or the virtual sensor) listens on.
#[must_use]
pub fn check_filter(base: &str) -> String {
    format!("{base}/users/+/pots/+/moisture/check")
}

/// Extract the correlation data from a reading-reply topic.
///
/// Returns `None` for topics outside the scheme or with malformed ids —
/// the listener drops those rather than erroring.
#[must_use]
pub fn parse_reading(base: &str, topic: &str) -> Option<(UserId, PotId)> {
    parse_moisture(base, topic, "reading")
}

/// Extract the correlation data from a check-command topic.
#[must_use]
pub fn parse_check(base: &str, topic: &str) -> Option<(UserId, PotId)> {
    parse_moisture(base, topic, "check")
}

fn parse_moisture(base: &str, topic: &str, tail: &str) -> Option<(UserId, PotId)> {
    let rest = topic.strip_prefix(base)?.strip_prefix('/')?;
    let segments: Vec<&str> = rest.split('/').collect();
    match segments.as_slice() {
        ["users", owner, "pots", pot, "moisture", last] if *last == tail => {
            let owner = UserId::from_str(owner).ok()?;
            let pot = PotId::from_str(pot).ok()?;
            Some((owner, pot))
        }
        _ => None,
    }
}
