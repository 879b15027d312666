//! Sequential entity-ID allocation.
//!
//! Codeplug IDs look like `zone3`, `grp12`, `cont7`: an alphabetic prefix
//! followed by a positive number. A new ID continues the numbering of the
//! collection it is added to.

use std::sync::LazyLock;

use regex::Regex;

static ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-zA-Z]+)(\d+)").expect("valid ID pattern"));

/// Returns the next free ID given the IDs already in a collection.
///
/// The new number is one past the highest number seen. The prefix is the one
/// of the last ID that matched the `<letters><digits>` shape, or
/// `default_prefix` if none did. Suffixes are read as `u64` and counted in
/// `u128`, so the successor of `u64::MAX` is still a fresh ID.
pub fn next_id<'a>(existing: impl IntoIterator<Item = &'a str>, default_prefix: &str) -> String {
    let mut prefix = default_prefix;
    let mut max: u128 = 0;
    for id in existing {
        let Some(caps) = ID_PATTERN.captures(id) else {
            continue;
        };
        let (Some(p), Some(n)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        prefix = p.as_str();
        if let Ok(n) = n.as_str().parse::<u64>() {
            max = max.max(u128::from(n));
        }
    }
    format!("{}{}", prefix, max + 1)
}
