//! Deterministic ordering of zones before the document is written.

use std::collections::HashMap;

use crate::codeplug::Document;

/// Sorts every zone's channel list by channel name, then the zones by name.
///
/// Both sorts are stable; a channel ID with no matching channel sorts as an
/// empty name.
pub fn finalize(doc: &mut Document) {
    let names: HashMap<String, String> = doc
        .channel_names()
        .into_iter()
        .map(|(id, name)| (id.to_string(), name.to_string()))
        .collect();
    let name_of = |id: &String| names.get(id).map(String::as_str).unwrap_or_default();

    for zone in &mut doc.zones {
        zone.a.sort_by(|a, b| name_of(a).cmp(name_of(b)));
    }
    doc.zones.sort_by(|a, b| a.name.cmp(&b.name));
}
