//! Name patterns.
//!
//! A pattern is free text with `$name` placeholders, each optionally limited
//! to `N` characters with `$name:N`:
//!
//! ```
//! use dmrfill::pattern::render;
//! use dmrfill::record::TalkGroup;
//!
//! let tg = TalkGroup::new(3172, 1, "Northeast");
//! assert_eq!(render("$tg_name:3 TS$time_slot", None, Some(&tg)), "Nor TS1");
//! ```
//!
//! Record placeholders are `callsign`, `city`, `state`, `frequency`, `band`
//! and `state_code`; talkgroup placeholders are `tg_name`, `tg_number` and
//! `time_slot`. Anything else, or a placeholder whose context is missing,
//! renders as the empty string.

use std::sync::LazyLock;

use regex::Regex;

use crate::record::{Repeater, TalkGroup};

static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$([A-Za-z0-9_]+)(?::([0-9]+))?|([^$]+)").expect("valid pattern grammar")
});

/// Renders `pattern` against an optional record and talkgroup.
pub fn render(pattern: &str, record: Option<&dyn Repeater>, talkgroup: Option<&TalkGroup>) -> String {
    let mut out = String::with_capacity(pattern.len());
    for caps in TOKEN.captures_iter(pattern) {
        if let Some(literal) = caps.get(3) {
            out.push_str(literal.as_str());
            continue;
        }
        let Some(name) = caps.get(1) else {
            continue;
        };
        let value = resolve(name.as_str(), record, talkgroup);
        // a limit that overflows usize cannot truncate anything
        match caps.get(2).and_then(|n| n.as_str().parse::<usize>().ok()) {
            Some(limit) => out.extend(value.chars().take(limit)),
            None => out.push_str(&value),
        }
    }
    out
}

fn resolve(name: &str, record: Option<&dyn Repeater>, talkgroup: Option<&TalkGroup>) -> String {
    if let Some(r) = record {
        match name {
            "callsign" => return r.callsign().to_string(),
            "city" => return r.city().to_string(),
            "state" => return r.state().to_string(),
            "frequency" => return r.frequency().to_string(),
            "band" => return band(to_float(r.frequency())).to_string(),
            "state_code" => return state_code(r.state()).to_string(),
            _ => {}
        }
    }
    if let Some(tg) = talkgroup {
        match name {
            "tg_name" => return tg.name.clone(),
            "tg_number" => return tg.number.to_string(),
            "time_slot" => return tg.time_slot.to_string(),
            _ => {}
        }
    }
    String::new()
}

/// Amateur band name for a frequency in MHz; band edges are inclusive.
pub fn band(freq_mhz: f64) -> &'static str {
    match freq_mhz {
        f if (28.0..=29.7).contains(&f) => "10m",
        f if (50.0..=54.0).contains(&f) => "6m",
        f if (144.0..=148.0).contains(&f) => "2m",
        f if (220.0..=225.0).contains(&f) => "1.25m",
        f if (420.0..=450.0).contains(&f) => "70cm",
        f if (902.0..=928.0).contains(&f) => "33cm",
        f if (1240.0..=1325.0).contains(&f) => "23cm",
        _ => "UNK",
    }
}

/// Parses a frequency listing, `0.0` if it is not a number.
pub fn to_float(text: &str) -> f64 {
    text.trim().parse().unwrap_or(0.0)
}

const STATE_CODES: &[(&str, &str)] = &[
    ("Alabama", "AL"),
    ("Alaska", "AK"),
    ("Arizona", "AZ"),
    ("Arkansas", "AR"),
    ("California", "CA"),
    ("Colorado", "CO"),
    ("Connecticut", "CT"),
    ("Delaware", "DE"),
    ("District of Columbia", "DC"),
    ("Florida", "FL"),
    ("Georgia", "GA"),
    ("Hawaii", "HI"),
    ("Idaho", "ID"),
    ("Illinois", "IL"),
    ("Indiana", "IN"),
    ("Iowa", "IA"),
    ("Kansas", "KS"),
    ("Kentucky", "KY"),
    ("Louisiana", "LA"),
    ("Maine", "ME"),
    ("Maryland", "MD"),
    ("Massachusetts", "MA"),
    ("Michigan", "MI"),
    ("Minnesota", "MN"),
    ("Mississippi", "MS"),
    ("Missouri", "MO"),
    ("Montana", "MT"),
    ("Nebraska", "NE"),
    ("Nevada", "NV"),
    ("New Hampshire", "NH"),
    ("New Jersey", "NJ"),
    ("New Mexico", "NM"),
    ("New York", "NY"),
    ("North Carolina", "NC"),
    ("North Dakota", "ND"),
    ("Ohio", "OH"),
    ("Oklahoma", "OK"),
    ("Oregon", "OR"),
    ("Pennsylvania", "PA"),
    ("Rhode Island", "RI"),
    ("South Carolina", "SC"),
    ("South Dakota", "SD"),
    ("Tennessee", "TN"),
    ("Texas", "TX"),
    ("Utah", "UT"),
    ("Vermont", "VT"),
    ("Virginia", "VA"),
    ("Washington", "WA"),
    ("West Virginia", "WV"),
    ("Wisconsin", "WI"),
    ("Wyoming", "WY"),
    ("American Samoa", "AS"),
    ("Guam", "GU"),
    ("Northern Mariana Islands", "MP"),
    ("Puerto Rico", "PR"),
    ("U.S. Virgin Islands", "VI"),
    ("Virgin Islands", "VI"),
    ("Alberta", "AB"),
    ("British Columbia", "BC"),
    ("Manitoba", "MB"),
    ("New Brunswick", "NB"),
    ("Newfoundland and Labrador", "NL"),
    ("Northwest Territories", "NT"),
    ("Nova Scotia", "NS"),
    ("Nunavut", "NU"),
    ("Ontario", "ON"),
    ("Prince Edward Island", "PE"),
    ("Quebec", "QC"),
    ("Saskatchewan", "SK"),
    ("Yukon", "YT"),
];

/// Postal code for a US state or territory or a Canadian province.
/// Names not in the table come back unchanged.
pub fn state_code(state: &str) -> &str {
    let trimmed = state.trim();
    STATE_CODES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(trimmed))
        .map(|(_, code)| *code)
        .unwrap_or(state)
}

/// Renders patterns and caps the result at the configured name length.
#[derive(Debug, Clone, Copy)]
pub struct Namer {
    max_len: usize,
}

impl Namer {
    pub const DEFAULT_MAX_LEN: usize = 16;

    pub fn new(max_len: usize) -> Self {
        Self { max_len }
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    pub fn name(
        &self,
        pattern: &str,
        record: Option<&dyn Repeater>,
        talkgroup: Option<&TalkGroup>,
    ) -> String {
        self.cap(&render(pattern, record, talkgroup))
    }

    /// Truncates literal text to the name length, without interpolation.
    pub fn cap(&self, text: &str) -> String {
        text.chars().take(self.max_len).collect()
    }
}

impl Default for Namer {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_LEN)
    }
}
