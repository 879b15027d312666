//! RadioID DMR repeater directory.

use std::sync::LazyLock;

use log::{debug, info};
use regex::Regex;
use serde::Deserialize;

use crate::error::Result;
use crate::filter::{Field, Filter, Filterable, MultiValue, QueryPlan};
use crate::http::{get_json, with_params, Fetch};
use crate::record::{DmrRepeater, Repeater, TalkGroup};

use super::lenient;

pub const RADIOID_URL: &str = "https://radioid.net/api/dmr/repeater/";

/// Filter keys RadioID evaluates itself. Repeated values are OR-ed.
pub const QUERY_PARAMS: &[&str] = &["id", "callsign", "city", "state", "country", "frequency", "trustee"];

static TALKGROUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"Time Slot # (\d) [-=] Group Call (\d+)(\s*[-=]\s*([^"<>]*))?"#)
        .expect("valid talkgroup pattern")
});

#[derive(Debug, Deserialize)]
struct Response {
    #[serde(default, deserialize_with = "lenient::list")]
    results: Vec<RadioIdRepeater>,
}

/// A repeater as listed by RadioID.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RadioIdRepeater {
    #[serde(default, deserialize_with = "lenient::string")]
    pub callsign: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub city: String,
    #[serde(default, deserialize_with = "lenient::number")]
    pub color_code: u8,
    #[serde(default, deserialize_with = "lenient::string")]
    pub country: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub details: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub frequency: String,
    #[serde(default, deserialize_with = "lenient::number")]
    pub id: u32,
    #[serde(default, deserialize_with = "lenient::string")]
    pub ipsc_network: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub offset: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub rfinder: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub state: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub trustee: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub ts_linked: String,
    /// Parsed from `rfinder`.
    #[serde(skip)]
    pub talkgroups: Vec<TalkGroup>,
}

impl Repeater for RadioIdRepeater {
    fn callsign(&self) -> &str {
        &self.callsign
    }
    fn city(&self) -> &str {
        &self.city
    }
    fn state(&self) -> &str {
        &self.state
    }
    fn frequency(&self) -> &str {
        &self.frequency
    }
}

impl DmrRepeater for RadioIdRepeater {
    fn repeater_id(&self) -> u32 {
        self.id
    }
    fn offset(&self) -> &str {
        &self.offset
    }
    fn color_code(&self) -> u8 {
        self.color_code
    }
    fn network(&self) -> &str {
        &self.ipsc_network
    }
    fn talkgroups(&self) -> &[TalkGroup] {
        &self.talkgroups
    }
}

impl Filterable for RadioIdRepeater {
    const FIELDS: &'static [Field<Self>] = &[
        Field { name: "callsign", get: |r| r.callsign.clone() },
        Field { name: "city", get: |r| r.city.clone() },
        Field { name: "color_code", get: |r| r.color_code.to_string() },
        Field { name: "country", get: |r| r.country.clone() },
        Field { name: "details", get: |r| r.details.clone() },
        Field { name: "frequency", get: |r| r.frequency.clone() },
        Field { name: "id", get: |r| r.id.to_string() },
        Field { name: "ipsc_network", get: |r| r.ipsc_network.clone() },
        Field { name: "offset", get: |r| r.offset.clone() },
        Field { name: "rfinder", get: |r| r.rfinder.clone() },
        Field { name: "state", get: |r| r.state.clone() },
        Field { name: "trustee", get: |r| r.trustee.clone() },
        Field { name: "ts_linked", get: |r| r.ts_linked.clone() },
    ];
}

/// Extracts the talkgroup lines of an rfinder listing, e.g.
/// `Time Slot # 1 - Group Call 3172 = Northeast<br>`.
pub fn parse_talkgroups(rfinder: &str) -> Vec<TalkGroup> {
    TALKGROUP
        .captures_iter(rfinder)
        .filter_map(|caps| {
            let time_slot = caps.get(1)?.as_str().parse().ok()?;
            let number = caps.get(2)?.as_str().parse().ok()?;
            let name = caps.get(4).map(|m| m.as_str().trim()).unwrap_or_default();
            Some(TalkGroup::new(number, time_slot, name))
        })
        .collect()
}

/// RadioID repeater queries.
pub struct RadioId<'a> {
    fetch: &'a dyn Fetch,
}

impl<'a> RadioId<'a> {
    pub fn new(fetch: &'a dyn Fetch) -> Self {
        Self { fetch }
    }

    pub fn query(&self, filters: &[Filter]) -> Result<Vec<RadioIdRepeater>> {
        let plan = QueryPlan::<RadioIdRepeater>::new(filters, QUERY_PARAMS, MultiValue::Repeated);
        let url = with_params(
            RADIOID_URL,
            plan.params.iter().map(|(k, v)| (k.as_str(), v.as_str())),
        )?;
        debug!("RadioID URL {}", url);

        let response: Response = get_json(self.fetch, &url, "RadioID")?;
        let found = response.results.len();
        let mut repeaters = plan.apply(response.results);
        for repeater in &mut repeaters {
            repeater.talkgroups = parse_talkgroups(&repeater.rfinder);
        }
        info!("RadioID: {} repeaters, {} after filtering", found, repeaters.len());
        Ok(repeaters)
    }
}
