//! RepeaterBook repeater directory.
//!
//! RepeaterBook only honors one value per query parameter, so multi-valued
//! filters are evaluated on the decoded records. A proximity search replaces
//! the regular parameters with `qtype=prox` and a center and radius.

use log::{debug, info};
use serde::Deserialize;

use crate::error::Result;
use crate::filter::{Field, Filter, Filterable, MultiValue, QueryPlan};
use crate::http::{get_json, with_params, Fetch};
use crate::pattern;
use crate::record::{AnalogRepeater, Repeater};

use super::lenient;

pub const NORTH_AMERICA_URL: &str = "https://www.repeaterbook.com/api/export.php";
pub const REST_OF_WORLD_URL: &str = "https://www.repeaterbook.com/api/exportROW.php";

pub const QUERY_PARAMS: &[&str] = &[
    "callsign", "city", "landmark", "state", "country", "county", "frequency", "mode", "emcomm",
    "stype",
];

pub const PROXIMITY_PARAMS: &[&str] = &["qtype", "lat", "lng", "dist", "dunit"];

pub const KM_PER_MILE: f64 = 1.609344;

/// Operating mode a search is restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Analog,
    Dmr,
}

impl Mode {
    /// Value of the `mode` query parameter.
    fn param(self) -> &'static str {
        match self {
            Mode::Analog => "analog",
            Mode::Dmr => "DMR",
        }
    }

    /// Record attribute that is `Yes` for repeaters supporting the mode.
    fn attribute(self) -> &'static str {
        match self {
            Mode::Analog => "FM Analog",
            Mode::Dmr => "DMR",
        }
    }
}

/// Center and radius of a proximity search.
#[derive(Debug, Clone, PartialEq)]
pub struct Proximity {
    pub lat: String,
    pub lng: String,
    pub radius_km: f64,
}

/// Options of one RepeaterBook search besides the user's filters.
#[derive(Debug, Clone, PartialEq)]
pub struct Search {
    /// Query the North American database rather than rest-of-world.
    pub north_america: bool,
    pub open_only: bool,
    pub on_air_only: bool,
    pub mode: Mode,
    pub proximity: Option<Proximity>,
}

impl Search {
    fn url(&self) -> &'static str {
        if self.north_america {
            NORTH_AMERICA_URL
        } else {
            REST_OF_WORLD_URL
        }
    }

    /// The user's filters followed by the ones this search implies.
    fn filters(&self, user: &[Filter]) -> Vec<Filter> {
        let mut filters = user.to_vec();
        match &self.proximity {
            // `mode` is not a proximity parameter
            Some(_) => filters.push(Filter::new(self.mode.attribute(), ["Yes"])),
            None => filters.push(Filter::new("mode", [self.mode.param()])),
        }
        if self.open_only {
            filters.push(Filter::new("use", ["OPEN"]));
        }
        if self.on_air_only {
            filters.push(Filter::new("operational_status", ["On-air"]));
        }
        if let Some(prox) = &self.proximity {
            filters.push(Filter::new("qtype", ["prox"]));
            filters.push(Filter::new("dunit", ["km"]));
            filters.push(Filter::new("dist", [format!("{:.6}", prox.radius_km)]));
            filters.push(Filter::new("lat", [prox.lat.as_str()]));
            filters.push(Filter::new("lng", [prox.lng.as_str()]));
        }
        filters
    }

    fn upstream(&self) -> &'static [&'static str] {
        if self.proximity.is_some() {
            PROXIMITY_PARAMS
        } else {
            QUERY_PARAMS
        }
    }
}

#[derive(Debug, Deserialize)]
struct Response {
    #[serde(default, deserialize_with = "lenient::list")]
    results: Vec<RepeaterBookRepeater>,
}

/// A repeater as listed by RepeaterBook.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RepeaterBookRepeater {
    #[serde(rename = "State ID", deserialize_with = "lenient::string")]
    pub state_id: String,
    #[serde(rename = "Rptr ID", deserialize_with = "lenient::string")]
    pub rptr_id: String,
    #[serde(rename = "Frequency", deserialize_with = "lenient::string")]
    pub frequency: String,
    #[serde(rename = "Input Freq", deserialize_with = "lenient::string")]
    pub input_freq: String,
    #[serde(rename = "PL", deserialize_with = "lenient::string")]
    pub pl: String,
    #[serde(rename = "TSQ", deserialize_with = "lenient::string")]
    pub tsq: String,
    #[serde(rename = "Nearest City", deserialize_with = "lenient::string")]
    pub nearest_city: String,
    #[serde(rename = "Landmark", deserialize_with = "lenient::string")]
    pub landmark: String,
    #[serde(rename = "Region", deserialize_with = "lenient::string")]
    pub region: String,
    #[serde(rename = "County", deserialize_with = "lenient::string")]
    pub county: String,
    #[serde(rename = "State", deserialize_with = "lenient::string")]
    pub state: String,
    #[serde(rename = "Country", deserialize_with = "lenient::string")]
    pub country: String,
    #[serde(rename = "Lat", deserialize_with = "lenient::string")]
    pub lat: String,
    #[serde(rename = "Long", deserialize_with = "lenient::string")]
    pub long: String,
    #[serde(rename = "Precise", deserialize_with = "lenient::number")]
    pub precise: u32,
    #[serde(rename = "Callsign", deserialize_with = "lenient::string")]
    pub callsign: String,
    #[serde(rename = "Use", deserialize_with = "lenient::string")]
    pub use_: String,
    #[serde(rename = "Operational Status", deserialize_with = "lenient::string")]
    pub operational_status: String,
    #[serde(rename = "ARES", deserialize_with = "lenient::string")]
    pub ares: String,
    #[serde(rename = "RACES", deserialize_with = "lenient::string")]
    pub races: String,
    #[serde(rename = "SKYWARN", deserialize_with = "lenient::string")]
    pub skywarn: String,
    #[serde(rename = "CANWARN", deserialize_with = "lenient::string")]
    pub canwarn: String,
    #[serde(rename = "AllStar Node", deserialize_with = "lenient::string")]
    pub allstar_node: String,
    #[serde(rename = "EchoLink Node", deserialize_with = "lenient::string")]
    pub echolink_node: String,
    #[serde(rename = "IRLP Node", deserialize_with = "lenient::string")]
    pub irlp_node: String,
    #[serde(rename = "Wires Node", deserialize_with = "lenient::string")]
    pub wires_node: String,
    #[serde(rename = "FM Analog", deserialize_with = "lenient::string")]
    pub fm_analog: String,
    #[serde(rename = "DMR", deserialize_with = "lenient::string")]
    pub dmr: String,
    #[serde(rename = "DMR Color Code", deserialize_with = "lenient::string")]
    pub dmr_color_code: String,
    #[serde(rename = "DMR ID", deserialize_with = "lenient::string")]
    pub dmr_id: String,
    #[serde(rename = "D-Star", deserialize_with = "lenient::string")]
    pub d_star: String,
    #[serde(rename = "NXDN", deserialize_with = "lenient::string")]
    pub nxdn: String,
    #[serde(rename = "APCO P-25", deserialize_with = "lenient::string")]
    pub apco_p25: String,
    #[serde(rename = "P-25 NAC", deserialize_with = "lenient::string")]
    pub p25_nac: String,
    #[serde(rename = "M17", deserialize_with = "lenient::string")]
    pub m17: String,
    #[serde(rename = "M17 CAN", deserialize_with = "lenient::string")]
    pub m17_can: String,
    #[serde(rename = "Tetra", deserialize_with = "lenient::string")]
    pub tetra: String,
    #[serde(rename = "Tetra MCC", deserialize_with = "lenient::string")]
    pub tetra_mcc: String,
    #[serde(rename = "Tetra MNC", deserialize_with = "lenient::string")]
    pub tetra_mnc: String,
    #[serde(rename = "System Fusion", deserialize_with = "lenient::string")]
    pub system_fusion: String,
    #[serde(rename = "YSF DG ID Uplink", deserialize_with = "lenient::string")]
    pub ysf_dg_id_uplink: String,
    #[serde(rename = "YSF DG IS Downlink", deserialize_with = "lenient::string")]
    pub ysf_dg_is_downlink: String,
    #[serde(rename = "YSF DSC", deserialize_with = "lenient::string")]
    pub ysf_dsc: String,
    #[serde(rename = "Notes", deserialize_with = "lenient::string")]
    pub notes: String,
    #[serde(rename = "Last Update", deserialize_with = "lenient::string")]
    pub last_update: String,
    /// Amateur band of `frequency`, filled in after decoding.
    #[serde(skip)]
    pub band: String,
}

impl RepeaterBookRepeater {
    /// The repeater's DMR ID, if it lists a usable one.
    pub fn dmr_id(&self) -> Option<u32> {
        match self.dmr_id.trim().parse::<u32>() {
            Ok(0) | Err(_) => None,
            Ok(id) => Some(id),
        }
    }
}

impl Repeater for RepeaterBookRepeater {
    fn callsign(&self) -> &str {
        &self.callsign
    }
    fn city(&self) -> &str {
        &self.nearest_city
    }
    fn state(&self) -> &str {
        &self.state
    }
    fn frequency(&self) -> &str {
        &self.frequency
    }
}

impl AnalogRepeater for RepeaterBookRepeater {
    fn input_frequency(&self) -> &str {
        &self.input_freq
    }
    fn uplink_tone(&self) -> &str {
        &self.pl
    }
    fn downlink_tone(&self) -> &str {
        &self.tsq
    }
}

macro_rules! fields {
    ($($name:literal => $field:ident),* $(,)?) => {
        &[$(Field { name: $name, get: |r: &RepeaterBookRepeater| r.$field.to_string() }),*]
    };
}

impl Filterable for RepeaterBookRepeater {
    const FIELDS: &'static [Field<Self>] = fields![
        "State ID" => state_id,
        "Rptr ID" => rptr_id,
        "Frequency" => frequency,
        "Input Freq" => input_freq,
        "PL" => pl,
        "TSQ" => tsq,
        "Nearest City" => nearest_city,
        "Landmark" => landmark,
        "Region" => region,
        "County" => county,
        "State" => state,
        "Country" => country,
        "Lat" => lat,
        "Long" => long,
        "Precise" => precise,
        "Callsign" => callsign,
        "Use" => use_,
        "Operational Status" => operational_status,
        "ARES" => ares,
        "RACES" => races,
        "SKYWARN" => skywarn,
        "CANWARN" => canwarn,
        "AllStar Node" => allstar_node,
        "EchoLink Node" => echolink_node,
        "IRLP Node" => irlp_node,
        "Wires Node" => wires_node,
        "FM Analog" => fm_analog,
        "DMR" => dmr,
        "DMR Color Code" => dmr_color_code,
        "DMR ID" => dmr_id,
        "D-Star" => d_star,
        "NXDN" => nxdn,
        "APCO P-25" => apco_p25,
        "P-25 NAC" => p25_nac,
        "M17" => m17,
        "M17 CAN" => m17_can,
        "Tetra" => tetra,
        "Tetra MCC" => tetra_mcc,
        "Tetra MNC" => tetra_mnc,
        "System Fusion" => system_fusion,
        "YSF DG ID Uplink" => ysf_dg_id_uplink,
        "YSF DG IS Downlink" => ysf_dg_is_downlink,
        "YSF DSC" => ysf_dsc,
        "Notes" => notes,
        "Last Update" => last_update,
        "band" => band,
    ];
}

/// RepeaterBook repeater searches.
pub struct RepeaterBook<'a> {
    fetch: &'a dyn Fetch,
}

impl<'a> RepeaterBook<'a> {
    pub fn new(fetch: &'a dyn Fetch) -> Self {
        Self { fetch }
    }

    pub fn search(&self, filters: &[Filter], search: &Search) -> Result<Vec<RepeaterBookRepeater>> {
        let filters = search.filters(filters);
        let plan = QueryPlan::<RepeaterBookRepeater>::new(&filters, search.upstream(), MultiValue::SingleOnly);
        let url = with_params(
            search.url(),
            plan.params.iter().map(|(k, v)| (k.as_str(), v.as_str())),
        )?;
        debug!("RepeaterBook URL {}", url);

        let mut response: Response = get_json(self.fetch, &url, "RepeaterBook")?;
        let found = response.results.len();
        for repeater in &mut response.results {
            if let Ok(mhz) = repeater.frequency.trim().parse::<f64>() {
                repeater.band = pattern::band(mhz).to_string();
            }
        }
        let repeaters = plan.apply(response.results);
        info!("RepeaterBook: {} repeaters, {} after filtering", found, repeaters.len());
        Ok(repeaters)
    }
}

/// Collects the usable DMR IDs of `repeaters`, in order.
pub fn dmr_ids(repeaters: &[RepeaterBookRepeater]) -> Vec<u32> {
    repeaters
        .iter()
        .filter_map(|r| {
            let id = r.dmr_id();
            if id.is_none() {
                debug!(
                    "Skipping repeater {} {} with DMR ID '{}'",
                    r.callsign, r.frequency, r.dmr_id
                );
            }
            id
        })
        .collect()
}
