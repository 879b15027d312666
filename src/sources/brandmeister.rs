//! Brandmeister talkgroup assignments.
//!
//! RadioID listings of Brandmeister repeaters are often incomplete, so the
//! statically linked talkgroups are fetched from the network itself.

use std::cell::OnceCell;
use std::collections::HashMap;

use log::{debug, warn};
use serde::Deserialize;
use url::Url;

use crate::error::{Error, Result};
use crate::http::{get_json, Fetch};
use crate::record::{DmrRepeater, TalkGroup};

use super::lenient;

pub const API_URL: &str = "https://api.brandmeister.network/v2";

#[derive(Debug, Deserialize)]
struct StaticTalkgroup {
    #[serde(deserialize_with = "lenient::string")]
    talkgroup: String,
    #[serde(deserialize_with = "lenient::string")]
    slot: String,
}

/// True if a repeater's network name refers to Brandmeister.
pub fn is_brandmeister(network: &str) -> bool {
    let network = network.to_lowercase();
    network.contains("brandmeister") || network.contains("bm")
}

/// Brandmeister API access for one run.
///
/// The talkgroup name table is fetched on first use and kept for the rest of
/// the run.
pub struct Brandmeister<'a> {
    fetch: &'a dyn Fetch,
    names: OnceCell<HashMap<String, String>>,
}

impl<'a> Brandmeister<'a> {
    pub fn new(fetch: &'a dyn Fetch) -> Self {
        Self {
            fetch,
            names: OnceCell::new(),
        }
    }

    fn names(&self) -> &HashMap<String, String> {
        self.names.get_or_init(|| {
            let loaded = Url::parse(&format!("{}/talkgroup", API_URL))
                .map_err(Error::from)
                .and_then(|url| get_json(self.fetch, &url, "Brandmeister"));
            match loaded {
                Ok(names) => names,
                Err(e) => {
                    warn!("Could not load Brandmeister talkgroup names: {}", e);
                    HashMap::new()
                }
            }
        })
    }

    /// Talkgroups statically linked on the repeater.
    ///
    /// A talkgroup numbered like the repeater itself is its local talkgroup
    /// and is named `<callsign> Local`.
    pub fn talkgroups<R: DmrRepeater>(&self, repeater: &R) -> Result<Vec<TalkGroup>> {
        let url = Url::parse(&format!(
            "{}/device/{}/talkgroup",
            API_URL,
            repeater.repeater_id()
        ))?;
        debug!("Brandmeister URL {}", url);
        let linked: Vec<StaticTalkgroup> = get_json(self.fetch, &url, "Brandmeister")?;

        let decode = |what: &str, value: &str| Error::Decode {
            service: "Brandmeister".to_string(),
            message: format!("invalid {} '{}'", what, value),
        };
        let mut talkgroups = Vec::with_capacity(linked.len());
        for tg in linked {
            let number: u32 = tg
                .talkgroup
                .trim()
                .parse()
                .map_err(|_| decode("talkgroup", &tg.talkgroup))?;
            let time_slot: u8 = tg.slot.trim().parse().map_err(|_| decode("slot", &tg.slot))?;
            let name = if number == repeater.repeater_id() {
                format!("{} Local", repeater.callsign())
            } else {
                self.names()
                    .get(tg.talkgroup.trim())
                    .cloned()
                    .unwrap_or_default()
            };
            talkgroups.push(TalkGroup::new(number, time_slot, name));
        }
        debug!(
            "Brandmeister: {} talkgroups for {}",
            talkgroups.len(),
            repeater.repeater_id()
        );
        Ok(talkgroups)
    }
}
