//! The `fill` run from a decoded codeplug to a filled one.
//!
//! ## Overview
//!
//! 1. Locate - resolve the proximity search center through GeoNames (only
//!    with a location)
//! 2. Query - fetch repeaters from the selected directory
//! 3. Synthesize - append zones, group lists, contacts and channels
//! 4. Finalize - order zones and their channels deterministically
//!
//! Every request goes through the caller's [`Fetch`], which is also where
//! response caching happens.

use log::{info, warn};

use crate::codeplug::Document;
use crate::config::{DataSource, FillConfig};
use crate::error::Result;
use crate::filter::Filter;
use crate::finalize::finalize;
use crate::http::Fetch;
use crate::record::{DmrRepeater, TalkGroup};
use crate::sources::brandmeister::{self, Brandmeister};
use crate::sources::geonames;
use crate::sources::radioid::{RadioId, RadioIdRepeater};
use crate::sources::repeaterbook::{self, Mode, Proximity, RepeaterBook, Search};
use crate::synth::{Summary, Synthesizer};

/// Fills `doc` with the repeaters selected by `config`.
pub fn run(config: &FillConfig, fetch: &dyn Fetch, doc: &mut Document) -> Result<Summary> {
    let summary = match config.data_source {
        DataSource::RepeaterBookFm => fill_analog(config, fetch, doc)?,
        DataSource::RadioIdDmr => fill_digital(config, fetch, doc)?,
    };
    finalize(doc);
    summary.log();
    Ok(summary)
}

fn proximity(config: &FillConfig, fetch: &dyn Fetch) -> Result<Option<Proximity>> {
    let Some(location) = &config.location else {
        return Ok(None);
    };
    let place = geonames::locate(fetch, &location.query, &config.geonames_user)?;
    Ok(Some(Proximity {
        lat: place.lat,
        lng: place.lng,
        radius_km: location.radius_km,
    }))
}

fn search(config: &FillConfig, mode: Mode, proximity: Option<Proximity>) -> Search {
    Search {
        north_america: config.north_america,
        open_only: config.open_only,
        on_air_only: config.on_air_only,
        mode,
        proximity,
    }
}

fn fill_analog(config: &FillConfig, fetch: &dyn Fetch, doc: &mut Document) -> Result<Summary> {
    let search = search(config, Mode::Analog, proximity(config, fetch)?);
    let repeaters = RepeaterBook::new(fetch).search(&config.filters, &search)?;

    let mut synth = Synthesizer::new(doc, &config.synth);
    synth.add_analog_repeaters(&repeaters);
    Ok(synth.summary())
}

fn fill_digital(config: &FillConfig, fetch: &dyn Fetch, doc: &mut Document) -> Result<Summary> {
    let mut filters = config.filters.clone();
    if let Some(prox) = proximity(config, fetch)? {
        // RadioID has no proximity search; find the repeaters' DMR IDs on
        // RepeaterBook and look those up instead.
        let search = search(config, Mode::Dmr, Some(prox));
        let nearby = RepeaterBook::new(fetch).search(&config.filters, &search)?;
        let ids = repeaterbook::dmr_ids(&nearby);
        if ids.is_empty() {
            warn!("No DMR repeaters with a DMR ID found near the location");
            return Ok(Summary::default());
        }
        info!("Found {} DMR repeater IDs near the location", ids.len());
        filters.push(Filter::new("id", ids.iter().map(u32::to_string)));
    }

    let repeaters = RadioId::new(fetch).query(&filters)?;
    let bm = Brandmeister::new(fetch);

    let mut synth = Synthesizer::new(doc, &config.synth);
    for repeater in &repeaters {
        let alternate = network_talkgroups(&bm, repeater);
        synth.add_dmr_repeater(repeater, &alternate);
    }
    Ok(synth.summary())
}

/// Talkgroups the repeater's network reports for it; empty when the network
/// is not queryable or the lookup fails.
fn network_talkgroups(bm: &Brandmeister<'_>, repeater: &RadioIdRepeater) -> Vec<TalkGroup> {
    if !brandmeister::is_brandmeister(repeater.network()) {
        return Vec::new();
    }
    bm.talkgroups(repeater).unwrap_or_else(|e| {
        warn!(
            "Could not get Brandmeister talkgroups for {} ({}): {}",
            repeater.callsign,
            repeater.repeater_id(),
            e
        );
        Vec::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FillOptions;
    use crate::http::tests::StubFetch;
    use crate::sources::radioid::RADIOID_URL;
    use crate::sources::repeaterbook::NORTH_AMERICA_URL;

    fn config(ds: &str) -> FillConfig {
        FillConfig::from_options(FillOptions {
            data_source: ds.to_string(),
            zone: (ds == "REPEATERBOOK_FM").then(|| "Maine 2m".to_string()),
            ..FillOptions::default()
        })
        .unwrap()
    }

    const RADIOID_BODY: &str = r#"{"count": 1, "results": [{
        "callsign": "KC1FRJ", "city": "Presque Isle", "color_code": 12,
        "country": "United States", "frequency": "145.18000", "id": 310198,
        "ipsc_network": "BM", "offset": "-0.600", "state": "Maine",
        "rfinder": "Time Slot # 1 - Group Call 3172 = Northeast<br>Time Slot # 2 - Group Call 9 = Local Site<br>"
    }]}"#;

    #[test]
    fn test_brandmeister_failure_falls_back() {
        let stub = StubFetch::default().route(RADIOID_URL, RADIOID_BODY);
        let mut doc = Document::default();
        let summary = run(&config("RADIOID_DMR"), &stub, &mut doc).unwrap();
        assert_eq!(summary.channels, 2);
        assert!(stub
            .requests
            .borrow()
            .iter()
            .any(|u| u.contains("/device/310198/talkgroup")));
    }

    #[test]
    fn test_brandmeister_longer_list_wins() {
        let stub = StubFetch::default()
            .route(RADIOID_URL, RADIOID_BODY)
            .route(
                "https://api.brandmeister.network/v2/device/",
                r#"[{"talkgroup":"91","slot":"1"},{"talkgroup":"3172","slot":"1"},{"talkgroup":"310198","slot":"2"}]"#,
            )
            .route("https://api.brandmeister.network/v2/talkgroup", r#"{"91":"Worldwide","3172":"Northeast"}"#);
        let mut doc = Document::default();
        run(&config("RADIOID_DMR"), &stub, &mut doc).unwrap();
        assert_eq!(doc.channels.len(), 3);
        assert_eq!(doc.find_dmr_contact(310198).unwrap().name, "KC1FRJ Local");
        assert!(doc.find_dmr_contact(9).is_none());
    }

    #[test]
    fn test_directory_failure_is_fatal() {
        let stub = StubFetch::default();
        let mut doc = Document::default();
        assert!(run(&config("RADIOID_DMR"), &stub, &mut doc).is_err());
        assert_eq!(doc, Document::default());
    }

    #[test]
    fn test_analog_run_creates_zone_even_if_empty() {
        let stub = StubFetch::default().route(NORTH_AMERICA_URL, r#"{"count":0,"results":[]}"#);
        let mut doc = Document::default();
        let summary = run(&config("REPEATERBOOK_FM"), &stub, &mut doc).unwrap();
        assert_eq!(summary.zones, 1);
        assert_eq!(doc.zones[0].name, "Maine 2m");
        assert!(doc.zones[0].a.is_empty());
    }

    #[test]
    fn test_location_without_dmr_ids_adds_nothing() {
        let stub = StubFetch::default()
            .route(
                geonames::GEONAMES_URL,
                r#"{"totalResultsCount":1,"geonames":[{"lat":"44.8","lng":"-68.7","name":"Bangor"}]}"#,
            )
            .route(NORTH_AMERICA_URL, r#"{"count":0,"results":[]}"#);
        let mut config = config("RADIOID_DMR");
        config.location = Some(crate::config::Location {
            query: "Bangor, ME".to_string(),
            radius_km: 40.0,
        });
        let mut doc = Document::default();
        let summary = run(&config, &stub, &mut doc).unwrap();
        assert_eq!(summary, Summary::default());
        assert!(!stub.requests.borrow().iter().any(|u| u.starts_with(RADIOID_URL)));
    }
}
