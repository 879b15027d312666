//! # Run Configuration
//!
//! This module turns the options of a `fill` run into a validated
//! [`FillConfig`]. The command layer collects the raw values into
//! [`FillOptions`]; [`FillConfig::from_options`] resolves defaults that
//! depend on other options and rejects unsupported combinations.
//!
//! ## Defaults that depend on the data source
//!
//! - Analog runs put every repeater into one zone, so the zone name must be
//!   given explicitly; the default zone pattern is rejected.
//! - The channel pattern defaults to [`DEFAULT_DIGITAL_CHANNEL_PATTERN`] for
//!   DMR runs and [`DEFAULT_ANALOG_CHANNEL_PATTERN`] for analog runs.
//! - The group list pattern defaults to the zone pattern followed by
//!   ` $time_slot`.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::filter::Filter;
use crate::pattern::Namer;
use crate::sources::geonames;
use crate::sources::repeaterbook::KM_PER_MILE;
use crate::suggestions::value_hint;
use crate::synth::SynthOptions;

pub const DEFAULT_ZONE_PATTERN: &str = "$state_code $city:6 $callsign";
pub const DEFAULT_DIGITAL_CHANNEL_PATTERN: &str = "$tg_name:8 $tg_number $time_slot $callsign $city";
pub const DEFAULT_ANALOG_CHANNEL_PATTERN: &str = "$callsign $city";
pub const DEFAULT_RADIUS: f64 = 25.0;

fn invalid_value(what: &str, value: &str, candidates: &[&str]) -> Error {
    Error::Config {
        message: format!("unsupported {} '{}'", what, value),
        hint: Some(value_hint(value, candidates)),
    }
}

/// The directory a run draws repeaters from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    /// DMR repeaters from RadioID.
    RadioIdDmr,
    /// Analog FM repeaters from RepeaterBook.
    RepeaterBookFm,
}

impl DataSource {
    pub const NAMES: &'static [&'static str] = &["RADIOID_DMR", "REPEATERBOOK_FM"];

    pub fn name(self) -> &'static str {
        match self {
            DataSource::RadioIdDmr => "RADIOID_DMR",
            DataSource::RepeaterBookFm => "REPEATERBOOK_FM",
        }
    }

    pub fn is_digital(self) -> bool {
        self == DataSource::RadioIdDmr
    }
}

impl FromStr for DataSource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "RADIOID_DMR" => Ok(DataSource::RadioIdDmr),
            "REPEATERBOOK_FM" => Ok(DataSource::RepeaterBookFm),
            _ => Err(invalid_value("data source", s, Self::NAMES)),
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Transmit power written to generated channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Power {
    Min,
    Low,
    Mid,
    High,
    Max,
}

impl Power {
    pub const NAMES: &'static [&'static str] = &["Min", "Low", "Mid", "High", "Max"];

    pub fn name(self) -> &'static str {
        match self {
            Power::Min => "Min",
            Power::Low => "Low",
            Power::Mid => "Mid",
            Power::High => "High",
            Power::Max => "Max",
        }
    }
}

impl FromStr for Power {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Min" => Ok(Power::Min),
            "Low" => Ok(Power::Low),
            "Mid" => Ok(Power::Mid),
            "High" => Ok(Power::High),
            "Max" => Ok(Power::Max),
            _ => Err(invalid_value("power", s, Self::NAMES)),
        }
    }
}

impl fmt::Display for Power {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Units of the proximity search radius.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Units {
    Miles,
    Km,
}

impl Units {
    pub const NAMES: &'static [&'static str] = &["miles", "km"];

    pub fn to_km(self, distance: f64) -> f64 {
        match self {
            Units::Miles => distance * KM_PER_MILE,
            Units::Km => distance,
        }
    }
}

impl FromStr for Units {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "miles" => Ok(Units::Miles),
            "km" => Ok(Units::Km),
            _ => Err(invalid_value("units", s, Self::NAMES)),
        }
    }
}

/// Raw `fill` options as given on the command line.
///
/// `None` patterns mean "use the default".
#[derive(Debug, Clone)]
pub struct FillOptions {
    pub data_source: String,
    pub filters: Vec<Filter>,
    pub zone: Option<String>,
    pub group_list: Option<String>,
    pub channel: Option<String>,
    pub power: String,
    pub talkgroups_required: bool,
    pub north_america: bool,
    pub name_limit: usize,
    pub open_only: bool,
    pub on_air_only: bool,
    pub location: Option<String>,
    pub radius: f64,
    pub units: String,
    pub geonames_user: String,
}

impl Default for FillOptions {
    fn default() -> Self {
        Self {
            data_source: String::new(),
            filters: Vec::new(),
            zone: None,
            group_list: None,
            channel: None,
            power: Power::High.name().to_string(),
            talkgroups_required: true,
            north_america: true,
            name_limit: Namer::DEFAULT_MAX_LEN,
            open_only: true,
            on_air_only: true,
            location: None,
            radius: DEFAULT_RADIUS,
            units: "miles".to_string(),
            geonames_user: geonames::DEFAULT_USERNAME.to_string(),
        }
    }
}

/// Center of a proximity search.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    /// Free-text place name, resolved through GeoNames.
    pub query: String,
    pub radius_km: f64,
}

/// A validated `fill` run.
#[derive(Debug, Clone)]
pub struct FillConfig {
    pub data_source: DataSource,
    pub filters: Vec<Filter>,
    pub synth: SynthOptions,
    pub north_america: bool,
    pub open_only: bool,
    pub on_air_only: bool,
    pub location: Option<Location>,
    pub geonames_user: String,
}

impl FillConfig {
    pub fn from_options(options: FillOptions) -> Result<Self> {
        let data_source: DataSource = options.data_source.parse()?;
        let power: Power = options.power.parse()?;
        let units: Units = options.units.parse()?;

        if options.radius.is_nan() || options.radius <= 0.0 {
            return Err(Error::Config {
                message: format!("radius must be greater than zero, got {}", options.radius),
                hint: Some("Use --radius with a positive distance, e.g. '--radius 25'".to_string()),
            });
        }
        if options.name_limit == 0 {
            return Err(Error::Config {
                message: "name length limit must be at least 1".to_string(),
                hint: Some(format!(
                    "Most radios allow {} characters; use --name-lim {}",
                    Namer::DEFAULT_MAX_LEN,
                    Namer::DEFAULT_MAX_LEN
                )),
            });
        }

        let zone_pattern = match (data_source, options.zone) {
            (DataSource::RepeaterBookFm, None) => return Err(analog_zone_required()),
            (DataSource::RepeaterBookFm, Some(zone)) if zone == DEFAULT_ZONE_PATTERN => {
                return Err(analog_zone_required())
            }
            (_, Some(zone)) => zone,
            (_, None) => DEFAULT_ZONE_PATTERN.to_string(),
        };
        let channel_pattern = options.channel.unwrap_or_else(|| {
            if data_source.is_digital() {
                DEFAULT_DIGITAL_CHANNEL_PATTERN.to_string()
            } else {
                DEFAULT_ANALOG_CHANNEL_PATTERN.to_string()
            }
        });
        let group_list_pattern = options
            .group_list
            .unwrap_or_else(|| format!("{} $time_slot", zone_pattern));

        let location = options
            .location
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty())
            .map(|query| Location {
                query,
                radius_km: units.to_km(options.radius),
            });

        Ok(Self {
            data_source,
            filters: options.filters,
            synth: SynthOptions {
                zone_pattern,
                group_list_pattern,
                channel_pattern,
                power: power.name().to_string(),
                namer: Namer::new(options.name_limit),
                talkgroups_required: options.talkgroups_required,
            },
            north_america: options.north_america,
            open_only: options.open_only,
            on_air_only: options.on_air_only,
            location,
            geonames_user: options.geonames_user,
        })
    }
}

fn analog_zone_required() -> Error {
    Error::Config {
        message: "a zone name is required for analog data sources".to_string(),
        hint: Some("All analog repeaters go into one zone; name it with --zone, e.g. '--zone \"Maine 2m\"'".to_string()),
    }
}
