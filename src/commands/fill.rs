//! # Fill Command Implementation
//!
//! This module implements the `fill` subcommand, the main operation of
//! `dmrfill`. It reads a codeplug, queries the selected repeater directory,
//! adds the synthesized entities and writes the codeplug back out.
//!
//! ## Process
//!
//! 1. **Validate**: Resolve the options into a `FillConfig`, before any input
//!    is read.
//! 2. **Read**: Decode the codeplug from `--in` or standard input.
//! 3. **Fill**: Run the pipeline against the live directories, through the
//!    response cache unless `--no-cache` is given.
//! 4. **Write**: Encode the codeplug to `--out` or standard output. Nothing is
//!    written if an earlier step failed.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Args};
use log::debug;

use dmrfill::cache::{self, ResponseCache};
use dmrfill::codeplug::Document;
use dmrfill::config::{FillConfig, FillOptions, DEFAULT_RADIUS};
use dmrfill::filter::Filter;
use dmrfill::http::HttpClient;
use dmrfill::pattern::Namer;
use dmrfill::pipeline;
use dmrfill::sources::geonames;
use dmrfill::suggestions;

/// Add zones, channels and contacts for directory repeaters to a codeplug
#[derive(Args, Debug)]
pub struct FillArgs {
    /// Input qdmr codeplug YAML file [default: standard input]
    #[arg(long = "in", value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Output qdmr codeplug YAML file [default: standard output]
    #[arg(long = "out", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Repeater data source, RADIOID_DMR or REPEATERBOOK_FM
    #[arg(long = "ds", value_name = "SOURCE")]
    pub data_source: String,

    /// Filter clause of the form 'name=val1[,val2]...' (repeatable)
    #[arg(short = 'f', long = "filter", value_name = "CLAUSE")]
    pub filters: Vec<Filter>,

    /// Pattern for DMR zone names; the zone name for analog runs (required there)
    /// [default: "$state_code $city:6 $callsign"]
    #[arg(long, value_name = "PATTERN")]
    pub zone: Option<String>,

    /// Pattern for DMR group list names [default: zone pattern + " $time_slot"]
    #[arg(long = "gl", value_name = "PATTERN")]
    pub group_list: Option<String>,

    /// Pattern for channel names
    /// [default: "$tg_name:8 $tg_number $time_slot $callsign $city", analog "$callsign $city"]
    #[arg(long = "ch", value_name = "PATTERN")]
    pub channel: Option<String>,

    /// Channel power: Min, Low, Mid, High or Max
    #[arg(long, default_value = "High")]
    pub power: String,

    /// Only include DMR repeaters that have talkgroups
    #[arg(long = "tg", value_name = "BOOL", default_value_t = true, action = ArgAction::Set)]
    pub talkgroups_required: bool,

    /// Use the North American RepeaterBook database; false for the rest of the world
    #[arg(long = "na", value_name = "BOOL", default_value_t = true, action = ArgAction::Set)]
    pub north_america: bool,

    /// Length limit for generated names
    #[arg(long = "name-lim", value_name = "N", default_value_t = Namer::DEFAULT_MAX_LEN)]
    pub name_limit: usize,

    /// Only include open repeaters
    #[arg(long, value_name = "BOOL", default_value_t = true, action = ArgAction::Set)]
    pub open: bool,

    /// Only include on-air repeaters
    #[arg(long = "on-air", value_name = "BOOL", default_value_t = true, action = ArgAction::Set)]
    pub on_air: bool,

    /// Center of a proximity search, e.g. 'Bangor, ME' or 'München'
    #[arg(long = "loc", value_name = "PLACE")]
    pub location: Option<String>,

    /// Radius of the proximity search
    #[arg(long, default_value_t = DEFAULT_RADIUS)]
    pub radius: f64,

    /// Units of --radius: miles or km
    #[arg(long, default_value = "miles")]
    pub units: String,

    /// Directory for cached directory responses [default: the user cache directory]
    #[arg(long, value_name = "DIR", env = "DMRFILL_CACHE")]
    pub cache_dir: Option<PathBuf>,

    /// Always query the directories, ignoring and not updating the cache
    #[arg(long)]
    pub no_cache: bool,

    /// Maximum age of cached responses (e.g. '30m', '1h', '1d')
    #[arg(long, value_name = "DURATION", default_value = "1h")]
    pub max_age: String,

    /// GeoNames account used to resolve --loc
    #[arg(long, value_name = "USER", env = "DMRFILL_GEONAMES_USER", default_value = geonames::DEFAULT_USERNAME)]
    pub geonames_user: String,
}

impl FillArgs {
    fn options(&self) -> FillOptions {
        FillOptions {
            data_source: self.data_source.clone(),
            filters: self.filters.clone(),
            zone: self.zone.clone(),
            group_list: self.group_list.clone(),
            channel: self.channel.clone(),
            power: self.power.clone(),
            talkgroups_required: self.talkgroups_required,
            north_america: self.north_america,
            name_limit: self.name_limit,
            open_only: self.open,
            on_air_only: self.on_air,
            location: self.location.clone(),
            radius: self.radius,
            units: self.units.clone(),
            geonames_user: self.geonames_user.clone(),
        }
    }

    fn response_cache(&self) -> Result<Option<ResponseCache>> {
        if self.no_cache {
            return Ok(None);
        }
        let max_age = cache::parse_duration(&self.max_age)
            .with_context(|| format!("Invalid --max-age '{}'", self.max_age))?;
        let root = self
            .cache_dir
            .clone()
            .unwrap_or_else(ResponseCache::default_root);
        debug!("Response cache at {}", root.display());
        Ok(Some(ResponseCache::new(root, max_age)))
    }
}

/// Execute the `fill` command.
pub fn execute(args: FillArgs) -> Result<()> {
    let config = FillConfig::from_options(args.options())?;
    let cache = args.response_cache()?;

    let mut doc = match &args.input {
        Some(path) => read_file(path)?,
        None => Document::from_reader(io::stdin().lock())
            .context("Unable to parse codeplug from standard input")?,
    };

    let client = HttpClient::new(cache)?;
    pipeline::run(&config, &client, &mut doc)?;

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Unable to create output file {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            doc.write_to(&mut writer)
                .with_context(|| format!("Unable to write codeplug to {}", path.display()))?;
            writer.flush()?;
        }
        None => {
            let mut stdout = io::stdout().lock();
            doc.write_to(&mut stdout)
                .context("Unable to write codeplug to standard output")?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn read_file(path: &Path) -> Result<Document> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(suggestions::input_not_found(path))
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Unable to open input file {}", path.display()))
        }
    };
    Document::from_reader(BufReader::new(file))
        .with_context(|| format!("Unable to parse codeplug {}", path.display()))
}
