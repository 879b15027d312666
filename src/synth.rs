//! # Entity Synthesis
//!
//! Turns directory records into codeplug entities and merges them into a
//! [`Document`].
//!
//! ## Digital mode
//!
//! Each DMR repeater gets its own zone and two group lists (one per
//! timeslot). Every talkgroup the repeater carries becomes a channel in that
//! zone, pointing at the DMR contact for the talkgroup. Contacts are shared:
//! a talkgroup number already present anywhere in the document is reused.
//!
//! ## Analog mode
//!
//! All FM repeaters of a run go into one shared zone, one channel each.
//!
//! Entities are always appended before anything refers to them, so the
//! document stays consistent after every step. Records that cannot be used
//! (bad frequency, bad tone, bad timeslot) are logged and skipped.

use log::{debug, info, warn};

use crate::codeplug::{
    AnalogChannel, Channel, Contact, Defaultable, DigitalChannel, DmrContact, Document, GroupList,
    Tone, Zone, ADMIT_ALWAYS,
};
use crate::pattern::Namer;
use crate::record::{AnalogRepeater, DmrRepeater, Repeater, TalkGroup};

/// Bandwidth written for analog channels.
pub const BANDWIDTH_WIDE: &str = "Wide";

/// Naming and channel settings for one run.
#[derive(Debug, Clone)]
pub struct SynthOptions {
    pub zone_pattern: String,
    pub group_list_pattern: String,
    pub channel_pattern: String,
    /// Power level written to every generated channel.
    pub power: String,
    pub namer: Namer,
    /// Skip DMR repeaters that end up with no talkgroups.
    pub talkgroups_required: bool,
}

/// Counts of what a run added to the document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub zones: usize,
    pub group_lists: usize,
    pub contacts: usize,
    pub channels: usize,
    pub skipped: usize,
}

/// Appends synthesized entities to a document.
pub struct Synthesizer<'a> {
    doc: &'a mut Document,
    options: &'a SynthOptions,
    summary: Summary,
}

impl<'a> Synthesizer<'a> {
    pub fn new(doc: &'a mut Document, options: &'a SynthOptions) -> Self {
        Self {
            doc,
            options,
            summary: Summary::default(),
        }
    }

    pub fn summary(&self) -> Summary {
        self.summary
    }

    /// Adds one DMR repeater.
    ///
    /// `alternate` is a second talkgroup list for the same repeater (from the
    /// network it is linked to); it is used instead of the record's own list
    /// when it is strictly longer. Returns false if the record was skipped.
    pub fn add_dmr_repeater<R: DmrRepeater>(&mut self, record: &R, alternate: &[TalkGroup]) -> bool {
        let Some(rx) = parse_mhz(record, "frequency", record.frequency()) else {
            return self.skip();
        };
        let Some(offset) = parse_mhz(record, "offset", record.offset()) else {
            return self.skip();
        };
        let tx = rx + offset;

        let talkgroups = if alternate.len() > record.talkgroups().len() {
            debug!(
                "{}: using {} network talkgroups instead of {} listed",
                record.callsign(),
                alternate.len(),
                record.talkgroups().len()
            );
            alternate
        } else {
            record.talkgroups()
        };
        if talkgroups.is_empty() && self.options.talkgroups_required {
            warn!(
                "Skipping repeater {} {} without talkgroups",
                record.callsign(),
                record.frequency()
            );
            return self.skip();
        }

        let repeater: &dyn Repeater = record;
        let options = self.options;
        let namer = &options.namer;

        let zone_id = self.doc.next_zone_id();
        let zone_name = namer.name(&options.zone_pattern, Some(repeater), None);
        self.doc.zones.push(Zone::new(zone_id, zone_name));
        let zone_idx = self.doc.zones.len() - 1;
        self.summary.zones += 1;

        let mut group_lists = [0usize; 2];
        for (slot, idx) in (1u8..=2).zip(group_lists.iter_mut()) {
            let id = self.doc.next_group_list_id();
            let name = namer.name(
                &options.group_list_pattern,
                Some(repeater),
                Some(&TalkGroup::slot_only(slot)),
            );
            self.doc.group_lists.push(GroupList::new(id, name));
            *idx = self.doc.group_lists.len() - 1;
            self.summary.group_lists += 1;
        }

        for listed in talkgroups {
            if listed.time_slot != 1 && listed.time_slot != 2 {
                warn!(
                    "Skipping talkgroup {} on {}: invalid timeslot {}",
                    listed.number,
                    record.callsign(),
                    listed.time_slot
                );
                continue;
            }
            let contact = self.contact_for(listed);
            let tg = TalkGroup {
                name: contact.name.clone(),
                ..listed.clone()
            };

            let gl_idx = group_lists[usize::from(tg.time_slot - 1)];
            let group_list = &mut self.doc.group_lists[gl_idx];
            group_list.contacts.push(contact.id.clone());
            let group_list_id = group_list.id.clone();

            let channel = DigitalChannel {
                id: self.doc.next_channel_id(),
                name: namer.name(&options.channel_pattern, Some(repeater), Some(&tg)),
                rx_frequency: format_mhz(rx),
                tx_frequency: format_mhz(tx),
                rx_only: false,
                admit: ADMIT_ALWAYS.to_string(),
                color_code: record.color_code(),
                time_slot: format!("TS{}", tg.time_slot),
                radio_id: Defaultable::Default,
                group_list: group_list_id,
                contact: contact.id,
                power: Defaultable::Value(options.power.clone()),
                timeout: Defaultable::Default,
                vox: Defaultable::Default,
                extra: Default::default(),
            };
            let channel_id = channel.id.clone();
            self.doc.channels.push(Channel::digital(channel));
            self.doc.zones[zone_idx].a.push(channel_id);
            self.summary.channels += 1;
        }
        true
    }

    /// Returns the DMR contact for a talkgroup, creating it if the document
    /// has none with that number.
    fn contact_for(&mut self, tg: &TalkGroup) -> DmrContact {
        if let Some(existing) = self.doc.find_dmr_contact(tg.number) {
            return existing.clone();
        }
        let contact = DmrContact::group_call(self.doc.next_contact_id(), tg.name.clone(), tg.number);
        self.doc.contacts.push(Contact::dmr(contact.clone()));
        self.summary.contacts += 1;
        contact
    }

    /// Adds a run's FM repeaters to one new shared zone.
    pub fn add_analog_repeaters<R: AnalogRepeater>(&mut self, records: &[R]) {
        let zone_id = self.doc.next_zone_id();
        // the analog zone name is literal text, not a pattern
        let zone_name = self.options.namer.cap(&self.options.zone_pattern);
        self.doc.zones.push(Zone::new(zone_id, zone_name));
        let zone_idx = self.doc.zones.len() - 1;
        self.summary.zones += 1;

        for record in records {
            match self.analog_channel(record) {
                Some(channel) => {
                    let channel_id = channel.id.clone();
                    self.doc.channels.push(Channel::analog(channel));
                    self.doc.zones[zone_idx].a.push(channel_id);
                    self.summary.channels += 1;
                }
                None => {
                    self.skip();
                }
            }
        }
    }

    fn analog_channel<R: AnalogRepeater>(&self, record: &R) -> Option<AnalogChannel> {
        let rx = parse_mhz(record, "frequency", record.frequency())?;
        let tx = parse_mhz(record, "input frequency", record.input_frequency())?;
        let rx_tone = parse_tone(record, "TSQ", record.downlink_tone())?;
        let tx_tone = parse_tone(record, "PL", record.uplink_tone())?;
        let repeater: &dyn Repeater = record;
        Some(AnalogChannel {
            id: self.doc.next_channel_id(),
            name: self
                .options
                .namer
                .name(&self.options.channel_pattern, Some(repeater), None),
            rx_frequency: format_mhz(rx),
            tx_frequency: format_mhz(tx),
            rx_only: false,
            admit: ADMIT_ALWAYS.to_string(),
            bandwidth: BANDWIDTH_WIDE.to_string(),
            power: Defaultable::Value(self.options.power.clone()),
            timeout: Defaultable::Default,
            vox: Defaultable::Default,
            rx_tone,
            tx_tone,
            squelch: Defaultable::Default,
            extra: Default::default(),
        })
    }

    fn skip(&mut self) -> bool {
        self.summary.skipped += 1;
        false
    }
}

impl Summary {
    pub fn log(&self) {
        info!(
            "Added {} zones, {} group lists, {} contacts, {} channels; skipped {} records",
            self.zones, self.group_lists, self.contacts, self.channels, self.skipped
        );
    }
}

fn parse_mhz(record: &dyn Repeater, what: &str, text: &str) -> Option<f64> {
    match text.trim().parse::<f64>() {
        Ok(mhz) => Some(mhz),
        Err(e) => {
            warn!(
                "Skipping repeater {} with bad {} '{}': {}",
                record.callsign(),
                what,
                text,
                e
            );
            None
        }
    }
}

/// `Some(None)` is a valid empty tone, `None` a malformed one.
fn parse_tone(record: &dyn Repeater, what: &str, text: &str) -> Option<Option<Tone>> {
    match Tone::parse(text.trim()) {
        Ok(tone) => Some(tone),
        Err(e) => {
            warn!("Skipping repeater {} with bad {}: {}", record.callsign(), what, e);
            None
        }
    }
}

fn format_mhz(mhz: f64) -> String {
    format!("{:.6} MHz", mhz)
}
