//! Capabilities of directory records as seen by the synthesizer.
//!
//! Data sources decode their own wire shapes; the synthesizer and the pattern
//! interpolator only see these traits.

use std::fmt;

/// Any repeater listing.
pub trait Repeater {
    fn callsign(&self) -> &str;
    fn city(&self) -> &str;
    fn state(&self) -> &str;
    /// Output (receive) frequency in MHz, as listed.
    fn frequency(&self) -> &str;
}

/// A DMR repeater listing.
pub trait DmrRepeater: Repeater {
    /// Numeric repeater ID assigned by the directory.
    fn repeater_id(&self) -> u32;
    /// Transmit offset in MHz, as listed (e.g. `-0.600`).
    fn offset(&self) -> &str;
    fn color_code(&self) -> u8;
    /// The network the repeater is linked to, free text.
    fn network(&self) -> &str;
    fn talkgroups(&self) -> &[TalkGroup];
}

/// An analog FM repeater listing.
pub trait AnalogRepeater: Repeater {
    /// Input (transmit) frequency in MHz, as listed.
    fn input_frequency(&self) -> &str;
    /// Uplink access tone (PL), empty if none.
    fn uplink_tone(&self) -> &str;
    /// Downlink squelch tone (TSQ), empty if none.
    fn downlink_tone(&self) -> &str;
}

/// A talkgroup carried by a DMR repeater on one timeslot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TalkGroup {
    pub number: u32,
    /// Valid values are 1 and 2; anything else is skipped during synthesis.
    pub time_slot: u8,
    pub name: String,
}

impl TalkGroup {
    pub fn new(number: u32, time_slot: u8, name: impl Into<String>) -> Self {
        Self {
            number,
            time_slot,
            name: name.into(),
        }
    }

    /// A talkgroup that only carries a timeslot, for naming group lists.
    pub fn slot_only(time_slot: u8) -> Self {
        Self {
            time_slot,
            ..Default::default()
        }
    }
}

impl fmt::Display for TalkGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TS{} {} {}", self.time_slot, self.number, self.name)
    }
}
