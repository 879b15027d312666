//! Codeplug entities: zones, group lists, contacts and channels.
//!
//! Each entity models the fields the synthesizer reads or writes and keeps
//! everything else from its source mapping in `extra`.

use serde_yaml::{Mapping, Value};

use super::defaultable::Defaultable;
use super::fields::{mapped_serde, Fields, MappedEntity};

/// Anything stored in a codeplug collection under a unique ID.
pub trait HasId {
    fn id(&self) -> &str;
}

/// Looks up `key` in the first mapping value of `extra`, for entity variants
/// that are only carried through (e.g. `dtmf` contacts, `m17` channels).
fn passthrough_str<'a>(extra: &'a Mapping, key: &str) -> &'a str {
    extra
        .values()
        .filter_map(Value::as_mapping)
        .find_map(|m| m.get(key).and_then(Value::as_str))
        .unwrap_or_default()
}

/// A named group of channels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Zone {
    pub id: String,
    pub name: String,
    /// Channel IDs of the zone's A list.
    pub a: Vec<String>,
    pub extra: Mapping,
}

impl Zone {
    pub fn new(id: String, name: String) -> Self {
        Self {
            id,
            name,
            ..Default::default()
        }
    }
}

impl HasId for Zone {
    fn id(&self) -> &str {
        &self.id
    }
}

impl MappedEntity for Zone {
    fn read(fields: &mut Fields) -> Result<Self, serde_yaml::Error> {
        Ok(Self {
            id: fields.take_or_default("id")?,
            name: fields.take_or_default("name")?,
            a: fields.take_or_default("A")?,
            extra: Mapping::new(),
        })
    }

    fn write(&self, fields: &mut Fields) -> Result<(), serde_yaml::Error> {
        fields.put_field("id", &self.id)?;
        fields.put_field("name", &self.name)?;
        fields.put_field("A", &self.a)
    }

    fn extra(&self) -> &Mapping {
        &self.extra
    }

    fn set_extra(&mut self, extra: Mapping) {
        self.extra = extra;
    }
}

/// The set of talkgroup contacts a digital channel receives.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupList {
    pub id: String,
    pub name: String,
    pub contacts: Vec<String>,
    pub extra: Mapping,
}

impl GroupList {
    pub fn new(id: String, name: String) -> Self {
        Self {
            id,
            name,
            ..Default::default()
        }
    }
}

impl HasId for GroupList {
    fn id(&self) -> &str {
        &self.id
    }
}

impl MappedEntity for GroupList {
    fn read(fields: &mut Fields) -> Result<Self, serde_yaml::Error> {
        Ok(Self {
            id: fields.take_or_default("id")?,
            name: fields.take_or_default("name")?,
            contacts: fields.take_or_default("contacts")?,
            extra: Mapping::new(),
        })
    }

    fn write(&self, fields: &mut Fields) -> Result<(), serde_yaml::Error> {
        fields.put_field("id", &self.id)?;
        fields.put_field("name", &self.name)?;
        fields.put_field("contacts", &self.contacts)
    }

    fn extra(&self) -> &Mapping {
        &self.extra
    }

    fn set_extra(&mut self, extra: Mapping) {
        self.extra = extra;
    }
}

/// Call type written for talkgroup contacts.
pub const GROUP_CALL: &str = "GroupCall";

/// A DMR contact.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DmrContact {
    pub id: String,
    pub name: String,
    pub ring: bool,
    pub call_type: String,
    pub number: u32,
    pub extra: Mapping,
}

impl DmrContact {
    pub fn group_call(id: String, name: String, number: u32) -> Self {
        Self {
            id,
            name,
            ring: false,
            call_type: GROUP_CALL.to_string(),
            number,
            extra: Mapping::new(),
        }
    }
}

impl MappedEntity for DmrContact {
    fn read(fields: &mut Fields) -> Result<Self, serde_yaml::Error> {
        Ok(Self {
            id: fields.take_or_default("id")?,
            name: fields.take_or_default("name")?,
            ring: fields.take_or_default("ring")?,
            call_type: fields.take_or_default("type")?,
            number: fields.take_or_default("number")?,
            extra: Mapping::new(),
        })
    }

    fn write(&self, fields: &mut Fields) -> Result<(), serde_yaml::Error> {
        fields.put_field("id", &self.id)?;
        fields.put_field("name", &self.name)?;
        fields.put_field("ring", &self.ring)?;
        fields.put_field("type", &self.call_type)?;
        fields.put_field("number", &self.number)
    }

    fn extra(&self) -> &Mapping {
        &self.extra
    }

    fn set_extra(&mut self, extra: Mapping) {
        self.extra = extra;
    }
}

/// An entry of the codeplug's contact list.
///
/// Only DMR contacts are modeled; other kinds (DTMF, ...) pass through in
/// `extra`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Contact {
    pub dmr: Option<DmrContact>,
    pub extra: Mapping,
}

impl Contact {
    pub fn dmr(contact: DmrContact) -> Self {
        Self {
            dmr: Some(contact),
            extra: Mapping::new(),
        }
    }

    pub fn name(&self) -> &str {
        match &self.dmr {
            Some(dmr) => &dmr.name,
            None => passthrough_str(&self.extra, "name"),
        }
    }
}

impl HasId for Contact {
    fn id(&self) -> &str {
        match &self.dmr {
            Some(dmr) => &dmr.id,
            None => passthrough_str(&self.extra, "id"),
        }
    }
}

impl MappedEntity for Contact {
    fn read(fields: &mut Fields) -> Result<Self, serde_yaml::Error> {
        Ok(Self {
            dmr: fields.take("dmr")?,
            extra: Mapping::new(),
        })
    }

    fn write(&self, fields: &mut Fields) -> Result<(), serde_yaml::Error> {
        if let Some(dmr) = &self.dmr {
            fields.put("dmr", dmr)?;
        }
        Ok(())
    }

    fn extra(&self) -> &Mapping {
        &self.extra
    }

    fn set_extra(&mut self, extra: Mapping) {
        self.extra = extra;
    }
}

/// Channel admit criterion written for generated channels.
pub const ADMIT_ALWAYS: &str = "Always";

/// A digital (DMR) channel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DigitalChannel {
    pub id: String,
    pub name: String,
    pub rx_frequency: String,
    pub tx_frequency: String,
    pub rx_only: bool,
    pub admit: String,
    pub color_code: u8,
    /// `TS1` or `TS2`.
    pub time_slot: String,
    /// Radio ID reference, carried as-is.
    pub radio_id: Defaultable<Value>,
    pub group_list: String,
    pub contact: String,
    pub power: Defaultable<String>,
    pub timeout: Defaultable<u32>,
    pub vox: Defaultable<u32>,
    pub extra: Mapping,
}

impl MappedEntity for DigitalChannel {
    fn read(fields: &mut Fields) -> Result<Self, serde_yaml::Error> {
        Ok(Self {
            id: fields.take_or_default("id")?,
            name: fields.take_or_default("name")?,
            rx_frequency: fields.take_or_default("rxFrequency")?,
            tx_frequency: fields.take_or_default("txFrequency")?,
            rx_only: fields.take_or_default("rxOnly")?,
            admit: fields.take_or_default("admit")?,
            color_code: fields.take_or_default("colorCode")?,
            time_slot: fields.take_or_default("timeSlot")?,
            radio_id: fields.take_or_default("radioId")?,
            group_list: fields.take_or_default("groupList")?,
            contact: fields.take_or_default("contact")?,
            power: fields.take_or_default("power")?,
            timeout: fields.take_or_default("timeout")?,
            vox: fields.take_or_default("vox")?,
            extra: Mapping::new(),
        })
    }

    fn write(&self, fields: &mut Fields) -> Result<(), serde_yaml::Error> {
        fields.put_field("id", &self.id)?;
        fields.put_field("name", &self.name)?;
        fields.put_field("rxFrequency", &self.rx_frequency)?;
        fields.put_field("txFrequency", &self.tx_frequency)?;
        fields.put_field("rxOnly", &self.rx_only)?;
        fields.put_field("admit", &self.admit)?;
        fields.put_field("colorCode", &self.color_code)?;
        fields.put_field("timeSlot", &self.time_slot)?;
        fields.put_field("radioId", &self.radio_id)?;
        fields.put_field("groupList", &self.group_list)?;
        fields.put_field("contact", &self.contact)?;
        fields.put_field("power", &self.power)?;
        fields.put_field("timeout", &self.timeout)?;
        fields.put_field("vox", &self.vox)?;
        Ok(())
    }

    fn extra(&self) -> &Mapping {
        &self.extra
    }

    fn set_extra(&mut self, extra: Mapping) {
        self.extra = extra;
    }
}

/// A sub-audible squelch tone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tone {
    /// Continuous tone, in Hz.
    Ctcss(f64),
    /// Digital code.
    Dcs(u16),
}

/// A tone specification that is neither empty, `D<code>` nor a frequency.
#[derive(Debug, Clone, PartialEq)]
pub struct ToneParseError(pub String);

impl std::fmt::Display for ToneParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid tone '{}'", self.0)
    }
}

impl std::error::Error for ToneParseError {}

impl Tone {
    /// Parses a directory tone field: empty is no tone, a leading `D` selects
    /// a DCS code, anything else must be a CTCSS frequency.
    pub fn parse(spec: &str) -> Result<Option<Tone>, ToneParseError> {
        if spec.is_empty() {
            return Ok(None);
        }
        let tone = match spec.strip_prefix('D') {
            Some(code) => code.parse().map(Tone::Dcs).ok(),
            None => spec.parse().map(Tone::Ctcss).ok(),
        };
        tone.map(Some).ok_or_else(|| ToneParseError(spec.to_string()))
    }

    fn to_value(self) -> Value {
        let (key, value) = match self {
            Tone::Ctcss(hz) => ("ctcss", Value::from(hz)),
            Tone::Dcs(code) => ("dcs", Value::from(code)),
        };
        let mut map = Mapping::new();
        map.insert(Value::from(key), value);
        Value::Mapping(map)
    }

    fn from_value(value: &Value) -> Option<Tone> {
        let map = value.as_mapping()?;
        if let Some(hz) = map.get("ctcss").and_then(Value::as_f64) {
            return Some(Tone::Ctcss(hz));
        }
        map.get("dcs")
            .and_then(Value::as_u64)
            .and_then(|code| u16::try_from(code).ok())
            .map(Tone::Dcs)
    }
}

fn take_tone(fields: &mut Fields, key: &str) -> Option<Tone> {
    let raw = fields.take_raw(key)?;
    let tone = Tone::from_value(&raw);
    if tone.is_none() {
        fields.restore(key, raw);
    }
    tone
}

/// An analog (FM) channel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalogChannel {
    pub id: String,
    pub name: String,
    pub rx_frequency: String,
    pub tx_frequency: String,
    pub rx_only: bool,
    pub admit: String,
    pub bandwidth: String,
    pub power: Defaultable<String>,
    pub timeout: Defaultable<u32>,
    pub vox: Defaultable<u32>,
    pub rx_tone: Option<Tone>,
    pub tx_tone: Option<Tone>,
    pub squelch: Defaultable<u32>,
    pub extra: Mapping,
}

impl MappedEntity for AnalogChannel {
    fn read(fields: &mut Fields) -> Result<Self, serde_yaml::Error> {
        Ok(Self {
            id: fields.take_or_default("id")?,
            name: fields.take_or_default("name")?,
            rx_frequency: fields.take_or_default("rxFrequency")?,
            tx_frequency: fields.take_or_default("txFrequency")?,
            rx_only: fields.take_or_default("rxOnly")?,
            admit: fields.take_or_default("admit")?,
            bandwidth: fields.take_or_default("bandwidth")?,
            power: fields.take_or_default("power")?,
            timeout: fields.take_or_default("timeout")?,
            vox: fields.take_or_default("vox")?,
            rx_tone: take_tone(fields, "rxTone"),
            tx_tone: take_tone(fields, "txTone"),
            squelch: fields.take_or_default("squelch")?,
            extra: Mapping::new(),
        })
    }

    fn write(&self, fields: &mut Fields) -> Result<(), serde_yaml::Error> {
        fields.put_field("id", &self.id)?;
        fields.put_field("name", &self.name)?;
        fields.put_field("rxFrequency", &self.rx_frequency)?;
        fields.put_field("txFrequency", &self.tx_frequency)?;
        fields.put_field("rxOnly", &self.rx_only)?;
        fields.put_field("admit", &self.admit)?;
        fields.put_field("bandwidth", &self.bandwidth)?;
        fields.put_field("power", &self.power)?;
        fields.put_field("timeout", &self.timeout)?;
        fields.put_field("vox", &self.vox)?;
        if let Some(tone) = self.rx_tone {
            fields.put_value("rxTone", tone.to_value());
        }
        if let Some(tone) = self.tx_tone {
            fields.put_value("txTone", tone.to_value());
        }
        fields.put_field("squelch", &self.squelch)?;
        Ok(())
    }

    fn extra(&self) -> &Mapping {
        &self.extra
    }

    fn set_extra(&mut self, extra: Mapping) {
        self.extra = extra;
    }
}

/// The variant payload of a channel.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelKind {
    Digital(DigitalChannel),
    Analog(AnalogChannel),
    /// A channel type this crate does not model; it lives in `Channel::extra`.
    Other,
}

/// An entry of the codeplug's channel list.
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    pub kind: ChannelKind,
    pub extra: Mapping,
}

impl Channel {
    pub fn digital(channel: DigitalChannel) -> Self {
        Self {
            kind: ChannelKind::Digital(channel),
            extra: Mapping::new(),
        }
    }

    pub fn analog(channel: AnalogChannel) -> Self {
        Self {
            kind: ChannelKind::Analog(channel),
            extra: Mapping::new(),
        }
    }

    pub fn name(&self) -> &str {
        match &self.kind {
            ChannelKind::Digital(ch) => &ch.name,
            ChannelKind::Analog(ch) => &ch.name,
            ChannelKind::Other => passthrough_str(&self.extra, "name"),
        }
    }

    pub fn as_digital(&self) -> Option<&DigitalChannel> {
        match &self.kind {
            ChannelKind::Digital(ch) => Some(ch),
            _ => None,
        }
    }

    pub fn as_analog(&self) -> Option<&AnalogChannel> {
        match &self.kind {
            ChannelKind::Analog(ch) => Some(ch),
            _ => None,
        }
    }
}

impl HasId for Channel {
    fn id(&self) -> &str {
        match &self.kind {
            ChannelKind::Digital(ch) => &ch.id,
            ChannelKind::Analog(ch) => &ch.id,
            ChannelKind::Other => passthrough_str(&self.extra, "id"),
        }
    }
}

impl MappedEntity for Channel {
    fn read(fields: &mut Fields) -> Result<Self, serde_yaml::Error> {
        let kind = if let Some(digital) = fields.take("digital")? {
            ChannelKind::Digital(digital)
        } else if let Some(analog) = fields.take("analog")? {
            ChannelKind::Analog(analog)
        } else {
            ChannelKind::Other
        };
        Ok(Self {
            kind,
            extra: Mapping::new(),
        })
    }

    fn write(&self, fields: &mut Fields) -> Result<(), serde_yaml::Error> {
        match &self.kind {
            ChannelKind::Digital(ch) => fields.put("digital", ch),
            ChannelKind::Analog(ch) => fields.put("analog", ch),
            ChannelKind::Other => Ok(()),
        }
    }

    fn extra(&self) -> &Mapping {
        &self.extra
    }

    fn set_extra(&mut self, extra: Mapping) {
        self.extra = extra;
    }
}

mapped_serde!(
    Zone,
    GroupList,
    DmrContact,
    Contact,
    DigitalChannel,
    AnalogChannel,
    Channel
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_round_trip_keeps_unknown_keys() {
        let yaml = "id: zone1\nname: Home\nA: [ch1, ch2]\nB: [ch3]\nanytone:\n  hidden: true\n";
        let zone: Zone = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(zone.a, vec!["ch1", "ch2"]);

        let out = serde_yaml::to_value(&zone).unwrap();
        let original: Value = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(out, original);
    }

    #[test]
    fn test_zone_without_lists() {
        let zone: Zone = serde_yaml::from_str("id: zone2\nname: Empty\n").unwrap();
        assert!(zone.a.is_empty());
    }

    #[test]
    fn test_digital_channel_defaults_round_trip() {
        let yaml = r#"
digital:
  id: ch4
  name: NE 3172
  rxFrequency: 145.180000 MHz
  txFrequency: 144.580000 MHz
  rxOnly: false
  admit: Always
  colorCode: 12
  timeSlot: TS1
  radioId: !<!default> ""
  groupList: grp1
  contact: cont2
  power: High
  timeout: !<!default> ""
  vox: !<!default> ""
  anytone:
    talkaround: false
"#;
        let channel: Channel = serde_yaml::from_str(yaml).unwrap();
        let digital = channel.as_digital().unwrap();
        assert_eq!(channel.id(), "ch4");
        assert_eq!(digital.color_code, 12);
        assert!(digital.radio_id.is_default());
        assert_eq!(digital.power, Defaultable::Value("High".to_string()));
        assert!(digital.timeout.is_default());

        let out = serde_yaml::to_string(&channel).unwrap();
        assert!(out.contains("timeout: !default"));
        assert!(out.contains("talkaround: false"));
        let again: Channel = serde_yaml::from_str(&out).unwrap();
        assert_eq!(again, channel);
    }

    #[test]
    fn test_sparse_entities_gain_no_keys() {
        let yaml = "digital:\n  id: ch2\n  name: Sparse\n  groupList: grp1\n  contact: cont1\n";
        let channel: Channel = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            serde_yaml::to_value(&channel).unwrap(),
            serde_yaml::from_str::<Value>(yaml).unwrap()
        );

        let yaml = "dmr:\n  id: cont1\n  name: Worldwide\n  number: 91\n";
        let contact: Contact = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            serde_yaml::to_value(&contact).unwrap(),
            serde_yaml::from_str::<Value>(yaml).unwrap()
        );

        let zone: Zone = serde_yaml::from_str("id: zone2\nname: Empty\n").unwrap();
        let out = serde_yaml::to_string(&zone).unwrap();
        assert!(!out.contains("A:"));
    }

    #[test]
    fn test_changed_and_new_entities_write_modeled_keys() {
        let mut zone: Zone = serde_yaml::from_str("id: zone2\nname: Empty\n").unwrap();
        zone.a.push("ch1".to_string());
        assert!(serde_yaml::to_string(&zone).unwrap().contains("A:"));

        let fresh = Zone::new("zone3".to_string(), "New".to_string());
        assert!(serde_yaml::to_string(&fresh).unwrap().contains("A: []"));

        let contact = DmrContact::group_call("cont2".to_string(), "Northeast".to_string(), 3172);
        assert!(serde_yaml::to_string(&contact).unwrap().contains("ring: false"));
    }

    #[test]
    fn test_analog_channel_tones() {
        let yaml = r#"
analog:
  id: ch9
  name: W1XYZ Bangor
  rxFrequency: 146.940000 MHz
  txFrequency: 146.340000 MHz
  bandwidth: Wide
  rxTone: {dcs: 23}
  txTone: {ctcss: 100.0}
"#;
        let channel: Channel = serde_yaml::from_str(yaml).unwrap();
        let analog = channel.as_analog().unwrap();
        assert_eq!(analog.rx_tone, Some(Tone::Dcs(23)));
        assert_eq!(analog.tx_tone, Some(Tone::Ctcss(100.0)));
        assert!(analog.squelch.is_default());
    }

    #[test]
    fn test_unmodeled_tone_passes_through() {
        let yaml = "analog:\n  id: ch1\n  name: X\n  rxTone: !<!default> \"\"\n";
        let channel: Channel = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(channel.as_analog().unwrap().rx_tone, None);
        let out = serde_yaml::to_string(&channel).unwrap();
        assert!(out.contains("rxTone: !default"));
    }

    #[test]
    fn test_unknown_channel_kind_passes_through() {
        let yaml = "m17:\n  id: ch7\n  name: M17 Link\n";
        let channel: Channel = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(channel.kind, ChannelKind::Other);
        assert_eq!(channel.id(), "ch7");
        assert_eq!(channel.name(), "M17 Link");
        let out = serde_yaml::to_value(&channel).unwrap();
        assert_eq!(out, serde_yaml::from_str::<Value>(yaml).unwrap());
    }

    #[test]
    fn test_dtmf_contact_passes_through() {
        let yaml = "dtmf:\n  id: cont9\n  name: Autopatch\n  number: '*123'\n";
        let contact: Contact = serde_yaml::from_str(yaml).unwrap();
        assert!(contact.dmr.is_none());
        assert_eq!(contact.id(), "cont9");
        assert_eq!(contact.name(), "Autopatch");
    }

    #[test]
    fn test_tone_parse() {
        assert_eq!(Tone::parse(""), Ok(None));
        assert_eq!(Tone::parse("100.0"), Ok(Some(Tone::Ctcss(100.0))));
        assert_eq!(Tone::parse("D023"), Ok(Some(Tone::Dcs(23))));
        assert!(Tone::parse("CSQ").is_err());
        assert!(Tone::parse("D023N").is_err());
    }
}
