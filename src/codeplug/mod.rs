//! # Codeplug Document
//!
//! The in-memory form of a QDMR YAML codeplug. Only the four collections the
//! synthesizer touches are modeled (`contacts`, `groupLists`, `channels`,
//! `zones`); every other top-level key, and every unmodeled key inside an
//! entity, is carried through unchanged and in its original order.
//!
//! ## Example
//!
//! ```
//! use dmrfill::codeplug::Document;
//!
//! let doc = Document::from_yaml_str("version: 0.12.0\nzones:\n  - id: zone3\n    name: Home\n    A: []\n").unwrap();
//! assert_eq!(doc.zones.len(), 1);
//! assert_eq!(doc.next_zone_id(), "zone4");
//! ```

mod defaultable;
mod entities;
mod fields;

use std::collections::HashMap;
use std::io::{Read, Write};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_yaml::{Mapping, Value};

use crate::error::{Error, Result};
use crate::ids::next_id;

pub use defaultable::Defaultable;
pub use entities::{
    AnalogChannel, Channel, ChannelKind, Contact, DigitalChannel, DmrContact, GroupList, HasId,
    Tone, ToneParseError, Zone, ADMIT_ALWAYS, GROUP_CALL,
};

const CONTACTS: &str = "contacts";
const GROUP_LISTS: &str = "groupLists";
const CHANNELS: &str = "channels";
const ZONES: &str = "zones";

/// Default ID prefixes for new entities in an empty collection.
pub const ZONE_PREFIX: &str = "zone";
pub const GROUP_LIST_PREFIX: &str = "grp";
pub const CONTACT_PREFIX: &str = "cont";
pub const CHANNEL_PREFIX: &str = "ch";

/// A codeplug: the modeled collections plus everything else, verbatim.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub contacts: Vec<Contact>,
    pub group_lists: Vec<GroupList>,
    pub channels: Vec<Channel>,
    pub zones: Vec<Zone>,
    rest: Mapping,
}

impl Document {
    /// Decodes a codeplug. Blank input yields an empty document.
    pub fn from_yaml_str(input: &str) -> Result<Self> {
        if input.trim().is_empty() {
            return Ok(Self::default());
        }
        let root: Value = serde_yaml::from_str(input).map_err(|e| Error::CodeplugParse {
            message: e.to_string(),
        })?;
        let mut rest = match root {
            Value::Mapping(map) => map,
            Value::Null => Mapping::new(),
            _ => {
                return Err(Error::CodeplugParse {
                    message: "top level must be a mapping".to_string(),
                })
            }
        };
        Ok(Self {
            contacts: take_collection(&mut rest, CONTACTS)?,
            group_lists: take_collection(&mut rest, GROUP_LISTS)?,
            channels: take_collection(&mut rest, CHANNELS)?,
            zones: take_collection(&mut rest, ZONES)?,
            rest,
        })
    }

    pub fn from_reader(mut reader: impl Read) -> Result<Self> {
        let mut input = String::new();
        reader.read_to_string(&mut input)?;
        Self::from_yaml_str(&input)
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        let mut root = self.rest.clone();
        put_collection(&mut root, CONTACTS, &self.contacts)?;
        put_collection(&mut root, GROUP_LISTS, &self.group_lists)?;
        put_collection(&mut root, CHANNELS, &self.channels)?;
        put_collection(&mut root, ZONES, &self.zones)?;
        Ok(serde_yaml::to_string(&root)?)
    }

    pub fn write_to(&self, mut writer: impl Write) -> Result<()> {
        writer.write_all(self.to_yaml_string()?.as_bytes())?;
        writer.flush()?;
        Ok(())
    }

    pub fn next_zone_id(&self) -> String {
        next_id(self.zones.iter().map(HasId::id), ZONE_PREFIX)
    }

    pub fn next_group_list_id(&self) -> String {
        next_id(self.group_lists.iter().map(HasId::id), GROUP_LIST_PREFIX)
    }

    pub fn next_contact_id(&self) -> String {
        next_id(self.contacts.iter().map(HasId::id), CONTACT_PREFIX)
    }

    pub fn next_channel_id(&self) -> String {
        next_id(self.channels.iter().map(HasId::id), CHANNEL_PREFIX)
    }

    /// Finds the DMR contact for a talkgroup number anywhere in the document.
    pub fn find_dmr_contact(&self, number: u32) -> Option<&DmrContact> {
        self.contacts
            .iter()
            .filter_map(|c| c.dmr.as_ref())
            .find(|dmr| !dmr.id.is_empty() && dmr.number == number)
    }

    /// Channel names keyed by channel ID.
    pub fn channel_names(&self) -> HashMap<&str, &str> {
        self.channels.iter().map(|ch| (ch.id(), ch.name())).collect()
    }

    pub fn contact(&self, id: &str) -> Option<&Contact> {
        self.contacts.iter().find(|c| c.id() == id)
    }

    pub fn channel(&self, id: &str) -> Option<&Channel> {
        self.channels.iter().find(|c| c.id() == id)
    }

    pub fn group_list(&self, id: &str) -> Option<&GroupList> {
        self.group_lists.iter().find(|g| g.id == id)
    }
}

fn take_collection<T: DeserializeOwned>(root: &mut Mapping, key: &str) -> Result<Vec<T>> {
    let Some(slot) = root.get_mut(key) else {
        return Ok(Vec::new());
    };
    match std::mem::take(slot) {
        Value::Null => Ok(Vec::new()),
        value => serde_yaml::from_value(value).map_err(|e| Error::CodeplugParse {
            message: format!("{}: {}", key, e),
        }),
    }
}

fn put_collection<T: Serialize>(root: &mut Mapping, key: &str, items: &[T]) -> Result<()> {
    root.insert(Value::String(key.to_string()), serde_yaml::to_value(items)?);
    Ok(())
}
