//! Order-preserving access to the fields of a YAML mapping.
//!
//! Every codeplug entity keeps the mapping it was decoded from. Known keys are
//! read out of it (their slot stays where it was), and on encode the known
//! values are written back into the same slots. Keys the entity does not
//! model, and their order, survive the round trip untouched.
//!
//! A decoded entity only writes back modeled keys that were in its source
//! mapping or now hold a non-default value, so re-encoding an untouched entity
//! adds no keys. Entities built in memory have no source and write every key.
//!
//! `serde(flatten)` is not used for this: flattened fields are buffered
//! through serde's generic content type, which cannot hold YAML tags such as
//! `!default`.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_yaml::{Mapping, Value};

/// Entities backed by a YAML mapping.
pub(crate) trait MappedEntity: Sized {
    /// Reads the known keys out of `fields`; the rest stays in `fields`.
    fn read(fields: &mut Fields) -> Result<Self, serde_yaml::Error>;

    /// Writes the known keys into `fields`.
    fn write(&self, fields: &mut Fields) -> Result<(), serde_yaml::Error>;

    /// The unmodeled remainder of the source mapping.
    fn extra(&self) -> &Mapping;

    /// Stores the unmodeled remainder after `read`.
    fn set_extra(&mut self, extra: Mapping);
}

/// A YAML mapping being read from or written to.
#[derive(Debug, Default)]
pub(crate) struct Fields {
    map: Mapping,
    /// Write every modeled key, defaults included.
    complete: bool,
}

impl Fields {
    pub fn new(map: Mapping) -> Self {
        Self {
            map,
            complete: false,
        }
    }

    pub fn into_mapping(self) -> Mapping {
        self.map
    }

    /// Takes the value for `key`, leaving `Null` in its slot.
    ///
    /// A missing key and an explicit `null` both yield `None`.
    pub fn take<T: DeserializeOwned>(&mut self, key: &str) -> Result<Option<T>, serde_yaml::Error> {
        match self.take_raw(key) {
            Some(value) => serde_yaml::from_value(value).map(Some),
            None => Ok(None),
        }
    }

    /// Like [`Fields::take`], with `T::default()` for missing keys.
    pub fn take_or_default<T: DeserializeOwned + Default>(
        &mut self,
        key: &str,
    ) -> Result<T, serde_yaml::Error> {
        Ok(self.take(key)?.unwrap_or_default())
    }

    /// Takes the raw value for `key`, leaving `Null` in its slot.
    pub fn take_raw(&mut self, key: &str) -> Option<Value> {
        let slot = self.map.get_mut(key)?;
        match std::mem::take(slot) {
            Value::Null => None,
            value => Some(value),
        }
    }

    /// Puts a raw value back into its slot, e.g. one the entity could not model.
    pub fn restore(&mut self, key: &str, value: Value) {
        self.map.insert(Value::String(key.to_string()), value);
    }

    /// Writes `value` under `key`. Existing keys keep their position, new keys
    /// are appended.
    pub fn put<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), serde_yaml::Error> {
        let value = serde_yaml::to_value(value)?;
        self.put_value(key, value);
        Ok(())
    }

    pub fn put_value(&mut self, key: &str, value: Value) {
        self.map.insert(Value::String(key.to_string()), value);
    }

    /// Writes a modeled field, skipping a default value whose key the source
    /// mapping did not have.
    pub fn put_field<T: Serialize + Default + PartialEq>(
        &mut self,
        key: &str,
        value: &T,
    ) -> Result<(), serde_yaml::Error> {
        if self.complete || self.map.contains_key(key) || *value != T::default() {
            self.put(key, value)?;
        }
        Ok(())
    }
}

pub(crate) fn decode<E: MappedEntity>(map: Mapping) -> Result<E, serde_yaml::Error> {
    let mut fields = Fields::new(map);
    let mut entity = E::read(&mut fields)?;
    entity.set_extra(fields.into_mapping());
    Ok(entity)
}

pub(crate) fn encode<E: MappedEntity>(entity: &E) -> Result<Mapping, serde_yaml::Error> {
    let extra = entity.extra().clone();
    // no source mapping: built in memory
    let complete = extra.is_empty();
    let mut fields = Fields { map: extra, complete };
    entity.write(&mut fields)?;
    Ok(fields.into_mapping())
}

/// Implements `Serialize` and `Deserialize` for a [`MappedEntity`].
macro_rules! mapped_serde {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl serde::Serialize for $ty {
                fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                    let map = $crate::codeplug::fields::encode(self)
                        .map_err(<S::Error as serde::ser::Error>::custom)?;
                    serde::Serialize::serialize(&map, serializer)
                }
            }

            impl<'de> serde::Deserialize<'de> for $ty {
                fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                    let map = <serde_yaml::Mapping as serde::Deserialize>::deserialize(deserializer)?;
                    $crate::codeplug::fields::decode(map)
                        .map_err(<D::Error as serde::de::Error>::custom)
                }
            }
        )+
    };
}

pub(crate) use mapped_serde;
