//! Scalars that are either an explicit value or the radio's default.
//!
//! QDMR marks "use the device default" with the local tag `!default` on an
//! empty scalar (written as `!<!default> ""` by QDMR itself). This is distinct
//! from an absent key or a zero value, so it gets its own type and its own
//! encoding rule at the document boundary.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_yaml::value::{Tag, TaggedValue};
use serde_yaml::Value;

const DEFAULT_TAG: &str = "!default";

/// A value that is either the device default or explicitly set.
#[derive(Debug, Clone, PartialEq)]
pub enum Defaultable<T> {
    /// Encoded as `!default ''`.
    Default,
    Value(T),
}

impl<T> Default for Defaultable<T> {
    fn default() -> Self {
        Defaultable::Default
    }
}

impl<T> Defaultable<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Defaultable::Default => None,
            Defaultable::Value(v) => Some(v),
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, Defaultable::Default)
    }
}

impl<T: Serialize> Defaultable<T> {
    /// Encodes the value as a YAML node.
    pub fn to_value(&self) -> Result<Value, serde_yaml::Error> {
        match self {
            Defaultable::Default => Ok(Value::Tagged(Box::new(TaggedValue {
                tag: Tag::new(DEFAULT_TAG),
                value: Value::String(String::new()),
            }))),
            Defaultable::Value(v) => serde_yaml::to_value(v),
        }
    }
}

impl<T: DeserializeOwned> Defaultable<T> {
    /// Decodes a YAML node. Any node tagged `!default` is the default,
    /// whatever its content.
    pub fn from_value(value: Value) -> Result<Self, serde_yaml::Error> {
        match value {
            Value::Tagged(tagged) if tagged.tag == DEFAULT_TAG => Ok(Defaultable::Default),
            other => serde_yaml::from_value(other).map(Defaultable::Value),
        }
    }
}

impl<T: Serialize> Serialize for Defaultable<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value()
            .map_err(<S::Error as serde::ser::Error>::custom)?
            .serialize(serializer)
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Defaultable<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Defaultable::from_value(value).map_err(<D::Error as serde::de::Error>::custom)
    }
}
