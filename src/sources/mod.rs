//! # Directory Data Sources
//!
//! Adapters for the external repeater directories and their helpers:
//!
//! - [`radioid`]: DMR repeaters and their talkgroups from RadioID.
//! - [`repeaterbook`]: analog (and DMR) repeaters from RepeaterBook.
//! - [`geonames`]: place-name lookup for proximity searches.
//! - [`brandmeister`]: live talkgroup assignments for Brandmeister repeaters.
//!
//! Every adapter takes a [`Fetch`](crate::http::Fetch) so it can be driven
//! by canned responses in tests.

pub mod brandmeister;
pub mod geonames;
pub mod radioid;
pub mod repeaterbook;

/// Deserializers for directory fields whose JSON type is not stable
/// (numbers sent as strings and vice versa, `null` for empty).
pub(crate) mod lenient {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    fn to_text(value: Value) -> String {
        match value {
            Value::Null => String::new(),
            Value::String(s) => s,
            other => other.to_string(),
        }
    }

    /// Any scalar as text; `null` is empty.
    pub fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(to_text(Value::deserialize(deserializer)?))
    }

    /// An unsigned number given as a number or numeric text; `null` and empty
    /// text are zero.
    pub fn number<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: TryFrom<u64> + Default,
    {
        let text = to_text(Value::deserialize(deserializer)?);
        let text = text.trim();
        if text.is_empty() {
            return Ok(T::default());
        }
        let n: u64 = text
            .parse()
            .map_err(|_| D::Error::custom(format!("expected a number, got '{}'", text)))?;
        T::try_from(n).map_err(|_| D::Error::custom(format!("number {} out of range", n)))
    }

    /// A list that may be `null`.
    pub fn list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
    }

    #[cfg(test)]
    mod tests {
        use serde::Deserialize;

        #[derive(Debug, Deserialize)]
        struct Row {
            #[serde(default, deserialize_with = "super::string")]
            text: String,
            #[serde(default, deserialize_with = "super::number")]
            id: u32,
            #[serde(default, deserialize_with = "super::list")]
            items: Vec<u8>,
        }

        #[test]
        fn test_accepts_mixed_types() {
            let row: Row = serde_json::from_str(r#"{"text": 12.5, "id": "310198", "items": null}"#).unwrap();
            assert_eq!(row.text, "12.5");
            assert_eq!(row.id, 310198);
            assert!(row.items.is_empty());

            let row: Row = serde_json::from_str(r#"{"text": null, "id": "", "items": [1]}"#).unwrap();
            assert_eq!(row.text, "");
            assert_eq!(row.id, 0);
            assert_eq!(row.items, vec![1]);

            let row: Row = serde_json::from_str("{}").unwrap();
            assert_eq!(row.id, 0);
        }

        #[test]
        fn test_rejects_bad_numbers() {
            assert!(serde_json::from_str::<Row>(r#"{"id": "abc"}"#).is_err());
            assert!(serde_json::from_str::<Row>(r#"{"id": 99999999999}"#).is_err());
        }
    }
}
