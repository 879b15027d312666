//! # Record Filters
//!
//! Filters narrow which directory records reach the synthesizer. A filter
//! clause has the form `key=value1,value2,...` and is satisfied when the
//! record's `key` attribute equals one of the values exactly.
//!
//! Each data source splits the filters into a [`QueryPlan`]:
//!
//! - keys the directory understands are sent upstream as query parameters;
//! - keys naming an attribute of the record type (see [`Filterable`]) are
//!   evaluated locally on the decoded records;
//! - everything else is ignored.
//!
//! Attribute lookup goes through a static table of accessors per record type,
//! [`Filterable::FIELDS`].

use std::fmt;
use std::str::FromStr;

use log::debug;

use crate::error::{Error, Result};

/// One `key=value[,value...]` clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub key: String,
    /// Never empty.
    pub values: Vec<String>,
}

impl Filter {
    pub fn new(key: impl Into<String>, values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            key: key.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// True if `value` equals one of the filter's values (case-sensitive).
    pub fn accepts(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }
}

impl FromStr for Filter {
    type Err = Error;

    fn from_str(clause: &str) -> Result<Self> {
        let invalid = |message: &str| Error::InvalidFilter {
            clause: clause.to_string(),
            message: message.to_string(),
        };
        let (key, raw) = clause.split_once('=').ok_or_else(|| invalid("missing '='"))?;
        if key.is_empty() {
            return Err(invalid("empty key"));
        }
        if !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(invalid("key must only contain letters, digits and '_'"));
        }
        let values: Vec<String> = raw
            .split(',')
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect();
        if values.is_empty() {
            return Err(invalid("no values"));
        }
        Ok(Self {
            key: key.to_string(),
            values,
        })
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.values.join(","))
    }
}

/// A named attribute of a record type.
pub struct Field<R> {
    /// Attribute name as it appears on the wire.
    pub name: &'static str,
    pub get: fn(&R) -> String,
}

impl<R> fmt::Debug for Field<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field").field("name", &self.name).finish()
    }
}

/// Record types whose attributes can be filtered on.
pub trait Filterable: Sized + 'static {
    const FIELDS: &'static [Field<Self>];

    /// Looks up an attribute. Case is ignored, `_` and space are the same.
    fn field(key: &str) -> Option<&'static Field<Self>> {
        let wanted = normalize_key(key);
        Self::FIELDS.iter().find(|f| normalize_key(f.name) == wanted)
    }
}

fn normalize_key(key: &str) -> String {
    key.chars()
        .map(|c| if c == '_' { ' ' } else { c.to_ascii_lowercase() })
        .collect()
}

/// How a directory treats a query parameter given more than once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultiValue {
    /// Repeated parameters are OR-ed upstream.
    Repeated,
    /// Only one value per parameter is honored; multi-valued filters are
    /// evaluated locally instead.
    SingleOnly,
}

/// A filter evaluated on decoded records.
#[derive(Debug)]
pub struct PostFilter<R: 'static> {
    field: &'static Field<R>,
    filter: Filter,
}

impl<R: 'static> PostFilter<R> {
    pub fn matches(&self, record: &R) -> bool {
        self.filter.accepts(&(self.field.get)(record))
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }
}

/// The filters of one query, split between upstream and local evaluation.
#[derive(Debug)]
pub struct QueryPlan<R: 'static> {
    /// Query parameters in filter order.
    pub params: Vec<(String, String)>,
    pub post: Vec<PostFilter<R>>,
}

impl<R: Filterable> QueryPlan<R> {
    /// Splits `filters` given the directory's parameter allow-list.
    pub fn new(filters: &[Filter], upstream: &[&str], policy: MultiValue) -> Self {
        let mut params = Vec::new();
        let mut post = Vec::new();
        for filter in filters {
            let param = upstream
                .iter()
                .find(|name| name.eq_ignore_ascii_case(&filter.key));
            let forward = match policy {
                MultiValue::Repeated => true,
                MultiValue::SingleOnly => filter.values.len() == 1,
            };
            match (param, forward) {
                (Some(name), true) => {
                    params.extend(filter.values.iter().map(|v| (name.to_string(), v.clone())));
                }
                _ => match R::field(&filter.key) {
                    Some(field) => post.push(PostFilter {
                        field,
                        filter: filter.clone(),
                    }),
                    None => debug!("Ignoring filter '{}': not a parameter or attribute", filter),
                },
            }
        }
        Self { params, post }
    }

    /// True if `record` satisfies every local filter.
    pub fn matches(&self, record: &R) -> bool {
        self.post.iter().all(|f| f.matches(record))
    }

    /// Keeps the records that satisfy every local filter.
    pub fn apply(&self, records: Vec<R>) -> Vec<R> {
        records.into_iter().filter(|r| self.matches(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row {
        state: String,
        status: String,
    }

    impl Filterable for Row {
        const FIELDS: &'static [Field<Self>] = &[
            Field {
                name: "State",
                get: |r| r.state.clone(),
            },
            Field {
                name: "Operational Status",
                get: |r| r.status.clone(),
            },
        ];
    }

    fn row(state: &str) -> Row {
        Row {
            state: state.to_string(),
            status: "On-air".to_string(),
        }
    }

    #[test]
    fn test_parse_clause() {
        let f: Filter = "state=Maine,Vermont".parse().unwrap();
        assert_eq!(f, Filter::new("state", ["Maine", "Vermont"]));
        assert_eq!(f.to_string(), "state=Maine,Vermont");
    }

    #[test]
    fn test_parse_drops_empty_segments() {
        let f: Filter = "city=,Bangor,,Orono,".parse().unwrap();
        assert_eq!(f.values, vec!["Bangor", "Orono"]);
    }

    #[test]
    fn test_parse_keeps_value_whitespace() {
        let f: Filter = "city=Presque Isle".parse().unwrap();
        assert_eq!(f.values, vec!["Presque Isle"]);
    }

    #[test]
    fn test_parse_errors() {
        for clause in ["state", "=Maine", "state=", "state=,,", "st-ate=Maine"] {
            let err = clause.parse::<Filter>().unwrap_err();
            assert!(
                matches!(err, Error::InvalidFilter { .. }),
                "{} should be rejected",
                clause
            );
        }
    }

    #[test]
    fn test_accepts_is_exact() {
        let f = Filter::new("state", ["Maine", "Vermont"]);
        assert!(f.accepts("Maine"));
        assert!(f.accepts("Vermont"));
        assert!(!f.accepts("maine"));
        assert!(!f.accepts("Maine "));
    }

    #[test]
    fn test_field_lookup_normalizes() {
        assert!(Row::field("state").is_some());
        assert!(Row::field("operational_status").is_some());
        assert!(Row::field("OPERATIONAL STATUS").is_some());
        assert!(Row::field("county").is_none());
    }

    #[test]
    fn test_plan_repeated_params() {
        let filters = vec![
            Filter::new("state", ["Maine", "Vermont"]),
            Filter::new("operational_status", ["On-air"]),
            Filter::new("color", ["blue"]),
        ];
        let plan = QueryPlan::<Row>::new(&filters, &["state", "city"], MultiValue::Repeated);
        assert_eq!(
            plan.params,
            vec![
                ("state".to_string(), "Maine".to_string()),
                ("state".to_string(), "Vermont".to_string())
            ]
        );
        assert_eq!(plan.post.len(), 1);
        assert_eq!(plan.post[0].filter().key, "operational_status");
    }

    #[test]
    fn test_plan_single_only_moves_multi_values_local() {
        let filters = vec![
            Filter::new("state", ["Maine", "Vermont"]),
            Filter::new("city", ["Bangor"]),
        ];
        let plan = QueryPlan::<Row>::new(&filters, &["state", "city"], MultiValue::SingleOnly);
        assert_eq!(plan.params, vec![("city".to_string(), "Bangor".to_string())]);
        assert_eq!(plan.post.len(), 1);

        let kept = plan.apply(vec![row("Maine"), row("maine"), row("Vermont"), row("Maine ")]);
        let states: Vec<_> = kept.iter().map(|r| r.state.as_str()).collect();
        assert_eq!(states, vec!["Maine", "Vermont"]);
    }

    #[test]
    fn test_all_post_filters_must_match() {
        let filters = vec![
            Filter::new("State", ["Maine"]),
            Filter::new("operational_status", ["Off-air"]),
        ];
        let plan = QueryPlan::<Row>::new(&filters, &[], MultiValue::Repeated);
        assert!(!plan.matches(&row("Maine")));
    }

    #[test]
    fn test_ignored_filter_logs_at_debug() {
        testing_logger::setup();
        let filters = vec![Filter::new("color", ["blue"])];
        let plan = QueryPlan::<Row>::new(&filters, &[], MultiValue::Repeated);
        assert!(plan.params.is_empty());
        assert!(plan.post.is_empty());
        testing_logger::validate(|logs| {
            assert_eq!(logs.len(), 1);
            assert_eq!(logs[0].level, log::Level::Debug);
            assert!(logs[0].body.contains("color=blue"));
        });
    }
}
