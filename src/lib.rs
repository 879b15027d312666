//! # dmrfill
//!
//! This library fills a radio codeplug (the YAML export of the qdmr
//! programming software) with repeaters from public directories. It is
//! designed to be used by the `dmrfill` command-line tool but can also be
//! used on its own.
//!
//! ## Quick Example
//!
//! ```
//! use dmrfill::codeplug::Document;
//! use dmrfill::ids::next_id;
//!
//! let doc = Document::from_yaml_str(
//!     "zones:\n  - id: zone3\n    name: Home\n    A: []\nsettings:\n  introLine1: N1ADJ\n",
//! )
//! .unwrap();
//! assert_eq!(doc.next_zone_id(), "zone4");
//! assert_eq!(next_id(Vec::<&str>::new(), "ch"), "ch1");
//!
//! // Sections the library does not model are written back unchanged.
//! assert!(doc.to_yaml_string().unwrap().contains("introLine1: N1ADJ"));
//! ```
//!
//! ## Core Concepts
//!
//! - **Codeplug (`codeplug`)**: The document model. Zones, group lists,
//!   contacts and channels are typed; every other field and section passes
//!   through untouched.
//! - **Records (`record`)**: The capabilities the engine needs from a
//!   directory listing, implemented by each data source.
//! - **Patterns (`pattern`)**: `$name` / `$name:N` templates for entity names.
//! - **Filters (`filter`)**: `key=value,...` clauses split between directory
//!   query parameters and local evaluation.
//! - **Synthesis (`synth`, `finalize`)**: Appends the generated entities and
//!   orders the result.
//! - **Sources (`sources`, `http`, `cache`)**: RadioID, RepeaterBook,
//!   GeoNames and Brandmeister access over HTTP, with an on-disk response
//!   cache.
//!
//! ## Execution Flow
//!
//! The main entry point is [`pipeline::run`], which takes a validated
//! [`config::FillConfig`], a [`http::Fetch`] implementation and the decoded
//! document, and returns a summary of what it added.

pub mod cache;
pub mod codeplug;
pub mod config;
pub mod error;
pub mod filter;
pub mod finalize;
pub mod http;
pub mod ids;
pub mod pattern;
pub mod pipeline;
pub mod record;
pub mod sources;
pub mod suggestions;
pub mod synth;

#[cfg(test)]
mod pattern_proptest;
