//! Input formats
//!
//! Each supported encoding is a [`Parser`] that consumes a whole input stream and hands back
//! either a tree for the flattener or a mapping that is already flat. Parsers are looked up by
//! name or extension through a [`Registry`] built by the caller.
//!
//! Parsers that accept a user-supplied query (currently only SQLite) expose it through the
//! [`CustomQuery`] capability, which callers probe for with [`Parser::custom_query`].

mod json;
mod registry;
mod sqlite;
mod yaml;

pub use json::JsonParser;
pub use registry::{DEFAULT_FORMAT, Registry};
pub use sqlite::{DEFAULT_QUERY, SqliteParser};
pub use yaml::YamlParser;

use crate::convert::{ParseError, RawValue};
use core::fmt::Debug;
use std::collections::BTreeMap;
use std::io::{self, Read};

/// What a parser produced
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed {
    /// Keys and values ready for normalization
    Flat(BTreeMap<String, String>),

    /// A document that still needs flattening
    Tree(RawValue),
}

impl Parsed {
    #[must_use]
    pub const fn empty() -> Self {
        Self::Flat(BTreeMap::new())
    }
}

/// A configuration format
pub trait Parser: Debug {
    /// Canonical format identifier
    fn name(&self) -> &'static str;

    /// Alternate identifiers, typically file extensions
    fn extensions(&self) -> &'static [&'static str];

    fn can_handle(&self, format: &str) -> bool {
        format == self.name() || self.extensions().contains(&format)
    }

    /// Consume all of `input`. Empty input yields an empty result rather than an error.
    fn parse(&self, input: &mut dyn Read) -> Result<Parsed, ParseError>;

    /// The custom query capability, for parsers that have one
    fn custom_query(&mut self) -> Option<&mut dyn CustomQuery> {
        None
    }
}

/// Capability for parsers whose extraction can be customized with a query
pub trait CustomQuery {
    /// Replace the query. An empty query leaves the current one in place.
    fn set_query(&mut self, query: &str);

    fn query(&self) -> &str;
}

/// Read the whole input as text, treating blank input as absent
fn read_text(format: &'static str, input: &mut dyn Read) -> Result<Option<String>, ParseError> {
    let mut text = String::new();
    match input.read_to_string(&mut text) {
        Ok(_) => Ok((!text.trim().is_empty()).then_some(text)),
        Err(e) if e.kind() == io::ErrorKind::InvalidData => Err(ParseError::malformed(format, e)),
        Err(e) => Err(ParseError::Read(e)),
    }
}
