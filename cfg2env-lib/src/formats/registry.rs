use super::{JsonParser, Parser, SqliteParser, YamlParser};
use crate::convert::ConvertError;
use std::collections::BTreeMap;

/// Format picked when the caller does not ask for one
pub const DEFAULT_FORMAT: &str = "yaml";

/// The set of formats available to a conversion, indexed by name and extension
#[derive(Debug, Default)]
pub struct Registry {
    parsers: Vec<Box<dyn Parser>>,
    by_id: BTreeMap<String, usize>,
    default: Option<usize>,
}

impl Registry {
    /// An empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in YAML, JSON, and SQLite parsers
    #[must_use]
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(YamlParser::new()));
        registry.register(Box::new(JsonParser::new()));
        registry.register(Box::new(SqliteParser::new()));
        registry
    }

    /// Add a parser under its name and every extension.
    ///
    /// Identifiers already claimed by an earlier parser are taken over by this one. The first
    /// parser able to handle [`DEFAULT_FORMAT`] becomes the default.
    pub fn register(&mut self, parser: Box<dyn Parser>) {
        let index = self.parsers.len();

        for id in core::iter::once(parser.name()).chain(parser.extensions().iter().copied()) {
            let _ = self.by_id.insert(id.to_ascii_lowercase(), index);
        }

        if self.default.is_none() && parser.can_handle(DEFAULT_FORMAT) {
            self.default = Some(index);
        }

        self.parsers.push(parser);
    }

    /// Find the parser for `format`, or the default parser when `format` is empty
    pub fn get(&self, format: &str) -> Result<&dyn Parser, ConvertError> {
        let index = self.resolve(format)?;
        Ok(self.parsers[index].as_ref())
    }

    /// Mutable access, used to configure capabilities such as custom queries
    pub fn get_mut(&mut self, format: &str) -> Result<&mut (dyn Parser + 'static), ConvertError> {
        let index = self.resolve(format)?;
        Ok(self.parsers[index].as_mut())
    }

    /// Whether `format` names a registered parser
    #[must_use]
    pub fn contains(&self, format: &str) -> bool {
        self.by_id.contains_key(&format.to_ascii_lowercase())
    }

    /// The default parser, if any
    #[must_use]
    pub fn default_parser(&self) -> Option<&dyn Parser> {
        self.default.map(|index| self.parsers[index].as_ref())
    }

    /// Registered parsers in registration order
    pub fn parsers(&self) -> impl Iterator<Item = &(dyn Parser + 'static)> {
        self.parsers.iter().map(AsRef::as_ref)
    }

    fn resolve(&self, format: &str) -> Result<usize, ConvertError> {
        if format.is_empty() {
            return self.default.ok_or(ConvertError::NoDefaultFormat);
        }

        self.by_id
            .get(&format.to_ascii_lowercase())
            .copied()
            .ok_or_else(|| ConvertError::UnsupportedFormat(format.to_string()))
    }
}
