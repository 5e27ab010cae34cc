use super::{ConvertError, Filter, flatten_root, normalize_key};
use crate::formats::{Parsed, Parser};
use std::collections::BTreeMap;
use std::io::{Read, Write};

pub(super) const LOG_TARGET: &str = "   convert";

/// The line emitted when filtering leaves nothing behind
pub const NO_MATCH_LINE: &str = "# No keys matched the filter patterns";

/// Turns one configuration document into sorted `KEY=value` lines.
///
/// A converter holds only its configuration, so `convert` can be called any number of times.
/// Filter patterns are normalized with the dunder count in effect, and are re-normalized when the
/// count changes.
#[derive(Debug)]
pub struct Converter<'a> {
    parser: &'a dyn Parser,
    dunder: usize,
    include: Vec<String>,
    exclude: Vec<String>,
    filter: Option<Filter>,
}

impl<'a> Converter<'a> {
    #[must_use]
    pub fn new(parser: &'a dyn Parser) -> Self {
        Self {
            parser,
            dunder: 0,
            include: Vec::new(),
            exclude: Vec::new(),
            filter: None,
        }
    }

    /// Set how many underscores to strip from every run of underscores in a key
    pub fn set_dunder(&mut self, dunder: usize) -> Result<(), ConvertError> {
        self.dunder = dunder;
        self.filter = Filter::new(&self.include, &self.exclude, dunder)?;
        Ok(())
    }

    /// Restrict output to keys matching `include` (when non-empty) and not matching `exclude`.
    ///
    /// Blank patterns are ignored; if none remain, filtering is turned off.
    pub fn set_filter_patterns<S: AsRef<str>>(&mut self, include: &[S], exclude: &[S]) -> Result<(), ConvertError> {
        let filter = Filter::new(include, exclude, self.dunder)?;
        self.include = include.iter().map(|p| p.as_ref().to_string()).collect();
        self.exclude = exclude.iter().map(|p| p.as_ref().to_string()).collect();
        self.filter = filter;
        Ok(())
    }

    #[must_use]
    pub const fn dunder(&self) -> usize {
        self.dunder
    }

    #[must_use]
    pub const fn filter(&self) -> Option<&Filter> {
        self.filter.as_ref()
    }

    #[must_use]
    pub fn parser(&self) -> &'a dyn Parser {
        self.parser
    }

    /// Read a whole document from `input` and write its environment form to `output`.
    ///
    /// Nothing is written unless the document was parsed successfully. Returns the number of
    /// variables written.
    pub fn convert(&self, mut input: impl Read, mut output: impl Write) -> Result<usize, ConvertError> {
        let env = self.environment(&mut input)?;
        let rendered = self.render(&env);

        output.write_all(rendered.as_bytes()).map_err(ConvertError::Write)?;
        output.flush().map_err(ConvertError::Write)?;

        log::info!(target: LOG_TARGET, "Wrote {} variable(s)", env.len());
        Ok(env.len())
    }

    /// Parse, flatten, normalize, and filter a document into its final environment mapping
    pub fn environment(&self, input: &mut dyn Read) -> Result<BTreeMap<String, String>, ConvertError> {
        let flat = match self.parser.parse(input)? {
            Parsed::Flat(flat) => flat,
            Parsed::Tree(root) => flatten_root(&root),
        };
        log::debug!(target: LOG_TARGET, "Parsed {} entries using the '{}' format", flat.len(), self.parser.name());

        let mut env = self.normalize(flat);
        if let Some(filter) = &self.filter {
            env.retain(|key, _| {
                let keep = filter.should_include(key);
                if !keep {
                    log::trace!(target: LOG_TARGET, "Filtered out '{key}'");
                }
                keep
            });
        }

        Ok(env)
    }

    /// Normalize every key, merging entries that end up with the same name.
    ///
    /// Entries are visited in raw key order, so among colliding keys the one that sorts last wins.
    /// Entries whose key normalizes to nothing cannot be expressed as variables and are dropped.
    #[must_use]
    pub fn normalize(&self, flat: BTreeMap<String, String>) -> BTreeMap<String, String> {
        let mut env = BTreeMap::new();
        let mut origins: BTreeMap<String, String> = BTreeMap::new();

        for (raw, value) in flat {
            let key = normalize_key(&raw, self.dunder);
            if key.is_empty() {
                log::warn!(target: LOG_TARGET, "Skipping value '{value}' because its key '{raw}' is empty once normalized");
                continue;
            }

            if let Some(previous) = origins.insert(key.clone(), raw.clone()) {
                log::debug!(target: LOG_TARGET, "Keys '{previous}' and '{raw}' both normalize to '{key}', keeping the value of '{raw}'");
            }
            let _ = env.insert(key, value);
        }

        env
    }

    fn render(&self, env: &BTreeMap<String, String>) -> String {
        if env.is_empty() && self.filter.is_some() {
            return format!("{NO_MATCH_LINE}\n");
        }

        let mut out = String::with_capacity(env.iter().map(|(k, v)| k.len() + v.len() + 2).sum());
        for (key, value) in env {
            out.push_str(key);
            out.push('=');
            out.push_str(value);
            out.push('\n');
        }
        out
    }
}
