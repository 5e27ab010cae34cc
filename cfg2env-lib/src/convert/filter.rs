use super::{ConvertError, normalize_key};
use regex::Regex;

/// A compiled glob pattern.
///
/// `*` matches any run of characters (including none), `?` matches exactly one character, and
/// everything else matches itself. Matching is case-sensitive; keys and patterns are both
/// uppercased before they meet.
#[derive(Debug, Clone)]
pub struct Glob {
    pattern: String,
    regex: Regex,
}

impl Glob {
    pub fn new(pattern: impl Into<String>) -> Result<Self, ConvertError> {
        let pattern = pattern.into();

        let mut expr = String::with_capacity(pattern.len() + 8);
        expr.push_str("(?s)^");
        let mut literal = String::new();
        for c in pattern.chars() {
            match c {
                '*' | '?' => {
                    expr.push_str(&regex::escape(&literal));
                    literal.clear();
                    expr.push_str(if c == '*' { ".*" } else { "." });
                }
                _ => literal.push(c),
            }
        }
        expr.push_str(&regex::escape(&literal));
        expr.push('$');

        match Regex::new(&expr) {
            Ok(regex) => Ok(Self { pattern, regex }),
            Err(source) => Err(ConvertError::InvalidPattern { pattern, source }),
        }
    }

    #[must_use]
    pub fn is_match(&self, key: &str) -> bool {
        self.regex.is_match(key)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.pattern
    }
}

/// Decide whether a normalized key survives the include and exclude lists.
///
/// A non-empty include list acts as a whitelist; the exclude list is consulted afterwards and
/// always wins.
#[must_use]
pub fn should_include(key: &str, include: &[Glob], exclude: &[Glob]) -> bool {
    if !include.is_empty() && !include.iter().any(|glob| glob.is_match(key)) {
        return false;
    }

    !exclude.iter().any(|glob| glob.is_match(key))
}

/// Include/exclude filtering applied to normalized keys
#[derive(Debug, Clone)]
pub struct Filter {
    include: Vec<Glob>,
    exclude: Vec<Glob>,
}

impl Filter {
    /// Build a filter from raw user patterns.
    ///
    /// Each pattern is trimmed, then normalized exactly like keys are. Blank patterns are dropped.
    /// Returns `None` when nothing is left to filter with.
    pub fn new<S: AsRef<str>>(include: &[S], exclude: &[S], dunder: usize) -> Result<Option<Self>, ConvertError> {
        let include = normalize_patterns(include, dunder)?;
        let exclude = normalize_patterns(exclude, dunder)?;

        if include.is_empty() && exclude.is_empty() {
            return Ok(None);
        }

        Ok(Some(Self { include, exclude }))
    }

    #[must_use]
    pub fn should_include(&self, key: &str) -> bool {
        should_include(key, &self.include, &self.exclude)
    }

    #[must_use]
    pub fn include(&self) -> &[Glob] {
        &self.include
    }

    #[must_use]
    pub fn exclude(&self) -> &[Glob] {
        &self.exclude
    }
}

fn normalize_patterns<S: AsRef<str>>(patterns: &[S], dunder: usize) -> Result<Vec<Glob>, ConvertError> {
    patterns
        .iter()
        .map(|p| p.as_ref().trim())
        .filter(|p| !p.is_empty())
        .map(|p| Glob::new(normalize_key(p, dunder)))
        .collect()
}

/// Split a comma-separated pattern list
#[must_use]
pub fn split_patterns(list: &str) -> Vec<String> {
    list.split(',').map(str::to_string).collect()
}
