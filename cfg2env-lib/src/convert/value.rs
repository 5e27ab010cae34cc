use core::fmt::{Display, Formatter, Result as FmtResult};

/// A decoded configuration node.
///
/// Format parsers produce these trees and the flattener consumes them. Mapping keys are always
/// strings: parsers coerce non-string keys before handing a tree over.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),

    /// A decoder-specific value with no native variant, carried as its textual form
    Opaque(String),

    Sequence(Vec<Self>),

    /// Entries in decoder order
    Mapping(Vec<(String, Self)>),
}

impl RawValue {
    /// Build a mapping node from key/value pairs
    #[must_use]
    pub fn mapping<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Self)>,
    {
        Self::Mapping(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Whether this node is a leaf
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        !matches!(self, Self::Sequence(_) | Self::Mapping(_))
    }

    /// Produce the canonical environment-variable text for this value.
    ///
    /// Strings pass through untouched, null becomes the empty string, and floats with no fractional
    /// part render as integers. Containers never reach this through the flattener, but they still
    /// get a readable rendering rather than a failure.
    #[must_use]
    pub fn stringify(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::String(s) | Self::Opaque(s) => s.clone(),
            _ => self.to_string(),
        }
    }
}

impl Display for RawValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(x) => write_float(*x, f),
            Self::String(s) | Self::Opaque(s) => f.write_str(s),
            Self::Sequence(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Mapping(entries) => {
                f.write_str("map[")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{key}:{value}")?;
                }
                f.write_str("]")
            }
        }
    }
}

// `Display` for f64 already emits the shortest round-tripping form without an exponent, and
// drops the decimal point for integral values. Only negative zero needs help.
fn write_float(x: f64, f: &mut Formatter<'_>) -> FmtResult {
    if x == 0.0 {
        f.write_str("0")
    } else {
        write!(f, "{x}")
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for RawValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for RawValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<f64> for RawValue {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl<T: Into<Self>> From<Vec<T>> for RawValue {
    fn from(items: Vec<T>) -> Self {
        Self::Sequence(items.into_iter().map(Into::into).collect())
    }
}
