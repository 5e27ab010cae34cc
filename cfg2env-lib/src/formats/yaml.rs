use super::{Parsed, Parser, read_text};
use crate::convert::{ParseError, RawValue};
use serde::Deserialize;
use serde_yaml::{Deserializer, Number, Value};
use std::io::Read;

const NAME: &str = "yaml";

/// YAML documents. Only the first document of a multi-document stream is converted.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlParser;

impl YamlParser {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Parser for YamlParser {
    fn name(&self) -> &'static str {
        NAME
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["yml", "yaml"]
    }

    fn parse(&self, input: &mut dyn Read) -> Result<Parsed, ParseError> {
        let Some(text) = read_text(NAME, input)? else {
            return Ok(Parsed::empty());
        };

        let Some(document) = Deserializer::from_str(&text).next() else {
            return Ok(Parsed::empty());
        };

        let mut value = Value::deserialize(document).map_err(|e| ParseError::malformed(NAME, e))?;
        value.apply_merge().map_err(|e| ParseError::malformed(NAME, e))?;

        match value {
            Value::Null => Ok(Parsed::empty()),
            value => Ok(Parsed::Tree(value.try_into()?)),
        }
    }
}

impl TryFrom<Value> for RawValue {
    type Error = ParseError;

    fn try_from(value: Value) -> Result<Self, ParseError> {
        Ok(match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => from_number(&n),
            Value::String(s) => Self::String(s),
            Value::Sequence(items) => Self::Sequence(items.into_iter().map(Self::try_from).collect::<Result<_, _>>()?),
            Value::Mapping(map) => Self::Mapping(
                map.into_iter()
                    .map(|(k, v)| Ok((key_to_string(k)?, Self::try_from(v)?)))
                    .collect::<Result<_, ParseError>>()?,
            ),
            Value::Tagged(tagged) => Self::try_from(tagged.value)?,
        })
    }
}

fn from_number(n: &Number) -> RawValue {
    if let Some(i) = n.as_i64() {
        RawValue::Integer(i)
    } else if n.is_u64() {
        RawValue::Opaque(n.to_string())
    } else {
        n.as_f64().map_or_else(|| RawValue::Opaque(n.to_string()), RawValue::Float)
    }
}

/// Mapping keys may be any scalar in YAML; they are rendered the same way values are.
fn key_to_string(key: Value) -> Result<String, ParseError> {
    match RawValue::try_from(key)? {
        scalar if scalar.is_scalar() => Ok(scalar.stringify()),
        other => Err(ParseError::UnsupportedKey {
            format: NAME,
            key: other.to_string(),
        }),
    }
}
