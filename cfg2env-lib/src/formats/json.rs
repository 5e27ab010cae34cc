use super::{Parsed, Parser, read_text};
use crate::convert::{ParseError, RawValue};
use serde_json::{Number, Value};
use std::io::Read;

const NAME: &str = "json";

/// JSON documents
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonParser;

impl JsonParser {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Parser for JsonParser {
    fn name(&self) -> &'static str {
        NAME
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["json"]
    }

    fn parse(&self, input: &mut dyn Read) -> Result<Parsed, ParseError> {
        let Some(text) = read_text(NAME, input)? else {
            return Ok(Parsed::empty());
        };

        let value: Value = serde_json::from_str(&text).map_err(|e| ParseError::malformed(NAME, e))?;
        Ok(match value {
            Value::Null => Parsed::empty(),
            value => Parsed::Tree(value.into()),
        })
    }
}

impl From<Value> for RawValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => from_number(&n),
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::Sequence(items.into_iter().map(Into::into).collect()),
            Value::Object(map) => Self::Mapping(map.into_iter().map(|(k, v)| (k, v.into())).collect()),
        }
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
