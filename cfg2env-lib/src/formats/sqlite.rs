use super::{CustomQuery, Parsed, Parser};
use crate::convert::{ParseError, RawValue};
use rusqlite::types::Value;
use rusqlite::{Connection, OpenFlags};
use std::collections::BTreeMap;
use std::io::{self, Read, Write};

const NAME: &str = "sqlite";
const LOG_TARGET: &str = "    sqlite";

/// Query used when none has been configured
pub const DEFAULT_QUERY: &str = "SELECT key, value FROM config";

/// SQLite database files.
///
/// The input stream must be a complete database image. The first two columns of every row
/// returned by the query become a key and a value. Keys are uppercased, and two rows whose keys
/// differ only in case are rejected rather than silently merged.
#[derive(Debug, Clone)]
pub struct SqliteParser {
    query: String,
}

impl SqliteParser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            query: DEFAULT_QUERY.to_string(),
        }
    }

    fn read_rows(&self, conn: &Connection) -> rusqlite::Result<Vec<(Value, Value)>> {
        let mut stmt = conn.prepare(&self.query)?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, Value>(0)?, row.get::<_, Value>(1)?)))?;
        rows.collect()
    }
}

impl Default for SqliteParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for SqliteParser {
    fn name(&self) -> &'static str {
        NAME
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["db", "sqlite", "sqlite3"]
    }

    fn parse(&self, input: &mut dyn Read) -> Result<Parsed, ParseError> {
        // SQLite needs a real file, so spool the stream into one first
        let mut file = tempfile::Builder::new().prefix("cfg2env-").suffix(".db").tempfile()?;
        let size = io::copy(input, &mut file)?;
        if size == 0 {
            return Ok(Parsed::empty());
        }
        file.flush()?;

        log::debug!(target: LOG_TARGET, "Spooled {size} bytes to '{}'", file.path().display());

        let conn = Connection::open_with_flags(file.path(), OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX)
            .map_err(|e| ParseError::malformed(NAME, e))?;
        let rows = self.read_rows(&conn).map_err(|e| ParseError::malformed(NAME, e))?;
        log::debug!(target: LOG_TARGET, "Query returned {} row(s)", rows.len());

        let mut env = BTreeMap::new();
        for (key, value) in rows {
            let key = stringify(key).to_uppercase();
            if env.insert(key.clone(), stringify(value)).is_some() {
                return Err(ParseError::DuplicateKey { format: NAME, key });
            }
        }

        Ok(Parsed::Flat(env))
    }

    fn custom_query(&mut self) -> Option<&mut dyn CustomQuery> {
        Some(self)
    }
}

impl CustomQuery for SqliteParser {
    fn set_query(&mut self, query: &str) {
        if !query.is_empty() {
            self.query = query.to_string();
        }
    }

    fn query(&self) -> &str {
        &self.query
    }
}

fn stringify(value: Value) -> String {
    let raw = match value {
        Value::Null => RawValue::Null,
        Value::Integer(i) => RawValue::Integer(i),
        Value::Real(x) => RawValue::Float(x),
        Value::Text(s) => RawValue::String(s),
        Value::Blob(bytes) => RawValue::Opaque(String::from_utf8_lossy(&bytes).into_owned()),
    };
    raw.stringify()
}
