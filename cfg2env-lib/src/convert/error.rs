use std::io;

type BoxedError = Box<dyn core::error::Error + Send + Sync + 'static>;

/// Failures raised by a format parser
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("unable to read input")]
    Read(#[from] io::Error),

    #[error("malformed {format} input: {source}")]
    Malformed {
        format: &'static str,
        #[source]
        source: BoxedError,
    },

    #[error("{format} mapping key {key} is not a scalar")]
    UnsupportedKey { format: &'static str, key: String },

    #[error("{format} input defines '{key}' more than once (keys are case-insensitive)")]
    DuplicateKey { format: &'static str, key: String },
}

impl ParseError {
    pub(crate) fn malformed(format: &'static str, source: impl Into<BoxedError>) -> Self {
        Self::Malformed {
            format,
            source: source.into(),
        }
    }
}

/// Failures raised while converting a document
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("no default format available")]
    NoDefaultFormat,

    #[error("invalid filter pattern '{pattern}'")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("reading error: {0}")]
    Read(#[source] io::Error),

    #[error("parsing error: {0}")]
    Parse(#[source] ParseError),

    #[error("writing error: {0}")]
    Write(#[source] io::Error),
}

impl From<ParseError> for ConvertError {
    fn from(e: ParseError) -> Self {
        match e {
            ParseError::Read(e) => Self::Read(e),
            other => Self::Parse(other),
        }
    }
}
