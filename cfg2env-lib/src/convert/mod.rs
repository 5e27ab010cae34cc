//! The flatten, normalize, and filter pipeline
//!
//! This module turns a decoded configuration tree into a flat set of environment variables.
//!
//! # Implementation Model
//!
//! A document moves through four stages:
//!
//! 1. **Flatten**: [`flatten`] walks the [`RawValue`] tree, joining mapping keys with `_` and
//!    using zero-based indices for sequence elements. Leaves are rendered with
//!    [`RawValue::stringify`].
//! 2. **Normalize**: [`normalize_key`] uppercases each key and applies dunder compression, which
//!    strips a configurable number of underscores from every run of underscores. Keys that collide
//!    after normalization are merged, the last one in raw key order winning.
//! 3. **Filter**: a [`Filter`] built from include and exclude globs decides which normalized keys
//!    survive. Patterns pass through the same normalization as keys.
//! 4. **Render**: surviving entries are written as sorted `KEY=value` lines by the [`Converter`].
//!
//! Format parsers may skip the flatten stage by returning an already-flat mapping.

mod converter;
mod error;
mod filter;
mod flatten;
mod normalize;
mod value;

pub use converter::{Converter, NO_MATCH_LINE};
pub use error::{ConvertError, ParseError};
pub use filter::{Filter, Glob, should_include, split_patterns};
pub use flatten::{SEPARATOR, flatten, flatten_root};
pub use normalize::normalize_key;
pub use value::RawValue;
