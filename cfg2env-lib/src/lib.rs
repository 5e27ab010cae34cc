#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core library for cfg2env
//!
//! This library converts structured configuration documents (YAML, JSON, or a SQLite database)
//! into flat, sorted `KEY=value` environment variable lines.
//!
//! # Module Organization
//!
//! - [`convert`]: Flattening, key normalization, filtering, and rendering
//! - [`formats`]: Input format parsers and the registry used to look them up
//!
//! The command-line front end is exposed through [`run`], which takes a [`Host`] so the whole
//! command can be driven against in-memory buffers.

pub type Result<T, E = ohno::AppError> = core::result::Result<T, E>;

mod commands;
pub mod convert;
pub mod formats;

pub use crate::commands::{Host, run};
