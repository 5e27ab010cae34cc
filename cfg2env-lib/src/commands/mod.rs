//! Command-line interface and orchestration for cfg2env
//!
//! This module wires argument parsing, the optional configuration file, the format registry, and
//! the conversion pipeline together.
//!
//! # Execution Flow
//!
//! The `run` function parses command-line arguments using clap and hands them to the convert
//! command, which:
//!
//! 1. Initializes logging and loads the configuration file, if one was given
//! 2. Merges command-line values over the file's values
//! 3. Resolves the input format through the registry, configuring a custom query when the format
//!    supports one
//! 4. Reads the whole document, converts it, and writes the variables
//!
//! All I/O goes through a [`Host`], which lets tests run the full command against in-memory
//! buffers. Failures are reported as `Error: <message>` on the host's error stream followed by a
//! non-zero exit.

mod common;
mod config;
mod convert;
mod host;
mod run;

pub use convert::{ConvertArgs, process_convert};
pub use host::Host;
pub use run::run;
