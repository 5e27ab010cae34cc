//! Convert structured configuration into environment variables.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

use cfg2env_lib::{Host, run};
use std::io::{Read, Write};
use std::io::{stderr, stdin, stdout};

/// Default host bound to the process's standard streams.
#[derive(Debug, Clone, Default)]
pub struct RealHost;

#[cfg_attr(coverage_nightly, coverage(off))]
impl Host for RealHost {
    fn input(&mut self) -> impl Read {
        stdin()
    }

    fn output(&mut self) -> impl Write {
        stdout()
    }

    fn error(&mut self) -> impl Write {
        stderr()
    }

    fn exit(&mut self, code: i32) {
        std::process::exit(code);
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
fn main() -> Result<(), ohno::AppError> {
    run(&mut RealHost, std::env::args())
}
