//! Command dispatch logic for cfg2env

use super::{ConvertArgs, process_convert};
use crate::{Host, Result};
use clap::builder::Styles;
use clap::builder::styling::{AnsiColor, Effects};
use clap::Parser;
use clap::error::ErrorKind;
use ohno::app_err;
use std::io::Write;

const CLAP_STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

#[derive(Parser, Debug)]
#[command(name = "cfg2env", version, long_about = None)]
#[command(about = "Convert YAML, JSON, or SQLite configuration into environment variables")]
#[command(styles = CLAP_STYLES)]
struct Cli {
    #[command(flatten)]
    convert: ConvertArgs,
}

/// Parse command-line arguments and run the conversion
///
/// The document is read from the host's input and the variables are written to the host's
/// output, unless files are named on the command line.
///
/// # Arguments
///
/// * `args` - An iterator of command-line arguments (typically from `std::env::args()`)
///
/// # Errors
///
/// Returns an error if command parsing fails or if the conversion fails
pub fn run<I, T, H>(host: &mut H, args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
    H: Host,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = write!(host.output(), "{}", e.render());
            return Ok(());
        }
        Err(e) => {
            let _ = write!(host.error(), "{}", e.render());
            host.exit(2);
            return Err(app_err!("invalid command line"));
        }
    };

    process_convert(host, &cli.convert)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::commands::host::TestHost;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_converts_stdin() {
        let mut host = TestHost::new("name: demo\n");
        run(&mut host, ["cfg2env"]).unwrap();
        assert_eq!(host.output_str(), "NAME=demo\n");
    }

    #[test]
    fn test_run_with_flags() {
        let mut host = TestHost::new(r#"{"db__host": "h", "db__port": 5432, "other": 1}"#);
        run(
            &mut host,
            ["cfg2env", "--format", "json", "--dunder", "1", "-i", "DB_*", "-e", "*_PORT"],
        )
        .unwrap();
        assert_eq!(host.output_str(), "DB_HOST=h\n");
    }

    #[test]
    fn test_negative_dunder_is_accepted() {
        let mut host = TestHost::new("a__b: 1\n");
        run(&mut host, ["cfg2env", "--dunder", "-1"]).unwrap();
        assert_eq!(host.output_str(), "A__B=1\n");
    }

    #[test]
    fn test_help_goes_to_output() {
        let mut host = TestHost::new("");
        run(&mut host, ["cfg2env", "--help"]).unwrap();

        assert!(host.output_str().contains("--dunder"));
        assert_eq!(host.exit_code, None);
    }

    #[test]
    fn test_version_goes_to_output() {
        let mut host = TestHost::new("");
        run(&mut host, ["cfg2env", "--version"]).unwrap();
        assert!(host.output_str().contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_bad_arguments_exit_with_usage_error() {
        let mut host = TestHost::new("");
        let _ = run(&mut host, ["cfg2env", "--no-such-flag"]).unwrap_err();

        assert_eq!(host.exit_code, Some(2));
        assert!(host.error_str().contains("--no-such-flag"));
        assert!(host.output_buf.is_empty());
    }
}
