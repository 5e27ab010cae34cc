use super::Host;
use super::common::{LogLevel, init_logging};
use super::config::Config;
use crate::Result;
use crate::convert::{ConvertError, Converter, split_patterns};
use crate::formats::Registry;
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use core::fmt::Display;
use ohno::app_err;
use std::fs;
use std::io::{self, Read, Write};

const LOG_TARGET: &str = "   command";

#[derive(Parser, Debug, Default)]
pub struct ConvertArgs {
    /// Input format, by name or file extension [default: yaml]
    #[arg(long, short = 'f', value_name = "FORMAT", env = "CFG2ENV_FORMAT")]
    pub format: Option<String>,

    /// Custom query for formats that support one, such as SQLite
    #[arg(long, short = 'q', value_name = "SQL")]
    pub query: Option<String>,

    /// Number of underscores to strip from every run of underscores in a key
    #[arg(long, value_name = "N", env = "CFG2ENV_DUNDER", allow_negative_numbers = true)]
    pub dunder: Option<i64>,

    /// Only keep keys matching one of these comma-separated glob patterns
    #[arg(long, short = 'i', value_name = "GLOBS", env = "CFG2ENV_INCLUDE")]
    pub include: Vec<String>,

    /// Drop keys matching any of these comma-separated glob patterns
    #[arg(long, short = 'e', value_name = "GLOBS", env = "CFG2ENV_EXCLUDE")]
    pub exclude: Vec<String>,

    /// Read the document from a file instead of stdin
    #[arg(long, value_name = "PATH")]
    pub input: Option<Utf8PathBuf>,

    /// Write the variables to a file instead of stdout
    #[arg(long, short = 'o', value_name = "PATH")]
    pub output: Option<Utf8PathBuf>,

    /// Path to a TOML configuration file
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,

    /// List the supported formats and exit
    #[arg(long)]
    pub list_formats: bool,

    /// Log level for diagnostic output on stderr
    #[arg(long, value_name = "LEVEL", default_value = "none")]
    pub log_level: LogLevel,
}

/// Everything a conversion needs once the command line and the configuration file are merged
#[derive(Debug, PartialEq, Eq)]
struct Settings {
    format: String,
    query: Option<String>,
    dunder: usize,
    include: Vec<String>,
    exclude: Vec<String>,
}

impl Settings {
    fn resolve(args: &ConvertArgs, config: Config, registry: &Registry) -> Self {
        let format = args
            .format
            .clone()
            .or(config.format)
            .or_else(|| {
                args.input
                    .as_deref()
                    .and_then(Utf8Path::extension)
                    .filter(|ext| registry.contains(ext))
                    .map(str::to_string)
            })
            .unwrap_or_default();

        let dunder = args.dunder.map_or_else(
            || config.dunder.map_or(0, |d| usize::try_from(d).unwrap_or(usize::MAX)),
            |d| usize::try_from(d.max(0)).unwrap_or(usize::MAX),
        );

        Self {
            format,
            query: args.query.clone().or(config.query),
            dunder,
            include: patterns(&args.include, config.include),
            exclude: patterns(&args.exclude, config.exclude),
        }
    }
}

/// Command-line lists replace the configuration file's lists
fn patterns(cli: &[String], file: Vec<String>) -> Vec<String> {
    if cli.is_empty() {
        file
    } else {
        cli.iter().flat_map(|list| split_patterns(list)).collect()
    }
}

/// Convert one document into environment variables
pub fn process_convert<H: Host>(host: &mut H, args: &ConvertArgs) -> Result<()> {
    init_logging(args.log_level);

    let config = match Config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => return fail(host, e),
    };

    let mut registry = Registry::with_builtin();
    if args.list_formats {
        return match list_formats(host, &registry) {
            Ok(()) => Ok(()),
            Err(e) => fail(host, ConvertError::Write(e)),
        };
    }

    let settings = Settings::resolve(args, config, &registry);
    match convert_document(host, &mut registry, &settings, args) {
        Ok(written) => {
            log::debug!(target: LOG_TARGET, "Conversion finished with {written} variable(s)");
            Ok(())
        }
        Err(e) => fail(host, e),
    }
}

fn convert_document<H: Host>(host: &mut H, registry: &mut Registry, settings: &Settings, args: &ConvertArgs) -> Result<usize, ConvertError> {
    let parser = registry.get_mut(&settings.format)?;
    let name = parser.name();

    if let Some(query) = &settings.query {
        match parser.custom_query() {
            Some(custom) => custom.set_query(query),
            None => log::debug!(target: LOG_TARGET, "Format '{name}' does not take a query, ignoring it"),
        }
    }

    let mut converter = Converter::new(&*parser);
    converter.set_dunder(settings.dunder)?;
    converter.set_filter_patterns(&settings.include, &settings.exclude)?;

    let input = match &args.input {
        Some(path) => {
            log::debug!(target: LOG_TARGET, "Reading '{path}'");
            fs::read(path).map_err(ConvertError::Read)?
        }
        None => {
            let mut buf = Vec::new();
            let _ = host.input().read_to_end(&mut buf).map_err(ConvertError::Read)?;
            buf
        }
    };

    match &args.output {
        Some(path) => {
            let mut buf = Vec::new();
            let written = converter.convert(input.as_slice(), &mut buf)?;
            fs::write(path, buf).map_err(ConvertError::Write)?;
            log::debug!(target: LOG_TARGET, "Wrote '{path}'");
            Ok(written)
        }
        None => converter.convert(input.as_slice(), host.output()),
    }
}

fn list_formats<H: Host>(host: &mut H, registry: &Registry) -> io::Result<()> {
    let default = registry.default_parser().map(|p| p.name());
    let mut out = host.output();

    for parser in registry.parsers() {
        let aliases: Vec<_> = parser.extensions().iter().filter(|ext| **ext != parser.name()).copied().collect();

        let mut line = parser.name().to_string();
        if !aliases.is_empty() {
            line = format!("{line} ({})", aliases.join(", "));
        }
        if default == Some(parser.name()) {
            line.push_str(" [default]");
        }

        writeln!(out, "{line}")?;
    }

    out.flush()
}

fn fail<H: Host>(host: &mut H, e: impl Display) -> Result<()> {
    let _ = writeln!(host.error(), "Error: {e}");
    host.exit(1);
    Err(app_err!("{e}"))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::commands::host::TestHost;
    use crate::convert::NO_MATCH_LINE;

    fn args() -> ConvertArgs {
        ConvertArgs::default()
    }

    fn convert(input: &str, args: &ConvertArgs) -> TestHost {
        let mut host = TestHost::new(input);
        let _ = process_convert(&mut host, args);
        host
    }

    #[test]
    fn test_yaml_is_the_default_format() {
        let host = convert("server:\n  port: 8080\n  debug: true\n", &args());

        assert_eq!(host.output_str(), "SERVER_DEBUG=true\nSERVER_PORT=8080\n");
        assert_eq!(host.exit_code, None);
    }

    #[test]
    fn test_json_format() {
        let args = ConvertArgs {
            format: Some("JSON".into()),
            ..args()
        };
        let host = convert(r#"{"app": {"name": "demo", "ratio": 1.5, "tags": ["a", "b"]}}"#, &args);

        assert_eq!(host.output_str(), "APP_NAME=demo\nAPP_RATIO=1.5\nAPP_TAGS_0=a\nAPP_TAGS_1=b\n");
    }

    #[test]
    fn test_unknown_format_fails() {
        let args = ConvertArgs {
            format: Some("toml".into()),
            ..args()
        };
        let mut host = TestHost::new("a: 1");
        let _ = process_convert(&mut host, &args).unwrap_err();

        assert_eq!(host.error_str(), "Error: unsupported format: toml\n");
        assert_eq!(host.exit_code, Some(1));
        assert!(host.output_buf.is_empty());
    }

    #[test]
    fn test_malformed_input_writes_no_output() {
        let args = ConvertArgs {
            format: Some("json".into()),
            ..args()
        };
        let host = convert("{\"a\": ", &args);

        assert!(host.output_buf.is_empty());
        assert!(host.error_str().starts_with("Error: parsing error: "));
        assert_eq!(host.exit_code, Some(1));
    }

    #[test]
    fn test_dunder_and_filters() {
        let args = ConvertArgs {
            dunder: Some(1),
            include: vec!["db__*,api__*".into()],
            exclude: vec!["*_SECRET".into()],
            ..args()
        };
        let host = convert("db__host: h\ndb__secret: s\napi__url: u\nother: o\n", &args);

        assert_eq!(host.output_str(), "API_URL=u\nDB_HOST=h\n");
    }

    #[test]
    fn test_negative_dunder_means_none() {
        let args = ConvertArgs {
            dunder: Some(-3),
            ..args()
        };
        let host = convert("a__b: 1\n", &args);
        assert_eq!(host.output_str(), "A__B=1\n");
    }

    #[test]
    fn test_no_match_comment() {
        let args = ConvertArgs {
            include: vec!["MISSING_*".into()],
            ..args()
        };
        let host = convert("a: 1\n", &args);
        assert_eq!(host.output_str(), format!("{NO_MATCH_LINE}\n"));
    }

    #[test]
    fn test_query_is_ignored_by_formats_without_one() {
        let args = ConvertArgs {
            query: Some("SELECT 1".into()),
            ..args()
        };
        let host = convert("a: 1\n", &args);
        assert_eq!(host.output_str(), "A=1\n");
    }

    #[test]
    fn test_list_formats() {
        let args = ConvertArgs {
            list_formats: true,
            ..args()
        };
        let host = convert("", &args);

        insta::assert_snapshot!(host.output_str().trim_end(), @r"
        yaml (yml) [default]
        json
        sqlite (db, sqlite3)
        ");
    }

    #[test]
    fn test_list_formats_reports_write_failure() {
        /// Host whose output stream is already closed
        #[derive(Default)]
        struct ClosedOutputHost {
            error_buf: Vec<u8>,
            exit_code: Option<i32>,
        }

        struct ClosedPipe;

        impl Write for ClosedPipe {
            fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
                Err(io::Error::from(io::ErrorKind::BrokenPipe))
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        impl Host for ClosedOutputHost {
            fn input(&mut self) -> impl Read {
                io::empty()
            }

            fn output(&mut self) -> impl Write {
                ClosedPipe
            }

            fn error(&mut self) -> impl Write {
                &mut self.error_buf
            }

            fn exit(&mut self, code: i32) {
                self.exit_code = Some(code);
            }
        }

        let args = ConvertArgs {
            list_formats: true,
            ..args()
        };
        let mut host = ClosedOutputHost::default();
        let _ = process_convert(&mut host, &args).unwrap_err();

        assert_eq!(host.exit_code, Some(1));
        assert!(String::from_utf8_lossy(&host.error_buf).starts_with("Error: writing error: "));
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_input_and_output_files() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap();
        let input = dir.join("settings.json");
        let output = dir.join("settings.env");
        fs::write(&input, r#"{"name": "demo"}"#).unwrap();

        let args = ConvertArgs {
            input: Some(input),
            output: Some(output.clone()),
            ..args()
        };
        let host = convert("", &args);

        assert!(host.output_buf.is_empty());
        assert_eq!(fs::read_to_string(&output).unwrap(), "NAME=demo\n");
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_failed_conversion_leaves_no_output_file() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap();
        let output = dir.join("out.env");

        let args = ConvertArgs {
            format: Some("json".into()),
            output: Some(output.clone()),
            ..args()
        };
        let host = convert("[1, ", &args);

        assert_eq!(host.exit_code, Some(1));
        assert!(!output.exists());
    }

    #[test]
    fn test_missing_input_file_is_a_read_error() {
        let args = ConvertArgs {
            input: Some("/nonexistent/input.yaml".into()),
            ..args()
        };
        let host = convert("", &args);

        assert!(host.error_str().starts_with("Error: reading error: "));
        assert_eq!(host.exit_code, Some(1));
    }

    #[test]
    fn test_settings_prefer_command_line() {
        let registry = Registry::with_builtin();
        let config = Config {
            format: Some("json".into()),
            query: Some("SELECT a, b FROM c".into()),
            dunder: Some(2),
            include: vec!["FROM_FILE_*".into()],
            exclude: vec!["X".into()],
        };
        let args = ConvertArgs {
            format: Some("yaml".into()),
            dunder: Some(1),
            include: vec!["A_*,B_*".into()],
            ..args()
        };

        let settings = Settings::resolve(&args, config, &registry);
        assert_eq!(
            settings,
            Settings {
                format: "yaml".into(),
                query: Some("SELECT a, b FROM c".into()),
                dunder: 1,
                include: vec!["A_*".into(), "B_*".into()],
                exclude: vec!["X".into()],
            }
        );
    }

    #[test]
    fn test_format_from_input_extension() {
        let registry = Registry::with_builtin();
        let with_input = |path: &str| ConvertArgs {
            input: Some(path.into()),
            ..args()
        };

        assert_eq!(Settings::resolve(&with_input("app.json"), Config::default(), &registry).format, "json");
        assert_eq!(Settings::resolve(&with_input("app.sqlite3"), Config::default(), &registry).format, "sqlite3");
        assert_eq!(Settings::resolve(&with_input("app.conf"), Config::default(), &registry).format, "");

        let config = Config {
            format: Some("yaml".into()),
            ..Config::default()
        };
        assert_eq!(Settings::resolve(&with_input("app.json"), config, &registry).format, "yaml");
    }
}
