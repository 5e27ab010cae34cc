use crate::Result;
use camino::Utf8Path;
use ohno::{IntoAppError, app_err};
use serde::{Deserialize, Serialize};
use std::fs;

/// Settings read from an optional TOML file. Command-line flags take precedence over every field.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Input format name or extension
    #[serde(default)]
    pub format: Option<String>,

    /// Custom query for formats that support one
    #[serde(default)]
    pub query: Option<String>,

    /// Number of underscores to strip from every run of underscores
    #[serde(default)]
    pub dunder: Option<u32>,

    /// Glob patterns a key must match to be kept
    #[serde(default)]
    pub include: Vec<String>,

    /// Glob patterns that drop a key
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl Config {
    /// Load configuration from a file, or use defaults when no file is given
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn load(config_path: Option<&Utf8Path>) -> Result<Self> {
        let Some(path) = config_path else {
            return Ok(Self::default());
        };

        let text = fs::read_to_string(path).into_app_err_with(|| format!("reading cfg2env configuration file '{path}'"))?;
        let config: Self = toml::from_str(&text).into_app_err_with(|| format!("parsing configuration file '{path}'"))?;
        config.validate()?;

        log::debug!("Loaded configuration from '{path}'");
        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.format.as_deref().is_some_and(|f| f.trim().is_empty()) {
            return Err(app_err!("format must not be empty"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;

    fn write_config(dir: &tempfile::TempDir, text: &str) -> Utf8PathBuf {
        let path = Utf8PathBuf::try_from(dir.path().join("cfg2env.toml")).unwrap();
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_no_path_uses_defaults() {
        assert_eq!(Config::load(None).unwrap(), Config::default());
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_load_all_fields() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_config(
            &tmp,
            r#"
format = "json"
query = "SELECT k, v FROM t"
dunder = 2
include = ["DATABASE_*", "API_*"]
exclude = ["*_PASSWORD"]
"#,
        );

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(
            config,
            Config {
                format: Some("json".into()),
                query: Some("SELECT k, v FROM t".into()),
                dunder: Some(2),
                include: vec!["DATABASE_*".into(), "API_*".into()],
                exclude: vec!["*_PASSWORD".into()],
            }
        );
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_empty_file_is_default() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_config(&tmp, "");
        assert_eq!(Config::load(Some(&path)).unwrap(), Config::default());
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_unknown_fields_are_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_config(&tmp, "formats = \"json\"\n");
        let _ = Config::load(Some(&path)).unwrap_err();
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_negative_dunder_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_config(&tmp, "dunder = -1\n");
        let _ = Config::load(Some(&path)).unwrap_err();
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_blank_format_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_config(&tmp, "format = \"  \"\n");
        let _ = Config::load(Some(&path)).unwrap_err();
    }

    #[test]
    fn test_missing_file() {
        let _ = Config::load(Some(Utf8Path::new("/nonexistent/cfg2env.toml"))).unwrap_err();
    }
}
