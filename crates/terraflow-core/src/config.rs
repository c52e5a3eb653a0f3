use std::{
    fs,
    io,
    path::{Path, PathBuf},
};

pub use terraflow_proto::config::*;

use log::{info, warn};
use shellexpand::full;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file does not exist: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to expand path `{path}`: {message}")]
    Expand { path: String, message: String },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(#[from] ConfigValidationError),
}

/// Load the configuration, returning it with the resolved file path.
///
/// An explicit `path` must exist. Without one the default location is used and
/// a missing or broken file yields [`Config::default`].
pub fn get_config(path: Option<PathBuf>) -> Result<(Config, PathBuf), ConfigError> {
    match path {
        Some(path) => {
            info!("Config path provided {path:?}");
            let expanded = expand_path(&path.to_string_lossy())?;

            if !expanded.exists() {
                return Err(ConfigError::NotFound { path: expanded });
            }

            Ok((read_config_or_default(&expanded), expanded))
        }
        None => {
            let expanded = expand_path(DEFAULT_CONFIG_FILE_PATH)?;

            if let Some(parent) = expanded.parent()
                && !parent.exists()
                && let Err(err) = fs::create_dir_all(parent)
            {
                warn!("Failed to create config directory {parent:?}: {err}");
            }

            Ok((read_config_or_default(&expanded), expanded))
        }
    }
}

pub fn expand_path(path: &str) -> Result<PathBuf, ConfigError> {
    let expanded = full(path).map_err(|err| ConfigError::Expand {
        path: path.to_owned(),
        message: err.to_string(),
    })?;

    Ok(PathBuf::from(expanded.as_ref()))
}

pub fn read_config(path: &Path) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    info!("Decoding config file {path:?}");

    let config: Config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    config.validate()?;

    info!("Config file loaded successfully");
    Ok(config)
}

fn read_config_or_default(path: &Path) -> Config {
    read_config(path).unwrap_or_else(|err| {
        warn!("{err}; using default configuration");
        Config::default()
    })
}

/// Load the palette referenced by `Config::stylesheet`.
///
/// Any failure falls back to [`Stylesheet::default`] with a warning.
pub fn load_stylesheet(path: &str) -> Stylesheet {
    let expanded = match expand_path(path) {
        Ok(expanded) => expanded,
        Err(err) => {
            warn!("{err}; using default stylesheet");
            return Stylesheet::default();
        }
    };

    let content = match fs::read_to_string(&expanded) {
        Ok(content) => content,
        Err(err) => {
            warn!("Failed to read stylesheet {expanded:?}: {err}; using default stylesheet");
            return Stylesheet::default();
        }
    };

    match toml::from_str(&content) {
        Ok(stylesheet) => {
            info!("Stylesheet loaded from {expanded:?}");
            stylesheet
        }
        Err(err) => {
            warn!("Failed to parse stylesheet {expanded:?}: {err}; using default stylesheet");
            Stylesheet::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn write_temp(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(content.as_bytes()).expect("write");
        file
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let missing = dir.path().join("absent.toml");

        let result = get_config(Some(missing));
        assert!(matches!(result, Err(ConfigError::NotFound { .. })));
    }

    #[test]
    fn explicit_path_is_loaded() {
        let file = write_temp("[bar]\ntitle = \"Desk\"\n");

        let (config, path) = get_config(Some(file.path().to_path_buf())).expect("config");

        assert_eq!(config.bar.title, "Desk");
        assert_eq!(path, file.path());
    }

    #[test]
    fn broken_file_falls_back_to_defaults() {
        let file = write_temp("bar = [");

        let (config, _) = get_config(Some(file.path().to_path_buf())).expect("config");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn read_config_reports_parse_errors() {
        let file = write_temp("[clock]\ninterval_ms = \"fast\"\n");

        let result = read_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn read_config_reports_validation_errors() {
        let file = write_temp("[clock]\nformat = \"\"\n");

        let result = read_config(file.path());
        assert!(matches!(
            result,
            Err(ConfigError::Invalid(ConfigValidationError::EmptyClockFormat))
        ));
    }

    #[test]
    fn expand_path_keeps_plain_paths() {
        let expanded = expand_path("/tmp/terraflow/config.toml").expect("expand");
        assert_eq!(expanded, PathBuf::from("/tmp/terraflow/config.toml"));
    }

    #[test]
    fn stylesheet_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let missing = dir.path().join("style.toml");

        let stylesheet = load_stylesheet(&missing.to_string_lossy());
        assert_eq!(stylesheet, Stylesheet::default());
    }

    #[test]
    fn stylesheet_is_parsed() {
        let file = write_temp("opacity = 0.5\nbackground = \"#101010\"\n");

        let stylesheet = load_stylesheet(&file.path().to_string_lossy());
        assert_eq!(stylesheet.opacity, 0.5);
    }

    #[test]
    fn invalid_stylesheet_uses_defaults() {
        let file = write_temp("opacity = 7.0\n");

        let stylesheet = load_stylesheet(&file.path().to_string_lossy());
        assert_eq!(stylesheet, Stylesheet::default());
    }
}
