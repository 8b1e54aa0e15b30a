use std::env;
use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

const APP_DIR_NAME: &str = "daily_notes";
const CONFIG_FILE: &str = "config.toml";
const LOG_DIR_NAME: &str = "logs";

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("failed to read config {path}: {source}")]
	Io {
		path: PathBuf,
		source: std::io::Error,
	},
	#[error("failed to parse config {path}: {source}")]
	TomlDecode {
		path: PathBuf,
		source: toml::de::Error,
	},
	#[error("invalid config value `{field}`: {reason}")]
	Invalid { field: &'static str, reason: String },
}

/// Optional settings from `config.toml`. Every field may be omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
	pub notes_dir: Option<PathBuf>,
	pub log_level: Option<String>,
	pub log_dir: Option<PathBuf>,
}

pub fn load_config() -> Result<AppConfig, ConfigError> {
	load_config_from(&config_path())
}

pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
	let raw = match fs::read_to_string(path) {
		Ok(raw) => raw,
		Err(err) if err.kind() == ErrorKind::NotFound => return Ok(AppConfig::default()),
		Err(source) => {
			return Err(ConfigError::Io {
				path: path.to_path_buf(),
				source,
			});
		}
	};

	let config: AppConfig = toml::from_str(&raw).map_err(|source| ConfigError::TomlDecode {
		path: path.to_path_buf(),
		source,
	})?;

	if config
		.notes_dir
		.as_ref()
		.is_some_and(|dir| dir.as_os_str().is_empty())
	{
		return Err(ConfigError::Invalid {
			field: "notes_dir",
			reason: "must not be empty".to_string(),
		});
	}

	Ok(config)
}

pub fn config_path() -> PathBuf {
	if let Some(path) = env::var_os("DAILY_NOTES_CONFIG") {
		if !path.is_empty() {
			return PathBuf::from(path);
		}
	}
	state_dir().join(CONFIG_FILE)
}

/// CLI flag, then `DAILY_NOTES_DIR`, then the config file, then the state
/// directory.
pub fn resolve_notes_dir(cli_dir: Option<PathBuf>, config: &AppConfig) -> PathBuf {
	resolve_notes_dir_with(cli_dir, env::var_os("DAILY_NOTES_DIR"), config)
}

fn resolve_notes_dir_with(
	cli_dir: Option<PathBuf>,
	env_dir: Option<OsString>,
	config: &AppConfig,
) -> PathBuf {
	if let Some(path) = cli_dir {
		return absolutize(path);
	}

	if let Some(path) = env_dir.filter(|path| !path.is_empty()) {
		return absolutize(PathBuf::from(path));
	}

	if let Some(path) = &config.notes_dir {
		return absolutize(path.clone());
	}

	state_dir()
}

pub fn resolve_log_dir(config: &AppConfig) -> PathBuf {
	match &config.log_dir {
		Some(path) => absolutize(path.clone()),
		None => absolutize(state_dir().join(LOG_DIR_NAME)),
	}
}

pub fn state_dir() -> PathBuf {
	if let Some(path) = env::var_os("DAILY_NOTES_STATE_DIR") {
		return PathBuf::from(path);
	}

	#[cfg(target_os = "windows")]
	{
		if let Some(path) = env::var_os("LOCALAPPDATA") {
			return PathBuf::from(path).join(APP_DIR_NAME);
		}
	}

	if let Some(path) = env::var_os("XDG_STATE_HOME") {
		return PathBuf::from(path).join(APP_DIR_NAME);
	}

	if let Some(path) = env::var_os("HOME") {
		return PathBuf::from(path)
			.join(".local")
			.join("state")
			.join(APP_DIR_NAME);
	}

	PathBuf::from(".daily_notes")
}

fn absolutize(path: PathBuf) -> PathBuf {
	let path = if path.is_absolute() {
		path
	} else if let Ok(cwd) = env::current_dir() {
		cwd.join(path)
	} else {
		path
	};

	if path.exists() {
		fs::canonicalize(&path).unwrap_or(path)
	} else {
		path
	}
}
