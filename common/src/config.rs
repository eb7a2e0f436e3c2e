use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::logging;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
	/// The log level to use, this is a tracing env filter
	pub level: String,

	/// What logging mode we should use
	pub mode: logging::Mode,
}

impl Default for LoggingConfig {
	fn default() -> Self {
		Self {
			level: "info".to_string(),
			mode: logging::Mode::Default,
		}
	}
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("failed to read config file {path}: {source}")]
	Io {
		path: String,
		#[source]
		source: std::io::Error,
	},
	#[error("failed to parse config file {path}: {source}")]
	File {
		path: String,
		#[source]
		source: toml::de::Error,
	},
	#[error("failed to build default config: {0}")]
	Defaults(#[from] toml::ser::Error),
	#[error("invalid config: {0}")]
	Invalid(#[from] toml::de::Error),
	#[error("environment variable {0} does not map to a config key")]
	EnvKey(String),
}

impl ConfigError {
	pub fn is_io(&self) -> bool {
		matches!(self, Self::Io { .. })
	}
}

/// Layers the config sources from lowest to highest priority: the `Default`
/// impl of `C`, the TOML config file and finally `{prefix}_*` environment
/// variables where `__` separates nested keys (`WARBLER_API__BIND_ADDRESS`).
///
/// The file named by `{prefix}_CONFIG_FILE` or `explicit_file` must exist,
/// `default_file` is skipped when missing. Returns the canonical path of the
/// file that was loaded, if any.
pub fn parse<C>(
	prefix: &str,
	explicit_file: Option<String>,
	default_file: Option<String>,
) -> Result<(C, Option<String>), ConfigError>
where
	C: Default + Serialize + DeserializeOwned,
{
	let env_prefix = format!("{prefix}_");
	let env: Vec<(String, String)> = std::env::vars().filter(|(k, _)| k.starts_with(&env_prefix)).collect();

	let explicit_file = explicit_file.or_else(|| {
		env.iter()
			.find(|(k, _)| k[env_prefix.len()..].eq_ignore_ascii_case("config_file"))
			.map(|(_, v)| v.clone())
	});

	let mut value = toml::Value::try_from(C::default())?;

	let mut config_path = None;

	let file = explicit_file.as_ref().map(|path| (path, true)).or(default_file.as_ref().map(|path| (path, false)));

	if let Some((path, required)) = file {
		match load_file(path) {
			Ok(table) => {
				merge(&mut value, table);
				config_path = Some(
					std::fs::canonicalize(path)
						.map(|p| p.display().to_string())
						.unwrap_or_else(|_| path.clone()),
				);
			}
			Err(err) => {
				if required || !err.is_io() {
					return Err(err);
				}

				tracing::debug!("failed to load config file: {}", err);
			}
		}
	}

	let mut guessed = Vec::new();

	for (key, raw) in env {
		let key = &key[env_prefix.len()..];
		if key.eq_ignore_ascii_case("config_file") {
			continue;
		}

		let path: Vec<String> = key.split("__").map(|segment| segment.to_ascii_lowercase()).collect();
		if path.iter().any(|segment| segment.is_empty()) {
			return Err(ConfigError::EnvKey(format!("{env_prefix}{key}")));
		}

		// Keys that already hold a string keep the raw value, a key with no
		// default is guessed and retried as a string if the guess does not fit.
		let leaf = match get_path(&value, &path) {
			Some(toml::Value::String(_)) => toml::Value::String(raw),
			Some(_) => parse_scalar(&raw),
			None => {
				let leaf = parse_scalar(&raw);
				if !leaf.is_str() {
					guessed.push((path.clone(), raw));
				}
				leaf
			}
		};

		set_path(&mut value, &path, leaf);
	}

	match value.clone().try_into() {
		Ok(config) => Ok((config, config_path)),
		Err(err) if guessed.is_empty() => Err(err.into()),
		Err(_) => {
			for (path, raw) in guessed {
				set_path(&mut value, &path, toml::Value::String(raw));
			}

			Ok((value.try_into()?, config_path))
		}
	}
}

fn load_file(path: &str) -> Result<toml::Value, ConfigError> {
	let contents = std::fs::read_to_string(Path::new(path)).map_err(|source| ConfigError::Io {
		path: path.to_string(),
		source,
	})?;

	toml::from_str(&contents).map_err(|source| ConfigError::File {
		path: path.to_string(),
		source,
	})
}

/// Environment values are typed the way TOML would read them, anything that is
/// not a valid TOML scalar stays a string.
fn parse_scalar(raw: &str) -> toml::Value {
	#[derive(serde::Deserialize)]
	struct Wrapper {
		v: toml::Value,
	}

	match toml::from_str::<Wrapper>(&format!("v = {raw}")) {
		Ok(Wrapper { v }) if !v.is_table() => v,
		_ => toml::Value::String(raw.to_string()),
	}
}

fn get_path<'a>(value: &'a toml::Value, path: &[String]) -> Option<&'a toml::Value> {
	path.iter().try_fold(value, |value, segment| value.get(segment.as_str()))
}

fn set_path(value: &mut toml::Value, path: &[String], leaf: toml::Value) {
	let Some((head, rest)) = path.split_first() else {
		*value = leaf;
		return;
	};

	if !value.is_table() {
		*value = toml::Value::Table(Default::default());
	}

	if let toml::Value::Table(table) = value {
		let entry = table
			.entry(head.clone())
			.or_insert_with(|| toml::Value::Table(Default::default()));
		set_path(entry, rest, leaf);
	}
}

fn merge(base: &mut toml::Value, overlay: toml::Value) {
	match (base, overlay) {
		(toml::Value::Table(base), toml::Value::Table(overlay)) => {
			for (key, value) in overlay {
				match base.get_mut(&key) {
					Some(existing) => merge(existing, value),
					None => {
						base.insert(key, value);
					}
				}
			}
		}
		(base, overlay) => *base = overlay,
	}
}
