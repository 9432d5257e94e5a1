//! Configuration sources for layered settings
//!
//! Sources are merged in priority order: environment variables override
//! configuration files, which override defaults.

use indexmap::IndexMap;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable prefix used by [`EnvSource::default`]
pub const DEFAULT_ENV_PREFIX: &str = "TRELLIS_";

/// Trait for configuration sources
pub trait ConfigSource: Send + Sync {
	/// Load configuration from this source
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError>;

	/// Get the priority of this source (higher = more important)
	fn priority(&self) -> u8;

	/// Get a description of this source
	fn description(&self) -> String;
}

/// Error type for configuration sources
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
	/// Reading a file failed
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	/// The source content has an unexpected shape
	#[error("Parse error: {0}")]
	Parse(String),

	/// TOML syntax error
	#[error("TOML error: {0}")]
	Toml(#[from] toml::de::Error),

	/// JSON syntax error
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),

	/// The source cannot be used
	#[error("Invalid source: {0}")]
	InvalidSource(String),
}

fn object_into_map(value: Value) -> Result<IndexMap<String, Value>, SourceError> {
	match value {
		Value::Object(map) => Ok(map.into_iter().collect()),
		_ => Err(SourceError::Parse("Expected object at root".to_string())),
	}
}

/// Environment variable configuration source
///
/// Only variables starting with the prefix are read. The prefix is stripped and
/// the remaining key lowercased, so `TRELLIS_SITE_ID=2` becomes `site_id`.
/// Values are parsed as JSON when possible (`2`, `true`, `["a", "b"]`) and kept
/// as strings otherwise.
pub struct EnvSource {
	prefix: String,
}

impl EnvSource {
	/// Create an environment source reading variables with the given prefix
	///
	/// # Examples
	///
	/// ```
	/// use trellis_conf::EnvSource;
	///
	/// let source = EnvSource::new("MYSITE_");
	/// ```
	pub fn new(prefix: impl Into<String>) -> Self {
		Self {
			prefix: prefix.into(),
		}
	}

	fn parse_value(raw: &str) -> Value {
		serde_json::from_str(raw.trim()).unwrap_or_else(|_| Value::String(raw.to_string()))
	}
}

impl Default for EnvSource {
	fn default() -> Self {
		Self::new(DEFAULT_ENV_PREFIX)
	}
}

impl ConfigSource for EnvSource {
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError> {
		let mut config = IndexMap::new();

		for (key, value) in std::env::vars() {
			let Some(clean_key) = key.strip_prefix(&self.prefix) else {
				continue;
			};
			if clean_key.is_empty() {
				continue;
			}
			config.insert(clean_key.to_lowercase(), Self::parse_value(&value));
		}

		Ok(config)
	}

	fn priority(&self) -> u8 {
		100 // Highest priority
	}

	fn description(&self) -> String {
		format!("Environment variables ({}*)", self.prefix)
	}
}

/// TOML file configuration source
///
/// A missing file yields an empty configuration.
pub struct TomlFileSource {
	path: PathBuf,
}

impl TomlFileSource {
	/// Create a new TOML file configuration source
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}
}

impl ConfigSource for TomlFileSource {
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError> {
		if !self.path.exists() {
			return Ok(IndexMap::new());
		}

		let content = fs::read_to_string(&self.path)?;
		let toml_value: toml::Value = toml::from_str(&content)?;

		// Convert TOML value to JSON value
		let json_value = serde_json::to_value(toml_value)?;
		object_into_map(json_value)
	}

	fn priority(&self) -> u8 {
		50 // Medium priority
	}

	fn description(&self) -> String {
		format!("TOML file: {}", self.path.display())
	}
}

/// JSON file configuration source
///
/// A missing file yields an empty configuration.
pub struct JsonFileSource {
	path: PathBuf,
}

impl JsonFileSource {
	/// Create a new JSON file configuration source
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}
}

impl ConfigSource for JsonFileSource {
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError> {
		if !self.path.exists() {
			return Ok(IndexMap::new());
		}

		let content = fs::read_to_string(&self.path)?;
		object_into_map(serde_json::from_str(&content)?)
	}

	fn priority(&self) -> u8 {
		50 // Medium priority
	}

	fn description(&self) -> String {
		format!("JSON file: {}", self.path.display())
	}
}

/// Default values configuration source
#[derive(Default)]
pub struct DefaultSource {
	values: IndexMap<String, Value>,
}

impl DefaultSource {
	/// Create an empty default values source
	///
	/// # Examples
	///
	/// ```
	/// use trellis_conf::DefaultSource;
	/// use serde_json::json;
	///
	/// let source = DefaultSource::new()
	///     .with_value("site_id", json!(1))
	///     .with_value("plugin_processors", json!([]));
	/// ```
	pub fn new() -> Self {
		Self::default()
	}

	/// Add a default value
	pub fn with_value(mut self, key: impl Into<String>, value: Value) -> Self {
		self.values.insert(key.into(), value);
		self
	}
}

impl ConfigSource for DefaultSource {
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError> {
		Ok(self.values.clone())
	}

	fn priority(&self) -> u8 {
		0 // Lowest priority
	}

	fn description(&self) -> String {
		"Default values".to_string()
	}
}

/// Pick a file source from the file extension
pub fn auto_source(path: impl AsRef<Path>) -> Result<Box<dyn ConfigSource>, SourceError> {
	let path = path.as_ref();
	match path.extension().and_then(|ext| ext.to_str()) {
		Some("toml") => Ok(Box::new(TomlFileSource::new(path))),
		Some("json") => Ok(Box::new(JsonFileSource::new(path))),
		_ => Err(SourceError::InvalidSource(format!(
			"unsupported settings file: {}",
			path.display()
		))),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serial_test::serial;
	use std::env;
	use std::fs::File;
	use std::io::Write;
	use tempfile::TempDir;

	#[rstest]
	#[serial(env)]
	fn test_env_source_strips_prefix_and_parses_values() {
		// SAFETY: Environment mutation is serialized with #[serial].
		unsafe {
			env::set_var("TRELLIS_TEST_SITE_ID", "2");
			env::set_var("TRELLIS_TEST_PERMISSION", "true");
			env::set_var("TRELLIS_TEST_CACHE_PREFIX", "cms-test:");
		}

		let config = EnvSource::new("TRELLIS_TEST_").load().unwrap();

		assert_eq!(config.get("site_id").unwrap(), &Value::from(2));
		assert_eq!(config.get("permission").unwrap(), &Value::Bool(true));
		assert_eq!(
			config.get("cache_prefix").unwrap(),
			&Value::String("cms-test:".to_string())
		);

		// SAFETY: Environment mutation is serialized with #[serial].
		unsafe {
			env::remove_var("TRELLIS_TEST_SITE_ID");
			env::remove_var("TRELLIS_TEST_PERMISSION");
			env::remove_var("TRELLIS_TEST_CACHE_PREFIX");
		}
	}

	#[rstest]
	fn test_toml_source() {
		let temp_dir = TempDir::new().unwrap();
		let config_path = temp_dir.path().join("settings.toml");

		let mut file = File::create(&config_path).unwrap();
		writeln!(
			file,
			r#"
permission = true
plugin_processors = ["wrap"]

[placeholder_conf.main]
language_fallback = true
"#
		)
		.unwrap();

		let config = TomlFileSource::new(&config_path).load().unwrap();

		assert_eq!(config.get("permission").unwrap(), &Value::Bool(true));
		assert_eq!(
			config["placeholder_conf"]["main"]["language_fallback"],
			Value::Bool(true)
		);
	}

	#[rstest]
	fn test_json_source() {
		let temp_dir = TempDir::new().unwrap();
		let config_path = temp_dir.path().join("settings.json");

		let mut file = File::create(&config_path).unwrap();
		writeln!(file, r#"{{"site_id": 3, "cache_prefix": "x:"}}"#).unwrap();

		let config = JsonFileSource::new(&config_path).load().unwrap();

		assert_eq!(config.get("site_id").unwrap(), &Value::from(3));
	}

	#[rstest]
	fn test_json_source_rejects_non_object_root() {
		let temp_dir = TempDir::new().unwrap();
		let config_path = temp_dir.path().join("settings.json");
		fs::write(&config_path, "[1, 2]").unwrap();

		let result = JsonFileSource::new(&config_path).load();

		assert!(matches!(result, Err(SourceError::Parse(_))));
	}

	#[rstest]
	fn test_missing_file_is_empty() {
		let config = TomlFileSource::new("/nonexistent/settings.toml").load().unwrap();
		assert!(config.is_empty());
	}

	#[rstest]
	#[case("settings.toml", true)]
	#[case("settings.json", true)]
	#[case("settings.yaml", false)]
	fn test_auto_source(#[case] file: &str, #[case] supported: bool) {
		assert_eq!(auto_source(file).is_ok(), supported);
	}

	#[rstest]
	fn test_source_priority() {
		assert_eq!(EnvSource::default().priority(), 100);
		assert_eq!(TomlFileSource::new("a.toml").priority(), 50);
		assert_eq!(JsonFileSource::new("a.json").priority(), 50);
		assert_eq!(DefaultSource::new().priority(), 0);
	}
}
