//! CMS settings and the layered settings builder

use crate::languages::LanguageConfig;
use crate::placeholders::PlaceholderConf;
use crate::sources::{ConfigSource, SourceError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Site identifier
pub type SiteId = u32;

/// Errors raised while assembling settings
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
	/// A configuration source failed to load
	#[error("failed to load {source_name}: {error}")]
	Source {
		/// Description of the failing source
		source_name: String,
		/// Underlying error
		#[source]
		error: SourceError,
	},

	/// The merged values do not match the settings schema
	#[error("invalid settings: {0}")]
	Deserialize(#[from] serde_json::Error),

	/// The language table of a site is unusable
	#[error("invalid languages for site {site}: {message}")]
	Languages {
		/// Offending site
		site: SiteId,
		/// What is wrong
		message: String,
	},
}

/// A page template known to the CMS and the slots it declares
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConf {
	/// Display name
	pub name: String,
	/// Placeholder slots declared by the template, in order
	pub placeholders: Vec<String>,
}

fn default_site_id() -> SiteId {
	1
}

fn default_languages() -> IndexMap<SiteId, Vec<LanguageConfig>> {
	let mut languages = IndexMap::new();
	languages.insert(default_site_id(), vec![LanguageConfig::new("en", "English")]);
	languages
}

fn default_cache_prefix() -> String {
	"cms-".to_string()
}

/// Settings consumed by the rendering pipeline and the consistency reactor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CmsSettings {
	/// Site served by this process
	pub site_id: SiteId,
	/// Languages per site, in priority order
	pub languages: IndexMap<SiteId, Vec<LanguageConfig>>,
	/// Placeholder options keyed by `"<template> <slot>"` or `"<slot>"`
	pub placeholder_conf: IndexMap<String, PlaceholderConf>,
	/// Page templates keyed by template name
	pub templates: IndexMap<String, TemplateConf>,
	/// Names of plugin context processors, run after the built-in ones
	pub plugin_context_processors: Vec<String>,
	/// Names of plugin content processors, run before call-site processors
	pub plugin_processors: Vec<String>,
	/// Enable page-level permissions and permission cache maintenance
	pub permission: bool,
	/// Prefix for cache keys
	pub cache_prefix: String,
}

impl Default for CmsSettings {
	fn default() -> Self {
		let mut settings = Self {
			site_id: default_site_id(),
			languages: default_languages(),
			placeholder_conf: IndexMap::new(),
			templates: IndexMap::new(),
			plugin_context_processors: Vec::new(),
			plugin_processors: Vec::new(),
			permission: false,
			cache_prefix: default_cache_prefix(),
		};
		settings.fill_fallbacks();
		settings
	}
}

impl CmsSettings {
	/// Fill defaults and validate the language tables
	///
	/// Languages without explicit fallbacks fall back to the site's other
	/// languages in declaration order.
	pub fn finalize(&mut self) -> Result<(), SettingsError> {
		if !self.languages.contains_key(&self.site_id) {
			return Err(SettingsError::Languages {
				site: self.site_id,
				message: "no languages configured for the current site".to_string(),
			});
		}
		for (site, languages) in &self.languages {
			if languages.is_empty() {
				return Err(SettingsError::Languages {
					site: *site,
					message: "language list is empty".to_string(),
				});
			}
			for (index, language) in languages.iter().enumerate() {
				if languages[..index].iter().any(|l| l.code == language.code) {
					return Err(SettingsError::Languages {
						site: *site,
						message: format!("duplicate language code `{}`", language.code),
					});
				}
			}
		}
		self.fill_fallbacks();
		Ok(())
	}

	fn fill_fallbacks(&mut self) {
		for languages in self.languages.values_mut() {
			let codes: Vec<String> = languages.iter().map(|l| l.code.clone()).collect();
			for language in languages.iter_mut() {
				if language.fallbacks.is_none() {
					language.fallbacks = Some(
						codes
							.iter()
							.filter(|code| **code != language.code)
							.cloned()
							.collect(),
					);
				}
			}
		}
	}

	/// Languages of a site, in priority order
	pub fn site_languages(&self, site: SiteId) -> &[LanguageConfig] {
		self.languages.get(&site).map(Vec::as_slice).unwrap_or_default()
	}

	/// Language codes of a site, in priority order
	pub fn language_codes(&self, site: SiteId) -> Vec<&str> {
		self.site_languages(site)
			.iter()
			.map(|l| l.code.as_str())
			.collect()
	}

	/// Configuration of one language on a site
	pub fn language_object(&self, code: &str, site: SiteId) -> Option<&LanguageConfig> {
		self.site_languages(site).iter().find(|l| l.code == code)
	}

	/// Default (first) language of a site
	pub fn default_language_for(&self, site: SiteId) -> &str {
		self.site_languages(site)
			.first()
			.map(|l| l.code.as_str())
			.unwrap_or("en")
	}

	/// Default language of the current site
	pub fn default_language(&self) -> &str {
		self.default_language_for(self.site_id)
	}

	/// Ordered fallback languages for `code` on a site
	pub fn fallback_languages(&self, code: &str, site: SiteId) -> &[String] {
		self.language_object(code, site)
			.map(LanguageConfig::fallbacks)
			.unwrap_or_default()
	}

	/// Slots declared by a page template
	pub fn template_placeholders(&self, template: &str) -> &[String] {
		self.templates
			.get(template)
			.map(|t| t.placeholders.as_slice())
			.unwrap_or_default()
	}
}

/// Builds [`CmsSettings`] from layered sources
///
/// # Examples
///
/// ```
/// use trellis_conf::{DefaultSource, EnvSource, SettingsBuilder};
/// use serde_json::json;
///
/// let settings = SettingsBuilder::new()
///     .add_source(DefaultSource::new().with_value("cache_prefix", json!("site-a:")))
///     .add_source(EnvSource::new("TRELLIS_DOCTEST_"))
///     .build()
///     .unwrap();
/// assert_eq!(settings.cache_prefix, "site-a:");
/// ```
#[derive(Default)]
pub struct SettingsBuilder {
	sources: Vec<Box<dyn ConfigSource>>,
}

impl SettingsBuilder {
	/// Create a builder without sources
	pub fn new() -> Self {
		Self::default()
	}

	/// Add a configuration source
	pub fn add_source<S: ConfigSource + 'static>(mut self, source: S) -> Self {
		self.sources.push(Box::new(source));
		self
	}

	/// Add an already boxed configuration source
	pub fn add_boxed_source(mut self, source: Box<dyn ConfigSource>) -> Self {
		self.sources.push(source);
		self
	}

	/// Load and merge every source; higher priorities override top-level keys
	pub fn merged(&self) -> Result<IndexMap<String, Value>, SettingsError> {
		let mut sources: Vec<&dyn ConfigSource> = self.sources.iter().map(|source| &**source).collect();
		sources.sort_by_key(|source| source.priority());

		let mut merged = IndexMap::new();
		for source in sources {
			let values = source.load().map_err(|error| SettingsError::Source {
				source_name: source.description(),
				error,
			})?;
			debug!(source = %source.description(), keys = values.len(), "loaded settings source");
			merged.extend(values);
		}
		Ok(merged)
	}

	/// Build and finalize the settings
	pub fn build(self) -> Result<CmsSettings, SettingsError> {
		let merged = self.merged()?;
		let object: serde_json::Map<String, Value> = merged.into_iter().collect();
		let mut settings: CmsSettings = serde_json::from_value(Value::Object(object))?;
		settings.finalize()?;
		Ok(settings)
	}
}
