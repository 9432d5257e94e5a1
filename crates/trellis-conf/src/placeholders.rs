//! Placeholder (slot) configuration
//!
//! Configuration is keyed either by `"<template> <slot>"` or by `"<slot>"`; the
//! template-qualified key wins. An entry may name another entry in `inherit`
//! (`"<slot>"` or `"<template> <slot>"`) to take every option it does not set
//! itself.

use crate::settings::CmsSettings;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Options for one placeholder slot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaceholderConf {
	/// Display name used by the edit toolbar
	pub name: Option<String>,
	/// Fall back to other languages when the slot is empty
	pub language_fallback: Option<bool>,
	/// Context merged into the render context for keys it does not yet have
	pub extra_context: Option<Map<String, Value>>,
	/// Plugin types allowed in the slot
	pub plugins: Option<Vec<String>>,
	/// Toolbar module per plugin type
	pub plugin_modules: Option<IndexMap<String, String>>,
	/// Toolbar label per plugin type
	pub plugin_labels: Option<IndexMap<String, String>>,
	/// Allowed child plugin types per parent plugin type
	pub child_classes: Option<IndexMap<String, Vec<String>>>,
	/// Allowed parent plugin types per child plugin type
	pub parent_classes: Option<IndexMap<String, Vec<String>>>,
	/// Key of another entry to inherit options from
	pub inherit: Option<String>,
}

impl CmsSettings {
	/// Resolve one placeholder option for `slot`, optionally within `template`
	///
	/// # Examples
	///
	/// ```
	/// use trellis_conf::{CmsSettings, PlaceholderConf};
	///
	/// let mut settings = CmsSettings::default();
	/// settings.placeholder_conf.insert(
	///     "main".to_string(),
	///     PlaceholderConf { name: Some("Main content".to_string()), ..Default::default() },
	/// );
	/// settings.placeholder_conf.insert(
	///     "home.html main".to_string(),
	///     PlaceholderConf { language_fallback: Some(true), ..Default::default() },
	/// );
	///
	/// assert_eq!(settings.placeholder_name(Some("main"), Some("home.html")), Some("Main content"));
	/// assert!(settings.language_fallback(Some("main"), Some("home.html")));
	/// assert!(!settings.language_fallback(Some("main"), None));
	/// ```
	pub fn placeholder_option<'a, T: ?Sized>(
		&'a self,
		slot: Option<&str>,
		template: Option<&str>,
		pick: fn(&PlaceholderConf) -> Option<&T>,
	) -> Option<&'a T> {
		let mut visited = Vec::new();
		self.lookup_placeholder_option(slot?, template, pick, &mut visited)
	}

	fn lookup_placeholder_option<'a, T: ?Sized>(
		&'a self,
		slot: &str,
		template: Option<&str>,
		pick: fn(&PlaceholderConf) -> Option<&T>,
		visited: &mut Vec<String>,
	) -> Option<&'a T> {
		let mut keys = Vec::with_capacity(2);
		if let Some(template) = template {
			keys.push(format!("{template} {slot}"));
		}
		keys.push(slot.to_string());

		for key in keys {
			if visited.contains(&key) {
				tracing::warn!(key = %key, "placeholder configuration inherits from itself");
				continue;
			}
			let Some(conf) = self.placeholder_conf.get(&key) else {
				continue;
			};
			visited.push(key);

			if let Some(value) = pick(conf) {
				return Some(value);
			}
			if let Some(inherit) = conf.inherit.as_deref() {
				let (parent_template, parent_slot) = match inherit.split_once(' ') {
					Some((template, slot)) => (Some(template), slot),
					None => (None, inherit),
				};
				if let Some(value) =
					self.lookup_placeholder_option(parent_slot, parent_template, pick, visited)
				{
					return Some(value);
				}
			}
		}
		None
	}

	/// Whether empty slots fall back to other languages (default `false`)
	pub fn language_fallback(&self, slot: Option<&str>, template: Option<&str>) -> bool {
		self.placeholder_option(slot, template, |c| c.language_fallback.as_ref())
			.copied()
			.unwrap_or(false)
	}

	/// Configured display name of a slot
	pub fn placeholder_name(&self, slot: Option<&str>, template: Option<&str>) -> Option<&str> {
		self.placeholder_option(slot, template, |c| c.name.as_deref())
	}

	/// Extra render context of a slot
	pub fn extra_context(
		&self,
		slot: Option<&str>,
		template: Option<&str>,
	) -> Option<&Map<String, Value>> {
		self.placeholder_option(slot, template, |c| c.extra_context.as_ref())
	}

	/// Plugin types allowed in a slot (`None` means unrestricted)
	pub fn allowed_plugins(&self, slot: Option<&str>, template: Option<&str>) -> Option<&[String]> {
		self.placeholder_option(slot, template, |c| c.plugins.as_deref())
	}

	/// Toolbar modules per plugin type
	pub fn plugin_modules(
		&self,
		slot: Option<&str>,
		template: Option<&str>,
	) -> Option<&IndexMap<String, String>> {
		self.placeholder_option(slot, template, |c| c.plugin_modules.as_ref())
	}

	/// Toolbar labels per plugin type
	pub fn plugin_labels(
		&self,
		slot: Option<&str>,
		template: Option<&str>,
	) -> Option<&IndexMap<String, String>> {
		self.placeholder_option(slot, template, |c| c.plugin_labels.as_ref())
	}

	/// Allowed children per plugin type
	pub fn child_classes(
		&self,
		slot: Option<&str>,
		template: Option<&str>,
	) -> Option<&IndexMap<String, Vec<String>>> {
		self.placeholder_option(slot, template, |c| c.child_classes.as_ref())
	}

	/// Allowed parents per plugin type
	pub fn parent_classes(
		&self,
		slot: Option<&str>,
		template: Option<&str>,
	) -> Option<&IndexMap<String, Vec<String>>> {
		self.placeholder_option(slot, template, |c| c.parent_classes.as_ref())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::*;
	use serde_json::json;

	#[fixture]
	fn settings() -> CmsSettings {
		let mut settings = CmsSettings::default();
		settings.placeholder_conf.insert(
			"sidebar".to_string(),
			PlaceholderConf {
				name: Some("Sidebar".to_string()),
				plugins: Some(vec!["TextPlugin".to_string()]),
				extra_context: json!({"width": 250}).as_object().cloned(),
				..Default::default()
			},
		);
		settings.placeholder_conf.insert(
			"article.html sidebar".to_string(),
			PlaceholderConf {
				name: Some("Article sidebar".to_string()),
				..Default::default()
			},
		);
		settings.placeholder_conf.insert(
			"footer".to_string(),
			PlaceholderConf {
				inherit: Some("article.html sidebar".to_string()),
				..Default::default()
			},
		);
		settings.placeholder_conf.insert(
			"loop".to_string(),
			PlaceholderConf {
				inherit: Some("loop".to_string()),
				..Default::default()
			},
		);
		settings
	}

	#[rstest]
	#[case(Some("article.html"), Some("Article sidebar"))]
	#[case(Some("home.html"), Some("Sidebar"))]
	#[case(None, Some("Sidebar"))]
	fn test_template_key_wins(
		settings: CmsSettings,
		#[case] template: Option<&str>,
		#[case] expected: Option<&str>,
	) {
		assert_eq!(settings.placeholder_name(Some("sidebar"), template), expected);
	}

	#[rstest]
	fn test_template_key_falls_through_to_slot_key(settings: CmsSettings) {
		// Arrange / Act
		let plugins = settings.allowed_plugins(Some("sidebar"), Some("article.html"));

		// Assert
		assert_eq!(plugins, Some(&["TextPlugin".to_string()][..]));
	}

	#[rstest]
	fn test_inherit_follows_template_qualified_key(settings: CmsSettings) {
		// Act
		let name = settings.placeholder_name(Some("footer"), None);
		let context = settings.extra_context(Some("footer"), None);

		// Assert
		assert_eq!(name, Some("Article sidebar"));
		assert_eq!(context.and_then(|c| c.get("width")), Some(&json!(250)));
	}

	#[rstest]
	fn test_self_inheritance_terminates(settings: CmsSettings) {
		assert_eq!(settings.placeholder_name(Some("loop"), None), None);
	}

	#[rstest]
	fn test_unknown_slot(settings: CmsSettings) {
		assert!(!settings.language_fallback(Some("unknown"), None));
		assert_eq!(settings.placeholder_name(None, None), None);
	}
}
