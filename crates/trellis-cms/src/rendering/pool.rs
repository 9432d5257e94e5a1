//! Registry of plugin kinds

use super::plugin::PluginKind;
use crate::error::{CmsError, CmsResult};
use crate::models::Page;
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use trellis_conf::CmsSettings;

/// One entry of the toolbar "add plugin" menu
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolbarPluginEntry {
	/// Plugin type name
	pub value: String,
	/// Menu label
	pub name: String,
	/// Menu group
	pub module: String,
}

/// Registered plugin kinds, keyed by type name
#[derive(Default, Clone)]
pub struct PluginPool {
	plugins: IndexMap<String, Arc<dyn PluginKind>>,
}

impl PluginPool {
	/// Empty pool
	pub fn new() -> Self {
		Self::default()
	}

	/// Register a plugin kind
	pub fn register<K: PluginKind + 'static>(&mut self, kind: K) -> CmsResult<()> {
		let name = kind.name().to_string();
		if self.plugins.contains_key(&name) {
			return Err(CmsError::PluginAlreadyRegistered(name));
		}
		debug!(plugin = %name, "registering plugin kind");
		self.plugins.insert(name, Arc::new(kind));
		Ok(())
	}

	/// Remove a plugin kind
	pub fn unregister(&mut self, name: &str) -> Option<Arc<dyn PluginKind>> {
		self.plugins.shift_remove(name)
	}

	/// Kind registered under `name`
	pub fn get(&self, name: &str) -> Option<&Arc<dyn PluginKind>> {
		self.plugins.get(name)
	}

	/// Number of registered kinds
	pub fn len(&self) -> usize {
		self.plugins.len()
	}

	/// Whether no kind is registered
	pub fn is_empty(&self) -> bool {
		self.plugins.is_empty()
	}

	/// Kinds that may be added to `slot`, sorted by module then label
	///
	/// Kinds requiring a parent are never offered at the top level, and a slot
	/// with a `plugins` restriction only offers the listed kinds. Without a
	/// slot and without a page, every registered kind is returned.
	pub fn get_all_plugins(
		&self,
		settings: &CmsSettings,
		slot: Option<&str>,
		page: Option<&Page>,
		include_page_only: bool,
	) -> Vec<Arc<dyn PluginKind>> {
		let template = page.map(|page| page.template.as_str());
		let allowed = settings.allowed_plugins(slot, template).unwrap_or_default();

		let mut plugins: Vec<Arc<dyn PluginKind>> = self.plugins.values().cloned().collect();
		plugins.sort_by(|a, b| a.label().cmp(b.label()));

		let selected: Vec<Arc<dyn PluginKind>> = plugins
			.iter()
			.filter(|kind| {
				let offered = slot.is_some()
					&& !kind.require_parent()
					&& (allowed.is_empty() || allowed.iter().any(|name| name == kind.name()));
				offered && (include_page_only || !kind.page_only())
			})
			.cloned()
			.collect();
		if !selected.is_empty() || page.is_some() {
			plugins = selected;
		}
		plugins.sort_by(|a, b| a.module().cmp(b.module()));
		plugins
	}

	/// Toolbar menu entries for `plugins`, sorted by module
	///
	/// Without `parent`, kinds restricted to specific parents are skipped;
	/// with `parent`, kinds that may not be nested in it are skipped. Module
	/// and label overrides come from the slot configuration.
	pub fn toolbar_plugin_struct(
		&self,
		plugins: &[Arc<dyn PluginKind>],
		settings: &CmsSettings,
		slot: Option<&str>,
		page: Option<&Page>,
		parent: Option<&str>,
	) -> Vec<ToolbarPluginEntry> {
		let template = page.map(|page| page.template.as_str());
		let modules = settings.plugin_modules(slot, template);
		let labels = settings.plugin_labels(slot, template);

		let mut entries: Vec<ToolbarPluginEntry> = plugins
			.iter()
			.filter(|kind| {
				let allowed_parents = self.parent_classes(settings, slot, template, kind.as_ref());
				match parent {
					Some(parent) => {
						allowed_parents.is_empty() || allowed_parents.iter().any(|name| name == parent)
					}
					None => allowed_parents.is_empty(),
				}
			})
			.map(|kind| {
				let value = kind.name().to_string();
				let module = modules
					.and_then(|modules| modules.get(&value))
					.map_or_else(|| kind.module().to_string(), Clone::clone);
				let name = labels
					.and_then(|labels| labels.get(&value))
					.map_or_else(|| kind.label().to_string(), Clone::clone);
				ToolbarPluginEntry {
					value,
					name,
					module,
				}
			})
			.collect();
		entries.sort_by(|a, b| a.module.cmp(&b.module));
		entries
	}

	/// Plugin types that may be nested in `kind` within `slot`
	///
	/// Slot configuration wins over the kind's own declaration; without
	/// either, every kind offered in the slot is allowed.
	pub fn child_classes(
		&self,
		settings: &CmsSettings,
		slot: Option<&str>,
		page: Option<&Page>,
		kind: &dyn PluginKind,
	) -> Vec<String> {
		let template = page.map(|page| page.template.as_str());
		if let Some(classes) = settings
			.child_classes(slot, template)
			.and_then(|classes| classes.get(kind.name()))
		{
			return classes.clone();
		}
		if let Some(classes) = kind.child_classes() {
			return classes;
		}
		self.get_all_plugins(settings, slot, page, true)
			.iter()
			.map(|kind| kind.name().to_string())
			.collect()
	}

	/// Plugin types `kind` may be nested in within `slot`; empty means any
	pub fn parent_classes(
		&self,
		settings: &CmsSettings,
		slot: Option<&str>,
		template: Option<&str>,
		kind: &dyn PluginKind,
	) -> Vec<String> {
		settings
			.parent_classes(slot, template)
			.and_then(|classes| classes.get(kind.name()))
			.cloned()
			.or_else(|| kind.parent_classes())
			.unwrap_or_default()
	}
}

impl fmt::Debug for PluginPool {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("PluginPool")
			.field("plugins", &self.plugins.keys().collect::<Vec<_>>())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::models::CmsPlugin;
	use crate::rendering::PluginTemplate;
	use rstest::*;
	use trellis_conf::PlaceholderConf;

	struct Kind {
		name: &'static str,
		module: &'static str,
		require_parent: bool,
		parents: Option<Vec<String>>,
		page_only: bool,
	}

	impl Kind {
		fn new(name: &'static str, module: &'static str) -> Self {
			Self {
				name,
				module,
				require_parent: false,
				parents: None,
				page_only: false,
			}
		}
	}

	impl PluginKind for Kind {
		fn name(&self) -> &str {
			self.name
		}

		fn module(&self) -> &str {
			self.module
		}

		fn render_template(&self, _instance: &CmsPlugin) -> Option<PluginTemplate> {
			None
		}

		fn require_parent(&self) -> bool {
			self.require_parent
		}

		fn parent_classes(&self) -> Option<Vec<String>> {
			self.parents.clone()
		}

		fn page_only(&self) -> bool {
			self.page_only
		}
	}

	#[fixture]
	fn pool() -> PluginPool {
		let mut pool = PluginPool::new();
		pool.register(Kind::new("TextPlugin", "Generic")).unwrap();
		pool.register(Kind::new("PicturePlugin", "Media")).unwrap();
		pool.register(Kind::new("LinkPlugin", "Generic")).unwrap();
		pool.register(Kind {
			require_parent: true,
			parents: Some(vec!["RowPlugin".to_string()]),
			..Kind::new("ColumnPlugin", "Layout")
		})
		.unwrap();
		pool.register(Kind {
			page_only: true,
			..Kind::new("TeaserPlugin", "Generic")
		})
		.unwrap();
		pool
	}

	fn names(plugins: &[Arc<dyn PluginKind>]) -> Vec<&str> {
		plugins.iter().map(|kind| kind.name()).collect()
	}

	#[rstest]
	fn test_duplicate_registration_fails(mut pool: PluginPool) {
		// Act
		let result = pool.register(Kind::new("TextPlugin", "Other"));

		// Assert
		assert!(matches!(result, Err(CmsError::PluginAlreadyRegistered(name)) if name == "TextPlugin"));
	}

	#[rstest]
	fn test_slot_offers_top_level_kinds_by_module(pool: PluginPool) {
		// Act
		let plugins = pool.get_all_plugins(&CmsSettings::default(), Some("content"), None, true);

		// Assert
		assert_eq!(
			names(&plugins),
			vec!["LinkPlugin", "TeaserPlugin", "TextPlugin", "PicturePlugin"]
		);
	}

	#[rstest]
	fn test_slot_restriction_and_page_only(pool: PluginPool) {
		// Arrange
		let mut settings = CmsSettings::default();
		settings.placeholder_conf.insert(
			"sidebar".to_string(),
			PlaceholderConf {
				plugins: Some(vec!["TeaserPlugin".to_string(), "PicturePlugin".to_string()]),
				..PlaceholderConf::default()
			},
		);

		// Act
		let with_page_only = pool.get_all_plugins(&settings, Some("sidebar"), None, true);
		let without_page_only = pool.get_all_plugins(&settings, Some("sidebar"), None, false);

		// Assert
		assert_eq!(names(&with_page_only), vec!["TeaserPlugin", "PicturePlugin"]);
		assert_eq!(names(&without_page_only), vec!["PicturePlugin"]);
	}

	#[rstest]
	fn test_toolbar_struct_applies_overrides(pool: PluginPool) {
		// Arrange
		let mut settings = CmsSettings::default();
		let mut modules = IndexMap::new();
		modules.insert("TextPlugin".to_string(), "Basics".to_string());
		let mut labels = IndexMap::new();
		labels.insert("TextPlugin".to_string(), "Rich text".to_string());
		settings.placeholder_conf.insert(
			"content".to_string(),
			PlaceholderConf {
				plugin_modules: Some(modules),
				plugin_labels: Some(labels),
				..PlaceholderConf::default()
			},
		);
		let all: Vec<_> = ["TextPlugin", "ColumnPlugin"]
			.iter()
			.filter_map(|name| pool.get(name).cloned())
			.collect();

		// Act
		let entries = pool.toolbar_plugin_struct(&all, &settings, Some("content"), None, None);
		let nested = pool.toolbar_plugin_struct(&all, &settings, Some("content"), None, Some("RowPlugin"));

		// Assert
		assert_eq!(
			entries,
			vec![ToolbarPluginEntry {
				value: "TextPlugin".to_string(),
				name: "Rich text".to_string(),
				module: "Basics".to_string(),
			}]
		);
		assert_eq!(nested.len(), 2);
	}

	#[rstest]
	fn test_child_classes_prefers_slot_conf(pool: PluginPool) {
		// Arrange
		let mut settings = CmsSettings::default();
		let mut children = IndexMap::new();
		children.insert("TextPlugin".to_string(), vec!["LinkPlugin".to_string()]);
		settings.placeholder_conf.insert(
			"content".to_string(),
			PlaceholderConf {
				child_classes: Some(children),
				..PlaceholderConf::default()
			},
		);
		let text = pool.get("TextPlugin").unwrap().clone();
		let picture = pool.get("PicturePlugin").unwrap().clone();

		// Act
		let configured = pool.child_classes(&settings, Some("content"), None, text.as_ref());
		let fallback = pool.child_classes(&settings, Some("content"), None, picture.as_ref());

		// Assert
		assert_eq!(configured, vec!["LinkPlugin"]);
		assert_eq!(fallback.len(), 4);
	}
}
