//! Plugin kinds

use super::context::RenderContext;
use super::templates::ParsedTemplate;
use crate::error::CmsResult;
use crate::models::{CmsPlugin, Placeholder};
use serde_json::{Map, Value};

/// Template a plugin kind renders with
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginTemplate {
	/// Template registered with the engine under this name
	Named(String),
	/// Template compiled from source
	Parsed(ParsedTemplate),
}

impl From<&str> for PluginTemplate {
	fn from(name: &str) -> Self {
		Self::Named(name.to_string())
	}
}

impl From<ParsedTemplate> for PluginTemplate {
	fn from(parsed: ParsedTemplate) -> Self {
		Self::Parsed(parsed)
	}
}

/// Behaviour of one plugin type
///
/// Only [`name`](Self::name) and [`render_template`](Self::render_template)
/// are required.
///
/// # Examples
///
/// ```
/// use trellis_cms::models::CmsPlugin;
/// use trellis_cms::rendering::{PluginKind, PluginTemplate};
///
/// struct TextPlugin;
///
/// impl PluginKind for TextPlugin {
///     fn name(&self) -> &str {
///         "TextPlugin"
///     }
///
///     fn render_template(&self, _instance: &CmsPlugin) -> Option<PluginTemplate> {
///         Some(PluginTemplate::from("plugins/text.html"))
///     }
/// }
/// ```
pub trait PluginKind: Send + Sync {
	/// Type name stored in [`CmsPlugin::plugin_type`]
	fn name(&self) -> &str;

	/// Human readable name
	fn label(&self) -> &str {
		self.name()
	}

	/// Toolbar menu group
	fn module(&self) -> &str {
		"Generic"
	}

	/// Template for `instance`; `None` renders nothing
	fn render_template(&self, instance: &CmsPlugin) -> Option<PluginTemplate>;

	/// Variables for the plugin template
	///
	/// Defaults to the instance payload as `instance` and the placeholder as
	/// `placeholder`.
	fn render(
		&self,
		_context: &RenderContext,
		instance: &CmsPlugin,
		placeholder: Option<&Placeholder>,
	) -> CmsResult<Map<String, Value>> {
		let mut values = Map::new();
		values.insert("instance".to_string(), serde_json::to_value(instance)?);
		values.insert("placeholder".to_string(), serde_json::to_value(placeholder)?);
		Ok(values)
	}

	/// Can only be added inside another plugin
	fn require_parent(&self) -> bool {
		false
	}

	/// Plugin types this one may be nested in
	fn parent_classes(&self) -> Option<Vec<String>> {
		None
	}

	/// Plugin types that may be nested in this one
	fn child_classes(&self) -> Option<Vec<String>> {
		None
	}

	/// Accepts nested plugins
	fn allow_children(&self) -> bool {
		false
	}

	/// Only offered in placeholders that belong to a page
	fn page_only(&self) -> bool {
		false
	}
}
