//! Plugin context and content processors
//!
//! Context processors contribute variables to a plugin's render scope; content
//! processors rewrite its rendered output. Processors named in the settings
//! are resolved through a [`ProcessorRegistry`].

use super::context::RenderContext;
use super::safe::SafeString;
use super::templates::TemplateEngine;
use crate::error::{CmsError, CmsResult};
use crate::models::{CmsPlugin, Placeholder};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde_json::{Map, Value, json};
use std::fmt;
use std::sync::Arc;
use tracing::warn;
use trellis_conf::CmsSettings;

/// Contributes variables to a plugin's render scope
pub type ContextProcessor = Arc<
	dyn Fn(&CmsPlugin, Option<&Placeholder>, &RenderContext) -> CmsResult<Map<String, Value>>
		+ Send
		+ Sync,
>;

/// Rewrites a plugin's rendered output
pub type ContentProcessor = Arc<
	dyn Fn(&CmsPlugin, Option<&Placeholder>, String, &RenderContext) -> CmsResult<String>
		+ Send
		+ Sync,
>;

/// Context processors run before any configured one
pub static DEFAULT_PLUGIN_CONTEXT_PROCESSORS: Lazy<Vec<ContextProcessor>> =
	Lazy::new(|| vec![Arc::new(plugin_meta_context_processor) as ContextProcessor]);

/// Position of the plugin within its batch, exposed as `plugin`
///
/// ```text
/// plugin.counter / counter0      1-based / 0-based index
/// plugin.revcounter / revcounter0  distance from the end
/// plugin.first / last / total
/// plugin.id / instance / placeholder
/// ```
pub fn plugin_meta_context_processor(
	instance: &CmsPlugin,
	placeholder: Option<&Placeholder>,
	context: &RenderContext,
) -> CmsResult<Map<String, Value>> {
	let index = instance.render_meta.index;
	let total = instance.render_meta.total;
	let mut values = Map::new();
	values.insert(
		"plugin_index".to_string(),
		context.get("plugin_index").cloned().unwrap_or(json!(0)),
	);
	values.insert(
		"plugin".to_string(),
		json!({
			"counter": index + 1,
			"counter0": index,
			"revcounter": total.saturating_sub(index),
			"revcounter0": total.saturating_sub(index + 1),
			"first": index == 0,
			"last": index + 1 == total,
			"total": total,
			"id": instance.id,
			"instance": serde_json::to_value(instance)?,
			"placeholder": serde_json::to_value(placeholder)?,
		}),
	);
	Ok(values)
}

/// Final content step: the output is trusted markup from here on
pub fn mark_safe(content: String) -> SafeString {
	SafeString::new(content)
}

/// Content processor wrapping each plugin in its edit-mode frame
///
/// Renders `cms/toolbar/plugin.html` with the plugin, its output and the
/// `allowed_child_classes` of the current scope.
pub fn toolbar_plugin_processor(engine: Arc<TemplateEngine>) -> ContentProcessor {
	Arc::new(
		move |instance: &CmsPlugin,
		      _placeholder: Option<&Placeholder>,
		      content: String,
		      context: &RenderContext| {
			let child_classes = context
				.get("allowed_child_classes")
				.cloned()
				.unwrap_or_else(|| json!([]));
			let values = json!({
				"instance": instance,
				"rendered_content": content,
				"child_plugin_classes": child_classes,
				"request": context.request().to_value(),
			});
			engine.render_value("cms/toolbar/plugin.html", &values)
		},
	)
}

/// Processors applied on top of the built-in ones
#[derive(Clone, Default)]
pub struct RenderProcessors {
	/// Context processors
	pub context: Vec<ContextProcessor>,
	/// Content processors
	pub content: Vec<ContentProcessor>,
	/// `content` holds the edit-mode toolbar processor
	pub frontend_edit: bool,
}

impl RenderProcessors {
	/// No processors
	pub fn new() -> Self {
		Self::default()
	}

	/// Call-site processors used in edit mode
	pub fn frontend_edit(engine: Arc<TemplateEngine>) -> Self {
		Self {
			context: Vec::new(),
			content: vec![toolbar_plugin_processor(engine)],
			frontend_edit: true,
		}
	}

	/// Add a context processor
	pub fn with_context<F>(mut self, processor: F) -> Self
	where
		F: Fn(&CmsPlugin, Option<&Placeholder>, &RenderContext) -> CmsResult<Map<String, Value>>
			+ Send
			+ Sync
			+ 'static,
	{
		self.context.push(Arc::new(processor));
		self
	}

	/// Add a content processor
	pub fn with_content<F>(mut self, processor: F) -> Self
	where
		F: Fn(&CmsPlugin, Option<&Placeholder>, String, &RenderContext) -> CmsResult<String>
			+ Send
			+ Sync
			+ 'static,
	{
		self.content.push(Arc::new(processor));
		self
	}

	/// Whether no processor is set
	pub fn is_empty(&self) -> bool {
		self.context.is_empty() && self.content.is_empty()
	}
}

impl fmt::Debug for RenderProcessors {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RenderProcessors")
			.field("context", &self.context.len())
			.field("content", &self.content.len())
			.field("frontend_edit", &self.frontend_edit)
			.finish()
	}
}

/// Named processors available to the settings
#[derive(Clone, Default)]
pub struct ProcessorRegistry {
	context: IndexMap<String, ContextProcessor>,
	content: IndexMap<String, ContentProcessor>,
}

impl ProcessorRegistry {
	/// Empty registry
	pub fn new() -> Self {
		Self::default()
	}

	/// Register a context processor under `name`, replacing any previous one
	pub fn register_context<F>(&mut self, name: impl Into<String>, processor: F)
	where
		F: Fn(&CmsPlugin, Option<&Placeholder>, &RenderContext) -> CmsResult<Map<String, Value>>
			+ Send
			+ Sync
			+ 'static,
	{
		self.context.insert(name.into(), Arc::new(processor));
	}

	/// Register a content processor under `name`, replacing any previous one
	pub fn register_content<F>(&mut self, name: impl Into<String>, processor: F)
	where
		F: Fn(&CmsPlugin, Option<&Placeholder>, String, &RenderContext) -> CmsResult<String>
			+ Send
			+ Sync
			+ 'static,
	{
		self.content.insert(name.into(), Arc::new(processor));
	}

	/// Processors named by `plugin_context_processors` and `plugin_processors`
	///
	/// An unknown name is a configuration error.
	pub fn resolve(&self, settings: &CmsSettings) -> CmsResult<RenderProcessors> {
		let context = settings
			.plugin_context_processors
			.iter()
			.map(|name| {
				self.context.get(name).cloned().ok_or_else(|| {
					warn!(processor = %name, "unknown plugin context processor");
					CmsError::Configuration(format!("unknown plugin context processor '{name}'"))
				})
			})
			.collect::<CmsResult<Vec<_>>>()?;
		let content = settings
			.plugin_processors
			.iter()
			.map(|name| {
				self.content.get(name).cloned().ok_or_else(|| {
					warn!(processor = %name, "unknown plugin processor");
					CmsError::Configuration(format!("unknown plugin processor '{name}'"))
				})
			})
			.collect::<CmsResult<Vec<_>>>()?;
		Ok(RenderProcessors {
			context,
			content,
			frontend_edit: false,
		})
	}
}

impl fmt::Debug for ProcessorRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ProcessorRegistry")
			.field("context", &self.context.keys().collect::<Vec<_>>())
			.field("content", &self.content.keys().collect::<Vec<_>>())
			.finish()
	}
}
