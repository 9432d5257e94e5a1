//! Plugin renderer

use super::context::{RenderContext, build_plugin_context};
use super::pool::PluginPool;
use super::processors::{ProcessorRegistry, RenderProcessors, mark_safe};
use super::safe::SafeString;
use super::templates::TemplateEngine;
use crate::error::CmsResult;
use crate::models::{CmsPlugin, Page, Placeholder, RenderMeta};
use crate::permissions::{DefaultPermissionPolicy, PermissionPolicy};
use crate::store::CmsStore;
use serde_json::{Value, json};
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use trellis_conf::CmsSettings;

/// Renders plugins and placeholders
///
/// Holds the template engine, the plugin pool, the processors resolved from
/// the settings and the permission policy deciding edit mode.
#[derive(Clone)]
pub struct Renderer {
	pub(super) engine: Arc<TemplateEngine>,
	pub(super) pool: Arc<PluginPool>,
	pub(super) processors: RenderProcessors,
	pub(super) policy: Arc<dyn PermissionPolicy>,
}

impl Renderer {
	/// Renderer without configured processors
	///
	/// `plugin_context_processors` and `plugin_processors` from the settings
	/// are not applied, not even those of the store being rendered. Use
	/// [`from_settings`](Self::from_settings) to run them.
	pub fn new(engine: Arc<TemplateEngine>, pool: Arc<PluginPool>) -> Self {
		Self {
			engine,
			pool,
			processors: RenderProcessors::default(),
			policy: Arc::new(DefaultPermissionPolicy),
		}
	}

	/// Renderer with the processors named in `settings`
	pub fn from_settings(
		engine: Arc<TemplateEngine>,
		pool: Arc<PluginPool>,
		registry: &ProcessorRegistry,
		settings: &CmsSettings,
	) -> CmsResult<Self> {
		Ok(Self::new(engine, pool).with_processors(registry.resolve(settings)?))
	}

	/// Replace the configured processors
	pub fn with_processors(mut self, processors: RenderProcessors) -> Self {
		self.processors = processors;
		self
	}

	/// Replace the permission policy
	pub fn with_policy<P: PermissionPolicy + 'static>(mut self, policy: P) -> Self {
		self.policy = Arc::new(policy);
		self
	}

	/// Template engine
	pub fn engine(&self) -> &Arc<TemplateEngine> {
		&self.engine
	}

	/// Plugin pool
	pub fn pool(&self) -> &Arc<PluginPool> {
		&self.pool
	}

	/// Render a batch of plugins in order
	///
	/// Sets each plugin's `render_meta` and renders it in its own context
	/// scope.
	pub fn render_plugins(
		&self,
		store: &CmsStore,
		plugins: &mut [CmsPlugin],
		context: &mut RenderContext,
		placeholder: Option<&Placeholder>,
		call_site: &RenderProcessors,
	) -> CmsResult<Vec<SafeString>> {
		let total = plugins.len();
		let mut out = Vec::with_capacity(total);
		for (index, plugin) in plugins.iter_mut().enumerate() {
			plugin.render_meta = RenderMeta { index, total };
			let rendered = context
				.scoped(|context| self.render_plugin(store, plugin, context, placeholder, call_site))?;
			out.push(rendered);
		}
		Ok(out)
	}

	/// Render one plugin in the current scope of `context`
	///
	/// Unknown plugin types render nothing, unless `call_site` carries the
	/// edit-mode processors, which then still run over an empty body.
	pub fn render_plugin(
		&self,
		store: &CmsStore,
		instance: &CmsPlugin,
		context: &mut RenderContext,
		placeholder: Option<&Placeholder>,
		call_site: &RenderProcessors,
	) -> CmsResult<SafeString> {
		let page = placeholder
			.and_then(|placeholder| placeholder.page_id)
			.and_then(|page| store.page(page));

		let Some(kind) = self.pool.get(&instance.plugin_type).cloned() else {
			debug!(plugin = %instance.id, plugin_type = %instance.plugin_type, "unknown plugin type");
			if !call_site.frontend_edit {
				return Ok(SafeString::default());
			}
			build_plugin_context(
				context,
				instance,
				placeholder,
				&self.processors.context,
				&call_site.context,
			)?;
			return self.process_content(instance, placeholder, String::new(), context, call_site);
		};

		build_plugin_context(
			context,
			instance,
			placeholder,
			&self.processors.context,
			&call_site.context,
		)?;
		let values = kind.render(context, instance, placeholder)?;
		context.update(values);

		let slot = placeholder.map(|placeholder| placeholder.slot.as_str());
		let child_classes = self
			.pool
			.child_classes(store.settings(), slot, page, kind.as_ref());
		context.insert("allowed_child_classes", json!(child_classes));
		if kind.allow_children() {
			let children = self.render_children(store, instance, context, placeholder, call_site)?;
			context.insert("children", Value::from(children));
		}

		let content = match kind.render_template(instance) {
			Some(template) => self.engine.render_template(&template, context)?,
			None => {
				debug!(plugin_type = %instance.plugin_type, "plugin kind has no template");
				String::new()
			}
		};
		self.process_content(instance, placeholder, content, context, call_site)
	}

	fn render_children(
		&self,
		store: &CmsStore,
		instance: &CmsPlugin,
		context: &mut RenderContext,
		placeholder: Option<&Placeholder>,
		call_site: &RenderProcessors,
	) -> CmsResult<Vec<String>> {
		let mut children: Vec<CmsPlugin> = store
			.child_plugins(instance.id)
			.into_iter()
			.cloned()
			.collect();
		let rendered = self.render_plugins(store, &mut children, context, placeholder, call_site)?;
		Ok(rendered.into_iter().map(SafeString::into_string).collect())
	}

	/// Configured processors, then call-site processors, then [`mark_safe`]
	fn process_content(
		&self,
		instance: &CmsPlugin,
		placeholder: Option<&Placeholder>,
		content: String,
		context: &RenderContext,
		call_site: &RenderProcessors,
	) -> CmsResult<SafeString> {
		let content = self
			.processors
			.content
			.iter()
			.chain(&call_site.content)
			.try_fold(content, |content, processor| {
				processor(instance, placeholder, content, context)
			})?;
		Ok(mark_safe(content))
	}

	/// Whether the request may edit `page` (or a page-less placeholder)
	pub(super) fn can_edit(&self, store: &CmsStore, context: &RenderContext, page: Option<&Page>) -> bool {
		let request = context.request();
		request.edit_mode()
			&& page.is_none_or(|page| {
				self.policy
					.has_change_permission(store, request.user.as_ref(), page)
			})
	}
}

impl fmt::Debug for Renderer {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Renderer")
			.field("engine", &self.engine)
			.field("pool", &self.pool)
			.field("processors", &self.processors)
			.finish_non_exhaustive()
	}
}
