//! Placeholder rendering

use super::context::RenderContext;
use super::processors::RenderProcessors;
use super::renderer::Renderer;
use super::safe::SafeString;
use crate::error::CmsResult;
use crate::ids::PlaceholderId;
use crate::models::CmsPlugin;
use crate::store::CmsStore;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

impl Renderer {
	/// Render every root plugin of a placeholder in `lang`
	///
	/// `lang` defaults to the request language. An empty placeholder whose
	/// slot enables `language_fallback` takes the first non-empty set among
	/// the fallback languages. In edit mode the toolbar bar and draggables are
	/// rendered as well. The caller's context is left as it was found, whether
	/// rendering succeeds or not.
	pub fn render_placeholder(
		&self,
		store: &mut CmsStore,
		placeholder: Option<PlaceholderId>,
		context: &mut RenderContext,
		name_fallback: &str,
		lang: Option<&str>,
	) -> CmsResult<SafeString> {
		context.scoped(|context| {
			self.render_placeholder_scoped(store, placeholder, context, name_fallback, lang)
		})
	}

	fn render_placeholder_scoped(
		&self,
		store: &mut CmsStore,
		placeholder_id: Option<PlaceholderId>,
		context: &mut RenderContext,
		name_fallback: &str,
		lang: Option<&str>,
	) -> CmsResult<SafeString> {
		let settings = Arc::clone(store.settings());
		let placeholder = placeholder_id
			.map(|id| store.get_placeholder(id).cloned())
			.transpose()?;
		let page = placeholder
			.as_ref()
			.and_then(|placeholder| placeholder.page_id)
			.and_then(|page| store.page(page))
			.cloned();
		let template = page.as_ref().map(|page| page.template.as_str());
		let slot = placeholder.as_ref().map(|placeholder| placeholder.slot.as_str());
		let language = lang
			.map(str::to_string)
			.unwrap_or_else(|| context.request().language.clone());

		let mut plugins: Vec<CmsPlugin> = match &placeholder {
			Some(placeholder) => store.root_plugins(placeholder.id, &language),
			None => Vec::new(),
		};
		if plugins.is_empty()
			&& let Some(placeholder) = &placeholder
			&& settings.language_fallback(slot, template)
		{
			let site = context.request().site_id;
			for fallback in settings.fallback_languages(&language, site) {
				plugins = store.root_plugins(placeholder.id, fallback);
				if !plugins.is_empty() {
					debug!(slot = %placeholder.slot, language = %language, fallback = %fallback, "using fallback language");
					break;
				}
			}
		}

		if let Some(extra) = settings.extra_context(slot, template) {
			for (key, value) in extra {
				if !context.contains_key(key) {
					context.insert(key.clone(), value.clone());
				}
			}
		}

		let edit = self.can_edit(store, context, page.as_ref());
		let call_site = if edit {
			RenderProcessors::frontend_edit(Arc::clone(&self.engine))
		} else {
			RenderProcessors::default()
		};

		let content: SafeString = self
			.render_plugins(store, &mut plugins, context, placeholder.as_ref(), &call_site)?
			.into_iter()
			.collect();

		let (bar, draggables) = if edit {
			let bar = self.render_placeholder_toolbar(store, placeholder_id, context, name_fallback)?;
			let draggables = self.render_draggables(&plugins, slot, context)?;
			(bar, draggables)
		} else {
			(SafeString::default(), SafeString::default())
		};

		let output = self.engine.render_value(
			"cms/toolbar/placeholder.html",
			&json!({
				"plugins": content,
				"bar": bar,
				"draggables": draggables,
				"edit": edit,
			}),
		)?;
		Ok(SafeString::new(output))
	}

	/// Render the drag handles of `plugins`
	pub fn render_draggables(
		&self,
		plugins: &[CmsPlugin],
		slot: Option<&str>,
		context: &RenderContext,
	) -> CmsResult<SafeString> {
		let output = self.engine.render_value(
			"cms/toolbar/draggable.html",
			&json!({
				"plugins": plugins,
				"slot": slot,
				"request": context.request().to_value(),
			}),
		)?;
		Ok(SafeString::new(output))
	}
}
