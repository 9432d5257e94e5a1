//! Edit toolbar fragments

use super::context::RenderContext;
use super::renderer::Renderer;
use super::safe::SafeString;
use super::templates::title_case;
use crate::error::CmsResult;
use crate::ids::PlaceholderId;
use crate::models::{Page, Placeholder};
use crate::store::CmsStore;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::debug;

impl Renderer {
	/// Render the toolbar bar of a placeholder
	///
	/// Without a placeholder, the page's slot named `name_fallback` is used,
	/// and created when the page does not have it yet.
	pub fn render_placeholder_toolbar(
		&self,
		store: &mut CmsStore,
		placeholder: Option<PlaceholderId>,
		context: &mut RenderContext,
		name_fallback: &str,
	) -> CmsResult<SafeString> {
		let settings = Arc::clone(store.settings());
		let mut placeholder = placeholder
			.map(|id| store.get_placeholder(id).cloned())
			.transpose()?;

		let page_id = placeholder
			.as_ref()
			.and_then(|placeholder| placeholder.page_id)
			.or(context.request().current_page);
		let page: Option<Page> = page_id.and_then(|id| store.page(id)).cloned();

		if placeholder.is_none()
			&& !name_fallback.is_empty()
			&& let Some(page) = &page
		{
			placeholder = match store.placeholder_by_slot(page.id, name_fallback) {
				Some(existing) => Some(existing.clone()),
				None => {
					debug!(page = %page.id, slot = name_fallback, "creating placeholder for toolbar");
					Some(store.save(Placeholder::for_page(name_fallback, page.id))?)
				}
			};
		}

		let slot = placeholder
			.as_ref()
			.map(|placeholder| placeholder.slot.as_str())
			.or(Some(name_fallback).filter(|name| !name.is_empty()));
		let template = page.as_ref().map(|page| page.template.as_str());

		let kinds = self.pool.get_all_plugins(&settings, slot, page.as_ref(), true);
		let installed = self
			.pool
			.toolbar_plugin_struct(&kinds, &settings, slot, page.as_ref(), None);
		let allowed: Vec<&str> = kinds.iter().map(|kind| kind.name()).collect();
		let label = settings
			.placeholder_name(slot, template)
			.map(str::to_string)
			.unwrap_or_else(|| title_case(slot.unwrap_or_default()));
		let language = context.request().language.clone();

		context.scoped(|context| {
			context.insert("installed_plugins", serde_json::to_value(&installed)?);
			context.insert("allowed_plugins", json!(allowed));
			context.insert("language", Value::String(language));
			context.insert("placeholder_label", Value::String(label));
			context.insert("placeholder", serde_json::to_value(&placeholder)?);
			context.insert("page", serde_json::to_value(&page)?);
			let output = self
				.engine
				.render("cms/toolbar/placeholder_bar.html", &context.to_tera()?)?;
			Ok(SafeString::new(output))
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::models::{CmsPlugin, Title, User};
	use crate::rendering::{PluginKind, PluginPool, PluginTemplate, TemplateEngine};
	use crate::request::RenderRequest;
	use rstest::*;
	use trellis_conf::{CmsSettings, PlaceholderConf, TemplateConf};

	struct TextPlugin;

	impl PluginKind for TextPlugin {
		fn name(&self) -> &str {
			"TextPlugin"
		}

		fn label(&self) -> &str {
			"Text"
		}

		fn render_template(&self, _instance: &CmsPlugin) -> Option<PluginTemplate> {
			Some(PluginTemplate::from("text.html"))
		}
	}

	struct LinkPlugin;

	impl PluginKind for LinkPlugin {
		fn name(&self) -> &str {
			"LinkPlugin"
		}

		fn label(&self) -> &str {
			"Link"
		}

		fn module(&self) -> &str {
			"Navigation"
		}

		fn render_template(&self, _instance: &CmsPlugin) -> Option<PluginTemplate> {
			Some(PluginTemplate::from("link.html"))
		}
	}

	fn settings() -> CmsSettings {
		let mut settings = CmsSettings::default();
		settings.templates.insert(
			"page.html".to_string(),
			TemplateConf {
				placeholders: vec!["content".to_string()],
				..Default::default()
			},
		);
		settings.placeholder_conf.insert(
			"content".to_string(),
			PlaceholderConf {
				name: Some("Main content".to_string()),
				..Default::default()
			},
		);
		settings
	}

	#[fixture]
	fn renderer() -> Renderer {
		let engine = TemplateEngine::new().unwrap();
		engine.add_template("text.html", "<p>{{ instance.data.body }}</p>").unwrap();
		engine.add_template("link.html", "<a>{{ instance.data.href }}</a>").unwrap();
		let mut pool = PluginPool::new();
		pool.register(TextPlugin).unwrap();
		pool.register(LinkPlugin).unwrap();
		Renderer::new(Arc::new(engine), Arc::new(pool))
	}

	#[fixture]
	fn store() -> CmsStore {
		let mut store = CmsStore::new(settings());
		let page = store.save(Page::new(1, "page.html")).unwrap();
		store.save(Title::new(&page, "en", "Home", "home")).unwrap();
		store
	}

	fn editor_request(store: &CmsStore) -> RenderRequest {
		let page = store.pages().next().unwrap().id;
		RenderRequest::new("en")
			.with_user(User::superuser("admin"))
			.in_edit_mode()
			.with_current_page(page)
	}

	#[rstest]
	fn test_toolbar_lists_installed_plugins(renderer: Renderer, mut store: CmsStore) {
		// Arrange
		let page = store.pages().next().unwrap().id;
		let placeholder = store.placeholder_by_slot(page, "content").unwrap().id;
		let mut context = RenderContext::new(editor_request(&store));

		// Act
		let bar = renderer
			.render_placeholder_toolbar(&mut store, Some(placeholder), &mut context, "")
			.unwrap();

		// Assert
		let bar = bar.as_str();
		assert!(bar.contains("Main content"));
		assert!(bar.contains(r#"data-plugins="TextPlugin,LinkPlugin""#));
		let generic = bar.find(r#"data-module="Generic""#).unwrap();
		let navigation = bar.find(r#"data-module="Navigation""#).unwrap();
		assert!(generic < navigation);
		assert_eq!(context.depth(), 1);
	}

	#[rstest]
	fn test_toolbar_creates_missing_placeholder(renderer: Renderer, mut store: CmsStore) {
		// Arrange
		let page = store.pages().next().unwrap().id;
		let mut context = RenderContext::new(editor_request(&store));

		// Act
		let bar = renderer
			.render_placeholder_toolbar(&mut store, None, &mut context, "sidebar")
			.unwrap();

		// Assert
		assert!(store.placeholder_by_slot(page, "sidebar").is_some());
		assert!(bar.as_str().contains("Sidebar"));
	}

	#[rstest]
	fn test_toolbar_reuses_existing_slot(renderer: Renderer, mut store: CmsStore) {
		// Arrange
		let page = store.pages().next().unwrap().id;
		let before = store.placeholders_of(page).count();
		let mut context = RenderContext::new(editor_request(&store));

		// Act
		renderer
			.render_placeholder_toolbar(&mut store, None, &mut context, "content")
			.unwrap();

		// Assert
		assert_eq!(store.placeholders_of(page).count(), before);
	}
}
