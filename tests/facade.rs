//! Facade integration tests
//!
//! Settings loaded through the layered sources drive a full render.

use rstest::*;
use serde_json::json;
use std::sync::Arc;
use trellis::prelude::*;

struct QuotePlugin;

impl PluginKind for QuotePlugin {
	fn name(&self) -> &str {
		"QuotePlugin"
	}

	fn render_template(&self, _instance: &CmsPlugin) -> Option<PluginTemplate> {
		Some(PluginTemplate::from("quote.html"))
	}
}

#[rstest]
fn test_settings_from_sources_drive_rendering() {
	// Arrange
	let settings = SettingsBuilder::new()
		.add_source(
			DefaultSource::new()
				.with_value("templates", json!({"page.html": {"placeholders": ["content"]}}))
				.with_value("placeholder_conf", json!({"content": {"name": "Content"}})),
		)
		.build()
		.unwrap();
	let mut store = CmsStore::new(settings);
	let page = store.save(Page::new(1, "page.html")).unwrap();
	store.save(Title::new(&page, "en", "Home", "home")).unwrap();
	let content = store.placeholder_by_slot(page.id, "content").unwrap().id;
	store
		.add_plugin(content, "en", "QuotePlugin", json!({"text": "Less is more"}))
		.unwrap();

	let engine = TemplateEngine::new().unwrap();
	engine
		.add_template("quote.html", "<q>{{ instance.data.text }}</q>")
		.unwrap();
	let mut pool = PluginPool::new();
	pool.register(QuotePlugin).unwrap();
	let renderer = Renderer::new(Arc::new(engine), Arc::new(pool));
	let mut context = RenderContext::new(RenderRequest::new("en"));

	// Act
	let html = renderer
		.render_placeholder(&mut store, Some(content), &mut context, "content", None)
		.unwrap();

	// Assert
	assert_eq!(html.as_str(), "<q>Less is more</q>");
	assert!(store.page(page.id).unwrap().is_home);
}
