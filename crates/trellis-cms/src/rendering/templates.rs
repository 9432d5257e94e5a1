//! Tera-backed template engine
//!
//! The toolbar templates ship with the crate. Plugin templates are either
//! registered by name ahead of time or parsed from source into a
//! [`ParsedTemplate`] handle.

use super::context::RenderContext;
use super::plugin::PluginTemplate;
use crate::error::CmsResult;
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use tera::{Context, Result as TeraResult, Tera, Value};

const BUILTIN_TEMPLATES: [(&str, &str); 4] = [
	(
		"cms/toolbar/placeholder.html",
		include_str!("../../templates/cms/toolbar/placeholder.html"),
	),
	(
		"cms/toolbar/placeholder_bar.html",
		include_str!("../../templates/cms/toolbar/placeholder_bar.html"),
	),
	(
		"cms/toolbar/draggable.html",
		include_str!("../../templates/cms/toolbar/draggable.html"),
	),
	(
		"cms/toolbar/plugin.html",
		include_str!("../../templates/cms/toolbar/plugin.html"),
	),
];

/// Handle to a template compiled from source
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParsedTemplate {
	name: String,
}

impl ParsedTemplate {
	/// Name the template is registered under
	pub fn name(&self) -> &str {
		&self.name
	}
}

/// Title-case every word, lowercasing the rest of it
///
/// # Examples
///
/// ```
/// use trellis_cms::rendering::title_case;
///
/// assert_eq!(title_case("main content"), "Main Content");
/// assert_eq!(title_case("SIDEBAR_left"), "Sidebar_Left");
/// ```
pub fn title_case(s: &str) -> String {
	let mut out = String::with_capacity(s.len());
	let mut previous_is_letter = false;
	for c in s.chars() {
		if c.is_alphabetic() {
			if previous_is_letter {
				out.extend(c.to_lowercase());
			} else {
				out.extend(c.to_uppercase());
			}
			previous_is_letter = true;
		} else {
			out.push(c);
			previous_is_letter = false;
		}
	}
	out
}

/// Tera filter for [`title_case`]
///
/// ```tera
/// {{ slot|title }}
/// ```
pub fn title(value: &Value, _args: &HashMap<String, Value>) -> TeraResult<Value> {
	let s = value
		.as_str()
		.ok_or_else(|| tera::Error::msg("title filter requires a string"))?;
	Ok(Value::String(title_case(s)))
}

/// Template registry and renderer
pub struct TemplateEngine {
	tera: RwLock<Tera>,
}

impl TemplateEngine {
	/// Engine with the toolbar templates loaded
	pub fn new() -> CmsResult<Self> {
		let mut tera = Tera::default();
		tera.add_raw_templates(BUILTIN_TEMPLATES)?;
		tera.register_filter("title", title);
		Ok(Self {
			tera: RwLock::new(tera),
		})
	}

	/// Register a template under `name`, replacing any previous one
	pub fn add_template(&self, name: &str, source: &str) -> CmsResult<()> {
		self.tera.write().add_raw_template(name, source)?;
		Ok(())
	}

	/// Compile `source` and return a handle to it
	pub fn parse(&self, name: &str, source: &str) -> CmsResult<ParsedTemplate> {
		self.add_template(name, source)?;
		Ok(ParsedTemplate {
			name: name.to_string(),
		})
	}

	/// Whether a template is registered under `name`
	pub fn has_template(&self, name: &str) -> bool {
		self.tera.read().get_template_names().any(|known| known == name)
	}

	/// Render a registered template
	pub fn render(&self, name: &str, context: &Context) -> CmsResult<String> {
		Ok(self.tera.read().render(name, context)?)
	}

	/// Render a registered template from any serializable map
	pub fn render_value<T: Serialize>(&self, name: &str, values: &T) -> CmsResult<String> {
		let context = Context::from_serialize(values)?;
		self.render(name, &context)
	}

	/// Render a plugin template against a render context
	pub fn render_template(
		&self,
		template: &PluginTemplate,
		context: &RenderContext,
	) -> CmsResult<String> {
		let context = context.to_tera()?;
		match template {
			PluginTemplate::Named(name) => self.render(name, &context),
			PluginTemplate::Parsed(parsed) => self.render(parsed.name(), &context),
		}
	}
}

impl fmt::Debug for TemplateEngine {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let tera = self.tera.read();
		f.debug_struct("TemplateEngine")
			.field("templates", &tera.get_template_names().collect::<Vec<_>>())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::request::RenderRequest;
	use rstest::*;
	use serde_json::json;

	#[fixture]
	fn engine() -> TemplateEngine {
		TemplateEngine::new().unwrap()
	}

	#[rstest]
	#[case("content", "Content")]
	#[case("main content", "Main Content")]
	#[case("it's", "It'S")]
	#[case("", "")]
	fn test_title_case(#[case] input: &str, #[case] expected: &str) {
		assert_eq!(title_case(input), expected);
	}

	#[rstest]
	fn test_builtin_templates_are_loaded(engine: TemplateEngine) {
		for (name, _) in BUILTIN_TEMPLATES {
			assert!(engine.has_template(name), "{name} missing");
		}
	}

	#[rstest]
	fn test_parsed_template_renders_context(engine: TemplateEngine) {
		// Arrange
		let parsed = engine.parse("greeting.html", "Hello {{ name }}").unwrap();
		let mut context = RenderContext::new(RenderRequest::new("en"));
		context.insert("name", json!("<World>"));

		// Act
		let output = engine
			.render_template(&PluginTemplate::Parsed(parsed), &context)
			.unwrap();

		// Assert
		assert_eq!(output, "Hello &lt;World&gt;");
	}

	#[rstest]
	fn test_missing_named_template_is_an_error(engine: TemplateEngine) {
		// Arrange
		let context = RenderContext::new(RenderRequest::new("en"));

		// Act
		let result = engine.render_template(&PluginTemplate::Named("missing.html".into()), &context);

		// Assert
		assert!(result.is_err());
	}

	#[rstest]
	fn test_title_filter(engine: TemplateEngine) {
		// Arrange
		engine.add_template("label.txt", "{{ slot | title }}").unwrap();

		// Act
		let output = engine.render_value("label.txt", &json!({"slot": "side bar"})).unwrap();

		// Assert
		assert_eq!(output, "Side Bar");
	}
}
