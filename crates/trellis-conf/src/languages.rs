//! Per-site language tables

use serde::{Deserialize, Serialize};

fn default_true() -> bool {
	true
}

/// One configured language of a site
///
/// `fallbacks` is the ordered list of languages consulted when content is
/// missing in this language. When left out, [`CmsSettings::finalize`] fills it
/// with the site's other languages in declaration order.
///
/// [`CmsSettings::finalize`]: crate::CmsSettings::finalize
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageConfig {
	/// Language code, e.g. `en` or `pt-br`
	pub code: String,
	/// Human readable name
	#[serde(default)]
	pub name: String,
	/// Whether the language is visible to anonymous visitors
	#[serde(default = "default_true")]
	pub public: bool,
	/// Ordered fallback languages
	#[serde(default)]
	pub fallbacks: Option<Vec<String>>,
	/// Hide pages that are not translated into this language
	#[serde(default = "default_true")]
	pub hide_untranslated: bool,
	/// Redirect to the fallback language instead of rendering it in place
	#[serde(default = "default_true")]
	pub redirect_on_fallback: bool,
}

impl LanguageConfig {
	/// Create a public language with no explicit fallbacks
	pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
		Self {
			code: code.into(),
			name: name.into(),
			public: true,
			fallbacks: None,
			hide_untranslated: true,
			redirect_on_fallback: true,
		}
	}

	/// Set explicit fallbacks
	pub fn with_fallbacks<I, S>(mut self, fallbacks: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.fallbacks = Some(fallbacks.into_iter().map(Into::into).collect());
		self
	}

	/// Fallback languages, empty when none are configured
	pub fn fallbacks(&self) -> &[String] {
		self.fallbacks.as_deref().unwrap_or_default()
	}
}
