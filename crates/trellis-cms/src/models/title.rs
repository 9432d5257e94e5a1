use super::page::{Page, PublisherState};
use crate::ids::{PageId, TitleId};
use serde::{Deserialize, Serialize};

/// Per-language metadata of a page
///
/// `path` is derived from the parent chain on every save unless
/// `has_url_overwrite` is set, in which case it holds the explicit path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Title {
	/// Identifier
	pub id: TitleId,
	/// Owning page
	pub page_id: PageId,
	/// Language code
	pub language: String,
	/// Human readable title
	pub title: String,
	/// Last URL segment
	pub slug: String,
	/// Full URL path, empty for the home page
	pub path: String,
	/// Whether `path` is set explicitly
	pub has_url_overwrite: bool,
	/// Whether the title is published
	pub published: bool,
	/// Draft (`true`) or public (`false`) version
	pub publisher_is_draft: bool,
	/// The other side of the draft/public pair
	pub publisher_public_id: Option<TitleId>,
	/// Publishing state
	pub publisher_state: PublisherState,
}

impl Title {
	/// Create an unpublished title for `page`
	pub fn new(
		page: &Page,
		language: impl Into<String>,
		title: impl Into<String>,
		slug: impl Into<String>,
	) -> Self {
		Self {
			id: TitleId::new(),
			page_id: page.id,
			language: language.into(),
			title: title.into(),
			slug: slug.into(),
			path: String::new(),
			has_url_overwrite: false,
			published: false,
			publisher_is_draft: page.publisher_is_draft,
			publisher_public_id: None,
			publisher_state: PublisherState::Default,
		}
	}

	/// Use an explicit path instead of the derived one
	pub fn with_url_overwrite(mut self, path: impl Into<String>) -> Self {
		self.has_url_overwrite = true;
		self.path = path.into();
		self
	}

	/// Mark the title as published
	pub fn published(mut self) -> Self {
		self.published = true;
		self
	}
}
