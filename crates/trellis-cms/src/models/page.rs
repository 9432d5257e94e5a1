use crate::ids::PageId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use trellis_conf::SiteId;

/// Publishing state of a draft entity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublisherState {
	/// In sync with the public counterpart (or never edited)
	#[default]
	Default,
	/// Changed since the last publish
	Dirty,
}

/// A node of the page tree
///
/// Draft and public versions of the same page are separate nodes linked through
/// `publisher_public_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
	/// Identifier
	pub id: PageId,
	/// Parent page, `None` for root pages
	pub parent_id: Option<PageId>,
	/// Owning site
	pub site_id: SiteId,
	/// Template used to render the page
	pub template: String,
	/// Whether this page is the site's home page
	pub is_home: bool,
	/// Languages the page has titles in
	pub languages: Vec<String>,
	/// Draft (`true`) or public (`false`) version
	pub publisher_is_draft: bool,
	/// The other side of the draft/public pair
	pub publisher_public_id: Option<PageId>,
	/// Publishing state
	pub publisher_state: PublisherState,
	/// Attached sub-application
	pub application_urls: Option<String>,
	/// Namespace of the attached sub-application
	pub application_namespace: Option<String>,
	/// Last modification
	pub changed_date: DateTime<Utc>,
	/// First publication
	pub publication_date: Option<DateTime<Utc>>,
}

impl Page {
	/// Create a draft root page
	pub fn new(site_id: SiteId, template: impl Into<String>) -> Self {
		Self {
			id: PageId::new(),
			parent_id: None,
			site_id,
			template: template.into(),
			is_home: false,
			languages: Vec::new(),
			publisher_is_draft: true,
			publisher_public_id: None,
			publisher_state: PublisherState::Default,
			application_urls: None,
			application_namespace: None,
			changed_date: Utc::now(),
			publication_date: None,
		}
	}

	/// Set the parent page
	pub fn with_parent(mut self, parent: PageId) -> Self {
		self.parent_id = Some(parent);
		self
	}

	/// Attach a sub-application
	pub fn with_application(mut self, urls: impl Into<String>, namespace: Option<String>) -> Self {
		self.application_urls = Some(urls.into());
		self.application_namespace = namespace;
		self
	}

	/// Whether the page sits at the root of its tree
	pub fn is_root(&self) -> bool {
		self.parent_id.is_none()
	}

	/// Whether the page has a title in `language`
	pub fn has_language(&self, language: &str) -> bool {
		self.languages.iter().any(|l| l == language)
	}
}
