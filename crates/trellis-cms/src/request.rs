//! Request data consumed by the rendering pipeline

use crate::ids::PageId;
use crate::models::User;
use serde_json::{Value, json};
use trellis_conf::SiteId;

/// Edit toolbar state of a request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Toolbar {
	/// Frontend editing is switched on
	pub edit_mode: bool,
}

/// The parts of an incoming request the renderer needs
#[derive(Debug, Clone)]
pub struct RenderRequest {
	/// Authenticated user, `None` for anonymous visitors
	pub user: Option<User>,
	/// Language negotiated for the request
	pub language: String,
	/// Site being served
	pub site_id: SiteId,
	/// Edit toolbar, present for staff users
	pub toolbar: Option<Toolbar>,
	/// Page resolved from the URL
	pub current_page: Option<PageId>,
}

impl RenderRequest {
	/// Anonymous request for `language` on site 1
	pub fn new(language: impl Into<String>) -> Self {
		Self {
			user: None,
			language: language.into(),
			site_id: 1,
			toolbar: None,
			current_page: None,
		}
	}

	/// Set the authenticated user
	pub fn with_user(mut self, user: User) -> Self {
		self.user = Some(user);
		self
	}

	/// Set the site
	pub fn with_site(mut self, site_id: SiteId) -> Self {
		self.site_id = site_id;
		self
	}

	/// Attach a toolbar in edit mode
	pub fn in_edit_mode(mut self) -> Self {
		self.toolbar = Some(Toolbar { edit_mode: true });
		self
	}

	/// Set the current page
	pub fn with_current_page(mut self, page: PageId) -> Self {
		self.current_page = Some(page);
		self
	}

	/// Whether the toolbar is in edit mode
	pub fn edit_mode(&self) -> bool {
		self.toolbar.is_some_and(|toolbar| toolbar.edit_mode)
	}

	/// Template-facing view of the request
	pub fn to_value(&self) -> Value {
		json!({
			"language": self.language,
			"site_id": self.site_id,
			"edit_mode": self.edit_mode(),
			"current_page": self.current_page,
			"user": self.user.as_ref().map(|user| user.username.as_str()),
		})
	}
}
