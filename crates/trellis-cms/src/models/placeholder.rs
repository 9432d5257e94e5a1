use crate::ids::{PageId, PlaceholderId};
use serde::{Deserialize, Serialize};

/// Named content region holding an ordered list of plugins
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placeholder {
	/// Identifier
	pub id: PlaceholderId,
	/// Slot name
	pub slot: String,
	/// Owning page, `None` for standalone placeholders such as stacks
	pub page_id: Option<PageId>,
}

impl Placeholder {
	/// Create a standalone placeholder
	pub fn new(slot: impl Into<String>) -> Self {
		Self {
			id: PlaceholderId::new(),
			slot: slot.into(),
			page_id: None,
		}
	}

	/// Create a placeholder owned by `page`
	pub fn for_page(slot: impl Into<String>, page: PageId) -> Self {
		Self {
			page_id: Some(page),
			..Self::new(slot)
		}
	}
}
