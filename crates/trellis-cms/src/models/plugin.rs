use crate::ids::{PlaceholderId, PluginId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Position of a plugin within the batch currently being rendered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderMeta {
	/// 0-based index within the batch
	pub index: usize,
	/// Size of the batch
	pub total: usize,
}

/// One content unit inside a placeholder
///
/// `position` is dense and 0-based per (placeholder, language).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CmsPlugin {
	/// Identifier
	pub id: PluginId,
	/// Containing placeholder
	pub placeholder_id: PlaceholderId,
	/// Parent plugin for nested plugins
	pub parent_id: Option<PluginId>,
	/// Language code
	pub language: String,
	/// Ordering within placeholder and language
	pub position: usize,
	/// Registered plugin type name
	pub plugin_type: String,
	/// Type-specific payload
	pub data: Value,
	/// Set while rendering; never persisted
	#[serde(skip)]
	pub render_meta: RenderMeta,
}

impl CmsPlugin {
	/// Create a root plugin at `position`
	pub fn new(
		placeholder_id: PlaceholderId,
		language: impl Into<String>,
		plugin_type: impl Into<String>,
		position: usize,
		data: Value,
	) -> Self {
		Self {
			id: PluginId::new(),
			placeholder_id,
			parent_id: None,
			language: language.into(),
			position,
			plugin_type: plugin_type.into(),
			data,
			render_meta: RenderMeta::default(),
		}
	}
}
