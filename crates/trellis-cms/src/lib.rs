//! # Trellis CMS
//!
//! Placeholder rendering and page-tree consistency for a Django-style content
//! management system.
//!
//! ## Features
//!
//! - **Rendering pipeline**: ordered context processors, content processors and a
//!   final safety-marking step for every plugin; language fallback for empty
//!   placeholders; an edit-mode toolbar
//! - **Consistency reactor**: typed lifecycle signals keep title paths, the home
//!   page, placeholder lists, plugin positions and caches consistent on every save
//! - **Publishing**: draft/public page pairs and stacks of reusable content
//!
//! ## Architecture
//!
//! ```text
//! trellis-cms
//! ├── models      - Pages, titles, placeholders, plugins, stacks, permissions
//! ├── tree        - Arena page tree with pre-order queries
//! ├── store       - In-memory store; every save/delete goes through the reactor
//! ├── reactor     - Lifecycle signal bindings
//! ├── paths       - Title path derivation and descendant cascade
//! ├── home        - Home page election
//! ├── publisher   - Draft/public publishing and plugin copying
//! ├── stacks      - Stack creation and publishing
//! ├── cache       - Menu and permission caches
//! ├── permissions - Page permission policy
//! └── rendering   - Context, processors, plugin pool, placeholder and toolbar
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use trellis_cms::prelude::*;
//!
//! let mut store = CmsStore::new(CmsSettings::default());
//! let page = store.save(Page::new(1, "base.html"))?;
//! let placeholder = store.save(Placeholder::for_page("content", page.id))?;
//! store.add_plugin(placeholder.id, "en", "TextPlugin", json!({"body": "Hello"}))?;
//!
//! let renderer = Renderer::new(engine, pool);
//! let mut context = RenderContext::new(RenderRequest::new("en"));
//! let html = renderer.render_placeholder(&mut store, Some(placeholder.id), &mut context, "Placeholder", None)?;
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]

// Re-export for plugin authors
pub use serde_json;
pub use tera;

pub mod cache;
pub mod events;
pub mod home;
pub mod ids;
pub mod models;
pub mod paths;
pub mod permissions;
pub mod publisher;
pub mod reactor;
pub mod rendering;
pub mod request;
pub mod stacks;
pub mod store;
pub mod tree;

pub use error::{CmsError, CmsResult};

/// Convenient re-exports of commonly used items
pub mod prelude {
	pub use crate::cache::{InMemoryMenuCache, InMemoryPermissionCache, MenuCache, PermissionCache};
	pub use crate::error::{CmsError, CmsResult};
	pub use crate::events::{ModelEvent, MutationContext, PageEvent, SaveOptions};
	pub use crate::ids::{GroupId, PageId, PermissionId, PlaceholderId, PluginId, StackId, TitleId, UserId};
	pub use crate::models::{
		CmsPlugin, GlobalPagePermission, GrantOn, Group, Page, PagePermission, Placeholder,
		PublisherState, Stack, Title, User,
	};
	pub use crate::permissions::{DefaultPermissionPolicy, PermissionPolicy};
	pub use crate::reactor::Reactor;
	pub use crate::rendering::{
		PluginKind, PluginPool, PluginTemplate, ProcessorRegistry, RenderContext, RenderProcessors,
		Renderer, SafeString, TemplateEngine,
	};
	pub use crate::request::{RenderRequest, Toolbar};
	pub use crate::store::{CmsStore, Persisted};
	pub use trellis_conf::{CmsSettings, SiteId};
}

/// CMS error types
pub mod error {
	use trellis_conf::SettingsError;
	use trellis_signals::SignalError;

	/// CMS-related errors
	#[non_exhaustive]
	#[derive(Debug, thiserror::Error)]
	pub enum CmsError {
		/// A stored entity does not exist
		#[error("{model} not found: {id}")]
		NotFound {
			/// Entity type
			model: &'static str,
			/// Requested identifier
			id: String,
		},

		/// Invalid page hierarchy (e.g., circular reference)
		#[error("Invalid page hierarchy: {0}")]
		InvalidHierarchy(String),

		/// A configured processor or plugin cannot be resolved
		#[error("Configuration error: {0}")]
		Configuration(String),

		/// A plugin type was registered twice
		#[error("Plugin type already registered: {0}")]
		PluginAlreadyRegistered(String),

		/// Two entities claim the same unique key
		#[error("Integrity error: {0}")]
		Integrity(String),

		/// Publishing precondition not met
		#[error("Cannot publish: {0}")]
		Publish(String),

		/// Template compilation or rendering failed
		#[error("Template error: {0}")]
		Template(#[from] tera::Error),

		/// Settings could not be loaded
		#[error(transparent)]
		Settings(#[from] SettingsError),

		/// Serialization failed
		#[error("Serialization error: {0}")]
		Serialization(#[from] serde_json::Error),

		/// A signal receiver failed
		#[error(transparent)]
		Signal(#[from] SignalError),

		/// Generic error
		#[error("{0}")]
		Generic(String),
	}

	impl CmsError {
		/// Shorthand for [`CmsError::NotFound`]
		pub fn not_found(model: &'static str, id: impl ToString) -> Self {
			Self::NotFound {
				model,
				id: id.to_string(),
			}
		}
	}

	/// Result type for CMS operations
	pub type CmsResult<T> = Result<T, CmsError>;
}
