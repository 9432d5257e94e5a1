//! # Trellis Conf
//!
//! Settings for the Trellis CMS core.
//!
//! Settings are assembled from layered [`ConfigSource`]s (defaults, TOML or JSON
//! files, environment variables), merged by priority and deserialized into
//! [`CmsSettings`]. The settings type also answers the lookups the rendering
//! pipeline needs: per-site language tables with fallback lists, and per-slot
//! placeholder configuration with `inherit` chains.
//!
//! ```
//! use trellis_conf::{DefaultSource, SettingsBuilder};
//! use serde_json::json;
//!
//! let settings = SettingsBuilder::new()
//!     .add_source(DefaultSource::new().with_value("permission", json!(true)))
//!     .build()
//!     .unwrap();
//! assert!(settings.permission);
//! assert_eq!(settings.default_language(), "en");
//! ```

#![warn(missing_docs)]

pub mod languages;
pub mod placeholders;
pub mod settings;
pub mod sources;

pub use languages::LanguageConfig;
pub use placeholders::PlaceholderConf;
pub use settings::{CmsSettings, SettingsBuilder, SettingsError, SiteId, TemplateConf};
pub use sources::{ConfigSource, DefaultSource, EnvSource, JsonFileSource, SourceError, TomlFileSource};

/// Convenient re-exports
pub mod prelude {
	pub use crate::languages::LanguageConfig;
	pub use crate::placeholders::PlaceholderConf;
	pub use crate::settings::{CmsSettings, SettingsBuilder, SettingsError, SiteId};
	pub use crate::sources::{ConfigSource, DefaultSource, EnvSource, JsonFileSource, TomlFileSource};
}
