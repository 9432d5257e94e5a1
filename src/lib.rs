//! # Trellis
//!
//! Placeholder rendering and page-tree consistency for a Django-style content
//! management system.
//!
//! Trellis renders placeholders (named content regions) populated by plugins
//! through an ordered processor pipeline, and keeps the page tree consistent
//! (title paths, the home page, placeholder lists, plugin positions and
//! permission caches) by reacting to lifecycle signals.
//!
//! ## Feature Flags
//!
//! - `cms` - Rendering pipeline, store and consistency reactor
//! - `conf` - Layered settings loading
//! - `signals` - Typed synchronous signal dispatch
//! - `full` (default) - All of the above
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use trellis::prelude::*;
//!
//! let settings = SettingsBuilder::new()
//!     .add_source(DefaultSource::new())
//!     .add_source(TomlFileSource::new("cms.toml"))
//!     .add_source(EnvSource::new("TRELLIS_"))
//!     .build()?;
//! let mut store = CmsStore::new(settings);
//!
//! let page = store.save(Page::new(1, "base.html"))?;
//! store.save(Title::new(&page, "en", "Home", "home"))?;
//! ```

#![warn(missing_docs)]

#[cfg(feature = "cms")]
pub mod cms;
#[cfg(feature = "conf")]
pub mod conf;
#[cfg(feature = "signals")]
pub mod signals;

// Re-export the types most applications touch
#[cfg(feature = "cms")]
pub use trellis_cms::{CmsError, CmsResult};

#[cfg(feature = "conf")]
pub use trellis_conf::{CmsSettings, SettingsBuilder, SettingsError};

#[cfg(feature = "signals")]
pub use trellis_signals::{Signal, SignalError, SignalName};

/// Convenient re-exports of commonly used items
pub mod prelude {
	#[cfg(feature = "cms")]
	pub use trellis_cms::prelude::*;

	#[cfg(feature = "conf")]
	pub use trellis_conf::prelude::*;

	#[cfg(feature = "signals")]
	pub use trellis_signals::{ModelSignals, Signal, SignalError, SignalName};
}
