//! Settings: languages, templates, placeholder configuration and sources.
//!
//! # Examples
//!
//! ```rust,no_run
//! # #[cfg(feature = "conf")]
//! use trellis::conf::{CmsSettings, SettingsBuilder};
//! ```

#[cfg(feature = "conf")]
pub use trellis_conf::*;
