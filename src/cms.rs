//! Rendering pipeline, store and consistency reactor.
//!
//! # Examples
//!
//! ```rust,no_run
//! # #[cfg(feature = "cms")]
//! use trellis::cms::rendering::{RenderContext, Renderer};
//! # #[cfg(feature = "cms")]
//! use trellis::cms::store::CmsStore;
//! ```

#[cfg(feature = "cms")]
pub use trellis_cms::*;
