//! Signal names

use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum SignalNameInner {
	Static(&'static str),
	Owned(Arc<str>),
}

/// Type-safe signal name wrapper
///
/// # Examples
///
/// ```
/// use trellis_signals::SignalName;
///
/// assert_eq!(SignalName::PRE_SAVE.as_str(), "pre_save");
/// assert_eq!(SignalName::custom("page_moved").as_str(), "page_moved");
/// assert_eq!(SignalName::scoped("page", "post_save").as_str(), "page.post_save");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SignalName(SignalNameInner);

impl SignalName {
	/// Signal sent before saving an entity
	pub const PRE_SAVE: Self = Self(SignalNameInner::Static("pre_save"));
	/// Signal sent after saving an entity
	pub const POST_SAVE: Self = Self(SignalNameInner::Static("post_save"));
	/// Signal sent before deleting an entity
	pub const PRE_DELETE: Self = Self(SignalNameInner::Static("pre_delete"));
	/// Signal sent after deleting an entity
	pub const POST_DELETE: Self = Self(SignalNameInner::Static("post_delete"));

	/// Create a custom signal name from a static string
	pub const fn custom(name: &'static str) -> Self {
		Self(SignalNameInner::Static(name))
	}

	/// Create a signal name from an owned string
	pub fn from_string(name: impl Into<Arc<str>>) -> Self {
		Self(SignalNameInner::Owned(name.into()))
	}

	/// Create a `<model>.<event>` name
	pub fn scoped(model: &str, event: &str) -> Self {
		Self::from_string(format!("{model}.{event}"))
	}

	/// Get the signal name as a string slice
	pub fn as_str(&self) -> &str {
		match &self.0 {
			SignalNameInner::Static(s) => s,
			SignalNameInner::Owned(s) => s,
		}
	}
}

impl fmt::Display for SignalName {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl AsRef<str> for SignalName {
	fn as_ref(&self) -> &str {
		self.as_str()
	}
}
