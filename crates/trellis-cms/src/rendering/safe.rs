//! Strings that must not be escaped again

use serde::{Serialize, Serializer};
use std::fmt;

/// Rendered markup, already escaped where needed
///
/// Every plugin render ends in [`mark_safe`](super::mark_safe), which produces
/// this type.
///
/// # Examples
///
/// ```
/// use trellis_cms::rendering::SafeString;
///
/// let safe = SafeString::new("<b>Bold</b>");
/// assert_eq!(safe.as_str(), "<b>Bold</b>");
/// assert_eq!(safe.to_string(), "<b>Bold</b>");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SafeString(String);

impl SafeString {
	/// Wrap markup
	pub fn new(s: impl Into<String>) -> Self {
		SafeString(s.into())
	}

	/// Get the inner string
	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Convert to String
	pub fn into_string(self) -> String {
		self.0
	}

	/// Whether nothing was rendered
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl From<String> for SafeString {
	fn from(s: String) -> Self {
		SafeString(s)
	}
}

impl From<&str> for SafeString {
	fn from(s: &str) -> Self {
		SafeString(s.to_string())
	}
}

impl fmt::Display for SafeString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl Serialize for SafeString {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(&self.0)
	}
}

impl FromIterator<SafeString> for SafeString {
	fn from_iter<I: IntoIterator<Item = SafeString>>(iter: I) -> Self {
		SafeString(iter.into_iter().map(SafeString::into_string).collect())
	}
}
