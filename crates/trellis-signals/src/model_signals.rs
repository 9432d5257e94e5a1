//! Lifecycle signal sets for persisted entities

use super::error::SignalError;
use super::name::SignalName;
use super::signal::Signal;
use std::fmt;

/// The four lifecycle signals of one entity type
///
/// # Examples
///
/// ```
/// use trellis_signals::ModelSignals;
///
/// let signals: ModelSignals<(), String> = ModelSignals::new("page");
/// assert_eq!(signals.pre_save.name().as_str(), "page.pre_save");
/// assert_eq!(signals.post_delete.name().as_str(), "page.post_delete");
/// ```
pub struct ModelSignals<C: ?Sized, T, E = SignalError> {
	/// Sent before an instance is written
	pub pre_save: Signal<C, T, E>,
	/// Sent after an instance is written
	pub post_save: Signal<C, T, E>,
	/// Sent before an instance is removed
	pub pre_delete: Signal<C, T, E>,
	/// Sent after an instance is removed
	pub post_delete: Signal<C, T, E>,
}

impl<C: ?Sized + 'static, T: 'static, E: 'static> ModelSignals<C, T, E> {
	/// Create the signal set for `model`
	pub fn new(model: &str) -> Self {
		Self {
			pre_save: Signal::new(SignalName::scoped(model, SignalName::PRE_SAVE.as_str())),
			post_save: Signal::new(SignalName::scoped(model, SignalName::POST_SAVE.as_str())),
			pre_delete: Signal::new(SignalName::scoped(model, SignalName::PRE_DELETE.as_str())),
			post_delete: Signal::new(SignalName::scoped(model, SignalName::POST_DELETE.as_str())),
		}
	}

	/// Total number of receivers across the four signals
	pub fn receiver_count(&self) -> usize {
		self.pre_save.receiver_count()
			+ self.post_save.receiver_count()
			+ self.pre_delete.receiver_count()
			+ self.post_delete.receiver_count()
	}

	/// Disconnect every receiver from every signal
	pub fn disconnect_all(&self) {
		self.pre_save.disconnect_all();
		self.post_save.disconnect_all();
		self.pre_delete.disconnect_all();
		self.post_delete.disconnect_all();
	}
}

impl<C: ?Sized, T, E> Clone for ModelSignals<C, T, E> {
	fn clone(&self) -> Self {
		Self {
			pre_save: self.pre_save.clone(),
			post_save: self.post_save.clone(),
			pre_delete: self.pre_delete.clone(),
			post_delete: self.post_delete.clone(),
		}
	}
}

impl<C: ?Sized, T, E> fmt::Debug for ModelSignals<C, T, E> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ModelSignals")
			.field("pre_save", &self.pre_save)
			.field("post_save", &self.post_save)
			.field("pre_delete", &self.pre_delete)
			.field("post_delete", &self.post_delete)
			.finish()
	}
}
