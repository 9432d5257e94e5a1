//! Synchronous typed signal
//!
//! Receivers are stored behind an `Arc<RwLock<..>>` and deduplicated by their
//! concrete type: connecting the same function twice replaces the first
//! registration instead of adding a second one. Dispatch works on a snapshot of
//! the receiver list, so receivers may send further signals (including this one)
//! without deadlocking.

use super::error::SignalError;
use super::name::SignalName;
use parking_lot::RwLock;
use std::any::{TypeId, type_name};
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Receiver function type
///
/// A receiver gets mutable access to the dispatch context and to the payload.
pub type Receiver<C, T, E> = Arc<dyn Fn(&mut C, &mut T) -> Result<(), E> + Send + Sync>;

/// Identity of a connected receiver, derived from the receiver's concrete type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReceiverId {
	type_id: TypeId,
	name: &'static str,
}

impl ReceiverId {
	/// Identity of receivers of type `F`
	pub fn of<F: 'static>() -> Self {
		Self {
			type_id: TypeId::of::<F>(),
			name: type_name::<F>(),
		}
	}

	/// Type name of the receiver, for diagnostics
	pub fn name(&self) -> &'static str {
		self.name
	}
}

struct ReceiverInfo<C: ?Sized, T, E> {
	id: ReceiverId,
	priority: i32,
	receiver: Receiver<C, T, E>,
}

/// Typed synchronous signal
///
/// `C` is the dispatch context, `T` the payload and `E` the receiver error type.
/// Receivers with a higher priority run first; receivers with equal priority run
/// in registration order.
pub struct Signal<C: ?Sized, T, E = SignalError> {
	name: SignalName,
	receivers: Arc<RwLock<Vec<ReceiverInfo<C, T, E>>>>,
}

impl<C: ?Sized, T, E> Clone for Signal<C, T, E> {
	fn clone(&self) -> Self {
		Self {
			name: self.name.clone(),
			receivers: Arc::clone(&self.receivers),
		}
	}
}

impl<C: ?Sized, T, E> fmt::Debug for Signal<C, T, E> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let receivers: Vec<&'static str> = self.receivers.read().iter().map(|r| r.id.name).collect();
		f.debug_struct("Signal")
			.field("name", &self.name)
			.field("receivers", &receivers)
			.finish()
	}
}

impl<C: ?Sized + 'static, T: 'static, E: 'static> Signal<C, T, E> {
	/// Create a new signal without receivers
	pub fn new(name: SignalName) -> Self {
		Self {
			name,
			receivers: Arc::new(RwLock::new(Vec::new())),
		}
	}

	/// Name of this signal
	pub fn name(&self) -> &SignalName {
		&self.name
	}

	/// Connect a receiver with the default priority (0)
	pub fn connect<F>(&self, receiver: F) -> ReceiverId
	where
		F: Fn(&mut C, &mut T) -> Result<(), E> + Send + Sync + 'static,
	{
		self.connect_with_priority(receiver, 0)
	}

	/// Connect a receiver with an explicit priority
	///
	/// Connecting a receiver of a type that is already connected replaces the
	/// existing registration and keeps its position among equal priorities.
	pub fn connect_with_priority<F>(&self, receiver: F, priority: i32) -> ReceiverId
	where
		F: Fn(&mut C, &mut T) -> Result<(), E> + Send + Sync + 'static,
	{
		let id = ReceiverId::of::<F>();
		let info = ReceiverInfo {
			id,
			priority,
			receiver: Arc::new(receiver),
		};

		let mut receivers = self.receivers.write();
		match receivers.iter().position(|r| r.id == id) {
			Some(index) => receivers[index] = info,
			None => receivers.push(info),
		}
		// Stable sort keeps registration order within one priority
		receivers.sort_by_key(|r| std::cmp::Reverse(r.priority));

		trace!(signal = %self.name, receiver = id.name, priority, "receiver connected");
		id
	}

	/// Disconnect a receiver, returning whether it was connected
	pub fn disconnect(&self, id: ReceiverId) -> bool {
		let mut receivers = self.receivers.write();
		let before = receivers.len();
		receivers.retain(|r| r.id != id);
		receivers.len() < before
	}

	/// Disconnect every receiver
	pub fn disconnect_all(&self) {
		self.receivers.write().clear();
	}

	/// Whether a receiver is connected
	pub fn is_connected(&self, id: ReceiverId) -> bool {
		self.receivers.read().iter().any(|r| r.id == id)
	}

	/// Whether any receiver is connected
	pub fn has_listeners(&self) -> bool {
		!self.receivers.read().is_empty()
	}

	/// Number of connected receivers
	pub fn receiver_count(&self) -> usize {
		self.receivers.read().len()
	}

	/// Receiver identities in dispatch order
	pub fn receiver_ids(&self) -> Vec<ReceiverId> {
		self.receivers.read().iter().map(|r| r.id).collect()
	}

	fn snapshot(&self) -> Vec<(ReceiverId, Receiver<C, T, E>)> {
		self.receivers
			.read()
			.iter()
			.map(|r| (r.id, Arc::clone(&r.receiver)))
			.collect()
	}

	/// Dispatch to every receiver in order, stopping at the first error
	pub fn send(&self, ctx: &mut C, payload: &mut T) -> Result<(), E> {
		let receivers = self.snapshot();
		trace!(signal = %self.name, receivers = receivers.len(), "dispatching signal");

		for (id, receiver) in receivers {
			trace!(signal = %self.name, receiver = id.name, "calling receiver");
			receiver(ctx, payload)?;
		}
		Ok(())
	}

	/// Dispatch to every receiver, collecting each receiver's result
	pub fn send_robust(&self, ctx: &mut C, payload: &mut T) -> Vec<(ReceiverId, Result<(), E>)> {
		let receivers = self.snapshot();
		trace!(signal = %self.name, receivers = receivers.len(), "dispatching signal (robust)");

		receivers
			.into_iter()
			.map(|(id, receiver)| (id, receiver(ctx, payload)))
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	type Log = Vec<&'static str>;

	fn first(log: &mut Log, _: &mut ()) -> Result<(), SignalError> {
		log.push("first");
		Ok(())
	}

	fn second(log: &mut Log, _: &mut ()) -> Result<(), SignalError> {
		log.push("second");
		Ok(())
	}

	fn failing(log: &mut Log, _: &mut ()) -> Result<(), SignalError> {
		log.push("failing");
		Err(SignalError::new("boom"))
	}

	fn signal() -> Signal<Log, ()> {
		Signal::new(SignalName::custom("test"))
	}

	#[rstest]
	fn test_receivers_run_in_registration_order() {
		// Arrange
		let signal = signal();
		signal.connect(second);
		signal.connect(first);
		let mut log = Log::new();

		// Act
		signal.send(&mut log, &mut ()).unwrap();

		// Assert
		assert_eq!(log, vec!["second", "first"]);
	}

	#[rstest]
	fn test_reconnecting_same_receiver_replaces_it() {
		// Arrange
		let signal = signal();
		signal.connect(first);
		signal.connect(second);

		// Act
		let id = signal.connect(first);
		let mut log = Log::new();
		signal.send(&mut log, &mut ()).unwrap();

		// Assert
		assert_eq!(signal.receiver_count(), 2);
		assert_eq!(signal.receiver_ids()[0], id);
		assert_eq!(log, vec!["first", "second"]);
	}

	#[rstest]
	fn test_higher_priority_runs_first() {
		// Arrange
		let signal = signal();
		signal.connect(first);
		signal.connect_with_priority(second, 10);
		let mut log = Log::new();

		// Act
		signal.send(&mut log, &mut ()).unwrap();

		// Assert
		assert_eq!(log, vec!["second", "first"]);
	}

	#[rstest]
	fn test_send_stops_at_first_error() {
		// Arrange
		let signal = signal();
		signal.connect(failing);
		signal.connect(first);
		let mut log = Log::new();

		// Act
		let result = signal.send(&mut log, &mut ());

		// Assert
		assert!(result.is_err());
		assert_eq!(log, vec!["failing"]);
	}

	#[rstest]
	fn test_send_robust_runs_every_receiver() {
		// Arrange
		let signal = signal();
		signal.connect(failing);
		signal.connect(first);
		let mut log = Log::new();

		// Act
		let results = signal.send_robust(&mut log, &mut ());

		// Assert
		assert_eq!(log, vec!["failing", "first"]);
		assert!(results[0].1.is_err());
		assert!(results[1].1.is_ok());
	}

	#[rstest]
	fn test_disconnect() {
		// Arrange
		let signal = signal();
		let id = signal.connect(first);

		// Act
		let removed = signal.disconnect(id);

		// Assert
		assert!(removed);
		assert!(!signal.has_listeners());
		assert!(!signal.disconnect(id));
	}

	#[rstest]
	fn test_receiver_may_send_recursively() {
		// Arrange
		let signal: Signal<u32, u32> = Signal::new(SignalName::custom("countdown"));
		let inner = signal.clone();
		signal.connect(move |total: &mut u32, n: &mut u32| {
			*total += *n;
			if *n > 0 {
				inner.send(total, &mut (*n - 1))?;
			}
			Ok(())
		});
		let mut total = 0;

		// Act
		signal.send(&mut total, &mut 3).unwrap();

		// Assert
		assert_eq!(total, 6);
	}
}
