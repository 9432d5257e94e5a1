//! Signal error type

/// Errors raised by signal receivers
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
	/// A receiver reported a failure
	#[error("receiver `{receiver}` of signal `{signal}` failed: {message}")]
	ReceiverFailed {
		/// Signal being dispatched
		signal: String,
		/// Type name of the failing receiver
		receiver: String,
		/// Failure description
		message: String,
	},

	/// Any other failure
	#[error("{0}")]
	Generic(String),
}

impl SignalError {
	/// Shorthand for [`SignalError::Generic`]
	pub fn new(message: impl Into<String>) -> Self {
		Self::Generic(message.into())
	}
}
