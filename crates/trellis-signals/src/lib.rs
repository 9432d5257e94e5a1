//! # Trellis Signals
//!
//! Typed, synchronous signal dispatch used to drive entity lifecycle reactions.
//!
//! A [`Signal`] carries a mutable *context* (usually the store being mutated) and a
//! mutable *payload* (the event). Receivers run in a fixed order and the first
//! failing receiver aborts the dispatch.
//!
//! ## Examples
//!
//! ```
//! use trellis_signals::{Signal, SignalError, SignalName};
//!
//! #[derive(Default)]
//! struct Counter(u32);
//!
//! fn bump(counter: &mut Counter, step: &mut u32) -> Result<(), SignalError> {
//!     counter.0 += *step;
//!     Ok(())
//! }
//!
//! let signal: Signal<Counter, u32> = Signal::new(SignalName::custom("bump"));
//! signal.connect(bump);
//!
//! let mut counter = Counter::default();
//! signal.send(&mut counter, &mut 3).unwrap();
//! assert_eq!(counter.0, 3);
//! ```

#![warn(missing_docs)]

mod error;
mod model_signals;
mod name;
mod signal;

pub use error::SignalError;
pub use model_signals::ModelSignals;
pub use name::SignalName;
pub use signal::{Receiver, ReceiverId, Signal};
