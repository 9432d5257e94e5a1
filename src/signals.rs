//! Typed synchronous signals.

#[cfg(feature = "signals")]
pub use trellis_signals::*;
