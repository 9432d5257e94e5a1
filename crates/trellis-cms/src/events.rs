//! Event payloads carried by lifecycle and domain signals

use crate::ids::{PageId, UserId};
use crate::models::Page;
use std::collections::HashSet;

/// Flags controlling one save or delete
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveOptions {
	/// Fixture loading: reactions are skipped
	pub raw: bool,
	/// Leave the publisher state untouched
	pub keep_state: bool,
	/// Write without dispatching any signal
	pub skip_signals: bool,
	/// Do not cascade path changes to descendant titles
	pub skip_descendants: bool,
}

impl SaveOptions {
	/// Options for fixture loading
	pub fn raw() -> Self {
		Self {
			raw: true,
			..Self::default()
		}
	}

	/// Options preserving the publisher state
	pub fn keep_state() -> Self {
		Self {
			keep_state: true,
			..Self::default()
		}
	}

	/// Write quietly: no signals, publisher state preserved
	pub fn quiet() -> Self {
		Self {
			keep_state: true,
			skip_signals: true,
			..Self::default()
		}
	}

	/// Also suppress the descendant path cascade
	pub fn without_descendants(mut self) -> Self {
		self.skip_descendants = true;
		self
	}
}

/// State shared by every save of one cascade
///
/// Carries the acting principal and the pages whose home status has already
/// been settled, so nested saves do not re-run the election.
#[derive(Debug, Clone, Default)]
pub struct MutationContext {
	/// User performing the mutation, `None` when anonymous or unknown
	pub principal: Option<UserId>,
	home_checked: HashSet<PageId>,
}

impl MutationContext {
	/// Empty context without a principal
	pub fn new() -> Self {
		Self::default()
	}

	/// Empty context acting as `principal`
	pub fn as_principal(principal: UserId) -> Self {
		Self {
			principal: Some(principal),
			..Self::default()
		}
	}

	/// Fresh context keeping only the principal
	pub fn fork(&self) -> Self {
		Self {
			principal: self.principal,
			..Self::default()
		}
	}

	/// Record that `page`'s home status is settled; returns `false` if it already was
	pub fn mark_home_checked(&mut self, page: PageId) -> bool {
		self.home_checked.insert(page)
	}

	/// Whether `page`'s home status is settled in this cascade
	pub fn is_home_checked(&self, page: PageId) -> bool {
		self.home_checked.contains(&page)
	}
}

/// Payload of an entity lifecycle signal
#[derive(Debug, Clone)]
pub struct ModelEvent<T> {
	/// Instance being saved or deleted
	pub instance: T,
	/// Stored state before the save, filled by pre-save snapshot receivers
	pub previous: Option<T>,
	/// The save inserts a new entity
	pub created: bool,
	/// Save flags
	pub options: SaveOptions,
	/// Cascade state
	pub ctx: MutationContext,
}

impl<T> ModelEvent<T> {
	/// Create an event for `instance`
	pub fn new(instance: T, created: bool, options: SaveOptions, ctx: MutationContext) -> Self {
		Self {
			instance,
			previous: None,
			created,
			options,
			ctx,
		}
	}

	/// Whether reactions should be skipped
	pub fn is_raw(&self) -> bool {
		self.options.raw
	}
}

/// Payload of the page domain signals (`page_moved`, `post_publish`, ...)
#[derive(Debug, Clone)]
pub struct PageEvent {
	/// Page concerned
	pub instance: Page,
	/// Language published or unpublished
	pub language: Option<String>,
	/// Cascade state
	pub ctx: MutationContext,
}
