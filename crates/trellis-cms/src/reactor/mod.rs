//! Consistency reactor
//!
//! A [`Reactor`] holds the lifecycle signals of every persisted entity plus the
//! page domain signals. [`Reactor::standard`] connects the receivers that keep
//! paths, the home page, placeholder lists, plugin positions and caches
//! consistent. Receivers run synchronously inside the triggering save, in
//! registration order.

mod handlers;

use crate::error::CmsError;
use crate::events::{ModelEvent, PageEvent};
use crate::models::{
	CmsPlugin, GlobalPagePermission, Group, Page, PagePermission, Placeholder, Stack, Title, User,
};
use crate::store::CmsStore;
use std::fmt;
use trellis_conf::CmsSettings;
use trellis_signals::{ModelSignals, Signal, SignalName};

/// Lifecycle signals of one entity type
pub type EntitySignals<T> = ModelSignals<CmsStore, ModelEvent<T>, CmsError>;

/// Page domain signal
pub type DomainSignal = Signal<CmsStore, PageEvent, CmsError>;

/// Page domain signals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageSignal {
	/// A page changed position in the tree
	PageMoved,
	/// The sub-application attached to a page changed
	ApplicationPostChanged,
	/// A page language was published
	PostPublish,
	/// A page language was unpublished
	PostUnpublish,
}

impl PageSignal {
	/// Signal name
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::PageMoved => "page_moved",
			Self::ApplicationPostChanged => "application_post_changed",
			Self::PostPublish => "post_publish",
			Self::PostUnpublish => "post_unpublish",
		}
	}
}

impl fmt::Display for PageSignal {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Dispatch table of every signal the store sends
pub struct Reactor {
	/// Page lifecycle
	pub pages: EntitySignals<Page>,
	/// Title lifecycle
	pub titles: EntitySignals<Title>,
	/// Placeholder lifecycle
	pub placeholders: EntitySignals<Placeholder>,
	/// Plugin lifecycle
	pub plugins: EntitySignals<CmsPlugin>,
	/// Stack lifecycle
	pub stacks: EntitySignals<Stack>,
	/// User lifecycle
	pub users: EntitySignals<User>,
	/// Group lifecycle
	pub groups: EntitySignals<Group>,
	/// Page permission lifecycle
	pub page_permissions: EntitySignals<PagePermission>,
	/// Global page permission lifecycle
	pub global_permissions: EntitySignals<GlobalPagePermission>,
	/// Sent after a page moved
	pub page_moved: DomainSignal,
	/// Sent after the sub-application of a page changed
	pub application_post_changed: DomainSignal,
	/// Sent after a page language was published
	pub post_publish: DomainSignal,
	/// Sent after a page language was unpublished
	pub post_unpublish: DomainSignal,
}

impl Reactor {
	/// Reactor without any receiver
	pub fn new() -> Self {
		Self {
			pages: ModelSignals::new("page"),
			titles: ModelSignals::new("title"),
			placeholders: ModelSignals::new("placeholder"),
			plugins: ModelSignals::new("cms_plugin"),
			stacks: ModelSignals::new("stack"),
			users: ModelSignals::new("user"),
			groups: ModelSignals::new("group"),
			page_permissions: ModelSignals::new("page_permission"),
			global_permissions: ModelSignals::new("global_page_permission"),
			page_moved: Signal::new(SignalName::custom(PageSignal::PageMoved.as_str())),
			application_post_changed: Signal::new(SignalName::custom(
				PageSignal::ApplicationPostChanged.as_str(),
			)),
			post_publish: Signal::new(SignalName::custom(PageSignal::PostPublish.as_str())),
			post_unpublish: Signal::new(SignalName::custom(PageSignal::PostUnpublish.as_str())),
		}
	}

	/// Reactor with the standard bindings for `settings`
	pub fn standard(settings: &CmsSettings) -> Self {
		let reactor = Self::new();
		reactor.connect_standard(settings.permission);
		reactor
	}

	/// Connect the standard bindings
	///
	/// Permission cache receivers are only connected when `permission` is set.
	/// Connecting twice leaves a single copy of each receiver.
	pub fn connect_standard(&self, permission: bool) {
		self.pages.pre_save.connect(handlers::snapshot_previous::<Page>);
		self.pages.pre_save.connect(handlers::invalidate_menu_for_page);
		self.pages.post_save.connect(handlers::post_save_page);
		self.pages.post_save.connect(handlers::update_placeholders);
		self.pages.post_delete.connect(handlers::post_delete_page);

		self.page_moved.connect(handlers::page_moved);
		self.post_publish.connect(handlers::update_home_on_publish);
		self.post_unpublish.connect(handlers::update_home_on_publish);

		self.titles.pre_save.connect(handlers::snapshot_previous::<Title>);
		self.titles.pre_save.connect(handlers::pre_save_title);
		self.titles.post_save.connect(handlers::post_save_title);
		self.titles.pre_delete.connect(handlers::pre_delete_title);

		self.plugins.post_save.connect(handlers::mark_stack_dirty);
		self.plugins.post_delete.connect(handlers::update_plugin_positions);
		self.plugins.post_delete.connect(handlers::mark_stack_dirty);

		if permission {
			self.pages.pre_save.connect(handlers::clear_permission_cache::<Page>);
			self.pages.pre_delete.connect(handlers::clear_permission_cache::<Page>);

			self.users.pre_save.connect(handlers::clear_user_cache);
			self.users.pre_delete.connect(handlers::clear_user_cache);
			self.users.post_save.connect(handlers::post_save_user);

			self.groups.pre_save.connect(handlers::clear_group_cache);
			self.groups.pre_delete.connect(handlers::clear_group_cache);
			self.groups.post_save.connect(handlers::post_save_user_group);

			self.page_permissions.pre_save.connect(handlers::clear_page_permission_cache);
			self.page_permissions.pre_delete.connect(handlers::clear_page_permission_cache);

			self.global_permissions.pre_save.connect(handlers::clear_global_permission_cache);
			self.global_permissions.pre_delete.connect(handlers::clear_global_permission_cache);
		}
	}

	/// Domain signal for `signal`
	pub fn page_signal(&self, signal: PageSignal) -> &DomainSignal {
		match signal {
			PageSignal::PageMoved => &self.page_moved,
			PageSignal::ApplicationPostChanged => &self.application_post_changed,
			PageSignal::PostPublish => &self.post_publish,
			PageSignal::PostUnpublish => &self.post_unpublish,
		}
	}
}

impl Default for Reactor {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for Reactor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Reactor")
			.field("pages", &self.pages)
			.field("titles", &self.titles)
			.field("plugins", &self.plugins)
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::*;

	#[rstest]
	fn test_standard_without_permission_skips_cache_receivers() {
		// Arrange
		let settings = CmsSettings::default();

		// Act
		let reactor = Reactor::standard(&settings);

		// Assert
		assert_eq!(reactor.users.receiver_count(), 0);
		assert_eq!(reactor.page_permissions.receiver_count(), 0);
		assert_eq!(reactor.pages.pre_save.receiver_count(), 2);
	}

	#[rstest]
	fn test_connect_standard_is_idempotent() {
		// Arrange
		let reactor = Reactor::new();

		// Act
		reactor.connect_standard(true);
		let first = reactor.pages.receiver_count() + reactor.titles.receiver_count();
		reactor.connect_standard(true);
		let second = reactor.pages.receiver_count() + reactor.titles.receiver_count();

		// Assert
		assert_eq!(first, second);
		assert_eq!(reactor.pages.pre_save.receiver_count(), 3);
		assert_eq!(reactor.users.receiver_count(), 3);
	}

	#[rstest]
	#[case(PageSignal::PageMoved, "page_moved")]
	#[case(PageSignal::PostUnpublish, "post_unpublish")]
	fn test_page_signal_names(#[case] signal: PageSignal, #[case] expected: &str) {
		let reactor = Reactor::new();
		assert_eq!(reactor.page_signal(signal).name().as_str(), expected);
	}
}
