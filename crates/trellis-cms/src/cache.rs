//! Navigation-menu and permission caches
//!
//! The reactor only ever invalidates these caches; filling them is up to the
//! menu builder and the permission policy.

use crate::ids::{PageId, UserId};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;
use trellis_conf::SiteId;

/// Cache of rendered navigation menus
pub trait MenuCache: Send + Sync {
	/// Cached menu of `site` under `key`
	fn get(&self, site: SiteId, key: &str) -> Option<String>;

	/// Store a menu
	fn set(&self, site: SiteId, key: &str, value: String);

	/// Drop every menu of `site`
	fn clear_site(&self, site: SiteId);

	/// Drop every menu
	fn clear_all(&self);
}

/// In-process [`MenuCache`]
#[derive(Debug, Default)]
pub struct InMemoryMenuCache {
	entries: RwLock<HashMap<(SiteId, String), String>>,
}

impl InMemoryMenuCache {
	/// Create an empty cache
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of cached menus
	pub fn len(&self) -> usize {
		self.entries.read().len()
	}

	/// Whether the cache is empty
	pub fn is_empty(&self) -> bool {
		self.entries.read().is_empty()
	}
}

impl MenuCache for InMemoryMenuCache {
	fn get(&self, site: SiteId, key: &str) -> Option<String> {
		self.entries.read().get(&(site, key.to_string())).cloned()
	}

	fn set(&self, site: SiteId, key: &str, value: String) {
		self.entries.write().insert((site, key.to_string()), value);
	}

	fn clear_site(&self, site: SiteId) {
		debug!(site, "clearing menu cache");
		self.entries.write().retain(|(cached_site, _), _| *cached_site != site);
	}

	fn clear_all(&self) {
		debug!("clearing menu cache for all sites");
		self.entries.write().clear();
	}
}

/// Permission keys cached per user
pub const PERMISSION_KEYS: [&str; 3] = ["can_change", "can_publish", "can_delete"];

/// Pages a user holds a permission on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrantedPages {
	/// Every page of the site
	All,
	/// An explicit set of pages
	Pages(HashSet<PageId>),
}

impl GrantedPages {
	/// No page at all
	pub fn none() -> Self {
		Self::Pages(HashSet::new())
	}

	/// Whether `page` is covered
	pub fn contains(&self, page: PageId) -> bool {
		match self {
			Self::All => true,
			Self::Pages(pages) => pages.contains(&page),
		}
	}
}

/// Cache of computed page permissions
pub trait PermissionCache: Send + Sync {
	/// Cached grant of `user` for permission `key`
	fn get(&self, user: UserId, key: &str) -> Option<GrantedPages>;

	/// Store a grant
	fn set(&self, user: UserId, key: &str, value: GrantedPages);

	/// Drop every cached grant of `user`
	fn clear_user(&self, user: UserId);

	/// Drop every cached grant
	fn clear_all(&self);
}

/// In-process [`PermissionCache`]
///
/// Keys have the form `<prefix>permission:<version>:<user>:<key>`; a global
/// clear bumps the version so older keys can no longer be reached.
#[derive(Debug)]
pub struct InMemoryPermissionCache {
	prefix: String,
	version: AtomicU64,
	entries: RwLock<HashMap<String, GrantedPages>>,
}

impl InMemoryPermissionCache {
	/// Create an empty cache using `prefix` for its keys
	pub fn new(prefix: impl Into<String>) -> Self {
		Self {
			prefix: prefix.into(),
			version: AtomicU64::new(1),
			entries: RwLock::new(HashMap::new()),
		}
	}

	fn key(&self, user: UserId, key: &str) -> String {
		format!(
			"{}permission:{}:{}:{}",
			self.prefix,
			self.version.load(Ordering::Acquire),
			user,
			key
		)
	}

	/// Current key version
	pub fn version(&self) -> u64 {
		self.version.load(Ordering::Acquire)
	}

	/// Number of stored entries
	pub fn len(&self) -> usize {
		self.entries.read().len()
	}

	/// Whether the cache is empty
	pub fn is_empty(&self) -> bool {
		self.entries.read().is_empty()
	}
}

impl Default for InMemoryPermissionCache {
	fn default() -> Self {
		Self::new("cms-")
	}
}

impl PermissionCache for InMemoryPermissionCache {
	fn get(&self, user: UserId, key: &str) -> Option<GrantedPages> {
		self.entries.read().get(&self.key(user, key)).cloned()
	}

	fn set(&self, user: UserId, key: &str, value: GrantedPages) {
		let key = self.key(user, key);
		self.entries.write().insert(key, value);
	}

	fn clear_user(&self, user: UserId) {
		debug!(%user, "clearing permission cache for user");
		let keys: Vec<String> = PERMISSION_KEYS.iter().map(|key| self.key(user, key)).collect();
		let mut entries = self.entries.write();
		for key in keys {
			entries.remove(&key);
		}
	}

	fn clear_all(&self) {
		let version = self.version.fetch_add(1, Ordering::AcqRel) + 1;
		debug!(version, "clearing permission cache");
		self.entries.write().clear();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_menu_cache_clear_site_keeps_other_sites() {
		// Arrange
		let cache = InMemoryMenuCache::new();
		cache.set(1, "nav", "<ul/>".to_string());
		cache.set(2, "nav", "<ol/>".to_string());

		// Act
		cache.clear_site(1);

		// Assert
		assert_eq!(cache.get(1, "nav"), None);
		assert_eq!(cache.get(2, "nav").as_deref(), Some("<ol/>"));
	}

	#[rstest]
	fn test_permission_cache_clear_user() {
		// Arrange
		let cache = InMemoryPermissionCache::new("test-");
		let (alice, bob) = (UserId::new(), UserId::new());
		cache.set(alice, "can_change", GrantedPages::All);
		cache.set(bob, "can_change", GrantedPages::none());

		// Act
		cache.clear_user(alice);

		// Assert
		assert_eq!(cache.get(alice, "can_change"), None);
		assert_eq!(cache.get(bob, "can_change"), Some(GrantedPages::none()));
	}

	#[rstest]
	fn test_permission_cache_clear_all_bumps_version() {
		let cache = InMemoryPermissionCache::default();
		let user = UserId::new();
		cache.set(user, "can_publish", GrantedPages::All);

		cache.clear_all();

		assert_eq!(cache.version(), 2);
		assert!(cache.get(user, "can_publish").is_none());
		assert!(cache.is_empty());
	}
}
