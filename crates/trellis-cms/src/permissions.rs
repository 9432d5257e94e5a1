//! Page permission policy
//!
//! With `permission` disabled in the settings, holding the model permission
//! is enough. Otherwise the user also needs a global grant or a page grant
//! whose scope covers the page. Computed grants are cached per user.

use crate::cache::GrantedPages;
use crate::ids::PageId;
use crate::models::{GlobalPagePermission, GrantOn, Page, PagePermission, User};
use crate::store::CmsStore;
use std::collections::HashSet;
use tracing::trace;
use trellis_conf::SiteId;

/// Model permission needed to edit pages
pub const CHANGE_PAGE_PERMISSION: &str = "cms.change_page";
/// Model permission needed to publish pages
pub const PUBLISH_PAGE_PERMISSION: &str = "cms.publish_page";

/// Capability checks on pages
pub trait PermissionPolicy: Send + Sync {
	/// Whether `user` may edit `page`
	fn has_change_permission(&self, store: &CmsStore, user: Option<&User>, page: &Page) -> bool;

	/// Whether `user` may publish `page`
	fn has_publish_permission(&self, store: &CmsStore, user: Option<&User>, page: &Page) -> bool;
}

/// Policy backed by the stored page and global permissions
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPermissionPolicy;

impl DefaultPermissionPolicy {
	fn check(store: &CmsStore, user: Option<&User>, page: &Page, perm: &str, key: &str) -> bool {
		let Some(user) = user.filter(|user| user.is_active) else {
			return false;
		};
		if user.is_superuser {
			return true;
		}
		if !user.has_perm(perm) {
			return false;
		}
		if !store.settings().permission {
			return true;
		}

		let granted = granted_pages(store, user, key, page.site_id);
		granted.contains(page.id)
			|| page
				.publisher_public_id
				.is_some_and(|counterpart| granted.contains(counterpart))
	}
}

impl PermissionPolicy for DefaultPermissionPolicy {
	fn has_change_permission(&self, store: &CmsStore, user: Option<&User>, page: &Page) -> bool {
		Self::check(store, user, page, CHANGE_PAGE_PERMISSION, "can_change")
	}

	fn has_publish_permission(&self, store: &CmsStore, user: Option<&User>, page: &Page) -> bool {
		Self::check(store, user, page, PUBLISH_PAGE_PERMISSION, "can_publish")
	}
}

fn page_grant(permission: &PagePermission, key: &str) -> bool {
	match key {
		"can_change" => permission.can_change,
		"can_publish" => permission.can_publish,
		"can_delete" => permission.can_delete,
		_ => false,
	}
}

fn global_grant(permission: &GlobalPagePermission, key: &str) -> bool {
	match key {
		"can_change" => permission.can_change,
		"can_publish" => permission.can_publish,
		"can_delete" => permission.can_delete,
		_ => false,
	}
}

/// Pages on which `user` holds the permission `key` on `site`
///
/// `key` is one of [`PERMISSION_KEYS`](crate::cache::PERMISSION_KEYS).
pub fn granted_pages(store: &CmsStore, user: &User, key: &str, site: SiteId) -> GrantedPages {
	let cache_key = format!("{key}:{site}");
	if let Some(cached) = store.permission_cache().get(user.id, &cache_key) {
		return cached;
	}

	let groups: HashSet<_> = store.groups_of(user.id).map(|group| group.id).collect();
	let is_grantee = |user_id: Option<_>, group_id: Option<_>| {
		user_id == Some(user.id) || group_id.is_some_and(|group| groups.contains(&group))
	};

	let global = store.global_permissions().any(|permission| {
		is_grantee(permission.user_id, permission.group_id)
			&& (permission.sites.is_empty() || permission.sites.contains(&site))
			&& global_grant(permission, key)
	});
	let granted = if global {
		GrantedPages::All
	} else {
		let tree = store.tree();
		let mut pages: HashSet<PageId> = HashSet::new();
		for permission in store.page_permissions() {
			let Some(anchor) = permission.page_id else {
				continue;
			};
			if !is_grantee(permission.user_id, permission.group_id) || !page_grant(permission, key) {
				continue;
			}
			match permission.grant_on {
				GrantOn::Page => {
					pages.insert(anchor);
				}
				GrantOn::Children => pages.extend(tree.children(anchor)),
				GrantOn::Descendants => pages.extend(tree.descendants(anchor)),
				GrantOn::PageAndChildren => {
					pages.insert(anchor);
					pages.extend(tree.children(anchor));
				}
				GrantOn::PageAndDescendants => pages.extend(tree.subtree(anchor)),
			}
		}
		GrantedPages::Pages(pages)
	};

	trace!(user = %user.id, key, site, "computed permission grant");
	store
		.permission_cache()
		.set(user.id, &cache_key, granted.clone());
	granted
}
