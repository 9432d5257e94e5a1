//! In-memory CMS store
//!
//! Holds every entity and the page tree. All writes go through
//! [`CmsStore::save_with`] and [`CmsStore::delete_with`], which dispatch the
//! entity's lifecycle signals on the store's [`Reactor`]. Callers that share a
//! store between threads wrap it in their own lock; the store itself performs no
//! locking.

mod operations;
mod persist;

pub use persist::Persisted;

use crate::cache::{InMemoryMenuCache, InMemoryPermissionCache, MenuCache, PermissionCache};
use crate::error::{CmsError, CmsResult};
use crate::ids::{GroupId, PageId, PermissionId, PlaceholderId, PluginId, StackId, TitleId, UserId};
use crate::models::{
	CmsPlugin, GlobalPagePermission, Group, Page, PagePermission, PageUserGroupInfo, PageUserInfo,
	Placeholder, Stack, Title, User,
};
use crate::reactor::Reactor;
use crate::tree::PageTree;
use indexmap::IndexMap;
use std::sync::Arc;
use trellis_conf::{CmsSettings, SiteId};

/// Entity store driving the consistency reactor
pub struct CmsStore {
	settings: Arc<CmsSettings>,
	reactor: Arc<Reactor>,
	menu_cache: Arc<dyn MenuCache>,
	permission_cache: Arc<dyn PermissionCache>,
	tree: PageTree,
	pages: IndexMap<PageId, Page>,
	titles: IndexMap<TitleId, Title>,
	placeholders: IndexMap<PlaceholderId, Placeholder>,
	plugins: IndexMap<PluginId, CmsPlugin>,
	stacks: IndexMap<StackId, Stack>,
	users: IndexMap<UserId, User>,
	groups: IndexMap<GroupId, Group>,
	page_permissions: IndexMap<PermissionId, PagePermission>,
	global_permissions: IndexMap<PermissionId, GlobalPagePermission>,
	page_user_info: Vec<PageUserInfo>,
	page_user_group_info: Vec<PageUserGroupInfo>,
}

impl CmsStore {
	/// Create an empty store with the standard reactor bindings and in-memory caches
	pub fn new(settings: CmsSettings) -> Self {
		let reactor = Reactor::standard(&settings);
		let permission_cache = InMemoryPermissionCache::new(settings.cache_prefix.clone());
		Self {
			settings: Arc::new(settings),
			reactor: Arc::new(reactor),
			menu_cache: Arc::new(InMemoryMenuCache::new()),
			permission_cache: Arc::new(permission_cache),
			tree: PageTree::new(),
			pages: IndexMap::new(),
			titles: IndexMap::new(),
			placeholders: IndexMap::new(),
			plugins: IndexMap::new(),
			stacks: IndexMap::new(),
			users: IndexMap::new(),
			groups: IndexMap::new(),
			page_permissions: IndexMap::new(),
			global_permissions: IndexMap::new(),
			page_user_info: Vec::new(),
			page_user_group_info: Vec::new(),
		}
	}

	/// Replace the reactor
	pub fn with_reactor(mut self, reactor: Reactor) -> Self {
		self.reactor = Arc::new(reactor);
		self
	}

	/// Replace the menu cache
	pub fn with_menu_cache(mut self, cache: Arc<dyn MenuCache>) -> Self {
		self.menu_cache = cache;
		self
	}

	/// Replace the permission cache
	pub fn with_permission_cache(mut self, cache: Arc<dyn PermissionCache>) -> Self {
		self.permission_cache = cache;
		self
	}

	/// Settings
	pub fn settings(&self) -> &Arc<CmsSettings> {
		&self.settings
	}

	/// Reactor dispatching this store's lifecycle signals
	pub fn reactor(&self) -> &Arc<Reactor> {
		&self.reactor
	}

	/// Menu cache
	pub fn menu_cache(&self) -> &Arc<dyn MenuCache> {
		&self.menu_cache
	}

	/// Permission cache
	pub fn permission_cache(&self) -> &Arc<dyn PermissionCache> {
		&self.permission_cache
	}

	/// Page tree
	pub fn tree(&self) -> &PageTree {
		&self.tree
	}

	// Pages

	/// Page by id
	pub fn page(&self, id: PageId) -> Option<&Page> {
		self.pages.get(&id)
	}

	/// Page by id, failing when missing
	pub fn get_page(&self, id: PageId) -> CmsResult<&Page> {
		self.page(id).ok_or_else(|| CmsError::not_found("Page", id))
	}

	/// Every page, in insertion order
	pub fn pages(&self) -> impl Iterator<Item = &Page> {
		self.pages.values()
	}

	/// Root pages of a site and draft/public kind, in tree order
	pub fn root_pages(&self, site: SiteId, draft: bool) -> impl Iterator<Item = &Page> {
		self.tree
			.roots()
			.iter()
			.filter_map(|id| self.pages.get(id))
			.filter(move |page| page.site_id == site && page.publisher_is_draft == draft)
	}

	/// Pages of a site currently flagged as home
	pub fn home_pages(&self, site: SiteId, draft: bool) -> impl Iterator<Item = &Page> {
		self.pages
			.values()
			.filter(move |page| page.site_id == site && page.publisher_is_draft == draft && page.is_home)
	}

	// Titles

	/// Title by id
	pub fn title_by_id(&self, id: TitleId) -> Option<&Title> {
		self.titles.get(&id)
	}

	/// Titles of a page
	pub fn titles_of(&self, page: PageId) -> impl Iterator<Item = &Title> {
		self.titles.values().filter(move |title| title.page_id == page)
	}

	/// Title of a page in exactly `language`
	pub fn title(&self, page: PageId, language: &str) -> Option<&Title> {
		self.titles_of(page).find(|title| title.language == language)
	}

	/// Title of a page in `language`, else in a fallback, else in the site default
	pub fn title_with_fallback(&self, page: PageId, language: &str) -> Option<&Title> {
		if let Some(title) = self.title(page, language) {
			return Some(title);
		}
		let site = self.page(page)?.site_id;
		self.settings
			.fallback_languages(language, site)
			.iter()
			.map(String::as_str)
			.chain(std::iter::once(self.settings.default_language_for(site)))
			.find_map(|fallback| self.title(page, fallback))
	}

	/// Whether the page has at least one published title
	pub fn has_published_title(&self, page: PageId) -> bool {
		self.titles_of(page).any(|title| title.published)
	}

	// Placeholders and plugins

	/// Placeholder by id
	pub fn placeholder(&self, id: PlaceholderId) -> Option<&Placeholder> {
		self.placeholders.get(&id)
	}

	/// Placeholder by id, failing when missing
	pub fn get_placeholder(&self, id: PlaceholderId) -> CmsResult<&Placeholder> {
		self.placeholder(id)
			.ok_or_else(|| CmsError::not_found("Placeholder", id))
	}

	/// Placeholders owned by a page
	pub fn placeholders_of(&self, page: PageId) -> impl Iterator<Item = &Placeholder> {
		self.placeholders
			.values()
			.filter(move |placeholder| placeholder.page_id == Some(page))
	}

	/// Placeholder of a page by slot
	pub fn placeholder_by_slot(&self, page: PageId, slot: &str) -> Option<&Placeholder> {
		self.placeholders_of(page).find(|placeholder| placeholder.slot == slot)
	}

	/// Plugin by id
	pub fn plugin(&self, id: PluginId) -> Option<&CmsPlugin> {
		self.plugins.get(&id)
	}

	/// Every plugin of a placeholder in `language`, ordered by position
	pub fn plugins_in(&self, placeholder: PlaceholderId, language: &str) -> Vec<&CmsPlugin> {
		let mut plugins: Vec<&CmsPlugin> = self
			.plugins
			.values()
			.filter(|plugin| plugin.placeholder_id == placeholder && plugin.language == language)
			.collect();
		plugins.sort_by_key(|plugin| plugin.position);
		plugins
	}

	/// Every plugin of a placeholder in any language
	pub fn all_plugins_in(&self, placeholder: PlaceholderId) -> Vec<&CmsPlugin> {
		let mut plugins: Vec<&CmsPlugin> = self
			.plugins
			.values()
			.filter(|plugin| plugin.placeholder_id == placeholder)
			.collect();
		plugins.sort_by(|a, b| a.language.cmp(&b.language).then(a.position.cmp(&b.position)));
		plugins
	}

	/// Top-level plugins of a placeholder in `language`, ordered by position
	pub fn root_plugins(&self, placeholder: PlaceholderId, language: &str) -> Vec<CmsPlugin> {
		self.plugins_in(placeholder, language)
			.into_iter()
			.filter(|plugin| plugin.parent_id.is_none())
			.cloned()
			.collect()
	}

	/// Direct children of a plugin, ordered by position
	pub fn child_plugins(&self, parent: PluginId) -> Vec<&CmsPlugin> {
		let mut children: Vec<&CmsPlugin> = self
			.plugins
			.values()
			.filter(|plugin| plugin.parent_id == Some(parent))
			.collect();
		children.sort_by_key(|plugin| plugin.position);
		children
	}

	// Stacks

	/// Stack by id
	pub fn stack(&self, id: StackId) -> Option<&Stack> {
		self.stacks.get(&id)
	}

	/// Stack by code
	pub fn stack_by_code(&self, code: &str) -> Option<&Stack> {
		self.stacks.values().find(|stack| stack.code == code)
	}

	/// Stack whose draft placeholder is `placeholder`
	pub fn stack_for_draft(&self, placeholder: PlaceholderId) -> Option<&Stack> {
		self.stacks.values().find(|stack| stack.draft == placeholder)
	}

	// Users, groups and permissions

	/// User by id
	pub fn user(&self, id: UserId) -> Option<&User> {
		self.users.get(&id)
	}

	/// Group by id
	pub fn group(&self, id: GroupId) -> Option<&Group> {
		self.groups.get(&id)
	}

	/// Groups `user` belongs to
	pub fn groups_of(&self, user: UserId) -> impl Iterator<Item = &Group> {
		self.groups
			.values()
			.filter(move |group| group.members.contains(&user))
	}

	/// Every page permission
	pub fn page_permissions(&self) -> impl Iterator<Item = &PagePermission> {
		self.page_permissions.values()
	}

	/// Every global page permission
	pub fn global_permissions(&self) -> impl Iterator<Item = &GlobalPagePermission> {
		self.global_permissions.values()
	}

	/// Creator records of users
	pub fn page_user_info(&self) -> &[PageUserInfo] {
		&self.page_user_info
	}

	/// Creator records of groups
	pub fn page_user_group_info(&self) -> &[PageUserGroupInfo] {
		&self.page_user_group_info
	}

	pub(crate) fn record_user_creator(&mut self, info: PageUserInfo) {
		self.page_user_info.push(info);
	}

	pub(crate) fn record_group_creator(&mut self, info: PageUserGroupInfo) {
		self.page_user_group_info.push(info);
	}
}

impl std::fmt::Debug for CmsStore {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("CmsStore")
			.field("pages", &self.pages.len())
			.field("titles", &self.titles.len())
			.field("placeholders", &self.placeholders.len())
			.field("plugins", &self.plugins.len())
			.field("stacks", &self.stacks.len())
			.finish_non_exhaustive()
	}
}
