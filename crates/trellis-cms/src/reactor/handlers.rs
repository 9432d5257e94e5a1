//! Receivers connected by [`Reactor::connect_standard`](super::Reactor::connect_standard)
//!
//! Every receiver returns early for raw (fixture) events.

use super::PageSignal;
use crate::error::CmsResult;
use crate::events::{ModelEvent, PageEvent, SaveOptions};
use crate::home;
use crate::ids::{GroupId, UserId};
use crate::models::{
	CmsPlugin, GlobalPagePermission, Group, Page, PagePermission, PageUserGroupInfo, PageUserInfo,
	Placeholder, Title, User,
};
use crate::paths;
use crate::store::{CmsStore, Persisted};
use chrono::Utc;
use tracing::{debug, trace};

/// Record the stored state before it is overwritten
pub(super) fn snapshot_previous<T: Persisted>(
	store: &mut CmsStore,
	event: &mut ModelEvent<T>,
) -> CmsResult<()> {
	event.previous = T::fetch(store, event.instance.id()).cloned();
	Ok(())
}

pub(super) fn invalidate_menu_for_page(
	store: &mut CmsStore,
	event: &mut ModelEvent<Page>,
) -> CmsResult<()> {
	if event.is_raw() {
		return Ok(());
	}
	store.menu_cache().clear_site(event.instance.site_id);
	Ok(())
}

pub(super) fn clear_permission_cache<T>(
	store: &mut CmsStore,
	event: &mut ModelEvent<T>,
) -> CmsResult<()> {
	if event.is_raw() {
		return Ok(());
	}
	store.permission_cache().clear_all();
	Ok(())
}

pub(super) fn post_save_page(store: &mut CmsStore, event: &mut ModelEvent<Page>) -> CmsResult<()> {
	if event.is_raw() {
		return Ok(());
	}
	home::update_home(store, &mut event.instance, event.previous.as_ref(), &mut event.ctx)?;

	let relocated = event.previous.as_ref().is_none_or(|previous| {
		previous.parent_id != event.instance.parent_id || previous.is_home != event.instance.is_home
	});
	if relocated && !event.options.skip_descendants {
		paths::refresh_subtree_paths(store, event.instance.id, &mut event.ctx)?;
	}

	propagate_application(store, event)
}

/// Copy the sub-application of a draft to its public counterpart
fn propagate_application(store: &mut CmsStore, event: &mut ModelEvent<Page>) -> CmsResult<()> {
	let page = &event.instance;
	let changed = match &event.previous {
		Some(previous) => {
			previous.application_urls != page.application_urls
				|| previous.application_namespace != page.application_namespace
		}
		None => page.application_urls.is_some(),
	};
	if !changed {
		return Ok(());
	}

	if page.publisher_is_draft
		&& let Some(mut public) = page
			.publisher_public_id
			.and_then(|public| store.page(public))
			.cloned()
	{
		public.application_urls = page.application_urls.clone();
		public.application_namespace = page.application_namespace.clone();
		store.save_with(public, SaveOptions::quiet(), &mut event.ctx)?;
	}

	debug!(page = %page.id, urls = ?page.application_urls, "application changed");
	let page = page.clone();
	store.emit(
		PageSignal::ApplicationPostChanged,
		page,
		None,
		&mut event.ctx.fork(),
	)
}

/// Create the placeholders declared by the page's template
pub(super) fn update_placeholders(
	store: &mut CmsStore,
	event: &mut ModelEvent<Page>,
) -> CmsResult<()> {
	if event.is_raw() {
		return Ok(());
	}
	let page = event.instance.id;
	let slots = store
		.settings()
		.template_placeholders(&event.instance.template)
		.to_vec();
	for slot in slots {
		if store.placeholder_by_slot(page, &slot).is_none() {
			trace!(page = %page, slot = %slot, "creating declared placeholder");
			store.save_with(
				Placeholder::for_page(slot, page),
				SaveOptions::default(),
				&mut event.ctx,
			)?;
		}
	}
	Ok(())
}

pub(super) fn post_delete_page(store: &mut CmsStore, event: &mut ModelEvent<Page>) -> CmsResult<()> {
	if event.is_raw() {
		return Ok(());
	}
	home::update_home(store, &mut event.instance, None, &mut event.ctx)?;
	store.menu_cache().clear_site(event.instance.site_id);

	let placeholders: Vec<_> = store
		.placeholders_of(event.instance.id)
		.map(|placeholder| placeholder.id)
		.collect();
	for placeholder in placeholders {
		store.delete_placeholder_with(placeholder, &mut event.ctx)?;
	}
	Ok(())
}

pub(super) fn page_moved(store: &mut CmsStore, event: &mut PageEvent) -> CmsResult<()> {
	home::update_home(store, &mut event.instance, None, &mut event.ctx)?;
	paths::update_title_paths(store, event.instance.id, SaveOptions::default(), &mut event.ctx)
}

pub(super) fn update_home_on_publish(store: &mut CmsStore, event: &mut PageEvent) -> CmsResult<()> {
	home::update_home(store, &mut event.instance, None, &mut event.ctx)
}

pub(super) fn pre_save_title(store: &mut CmsStore, event: &mut ModelEvent<Title>) -> CmsResult<()> {
	if event.is_raw() {
		return Ok(());
	}
	let title = &event.instance;
	let mut page = store.get_page(title.page_id)?.clone();
	if !page.has_language(&title.language) {
		page.languages.push(title.language.clone());
		store.save_with(page.clone(), SaveOptions::quiet(), &mut event.ctx)?;
	}
	if !title.publisher_is_draft {
		store.menu_cache().clear_site(page.site_id);
	}

	let path = paths::compute_path(store, &event.instance)?;
	event.instance.path = path;
	Ok(())
}

pub(super) fn post_save_title(store: &mut CmsStore, event: &mut ModelEvent<Title>) -> CmsResult<()> {
	if event.is_raw() || event.options.skip_descendants {
		return Ok(());
	}
	let previous_path = event.previous.as_ref().map(|previous| previous.path.as_str());
	if previous_path == Some(event.instance.path.as_str()) {
		return Ok(());
	}
	paths::reset_descendant_paths(store, &event.instance, &mut event.ctx)
}

pub(super) fn pre_delete_title(store: &mut CmsStore, event: &mut ModelEvent<Title>) -> CmsResult<()> {
	if event.is_raw() {
		return Ok(());
	}
	let language = &event.instance.language;
	if let Some(mut page) = store.page(event.instance.page_id).cloned()
		&& page.has_language(language)
	{
		page.languages.retain(|code| code != language);
		store.save_with(page, SaveOptions::quiet(), &mut event.ctx)?;
	}
	Ok(())
}

/// Renumber the plugins left in the placeholder so positions stay dense
pub(super) fn update_plugin_positions(
	store: &mut CmsStore,
	event: &mut ModelEvent<CmsPlugin>,
) -> CmsResult<()> {
	if event.is_raw() {
		return Ok(());
	}
	let plugins: Vec<CmsPlugin> = store
		.plugins_in(event.instance.placeholder_id, &event.instance.language)
		.into_iter()
		.cloned()
		.collect();
	for (index, mut plugin) in plugins.into_iter().enumerate() {
		if plugin.position != index {
			plugin.position = index;
			store.save_with(plugin, SaveOptions::default(), &mut event.ctx)?;
		}
	}
	Ok(())
}

pub(super) fn mark_stack_dirty(
	store: &mut CmsStore,
	event: &mut ModelEvent<CmsPlugin>,
) -> CmsResult<()> {
	if event.is_raw() {
		return Ok(());
	}
	if let Some(mut stack) = store
		.stack_for_draft(event.instance.placeholder_id)
		.filter(|stack| !stack.dirty)
		.cloned()
	{
		stack.dirty = true;
		store.save_with(stack, SaveOptions::default(), &mut event.ctx)?;
	}
	Ok(())
}

/// Clear the cached grants of a user and of every member of a group
fn clear_grantees(store: &CmsStore, user: Option<UserId>, group: Option<GroupId>) {
	let cache = store.permission_cache();
	if let Some(user) = user {
		cache.clear_user(user);
	}
	if let Some(group) = group.and_then(|group| store.group(group)) {
		for member in &group.members {
			cache.clear_user(*member);
		}
	}
}

pub(super) fn clear_user_cache(store: &mut CmsStore, event: &mut ModelEvent<User>) -> CmsResult<()> {
	if event.is_raw() {
		return Ok(());
	}
	store.permission_cache().clear_user(event.instance.id);
	Ok(())
}

pub(super) fn post_save_user(store: &mut CmsStore, event: &mut ModelEvent<User>) -> CmsResult<()> {
	if event.is_raw() || !event.created {
		return Ok(());
	}
	if let Some(creator) = event.ctx.principal {
		store.record_user_creator(PageUserInfo {
			user_id: event.instance.id,
			created_by: creator,
			created_at: Utc::now(),
		});
	}
	Ok(())
}

pub(super) fn clear_group_cache(store: &mut CmsStore, event: &mut ModelEvent<Group>) -> CmsResult<()> {
	if event.is_raw() {
		return Ok(());
	}
	// Members removed by this save lose their grants as well
	clear_grantees(store, None, Some(event.instance.id));
	let cache = store.permission_cache();
	for member in &event.instance.members {
		cache.clear_user(*member);
	}
	Ok(())
}

pub(super) fn post_save_user_group(
	store: &mut CmsStore,
	event: &mut ModelEvent<Group>,
) -> CmsResult<()> {
	if event.is_raw() || !event.created {
		return Ok(());
	}
	if let Some(creator) = event.ctx.principal {
		store.record_group_creator(PageUserGroupInfo {
			group_id: event.instance.id,
			created_by: creator,
			created_at: Utc::now(),
		});
	}
	Ok(())
}

pub(super) fn clear_page_permission_cache(
	store: &mut CmsStore,
	event: &mut ModelEvent<PagePermission>,
) -> CmsResult<()> {
	if event.is_raw() {
		return Ok(());
	}
	clear_grantees(store, event.instance.user_id, event.instance.group_id);
	Ok(())
}

pub(super) fn clear_global_permission_cache(
	store: &mut CmsStore,
	event: &mut ModelEvent<GlobalPagePermission>,
) -> CmsResult<()> {
	if event.is_raw() {
		return Ok(());
	}
	clear_grantees(store, event.instance.user_id, event.instance.group_id);
	store.menu_cache().clear_all();
	Ok(())
}
