//! Signal-dispatching persistence
//!
//! Every entity implements [`Persisted`]. The store's generic
//! [`CmsStore::save_with`] and [`CmsStore::delete_with`] wrap the raw
//! `write`/`erase` of the entity in its `pre_*`/`post_*` signals.

use super::CmsStore;
use crate::error::{CmsError, CmsResult};
use crate::events::{ModelEvent, MutationContext, SaveOptions};
use crate::ids::{GroupId, PageId, PermissionId, PlaceholderId, PluginId, StackId, TitleId, UserId};
use crate::models::{
	CmsPlugin, GlobalPagePermission, Group, Page, PagePermission, Placeholder, PublisherState, Stack,
	Title, User,
};
use crate::reactor::{EntitySignals, Reactor};
use chrono::Utc;
use std::fmt::Display;
use std::hash::Hash;
use std::mem;
use std::sync::Arc;
use tracing::trace;

/// An entity stored in a [`CmsStore`]
pub trait Persisted: Clone + Send + Sync + 'static {
	/// Identifier type
	type Id: Copy + Eq + Hash + Display;

	/// Model name used in errors and logs
	const MODEL: &'static str;

	/// Identifier of this instance
	fn id(&self) -> Self::Id;

	/// Lifecycle signals of this entity type
	fn signals(reactor: &Reactor) -> &EntitySignals<Self>;

	/// Stored instance
	fn fetch(store: &CmsStore, id: Self::Id) -> Option<&Self>;

	/// Insert or replace the stored instance without dispatching signals
	fn write(store: &mut CmsStore, instance: Self) -> CmsResult<()>;

	/// Remove the stored instance without dispatching signals
	fn erase(store: &mut CmsStore, id: Self::Id) -> CmsResult<Option<Self>>;

	/// Bookkeeping applied right before a save
	fn touch(&mut self, _options: &SaveOptions) {}
}

impl CmsStore {
	/// Save an instance with default options and an anonymous context
	pub fn save<T: Persisted>(&mut self, instance: T) -> CmsResult<T> {
		self.save_with(instance, SaveOptions::default(), &mut MutationContext::new())
	}

	/// Save an instance on behalf of `principal`
	pub fn save_as<T: Persisted>(&mut self, instance: T, principal: UserId) -> CmsResult<T> {
		self.save_with(
			instance,
			SaveOptions::default(),
			&mut MutationContext::as_principal(principal),
		)
	}

	/// Save an instance, dispatching `pre_save` and `post_save`
	///
	/// Returns the instance as left by the post-save receivers. Writes made by
	/// receivers before a failure are kept.
	pub fn save_with<T: Persisted>(
		&mut self,
		mut instance: T,
		options: SaveOptions,
		ctx: &mut MutationContext,
	) -> CmsResult<T> {
		instance.touch(&options);
		let created = T::fetch(self, instance.id()).is_none();
		if options.skip_signals {
			T::write(self, instance.clone())?;
			return Ok(instance);
		}

		trace!(model = T::MODEL, id = %instance.id(), created, "saving");
		let reactor = Arc::clone(&self.reactor);
		let signals = T::signals(&reactor);
		let mut event = ModelEvent::new(instance, created, options, mem::take(ctx));
		let result = self.dispatch_save(signals, &mut event);
		*ctx = mem::take(&mut event.ctx);
		result.map(|()| event.instance)
	}

	fn dispatch_save<T: Persisted>(
		&mut self,
		signals: &EntitySignals<T>,
		event: &mut ModelEvent<T>,
	) -> CmsResult<()> {
		signals.pre_save.send(self, event)?;
		T::write(self, event.instance.clone())?;
		signals.post_save.send(self, event)
	}

	/// Delete an instance with default options and an anonymous context
	pub fn delete<T: Persisted>(&mut self, id: T::Id) -> CmsResult<T> {
		self.delete_with::<T>(id, SaveOptions::default(), &mut MutationContext::new())
	}

	/// Delete an instance, dispatching `pre_delete` and `post_delete`
	pub fn delete_with<T: Persisted>(
		&mut self,
		id: T::Id,
		options: SaveOptions,
		ctx: &mut MutationContext,
	) -> CmsResult<T> {
		let instance = T::fetch(self, id)
			.cloned()
			.ok_or_else(|| CmsError::not_found(T::MODEL, id))?;
		if options.skip_signals {
			T::erase(self, id)?;
			return Ok(instance);
		}

		trace!(model = T::MODEL, %id, "deleting");
		let reactor = Arc::clone(&self.reactor);
		let signals = T::signals(&reactor);
		let mut event = ModelEvent::new(instance, false, options, mem::take(ctx));
		let result = self.dispatch_delete(signals, &mut event);
		*ctx = mem::take(&mut event.ctx);
		result.map(|()| event.instance)
	}

	fn dispatch_delete<T: Persisted>(
		&mut self,
		signals: &EntitySignals<T>,
		event: &mut ModelEvent<T>,
	) -> CmsResult<()> {
		signals.pre_delete.send(self, event)?;
		T::erase(self, event.instance.id())?;
		signals.post_delete.send(self, event)
	}
}

fn mark_dirty(is_draft: bool, state: &mut PublisherState, options: &SaveOptions) {
	if is_draft && !options.keep_state {
		*state = PublisherState::Dirty;
	}
}

impl Persisted for Page {
	type Id = PageId;
	const MODEL: &'static str = "Page";

	fn id(&self) -> PageId {
		self.id
	}

	fn signals(reactor: &Reactor) -> &EntitySignals<Self> {
		&reactor.pages
	}

	fn fetch(store: &CmsStore, id: PageId) -> Option<&Self> {
		store.pages.get(&id)
	}

	fn write(store: &mut CmsStore, instance: Self) -> CmsResult<()> {
		if let Some(parent) = instance.parent_id {
			let parent = store.get_page(parent)?;
			if parent.publisher_is_draft != instance.publisher_is_draft {
				return Err(CmsError::InvalidHierarchy(format!(
					"page {} and its parent {} are not of the same draft/public kind",
					instance.id, parent.id
				)));
			}
		}
		store.tree.place(instance.id, instance.parent_id, None)?;
		store.pages.insert(instance.id, instance);
		Ok(())
	}

	fn erase(store: &mut CmsStore, id: PageId) -> CmsResult<Option<Self>> {
		if store.tree.contains(id) {
			store.tree.remove(id)?;
		}
		Ok(store.pages.shift_remove(&id))
	}

	fn touch(&mut self, options: &SaveOptions) {
		self.changed_date = Utc::now();
		mark_dirty(self.publisher_is_draft, &mut self.publisher_state, options);
	}
}

impl Persisted for Title {
	type Id = TitleId;
	const MODEL: &'static str = "Title";

	fn id(&self) -> TitleId {
		self.id
	}

	fn signals(reactor: &Reactor) -> &EntitySignals<Self> {
		&reactor.titles
	}

	fn fetch(store: &CmsStore, id: TitleId) -> Option<&Self> {
		store.titles.get(&id)
	}

	fn write(store: &mut CmsStore, instance: Self) -> CmsResult<()> {
		store.get_page(instance.page_id)?;
		if let Some(other) = store.title(instance.page_id, &instance.language)
			&& other.id != instance.id
		{
			return Err(CmsError::Integrity(format!(
				"page {} already has a title in '{}'",
				instance.page_id, instance.language
			)));
		}
		store.titles.insert(instance.id, instance);
		Ok(())
	}

	fn erase(store: &mut CmsStore, id: TitleId) -> CmsResult<Option<Self>> {
		Ok(store.titles.shift_remove(&id))
	}

	fn touch(&mut self, options: &SaveOptions) {
		mark_dirty(self.publisher_is_draft, &mut self.publisher_state, options);
	}
}

impl Persisted for Placeholder {
	type Id = PlaceholderId;
	const MODEL: &'static str = "Placeholder";

	fn id(&self) -> PlaceholderId {
		self.id
	}

	fn signals(reactor: &Reactor) -> &EntitySignals<Self> {
		&reactor.placeholders
	}

	fn fetch(store: &CmsStore, id: PlaceholderId) -> Option<&Self> {
		store.placeholders.get(&id)
	}

	fn write(store: &mut CmsStore, instance: Self) -> CmsResult<()> {
		if let Some(page) = instance.page_id {
			store.get_page(page)?;
		}
		store.placeholders.insert(instance.id, instance);
		Ok(())
	}

	fn erase(store: &mut CmsStore, id: PlaceholderId) -> CmsResult<Option<Self>> {
		store.plugins.retain(|_, plugin| plugin.placeholder_id != id);
		Ok(store.placeholders.shift_remove(&id))
	}
}

impl Persisted for CmsPlugin {
	type Id = PluginId;
	const MODEL: &'static str = "CmsPlugin";

	fn id(&self) -> PluginId {
		self.id
	}

	fn signals(reactor: &Reactor) -> &EntitySignals<Self> {
		&reactor.plugins
	}

	fn fetch(store: &CmsStore, id: PluginId) -> Option<&Self> {
		store.plugins.get(&id)
	}

	fn write(store: &mut CmsStore, instance: Self) -> CmsResult<()> {
		store.get_placeholder(instance.placeholder_id)?;
		if let Some(parent) = instance.parent_id {
			let parent = store
				.plugin(parent)
				.ok_or_else(|| CmsError::not_found(Self::MODEL, parent))?;
			if parent.placeholder_id != instance.placeholder_id || parent.language != instance.language {
				return Err(CmsError::Integrity(format!(
					"plugin {} must share placeholder and language with its parent {}",
					instance.id, parent.id
				)));
			}
		}
		store.plugins.insert(instance.id, instance);
		Ok(())
	}

	fn erase(store: &mut CmsStore, id: PluginId) -> CmsResult<Option<Self>> {
		Ok(store.plugins.shift_remove(&id))
	}
}

impl Persisted for Stack {
	type Id = StackId;
	const MODEL: &'static str = "Stack";

	fn id(&self) -> StackId {
		self.id
	}

	fn signals(reactor: &Reactor) -> &EntitySignals<Self> {
		&reactor.stacks
	}

	fn fetch(store: &CmsStore, id: StackId) -> Option<&Self> {
		store.stacks.get(&id)
	}

	fn write(store: &mut CmsStore, instance: Self) -> CmsResult<()> {
		if let Some(other) = store.stack_by_code(&instance.code)
			&& other.id != instance.id
		{
			return Err(CmsError::Integrity(format!(
				"stack code '{}' is already used",
				instance.code
			)));
		}
		store.get_placeholder(instance.draft)?;
		store.get_placeholder(instance.public)?;
		store.stacks.insert(instance.id, instance);
		Ok(())
	}

	fn erase(store: &mut CmsStore, id: StackId) -> CmsResult<Option<Self>> {
		Ok(store.stacks.shift_remove(&id))
	}

	fn touch(&mut self, _options: &SaveOptions) {
		self.clean();
	}
}

impl Persisted for User {
	type Id = UserId;
	const MODEL: &'static str = "User";

	fn id(&self) -> UserId {
		self.id
	}

	fn signals(reactor: &Reactor) -> &EntitySignals<Self> {
		&reactor.users
	}

	fn fetch(store: &CmsStore, id: UserId) -> Option<&Self> {
		store.users.get(&id)
	}

	fn write(store: &mut CmsStore, instance: Self) -> CmsResult<()> {
		store.users.insert(instance.id, instance);
		Ok(())
	}

	fn erase(store: &mut CmsStore, id: UserId) -> CmsResult<Option<Self>> {
		for group in store.groups.values_mut() {
			group.members.retain(|member| *member != id);
		}
		Ok(store.users.shift_remove(&id))
	}
}

impl Persisted for Group {
	type Id = GroupId;
	const MODEL: &'static str = "Group";

	fn id(&self) -> GroupId {
		self.id
	}

	fn signals(reactor: &Reactor) -> &EntitySignals<Self> {
		&reactor.groups
	}

	fn fetch(store: &CmsStore, id: GroupId) -> Option<&Self> {
		store.groups.get(&id)
	}

	fn write(store: &mut CmsStore, instance: Self) -> CmsResult<()> {
		store.groups.insert(instance.id, instance);
		Ok(())
	}

	fn erase(store: &mut CmsStore, id: GroupId) -> CmsResult<Option<Self>> {
		Ok(store.groups.shift_remove(&id))
	}
}

impl Persisted for PagePermission {
	type Id = PermissionId;
	const MODEL: &'static str = "PagePermission";

	fn id(&self) -> PermissionId {
		self.id
	}

	fn signals(reactor: &Reactor) -> &EntitySignals<Self> {
		&reactor.page_permissions
	}

	fn fetch(store: &CmsStore, id: PermissionId) -> Option<&Self> {
		store.page_permissions.get(&id)
	}

	fn write(store: &mut CmsStore, instance: Self) -> CmsResult<()> {
		if let Some(page) = instance.page_id {
			store.get_page(page)?;
		}
		store.page_permissions.insert(instance.id, instance);
		Ok(())
	}

	fn erase(store: &mut CmsStore, id: PermissionId) -> CmsResult<Option<Self>> {
		Ok(store.page_permissions.shift_remove(&id))
	}
}

impl Persisted for GlobalPagePermission {
	type Id = PermissionId;
	const MODEL: &'static str = "GlobalPagePermission";

	fn id(&self) -> PermissionId {
		self.id
	}

	fn signals(reactor: &Reactor) -> &EntitySignals<Self> {
		&reactor.global_permissions
	}

	fn fetch(store: &CmsStore, id: PermissionId) -> Option<&Self> {
		store.global_permissions.get(&id)
	}

	fn write(store: &mut CmsStore, instance: Self) -> CmsResult<()> {
		store.global_permissions.insert(instance.id, instance);
		Ok(())
	}

	fn erase(store: &mut CmsStore, id: PermissionId) -> CmsResult<Option<Self>> {
		Ok(store.global_permissions.shift_remove(&id))
	}
}
