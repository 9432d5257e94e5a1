//! Draft/public publishing
//!
//! Publishing a language copies the draft page, its title in that language
//! and the plugins of that language into the public counterpart.

use crate::error::{CmsError, CmsResult};
use crate::events::{MutationContext, SaveOptions};
use crate::ids::{PageId, PlaceholderId, PluginId};
use crate::models::{CmsPlugin, Page, Placeholder, PublisherState, Title};
use crate::reactor::PageSignal;
use crate::store::CmsStore;
use chrono::Utc;
use std::collections::HashMap;
use tracing::{debug, info};

/// Deep-copy `plugins` into `target`
///
/// Parent links are remapped onto the copies; a plugin whose parent is not
/// part of `plugins` becomes a root plugin. Positions are kept. With
/// `language` set, copies are moved to that language.
pub fn copy_plugins_to(
	store: &mut CmsStore,
	plugins: &[CmsPlugin],
	target: PlaceholderId,
	language: Option<&str>,
	ctx: &mut MutationContext,
) -> CmsResult<Vec<CmsPlugin>> {
	store.get_placeholder(target)?;
	let copied_ids: Vec<PluginId> = plugins.iter().map(|plugin| plugin.id).collect();
	let mut mapping: HashMap<PluginId, PluginId> = HashMap::new();
	let mut pending: Vec<&CmsPlugin> = plugins.iter().collect();
	let mut copies = Vec::with_capacity(plugins.len());

	while !pending.is_empty() {
		let before = pending.len();
		let mut deferred = Vec::new();
		for plugin in pending {
			let parent = match plugin.parent_id {
				Some(parent) if copied_ids.contains(&parent) => match mapping.get(&parent) {
					Some(copy) => Some(*copy),
					None => {
						deferred.push(plugin);
						continue;
					}
				},
				_ => None,
			};
			let mut copy = plugin.clone();
			copy.id = PluginId::new();
			copy.placeholder_id = target;
			copy.parent_id = parent;
			if let Some(language) = language {
				copy.language = language.to_string();
			}
			mapping.insert(plugin.id, copy.id);
			copies.push(store.save_with(copy, SaveOptions::default(), ctx)?);
		}
		if deferred.len() == before {
			return Err(CmsError::InvalidHierarchy(
				"plugin parent links form a cycle".to_string(),
			));
		}
		pending = deferred;
	}

	debug!(target = %target, count = copies.len(), "copied plugins");
	Ok(copies)
}

/// Delete every plugin of `placeholder` in `language`
fn clear_plugins(
	store: &mut CmsStore,
	placeholder: PlaceholderId,
	language: &str,
	ctx: &mut MutationContext,
) -> CmsResult<()> {
	let roots: Vec<PluginId> = store
		.root_plugins(placeholder, language)
		.iter()
		.map(|plugin| plugin.id)
		.collect();
	for plugin in roots {
		store.delete_plugin_with(plugin, ctx)?;
	}
	Ok(())
}

impl CmsStore {
	/// Publish `language` of the draft page `id`
	///
	/// The parent page must already be published. Sends `post_publish` and
	/// returns the public page.
	pub fn publish_page(
		&mut self,
		id: PageId,
		language: &str,
		ctx: &mut MutationContext,
	) -> CmsResult<Page> {
		let draft = self.get_page(id)?.clone();
		if !draft.publisher_is_draft {
			return Err(CmsError::Publish(format!("page {id} is not a draft")));
		}
		let draft_title = self
			.title(id, language)
			.cloned()
			.ok_or_else(|| CmsError::not_found("Title", format!("{id}/{language}")))?;
		let public_parent = match draft.parent_id {
			Some(parent) => Some(
				self.get_page(parent)?
					.publisher_public_id
					.filter(|public| self.page(*public).is_some())
					.ok_or_else(|| {
						CmsError::Publish(format!("parent page {parent} is not published"))
					})?,
			),
			None => None,
		};

		let now = Utc::now();
		let mut public = match draft.publisher_public_id.and_then(|public| self.page(public)) {
			Some(existing) => existing.clone(),
			None => {
				let mut page = Page::new(draft.site_id, draft.template.clone());
				page.publisher_is_draft = false;
				page
			}
		};
		public.parent_id = public_parent;
		public.site_id = draft.site_id;
		public.template = draft.template.clone();
		public.application_urls = draft.application_urls.clone();
		public.application_namespace = draft.application_namespace.clone();
		public.publisher_public_id = Some(draft.id);
		public.publication_date = draft.publication_date.or(Some(now));
		let public = self.save_with(public, SaveOptions::default(), &mut ctx.fork())?;

		let mut public_title = match draft_title
			.publisher_public_id
			.and_then(|title| self.title_by_id(title))
		{
			Some(existing) => existing.clone(),
			None => Title::new(&public, language, "", ""),
		};
		public_title.title = draft_title.title.clone();
		public_title.slug = draft_title.slug.clone();
		public_title.has_url_overwrite = draft_title.has_url_overwrite;
		if draft_title.has_url_overwrite {
			public_title.path = draft_title.path.clone();
		}
		public_title.published = true;
		public_title.publisher_is_draft = false;
		public_title.publisher_public_id = Some(draft_title.id);
		let public_title = self.save_with(public_title, SaveOptions::default(), &mut ctx.fork())?;

		let mut draft_title = draft_title;
		draft_title.published = true;
		draft_title.publisher_public_id = Some(public_title.id);
		draft_title.publisher_state = PublisherState::Default;
		self.save_with(draft_title, SaveOptions::keep_state(), &mut ctx.fork())?;

		let mut draft = self.get_page(id)?.clone();
		draft.publisher_public_id = Some(public.id);
		draft.publisher_state = PublisherState::Default;
		draft.publication_date = draft.publication_date.or(Some(now));
		let draft = self.save_with(draft, SaveOptions::keep_state(), &mut ctx.fork())?;

		self.publish_placeholders(&draft, public.id, language, ctx)?;

		// Re-run the public election now that the public title is published
		let public = self.get_page(public.id)?.clone();
		let public = self.save_with(public, SaveOptions::keep_state(), &mut ctx.fork())?;

		info!(page = %id, language, "published page");
		self.emit(
			PageSignal::PostPublish,
			draft,
			Some(language.to_string()),
			&mut ctx.fork(),
		)?;
		Ok(self.get_page(public.id)?.clone())
	}

	fn publish_placeholders(
		&mut self,
		draft: &Page,
		public: PageId,
		language: &str,
		ctx: &mut MutationContext,
	) -> CmsResult<()> {
		let placeholders: Vec<Placeholder> = self.placeholders_of(draft.id).cloned().collect();
		for placeholder in placeholders {
			let target = match self.placeholder_by_slot(public, &placeholder.slot) {
				Some(existing) => existing.id,
				None => {
					self.save_with(
						Placeholder::for_page(placeholder.slot.clone(), public),
						SaveOptions::default(),
						ctx,
					)?
					.id
				}
			};
			clear_plugins(self, target, language, ctx)?;
			let plugins: Vec<CmsPlugin> = self
				.plugins_in(placeholder.id, language)
				.into_iter()
				.cloned()
				.collect();
			copy_plugins_to(self, &plugins, target, None, ctx)?;
		}
		Ok(())
	}

	/// Unpublish `language` of the draft page `id`
	///
	/// Sends `post_unpublish`.
	pub fn unpublish_page(
		&mut self,
		id: PageId,
		language: &str,
		ctx: &mut MutationContext,
	) -> CmsResult<()> {
		let draft = self.get_page(id)?.clone();
		let mut draft_title = self
			.title(id, language)
			.cloned()
			.ok_or_else(|| CmsError::not_found("Title", format!("{id}/{language}")))?;
		let public_title = draft_title
			.publisher_public_id
			.and_then(|title| self.title_by_id(title))
			.cloned();

		draft_title.published = false;
		self.save_with(draft_title, SaveOptions::keep_state(), &mut ctx.fork())?;
		if let Some(mut public_title) = public_title {
			public_title.published = false;
			self.save_with(public_title, SaveOptions::keep_state(), &mut ctx.fork())?;
		}
		if let Some(public) = draft.publisher_public_id.and_then(|public| self.page(public)).cloned() {
			self.save_with(public, SaveOptions::keep_state(), &mut ctx.fork())?;
		}

		info!(page = %id, language, "unpublished page");
		let draft = self.get_page(id)?.clone();
		self.emit(
			PageSignal::PostUnpublish,
			draft,
			Some(language.to_string()),
			&mut ctx.fork(),
		)
	}
}
