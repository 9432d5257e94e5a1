//! Compound store operations

use super::CmsStore;
use crate::error::{CmsError, CmsResult};
use crate::events::{MutationContext, PageEvent, SaveOptions};
use crate::ids::{PageId, PlaceholderId, PluginId};
use crate::models::{CmsPlugin, Page, Placeholder, Title};
use crate::reactor::PageSignal;
use serde_json::Value;
use std::mem;
use std::sync::Arc;
use tracing::{debug, info};

impl CmsStore {
	/// Move a page under `parent` (or to the root level) at `index`
	///
	/// Saves the page, then sends `page_moved`.
	pub fn move_page(
		&mut self,
		id: PageId,
		parent: Option<PageId>,
		index: Option<usize>,
	) -> CmsResult<Page> {
		self.move_page_with(id, parent, index, &mut MutationContext::new())
	}

	/// [`move_page`](Self::move_page) within an existing cascade
	pub fn move_page_with(
		&mut self,
		id: PageId,
		parent: Option<PageId>,
		index: Option<usize>,
		ctx: &mut MutationContext,
	) -> CmsResult<Page> {
		let mut page = self.get_page(id)?.clone();
		if let Some(parent) = parent {
			self.get_page(parent)?;
			if parent == id || self.tree.is_descendant(parent, id) {
				return Err(CmsError::InvalidHierarchy(format!(
					"cannot move page {id} below its own descendant {parent}"
				)));
			}
		}

		info!(page = %id, parent = ?parent, index = ?index, "moving page");
		page.parent_id = parent;
		let page = self.save_with(page, SaveOptions::default(), ctx)?;
		if index.is_some() {
			self.tree.place(id, parent, index)?;
		}
		self.emit(PageSignal::PageMoved, page.clone(), None, &mut ctx.fork())?;
		Ok(self.get_page(id)?.clone())
	}

	/// Delete a page with its descendants, titles, placeholders and plugins
	///
	/// The public counterpart, if any, is deleted as well.
	pub fn delete_page(&mut self, id: PageId) -> CmsResult<()> {
		self.delete_page_with(id, &mut MutationContext::new())
	}

	/// [`delete_page`](Self::delete_page) within an existing cascade
	pub fn delete_page_with(&mut self, id: PageId, ctx: &mut MutationContext) -> CmsResult<()> {
		let public = self.get_page(id)?.publisher_public_id;
		let mut subtree = self.tree.subtree(id);
		subtree.reverse();
		debug!(page = %id, count = subtree.len(), "deleting page subtree");

		for node in subtree {
			let titles: Vec<_> = self.titles_of(node).map(|title| title.id).collect();
			let mut node_ctx = ctx.fork();
			for title in titles {
				self.delete_with::<Title>(title, SaveOptions::default(), &mut node_ctx)?;
			}
			self.delete_with::<Page>(node, SaveOptions::default(), &mut node_ctx)?;
		}

		if let Some(public) = public
			&& self.page(public).is_some()
		{
			self.delete_page_with(public, ctx)?;
		}
		Ok(())
	}

	/// Append a root plugin to a placeholder
	pub fn add_plugin(
		&mut self,
		placeholder: PlaceholderId,
		language: &str,
		plugin_type: &str,
		data: Value,
	) -> CmsResult<CmsPlugin> {
		self.get_placeholder(placeholder)?;
		let position = self.plugins_in(placeholder, language).len();
		self.save(CmsPlugin::new(placeholder, language, plugin_type, position, data))
	}

	/// Append a child plugin under `parent`
	pub fn add_child_plugin(
		&mut self,
		parent: PluginId,
		plugin_type: &str,
		data: Value,
	) -> CmsResult<CmsPlugin> {
		let parent = self
			.plugin(parent)
			.ok_or_else(|| CmsError::not_found("CmsPlugin", parent))?
			.clone();
		let position = self.plugins_in(parent.placeholder_id, &parent.language).len();
		let mut plugin = CmsPlugin::new(
			parent.placeholder_id,
			parent.language,
			plugin_type,
			position,
			data,
		);
		plugin.parent_id = Some(parent.id);
		self.save(plugin)
	}

	/// Delete a plugin and its descendants, children first
	pub fn delete_plugin(&mut self, id: PluginId) -> CmsResult<()> {
		self.delete_plugin_with(id, &mut MutationContext::new())
	}

	/// [`delete_plugin`](Self::delete_plugin) within an existing cascade
	pub fn delete_plugin_with(&mut self, id: PluginId, ctx: &mut MutationContext) -> CmsResult<()> {
		let children: Vec<PluginId> = self.child_plugins(id).iter().map(|plugin| plugin.id).collect();
		for child in children {
			self.delete_plugin_with(child, ctx)?;
		}
		self.delete_with::<CmsPlugin>(id, SaveOptions::default(), ctx)?;
		Ok(())
	}

	/// Delete a placeholder with every plugin it holds
	pub fn delete_placeholder(&mut self, id: PlaceholderId) -> CmsResult<()> {
		self.delete_placeholder_with(id, &mut MutationContext::new())
	}

	/// [`delete_placeholder`](Self::delete_placeholder) within an existing cascade
	pub fn delete_placeholder_with(
		&mut self,
		id: PlaceholderId,
		ctx: &mut MutationContext,
	) -> CmsResult<()> {
		let roots: Vec<PluginId> = self
			.all_plugins_in(id)
			.into_iter()
			.filter(|plugin| plugin.parent_id.is_none())
			.map(|plugin| plugin.id)
			.collect();
		for plugin in roots {
			self.delete_plugin_with(plugin, ctx)?;
		}
		self.delete_with::<Placeholder>(id, SaveOptions::default(), ctx)?;
		Ok(())
	}

	/// Send a page domain signal
	pub fn emit(
		&mut self,
		signal: PageSignal,
		page: Page,
		language: Option<String>,
		ctx: &mut MutationContext,
	) -> CmsResult<()> {
		let reactor = Arc::clone(&self.reactor);
		let mut event = PageEvent {
			instance: page,
			language,
			ctx: mem::take(ctx),
		};
		let result = reactor.page_signal(signal).send(self, &mut event);
		*ctx = mem::take(&mut event.ctx);
		result
	}
}
