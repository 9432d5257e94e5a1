//! Stacks: reusable draft/public content blocks

use crate::error::{CmsError, CmsResult};
use crate::events::{MutationContext, SaveOptions};
use crate::ids::{PlaceholderId, PluginId, StackId};
use crate::models::{CmsPlugin, CreationMethod, Placeholder, Stack};
use crate::publisher::copy_plugins_to;
use crate::request::RenderRequest;
use crate::store::CmsStore;
use tracing::{debug, info};

impl CmsStore {
	/// Create a stack with empty draft and public placeholders
	///
	/// A blank `code` is replaced by a generated `stack-<uuid>`. Both
	/// placeholders use the code as slot.
	pub fn create_stack(
		&mut self,
		name: &str,
		code: Option<&str>,
		creation_method: CreationMethod,
	) -> CmsResult<Stack> {
		let mut ctx = MutationContext::new();
		let mut stack = Stack {
			id: StackId::new(),
			name: name.to_string(),
			code: code.unwrap_or_default().to_string(),
			draft: PlaceholderId::new(),
			public: PlaceholderId::new(),
			dirty: false,
			creation_method,
		};
		stack.clean();
		if self.stack_by_code(&stack.code).is_some() {
			return Err(CmsError::Integrity(format!(
				"stack code '{}' is already used",
				stack.code
			)));
		}

		let draft = self.save_with(Placeholder::new(stack.code.clone()), SaveOptions::default(), &mut ctx)?;
		let public = self.save_with(Placeholder::new(stack.code.clone()), SaveOptions::default(), &mut ctx)?;
		stack.draft = draft.id;
		stack.public = public.id;
		debug!(code = %stack.code, "creating stack");
		self.save_with(stack, SaveOptions::default(), &mut ctx)
	}

	/// Stack with `code`, created on first use from a template
	pub fn get_or_create_stack(&mut self, code: &str) -> CmsResult<Stack> {
		if let Some(stack) = self.stack_by_code(code) {
			return Ok(stack.clone());
		}
		self.create_stack(code, Some(code), CreationMethod::Template)
	}

	/// Placeholder to render for a stack: the draft in edit mode, else the public one
	pub fn stack_placeholder(&self, code: &str, request: &RenderRequest) -> Option<PlaceholderId> {
		let stack = self.stack_by_code(code)?;
		if request.edit_mode() && stack.has_change_permission(request) {
			Some(stack.draft)
		} else {
			Some(stack.public)
		}
	}

	/// Replace the public content of a stack with a copy of its draft
	///
	/// Returns `false` without changes when the request lacks the publish
	/// permission and `force` is not set.
	pub fn publish_stack(
		&mut self,
		code: &str,
		request: &RenderRequest,
		force: bool,
	) -> CmsResult<bool> {
		let mut stack = self
			.stack_by_code(code)
			.cloned()
			.ok_or_else(|| CmsError::not_found("Stack", code))?;
		if !force && !stack.has_publish_permission(request) {
			debug!(code, "stack publish denied");
			return Ok(false);
		}

		let mut ctx = MutationContext::new();
		let public_roots: Vec<PluginId> = self
			.all_plugins_in(stack.public)
			.into_iter()
			.filter(|plugin| plugin.parent_id.is_none())
			.map(|plugin| plugin.id)
			.collect();
		for plugin in public_roots {
			self.delete_plugin_with(plugin, &mut ctx)?;
		}

		let plugins: Vec<CmsPlugin> = self
			.all_plugins_in(stack.draft)
			.into_iter()
			.cloned()
			.collect();
		copy_plugins_to(self, &plugins, stack.public, None, &mut ctx)?;

		stack.dirty = false;
		self.save_with(stack, SaveOptions::default(), &mut ctx)?;
		info!(code, plugins = plugins.len(), "published stack");
		Ok(true)
	}
}
