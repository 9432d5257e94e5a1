use crate::ids::{PlaceholderId, StackId};
use crate::request::RenderRequest;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Permission needed to edit stacks
pub const CHANGE_STACK_PERMISSION: &str = "stacks.change_stack";
/// Permission needed, in addition to [`CHANGE_STACK_PERMISSION`], to publish stacks
pub const PUBLISH_STACK_PERMISSION: &str = "stacks.publish_stack";

/// How a stack came into existence
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreationMethod {
	/// Created on first use from a template tag
	Template,
	/// Created explicitly
	#[default]
	Code,
}

/// Reusable, page-independent draft/public placeholder pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stack {
	/// Identifier
	pub id: StackId,
	/// Descriptive name, not shown to visitors
	pub name: String,
	/// Unique code used to render the stack
	pub code: String,
	/// Editable placeholder
	pub draft: PlaceholderId,
	/// Published placeholder
	pub public: PlaceholderId,
	/// Draft changed since the last publish
	pub dirty: bool,
	/// Origin of the stack
	pub creation_method: CreationMethod,
}

impl Stack {
	/// Generate a code when none was given
	pub fn clean(&mut self) {
		if self.code.is_empty() {
			self.code = format!("stack-{}", Uuid::new_v4());
		}
	}

	/// Whether the requesting user may edit the stack
	pub fn has_change_permission(&self, request: &RenderRequest) -> bool {
		request
			.user
			.as_ref()
			.is_some_and(|user| user.has_perm(CHANGE_STACK_PERMISSION))
	}

	/// Whether the requesting user may publish the stack
	///
	/// Superusers always may; other users need both the change and the publish
	/// permission.
	pub fn has_publish_permission(&self, request: &RenderRequest) -> bool {
		request.user.as_ref().is_some_and(|user| {
			user.has_perm(CHANGE_STACK_PERMISSION) && user.has_perm(PUBLISH_STACK_PERMISSION)
		})
	}
}
