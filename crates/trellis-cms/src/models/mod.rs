//! CMS entities

mod auth;
mod page;
mod placeholder;
mod plugin;
mod stack;
mod title;

pub use auth::{GlobalPagePermission, GrantOn, Group, PagePermission, PageUserGroupInfo, PageUserInfo, User};
pub use page::{Page, PublisherState};
pub use placeholder::Placeholder;
pub use plugin::{CmsPlugin, RenderMeta};
pub use stack::{CHANGE_STACK_PERMISSION, CreationMethod, PUBLISH_STACK_PERMISSION, Stack};
pub use title::Title;
