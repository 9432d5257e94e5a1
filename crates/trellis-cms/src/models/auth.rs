use crate::ids::{GroupId, PageId, PermissionId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use trellis_conf::SiteId;

/// An authenticated account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
	/// Identifier
	pub id: UserId,
	/// Login name
	pub username: String,
	/// Bypasses every permission check
	pub is_superuser: bool,
	/// May use the editing interface
	pub is_staff: bool,
	/// Inactive users have no permissions
	pub is_active: bool,
	/// Granted permission codenames, e.g. `cms.change_page`
	pub permissions: BTreeSet<String>,
}

impl User {
	/// Create an active user without permissions
	pub fn new(username: impl Into<String>) -> Self {
		Self {
			id: UserId::new(),
			username: username.into(),
			is_superuser: false,
			is_staff: false,
			is_active: true,
			permissions: BTreeSet::new(),
		}
	}

	/// Create an active superuser
	pub fn superuser(username: impl Into<String>) -> Self {
		Self {
			is_superuser: true,
			is_staff: true,
			..Self::new(username)
		}
	}

	/// Grant a permission codename
	pub fn with_perm(mut self, perm: impl Into<String>) -> Self {
		self.permissions.insert(perm.into());
		self
	}

	/// Whether the user holds `perm`
	pub fn has_perm(&self, perm: &str) -> bool {
		self.is_active && (self.is_superuser || self.permissions.contains(perm))
	}
}

/// A named set of users
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
	/// Identifier
	pub id: GroupId,
	/// Group name
	pub name: String,
	/// Members
	pub members: Vec<UserId>,
}

impl Group {
	/// Create an empty group
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			id: GroupId::new(),
			name: name.into(),
			members: Vec::new(),
		}
	}

	/// Add a member
	pub fn with_member(mut self, user: UserId) -> Self {
		if !self.members.contains(&user) {
			self.members.push(user);
		}
		self
	}
}

/// Which pages a page permission applies to, relative to its page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantOn {
	/// The page only
	Page,
	/// Direct children only
	Children,
	/// All descendants, not the page itself
	Descendants,
	/// The page and its direct children
	PageAndChildren,
	/// The page and all its descendants
	#[default]
	PageAndDescendants,
}

/// Permission on a page subtree for a user or a group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagePermission {
	/// Identifier
	pub id: PermissionId,
	/// Page the grant is anchored on
	pub page_id: Option<PageId>,
	/// Grantee user
	pub user_id: Option<UserId>,
	/// Grantee group
	pub group_id: Option<GroupId>,
	/// Scope relative to `page_id`
	pub grant_on: GrantOn,
	/// May edit
	pub can_change: bool,
	/// May publish
	pub can_publish: bool,
	/// May delete
	pub can_delete: bool,
}

impl PagePermission {
	/// Grant nothing on `page` yet
	pub fn new(page: PageId) -> Self {
		Self {
			id: PermissionId::new(),
			page_id: Some(page),
			user_id: None,
			group_id: None,
			grant_on: GrantOn::default(),
			can_change: false,
			can_publish: false,
			can_delete: false,
		}
	}
}

/// Site-wide permission for a user or a group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalPagePermission {
	/// Identifier
	pub id: PermissionId,
	/// Grantee user
	pub user_id: Option<UserId>,
	/// Grantee group
	pub group_id: Option<GroupId>,
	/// Sites covered; empty means every site
	pub sites: Vec<SiteId>,
	/// May edit
	pub can_change: bool,
	/// May publish
	pub can_publish: bool,
	/// May delete
	pub can_delete: bool,
}

impl GlobalPagePermission {
	/// Grant nothing on every site yet
	pub fn new() -> Self {
		Self {
			id: PermissionId::new(),
			user_id: None,
			group_id: None,
			sites: Vec::new(),
			can_change: false,
			can_publish: false,
			can_delete: false,
		}
	}
}

impl Default for GlobalPagePermission {
	fn default() -> Self {
		Self::new()
	}
}

/// Records which principal created a user account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageUserInfo {
	/// Created user
	pub user_id: UserId,
	/// Creating principal
	pub created_by: UserId,
	/// Creation time
	pub created_at: DateTime<Utc>,
}

/// Records which principal created a group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageUserGroupInfo {
	/// Created group
	pub group_id: GroupId,
	/// Creating principal
	pub created_by: UserId,
	/// Creation time
	pub created_at: DateTime<Utc>,
}
