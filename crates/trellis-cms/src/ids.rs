//! Entity identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! define_id {
	($(#[$meta:meta])* $name:ident) => {
		$(#[$meta])*
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
		#[serde(transparent)]
		pub struct $name(Uuid);

		impl $name {
			/// Generate a fresh random identifier
			pub fn new() -> Self {
				Self(Uuid::new_v4())
			}

			/// Wrap an existing UUID
			pub fn from_uuid(uuid: Uuid) -> Self {
				Self(uuid)
			}

			/// The underlying UUID
			pub fn as_uuid(&self) -> &Uuid {
				&self.0
			}
		}

		impl Default for $name {
			fn default() -> Self {
				Self::new()
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				fmt::Display::fmt(&self.0, f)
			}
		}
	};
}

define_id!(
	/// Page identifier
	PageId
);
define_id!(
	/// Title identifier
	TitleId
);
define_id!(
	/// Placeholder identifier
	PlaceholderId
);
define_id!(
	/// Plugin instance identifier
	PluginId
);
define_id!(
	/// Stack identifier
	StackId
);
define_id!(
	/// User identifier
	UserId
);
define_id!(
	/// Group identifier
	GroupId
);
define_id!(
	/// Page or global permission identifier
	PermissionId
);
