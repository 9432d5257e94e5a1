//! Arena page tree
//!
//! Keeps parent links and ordered child lists. Roots are ordered too: the first
//! root is the first tree of the site ordering. Descendant queries return pages
//! in pre-order, so parents always come before their children.

use crate::error::{CmsError, CmsResult};
use crate::ids::PageId;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
struct Node {
	parent: Option<PageId>,
	children: Vec<PageId>,
}

/// Ordered forest of pages
#[derive(Debug, Clone, Default)]
pub struct PageTree {
	nodes: HashMap<PageId, Node>,
	roots: Vec<PageId>,
}

impl PageTree {
	/// Create an empty tree
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of pages in the tree
	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	/// Whether the tree is empty
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Whether `id` is in the tree
	pub fn contains(&self, id: PageId) -> bool {
		self.nodes.contains_key(&id)
	}

	/// Parent of `id`
	pub fn parent(&self, id: PageId) -> Option<PageId> {
		self.nodes.get(&id).and_then(|node| node.parent)
	}

	/// Ordered children of `id`
	pub fn children(&self, id: PageId) -> &[PageId] {
		self.nodes
			.get(&id)
			.map(|node| node.children.as_slice())
			.unwrap_or_default()
	}

	/// Root pages in tree order
	pub fn roots(&self) -> &[PageId] {
		&self.roots
	}

	fn siblings_mut(&mut self, parent: Option<PageId>) -> Option<&mut Vec<PageId>> {
		match parent {
			Some(parent) => self.nodes.get_mut(&parent).map(|node| &mut node.children),
			None => Some(&mut self.roots),
		}
	}

	/// Insert `id` under `parent`, or move it there if it is already present
	///
	/// `index` selects the position among the new siblings; `None` appends. A
	/// page that keeps its parent and gets no index keeps its position.
	pub fn place(&mut self, id: PageId, parent: Option<PageId>, index: Option<usize>) -> CmsResult<()> {
		if let Some(parent) = parent {
			if parent == id {
				return Err(CmsError::InvalidHierarchy(format!(
					"page {id} cannot be its own parent"
				)));
			}
			if !self.contains(parent) {
				return Err(CmsError::not_found("Page", parent));
			}
			if self.is_descendant(parent, id) {
				return Err(CmsError::InvalidHierarchy(format!(
					"page {parent} is a descendant of {id}"
				)));
			}
		}

		if let Some(node) = self.nodes.get(&id) {
			if node.parent == parent && index.is_none() {
				return Ok(());
			}
			let old_parent = node.parent;
			if let Some(siblings) = self.siblings_mut(old_parent) {
				siblings.retain(|sibling| *sibling != id);
			}
		}

		let node = self.nodes.entry(id).or_default();
		node.parent = parent;
		let siblings = self
			.siblings_mut(parent)
			.ok_or_else(|| CmsError::not_found("Page", id))?;
		let index = index.unwrap_or(siblings.len()).min(siblings.len());
		siblings.insert(index, id);
		Ok(())
	}

	/// Remove a leaf page
	pub fn remove(&mut self, id: PageId) -> CmsResult<()> {
		let Some(node) = self.nodes.get(&id) else {
			return Ok(());
		};
		if !node.children.is_empty() {
			return Err(CmsError::InvalidHierarchy(format!(
				"page {id} still has {} children",
				node.children.len()
			)));
		}
		let parent = node.parent;
		if let Some(siblings) = self.siblings_mut(parent) {
			siblings.retain(|sibling| *sibling != id);
		}
		self.nodes.remove(&id);
		Ok(())
	}

	/// Whether `id` lies strictly below `ancestor`
	pub fn is_descendant(&self, id: PageId, ancestor: PageId) -> bool {
		let mut current = self.parent(id);
		while let Some(page) = current {
			if page == ancestor {
				return true;
			}
			current = self.parent(page);
		}
		false
	}

	/// Ancestors of `id`, nearest first
	pub fn ancestors(&self, id: PageId) -> Vec<PageId> {
		let mut ancestors = Vec::new();
		let mut current = self.parent(id);
		while let Some(page) = current {
			ancestors.push(page);
			current = self.parent(page);
		}
		ancestors
	}

	/// `id` followed by its descendants, in pre-order
	pub fn subtree(&self, id: PageId) -> Vec<PageId> {
		if !self.contains(id) {
			return Vec::new();
		}
		let mut out = Vec::new();
		let mut stack = vec![id];
		while let Some(page) = stack.pop() {
			out.push(page);
			stack.extend(self.children(page).iter().rev().copied());
		}
		out
	}

	/// Descendants of `id`, in pre-order
	pub fn descendants(&self, id: PageId) -> Vec<PageId> {
		let mut subtree = self.subtree(id);
		if !subtree.is_empty() {
			subtree.remove(0);
		}
		subtree
	}

	/// Every page, in pre-order across the roots
	pub fn preorder(&self) -> Vec<PageId> {
		self.roots.iter().flat_map(|root| self.subtree(*root)).collect()
	}
}
