//! Home page election
//!
//! Each site has at most one home page per draft/public kind: the first root
//! page, in tree order, that has a published title.

use crate::error::CmsResult;
use crate::events::{MutationContext, SaveOptions};
use crate::ids::PageId;
use crate::models::Page;
use crate::store::CmsStore;
use tracing::{debug, info};
use trellis_conf::SiteId;

/// First root page of `site` and kind `draft` having a published title
pub fn find_home(store: &CmsStore, site: SiteId, draft: bool) -> Option<PageId> {
	store
		.root_pages(site, draft)
		.find(|page| store.has_published_title(page.id))
		.map(|page| page.id)
}

/// Whether some title of `page` is published along with its public counterpart
fn has_published_pair(store: &CmsStore, page: PageId) -> bool {
	store.titles_of(page).any(|title| {
		title.published
			&& title
				.publisher_public_id
				.and_then(|public| store.title_by_id(public))
				.is_some_and(|public| public.published)
	})
}

/// Re-elect the home page after `instance` was saved, moved, published or deleted
///
/// Only root pages (or pages that used to be root) can affect the election.
/// Pages written here are marked in `ctx` so their own post-save does not
/// start another election; `instance.is_home` is updated in place.
pub fn update_home(
	store: &mut CmsStore,
	instance: &mut Page,
	previous: Option<&Page>,
	ctx: &mut MutationContext,
) -> CmsResult<()> {
	if ctx.is_home_checked(instance.id) {
		return Ok(());
	}
	let was_root = previous.is_some_and(Page::is_root);
	if !instance.is_root() && !was_root {
		return Ok(());
	}

	let site = instance.site_id;
	let draft = instance.publisher_is_draft;
	let home = match find_home(store, site, draft) {
		Some(home) => home,
		None if draft && has_published_pair(store, instance.id) => {
			debug!(page = %instance.id, "no home candidate, keeping current state");
			return Ok(());
		}
		None => {
			instance.is_home = true;
			instance.id
		}
	};

	let demoted: Vec<Page> = store
		.home_pages(site, draft)
		.filter(|page| page.id != home)
		.cloned()
		.collect();
	for mut page in demoted {
		if page.id == instance.id {
			instance.is_home = false;
		}
		info!(page = %page.id, site, draft, "demoting home page");
		ctx.mark_home_checked(page.id);
		page.is_home = false;
		store.save_with(page, SaveOptions::keep_state(), ctx)?;
	}

	let Some(page) = store.page(home).filter(|page| page.site_id == site).cloned() else {
		return Ok(());
	};
	if home == instance.id {
		instance.is_home = true;
	}
	ctx.mark_home_checked(home);
	if !page.is_home {
		info!(page = %home, site, draft, "promoting home page");
		let mut page = page;
		page.is_home = true;
		store.save_with(page, SaveOptions::keep_state(), ctx)?;
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::models::Title;
	use rstest::*;
	use trellis_conf::CmsSettings;

	#[fixture]
	fn store() -> CmsStore {
		CmsStore::new(CmsSettings::default())
	}

	fn published_root(store: &mut CmsStore, slug: &str) -> PageId {
		let page = store.save(Page::new(1, "base.html")).unwrap();
		store
			.save(Title::new(&page, "en", slug, slug).published())
			.unwrap();
		let stored = store.page(page.id).unwrap().clone();
		store.save(stored).unwrap();
		page.id
	}

	#[rstest]
	fn test_lone_root_becomes_home(mut store: CmsStore) {
		// Act
		let page = store.save(Page::new(1, "base.html")).unwrap();

		// Assert
		assert!(page.is_home);
		assert!(store.page(page.id).unwrap().is_home);
	}

	#[rstest]
	fn test_first_published_root_wins(mut store: CmsStore) {
		// Arrange
		let first = published_root(&mut store, "first");

		// Act
		let second = published_root(&mut store, "second");

		// Assert
		assert!(store.page(first).unwrap().is_home);
		assert!(!store.page(second).unwrap().is_home);
		assert_eq!(store.home_pages(1, true).count(), 1);
	}

	#[rstest]
	fn test_child_pages_do_not_trigger_election(mut store: CmsStore) {
		// Arrange
		let root = published_root(&mut store, "root");

		// Act
		let child = store.save(Page::new(1, "base.html").with_parent(root)).unwrap();

		// Assert
		assert!(!child.is_home);
		assert_eq!(find_home(&store, 1, true), Some(root));
	}

	#[rstest]
	fn test_deleting_home_promotes_next_root(mut store: CmsStore) {
		// Arrange
		let first = published_root(&mut store, "first");
		let second = published_root(&mut store, "second");

		// Act
		store.delete_page(first).unwrap();

		// Assert
		assert!(store.page(second).unwrap().is_home);
	}

	#[rstest]
	fn test_sites_elect_independently(mut store: CmsStore) {
		// Arrange
		let first = published_root(&mut store, "first");

		// Act
		let other = store.save(Page::new(2, "base.html")).unwrap();

		// Assert
		assert!(store.page(first).unwrap().is_home);
		assert!(other.is_home);
	}
}
