//! Title path derivation
//!
//! A title's path is its parent page's title path followed by its own slug.
//! The home page has the empty path; a title with `has_url_overwrite` keeps
//! its explicit path.

use crate::error::CmsResult;
use crate::events::{MutationContext, SaveOptions};
use crate::ids::PageId;
use crate::models::Title;
use crate::store::CmsStore;
use tracing::debug;

/// Path `title` should have given the current state of the store
///
/// The parent title is looked up in the title's language, then in the site's
/// fallback languages, then in the site default language. A missing parent
/// title counts as an empty path.
pub fn compute_path(store: &CmsStore, title: &Title) -> CmsResult<String> {
	let page = store.get_page(title.page_id)?;
	if page.is_home {
		return Ok(String::new());
	}
	if title.has_url_overwrite {
		return Ok(title
			.path
			.trim_matches(|c: char| c == ' ' || c == '/')
			.to_string());
	}

	let base = page
		.parent_id
		.and_then(|parent| store.title_with_fallback(parent, &title.language))
		.map(|parent| parent.path.as_str())
		.unwrap_or_default();
	Ok(format!("{base}/{}", title.slug)
		.trim_start_matches('/')
		.to_string())
}

/// Re-save every title of `page` so their paths are recomputed
pub fn update_title_paths(
	store: &mut CmsStore,
	page: PageId,
	options: SaveOptions,
	ctx: &mut MutationContext,
) -> CmsResult<()> {
	let titles: Vec<Title> = store.titles_of(page).cloned().collect();
	for title in titles {
		store.save_with(title, options, ctx)?;
	}
	Ok(())
}

/// Recompute the titles of `page` and of all its descendants, top-down
pub fn refresh_subtree_paths(
	store: &mut CmsStore,
	page: PageId,
	ctx: &mut MutationContext,
) -> CmsResult<()> {
	let subtree = store.tree().subtree(page);
	debug!(page = %page, pages = subtree.len(), "refreshing title paths");
	let options = SaveOptions::keep_state().without_descendants();
	for node in subtree {
		update_title_paths(store, node, options, ctx)?;
	}
	Ok(())
}

/// Reset and re-save the descendant titles of `title` in its language
///
/// Titles with an explicit path are left alone. Descendants are visited in
/// pre-order so each parent path is final before its children are derived.
pub fn reset_descendant_paths(
	store: &mut CmsStore,
	title: &Title,
	ctx: &mut MutationContext,
) -> CmsResult<()> {
	let descendants = store.tree().descendants(title.page_id);
	let options = SaveOptions::keep_state().without_descendants();
	let mut updated = 0usize;
	for node in descendants {
		let Some(mut descendant) = store
			.title(node, &title.language)
			.filter(|descendant| !descendant.has_url_overwrite)
			.cloned()
		else {
			continue;
		};
		descendant.path.clear();
		store.save_with(descendant, options, ctx)?;
		updated += 1;
	}
	if updated > 0 {
		debug!(page = %title.page_id, language = %title.language, updated, "cascaded title paths");
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::models::Page;
	use rstest::*;
	use trellis_conf::{CmsSettings, LanguageConfig};

	#[fixture]
	fn store() -> CmsStore {
		let mut settings = CmsSettings::default();
		settings.languages.insert(
			1,
			vec![
				LanguageConfig::new("en", "English"),
				LanguageConfig::new("de", "German").with_fallbacks(["en"]),
				LanguageConfig::new("fr", "French"),
			],
		);
		CmsStore::new(settings)
	}

	fn page_with_title(store: &mut CmsStore, parent: Option<PageId>, language: &str, slug: &str) -> PageId {
		let mut page = Page::new(1, "base.html");
		page.parent_id = parent;
		let page = store.save(page).unwrap();
		store.save(Title::new(&page, language, slug, slug)).unwrap();
		page.id
	}

	#[rstest]
	fn test_home_title_has_empty_path(mut store: CmsStore) {
		// Arrange
		let home = page_with_title(&mut store, None, "en", "home");

		// Act
		let title = store.title(home, "en").unwrap();

		// Assert
		assert_eq!(title.path, "");
	}

	#[rstest]
	fn test_child_path_skips_home_segment(mut store: CmsStore) {
		// Arrange
		let home = page_with_title(&mut store, None, "en", "home");

		// Act
		let child = page_with_title(&mut store, Some(home), "en", "about");
		let grandchild = page_with_title(&mut store, Some(child), "en", "team");

		// Assert
		assert_eq!(store.title(child, "en").unwrap().path, "about");
		assert_eq!(store.title(grandchild, "en").unwrap().path, "about/team");
	}

	#[rstest]
	fn test_overwrite_is_trimmed(mut store: CmsStore) {
		// Arrange
		let home = page_with_title(&mut store, None, "en", "home");
		let page = store.save(Page::new(1, "base.html").with_parent(home)).unwrap();

		// Act
		let title = store
			.save(Title::new(&page, "en", "Press", "press").with_url_overwrite(" /media/press/ "))
			.unwrap();

		// Assert
		assert_eq!(title.path, "media/press");
	}

	#[rstest]
	#[case("de", "fallback/child")]
	#[case("fr", "fallback/child")]
	fn test_parent_title_falls_back(mut store: CmsStore, #[case] language: &str, #[case] expected: &str) {
		// Arrange
		let home = page_with_title(&mut store, None, "en", "home");
		let parent = page_with_title(&mut store, Some(home), "en", "fallback");

		// Act
		let child = page_with_title(&mut store, Some(parent), language, "child");

		// Assert
		assert_eq!(store.title(child, language).unwrap().path, expected);
	}
}
