//! Page lifecycle consistency tests
//!
//! Title paths, home election, plugin positions and stack publishing, driven
//! through the store so every reaction runs as it would in production.

use proptest::prelude::*;
use rstest::*;
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use trellis_cms::events::{MutationContext, SaveOptions};
use trellis_cms::models::{CHANGE_STACK_PERMISSION, CreationMethod, PUBLISH_STACK_PERMISSION};
use trellis_cms::prelude::*;
use trellis_conf::{LanguageConfig, TemplateConf};

fn settings() -> CmsSettings {
	let mut settings = CmsSettings::default();
	settings.languages.insert(
		1,
		vec![
			LanguageConfig::new("en", "English"),
			LanguageConfig::new("de", "German").with_fallbacks(["en"]),
		],
	);
	settings.templates.insert(
		"page.html".to_string(),
		TemplateConf {
			name: "Page".to_string(),
			placeholders: vec!["content".to_string()],
		},
	);
	settings
}

#[fixture]
fn store() -> CmsStore {
	CmsStore::new(settings())
}

fn page(store: &mut CmsStore, parent: Option<PageId>, slug: &str) -> PageId {
	let mut page = Page::new(1, "page.html");
	page.parent_id = parent;
	let page = store.save(page).unwrap();
	store.save(Title::new(&page, "en", slug, slug)).unwrap();
	page.id
}

fn path(store: &CmsStore, page: PageId) -> &str {
	store.title(page, "en").unwrap().path.as_str()
}

// ============================================================================
// Title paths
// ============================================================================

#[rstest]
fn test_slug_change_cascades_to_descendants(mut store: CmsStore) {
	// Arrange
	let home = page(&mut store, None, "home");
	let about = page(&mut store, Some(home), "about");
	let team = page(&mut store, Some(about), "team");
	let alumni = page(&mut store, Some(team), "alumni");

	// Act
	let mut title = store.title(about, "en").unwrap().clone();
	title.slug = "company".to_string();
	store.save(title).unwrap();

	// Assert
	assert_eq!(path(&store, about), "company");
	assert_eq!(path(&store, team), "company/team");
	assert_eq!(path(&store, alumni), "company/team/alumni");
}

#[rstest]
fn test_cascade_skips_overwritten_paths(mut store: CmsStore) {
	// Arrange
	let home = page(&mut store, None, "home");
	let about = page(&mut store, Some(home), "about");
	let press = store
		.save(Page::new(1, "page.html").with_parent(about))
		.unwrap();
	store
		.save(Title::new(&press, "en", "Press", "press").with_url_overwrite("media"))
		.unwrap();

	// Act
	let mut title = store.title(about, "en").unwrap().clone();
	title.slug = "company".to_string();
	store.save(title).unwrap();

	// Assert
	assert_eq!(path(&store, press.id), "media");
}

#[rstest]
fn test_move_recomputes_subtree_paths(mut store: CmsStore) {
	// Arrange
	let home = page(&mut store, None, "home");
	let about = page(&mut store, Some(home), "about");
	let blog = page(&mut store, Some(home), "blog");
	let team = page(&mut store, Some(about), "team");
	let alumni = page(&mut store, Some(team), "alumni");

	// Act
	store.move_page(team, Some(blog), None).unwrap();

	// Assert
	assert_eq!(path(&store, team), "blog/team");
	assert_eq!(path(&store, alumni), "blog/team/alumni");
}

#[rstest]
fn test_raw_saves_skip_reactions(mut store: CmsStore) {
	// Arrange
	let mut ctx = MutationContext::new();

	// Act
	let page = store
		.save_with(Page::new(1, "page.html"), SaveOptions::raw(), &mut ctx)
		.unwrap();
	let mut title = Title::new(&page, "en", "Fixture", "fixture");
	title.path = "loaded/as/is".to_string();
	let title = store.save_with(title, SaveOptions::raw(), &mut ctx).unwrap();

	// Assert
	assert!(!store.page(page.id).unwrap().is_home);
	assert_eq!(store.placeholders_of(page.id).count(), 0);
	assert_eq!(store.title_by_id(title.id).unwrap().path, "loaded/as/is");
}

// ============================================================================
// Home election
// ============================================================================

#[derive(Debug, Clone)]
enum HomeOp {
	Create { site: SiteId, published: bool },
	Delete(usize),
	Move { page: usize, parent: Option<usize>, index: usize },
}

fn home_op() -> impl Strategy<Value = HomeOp> {
	prop_oneof![
		3 => (1..=2u32, any::<bool>()).prop_map(|(site, published)| HomeOp::Create { site, published }),
		1 => (0..8usize).prop_map(HomeOp::Delete),
		2 => (0..8usize, prop::option::of(0..8usize), 0..4usize)
			.prop_map(|(page, parent, index)| HomeOp::Move { page, parent, index }),
	]
}

fn homes(store: &CmsStore, site: SiteId) -> usize {
	store
		.pages()
		.filter(|page| page.site_id == site && page.publisher_is_draft && page.is_home)
		.count()
}

proptest! {
	/// At most one home per site through creates, deletes and moves, exactly
	/// one right after a root page is created
	#[test]
	fn prop_home_is_unique(ops in prop::collection::vec(home_op(), 1..20)) {
		let mut settings = settings();
		settings.languages.insert(2, vec![LanguageConfig::new("en", "English")]);
		let mut store = CmsStore::new(settings);
		let mut roots: Vec<PageId> = Vec::new();

		for op in ops {
			match op {
				HomeOp::Create { site, published } => {
					let page = store.save(Page::new(site, "page.html")).unwrap();
					let mut title = Title::new(&page, "en", "Root", "root");
					title.published = published;
					store.save(title).unwrap();
					let page = store.page(page.id).unwrap().clone();
					store.save(page.clone()).unwrap();
					roots.push(page.id);
					prop_assert_eq!(homes(&store, site), 1);
				}
				HomeOp::Delete(index) if !roots.is_empty() => {
					let id = roots.remove(index % roots.len());
					store.delete_page(id).unwrap();
					roots.retain(|id| store.page(*id).is_some());
				}
				HomeOp::Move { page, parent, index } if !roots.is_empty() => {
					let id = roots[page % roots.len()];
					let site = store.page(id).unwrap().site_id;
					let parent = parent
						.map(|parent| roots[parent % roots.len()])
						.filter(|parent| *parent != id && store.page(*parent).unwrap().site_id == site);
					match store.move_page(id, parent, Some(index)) {
						Ok(_) | Err(CmsError::InvalidHierarchy(_)) => {}
						Err(error) => return Err(TestCaseError::fail(error.to_string())),
					}
				}
				HomeOp::Delete(_) | HomeOp::Move { .. } => {}
			}
			prop_assert!(homes(&store, 1) <= 1);
			prop_assert!(homes(&store, 2) <= 1);
		}
	}
}

#[rstest]
fn test_published_root_wins_election(mut store: CmsStore) {
	// Arrange
	let draft_only = page(&mut store, None, "draft");
	let published = store.save(Page::new(1, "page.html")).unwrap();
	store
		.save(Title::new(&published, "en", "Live", "live").published())
		.unwrap();

	// Act
	let published = store.page(published.id).unwrap().clone();
	store.save(published.clone()).unwrap();

	// Assert
	assert!(store.page(published.id).unwrap().is_home);
	assert!(!store.page(draft_only).unwrap().is_home);
}

fn published_page(store: &mut CmsStore, parent: Option<PageId>, slug: &str) -> PageId {
	let mut page = Page::new(1, "page.html");
	page.parent_id = parent;
	let page = store.save(page).unwrap();
	store
		.save(Title::new(&page, "en", slug, slug).published())
		.unwrap();
	let page = store.page(page.id).unwrap().clone();
	store.save(page).unwrap().id
}

#[rstest]
fn test_moves_reelect_home_and_recompute_paths(mut store: CmsStore) {
	// Arrange
	let home = published_page(&mut store, None, "home");
	let child = page(&mut store, Some(home), "child");
	let other = published_page(&mut store, None, "other");
	assert!(store.page(home).unwrap().is_home);
	assert_eq!(path(&store, child), "child");

	// Act
	store.move_page(other, None, Some(0)).unwrap();

	// Assert
	assert!(store.page(other).unwrap().is_home);
	assert!(!store.page(home).unwrap().is_home);
	assert_eq!(path(&store, other), "");
	assert_eq!(path(&store, home), "home");
	assert_eq!(path(&store, child), "home/child");

	// Act
	store.move_page(other, Some(home), None).unwrap();

	// Assert
	assert!(store.page(home).unwrap().is_home);
	assert!(!store.page(other).unwrap().is_home);
	assert_eq!(homes(&store, 1), 1);
	assert_eq!(path(&store, home), "");
	assert_eq!(path(&store, child), "child");
	assert_eq!(path(&store, other), "other");
}

// ============================================================================
// Sub-applications
// ============================================================================

#[rstest]
fn test_application_change_reaches_public_page(mut store: CmsStore) {
	// Arrange
	let draft = page(&mut store, None, "blog");
	let public = store
		.publish_page(draft, "en", &mut MutationContext::new())
		.unwrap();
	let fired = Arc::new(AtomicUsize::new(0));
	let counter = Arc::clone(&fired);
	store.reactor().application_post_changed.connect(
		move |_store: &mut CmsStore, event: &mut PageEvent| {
			assert_eq!(event.instance.id, draft);
			counter.fetch_add(1, Ordering::SeqCst);
			Ok(())
		},
	);

	// Act
	let page = store
		.page(draft)
		.unwrap()
		.clone()
		.with_application("blog.urls", Some("blog".to_string()));
	store.save(page).unwrap();

	// Assert
	let public = store.page(public.id).unwrap();
	assert_eq!(public.application_urls.as_deref(), Some("blog.urls"));
	assert_eq!(public.application_namespace.as_deref(), Some("blog"));
	assert_eq!(fired.load(Ordering::SeqCst), 1);

	// Act
	let page = store.page(draft).unwrap().clone();
	store.save(page).unwrap();

	// Assert
	assert_eq!(fired.load(Ordering::SeqCst), 1);
}

// ============================================================================
// Menu cache
// ============================================================================

/// Store whose menu cache holds one entry per site
fn cached_store(permission: bool) -> (CmsStore, Arc<InMemoryMenuCache>) {
	let mut settings = settings();
	settings.permission = permission;
	settings.languages.insert(2, vec![LanguageConfig::new("en", "English")]);
	let cache = Arc::new(InMemoryMenuCache::new());
	let store = CmsStore::new(settings).with_menu_cache(cache.clone());
	(store, cache)
}

fn fill_menus(cache: &InMemoryMenuCache) {
	cache.set(1, "main", "<ul>one</ul>".to_string());
	cache.set(2, "main", "<ul>two</ul>".to_string());
}

#[rstest]
fn test_page_save_clears_menus_of_its_site() {
	// Arrange
	let (mut store, cache) = cached_store(false);
	let id = page(&mut store, None, "home");
	fill_menus(&cache);

	// Act
	let page = store.page(id).unwrap().clone();
	store.save(page).unwrap();

	// Assert
	assert_eq!(cache.get(1, "main"), None);
	assert_eq!(cache.get(2, "main").as_deref(), Some("<ul>two</ul>"));
}

#[rstest]
fn test_page_delete_clears_menus_of_its_site() {
	// Arrange
	let (mut store, cache) = cached_store(false);
	let id = page(&mut store, None, "home");
	fill_menus(&cache);

	// Act
	store.delete_page(id).unwrap();

	// Assert
	assert_eq!(cache.get(1, "main"), None);
	assert!(cache.get(2, "main").is_some());
}

#[rstest]
#[case::public(false, true)]
#[case::draft(true, false)]
fn test_title_save_clears_menus_only_when_public(#[case] draft: bool, #[case] cleared: bool) {
	// Arrange
	let (mut store, cache) = cached_store(false);
	let id = page(&mut store, None, "home");
	let public = store
		.publish_page(id, "en", &mut MutationContext::new())
		.unwrap();
	let target = if draft { id } else { public.id };
	fill_menus(&cache);

	// Act
	let title = store.title(target, "en").unwrap().clone();
	store.save(title).unwrap();

	// Assert
	assert_eq!(cache.get(1, "main").is_none(), cleared);
	assert!(cache.get(2, "main").is_some());
}

#[rstest]
fn test_global_permission_save_clears_every_site() {
	// Arrange
	let (mut store, cache) = cached_store(true);
	fill_menus(&cache);

	// Act
	store.save(GlobalPagePermission::new()).unwrap();

	// Assert
	assert!(cache.is_empty());
}

#[rstest]
fn test_global_permission_leaves_menus_without_permission_mode() {
	// Arrange
	let (mut store, cache) = cached_store(false);
	fill_menus(&cache);

	// Act
	store.save(GlobalPagePermission::new()).unwrap();

	// Assert
	assert_eq!(cache.len(), 2);
}

// ============================================================================
// Plugin positions
// ============================================================================

#[derive(Debug, Clone)]
enum PluginOp {
	Add { german: bool },
	AddChild(usize),
	Delete(usize),
}

fn plugin_op() -> impl Strategy<Value = PluginOp> {
	prop_oneof![
		3 => any::<bool>().prop_map(|german| PluginOp::Add { german }),
		2 => (0..16usize).prop_map(PluginOp::AddChild),
		2 => (0..16usize).prop_map(PluginOp::Delete),
	]
}

fn assert_dense(store: &CmsStore, placeholder: PlaceholderId) -> Result<(), TestCaseError> {
	for language in ["en", "de"] {
		let positions: Vec<usize> = store
			.plugins_in(placeholder, language)
			.iter()
			.map(|plugin| plugin.position)
			.collect();
		let expected: Vec<usize> = (0..positions.len()).collect();
		prop_assert_eq!(positions, expected);
	}
	Ok(())
}

proptest! {
	/// Positions stay 0..n per placeholder and language through adds and deletes
	#[test]
	fn prop_positions_stay_dense(ops in prop::collection::vec(plugin_op(), 1..30)) {
		let mut store = CmsStore::new(settings());
		let page = store.save(Page::new(1, "page.html")).unwrap();
		let placeholder = store.placeholder_by_slot(page.id, "content").unwrap().id;

		for op in ops {
			let existing: Vec<PluginId> = store
				.all_plugins_in(placeholder)
				.iter()
				.map(|plugin| plugin.id)
				.collect();
			match op {
				PluginOp::Add { german } => {
					let language = if german { "de" } else { "en" };
					store.add_plugin(placeholder, language, "TextPlugin", json!({})).unwrap();
				}
				PluginOp::AddChild(index) if !existing.is_empty() => {
					let parent = existing[index % existing.len()];
					store.add_child_plugin(parent, "LinkPlugin", json!({})).unwrap();
				}
				PluginOp::Delete(index) if !existing.is_empty() => {
					store.delete_plugin(existing[index % existing.len()]).unwrap();
				}
				PluginOp::AddChild(_) | PluginOp::Delete(_) => {}
			}
			assert_dense(&store, placeholder)?;
		}
	}
}

// ============================================================================
// Stacks
// ============================================================================

fn publisher() -> RenderRequest {
	RenderRequest::new("en").with_user(
		User::new("publisher")
			.with_perm(CHANGE_STACK_PERMISSION)
			.with_perm(PUBLISH_STACK_PERMISSION),
	)
}

fn public_content(store: &CmsStore, stack: &Stack) -> Vec<(String, serde_json::Value, usize, String, bool)> {
	store
		.all_plugins_in(stack.public)
		.iter()
		.map(|plugin| {
			(
				plugin.plugin_type.clone(),
				plugin.data.clone(),
				plugin.position,
				plugin.language.clone(),
				plugin.parent_id.is_some(),
			)
		})
		.collect()
}

#[rstest]
fn test_stack_publish_is_idempotent(mut store: CmsStore) {
	// Arrange
	let stack = store.create_stack("Footer", Some("footer"), CreationMethod::Code).unwrap();
	let column = store
		.add_plugin(stack.draft, "en", "ColumnPlugin", json!({"width": 6}))
		.unwrap();
	store
		.add_child_plugin(column.id, "TextPlugin", json!({"body": "Contact"}))
		.unwrap();
	store
		.add_plugin(stack.draft, "de", "TextPlugin", json!({"body": "Kontakt"}))
		.unwrap();
	let request = publisher();

	// Act
	assert!(store.publish_stack("footer", &request, false).unwrap());
	let first = public_content(&store, &stack);
	assert!(store.publish_stack("footer", &request, false).unwrap());
	let second = public_content(&store, &stack);

	// Assert
	assert_eq!(first.len(), 3);
	assert_eq!(first, second);
	assert!(!store.stack_by_code("footer").unwrap().dirty);
}

#[rstest]
fn test_stack_publish_replaces_public_content(mut store: CmsStore) {
	// Arrange
	let stack = store.create_stack("Footer", Some("footer"), CreationMethod::Code).unwrap();
	let draft = store
		.add_plugin(stack.draft, "en", "TextPlugin", json!({"body": "old"}))
		.unwrap();
	let request = publisher();
	store.publish_stack("footer", &request, false).unwrap();

	// Act
	store.delete_plugin(draft.id).unwrap();
	store
		.add_plugin(stack.draft, "en", "TextPlugin", json!({"body": "new"}))
		.unwrap();
	store.publish_stack("footer", &request, false).unwrap();

	// Assert
	let public = store.plugins_in(stack.public, "en");
	assert_eq!(public.len(), 1);
	assert_eq!(public[0].data, json!({"body": "new"}));
}

// ============================================================================
// Attribution
// ============================================================================

#[rstest]
fn test_created_users_record_their_creator() {
	// Arrange
	let mut settings = settings();
	settings.permission = true;
	let mut store = CmsStore::new(settings);
	let admin = store.save(User::superuser("admin")).unwrap();

	// Act
	let editor = store.save_as(User::new("editor"), admin.id).unwrap();
	let group = store.save_as(Group::new("Editors"), admin.id).unwrap();

	// Assert
	assert_eq!(store.page_user_info().len(), 1);
	assert_eq!(store.page_user_info()[0].user_id, editor.id);
	assert_eq!(store.page_user_info()[0].created_by, admin.id);
	assert_eq!(store.page_user_group_info()[0].group_id, group.id);
}

#[rstest]
fn test_anonymous_creation_is_not_recorded() {
	// Arrange
	let mut settings = settings();
	settings.permission = true;
	let mut store = CmsStore::new(settings);

	// Act
	store.save(User::new("editor")).unwrap();

	// Assert
	assert!(store.page_user_info().is_empty());
}
