//! Headless test harness for driving the navigator without a renderer.
//!
//! Wires a `Navigator` to the fixture shelf model and the fixture catalog, and
//! adds frame-stepping helpers. Bookmarks go to the store the settings name;
//! the default constructors use the in-memory one.

use shared::BookIdentity;

use crate::bookmarks::{open_store, BookmarkStore, MemoryBookmarkStore};
use crate::catalog::Catalog;
use crate::fixtures;
use crate::navigator::{Navigator, TickReport};
use crate::room::library_path;
use crate::scene::{SceneGraph, Transform};
use crate::state::address::Address;
use crate::state::settings::BookmarkBackend;
use crate::state::{NavSettings, SelectionLevel};

/// Frame length used by `advance`
pub const FRAME_MS: f64 = 16.0;

/// Headless navigator with fixture content
pub struct TestHarness {
    pub nav: Navigator,
    shelf_model: SceneGraph,
    catalog: Catalog,
    settings: NavSettings,
}

impl TestHarness {
    /// Fixture room with nothing selected
    pub fn new() -> Self {
        Self::with_address(&library_path(fixtures::ROOM))
    }

    /// Fixture content mounted at `href`
    pub fn with_address(href: &str) -> Self {
        let settings = NavSettings {
            bookmarks: BookmarkBackend::Memory,
            ..NavSettings::default()
        };
        Self::with_settings(settings, href)
    }

    /// Fixture content under `settings`, mounted at `href`
    pub fn with_settings(settings: NavSettings, href: &str) -> Self {
        Self::build(
            settings,
            fixtures::shelf_model(fixtures::BOOKS_PER_SHELF),
            fixtures::catalog(),
            href,
        )
    }

    fn build(settings: NavSettings, shelf_model: SceneGraph, catalog: Catalog, href: &str) -> Self {
        let store: Box<dyn BookmarkStore> = match open_store(&settings.bookmarks) {
            Ok(store) => store,
            Err(e) => {
                tracing::warn!("Bookmark store unavailable, keeping bookmarks in memory: {e}");
                Box::new(MemoryBookmarkStore::default())
            }
        };
        let mut nav = Navigator::new(settings.clone(), &shelf_model, catalog.clone(), store);
        nav.mount(Address::parse(href));
        Self {
            nav,
            shelf_model,
            catalog,
            settings,
        }
    }

    // ── Content ───────────────────────────────────────────────

    /// Replace the shelf model and remount at the current address
    pub fn load_scene_json(&mut self, json: &str) -> Result<(), String> {
        let model = SceneGraph::from_json(json)?;
        let href = self.address();
        *self = Self::build(self.settings.clone(), model, self.catalog.clone(), &href);
        Ok(())
    }

    /// Replace the catalog and remount at the current address
    pub fn load_catalog_json(&mut self, json: &str) -> Result<(), String> {
        let catalog = Catalog::from_json(json)?;
        let href = self.address();
        *self = Self::build(self.settings.clone(), self.shelf_model.clone(), catalog, &href);
        Ok(())
    }

    /// Replace the settings and remount at the current address
    pub fn load_settings_json(&mut self, json: &str) -> Result<(), String> {
        let settings = NavSettings::from_json(json)?;
        let href = self.address();
        *self = Self::build(settings, self.shelf_model.clone(), self.catalog.clone(), &href);
        Ok(())
    }

    /// Remount at `href`, as on a page load
    pub fn mount(&mut self, href: &str) {
        self.nav.mount(Address::parse(href));
    }

    // ── Input ─────────────────────────────────────────────────

    pub fn select_shelf(&mut self, index: usize) {
        self.nav.select_shelf(index);
    }

    /// Pick the cover of the fixture book at `position` on `shelf`
    pub fn pick_book(&mut self, shelf: usize, position: usize) -> Option<BookIdentity> {
        self.nav.pick(shelf, &fixtures::cover_name(position))
    }

    pub fn pick(&mut self, shelf: usize, name: &str) -> Option<BookIdentity> {
        self.nav.pick(shelf, name)
    }

    pub fn pointer_missed(&mut self) {
        self.nav.pointer_missed();
    }

    pub fn navigate(&mut self, href: &str) {
        self.nav.navigate(Address::parse(href));
    }

    // ── Time ──────────────────────────────────────────────────

    pub fn tick(&mut self) -> TickReport {
        self.nav.tick(FRAME_MS)
    }

    /// Tick in `FRAME_MS` steps until `ms` have elapsed
    pub fn advance(&mut self, ms: f64) -> Vec<TickReport> {
        let mut reports = Vec::new();
        let mut elapsed = 0.0;
        while elapsed < ms {
            reports.push(self.tick());
            elapsed += FRAME_MS;
        }
        reports
    }

    /// Run past the overlay open delay
    pub fn settle(&mut self) -> Vec<TickReport> {
        let delay = self.nav.settings().animation.open_delay_ms as f64;
        self.advance(delay + FRAME_MS)
    }

    // ── Inspection ────────────────────────────────────────────

    pub fn address(&self) -> String {
        self.nav.address().to_href()
    }

    pub fn query(&self, key: &str) -> Option<String> {
        self.nav.address().query.get(key).map(str::to_string)
    }

    pub fn level(&self) -> SelectionLevel {
        self.nav.selection().level()
    }

    pub fn overlay_open(&self) -> bool {
        self.nav.overlay().is_open()
    }

    pub fn active_book(&self) -> Option<String> {
        self.nav.overlay().active_book_id().map(|b| b.to_string())
    }

    pub fn reset_count(&self) -> u64 {
        self.nav.reset_signal().value()
    }

    /// Local transform of `name` in shelf `shelf`
    pub fn transform_of(&self, shelf: usize, name: &str) -> Option<Transform> {
        let scene = self.nav.shelf(shelf)?;
        let node = scene.graph.get_object_by_name(scene.graph.root(), name)?;
        scene.graph.transform(node)
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
