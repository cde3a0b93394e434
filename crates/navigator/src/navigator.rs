//! The navigation state machine.
//!
//! `Navigator` owns the selection, the address history, the reading overlay
//! and the per-tick controllers. Input handlers (picks, clicks, back) run to
//! completion and push the new selection into the address; navigation
//! requests (links, back/forward) are queued and applied at the start of the
//! next tick, pulling the address into the selection. A single event never
//! does both.

use std::collections::{BTreeSet, VecDeque};

use serde::Serialize;
use shared::{BookIdentity, BOOK_ID_KEY};

use crate::bookmarks::{bookmark_entries, BookmarkEntry, BookmarkError, BookmarkStore};
use crate::catalog::{Catalog, IndexRow, SearchHit};
use crate::decorations::{decorations_for, DecorationDiff, DecorationTracker};
use crate::identity::{identity_room_slug, IdentityResolver, ResolvedBook};
use crate::room::{display_name, RoomLayout};
use crate::scene::SceneGraph;
use crate::state::address::{self, Address, AddressHistory};
use crate::state::{
    BackAction, NavSettings, OverlayState, ResetSignal, SelectionLevel, SelectionState,
};
use crate::viewport::animator::{BookOpened, PickFeedbackAnimator};
use crate::viewport::camera::{CameraController, CameraEvent, CameraPose};

/// Which page is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    Rooms,
    Library,
}

/// One shelf instance: its own copy of the shelf model and resolver
#[derive(Debug, Clone)]
pub struct ShelfScene {
    pub graph: SceneGraph,
    pub resolver: IdentityResolver,
}

impl ShelfScene {
    fn group_names(&self) -> Vec<String> {
        self.resolver
            .book_groups()
            .iter()
            .filter_map(|g| self.graph.name(*g).map(str::to_string))
            .collect()
    }
}

#[derive(Debug, Clone)]
enum NavRequest {
    Push(Address),
    Back,
    Forward,
}

/// What happened during one tick
#[derive(Debug, Clone, Default, Serialize)]
pub struct TickReport {
    /// Navigation requests pulled into the selection
    pub navigations: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub camera: Option<CameraEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opened: Option<BookOpened>,
    pub decorations: DecorationDiff,
}

/// Serializable view of the whole navigator
#[derive(Debug, Clone, Serialize)]
pub struct NavSnapshot {
    pub view: View,
    pub address: String,
    pub room: String,
    pub room_name: String,
    pub level: SelectionLevel,
    pub shelf_index: Option<usize>,
    pub book_id: Option<String>,
    pub overlay_open: bool,
    pub active_book_id: Option<String>,
    pub tint: Option<String>,
    pub reset_signal: u64,
    pub back_label: &'static str,
    pub orbit_enabled: bool,
    pub visible_shelves: Vec<usize>,
    pub camera: CameraPose,
    pub decorations: usize,
    pub can_go_back: bool,
    pub can_go_forward: bool,
}

pub struct Navigator {
    settings: NavSettings,
    layout: RoomLayout,
    shelves: Vec<ShelfScene>,
    catalog: Catalog,
    bookmarks: Box<dyn BookmarkStore>,

    view: View,
    selection: SelectionState,
    overlay: OverlayState,
    reset: ResetSignal,
    history: AddressHistory,
    /// Selection version last written to the address
    pushed_version: u64,
    queue: VecDeque<NavRequest>,
    /// Room to enter once the camera flight arrives
    entering: Option<String>,

    camera: CameraController,
    animator: PickFeedbackAnimator,
    decorations: DecorationTracker,
}

impl Navigator {
    /// Build a navigator whose shelves all show `shelf_model`.
    ///
    /// Nothing is selected until `mount`.
    pub fn new(
        settings: NavSettings,
        shelf_model: &SceneGraph,
        catalog: Catalog,
        bookmarks: Box<dyn BookmarkStore>,
    ) -> Self {
        let layout = RoomLayout::library(crate::room::DEFAULT_ROOM);
        let shelves = (0..layout.shelf_count())
            .map(|_| {
                let graph = shelf_model.clone();
                let resolver = IdentityResolver::new(&graph, graph.root(), settings.scene.clone());
                ShelfScene { graph, resolver }
            })
            .collect();
        let selection = SelectionState::new(&layout.slug, layout.shelf_count());
        Self {
            camera: CameraController::new(settings.camera.clone()),
            animator: PickFeedbackAnimator::new(
                settings.animation.clone(),
                settings.overlay.default_tint,
            ),
            history: AddressHistory::new(Address::room(&layout.slug)),
            pushed_version: selection.version(),
            settings,
            layout,
            shelves,
            catalog,
            bookmarks,
            view: View::Library,
            selection,
            overlay: OverlayState::default(),
            reset: ResetSignal::default(),
            queue: VecDeque::new(),
            entering: None,
            decorations: DecorationTracker::default(),
        }
    }

    // ── Accessors ─────────────────────────────────────────────

    pub fn view(&self) -> View {
        self.view
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn overlay(&self) -> &OverlayState {
        &self.overlay
    }

    pub fn reset_signal(&self) -> ResetSignal {
        self.reset
    }

    pub fn address(&self) -> &Address {
        self.history.current()
    }

    pub fn layout(&self) -> &RoomLayout {
        &self.layout
    }

    pub fn shelf(&self, index: usize) -> Option<&ShelfScene> {
        self.shelves.get(index)
    }

    pub fn camera(&self) -> &CameraController {
        &self.camera
    }

    pub fn animator(&self) -> &PickFeedbackAnimator {
        &self.animator
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn settings(&self) -> &NavSettings {
        &self.settings
    }

    pub fn pending_navigations(&self) -> usize {
        self.queue.len()
    }

    // ── Address pull ──────────────────────────────────────────

    /// Start at `address`: history restarts there and the selection is
    /// derived from it.
    pub fn mount(&mut self, address: Address) {
        tracing::info!("Mount at {}", address.to_href());
        self.queue.clear();
        self.history = AddressHistory::new(address.clone());
        self.apply_address(&address);
    }

    /// Queue a user navigation (link, search hit, index row)
    pub fn navigate(&mut self, address: Address) {
        self.queue.push_back(NavRequest::Push(address));
    }

    pub fn back(&mut self) {
        self.queue.push_back(NavRequest::Back);
    }

    pub fn forward(&mut self) {
        self.queue.push_back(NavRequest::Forward);
    }

    fn drain_navigation(&mut self) -> usize {
        let mut applied = 0;
        while let Some(request) = self.queue.pop_front() {
            let address = match request {
                NavRequest::Push(address) => {
                    self.history.push(address.clone());
                    Some(address)
                }
                NavRequest::Back => self.history.back(),
                NavRequest::Forward => self.history.forward(),
            };
            if let Some(address) = address {
                self.apply_address(&address);
                applied += 1;
            }
        }
        applied
    }

    /// Pull `address` into the selection. Input that cannot be honoured is
    /// dropped and the current history entry rewritten without it.
    fn apply_address(&mut self, address: &Address) {
        if !address.is_library() {
            if self.view == View::Library {
                tracing::info!("Leaving room {}", self.selection.room_slug());
            }
            self.view = View::Rooms;
            self.clear_book_feedback();
            self.selection.reset_all();
            self.pushed_version = self.selection.version();
            return;
        }

        self.view = View::Library;
        let slug = address.room_slug();
        if slug != self.selection.room_slug() {
            tracing::info!("Entering room {slug}");
            self.clear_book_feedback();
            self.selection.enter_room(&slug);
            self.layout.slug = slug.clone();
        }

        let pulled = address::pull(
            &address.query,
            &identity_room_slug(&slug),
            self.layout.shelf_count(),
        );
        let mut normalized = pulled.normalized;

        let located = match (pulled.shelf_index, pulled.book_id) {
            (Some(shelf), Some(identity)) => {
                let parts = self
                    .shelves
                    .get(shelf)
                    .and_then(|s| s.resolver.locate(&s.graph, &identity));
                match parts {
                    Some(parts) => Some(ResolvedBook { identity, parts }),
                    None => {
                        tracing::warn!("Book {identity} not found on shelf {}", shelf + 1);
                        normalized = true;
                        None
                    }
                }
            }
            _ => None,
        };

        let book = located.as_ref().map(|b| b.identity.clone());
        if self.selection.book_id() != book.as_ref() {
            self.clear_book_feedback();
        }
        self.selection.restore(pulled.shelf_index, book);

        if let (Some(shelf), Some(resolved)) = (pulled.shelf_index, located) {
            if let Some(scene) = self.shelves.get_mut(shelf) {
                self.animator.select_book(&mut scene.graph, &resolved, shelf);
            }
        }
        self.pushed_version = self.selection.version();

        if normalized {
            let mut query = address.query.clone();
            address::push(&self.selection, &mut query);
            let fixed = Address::new(&address.path, query);
            tracing::info!("Address normalized to {}", fixed.to_href());
            self.history.replace(fixed);
        }
    }

    // ── Address push ──────────────────────────────────────────

    /// Write a changed selection into a new history entry
    fn sync_address(&mut self) {
        if self.view != View::Library || self.selection.version() == self.pushed_version {
            return;
        }
        self.pushed_version = self.selection.version();
        let current = self.history.current();
        let mut query = current.query.clone();
        address::push(&self.selection, &mut query);
        let next = Address::new(&current.path, query);
        tracing::debug!("Address push {}", next.to_href());
        self.history.push(next);
    }

    // ── Reset plumbing ────────────────────────────────────────

    /// Let the animator see the current reset value
    fn notify_reset(&mut self) {
        let graph = self
            .animator
            .active_shelf()
            .and_then(|i| self.shelves.get_mut(i))
            .map(|s| &mut s.graph);
        self.animator.observe_reset(self.reset, graph);
    }

    fn bump_reset(&mut self) {
        self.reset.bump();
        self.notify_reset();
    }

    /// Snap back any animated book and hide the overlay
    fn clear_book_feedback(&mut self) {
        if self.animator.active_book().is_some()
            || self.animator.has_pending_open()
            || self.overlay.is_open()
        {
            self.bump_reset();
        }
        self.overlay.dismiss();
    }

    // ── Input handlers ────────────────────────────────────────

    /// Shelf clicked. Clicking the selected shelf again is a smart back.
    pub fn select_shelf(&mut self, index: usize) {
        if self.view != View::Library {
            tracing::debug!("Shelf click outside a room ignored");
            return;
        }
        if self.selection.shelf_index() == Some(index) {
            self.smart_back();
            return;
        }
        self.clear_book_feedback();
        self.selection.select_shelf(index);
        tracing::debug!("Shelf selected: {:?}", self.selection.shelf_index());
        self.sync_address();
    }

    /// Pointer pick on `name` inside shelf `shelf`.
    ///
    /// On an unselected shelf the pick selects the shelf. On the selected
    /// shelf a book cover selects that book; anything else is ignored.
    pub fn pick(&mut self, shelf: usize, name: &str) -> Option<BookIdentity> {
        if self.view != View::Library || shelf >= self.shelves.len() {
            return None;
        }
        if self.selection.shelf_index() != Some(shelf) {
            self.select_shelf(shelf);
            return None;
        }

        let scene = &self.shelves[shelf];
        let node = scene.graph.get_object_by_name(scene.graph.root(), name)?;
        let resolved = scene
            .resolver
            .resolve(&scene.graph, node, self.selection.room_slug(), shelf)?;

        if self
            .selection
            .book_id()
            .is_some_and(|current| *current != resolved.identity)
        {
            self.clear_book_feedback();
        }
        if !self.selection.select_book(resolved.identity.clone()) {
            return None;
        }
        tracing::debug!("Picked {}", resolved.identity);
        let scene = &mut self.shelves[shelf];
        self.animator.select_book(&mut scene.graph, &resolved, shelf);
        self.sync_address();
        Some(resolved.identity)
    }

    /// Click on empty space: collapses a book or a shelf, nothing when idle
    pub fn pointer_missed(&mut self) -> Option<BackAction> {
        if self.view != View::Library || self.selection.level() == SelectionLevel::Idle {
            return None;
        }
        Some(self.smart_back())
    }

    /// Collapse one level: book, then shelf, then leave the room
    pub fn smart_back(&mut self) -> BackAction {
        let action = self.selection.back_action();
        match action {
            BackAction::CloseBook => self.close_book(),
            BackAction::ResetAll => self.reset_all(),
            BackAction::LeaveRoom => self.navigate(Address::rooms()),
        }
        action
    }

    /// Close the reading overlay, keeping the shelf
    pub fn close_book(&mut self) {
        self.overlay.close(&mut self.selection, &mut self.reset);
        self.notify_reset();
        self.sync_address();
    }

    /// Drop shelf and book
    pub fn reset_all(&mut self) {
        self.bump_reset();
        self.overlay.dismiss();
        self.selection.reset_all();
        self.sync_address();
    }

    /// Fly into a room; the navigation happens once the camera arrives
    pub fn enter_room(&mut self, slug: &str) {
        let entry = self.settings.camera.entry_position;
        self.camera
            .fly_to(entry, glam::Vec3::ZERO, self.settings.camera.overview);
        self.entering = Some(slug.to_string());
    }

    pub fn user_zoom(&mut self, factor: f32) {
        self.camera.user_zoom(factor);
    }

    /// Index panel row chosen: open that book on the current shelf
    pub fn choose_index_entry(&mut self, book_id: &str) -> bool {
        if self.selection.shelf_index().is_none() {
            return false;
        }
        let current = self.history.current();
        let mut query = current.query.clone();
        query.set(BOOK_ID_KEY, book_id);
        let target = Address::new(&current.path, query);
        self.navigate(target);
        true
    }

    // ── Tick ──────────────────────────────────────────────────

    /// One rendering tick of `dt_ms` milliseconds
    pub fn tick(&mut self, dt_ms: f64) -> TickReport {
        let navigations = self.drain_navigation();

        let shelf_target = match self.view {
            View::Library => self
                .selection
                .shelf_index()
                .and_then(|i| self.layout.shelf_position(i)),
            View::Rooms => None,
        };
        let camera = self.camera.tick(shelf_target, dt_ms as f32);
        if camera == Some(CameraEvent::Arrived) {
            if let Some(slug) = self.entering.take() {
                self.navigate(Address::room(&slug));
            }
        }

        let graph = self
            .animator
            .active_shelf()
            .and_then(|i| self.shelves.get_mut(i))
            .map(|s| &mut s.graph);
        let opened = self.animator.tick(dt_ms, graph);
        if let Some(event) = &opened {
            self.overlay
                .handle_emission(&self.selection, event.book_id.clone(), event.tint);
        }

        let groups = match (self.view, self.selection.shelf_index()) {
            (View::Library, Some(i)) => self
                .shelves
                .get(i)
                .map(ShelfScene::group_names)
                .unwrap_or_default(),
            _ => Vec::new(),
        };
        let next = if self.view == View::Library {
            decorations_for(&self.selection, &groups, &self.catalog)
        } else {
            Default::default()
        };
        let decorations = self.decorations.update(next);

        TickReport {
            navigations,
            camera,
            opened,
            decorations,
        }
    }

    // ── Catalog views ─────────────────────────────────────────

    pub fn index_panel(&self) -> Vec<IndexRow> {
        match self.selection.shelf_index() {
            Some(shelf) => self.catalog.index_panel(
                &identity_room_slug(self.selection.room_slug()),
                shelf,
                self.selection.book_id(),
            ),
            None => Vec::new(),
        }
    }

    pub fn search(&self, query: &str) -> Vec<SearchHit> {
        self.catalog.search(query, self.selection.room_slug())
    }

    // ── Bookmarks ─────────────────────────────────────────────

    /// Toggle the bookmark of the selected book; `None` without one
    pub fn toggle_bookmark(&mut self) -> Result<Option<bool>, BookmarkError> {
        let Some(id) = self.selection.book_id().map(|b| b.to_string()) else {
            return Ok(None);
        };
        let now = self.bookmarks.toggle(&id)?;
        tracing::info!("Bookmark {id}: {}", if now { "added" } else { "removed" });
        Ok(Some(now))
    }

    pub fn bookmark_ids(&self) -> Result<BTreeSet<String>, BookmarkError> {
        self.bookmarks.list()
    }

    pub fn bookmarks(&self) -> Result<Vec<BookmarkEntry>, BookmarkError> {
        Ok(bookmark_entries(
            &self.bookmarks.list()?,
            &self.catalog,
            self.selection.room_slug(),
        ))
    }

    // ── Inspection ────────────────────────────────────────────

    pub fn snapshot(&self) -> NavSnapshot {
        NavSnapshot {
            view: self.view,
            address: self.history.current().to_href(),
            room: self.selection.room_slug().to_string(),
            room_name: display_name(self.selection.room_slug()),
            level: self.selection.level(),
            shelf_index: self.selection.shelf_index(),
            book_id: self.selection.book_id().map(|b| b.to_string()),
            overlay_open: self.overlay.is_open(),
            active_book_id: self.overlay.active_book_id().map(|b| b.to_string()),
            tint: self.overlay.tint().map(|t| t.to_hex()),
            reset_signal: self.reset.value(),
            back_label: self.selection.back_action().label(),
            orbit_enabled: CameraController::orbit_enabled(self.selection.shelf_index()),
            visible_shelves: self.layout.visible_shelves(self.selection.shelf_index()),
            camera: self.camera.pose(),
            decorations: self.decorations.shown().len(),
            can_go_back: self.history.can_go_back(),
            can_go_forward: self.history.can_go_forward(),
        }
    }
}
