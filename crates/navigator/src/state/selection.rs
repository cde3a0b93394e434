use serde::Serialize;
use shared::BookIdentity;

/// Depth of the current selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionLevel {
    /// In a room, nothing selected
    Idle,
    RoomAndShelf,
    RoomShelfAndBook,
}

/// What "smart back" does from the current level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackAction {
    CloseBook,
    ResetAll,
    LeaveRoom,
}

impl BackAction {
    /// Label of the back button
    pub fn label(&self) -> &'static str {
        match self {
            BackAction::CloseBook => "Close Book",
            BackAction::ResetAll => "Back to Library",
            BackAction::LeaveRoom => "Back to Rooms",
        }
    }
}

/// Room → shelf → book selection.
///
/// A book is only ever selected together with its shelf.
#[derive(Debug, Clone)]
pub struct SelectionState {
    room_slug: String,
    shelf_count: usize,
    shelf_index: Option<usize>,
    book_id: Option<BookIdentity>,
    /// Version counter bumped on every mutation (address sync watches it)
    version: u64,
}

impl SelectionState {
    pub fn new(room_slug: &str, shelf_count: usize) -> Self {
        Self {
            room_slug: room_slug.to_string(),
            shelf_count,
            shelf_index: None,
            book_id: None,
            version: 0,
        }
    }

    pub fn level(&self) -> SelectionLevel {
        match (self.shelf_index, &self.book_id) {
            (Some(_), Some(_)) => SelectionLevel::RoomShelfAndBook,
            (Some(_), None) => SelectionLevel::RoomAndShelf,
            (None, _) => SelectionLevel::Idle,
        }
    }

    pub fn room_slug(&self) -> &str {
        &self.room_slug
    }

    pub fn shelf_count(&self) -> usize {
        self.shelf_count
    }

    pub fn shelf_index(&self) -> Option<usize> {
        self.shelf_index
    }

    pub fn book_id(&self) -> Option<&BookIdentity> {
        self.book_id.as_ref()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    fn touch(&mut self) {
        self.version += 1;
    }

    /// Select a shelf, dropping any book. Out-of-range indices clear the selection.
    pub fn select_shelf(&mut self, index: usize) {
        self.shelf_index = (index < self.shelf_count).then_some(index);
        self.book_id = None;
        self.touch();
    }

    /// Select a book on the selected shelf.
    ///
    /// Returns false (and changes nothing) without a selected shelf or when
    /// the book belongs to another shelf.
    pub fn select_book(&mut self, id: BookIdentity) -> bool {
        if self.shelf_index != Some(id.shelf_index) {
            return false;
        }
        if self.book_id.as_ref() != Some(&id) {
            self.book_id = Some(id);
            self.touch();
        }
        true
    }

    /// Drop the book, keep the shelf
    pub fn close_book(&mut self) {
        if self.book_id.take().is_some() {
            self.touch();
        }
    }

    /// Drop shelf and book
    pub fn reset_all(&mut self) {
        if self.shelf_index.is_some() || self.book_id.is_some() {
            self.shelf_index = None;
            self.book_id = None;
            self.touch();
        }
    }

    /// Replace the whole selection (address pull), normalizing invalid input.
    pub fn restore(&mut self, shelf_index: Option<usize>, book_id: Option<BookIdentity>) {
        self.shelf_index = shelf_index.filter(|i| *i < self.shelf_count);
        self.book_id = book_id.filter(|b| Some(b.shelf_index) == self.shelf_index);
        self.touch();
    }

    /// Move to another room with nothing selected
    pub fn enter_room(&mut self, room_slug: &str) {
        self.room_slug = room_slug.to_string();
        self.shelf_index = None;
        self.book_id = None;
        self.touch();
    }

    /// Smart back dispatch: book before shelf before room
    pub fn back_action(&self) -> BackAction {
        if self.book_id.is_some() {
            BackAction::CloseBook
        } else if self.shelf_index.is_some() {
            BackAction::ResetAll
        } else {
            BackAction::LeaveRoom
        }
    }
}
