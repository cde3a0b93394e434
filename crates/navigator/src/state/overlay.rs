use serde::Serialize;
use shared::{BookIdentity, Rgb};

use super::selection::SelectionState;
use super::ResetSignal;

/// The book shown in the reading overlay
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpenBook {
    pub book_id: BookIdentity,
    pub tint: Rgb,
}

/// Reading overlay visibility.
///
/// Open flag, active book and tint live in one `Option`, so they can only
/// change together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OverlayState {
    open: Option<OpenBook>,
}

impl OverlayState {
    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    pub fn active_book_id(&self) -> Option<&BookIdentity> {
        self.open.as_ref().map(|o| &o.book_id)
    }

    pub fn tint(&self) -> Option<Rgb> {
        self.open.as_ref().map(|o| o.tint)
    }

    pub fn current(&self) -> Option<&OpenBook> {
        self.open.as_ref()
    }

    /// Open on a delayed emission.
    ///
    /// Ignored unless the selection still holds that book; an emission that
    /// outlived its selection must not show anything.
    pub fn handle_emission(
        &mut self,
        selection: &SelectionState,
        book_id: BookIdentity,
        tint: Rgb,
    ) -> bool {
        if selection.book_id() != Some(&book_id) {
            tracing::debug!("Stale overlay emission for {book_id} ignored");
            return false;
        }
        tracing::info!("Overlay open: {book_id} ({tint})");
        self.open = Some(OpenBook { book_id, tint });
        true
    }

    /// Close the overlay and drop the book from the selection.
    ///
    /// Always bumps `reset` so the pick animation snaps back, even when the
    /// overlay had not opened yet.
    pub fn close(&mut self, selection: &mut SelectionState, reset: &mut ResetSignal) {
        if let Some(book) = self.open.take() {
            tracing::info!("Overlay closed: {}", book.book_id);
        }
        reset.bump();
        selection.close_book();
    }

    /// Drop the overlay without touching the selection (the selection
    /// already moved on, e.g. through an address pull).
    pub fn dismiss(&mut self) -> bool {
        self.open.take().is_some()
    }
}
