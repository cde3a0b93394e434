//! Labels and banners shown on the selected shelf.
//!
//! Decorations are recomputed from the selection every tick and diffed
//! against what is currently shown; the renderer only ever applies diffs.

use std::collections::BTreeSet;

use serde::Serialize;
use shared::{BookIdentity, Rgb};

use crate::catalog::Catalog;
use crate::identity::identity_room_slug;
use crate::state::SelectionState;

/// Binder text for books missing from the catalog
pub const UNKNOWN_TITLE: &str = "Unknown";

/// Row banners, bottom row first: (label, background, text color)
pub const ROW_BANNERS: [(&str, Rgb, Rgb); 4] = [
    ("Misc", Rgb(0x94, 0xa3, 0xb8), Rgb(0x1e, 0x29, 0x3b)),
    ("Expert", Rgb(0xdc, 0x26, 0x26), Rgb(0xff, 0xff, 0xff)),
    ("Intermediate", Rgb(0xd9, 0x77, 0x06), Rgb(0xff, 0xff, 0xff)),
    ("Beginner", Rgb(0x16, 0xa3, 0x4a), Rgb(0xff, 0xff, 0xff)),
];

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Decoration {
    RowBanner {
        shelf: usize,
        /// 0 is the bottom row
        row: usize,
        label: String,
        color: Rgb,
        text_color: Rgb,
    },
    BinderLabel {
        shelf: usize,
        position: usize,
        text: String,
    },
}

pub type DecorationSet = BTreeSet<Decoration>;

/// Decorations for the current selection; empty unless a shelf is selected.
///
/// `book_groups` are the group names of the shelf model in scene order.
pub fn decorations_for(
    selection: &SelectionState,
    book_groups: &[String],
    catalog: &Catalog,
) -> DecorationSet {
    let Some(shelf) = selection.shelf_index() else {
        return DecorationSet::new();
    };
    let room = identity_room_slug(selection.room_slug());

    let banners = ROW_BANNERS
        .iter()
        .enumerate()
        .map(|(row, (label, color, text_color))| Decoration::RowBanner {
            shelf,
            row,
            label: label.to_string(),
            color: *color,
            text_color: *text_color,
        });

    let binders = book_groups.iter().enumerate().map(|(position, group)| {
        let id = BookIdentity::new(group, room.as_str(), shelf, position);
        Decoration::BinderLabel {
            shelf,
            position,
            text: catalog
                .get(&id)
                .map(|r| r.name.clone())
                .unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
        }
    });

    banners.chain(binders).collect()
}

/// Changes between two ticks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DecorationDiff {
    pub added: Vec<Decoration>,
    pub removed: Vec<Decoration>,
}

impl DecorationDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    /// Apply to a shown set; applying the same diff again changes nothing
    pub fn apply(&self, shown: &mut DecorationSet) {
        for d in &self.removed {
            shown.remove(d);
        }
        for d in &self.added {
            shown.insert(d.clone());
        }
    }
}

/// Remembers what was shown last tick
#[derive(Debug, Clone, Default)]
pub struct DecorationTracker {
    shown: DecorationSet,
}

impl DecorationTracker {
    pub fn shown(&self) -> &DecorationSet {
        &self.shown
    }

    pub fn update(&mut self, next: DecorationSet) -> DecorationDiff {
        let diff = DecorationDiff {
            added: next.difference(&self.shown).cloned().collect(),
            removed: self.shown.difference(&next).cloned().collect(),
        };
        if !diff.is_empty() {
            tracing::debug!(
                "Decorations: +{} -{}",
                diff.added.len(),
                diff.removed.len()
            );
        }
        self.shown = next;
        diff
    }
}
