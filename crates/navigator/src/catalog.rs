//! Read-only book catalog: shelf listings, the index panel and search.

use std::collections::BTreeMap;

use serde::Serialize;
use shared::{BookIdentity, BookRecord};

use crate::room::book_link_in;

/// Books keyed by identity
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: BTreeMap<BookIdentity, BookRecord>,
}

/// One row of the shelf index panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexRow {
    /// 1-based rank within the shelf
    pub ordinal: usize,
    pub id: String,
    pub name: String,
    pub author: String,
    /// Row matches the currently open book
    pub active: bool,
}

/// Search result with a link that reopens the book
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub id: String,
    pub name: String,
    pub author: String,
    pub link: String,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a JSON object mapping book ids to records.
    ///
    /// Keys that are not valid identities are skipped.
    pub fn from_json(json: &str) -> Result<Self, String> {
        let raw: BTreeMap<String, BookRecord> =
            serde_json::from_str(json).map_err(|e| format!("Catalog JSON parse error: {e}"))?;
        let mut catalog = Self::new();
        for (key, record) in raw {
            match key.parse::<BookIdentity>() {
                Ok(id) => catalog.insert(id, record),
                Err(e) => tracing::warn!("Skipping catalog entry: {e}"),
            }
        }
        Ok(catalog)
    }

    pub fn insert(&mut self, id: BookIdentity, record: BookRecord) {
        self.records.insert(id, record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &BookIdentity) -> Option<&BookRecord> {
        self.records.get(id)
    }

    /// Lookup by serialized id; unparsable or unknown ids are absent
    pub fn get_str(&self, id: &str) -> Option<(BookIdentity, &BookRecord)> {
        let id: BookIdentity = id.parse().ok()?;
        let record = self.records.get(&id)?;
        Some((id, record))
    }

    /// Books of one shelf in a room, ordered by shelf position
    pub fn shelf(&self, room_slug: &str, shelf_index: usize) -> Vec<(&BookIdentity, &BookRecord)> {
        let mut books: Vec<_> = self
            .records
            .iter()
            .filter(|(id, _)| id.room_slug == room_slug && id.shelf_index == shelf_index)
            .collect();
        books.sort_by_key(|(id, _)| id.position_in_shelf);
        books
    }

    /// Index panel rows for a shelf
    pub fn index_panel(
        &self,
        room_slug: &str,
        shelf_index: usize,
        active: Option<&BookIdentity>,
    ) -> Vec<IndexRow> {
        self.shelf(room_slug, shelf_index)
            .into_iter()
            .enumerate()
            .map(|(i, (id, record))| IndexRow {
                ordinal: i + 1,
                id: id.to_string(),
                name: record.name.clone(),
                author: record.author.clone(),
                active: active == Some(id),
            })
            .collect()
    }

    /// Case-insensitive substring search over name, author and description.
    ///
    /// Links are built as seen from `current_room`.
    pub fn search(&self, query: &str, current_room: &str) -> Vec<SearchHit> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.records
            .iter()
            .filter(|(_, r)| {
                r.name.to_lowercase().contains(&needle)
                    || r.author.to_lowercase().contains(&needle)
                    || r.description.to_lowercase().contains(&needle)
            })
            .map(|(id, r)| SearchHit {
                id: id.to_string(),
                name: r.name.clone(),
                author: r.author.clone(),
                link: book_link_in(id, current_room),
            })
            .collect()
    }
}
