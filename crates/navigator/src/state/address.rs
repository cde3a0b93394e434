//! Shareable address state and its mapping to the selection.
//!
//! Shelves are 0-based internally and 1-based in addresses; the offset is
//! applied here and nowhere else.

use serde::Serialize;
use shared::{BookIdentity, BOOK_ID_KEY, SHELF_KEY};

use super::selection::SelectionState;
use crate::room::{library_path, slug_from_path, LIBRARY_PREFIX, ROOMS_PATH};

/// Flat query mapping, insertion-ordered
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct AddressState {
    params: Vec<(String, String)>,
}

impl AddressState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.params.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => self.params.push((key.to_string(), value)),
        }
    }

    pub fn remove(&mut self, key: &str) {
        self.params.retain(|(k, _)| k != key);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Parse `a=1&b=2` (leading `?` allowed); later duplicates win
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut state = Self::new();
        for (k, v) in url::form_urlencoded::parse(query.as_bytes()) {
            state.set(&k, v.into_owned());
        }
        state
    }

    /// Encode without the leading `?`
    pub fn to_query(&self) -> String {
        let mut ser = url::form_urlencoded::Serializer::new(String::new());
        for (k, v) in &self.params {
            ser.append_pair(k, v);
        }
        ser.finish()
    }
}

/// A view path plus its query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Address {
    pub path: String,
    pub query: AddressState,
}

impl Address {
    pub fn new(path: &str, query: AddressState) -> Self {
        Self {
            path: path.to_string(),
            query,
        }
    }

    /// Rooms overview
    pub fn rooms() -> Self {
        Self::new(ROOMS_PATH, AddressState::new())
    }

    /// A room with nothing selected
    pub fn room(slug: &str) -> Self {
        Self::new(&library_path(slug), AddressState::new())
    }

    /// Parse `/library/web-dev?shelf=3&bookId=...`
    pub fn parse(href: &str) -> Self {
        let (path, query) = href.split_once('?').unwrap_or((href, ""));
        let path = if path.is_empty() { "/" } else { path };
        Self::new(path, AddressState::from_query(query))
    }

    pub fn to_href(&self) -> String {
        let query = self.query.to_query();
        if query.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, query)
        }
    }

    /// Whether this address shows a library room
    pub fn is_library(&self) -> bool {
        self.path == LIBRARY_PREFIX || self.path.starts_with(&format!("{LIBRARY_PREFIX}/"))
    }

    pub fn room_slug(&self) -> String {
        slug_from_path(&self.path)
    }
}

/// Selection read back from an address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PulledSelection {
    pub shelf_index: Option<usize>,
    pub book_id: Option<BookIdentity>,
    /// The address carried something that had to be dropped
    pub normalized: bool,
}

/// Write the selection into `query`, leaving unrelated keys alone
pub fn push(selection: &SelectionState, query: &mut AddressState) {
    match selection.shelf_index() {
        Some(index) => {
            query.set(SHELF_KEY, (index + 1).to_string());
            match selection.book_id() {
                Some(id) => query.set(BOOK_ID_KEY, id.to_string()),
                None => query.remove(BOOK_ID_KEY),
            }
        }
        None => {
            query.remove(SHELF_KEY);
            query.remove(BOOK_ID_KEY);
        }
    }
}

/// Read a selection out of `query`.
///
/// A missing or out-of-range `shelf` yields no selection at all, whatever
/// `bookId` says. A `bookId` that does not parse, or names another room or
/// shelf, is dropped while the shelf is kept.
pub fn pull(query: &AddressState, room_slug: &str, shelf_count: usize) -> PulledSelection {
    let raw_book = query.get(BOOK_ID_KEY);

    let shelf_index = query
        .get(SHELF_KEY)
        .and_then(|s| s.trim().parse::<usize>().ok())
        .filter(|n| (1..=shelf_count).contains(n))
        .map(|n| n - 1);

    let Some(shelf_index) = shelf_index else {
        let normalized = query.contains(SHELF_KEY) || raw_book.is_some();
        if normalized {
            tracing::warn!("Address {:?} has no usable shelf, resetting", query.to_query());
        }
        return PulledSelection {
            shelf_index: None,
            book_id: None,
            normalized,
        };
    };

    let book_id = raw_book.and_then(|raw| match raw.parse::<BookIdentity>() {
        Ok(id) if id.shelf_index == shelf_index && id.room_slug == room_slug => Some(id),
        Ok(id) => {
            tracing::warn!("Book {id} does not belong to shelf {}", shelf_index + 1);
            None
        }
        Err(e) => {
            tracing::warn!("Dropping book id from address: {e}");
            None
        }
    });

    PulledSelection {
        shelf_index: Some(shelf_index),
        normalized: raw_book.is_some() && book_id.is_none(),
        book_id,
    }
}

/// Back/forward stack of addresses
#[derive(Debug, Clone)]
pub struct AddressHistory {
    entries: Vec<Address>,
    cursor: usize,
}

impl AddressHistory {
    pub fn new(initial: Address) -> Self {
        Self {
            entries: vec![initial],
            cursor: 0,
        }
    }

    pub fn current(&self) -> &Address {
        &self.entries[self.cursor]
    }

    /// New entry; forward entries are discarded. Pushing the current address is a no-op.
    pub fn push(&mut self, address: Address) {
        if *self.current() == address {
            return;
        }
        self.entries.truncate(self.cursor + 1);
        self.entries.push(address);
        self.cursor += 1;
    }

    /// Overwrite the current entry
    pub fn replace(&mut self, address: Address) {
        self.entries[self.cursor] = address;
    }

    pub fn can_go_back(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    pub fn back(&mut self) -> Option<Address> {
        if !self.can_go_back() {
            return None;
        }
        self.cursor -= 1;
        Some(self.current().clone())
    }

    pub fn forward(&mut self) -> Option<Address> {
        if !self.can_go_forward() {
            return None;
        }
        self.cursor += 1;
        Some(self.current().clone())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(shelf: usize, pos: usize) -> BookIdentity {
        BookIdentity::new("group42", "web-dev", shelf, pos)
    }

    #[test]
    fn test_push_shelf_only() {
        let mut s = SelectionState::new("web-dev", 6);
        s.select_shelf(2);
        let mut q = AddressState::new();
        push(&s, &mut q);
        assert_eq!(q.get(SHELF_KEY), Some("3"));
        assert!(!q.contains(BOOK_ID_KEY));
        assert_eq!(q.to_query(), "shelf=3");
    }

    #[test]
    fn test_push_book() {
        let mut s = SelectionState::new("web-dev", 6);
        s.select_shelf(2);
        s.select_book(book(2, 7));
        let mut q = AddressState::new();
        push(&s, &mut q);
        assert_eq!(q.to_query(), "shelf=3&bookId=group42-web-dev-2-7");
    }

    #[test]
    fn test_push_idle_removes_keys_keeps_others() {
        let s = SelectionState::new("web-dev", 6);
        let mut q = AddressState::from_query("?shelf=3&bookId=x&lang=en");
        push(&s, &mut q);
        assert_eq!(q.to_query(), "lang=en");
    }

    #[test]
    fn test_pull_push_round_trip_all_states() {
        let shelf_count = 6;
        let mut states = vec![SelectionState::new("web-dev", shelf_count)];
        for shelf in 0..shelf_count {
            let mut s = SelectionState::new("web-dev", shelf_count);
            s.select_shelf(shelf);
            states.push(s.clone());
            for pos in [0, 7, 12] {
                let mut b = s.clone();
                b.select_book(book(shelf, pos));
                states.push(b);
            }
        }
        for s in states {
            let mut q = AddressState::new();
            push(&s, &mut q);
            let pulled = pull(&q, "web-dev", shelf_count);
            assert_eq!(pulled.shelf_index, s.shelf_index());
            assert_eq!(pulled.book_id.as_ref(), s.book_id());
            assert!(!pulled.normalized);
        }
    }

    #[test]
    fn test_pull_dangling_book_without_shelf() {
        let q = AddressState::from_query("bookId=group42-web-dev-2-7");
        let p = pull(&q, "web-dev", 6);
        assert_eq!(p.shelf_index, None);
        assert_eq!(p.book_id, None);
        assert!(p.normalized);
    }

    #[test]
    fn test_pull_out_of_range_shelf() {
        for raw in ["shelf=0", "shelf=7", "shelf=-1", "shelf=abc", "shelf="] {
            let p = pull(&AddressState::from_query(raw), "web-dev", 6);
            assert_eq!(p.shelf_index, None, "{raw}");
            assert!(p.normalized, "{raw}");
        }
    }

    #[test]
    fn test_pull_book_on_wrong_shelf_dropped() {
        let q = AddressState::from_query("shelf=2&bookId=group42-web-dev-2-7");
        let p = pull(&q, "web-dev", 6);
        assert_eq!(p.shelf_index, Some(1));
        assert_eq!(p.book_id, None);
        assert!(p.normalized);
    }

    #[test]
    fn test_pull_book_from_other_room_dropped() {
        let q = AddressState::from_query("shelf=3&bookId=group42-library-2-7");
        let p = pull(&q, "web-dev", 6);
        assert_eq!(p.shelf_index, Some(2));
        assert!(p.book_id.is_none());
    }

    #[test]
    fn test_pull_empty() {
        let p = pull(&AddressState::new(), "web-dev", 6);
        assert_eq!(p.shelf_index, None);
        assert!(!p.normalized);
    }

    #[test]
    fn test_address_parse_and_href() {
        let a = Address::parse("/library/web-dev?shelf=3&bookId=group42-web-dev-2-7");
        assert_eq!(a.path, "/library/web-dev");
        assert_eq!(a.room_slug(), "web-dev");
        assert!(a.is_library());
        assert_eq!(a.query.get(SHELF_KEY), Some("3"));
        assert_eq!(
            a.to_href(),
            "/library/web-dev?shelf=3&bookId=group42-web-dev-2-7"
        );
        assert_eq!(Address::room("web-dev").to_href(), "/library/web-dev");
        assert!(!Address::rooms().is_library());
    }

    #[test]
    fn test_history_back_forward() {
        let mut h = AddressHistory::new(Address::room("web-dev"));
        h.push(Address::parse("/library/web-dev?shelf=3"));
        h.push(Address::parse("/library/web-dev?shelf=3&bookId=group42-web-dev-2-7"));
        assert_eq!(h.len(), 3);

        let back = h.back().unwrap();
        assert_eq!(back.to_href(), "/library/web-dev?shelf=3");
        assert!(h.can_go_forward());

        h.push(Address::room("web-dev"));
        assert!(!h.can_go_forward());
        assert_eq!(h.len(), 3);

        h.back();
        h.back();
        assert!(h.back().is_none());
        assert_eq!(h.current().to_href(), "/library/web-dev");
    }

    #[test]
    fn test_history_push_same_is_noop() {
        let mut h = AddressHistory::new(Address::room("web-dev"));
        h.push(Address::room("web-dev"));
        assert_eq!(h.len(), 1);
        h.replace(Address::parse("/library/web-dev?shelf=1"));
        assert_eq!(h.len(), 1);
        assert_eq!(h.current().query.get(SHELF_KEY), Some("1"));
    }

    #[test]
    fn test_room_address_encodes_slug() {
        let a = Address::room("web dev");
        assert_eq!(a.to_href(), "/library/web%20dev");
        assert_eq!(a.room_slug(), "web dev");
        assert_eq!(Address::parse(&a.to_href()), a);
    }
}
