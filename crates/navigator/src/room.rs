//! Room layout: shelf placement, labels, slugs and paths.

use glam::Vec3;
use shared::{BookIdentity, Rgb, BOOK_ID_KEY, SHELF_KEY};

use crate::identity::identity_room_slug;

/// Path of the rooms overview
pub const ROOMS_PATH: &str = "/room";

/// Path prefix of a library room
pub const LIBRARY_PREFIX: &str = "/library";

/// Slug used when the path carries none
pub const DEFAULT_ROOM: &str = "library";

/// One shelf in a room
#[derive(Debug, Clone, PartialEq)]
pub struct ShelfSpec {
    pub position: Vec3,
    pub label: String,
    pub color: Rgb,
}

/// Shelves of a room and the room's slug
#[derive(Debug, Clone, PartialEq)]
pub struct RoomLayout {
    pub slug: String,
    pub shelves: Vec<ShelfSpec>,
}

const TECH_SHELVES: [(&str, Rgb, [f32; 3]); 6] = [
    ("JavaScript", Rgb(0xf7, 0xdf, 0x1e), [-4.0, 0.0, -2.0]),
    ("TypeScript", Rgb(0x31, 0x78, 0xc6), [0.0, 0.0, -2.0]),
    ("Go", Rgb(0x00, 0xad, 0xd8), [4.0, 0.0, -2.0]),
    ("C++", Rgb(0x00, 0x59, 0x9c), [-4.0, 0.0, 2.0]),
    ("Rust", Rgb(0xde, 0xa5, 0x84), [0.0, 0.0, 2.0]),
    ("Python", Rgb(0x37, 0x76, 0xab), [4.0, 0.0, 2.0]),
];

impl RoomLayout {
    /// Standard two-row, six-shelf room
    pub fn library(slug: &str) -> Self {
        Self {
            slug: slug.to_string(),
            shelves: TECH_SHELVES
                .iter()
                .map(|(label, color, pos)| ShelfSpec {
                    position: Vec3::from_array(*pos),
                    label: label.to_string(),
                    color: *color,
                })
                .collect(),
        }
    }

    pub fn shelf_count(&self) -> usize {
        self.shelves.len()
    }

    pub fn shelf_position(&self, index: usize) -> Option<Vec3> {
        self.shelves.get(index).map(|s| s.position)
    }

    pub fn display_name(&self) -> String {
        display_name(&self.slug)
    }

    /// Shelves drawn for the given selection: all of them, or only the selected one
    pub fn visible_shelves(&self, selected: Option<usize>) -> Vec<usize> {
        match selected {
            Some(i) if i < self.shelves.len() => vec![i],
            _ => (0..self.shelves.len()).collect(),
        }
    }
}

/// `library` → `Library`, `web-dev` → `Web Dev`
pub fn display_name(slug: &str) -> String {
    if slug == DEFAULT_ROOM {
        return "Library".to_string();
    }
    slug.split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Room slug from a view path: last non-empty segment, percent-decoded.
pub fn slug_from_path(path: &str) -> String {
    path.split('/')
        .rfind(|s| !s.is_empty())
        .map(decode_segment)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_ROOM.to_string())
}

/// Percent-decode one path segment; malformed UTF-8 keeps the raw segment
fn decode_segment(segment: &str) -> String {
    match urlencoding::decode(segment) {
        Ok(decoded) => decoded.into_owned(),
        Err(e) => {
            tracing::warn!("Path segment `{segment}` is not UTF-8 once decoded: {e}");
            segment.to_string()
        }
    }
}

/// `/library/<slug>`, slug percent-encoded
pub fn library_path(slug: &str) -> String {
    format!("{LIBRARY_PREFIX}/{}", urlencoding::encode(slug))
}

/// Deep link for `identity` as seen from room `current_room`.
///
/// Identities carry the room slug without whitespace, so when the book lives
/// in the current room the link keeps the room's own slug.
pub fn book_link_in(identity: &BookIdentity, current_room: &str) -> String {
    let room = if identity_room_slug(current_room) == identity.room_slug {
        current_room
    } else {
        identity.room_slug.as_str()
    };
    format!(
        "{}?{SHELF_KEY}={}&{BOOK_ID_KEY}={}",
        library_path(room),
        identity.shelf_number(),
        identity
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_layout() {
        let room = RoomLayout::library("web-dev");
        assert_eq!(room.shelf_count(), 6);
        assert_eq!(room.shelf_position(2), Some(Vec3::new(4.0, 0.0, -2.0)));
        assert_eq!(room.shelves[4].label, "Rust");
        assert_eq!(room.shelves[4].color.to_hex(), "#dea584");
        assert_eq!(room.shelf_position(6), None);
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("library"), "Library");
        assert_eq!(display_name("web-dev"), "Web Dev");
        assert_eq!(display_name("systems"), "Systems");
    }

    #[test]
    fn test_slug_from_path() {
        assert_eq!(slug_from_path("/library/web-dev"), "web-dev");
        assert_eq!(slug_from_path("/library/web-dev/"), "web-dev");
        assert_eq!(slug_from_path("/library/web%20dev"), "web dev");
        assert_eq!(slug_from_path("/library/a+b%26c%3Dd"), "a+b&c=d");
        assert_eq!(slug_from_path("/library/%FF"), "%FF");
        assert_eq!(slug_from_path("/"), "library");
        assert_eq!(slug_from_path(""), "library");
    }

    #[test]
    fn test_visible_shelves() {
        let room = RoomLayout::library("library");
        assert_eq!(room.visible_shelves(None).len(), 6);
        assert_eq!(room.visible_shelves(Some(3)), vec![3]);
        assert_eq!(room.visible_shelves(Some(9)).len(), 6);
    }

    #[test]
    fn test_book_link() {
        let id = BookIdentity::new("group42", "web-dev", 2, 7);
        assert_eq!(
            book_link_in(&id, "web-dev"),
            "/library/web-dev?shelf=3&bookId=group42-web-dev-2-7"
        );
    }

    #[test]
    fn test_library_path_encodes_slug() {
        assert_eq!(library_path("web-dev"), "/library/web-dev");
        assert_eq!(library_path("web dev"), "/library/web%20dev");
        assert_eq!(slug_from_path(&library_path("a b&c")), "a b&c");
    }

    #[test]
    fn test_book_link_keeps_current_room_slug() {
        let id = BookIdentity::new("group42", "webdev", 2, 7);
        assert_eq!(
            book_link_in(&id, "web dev"),
            "/library/web%20dev?shelf=3&bookId=group42-webdev-2-7"
        );
        // Book from another room links to its own room
        assert_eq!(
            book_link_in(&id, "systems"),
            "/library/webdev?shelf=3&bookId=group42-webdev-2-7"
        );
    }
}
