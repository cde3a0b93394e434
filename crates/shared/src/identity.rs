//! Composite book identity and its delimited string form.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Deterministic key of one physical book.
///
/// Serialized as `{group_name}-{room_slug}-{shelf_index}-{position_in_shelf}`.
/// Group names come from the asset pipeline and never contain `-`; room slugs
/// may (`web-dev`), so parsing splits the two numeric fields off the end and
/// the group name off the front.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BookIdentity {
    pub group_name: String,
    pub room_slug: String,
    pub shelf_index: usize,
    pub position_in_shelf: usize,
}

/// Why a string is not a valid `BookIdentity`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityParseError {
    #[error("book id is empty")]
    Empty,
    #[error("book id `{0}` has too few segments")]
    MissingSegments(String),
    #[error("book id `{id}` has a non-numeric {field}")]
    NotANumber { id: String, field: &'static str },
    #[error("book id `{0}` has a shelf index with no shelf number")]
    ShelfOutOfRange(String),
}

impl BookIdentity {
    pub fn new(
        group_name: impl Into<String>,
        room_slug: impl Into<String>,
        shelf_index: usize,
        position_in_shelf: usize,
    ) -> Self {
        Self {
            group_name: group_name.into(),
            room_slug: room_slug.into(),
            shelf_index,
            position_in_shelf,
        }
    }

    /// 1-based shelf number as it appears in addresses.
    ///
    /// Parsed identities always have one; saturates for hand-built ones.
    pub fn shelf_number(&self) -> usize {
        self.shelf_index.saturating_add(1)
    }
}

impl fmt::Display for BookIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}-{}",
            self.group_name, self.room_slug, self.shelf_index, self.position_in_shelf
        )
    }
}

impl FromStr for BookIdentity {
    type Err = IdentityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(IdentityParseError::Empty);
        }
        let missing = || IdentityParseError::MissingSegments(s.to_string());

        let mut tail = s.rsplitn(3, '-');
        let position = tail.next().ok_or_else(missing)?;
        let shelf = tail.next().ok_or_else(missing)?;
        let head = tail.next().ok_or_else(missing)?;
        let (group_name, room_slug) = head.split_once('-').ok_or_else(missing)?;
        if group_name.is_empty() || room_slug.is_empty() {
            return Err(missing());
        }

        let shelf_index: usize = shelf.parse().map_err(|_| IdentityParseError::NotANumber {
            id: s.to_string(),
            field: "shelf index",
        })?;
        if shelf_index.checked_add(1).is_none() {
            return Err(IdentityParseError::ShelfOutOfRange(s.to_string()));
        }
        let position_in_shelf = position.parse().map_err(|_| IdentityParseError::NotANumber {
            id: s.to_string(),
            field: "shelf position",
        })?;

        Ok(Self {
            group_name: group_name.to_string(),
            room_slug: room_slug.to_string(),
            shelf_index,
            position_in_shelf,
        })
    }
}

impl TryFrom<String> for BookIdentity {
    type Error = IdentityParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BookIdentity> for String {
    fn from(id: BookIdentity) -> Self {
        id.to_string()
    }
}
