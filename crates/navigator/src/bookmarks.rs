//! Bookmark storage.
//!
//! The navigator only needs add/remove/list keyed by book id. Where the ids
//! live (process memory, a JSON file, or the per-account bookmark server) is
//! picked from settings.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::Serialize;
use shared::{BookmarkListResponse, BookmarkRequest};

use crate::catalog::Catalog;
use crate::room::book_link_in;
use crate::state::settings::BookmarkBackend;

#[derive(Debug, thiserror::Error)]
pub enum BookmarkError {
    #[error("bookmark file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("bookmark data is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("bookmark service unreachable: {0}")]
    Http(#[from] reqwest::Error),
    #[error("bookmark service answered {0}")]
    Status(u16),
}

/// Set of bookmarked book ids
pub trait BookmarkStore {
    fn add(&mut self, book_id: &str) -> Result<(), BookmarkError>;
    fn remove(&mut self, book_id: &str) -> Result<(), BookmarkError>;
    fn list(&self) -> Result<BTreeSet<String>, BookmarkError>;

    fn contains(&self, book_id: &str) -> Result<bool, BookmarkError> {
        Ok(self.list()?.contains(book_id))
    }

    /// Add if absent, remove if present; returns whether it is now bookmarked
    fn toggle(&mut self, book_id: &str) -> Result<bool, BookmarkError> {
        if self.contains(book_id)? {
            self.remove(book_id)?;
            Ok(false)
        } else {
            self.add(book_id)?;
            Ok(true)
        }
    }
}

/// Open the store configured in settings
pub fn open_store(backend: &BookmarkBackend) -> Result<Box<dyn BookmarkStore>, BookmarkError> {
    Ok(match backend {
        BookmarkBackend::Memory => Box::new(MemoryBookmarkStore::default()),
        BookmarkBackend::Local => Box::new(LocalBookmarkStore::open_default()?),
        BookmarkBackend::Remote { base_url, email } => {
            Box::new(RemoteBookmarkStore::new(base_url, email)?)
        }
    })
}

#[derive(Debug, Clone, Default)]
pub struct MemoryBookmarkStore {
    ids: BTreeSet<String>,
}

impl BookmarkStore for MemoryBookmarkStore {
    fn add(&mut self, book_id: &str) -> Result<(), BookmarkError> {
        self.ids.insert(book_id.to_string());
        Ok(())
    }

    fn remove(&mut self, book_id: &str) -> Result<(), BookmarkError> {
        self.ids.remove(book_id);
        Ok(())
    }

    fn list(&self) -> Result<BTreeSet<String>, BookmarkError> {
        Ok(self.ids.clone())
    }
}

/// JSON array of ids in a file, rewritten on every change
#[derive(Debug, Clone)]
pub struct LocalBookmarkStore {
    path: PathBuf,
    ids: BTreeSet<String>,
}

impl LocalBookmarkStore {
    /// `bookmarks.json` in the platform data dir
    pub fn open_default() -> Result<Self, BookmarkError> {
        let path = directories::ProjectDirs::from("com", "library", "library-nav")
            .map(|dirs| dirs.data_dir().join("bookmarks.json"))
            .unwrap_or_else(|| PathBuf::from("bookmarks.json"));
        Self::open(path)
    }

    /// Load `path`; a missing file is an empty store
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, BookmarkError> {
        let path = path.into();
        let ids = match std::fs::read_to_string(&path) {
            Ok(json) => serde_json::from_str::<Vec<String>>(&json)?
                .into_iter()
                .collect(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeSet::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, ids })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<(), BookmarkError> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)?;
            }
        }
        let ids: Vec<&String> = self.ids.iter().collect();
        std::fs::write(&self.path, serde_json::to_string_pretty(&ids)?)?;
        Ok(())
    }
}

impl BookmarkStore for LocalBookmarkStore {
    fn add(&mut self, book_id: &str) -> Result<(), BookmarkError> {
        if self.ids.insert(book_id.to_string()) {
            self.save()?;
        }
        Ok(())
    }

    fn remove(&mut self, book_id: &str) -> Result<(), BookmarkError> {
        if self.ids.remove(book_id) {
            self.save()?;
        }
        Ok(())
    }

    fn list(&self) -> Result<BTreeSet<String>, BookmarkError> {
        Ok(self.ids.clone())
    }
}

/// Client for the bookmark server's per-account store.
///
/// Calls block on a private single-threaded runtime; they never run inside
/// the tick loop.
pub struct RemoteBookmarkStore {
    base_url: String,
    email: String,
    client: reqwest::Client,
    runtime: tokio::runtime::Runtime,
}

impl RemoteBookmarkStore {
    pub fn new(base_url: &str, email: &str) -> Result<Self, BookmarkError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            email: email.to_string(),
            client: reqwest::Client::new(),
            runtime,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, book_id: &str) -> BookmarkRequest {
        BookmarkRequest {
            email: self.email.clone(),
            book_id: book_id.to_string(),
        }
    }
}

impl BookmarkStore for RemoteBookmarkStore {
    fn add(&mut self, book_id: &str) -> Result<(), BookmarkError> {
        let body = self.request(book_id);
        self.runtime.block_on(async {
            let response = self
                .client
                .post(self.url("/api/bookmarks"))
                .json(&body)
                .send()
                .await?;
            if !response.status().is_success() {
                return Err(BookmarkError::Status(response.status().as_u16()));
            }
            Ok(())
        })
    }

    fn remove(&mut self, book_id: &str) -> Result<(), BookmarkError> {
        let body = self.request(book_id);
        self.runtime.block_on(async {
            let response = self
                .client
                .delete(self.url("/api/bookmarks"))
                .json(&body)
                .send()
                .await?;
            match response.status().as_u16() {
                // Unknown account: nothing to remove
                404 => Ok(()),
                s if (200..300).contains(&s) => Ok(()),
                s => Err(BookmarkError::Status(s)),
            }
        })
    }

    fn list(&self) -> Result<BTreeSet<String>, BookmarkError> {
        self.runtime.block_on(async {
            let response = self
                .client
                .get(self.url("/api/bookmarks/get"))
                .query(&[("email", self.email.as_str())])
                .send()
                .await?;
            match response.status().as_u16() {
                404 => Ok(BTreeSet::new()),
                s if (200..300).contains(&s) => {
                    let body: BookmarkListResponse = response.json().await?;
                    Ok(body.bookmarks.into_iter().collect())
                }
                s => Err(BookmarkError::Status(s)),
            }
        })
    }
}

/// A bookmark resolved through the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookmarkEntry {
    pub id: String,
    pub name: String,
    pub author: String,
    /// Deep link that reopens the book
    pub link: String,
}

/// Bookmarks view: stored ids that the catalog knows, in id order, with
/// links as seen from `current_room`
pub fn bookmark_entries(
    ids: &BTreeSet<String>,
    catalog: &Catalog,
    current_room: &str,
) -> Vec<BookmarkEntry> {
    ids.iter()
        .filter_map(|raw| {
            let (id, record) = catalog.get_str(raw)?;
            Some(BookmarkEntry {
                id: raw.clone(),
                name: record.name.clone(),
                author: record.author.clone(),
                link: book_link_in(&id, current_room),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn test_memory_toggle() {
        let mut s = MemoryBookmarkStore::default();
        assert!(s.toggle("group42-web-dev-2-7").unwrap());
        assert!(s.contains("group42-web-dev-2-7").unwrap());
        assert!(!s.toggle("group42-web-dev-2-7").unwrap());
        assert!(s.list().unwrap().is_empty());
    }

    #[test]
    fn test_memory_add_is_set() {
        let mut s = MemoryBookmarkStore::default();
        s.add("a").unwrap();
        s.add("a").unwrap();
        assert_eq!(s.list().unwrap().len(), 1);
        s.remove("missing").unwrap();
    }

    #[test]
    fn test_local_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("bookmarks.json");

        let mut s = LocalBookmarkStore::open(&path).unwrap();
        assert!(s.list().unwrap().is_empty());
        s.add("group42-web-dev-2-7").unwrap();
        s.add("group35-web-dev-4-0").unwrap();
        s.remove("group35-web-dev-4-0").unwrap();

        let reopened = LocalBookmarkStore::open(&path).unwrap();
        let ids = reopened.list().unwrap();
        assert_eq!(ids.len(), 1);
        assert!(ids.contains("group42-web-dev-2-7"));
    }

    #[test]
    fn test_local_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bookmarks.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            LocalBookmarkStore::open(&path),
            Err(BookmarkError::Json(_))
        ));
    }

    #[test]
    fn test_entries_skip_unknown_ids() {
        let ids: BTreeSet<String> = ["group42-web-dev-2-7", "group1-web-dev-0-99", "garbage"]
            .into_iter()
            .map(String::from)
            .collect();
        let entries = bookmark_entries(&ids, &fixtures::catalog(), fixtures::ROOM);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "Learning Go");
        assert_eq!(
            entries[0].link,
            "/library/web-dev?shelf=3&bookId=group42-web-dev-2-7"
        );
    }

    #[test]
    fn test_open_memory_backend() {
        let mut store = open_store(&BookmarkBackend::Memory).unwrap();
        store.add("x").unwrap();
        assert!(store.contains("x").unwrap());
    }
}
