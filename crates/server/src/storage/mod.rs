//! In-process bookmark storage keyed by account email.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use tokio::sync::RwLock;

/// Bookmarked book ids per account
#[derive(Clone, Default)]
pub struct BookmarkDb {
    accounts: Arc<RwLock<HashMap<String, BTreeSet<String>>>>,
}

impl BookmarkDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `book_id` for `email`, creating the account on first use.
    /// Returns the account's bookmarks after the change.
    pub async fn add(&self, email: &str, book_id: &str) -> Vec<String> {
        let mut accounts = self.accounts.write().await;
        let ids = accounts.entry(email.to_string()).or_default();
        ids.insert(book_id.to_string());
        ids.iter().cloned().collect()
    }

    /// Remove `book_id`; `None` for an unknown account
    pub async fn remove(&self, email: &str, book_id: &str) -> Option<Vec<String>> {
        let mut accounts = self.accounts.write().await;
        let ids = accounts.get_mut(email)?;
        ids.remove(book_id);
        Some(ids.iter().cloned().collect())
    }

    /// Bookmarks of `email`; `None` for an unknown account
    pub async fn list(&self, email: &str) -> Option<Vec<String>> {
        let accounts = self.accounts.read().await;
        accounts.get(email).map(|ids| ids.iter().cloned().collect())
    }
}
