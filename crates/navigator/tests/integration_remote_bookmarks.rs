//! Integration tests for the remote bookmark store against a live server.

use std::net::TcpListener;

use library_nav_lib::bookmarks::{BookmarkStore, RemoteBookmarkStore};
use library_nav_lib::harness::TestHarness;
use library_nav_lib::state::settings::BookmarkBackend;
use library_nav_lib::state::NavSettings;
use library_server_lib::BookmarkDb;

const LEARNING_GO: &str = "group42-web-dev-2-7";
const RUST_BOOK: &str = "group35-web-dev-4-0";

/// Start the bookmark server on a free local port; returns its base URL
fn start_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    listener.set_nonblocking(true).unwrap();
    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).unwrap();
            let _ = library_server_lib::serve(listener, BookmarkDb::new()).await;
        });
    });
    format!("http://{addr}")
}

#[test]
fn test_remote_add_list_remove() {
    let base = start_server();
    let mut store = RemoteBookmarkStore::new(&base, "reader@library.io").unwrap();

    store.add(LEARNING_GO).unwrap();
    store.add(RUST_BOOK).unwrap();
    store.add(LEARNING_GO).unwrap();
    let ids = store.list().unwrap();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(LEARNING_GO));

    store.remove(RUST_BOOK).unwrap();
    let ids = store.list().unwrap();
    assert_eq!(ids.len(), 1);
    assert!(!store.contains(RUST_BOOK).unwrap());
}

#[test]
fn test_remote_unknown_account() {
    let base = start_server();
    let mut store = RemoteBookmarkStore::new(&base, "nobody@library.io").unwrap();

    // Unknown account: the server answers 404 for both
    assert!(store.list().unwrap().is_empty());
    store.remove(LEARNING_GO).unwrap();
}

#[test]
fn test_remote_accounts_are_separate() {
    let base = start_server();
    let mut alice = RemoteBookmarkStore::new(&base, "alice@library.io").unwrap();
    let bob = RemoteBookmarkStore::new(&base, "bob@library.io").unwrap();

    assert!(alice.toggle(LEARNING_GO).unwrap());
    assert!(bob.list().unwrap().is_empty());
    assert!(!alice.toggle(LEARNING_GO).unwrap());
    assert!(alice.list().unwrap().is_empty());
}

#[test]
fn test_remote_store_through_navigator() {
    let base = start_server();
    let settings = NavSettings {
        bookmarks: BookmarkBackend::Remote {
            base_url: format!("{base}/"),
            email: "reader@library.io".to_string(),
        },
        ..NavSettings::default()
    };
    let mut h = TestHarness::with_settings(settings, &format!("/library/web-dev?shelf=3&bookId={LEARNING_GO}"));

    assert_eq!(h.nav.toggle_bookmark().unwrap(), Some(true));
    let entries = h.nav.bookmarks().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name, "Learning Go");
    assert_eq!(entries[0].link, format!("/library/web-dev?shelf=3&bookId={LEARNING_GO}"));
}

#[test]
fn test_remote_unreachable_is_error() {
    // Bind then drop to get a port nothing listens on
    let port = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
    let store = RemoteBookmarkStore::new(&format!("http://127.0.0.1:{port}"), "a@b.io").unwrap();
    assert!(store.list().is_err());
}
