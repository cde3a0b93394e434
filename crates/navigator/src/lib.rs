// Library crate: the navigation core plus the headless harness and command
// protocol used by the CLI and integration tests.

pub mod bookmarks;
pub mod catalog;
pub mod command;
pub mod decorations;
pub mod fixtures;
pub mod harness;
pub mod identity;
pub mod navigator;
pub mod room;
pub mod scene;
pub mod state;

/// Per-tick controllers that move scene objects and the camera.
pub mod viewport {
    pub mod animator;
    pub mod camera;
}
