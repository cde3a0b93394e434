//! JSON command protocol for scripted navigation.
//!
//! Each command maps onto one navigator input; `tick` advances time. Used by
//! the CLI and the integration tests.

use serde::{Deserialize, Serialize};

use crate::harness::{TestHarness, FRAME_MS};

/// A navigation command
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum NavCommand {
    /// Remount at an address, as on a page load
    Mount { address: String },
    /// Click a shelf (0-based)
    SelectShelf { index: usize },
    /// Pointer pick on a named object of a shelf
    Pick { shelf: usize, name: String },
    /// Click on empty space
    PointerMissed,
    /// The back button
    SmartBack,
    /// The overlay's close button
    CloseBook,
    /// Follow a link (applied on the next tick)
    Navigate { address: String },
    /// Browser back (applied on the next tick)
    Back,
    /// Browser forward (applied on the next tick)
    Forward,
    /// Advance time by `ms` in frame-sized steps
    Tick {
        #[serde(default = "default_tick_ms")]
        ms: f64,
    },
    /// Rows of the selected shelf's index panel
    IndexPanel,
    /// Catalog search
    Search { query: String },
    /// Toggle the bookmark of the selected book
    ToggleBookmark,
    /// Dump the navigator state
    Inspect,
}

fn default_tick_ms() -> f64 {
    FRAME_MS
}

/// Response from executing a command.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommandResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl CommandResponse {
    fn ok() -> Self {
        Self {
            success: true,
            error: None,
            data: None,
        }
    }

    fn ok_with_data(data: serde_json::Value) -> Self {
        Self {
            success: true,
            error: None,
            data: Some(data),
        }
    }

    fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(msg.into()),
            data: None,
        }
    }

    fn from_serialize(value: impl Serialize) -> Self {
        match serde_json::to_value(value) {
            Ok(data) => Self::ok_with_data(data),
            Err(e) => Self::err(format!("Failed to serialize response: {e}")),
        }
    }
}

/// Execute a single command on the harness.
pub fn execute_command(harness: &mut TestHarness, cmd: NavCommand) -> CommandResponse {
    match cmd {
        NavCommand::Mount { address } => {
            harness.mount(&address);
            CommandResponse::from_serialize(harness.nav.snapshot())
        }

        NavCommand::SelectShelf { index } => {
            harness.select_shelf(index);
            CommandResponse::ok_with_data(serde_json::json!({
                "shelf_index": harness.nav.selection().shelf_index(),
                "address": harness.address(),
            }))
        }

        NavCommand::Pick { shelf, name } => {
            let picked = harness.pick(shelf, &name);
            CommandResponse::ok_with_data(serde_json::json!({
                "book_id": picked.map(|b| b.to_string()),
                "address": harness.address(),
            }))
        }

        NavCommand::PointerMissed => {
            let action = harness.nav.pointer_missed();
            CommandResponse::ok_with_data(serde_json::json!({ "action": action }))
        }

        NavCommand::SmartBack => {
            let action = harness.nav.smart_back();
            CommandResponse::ok_with_data(serde_json::json!({ "action": action }))
        }

        NavCommand::CloseBook => {
            harness.nav.close_book();
            CommandResponse::ok()
        }

        NavCommand::Navigate { address } => {
            harness.navigate(&address);
            CommandResponse::ok_with_data(serde_json::json!({
                "queued": harness.nav.pending_navigations(),
            }))
        }

        NavCommand::Back => {
            harness.nav.back();
            CommandResponse::ok()
        }

        NavCommand::Forward => {
            harness.nav.forward();
            CommandResponse::ok()
        }

        NavCommand::Tick { ms } => {
            if !ms.is_finite() || ms < 0.0 {
                return CommandResponse::err(format!("Invalid tick duration: {ms}"));
            }
            let reports = harness.advance(ms);
            let opened: Vec<String> = reports
                .iter()
                .filter_map(|r| r.opened.as_ref().map(|o| o.book_id.to_string()))
                .collect();
            let arrived = reports.iter().filter(|r| r.camera.is_some()).count();
            CommandResponse::ok_with_data(serde_json::json!({
                "frames": reports.len(),
                "opened": opened,
                "camera_arrivals": arrived,
                "navigations": reports.iter().map(|r| r.navigations).sum::<usize>(),
            }))
        }

        NavCommand::IndexPanel => CommandResponse::from_serialize(harness.nav.index_panel()),

        NavCommand::Search { query } => CommandResponse::from_serialize(harness.nav.search(&query)),

        NavCommand::ToggleBookmark => match harness.nav.toggle_bookmark() {
            Ok(Some(bookmarked)) => {
                CommandResponse::ok_with_data(serde_json::json!({ "bookmarked": bookmarked }))
            }
            Ok(None) => CommandResponse::err("No book selected"),
            Err(e) => CommandResponse::err(e.to_string()),
        },

        NavCommand::Inspect => CommandResponse::from_serialize(harness.nav.snapshot()),
    }
}

/// Parse and execute a single JSON command string.
pub fn execute_json(harness: &mut TestHarness, json: &str) -> Result<CommandResponse, String> {
    let cmd: NavCommand =
        serde_json::from_str(json).map_err(|e| format!("Invalid command JSON: {e}"))?;
    Ok(execute_command(harness, cmd))
}

/// Parse and execute multiple JSON commands (array).
pub fn execute_json_batch(
    harness: &mut TestHarness,
    json: &str,
) -> Result<Vec<CommandResponse>, String> {
    let cmds: Vec<NavCommand> =
        serde_json::from_str(json).map_err(|e| format!("Invalid commands JSON: {e}"))?;
    Ok(cmds
        .into_iter()
        .map(|cmd| execute_command(harness, cmd))
        .collect())
}
