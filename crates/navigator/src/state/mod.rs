pub mod address;
pub mod overlay;
pub mod selection;
pub mod settings;

pub use address::{Address, AddressHistory, AddressState, PulledSelection};
pub use overlay::{OpenBook, OverlayState};
pub use selection::{BackAction, SelectionLevel, SelectionState};
pub use settings::NavSettings;

/// Monotonic "snap everything back" counter.
///
/// Observers remember the last value they saw and react when it moves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct ResetSignal(u64);

impl ResetSignal {
    pub fn bump(&mut self) {
        self.0 += 1;
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}
