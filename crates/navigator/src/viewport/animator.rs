//! Reversible "slide out and open" feedback on a picked book.
//!
//! The animator remembers the book's transforms the first time it is picked
//! and puts them back verbatim when the reset signal moves. A delayed
//! emission tells the overlay which book to show and with what tint.

use serde::Serialize;
use shared::{BookIdentity, Rgb};

use crate::identity::{BookParts, ResolvedBook};
use crate::scene::{SceneGraph, Transform};
use crate::state::settings::AnimationSettings;
use crate::state::ResetSignal;

/// Transforms of both book halves before animation started
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformSnapshot {
    pub inner: Transform,
    pub outer: Transform,
}

impl TransformSnapshot {
    fn capture(graph: &SceneGraph, parts: &BookParts) -> Option<Self> {
        Some(Self {
            inner: graph.transform(parts.inner)?,
            outer: graph.transform(parts.outer)?,
        })
    }

    fn restore(&self, graph: &mut SceneGraph, parts: &BookParts) {
        graph.set_transform(parts.inner, self.inner);
        graph.set_transform(parts.outer, self.outer);
    }
}

/// Overlay-open request raised after the fixed delay
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookOpened {
    pub book_id: BookIdentity,
    pub tint: Rgb,
}

#[derive(Debug, Clone)]
struct PendingOpen {
    book_id: BookIdentity,
    tint: Rgb,
    due_ms: f64,
    /// Reset value at scheduling time; a later reset invalidates the emission
    generation: u64,
}

#[derive(Debug, Clone)]
struct AnimatedBook {
    book_id: BookIdentity,
    shelf_index: usize,
    parts: BookParts,
    snapshot: TransformSnapshot,
    tint: Rgb,
    /// Delayed emission already fired for this selection
    emitted: bool,
}

/// Pick-feedback animation for at most one book at a time
#[derive(Debug, Clone)]
pub struct PickFeedbackAnimator {
    settings: AnimationSettings,
    default_tint: Rgb,
    active: Option<AnimatedBook>,
    pending: Option<PendingOpen>,
    seen_reset: u64,
    clock_ms: f64,
}

impl PickFeedbackAnimator {
    pub fn new(settings: AnimationSettings, default_tint: Rgb) -> Self {
        Self {
            settings,
            default_tint,
            active: None,
            pending: None,
            seen_reset: 0,
            clock_ms: 0.0,
        }
    }

    /// Shelf whose scene graph holds the animated book
    pub fn active_shelf(&self) -> Option<usize> {
        self.active.as_ref().map(|a| a.shelf_index)
    }

    pub fn active_book(&self) -> Option<&BookIdentity> {
        self.active.as_ref().map(|a| &a.book_id)
    }

    pub fn snapshot(&self) -> Option<&TransformSnapshot> {
        self.active.as_ref().map(|a| &a.snapshot)
    }

    pub fn has_pending_open(&self) -> bool {
        self.pending.is_some()
    }

    /// Start animating `book` on `shelf_index`.
    ///
    /// Picking the book that is already animating keeps the first snapshot
    /// and does not schedule a second emission. Another book that is still
    /// animating is snapped back first.
    pub fn select_book(&mut self, graph: &mut SceneGraph, book: &ResolvedBook, shelf_index: usize) {
        if let Some(active) = &self.active {
            if active.book_id == book.identity {
                let (book_id, tint) = (active.book_id.clone(), active.tint);
                if !active.emitted && self.pending.is_none() {
                    self.schedule(book_id, tint);
                }
                return;
            }
        }
        if let Some(previous) = self.active.take() {
            if previous.shelf_index == shelf_index {
                previous.snapshot.restore(graph, &previous.parts);
            }
            self.pending = None;
        }

        let Some(snapshot) = TransformSnapshot::capture(graph, &book.parts) else {
            tracing::warn!("Book {} has no transforms to animate", book.identity);
            return;
        };
        let tint = graph
            .node(book.parts.outer)
            .and_then(|n| n.color)
            .unwrap_or(self.default_tint);

        tracing::debug!("Animating {} (tint {tint})", book.identity);
        self.active = Some(AnimatedBook {
            book_id: book.identity.clone(),
            shelf_index,
            parts: book.parts,
            snapshot,
            tint,
            emitted: false,
        });
        self.schedule(book.identity.clone(), tint);
    }

    fn schedule(&mut self, book_id: BookIdentity, tint: Rgb) {
        self.pending = Some(PendingOpen {
            book_id,
            tint,
            due_ms: self.clock_ms + self.settings.open_delay_ms as f64,
            generation: self.seen_reset,
        });
    }

    /// React to a reset signal change: restore exactly, forget the book and
    /// cancel any pending emission.
    ///
    /// `graph` must be the scene graph of `active_shelf()`. Returns whether a
    /// book was restored.
    pub fn observe_reset(&mut self, reset: ResetSignal, graph: Option<&mut SceneGraph>) -> bool {
        if reset.value() == self.seen_reset {
            return false;
        }
        self.seen_reset = reset.value();
        self.pending = None;
        let Some(active) = self.active.take() else {
            return false;
        };
        match graph {
            Some(graph) => {
                active.snapshot.restore(graph, &active.parts);
                tracing::debug!("Restored {}", active.book_id);
                true
            }
            None => {
                tracing::warn!("No scene graph to restore {} into", active.book_id);
                false
            }
        }
    }

    /// Advance by `dt_ms`: ease the book toward its open pose, then fire the
    /// delayed emission when due.
    pub fn tick(&mut self, dt_ms: f64, graph: Option<&mut SceneGraph>) -> Option<BookOpened> {
        self.clock_ms += dt_ms.max(0.0);

        if let (Some(active), Some(graph)) = (&self.active, graph) {
            let k = self.settings.lerp_factor;
            let offset = self.settings.forward_offset;
            let angle = self.settings.open_angle;
            for (node, original) in [
                (active.parts.inner, active.snapshot.inner),
                (active.parts.outer, active.snapshot.outer),
            ] {
                if let Some(mut t) = graph.transform(node) {
                    t.position.z = lerp(t.position.z, original.position.z + offset, k);
                    t.rotation.y = lerp(t.rotation.y, angle, k);
                    graph.set_transform(node, t);
                }
            }
        }

        let due = self
            .pending
            .as_ref()
            .is_some_and(|p| p.due_ms <= self.clock_ms);
        if !due {
            return None;
        }
        let pending = self.pending.take()?;
        if pending.generation != self.seen_reset {
            return None;
        }
        if let Some(active) = self.active.as_mut() {
            if active.book_id == pending.book_id {
                active.emitted = true;
            }
        }
        Some(BookOpened {
            book_id: pending.book_id,
            tint: pending.tint,
        })
    }
}

/// Exponential smoothing step; never overshoots for `k` in `[0, 1]`
pub fn lerp(current: f32, target: f32, k: f32) -> f32 {
    current + (target - current) * k.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::identity::IdentityResolver;
    use crate::state::settings::SceneSettings;

    const FRAME_MS: f64 = 1000.0 / 60.0;

    fn setup() -> (SceneGraph, IdentityResolver, PickFeedbackAnimator) {
        let g = fixtures::shelf_model(fixtures::BOOKS_PER_SHELF);
        let r = IdentityResolver::new(&g, g.root(), SceneSettings::default());
        let a = PickFeedbackAnimator::new(AnimationSettings::default(), Rgb(0x1e, 0x29, 0x3b));
        (g, r, a)
    }

    fn resolve(g: &SceneGraph, r: &IdentityResolver, pos: usize) -> ResolvedBook {
        let cover = g.get_object_by_name(g.root(), &fixtures::cover_name(pos)).unwrap();
        r.resolve(g, cover, fixtures::ROOM, 2).unwrap()
    }

    #[test]
    fn test_exact_restore_without_ticks() {
        let (mut g, r, mut a) = setup();
        let book = resolve(&g, &r, 7);
        let before = (
            g.transform(book.parts.inner).unwrap(),
            g.transform(book.parts.outer).unwrap(),
        );
        let mut reset = ResetSignal::default();

        a.select_book(&mut g, &book, 2);
        reset.bump();
        assert!(a.observe_reset(reset, Some(&mut g)));

        assert_eq!(g.transform(book.parts.inner).unwrap(), before.0);
        assert_eq!(g.transform(book.parts.outer).unwrap(), before.1);
        assert!(a.snapshot().is_none());
    }

    #[test]
    fn test_exact_restore_after_many_cycles() {
        let (mut g, r, mut a) = setup();
        let book = resolve(&g, &r, 7);
        let before = g.transform(book.parts.outer).unwrap();
        let mut reset = ResetSignal::default();

        for _ in 0..20 {
            a.select_book(&mut g, &book, 2);
            for _ in 0..17 {
                a.tick(FRAME_MS, Some(&mut g));
            }
            assert_ne!(g.transform(book.parts.outer).unwrap(), before);
            reset.bump();
            a.observe_reset(reset, Some(&mut g));
            assert_eq!(g.transform(book.parts.outer).unwrap(), before);
        }
    }

    #[test]
    fn test_snapshot_captured_once() {
        let (mut g, r, mut a) = setup();
        let book = resolve(&g, &r, 4);
        a.select_book(&mut g, &book, 2);
        let first = *a.snapshot().unwrap();
        for _ in 0..10 {
            a.tick(FRAME_MS, Some(&mut g));
        }
        a.select_book(&mut g, &book, 2);
        assert_eq!(*a.snapshot().unwrap(), first);
    }

    #[test]
    fn test_emission_after_delay() {
        let (mut g, r, mut a) = setup();
        let book = resolve(&g, &r, 7);
        a.select_book(&mut g, &book, 2);

        assert!(a.tick(599.0, Some(&mut g)).is_none());
        let opened = a.tick(1.0, Some(&mut g)).unwrap();
        assert_eq!(opened.book_id.to_string(), "group42-web-dev-2-7");
        assert_eq!(Some(opened.tint), fixtures::cover_color(7));
        assert!(a.tick(1000.0, Some(&mut g)).is_none());
    }

    #[test]
    fn test_reset_cancels_pending_emission() {
        let (mut g, r, mut a) = setup();
        let book = resolve(&g, &r, 7);
        let mut reset = ResetSignal::default();
        a.select_book(&mut g, &book, 2);
        a.tick(300.0, Some(&mut g));
        reset.bump();
        a.observe_reset(reset, Some(&mut g));
        assert!(!a.has_pending_open());
        assert!(a.tick(1000.0, Some(&mut g)).is_none());
    }

    #[test]
    fn test_default_tint_for_uncolored_cover() {
        let (mut g, r, mut a) = setup();
        let book = resolve(&g, &r, fixtures::UNTINTED_POSITION);
        a.select_book(&mut g, &book, 2);
        let opened = a.tick(600.0, Some(&mut g)).unwrap();
        assert_eq!(opened.tint, Rgb(0x1e, 0x29, 0x3b));
    }

    #[test]
    fn test_repick_does_not_reschedule_after_emission() {
        let (mut g, r, mut a) = setup();
        let book = resolve(&g, &r, 7);
        a.select_book(&mut g, &book, 2);
        assert!(a.tick(600.0, Some(&mut g)).is_some());
        a.select_book(&mut g, &book, 2);
        assert!(!a.has_pending_open());
    }

    #[test]
    fn test_switching_books_restores_previous() {
        let (mut g, r, mut a) = setup();
        let first = resolve(&g, &r, 1);
        let second = resolve(&g, &r, 2);
        let before = g.transform(first.parts.outer).unwrap();
        a.select_book(&mut g, &first, 2);
        a.tick(100.0, Some(&mut g));
        a.select_book(&mut g, &second, 2);
        assert_eq!(g.transform(first.parts.outer).unwrap(), before);
        assert_eq!(a.active_book(), Some(&second.identity));
    }

    #[test]
    fn test_tick_converges_without_overshoot() {
        let (mut g, r, mut a) = setup();
        let book = resolve(&g, &r, 0);
        let start = g.transform(book.parts.outer).unwrap();
        let target_z = start.position.z - 0.2;
        a.select_book(&mut g, &book, 2);
        let mut last = start.position.z;
        for _ in 0..200 {
            a.tick(FRAME_MS, Some(&mut g));
            let z = g.transform(book.parts.outer).unwrap().position.z;
            assert!(z <= last && z >= target_z);
            last = z;
        }
        assert!((last - target_z).abs() < 1e-3);
    }

    #[test]
    fn test_lerp() {
        assert_eq!(lerp(0.0, 10.0, 0.5), 5.0);
        assert_eq!(lerp(0.0, 10.0, 2.0), 10.0);
    }
}
