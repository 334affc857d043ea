//! Drag-to-select overlay state machine.
//!
//! The controller hands out one selection session at a time. A session mounts
//! a transparent full-viewport surface, tracks a pointer drag into a
//! normalized [`SelectionRect`], and tears the surface down on every exit
//! path (resolve, cancel, drop), and even a failing teardown still removes
//! the session slot before the error propagates.

use log::warn;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::{SelectionError, SelectionRect};

/// Pointer input fed into a selection session by the embedding view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    ButtonPress { x: i32, y: i32 },
    Motion { x: i32, y: i32 },
    ButtonRelease { x: i32, y: i32 },
    /// Explicit abort signal (e.g. Escape).
    Cancel,
}

/// Surface a selection session draws on. Implementations own the actual
/// view element; the session only dictates when it appears and disappears.
pub trait OverlaySurface {
    /// Mounts the full-viewport capture surface.
    fn mount(&mut self) -> Result<(), SelectionError>;

    /// Updates the live selection preview; `None` hides it.
    fn set_preview(&mut self, rect: Option<SelectionRect>);

    /// Removes the surface from the view.
    fn teardown(&mut self) -> Result<(), SelectionError>;
}

/// Result of feeding one pointer event into a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionStatus {
    /// Session still live; keep feeding events.
    Pending,
    /// Pointer released; the session is over and the overlay removed.
    ///
    /// A zero-distance drag resolves with a zero-area rectangle rather than
    /// cancelling; callers decide whether that is usable.
    Resolved(SelectionRect),
    /// Abort signal observed; the session is over and the overlay removed.
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SelectorState {
    Idle,
    Dragging { anchor_x: i32, anchor_y: i32 },
}

/// Hands out selection sessions and enforces the single-active-overlay rule
/// for one view.
#[derive(Clone, Default)]
pub struct SelectionController {
    active: Arc<AtomicBool>,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mounts the overlay and starts a selection session.
    ///
    /// # Errors
    /// [`SelectionError::AlreadyActive`] if another session from this
    /// controller is still pending; that is a caller bug, not a user action.
    pub fn begin<S: OverlaySurface>(&self, mut surface: S) -> Result<RegionSelector<S>, SelectionError> {
        if self.active.swap(true, Ordering::AcqRel) {
            return Err(SelectionError::AlreadyActive);
        }

        if let Err(e) = surface.mount() {
            self.active.store(false, Ordering::Release);
            return Err(e);
        }

        Ok(RegionSelector {
            surface,
            state: SelectorState::Idle,
            finished: false,
            active: Arc::clone(&self.active),
        })
    }

    /// Drives a whole session over a scripted or queued event stream.
    ///
    /// Resolves with the selected rectangle, or fails with
    /// [`SelectionError::Cancelled`] when the user aborts or the event stream
    /// ends without a release (the overlay is removed either way).
    pub fn select<S: OverlaySurface>(
        &self,
        surface: S,
        events: impl IntoIterator<Item = PointerEvent>,
    ) -> Result<SelectionRect, SelectionError> {
        let mut session = self.begin(surface)?;
        for event in events {
            match session.handle_event(event)? {
                SelectionStatus::Pending => continue,
                SelectionStatus::Resolved(rect) => return Ok(rect),
                SelectionStatus::Cancelled => return Err(SelectionError::Cancelled),
            }
        }
        // Event source dried up mid-session; drop tears the overlay down.
        Err(SelectionError::Cancelled)
    }
}

/// One live drag-to-select session.
pub struct RegionSelector<S: OverlaySurface> {
    surface: S,
    state: SelectorState,
    finished: bool,
    active: Arc<AtomicBool>,
}

impl<S: OverlaySurface> RegionSelector<S> {
    /// Feeds one pointer event through the state machine.
    ///
    /// Exactly one of `Resolved`/`Cancelled` is produced per session; the
    /// overlay is torn down before either is returned. Events after the
    /// terminal state fail with [`SelectionError::SessionFinished`].
    pub fn handle_event(&mut self, event: PointerEvent) -> Result<SelectionStatus, SelectionError> {
        if self.finished {
            return Err(SelectionError::SessionFinished);
        }

        match event {
            PointerEvent::ButtonPress { x, y } => {
                if matches!(self.state, SelectorState::Idle) {
                    self.state = SelectorState::Dragging {
                        anchor_x: x,
                        anchor_y: y,
                    };
                    self.surface
                        .set_preview(Some(SelectionRect::from_drag((x, y), (x, y))));
                }
                Ok(SelectionStatus::Pending)
            }
            PointerEvent::Motion { x, y } => {
                if let SelectorState::Dragging { anchor_x, anchor_y } = self.state {
                    self.surface
                        .set_preview(Some(SelectionRect::from_drag((anchor_x, anchor_y), (x, y))));
                }
                Ok(SelectionStatus::Pending)
            }
            PointerEvent::ButtonRelease { x, y } => match self.state {
                SelectorState::Dragging { anchor_x, anchor_y } => {
                    let rect = SelectionRect::from_drag((anchor_x, anchor_y), (x, y));
                    self.finish()?;
                    Ok(SelectionStatus::Resolved(rect))
                }
                // Release without a preceding press inside the overlay.
                SelectorState::Idle => Ok(SelectionStatus::Pending),
            },
            PointerEvent::Cancel => {
                self.finish()?;
                Ok(SelectionStatus::Cancelled)
            }
        }
    }

    /// Tears the overlay down and releases the session slot.
    ///
    /// Removal is always attempted and the slot always released, even when
    /// teardown itself errors; the error propagates afterwards.
    fn finish(&mut self) -> Result<(), SelectionError> {
        self.finished = true;
        self.surface.set_preview(None);
        let result = self.surface.teardown();
        self.active.store(false, Ordering::Release);
        result
    }
}

impl<S: OverlaySurface> Drop for RegionSelector<S> {
    fn drop(&mut self) {
        if !self.finished {
            if let Err(e) = self.finish() {
                warn!("overlay teardown during drop failed: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records surface lifecycle calls so tests can assert the cleanup
    /// guarantee.
    #[derive(Clone, Default)]
    struct MockSurface {
        mounted: Arc<AtomicBool>,
        torn_down: Arc<AtomicBool>,
        previews: Arc<Mutex<Vec<Option<SelectionRect>>>>,
        fail_teardown: bool,
    }

    impl OverlaySurface for MockSurface {
        fn mount(&mut self) -> Result<(), SelectionError> {
            self.mounted.store(true, Ordering::SeqCst);
            Ok(())
        }

        fn set_preview(&mut self, rect: Option<SelectionRect>) {
            self.previews.lock().unwrap().push(rect);
        }

        fn teardown(&mut self) -> Result<(), SelectionError> {
            self.torn_down.store(true, Ordering::SeqCst);
            if self.fail_teardown {
                Err(SelectionError::Surface("teardown exploded".into()))
            } else {
                Ok(())
            }
        }
    }

    fn drag(x0: i32, y0: i32, x1: i32, y1: i32) -> Vec<PointerEvent> {
        vec![
            PointerEvent::ButtonPress { x: x0, y: y0 },
            PointerEvent::Motion {
                x: (x0 + x1) / 2,
                y: (y0 + y1) / 2,
            },
            PointerEvent::ButtonRelease { x: x1, y: y1 },
        ]
    }

    #[test]
    fn drag_resolves_normalized_rect() {
        let surface = MockSurface::default();
        let torn_down = surface.torn_down.clone();

        let rect = SelectionController::new()
            .select(surface, drag(10, 10, 110, 60))
            .unwrap();

        assert_eq!(rect, SelectionRect::new(10, 10, 100, 50));
        assert!(torn_down.load(Ordering::SeqCst));
    }

    #[test]
    fn reverse_drag_resolves_same_rect() {
        let rect = SelectionController::new()
            .select(MockSurface::default(), drag(110, 60, 10, 10))
            .unwrap();
        assert_eq!(rect, SelectionRect::new(10, 10, 100, 50));
    }

    #[test]
    fn zero_distance_drag_resolves_not_cancels() {
        let rect = SelectionController::new()
            .select(MockSurface::default(), drag(30, 40, 30, 40))
            .unwrap();
        assert_eq!(rect, SelectionRect::new(30, 40, 0, 0));
        assert!(rect.is_empty());
    }

    #[test]
    fn cancel_before_press_removes_overlay() {
        let surface = MockSurface::default();
        let torn_down = surface.torn_down.clone();

        let result = SelectionController::new().select(surface, [PointerEvent::Cancel]);

        assert!(matches!(result, Err(SelectionError::Cancelled)));
        assert!(torn_down.load(Ordering::SeqCst));
    }

    #[test]
    fn cancel_mid_drag_removes_overlay() {
        let surface = MockSurface::default();
        let torn_down = surface.torn_down.clone();

        let result = SelectionController::new().select(
            surface,
            [
                PointerEvent::ButtonPress { x: 5, y: 5 },
                PointerEvent::Motion { x: 50, y: 50 },
                PointerEvent::Cancel,
            ],
        );

        assert!(matches!(result, Err(SelectionError::Cancelled)));
        assert!(torn_down.load(Ordering::SeqCst));
    }

    #[test]
    fn second_session_while_pending_is_misuse() {
        let controller = SelectionController::new();
        let _live = controller.begin(MockSurface::default()).unwrap();

        let result = controller.begin(MockSurface::default());
        assert!(matches!(result, Err(SelectionError::AlreadyActive)));
    }

    #[test]
    fn slot_is_released_after_resolution() {
        let controller = SelectionController::new();
        controller
            .select(MockSurface::default(), drag(0, 0, 10, 10))
            .unwrap();

        // The slot must be free again for the next session.
        assert!(controller.begin(MockSurface::default()).is_ok());
    }

    #[test]
    fn dropping_live_session_tears_down() {
        let surface = MockSurface::default();
        let torn_down = surface.torn_down.clone();
        let controller = SelectionController::new();

        {
            let mut session = controller.begin(surface).unwrap();
            session
                .handle_event(PointerEvent::ButtonPress { x: 1, y: 1 })
                .unwrap();
        }

        assert!(torn_down.load(Ordering::SeqCst));
        assert!(controller.begin(MockSurface::default()).is_ok());
    }

    #[test]
    fn failing_teardown_still_releases_slot() {
        let surface = MockSurface {
            fail_teardown: true,
            ..MockSurface::default()
        };
        let torn_down = surface.torn_down.clone();
        let controller = SelectionController::new();

        let result = controller.select(surface, drag(0, 0, 5, 5));
        assert!(matches!(result, Err(SelectionError::Surface(_))));
        assert!(torn_down.load(Ordering::SeqCst));
        assert!(controller.begin(MockSurface::default()).is_ok());
    }

    #[test]
    fn events_after_terminal_state_are_rejected() {
        let controller = SelectionController::new();
        let mut session = controller.begin(MockSurface::default()).unwrap();

        session
            .handle_event(PointerEvent::ButtonPress { x: 0, y: 0 })
            .unwrap();
        let status = session
            .handle_event(PointerEvent::ButtonRelease { x: 4, y: 4 })
            .unwrap();
        assert!(matches!(status, SelectionStatus::Resolved(_)));

        let after = session.handle_event(PointerEvent::Motion { x: 9, y: 9 });
        assert!(matches!(after, Err(SelectionError::SessionFinished)));
    }

    #[test]
    fn motion_updates_live_preview() {
        let surface = MockSurface::default();
        let previews = surface.previews.clone();
        let controller = SelectionController::new();

        let mut session = controller.begin(surface).unwrap();
        session
            .handle_event(PointerEvent::ButtonPress { x: 10, y: 10 })
            .unwrap();
        session
            .handle_event(PointerEvent::Motion { x: 60, y: 35 })
            .unwrap();

        let seen = previews.lock().unwrap().clone();
        assert_eq!(
            seen.last().copied().flatten(),
            Some(SelectionRect::new(10, 10, 50, 25))
        );
        drop(session);
    }

    #[test]
    fn release_without_press_keeps_session_pending() {
        let controller = SelectionController::new();
        let mut session = controller.begin(MockSurface::default()).unwrap();

        let status = session
            .handle_event(PointerEvent::ButtonRelease { x: 7, y: 7 })
            .unwrap();
        assert_eq!(status, SelectionStatus::Pending);
    }
}
