use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::controller::PanelController;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    Dismissed,
    Settled,
    NotDragging,
}

#[derive(Debug, Clone, Copy)]
struct Drag {
    origin_row: u16,
    offset: i32,
}

/// Tracks drag-to-dismiss and outside taps for one panel.
///
/// Both end in a plain `dismiss(None)`: the user already watched the panel
/// move, so no exit transition is played.
#[derive(Clone)]
pub struct GestureCoordinator {
    controller: PanelController,
    threshold: u16,
    dismiss_on_outside_tap: bool,
    drag: Rc<Cell<Option<Drag>>>,
}

impl GestureCoordinator {
    pub fn new(controller: PanelController, threshold: u16, dismiss_on_outside_tap: bool) -> Self {
        Self {
            controller,
            threshold: threshold.max(1),
            dismiss_on_outside_tap,
            drag: Rc::new(Cell::new(None)),
        }
    }

    pub fn begin_drag(&self, row: u16) {
        if self.controller.is_completed() {
            return;
        }
        self.drag.set(Some(Drag {
            origin_row: row,
            offset: 0,
        }));
    }

    /// Update the drag with the pointer's current row; returns the offset.
    pub fn update_drag(&self, row: u16) -> i32 {
        let Some(mut drag) = self.drag.get() else {
            return 0;
        };
        // only downward pulls count toward dismissal
        drag.offset = (i32::from(row) - i32::from(drag.origin_row)).max(0);
        self.drag.set(Some(drag));
        drag.offset
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.get().is_some()
    }

    pub fn drag_offset(&self) -> i32 {
        self.drag.get().map_or(0, |d| d.offset)
    }

    pub fn end_drag(&self) -> DragOutcome {
        let Some(drag) = self.drag.take() else {
            return DragOutcome::NotDragging;
        };
        if drag.offset >= i32::from(self.threshold) {
            self.controller.dismiss(None);
            DragOutcome::Dismissed
        } else {
            DragOutcome::Settled
        }
    }

    /// A tap landed outside the panel. Returns whether it closed the panel.
    pub fn tap_outside(&self) -> bool {
        if !self.dismiss_on_outside_tap || self.controller.is_completed() {
            return false;
        }
        self.controller.dismiss(None);
        true
    }
}

impl fmt::Debug for GestureCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GestureCoordinator")
            .field("panel", &self.controller.id())
            .field("threshold", &self.threshold)
            .field("drag_offset", &self.drag_offset())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::UiScheduler;

    fn gestures(outside: bool) -> (PanelController, GestureCoordinator) {
        let c = PanelController::new(None, UiScheduler::new());
        let g = GestureCoordinator::new(c.clone(), 3, outside);
        (c, g)
    }

    #[test]
    fn short_drag_settles() {
        let (c, g) = gestures(false);
        g.begin_drag(10);
        assert_eq!(g.update_drag(12), 2);
        assert_eq!(g.end_drag(), DragOutcome::Settled);
        assert!(!c.is_completed());
        assert_eq!(g.drag_offset(), 0);
    }

    #[test]
    fn long_drag_dismisses() {
        let (c, g) = gestures(false);
        g.begin_drag(4);
        g.update_drag(2);
        assert_eq!(g.drag_offset(), 0);
        g.update_drag(9);
        assert_eq!(g.end_drag(), DragOutcome::Dismissed);
        assert!(c.is_completed());
    }

    #[test]
    fn outside_tap_respects_flag() {
        let (c, g) = gestures(false);
        assert!(!g.tap_outside());
        assert!(!c.is_completed());
        let (c, g) = gestures(true);
        assert!(g.tap_outside());
        assert!(c.is_completed());
        assert!(!g.tap_outside());
        assert_eq!(g.end_drag(), DragOutcome::NotDragging);
    }
}
