//! Ordered registry of live panel controllers.
//!
//! Insertion order is stacking order: the last entry that has not completed
//! is the topmost panel.
//! The stack is owned by the UI task and shared through cheap clones of a
//! `Rc<RefCell<..>>`, so no locking is involved. The cell is never borrowed
//! while control passes to a controller; every traversal that may call back
//! into controller code works on a snapshot taken first.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::controller::PanelController;
use crate::panel::AnchorKey;

pub(crate) type StackCell = RefCell<Vec<PanelController>>;

/// The parts of the stack the duplicate resolver looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StackState {
    pub len: usize,
    pub top_anchor: Option<AnchorKey>,
}

impl StackState {
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[derive(Clone, Default)]
pub struct PanelStack {
    entries: Rc<StackCell>,
}

impl PanelStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_cell(entries: Rc<StackCell>) -> Self {
        Self { entries }
    }

    /// Append `controller` as the new topmost panel.
    ///
    /// Disposed controllers and controllers already present are ignored.
    pub fn push(&self, controller: &PanelController) {
        if controller.is_disposed() || self.contains(controller) {
            return;
        }
        controller.attach(Rc::downgrade(&self.entries));
        self.entries.borrow_mut().push(controller.clone());
        tracing::debug!(
            panel = %controller.id(),
            anchor = ?controller.anchor_key().map(AnchorKey::as_str),
            depth = self.len(),
            "panel pushed"
        );
    }

    /// Remove `controller` wherever it sits. Returns whether it was present.
    pub fn remove(&self, controller: &PanelController) -> bool {
        let removed = {
            let mut entries = self.entries.borrow_mut();
            let before = entries.len();
            entries.retain(|c| !c.same(controller));
            before != entries.len()
        };
        if removed {
            tracing::debug!(panel = %controller.id(), depth = self.len(), "panel removed");
        }
        removed
    }

    /// Most recently pushed panel that has not completed yet.
    ///
    /// A completed panel stays registered until its session disposes it, but
    /// it no longer counts as topmost.
    pub fn topmost(&self) -> Option<PanelController> {
        self.entries
            .borrow()
            .iter()
            .rev()
            .find(|c| !c.is_completed())
            .cloned()
    }

    pub fn current_anchor_key(&self) -> Option<AnchorKey> {
        self.topmost().and_then(|c| c.anchor_key().cloned())
    }

    pub fn has_active(&self) -> bool {
        self.topmost().is_some()
    }

    /// Number of registered panels that have not completed.
    pub fn active_len(&self) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|c| !c.is_completed())
            .count()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn contains(&self, controller: &PanelController) -> bool {
        self.entries.borrow().iter().any(|c| c.same(controller))
    }

    /// Most recently pushed, not yet completed panel holding `key`.
    pub fn find_by_anchor(&self, key: &AnchorKey) -> Option<PanelController> {
        self.entries
            .borrow()
            .iter()
            .rev()
            .find(|c| !c.is_completed() && c.anchor_key() == Some(key))
            .cloned()
    }

    /// Bottom-to-top copy of the current entries.
    pub fn snapshot(&self) -> Vec<PanelController> {
        self.entries.borrow().clone()
    }

    /// Resolver view of the stack; completed panels are left out.
    pub fn state(&self) -> StackState {
        let entries = self.entries.borrow();
        let active: Vec<&PanelController> = entries.iter().filter(|c| !c.is_completed()).collect();
        let Some(top) = active.last() else {
            return StackState::default();
        };
        StackState {
            len: active.len(),
            top_anchor: top.anchor_key().cloned(),
        }
    }

    /// Complete every registered panel with no result, topmost first.
    ///
    /// Returns how many controllers were dismissed by this call.
    pub fn dismiss_all(&self) -> usize {
        let snapshot = self.snapshot();
        let mut dismissed = 0;
        for controller in snapshot.iter().rev() {
            if !controller.is_completed() {
                controller.dismiss(None);
                dismissed += 1;
            }
        }
        dismissed
    }

    /// Dispose every registered panel, leaving the stack empty.
    pub fn clear(&self) {
        for controller in self.snapshot().iter().rev() {
            controller.dispose();
        }
        self.entries.borrow_mut().clear();
    }
}

impl fmt::Debug for PanelStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries.borrow().iter()).finish()
    }
}
