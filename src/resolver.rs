//! Duplicate and replacement policy.
//!
//! Decides what a new presentation request does to the panels already on
//! screen. Same trigger toggles, a different trigger replaces, and an
//! untargeted panel stacks.
//!
//! Rules, first match wins:
//!
//! 1. `nested` requested: push without touching the stack.
//! 2. Empty stack: push.
//! 3. Anchored, same anchor as the topmost, toggling enabled: close the topmost.
//! 4. Anchored, same anchor as the topmost, toggling disabled: reject the request.
//! 5. Anchored, different anchor from the topmost: replace the topmost.
//! 6. Unanchored: push on top.

use crate::panel::AnchorKey;
use crate::stack::StackState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Dismiss the topmost panel (animated) and open nothing.
    ToggleClose,
    /// Dismiss the topmost panel immediately, then open the new one.
    Replace,
    /// Open the new panel on top of whatever is showing.
    Stack,
    /// Open the new panel with dedup bypassed entirely.
    Nested,
    /// Leave the existing panel alone and open nothing.
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveRequest<'a> {
    pub anchor: Option<&'a AnchorKey>,
    pub nested: bool,
    pub toggle_on_duplicate: bool,
}

pub fn resolve(request: &ResolveRequest<'_>, state: &StackState) -> Action {
    if request.nested {
        return Action::Nested;
    }
    if state.is_empty() {
        return Action::Stack;
    }
    let Some(anchor) = request.anchor else {
        return Action::Stack;
    };
    if state.top_anchor.as_ref() == Some(anchor) {
        if request.toggle_on_duplicate {
            Action::ToggleClose
        } else {
            Action::Reject
        }
    } else {
        Action::Replace
    }
}
