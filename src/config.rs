//! Coordinator configuration.
//!
//! `PanelConfig` holds process-level defaults. Individual `present()` calls
//! may override the duplicate policy through `PresentOptions`.

use std::time::Duration;

use crate::constants::{
    DEFAULT_DRAG_DISMISS_THRESHOLD, DEFAULT_EXIT_DURATION, DEFAULT_TOGGLE_ON_DUPLICATE,
};

/// Which navigation transition properties count as "blocking".
///
/// Each flag enables one independent predicate. A transition is blocking if
/// any enabled predicate matches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockingRules {
    /// The incoming route draws a modal barrier.
    pub barrier: bool,
    /// The incoming route can itself be dismissed (dialogs, sheets).
    pub dismissible: bool,
    /// The incoming route discards the state of the route below it.
    pub state_loss: bool,
    /// The incoming route fully covers what is below it.
    pub opaque: bool,
}

impl BlockingRules {
    /// Barrier, dismissible and state-loss routes block; opaque pages do not.
    pub const fn standard() -> Self {
        Self {
            barrier: true,
            dismissible: true,
            state_loss: true,
            opaque: false,
        }
    }

    pub const fn none() -> Self {
        Self {
            barrier: false,
            dismissible: false,
            state_loss: false,
            opaque: false,
        }
    }
}

impl Default for BlockingRules {
    fn default() -> Self {
        Self::standard()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelConfig {
    toggle_on_duplicate: bool,
    exit_duration: Duration,
    drag_dismiss_threshold: u16,
    blocking_rules: BlockingRules,
}

impl PanelConfig {
    pub const fn new() -> Self {
        Self {
            toggle_on_duplicate: DEFAULT_TOGGLE_ON_DUPLICATE,
            exit_duration: DEFAULT_EXIT_DURATION,
            drag_dismiss_threshold: DEFAULT_DRAG_DISMISS_THRESHOLD,
            blocking_rules: BlockingRules::standard(),
        }
    }

    pub const fn toggle_on_duplicate(&self) -> bool {
        self.toggle_on_duplicate
    }

    pub const fn exit_duration(&self) -> Duration {
        self.exit_duration
    }

    pub const fn drag_dismiss_threshold(&self) -> u16 {
        self.drag_dismiss_threshold
    }

    pub const fn blocking_rules(&self) -> BlockingRules {
        self.blocking_rules
    }

    pub const fn with_toggle_on_duplicate(mut self, toggle: bool) -> Self {
        self.toggle_on_duplicate = toggle;
        self
    }

    pub const fn with_exit_duration(mut self, duration: Duration) -> Self {
        self.exit_duration = duration;
        self
    }

    /// Threshold is clamped to at least one row so a click never counts as a drag.
    pub const fn with_drag_dismiss_threshold(mut self, rows: u16) -> Self {
        self.drag_dismiss_threshold = if rows == 0 { 1 } else { rows };
        self
    }

    pub const fn with_blocking_rules(mut self, rules: BlockingRules) -> Self {
        self.blocking_rules = rules;
        self
    }
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_constants() {
        let cfg = PanelConfig::default();
        assert!(cfg.toggle_on_duplicate());
        assert_eq!(cfg.exit_duration(), DEFAULT_EXIT_DURATION);
        assert_eq!(cfg.blocking_rules(), BlockingRules::standard());
    }

    #[test]
    fn standard_rules_leave_opaque_pages_alone() {
        let rules = BlockingRules::standard();
        assert!(rules.barrier && rules.dismissible && rules.state_loss);
        assert!(!rules.opaque);
        assert_eq!(BlockingRules::default(), rules);
        let none = BlockingRules::none();
        assert!(!(none.barrier || none.dismissible || none.state_loss || none.opaque));
    }

    #[test]
    fn drag_threshold_never_zero() {
        let cfg = PanelConfig::new().with_drag_dismiss_threshold(0);
        assert_eq!(cfg.drag_dismiss_threshold(), 1);
    }
}
