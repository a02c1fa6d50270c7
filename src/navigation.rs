//! Host navigation integration.
//!
//! When the host navigates to something that competes with transient panels
//! (a modal dialog, a route that throws away the current screen), every
//! panel is force-completed. [`NavigationWatcher`] classifies transitions
//! with independent predicates; any match makes a transition blocking.
//!
//! [`NavigationFallback`] is the other direction: it lets a targetless
//! dismiss request fall through to host navigation when no panel is open.

use std::fmt;

use tokio::sync::mpsc::UnboundedReceiver;

use crate::config::BlockingRules;
use crate::stack::PanelStack;

/// Properties of a host navigation transition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationTransition {
    pub name: Option<String>,
    pub dismissible: bool,
    pub has_barrier: bool,
    pub preserves_state: bool,
    pub opaque: bool,
}

impl NavigationTransition {
    /// A regular full-screen page that keeps the state below it.
    pub fn page(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            dismissible: false,
            has_barrier: false,
            preserves_state: true,
            opaque: true,
        }
    }

    /// A dismissible modal drawn over a barrier.
    pub fn dialog(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            dismissible: true,
            has_barrier: true,
            preserves_state: true,
            opaque: false,
        }
    }

    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("<unnamed>")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationEvent {
    Pushed(NavigationTransition),
    Replaced(NavigationTransition),
    Popped(NavigationTransition),
    Removed(NavigationTransition),
}

impl NavigationEvent {
    /// The transition that becomes visible, if this event introduces one.
    pub fn incoming(&self) -> Option<&NavigationTransition> {
        match self {
            Self::Pushed(t) | Self::Replaced(t) => Some(t),
            Self::Popped(_) | Self::Removed(_) => None,
        }
    }
}

/// Host hook used when a dismiss request finds no panel to close.
pub trait NavigationFallback {
    /// Pop the host's current route if it can be popped.
    fn maybe_pop(&mut self) -> bool;
}

impl<F: FnMut() -> bool> NavigationFallback for F {
    fn maybe_pop(&mut self) -> bool {
        self()
    }
}

type Predicate = Box<dyn Fn(&NavigationTransition) -> bool>;

pub struct NavigationWatcher {
    stack: PanelStack,
    predicates: Vec<(&'static str, Predicate)>,
}

impl NavigationWatcher {
    pub fn new(stack: PanelStack, rules: BlockingRules) -> Self {
        let mut watcher = Self {
            stack,
            predicates: Vec::new(),
        };
        if rules.barrier {
            watcher = watcher.with_predicate("barrier", |t| t.has_barrier);
        }
        if rules.dismissible {
            watcher = watcher.with_predicate("dismissible", |t| t.dismissible);
        }
        if rules.state_loss {
            watcher = watcher.with_predicate("state-loss", |t| !t.preserves_state);
        }
        if rules.opaque {
            watcher = watcher.with_predicate("opaque", |t| t.opaque);
        }
        watcher
    }

    pub fn with_predicate<P>(mut self, name: &'static str, predicate: P) -> Self
    where
        P: Fn(&NavigationTransition) -> bool + 'static,
    {
        self.predicates.push((name, Box::new(predicate)));
        self
    }

    /// Name of the first predicate matching `transition`, if any.
    pub fn blocking_reason(&self, transition: &NavigationTransition) -> Option<&'static str> {
        self.predicates
            .iter()
            .find(|(_, predicate)| predicate(transition))
            .map(|(name, _)| *name)
    }

    pub fn is_blocking(&self, transition: &NavigationTransition) -> bool {
        self.blocking_reason(transition).is_some()
    }

    /// Handle one navigation event; returns how many panels it dismissed.
    pub fn observe(&self, event: &NavigationEvent) -> usize {
        let Some(transition) = event.incoming() else {
            return 0;
        };
        let Some(reason) = self.blocking_reason(transition) else {
            return 0;
        };
        let dismissed = self.stack.dismiss_all();
        if dismissed > 0 {
            tracing::info!(
                route = transition.label(),
                reason,
                dismissed,
                "blocking navigation dismissed panels"
            );
        }
        dismissed
    }

    /// Consume navigation events until the sender side closes.
    ///
    /// Returns the total number of panels dismissed.
    pub async fn run(self, mut events: UnboundedReceiver<NavigationEvent>) -> usize {
        let mut total = 0;
        while let Some(event) = events.recv().await {
            total += self.observe(&event);
        }
        tracing::debug!(total, "navigation source closed");
        total
    }
}

impl fmt::Debug for NavigationWatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.predicates.iter().map(|(name, _)| *name).collect();
        f.debug_struct("NavigationWatcher")
            .field("predicates", &names)
            .field("panels", &self.stack.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::PanelController;
    use crate::scheduler::UiScheduler;

    fn stacked(n: usize) -> (PanelStack, Vec<PanelController>) {
        let stack = PanelStack::new();
        let ctls: Vec<_> = (0..n)
            .map(|_| PanelController::new(None, UiScheduler::new()))
            .collect();
        for c in &ctls {
            stack.push(c);
        }
        (stack, ctls)
    }

    #[test]
    fn default_rules_classify_dialogs_not_pages() {
        let (stack, _) = stacked(0);
        let w = NavigationWatcher::new(stack, BlockingRules::default());
        assert_eq!(
            w.blocking_reason(&NavigationTransition::dialog("confirm")),
            Some("barrier")
        );
        assert!(!w.is_blocking(&NavigationTransition::page("settings")));
        let lossy = NavigationTransition {
            preserves_state: false,
            ..NavigationTransition::page("login")
        };
        assert_eq!(w.blocking_reason(&lossy), Some("state-loss"));
    }

    #[test]
    fn blocking_push_dismisses_everything() {
        let (stack, ctls) = stacked(3);
        let w = NavigationWatcher::new(stack.clone(), BlockingRules::default());
        let n = w.observe(&NavigationEvent::Pushed(NavigationTransition::dialog("d")));
        assert_eq!(n, 3);
        assert!(ctls.iter().all(|c| c.is_completed()));
        assert!(ctls.iter().all(|c| matches!(c.result(), Some(None))));
        assert!(!stack.has_active());
    }

    #[test]
    fn pops_and_non_blocking_pushes_are_ignored() {
        let (stack, ctls) = stacked(2);
        let w = NavigationWatcher::new(stack, BlockingRules::none())
            .with_predicate("named-modal", |t| t.label() == "modal");
        assert_eq!(w.observe(&NavigationEvent::Popped(NavigationTransition::dialog("modal"))), 0);
        assert_eq!(w.observe(&NavigationEvent::Pushed(NavigationTransition::dialog("x"))), 0);
        assert!(ctls.iter().all(|c| !c.is_completed()));
        assert_eq!(w.observe(&NavigationEvent::Replaced(NavigationTransition::page("modal"))), 2);
    }

    #[tokio::test]
    async fn run_drains_channel() {
        let (stack, ctls) = stacked(2);
        let w = NavigationWatcher::new(stack, BlockingRules::default());
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        tx.send(NavigationEvent::Pushed(NavigationTransition::page("p"))).unwrap();
        tx.send(NavigationEvent::Pushed(NavigationTransition::dialog("d"))).unwrap();
        drop(tx);
        assert_eq!(w.run(rx).await, 2);
        assert!(ctls.iter().all(|c| c.is_completed()));
    }
}
