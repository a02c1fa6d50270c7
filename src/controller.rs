//! Per-panel completion object.
//!
//! A `PanelController` is the single place a panel's result gets decided.
//! Taps, drags, API calls and forced cleanup all end in [`PanelController::dismiss`],
//! which fixes the result exactly once. Later calls are silent no-ops.
//!
//! # States
//!
//! `Active → Dismissing → Completed → Disposed`. `Dismissing` is only entered
//! while a pre-dismiss hook runs. `Completed` is reached exactly once. A
//! `Disposed` controller has released its callbacks and left its stack.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::{Rc, Weak};

use tokio::sync::watch;

use crate::error::HookError;
use crate::panel::{AnchorKey, PanelId};
use crate::scheduler::UiScheduler;
use crate::stack::{PanelStack, StackCell};
use crate::value::PanelValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PanelState {
    Active,
    Dismissing,
    Completed,
    Disposed,
}

pub type PanelFuture = Pin<Box<dyn Future<Output = Option<PanelValue>>>>;

type HookFuture = Pin<Box<dyn Future<Output = Result<(), HookError>>>>;
type PreDismissHook = Box<dyn FnOnce() -> HookFuture>;
type StateListener = Rc<dyn Fn(PanelId, PanelState) -> Result<(), HookError>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct ControllerInner {
    id: PanelId,
    anchor: Option<AnchorKey>,
    state: Cell<PanelState>,
    // `None` until completion, then `Some(result)`.
    outcome: watch::Sender<Option<Option<PanelValue>>>,
    listeners: RefCell<Vec<(ListenerId, StateListener)>>,
    next_listener: Cell<u64>,
    hook: RefCell<Option<PreDismissHook>>,
    scheduler: UiScheduler,
    stack: RefCell<Weak<StackCell>>,
}

#[derive(Clone)]
pub struct PanelController {
    inner: Rc<ControllerInner>,
}

impl PanelController {
    pub fn new(anchor: Option<AnchorKey>, scheduler: UiScheduler) -> Self {
        let (outcome, _) = watch::channel(None);
        Self {
            inner: Rc::new(ControllerInner {
                id: PanelId::next(),
                anchor,
                state: Cell::new(PanelState::Active),
                outcome,
                listeners: RefCell::new(Vec::new()),
                next_listener: Cell::new(0),
                hook: RefCell::new(None),
                scheduler,
                stack: RefCell::new(Weak::new()),
            }),
        }
    }

    pub fn id(&self) -> PanelId {
        self.inner.id
    }

    pub fn anchor_key(&self) -> Option<&AnchorKey> {
        self.inner.anchor.as_ref()
    }

    pub fn state(&self) -> PanelState {
        self.inner.state.get()
    }

    pub fn is_completed(&self) -> bool {
        self.state() >= PanelState::Completed
    }

    pub fn is_disposed(&self) -> bool {
        self.state() == PanelState::Disposed
    }

    /// Identity comparison; two handles are the same panel iff they share state.
    pub fn same(&self, other: &PanelController) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// A future resolving to this panel's result.
    ///
    /// Every future returned here observes the same result. If every handle to
    /// the controller is dropped before completion the future yields `None`.
    pub fn future(&self) -> PanelFuture {
        let mut rx = self.inner.outcome.subscribe();
        Box::pin(async move {
            match rx.wait_for(Option::is_some).await {
                Ok(outcome) => (*outcome).clone().flatten(),
                Err(_) => None,
            }
        })
    }

    /// Result, if the controller has completed.
    pub fn result(&self) -> Option<Option<PanelValue>> {
        self.inner.outcome.borrow().clone()
    }

    /// Register a listener run on the next UI cycle after each state change.
    pub fn on_state_changed<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(PanelId, PanelState) -> Result<(), HookError> + 'static,
    {
        let id = ListenerId(self.inner.next_listener.get());
        self.inner.next_listener.set(id.0 + 1);
        if !self.is_disposed() {
            self.inner
                .listeners
                .borrow_mut()
                .push((id, Rc::new(listener)));
        }
        id
    }

    pub fn remove_state_listener(&self, id: ListenerId) {
        self.inner
            .listeners
            .borrow_mut()
            .retain(|(existing, _)| *existing != id);
    }

    /// Install the async work `dismiss_with_animation` waits for. Replaces any
    /// previous hook; ignored once dismissal has started.
    pub fn set_pre_dismiss_hook<F, Fut>(&self, hook: F)
    where
        F: FnOnce() -> Fut + 'static,
        Fut: Future<Output = Result<(), HookError>> + 'static,
    {
        if self.state() != PanelState::Active {
            return;
        }
        let boxed: PreDismissHook = Box::new(move || Box::pin(hook()));
        *self.inner.hook.borrow_mut() = Some(boxed);
    }

    pub fn has_pre_dismiss_hook(&self) -> bool {
        self.inner.hook.borrow().is_some()
    }

    pub fn dismiss(&self, result: Option<PanelValue>) {
        if self.is_completed() {
            tracing::trace!(panel = %self.id(), "dismiss ignored; already completed");
            return;
        }
        self.inner.outcome.send_replace(Some(result));
        self.transition(PanelState::Completed);
        tracing::debug!(panel = %self.id(), "panel completed");
    }

    /// Run the pre-dismiss hook, if any, then complete with `result`.
    ///
    /// Hook failures are logged and otherwise treated as success. A call made
    /// while another caller's hook is running waits for that dismissal.
    pub async fn dismiss_with_animation(&self, result: Option<PanelValue>) {
        match self.state() {
            PanelState::Active => {}
            PanelState::Dismissing => {
                self.future().await;
                return;
            }
            PanelState::Completed | PanelState::Disposed => return,
        }
        let hook = self.inner.hook.borrow_mut().take();
        if let Some(hook) = hook {
            self.transition(PanelState::Dismissing);
            if let Err(err) = hook().await {
                tracing::warn!(panel = %self.id(), error = %err, "pre-dismiss hook failed");
            }
        }
        self.dismiss(result);
    }

    /// Release the controller. Completes with `None` first if still pending.
    pub fn dispose(&self) {
        if self.is_disposed() {
            return;
        }
        if !self.is_completed() {
            self.dismiss(None);
        }
        self.inner.state.set(PanelState::Disposed);
        self.inner.listeners.borrow_mut().clear();
        self.inner.hook.borrow_mut().take();
        let stack = self.inner.stack.replace(Weak::new());
        if let Some(stack) = stack.upgrade() {
            PanelStack::from_cell(stack).remove(self);
        }
        tracing::debug!(panel = %self.id(), "panel disposed");
    }

    pub(crate) fn attach(&self, stack: Weak<StackCell>) {
        *self.inner.stack.borrow_mut() = stack;
    }

    fn transition(&self, next: PanelState) {
        self.inner.state.set(next);
        let listeners: Vec<StateListener> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        if listeners.is_empty() {
            return;
        }
        let id = self.id();
        self.inner.scheduler.schedule("panel-state-changed", move || {
            for listener in listeners {
                if let Err(err) = listener(id, next) {
                    tracing::warn!(panel = %id, state = ?next, error = %err, "state listener failed");
                }
            }
            Ok(())
        });
    }
}

impl PartialEq for PanelController {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl Eq for PanelController {}

impl fmt::Debug for PanelController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanelController")
            .field("id", &self.id())
            .field("anchor", &self.anchor_key())
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::oneshot;

    fn value(s: &str) -> Option<PanelValue> {
        Some(PanelValue::new(s.to_string()))
    }

    fn text(v: Option<PanelValue>) -> Option<String> {
        v.and_then(|v| v.downcast::<String>())
    }

    #[tokio::test]
    async fn first_dismiss_wins() {
        let c = PanelController::new(None, UiScheduler::new());
        let fut = c.future();
        c.dismiss(value("x"));
        c.dismiss(value("y"));
        assert_eq!(text(fut.await).as_deref(), Some("x"));
        // late subscribers see the same result
        assert_eq!(text(c.future().await).as_deref(), Some("x"));
    }

    #[tokio::test]
    async fn dispose_forces_none_and_is_idempotent() {
        let c = PanelController::new(Some("k".into()), UiScheduler::new());
        let fut = c.future();
        c.dispose();
        c.dispose();
        assert!(c.is_disposed());
        assert!(fut.await.is_none());
        c.dismiss(value("late"));
        assert!(text(c.future().await).is_none());
    }

    #[tokio::test]
    async fn dropped_controller_never_hangs() {
        let c = PanelController::new(None, UiScheduler::new());
        let fut = c.future();
        drop(c);
        assert!(fut.await.is_none());
    }

    #[test]
    fn listeners_run_on_flush_not_inline() {
        let sched = UiScheduler::new();
        let c = PanelController::new(None, sched.clone());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        c.on_state_changed(move |_, state| {
            s.borrow_mut().push(state);
            Ok(())
        });
        c.dismiss(None);
        assert!(seen.borrow().is_empty());
        sched.flush();
        assert_eq!(*seen.borrow(), vec![PanelState::Completed]);
    }

    #[tokio::test]
    async fn failing_listener_does_not_block_completion() {
        let sched = UiScheduler::new();
        let c = PanelController::new(None, sched.clone());
        c.on_state_changed(|_, _| Err(HookError::failed("listener")));
        c.dismiss(value("ok"));
        sched.flush();
        assert!(c.is_completed());
        assert_eq!(text(c.future().await).as_deref(), Some("ok"));
    }

    #[tokio::test]
    async fn animation_hook_runs_before_completion() {
        let c = PanelController::new(None, UiScheduler::new());
        let (tx, rx) = oneshot::channel::<()>();
        c.set_pre_dismiss_hook(move || async move {
            rx.await.map_err(|_| HookError::Cancelled)
        });
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let c2 = c.clone();
                let task = tokio::task::spawn_local(async move {
                    c2.dismiss_with_animation(value("done")).await;
                });
                tokio::task::yield_now().await;
                assert_eq!(c.state(), PanelState::Dismissing);
                assert!(!c.is_completed());
                tx.send(()).unwrap();
                task.await.unwrap();
            })
            .await;
        assert_eq!(text(c.future().await).as_deref(), Some("done"));
    }

    #[tokio::test]
    async fn failing_hook_still_completes() {
        let c = PanelController::new(None, UiScheduler::new());
        c.set_pre_dismiss_hook(|| async { Err(HookError::failed("anim")) });
        c.dismiss_with_animation(value("r")).await;
        assert_eq!(c.state(), PanelState::Completed);
        assert_eq!(text(c.future().await).as_deref(), Some("r"));
    }

    #[tokio::test]
    async fn animated_dismiss_without_hook_is_immediate() {
        let c = PanelController::new(None, UiScheduler::new());
        c.dismiss_with_animation(None).await;
        assert!(c.is_completed());
    }
}
