//! Context-free access to the current panel stack.
//!
//! Some call sites (key handlers deep in a component tree, panic-recovery
//! paths) need to close "whatever panel is on top" without holding a session
//! handle. They go through this locator instead of a hidden global.
//!
//! Lifecycle: the application calls [`install`] once at start-up on its UI
//! thread and [`teardown`] at shutdown. Storage is thread-local because the
//! coordinator is single-threaded; other threads see nothing installed.

use std::cell::RefCell;
use std::rc::Rc;

use crate::controller::PanelController;
use crate::error::LocatorError;
use crate::navigation::NavigationFallback;
use crate::session::{DismissOutcome, dismiss_topmost};
use crate::stack::PanelStack;
use crate::value::PanelValue;

type SharedFallback = Rc<RefCell<dyn NavigationFallback>>;

#[derive(Clone)]
pub struct PanelService {
    stack: PanelStack,
    fallback: Option<SharedFallback>,
}

impl PanelService {
    pub fn new(stack: PanelStack, fallback: Option<SharedFallback>) -> Self {
        Self { stack, fallback }
    }

    pub fn stack(&self) -> &PanelStack {
        &self.stack
    }
}

thread_local! {
    static SERVICE: RefCell<Option<PanelService>> = const { RefCell::new(None) };
}

pub fn install(service: PanelService) -> Result<(), LocatorError> {
    SERVICE.with(|slot| {
        let mut slot = slot.borrow_mut();
        if slot.is_some() {
            return Err(LocatorError::AlreadyInstalled);
        }
        *slot = Some(service);
        tracing::debug!("panel service installed");
        Ok(())
    })
}

/// Uninstall the service and dispose any panels it still tracks.
pub fn teardown() -> Result<(), LocatorError> {
    let service = SERVICE
        .with(|slot| slot.borrow_mut().take())
        .ok_or(LocatorError::NotInstalled)?;
    service.stack.clear();
    tracing::debug!("panel service torn down");
    Ok(())
}

pub fn is_installed() -> bool {
    SERVICE.with(|slot| slot.borrow().is_some())
}

fn current() -> Result<PanelService, LocatorError> {
    SERVICE.with(|slot| slot.borrow().clone().ok_or(LocatorError::NotInstalled))
}

pub fn stack() -> Result<PanelStack, LocatorError> {
    current().map(|service| service.stack)
}

pub fn topmost() -> Option<PanelController> {
    current().ok().and_then(|service| service.stack.topmost())
}

/// Dismiss the topmost panel through the installed service.
pub async fn dismiss(result: Option<PanelValue>) -> Result<DismissOutcome, LocatorError> {
    let service = current()?;
    Ok(dismiss_topmost(&service.stack, service.fallback.as_ref(), result).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::UiScheduler;
    use std::cell::Cell;

    #[tokio::test]
    async fn lifecycle_and_fallback_chain() {
        assert_eq!(dismiss(None).await, Err(LocatorError::NotInstalled));

        let popped = Rc::new(Cell::new(0));
        let p = popped.clone();
        let fallback: SharedFallback = Rc::new(RefCell::new(move || {
            p.set(p.get() + 1);
            true
        }));
        let stack = PanelStack::new();
        install(PanelService::new(stack.clone(), Some(fallback))).unwrap();
        assert_eq!(
            install(PanelService::new(stack.clone(), None)),
            Err(LocatorError::AlreadyInstalled)
        );

        let c = PanelController::new(None, UiScheduler::new());
        stack.push(&c);
        assert_eq!(topmost(), Some(c.clone()));
        assert_eq!(dismiss(None).await, Ok(DismissOutcome::Panel(c.id())));
        assert!(c.is_completed());

        assert_eq!(dismiss(None).await, Ok(DismissOutcome::Navigation));
        assert_eq!(popped.get(), 1);

        let leftover = PanelController::new(None, UiScheduler::new());
        stack.push(&leftover);
        teardown().unwrap();
        assert!(leftover.is_disposed());
        assert!(stack.is_empty());
        assert!(!is_installed());
        assert_eq!(teardown(), Err(LocatorError::NotInstalled));
    }
}
