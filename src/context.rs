//! Presentation context handed to content builders.
//!
//! `PresentationContext` carries what panel content may need while it is on
//! screen: its controller, where it was asked to appear, and the motion
//! services composed for it. Content never has to implement animation or
//! drag behavior itself; it asks the coordinators in the context instead.
//!
//! `MountGuard`/`MountToken` model the caller's surrounding UI. A session
//! checks the token at each suspension point and abandons the presentation
//! once the guard is gone.

use std::rc::{Rc, Weak};

use crate::behavior::{AnimationCoordinator, GestureCoordinator};
use crate::controller::PanelController;
use crate::panel::{PanelId, Placement};
use crate::value::PanelValue;

/// Owner side of a mount scope. Dropping it invalidates every token.
#[derive(Debug, Default)]
pub struct MountGuard {
    alive: Rc<()>,
}

impl MountGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(&self) -> MountToken {
        MountToken {
            alive: Some(Rc::downgrade(&self.alive)),
        }
    }
}

/// Observer side of a mount scope.
///
/// The default token is unscoped and always reports mounted.
#[derive(Debug, Clone, Default)]
pub struct MountToken {
    alive: Option<Weak<()>>,
}

impl MountToken {
    pub const fn unscoped() -> Self {
        Self { alive: None }
    }

    pub fn is_mounted(&self) -> bool {
        self.alive.as_ref().is_none_or(|w| w.strong_count() > 0)
    }
}

#[derive(Debug, Clone)]
pub struct PresentationContext {
    controller: PanelController,
    placement: Placement,
    mount: MountToken,
    animation: AnimationCoordinator,
    gestures: GestureCoordinator,
}

impl PresentationContext {
    pub fn new(
        controller: PanelController,
        placement: Placement,
        mount: MountToken,
        animation: AnimationCoordinator,
        gestures: GestureCoordinator,
    ) -> Self {
        Self {
            controller,
            placement,
            mount,
            animation,
            gestures,
        }
    }

    pub fn panel_id(&self) -> PanelId {
        self.controller.id()
    }

    pub fn controller(&self) -> &PanelController {
        &self.controller
    }

    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    pub fn mount(&self) -> &MountToken {
        &self.mount
    }

    pub fn animation(&self) -> &AnimationCoordinator {
        &self.animation
    }

    pub fn gestures(&self) -> &GestureCoordinator {
        &self.gestures
    }

    /// Complete the panel with `value` as its result.
    pub fn close_with<T: 'static>(&self, value: T) {
        self.controller.dismiss(Some(PanelValue::new(value)));
    }

    pub fn close(&self) {
        self.controller.dismiss(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_dies_with_guard() {
        let guard = MountGuard::new();
        let token = guard.token();
        assert!(token.is_mounted());
        drop(guard);
        assert!(!token.is_mounted());
        assert!(MountToken::unscoped().is_mounted());
    }
}
