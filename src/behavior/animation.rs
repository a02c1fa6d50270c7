use std::cell::Cell;
use std::fmt;
use std::future::Future;
use std::rc::Rc;
use std::time::Duration;

use crate::controller::PanelController;
use crate::error::HookError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionPhase {
    Shown,
    Exiting,
    Exited,
}

/// Installs exit transitions as the controller's pre-dismiss hook and
/// exposes the current phase for the host to draw.
#[derive(Clone)]
pub struct AnimationCoordinator {
    controller: PanelController,
    phase: Rc<Cell<MotionPhase>>,
    default_exit: Duration,
}

impl AnimationCoordinator {
    pub fn new(controller: PanelController, default_exit: Duration) -> Self {
        Self {
            controller,
            phase: Rc::new(Cell::new(MotionPhase::Shown)),
            default_exit,
        }
    }

    pub fn phase(&self) -> MotionPhase {
        self.phase.get()
    }

    /// Use the configured exit duration.
    pub fn enable_exit_transition(&self) {
        self.exit_transition(self.default_exit);
    }

    /// Hold completion for `duration` after an animated dismissal starts.
    pub fn exit_transition(&self, duration: Duration) {
        self.on_exit(move || async move {
            tokio::time::sleep(duration).await;
            Ok(())
        });
    }

    /// Run arbitrary async work before an animated dismissal completes.
    pub fn on_exit<F, Fut>(&self, work: F)
    where
        F: FnOnce() -> Fut + 'static,
        Fut: Future<Output = Result<(), HookError>> + 'static,
    {
        let phase = Rc::clone(&self.phase);
        self.controller.set_pre_dismiss_hook(move || async move {
            phase.set(MotionPhase::Exiting);
            let outcome = work().await;
            phase.set(MotionPhase::Exited);
            outcome
        });
    }
}

impl fmt::Debug for AnimationCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationCoordinator")
            .field("panel", &self.controller.id())
            .field("phase", &self.phase())
            .field("default_exit", &self.default_exit)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::UiScheduler;

    #[tokio::test]
    async fn exit_transition_reports_phases() {
        let controller = PanelController::new(None, UiScheduler::new());
        let anim = AnimationCoordinator::new(controller.clone(), Duration::from_millis(1));
        assert_eq!(anim.phase(), MotionPhase::Shown);
        anim.enable_exit_transition();
        assert!(controller.has_pre_dismiss_hook());
        controller.dismiss_with_animation(None).await;
        assert_eq!(anim.phase(), MotionPhase::Exited);
        assert!(controller.is_completed());
    }

    #[tokio::test]
    async fn plain_dismiss_skips_transition() {
        let controller = PanelController::new(None, UiScheduler::new());
        let anim = AnimationCoordinator::new(controller.clone(), Duration::from_secs(60));
        anim.enable_exit_transition();
        controller.dismiss(None);
        assert_eq!(anim.phase(), MotionPhase::Shown);
        assert!(controller.is_completed());
    }
}
