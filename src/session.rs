//! Orchestration of individual `present()` calls.
//!
//! A [`PresentationSession`] owns the shared pieces (stack, host surface,
//! scheduler, configuration) and runs each presentation through the same
//! sequence: resolve against the stack, clear the way if needed, create and
//! register a controller, mount the content, wait for completion, clean up.
//!
//! Presentation never fails loudly. Stale contexts, host errors and type
//! mismatches are logged and surface to the caller as `None`.

use std::any::type_name;
use std::cell::RefCell;
use std::rc::Rc;

use crate::behavior::{AnimationCoordinator, GestureCoordinator};
use crate::config::PanelConfig;
use crate::context::{MountToken, PresentationContext};
use crate::controller::PanelController;
use crate::error::{HostError, PresentError};
use crate::host::{HostSurface, SurfaceEntry, SurfaceHandle};
use crate::locator::PanelService;
use crate::navigation::NavigationFallback;
use crate::panel::{AnchorKey, PanelId, Placement};
use crate::resolver::{Action, ResolveRequest, resolve};
use crate::scheduler::UiScheduler;
use crate::stack::PanelStack;
use crate::value::PanelValue;

#[derive(Debug, Clone, Default)]
pub struct PresentOptions {
    pub anchor: Option<AnchorKey>,
    pub offset: Option<(i32, i32)>,
    pub nested: bool,
    /// Overrides `PanelConfig::toggle_on_duplicate` for this call.
    pub toggle_on_duplicate: Option<bool>,
    pub dismiss_on_outside_tap: bool,
    pub mount: MountToken,
}

impl PresentOptions {
    pub fn anchored(anchor: impl Into<AnchorKey>) -> Self {
        Self {
            anchor: Some(anchor.into()),
            ..Self::default()
        }
    }

    pub fn centered() -> Self {
        Self::default()
    }

    pub fn at(x: i32, y: i32) -> Self {
        Self {
            offset: Some((x, y)),
            ..Self::default()
        }
    }

    pub fn nested(mut self) -> Self {
        self.nested = true;
        self
    }

    pub fn with_toggle_on_duplicate(mut self, toggle: bool) -> Self {
        self.toggle_on_duplicate = Some(toggle);
        self
    }

    pub fn with_dismiss_on_outside_tap(mut self, dismiss: bool) -> Self {
        self.dismiss_on_outside_tap = dismiss;
        self
    }

    pub fn with_mount(mut self, mount: MountToken) -> Self {
        self.mount = mount;
        self
    }
}

/// What a targetless dismiss request ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissOutcome {
    Panel(PanelId),
    Navigation,
    Nothing,
}

type SharedFallback = Rc<RefCell<dyn NavigationFallback>>;

/// Dismiss the topmost panel, falling back to host navigation, then to nothing.
pub(crate) async fn dismiss_topmost(
    stack: &PanelStack,
    fallback: Option<&SharedFallback>,
    result: Option<PanelValue>,
) -> DismissOutcome {
    if let Some(top) = stack.topmost() {
        top.dismiss_with_animation(result).await;
        return DismissOutcome::Panel(top.id());
    }
    if let Some(fallback) = fallback
        && fallback.borrow_mut().maybe_pop()
    {
        tracing::debug!("no panel to dismiss; host navigation handled it");
        return DismissOutcome::Navigation;
    }
    tracing::debug!("dismiss requested with no active panel");
    DismissOutcome::Nothing
}

/// Close a panel a duplicate request toggled. Waits for its exit transition
/// so the anchor is free once the toggling call returns.
async fn close_duplicate(panel: &PanelController) {
    panel.dismiss_with_animation(None).await;
    panel.dispose();
}

pub struct PresentationSession<H: HostSurface> {
    stack: PanelStack,
    host: Rc<RefCell<H>>,
    scheduler: UiScheduler,
    config: PanelConfig,
    fallback: Option<SharedFallback>,
}

impl<H: HostSurface> Clone for PresentationSession<H> {
    fn clone(&self) -> Self {
        Self {
            stack: self.stack.clone(),
            host: Rc::clone(&self.host),
            scheduler: self.scheduler.clone(),
            config: self.config,
            fallback: self.fallback.clone(),
        }
    }
}

impl<H: HostSurface + 'static> PresentationSession<H> {
    /// Session with a fresh stack and its own `UiScheduler`.
    ///
    /// State listeners only run when that scheduler is flushed: hand
    /// `scheduler()` to the frame loop, or use [`Self::with_parts`] to share
    /// one the loop already flushes.
    pub fn new(host: H, config: PanelConfig) -> Self {
        Self::with_parts(PanelStack::new(), Rc::new(RefCell::new(host)), UiScheduler::new(), config)
    }

    pub fn with_parts(
        stack: PanelStack,
        host: Rc<RefCell<H>>,
        scheduler: UiScheduler,
        config: PanelConfig,
    ) -> Self {
        Self {
            stack,
            host,
            scheduler,
            config,
            fallback: None,
        }
    }

    pub fn with_navigation_fallback<N: NavigationFallback + 'static>(mut self, fallback: N) -> Self {
        let shared: SharedFallback = Rc::new(RefCell::new(fallback));
        self.fallback = Some(shared);
        self
    }

    pub fn stack(&self) -> &PanelStack {
        &self.stack
    }

    pub fn host(&self) -> &Rc<RefCell<H>> {
        &self.host
    }

    pub fn scheduler(&self) -> &UiScheduler {
        &self.scheduler
    }

    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    /// The pieces the thread-local locator needs for context-free dismissal.
    pub fn service(&self) -> PanelService {
        PanelService::new(self.stack.clone(), self.fallback.clone())
    }

    /// Present a panel and wait for its typed result.
    ///
    /// Returns `None` when the request toggled an existing panel closed, was
    /// rejected, was abandoned because its mount went away, failed to mount,
    /// completed without a value, or completed with a value of another type.
    pub async fn present<T, F>(&self, options: PresentOptions, build: F) -> Option<T>
    where
        T: Clone + 'static,
        F: FnOnce(&PresentationContext) -> H::Content,
    {
        let value = self.present_value(options, build).await?;
        let typed = value.downcast::<T>();
        if typed.is_none() {
            tracing::warn!(
                expected = type_name::<T>(),
                actual = value.type_name(),
                "panel result has unexpected type"
            );
        }
        typed
    }

    /// Present a panel and wait for its type-erased result.
    pub async fn present_value<F>(&self, options: PresentOptions, build: F) -> Option<PanelValue>
    where
        F: FnOnce(&PresentationContext) -> H::Content,
    {
        let request = ResolveRequest {
            anchor: options.anchor.as_ref(),
            nested: options.nested,
            toggle_on_duplicate: options
                .toggle_on_duplicate
                .unwrap_or(self.config.toggle_on_duplicate()),
        };
        let state = self.stack.state();
        let action = resolve(&request, &state);
        tracing::debug!(
            ?action,
            anchor = ?request.anchor.map(AnchorKey::as_str),
            depth = state.len,
            "resolved presentation request"
        );

        match action {
            Action::ToggleClose => {
                if let Some(top) = self.stack.topmost() {
                    close_duplicate(&top).await;
                }
                return None;
            }
            Action::Reject => return None,
            Action::Replace => {
                let mut replaced: Vec<PanelController> = self.stack.topmost().into_iter().collect();
                if let Some(anchor) = request.anchor
                    && let Some(holder) = self.stack.find_by_anchor(anchor)
                    && !replaced.contains(&holder)
                {
                    replaced.push(holder);
                }
                for controller in &replaced {
                    controller.dismiss(None);
                }
                // let the replaced panels' sessions start their teardown
                tokio::task::yield_now().await;
                for controller in &replaced {
                    controller.dispose();
                }
                if !options.mount.is_mounted() {
                    tracing::debug!("presentation abandoned; mount went away during replace");
                    return None;
                }
                // another request may have claimed the anchor while we yielded
                if let Some(anchor) = request.anchor
                    && let Some(holder) = self.stack.find_by_anchor(anchor)
                {
                    tracing::debug!(
                        anchor = anchor.as_str(),
                        holder = %holder.id(),
                        "anchor claimed during replace"
                    );
                    if request.toggle_on_duplicate {
                        close_duplicate(&holder).await;
                    }
                    return None;
                }
            }
            Action::Stack | Action::Nested => {}
        }

        let controller = PanelController::new(options.anchor.clone(), self.scheduler.clone());
        self.stack.push(&controller);
        let mounted = match self.mount(&controller, &options, build) {
            Ok(handle) => MountedPanel {
                controller: controller.clone(),
                host: Rc::clone(&self.host),
                handle,
            },
            Err(err) => {
                tracing::warn!(panel = %controller.id(), error = %err, "panel presentation aborted");
                controller.dispose();
                return None;
            }
        };

        let result = controller.future().await;
        drop(mounted);
        result
    }

    /// Dismiss the topmost panel with `result`, animated.
    pub async fn dismiss(&self, result: Option<PanelValue>) -> DismissOutcome {
        dismiss_topmost(&self.stack, self.fallback.as_ref(), result).await
    }

    /// Complete every panel without a result.
    pub fn dismiss_all(&self) -> usize {
        self.stack.dismiss_all()
    }

    fn mount<F>(
        &self,
        controller: &PanelController,
        options: &PresentOptions,
        build: F,
    ) -> Result<SurfaceHandle, PresentError>
    where
        F: FnOnce(&PresentationContext) -> H::Content,
    {
        if !options.mount.is_mounted() {
            return Err(PresentError::StaleContext);
        }
        let placement = Placement::resolve(options.anchor.as_ref(), options.offset);
        let context = PresentationContext::new(
            controller.clone(),
            placement.clone(),
            options.mount.clone(),
            AnimationCoordinator::new(controller.clone(), self.config.exit_duration()),
            GestureCoordinator::new(
                controller.clone(),
                self.config.drag_dismiss_threshold(),
                options.dismiss_on_outside_tap,
            ),
        );
        let content = build(&context);
        let entry = SurfaceEntry {
            panel: controller.id(),
            placement,
            content,
            context,
        };
        let mut host = self
            .host
            .try_borrow_mut()
            .map_err(|_| HostError::Rejected("host surface is busy".to_string()))?;
        Ok(host.insert(entry)?)
    }
}

/// Removes the host entry and disposes the controller when dropped, so an
/// abandoned `present()` future cannot leave a panel behind.
struct MountedPanel<H: HostSurface> {
    controller: PanelController,
    host: Rc<RefCell<H>>,
    handle: SurfaceHandle,
}

impl<H: HostSurface> Drop for MountedPanel<H> {
    fn drop(&mut self) {
        match self.host.try_borrow_mut() {
            Ok(mut host) => host.remove(self.handle),
            Err(_) => tracing::warn!(
                panel = %self.controller.id(),
                handle = self.handle.get(),
                "host surface busy; entry left for the host to prune"
            ),
        }
        self.controller.dispose();
    }
}
