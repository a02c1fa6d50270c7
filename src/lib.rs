//! Coordination of transient, anchored UI panels (popovers, menus, sheets)
//! over a host surface.
//!
//! A [`PresentationSession`] resolves each `present()` request against the
//! [`PanelStack`] (toggle, replace, stack or nest), mounts the content on a
//! [`HostSurface`], and resolves the caller's future exactly once with the
//! panel's result. Host navigation can force every panel closed through a
//! [`NavigationWatcher`].
//!
//! The core is single-threaded: run it on a current-thread tokio runtime
//! inside a `LocalSet`. The [`terminal`] module is a ratatui/crossterm host.

pub mod behavior;
pub mod config;
pub mod constants;
pub mod context;
pub mod controller;
pub mod drivers;
pub mod error;
pub mod event_loop;
pub mod host;
pub mod keybindings;
pub mod locator;
pub mod log_buffer;
pub mod navigation;
pub mod panel;
pub mod resolver;
pub mod scheduler;
pub mod session;
pub mod stack;
pub mod terminal;
pub mod theme;
pub mod tracing_sub;
pub mod ui;
pub mod value;

pub use behavior::{AnimationCoordinator, DragOutcome, GestureCoordinator, MotionPhase};
pub use config::{BlockingRules, PanelConfig};
pub use context::{MountGuard, MountToken, PresentationContext};
pub use controller::{PanelController, PanelState};
pub use error::{HookError, HostError, LocatorError};
pub use host::{HostSurface, SurfaceEntry, SurfaceHandle};
pub use navigation::{NavigationEvent, NavigationFallback, NavigationTransition, NavigationWatcher};
pub use panel::{AnchorKey, PanelId, Placement};
pub use resolver::Action;
pub use scheduler::UiScheduler;
pub use session::{DismissOutcome, PresentOptions, PresentationSession};
pub use stack::{PanelStack, StackState};
pub use value::PanelValue;
