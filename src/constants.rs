//! Shared crate-wide constants.

use std::time::Duration;

/// Whether presenting against the anchor that already owns the topmost
/// panel closes it instead of opening a second one.
pub const DEFAULT_TOGGLE_ON_DUPLICATE: bool = true;

/// Length of the exit transition installed by `AnimationCoordinator` when a
/// panel asks for one without naming a duration.
///
/// The coordinator only waits this long before completing; it does not
/// interpolate anything itself. Hosts that draw the transition read
/// `AnimationCoordinator::phase()` while the wait is in flight.
pub const DEFAULT_EXIT_DURATION: Duration = Duration::from_millis(150);

/// Vertical drag distance (in terminal rows) past which releasing a drag
/// dismisses the panel.
///
/// Units: terminal rows. Smaller values make drag-to-dismiss more eager;
/// larger values require the user to pull the panel further before it
/// closes on release.
pub const DEFAULT_DRAG_DISMISS_THRESHOLD: u16 = 3;

/// Frame interval used by the reference terminal host.
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Capacity of the in-memory log buffer the terminal host renders.
pub const DEFAULT_LOG_LINES: usize = 500;
