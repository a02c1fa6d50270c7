//! Host surface abstraction.
//!
//! Whatever layers transient UI above the application (an overlay layer, a
//! portal, a compositor) implements [`HostSurface`]. The coordinator inserts
//! one entry per presented panel and removes it once the panel completes; it
//! never inspects the content.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::context::PresentationContext;
use crate::error::HostError;
use crate::panel::{PanelId, Placement};

static NEXT_SURFACE_HANDLE: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SurfaceHandle(u64);

impl SurfaceHandle {
    /// Allocate a fresh handle. Hosts may also mint their own.
    pub fn next() -> Self {
        Self(NEXT_SURFACE_HANDLE.fetch_add(1, Ordering::Relaxed))
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

/// One presented panel, as handed to the host.
pub struct SurfaceEntry<C> {
    pub panel: PanelId,
    pub placement: Placement,
    pub content: C,
    pub context: PresentationContext,
}

pub trait HostSurface {
    type Content;

    fn insert(&mut self, entry: SurfaceEntry<Self::Content>) -> Result<SurfaceHandle, HostError>;

    /// Remove a previously inserted entry. Unknown handles are ignored.
    fn remove(&mut self, handle: SurfaceHandle);
}
