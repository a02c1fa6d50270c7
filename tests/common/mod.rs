#![allow(dead_code)]

use std::time::Duration;

use term_popover::{
    HostError, HostSurface, PanelConfig, PanelId, Placement, PresentationContext,
    PresentationSession, SurfaceEntry, SurfaceHandle,
};

/// Host that keeps entries in memory and records removals.
#[derive(Default)]
pub struct RecordingHost {
    pub entries: Vec<(SurfaceHandle, PanelId, Placement, String, PresentationContext)>,
    pub removed: Vec<SurfaceHandle>,
    pub fail_inserts: bool,
}

impl RecordingHost {
    pub fn labels(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.3.clone()).collect()
    }

    pub fn context(&self, label: &str) -> Option<PresentationContext> {
        self.entries
            .iter()
            .find(|e| e.3 == label)
            .map(|e| e.4.clone())
    }
}

impl HostSurface for RecordingHost {
    type Content = String;

    fn insert(&mut self, entry: SurfaceEntry<String>) -> Result<SurfaceHandle, HostError> {
        if self.fail_inserts {
            return Err(HostError::Rejected("test host refuses".into()));
        }
        let handle = SurfaceHandle::next();
        self.entries
            .push((handle, entry.panel, entry.placement, entry.content, entry.context));
        Ok(handle)
    }

    fn remove(&mut self, handle: SurfaceHandle) {
        self.entries.retain(|e| e.0 != handle);
        self.removed.push(handle);
    }
}

pub fn session() -> PresentationSession<RecordingHost> {
    PresentationSession::new(
        RecordingHost::default(),
        PanelConfig::new().with_exit_duration(Duration::from_millis(5)),
    )
}

/// Let spawned local tasks run until they block.
pub async fn settle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}
