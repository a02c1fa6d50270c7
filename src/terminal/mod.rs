//! Reference host for ratatui terminal applications.

pub mod content;
pub mod message_panel;
pub mod overlay_host;

pub use content::PanelContent;
pub use message_panel::{Choice, MessagePanel};
pub use overlay_host::{AnchorRegistry, OverlayHost};
