//! Panel identity and placement.

use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_PANEL_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique panel identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PanelId(u64);

impl PanelId {
    pub(crate) fn next() -> Self {
        Self(NEXT_PANEL_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "panel#{}", self.0)
    }
}

/// Identifier of the UI element a panel is positioned against.
///
/// Two keys are equal when their text is equal; the coordinator never looks
/// at the element itself.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AnchorKey(Rc<str>);

impl AnchorKey {
    pub fn new(key: impl AsRef<str>) -> Self {
        Self(Rc::from(key.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AnchorKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for AnchorKey {
    fn from(value: String) -> Self {
        Self(Rc::from(value))
    }
}

impl fmt::Display for AnchorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where the host should put a panel.
///
/// The coordinator only forwards this to the host surface. `Anchored` wins
/// over an explicit offset when both were requested.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Placement {
    Anchored(AnchorKey),
    Offset { x: i32, y: i32 },
    #[default]
    Centered,
}

impl Placement {
    pub fn resolve(anchor: Option<&AnchorKey>, offset: Option<(i32, i32)>) -> Self {
        match (anchor, offset) {
            (Some(key), _) => Self::Anchored(key.clone()),
            (None, Some((x, y))) => Self::Offset { x, y },
            (None, None) => Self::Centered,
        }
    }

    pub fn anchor(&self) -> Option<&AnchorKey> {
        match self {
            Self::Anchored(key) => Some(key),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_increasing() {
        let a = PanelId::next();
        let b = PanelId::next();
        assert!(b > a);
    }

    #[test]
    fn anchor_beats_offset() {
        let key = AnchorKey::from("save");
        assert_eq!(
            Placement::resolve(Some(&key), Some((3, 4))),
            Placement::Anchored(key)
        );
        assert_eq!(
            Placement::resolve(None, Some((3, 4))),
            Placement::Offset { x: 3, y: 4 }
        );
        assert_eq!(Placement::resolve(None, None), Placement::Centered);
    }
}
