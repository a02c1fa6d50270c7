//! Overlay host for ratatui applications.
//!
//! `OverlayHost` keeps presented panels in insertion order and draws them
//! above whatever the application rendered. Anchored panels are positioned
//! against rectangles the application registers each frame in the
//! [`AnchorRegistry`].

use std::collections::BTreeMap;

use crossterm::event::{Event, MouseButton, MouseEventKind};
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Clear};

use super::content::PanelContent;
use crate::behavior::{DragOutcome, MotionPhase};
use crate::context::PresentationContext;
use crate::error::HostError;
use crate::host::{HostSurface, SurfaceEntry, SurfaceHandle};
use crate::panel::{AnchorKey, PanelId, Placement};
use crate::ui::{UiFrame, rect_contains};

const MIN_WIDTH: u16 = 24;
const MIN_HEIGHT: u16 = 5;

#[derive(Debug, Default, Clone)]
pub struct AnchorRegistry {
    rects: BTreeMap<AnchorKey, Rect>,
}

impl AnchorRegistry {
    pub fn register(&mut self, key: impl Into<AnchorKey>, rect: Rect) {
        self.rects.insert(key.into(), rect);
    }

    pub fn get(&self, key: &AnchorKey) -> Option<Rect> {
        self.rects.get(key).copied()
    }

    pub fn clear(&mut self) {
        self.rects.clear();
    }
}

struct HostedPanel {
    handle: SurfaceHandle,
    panel: PanelId,
    placement: Placement,
    content: Box<dyn PanelContent>,
    context: PresentationContext,
    rect: Option<Rect>,
}

impl HostedPanel {
    fn visible(&self) -> bool {
        !self.context.controller().is_completed()
    }
}

pub struct OverlayHost {
    entries: Vec<HostedPanel>,
    anchors: AnchorRegistry,
    attached: bool,
}

impl Default for OverlayHost {
    fn default() -> Self {
        Self::new()
    }
}

impl OverlayHost {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            anchors: AnchorRegistry::default(),
            attached: true,
        }
    }

    pub fn anchors(&self) -> &AnchorRegistry {
        &self.anchors
    }

    pub fn anchors_mut(&mut self) -> &mut AnchorRegistry {
        &mut self.anchors
    }

    /// A detached host refuses new panels (e.g. while the terminal is
    /// suspended). Panels already shown stay.
    pub fn set_attached(&mut self, attached: bool) {
        self.attached = attached;
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn panel_ids(&self) -> Vec<PanelId> {
        self.entries.iter().map(|e| e.panel).collect()
    }

    /// Where `panel` was last drawn.
    pub fn rect_of(&self, panel: PanelId) -> Option<Rect> {
        self.entries.iter().find(|e| e.panel == panel).and_then(|e| e.rect)
    }

    /// Drop entries whose controller was disposed without a removal reaching
    /// the host.
    pub fn prune(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| !e.context.controller().is_disposed());
        let pruned = before - self.entries.len();
        if pruned > 0 {
            tracing::debug!(pruned, "pruned stale overlay entries");
        }
        pruned
    }

    /// Screen rectangle for a panel whose frame (border included) wants
    /// `size` cells.
    pub fn rect_for(&self, placement: &Placement, size: (u16, u16), screen: Rect) -> Rect {
        let width = size.0.clamp(1, screen.width.max(1));
        let height = size.1.clamp(1, screen.height.max(1));
        match placement {
            Placement::Anchored(key) => match self.anchors.get(key) {
                Some(anchor) => below_anchor(anchor, width, height, screen),
                None => {
                    tracing::debug!(anchor = %key, "anchor not registered; centering panel");
                    centered(screen, width, height)
                }
            },
            Placement::Offset { x, y } => at_offset(*x, *y, width, height, screen),
            Placement::Centered => centered(screen, width, height),
        }
    }

    pub fn render(&mut self, frame: &mut UiFrame<'_>) {
        self.prune();
        let screen = frame.area();
        for index in 0..self.entries.len() {
            if !self.entries[index].visible() {
                self.entries[index].rect = None;
                continue;
            }
            let (inner_w, inner_h) = self.entries[index].content.preferred_size();
            let size = (inner_w.saturating_add(2), inner_h.saturating_add(2));
            let mut rect = self.rect_for(&self.entries[index].placement, size, screen);
            let entry = &mut self.entries[index];
            let drag = entry.context.gestures().drag_offset().clamp(0, i32::from(u16::MAX)) as u16;
            rect.y = rect.y.saturating_add(drag);
            entry.rect = Some(rect);

            let exiting = entry.context.animation().phase() != MotionPhase::Shown;
            let border_fg = if exiting {
                crate::theme::panel_exiting_fg()
            } else {
                crate::theme::panel_border()
            };
            frame.render_widget(Clear, rect);
            let block = Block::default()
                .borders(Borders::ALL)
                .title(entry.content.title().to_string())
                .border_style(Style::default().fg(border_fg))
                .style(Style::default().bg(crate::theme::panel_bg()));
            let inner = block.inner(rect).intersection(screen);
            frame.render_widget(block, rect);
            if inner.width > 0 && inner.height > 0 {
                entry.content.render(frame, inner, &entry.context);
            }
        }
    }

    fn topmost_visible(&self) -> Option<usize> {
        self.entries.iter().rposition(HostedPanel::visible)
    }

    /// Route an input event to the topmost panel. Returns whether the event
    /// was consumed.
    pub fn handle_event(&mut self, event: &Event) -> bool {
        let Some(index) = self.topmost_visible() else {
            return false;
        };
        let entry = &mut self.entries[index];
        match event {
            Event::Mouse(mouse) => {
                let gestures = entry.context.gestures().clone();
                match mouse.kind {
                    MouseEventKind::Down(MouseButton::Left) => {
                        let Some(rect) = entry.rect else {
                            return false;
                        };
                        if !rect_contains(rect, mouse.column, mouse.row) {
                            return gestures.tap_outside();
                        }
                        if mouse.row == rect.y {
                            gestures.begin_drag(mouse.row);
                            return true;
                        }
                        entry.content.handle_event(event, &entry.context);
                        true
                    }
                    MouseEventKind::Drag(MouseButton::Left) if gestures.is_dragging() => {
                        gestures.update_drag(mouse.row);
                        true
                    }
                    MouseEventKind::Up(MouseButton::Left) => {
                        let outcome = gestures.end_drag();
                        if outcome == DragOutcome::Dismissed {
                            tracing::debug!(panel = %entry.panel, "panel dragged away");
                        }
                        outcome != DragOutcome::NotDragging
                    }
                    _ => entry.content.handle_event(event, &entry.context),
                }
            }
            _ => entry.content.handle_event(event, &entry.context),
        }
    }
}

impl HostSurface for OverlayHost {
    type Content = Box<dyn PanelContent>;

    fn insert(&mut self, entry: SurfaceEntry<Self::Content>) -> Result<SurfaceHandle, HostError> {
        if !self.attached {
            return Err(HostError::Detached);
        }
        let handle = SurfaceHandle::next();
        tracing::trace!(panel = %entry.panel, handle = handle.get(), "overlay entry inserted");
        self.entries.push(HostedPanel {
            handle,
            panel: entry.panel,
            placement: entry.placement,
            content: entry.content,
            context: entry.context,
            rect: None,
        });
        Ok(handle)
    }

    fn remove(&mut self, handle: SurfaceHandle) {
        self.entries.retain(|e| e.handle != handle);
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let mut width = width.min(area.width).max(1);
    let mut height = height.min(area.height).max(1);
    if area.width >= MIN_WIDTH {
        width = width.max(MIN_WIDTH);
    }
    if area.height >= MIN_HEIGHT {
        height = height.max(MIN_HEIGHT);
    }
    let x = area.x.saturating_add(area.width.saturating_sub(width) / 2);
    let y = area
        .y
        .saturating_add(area.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

/// Open below the anchor, flipping above it when there is no room, and
/// slide left to stay on screen.
fn below_anchor(anchor: Rect, width: u16, height: u16, screen: Rect) -> Rect {
    let screen_right = screen.x.saturating_add(screen.width);
    let screen_bottom = screen.y.saturating_add(screen.height);
    let x = anchor
        .x
        .min(screen_right.saturating_sub(width))
        .max(screen.x);
    let below = anchor.y.saturating_add(anchor.height);
    let y = if below.saturating_add(height) <= screen_bottom {
        below
    } else if anchor.y.saturating_sub(screen.y) >= height {
        anchor.y - height
    } else {
        screen_bottom.saturating_sub(height).max(screen.y)
    };
    Rect {
        x,
        y,
        width,
        height,
    }
}

fn at_offset(x: i32, y: i32, width: u16, height: u16, screen: Rect) -> Rect {
    let max_x = i32::from(screen.x) + i32::from(screen.width.saturating_sub(width));
    let max_y = i32::from(screen.y) + i32::from(screen.height.saturating_sub(height));
    let x = (i32::from(screen.x) + x).clamp(i32::from(screen.x), max_x);
    let y = (i32::from(screen.y) + y).clamp(i32::from(screen.y), max_y);
    Rect {
        x: x as u16,
        y: y as u16,
        width,
        height,
    }
}
