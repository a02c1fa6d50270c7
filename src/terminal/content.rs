use crossterm::event::Event;
use ratatui::layout::Rect;

use crate::context::PresentationContext;
use crate::ui::UiFrame;

/// Something the terminal host can draw inside a panel frame.
///
/// Content draws only its interior; the host owns the border, title and
/// placement. Closing goes through the context (`ctx.close_with(..)`).
pub trait PanelContent {
    fn title(&self) -> &str {
        ""
    }

    /// Interior size the content would like, in cells.
    fn preferred_size(&self) -> (u16, u16);

    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &PresentationContext);

    fn handle_event(&mut self, _event: &Event, _ctx: &PresentationContext) -> bool {
        false
    }
}
