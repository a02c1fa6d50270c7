use crossterm::event::{Event, KeyCode, KeyEventKind, MouseButton, MouseEventKind};
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Paragraph, Wrap};

use super::content::PanelContent;
use crate::context::PresentationContext;
use crate::ui::{UiFrame, rect_contains};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub label: String,
    pub value: String,
}

impl Choice {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Text body plus a row of buttons. Picking a button closes the panel with
/// the button's value as a `String` result.
#[derive(Debug, Default)]
pub struct MessagePanel {
    title: String,
    body: String,
    choices: Vec<Choice>,
    selected: usize,
    choice_rects: Vec<Rect>,
}

impl MessagePanel {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            ..Self::default()
        }
    }

    pub fn with_choice(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.choices.push(Choice::new(label, value));
        self
    }

    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    pub fn selected(&self) -> Option<&Choice> {
        self.choices.get(self.selected)
    }

    fn select_next(&mut self) {
        if !self.choices.is_empty() {
            self.selected = (self.selected + 1) % self.choices.len();
        }
    }

    fn select_prev(&mut self) {
        if !self.choices.is_empty() {
            self.selected = (self.selected + self.choices.len() - 1) % self.choices.len();
        }
    }

    fn accept(&self, index: usize, ctx: &PresentationContext) -> bool {
        let Some(choice) = self.choices.get(index) else {
            return false;
        };
        tracing::debug!(panel = %ctx.panel_id(), choice = %choice.value, "message panel choice");
        ctx.close_with(choice.value.clone());
        true
    }

    fn button_label(choice: &Choice) -> String {
        format!("[ {} ]", choice.label)
    }

    fn buttons_width(&self) -> u16 {
        let total: usize = self
            .choices
            .iter()
            .map(|c| Self::button_label(c).chars().count() + 1)
            .sum();
        total.saturating_sub(1) as u16
    }
}

impl PanelContent for MessagePanel {
    fn title(&self) -> &str {
        &self.title
    }

    fn preferred_size(&self) -> (u16, u16) {
        let body_width = self
            .body
            .lines()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0) as u16;
        let title_width = (self.title.chars().count() as u16).saturating_add(2);
        let width = body_width.max(title_width).max(self.buttons_width()).saturating_add(2);
        let mut height = self.body.lines().count().max(1) as u16;
        if !self.choices.is_empty() {
            height = height.saturating_add(2);
        }
        (width, height)
    }

    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, _ctx: &PresentationContext) {
        self.choice_rects.clear();
        if area.width == 0 || area.height == 0 {
            return;
        }
        let content = Rect {
            x: area.x.saturating_add(1),
            y: area.y,
            width: area.width.saturating_sub(2),
            height: area.height,
        };
        let reserved = if self.choices.is_empty() { 0 } else { 2 };
        let body_rect = Rect {
            height: content.height.saturating_sub(reserved),
            ..content
        };
        let paragraph = Paragraph::new(self.body.as_str())
            .alignment(Alignment::Left)
            .style(Style::default().fg(crate::theme::panel_fg()))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, body_rect);

        if self.choices.is_empty() || content.height < 3 {
            return;
        }
        let separator_y = content.y.saturating_add(content.height.saturating_sub(2));
        let button_y = content.y.saturating_add(content.height.saturating_sub(1));
        let separator_style = Style::default().fg(crate::theme::panel_separator());
        let separator = "─".repeat(content.width as usize);
        frame.set_string(content.x, separator_y, &separator, separator_style);

        let selected_style = Style::default()
            .fg(crate::theme::button_selected_fg())
            .bg(crate::theme::button_selected_bg())
            .add_modifier(Modifier::BOLD);
        let unselected_style = Style::default()
            .fg(crate::theme::panel_fg())
            .bg(crate::theme::panel_bg());
        let mut x = content
            .x
            .saturating_add(content.width.saturating_sub(self.buttons_width()));
        for (index, choice) in self.choices.iter().enumerate() {
            let label = Self::button_label(choice);
            let style = if index == self.selected {
                selected_style
            } else {
                unselected_style
            };
            frame.set_string(x, button_y, &label, style);
            let width = label.chars().count() as u16;
            self.choice_rects.push(Rect {
                x,
                y: button_y,
                width,
                height: 1,
            });
            x = x.saturating_add(width + 1);
        }
    }

    fn handle_event(&mut self, event: &Event, ctx: &PresentationContext) -> bool {
        match event {
            Event::Mouse(mouse) if matches!(mouse.kind, MouseEventKind::Down(MouseButton::Left)) => {
                let hit = self
                    .choice_rects
                    .iter()
                    .position(|rect| rect_contains(*rect, mouse.column, mouse.row));
                match hit {
                    Some(index) => {
                        self.selected = index;
                        self.accept(index, ctx)
                    }
                    None => false,
                }
            }
            Event::Key(key) if key.kind != KeyEventKind::Release => match key.code {
                KeyCode::Tab | KeyCode::Right => {
                    self.select_next();
                    true
                }
                KeyCode::BackTab | KeyCode::Left => {
                    self.select_prev();
                    true
                }
                KeyCode::Enter => self.accept(self.selected, ctx),
                _ => false,
            },
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::{AnimationCoordinator, GestureCoordinator};
    use crate::context::MountToken;
    use crate::controller::PanelController;
    use crate::panel::Placement;
    use crate::scheduler::UiScheduler;
    use crossterm::event::{KeyEvent, KeyModifiers, MouseEvent};
    use ratatui::buffer::Buffer;
    use std::time::Duration;

    fn context() -> PresentationContext {
        let c = PanelController::new(None, UiScheduler::new());
        PresentationContext::new(
            c.clone(),
            Placement::Centered,
            MountToken::unscoped(),
            AnimationCoordinator::new(c.clone(), Duration::ZERO),
            GestureCoordinator::new(c, 3, false),
        )
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn panel() -> MessagePanel {
        MessagePanel::new("Save", "Save changes?")
            .with_choice("Yes", "yes")
            .with_choice("No", "no")
    }

    #[test]
    fn preferred_size_fits_body_and_buttons() {
        let (w, h) = panel().preferred_size();
        assert!(w >= "[ Yes ] [ No ]".len() as u16);
        assert_eq!(h, 3);
        assert_eq!(MessagePanel::new("t", "a\nb").preferred_size().1, 2);
    }

    #[test]
    fn keys_cycle_and_enter_closes_with_value() {
        let ctx = context();
        let mut p = panel();
        assert!(p.handle_event(&key(KeyCode::Right), &ctx));
        assert_eq!(p.selected().map(|c| c.value.as_str()), Some("no"));
        assert!(p.handle_event(&key(KeyCode::Left), &ctx));
        assert!(p.handle_event(&key(KeyCode::Enter), &ctx));
        let result = ctx.controller().result().flatten().unwrap();
        assert_eq!(result.downcast::<String>().as_deref(), Some("yes"));
        assert!(!p.handle_event(&key(KeyCode::Char('x')), &ctx));
    }

    #[test]
    fn clicking_a_rendered_button_closes() {
        let ctx = context();
        let mut p = panel();
        let area = Rect::new(0, 0, 30, 4);
        let mut buf = Buffer::empty(area);
        p.render(&mut UiFrame::from_parts(area, &mut buf), area, &ctx);
        let no = p.choice_rects[1];
        let click = Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: no.x,
            row: no.y,
            modifiers: KeyModifiers::NONE,
        });
        assert!(p.handle_event(&click, &ctx));
        let result = ctx.controller().result().flatten().unwrap();
        assert_eq!(result.downcast::<String>().as_deref(), Some("no"));
    }
}
