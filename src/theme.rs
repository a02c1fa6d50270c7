use ratatui::style::Color;

// Centralized theme colors for the terminal host.

pub fn accent() -> Color {
    Color::Rgb(200, 100, 0)
}

// Toolbar
pub fn toolbar_bg() -> Color {
    Color::DarkGray
}
pub fn toolbar_fg() -> Color {
    Color::White
}
pub fn toolbar_active_bg() -> Color {
    Color::Gray
}
pub fn toolbar_active_fg() -> Color {
    Color::Black
}

// Panels
pub fn panel_bg() -> Color {
    Color::Black
}
pub fn panel_fg() -> Color {
    Color::White
}
pub fn panel_border() -> Color {
    Color::Gray
}
pub fn panel_exiting_fg() -> Color {
    Color::DarkGray
}
pub fn panel_separator() -> Color {
    Color::DarkGray
}

// Buttons
pub fn button_selected_bg() -> Color {
    Color::Blue
}
pub fn button_selected_fg() -> Color {
    Color::White
}

// Status / log
pub fn status_fg() -> Color {
    Color::Gray
}
pub fn log_fg() -> Color {
    Color::DarkGray
}
