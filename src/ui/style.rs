use ratatui::style::{Color, Style, Stylize};

pub const BORDER: Color = Color::Rgb(255, 255, 255);
pub const LINE: Color = Color::DarkGray;
pub const POINT: Color = Color::Cyan;
pub const CURSOR: Color = Color::Yellow;
pub const ERROR: Color = Color::Red;
pub const MUTED: Color = Color::Gray;

pub fn dim_unless_focused(is_focused: bool, style: Style) -> Style {
    if is_focused { style.bold() } else { style.dim().italic() }
}
