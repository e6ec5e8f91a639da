use ratatui::style::Color;

pub const BG_PRIMARY: Color = Color::Rgb(0, 0, 0);
pub const BG_PANEL: Color = Color::Rgb(12, 12, 12);
pub const BG_OUTPUT: Color = Color::Rgb(28, 28, 28);
pub const FG_PRIMARY: Color = Color::Rgb(190, 190, 190);
pub const FG_DIM: Color = Color::Rgb(128, 128, 128);

pub const BAR_BG: Color = Color::Rgb(23, 52, 127);
pub const BAR_TEXT: Color = Color::Rgb(235, 240, 255);
pub const BAR_HIGHLIGHT_BG: Color = Color::Rgb(73, 102, 177);

pub const MENU_BG: Color = Color::Rgb(79, 79, 79);
pub const MENU_BORDER: Color = Color::Rgb(208, 208, 208);
pub const MENU_HIGHLIGHT_BG: Color = Color::Rgb(220, 220, 220);
pub const MENU_HIGHLIGHT_TEXT: Color = Color::Rgb(30, 30, 30);

pub const BORDER_IDLE: Color = Color::Rgb(61, 120, 120);
pub const BORDER_FOCUS: Color = Color::Rgb(187, 94, 0);
pub const PANEL_HIGHLIGHT_BG: Color = Color::Rgb(120, 160, 255);

pub const STATUS_ACTIVE: Color = Color::Rgb(80, 200, 120);
pub const STATUS_ERROR: Color = Color::Rgb(230, 80, 80);
pub const CHAT_USER: Color = Color::Rgb(120, 170, 255);
