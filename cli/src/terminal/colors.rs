use colored::Color;

pub const PRIMARY: Color = Color::TrueColor { r: 110, g: 200, b: 140 };
pub const ACCENT: Color = Color::TrueColor { r: 240, g: 190, b: 90 };
pub const SEPARATOR: Color = Color::BrightBlack;
pub const TEXT_DEFAULT: Color = Color::TrueColor { r: 210, g: 210, b: 210 };

pub const IPV4_ADDR: Color = Color::TrueColor { r: 100, g: 180, b: 255 };
pub const IPV6_ADDR: Color = Color::TrueColor { r: 170, g: 140, b: 255 };
pub const MAC_ADDR: Color = Color::TrueColor { r: 230, g: 160, b: 200 };

pub const CRITICAL: Color = Color::TrueColor { r: 255, g: 70, b: 70 };
pub const HIGH: Color = Color::TrueColor { r: 255, g: 140, b: 60 };
pub const MEDIUM: Color = Color::TrueColor { r: 240, g: 210, b: 80 };
pub const LOW: Color = Color::TrueColor { r: 120, g: 190, b: 230 };
pub const MINIMAL: Color = Color::TrueColor { r: 110, g: 200, b: 140 };
