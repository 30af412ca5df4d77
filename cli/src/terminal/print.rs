use std::fmt::Display;

use colored::*;
use tracing::info;

use crate::terminal::colors;

pub const TOTAL_WIDTH: usize = 64;

/// Events on this target are written as-is, without a level prefix.
pub const PRINT_TARGET: &str = "vigil::print";

/// Width of the key column in host trees.
const TREE_KEY_WIDTH: usize = 9;

#[macro_export]
macro_rules! vprint {
    () => {
        $crate::terminal::print::print("");
    };
    ($msg:expr) => {
        $crate::terminal::print::print($msg);
    };
}

pub fn print(msg: &str) {
    info!(target: "vigil::print", raw_msg = msg);
}

pub fn banner(q_level: u8) {
    if q_level > 0 {
        return;
    }

    let text_content = format!("⟦ VIGIL v{} ⟧", env!("CARGO_PKG_VERSION"));
    let text_width = console::measure_text_width(&text_content);
    let side = "═".repeat(TOTAL_WIDTH.saturating_sub(text_width) / 2);
    print(&format!(
        "{}{}{}",
        side.bright_black(),
        text_content.bright_green().bold(),
        side.bright_black()
    ));
}

pub fn header(msg: &str, q_level: u8) {
    if q_level > 0 {
        return;
    }

    let formatted = format!("⟦ {} ⟧", msg.to_uppercase());
    let dash_count = TOTAL_WIDTH.saturating_sub(formatted.chars().count());
    let left = dash_count / 2;
    let right = dash_count - left;

    print(&format!(
        "{}{}{}",
        "─".repeat(left).bright_black(),
        formatted.bright_green(),
        "─".repeat(right).bright_black()
    ));
}

pub fn fat_separator() {
    print(&format!("{}", "═".repeat(TOTAL_WIDTH).color(colors::SEPARATOR)));
}

pub fn tree_head(idx: usize, name: &str) {
    let idx_str = format!("[{}]", idx.to_string().color(colors::ACCENT));
    print(&format!(
        "{} {}",
        idx_str.color(colors::SEPARATOR),
        name.color(colors::PRIMARY).bold()
    ));
}

/// Prints `key....: value` rows joined by tree branches. Rows whose key is empty are
/// continuation lines of the previous row.
pub fn as_tree_one_level(rows: &[(String, ColoredString)]) {
    for (i, (key, value)) in rows.iter().enumerate() {
        let last = i + 1 == rows.len();
        let branch = if last { "└─" } else { "├─" };
        let line = if key.is_empty() {
            let stem = if last { " " } else { "│" };
            format!(" {}  {}  {}", stem.bright_black(), " ".repeat(TREE_KEY_WIDTH), value)
        } else {
            format!(
                " {} {}{}{} {}",
                branch.bright_black(),
                key.color(colors::TEXT_DEFAULT),
                ".".repeat(TREE_KEY_WIDTH.saturating_sub(key.len())).color(colors::SEPARATOR),
                ":".color(colors::SEPARATOR),
                value
            )
        };
        print(&line);
    }
}

/// `key: value` with a dotted fill, used by summary blocks.
pub fn aligned_line(key: &str, value: impl Display, key_width: usize) {
    let fill = ".".repeat((key_width + 1).saturating_sub(key.len()));
    print(&format!(
        "{} {}{}{} {}",
        ">".color(colors::SEPARATOR),
        key.color(colors::PRIMARY),
        fill.color(colors::SEPARATOR),
        ":".color(colors::SEPARATOR),
        value
    ));
}

pub fn centerln(msg: &str) {
    let space = " ".repeat(TOTAL_WIDTH.saturating_sub(console::measure_text_width(msg)) / 2);
    print(&format!("{space}{msg}{space}"));
}

const NO_RESULTS: &str = r#"
         _   _  ___    _   _  ___  ____ _____ ____
        | \ | |/ _ \  | | | |/ _ \/ ___|_   _/ ___|
        |  \| | | | | | |_| | | | \___ \ | | \___ \
        | |\  | |_| | |  _  | |_| |___) || |  ___) |
        |_| \_|\___/  |_| |_|\___/|____/ |_| |____/
"#;

pub fn no_results() {
    print(&format!("{}", NO_RESULTS.red().bold()));
}
