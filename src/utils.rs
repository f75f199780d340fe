use std::io::{self, IsTerminal};

pub const RED: &str = "31";
pub const BLUE: &str = "34";

pub fn colorize(text: &str, color: &str) -> String {
    if !io::stdout().is_terminal() {
        return text.to_string();
    }
    format!("\x1b[{}m{}\x1b[0m", color, text)
}

pub fn colorized_println(text: &str, color: &str) {
    println!("{}", colorize(text, color));
}

pub fn print_filled_with_space(s: &str, n: usize) {
    print!("{:<width$}", s, width = n);
}
