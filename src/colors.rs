/// Terminal output with NO_COLOR and CLICOLOR environment variable handling
///
/// Implements the NO_COLOR standard (https://no-color.org/) and traditional
/// CLICOLOR conventions for disabling terminal colors, plus the three message
/// styles the stack prints: `==>` headings, warnings, and errors.
///
/// **Environment Variables**:
/// - `NO_COLOR`: If set (to any value), disable colors
/// - `CLICOLOR`: If set to 0, disable colors
/// - `CLICOLOR_FORCE`: If set to non-zero, force colors even when not a TTY
use colored::{Colorize, control};

/// Initialize color support by checking environment variables and TTY status
///
/// Call this early in main() to configure color output for the entire program.
pub fn init_colors() {
    if std::env::var("NO_COLOR").is_ok() {
        control::set_override(false);
        return;
    }

    if std::env::var("CLICOLOR_FORCE")
        .map(|v| v != "0")
        .unwrap_or(false)
    {
        control::set_override(true);
        return;
    }

    if std::env::var("CLICOLOR").map(|v| v == "0").unwrap_or(false) {
        control::set_override(false);
        return;
    }

    let is_tty = std::io::IsTerminal::is_terminal(&std::io::stdout());
    control::set_override(is_tty);
}

/// `==> message`
pub fn heading(message: &str) {
    println!("{} {}", "==>".blue().bold(), message.bold());
}

/// `Warning: message`
pub fn warning(message: &str) {
    eprintln!("{}: {}", "Warning".yellow().underline(), message);
}

/// `Error: message`
pub fn error(message: &str) {
    eprintln!("{}: {}", "Error".red().underline(), message);
}
