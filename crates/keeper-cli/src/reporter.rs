//! Console progress output.

use console::style;

use keeper_core::installer::Reporter;

/// Writes installer progress lines to stdout. Indented detail lines are
/// warnings and are highlighted.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn write_line(&self, line: &str) {
        if line.starts_with("    ") {
            println!("{}", style(line).yellow());
        } else if let Some(rest) = line.strip_prefix("  - ") {
            println!("  {} {}", style("-").cyan(), rest);
        } else {
            println!("{line}");
        }
    }
}
