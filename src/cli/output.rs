//! CLI output formatting utilities.

use console::style;

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a list item.
    pub fn list_item(msg: &str) {
        println!("  {} {}", style("*").cyan(), msg);
    }

    /// Print the startup banner with the available commands.
    pub fn banner(deployment: &str) {
        let rule = "─".repeat(62);
        println!("{}", style(&rule).cyan());
        println!(" {} ({})", style("AgentDesk").bold().cyan(), deployment);
        println!(" Commands: /exit, /reset, /sys <text>, /temp <0..2>, /unit c|f");
        println!("{}\n", style(&rule).cyan());
    }

    /// Print a role-prefixed message body.
    pub fn assistant(text: &str) {
        println!("{} {}\n", style("assistant>").green().bold(), wrap(text, 100));
    }
}

/// Soft-wrap `text` at word boundaries, keeping existing line breaks.
fn wrap(text: &str, width: usize) -> String {
    text.lines()
        .map(|line| {
            let mut wrapped = String::new();
            let mut column = 0;
            for word in line.split(' ') {
                let len = word.chars().count();
                if column > 0 && column + 1 + len > width {
                    wrapped.push('\n');
                    column = 0;
                } else if column > 0 {
                    wrapped.push(' ');
                    column += 1;
                }
                wrapped.push_str(word);
                column += len;
            }
            wrapped
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_breaks_long_lines() {
        assert_eq!(wrap("aaa bbb ccc", 7), "aaa bbb\nccc");
        assert_eq!(wrap("keep\nbreaks", 80), "keep\nbreaks");
    }
}
