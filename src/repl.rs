// File: src/repl.rs
//
// Interactive REPL (Read-Eval-Print Loop) for the Ruff bytecode VM.
// Provides an interactive shell for executing Ruff code with features like:
// - Multi-line input support for blocks
// - Command history with up/down arrow navigation
// - Line editing capabilities
// - Special commands (:help, :clear, :quit, :reset)
// - One persistent Vm across lines, so globals survive between inputs

use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::vm::Vm;

/// REPL session that maintains VM state and handles user interaction.
pub struct Repl {
    vm: Vm,
    editor: DefaultEditor,
}

impl Repl {
    /// Creates a new REPL session with a fresh VM.
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let editor = DefaultEditor::new()?;
        Ok(Repl { vm: Vm::new(), editor })
    }

    /// Displays the welcome banner with version and help information.
    fn show_banner(&self) {
        println!("{}", "╔══════════════════════════════════════════════════════╗".bright_cyan());
        println!("{}", "║          Ruff REPL v0.10.0 - Interactive Shell      ║".bright_cyan());
        println!("{}", "╚══════════════════════════════════════════════════════╝".bright_cyan());
        println!();
        println!(
            "  {} Use {}{}{}{}",
            "Welcome!".bright_green(),
            ":".bright_blue(),
            "help".bright_yellow(),
            " for commands or ".bright_blue(),
            ":quit".bright_yellow()
        );
        println!("  {} Multi-line input: End with unclosed braces", "Tip:".bright_magenta());
        println!();
    }

    /// Starts the REPL loop.
    pub fn run(&mut self) {
        self.show_banner();

        let mut buffer = String::new();

        loop {
            let prompt = if buffer.is_empty() {
                "ruff> ".bright_green().to_string()
            } else {
                "....> ".bright_blue().to_string()
            };

            match self.editor.readline(&prompt) {
                Ok(line) => {
                    let _ = self.editor.add_history_entry(line.as_str());

                    if buffer.is_empty() && line.trim().starts_with(':') {
                        if self.handle_command(line.trim()) {
                            continue;
                        } else {
                            break; // :quit was called
                        }
                    }

                    buffer.push_str(&line);
                    buffer.push('\n');

                    if is_input_complete(&buffer) {
                        self.eval_input(&buffer);
                        buffer.clear();
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("{}", "^C (Ctrl+C to interrupt, :quit to exit)".bright_yellow());
                    buffer.clear();
                }
                Err(ReadlineError::Eof) => {
                    println!("{}", "\nGoodbye!".bright_cyan());
                    break;
                }
                Err(err) => {
                    eprintln!("{} {}", "Error:".bright_red(), err);
                    break;
                }
            }
        }
    }

    /// Handles special REPL commands starting with ':'.
    /// Returns true to continue the REPL, false to quit.
    fn handle_command(&mut self, cmd: &str) -> bool {
        match cmd {
            ":help" | ":h" => {
                show_help();
                true
            }
            ":quit" | ":q" | ":exit" => {
                println!("{}", "Goodbye!".bright_cyan());
                false
            }
            ":clear" | ":c" => {
                print!("\x1B[2J\x1B[1;1H");
                self.show_banner();
                true
            }
            ":reset" | ":r" => {
                self.vm = Vm::new();
                println!("{}", "Environment reset".bright_green());
                true
            }
            _ => {
                println!(
                    "{} Unknown command: {}. Type {}{}{}",
                    "Error:".bright_red(),
                    cmd.bright_yellow(),
                    ":".bright_blue(),
                    "help".bright_yellow(),
                    " for available commands.".bright_blue()
                );
                true
            }
        }
    }

    /// Compiles and runs a complete line (or block) of input. Errors are
    /// already reported by `Vm::interpret` itself; this just drives it.
    fn eval_input(&mut self, input: &str) {
        if input.trim().is_empty() {
            return;
        }
        self.vm.interpret(input);
    }
}

/// Displays help information about available commands.
fn show_help() {
    println!();
    println!("{}", "REPL Commands:".bright_cyan().bold());
    println!();
    println!("  {}{}  Display this help message", ":help".bright_yellow(), " or :h     ".dimmed());
    println!("  {}{}  Exit the REPL", ":quit".bright_yellow(), " or :q     ".dimmed());
    println!("  {}{}  Clear the screen", ":clear".bright_yellow(), " or :c    ".dimmed());
    println!("  {}{}  Reset the VM", ":reset".bright_yellow(), " or :r   ".dimmed());
    println!();
    println!("{}", "Navigation:".bright_cyan().bold());
    println!();
    println!("  {}  Navigate command history", "↑/↓ arrows".bright_blue());
    println!("  {}  Interrupt current input", "Ctrl+C    ".bright_blue());
    println!("  {}  Exit REPL", "Ctrl+D    ".bright_blue());
    println!();
    println!("{}", "Multi-line Input:".bright_cyan().bold());
    println!();
    println!("  Leave braces, brackets, or parentheses unclosed to continue");
    println!("  on the next line. Close them to execute the statement.");
    println!();
    println!("{}", "Examples:".bright_cyan().bold());
    println!();
    println!("  {}", "ruff> var x = 42;".dimmed());
    println!("  {}", "ruff> if (x > 0) {".dimmed());
    println!("  {}", "....>     print \"positive\";".dimmed());
    println!("  {}", "....> }".dimmed());
    println!();
}

/// Checks if the input is syntactically complete: all brackets, braces, and
/// parentheses balanced outside of string literals, and not mid-string.
/// Comments run from `//` to end of line, same as the language's own lexer.
fn is_input_complete(input: &str) -> bool {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return true;
    }

    let mut brace_count = 0i32;
    let mut bracket_count = 0i32;
    let mut paren_count = 0i32;
    let mut in_string = false;
    let mut in_comment = false;

    let mut chars = trimmed.chars().peekable();
    while let Some(ch) = chars.next() {
        if in_comment {
            if ch == '\n' {
                in_comment = false;
            }
            continue;
        }

        match ch {
            '"' => in_string = !in_string,
            '/' if !in_string && chars.peek() == Some(&'/') => {
                in_comment = true;
            }
            '{' if !in_string => brace_count += 1,
            '}' if !in_string => brace_count -= 1,
            '[' if !in_string => bracket_count += 1,
            ']' if !in_string => bracket_count -= 1,
            '(' if !in_string => paren_count += 1,
            ')' if !in_string => paren_count -= 1,
            _ => {}
        }
    }

    !in_string && brace_count <= 0 && bracket_count <= 0 && paren_count <= 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_statement_is_complete() {
        assert!(is_input_complete("print 1;\n"));
    }

    #[test]
    fn unclosed_brace_is_incomplete() {
        assert!(!is_input_complete("if (true) {\n"));
    }

    #[test]
    fn closed_brace_is_complete() {
        assert!(is_input_complete("if (true) { print 1; }\n"));
    }

    #[test]
    fn brace_inside_string_does_not_count() {
        assert!(is_input_complete("print \"{\";\n"));
    }

    #[test]
    fn line_comment_hides_trailing_brace() {
        assert!(is_input_complete("print 1; // {\n"));
    }
}
