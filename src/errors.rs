// File: src/errors.rs
//
// Error reporting for the Ruff bytecode VM. Compile-time diagnostics are
// reported as they're found, in the book's terse `[line N] Error ...`
// format (kept plain so the message is easy to grep/test against); runtime
// errors get a small `RuffError` wrapper so the top-level message can still
// be styled with `colored` the way the rest of the driver is.

use colored::Colorize;
use std::fmt;

/// Where a runtime error happened: just a line number, since the VM only
/// tracks per-instruction source lines (spec.md §3), not columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
}

impl SourceLocation {
    pub fn new(line: usize) -> Self {
        Self { line }
    }
}

/// The two error kinds `interpret` can report (spec.md §7); `Ok` is not an
/// error and has no `RuffError` representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    CompileError,
    RuntimeError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::CompileError => write!(f, "Compile Error"),
            ErrorKind::RuntimeError => write!(f, "Runtime Error"),
        }
    }
}

/// A runtime error: a message and the line of the instruction that raised
/// it. `Display` reproduces spec.md §7's exact runtime error format:
/// the message, then `[line N] in script`.
#[derive(Debug, Clone)]
pub struct RuffError {
    pub kind: ErrorKind,
    pub message: String,
    pub location: SourceLocation,
}

impl RuffError {
    pub fn runtime(message: impl Into<String>, line: usize) -> Self {
        Self { kind: ErrorKind::RuntimeError, message: message.into(), location: SourceLocation::new(line) }
    }
}

impl fmt::Display for RuffError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.message.red())?;
        write!(f, "[line {}] in script", self.location.line)
    }
}

impl std::error::Error for RuffError {}

/// Reports a compile-time error in the book's format:
/// `[line N] Error at 'lexeme': message` (or `at end` for EOF tokens).
/// Printed immediately, matching the compiler's synchronous panic-mode
/// reporting rather than batching errors for later display.
pub fn report_compile_error(line: usize, at: &str, message: &str) {
    eprintln!("{}", format!("[line {line}] Error{at}: {message}").red());
}

/// Computes the Levenshtein distance between two strings, used for
/// "did you mean?" suggestions when a global lookup misses.
pub fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let s1_chars: Vec<char> = s1.chars().collect();
    let s2_chars: Vec<char> = s2.chars().collect();
    let (len1, len2) = (s1_chars.len(), s2_chars.len());

    if len1 == 0 {
        return len2;
    }
    if len2 == 0 {
        return len1;
    }

    let mut matrix = vec![vec![0usize; len2 + 1]; len1 + 1];
    for (i, row) in matrix.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=len2 {
        matrix[0][j] = j;
    }

    for i in 1..=len1 {
        for j in 1..=len2 {
            let cost = if s1_chars[i - 1] == s2_chars[j - 1] { 0 } else { 1 };
            matrix[i][j] = std::cmp::min(
                std::cmp::min(matrix[i - 1][j] + 1, matrix[i][j - 1] + 1),
                matrix[i - 1][j - 1] + cost,
            );
        }
    }

    matrix[len1][len2]
}

/// Closest match from `candidates` by Levenshtein distance, capped at 3 so
/// wildly different names are never suggested.
pub fn find_closest_match<'a>(target: &str, candidates: &'a [&'a str]) -> Option<&'a str> {
    candidates
        .iter()
        .map(|c| (*c, levenshtein_distance(target, c)))
        .filter(|(_, dist)| *dist <= 3)
        .min_by_key(|(_, dist)| *dist)
        .map(|(c, _)| c)
}
