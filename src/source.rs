//! Access to program text by line number.
use std::{fs, io, path::Path};

use crate::ops::Line;

/// Read-only access to the lines of a program.
///
/// Implementations must return the same text for the same line for as long
/// as a program is running, since jumps may fetch any line any number of times.
pub trait ProgramSource {
    /// Returns the text of line `line` (1-based), or `None` past the end of the program.
    fn line_text(&self, line: Line) -> Option<&str>;
}

/// A program held in memory, split into lines once up front.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Program {
    lines: Vec<String>,
}

impl Program {
    pub fn parse(text: &str) -> Self {
        Program { lines: text.lines().map(str::to_owned).collect() }
    }

    /// Reads a program from disk. Bytes that are not valid UTF-8 are replaced,
    /// so they only matter if they end up in an instruction or operand.
    pub fn from_file(path: impl AsRef<Path>) -> io::Result<Self> {
        Ok(Self::parse(&String::from_utf8_lossy(&fs::read(path)?)))
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl ProgramSource for Program {
    fn line_text(&self, line: Line) -> Option<&str> {
        let index = line.checked_sub(1)?;
        self.lines.get(index).map(String::as_str)
    }
}

impl ProgramSource for [&str] {
    fn line_text(&self, line: Line) -> Option<&str> {
        self.get(line.checked_sub(1)?).copied()
    }
}
