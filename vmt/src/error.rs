use color_print::cprintln;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown operation: `{0}`")]
    UnknownOperation(String),

    #[error("Invalid operands: expected [{0}]")]
    InvalidOperands(&'static str),

    #[error("Cannot parse `{0}` as {1}")]
    ParseArgument(String, String),

    #[error("Unknown segment: `{0}`")]
    UnknownSegment(String),

    #[error("Index {1} out of range for `{0}` (size {2})")]
    IndexOutOfRange(String, u16, u16),

    #[error("Cannot pop to the `constant` segment")]
    PopConstant,

    #[error("Undefined label: `{0}`")]
    UndefinedLabel(String),

    #[error("Re-defined label: `{0}`")]
    RedefinedLabel(String),

    #[error("Failed to open file: {0}")]
    FileOpen(String, #[source] std::io::Error),

    #[error("Failed to read file: {0}")]
    FileRead(String, #[source] std::io::Error),

    #[error("Failed to create file: {0}")]
    FileCreate(String, #[source] std::io::Error),

    #[error("Failed to write file: {0}")]
    FileWrite(String, #[source] std::io::Error),
}

/// An error tied to the source location that produced it.
#[derive(Debug)]
pub struct Diag {
    pub err: Error,
    pub unit: String,
    pub line: usize,
    pub raw: String,
}

impl Diag {
    pub fn new(err: Error, unit: &str, line: usize, raw: &str) -> Self {
        Diag {
            err,
            unit: unit.to_string(),
            line,
            raw: raw.to_string(),
        }
    }

    /// Print the error with its source location and line content.
    pub fn print(&self) {
        cprintln!("<red,bold>error</>: {}", self.err);
        if self.line == 0 {
            return;
        }
        cprintln!("     <blue>--></> <underline>{}:{}</>", self.unit, self.line);
        cprintln!("      <blue>|</>");
        cprintln!(" <blue>{:>4} |</> {}", self.line, self.raw);
        cprintln!("      <blue>|</>");
    }
}
