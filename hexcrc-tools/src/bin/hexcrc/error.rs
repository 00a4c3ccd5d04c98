use std::io;

use hexcrc::HexError;

/// Errors that end a run of the tool.
#[derive(Debug, thiserror::Error, docsplay::Display)]
pub enum CliError {
    /// No input file was specified.
    NoInputFile,
    /// The file '{0}' does not have the .hex extension.
    FileExtension(String),
    /// The file '{path}' could not be opened.
    Open { path: String, source: io::Error },
    /// The file '{path}' could not be written.
    Write { path: String, source: io::Error },
    /// {0}
    Hex(#[from] HexError),
}

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitStatus {
    Success = 0,
    /// No arguments at all, or a flag without its value.
    NoParameters = -1,
    FileExtension = -2,
    UnknownFlag = -3,
    NoInputFile = -4,
    /// A malformed line, or an input without data.
    InvalidLine = -5,
    UnsupportedFeature = -6,
    FileAccess = -7,
    CapacityExceeded = -8,
}

impl ExitStatus {
    pub fn code(self) -> i32 {
        self as i32
    }
}

impl From<&CliError> for ExitStatus {
    fn from(error: &CliError) -> Self {
        match error {
            CliError::NoInputFile => Self::NoInputFile,
            CliError::FileExtension(_) => Self::FileExtension,
            CliError::Open { .. } | CliError::Write { .. } => Self::FileAccess,
            CliError::Hex(error) => match error {
                HexError::Format { .. } | HexError::EmptyImage => Self::InvalidLine,
                HexError::UnsupportedFeature { .. } => Self::UnsupportedFeature,
                HexError::CapacityExceeded { .. } => Self::CapacityExceeded,
                HexError::Io(_) => Self::FileAccess,
            },
        }
    }
}
