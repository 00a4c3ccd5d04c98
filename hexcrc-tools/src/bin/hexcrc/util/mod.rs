pub mod logging;

use std::num::ParseIntError;
use std::path::{Path, PathBuf};

use crate::error::CliError;

/// The only file extension accepted for input and output files.
pub const HEX_EXTENSION: &str = "hex";

/// Parses a decimal or `0x`-prefixed hexadecimal number.
pub fn parse_u16(input: &str) -> Result<u16, ParseIntError> {
    parse_int::parse(input)
}

/// Parses a decimal or `0x`-prefixed hexadecimal number.
pub fn parse_u32(input: &str) -> Result<u32, ParseIntError> {
    parse_int::parse(input)
}

/// Resolves the path of a HEX file.
///
/// A path without extension gets `.hex` appended, any extension other than `.hex` is rejected.
pub fn hex_path(path: &Path) -> Result<PathBuf, CliError> {
    match path.extension() {
        None => Ok(path.with_extension(HEX_EXTENSION)),
        Some(extension) if extension.eq_ignore_ascii_case(HEX_EXTENSION) => Ok(path.to_path_buf()),
        Some(_) => Err(CliError::FileExtension(path.display().to_string())),
    }
}
