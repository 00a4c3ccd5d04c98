use serde::{Deserialize, Serialize};

use crate::crc::DEFAULT_POLYNOMIAL;

/// The value used to fill gaps and to pad the image, unless configured otherwise.
pub const DEFAULT_FILL: u16 = 0xFFFF;

/// Parameters of one assembly and checksum run.
///
/// The value is handed to [`ImageBuilder`](crate::ImageBuilder) and
/// [`Image::apply_checksum`](crate::Image::apply_checksum) and is not changed while the run is
/// in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChecksumOptions {
    /// The CRC-32 generator polynomial, in MSB-first notation.
    pub polynomial: u32,
    /// The fill value. Only its low byte is written into the image.
    pub fill: u16,
}

impl ChecksumOptions {
    /// The byte written into gaps and alignment padding.
    pub fn fill_byte(&self) -> u8 {
        self.fill.to_le_bytes()[0]
    }
}

impl Default for ChecksumOptions {
    fn default() -> Self {
        Self {
            polynomial: DEFAULT_POLYNOMIAL,
            fill: DEFAULT_FILL,
        }
    }
}
