//! The CRC-32 engine.
//!
//! The checksum is a plain MSB-first, non-reflected CRC-32 without a final XOR. The image is
//! consumed as little-endian 32-bit words, one word per step, the way CRC units of many
//! microcontrollers process memory.

use std::fmt;

use crate::image::Image;

/// The CRC-32 polynomial used unless configured otherwise.
pub const DEFAULT_POLYNOMIAL: u32 = 0x04C1_1DB7;

/// The initial value of the accumulator.
pub const CRC_SEED: u32 = 0xFFFF_FFFF;

/// An incremental CRC-32 computation.
#[derive(Debug, Clone)]
pub struct Crc32 {
    polynomial: u32,
    accumulator: u32,
}

impl Crc32 {
    pub fn new(polynomial: u32) -> Self {
        Self {
            polynomial,
            accumulator: CRC_SEED,
        }
    }

    /// Feeds one 32-bit word into the accumulator.
    pub fn update_word(&mut self, word: u32) {
        self.accumulator ^= word;
        for _ in 0..32 {
            self.accumulator = if self.accumulator & 0x8000_0000 != 0 {
                (self.accumulator << 1) ^ self.polynomial
            } else {
                self.accumulator << 1
            };
        }
    }

    /// Feeds `bytes` as a sequence of little-endian words.
    ///
    /// Trailing bytes that do not form a whole word are ignored.
    pub fn update(&mut self, bytes: &[u8]) {
        for word in bytes.chunks_exact(4) {
            self.update_word(u32::from_le_bytes([word[0], word[1], word[2], word[3]]));
        }
    }

    pub fn finalize(self) -> Checksum {
        Checksum {
            accumulator: self.accumulator,
        }
    }
}

/// The result of a CRC-32 computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Checksum {
    accumulator: u32,
}

impl Checksum {
    /// The raw accumulator value.
    pub fn accumulator(self) -> u32 {
        self.accumulator
    }

    /// The checksum as it is displayed, with the accumulator bytes reversed.
    pub fn value(self) -> u32 {
        self.accumulator.swap_bytes()
    }

    /// The checksum as it is stored in the image. Read as big-endian, this is [`Self::value`].
    pub fn to_bytes(self) -> [u8; 4] {
        self.accumulator.to_le_bytes()
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.value())
    }
}

impl Image {
    /// Computes the checksum over everything but the checksum slot.
    pub fn compute_checksum(&self, polynomial: u32) -> Checksum {
        let mut crc = Crc32::new(polynomial);
        crc.update(self.checksummed_bytes());
        crc.finalize()
    }

    /// Computes the checksum and writes it into the checksum slot.
    pub fn apply_checksum(&mut self, polynomial: u32) -> Checksum {
        let checksum = self.compute_checksum(polynomial);
        self.patch_checksum(checksum);
        tracing::debug!("Patched checksum {} into {:?}", checksum, self.checksum_slot());
        checksum
    }
}
