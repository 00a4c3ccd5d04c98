//! # hexcrc
//!
//! Assembles firmware images from Intel HEX files, computes a CRC-32 over them and writes the
//! checksum back into the image.
//!
//! The processing is a strict pipeline:
//!
//! 1. Every line is decoded into a [`Record`], verifying the per-line checksum.
//! 2. The [`AddressTracker`] resolves the 32-bit linear address of each data record.
//! 3. The [`ImageBuilder`] appends the payloads into one contiguous buffer, filling gaps and
//!    padding the result to a multiple of four bytes.
//! 4. [`Image::apply_checksum`] computes the CRC over everything but the last four bytes and
//!    stores it there.
//! 5. [`Image::records`] turns the finished image back into records for output.
//!
//! ```
//! use hexcrc::{load_hex_str, ChecksumOptions};
//!
//! let options = ChecksumOptions::default();
//! let mut image = load_hex_str(":0400000001020304F2\n:0400040005060708DE\n:00000001FF\n", &options)?;
//! let checksum = image.apply_checksum(options.polynomial);
//!
//! assert_eq!(checksum.value(), 0x4FE7_AB1D);
//! assert_eq!(image.as_bytes(), [1, 2, 3, 4, 0x4F, 0xE7, 0xAB, 0x1D]);
//! # Ok::<(), hexcrc::HexError>(())
//! ```

pub mod address;
pub mod config;
pub mod crc;
mod encoder;
mod error;
pub mod image;
mod loader;
pub mod record;

pub use address::{AddressTracker, LinearAddress, Step, UnsupportedRecord};
pub use config::{ChecksumOptions, DEFAULT_FILL};
pub use crc::{Checksum, Crc32, CRC_SEED, DEFAULT_POLYNOMIAL};
pub use encoder::Records;
pub use error::HexError;
pub use image::{Image, ImageBuilder, CHECKSUM_SIZE, IMAGE_CAPACITY};
pub use loader::{load_hex, load_hex_str};
pub use record::{Record, RecordError, RecordType, MAX_PAYLOAD};
