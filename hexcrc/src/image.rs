//! Assembly of the memory image from data records.

use std::fmt::{Debug, Formatter};
use std::ops::Range;

use crate::address::LinearAddress;
use crate::config::ChecksumOptions;
use crate::crc::Checksum;
use crate::error::HexError;

/// The largest image that will be assembled, in bytes.
pub const IMAGE_CAPACITY: usize = 1 << 20;

/// The size of the checksum slot at the end of every image.
pub const CHECKSUM_SIZE: usize = 4;

/// A contiguous memory image, starting at its origin.
///
/// An `Image` is always non-empty and its length is a multiple of four. The last four bytes are
/// reserved for the checksum.
#[derive(Clone, PartialEq, Eq)]
pub struct Image {
    origin: LinearAddress,
    data: Vec<u8>,
}

impl Debug for Image {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Image {{")?;
        writeln!(f, "    origin: {}", self.origin)?;
        writeln!(f, "    size: {:#08X}", self.len())?;
        writeln!(f, "    data: {:02X?}", self.data)?;
        write!(f, "}}")
    }
}

impl Image {
    /// The linear address of the first byte.
    pub fn origin(&self) -> LinearAddress {
        self.origin
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always `false`, the builder refuses to produce an empty image.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// The byte range holding the checksum.
    pub fn checksum_slot(&self) -> Range<usize> {
        self.len() - CHECKSUM_SIZE..self.len()
    }

    /// All bytes covered by the checksum, i.e. everything except the checksum slot.
    pub fn checksummed_bytes(&self) -> &[u8] {
        &self.data[..self.checksum_slot().start]
    }

    /// Writes `checksum` into the last four bytes.
    pub fn patch_checksum(&mut self, checksum: Checksum) {
        let slot = self.checksum_slot();
        self.data[slot].copy_from_slice(&checksum.to_bytes());
    }
}

/// Collects data records into an [`Image`].
///
/// Bytes are only ever appended. A record that starts beyond the current end gets the gap
/// filled first, so the offset of every byte equals its distance from the origin.
pub struct ImageBuilder {
    data: Vec<u8>,
    fill: u8,
    capacity: usize,
}

impl ImageBuilder {
    /// Creates a builder limited to [`IMAGE_CAPACITY`] bytes.
    pub fn new(options: &ChecksumOptions) -> Self {
        Self::with_capacity(options.fill_byte(), IMAGE_CAPACITY)
    }

    /// Creates a builder with a custom size limit.
    pub fn with_capacity(fill: u8, capacity: usize) -> Self {
        Self {
            data: Vec::new(),
            fill,
            capacity,
        }
    }

    /// The number of bytes collected so far.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The bytes collected so far.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Adds the payload of a data record located at `address`.
    ///
    /// The offset is computed freshly from `origin` for every record.
    pub fn add_data(
        &mut self,
        address: LinearAddress,
        origin: LinearAddress,
        data: &[u8],
    ) -> Result<(), HexError> {
        let current = self.data.len() as u64;
        let target = match address.value().checked_sub(origin.value()) {
            Some(offset) => u64::from(offset),
            None => {
                tracing::warn!(
                    "Data at {} lies below the image origin {}, appending it at the end",
                    address,
                    origin
                );
                current
            }
        };

        if target < current {
            tracing::debug!(
                "Data at {} overlaps previous data, appending it at offset {:#X}",
                address,
                current
            );
        }

        let required = target.max(current) + data.len() as u64;
        if required > self.capacity as u64 {
            return Err(HexError::CapacityExceeded {
                required,
                capacity: self.capacity,
            });
        }

        if target > current {
            tracing::info!(
                "Filled gap of {} bytes before {}",
                target - current,
                address
            );
            self.data.resize(target as usize, self.fill);
        }

        self.data.extend_from_slice(data);
        Ok(())
    }

    /// Pads the collected data to a multiple of four bytes and returns the image.
    pub fn finish(mut self, origin: LinearAddress) -> Result<Image, HexError> {
        if self.data.is_empty() {
            return Err(HexError::EmptyImage);
        }

        let aligned = self.data.len().next_multiple_of(CHECKSUM_SIZE);
        if aligned > self.capacity {
            return Err(HexError::CapacityExceeded {
                required: aligned as u64,
                capacity: self.capacity,
            });
        }
        if aligned != self.data.len() {
            self.data.resize(aligned, self.fill);
            tracing::info!("Aligned image to {} bytes", aligned);
        }

        Ok(Image {
            origin,
            data: self.data,
        })
    }
}
