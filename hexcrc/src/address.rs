//! Reconstruction of 32-bit linear addresses from the record stream.

use std::fmt;

use crate::record::{Record, RecordType};

/// A 32-bit linear address.
///
/// The lower 16 bits are the *base*, taken from the address field of data records. The upper
/// 16 bits are the *extension*, set by extended linear address records.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LinearAddress(u32);

impl LinearAddress {
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Combines an extension and a base into `(extension << 16) | base`.
    pub const fn from_parts(extension: u16, base: u16) -> Self {
        Self((extension as u32) << 16 | base as u32)
    }

    pub const fn value(self) -> u32 {
        self.0
    }

    /// The lower 16 bits.
    pub const fn base(self) -> u16 {
        self.0 as u16
    }

    /// The upper 16 bits.
    pub const fn extension(self) -> u16 {
        (self.0 >> 16) as u16
    }

    /// Returns the address with its lower 16 bits replaced.
    pub const fn with_base(self, base: u16) -> Self {
        Self::from_parts(self.extension(), base)
    }

    /// Returns the address with its upper 16 bits replaced.
    pub const fn with_extension(self, extension: u16) -> Self {
        Self::from_parts(extension, self.base())
    }
}

impl From<LinearAddress> for u32 {
    fn from(address: LinearAddress) -> Self {
        address.0
    }
}

impl fmt::Debug for LinearAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LinearAddress({:#010X})", self.0)
    }
}

impl fmt::Display for LinearAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010X}", self.0)
    }
}

/// {0} records are not supported
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error, docsplay::Display)]
pub struct UnsupportedRecord(pub RecordType);

/// What the assembler has to do with a record after it has passed the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The record's payload belongs at this linear address.
    Data(LinearAddress),
    /// The record contributes no bytes.
    Skip,
    /// The end-of-file record was reached, nothing after it is consumed.
    End,
}

/// Tracks the current and the first linear address over a stream of records.
///
/// The first address is latched per half: its base is taken from the first data record and its
/// extension from the first extended linear address record. Together they form the origin of
/// the assembled image.
#[derive(Debug, Default, Clone)]
pub struct AddressTracker {
    current: LinearAddress,
    first: LinearAddress,
    base_latched: bool,
    extension_latched: bool,
}

impl AddressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// The address of the most recent data record, combined with the current extension.
    pub fn current(&self) -> LinearAddress {
        self.current
    }

    /// The origin of the image.
    pub fn first(&self) -> LinearAddress {
        self.first
    }

    /// Feeds one record into the tracker.
    pub fn track(&mut self, record: &Record) -> Result<Step, UnsupportedRecord> {
        match record.record_type() {
            RecordType::Data => {
                let base = record.address();
                self.current = self.current.with_base(base);
                if !self.base_latched {
                    self.first = self.first.with_base(base);
                    self.base_latched = true;
                }
                tracing::trace!("Data record at {}", self.current);

                Ok(Step::Data(self.current))
            }
            RecordType::EndOfFile => Ok(Step::End),
            RecordType::ExtendedSegmentAddress => Err(UnsupportedRecord(record.record_type())),
            RecordType::StartSegmentAddress | RecordType::StartLinearAddress => Ok(Step::Skip),
            RecordType::ExtendedLinearAddress => {
                // The record type guarantees a two byte payload.
                let &[high, low] = record.payload() else {
                    return Ok(Step::Skip);
                };
                let extension = u16::from_be_bytes([high, low]);

                self.current = self.current.with_extension(extension);
                if !self.extension_latched {
                    self.first = self.first.with_extension(extension);
                    self.extension_latched = true;
                }
                tracing::debug!("Address extension set to {:#06X}", extension);

                Ok(Step::Skip)
            }
        }
    }
}
