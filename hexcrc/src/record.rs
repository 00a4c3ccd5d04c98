//! Transcoding of single Intel HEX lines.
//!
//! A line has the shape `:BBAAAATT[DD...]CC`. [`Record::from_line`] turns such a line into a
//! [`Record`] and verifies its checksum, [`Record::to_line`] does the reverse and always
//! produces uppercase digits.

use std::fmt;
use std::str::FromStr;

/// The maximum number of payload bytes a single record can carry.
pub const MAX_PAYLOAD: usize = 16;

const START_CODE: u8 = b':';
const BYTE_COUNT_OFFSET: usize = 1;
const ADDRESS_OFFSET: usize = 3;
const RECORD_TYPE_OFFSET: usize = 7;
const DATA_OFFSET: usize = 9;
/// The checksum of a record with a full payload sits in a fixed trailing slot.
const FULL_RECORD_CHECKSUM_OFFSET: usize = DATA_OFFSET + 2 * MAX_PAYLOAD;
/// Start code, byte count, address, type and checksum.
const MIN_LINE_LENGTH: usize = DATA_OFFSET + 2;

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Errors that can occur while transcoding a single record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, docsplay::Display)]
pub enum RecordError {
    /// The line does not start with ':'.
    MissingStartCode,

    /// The line is too short ({length} characters).
    TooShort { length: usize },

    /// Invalid hex digit in column {column}.
    InvalidHexDigit { column: usize },

    /// The byte count {0} exceeds the maximum of 16 bytes per record.
    ByteCountTooLarge(u8),

    /// A payload of {0} bytes does not fit into a single record.
    PayloadTooLong(usize),

    /// Unknown record type {0:#04x}.
    UnknownRecordType(u8),

    /// A {record_type} record can not carry {byte_count} bytes.
    UnexpectedByteCount {
        record_type: RecordType,
        byte_count: u8,
    },

    /// Unexpected characters after the checksum in column {column}.
    TrailingCharacters { column: usize },

    /// Checksum mismatch: expected {expected:#04X}, found {found:#04X}.
    ChecksumMismatch { expected: u8, found: u8 },
}

/// The kind of a record, as given by its type field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RecordType {
    /// Payload bytes at a 16-bit address.
    Data = 0x00,
    /// Marks the end of the file.
    EndOfFile = 0x01,
    /// 20-bit segment base address. Never supported by the assembler.
    ExtendedSegmentAddress = 0x02,
    /// CS:IP start address of an 80x86 program.
    StartSegmentAddress = 0x03,
    /// Upper 16 bits of all following 32-bit linear addresses.
    ExtendedLinearAddress = 0x04,
    /// 32-bit start address.
    StartLinearAddress = 0x05,
}

impl RecordType {
    /// The byte count a record of this type must have, if it is fixed.
    fn fixed_byte_count(self) -> Option<u8> {
        match self {
            RecordType::Data => None,
            RecordType::EndOfFile => Some(0),
            RecordType::ExtendedSegmentAddress | RecordType::ExtendedLinearAddress => Some(2),
            RecordType::StartSegmentAddress | RecordType::StartLinearAddress => Some(4),
        }
    }
}

impl TryFrom<u8> for RecordType {
    type Error = RecordError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(RecordType::Data),
            0x01 => Ok(RecordType::EndOfFile),
            0x02 => Ok(RecordType::ExtendedSegmentAddress),
            0x03 => Ok(RecordType::StartSegmentAddress),
            0x04 => Ok(RecordType::ExtendedLinearAddress),
            0x05 => Ok(RecordType::StartLinearAddress),
            other => Err(RecordError::UnknownRecordType(other)),
        }
    }
}

impl From<RecordType> for u8 {
    fn from(value: RecordType) -> Self {
        value as u8
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordType::Data => "data",
            RecordType::EndOfFile => "end-of-file",
            RecordType::ExtendedSegmentAddress => "extended segment address",
            RecordType::StartSegmentAddress => "start segment address",
            RecordType::ExtendedLinearAddress => "extended linear address",
            RecordType::StartLinearAddress => "start linear address",
        };
        f.write_str(name)
    }
}

/// One decoded line of an Intel HEX file.
///
/// The byte count and the checksum are not stored, they are derived from the payload.
/// A `Record` always satisfies the size constraints of its type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    record_type: RecordType,
    address: u16,
    data: Vec<u8>,
}

impl Record {
    /// Creates a new record, checking the payload length against the record type.
    pub fn new(
        record_type: RecordType,
        address: u16,
        data: impl Into<Vec<u8>>,
    ) -> Result<Self, RecordError> {
        let data = data.into();
        if data.len() > MAX_PAYLOAD {
            return Err(RecordError::PayloadTooLong(data.len()));
        }

        let byte_count = data.len() as u8;
        if record_type
            .fixed_byte_count()
            .is_some_and(|expected| expected != byte_count)
        {
            return Err(RecordError::UnexpectedByteCount {
                record_type,
                byte_count,
            });
        }

        Ok(Self {
            record_type,
            address,
            data,
        })
    }

    /// A data record carrying `data` at the 16-bit `address`.
    pub fn data(address: u16, data: &[u8]) -> Result<Self, RecordError> {
        Self::new(RecordType::Data, address, data)
    }

    /// A data record for a chunk the caller already limited to [`MAX_PAYLOAD`] bytes.
    pub(crate) fn data_chunk(address: u16, chunk: &[u8]) -> Self {
        debug_assert!(chunk.len() <= MAX_PAYLOAD);
        Self {
            record_type: RecordType::Data,
            address,
            data: chunk.to_vec(),
        }
    }

    /// The end-of-file record, `:00000001FF`.
    pub fn end_of_file() -> Self {
        Self {
            record_type: RecordType::EndOfFile,
            address: 0,
            data: Vec::new(),
        }
    }

    /// An extended linear address record setting the upper 16 address bits to `upper`.
    pub fn extended_linear_address(upper: u16) -> Self {
        Self {
            record_type: RecordType::ExtendedLinearAddress,
            address: 0,
            data: upper.to_be_bytes().to_vec(),
        }
    }

    pub fn record_type(&self) -> RecordType {
        self.record_type
    }

    /// The 16-bit address field, in host order.
    pub fn address(&self) -> u16 {
        self.address
    }

    pub fn payload(&self) -> &[u8] {
        &self.data
    }

    pub fn byte_count(&self) -> u8 {
        self.data.len() as u8
    }

    /// The two's complement of the sum of all other fields.
    pub fn checksum(&self) -> u8 {
        let [address_high, address_low] = self.address.to_be_bytes();
        let sum = [
            self.byte_count(),
            address_high,
            address_low,
            self.record_type.into(),
        ]
        .iter()
        .chain(&self.data)
        .fold(0u8, |sum, byte| sum.wrapping_add(*byte));

        sum.wrapping_neg()
    }

    /// Decodes a single line, without its line terminator.
    pub fn from_line(line: &str) -> Result<Self, RecordError> {
        let line = line.as_bytes();

        if line.first() != Some(&START_CODE) {
            return Err(RecordError::MissingStartCode);
        }
        if line.len() < MIN_LINE_LENGTH {
            return Err(RecordError::TooShort { length: line.len() });
        }

        let byte_count = read_hex_byte(line, BYTE_COUNT_OFFSET)?;
        if byte_count as usize > MAX_PAYLOAD {
            return Err(RecordError::ByteCountTooLarge(byte_count));
        }

        let address = u16::from_be_bytes([
            read_hex_byte(line, ADDRESS_OFFSET)?,
            read_hex_byte(line, ADDRESS_OFFSET + 2)?,
        ]);
        let record_type = RecordType::try_from(read_hex_byte(line, RECORD_TYPE_OFFSET)?)?;

        let checksum_offset = checksum_offset(byte_count);
        if line.len() < checksum_offset + 2 {
            return Err(RecordError::TooShort { length: line.len() });
        }

        let data = (0..byte_count as usize)
            .map(|index| read_hex_byte(line, DATA_OFFSET + 2 * index))
            .collect::<Result<Vec<_>, _>>()?;
        let found = read_hex_byte(line, checksum_offset)?;

        if line.len() > checksum_offset + 2 {
            return Err(RecordError::TrailingCharacters {
                column: checksum_offset + 3,
            });
        }

        let record = Self::new(record_type, address, data)?;
        let expected = record.checksum();
        if found != expected {
            return Err(RecordError::ChecksumMismatch { expected, found });
        }

        Ok(record)
    }

    /// Encodes the record as a line, without a line terminator.
    pub fn to_line(&self) -> String {
        let byte_count = self.byte_count();
        let checksum_offset = checksum_offset(byte_count);
        let [address_high, address_low] = self.address.to_be_bytes();

        let mut line = vec![b'0'; checksum_offset + 2];
        line[0] = START_CODE;
        write_hex_byte(&mut line, BYTE_COUNT_OFFSET, byte_count);
        write_hex_byte(&mut line, ADDRESS_OFFSET, address_high);
        write_hex_byte(&mut line, ADDRESS_OFFSET + 2, address_low);
        write_hex_byte(&mut line, RECORD_TYPE_OFFSET, self.record_type.into());
        for (index, byte) in self.data.iter().enumerate() {
            write_hex_byte(&mut line, DATA_OFFSET + 2 * index, *byte);
        }
        write_hex_byte(&mut line, checksum_offset, self.checksum());

        line.into_iter().map(char::from).collect()
    }
}

impl FromStr for Record {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_line(s)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_line())
    }
}

/// Character offset of the checksum field for a record with `byte_count` payload bytes.
fn checksum_offset(byte_count: u8) -> usize {
    if byte_count as usize == MAX_PAYLOAD {
        FULL_RECORD_CHECKSUM_OFFSET
    } else {
        DATA_OFFSET + 2 * byte_count as usize
    }
}

fn read_hex_byte(line: &[u8], offset: usize) -> Result<u8, RecordError> {
    let nibble = |offset: usize| {
        line.get(offset)
            .and_then(|&c| char::from(c).to_digit(16))
            .map(|digit| digit as u8)
            .ok_or(RecordError::InvalidHexDigit { column: offset + 1 })
    };

    Ok(nibble(offset)? << 4 | nibble(offset + 1)?)
}

fn write_hex_byte(line: &mut [u8], offset: usize, value: u8) {
    line[offset] = HEX_DIGITS[(value >> 4) as usize];
    line[offset + 1] = HEX_DIGITS[(value & 0xF) as usize];
}
