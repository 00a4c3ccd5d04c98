//! Loading of Intel HEX text into an [`Image`].

use std::io::BufRead;

use crate::address::{AddressTracker, Step, UnsupportedRecord};
use crate::config::ChecksumOptions;
use crate::error::HexError;
use crate::image::{Image, ImageBuilder};
use crate::record::Record;

/// Reads Intel HEX lines from `reader` and assembles them into an image.
///
/// Reading stops at the end-of-file record. The first malformed line or unsupported record
/// aborts the whole load. A missing end-of-file record is tolerated.
pub fn load_hex<R: BufRead>(reader: R, options: &ChecksumOptions) -> Result<Image, HexError> {
    let mut tracker = AddressTracker::new();
    let mut builder = ImageBuilder::new(options);
    let mut reached_end = false;

    for (index, line) in reader.split(b'\n').enumerate() {
        let line = line?;
        let line = line.strip_suffix(b"\r").unwrap_or(&line);
        let text = String::from_utf8_lossy(line);
        let number = index + 1;

        let record = Record::from_line(&text).map_err(|source| HexError::Format {
            line: number,
            text: text.to_string(),
            source,
        })?;

        let step = tracker
            .track(&record)
            .map_err(|UnsupportedRecord(record_type)| HexError::UnsupportedFeature {
                line: number,
                record_type,
            })?;

        match step {
            Step::Data(address) => {
                builder.add_data(address, tracker.first(), record.payload())?;
            }
            Step::Skip => {}
            Step::End => {
                reached_end = true;
                break;
            }
        }
    }

    if !reached_end {
        tracing::warn!("The input ended without an end-of-file record");
    }

    let image = builder.finish(tracker.first())?;
    tracing::debug!(
        "Assembled {} bytes starting at {}",
        image.len(),
        image.origin()
    );

    Ok(image)
}

/// Assembles an image from Intel HEX text held in memory.
pub fn load_hex_str(text: &str, options: &ChecksumOptions) -> Result<Image, HexError> {
    load_hex(text.as_bytes(), options)
}
