//! Re-encoding of an image as Intel HEX records.

use std::io::Write;

use crate::address::LinearAddress;
use crate::image::Image;
use crate::record::{Record, MAX_PAYLOAD};

/// Iterator over the records describing an [`Image`], created by [`Image::records`].
///
/// An extended linear address record is emitted before the first data record and whenever the
/// upper 16 address bits change. Data records carry up to 16 bytes. The last record is always
/// the end-of-file record.
///
/// Records are cut every 16 bytes from the origin, not at 64 KiB boundaries. With an origin that
/// is not 16-byte aligned, one data record can straddle such a boundary; readers that wrap the
/// 16-bit address within its segment place the bytes past the boundary at the wrong address.
pub struct Records<'a> {
    image: &'a Image,
    offset: usize,
    extension: Option<u16>,
    finished: bool,
}

impl<'a> Records<'a> {
    fn new(image: &'a Image) -> Self {
        Self {
            image,
            offset: 0,
            extension: None,
            finished: false,
        }
    }
}

impl Iterator for Records<'_> {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        if self.finished {
            return None;
        }

        let data = self.image.as_bytes();
        let remaining = data.len() - self.offset;
        if remaining == 0 {
            self.finished = true;
            return Some(Record::end_of_file());
        }

        let address =
            LinearAddress::new(self.image.origin().value().wrapping_add(self.offset as u32));
        if self.extension != Some(address.extension()) {
            self.extension = Some(address.extension());
            return Some(Record::extended_linear_address(address.extension()));
        }

        let length = remaining.min(MAX_PAYLOAD);
        let chunk = &data[self.offset..self.offset + length];
        self.offset += length;

        Some(Record::data_chunk(address.base(), chunk))
    }
}

impl Image {
    /// Returns the records describing this image, in address order.
    pub fn records(&self) -> Records<'_> {
        Records::new(self)
    }

    /// Writes the image as Intel HEX text, one record per line.
    pub fn write_hex<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        for record in self.records() {
            writeln!(writer, "{record}")?;
        }
        writer.flush()
    }

    /// Returns the image as Intel HEX text.
    pub fn to_hex_string(&self) -> String {
        self.records()
            .map(|record| record.to_line() + "\n")
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::config::ChecksumOptions;
    use crate::crc::DEFAULT_POLYNOMIAL;
    use crate::image::{ImageBuilder, IMAGE_CAPACITY};
    use crate::loader::load_hex_str;
    use crate::record::RecordType;

    fn image_at(origin: u32, bytes: &[u8]) -> Image {
        let origin = LinearAddress::new(origin);
        let mut builder = ImageBuilder::with_capacity(0xFF, IMAGE_CAPACITY);
        builder.add_data(origin, origin, bytes).unwrap();
        builder.finish(origin).unwrap()
    }

    fn count(records: &[Record], record_type: RecordType) -> usize {
        records
            .iter()
            .filter(|record| record.record_type() == record_type)
            .count()
    }

    #[test]
    fn patched_single_word_image() {
        let mut image = image_at(0, &[0x48, 0x69]);
        image.apply_checksum(DEFAULT_POLYNOMIAL);

        insta::assert_snapshot!(image.to_hex_string().trim_end(), @r"
        :020000040000FA
        :04000000FFFFFFFF00
        :00000001FF
        ");
    }

    #[test]
    fn boundary_crossing_emits_new_extension() {
        let bytes: Vec<u8> = (0..40).collect();
        let image = image_at(0x0800_FFF0, &bytes);

        let lines: Vec<String> = image.records().map(|record| record.to_line()).collect();

        assert_eq!(
            lines,
            [
                ":020000040800F2",
                ":10FFF000000102030405060708090A0B0C0D0E0F89",
                ":020000040801F1",
                ":10000000101112131415161718191A1B1C1D1E1F78",
                ":080010002021222324252627CC",
                ":00000001FF",
            ]
        );
    }

    #[test]
    fn unaligned_origin_switches_extension_after_straddling_record() {
        let bytes: Vec<u8> = (0..32).collect();
        let image = image_at(0x0000_FFF8, &bytes);

        let lines: Vec<String> = image.records().map(|record| record.to_line()).collect();

        assert_eq!(
            lines,
            [
                ":020000040000FA",
                ":10FFF800000102030405060708090A0B0C0D0E0F81",
                ":020000040001F9",
                ":10000800101112131415161718191A1B1C1D1E1F70",
                ":00000001FF",
            ]
        );
    }

    #[test]
    fn record_counts_and_closure() {
        for (origin, length) in [
            (0x0000_0000, 4usize),
            (0x0800_0000, 100),
            (0x0001_FF00, 0x300),
        ] {
            let bytes: Vec<u8> = (0..length).map(|i| (i * 7) as u8).collect();
            let image = image_at(origin, &bytes);

            let records: Vec<Record> = image.records().collect();
            let extensions = (origin >> 16..=(origin + length as u32 - 1) >> 16).count();

            assert_eq!(count(&records, RecordType::Data), length.div_ceil(16));
            assert_eq!(
                count(&records, RecordType::ExtendedLinearAddress),
                extensions
            );
            assert_eq!(count(&records, RecordType::EndOfFile), 1);
            assert_eq!(records.last(), Some(&Record::end_of_file()));

            let decoded = load_hex_str(&image.to_hex_string(), &ChecksumOptions::default()).unwrap();
            assert_eq!(decoded, image);
        }
    }

    #[test]
    fn output_is_readable_by_ihex() {
        let bytes: Vec<u8> = (0..=255).collect();
        let image = image_at(0x2000_0000, &bytes);

        let text = image.to_hex_string();
        let mut data = Vec::new();
        for line in text.lines() {
            if let ihex::Record::Data { value, .. } = ihex::Record::from_record_string(line).unwrap() {
                data.extend(value);
            }
        }

        assert_eq!(data, bytes);
    }

    #[test]
    fn write_hex_matches_string() {
        let image = image_at(0x10, &[1, 2, 3, 4, 5, 6, 7, 8]);

        let mut buffer = Vec::new();
        image.write_hex(&mut buffer).unwrap();

        assert_eq!(String::from_utf8(buffer).unwrap(), image.to_hex_string());
    }
}
