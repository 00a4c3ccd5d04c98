use crate::record::{RecordError, RecordType};

/// Any error that stops the assembly of an image.
///
/// Every variant is fatal. There is no partial result: either the whole image is assembled and
/// checksummed, or the run stops at the first one of these.
#[derive(Debug, thiserror::Error, docsplay::Display)]
pub enum HexError {
    /// Line {line} could not be decoded: {source}
    #[ignore_extra_doc_attributes]
    ///
    /// `line` is 1-based, `text` holds the raw line as it was read (without the line terminator).
    Format {
        line: usize,
        text: String,
        #[source]
        source: RecordError,
    },

    /// Line {line} is an {record_type} record, which is not supported.
    UnsupportedFeature { line: usize, record_type: RecordType },

    /// The image needs {required} bytes, but it is limited to {capacity} bytes.
    CapacityExceeded { required: u64, capacity: usize },

    /// The input does not contain any data bytes.
    EmptyImage,

    /// An I/O error occurred while reading the input.
    Io(#[from] std::io::Error),
}
