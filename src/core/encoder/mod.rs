//! # Encoder Module
//!
//! Turns an [`OrchestrationOutcome`] (or a failure) into text for whoever
//! consumes it.
//!
//! ## Encoders
//! - [`LineEncoder`] - one `shape|||color` line for scripts and instrument software
//! - [`JsonEncoder`] - a JSON document with labels, colors and timings
//! - [`ReportEncoder`] - a labeled console report
//!
//! ## Text Encoding
//! The byte encoding is chosen per write with [`OutputEncoding`]; nothing
//! changes process-wide stream state.

mod json;
mod line;
mod report;

pub use json::JsonEncoder;
pub use line::{LineEncoder, FIELD_SEPARATOR, UNRECOGNIZED};
pub use report::ReportEncoder;

use crate::core::orchestrator::OrchestrationOutcome;
use crate::error::PlateError;
use std::io::Write;

/// Formats outcomes and failures as text
pub trait ResultEncoder {
    /// Render a successful run
    fn encode(&self, outcome: &OrchestrationOutcome) -> String;

    /// Render a failed run as a single diagnostic
    fn encode_failure(&self, error: &PlateError) -> String {
        format!("ERROR: {}: {}", error.stage(), error)
    }
}

/// Byte encoding applied to one write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputEncoding {
    #[default]
    Utf8,
    /// UTF-8 preceded by a byte order mark
    Utf8Bom,
    /// UTF-16 little endian preceded by a byte order mark
    Utf16Le,
    /// GBK, the ANSI code page of Simplified Chinese Windows.
    ///
    /// Characters outside GBK become numeric character references.
    Gbk,
}

impl OutputEncoding {
    /// Encode `text` into bytes
    pub fn encode(&self, text: &str) -> Vec<u8> {
        match self {
            OutputEncoding::Utf8 => text.as_bytes().to_vec(),
            OutputEncoding::Utf8Bom => {
                let mut bytes = vec![0xEF, 0xBB, 0xBF];
                bytes.extend_from_slice(text.as_bytes());
                bytes
            }
            OutputEncoding::Utf16Le => {
                let mut bytes = vec![0xFF, 0xFE];
                bytes.extend(text.encode_utf16().flat_map(|unit| unit.to_le_bytes()));
                bytes
            }
            OutputEncoding::Gbk => {
                let (bytes, _, _) = encoding_rs::GBK.encode(text);
                bytes.into_owned()
            }
        }
    }
}

/// Write `text` and a trailing newline to `writer` in `encoding`.
pub fn write_line<W: Write>(
    mut writer: W,
    text: &str,
    encoding: OutputEncoding,
) -> std::io::Result<()> {
    let mut line = String::with_capacity(text.len() + 1);
    line.push_str(text);
    line.push('\n');
    writer.write_all(&encoding.encode(&line))?;
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_is_passthrough() {
        assert_eq!(OutputEncoding::Utf8.encode("京A"), "京A".as_bytes());
    }

    #[test]
    fn utf8_bom_prefixes_marker() {
        let bytes = OutputEncoding::Utf8Bom.encode("A");
        assert_eq!(bytes, vec![0xEF, 0xBB, 0xBF, b'A']);
    }

    #[test]
    fn utf16le_encodes_cjk() {
        // 京 is U+4EAC
        let bytes = OutputEncoding::Utf16Le.encode("京A");
        assert_eq!(bytes, vec![0xFF, 0xFE, 0xAC, 0x4E, 0x41, 0x00]);
    }

    #[test]
    fn gbk_encodes_the_sentinel() {
        let bytes = OutputEncoding::Gbk.encode("未识别|||京A");
        assert_eq!(
            bytes,
            vec![0xCE, 0xB4, 0xCA, 0xB6, 0xB1, 0xF0, b'|', b'|', b'|', 0xBE, 0xA9, b'A']
        );
    }

    #[test]
    fn write_line_appends_newline_in_the_chosen_encoding() {
        let mut buffer = Vec::new();
        write_line(&mut buffer, "A|||B", OutputEncoding::Utf8).unwrap();
        assert_eq!(buffer, b"A|||B\n");

        let mut buffer = Vec::new();
        write_line(&mut buffer, "A", OutputEncoding::Utf16Le).unwrap();
        assert_eq!(buffer, vec![0xFF, 0xFE, 0x41, 0x00, 0x0A, 0x00]);
    }
}
