//! Intel HEX reader and writer.
//!
//! A record is `:LLAAAATT<data>CC` where `LL` is the data length, `AAAA` the
//! load address, `TT` the record type and `CC` the two's complement of the
//! sum of every preceding byte of the record.

use std::fmt::Write;
use thiserror::Error;

use crate::ADDRESS_SPACE;

const RECORD_DATA: u8 = 0x00;
const RECORD_EOF: u8 = 0x01;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HexError {
    #[error("line {line}: record does not start with ':'")]
    MissingStartCode { line: usize },
    #[error("line {line}: invalid hex digits in record")]
    InvalidDigit { line: usize },
    #[error("line {line}: record too short")]
    ShortRecord { line: usize },
    #[error("line {line}: record declares {declared} data bytes but carries {actual}")]
    LengthMismatch {
        line: usize,
        declared: usize,
        actual: usize,
    },
    #[error("line {line}: checksum mismatch (expected {expected:02X}, found {found:02X})")]
    ChecksumMismatch { line: usize, expected: u8, found: u8 },
    #[error("line {line}: unknown record type {kind:02X}")]
    UnknownRecordType { line: usize, kind: u8 },
    #[error("line {line}: data extends past the 64K address space")]
    AddressOutOfRange { line: usize },
}

/// Two's complement of the byte sum, modulo 256.
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes
        .iter()
        .fold(0u8, |acc, &b| acc.wrapping_add(b))
        .wrapping_neg()
}

/// Parses an Intel HEX text into a flat image starting at address 0.
///
/// Data records land at their own load address; gaps are zero filled.
/// Parsing stops at the first end-of-file record. Segment and linear
/// address records (types 02 to 05) are accepted and ignored since the
/// image never leaves the 64K space.
pub fn parse(text: &str) -> Result<Vec<u8>, HexError> {
    let mut image = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let record = raw.trim();
        if record.is_empty() {
            continue;
        }
        let body = record
            .strip_prefix(':')
            .ok_or(HexError::MissingStartCode { line })?;
        let bytes = decode_digits(body).ok_or(HexError::InvalidDigit { line })?;
        if bytes.len() < 5 {
            return Err(HexError::ShortRecord { line });
        }

        let declared = bytes[0] as usize;
        let actual = bytes.len() - 5;
        if declared != actual {
            return Err(HexError::LengthMismatch {
                line,
                declared,
                actual,
            });
        }

        let (payload, found) = bytes.split_at(bytes.len() - 1);
        let expected = checksum(payload);
        if expected != found[0] {
            return Err(HexError::ChecksumMismatch {
                line,
                expected,
                found: found[0],
            });
        }

        let addr = ((bytes[1] as usize) << 8) | bytes[2] as usize;
        let data = &bytes[4..4 + declared];
        match bytes[3] {
            RECORD_DATA => {
                let end = addr + data.len();
                if end > ADDRESS_SPACE {
                    return Err(HexError::AddressOutOfRange { line });
                }
                if image.len() < end {
                    image.resize(end, 0);
                }
                image[addr..end].copy_from_slice(data);
            }
            RECORD_EOF => break,
            0x02..=0x05 => {}
            kind => return Err(HexError::UnknownRecordType { line, kind }),
        }
    }

    Ok(image)
}

/// Writes `image` as 16-byte data records followed by an end-of-file record.
pub fn encode(image: &[u8]) -> String {
    let mut out = String::new();
    for (chunk_idx, chunk) in image.chunks(16).enumerate() {
        let addr = (chunk_idx * 16) as u16;
        let mut record = vec![chunk.len() as u8, (addr >> 8) as u8, addr as u8, RECORD_DATA];
        record.extend_from_slice(chunk);
        record.push(checksum(&record));

        out.push(':');
        for b in &record {
            let _ = write!(out, "{:02X}", b);
        }
        out.push('\n');
    }
    out.push_str(":00000001FF\n");
    out
}

fn decode_digits(body: &str) -> Option<Vec<u8>> {
    if body.len() % 2 != 0 || !body.is_ascii() {
        return None;
    }
    (0..body.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&body[i..i + 2], 16).ok())
        .collect()
}
