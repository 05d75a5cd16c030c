//! Fixed-width record file (`cursos.dat`).
//!
//! The file has no header: it is a plain sequence of 76-byte little-endian records
//! laid out as `i32 code | [u8; 60] name | i32 hours | f64 cost`. Names are UTF-8,
//! NUL padded, and never cut in the middle of a multibyte character.

use thiserror::Error;

use super::{CourseCode, CourseRecord};

pub const NAME_LEN: usize = 60;
pub const RECORD_LEN: usize = 4 + NAME_LEN + 4 + 8;

#[derive(Debug, Error, PartialEq)]
pub enum BinaryError {
    #[error("record {index}: name is not valid UTF-8")]
    InvalidName { index: usize },

    #[error("record {index}: code {code} does not fit in 32 bits")]
    CodeOutOfRange { index: usize, code: String },

    #[error("record {index}: duration {hours} is not a whole number of hours")]
    FractionalHours { index: usize, hours: f64 },
}

/// Decodes every complete record in `bytes`. A trailing partial record is ignored.
pub fn decode_records(bytes: &[u8]) -> Result<Vec<CourseRecord>, BinaryError> {
    bytes
        .chunks_exact(RECORD_LEN)
        .enumerate()
        .map(|(index, chunk)| decode_record(index, chunk))
        .collect()
}

fn decode_record(index: usize, chunk: &[u8]) -> Result<CourseRecord, BinaryError> {
    let mut code = [0u8; 4];
    code.copy_from_slice(&chunk[0..4]);
    let raw_name = &chunk[4..4 + NAME_LEN];
    let mut hours = [0u8; 4];
    hours.copy_from_slice(&chunk[4 + NAME_LEN..8 + NAME_LEN]);
    let mut cost = [0u8; 8];
    cost.copy_from_slice(&chunk[8 + NAME_LEN..RECORD_LEN]);

    let name_len = raw_name.iter().position(|b| *b == 0).unwrap_or(NAME_LEN);
    let name = std::str::from_utf8(&raw_name[..name_len])
        .map_err(|_| BinaryError::InvalidName { index })?;

    Ok(CourseRecord {
        code: CourseCode::Int(i64::from(i32::from_le_bytes(code))),
        name: name.to_string(),
        duration_hours: f64::from(i32::from_le_bytes(hours)),
        cost: f64::from_le_bytes(cost),
    })
}

/// Encodes records in file order. Codes must be 32-bit integers and durations
/// whole hours; names longer than the field are truncated on a character boundary.
pub fn encode_records(records: &[CourseRecord]) -> Result<Vec<u8>, BinaryError> {
    let mut out = Vec::with_capacity(records.len() * RECORD_LEN);
    for (index, record) in records.iter().enumerate() {
        let code = match &record.code {
            CourseCode::Int(n) => i32::try_from(*n).ok(),
            CourseCode::Text(s) => s.trim().parse::<i32>().ok(),
        }
        .ok_or_else(|| BinaryError::CodeOutOfRange {
            index,
            code: record.code.to_string(),
        })?;
        if record.duration_hours.fract() != 0.0
            || record.duration_hours > f64::from(i32::MAX)
            || record.duration_hours < f64::from(i32::MIN)
        {
            return Err(BinaryError::FractionalHours {
                index,
                hours: record.duration_hours,
            });
        }

        out.extend_from_slice(&code.to_le_bytes());
        out.extend_from_slice(&truncate_name(&record.name));
        out.extend_from_slice(&(record.duration_hours as i32).to_le_bytes());
        out.extend_from_slice(&record.cost.to_le_bytes());
    }
    Ok(out)
}

fn truncate_name(name: &str) -> [u8; NAME_LEN] {
    let mut field = [0u8; NAME_LEN];
    let mut written = 0;
    for ch in name.chars() {
        let len = ch.len_utf8();
        if written + len > NAME_LEN {
            break;
        }
        ch.encode_utf8(&mut field[written..written + len]);
        written += len;
    }
    field
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_record(code: i32, name: &[u8], hours: i32, cost: f64) -> Vec<u8> {
        let mut out = code.to_le_bytes().to_vec();
        let mut field = [0u8; NAME_LEN];
        field[..name.len()].copy_from_slice(name);
        out.extend_from_slice(&field);
        out.extend_from_slice(&hours.to_le_bytes());
        out.extend_from_slice(&cost.to_le_bytes());
        out
    }

    #[test]
    fn record_is_76_bytes() {
        assert_eq!(RECORD_LEN, 76);
    }

    #[test]
    fn decodes_packed_layout() {
        let mut bytes = raw_record(7, "Introducción".as_bytes(), 30, 19999.5);
        bytes.extend(raw_record(8, b"Redes", 12, 60000.0));
        let records = decode_records(&bytes).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].code, CourseCode::Int(7));
        assert_eq!(records[0].name, "Introducción");
        assert_eq!(records[0].duration_hours, 30.0);
        assert_eq!(records[0].cost, 19999.5);
        assert_eq!(records[1].name, "Redes");
    }

    #[test]
    fn trailing_partial_record_is_ignored() {
        let mut bytes = raw_record(1, b"A", 1, 1.0);
        bytes.extend_from_slice(&[1, 2, 3]);
        assert_eq!(decode_records(&bytes).unwrap().len(), 1);
    }

    #[test]
    fn invalid_utf8_name_is_an_error() {
        let bytes = raw_record(1, &[0xff, 0xfe], 1, 1.0);
        assert_eq!(
            decode_records(&bytes),
            Err(BinaryError::InvalidName { index: 0 })
        );
    }

    #[test]
    fn long_names_truncate_on_char_boundary() {
        // 59 ASCII bytes followed by a two-byte character that does not fit.
        let name = format!("{}é", "a".repeat(59));
        let records = vec![CourseRecord::new(3, &name, 10.0, 5.0)];
        let bytes = encode_records(&records).unwrap();
        let decoded = decode_records(&bytes).unwrap();
        assert_eq!(decoded[0].name, "a".repeat(59));
    }

    #[test]
    fn text_codes_must_be_numeric_to_encode() {
        let records = vec![CourseRecord::new("AB", "x", 1.0, 1.0)];
        assert!(matches!(
            encode_records(&records),
            Err(BinaryError::CodeOutOfRange { index: 0, .. })
        ));
    }

    #[test]
    fn fractional_hours_cannot_be_encoded() {
        let records = vec![CourseRecord::new(1, "x", 1.5, 1.0)];
        assert!(matches!(
            encode_records(&records),
            Err(BinaryError::FractionalHours { index: 0, .. })
        ));
    }
}
