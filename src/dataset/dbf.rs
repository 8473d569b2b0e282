//! dBase III attribute table (.dbf) parsing and encoding.
//!
//! Shapefile attribute tables are plain dBase III: a fixed header, a run of
//! 32-byte field descriptors, then fixed-width records. Cell bytes are kept
//! verbatim; text is decoded through the table's language-driver codepage
//! only when a value is read.

use encoding_rs::{Encoding, WINDOWS_1250, WINDOWS_1251, WINDOWS_1252, WINDOWS_1253, WINDOWS_1254};

use super::Field;
use crate::error::DatasetError;

/// dBase III without memo file.
const VERSION_DBASE3: u8 = 0x03;

/// Field descriptor terminator byte.
const HEADER_TERMINATOR: u8 = 0x0D;

/// End-of-file marker.
const EOF_MARKER: u8 = 0x1A;

/// Record deletion flag values.
const FLAG_ACTIVE: u8 = b' ';
const FLAG_DELETED: u8 = b'*';

/// One attribute record: a deletion tombstone plus one raw cell per field.
#[derive(Debug, Clone)]
pub struct Row {
    /// Marked for deletion; compacted out when the dataset is saved.
    pub(crate) deleted: bool,

    /// Raw fixed-width cell bytes, parallel to the field list.
    pub(crate) cells: Vec<Vec<u8>>,
}

/// An in-memory dBase III table.
#[derive(Debug, Clone)]
pub struct DbfTable {
    /// Last-update date bytes (YY MM DD), carried over on save.
    pub(crate) last_update: [u8; 3],

    /// Language driver id selecting the text codepage.
    pub(crate) language_driver: u8,

    pub(crate) fields: Vec<Field>,
    pub(crate) rows: Vec<Row>,
}

impl DbfTable {
    /// Parse a complete .dbf file.
    pub fn parse(data: &[u8]) -> Result<Self, DatasetError> {
        if data.len() < 33 {
            return Err(DatasetError::InvalidFormat {
                file: "dbf",
                reason: "file too short for a table header".to_string(),
            });
        }

        let version = data[0];
        if version != VERSION_DBASE3 {
            return Err(DatasetError::InvalidFormat {
                file: "dbf",
                reason: format!("unsupported dBase version {version:#04x}"),
            });
        }

        let last_update = [data[1], data[2], data[3]];
        let record_count = u32::from_le_bytes([data[4], data[5], data[6], data[7]]) as usize;
        let header_len = u16::from_le_bytes([data[8], data[9]]) as usize;
        let record_len = u16::from_le_bytes([data[10], data[11]]) as usize;
        let language_driver = data[29];

        if header_len < 33 || header_len > data.len() || (header_len - 33) % 32 != 0 {
            return Err(DatasetError::InvalidFormat {
                file: "dbf",
                reason: format!("bad header length {header_len}"),
            });
        }
        if data[header_len - 1] != HEADER_TERMINATOR {
            return Err(DatasetError::InvalidFormat {
                file: "dbf",
                reason: "missing field descriptor terminator".to_string(),
            });
        }

        let field_count = (header_len - 33) / 32;
        let mut fields = Vec::with_capacity(field_count);
        for i in 0..field_count {
            let offset = 32 + i * 32;
            let descriptor = &data[offset..offset + 32];
            let field = Field::parse(descriptor).ok_or_else(|| DatasetError::InvalidFormat {
                file: "dbf",
                reason: format!(
                    "unsupported field type {:?} in descriptor {}",
                    descriptor[11] as char,
                    i + 1
                ),
            })?;
            fields.push(field);
        }

        let cell_total: usize = fields.iter().map(|f| f.length as usize).sum();
        if record_len != 1 + cell_total {
            return Err(DatasetError::InvalidFormat {
                file: "dbf",
                reason: format!(
                    "record length {record_len} does not match field widths ({})",
                    1 + cell_total
                ),
            });
        }

        let mut rows = Vec::with_capacity(record_count);
        let mut offset = header_len;
        for record in 1..=record_count {
            if offset + record_len > data.len() {
                return Err(DatasetError::TruncatedRecord {
                    file: "dbf",
                    record,
                    expected: record_len,
                    actual: data.len() - offset,
                });
            }

            let deleted = data[offset] == FLAG_DELETED;
            let mut cells = Vec::with_capacity(fields.len());
            let mut cell_offset = offset + 1;
            for field in &fields {
                let width = field.length as usize;
                cells.push(data[cell_offset..cell_offset + width].to_vec());
                cell_offset += width;
            }

            rows.push(Row { deleted, cells });
            offset += record_len;
        }

        Ok(DbfTable {
            last_update,
            language_driver,
            fields,
            rows,
        })
    }

    /// Encode the table back to .dbf bytes.
    pub fn encode(&self) -> Vec<u8> {
        let header_len = 32 + 32 * self.fields.len() + 1;
        let record_len = 1 + self
            .fields
            .iter()
            .map(|f| f.length as usize)
            .sum::<usize>();

        let mut out = Vec::with_capacity(header_len + self.rows.len() * record_len + 1);
        out.push(VERSION_DBASE3);
        out.extend_from_slice(&self.last_update);
        out.extend_from_slice(&(self.rows.len() as u32).to_le_bytes());
        out.extend_from_slice(&(header_len as u16).to_le_bytes());
        out.extend_from_slice(&(record_len as u16).to_le_bytes());
        out.extend_from_slice(&[0u8; 17]);
        out.push(self.language_driver);
        out.extend_from_slice(&[0u8; 2]);

        for field in &self.fields {
            out.extend_from_slice(&field.descriptor());
        }
        out.push(HEADER_TERMINATOR);

        for row in &self.rows {
            out.push(if row.deleted { FLAG_DELETED } else { FLAG_ACTIVE });
            for cell in &row.cells {
                out.extend_from_slice(cell);
            }
        }
        out.push(EOF_MARKER);

        out
    }

    /// Text codepage selected by the language driver byte. Unrecognized
    /// drivers fall back to Windows-1252.
    pub(crate) fn encoding(&self) -> &'static Encoding {
        match self.language_driver {
            0xC8 => WINDOWS_1250,
            0xC9 => WINDOWS_1251,
            0xCB => WINDOWS_1253,
            0xCA => WINDOWS_1254,
            _ => WINDOWS_1252,
        }
    }

    /// Decode one cell to trimmed text.
    pub(crate) fn cell_text(&self, row: usize, field: usize) -> String {
        let cell = &self.rows[row].cells[field];
        let (text, _, _) = self.encoding().decode(cell);
        text.trim_matches(|c| c == ' ' || c == '\0').to_string()
    }
}
