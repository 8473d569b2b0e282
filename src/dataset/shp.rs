//! Shapefile geometry (.shp) and index (.shx) handling.
//!
//! Geometry payloads are carried through opaquely; the only parts
//! interpreted are the shape type and the per-record extent, which are
//! needed to keep the file header honest after records are deleted. The
//! main file header mixes endianness: file code, lengths, and offsets are
//! big-endian, everything else little-endian.

use crate::error::DatasetError;

/// Magic number at the start of .shp and .shx files.
const FILE_CODE: i32 = 9994;

/// The only shapefile version ever issued.
const VERSION: i32 = 1000;

/// Shape type codes whose payload is a bare X,Y pair.
const POINT_TYPES: [i32; 3] = [1, 11, 21];

/// Null shape type (no geometry).
const NULL_SHAPE: i32 = 0;

/// An XY extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

impl BoundingBox {
    /// Grow this box to cover another.
    pub fn merge(&mut self, other: &BoundingBox) {
        self.x_min = self.x_min.min(other.x_min);
        self.y_min = self.y_min.min(other.y_min);
        self.x_max = self.x_max.max(other.x_max);
        self.y_max = self.y_max.max(other.y_max);
    }
}

/// One geometry record: its 1-based number and the raw content bytes
/// (shape type word included).
#[derive(Debug, Clone)]
pub struct ShapeRecord {
    pub(crate) number: i32,
    pub(crate) payload: Vec<u8>,
}

impl ShapeRecord {
    /// Shape type stored at the front of the payload.
    pub fn shape_type(&self) -> Option<i32> {
        let bytes = self.payload.get(..4)?;
        Some(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// XY extent of this record, if it carries one. Point payloads store a
    /// bare coordinate pair; every other non-null type opens with a box.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let shape_type = self.shape_type()?;
        if shape_type == NULL_SHAPE {
            return None;
        }

        if POINT_TYPES.contains(&shape_type) {
            if self.payload.len() < 20 {
                return None;
            }
            let x = read_f64(&self.payload, 4);
            let y = read_f64(&self.payload, 12);
            return Some(BoundingBox {
                x_min: x,
                y_min: y,
                x_max: x,
                y_max: y,
            });
        }

        if self.payload.len() < 36 {
            return None;
        }
        Some(BoundingBox {
            x_min: read_f64(&self.payload, 4),
            y_min: read_f64(&self.payload, 12),
            x_max: read_f64(&self.payload, 20),
            y_max: read_f64(&self.payload, 28),
        })
    }
}

/// An in-memory .shp file: header fields plus geometry records.
#[derive(Debug, Clone)]
pub struct ShpFile {
    pub(crate) shape_type: i32,
    pub(crate) bbox: BoundingBox,
    pub(crate) z_range: [f64; 2],
    pub(crate) m_range: [f64; 2],
    pub(crate) records: Vec<ShapeRecord>,
}

impl ShpFile {
    /// Parse a complete .shp file.
    pub fn parse(data: &[u8]) -> Result<Self, DatasetError> {
        if data.len() < 100 {
            return Err(DatasetError::InvalidFormat {
                file: "shp",
                reason: "file too short for a shapefile header".to_string(),
            });
        }

        let file_code = read_i32_be(data, 0);
        if file_code != FILE_CODE {
            return Err(DatasetError::InvalidFormat {
                file: "shp",
                reason: format!("bad file code {file_code}"),
            });
        }
        let version = read_i32_le(data, 28);
        if version != VERSION {
            return Err(DatasetError::InvalidFormat {
                file: "shp",
                reason: format!("unsupported version {version}"),
            });
        }

        let declared_len = read_i32_be(data, 24) as usize * 2;
        if declared_len != data.len() {
            tracing::warn!(
                declared = declared_len,
                actual = data.len(),
                "shapefile header length disagrees with file size"
            );
        }
        let end = declared_len.min(data.len());

        let shape_type = read_i32_le(data, 32);
        let bbox = BoundingBox {
            x_min: read_f64(data, 36),
            y_min: read_f64(data, 44),
            x_max: read_f64(data, 52),
            y_max: read_f64(data, 60),
        };
        let z_range = [read_f64(data, 68), read_f64(data, 76)];
        let m_range = [read_f64(data, 84), read_f64(data, 92)];

        let mut records = Vec::new();
        let mut offset = 100;
        while offset + 8 <= end {
            let number = read_i32_be(data, offset);
            let content_len = read_i32_be(data, offset + 4) as usize * 2;
            offset += 8;

            if offset + content_len > end {
                return Err(DatasetError::TruncatedRecord {
                    file: "shp",
                    record: records.len() + 1,
                    expected: content_len,
                    actual: end - offset,
                });
            }

            records.push(ShapeRecord {
                number,
                payload: data[offset..offset + content_len].to_vec(),
            });
            offset += content_len;
        }

        Ok(ShpFile {
            shape_type,
            bbox,
            z_range,
            m_range,
            records,
        })
    }

    /// Recompute the header extent from the surviving records. Z and M
    /// ranges are left alone. A file left with no boxed geometry keeps
    /// its previous extent.
    pub fn refresh_bounds(&mut self) {
        let mut merged: Option<BoundingBox> = None;
        for record in &self.records {
            if let Some(bbox) = record.bounding_box() {
                match merged.as_mut() {
                    Some(m) => m.merge(&bbox),
                    None => merged = Some(bbox),
                }
            }
        }
        if let Some(bbox) = merged {
            self.bbox = bbox;
        }
    }

    /// Encode the main file, recomputing the declared length.
    pub fn encode(&self) -> Vec<u8> {
        let content_words: usize = self
            .records
            .iter()
            .map(|r| 4 + r.payload.len() / 2)
            .sum();
        let mut out = Vec::with_capacity(100 + content_words * 2);
        self.write_header(&mut out, 50 + content_words);

        for record in &self.records {
            out.extend_from_slice(&record.number.to_be_bytes());
            out.extend_from_slice(&((record.payload.len() / 2) as i32).to_be_bytes());
            out.extend_from_slice(&record.payload);
        }

        out
    }

    /// Encode the .shx index for the current record set.
    pub fn encode_index(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(100 + self.records.len() * 8);
        self.write_header(&mut out, 50 + self.records.len() * 4);

        let mut offset_words = 50usize;
        for record in &self.records {
            let content_words = record.payload.len() / 2;
            out.extend_from_slice(&(offset_words as i32).to_be_bytes());
            out.extend_from_slice(&(content_words as i32).to_be_bytes());
            offset_words += 4 + content_words;
        }

        out
    }

    fn write_header(&self, out: &mut Vec<u8>, file_len_words: usize) {
        out.extend_from_slice(&FILE_CODE.to_be_bytes());
        out.extend_from_slice(&[0u8; 20]); // unused
        out.extend_from_slice(&(file_len_words as i32).to_be_bytes());
        out.extend_from_slice(&VERSION.to_le_bytes());
        out.extend_from_slice(&self.shape_type.to_le_bytes());
        out.extend_from_slice(&self.bbox.x_min.to_le_bytes());
        out.extend_from_slice(&self.bbox.y_min.to_le_bytes());
        out.extend_from_slice(&self.bbox.x_max.to_le_bytes());
        out.extend_from_slice(&self.bbox.y_max.to_le_bytes());
        out.extend_from_slice(&self.z_range[0].to_le_bytes());
        out.extend_from_slice(&self.z_range[1].to_le_bytes());
        out.extend_from_slice(&self.m_range[0].to_le_bytes());
        out.extend_from_slice(&self.m_range[1].to_le_bytes());
    }
}

fn read_i32_be(data: &[u8], offset: usize) -> i32 {
    i32::from_be_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

fn read_i32_le(data: &[u8], offset: usize) -> i32 {
    i32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

fn read_f64(data: &[u8], offset: usize) -> f64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&data[offset..offset + 8]);
    f64::from_le_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Point payload: shape type 1 plus an X,Y pair.
    fn point_payload(x: f64, y: f64) -> Vec<u8> {
        let mut payload = Vec::with_capacity(20);
        payload.extend_from_slice(&1i32.to_le_bytes());
        payload.extend_from_slice(&x.to_le_bytes());
        payload.extend_from_slice(&y.to_le_bytes());
        payload
    }

    fn build_point_file(points: &[(f64, f64)]) -> Vec<u8> {
        let file = ShpFile {
            shape_type: 1,
            bbox: BoundingBox {
                x_min: 0.0,
                y_min: 0.0,
                x_max: 0.0,
                y_max: 0.0,
            },
            z_range: [0.0, 0.0],
            m_range: [0.0, 0.0],
            records: points
                .iter()
                .enumerate()
                .map(|(i, &(x, y))| ShapeRecord {
                    number: i as i32 + 1,
                    payload: point_payload(x, y),
                })
                .collect(),
        };
        file.encode()
    }

    #[test]
    fn test_parse_point_file() {
        let data = build_point_file(&[(1.0, 2.0), (3.0, 4.0)]);
        let file = ShpFile::parse(&data).unwrap();

        assert_eq!(file.shape_type, 1);
        assert_eq!(file.records.len(), 2);
        assert_eq!(file.records[0].number, 1);
        assert_eq!(file.records[0].shape_type(), Some(1));
        assert_eq!(
            file.records[1].bounding_box(),
            Some(BoundingBox {
                x_min: 3.0,
                y_min: 4.0,
                x_max: 3.0,
                y_max: 4.0,
            })
        );
    }

    #[test]
    fn test_rejects_bad_file_code() {
        let mut data = build_point_file(&[(1.0, 2.0)]);
        data[0] = 0;

        let err = ShpFile::parse(&data).unwrap_err();
        assert!(matches!(err, DatasetError::InvalidFormat { file: "shp", .. }));
    }

    #[test]
    fn test_truncated_record() {
        let mut data = build_point_file(&[(1.0, 2.0)]);
        data.truncate(data.len() - 4);
        // Keep the declared length in sync so the record itself is short
        let words = (data.len() / 2) as i32;
        data[24..28].copy_from_slice(&words.to_be_bytes());

        let err = ShpFile::parse(&data).unwrap_err();
        assert!(matches!(
            err,
            DatasetError::TruncatedRecord { file: "shp", record: 1, .. }
        ));
    }

    #[test]
    fn test_refresh_bounds_after_delete() {
        let data = build_point_file(&[(1.0, 2.0), (10.0, 20.0)]);
        let mut file = ShpFile::parse(&data).unwrap();

        file.records.remove(1);
        file.refresh_bounds();

        assert_eq!(file.bbox.x_min, 1.0);
        assert_eq!(file.bbox.x_max, 1.0);
        assert_eq!(file.bbox.y_max, 2.0);
    }

    #[test]
    fn test_index_offsets() {
        let data = build_point_file(&[(1.0, 2.0), (3.0, 4.0)]);
        let file = ShpFile::parse(&data).unwrap();

        let index = file.encode_index();
        assert_eq!(index.len(), 100 + 2 * 8);
        // First record right after the header: offset 50 words, length 10
        assert_eq!(read_i32_be(&index, 100), 50);
        assert_eq!(read_i32_be(&index, 104), 10);
        // Second record: 50 + 4 (record header) + 10 (content)
        assert_eq!(read_i32_be(&index, 108), 64);
        assert_eq!(read_i32_be(&index, 112), 10);
    }

    #[test]
    fn test_polygon_bounding_box() {
        // Polygon payload: type 5, then the box; ring data not needed here
        let mut payload = Vec::new();
        payload.extend_from_slice(&5i32.to_le_bytes());
        payload.extend_from_slice(&(-5.0f64).to_le_bytes());
        payload.extend_from_slice(&(-6.0f64).to_le_bytes());
        payload.extend_from_slice(&7.0f64.to_le_bytes());
        payload.extend_from_slice(&8.0f64.to_le_bytes());
        payload.extend_from_slice(&[0u8; 8]); // part/point counts, unused

        let record = ShapeRecord { number: 1, payload };
        assert_eq!(
            record.bounding_box(),
            Some(BoundingBox {
                x_min: -5.0,
                y_min: -6.0,
                x_max: 7.0,
                y_max: 8.0,
            })
        );
    }
}
