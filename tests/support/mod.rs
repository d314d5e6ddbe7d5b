#![allow(dead_code)]

use cassette::sans::check::compute_crc;

/// Builds FIT documents byte by byte.
#[derive(Default)]
pub struct Document {
    records: Vec<u8>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a little-endian definition record. Fields are `(number, size, base type)`.
    pub fn definition(self, local: u8, global: u16, fields: &[(u8, u8, u8)]) -> Self {
        self.definition_with(0x40 | local, 0, global.to_le_bytes(), fields)
    }

    /// Append a big-endian definition record.
    pub fn definition_be(self, local: u8, global: u16, fields: &[(u8, u8, u8)]) -> Self {
        self.definition_with(0x40 | local, 1, global.to_be_bytes(), fields)
    }

    fn definition_with(
        mut self,
        header: u8,
        architecture: u8,
        global: [u8; 2],
        fields: &[(u8, u8, u8)],
    ) -> Self {
        self.records
            .extend_from_slice(&[header, 0, architecture, global[0], global[1]]);
        self.records.push(fields.len() as u8);
        for &(field, size, base_type) in fields {
            self.records.extend_from_slice(&[field, size, base_type]);
        }
        self
    }

    /// Append a little-endian definition record followed by developer fields,
    /// given as sizes.
    pub fn definition_dev(
        mut self,
        local: u8,
        global: u16,
        fields: &[(u8, u8, u8)],
        developer: &[u8],
    ) -> Self {
        self = self.definition_with(0x60 | local, 0, global.to_le_bytes(), fields);
        self.records.push(developer.len() as u8);
        for (i, &size) in developer.iter().enumerate() {
            self.records.extend_from_slice(&[i as u8, size, 0]);
        }
        self
    }

    /// Append a data record with a normal header.
    pub fn data(self, local: u8, payload: &[u8]) -> Self {
        self.raw(&[local & 0x0F]).raw(payload)
    }

    /// Append a data record with a compressed timestamp header.
    pub fn compressed(self, local: u8, offset: u8, payload: &[u8]) -> Self {
        self.raw(&[0x80 | (local & 0x03) << 5 | (offset & 0x1F)])
            .raw(payload)
    }

    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.records.extend_from_slice(bytes);
        self
    }

    /// Build a document with a 12-byte header.
    pub fn build(&self) -> Vec<u8> {
        let mut doc = header(12, self.records.len() as u32);
        doc.extend_from_slice(&self.records);
        let crc = compute_crc(0, &doc);
        doc.extend_from_slice(&crc.to_le_bytes());
        doc
    }

    /// Build a document with a 14-byte header carrying its own checksum.
    pub fn build_extended(&self) -> Vec<u8> {
        let mut doc = header(14, self.records.len() as u32);
        let crc = compute_crc(0, &doc);
        doc.extend_from_slice(&crc.to_le_bytes());
        doc.extend_from_slice(&self.records);
        let crc = compute_crc(0, &doc[14..]);
        doc.extend_from_slice(&crc.to_le_bytes());
        doc
    }
}

fn header(size: u8, data_len: u32) -> Vec<u8> {
    let mut h = vec![size, 0x20, 0x4F, 0x08];
    h.extend_from_slice(&data_len.to_le_bytes());
    h.extend_from_slice(b".FIT");
    h
}

/// Recompute the trailing checksum of a document built with a 12-byte header.
pub fn reseal(doc: &mut [u8]) {
    let end = doc.len() - 2;
    let crc = compute_crc(0, &doc[..end]);
    doc[end..].copy_from_slice(&crc.to_le_bytes());
}

/// Semicircles for a number of degrees.
pub fn semicircles(degrees: f64) -> i32 {
    (degrees * 2_147_483_648.0 / 180.0) as i32
}
