//! Document header validation and record header classification.

use core::ops::Range;

use either::Either::{self, Left, Right};
use tartan_bitfield::bitfield;
use thiserror::Error;
use zerocopy::{
    FromBytes, Immutable, KnownLayout, Unaligned,
    byteorder::little_endian::{U16, U32},
};

use super::check::checksum_range;

/// Length of a document header without its checksum.
pub const BASIC_HEADER_LEN: usize = 12;
/// Length of a document header carrying its own checksum.
pub const EXTENDED_HEADER_LEN: usize = 14;

/// An error validating a document header.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DocumentHeaderError {
    /// Too few bytes to hold a document header.
    #[error("Too few bytes to hold a document header.")]
    TooSmall,
    /// Unknown header length.
    #[error("Unknown header length ({0}).")]
    BadHeaderSize(u8),
    /// Incorrect filetype marker.
    #[error("Missing '.FIT' file type marker.")]
    MissingSignature,
    /// Calculated and found header CRC values do not match.
    #[error("Calculated ({calculated}) and found ({found}) header CRC values do not match.")]
    HeaderCrcMismatch { found: u16, calculated: u16 },
    /// Calculated and found document CRC values do not match.
    #[error("Calculated ({calculated}) and found ({found}) document CRC values do not match.")]
    FileCrcMismatch { found: u16, calculated: u16 },
    /// The document ends before its trailing CRC.
    #[error("Document ends before its trailing CRC.")]
    Truncated,
}

#[repr(C)]
#[derive(FromBytes, KnownLayout, Immutable, Unaligned)]
struct FileHeader {
    header_size: u8,
    _protocol_version: u8,
    _profile_version: U16,
    data_size: U32,
    data_type: [u8; 4],
}

/// The validated layout of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentHeader {
    /// Length of the document header, 12 or 14.
    pub header_len: u8,
    /// Number of record bytes following the header.
    pub data_len: u32,
}

impl DocumentHeader {
    /// Offset of the first record.
    pub fn data_start(&self) -> usize {
        self.header_len as usize
    }

    /// Offset of the trailing CRC, one past the last record byte.
    ///
    /// Fails when the declared record length does not fit the address space.
    pub fn crc_boundary(&self) -> Result<usize, DocumentHeaderError> {
        usize::try_from(self.data_len)
            .ok()
            .and_then(|len| self.data_start().checked_add(len))
            .ok_or(DocumentHeaderError::Truncated)
    }

    /// The byte window holding the record stream.
    pub fn records(&self) -> Result<Range<usize>, DocumentHeaderError> {
        Ok(self.data_start()..self.crc_boundary()?)
    }

    /// Decode a document header, checking its length and file type marker.
    ///
    /// Checksums are not verified; see [`DocumentHeader::validate`].
    pub fn decode(r: &[u8]) -> Result<Self, DocumentHeaderError> {
        let bytes = r
            .get(..BASIC_HEADER_LEN)
            .ok_or(DocumentHeaderError::TooSmall)?;

        let FileHeader {
            header_size,
            data_size,
            data_type,
            ..
        } = FileHeader::read_from_bytes(bytes).map_err(|_| DocumentHeaderError::TooSmall)?;

        if !matches!(header_size as usize, BASIC_HEADER_LEN | EXTENDED_HEADER_LEN) {
            Err(DocumentHeaderError::BadHeaderSize(header_size))?;
        }

        if &data_type != b".FIT" {
            Err(DocumentHeaderError::MissingSignature)?;
        }

        Ok(Self {
            header_len: header_size,
            data_len: data_size.get(),
        })
    }

    /// Decode a document header and verify the header and document checksums.
    pub fn validate(r: &[u8]) -> Result<Self, DocumentHeaderError> {
        let header = Self::decode(r)?;
        header.check_header_crc(r)?;
        header.check_file_crc(r)?;
        Ok(header)
    }

    /// Verify the checksum stored in an extended header.
    ///
    /// Basic headers carry no checksum and always pass.
    pub fn check_header_crc(&self, r: &[u8]) -> Result<(), DocumentHeaderError> {
        if self.data_start() != EXTENDED_HEADER_LEN {
            return Ok(());
        }

        let found = read_u16_le(r, BASIC_HEADER_LEN).ok_or(DocumentHeaderError::TooSmall)?;
        let calculated =
            checksum_range(r, 0..BASIC_HEADER_LEN).ok_or(DocumentHeaderError::TooSmall)?;

        if found != calculated {
            Err(DocumentHeaderError::HeaderCrcMismatch { found, calculated })?;
        }

        Ok(())
    }

    /// Verify the checksum following the record stream.
    ///
    /// A basic header is covered by the document checksum; an extended header
    /// is not, as it carries its own.
    pub fn check_file_crc(&self, r: &[u8]) -> Result<(), DocumentHeaderError> {
        let end = self.crc_boundary()?;
        let found = read_u16_le(r, end).ok_or(DocumentHeaderError::Truncated)?;

        let start = if self.data_start() == BASIC_HEADER_LEN {
            0
        } else {
            self.data_start()
        };
        let calculated = checksum_range(r, start..end).ok_or(DocumentHeaderError::Truncated)?;

        if found != calculated {
            Err(DocumentHeaderError::FileCrcMismatch { found, calculated })?;
        }

        Ok(())
    }
}

fn read_u16_le(r: &[u8], at: usize) -> Option<u16> {
    let bytes = r.get(at..at.checked_add(2)?)?;
    Some(u16::from_le_bytes([bytes[0], bytes[1]]))
}

/// The opening byte of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader(pub u8);

impl RecordHeader {
    /// Classify a record header.
    ///
    /// Returns the local message type, and either whether a definition record
    /// carries developer fields, or for data records, the time offset stored in
    /// a compressed timestamp header.
    pub fn classify(self) -> (u8, Either<bool, Option<u8>>) {
        bitfield! {
            struct Header(u8) {
                [7] is_compressed,
            }
        }

        if Header(self.0).is_compressed() {
            bitfield! {
                struct CompressedHeader(u8) {
                    [0..5] time_offset: u8,
                    [5..7] local_message: u8,
                }
            }

            let header = CompressedHeader(self.0);
            (header.local_message(), Right(Some(header.time_offset())))
        } else {
            bitfield! {
                struct NormalHeader(u8) {
                    [0..4] local_message: u8,
                    [5] has_developer_data,
                    [6] is_definition,
                }
            }

            let header = NormalHeader(self.0);

            let kind = if header.is_definition() {
                Left(header.has_developer_data())
            } else {
                Right(None)
            };

            (header.local_message(), kind)
        }
    }
}
