//! Definition records and the table of local message types.

use alloc::{string::String, vec::Vec};

use thiserror::Error;
use zerocopy::{FromBytes, Immutable, KnownLayout, Unaligned};

use super::data::{BaseType, FieldKind};
use crate::profile::Catalog;

/// Number of local message types a document may bind at once.
pub const LOCAL_MESSAGE_TYPES: usize = 16;

/// An error decoding or looking up a definition record.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DefinitionError {
    /// A data record referenced a local message type with no definition.
    #[error("Local message type {0} has not been defined.")]
    UndefinedLocalMessageType(u8),
    /// The definition record extends past the end of the record stream.
    #[error("Definition record extends past the end of the record stream.")]
    EndOfData,
}

#[repr(C)]
#[derive(Debug, FromBytes, KnownLayout, Immutable, Unaligned)]
struct DefinitionMessage {
    _reserved: u8,
    architecture: u8,
    global_message: [u8; 2],
    field_count: u8,
}

#[repr(C)]
#[derive(Debug, FromBytes, KnownLayout, Immutable, Unaligned)]
struct FieldHeader {
    field: u8,
    size: u8,
    base_type: u8,
}

/// The layout of one field of a data record.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDefinition {
    /// Field definition number, scoped to the global message.
    pub field: u8,
    /// Number of bytes the field occupies in a data record.
    pub size: u8,
    /// Whether the base type is wider than one byte.
    pub endian_ability: bool,
    /// Byte order, inherited from the owning definition.
    pub is_little_endian: bool,
    /// The base type, selected once from the base type byte.
    pub base_type: BaseType,
    /// Catalog name, or `None` for fields the catalog does not know.
    pub name: Option<String>,
    /// How decoded values are adjusted.
    pub kind: FieldKind,
}

/// The shape of the data records bound to a local message type.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageDefinition {
    pub local: u8,
    pub is_little_endian: bool,
    pub global: u16,
    pub fields: Vec<FieldDefinition>,
    /// Combined size of any developer fields, which are skipped.
    pub developer_size: usize,
}

impl MessageDefinition {
    /// Decode a definition record whose header byte sits at `at`.
    ///
    /// `r` must end at the end of the record stream. Field names and kinds are
    /// resolved through `catalog`.
    ///
    /// Returns the definition, and the length of the record including its
    /// header byte.
    pub fn decode(
        r: &[u8],
        at: usize,
        local: u8,
        has_developer_data: bool,
        catalog: &(impl Catalog + ?Sized),
    ) -> Result<(Self, usize), DefinitionError> {
        let mut i = at + 1;

        let DefinitionMessage {
            architecture,
            global_message,
            field_count,
            ..
        } = take(r, &mut i)?;

        let is_little_endian = architecture == 0;
        let global = if is_little_endian {
            u16::from_le_bytes(global_message)
        } else {
            u16::from_be_bytes(global_message)
        };

        let mut fields = Vec::with_capacity(field_count as usize);
        for _ in 0..field_count {
            let FieldHeader {
                field,
                size,
                base_type,
            } = take(r, &mut i)?;

            let (name, kind) = match catalog.field(global, field) {
                Some(info) => (Some(String::from(info.name)), info.kind),
                None => (None, FieldKind::Plain),
            };

            fields.push(FieldDefinition {
                field,
                size,
                endian_ability: base_type & 0x80 != 0,
                is_little_endian,
                base_type: BaseType::from_number(base_type & 0x1F),
                name,
                kind,
            });
        }

        let mut developer_size = 0;
        if has_developer_data {
            let [count] = take::<[u8; 1]>(r, &mut i)?;
            for _ in 0..count {
                // Field number, size, and developer data index.
                let [_, size, _] = take::<[u8; 3]>(r, &mut i)?;
                developer_size += size as usize;
            }
        }

        let definition = Self {
            local,
            is_little_endian,
            global,
            fields,
            developer_size,
        };

        Ok((definition, i - at))
    }

    /// Number of bytes following the header byte of a data record.
    pub fn payload_size(&self) -> usize {
        let fields: usize = self.fields.iter().map(|f| f.size as usize).sum();
        fields + self.developer_size
    }
}

/// Decode a fixed-layout structure from an offset, advancing the offset.
fn take<T: FromBytes>(r: &[u8], i: &mut usize) -> Result<T, DefinitionError> {
    let s = *i;
    *i += size_of::<T>();

    let bytes = r.get(s..*i).ok_or(DefinitionError::EndOfData)?;
    T::read_from_bytes(bytes).map_err(|_| DefinitionError::EndOfData)
}

/// The definitions currently bound to each local message type.
///
/// A document may rebind a local message type at any point; later definitions
/// replace earlier ones.
#[derive(Debug, Default)]
pub struct DefinitionTable {
    slots: [Option<MessageDefinition>; LOCAL_MESSAGE_TYPES],
}

impl DefinitionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a definition to its local message type.
    pub fn register(&mut self, definition: MessageDefinition) {
        let slot = definition.local as usize % LOCAL_MESSAGE_TYPES;
        self.slots[slot] = Some(definition);
    }

    /// Retrieve the definition bound to a local message type.
    pub fn lookup(&self, local: u8) -> Result<&MessageDefinition, DefinitionError> {
        self.slots
            .get(local as usize)
            .and_then(Option::as_ref)
            .ok_or(DefinitionError::UndefinedLocalMessageType(local))
    }
}
