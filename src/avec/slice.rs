//! Slice-based decoder implementation.

use alloc::{collections::BTreeMap, string::String};

use either::Either::{Left, Right};
use thiserror::Error;

use crate::{
    profile::{Catalog, Category, TIMESTAMP},
    sans::{
        data::{Decoded, Value, decode_field},
        definition::{DefinitionError, DefinitionTable, MessageDefinition},
        header::{DocumentHeader, DocumentHeaderError, RecordHeader},
    },
};

use super::{Activity, Message, Options, Summary};

/// Errors occurring while decoding from a slice.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// Incorrect file header or checksum.
    #[error("Incorrect file header: {0}")]
    Header(#[from] DocumentHeaderError),
    /// A data record referenced a local message type with no definition.
    #[error("Local message type {0} has not been defined.")]
    UndefinedLocalMessageType(u8),
    /// Found a record this decoder cannot interpret.
    #[error("Unsupported feature: {0}.")]
    UnsupportedFeature(&'static str),
    /// A definition's data records would carry no bytes.
    #[error("Definition for local message type {0} declares no data bytes.")]
    MalformedDefinition(u8),
    /// A record extends past the end of the record stream.
    #[error("Record extends past the end of the record stream.")]
    EndOfData,
}

impl From<DefinitionError> for Error {
    fn from(err: DefinitionError) -> Self {
        match err {
            DefinitionError::UndefinedLocalMessageType(local) => {
                Self::UndefinedLocalMessageType(local)
            }
            DefinitionError::EndOfData => Self::EndOfData,
        }
    }
}

/// Field names giving the position of a track point.
const RECORD_POSITION: (&str, &str) = ("position_long", "position_lat");
/// Field names giving the position of a lap.
const LAP_POSITION: (&str, &str) = ("start_position_long", "start_position_lat");

/// Decode a document held in a slice.
///
/// This method is also re-exported as `cassette::avec::decode_slice`.
pub fn decode(
    r: &[u8],
    catalog: &(impl Catalog + ?Sized),
    options: Options,
) -> Result<Activity, Error> {
    let header = if options.check_crc {
        DocumentHeader::validate(r)?
    } else {
        DocumentHeader::decode(r)?
    };

    let end = header.crc_boundary()?; // Offset to the end of the record section.
    debug!(start = header.data_start(), end, "validated document header");

    // Records may not reach into the trailing CRC.
    let r = r.get(..end).ok_or(DocumentHeaderError::Truncated)?;

    let mut i = header.data_start();
    let mut definitions = DefinitionTable::new();
    let mut timestamp = None; // Most recent absolute timestamp, in FIT seconds.
    let mut activity = Activity::default();

    while i < end {
        let (local, successor) = RecordHeader(r[i]).classify();

        let length = match successor {
            Left(has_developer_data) => {
                let (definition, length) =
                    MessageDefinition::decode(r, i, local, has_developer_data, catalog)?;

                trace!(
                    local,
                    global = definition.global,
                    fields = definition.fields.len(),
                    "registered definition"
                );

                definitions.register(definition);
                length
            }
            Right(time_offset) => {
                let definition = definitions.lookup(local)?;
                let category = catalog.category(definition.global);

                let (message, length) = decode_data(
                    r,
                    i,
                    definition,
                    time_offset,
                    &mut timestamp,
                    category,
                    catalog,
                    options,
                )?;

                trace!(
                    local,
                    global = definition.global,
                    name = catalog.message_name(definition.global),
                    ?category,
                    length,
                    "decoded data record"
                );

                activity.push(category, message);
                length
            }
        };

        i += length;
    }

    Ok(activity)
}

#[allow(clippy::too_many_arguments)]
fn decode_data(
    r: &[u8],
    at: usize,
    definition: &MessageDefinition,
    time_offset: Option<u8>,
    timestamp: &mut Option<u32>,
    category: Category,
    catalog: &(impl Catalog + ?Sized),
    options: Options,
) -> Result<(Message, usize), Error> {
    let size = definition.payload_size();
    if size == 0 {
        Err(Error::MalformedDefinition(definition.local))?;
    }

    let payload = r.get(at + 1..at + 1 + size).ok_or(Error::EndOfData)?;

    let mut fields = BTreeMap::new();
    let mut j = 0;

    for field in &definition.fields {
        let bytes = &payload[j..j + field.size as usize];
        j += field.size as usize;

        let Decoded { value, is_invalid } = decode_field(bytes, field);

        if field.field == TIMESTAMP && !is_invalid {
            if let Value::Unsigned(x) = value {
                *timestamp = u32::try_from(x).ok();
            }
        }

        // Unnamed fields only advance the cursor.
        let Some(name) = &field.name else {
            continue;
        };

        if is_invalid && options.drop_invalid {
            continue;
        }

        fields.insert(name.clone(), value.with_kind(field.kind));
    }

    // Any developer fields fill the remainder of the payload, and are skipped.

    if let Some(offset) = time_offset {
        let Some(last) = *timestamp else {
            return Err(Error::UnsupportedFeature(
                "compressed timestamp without a preceding timestamp",
            ));
        };

        let resolved = resolve_time_offset(last, offset);
        *timestamp = Some(resolved);

        trace!(last, offset, resolved, "resolved compressed timestamp");

        if let Some(info) = catalog.field(definition.global, TIMESTAMP) {
            let value = Value::Unsigned(resolved.into()).with_kind(info.kind);
            fields.insert(String::from(info.name), value);
        }
    }

    let point = match category {
        Category::Record => position(&fields, RECORD_POSITION),
        Category::Lap => position(&fields, LAP_POSITION),
        _ => None,
    };

    let summary = (category == Category::Session).then(|| Summary {
        speed: fields.get("avg_speed").cloned(),
        distance: fields.get("total_distance").cloned(),
        time: fields.get("total_timer_time").cloned(),
        sport: fields.get("sport").cloned(),
    });

    let message = Message {
        fields,
        point,
        summary,
    };

    Ok((message, 1 + size))
}

/// Apply the 5-bit offset of a compressed timestamp header to the previous
/// absolute timestamp, allowing for a single rollover.
fn resolve_time_offset(last: u32, offset: u8) -> u32 {
    let offset = u32::from(offset & 0x1F);
    let base = last & !0x1F;

    if offset >= last & 0x1F {
        base.wrapping_add(offset)
    } else {
        base.wrapping_add(offset).wrapping_add(0x20)
    }
}

fn position(fields: &BTreeMap<String, Value>, (long, lat): (&str, &str)) -> Option<[f64; 2]> {
    match (fields.get(long), fields.get(lat)) {
        (Some(Value::Degrees(long)), Some(Value::Degrees(lat))) => Some([*long, *lat]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_offset_without_rollover() {
        assert_eq!(resolve_time_offset(0x1000_0010, 0x15), 0x1000_0015);
        assert_eq!(resolve_time_offset(0x1000_0010, 0x10), 0x1000_0010);
    }

    #[test]
    fn time_offset_with_rollover() {
        assert_eq!(resolve_time_offset(0x1000_001E, 0x02), 0x1000_0022);
    }
}
