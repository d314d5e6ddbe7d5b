//! Field values of data records.

use alloc::{string::String, vec::Vec};

use chrono::{DateTime, Utc};

use super::definition::FieldDefinition;

/// Degrees per semicircle, the fixed-point unit of positions.
pub const SEMICIRCLE: f64 = 180.0 / 2_147_483_648.0;

/// Seconds from the Unix epoch to the FIT epoch, 1989-12-31T00:00:00Z.
pub const FIT_EPOCH: i64 = 631_065_600;

/// How a field's decoded value is adjusted before publishing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldKind {
    /// Semicircles, converted to degrees.
    Position,
    /// Seconds since the FIT epoch, converted to a calendar time.
    Time,
    /// Published unchanged.
    #[default]
    Plain,
}

/// A base type, identified by the low five bits of a base type byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseType {
    /// `enum`
    Enum,
    /// `sint8`
    SInt8,
    /// `uint8`
    UInt8,
    /// `sint16`
    SInt16,
    /// `uint16`
    UInt16,
    /// `sint32`
    SInt32,
    /// `uint32`
    UInt32,
    /// `string`
    String,
    /// `float32`
    Float32,
    /// `float64`
    Float64,
    /// `uint8z`
    UInt8Z,
    /// `uint16z`
    UInt16Z,
    /// `uint32z`
    UInt32Z,
    /// `byte`
    Byte,
    /// `sint64`
    SInt64,
    /// `uint64`
    UInt64,
    /// `uint64z`
    UInt64Z,
    /// A base type number outside the profile; decoded as raw bytes.
    Unknown(u8),
}

impl BaseType {
    pub fn from_number(n: u8) -> Self {
        match n {
            0x00 => Self::Enum,
            0x01 => Self::SInt8,
            0x02 => Self::UInt8,
            0x03 => Self::SInt16,
            0x04 => Self::UInt16,
            0x05 => Self::SInt32,
            0x06 => Self::UInt32,
            0x07 => Self::String,
            0x08 => Self::Float32,
            0x09 => Self::Float64,
            0x0A => Self::UInt8Z,
            0x0B => Self::UInt16Z,
            0x0C => Self::UInt32Z,
            0x0D => Self::Byte,
            0x0E => Self::SInt64,
            0x0F => Self::UInt64,
            0x10 => Self::UInt64Z,
            n => Self::Unknown(n),
        }
    }

    /// Width of a single element of this base type.
    pub fn element_size(self) -> usize {
        match self {
            Self::Enum
            | Self::SInt8
            | Self::UInt8
            | Self::String
            | Self::UInt8Z
            | Self::Byte
            | Self::Unknown(_) => 1,
            Self::SInt16 | Self::UInt16 | Self::UInt16Z => 2,
            Self::SInt32 | Self::UInt32 | Self::Float32 | Self::UInt32Z => 4,
            Self::Float64 | Self::SInt64 | Self::UInt64 | Self::UInt64Z => 8,
        }
    }
}

/// A decoded field value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(untagged))]
pub enum Value {
    Unsigned(u64),
    Signed(i64),
    Float(f64),
    /// A position, in degrees.
    Degrees(f64),
    Timestamp(DateTime<Utc>),
    String(String),
    /// Bytes of a field whose size does not fit its base type.
    Bytes(Vec<u8>),
    Array(Vec<Value>),
}

impl Value {
    /// Convert this value to a Rust type, if it holds a compatible value.
    pub fn extract<T: FromValue>(&self) -> Option<T> {
        T::from_value(self)
    }

    /// Apply the adjustment for a kind of field.
    pub fn with_kind(self, kind: FieldKind) -> Self {
        match (kind, self) {
            (_, Value::Array(values)) => {
                Value::Array(values.into_iter().map(|v| v.with_kind(kind)).collect())
            }
            (FieldKind::Position, Value::Signed(x)) => Value::Degrees(x as f64 * SEMICIRCLE),
            (FieldKind::Position, Value::Unsigned(x)) => Value::Degrees(x as f64 * SEMICIRCLE),
            (FieldKind::Time, Value::Unsigned(x)) => timestamp(x as i64),
            (FieldKind::Time, Value::Signed(x)) => timestamp(x),
            (_, value) => value,
        }
    }
}

fn timestamp(seconds: i64) -> Value {
    match FIT_EPOCH
        .checked_add(seconds)
        .and_then(|s| DateTime::<Utc>::from_timestamp(s, 0))
    {
        Some(time) => Value::Timestamp(time),
        None => Value::Signed(seconds),
    }
}

/// A field value along with whether it held its base type's 'invalid' marker.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub value: Value,
    pub is_invalid: bool,
}

/// Decode the bytes of one field of a data record.
///
/// `r` must hold exactly the field's bytes. Fields holding a single element
/// decode to a scalar, fields holding several to an array, and string fields
/// to the text before the first NUL. Semantic adjustment is not applied.
pub fn decode_field(r: &[u8], definition: &FieldDefinition) -> Decoded {
    let base_type = definition.base_type;
    let is_le = definition.is_little_endian;
    let width = base_type.element_size();

    match base_type {
        BaseType::String => {
            let end = r.iter().position(|&b| b == 0).unwrap_or(r.len());
            Decoded {
                value: Value::String(String::from_utf8_lossy(&r[..end]).into_owned()),
                is_invalid: end == 0,
            }
        }
        BaseType::Unknown(_) => Decoded {
            value: Value::Bytes(r.to_vec()),
            is_invalid: false,
        },
        _ if r.len() == width => decode_element(base_type, r, is_le),
        _ if !r.is_empty() && r.len() % width == 0 => {
            let elements: Vec<_> = r
                .chunks_exact(width)
                .map(|r| decode_element(base_type, r, is_le))
                .collect();

            Decoded {
                is_invalid: elements.iter().all(|e| e.is_invalid),
                value: Value::Array(elements.into_iter().map(|e| e.value).collect()),
            }
        }
        _ => Decoded {
            value: Value::Bytes(r.to_vec()),
            is_invalid: false,
        },
    }
}

macro_rules! read {
    ($r:expr, $is_le:expr, $t:ty) => {{
        let mut bytes = [0; size_of::<$t>()];
        bytes.copy_from_slice($r);
        if $is_le {
            <$t>::from_le_bytes(bytes)
        } else {
            <$t>::from_be_bytes(bytes)
        }
    }};
}

/// Decode a single element. `r` must be exactly one element wide.
fn decode_element(base_type: BaseType, r: &[u8], is_le: bool) -> Decoded {
    let (value, is_invalid) = match base_type {
        BaseType::Enum | BaseType::UInt8 | BaseType::Byte => {
            let x = read!(r, is_le, u8);
            (Value::Unsigned(x.into()), x == u8::MAX)
        }
        BaseType::UInt8Z => {
            let x = read!(r, is_le, u8);
            (Value::Unsigned(x.into()), x == 0)
        }
        BaseType::SInt8 => {
            let x = read!(r, is_le, i8);
            (Value::Signed(x.into()), x == i8::MAX)
        }
        BaseType::UInt16 => {
            let x = read!(r, is_le, u16);
            (Value::Unsigned(x.into()), x == u16::MAX)
        }
        BaseType::UInt16Z => {
            let x = read!(r, is_le, u16);
            (Value::Unsigned(x.into()), x == 0)
        }
        BaseType::SInt16 => {
            let x = read!(r, is_le, i16);
            (Value::Signed(x.into()), x == i16::MAX)
        }
        BaseType::UInt32 => {
            let x = read!(r, is_le, u32);
            (Value::Unsigned(x.into()), x == u32::MAX)
        }
        BaseType::UInt32Z => {
            let x = read!(r, is_le, u32);
            (Value::Unsigned(x.into()), x == 0)
        }
        BaseType::SInt32 => {
            let x = read!(r, is_le, i32);
            (Value::Signed(x.into()), x == i32::MAX)
        }
        BaseType::UInt64 => {
            let x = read!(r, is_le, u64);
            (Value::Unsigned(x), x == u64::MAX)
        }
        BaseType::UInt64Z => {
            let x = read!(r, is_le, u64);
            (Value::Unsigned(x), x == 0)
        }
        BaseType::SInt64 => {
            let x = read!(r, is_le, i64);
            (Value::Signed(x), x == i64::MAX)
        }
        BaseType::Float32 => {
            let x = read!(r, is_le, f32);
            (Value::Float(x.into()), x.to_bits() == u32::MAX)
        }
        BaseType::Float64 => {
            let x = read!(r, is_le, f64);
            (Value::Float(x), x.to_bits() == u64::MAX)
        }
        BaseType::String | BaseType::Unknown(_) => (Value::Bytes(r.to_vec()), false),
    };

    Decoded { value, is_invalid }
}

/// Conversion from a decoded [`Value`].
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Option<Self>;
}

macro_rules! from_integer {
    ($($t:ty),*) => {$(
        impl FromValue for $t {
            fn from_value(value: &Value) -> Option<Self> {
                match value {
                    Value::Unsigned(x) => (*x).try_into().ok(),
                    Value::Signed(x) => (*x).try_into().ok(),
                    _ => None,
                }
            }
        }
    )*};
}

from_integer!(u8, u16, u32, u64, i8, i16, i32, i64);

impl FromValue for f64 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(x) | Value::Degrees(x) => Some(*x),
            Value::Unsigned(x) => Some(*x as f64),
            Value::Signed(x) => Some(*x as f64),
            _ => None,
        }
    }
}

impl FromValue for f32 {
    fn from_value(value: &Value) -> Option<Self> {
        f64::from_value(value).map(|x| x as f32)
    }
}

impl FromValue for DateTime<Utc> {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Timestamp(t) => Some(*t),
            _ => None,
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}
