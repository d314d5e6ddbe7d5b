//! Convenience interfaces for decoding whole documents.
//!
//! The functions in this module decode a complete document into an
//! [`Activity`], holding its sessions, laps, track points and events in
//! document order. Fields are named by a [`Catalog`]; those the catalog does
//! not know are skipped.
//!
//! Decoded messages can be converted into application types through the
//! [`FromMessage`] trait, which can be derived. See the
//! [`FromMessage`](macro@FromMessage) macro for details.

use alloc::{collections::BTreeMap, string::String, vec::Vec};

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::{
    profile::{Catalog, Profile},
    sans::data::{FromValue, Value},
};

pub use crate::profile::Category;

#[cfg(feature = "std")]
pub mod reader;
pub mod slice;

#[cfg(feature = "std")]
pub use reader::decode as decode_reader;
pub use slice::decode as decode_slice;

/// Decode a document using the bundled [`Profile`] and default [`Options`].
pub fn parse(r: &[u8]) -> Result<Activity, slice::Error> {
    slice::decode(r, &Profile, Options::default())
}

/// Decode a document using a custom catalog and options.
pub fn parse_with(
    r: &[u8],
    catalog: &(impl Catalog + ?Sized),
    options: Options,
) -> Result<Activity, slice::Error> {
    slice::decode(r, catalog, options)
}

/// Settings adjusting how a document is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Verify the header and document checksums (default `true`).
    ///
    /// Structural checks on the header are always applied.
    pub check_crc: bool,
    /// Skip fields holding their base type's 'invalid' marker value (default
    /// `false`).
    pub drop_invalid: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            check_crc: true,
            drop_invalid: false,
        }
    }
}

impl Options {
    pub fn check_crc(mut self, check_crc: bool) -> Self {
        self.check_crc = check_crc;
        self
    }

    pub fn drop_invalid(mut self, drop_invalid: bool) -> Self {
        self.drop_invalid = drop_invalid;
        self
    }
}

/// The messages of a document, sorted by category.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Activity {
    pub sessions: Vec<Message>,
    pub laps: Vec<Message>,
    /// Track points.
    pub records: Vec<Message>,
    pub events: Vec<Message>,
}

impl Activity {
    /// Convert each session into an application type.
    pub fn sessions_as<T: FromMessage>(&self) -> impl Iterator<Item = T> {
        self.sessions.iter().map(T::from_message)
    }

    /// Convert each lap into an application type.
    pub fn laps_as<T: FromMessage>(&self) -> impl Iterator<Item = T> {
        self.laps.iter().map(T::from_message)
    }

    /// Convert each track point into an application type.
    pub fn records_as<T: FromMessage>(&self) -> impl Iterator<Item = T> {
        self.records.iter().map(T::from_message)
    }

    /// Convert each event into an application type.
    pub fn events_as<T: FromMessage>(&self) -> impl Iterator<Item = T> {
        self.events.iter().map(T::from_message)
    }

    pub(crate) fn push(&mut self, category: Category, message: Message) {
        match category {
            Category::Record => self.records.push(message),
            Category::Lap => self.laps.push(message),
            Category::Session => self.sessions.push(message),
            Category::Event => self.events.push(message),
            Category::Other => {}
        }
    }
}

/// A decoded data message.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Message {
    /// Field values by catalog name.
    pub fields: BTreeMap<String, Value>,
    /// Longitude and latitude in degrees, for track points and laps with a
    /// known position.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub point: Option<[f64; 2]>,
    /// Totals, for sessions.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub summary: Option<Summary>,
}

impl Message {
    /// Retrieve a field value.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Retrieve a field value converted to a Rust type.
    pub fn get<T: FromValue>(&self, name: &str) -> Option<T> {
        self.field(name).and_then(|v| v.extract())
    }
}

/// Totals of a session.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Summary {
    /// Average speed.
    pub speed: Option<Value>,
    /// Total distance.
    pub distance: Option<Value>,
    /// Total timer time.
    pub time: Option<Value>,
    pub sport: Option<Value>,
}

/// Derive [`FromMessage`] for a struct representing a single message.
///
/// _Requires Cargo feature `derive`._
///
/// # Examples
///
/// To receive a field, add the `field("name")` attribute to an `Option<T>`
/// struct field, where `name` is the catalog name of the field and `T` is a
/// type implementing [`FromValue`]. Fields missing from the message, or holding
/// a value `T` cannot represent, are left as `None`.
///
/// To receive the position of a track point or lap, supply `point` in place
/// of a name, on a field of type `Option<[f64; 2]>`.
///
/// ```
/// #[derive(Debug, Default, FromMessage)]
/// struct TrackPoint {
///     #[field(point)]
///     point: Option<[f64; 2]>,
///     #[field("timestamp")]
///     timestamp: Option<DateTime<Utc>>,
///     #[field("heart_rate")]
///     heart_rate: Option<u8>,
/// }
/// ```
///
/// To receive arbitrary types, supply an accumulator closure. Since the value
/// type cannot be inferred, the second argument must be typed.
///
/// ```
/// #[derive(Debug, Default, FromMessage)]
/// struct Lap {
///     #[field("total_distance", |d, cm: u32| *d = cm as f64 / 100.0)]
///     distance_m: f64,
/// }
/// ```
#[cfg(feature = "derive")]
pub use cassette_derive::FromMessage;

/// Build an application type from a decoded message.
///
/// See the [`FromMessage`](macro@FromMessage) derive macro for an automatic
/// implementation of this trait.
pub trait FromMessage {
    fn from_message(message: &Message) -> Self;
}

impl FromMessage for Message {
    fn from_message(message: &Message) -> Self {
        message.clone()
    }
}
