//! Message catalog resolving global message and field numbers.
//!
//! Decoding is driven by a [`Catalog`], which names fields, says how their
//! values are adjusted, and sorts messages into the collections of an
//! [`Activity`](crate::Activity). [`Profile`] bundles the part of the FIT
//! global profile describing activities. Applications needing other messages
//! can implement [`Catalog`] themselves, delegating to [`Profile`] as needed.

use crate::sans::data::FieldKind::{self, Plain, Position, Time};

/// Global message number of `file_id` messages.
pub const FILE_ID: u16 = 0;
/// Global message number of `session` messages.
pub const SESSION: u16 = 18;
/// Global message number of `lap` messages.
pub const LAP: u16 = 19;
/// Global message number of `record` messages.
pub const RECORD: u16 = 20;
/// Global message number of `event` messages.
pub const EVENT: u16 = 21;

/// Field definition number of the `timestamp` field shared by all messages.
pub const TIMESTAMP: u8 = 253;

/// The collection of an activity a message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// A track point.
    Record,
    Lap,
    Session,
    Event,
    /// Messages not collected into an activity.
    Other,
}

/// A catalog entry for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldInfo<'a> {
    pub name: &'a str,
    pub kind: FieldKind,
}

/// Read-only lookups resolving message and field numbers.
pub trait Catalog {
    /// Look up a field of a global message. Fields without an entry are
    /// decoded but not published.
    fn field(&self, global: u16, field: u8) -> Option<FieldInfo<'_>>;

    /// Sort a global message into an activity collection.
    fn category(&self, global: u16) -> Category {
        match global {
            RECORD => Category::Record,
            LAP => Category::Lap,
            SESSION => Category::Session,
            EVENT => Category::Event,
            _ => Category::Other,
        }
    }

    /// Name a global message, for diagnostics.
    fn message_name(&self, _global: u16) -> Option<&str> {
        None
    }
}

impl<C: Catalog + ?Sized> Catalog for &C {
    fn field(&self, global: u16, field: u8) -> Option<FieldInfo<'_>> {
        (**self).field(global, field)
    }

    fn category(&self, global: u16) -> Category {
        (**self).category(global)
    }

    fn message_name(&self, global: u16) -> Option<&str> {
        (**self).message_name(global)
    }
}

type Fields = &'static [(u8, &'static str, FieldKind)];

const MESSAGES: &[(u16, &str, Fields)] = &[
    (
        FILE_ID,
        "file_id",
        &[
            (0, "type", Plain),
            (1, "manufacturer", Plain),
            (2, "product", Plain),
            (3, "serial_number", Plain),
            (4, "time_created", Time),
            (5, "number", Plain),
            (8, "product_name", Plain),
        ],
    ),
    (
        3,
        "user_profile",
        &[
            (0, "friendly_name", Plain),
            (1, "gender", Plain),
            (2, "age", Plain),
            (3, "height", Plain),
            (4, "weight", Plain),
            (5, "language", Plain),
            (8, "resting_heart_rate", Plain),
            (11, "default_max_heart_rate", Plain),
        ],
    ),
    (
        12,
        "sport",
        &[(0, "sport", Plain), (1, "sub_sport", Plain), (3, "name", Plain)],
    ),
    (
        SESSION,
        "session",
        &[
            (0, "event", Plain),
            (1, "event_type", Plain),
            (2, "start_time", Time),
            (3, "start_position_lat", Position),
            (4, "start_position_long", Position),
            (5, "sport", Plain),
            (6, "sub_sport", Plain),
            (7, "total_elapsed_time", Plain),
            (8, "total_timer_time", Plain),
            (9, "total_distance", Plain),
            (10, "total_cycles", Plain),
            (11, "total_calories", Plain),
            (13, "total_fat_calories", Plain),
            (14, "avg_speed", Plain),
            (15, "max_speed", Plain),
            (16, "avg_heart_rate", Plain),
            (17, "max_heart_rate", Plain),
            (18, "avg_cadence", Plain),
            (19, "max_cadence", Plain),
            (20, "avg_power", Plain),
            (21, "max_power", Plain),
            (22, "total_ascent", Plain),
            (23, "total_descent", Plain),
            (25, "first_lap_index", Plain),
            (26, "num_laps", Plain),
            (29, "nec_lat", Position),
            (30, "nec_long", Position),
            (31, "swc_lat", Position),
            (32, "swc_long", Position),
            (TIMESTAMP, "timestamp", Time),
            (254, "message_index", Plain),
        ],
    ),
    (
        LAP,
        "lap",
        &[
            (0, "event", Plain),
            (1, "event_type", Plain),
            (2, "start_time", Time),
            (3, "start_position_lat", Position),
            (4, "start_position_long", Position),
            (5, "end_position_lat", Position),
            (6, "end_position_long", Position),
            (7, "total_elapsed_time", Plain),
            (8, "total_timer_time", Plain),
            (9, "total_distance", Plain),
            (10, "total_cycles", Plain),
            (11, "total_calories", Plain),
            (13, "avg_speed", Plain),
            (14, "max_speed", Plain),
            (15, "avg_heart_rate", Plain),
            (16, "max_heart_rate", Plain),
            (17, "avg_cadence", Plain),
            (18, "max_cadence", Plain),
            (19, "avg_power", Plain),
            (20, "max_power", Plain),
            (21, "total_ascent", Plain),
            (22, "total_descent", Plain),
            (24, "lap_trigger", Plain),
            (25, "sport", Plain),
            (TIMESTAMP, "timestamp", Time),
            (254, "message_index", Plain),
        ],
    ),
    (
        RECORD,
        "record",
        &[
            (0, "position_lat", Position),
            (1, "position_long", Position),
            (2, "altitude", Plain),
            (3, "heart_rate", Plain),
            (4, "cadence", Plain),
            (5, "distance", Plain),
            (6, "speed", Plain),
            (7, "power", Plain),
            (9, "grade", Plain),
            (13, "temperature", Plain),
            (73, "enhanced_speed", Plain),
            (78, "enhanced_altitude", Plain),
            (TIMESTAMP, "timestamp", Time),
        ],
    ),
    (
        EVENT,
        "event",
        &[
            (0, "event", Plain),
            (1, "event_type", Plain),
            (2, "data16", Plain),
            (3, "data", Plain),
            (4, "event_group", Plain),
            (TIMESTAMP, "timestamp", Time),
        ],
    ),
    (
        23,
        "device_info",
        &[
            (0, "device_index", Plain),
            (1, "device_type", Plain),
            (2, "manufacturer", Plain),
            (3, "serial_number", Plain),
            (4, "product", Plain),
            (5, "software_version", Plain),
            (6, "hardware_version", Plain),
            (10, "battery_voltage", Plain),
            (11, "battery_status", Plain),
            (TIMESTAMP, "timestamp", Time),
        ],
    ),
    (
        34,
        "activity",
        &[
            (0, "total_timer_time", Plain),
            (1, "num_sessions", Plain),
            (2, "type", Plain),
            (3, "event", Plain),
            (4, "event_type", Plain),
            (5, "local_timestamp", Time),
            (TIMESTAMP, "timestamp", Time),
        ],
    ),
    (
        49,
        "file_creator",
        &[(0, "software_version", Plain), (1, "hardware_version", Plain)],
    ),
    (78, "hrv", &[(0, "time", Plain)]),
];

/// The activity messages of the FIT global profile.
#[derive(Debug, Clone, Copy, Default)]
pub struct Profile;

impl Profile {
    fn message(global: u16) -> Option<(&'static str, Fields)> {
        MESSAGES
            .iter()
            .find(|(number, ..)| *number == global)
            .map(|(_, name, fields)| (*name, *fields))
    }
}

impl Catalog for Profile {
    fn field(&self, global: u16, field: u8) -> Option<FieldInfo<'_>> {
        let (_, fields) = Self::message(global)?;
        fields
            .iter()
            .find(|(number, ..)| *number == field)
            .map(|(_, name, kind)| FieldInfo { name: *name, kind: *kind })
    }

    fn message_name(&self, global: u16) -> Option<&str> {
        Self::message(global).map(|(name, _)| name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_fields() {
        assert_eq!(
            Profile.field(RECORD, 0),
            Some(FieldInfo {
                name: "position_lat",
                kind: Position
            })
        );
        assert_eq!(Profile.field(RECORD, TIMESTAMP).map(|f| f.kind), Some(Time));
        assert_eq!(Profile.field(RECORD, 200), None);
        assert_eq!(Profile.field(9999, 0), None);
    }

    #[test]
    fn categories() {
        assert_eq!(Profile.category(RECORD), Category::Record);
        assert_eq!(Profile.category(LAP), Category::Lap);
        assert_eq!(Profile.category(SESSION), Category::Session);
        assert_eq!(Profile.category(EVENT), Category::Event);
        assert_eq!(Profile.category(FILE_ID), Category::Other);
    }

    #[test]
    fn message_names() {
        assert_eq!(Profile.message_name(SESSION), Some("session"));
        assert_eq!(Profile.message_name(9999), None);
    }
}
