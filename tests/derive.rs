#![allow(dead_code)]
#![cfg(feature = "derive")]

mod support;

use cassette::avec::{FromMessage, Message};
use chrono::{DateTime, Utc};

use support::{Document, semicircles};

#[derive(Debug, Default, FromMessage)]
struct TrackPoint {
    #[field(point)]
    point: Option<[f64; 2]>,
    #[field("timestamp")]
    timestamp: Option<DateTime<Utc>>,
    #[field("heart_rate")]
    heart_rate: Option<u8>,
    #[field("altitude", |a, raw: u16| *a = Some(raw as f64 / 5.0 - 500.0))]
    altitude_m: Option<f64>,
    #[field("temperature")]
    temperature: Option<i8>,
}

#[derive(Debug, Default, FromMessage)]
struct Session {
    #[field("sport")]
    sport: Option<u8>,
    #[field("total_distance", |d, cm: u32| *d = cm as f64 / 100.0)]
    distance_m: f64,
}

fn document() -> Vec<u8> {
    let mut record = Vec::new();
    record.extend_from_slice(&semicircles(-45.0).to_le_bytes());
    record.extend_from_slice(&semicircles(22.5).to_le_bytes());
    record.push(151);
    record.extend_from_slice(&2_600u16.to_le_bytes());
    record.extend_from_slice(&600u32.to_le_bytes());

    let mut session = vec![1];
    session.extend_from_slice(&4_200_000u32.to_le_bytes());

    Document::new()
        .definition(
            0,
            20,
            &[(0, 4, 0x85), (1, 4, 0x85), (3, 1, 0x02), (2, 2, 0x84), (253, 4, 0x86)],
        )
        .data(0, &record)
        .definition(1, 18, &[(5, 1, 0x00), (9, 4, 0x86)])
        .data(1, &session)
        .build()
}

#[test]
fn derive_track_point() {
    let activity = cassette::parse(&document()).unwrap();
    let points: Vec<TrackPoint> = activity.records_as().collect();

    assert_eq!(points.len(), 1);
    let point = &points[0];

    assert_eq!(point.point, Some([22.5, -45.0]));
    assert_eq!(
        point.timestamp,
        DateTime::<Utc>::from_timestamp(631_065_600 + 600, 0)
    );
    assert_eq!(point.heart_rate, Some(151));
    assert_eq!(point.altitude_m, Some(20.0));
    // Not present in the document.
    assert_eq!(point.temperature, None);
}

#[test]
fn derive_session() {
    let activity = cassette::parse(&document()).unwrap();
    let sessions: Vec<Session> = activity.sessions_as().collect();

    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].sport, Some(1));
    assert_eq!(sessions[0].distance_m, 42_000.0);
}

#[test]
fn mismatched_type_is_skipped() {
    let activity = cassette::parse(&document()).unwrap();

    #[derive(Debug, Default, FromMessage)]
    struct Narrow {
        // A timestamp cannot be read as an integer.
        #[field("timestamp")]
        timestamp: Option<u32>,
    }

    let narrow = Narrow::from_message(&activity.records[0]);
    assert_eq!(narrow.timestamp, None);

    let message = Message::from_message(&activity.records[0]);
    assert_eq!(message, activity.records[0]);
}
