#![cfg(feature = "serde")]

mod support;

use serde_json::json;

use support::{Document, semicircles};

#[test]
fn serialize_activity() {
    let mut record = Vec::new();
    record.extend_from_slice(&semicircles(-45.0).to_le_bytes());
    record.extend_from_slice(&semicircles(22.5).to_le_bytes());
    record.push(140);

    let doc = Document::new()
        .definition(0, 20, &[(0, 4, 0x85), (1, 4, 0x85), (3, 1, 0x02)])
        .data(0, &record)
        .definition(1, 21, &[(253, 4, 0x86)])
        .data(1, &0u32.to_le_bytes())
        .build();

    let activity = cassette::parse(&doc).unwrap();

    assert_eq!(
        serde_json::to_value(&activity).unwrap(),
        json!({
            "sessions": [],
            "laps": [],
            "records": [{
                "fields": {
                    "heart_rate": 140,
                    "position_lat": -45.0,
                    "position_long": 22.5,
                },
                "point": [22.5, -45.0],
            }],
            "events": [{
                "fields": { "timestamp": "1989-12-31T00:00:00Z" },
            }],
        })
    );
}
