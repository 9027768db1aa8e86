//! Reservation domain entity

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ids::ObjectId;

/// RFC3339 timestamp, UTC, microsecond precision.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// A charging slot reserved by a user on a charger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: ObjectId,
    #[serde(rename = "chargerID")]
    pub charger_id: ObjectId,
    #[serde(rename = "userID")]
    pub user_id: ObjectId,
    pub from: String,
    pub to: String,
    pub created: String,
    pub modified: String,
}

/// Everything the caller supplies when creating a reservation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReservation {
    pub charger_id: ObjectId,
    pub user_id: ObjectId,
    pub from: String,
    pub to: String,
}

impl Reservation {
    /// Materialize a new record with a fresh id; created == modified.
    pub fn create(new: NewReservation, now: DateTime<Utc>) -> Self {
        let stamp = format_timestamp(now);
        Self {
            id: ObjectId::new(),
            charger_id: new.charger_id,
            user_id: new.user_id,
            from: new.from,
            to: new.to,
            created: stamp.clone(),
            modified: stamp,
        }
    }

    /// Move the time window. `modified` always moves forward, even when the
    /// clock has not advanced since the previous write.
    pub fn reschedule(&mut self, from: String, to: String, now: DateTime<Utc>) {
        self.from = from;
        self.to = to;
        self.modified = next_modified(&self.modified, now);
    }
}

/// Timestamp for a write happening at `now` on a record last modified at
/// `previous`, strictly later than `previous`.
pub fn next_modified(previous: &str, now: DateTime<Utc>) -> String {
    let stamp = match DateTime::parse_from_rfc3339(previous) {
        Ok(prev) => {
            let prev = prev.with_timezone(&Utc);
            if now > prev {
                now
            } else {
                prev + Duration::microseconds(1)
            }
        }
        Err(_) => now,
    };
    format_timestamp(stamp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> NewReservation {
        NewReservation {
            charger_id: ObjectId::parse("64b7f0c2a1b2c3d4e5f60718").unwrap(),
            user_id: ObjectId::parse("64b7f0c2a1b2c3d4e5f60719").unwrap(),
            from: "2024-05-01T10:00:00Z".into(),
            to: "2024-05-01T11:00:00Z".into(),
        }
    }

    #[test]
    fn create_sets_created_equal_to_modified() {
        let now = Utc.with_ymd_and_hms(2024, 4, 30, 12, 0, 0).unwrap();
        let r = Reservation::create(sample(), now);
        assert_eq!(r.created, "2024-04-30T12:00:00.000000Z");
        assert_eq!(r.created, r.modified);
        assert_eq!(r.from, "2024-05-01T10:00:00Z");
    }

    #[test]
    fn reschedule_moves_window_and_advances_modified() {
        let now = Utc.with_ymd_and_hms(2024, 4, 30, 12, 0, 0).unwrap();
        let mut r = Reservation::create(sample(), now);
        let created = r.created.clone();

        r.reschedule("2024-05-02T10:00:00Z".into(), "2024-05-02T12:00:00Z".into(), now);

        assert_eq!(r.from, "2024-05-02T10:00:00Z");
        assert_eq!(r.to, "2024-05-02T12:00:00Z");
        assert_eq!(r.created, created);
        assert!(r.modified > created);
        assert_eq!(r.modified, "2024-04-30T12:00:00.000001Z");
    }

    #[test]
    fn next_modified_uses_clock_when_it_moved() {
        let prev = "2024-04-30T12:00:00.000000Z";
        let now = Utc.with_ymd_and_hms(2024, 4, 30, 12, 0, 5).unwrap();
        assert_eq!(next_modified(prev, now), "2024-04-30T12:00:05.000000Z");
    }

    #[test]
    fn next_modified_tolerates_unparseable_previous() {
        let now = Utc.with_ymd_and_hms(2024, 4, 30, 12, 0, 5).unwrap();
        assert_eq!(next_modified("yesterday", now), "2024-04-30T12:00:05.000000Z");
    }

    #[test]
    fn serializes_with_wire_field_names() {
        let now = Utc.with_ymd_and_hms(2024, 4, 30, 12, 0, 0).unwrap();
        let r = Reservation::create(sample(), now);
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["chargerID"], "64b7f0c2a1b2c3d4e5f60718");
        assert_eq!(json["userID"], "64b7f0c2a1b2c3d4e5f60719");
        assert_eq!(json["created"], "2024-04-30T12:00:00.000000Z");
        assert_eq!(json["id"].as_str().unwrap().len(), 24);
    }
}
