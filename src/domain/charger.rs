//! Charger view and nearest-charger selection
//!
//! Chargers are owned by the sibling charger service; this crate only reads
//! the subset of fields it needs to pick a station.

use serde::{Deserialize, Serialize};

use super::ids::ObjectId;
use super::location::{distance, Location};
use crate::shared::errors::DomainError;

/// Larger than any distance on Earth.
const NO_CANDIDATE_KM: f64 = 100_000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Charger {
    /// A payload whose id is not 24-hex fails to decode.
    pub id: ObjectId,
    #[serde(default)]
    pub name: String,
    pub location: Location,
    #[serde(default)]
    pub average_rating: f64,
}

/// Pick the charger closest to `location`.
///
/// Ties keep the earliest candidate in `candidates`. Fails with
/// [`DomainError::NoCandidates`] when nothing can be selected.
pub fn select_nearest(location: Location, candidates: &[Charger]) -> Result<&Charger, DomainError> {
    let mut nearest: Option<&Charger> = None;
    let mut min_km = NO_CANDIDATE_KM;

    for charger in candidates {
        let km = distance(location, charger.location);
        if km < min_km {
            min_km = km;
            nearest = Some(charger);
        }
    }

    nearest.ok_or(DomainError::NoCandidates)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn charger(name: &str, lat: f64, lon: f64) -> Charger {
        Charger {
            id: ObjectId::new(),
            name: name.to_string(),
            location: Location::new(lat, lon),
            average_rating: 0.0,
        }
    }

    #[test]
    fn picks_closest() {
        let here = Location::new(40.0, -3.0);
        let candidates = vec![charger("A", 40.1, -3.0), charger("B", 41.0, -3.0)];
        assert_eq!(select_nearest(here, &candidates).unwrap().name, "A");

        let reversed = vec![charger("B", 41.0, -3.0), charger("A", 40.1, -3.0)];
        assert_eq!(select_nearest(here, &reversed).unwrap().name, "A");
    }

    #[test]
    fn returns_global_minimum() {
        let here = Location::new(52.52, 13.405);
        let candidates = vec![
            charger("far", 48.85, 2.35),
            charger("mid", 52.0, 13.0),
            charger("near", 52.53, 13.41),
            charger("farther", -33.86, 151.2),
        ];
        let best = select_nearest(here, &candidates).unwrap();
        let min = candidates
            .iter()
            .map(|c| distance(here, c.location))
            .fold(f64::INFINITY, f64::min);
        assert_eq!(best.name, "near");
        assert_eq!(distance(here, best.location), min);
    }

    #[test]
    fn ties_keep_first_seen() {
        let here = Location::new(0.0, 0.0);
        let candidates = vec![
            charger("east", 0.0, 1.0),
            charger("west", 0.0, -1.0),
            charger("north", 1.0, 0.0),
        ];
        assert_eq!(select_nearest(here, &candidates).unwrap().name, "east");
    }

    #[test]
    fn empty_candidates_fail() {
        let err = select_nearest(Location::new(0.0, 0.0), &[]).unwrap_err();
        assert!(matches!(err, DomainError::NoCandidates));
    }

    #[test]
    fn antipodal_and_identical_candidates_rank() {
        let here = Location::new(0.0, 0.0);
        let candidates = vec![charger("antipode", 0.0, 180.0), charger("here", 0.0, 0.0)];
        assert_eq!(select_nearest(here, &candidates).unwrap().name, "here");

        let only_antipode = vec![charger("antipode", 0.0, 180.0)];
        assert_eq!(select_nearest(here, &only_antipode).unwrap().name, "antipode");
    }

    #[test]
    fn decodes_directory_payload() {
        let json = r#"{
            "id": "507f1f77bcf86cd799439011",
            "name": "Plaza Mayor",
            "location": {"longitude": -3.7, "latitude": 40.4},
            "averageRating": 4.5,
            "ratings": [],
            "comments": []
        }"#;
        let c: Charger = serde_json::from_str(json).unwrap();
        assert_eq!(c.id.to_hex(), "507f1f77bcf86cd799439011");
        assert_eq!(c.name, "Plaza Mayor");
        assert_eq!(c.location, Location::new(40.4, -3.7));
        assert_eq!(c.average_rating, 4.5);
    }

    #[test]
    fn non_hex_id_is_rejected_on_decode() {
        let json = r#"{"id": "charger-7", "location": {"longitude": -3.0, "latitude": 40.1}}"#;
        assert!(serde_json::from_str::<Charger>(json).is_err());
    }
}
