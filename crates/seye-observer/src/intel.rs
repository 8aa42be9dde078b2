//! Fabricated target analysis and aircraft parameters.
//!
//! Stand-ins for an image classifier and a flight planner. Both are
//! pure functions of their input and the supplied generator and never
//! look at the track store.

use rand::Rng;
use rand::seq::IndexedRandom;
use seye_core::command::DeployOrder;
use seye_core::geo;
use seye_types::{AircraftParams, AnalysisReport, BoundingBox};

/// Labels the classifier can produce.
pub const THREAT_TAGS: [&str; 5] = ["Rafale", "Su-30MKI", "J-20", "F-16", "Mirage 2000"];

const FRIENDLY_TYPES: [&str; 5] = ["Su-30MKI", "Rafale", "Tejas", "Mirage 2000", "MiG-29"];
const HOSTILE_TYPES: [&str; 4] = ["J-20", "F-16", "JF-17", "J-10C"];
const FRIENDLY_WEAPON_STATES: [&str; 3] = ["ARMED", "STANDBY", "WEAPONS HOLD"];
const HOSTILE_WEAPON_STATES: [&str; 2] = ["ARMED", "UNKNOWN"];

/// Simulated classification of a selected target.
pub fn analyze<R: Rng + ?Sized>(rng: &mut R) -> AnalysisReport {
    let tag = THREAT_TAGS.choose(rng).copied().unwrap_or("F-16");
    let confidence: f64 = rng.random_range(85.0..99.9);

    AnalysisReport {
        tag_name: tag.to_owned(),
        probability: format!("{confidence:.2}"),
        bounding_box: BoundingBox {
            left: rng.random_range(0.0..0.5),
            top: rng.random_range(0.0..0.5),
            width: 0.4,
            height: 0.3,
        },
    }
}

/// Fabricated flight parameters for a planned deployment.
pub fn aircraft_params<R: Rng + ?Sized>(order: &DeployOrder, rng: &mut R) -> AircraftParams {
    let friendly = order.affiliation.is_friendly();
    let (types, weapons): (&[&str], &[&str]) = if friendly {
        (&FRIENDLY_TYPES, &FRIENDLY_WEAPON_STATES)
    } else {
        (&HOSTILE_TYPES, &HOSTILE_WEAPON_STATES)
    };

    let distance_km = geo::haversine_km(order.from, order.to);
    let altitude_ft = rng.random_range(30..=80_u32).saturating_mul(500);
    let velocity_kmh = rng.random_range(700..=1800_u32);
    let fuel_pct = rng.random_range(55..=100_u32);
    let eta_min = distance_km / f64::from(velocity_kmh) * 60.0;

    AircraftParams {
        aircraft_type: types.choose(rng).copied().unwrap_or("UNKNOWN").to_owned(),
        altitude: format!("{altitude_ft} ft"),
        velocity: format!("{velocity_kmh} km/h"),
        fuel_level: format!("{fuel_pct}%"),
        weapon_status: weapons.choose(rng).copied().unwrap_or("UNKNOWN").to_owned(),
        eta: format!("{eta_min:.0} min"),
        distance_km,
        bearing: geo::initial_bearing(order.from, order.to),
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use seye_types::{Affiliation, Position};

    use super::*;

    fn order(affiliation: Affiliation) -> DeployOrder {
        DeployOrder {
            name: "EAGLE-1".to_owned(),
            from: Position::new(28.6139, 77.2090),
            to: Position::new(19.0760, 72.8777),
            affiliation,
        }
    }

    #[test]
    fn analysis_stays_in_documented_ranges() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            let report = analyze(&mut rng);
            assert!(THREAT_TAGS.contains(&report.tag_name.as_str()));
            let p: f64 = report.probability.parse().unwrap_or_default();
            assert!((85.0..=99.9).contains(&p));
            assert_eq!(report.probability.split('.').nth(1).map(str::len), Some(2));
            assert!((0.0..0.5).contains(&report.bounding_box.left));
            assert!((0.0..0.5).contains(&report.bounding_box.top));
        }
    }

    #[test]
    fn hostile_params_use_hostile_airframes() {
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..50 {
            let params = aircraft_params(&order(Affiliation::Hostile), &mut rng);
            assert!(HOSTILE_TYPES.contains(&params.aircraft_type.as_str()));
            assert!(HOSTILE_WEAPON_STATES.contains(&params.weapon_status.as_str()));
        }
    }

    #[test]
    fn params_carry_route_geometry() {
        let mut rng = StdRng::seed_from_u64(3);
        let params = aircraft_params(&order(Affiliation::Friendly), &mut rng);
        assert!((params.distance_km - 1150.0).abs() < 10.0);
        // Delhi to Mumbai heads south-south-west.
        assert!((200.0..215.0).contains(&params.bearing));
        assert!(params.altitude.ends_with(" ft"));
        assert!(params.eta.ends_with(" min"));
    }
}
