use std::env;

use serial_test::serial;
use tripweaver_api::models::place::{NearbyPlace, PlaceRecord, Poi};
use tripweaver_api::models::policy::PlanningPolicy;
use tripweaver_api::services::{candidate_service, distance_service};

const CITY_LAT: f64 = 12.9716;
const CITY_LNG: f64 = 77.5946;
const KM_PER_DEG_LAT: f64 = 111.194_926_64;

fn raw_row(id: &str, km: f64, visit: Option<u32>, rating: Option<f64>) -> NearbyPlace {
    let lat = CITY_LAT + km / KM_PER_DEG_LAT;
    NearbyPlace {
        place: PlaceRecord {
            id: None,
            place_id: id.to_string(),
            name: format!("Place {}", id),
            description: None,
            city: Some("Bengaluru".to_string()),
            lat: Some(lat),
            lng: Some(CITY_LNG),
            avg_visit_mins: visit,
            rating,
            suitable_for: None,
            tags: None,
            created_at: None,
            updated_at: None,
        },
        distance_km: distance_service::distance_km(CITY_LAT, CITY_LNG, lat, CITY_LNG),
    }
}

fn row(id: &str, km: f64, visit: u32, rating: f64) -> NearbyPlace {
    raw_row(id, km, Some(visit), Some(rating))
}

fn select(rows: &[NearbyPlace], policy: &PlanningPolicy) -> candidate_service::CandidateSet {
    candidate_service::select_candidates(rows, "Bengaluru", CITY_LAT, CITY_LNG, policy)
}

#[test]
fn test_missing_catalog_values_get_defaults() {
    let policy = PlanningPolicy::default();
    let rows = vec![
        raw_row("bare", 5.0, None, None),
        raw_row("zeroed", 6.0, Some(0), Some(4.2)),
    ];
    let candidates = select(&rows, &policy);

    let bare = candidates.get("bare").unwrap();
    assert_eq!(bare.visit_minutes, policy.default_visit_minutes);
    assert_eq!(bare.rating, 0.0);

    // a zero duration is as useless as a missing one
    let zeroed = candidates.get("zeroed").unwrap();
    assert_eq!(zeroed.visit_minutes, policy.default_visit_minutes);
    assert_eq!(zeroed.rating, 4.2);
}

#[test]
fn test_rows_without_coordinates_are_skipped() {
    let policy = PlanningPolicy::default();
    let mut no_coords = row("floating", 5.0, 60, 4.0);
    no_coords.place.lat = None;
    let rows = vec![no_coords, row("anchored", 6.0, 60, 4.0)];

    let candidates = select(&rows, &policy);
    assert_eq!(candidates.len(), 1);
    assert!(candidates.get("floating").is_none());
    assert!(candidates.get("anchored").is_some());
}

#[test]
fn test_near_band_sorted_and_capped() {
    let policy = PlanningPolicy::default();
    // farthest first, so any ordering in the output is the selector's doing
    let rows: Vec<NearbyPlace> = (0..25)
        .map(|i| row(&format!("n{:02}", i), 26.0 - i as f64, 60, 4.0))
        .collect();

    let candidates = select(&rows, &policy);
    assert_eq!(candidates.len(), policy.near_cap);

    let ordered: Vec<&Poi> = candidates.iter().collect();
    assert_eq!(ordered[0].place_id, "n24"); // 1 km out
    for pair in ordered.windows(2) {
        assert!(pair[0].distance_from_city_km <= pair[1].distance_from_city_km);
    }
    // the cut keeps the closest, so nothing kept is farther than anything dropped
    assert!(ordered.last().unwrap().distance_from_city_km < 19.5);
}

#[test]
fn test_far_band_prefers_rating_over_proximity() {
    let policy = PlanningPolicy::default();
    let rows = vec![
        row("close-dull", 100.0, 120, 3.0),
        row("far-gem", 150.0, 120, 4.9),
        row("near-gem", 120.0, 120, 4.9),
    ];

    let candidates = select(&rows, &policy);
    let ids: Vec<&str> = candidates.iter().map(|p| p.place_id.as_str()).collect();
    assert_eq!(ids, vec!["near-gem", "far-gem", "close-dull"]);
}

#[test]
fn test_far_band_capped() {
    let policy = PlanningPolicy::default();
    let rows: Vec<NearbyPlace> = (0..15)
        .map(|i| row(&format!("f{:02}", i), 90.0 + i as f64 * 5.0, 120, 3.0 + i as f64 * 0.1))
        .collect();

    let candidates = select(&rows, &policy);
    assert_eq!(candidates.len(), policy.far_cap);
    // the weakest ratings fell off
    assert!(candidates.get("f00").is_none());
    assert!(candidates.get("f01").is_none());
    assert!(candidates.get("f02").is_none());
}

#[test]
fn test_global_candidate_cap() {
    let policy = PlanningPolicy {
        max_candidates: 10,
        ..PlanningPolicy::default()
    };
    let rows: Vec<NearbyPlace> = (0..15)
        .map(|i| row(&format!("p{:02}", i), 1.0 + i as f64, 60, 4.0))
        .collect();

    let candidates = select(&rows, &policy);
    assert_eq!(candidates.len(), 10);
}

#[test]
fn test_rows_beyond_day_trip_ceiling_are_dropped() {
    let policy = PlanningPolicy::default();
    let rows = vec![row("too-far", 250.0, 120, 5.0)];

    let candidates = select(&rows, &policy);
    assert!(candidates.is_empty());
}

#[test]
fn test_empty_input_selects_nothing() {
    let policy = PlanningPolicy::default();
    let candidates = select(&[], &policy);
    assert!(candidates.is_empty());
    assert_eq!(candidates.len(), 0);
}

#[test]
fn test_lookup_by_place_id() {
    let policy = PlanningPolicy::default();
    let rows = vec![row("known", 5.0, 60, 4.0)];
    let candidates = select(&rows, &policy);

    assert_eq!(candidates.get("known").unwrap().place_id, "known");
    assert!(candidates.get("unknown").is_none());
}

#[test]
fn test_distance_between_known_cities() {
    // Bengaluru to Mysuru, straight line
    let d = distance_service::distance_km(12.9716, 77.5946, 12.2958, 76.6394);
    assert!(
        (127.0..129.5).contains(&d),
        "expected roughly 128 km, got {:.2}",
        d
    );
}

#[test]
fn test_distance_of_identical_points_is_zero() {
    let d = distance_service::distance_km(12.9716, 77.5946, 12.9716, 77.5946);
    assert!(d.abs() < 1e-9);
}

#[test]
fn test_distance_of_antipodal_points_stays_finite() {
    let d = distance_service::distance_km(0.0, 0.0, 0.0, 180.0);
    assert!(d.is_finite());
    // half the circumference of the 6371 km sphere
    assert!((d - 20015.0).abs() < 1.0);
}

#[test]
fn test_travel_minutes_uses_two_speeds() {
    let policy = PlanningPolicy::default();
    assert_eq!(distance_service::travel_minutes(10.0, true, &policy), 24);
    assert_eq!(distance_service::travel_minutes(10.0, false, &policy), 11);
    assert_eq!(distance_service::travel_minutes(0.0, true, &policy), 0);
}

#[test]
fn test_hop_minutes_inside_and_outside_the_city() {
    let policy = PlanningPolicy::default();
    let near_lat = CITY_LAT + 10.0 / KM_PER_DEG_LAT;
    let far_lat = CITY_LAT + 30.0 / KM_PER_DEG_LAT;

    // both endpoints urban: 24 driving minutes plus the hop buffer
    assert_eq!(
        distance_service::hop_minutes_from_city(near_lat, CITY_LNG, CITY_LAT, CITY_LNG, &policy),
        36
    );
    // one endpoint outside the urban radius: the slower hop wins anyway,
    // because the whole leg moves at the intercity speed
    assert_eq!(
        distance_service::hop_minutes_from_city(far_lat, CITY_LNG, CITY_LAT, CITY_LNG, &policy),
        45
    );
}

#[test]
fn test_hop_minutes_round_to_nearest() {
    let policy = PlanningPolicy::default();
    // 2 km at 25 km/h is 4.8 driving minutes; 5 after rounding, 17 with buffer
    let lat = CITY_LAT + 2.0 / KM_PER_DEG_LAT;
    assert_eq!(
        distance_service::hop_minutes_from_city(lat, CITY_LNG, CITY_LAT, CITY_LNG, &policy),
        17
    );
}

#[test]
fn test_round_trip_minutes_for_a_day_trip() {
    let policy = PlanningPolicy::default();
    let poi = Poi {
        place_id: "far-temple".to_string(),
        name: "Far Temple".to_string(),
        lat: CITY_LAT + 150.0 / KM_PER_DEG_LAT,
        lng: CITY_LNG,
        visit_minutes: 90,
        rating: 4.8,
        city: "Bengaluru".to_string(),
        distance_from_city_km: 150.0,
        hop_minutes_from_city: 176,
    };

    // 176 out, 90 there, 176 back
    assert_eq!(
        distance_service::round_trip_minutes(&poi, CITY_LAT, CITY_LNG, &policy),
        442
    );
}

#[test]
fn test_search_radius_follows_trip_length() {
    let policy = PlanningPolicy::default();
    assert_eq!(policy.search_radius_km(0), 25.0);
    assert_eq!(policy.search_radius_km(1), 25.0);
    assert_eq!(policy.search_radius_km(2), 60.0);
    assert_eq!(policy.search_radius_km(3), 120.0);
    assert_eq!(policy.search_radius_km(4), 160.0);
    assert_eq!(policy.search_radius_km(5), 220.0);
    assert_eq!(policy.search_radius_km(12), 220.0);
}

#[test]
fn test_search_radius_never_shrinks() {
    let policy = PlanningPolicy::default();
    for days in 1..12 {
        assert!(
            policy.search_radius_km(days) <= policy.search_radius_km(days + 1),
            "radius shrank between {} and {} days",
            days,
            days + 1
        );
    }
}

#[test]
#[serial]
fn test_policy_reads_env_overrides() {
    env::set_var("PLANNER_DAY_BUDGET_MINUTES", "600");
    env::set_var("PLANNER_NEAR_CAP", "7");
    env::set_var("PLANNER_URBAN_SPEED_KMH", "not-a-number");

    let policy = PlanningPolicy::from_env();
    assert_eq!(policy.day_budget_minutes, 600);
    assert_eq!(policy.near_cap, 7);
    // unparseable values fall back silently
    assert_eq!(policy.urban_speed_kmh, 25.0);

    env::remove_var("PLANNER_DAY_BUDGET_MINUTES");
    env::remove_var("PLANNER_NEAR_CAP");
    env::remove_var("PLANNER_URBAN_SPEED_KMH");

    let defaults = PlanningPolicy::from_env();
    assert_eq!(defaults.day_budget_minutes, 480);
    assert_eq!(defaults.near_cap, 18);
}
