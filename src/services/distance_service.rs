//! Distance and travel time estimation.
//!
//! All distances are straight-line haversine values; travel times come from a
//! two-speed driving model rather than a routing API, which keeps planning
//! fully offline and deterministic.
//!
//! ## Features
//! - Great-circle distances on a spherical Earth (6371 km radius)
//! - Urban vs intercity speeds: a hop counts as urban only when both of its
//!   endpoints sit inside the urban radius around the city center
//! - A fixed per-hop buffer for parking, tickets and walking overhead
//! - Round-trip estimation for single-landmark day trips

use crate::models::place::Poi;
use crate::models::policy::PlanningPolicy;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two coordinates, in kilometers.
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    // rounding can push `a` a hair outside [0, 1], which would NaN the sqrt chain
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Driving minutes for a distance at the urban or intercity speed, rounded
/// to the nearest minute.
pub fn travel_minutes(km: f64, urban: bool, policy: &PlanningPolicy) -> u32 {
    let speed_kmh = if urban {
        policy.urban_speed_kmh
    } else {
        policy.intercity_speed_kmh
    };
    (km / speed_kmh * 60.0).round() as u32
}

/// Minutes for one hop between two points, including the fixed per-hop
/// buffer. The urban speed applies only when both endpoints are within the
/// urban radius of the city center.
pub fn hop_minutes(
    from_lat: f64,
    from_lng: f64,
    to_lat: f64,
    to_lng: f64,
    city_lat: f64,
    city_lng: f64,
    policy: &PlanningPolicy,
) -> u32 {
    let km = distance_km(from_lat, from_lng, to_lat, to_lng);
    let urban = distance_km(from_lat, from_lng, city_lat, city_lng) <= policy.urban_radius_km
        && distance_km(to_lat, to_lng, city_lat, city_lng) <= policy.urban_radius_km;

    travel_minutes(km, urban, policy) + policy.per_hop_buffer_min
}

/// Hop from the city center out to a point.
pub fn hop_minutes_from_city(
    lat: f64,
    lng: f64,
    city_lat: f64,
    city_lng: f64,
    policy: &PlanningPolicy,
) -> u32 {
    hop_minutes(city_lat, city_lng, lat, lng, city_lat, city_lng, policy)
}

/// Outbound hop, visit, and return hop. This is the feasibility number for
/// scheduling a remote landmark as a dedicated day.
pub fn round_trip_minutes(poi: &Poi, city_lat: f64, city_lng: f64, policy: &PlanningPolicy) -> u32 {
    let outbound = hop_minutes(city_lat, city_lng, poi.lat, poi.lng, city_lat, city_lng, policy);
    let back = hop_minutes(poi.lat, poi.lng, city_lat, city_lng, city_lat, city_lng, policy);

    outbound + poi.visit_minutes + back
}
