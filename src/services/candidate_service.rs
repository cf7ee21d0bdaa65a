//! Candidate selection for the drafting stage.
//!
//! Catalog rows inside the search radius are normalized, split into near /
//! mid / far distance bands, ranked per band, capped, and concatenated into
//! one bounded list. That list is the whole universe the drafter and the day
//! planner may reference; nothing outside it can appear in a plan.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::models::place::{NearbyPlace, Poi};
use crate::models::policy::PlanningPolicy;
use crate::services::distance_service;

/// Ordered candidate list plus an id lookup. Built once per run, read-only
/// afterwards.
#[derive(Debug, Clone, Default)]
pub struct CandidateSet {
    ordered: Vec<Poi>,
    by_id: HashMap<String, usize>,
}

impl CandidateSet {
    fn new(ordered: Vec<Poi>) -> Self {
        let by_id = ordered
            .iter()
            .enumerate()
            .map(|(idx, poi)| (poi.place_id.clone(), idx))
            .collect();

        Self { ordered, by_id }
    }

    pub fn get(&self, place_id: &str) -> Option<&Poi> {
        self.by_id.get(place_id).map(|&idx| &self.ordered[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Poi> {
        self.ordered.iter()
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    pub fn to_vec(&self) -> Vec<Poi> {
        self.ordered.clone()
    }
}

// Missing visit durations and ratings are resolved here and nowhere else.
fn normalize(
    row: &NearbyPlace,
    city: &str,
    city_lat: f64,
    city_lng: f64,
    policy: &PlanningPolicy,
) -> Option<Poi> {
    let (lat, lng) = match (row.place.lat, row.place.lng) {
        (Some(lat), Some(lng)) => (lat, lng),
        _ => return None,
    };

    let visit_minutes = match row.place.avg_visit_mins {
        Some(mins) if mins > 0 => mins,
        _ => policy.default_visit_minutes,
    };

    Some(Poi {
        place_id: row.place.place_id.clone(),
        name: row.place.name.clone(),
        lat,
        lng,
        visit_minutes,
        rating: row.place.rating.unwrap_or(0.0),
        city: row.place.city.clone().unwrap_or_else(|| city.to_string()),
        distance_from_city_km: row.distance_km,
        hop_minutes_from_city: distance_service::hop_minutes_from_city(
            lat, lng, city_lat, city_lng, policy,
        ),
    })
}

// Near and mid bands: closest first, better rated among equals, shorter
// visits after that.
fn near_mid_order(a: &Poi, b: &Poi) -> Ordering {
    a.distance_from_city_km
        .partial_cmp(&b.distance_from_city_km)
        .unwrap_or(Ordering::Equal)
        .then(b.rating.partial_cmp(&a.rating).unwrap_or(Ordering::Equal))
        .then(a.visit_minutes.cmp(&b.visit_minutes))
}

// Far band: day-trip material is rare, so rating beats proximity.
fn far_order(a: &Poi, b: &Poi) -> Ordering {
    b.rating
        .partial_cmp(&a.rating)
        .unwrap_or(Ordering::Equal)
        .then(
            a.distance_from_city_km
                .partial_cmp(&b.distance_from_city_km)
                .unwrap_or(Ordering::Equal),
        )
}

/// Build the bounded candidate list for one run.
pub fn select_candidates(
    rows: &[NearbyPlace],
    city: &str,
    city_lat: f64,
    city_lng: f64,
    policy: &PlanningPolicy,
) -> CandidateSet {
    let mut near: Vec<Poi> = Vec::new();
    let mut mid: Vec<Poi> = Vec::new();
    let mut far: Vec<Poi> = Vec::new();

    for row in rows {
        let poi = match normalize(row, city, city_lat, city_lng, policy) {
            Some(poi) => poi,
            None => continue,
        };

        if poi.distance_from_city_km <= policy.near_band_km {
            near.push(poi);
        } else if poi.distance_from_city_km <= policy.mid_band_km {
            mid.push(poi);
        } else if poi.distance_from_city_km <= policy.out_of_city_one_way_km_max {
            far.push(poi);
        }
        // beyond the one-way ceiling: not reachable as a day trip, skip
    }

    near.sort_by(near_mid_order);
    mid.sort_by(near_mid_order);
    far.sort_by(far_order);

    near.truncate(policy.near_cap);
    mid.truncate(policy.mid_cap);
    far.truncate(policy.far_cap);

    println!(
        "Candidate bands: {} near, {} mid, {} far",
        near.len(),
        mid.len(),
        far.len()
    );

    let mut ordered = near;
    ordered.append(&mut mid);
    ordered.append(&mut far);
    ordered.truncate(policy.max_candidates);

    CandidateSet::new(ordered)
}
