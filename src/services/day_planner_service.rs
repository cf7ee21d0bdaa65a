//! Per-day validation and repair.
//!
//! Drafts are suggestions; this module is the authority. Each day is rebuilt
//! by a greedy time-budget walk over the drafted stops, then repaired:
//! backfill toward the daily minimum, the single-stop day-trip rule, a
//! nearby greedy fill for empty days, and a far-landmark backstop as the
//! last resort. A day that survives with no stops stays empty rather than
//! breaking the budget.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::models::itinerary::ScheduledVisit;
use crate::models::place::Poi;
use crate::models::policy::PlanningPolicy;
use crate::services::candidate_service::CandidateSet;
use crate::services::distance_service;
use crate::services::draft_service::DraftItem;

pub const FAR_DAY_REASON: &str =
    "Full-day out-of-city landmark; travel+visit fits daily budget";
pub const NEARBY_FILL_REASON: &str = "Nearby fill within the time budget";

/// Running state of one day's walk: accepted stops, minutes consumed, and
/// the current position (the city center before the first stop).
struct DayWalk<'a> {
    policy: &'a PlanningPolicy,
    city_lat: f64,
    city_lng: f64,
    stops: Vec<ScheduledVisit>,
    chosen: HashSet<String>,
    total_minutes: u32,
    cur_lat: f64,
    cur_lng: f64,
}

impl<'a> DayWalk<'a> {
    fn new(policy: &'a PlanningPolicy, city_lat: f64, city_lng: f64) -> Self {
        Self {
            policy,
            city_lat,
            city_lng,
            stops: Vec::new(),
            chosen: HashSet::new(),
            total_minutes: 0,
            cur_lat: city_lat,
            cur_lng: city_lng,
        }
    }

    /// A stop fits when the day so far, plus the hop to it, its visit, the
    /// estimated hop back to the city, and the end-of-day reserve all stay
    /// within the daily budget.
    fn try_add(&mut self, poi: &Poi, reason: &str) -> bool {
        if self.stops.len() >= self.policy.max_items_per_day
            || self.chosen.contains(&poi.place_id)
        {
            return false;
        }

        let hop = distance_service::hop_minutes(
            self.cur_lat,
            self.cur_lng,
            poi.lat,
            poi.lng,
            self.city_lat,
            self.city_lng,
            self.policy,
        );
        let running_total = self.total_minutes + hop + poi.visit_minutes;
        let return_hop = distance_service::hop_minutes(
            poi.lat,
            poi.lng,
            self.city_lat,
            self.city_lng,
            self.city_lat,
            self.city_lng,
            self.policy,
        );

        if running_total + return_hop + self.policy.end_of_day_buffer_min
            > self.policy.day_budget_minutes
        {
            return false;
        }

        self.stops.push(ScheduledVisit {
            place_id: poi.place_id.clone(),
            name: poi.name.clone(),
            city: poi.city.clone(),
            travel_minutes_from_previous: hop,
            visit_minutes: poi.visit_minutes,
            distance_from_city_km: poi.distance_from_city_km,
            reason: reason.to_string(),
        });
        self.chosen.insert(poi.place_id.clone());
        self.total_minutes = running_total;
        self.cur_lat = poi.lat;
        self.cur_lng = poi.lng;

        true
    }

    fn reset(&mut self) {
        self.stops.clear();
        self.chosen.clear();
        self.total_minutes = 0;
        self.cur_lat = self.city_lat;
        self.cur_lng = self.city_lng;
    }
}

/// Rebuild one day from its drafted items.
///
/// The shared `used` set holds every place already scheduled on an earlier
/// day; nothing in it may appear here again. An empty result is a valid
/// outcome when no combination fits the budget.
pub fn validate_and_repair_day(
    day_draft: &[DraftItem],
    candidates: &CandidateSet,
    used: &HashSet<String>,
    city_lat: f64,
    city_lng: f64,
    default_reason: &str,
    policy: &PlanningPolicy,
) -> Vec<ScheduledVisit> {
    let mut walk = DayWalk::new(policy, city_lat, city_lng);

    // Greedy pass over the drafted order
    for item in day_draft.iter().take(policy.max_items_per_day) {
        let poi = match candidates.get(&item.place_id) {
            Some(poi) => poi,
            // unknown reference: the model invented it or the catalog moved on
            None => continue,
        };
        let reason = item.reason.as_deref().unwrap_or(default_reason);
        walk.try_add(poi, reason);
    }

    // Below the daily minimum: take drafted items out of order if they fit
    if walk.stops.len() < policy.min_items_per_day {
        for item in day_draft {
            if walk.stops.len() >= policy.min_items_per_day {
                break;
            }
            let poi = match candidates.get(&item.place_id) {
                Some(poi) => poi,
                None => continue,
            };
            let reason = item.reason.as_deref().unwrap_or(default_reason);
            walk.try_add(poi, reason);
        }
    }

    // A lone stop must be a genuine day trip; otherwise enrich it, and if
    // that fails, give the day up for the fills below.
    if walk.stops.len() == 1 && !single_stop_qualifies(&walk.stops[0], candidates, city_lat, city_lng, policy) {
        greedy_fill(&mut walk, candidates, used, 2, NEARBY_FILL_REASON);
        walk.stops.truncate(policy.max_items_per_day);
        if walk.stops.len() == 1 {
            walk.reset();
        }
    }

    // Empty day: fill from the city outward
    if walk.stops.is_empty() {
        greedy_fill(&mut walk, candidates, used, policy.min_items_per_day, NEARBY_FILL_REASON);
        if walk.stops.len() == 1
            && !single_stop_qualifies(&walk.stops[0], candidates, city_lat, city_lng, policy)
        {
            walk.reset();
        }
    }

    // Last resort: one remote landmark worth the whole day
    if walk.stops.is_empty() {
        if let Some(stop) = far_day_backstop(candidates, used, city_lat, city_lng, policy) {
            walk.stops.push(stop);
        }
    }

    walk.stops.truncate(policy.max_items_per_day);
    walk.stops
}

// The only legal shape for a single-stop day: a real day trip that fills
// most of the budget.
fn single_stop_qualifies(
    stop: &ScheduledVisit,
    candidates: &CandidateSet,
    city_lat: f64,
    city_lng: f64,
    policy: &PlanningPolicy,
) -> bool {
    let poi = match candidates.get(&stop.place_id) {
        Some(poi) => poi,
        None => return false,
    };

    let is_far = poi.distance_from_city_km >= policy.far_distance_km
        || poi.hop_minutes_from_city >= policy.far_hop_minutes;
    if !is_far {
        return false;
    }

    let round_trip = distance_service::round_trip_minutes(poi, city_lat, city_lng, policy);
    f64::from(round_trip) >= policy.full_day_utilization * f64::from(policy.day_budget_minutes)
}

/// Continue the walk with unused candidates from the city outward, closest
/// first, until `limit` extra stops are in or the pool runs dry.
fn greedy_fill(
    walk: &mut DayWalk,
    candidates: &CandidateSet,
    used: &HashSet<String>,
    limit: usize,
    reason: &str,
) {
    let mut pool: Vec<&Poi> = candidates
        .iter()
        .filter(|poi| !used.contains(&poi.place_id) && !walk.chosen.contains(&poi.place_id))
        .collect();
    pool.sort_by(|a, b| {
        a.distance_from_city_km
            .partial_cmp(&b.distance_from_city_km)
            .unwrap_or(Ordering::Equal)
            .then(b.rating.partial_cmp(&a.rating).unwrap_or(Ordering::Equal))
    });

    let mut added = 0;
    for poi in pool {
        if added >= limit || walk.stops.len() >= walk.policy.max_items_per_day {
            break;
        }
        if walk.try_add(poi, reason) {
            added += 1;
        }
    }
}

// Best remote landmark whose round trip fills most of the day but still
// fits. None means the day stays empty.
fn far_day_backstop(
    candidates: &CandidateSet,
    used: &HashSet<String>,
    city_lat: f64,
    city_lng: f64,
    policy: &PlanningPolicy,
) -> Option<ScheduledVisit> {
    let mut remote: Vec<&Poi> = candidates
        .iter()
        .filter(|poi| !used.contains(&poi.place_id))
        .filter(|poi| {
            poi.distance_from_city_km >= policy.far_distance_km
                || poi.hop_minutes_from_city >= policy.far_hop_minutes
        })
        .collect();
    remote.sort_by(|a, b| {
        b.rating
            .partial_cmp(&a.rating)
            .unwrap_or(Ordering::Equal)
            .then(
                a.distance_from_city_km
                    .partial_cmp(&b.distance_from_city_km)
                    .unwrap_or(Ordering::Equal),
            )
    });

    for poi in remote {
        let round_trip = distance_service::round_trip_minutes(poi, city_lat, city_lng, policy);
        let fits = round_trip + policy.end_of_day_buffer_min <= policy.day_budget_minutes;
        let fills_the_day = f64::from(round_trip)
            >= policy.full_day_utilization * f64::from(policy.day_budget_minutes);

        if fits && fills_the_day {
            let outbound = distance_service::hop_minutes_from_city(
                poi.lat, poi.lng, city_lat, city_lng, policy,
            );
            return Some(ScheduledVisit {
                place_id: poi.place_id.clone(),
                name: poi.name.clone(),
                city: poi.city.clone(),
                travel_minutes_from_previous: outbound,
                visit_minutes: poi.visit_minutes,
                distance_from_city_km: poi.distance_from_city_km,
                reason: FAR_DAY_REASON.to_string(),
            });
        }
    }

    None
}
