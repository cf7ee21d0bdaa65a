use std::collections::HashMap;

use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

use crate::models::place::Poi;
use crate::models::policy::PlanningPolicy;

/// One accepted stop within a day plan.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ScheduledVisit {
    pub place_id: String,
    pub name: String,
    pub city: String,
    pub travel_minutes_from_previous: u32,
    pub visit_minutes: u32,
    pub distance_from_city_km: f64,
    pub reason: String,
}

/// Resolved planning parameters echoed back to the caller and stored with
/// the run, so every result can be replayed against the exact knobs that
/// produced it.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AutoParams {
    pub candidate_radius_km: f64,
    pub day_budget_minutes: u32,
    pub end_of_day_buffer_min: u32,
    pub urban_speed_kmh: f64,
    pub intercity_speed_kmh: f64,
    pub per_hop_buffer_min: u32,
    pub out_of_city_one_way_km_max: f64,
    pub target_items_per_day: u32,
    pub max_items_per_day: u32,
}

impl AutoParams {
    pub fn resolve(policy: &PlanningPolicy, radius_km: f64) -> Self {
        Self {
            candidate_radius_km: radius_km,
            day_budget_minutes: policy.day_budget_minutes,
            end_of_day_buffer_min: policy.end_of_day_buffer_min,
            urban_speed_kmh: policy.urban_speed_kmh,
            intercity_speed_kmh: policy.intercity_speed_kmh,
            per_hop_buffer_min: policy.per_hop_buffer_min,
            out_of_city_one_way_km_max: policy.out_of_city_one_way_km_max,
            target_items_per_day: policy.target_items_per_day as u32,
            max_items_per_day: policy.max_items_per_day as u32,
        }
    }
}

/// Which stage produced the accepted draft, plus the exchanged text.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DraftAudit {
    pub stage: String,
    pub prompt_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_text: Option<String>,
}

/// One planning run persisted as a single document in the `Runs` collection.
/// Request, candidate snapshot, draft audit and final itinerary commit
/// together or not at all.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlanningRun {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub city: String,
    pub days: u32,
    pub suitable_for: Option<String>,
    pub version: String,
    pub itinerary: HashMap<String, Vec<ScheduledVisit>>,
    pub candidates: Vec<Poi>,
    pub auto_params: AutoParams,
    pub draft: DraftAudit,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,
}

/// Caller feedback on one stop of a stored run.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeedbackRecord {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub run_id: ObjectId,
    pub day: u32,
    pub place_id: String,
    pub signal: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,
}

/// Body of `POST /itineraries/generate`.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateItineraryRequest {
    pub city: String,
    pub days: u32,
    #[serde(default)]
    pub suitable_for: Option<String>,
}

/// Successful planning result as returned to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct ItineraryResponse {
    pub request_id: String,
    pub city: String,
    pub days: u32,
    pub suitable_for: Option<String>,
    pub itinerary: HashMap<String, Vec<ScheduledVisit>>,
    pub auto_parameters: AutoParams,
}
