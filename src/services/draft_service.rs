//! Draft acquisition: prompt construction, the ranked inference chain, and
//! the deterministic round-robin seed used when every backend fails.
//!
//! A draft is advisory. It references candidates by id and may propose
//! anything; the day planner is what makes the final plan legal.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::json;

use crate::models::place::Poi;
use crate::models::policy::PlanningPolicy;
use crate::services::candidate_service::CandidateSet;
use crate::services::ollama_service::InferenceBackend;

/// Where the accepted draft came from. Provenance only; the day planner
/// treats every draft the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftSource {
    Model(&'static str),
    RoundRobin,
}

impl DraftSource {
    /// Stage label stored in the run audit.
    pub fn stage(&self) -> &'static str {
        match self {
            DraftSource::Model(name) => name,
            DraftSource::RoundRobin => "round-robin",
        }
    }

    /// Reason attached to stops whose draft entry carried none.
    pub fn default_reason(&self) -> &'static str {
        match self {
            DraftSource::Model(_) => "Selected by model",
            DraftSource::RoundRobin => "Round-robin seed",
        }
    }
}

/// One entry of a drafted day: a candidate reference and the model's
/// optional justification.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DraftItem {
    #[serde(deserialize_with = "deserialize_place_id")]
    pub place_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

// Models occasionally emit numeric ids; accept them rather than lose the item.
fn deserialize_place_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        _ => Err(serde::de::Error::custom("place_id must be a string")),
    }
}

/// The accepted draft plus everything needed to audit how it was obtained.
#[derive(Debug, Clone)]
pub struct PlanDraft {
    pub itinerary: HashMap<String, Vec<DraftItem>>,
    pub source: DraftSource,
    pub prompt: String,
    pub raw_response: Option<String>,
}

/// Shape the model is asked to produce: day labels mapping to arrays of
/// candidate references, nothing else.
pub fn draft_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "itinerary": {
                "type": "object",
                "patternProperties": {
                    "^Day [1-9][0-9]*$": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "place_id": { "type": "string" },
                                "reason": { "type": "string" }
                            },
                            "required": ["place_id"],
                            "additionalProperties": false
                        }
                    }
                },
                "additionalProperties": false
            }
        },
        "required": ["itinerary"],
        "additionalProperties": false
    })
}

// Everything the model needs to pack days, nothing it could hallucinate over.
fn candidate_json(poi: &Poi) -> serde_json::Value {
    json!({
        "place_id": poi.place_id,
        "name": poi.name,
        "lat": poi.lat,
        "lng": poi.lng,
        "visit_minutes": poi.visit_minutes,
        "rating": poi.rating,
        "distance_from_city_km": (poi.distance_from_city_km * 10.0).round() / 10.0,
        "hop_from_city_min": poi.hop_minutes_from_city,
        "city": poi.city,
    })
}

/// Compose the planning prompt: task, daily rules, the strict output shape,
/// and the candidate list as JSON.
pub fn build_prompt(
    city: &str,
    days: u32,
    audience: Option<&str>,
    candidates: &CandidateSet,
    policy: &PlanningPolicy,
) -> String {
    let candidate_list: Vec<serde_json::Value> = candidates.iter().map(candidate_json).collect();
    let candidates_text =
        serde_json::to_string(&candidate_list).unwrap_or_else(|_| "[]".to_string());

    let audience_line = match audience {
        Some(tag) if !tag.trim().is_empty() => format!("The plan is for: {}.\n", tag.trim()),
        _ => String::new(),
    };

    format!(
        "You are planning a {days}-day sightseeing itinerary for {city}.\n\
         {audience_line}\
         Rules:\n\
         - Use ONLY place_id values from CANDIDATES. Never invent places.\n\
         - Aim for {target} stops per day; between {min} and {max} are acceptable.\n\
         - Each day has {budget} minutes for travel plus visits, with the last {buffer} minutes reserved.\n\
         - A place may stand alone as a full day ONLY if it is a real day trip \
         (distance_from_city_km >= {far_km} or hop_from_city_min >= {far_min}) \
         that fills most of the day. Otherwise never return a single-stop day.\n\
         - Group stops that sit close together on the same day and prefer higher ratings.\n\
         - Label days \"Day 1\" through \"Day {days}\".\n\
         Return STRICT JSON only, no prose, shaped exactly like:\n\
         {{\"itinerary\": {{\"Day 1\": [{{\"place_id\": \"...\", \"reason\": \"...\"}}]}}}}\n\n\
         CANDIDATES:\n{candidates_text}\n",
        days = days,
        city = city,
        audience_line = audience_line,
        target = policy.target_items_per_day,
        min = policy.min_items_per_day,
        max = policy.max_items_per_day,
        budget = policy.day_budget_minutes,
        buffer = policy.end_of_day_buffer_min,
        far_km = policy.far_distance_km,
        far_min = policy.far_hop_minutes,
        candidates_text = candidates_text,
    )
}

fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    let without_close = without_open.strip_suffix("```").unwrap_or(without_open);
    without_close.trim()
}

/// Accept a response only when it parses as JSON carrying a non-empty
/// `itinerary` object. Items inside a day are salvaged individually; a day
/// whose value is not an array becomes an empty day for the planner to fill.
/// Code fences around the JSON are tolerated.
pub fn parse_draft(text: &str) -> Option<HashMap<String, Vec<DraftItem>>> {
    let value: serde_json::Value = serde_json::from_str(strip_code_fences(text)).ok()?;
    let days = value.get("itinerary")?.as_object()?;
    if days.is_empty() {
        return None;
    }

    let mut itinerary = HashMap::new();
    for (label, entries) in days {
        let items: Vec<DraftItem> = match entries.as_array() {
            Some(array) => array
                .iter()
                .filter_map(|entry| serde_json::from_value(entry.clone()).ok())
                .collect(),
            None => Vec::new(),
        };
        itinerary.insert(label.clone(), items);
    }

    Some(itinerary)
}

/// Deterministic seed for when inference is unavailable: candidates in
/// closest-first order, dealt across the days like cards.
pub fn round_robin_draft(candidates: &CandidateSet, days: u32) -> HashMap<String, Vec<DraftItem>> {
    let mut itinerary: HashMap<String, Vec<DraftItem>> = HashMap::new();
    if days == 0 {
        return itinerary;
    }

    let mut ordered = candidates.to_vec();
    ordered.sort_by(|a, b| {
        a.distance_from_city_km
            .partial_cmp(&b.distance_from_city_km)
            .unwrap_or(Ordering::Equal)
            .then(b.rating.partial_cmp(&a.rating).unwrap_or(Ordering::Equal))
            .then(a.visit_minutes.cmp(&b.visit_minutes))
    });

    for day in 1..=days {
        itinerary.insert(format!("Day {}", day), Vec::new());
    }
    for (idx, poi) in ordered.iter().enumerate() {
        let label = format!("Day {}", (idx as u32 % days) + 1);
        if let Some(items) = itinerary.get_mut(&label) {
            items.push(DraftItem {
                place_id: poi.place_id.clone(),
                reason: None,
            });
        }
    }

    itinerary
}

/// Walk the ranked backends; the first response that parses wins. When the
/// whole chain fails, fall back to the round-robin seed so a plan always
/// comes out.
pub async fn acquire_draft(
    backends: &[Box<dyn InferenceBackend>],
    city: &str,
    days: u32,
    audience: Option<&str>,
    candidates: &CandidateSet,
    policy: &PlanningPolicy,
) -> PlanDraft {
    let prompt = build_prompt(city, days, audience, candidates, policy);
    let schema = draft_schema();
    let timeout = Duration::from_secs(policy.inference_timeout_secs);

    for backend in backends {
        match backend.draft(&prompt, Some(&schema), timeout).await {
            Ok(text) => match parse_draft(&text) {
                Some(itinerary) => {
                    println!("Draft accepted from backend '{}'", backend.name());
                    return PlanDraft {
                        itinerary,
                        source: DraftSource::Model(backend.name()),
                        prompt,
                        raw_response: Some(text),
                    };
                }
                None => {
                    eprintln!(
                        "Backend '{}' returned an unusable draft, trying next",
                        backend.name()
                    );
                }
            },
            Err(e) => {
                eprintln!("Backend '{}' failed: {}", backend.name(), e);
            }
        }
    }

    println!("All inference backends failed; seeding draft round-robin");
    PlanDraft {
        itinerary: round_robin_draft(candidates, days),
        source: DraftSource::RoundRobin,
        prompt,
        raw_response: None,
    }
}
