//! End-to-end planning pipeline.
//!
//! One run: resolve the city, pull candidates in the auto radius, acquire a
//! draft (model chain with round-robin fallback), rebuild every day under the
//! time budget, and persist the whole thing as a single document.
//!
//! ## Features
//! - Fatal errors only for an unknown city, an empty candidate pool, or a
//!   failed write; inference failures never surface to the caller
//! - A shared used-set guarantees no place repeats across days
//! - The stored run carries the candidate snapshot, the draft audit and the
//!   resolved parameters, so results can be replayed

use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::fmt;
use std::sync::Arc;

use mongodb::Client;

use crate::models::itinerary::{
    AutoParams, DraftAudit, GenerateItineraryRequest, ItineraryResponse, PlanningRun,
    ScheduledVisit,
};
use crate::models::policy::PlanningPolicy;
use crate::services::candidate_service::{self, CandidateSet};
use crate::services::catalog_service;
use crate::services::day_planner_service;
use crate::services::draft_service::{self, DraftItem, PlanDraft};
use crate::services::itinerary_service;
use crate::services::ollama_service::{self, InferenceBackend};

const PIPELINE_VERSION: &str = "v2.2.0";

#[derive(Debug)]
pub enum PlanningError {
    CityNotFound(String),
    NoCandidates { city: String, radius_km: f64 },
    Catalog(mongodb::error::Error),
    Persistence(mongodb::error::Error),
}

impl fmt::Display for PlanningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanningError::CityNotFound(city) => {
                write!(f, "No coordinates found for city '{}'", city)
            }
            PlanningError::NoCandidates { city, radius_km } => {
                write!(f, "No candidate places within {:.0} km of {}", radius_km, city)
            }
            PlanningError::Catalog(err) => write!(f, "Catalog lookup failed: {}", err),
            PlanningError::Persistence(err) => {
                write!(f, "Failed to persist planning run: {}", err)
            }
        }
    }
}

impl Error for PlanningError {}

pub struct ItineraryGenerator {
    client: Arc<Client>,
    policy: PlanningPolicy,
    backends: Vec<Box<dyn InferenceBackend>>,
}

impl ItineraryGenerator {
    pub fn new(client: Arc<Client>) -> Self {
        Self {
            client,
            policy: PlanningPolicy::from_env(),
            backends: ollama_service::default_backends(),
        }
    }

    /// Run the full pipeline for one request and persist the result.
    pub async fn generate(
        &self,
        request: &GenerateItineraryRequest,
    ) -> Result<ItineraryResponse, PlanningError> {
        let city = request.city.trim();
        let days = request.days;
        let audience = request.suitable_for.as_deref();

        let (city_lat, city_lng) = match catalog_service::find_city_coordinates(&self.client, city)
            .await
            .map_err(PlanningError::Catalog)?
        {
            Some(coords) => coords,
            None => return Err(PlanningError::CityNotFound(city.to_string())),
        };

        let radius_km = self.policy.search_radius_km(days);
        let rows = catalog_service::find_places_within_radius(
            &self.client,
            city_lat,
            city_lng,
            radius_km,
            audience,
        )
        .await
        .map_err(PlanningError::Catalog)?;

        let candidates =
            candidate_service::select_candidates(&rows, city, city_lat, city_lng, &self.policy);
        if candidates.is_empty() {
            return Err(PlanningError::NoCandidates {
                city: city.to_string(),
                radius_km,
            });
        }

        println!(
            "Planning {} day(s) in {} from {} candidates",
            days,
            city,
            candidates.len()
        );

        let draft = draft_service::acquire_draft(
            &self.backends,
            city,
            days,
            audience,
            &candidates,
            &self.policy,
        )
        .await;

        let itinerary =
            assemble_itinerary(&draft, &candidates, city_lat, city_lng, days, &self.policy);

        let auto_params = AutoParams::resolve(&self.policy, radius_km);
        let run_id = mongodb::bson::oid::ObjectId::new();
        let run = PlanningRun {
            id: Some(run_id),
            city: city.to_string(),
            days,
            suitable_for: request.suitable_for.clone(),
            version: PIPELINE_VERSION.to_string(),
            itinerary: itinerary.clone(),
            candidates: candidates.to_vec(),
            auto_params: auto_params.clone(),
            draft: DraftAudit {
                stage: draft.source.stage().to_string(),
                prompt_text: draft.prompt.clone(),
                response_text: draft.raw_response.clone(),
            },
            created_at: Some(mongodb::bson::DateTime::now()),
        };

        itinerary_service::save_planning_run(&self.client, &run)
            .await
            .map_err(PlanningError::Persistence)?;

        Ok(ItineraryResponse {
            request_id: run_id.to_hex(),
            city: city.to_string(),
            days,
            suitable_for: request.suitable_for.clone(),
            itinerary,
            auto_parameters: auto_params,
        })
    }
}

/// Rebuild days 1..N in order with a shared used-set, so a place scheduled on
/// an earlier day can never reappear on a later one.
pub fn assemble_itinerary(
    draft: &PlanDraft,
    candidates: &CandidateSet,
    city_lat: f64,
    city_lng: f64,
    days: u32,
    policy: &PlanningPolicy,
) -> HashMap<String, Vec<ScheduledVisit>> {
    let mut itinerary = HashMap::new();
    let mut used: HashSet<String> = HashSet::new();
    let no_items: Vec<DraftItem> = Vec::new();

    for day in 1..=days {
        let label = format!("Day {}", day);
        let drafted = draft.itinerary.get(&label).unwrap_or(&no_items);
        let fresh: Vec<DraftItem> = drafted
            .iter()
            .filter(|item| !used.contains(&item.place_id))
            .cloned()
            .collect();

        let stops = day_planner_service::validate_and_repair_day(
            &fresh,
            candidates,
            &used,
            city_lat,
            city_lng,
            draft.source.default_reason(),
            policy,
        );

        for stop in &stops {
            used.insert(stop.place_id.clone());
        }
        println!("{}: {} stop(s) accepted", label, stops.len());
        itinerary.insert(label, stops);
    }

    itinerary
}
