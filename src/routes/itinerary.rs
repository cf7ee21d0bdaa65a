use actix_web::{web, HttpResponse, Responder};
use bson::{oid::ObjectId, DateTime};
use mongodb::Client;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::models::itinerary::{FeedbackRecord, GenerateItineraryRequest};
use crate::services::itinerary_generation_service::{ItineraryGenerator, PlanningError};
use crate::services::itinerary_service;

/*
    POST /itineraries/generate
*/
pub async fn generate_itinerary(
    data: web::Data<Arc<Client>>,
    payload: web::Json<GenerateItineraryRequest>,
) -> impl Responder {
    let client = data.get_ref().clone();
    let request = payload.into_inner();

    if request.city.trim().is_empty() {
        return HttpResponse::BadRequest().json(json!({ "error": "city must not be empty" }));
    }
    if request.days < 1 {
        return HttpResponse::BadRequest().json(json!({ "error": "days must be at least 1" }));
    }

    let generator = ItineraryGenerator::new(client);

    match generator.generate(&request).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e @ PlanningError::CityNotFound(_)) => {
            HttpResponse::NotFound().json(json!({ "error": e.to_string() }))
        }
        Err(e @ PlanningError::NoCandidates { .. }) => {
            HttpResponse::NotFound().json(json!({ "error": e.to_string() }))
        }
        Err(e) => {
            eprintln!("Itinerary generation failed: {}", e);
            HttpResponse::InternalServerError()
                .json(json!({ "error": "Failed to generate itinerary" }))
        }
    }
}

/*
    GET /itineraries/{id}
*/
pub async fn get_itinerary_by_id(
    path: web::Path<String>,
    data: web::Data<Arc<Client>>,
) -> impl Responder {
    let client = data.into_inner();

    let id: ObjectId = match ObjectId::parse_str(path.into_inner().as_str()) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid ID"),
    };

    match itinerary_service::get_planning_run(&client, id).await {
        Ok(Some(run)) => HttpResponse::Ok().json(run),
        Ok(None) => HttpResponse::NotFound().body("Planning run not found"),
        Err(err) => {
            eprintln!("Failed to retrieve planning run: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to retrieve planning run")
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct FeedbackPayload {
    pub day: u32,
    pub place_id: String,
    pub signal: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/*
    POST /itineraries/{id}/feedback
*/
pub async fn submit_feedback(
    path: web::Path<String>,
    data: web::Data<Arc<Client>>,
    payload: web::Json<FeedbackPayload>,
) -> impl Responder {
    let client = data.into_inner();
    let feedback = payload.into_inner();

    let run_id: ObjectId = match ObjectId::parse_str(path.into_inner().as_str()) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid ID"),
    };

    if feedback.signal.trim().is_empty() {
        return HttpResponse::BadRequest().json(json!({ "error": "signal must not be empty" }));
    }
    if feedback.place_id.trim().is_empty() {
        return HttpResponse::BadRequest().json(json!({ "error": "place_id must not be empty" }));
    }

    // Feedback only makes sense against a run that exists
    match itinerary_service::get_planning_run(&client, run_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return HttpResponse::NotFound().body("Planning run not found"),
        Err(err) => {
            eprintln!("Failed to look up planning run: {:?}", err);
            return HttpResponse::InternalServerError().body("Failed to record feedback");
        }
    }

    let record = FeedbackRecord {
        id: None,
        run_id,
        day: feedback.day,
        place_id: feedback.place_id,
        signal: feedback.signal,
        notes: feedback.notes,
        created_at: Some(DateTime::now()),
    };

    match itinerary_service::save_feedback(&client, &record).await {
        Ok(()) => HttpResponse::Ok().json(json!({ "status": "recorded" })),
        Err(err) => {
            eprintln!("Failed to save feedback: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to record feedback")
        }
    }
}
