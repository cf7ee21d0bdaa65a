use actix_cors::Cors;
use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{middleware::Logger, web, App, HttpResponse, Responder};
use serde_json::json;
use std::sync::Arc;

use tripweaver_api::db::mongo::create_mongo_client;

pub struct TestApp {
    pub client: Arc<mongodb::Client>,
}

impl TestApp {
    pub async fn new() -> Self {
        let mongo_uri = std::env::var("MONGODB_URI")
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        let client = create_mongo_client(&mongo_uri).await;

        Self { client }
    }

    // Mock app mirroring the route table. Handlers reproduce the surface
    // behavior (status codes and body shapes) without touching Mongo or
    // Ollama, so route tests stay fast and dependency-free.
    pub fn create_app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse<impl MessageBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(web::Data::new(self.client.clone()))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .route("/health", web::get().to(mock_health))
            .route("/places", web::get().to(mock_places))
            .route(
                "/itineraries/generate",
                web::post().to(mock_generate_itinerary),
            )
            .route("/itineraries/{id}", web::get().to(mock_get_planning_run))
            .route(
                "/itineraries/{id}/feedback",
                web::post().to(mock_submit_feedback),
            )
    }
}

async fn mock_health() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "services": {
            "mongodb": { "status": "ok", "details": "Connected successfully to MongoDB" },
            "inference": { "status": "ok", "details": "Ollama configured" }
        },
        "environment": "test",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn mock_places() -> impl Responder {
    HttpResponse::Ok().json(json!([
        {
            "place_id": "blr-lalbagh",
            "name": "Lalbagh Botanical Garden",
            "city": "Bengaluru",
            "lat": 12.9507,
            "lng": 77.5848,
            "avg_visit_mins": 90,
            "rating": 4.5
        }
    ]))
}

async fn mock_generate_itinerary(payload: web::Json<serde_json::Value>) -> impl Responder {
    let city = payload
        .get("city")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .trim()
        .to_string();
    let days = payload.get("days").and_then(|v| v.as_u64()).unwrap_or(0);

    if city.is_empty() {
        return HttpResponse::BadRequest().json(json!({ "error": "city must not be empty" }));
    }
    if days < 1 {
        return HttpResponse::BadRequest().json(json!({ "error": "days must be at least 1" }));
    }

    HttpResponse::Ok().json(json!({
        "request_id": "65a1b2c3d4e5f6a7b8c9d0e1",
        "city": city,
        "days": days,
        "suitable_for": payload.get("suitable_for").cloned().unwrap_or(json!(null)),
        "itinerary": {
            "Day 1": [
                {
                    "place_id": "blr-lalbagh",
                    "name": "Lalbagh Botanical Garden",
                    "city": "Bengaluru",
                    "travel_minutes_from_previous": 19,
                    "visit_minutes": 90,
                    "distance_from_city_km": 2.9,
                    "reason": "Selected by model"
                }
            ]
        },
        "auto_parameters": {
            "candidate_radius_km": 25.0,
            "day_budget_minutes": 480,
            "end_of_day_buffer_min": 30,
            "urban_speed_kmh": 25.0,
            "intercity_speed_kmh": 55.0,
            "per_hop_buffer_min": 12,
            "out_of_city_one_way_km_max": 220.0,
            "target_items_per_day": 4,
            "max_items_per_day": 5
        }
    }))
}

async fn mock_get_planning_run(path: web::Path<String>) -> impl Responder {
    let id = path.into_inner();
    if mongodb::bson::oid::ObjectId::parse_str(&id).is_err() {
        return HttpResponse::BadRequest().body("Invalid ID");
    }

    HttpResponse::NotFound().body("Planning run not found")
}

async fn mock_submit_feedback(
    path: web::Path<String>,
    payload: web::Json<serde_json::Value>,
) -> impl Responder {
    let id = path.into_inner();
    if mongodb::bson::oid::ObjectId::parse_str(&id).is_err() {
        return HttpResponse::BadRequest().body("Invalid ID");
    }

    let signal = payload
        .get("signal")
        .and_then(|v| v.as_str())
        .unwrap_or("");
    if signal.trim().is_empty() {
        return HttpResponse::BadRequest().json(json!({ "error": "signal must not be empty" }));
    }

    HttpResponse::NotFound().body("Planning run not found")
}
