use actix_web::{web, HttpResponse, Responder};
use futures::TryStreamExt;
use mongodb::{bson::doc, options::FindOptions, Client};
use std::sync::Arc;

use crate::models::place::PlaceRecord;

const DEFAULT_LIMIT: i64 = 20;
const MAX_LIMIT: i64 = 100;

#[derive(serde::Deserialize)]
pub struct QueryParams {
    limit: Option<u16>,
    search: Option<String>,
    city: Option<String>,
}

/*
    GET /places
*/
pub async fn get_places(
    data: web::Data<Arc<Client>>,
    params: web::Query<QueryParams>,
) -> impl Responder {
    let client = data.into_inner();
    let collection: mongodb::Collection<PlaceRecord> =
        client.database("Itineraries").collection("Places");

    let mut options = FindOptions::default();
    let limit = params
        .limit
        .map(i64::from)
        .unwrap_or(DEFAULT_LIMIT)
        .min(MAX_LIMIT);
    options.limit = Some(limit);

    let mut filter = doc! {};
    if let Some(search_text) = &params.search {
        if !search_text.is_empty() {
            filter.insert(
                "name",
                doc! {
                    "$regex": regex::escape(search_text),
                    "$options": "i",
                },
            );
        }
    }
    if let Some(city) = &params.city {
        if !city.is_empty() {
            filter.insert(
                "city",
                doc! {
                    "$regex": format!("^{}$", regex::escape(city)),
                    "$options": "i",
                },
            );
        }
    }

    match collection.find(filter).with_options(options).await {
        Ok(cursor) => match cursor.try_collect::<Vec<PlaceRecord>>().await {
            Ok(places) => HttpResponse::Ok().json(places),
            Err(err) => {
                eprintln!("Failed to collect places: {:?}", err);
                HttpResponse::InternalServerError().body("Failed to collect places.")
            }
        },
        Err(err) => {
            eprintln!("Failed to find places: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to find places.")
        }
    }
}
