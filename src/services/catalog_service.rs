//! Read side of the sightseeing catalog.

use mongodb::{bson::doc, Client, Collection};

use crate::models::place::{NearbyPlace, PlaceRecord};
use crate::services::distance_service;

fn places_collection(client: &Client) -> Collection<PlaceRecord> {
    client.database("Itineraries").collection("Places")
}

/// Resolve a city name to coordinates: the first cataloged place in that city
/// carrying a coordinate pair. The match is case-insensitive and exact.
pub async fn find_city_coordinates(
    client: &Client,
    city: &str,
) -> Result<Option<(f64, f64)>, mongodb::error::Error> {
    let collection = places_collection(client);

    let filter = doc! {
        "city": { "$regex": format!("^{}$", regex::escape(city)), "$options": "i" },
        "lat": { "$ne": null },
        "lng": { "$ne": null },
    };

    let place = collection.find_one(filter).await?;

    Ok(place.and_then(|p| match (p.lat, p.lng) {
        (Some(lat), Some(lng)) => Some((lat, lng)),
        _ => None,
    }))
}

/// Every cataloged place within `radius_km` of the center, annotated with its
/// distance. An audience tag, when present, narrows the rows to places whose
/// `suitable_for` entries mention it.
pub async fn find_places_within_radius(
    client: &Client,
    city_lat: f64,
    city_lng: f64,
    radius_km: f64,
    audience: Option<&str>,
) -> Result<Vec<NearbyPlace>, mongodb::error::Error> {
    let collection = places_collection(client);

    let mut filter = doc! {
        "lat": { "$ne": null },
        "lng": { "$ne": null },
    };
    if let Some(tag) = audience {
        if !tag.trim().is_empty() {
            filter.insert(
                "suitable_for",
                doc! { "$regex": regex::escape(tag.trim()), "$options": "i" },
            );
        }
    }

    let cursor = collection.find(filter).await?;
    let rows: Vec<PlaceRecord> = cursor.try_collect().await?;

    // The catalog carries no geo index; the radius cut happens here.
    let mut nearby = Vec::new();
    for place in rows {
        let (lat, lng) = match (place.lat, place.lng) {
            (Some(lat), Some(lng)) => (lat, lng),
            _ => continue,
        };
        let distance = distance_service::distance_km(city_lat, city_lng, lat, lng);
        if distance <= radius_km {
            nearby.push(NearbyPlace {
                place,
                distance_km: distance,
            });
        }
    }

    println!(
        "Catalog lookup found {} places within {:.0} km",
        nearby.len(),
        radius_km
    );

    Ok(nearby)
}

use futures::TryStreamExt;
