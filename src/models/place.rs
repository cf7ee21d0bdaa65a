use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Deserializer, Serialize};

// Catalog imports sometimes deliver visit durations as floats or strings.
// Round up rather than reject the row.
fn deserialize_optional_rounded_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: serde_json::Value = Deserialize::deserialize(deserializer)?;

    match value {
        serde_json::Value::Number(num) => {
            if let Some(f) = num.as_f64() {
                Ok(Some(f.ceil() as u32))
            } else if let Some(u) = num.as_u64() {
                Ok(Some(u as u32))
            } else {
                Ok(None)
            }
        }
        serde_json::Value::String(s) => Ok(s.trim().parse::<f64>().ok().map(|f| f.ceil() as u32)),
        _ => Ok(None),
    }
}

/// One row of the sightseeing catalog as stored in the `Places` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceRecord {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub place_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_rounded_u32")]
    pub avg_visit_mins: Option<u32>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub suitable_for: Option<Vec<String>>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime>,
}

/// A catalog row inside the current search radius, annotated with its
/// straight-line distance from the city center.
#[derive(Debug, Clone)]
pub struct NearbyPlace {
    pub place: PlaceRecord,
    pub distance_km: f64,
}

/// Normalized candidate handed to the drafter and the day planner. Missing
/// catalog values are resolved once, at selection time; everything downstream
/// reads these fields as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Poi {
    pub place_id: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub visit_minutes: u32,
    pub rating: f64,
    pub city: String,
    pub distance_from_city_km: f64,
    pub hop_minutes_from_city: u32,
}
