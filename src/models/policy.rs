use serde::{Deserialize, Serialize};

/// Tunable knobs for a planning run. `Default` carries the reference values;
/// every field can be overridden through a `PLANNER_*` environment variable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanningPolicy {
    /// Minutes available per day for travel plus visits
    pub day_budget_minutes: u32,
    /// Minutes reserved at the end of every day
    pub end_of_day_buffer_min: u32,
    /// Fixed overhead added to every hop (parking, tickets, walking)
    pub per_hop_buffer_min: u32,
    /// Assumed driving speed when both hop endpoints are urban
    pub urban_speed_kmh: f64,
    /// Assumed driving speed outside the urban radius
    pub intercity_speed_kmh: f64,
    /// Distance from the city center that still counts as urban
    pub urban_radius_km: f64,
    /// One-way distance ceiling for any candidate
    pub out_of_city_one_way_km_max: f64,
    /// Upper edge of the near distance band
    pub near_band_km: f64,
    /// Upper edge of the mid distance band
    pub mid_band_km: f64,
    /// Candidates kept from the near band
    pub near_cap: usize,
    /// Candidates kept from the mid band
    pub mid_cap: usize,
    /// Candidates kept from the far band
    pub far_cap: usize,
    /// Global cap on the candidate list handed to the drafter
    pub max_candidates: usize,
    /// Fewest stops that make a full day
    pub min_items_per_day: usize,
    /// Preferred stops per day
    pub target_items_per_day: usize,
    /// Hard cap on stops per day
    pub max_items_per_day: usize,
    /// Distance at which a place counts as a dedicated day trip
    pub far_distance_km: f64,
    /// Hop time at which a place counts as a dedicated day trip
    pub far_hop_minutes: u32,
    /// Fraction of the day budget a lone far stop must consume
    pub full_day_utilization: f64,
    /// Visit duration assumed when the catalog has none
    pub default_visit_minutes: u32,
    /// Seconds before an inference call is abandoned
    pub inference_timeout_secs: u64,
}

impl Default for PlanningPolicy {
    fn default() -> Self {
        Self {
            day_budget_minutes: 480,
            end_of_day_buffer_min: 30,
            per_hop_buffer_min: 12,
            urban_speed_kmh: 25.0,
            intercity_speed_kmh: 55.0,
            urban_radius_km: 20.0,
            out_of_city_one_way_km_max: 220.0,
            near_band_km: 30.0,
            mid_band_km: 80.0,
            near_cap: 18,
            mid_cap: 12,
            far_cap: 12,
            max_candidates: 42,
            min_items_per_day: 3,
            target_items_per_day: 4,
            max_items_per_day: 5,
            far_distance_km: 60.0,
            far_hop_minutes: 90,
            full_day_utilization: 0.7,
            default_visit_minutes: 90,
            inference_timeout_secs: 60,
        }
    }
}

impl PlanningPolicy {
    /// Load the policy from environment variables, falling back to defaults
    /// for anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            day_budget_minutes: std::env::var("PLANNER_DAY_BUDGET_MINUTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.day_budget_minutes),
            end_of_day_buffer_min: std::env::var("PLANNER_END_OF_DAY_BUFFER_MIN")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.end_of_day_buffer_min),
            per_hop_buffer_min: std::env::var("PLANNER_PER_HOP_BUFFER_MIN")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.per_hop_buffer_min),
            urban_speed_kmh: std::env::var("PLANNER_URBAN_SPEED_KMH")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.urban_speed_kmh),
            intercity_speed_kmh: std::env::var("PLANNER_INTERCITY_SPEED_KMH")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.intercity_speed_kmh),
            urban_radius_km: std::env::var("PLANNER_URBAN_RADIUS_KM")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.urban_radius_km),
            out_of_city_one_way_km_max: std::env::var("PLANNER_OUT_OF_CITY_KM_MAX")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.out_of_city_one_way_km_max),
            near_band_km: std::env::var("PLANNER_NEAR_BAND_KM")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.near_band_km),
            mid_band_km: std::env::var("PLANNER_MID_BAND_KM")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.mid_band_km),
            near_cap: std::env::var("PLANNER_NEAR_CAP")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.near_cap),
            mid_cap: std::env::var("PLANNER_MID_CAP")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.mid_cap),
            far_cap: std::env::var("PLANNER_FAR_CAP")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.far_cap),
            max_candidates: std::env::var("PLANNER_MAX_CANDIDATES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_candidates),
            min_items_per_day: std::env::var("PLANNER_MIN_ITEMS_PER_DAY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.min_items_per_day),
            target_items_per_day: std::env::var("PLANNER_TARGET_ITEMS_PER_DAY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.target_items_per_day),
            max_items_per_day: std::env::var("PLANNER_MAX_ITEMS_PER_DAY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_items_per_day),
            far_distance_km: std::env::var("PLANNER_FAR_DISTANCE_KM")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.far_distance_km),
            far_hop_minutes: std::env::var("PLANNER_FAR_HOP_MINUTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.far_hop_minutes),
            full_day_utilization: std::env::var("PLANNER_FULL_DAY_UTILIZATION")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.full_day_utilization),
            default_visit_minutes: std::env::var("PLANNER_DEFAULT_VISIT_MINUTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.default_visit_minutes),
            inference_timeout_secs: std::env::var("PLANNER_INFERENCE_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.inference_timeout_secs),
        }
    }

    /// Search radius grows with trip length so longer trips reach day-trip
    /// territory. Never shrinks as days increase.
    pub fn search_radius_km(&self, days: u32) -> f64 {
        match days {
            0 | 1 => 25.0,
            2 => 60.0,
            3 => 120.0,
            4 => 160.0,
            _ => 160.0_f64.max(self.out_of_city_one_way_km_max),
        }
    }
}
