pub mod candidate_service;
pub mod catalog_service;
pub mod day_planner_service;
pub mod distance_service;
pub mod draft_service;
pub mod itinerary_generation_service;
pub mod itinerary_service;
pub mod ollama_service;
