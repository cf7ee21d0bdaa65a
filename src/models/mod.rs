pub mod itinerary;
pub mod place;
pub mod policy;
