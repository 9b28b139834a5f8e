// Esthetics concierge: a geofenced, rate-limited session start followed by a
// structured questionnaire that is turned into a protocol summary and emailed
// to the client and the provider.

pub mod handlers;
pub mod models;
pub mod protocol;
pub mod questions;
pub mod sessions;
