// Access Gate: fixed-window rate limiting composed with an optional geofence.
// Also hosts the lighter country screen and submission ledger used by the
// skin-analysis flow.

pub mod address;
pub mod clock;
pub mod distance;
pub mod gate;
pub mod geo;
pub mod ledger;
pub mod region;
pub mod window;
