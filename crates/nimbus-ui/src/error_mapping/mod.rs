//! Maps weather-crate errors to nimbus_core::AppError for consistent
//! user-facing messages.

mod weather;

pub use weather::{fetch_error, location_error};
