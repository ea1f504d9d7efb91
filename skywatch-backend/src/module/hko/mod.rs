//! Hong Kong Observatory open data
//!
//! Local forecast, current readings, mean visibility and the nine-day
//! forecast, exposed to the engine as [`WeatherFeeds`](crate::module::suitability::WeatherFeeds).

pub mod types;
pub mod parser;
pub mod client;

pub use client::HkoClient;
