//! HTTP request / response types.
//!
//! Field casing follows the web client: request bodies and the
//! `combinedMessage` wrapper are camelCase, stored rows are snake_case.

pub mod itinerary;
