// Shared helpers for the integration suites.

#[path = "fixtures.rs"]
pub mod fixtures;
