//! Core business logic - framework-agnostic assessment workflow.
//!
//! Every operation takes the caller's identity explicitly and returns structured data;
//! the HTTP layer only translates requests and responses.

/// Assessment lifecycle: creation, step flags, finalization and full edit
pub mod assessment;
/// The 17 SDGs: reference table, seeding and the in-memory catalog
pub mod goal;
/// Project lifecycle and ownership checks
pub mod project;
/// Results and step views
pub mod report;
/// Score storage and aggregation
pub mod score;
/// Wizard steps and step submission
pub mod step;
