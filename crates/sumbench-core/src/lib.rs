//! sumbench-core — Scoring, report model, and summarization engine.
//!
//! This crate defines the data model, the metric heuristics, and the
//! provider trait that the rest of sumbench builds on.

pub mod analyzer;
pub mod engine;
pub mod error;
pub mod extract;
pub mod manifest;
pub mod metrics;
pub mod model;
pub mod parser;
pub mod report;
pub mod statistics;
pub mod traits;
