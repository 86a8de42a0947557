//! Core domain types and shared infrastructure for procurechat.
//!
//! This crate is I/O-free: it holds the domain model (procurement
//! records, classification verdicts, aggregation pipelines, assistant
//! responses), the application configuration, the dataset schema text,
//! and the prompt catalog that every model call renders from.

pub mod config;
pub mod domain;
pub mod prompts;
pub mod schema;
