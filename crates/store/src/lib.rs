//! Document store boundary for procurechat.
//!
//! The chat core needs exactly two operations from the store: run an
//! aggregation pipeline against a collection, and bulk-replace a
//! collection's contents during dataset load. Both sit behind the
//! [`DocumentStore`] trait; [`DataApiClient`] implements it over the
//! document database's HTTP Data API.

pub mod client;
pub mod ingest;

pub use client::{DataApiClient, DocumentStore, StoreError};
pub use ingest::{load_dataset, parse_documents, IngestError};
