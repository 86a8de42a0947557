//! Assistant runtime - message classification and query generation
//!
//! This crate turns free-form user text into answers over the
//! procurement dataset:
//!
//! 1. **Classification** (`classifier`) - decide how a message should be
//!    handled (data query, general question, chat, clarification)
//! 2. **Query generation** (`generator`) - translate a question into an
//!    aggregation pipeline and run it against the document store
//! 3. **Validation** (`validator`) - allow-list the operators a
//!    generated pipeline may use before it executes
//! 4. **Orchestration** (`assistant`) - route to one of four handler
//!    paths and always hand the caller a structured response
//!
//! # Safety principle
//!
//! The model is strictly a translator and a summarizer. It never talks
//! to the store directly: every pipeline it proposes passes through the
//! operator allow-list before execution, and every failure degrades to
//! a structured error payload instead of surfacing.

pub mod assistant;
pub mod classifier;
pub mod generator;
pub mod llm;
pub mod validator;

#[cfg(test)]
pub(crate) mod testing;
