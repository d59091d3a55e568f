//! # Grader Library
//!
//! This crate provides the core logic for AI-assisted grading of code submissions.
//! It supports acquiring a submission's repository branch into an ephemeral
//! workspace, collecting the gradable source files into a single corpus,
//! scoring that corpus through an external completion service, and persisting
//! the resulting review so that repeated requests for the same submission are
//! served from the store instead of paying for a second analysis.
//!
//! ## Key Concepts
//! - **GradingService**: The pipeline controller for a single grading request.
//! - **WorkspaceManager**: Ephemeral, uniquely named checkouts with guaranteed cleanup.
//! - **Scanner**: Deterministic source-file discovery and corpus concatenation.
//! - **ScoreEngine**: Pluggable scoring strategy (OpenAI-backed in production).
//! - **ReviewStore**: Pluggable persistence for completed reviews (SeaORM-backed
//!   in production, in-memory for tests).

pub mod error;
pub mod orchestrator;
pub mod scanner;
pub mod scoring;
pub mod store;
pub mod summary;
pub mod types;
pub mod workspace;
