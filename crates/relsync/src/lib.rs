//! JPA entity relationship analysis and bidirectional synchronization code
//! synthesis.
//!
//! The pipeline classifies relationship fields, detects reference cycles,
//! pairs inverse sides, advises cascade and fetch policies, and generates
//! Java accessors that keep both sides of every association consistent.

pub mod analysis;
pub mod annotations;
pub mod cancellation;
pub mod code_generator;
pub mod code_model;
pub mod config;
pub mod dirs;
pub mod java_ast;
pub mod java_builder;
pub mod java_codegen;
pub mod model;
pub mod naming;
pub mod orchestrator;
pub mod type_ref;
pub mod types;
