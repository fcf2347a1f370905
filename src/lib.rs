//! Consignment intake: photo detection, per-item annotation, draft
//! persistence and PDF document generation.

pub mod cli;
pub mod config;
pub mod detect;
pub mod email;
pub mod error;
pub mod export;
pub mod form;
pub mod llm;
pub mod lookup;
pub mod session;
pub mod store;
pub mod workflow;
