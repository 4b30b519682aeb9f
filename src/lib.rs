//! proposalgen - Funding Proposal Generator
//!
//! Core library turning feasibility-report text into grant-ready
//! funding-proposal PDFs. Generation is delegated to Google's Generative
//! Language API with model discovery, priority selection, and
//! fallback/retry across candidate models.

pub mod config;
pub mod core;
pub mod server;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
