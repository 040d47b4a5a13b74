//! QueryTrack core: triage engine for inbound customer messages.
//!
//! [`triage::AutoTagger`] turns a [`triage::RawQuery`] into an
//! [`triage::AnalysisVerdict`] (category, sentiment, intent, priority and
//! tags). [`server`] exposes it over HTTP.

pub mod config;
pub mod error;
pub mod server;
pub mod triage;

pub use config::{ServiceSettings, TriageConfig};
pub use error::AppError;
pub use triage::{AnalysisVerdict, AutoTagger, RawQuery};

#[cfg(test)]
mod tests;
