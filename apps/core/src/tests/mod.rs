//! Test Module
//!
//! Cross-module test suite for the triage service.
//!
//! ## Test Categories
//! - `triage_tests`: Reference scenarios and verdict properties
//! - `collaborator_tests`: Mock sentiment and zero-shot models, fallback paths
//! - `remote_tests`: HTTP model clients against wiremock
//! - `config_tests`: Environment and file configuration loading
//! - `server_tests`: HTTP surface end to end

pub mod collaborator_tests;
pub mod config_tests;
