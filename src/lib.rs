// Pihelm - Remote service orchestration for a single Pi host
// Library root

pub mod api;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod remote;
pub mod version;
