pub mod app_state;
pub mod client;
pub mod config;
pub mod error;
pub mod integrator;
pub mod prompt;
pub mod prompts;
pub mod server;
pub mod table;
pub mod triage;
pub mod validators;
