// Library root — exposes the request pipeline for the binary and integration tests.
// The binary entry point is src/main.rs.

pub mod checker;
pub mod config;
pub mod emergency;
pub mod error;
pub mod extract;
pub mod http;
pub mod llm;
pub mod logger;
pub mod models;
pub mod prompts;
pub mod store;
