pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod jobs;
pub mod mcp;
pub mod routes;
pub mod server;
pub mod shutdown;
pub mod summarizer;
pub mod usage;

pub mod test_utils;

pub use config::Config;
pub use server::Server;
