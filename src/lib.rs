pub mod api_connection;
pub mod cli;
pub mod client;
pub mod config;
pub mod generation;
pub mod query;
pub mod rate_limit;
pub mod recipe;
pub mod recipe_parser;
pub mod server;
pub mod store;
