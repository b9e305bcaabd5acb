pub mod connection;
pub mod endpoints;

pub use connection::{ApiConnectionError, OpenAiClient, TextGenerator};
