mod client;
mod models;

pub use client::{GenerativeClient, fallback_description};
pub use models::GenerationConfig;
