pub mod generative;

pub use generative::GenerativeClient;
