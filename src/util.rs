pub mod json;
pub mod retry;
pub mod time;
