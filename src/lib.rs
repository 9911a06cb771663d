#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod analysis;
pub mod clients;
pub mod collaborators;
pub mod config;
pub mod model;
pub mod observability;
pub mod pipeline;
pub mod replay;
pub mod request;
pub mod schema;
pub mod util;
