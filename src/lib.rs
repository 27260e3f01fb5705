pub mod analysis;
pub mod background;
pub mod clients;
pub mod config;
pub mod errors;
pub mod extractors;
pub mod routes;
pub mod state;
pub mod utils;
