pub mod price_cache;
pub mod snapshot;
