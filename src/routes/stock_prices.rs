use axum::{extract::State, Json};
use tracing::instrument;

use crate::background::snapshot::PriceMap;
use crate::state::AppState;

/// Returns the refresher's cache as-is, keyed by symbol.
#[instrument(skip(state))]
pub async fn get_stock_prices(State(state): State<AppState>) -> Json<PriceMap> {
    Json(state.price_cache.snapshot().await)
}
