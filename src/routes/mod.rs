use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub mod analysis;
pub mod health_check;
pub mod stock;
pub mod stock_prices;

pub fn register_routes(state: AppState) -> Router {
    Router::new()
        .route("/health_check", get(health_check::health_check))
        .route("/api/stock-prices", get(stock_prices::get_stock_prices))
        .route("/api/stock/{ticker}", get(stock::get_company_profile))
        .route("/api/stock/{ticker}/news", get(stock::get_company_news))
        .route("/api/stock/{ticker}/quote", get(stock::get_quote))
        .route("/api/stock/{ticker}/rating", get(stock::get_rating))
        .route("/api/stock/{ticker}/sentiment", post(analysis::analyze_sentiment))
        .route("/api/stock/{ticker}/risk", post(analysis::analyze_risk))
        .route("/api/stock/{ticker}/peers", post(analysis::find_peers))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
