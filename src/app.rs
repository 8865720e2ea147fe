use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::routes::{health, history, news, reports, simulations};
use crate::state::AppState;

pub fn create_app(state: AppState) -> Router {
    let router = Router::<AppState>::new()
        .nest("/health", health::router())
        .nest("/api/simulations", simulations::router())
        .nest("/api/history", history::router())
        .nest("/api/reports", reports::router())
        .nest("/api/news", news::router())
        .layer(TraceLayer::new_for_http());

    let router = if state.config.cors_allow_any {
        router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        router
    };

    router.with_state(state)
}
