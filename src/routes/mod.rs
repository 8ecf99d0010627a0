use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::config::{apply_security_headers, create_cors_layer};
use crate::handlers::{self, bookings, reports, reviews, shows, theatres, users};
use crate::AppState;

pub fn create_routes(state: AppState) -> Router {
    let router = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/users", post(users::register))
        .route("/theatres", post(theatres::create))
        .route(
            "/theatres/:theatre_id",
            put(theatres::edit).delete(theatres::remove),
        )
        .route("/theatres/:theatre_id/schedule.csv", get(reports::schedule_csv))
        .route("/shows", post(shows::create))
        .route("/shows/:show_id", put(shows::edit).delete(shows::remove))
        .route("/shows/:show_id/bookings", post(bookings::create))
        .route("/shows/:show_id/reviews", post(reviews::create))
        .route("/summary", get(reports::summary));

    apply_security_headers(router)
        .layer(TraceLayer::new_for_http())
        .layer(create_cors_layer())
        .with_state(state)
}
