use axum::{
    routing::get,
    Router,
};

use crate::api::state::AppState;
use crate::api::{city_handlers, handlers, point_of_interest_handlers};
use crate::store::traits::Store;

pub fn create_router<S: Store + 'static>() -> Router<AppState<S>> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Cities
        .route("/api/cities", get(city_handlers::get_cities::<S>))
        .route("/api/cities/:city_id", get(city_handlers::get_city::<S>))
        // Points of interest, always scoped to their city
        .route(
            "/api/cities/:city_id/pointsofinterest",
            get(point_of_interest_handlers::get_points_of_interest::<S>)
                .post(point_of_interest_handlers::create_point_of_interest::<S>),
        )
        .route(
            "/api/cities/:city_id/pointsofinterest/:point_of_interest_id",
            get(point_of_interest_handlers::get_point_of_interest::<S>)
                .put(point_of_interest_handlers::update_point_of_interest::<S>)
                .patch(point_of_interest_handlers::partially_update_point_of_interest::<S>)
                .delete(point_of_interest_handlers::delete_point_of_interest::<S>),
        )
}
