use axum::{
    middleware,
    routing::{get, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers;
use super::AppState;
use crate::middleware::request_id_middleware;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Persons
        .route(
            "/user",
            put(handlers::create_user).delete(handlers::delete_user),
        )
        // Likes
        .route(
            "/like",
            get(handlers::get_likes)
                .put(handlers::like)
                .delete(handlers::remove_like),
        )
        .route("/elikes", get(handlers::get_friends_likes))
        .route("/popular", get(handlers::get_most_popular))
        // Friendships
        .route(
            "/friend",
            get(handlers::get_friends)
                .put(handlers::add_friend)
                .delete(handlers::remove_friend),
        )
        // Recommendations
        .route("/recommend", get(handlers::recommend_songs))
        .route("/recommend_friends", get(handlers::recommend_friends))
        // Catalog
        .route("/search", get(handlers::search_songs))
        .route("/artist", get(handlers::get_artist_songs))
        .route("/genre", get(handlers::get_genre_songs))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let app = create_router(AppState::in_memory());
        let response = app
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_wrong_method_is_rejected() {
        let app = create_router(AppState::in_memory());
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/user?name=Neal")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_responses_carry_request_id() {
        let app = create_router(AppState::in_memory());
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(response
            .headers()
            .contains_key(crate::middleware::REQUEST_ID_HEADER));
    }
}
