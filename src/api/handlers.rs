use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{
        FriendRecommendation, FriendshipResponse, LikeResponse, PersonResponse, PopularTrack,
        SimilarTrack, TrackDetails, TrackId, TrackSummary,
    },
    services::library,
};

use super::AppState;

// Query parameters

#[derive(Debug, Deserialize)]
pub struct NameQuery {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct LikeQuery {
    pub name: String,
    pub trackid: TrackId,
}

#[derive(Debug, Deserialize)]
pub struct FriendPairQuery {
    pub f1: String,
    pub f2: String,
}

#[derive(Debug, Deserialize)]
pub struct TopQuery {
    pub k: usize,
}

#[derive(Debug, Deserialize)]
pub struct RecommendQuery {
    pub trackid: TrackId,
    pub k: usize,
}

#[derive(Debug, Deserialize)]
pub struct RecommendFriendsQuery {
    pub name: String,
    pub k: usize,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub keyword: String,
}

#[derive(Debug, Deserialize)]
pub struct GenreQuery {
    pub name: String,
    pub k: usize,
}

fn require(value: &str, field: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::InvalidInput(format!("'{}' must not be empty", field)));
    }
    Ok(())
}

async fn require_track(state: &AppState, track_id: TrackId) -> AppResult<TrackDetails> {
    library::track_details(state.catalog.as_ref(), track_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("track {}", track_id)))
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Create a person
pub async fn create_user(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<NameQuery>,
) -> AppResult<Json<PersonResponse>> {
    require(&params.name, "name")?;
    state.graph.create_person(&params.name).await?;
    tracing::info!(request_id = %request_id, person = %params.name, "Person created");
    Ok(Json(PersonResponse { name: params.name }))
}

/// Delete a person with all of their likes and friendships
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<NameQuery>,
) -> AppResult<Json<PersonResponse>> {
    require(&params.name, "name")?;
    state.graph.delete_person(&params.name).await?;
    tracing::info!(request_id = %request_id, person = %params.name, "Person deleted");
    Ok(Json(PersonResponse { name: params.name }))
}

/// Tracks liked by a person
pub async fn get_likes(
    State(state): State<AppState>,
    Query(params): Query<NameQuery>,
) -> AppResult<Json<Vec<TrackDetails>>> {
    let tracks =
        library::liked_tracks(state.catalog.as_ref(), state.graph.as_ref(), &params.name).await?;
    Ok(Json(tracks))
}

/// Record a like
pub async fn like(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<LikeQuery>,
) -> AppResult<Json<LikeResponse>> {
    require(&params.name, "name")?;
    let track = require_track(&state, params.trackid).await?;
    state.graph.log_like(&params.name, params.trackid).await?;
    tracing::info!(
        request_id = %request_id,
        person = %params.name,
        track_id = params.trackid,
        "Like recorded"
    );
    Ok(Json(LikeResponse {
        track,
        person: params.name,
    }))
}

/// Remove a like
pub async fn remove_like(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<LikeQuery>,
) -> AppResult<Json<LikeResponse>> {
    require(&params.name, "name")?;
    let track = require_track(&state, params.trackid).await?;
    state.graph.remove_like(&params.name, params.trackid).await?;
    tracing::info!(
        request_id = %request_id,
        person = %params.name,
        track_id = params.trackid,
        "Like removed"
    );
    Ok(Json(LikeResponse {
        track,
        person: params.name,
    }))
}

/// Names of a person's friends
pub async fn get_friends(
    State(state): State<AppState>,
    Query(params): Query<NameQuery>,
) -> AppResult<Json<Vec<String>>> {
    let friends = state.graph.get_friends(&params.name).await?;
    Ok(Json(friends))
}

/// Befriend two persons
pub async fn add_friend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<FriendPairQuery>,
) -> AppResult<Json<FriendshipResponse>> {
    require(&params.f1, "f1")?;
    require(&params.f2, "f2")?;
    state.graph.create_friendship(&params.f1, &params.f2).await?;
    tracing::info!(
        request_id = %request_id,
        f1 = %params.f1,
        f2 = %params.f2,
        "Friendship created"
    );
    Ok(Json(FriendshipResponse {
        user1: params.f1,
        user2: params.f2,
    }))
}

/// Unfriend two persons
pub async fn remove_friend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<FriendPairQuery>,
) -> AppResult<Json<FriendshipResponse>> {
    require(&params.f1, "f1")?;
    require(&params.f2, "f2")?;
    state.graph.remove_friendship(&params.f1, &params.f2).await?;
    tracing::info!(
        request_id = %request_id,
        f1 = %params.f1,
        f2 = %params.f2,
        "Friendship removed"
    );
    Ok(Json(FriendshipResponse {
        user1: params.f1,
        user2: params.f2,
    }))
}

/// Distinct tracks liked by a person's friends
pub async fn get_friends_likes(
    State(state): State<AppState>,
    Query(params): Query<NameQuery>,
) -> AppResult<Json<Vec<TrackDetails>>> {
    let tracks =
        library::network_likes(state.catalog.as_ref(), state.graph.as_ref(), &params.name).await?;
    Ok(Json(tracks))
}

/// Most liked tracks
pub async fn get_most_popular(
    State(state): State<AppState>,
    Query(params): Query<TopQuery>,
) -> AppResult<Json<Vec<PopularTrack>>> {
    let popular =
        library::popular_tracks(state.catalog.as_ref(), state.graph.as_ref(), params.k).await?;
    Ok(Json(popular))
}

/// Tracks nearest to a reference track in feature space
pub async fn recommend_songs(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<RecommendQuery>,
) -> AppResult<Json<Vec<SimilarTrack>>> {
    let similar =
        library::similar_tracks(state.catalog.as_ref(), params.trackid, params.k).await?;
    tracing::info!(
        request_id = %request_id,
        track_id = params.trackid,
        k = params.k,
        returned = similar.len(),
        "Track recommendations served"
    );
    Ok(Json(similar))
}

/// Persons with the most similar taste
pub async fn recommend_friends(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<RecommendFriendsQuery>,
) -> AppResult<Json<Vec<FriendRecommendation>>> {
    let recommendations = library::friend_recommendations(
        state.catalog.as_ref(),
        state.graph.as_ref(),
        &params.name,
        params.k,
    )
    .await?;
    tracing::info!(
        request_id = %request_id,
        person = %params.name,
        k = params.k,
        returned = recommendations.len(),
        "Friend recommendations served"
    );
    Ok(Json(recommendations))
}

/// Keyword search over track titles
pub async fn search_songs(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<Vec<TrackSummary>>> {
    let tracks = state.catalog.search_titles(&params.keyword).await?;
    Ok(Json(tracks))
}

/// Tracks by artists matching a name
pub async fn get_artist_songs(
    State(state): State<AppState>,
    Query(params): Query<NameQuery>,
) -> AppResult<Json<Vec<TrackSummary>>> {
    let tracks = state.catalog.artist_tracks(&params.name).await?;
    Ok(Json(tracks))
}

/// Tracks tagged with a matching genre
pub async fn get_genre_songs(
    State(state): State<AppState>,
    Query(params): Query<GenreQuery>,
) -> AppResult<Json<Vec<TrackDetails>>> {
    let tracks = library::genre_tracks(state.catalog.as_ref(), &params.name, params.k).await?;
    Ok(Json(tracks))
}
