use std::collections::HashSet;

use crate::{
    error::AppResult,
    models::{FriendRecommendation, PopularTrack, SimilarTrack, TrackDetails, TrackId},
    services::Recommender,
    stores::{CatalogStore, SocialGraph},
};

/// Full track object for one id, or `None` when the catalog lacks it
pub async fn track_details(
    catalog: &dyn CatalogStore,
    track_id: TrackId,
) -> AppResult<Option<TrackDetails>> {
    let Some(info) = catalog.get_track_info(track_id).await? else {
        return Ok(None);
    };
    let genres = catalog.get_genres(track_id).await?;
    Ok(Some(TrackDetails::new(info, genres)))
}

/// Track objects for a list of ids, in order, skipping ids the catalog lacks
pub async fn tracks_details(
    catalog: &dyn CatalogStore,
    track_ids: &[TrackId],
) -> AppResult<Vec<TrackDetails>> {
    let mut out = Vec::with_capacity(track_ids.len());
    for &track_id in track_ids {
        match track_details(catalog, track_id).await? {
            Some(details) => out.push(details),
            None => tracing::warn!(track_id, "Liked track missing from catalog"),
        }
    }
    Ok(out)
}

/// Tracks liked by a person
pub async fn liked_tracks(
    catalog: &dyn CatalogStore,
    graph: &dyn SocialGraph,
    name: &str,
) -> AppResult<Vec<TrackDetails>> {
    let liked = graph.get_liked_tracks(name).await?;
    tracks_details(catalog, &liked).await
}

/// Distinct tracks liked across a person's friends, in first-seen order
pub async fn network_likes(
    catalog: &dyn CatalogStore,
    graph: &dyn SocialGraph,
    name: &str,
) -> AppResult<Vec<TrackDetails>> {
    let mut seen = HashSet::new();
    let distinct: Vec<TrackId> = graph
        .get_friends_liked_tracks(name)
        .await?
        .into_iter()
        .filter(|id| seen.insert(*id))
        .collect();
    tracks_details(catalog, &distinct).await
}

/// The `k` most liked tracks with their listener counts
pub async fn popular_tracks(
    catalog: &dyn CatalogStore,
    graph: &dyn SocialGraph,
    k: usize,
) -> AppResult<Vec<PopularTrack>> {
    let mut out = Vec::new();
    for (track_id, num_listeners) in graph.most_popular(k).await? {
        if let Some(track) = track_details(catalog, track_id).await? {
            out.push(PopularTrack {
                num_listeners,
                track,
            });
        }
    }
    Ok(out)
}

/// The `k` tracks nearest to `track_id` in feature space
pub async fn similar_tracks(
    catalog: &dyn CatalogStore,
    track_id: TrackId,
    k: usize,
) -> AppResult<Vec<SimilarTrack>> {
    let nearest = Recommender::new(catalog).nearest_tracks(track_id, k).await?;

    let mut out = Vec::with_capacity(nearest.len());
    for neighbour in nearest {
        if let Some(track) = track_details(catalog, neighbour.track_id).await? {
            out.push(SimilarTrack {
                track,
                similarity: neighbour.distance,
            });
        }
    }
    Ok(out)
}

/// The `k` persons whose liked tracks are least dissimilar from `name`'s
pub async fn friend_recommendations(
    catalog: &dyn CatalogStore,
    graph: &dyn SocialGraph,
    name: &str,
    k: usize,
) -> AppResult<Vec<FriendRecommendation>> {
    let likes = graph.retrieve_all_likes().await?;
    Recommender::new(catalog)
        .recommend_friends(name, &likes, k)
        .await
}

/// Up to `k` tracks tagged with a genre matching `genre`
pub async fn genre_tracks(
    catalog: &dyn CatalogStore,
    genre: &str,
    k: usize,
) -> AppResult<Vec<TrackDetails>> {
    let ids = catalog.tracks_by_genre(genre, k).await?;
    tracks_details(catalog, &ids).await
}
