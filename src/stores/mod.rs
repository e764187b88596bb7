//! Data collaborators behind the API
//!
//! The track catalog lives in a relational store and the social graph in a
//! graph store. Handlers and the recommender only see these traits, so either
//! side can be swapped for the in-memory backends in tests.

use std::collections::HashMap;

use crate::{
    error::AppResult,
    models::{FeatureVector, LikesMap, TrackId, TrackInfo, TrackSummary},
};

pub mod memory;
pub mod neo4j;
pub mod postgres;

pub use memory::{InMemoryCatalog, InMemoryGraph};
pub use neo4j::Neo4jSocialGraph;
pub use postgres::PgCatalogStore;

/// Read-only access to the track catalog
///
/// Lookups of ids that are not cataloged resolve to `None` or an empty
/// collection. Errors are reserved for store failures.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogStore: Send + Sync {
    /// Feature vector of one track
    async fn get_feature_vector(&self, track_id: TrackId) -> AppResult<Option<FeatureVector>>;

    /// Feature vectors for a set of tracks; uncataloged ids are absent from the map
    async fn feature_vectors(
        &self,
        track_ids: &[TrackId],
    ) -> AppResult<HashMap<TrackId, FeatureVector>>;

    /// Every cataloged track with its feature vector
    async fn all_feature_vectors(&self) -> AppResult<Vec<(TrackId, FeatureVector)>>;

    /// Ids of every cataloged track
    async fn get_track_ids(&self) -> AppResult<Vec<TrackId>>;

    /// Track record joined with its artist
    async fn get_track_info(&self, track_id: TrackId) -> AppResult<Option<TrackInfo>>;

    /// Genre tags of a track
    async fn get_genres(&self, track_id: TrackId) -> AppResult<Vec<String>>;

    /// Tracks whose title contains `keyword`, case-insensitively
    async fn search_titles(&self, keyword: &str) -> AppResult<Vec<TrackSummary>>;

    /// First track whose title contains `title`, case-insensitively
    async fn find_track_id(&self, title: &str) -> AppResult<Option<TrackId>>;

    /// Tracks by artists whose name contains `artist`, case-insensitively
    async fn artist_tracks(&self, artist: &str) -> AppResult<Vec<TrackSummary>>;

    /// Up to `limit` tracks tagged with a genre containing `genre`
    async fn tracks_by_genre(&self, genre: &str, limit: usize) -> AppResult<Vec<TrackId>>;
}

/// Persons, songs and the LIKES / FRIENDS_WITH relationships between them
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SocialGraph: Send + Sync {
    async fn create_person(&self, name: &str) -> AppResult<()>;

    /// Removes a person along with every like and friendship touching them
    async fn delete_person(&self, name: &str) -> AppResult<()>;

    async fn create_song(&self, track_id: TrackId) -> AppResult<()>;

    /// Records that `name` likes a track; the song node is created on demand
    async fn log_like(&self, name: &str, track_id: TrackId) -> AppResult<()>;

    async fn remove_like(&self, name: &str, track_id: TrackId) -> AppResult<()>;

    /// Links two persons in both directions as one operation
    async fn create_friendship(&self, a: &str, b: &str) -> AppResult<()>;

    /// Unlinks two persons in both directions as one operation
    async fn remove_friendship(&self, a: &str, b: &str) -> AppResult<()>;

    async fn get_liked_tracks(&self, name: &str) -> AppResult<Vec<TrackId>>;

    async fn get_friends(&self, name: &str) -> AppResult<Vec<String>>;

    /// Tracks liked by any friend of `name`, friend by friend, duplicates kept
    async fn get_friends_liked_tracks(&self, name: &str) -> AppResult<Vec<TrackId>> {
        let mut tracks = Vec::new();
        for friend in self.get_friends(name).await? {
            tracks.extend(self.get_liked_tracks(&friend).await?);
        }
        Ok(tracks)
    }

    async fn get_all_persons(&self) -> AppResult<Vec<String>>;

    /// Every person mapped to the tracks they like
    async fn retrieve_all_likes(&self) -> AppResult<LikesMap> {
        let mut likes = LikesMap::new();
        for person in self.get_all_persons().await? {
            let tracks = self.get_liked_tracks(&person).await?;
            likes.insert(person, tracks);
        }
        Ok(likes)
    }

    /// The `k` songs with the most likes, paired with their like count
    async fn most_popular(&self, k: usize) -> AppResult<Vec<(TrackId, i64)>>;
}
