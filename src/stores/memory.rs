//! In-process implementations of the store traits.
//!
//! Used by the integration tests and for running the API without external
//! databases. Semantics follow the Postgres and Neo4j backends: substring
//! searches are case-insensitive, likes on unknown persons are ignored and
//! friendship changes touch both directions under a single write lock.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tokio::sync::RwLock;

use crate::{
    error::AppResult,
    models::{FeatureVector, TrackId, TrackInfo, TrackSummary},
    stores::{CatalogStore, SocialGraph},
};

/// A cataloged track with everything the catalog knows about it
#[derive(Debug, Clone)]
pub struct CatalogTrack {
    pub info: TrackInfo,
    pub features: FeatureVector,
    pub genres: Vec<String>,
}

/// Track catalog held in memory, ordered by track id
#[derive(Default)]
pub struct InMemoryCatalog {
    tracks: RwLock<BTreeMap<TrackId, CatalogTrack>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert for setting up fixtures
    pub fn with_track(mut self, track: CatalogTrack) -> Self {
        self.tracks.get_mut().insert(track.info.track_id, track);
        self
    }

    pub async fn len(&self) -> usize {
        self.tracks.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tracks.read().await.is_empty()
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn summary(track: &CatalogTrack) -> TrackSummary {
    TrackSummary {
        track_id: track.info.track_id,
        track_name: track.info.title.clone(),
    }
}

#[async_trait::async_trait]
impl CatalogStore for InMemoryCatalog {
    async fn get_feature_vector(&self, track_id: TrackId) -> AppResult<Option<FeatureVector>> {
        Ok(self.tracks.read().await.get(&track_id).map(|t| t.features))
    }

    async fn feature_vectors(
        &self,
        track_ids: &[TrackId],
    ) -> AppResult<HashMap<TrackId, FeatureVector>> {
        let tracks = self.tracks.read().await;
        Ok(track_ids
            .iter()
            .filter_map(|id| tracks.get(id).map(|t| (*id, t.features)))
            .collect())
    }

    async fn all_feature_vectors(&self) -> AppResult<Vec<(TrackId, FeatureVector)>> {
        Ok(self
            .tracks
            .read()
            .await
            .iter()
            .map(|(id, t)| (*id, t.features))
            .collect())
    }

    async fn get_track_ids(&self) -> AppResult<Vec<TrackId>> {
        Ok(self.tracks.read().await.keys().copied().collect())
    }

    async fn get_track_info(&self, track_id: TrackId) -> AppResult<Option<TrackInfo>> {
        Ok(self
            .tracks
            .read()
            .await
            .get(&track_id)
            .map(|t| t.info.clone()))
    }

    async fn get_genres(&self, track_id: TrackId) -> AppResult<Vec<String>> {
        Ok(self
            .tracks
            .read()
            .await
            .get(&track_id)
            .map(|t| t.genres.clone())
            .unwrap_or_default())
    }

    async fn search_titles(&self, keyword: &str) -> AppResult<Vec<TrackSummary>> {
        Ok(self
            .tracks
            .read()
            .await
            .values()
            .filter(|t| contains_ignore_case(&t.info.title, keyword))
            .map(summary)
            .collect())
    }

    async fn find_track_id(&self, title: &str) -> AppResult<Option<TrackId>> {
        Ok(self
            .tracks
            .read()
            .await
            .values()
            .find(|t| contains_ignore_case(&t.info.title, title))
            .map(|t| t.info.track_id))
    }

    async fn artist_tracks(&self, artist: &str) -> AppResult<Vec<TrackSummary>> {
        Ok(self
            .tracks
            .read()
            .await
            .values()
            .filter(|t| contains_ignore_case(&t.info.artist, artist))
            .map(summary)
            .collect())
    }

    async fn tracks_by_genre(&self, genre: &str, limit: usize) -> AppResult<Vec<TrackId>> {
        Ok(self
            .tracks
            .read()
            .await
            .values()
            .filter(|t| t.genres.iter().any(|g| contains_ignore_case(g, genre)))
            .map(|t| t.info.track_id)
            .take(limit)
            .collect())
    }
}

#[derive(Default)]
struct GraphState {
    /// Persons in creation order
    persons: Vec<String>,
    songs: BTreeSet<TrackId>,
    /// LIKES edges in creation order; duplicates allowed
    likes: Vec<(String, TrackId)>,
    /// Directed FRIENDS_WITH edges
    friendships: Vec<(String, String)>,
}

impl GraphState {
    fn has_person(&self, name: &str) -> bool {
        self.persons.iter().any(|p| p == name)
    }
}

/// Social graph held in memory
#[derive(Default)]
pub struct InMemoryGraph {
    state: RwLock<GraphState>,
}

impl InMemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl SocialGraph for InMemoryGraph {
    async fn create_person(&self, name: &str) -> AppResult<()> {
        let mut state = self.state.write().await;
        if !state.has_person(name) {
            state.persons.push(name.to_string());
        }
        Ok(())
    }

    async fn delete_person(&self, name: &str) -> AppResult<()> {
        let mut state = self.state.write().await;
        state.persons.retain(|p| p != name);
        state.likes.retain(|(p, _)| p != name);
        state.friendships.retain(|(a, b)| a != name && b != name);
        Ok(())
    }

    async fn create_song(&self, track_id: TrackId) -> AppResult<()> {
        self.state.write().await.songs.insert(track_id);
        Ok(())
    }

    async fn log_like(&self, name: &str, track_id: TrackId) -> AppResult<()> {
        let mut state = self.state.write().await;
        if !state.has_person(name) {
            tracing::debug!(person = %name, "Ignoring like from unknown person");
            return Ok(());
        }
        state.songs.insert(track_id);
        state.likes.push((name.to_string(), track_id));
        Ok(())
    }

    async fn remove_like(&self, name: &str, track_id: TrackId) -> AppResult<()> {
        self.state
            .write()
            .await
            .likes
            .retain(|(p, t)| !(p == name && *t == track_id));
        Ok(())
    }

    async fn create_friendship(&self, a: &str, b: &str) -> AppResult<()> {
        let mut state = self.state.write().await;
        if !(state.has_person(a) && state.has_person(b)) {
            return Ok(());
        }
        state.friendships.push((a.to_string(), b.to_string()));
        state.friendships.push((b.to_string(), a.to_string()));
        Ok(())
    }

    async fn remove_friendship(&self, a: &str, b: &str) -> AppResult<()> {
        self.state
            .write()
            .await
            .friendships
            .retain(|(x, y)| !((x == a && y == b) || (x == b && y == a)));
        Ok(())
    }

    async fn get_liked_tracks(&self, name: &str) -> AppResult<Vec<TrackId>> {
        Ok(self
            .state
            .read()
            .await
            .likes
            .iter()
            .filter(|(p, _)| p == name)
            .map(|(_, t)| *t)
            .collect())
    }

    async fn get_friends(&self, name: &str) -> AppResult<Vec<String>> {
        Ok(self
            .state
            .read()
            .await
            .friendships
            .iter()
            .filter(|(from, _)| from == name)
            .map(|(_, to)| to.clone())
            .collect())
    }

    async fn get_all_persons(&self) -> AppResult<Vec<String>> {
        Ok(self.state.read().await.persons.clone())
    }

    async fn most_popular(&self, k: usize) -> AppResult<Vec<(TrackId, i64)>> {
        let state = self.state.read().await;
        let mut counts: Vec<(TrackId, i64)> = state
            .songs
            .iter()
            .map(|song| {
                let listeners = state.likes.iter().filter(|(_, t)| t == song).count();
                (*song, listeners as i64)
            })
            .collect();

        counts.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        counts.truncate(k);
        Ok(counts)
    }
}
