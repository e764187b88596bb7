use std::collections::BTreeSet;

use crate::{
    error::AppResult,
    models::{
        FeatureVector, FriendRecommendation, LikesMap, NearestTrack, TrackId, SENTINEL_DISTANCE,
    },
    stores::CatalogStore,
};

/// Similarity rankings over the catalog's feature space
///
/// Borrows the catalog client for the duration of one request; it holds no
/// state of its own.
pub struct Recommender<'a> {
    catalog: &'a dyn CatalogStore,
}

impl<'a> Recommender<'a> {
    pub fn new(catalog: &'a dyn CatalogStore) -> Self {
        Self { catalog }
    }

    /// Finds the `k` tracks closest to `track_id` by Euclidean feature distance
    ///
    /// The reference track never appears in its own results. An unknown
    /// reference yields an empty list.
    pub async fn nearest_tracks(
        &self,
        track_id: TrackId,
        k: usize,
    ) -> AppResult<Vec<NearestTrack>> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let Some(reference) = self.catalog.get_feature_vector(track_id).await? else {
            tracing::debug!(track_id, "Reference track not in catalog");
            return Ok(Vec::new());
        };

        let candidates = self.catalog.all_feature_vectors().await?;
        let nearest = rank_by_distance(track_id, &reference, candidates, k);

        tracing::debug!(track_id, k, found = nearest.len(), "Nearest tracks ranked");
        Ok(nearest)
    }

    /// Ranks every other person in `likes` against `person`
    ///
    /// The score is the maximum feature distance over all pairs of liked
    /// tracks, so lower is more alike. Persons with nothing to compare score
    /// [`SENTINEL_DISTANCE`]. Liked tracks missing from the catalog are
    /// ignored. An unknown `person` yields an empty list.
    pub async fn recommend_friends(
        &self,
        person: &str,
        likes: &LikesMap,
        k: usize,
    ) -> AppResult<Vec<FriendRecommendation>> {
        let Some(target_tracks) = likes.get(person) else {
            tracing::debug!(person = %person, "Person has no entry in likes data");
            return Ok(Vec::new());
        };

        let referenced: Vec<TrackId> = likes
            .values()
            .flatten()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let vectors = self.catalog.feature_vectors(&referenced).await?;

        let features_of = |tracks: &[TrackId]| -> Vec<FeatureVector> {
            tracks
                .iter()
                .filter_map(|id| vectors.get(id).copied())
                .collect()
        };

        let target = features_of(target_tracks);
        let mut ranked: Vec<FriendRecommendation> = likes
            .iter()
            .filter(|(name, _)| name.as_str() != person)
            .map(|(name, tracks)| FriendRecommendation {
                friend: name.clone(),
                similarity: max_pairwise_distance(&target, &features_of(tracks)),
            })
            .collect();

        ranked.sort_by(|a, b| {
            a.similarity
                .total_cmp(&b.similarity)
                .then_with(|| a.friend.cmp(&b.friend))
        });
        ranked.truncate(k);

        tracing::debug!(
            person = %person,
            candidates = likes.len().saturating_sub(1),
            returned = ranked.len(),
            "Friend recommendations ranked"
        );
        Ok(ranked)
    }
}

/// Orders candidates by distance to `reference`, dropping the reference itself
///
/// Equal distances fall back to ascending track id.
pub fn rank_by_distance(
    reference_id: TrackId,
    reference: &FeatureVector,
    candidates: impl IntoIterator<Item = (TrackId, FeatureVector)>,
    k: usize,
) -> Vec<NearestTrack> {
    let mut ranked: Vec<NearestTrack> = candidates
        .into_iter()
        .filter(|(id, _)| *id != reference_id)
        .map(|(id, features)| NearestTrack {
            track_id: id,
            distance: reference.distance(&features),
        })
        .collect();

    ranked.sort_by(|a, b| {
        a.distance
            .total_cmp(&b.distance)
            .then_with(|| a.track_id.cmp(&b.track_id))
    });
    ranked.truncate(k);
    ranked
}

/// Largest distance between any track in `a` and any track in `b`
pub fn max_pairwise_distance(a: &[FeatureVector], b: &[FeatureVector]) -> f64 {
    a.iter()
        .flat_map(|x| b.iter().map(move |y| x.distance(y)))
        .reduce(f64::max)
        .unwrap_or(SENTINEL_DISTANCE)
}
