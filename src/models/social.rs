use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{TrackDetails, TrackId};

/// Every person in the graph mapped to the tracks they like
pub type LikesMap = BTreeMap<String, Vec<TrackId>>;

/// Score assigned when two persons have no comparable liked tracks
pub const SENTINEL_DISTANCE: f64 = 999_999.0;

/// A person ranked against the target by liked-track dissimilarity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FriendRecommendation {
    pub friend: String,
    /// Maximum pairwise feature distance; lower ranks first
    pub similarity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonResponse {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FriendshipResponse {
    pub user1: String,
    pub user2: String,
}

/// Track object annotated with the person whose like was changed
#[derive(Debug, Clone, Serialize)]
pub struct LikeResponse {
    #[serde(flatten)]
    pub track: TrackDetails,
    pub person: String,
}
