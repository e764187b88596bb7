pub mod social;
pub mod track;

pub use social::{
    FriendRecommendation, FriendshipResponse, LikeResponse, LikesMap, PersonResponse,
    SENTINEL_DISTANCE,
};
pub use track::{
    FeatureVector, NearestTrack, PopularTrack, SimilarTrack, TrackDetails, TrackId, TrackInfo,
    TrackSummary,
};
