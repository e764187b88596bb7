use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Catalog identifier of a track
pub type TrackId = i64;

/// Date format used for `date_created` in API responses
pub const DATE_FORMAT: &str = "%m/%d/%Y";

/// Three-dimensional audio descriptor of a track
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector(pub [f64; 3]);

impl FeatureVector {
    pub fn new(f1: f64, f2: f64, f3: f64) -> Self {
        Self([f1, f2, f3])
    }

    /// Euclidean distance between two vectors
    pub fn distance(&self, other: &FeatureVector) -> f64 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f64>()
            .sqrt()
    }
}

/// Catalog record for a single track, joined with its artist
#[derive(Debug, Clone, PartialEq)]
pub struct TrackInfo {
    pub track_id: TrackId,
    pub title: String,
    pub artist: String,
    pub listens: i64,
    pub date_created: NaiveDateTime,
    /// Duration in seconds
    pub duration: i32,
}

/// Id and title pair returned by keyword and artist searches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackSummary {
    pub track_id: TrackId,
    pub track_name: String,
}

/// Track object as rendered to API clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackDetails {
    pub track_id: TrackId,
    pub track_name: String,
    pub artist: String,
    pub listens: i64,
    pub date_created: String,
    pub track_duration: i32,
    pub genres: Vec<String>,
}

impl TrackDetails {
    pub fn new(info: TrackInfo, genres: Vec<String>) -> Self {
        Self {
            track_id: info.track_id,
            track_name: info.title,
            artist: info.artist,
            listens: info.listens,
            date_created: info.date_created.format(DATE_FORMAT).to_string(),
            track_duration: info.duration,
            genres,
        }
    }
}

/// A neighbouring track found by feature-space search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestTrack {
    pub track_id: TrackId,
    pub distance: f64,
}

/// Track object extended with its distance to the reference track
#[derive(Debug, Clone, Serialize)]
pub struct SimilarTrack {
    #[serde(flatten)]
    pub track: TrackDetails,
    pub similarity: f64,
}

/// Track object extended with the number of persons liking it
#[derive(Debug, Clone, Serialize)]
pub struct PopularTrack {
    pub num_listeners: i64,
    #[serde(flatten)]
    pub track: TrackDetails,
}
