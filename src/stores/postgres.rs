use std::collections::HashMap;

use chrono::NaiveDateTime;
use sqlx::{FromRow, PgPool};
use tracing::instrument;

use crate::{
    error::AppResult,
    models::{FeatureVector, TrackId, TrackInfo, TrackSummary},
    stores::CatalogStore,
};

/// Track catalog backed by PostgreSQL
#[derive(Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
}

#[derive(FromRow)]
struct FeatureRow {
    id: TrackId,
    feature1: f64,
    feature2: f64,
    feature3: f64,
}

impl FeatureRow {
    fn vector(&self) -> FeatureVector {
        FeatureVector::new(self.feature1, self.feature2, self.feature3)
    }

    fn into_pair(self) -> (TrackId, FeatureVector) {
        (self.id, self.vector())
    }
}

#[derive(FromRow)]
struct TrackInfoRow {
    id: TrackId,
    title: String,
    artist: String,
    listens: i64,
    date_created: NaiveDateTime,
    duration: i32,
}

impl From<TrackInfoRow> for TrackInfo {
    fn from(row: TrackInfoRow) -> Self {
        TrackInfo {
            track_id: row.id,
            title: row.title.trim().to_string(),
            artist: row.artist.trim().to_string(),
            listens: row.listens,
            date_created: row.date_created,
            duration: row.duration,
        }
    }
}

#[derive(FromRow)]
struct SummaryRow {
    id: TrackId,
    title: String,
}

impl From<SummaryRow> for TrackSummary {
    fn from(row: SummaryRow) -> Self {
        TrackSummary {
            track_id: row.id,
            track_name: row.title.trim().to_string(),
        }
    }
}

/// A track tagged with several matching genres is still listed once
const TRACKS_BY_GENRE: &str = "SELECT DISTINCT track_id FROM genre \
     WHERE LOWER(genre) LIKE $1 ORDER BY track_id LIMIT $2";

/// `%keyword%` pattern for case-insensitive LIKE matching
fn contains_pattern(keyword: &str) -> String {
    format!("%{}%", keyword.to_lowercase())
}

impl PgCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl CatalogStore for PgCatalogStore {
    #[instrument(skip(self))]
    async fn get_feature_vector(&self, track_id: TrackId) -> AppResult<Option<FeatureVector>> {
        let row = sqlx::query_as::<_, FeatureRow>(
            "SELECT id, feature1, feature2, feature3 FROM track WHERE id = $1",
        )
        .bind(track_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.vector()))
    }

    #[instrument(skip(self, track_ids), fields(count = track_ids.len()))]
    async fn feature_vectors(
        &self,
        track_ids: &[TrackId],
    ) -> AppResult<HashMap<TrackId, FeatureVector>> {
        if track_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, FeatureRow>(
            "SELECT id, feature1, feature2, feature3 FROM track WHERE id = ANY($1)",
        )
        .bind(track_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(FeatureRow::into_pair).collect())
    }

    #[instrument(skip(self))]
    async fn all_feature_vectors(&self) -> AppResult<Vec<(TrackId, FeatureVector)>> {
        let rows = sqlx::query_as::<_, FeatureRow>(
            "SELECT id, feature1, feature2, feature3 FROM track ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        tracing::debug!(tracks = rows.len(), "Loaded catalog feature vectors");

        Ok(rows.into_iter().map(FeatureRow::into_pair).collect())
    }

    #[instrument(skip(self))]
    async fn get_track_ids(&self) -> AppResult<Vec<TrackId>> {
        let ids = sqlx::query_scalar::<_, TrackId>("SELECT id FROM track ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }

    #[instrument(skip(self))]
    async fn get_track_info(&self, track_id: TrackId) -> AppResult<Option<TrackInfo>> {
        let row = sqlx::query_as::<_, TrackInfoRow>(
            r#"
            SELECT track.id, track.title, artist.name AS artist, track.listens,
                   track.date_created, track.duration
            FROM track
            INNER JOIN artist ON track.artist_id = artist.id
            WHERE track.id = $1
            "#,
        )
        .bind(track_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn get_genres(&self, track_id: TrackId) -> AppResult<Vec<String>> {
        let genres = sqlx::query_scalar::<_, String>(
            "SELECT genre FROM genre WHERE track_id = $1",
        )
        .bind(track_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(genres.iter().map(|g| g.trim().to_string()).collect())
    }

    #[instrument(skip(self))]
    async fn search_titles(&self, keyword: &str) -> AppResult<Vec<TrackSummary>> {
        let rows = sqlx::query_as::<_, SummaryRow>(
            "SELECT id, title FROM track WHERE LOWER(title) LIKE $1 ORDER BY id",
        )
        .bind(contains_pattern(keyword))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn find_track_id(&self, title: &str) -> AppResult<Option<TrackId>> {
        let id = sqlx::query_scalar::<_, TrackId>(
            "SELECT id FROM track WHERE LOWER(title) LIKE $1 ORDER BY id LIMIT 1",
        )
        .bind(contains_pattern(title))
        .fetch_optional(&self.pool)
        .await?;
        Ok(id)
    }

    #[instrument(skip(self))]
    async fn artist_tracks(&self, artist: &str) -> AppResult<Vec<TrackSummary>> {
        let rows = sqlx::query_as::<_, SummaryRow>(
            r#"
            SELECT track.id, track.title
            FROM artist
            INNER JOIN track ON artist.id = track.artist_id
            WHERE LOWER(artist.name) LIKE $1
            ORDER BY track.id
            "#,
        )
        .bind(contains_pattern(artist))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn tracks_by_genre(&self, genre: &str, limit: usize) -> AppResult<Vec<TrackId>> {
        let ids = sqlx::query_scalar::<_, TrackId>(TRACKS_BY_GENRE)
            .bind(contains_pattern(genre))
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_pattern_lowercases() {
        assert_eq!(contains_pattern("Kurt"), "%kurt%");
        assert_eq!(contains_pattern(""), "%%");
    }

    #[test]
    fn test_genre_query_lists_each_track_once() {
        assert!(TRACKS_BY_GENRE.starts_with("SELECT DISTINCT track_id"));
        assert!(TRACKS_BY_GENRE.contains("ORDER BY track_id LIMIT $2"));
    }

    #[test]
    fn test_info_row_trims_padding() {
        let row = TrackInfoRow {
            id: 2,
            title: "Food    ".to_string(),
            artist: " AWOL ".to_string(),
            listens: 1,
            date_created: chrono::NaiveDate::from_ymd_opt(2008, 11, 26)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            duration: 168,
        };
        let info: TrackInfo = row.into();
        assert_eq!(info.title, "Food");
        assert_eq!(info.artist, "AWOL");
    }
}
