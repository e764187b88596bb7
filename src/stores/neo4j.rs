use neo4rs::{query, Graph, Query};
use tracing::instrument;

use crate::{
    error::{AppError, AppResult},
    models::{LikesMap, TrackId},
    stores::SocialGraph,
};

const CREATE_FRIENDSHIP: &str = "MATCH (a:Person {name: $a}), (b:Person {name: $b}) \
     CREATE (a)-[:FRIENDS_WITH]->(b)";

const REMOVE_FRIENDSHIP: &str =
    "MATCH (a:Person {name: $a})-[r:FRIENDS_WITH]->(b:Person {name: $b}) DELETE r";

/// A row whose column does not decode to the expected type
fn malformed(column: &str, err: impl std::fmt::Display) -> AppError {
    AppError::Internal(format!("Malformed graph row in column '{}': {}", column, err))
}

/// Social graph backed by Neo4j
#[derive(Clone)]
pub struct Neo4jSocialGraph {
    graph: Graph,
}

impl Neo4jSocialGraph {
    pub fn new(graph: Graph) -> Self {
        Self { graph }
    }

    /// Runs both directed halves of a friendship change in one transaction
    async fn run_symmetric(&self, cypher: &str, a: &str, b: &str) -> AppResult<()> {
        let forward = query(cypher).param("a", a).param("b", b);
        let backward = query(cypher).param("a", b).param("b", a);

        let mut txn = self.graph.start_txn().await?;
        txn.run(forward).await?;
        txn.run(backward).await?;
        txn.commit().await?;
        Ok(())
    }

    /// Collects one column of every returned row
    async fn collect_column<T>(&self, q: Query, column: &str) -> AppResult<Vec<T>>
    where
        T: serde::de::DeserializeOwned,
    {
        let mut stream = self.graph.execute(q).await?;
        let mut out = Vec::new();
        while let Some(row) = stream.next().await? {
            out.push(row.get::<T>(column).map_err(|e| malformed(column, e))?);
        }
        Ok(out)
    }
}

#[async_trait::async_trait]
impl SocialGraph for Neo4jSocialGraph {
    #[instrument(skip(self))]
    async fn create_person(&self, name: &str) -> AppResult<()> {
        let q = query("MERGE (p:Person {name: $name})").param("name", name);
        self.graph.run(q).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_person(&self, name: &str) -> AppResult<()> {
        let q = query("MATCH (p:Person {name: $name}) DETACH DELETE p").param("name", name);
        self.graph.run(q).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn create_song(&self, track_id: TrackId) -> AppResult<()> {
        let q = query("MERGE (s:Song {id: $id})").param("id", track_id);
        self.graph.run(q).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn log_like(&self, name: &str, track_id: TrackId) -> AppResult<()> {
        let q = query(
            "MATCH (p:Person {name: $name}) \
             MERGE (s:Song {id: $id}) \
             CREATE (p)-[:LIKES]->(s)",
        )
        .param("name", name)
        .param("id", track_id);
        self.graph.run(q).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove_like(&self, name: &str, track_id: TrackId) -> AppResult<()> {
        let q = query("MATCH (:Person {name: $name})-[r:LIKES]->(:Song {id: $id}) DELETE r")
            .param("name", name)
            .param("id", track_id);
        self.graph.run(q).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn create_friendship(&self, a: &str, b: &str) -> AppResult<()> {
        self.run_symmetric(CREATE_FRIENDSHIP, a, b).await
    }

    #[instrument(skip(self))]
    async fn remove_friendship(&self, a: &str, b: &str) -> AppResult<()> {
        self.run_symmetric(REMOVE_FRIENDSHIP, a, b).await
    }

    #[instrument(skip(self))]
    async fn get_liked_tracks(&self, name: &str) -> AppResult<Vec<TrackId>> {
        let q = query("MATCH (:Person {name: $name})-[:LIKES]->(s:Song) RETURN s.id AS id")
            .param("name", name);
        self.collect_column(q, "id").await
    }

    #[instrument(skip(self))]
    async fn get_friends(&self, name: &str) -> AppResult<Vec<String>> {
        let q = query(
            "MATCH (:Person {name: $name})-[:FRIENDS_WITH]->(f:Person) RETURN f.name AS name",
        )
        .param("name", name);
        self.collect_column(q, "name").await
    }

    #[instrument(skip(self))]
    async fn get_friends_liked_tracks(&self, name: &str) -> AppResult<Vec<TrackId>> {
        let q = query(
            "MATCH (:Person {name: $name})-[:FRIENDS_WITH]->(:Person)-[:LIKES]->(s:Song) \
             RETURN s.id AS id",
        )
        .param("name", name);
        self.collect_column(q, "id").await
    }

    #[instrument(skip(self))]
    async fn get_all_persons(&self) -> AppResult<Vec<String>> {
        self.collect_column(query("MATCH (p:Person) RETURN p.name AS name"), "name")
            .await
    }

    #[instrument(skip(self))]
    async fn retrieve_all_likes(&self) -> AppResult<LikesMap> {
        let q = query(
            "MATCH (p:Person) \
             OPTIONAL MATCH (p)-[:LIKES]->(s:Song) \
             RETURN p.name AS name, collect(s.id) AS tracks",
        );

        let mut stream = self.graph.execute(q).await?;
        let mut likes = LikesMap::new();
        while let Some(row) = stream.next().await? {
            let name: String = row.get("name").map_err(|e| malformed("name", e))?;
            let tracks: Vec<TrackId> = row.get("tracks").map_err(|e| malformed("tracks", e))?;
            likes.entry(name).or_default().extend(tracks);
        }

        tracing::debug!(persons = likes.len(), "Loaded likes for every person");
        Ok(likes)
    }

    #[instrument(skip(self))]
    async fn most_popular(&self, k: usize) -> AppResult<Vec<(TrackId, i64)>> {
        let q = query(
            "MATCH (s:Song) \
             OPTIONAL MATCH (s)<-[l:LIKES]-(:Person) \
             WITH s, count(l) AS num_listeners \
             RETURN s.id AS id, num_listeners \
             ORDER BY num_listeners DESC, id ASC \
             LIMIT $limit",
        )
        .param("limit", i64::try_from(k).unwrap_or(i64::MAX));

        let mut stream = self.graph.execute(q).await?;
        let mut out = Vec::new();
        while let Some(row) = stream.next().await? {
            let id: TrackId = row.get("id").map_err(|e| malformed("id", e))?;
            let count: i64 = row
                .get("num_listeners")
                .map_err(|e| malformed("num_listeners", e))?;
            out.push((id, count));
        }
        Ok(out)
    }
}
