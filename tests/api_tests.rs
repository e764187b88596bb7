use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use chrono::NaiveDate;
use serde_json::Value;

use musiclib_api::api::{create_router, AppState};
use musiclib_api::models::{FeatureVector, TrackId, TrackInfo};
use musiclib_api::stores::memory::CatalogTrack;
use musiclib_api::stores::{InMemoryCatalog, InMemoryGraph};

fn track(
    id: TrackId,
    title: &str,
    artist: &str,
    features: [f64; 3],
    genres: &[&str],
) -> CatalogTrack {
    CatalogTrack {
        info: TrackInfo {
            track_id: id,
            title: title.to_string(),
            artist: artist.to_string(),
            listens: 100 + id,
            date_created: NaiveDate::from_ymd_opt(2008, 11, 26)
                .unwrap()
                .and_hms_opt(1, 48, 12)
                .unwrap(),
            duration: 168,
        },
        features: FeatureVector(features),
        genres: genres.iter().map(|g| g.to_string()).collect(),
    }
}

fn create_test_server() -> TestServer {
    let catalog = InMemoryCatalog::new()
        .with_track(track(1, "Food", "AWOL", [0.0, 0.0, 0.0], &["Hip-Hop"]))
        .with_track(track(
            2,
            "Electric Kalimba",
            "Kurt Vile",
            [1.0, 0.0, 0.0],
            &["Pop", "Experimental Pop"],
        ))
        .with_track(track(
            3,
            "Electro Magnetic Pulse",
            "Kurt Vile",
            [5.0, 0.0, 0.0],
            &["Pop", "Electronic"],
        ));

    let state = AppState::new(Arc::new(catalog), Arc::new(InMemoryGraph::new()));
    let app = create_router(state);
    TestServer::new(app).unwrap()
}

async fn add_person(server: &TestServer, name: &str) {
    server
        .put("/user")
        .add_query_param("name", name)
        .await
        .assert_status_ok();
}

async fn add_like(server: &TestServer, name: &str, track_id: TrackId) {
    server
        .put("/like")
        .add_query_param("name", name)
        .add_query_param("trackid", track_id)
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_create_and_delete_user() {
    let server = create_test_server();

    let response = server.put("/user").add_query_param("name", "Neal").await;
    response.assert_status_ok();
    let created: Value = response.json();
    assert_eq!(created["name"], "Neal");

    let response = server.delete("/user").add_query_param("name", "Neal").await;
    response.assert_status_ok();
    let deleted: Value = response.json();
    assert_eq!(deleted["name"], "Neal");
}

#[tokio::test]
async fn test_blank_user_name_is_rejected() {
    let server = create_test_server();
    let response = server.put("/user").add_query_param("name", "  ").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("name"));
}

#[tokio::test]
async fn test_like_returns_track_object() {
    let server = create_test_server();
    add_person(&server, "Neal").await;

    let response = server
        .put("/like")
        .add_query_param("name", "Neal")
        .add_query_param("trackid", 2)
        .await;
    response.assert_status_ok();

    let like: Value = response.json();
    assert_eq!(like["track_id"], 2);
    assert_eq!(like["track_name"], "Electric Kalimba");
    assert_eq!(like["artist"], "Kurt Vile");
    assert_eq!(like["listens"], 102);
    assert_eq!(like["date_created"], "11/26/2008");
    assert_eq!(like["track_duration"], 168);
    assert_eq!(like["genres"][0], "Pop");
    assert_eq!(like["person"], "Neal");

    let response = server.get("/like").add_query_param("name", "Neal").await;
    response.assert_status_ok();
    let likes: Vec<Value> = response.json();
    assert_eq!(likes.len(), 1);
    assert_eq!(likes[0]["track_id"], 2);
}

#[tokio::test]
async fn test_like_unknown_track_is_not_found() {
    let server = create_test_server();
    add_person(&server, "Neal").await;

    let response = server
        .put("/like")
        .add_query_param("name", "Neal")
        .add_query_param("trackid", 999)
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    let likes: Vec<Value> = server.get("/like").add_query_param("name", "Neal").await.json();
    assert!(likes.is_empty());
}

#[tokio::test]
async fn test_remove_like() {
    let server = create_test_server();
    add_person(&server, "Neal").await;
    add_like(&server, "Neal", 1).await;
    add_like(&server, "Neal", 3).await;

    let response = server
        .delete("/like")
        .add_query_param("name", "Neal")
        .add_query_param("trackid", 1)
        .await;
    response.assert_status_ok();
    let removed: Value = response.json();
    assert_eq!(removed["track_id"], 1);
    assert_eq!(removed["person"], "Neal");

    let likes: Vec<Value> = server.get("/like").add_query_param("name", "Neal").await.json();
    assert_eq!(likes.len(), 1);
    assert_eq!(likes[0]["track_id"], 3);
}

#[tokio::test]
async fn test_friendship_is_symmetric() {
    let server = create_test_server();
    add_person(&server, "Neal").await;
    add_person(&server, "Chris").await;

    let response = server
        .put("/friend")
        .add_query_param("f1", "Neal")
        .add_query_param("f2", "Chris")
        .await;
    response.assert_status_ok();
    let pair: Value = response.json();
    assert_eq!(pair["user1"], "Neal");
    assert_eq!(pair["user2"], "Chris");

    let friends: Vec<String> = server.get("/friend").add_query_param("name", "Chris").await.json();
    assert_eq!(friends, vec!["Neal"]);

    server
        .delete("/friend")
        .add_query_param("f1", "Chris")
        .add_query_param("f2", "Neal")
        .await
        .assert_status_ok();

    let friends: Vec<String> = server.get("/friend").add_query_param("name", "Neal").await.json();
    assert!(friends.is_empty());
}

#[tokio::test]
async fn test_friends_likes_are_distinct() {
    let server = create_test_server();
    for name in ["Neal", "Chris", "Sham"] {
        add_person(&server, name).await;
    }
    for friend in ["Chris", "Sham"] {
        server
            .put("/friend")
            .add_query_param("f1", "Neal")
            .add_query_param("f2", friend)
            .await
            .assert_status_ok();
    }
    add_like(&server, "Chris", 3).await;
    add_like(&server, "Sham", 3).await;
    add_like(&server, "Sham", 1).await;

    let response = server.get("/elikes").add_query_param("name", "Neal").await;
    response.assert_status_ok();
    let tracks: Vec<Value> = response.json();
    let ids: Vec<i64> = tracks.iter().map(|t| t["track_id"].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![3, 1]);
}

#[tokio::test]
async fn test_popular_orders_by_listeners() {
    let server = create_test_server();
    for name in ["a", "b", "c"] {
        add_person(&server, name).await;
        add_like(&server, name, 3).await;
    }
    add_like(&server, "a", 1).await;

    let response = server.get("/popular").add_query_param("k", 2).await;
    response.assert_status_ok();
    let popular: Vec<Value> = response.json();
    assert_eq!(popular.len(), 2);
    assert_eq!(popular[0]["track_id"], 3);
    assert_eq!(popular[0]["num_listeners"], 3);
    assert_eq!(popular[1]["track_id"], 1);
    assert_eq!(popular[1]["num_listeners"], 1);
}

#[tokio::test]
async fn test_recommend_nearest_tracks() {
    let server = create_test_server();

    let response = server
        .get("/recommend")
        .add_query_param("trackid", 1)
        .add_query_param("k", 1)
        .await;
    response.assert_status_ok();
    let similar: Vec<Value> = response.json();
    assert_eq!(similar.len(), 1);
    assert_eq!(similar[0]["track_id"], 2);
    assert_eq!(similar[0]["similarity"], 1.0);
    assert_eq!(similar[0]["track_name"], "Electric Kalimba");

    let all: Vec<Value> = server
        .get("/recommend")
        .add_query_param("trackid", 1)
        .add_query_param("k", 50)
        .await
        .json();
    let ids: Vec<i64> = all.iter().map(|t| t["track_id"].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![2, 3]);
}

#[tokio::test]
async fn test_recommend_unknown_track_is_empty() {
    let server = create_test_server();
    let response = server
        .get("/recommend")
        .add_query_param("trackid", 404)
        .add_query_param("k", 3)
        .await;
    response.assert_status_ok();
    let similar: Vec<Value> = response.json();
    assert!(similar.is_empty());
}

#[tokio::test]
async fn test_recommend_requires_parameters() {
    let server = create_test_server();
    let response = server.get("/recommend").add_query_param("k", 3).await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_recommend_friends() {
    let server = create_test_server();
    for (name, track_id) in [("x", 1), ("y", 2), ("z", 3)] {
        add_person(&server, name).await;
        add_like(&server, name, track_id).await;
    }

    let response = server
        .get("/recommend_friends")
        .add_query_param("name", "x")
        .add_query_param("k", 2)
        .await;
    response.assert_status_ok();
    let recs: Vec<Value> = response.json();
    assert_eq!(recs.len(), 2);
    assert_eq!(recs[0]["friend"], "y");
    assert_eq!(recs[0]["similarity"], 1.0);
    assert_eq!(recs[1]["friend"], "z");
    assert_eq!(recs[1]["similarity"], 5.0);
}

#[tokio::test]
async fn test_search_and_artist() {
    let server = create_test_server();

    let hits: Vec<Value> = server.get("/search").add_query_param("keyword", "ELEC").await.json();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0]["track_id"], 2);
    assert_eq!(hits[0]["track_name"], "Electric Kalimba");

    let tracks: Vec<Value> = server.get("/artist").add_query_param("name", "awol").await.json();
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0]["track_name"], "Food");
}

#[tokio::test]
async fn test_genre_tracks() {
    let server = create_test_server();
    // Track 2 matches "pop" through two tags but fills a single slot
    let response = server
        .get("/genre")
        .add_query_param("name", "pop")
        .add_query_param("k", 2)
        .await;
    response.assert_status_ok();
    let tracks: Vec<Value> = response.json();
    let ids: Vec<i64> = tracks.iter().map(|t| t["track_id"].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![2, 3]);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let server = create_test_server();

    let response = server
        .get("/health")
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static("client-trace-1"),
        )
        .await;
    assert_eq!(response.header("x-request-id"), "client-trace-1");

    let response = server.get("/health").await;
    assert!(!response.header("x-request-id").is_empty());
}
