//! TMDB API client tests
//!
//! Tests detail retrieval, trailer extraction, the similar collection,
//! and error handling.

use mockito::{Matcher, Server};
use reelview::api::TmdbClient;
use reelview::models::{MediaId, MediaType};

// =============================================================================
// Detail Tests
// =============================================================================

#[tokio::test]
async fn test_movie_detail_parses_fields() {
    let mut server = Server::new_async().await;

    let mock_response = r#"{
        "id": 603,
        "title": "The Matrix",
        "release_date": "1999-03-30",
        "runtime": 136,
        "overview": "A computer hacker learns about the true nature of reality.",
        "genres": [
            {"id": 28, "name": "Action"},
            {"id": 878, "name": "Science Fiction"}
        ],
        "spoken_languages": [
            {"iso_639_1": "en", "english_name": "English", "name": "English"}
        ],
        "videos": {
            "results": [
                {"key": "vKQi3bBA1y8", "site": "YouTube", "type": "Trailer"},
                {"key": "m8e-FF8MsqU", "site": "YouTube", "type": "Teaser"},
                {"key": "vimeo123", "site": "Vimeo", "type": "Trailer"}
            ]
        },
        "poster_path": "/f89U3ADr1oiB1s9GkdPOEpXUk5H.jpg",
        "backdrop_path": "/fNG7i7RqMErkcqhohV2a6cV1Ehy.jpg"
    }"#;

    let mock = server
        .mock("GET", "/movie/603")
        .match_query(Matcher::UrlEncoded(
            "append_to_response".into(),
            "videos".into(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(mock_response)
        .create_async()
        .await;

    let client = TmdbClient::with_base_url("test_key", server.url());
    let detail = client.detail(MediaId::movie(603)).await.unwrap();

    mock.assert_async().await;

    assert_eq!(detail.id, 603);
    assert_eq!(detail.media_type, MediaType::Movie);
    assert_eq!(detail.title, "The Matrix");
    assert_eq!(detail.release_date, "1999-03-30");
    assert_eq!(detail.runtime, 136);
    assert_eq!(detail.genres, vec!["Action", "Science Fiction"]);
    assert_eq!(detail.spoken_languages, vec!["English"]);
    // YouTube keys only, source order preserved
    assert_eq!(detail.trailer_keys, vec!["vKQi3bBA1y8", "m8e-FF8MsqU"]);
}

#[tokio::test]
async fn test_tv_detail_unifies_name_and_air_date() {
    let mut server = Server::new_async().await;

    let mock_response = r#"{
        "id": 1396,
        "name": "Breaking Bad",
        "first_air_date": "2008-01-20",
        "episode_run_time": [45, 47],
        "overview": "A chemistry teacher turns to crime.",
        "genres": [{"id": 18, "name": "Drama"}],
        "spoken_languages": [
            {"iso_639_1": "en", "english_name": "English", "name": "English"},
            {"iso_639_1": "es", "english_name": "Spanish", "name": "Español"}
        ],
        "videos": {"results": []},
        "poster_path": null,
        "backdrop_path": null
    }"#;

    let mock = server
        .mock("GET", "/tv/1396")
        .match_query(Matcher::UrlEncoded(
            "append_to_response".into(),
            "videos".into(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(mock_response)
        .create_async()
        .await;

    let client = TmdbClient::with_base_url("test_key", server.url());
    let detail = client.detail(MediaId::tv(1396)).await.unwrap();

    mock.assert_async().await;

    assert_eq!(detail.media_type, MediaType::Tv);
    assert_eq!(detail.title, "Breaking Bad");
    assert_eq!(detail.release_date, "2008-01-20");
    assert_eq!(detail.runtime, 45);
    assert_eq!(detail.spoken_languages, vec!["English", "Español"]);
    assert!(detail.trailer_keys.is_empty());
}

#[tokio::test]
async fn test_detail_tolerates_missing_optionals() {
    let mut server = Server::new_async().await;

    // Minimal payload: no runtime, overview, languages, or videos block
    let mock_response = r#"{
        "id": 42,
        "title": "Bare Minimum",
        "genres": []
    }"#;

    let mock = server
        .mock("GET", "/movie/42")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(mock_response)
        .create_async()
        .await;

    let client = TmdbClient::with_base_url("test_key", server.url());
    let detail = client.detail(MediaId::movie(42)).await.unwrap();

    mock.assert_async().await;

    assert_eq!(detail.title, "Bare Minimum");
    assert_eq!(detail.release_date, "");
    assert_eq!(detail.runtime, 0);
    assert!(detail.trailer_keys.is_empty());
}

// =============================================================================
// Similar Tests
// =============================================================================

#[tokio::test]
async fn test_similar_preserves_source_order() {
    let mut server = Server::new_async().await;

    let mock_response = r#"{
        "page": 1,
        "results": [
            {"id": 604, "title": "The Matrix Reloaded", "poster_path": "/reloaded.jpg"},
            {"id": 605, "title": "The Matrix Revolutions", "poster_path": null},
            {"id": 624860, "title": "The Matrix Resurrections", "poster_path": "/res.jpg"}
        ],
        "total_results": 3,
        "total_pages": 1
    }"#;

    let mock = server
        .mock("GET", "/movie/603/similar")
        .match_query(Matcher::UrlEncoded("page".into(), "1".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(mock_response)
        .create_async()
        .await;

    let client = TmdbClient::with_base_url("test_key", server.url());
    let related = client.similar(MediaId::movie(603)).await.unwrap();

    mock.assert_async().await;

    assert_eq!(related.len(), 3);
    assert_eq!(related[0].id, 604);
    assert_eq!(related[0].title, "The Matrix Reloaded");
    assert_eq!(related[1].poster_path, None);
    assert_eq!(related[2].id, 624860);
    // Kind is inherited from the request, /similar does not echo it
    assert!(related.iter().all(|r| r.media_type == MediaType::Movie));
}

#[tokio::test]
async fn test_similar_tv_uses_name_field() {
    let mut server = Server::new_async().await;

    let mock_response = r#"{
        "page": 1,
        "results": [
            {"id": 60059, "name": "Better Call Saul", "poster_path": "/bcs.jpg"}
        ],
        "total_results": 1,
        "total_pages": 1
    }"#;

    let mock = server
        .mock("GET", "/tv/1396/similar")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(mock_response)
        .create_async()
        .await;

    let client = TmdbClient::with_base_url("test_key", server.url());
    let related = client.similar(MediaId::tv(1396)).await.unwrap();

    mock.assert_async().await;

    assert_eq!(related[0].title, "Better Call Saul");
    assert_eq!(related[0].media_type, MediaType::Tv);
}

// =============================================================================
// Error Handling Tests
// =============================================================================

#[tokio::test]
async fn test_detail_not_found() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/movie/999999999")
        .match_query(Matcher::Any)
        .with_status(404)
        .with_body(r#"{"status_message": "The resource you requested could not be found."}"#)
        .create_async()
        .await;

    let client = TmdbClient::with_base_url("test_key", server.url());
    let result = client.detail(MediaId::movie(999999999)).await;

    mock.assert_async().await;

    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("not found"));
}

#[tokio::test]
async fn test_detail_server_error() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/movie/603")
        .match_query(Matcher::Any)
        .with_status(500)
        .create_async()
        .await;

    let client = TmdbClient::with_base_url("test_key", server.url());
    let result = client.detail(MediaId::movie(603)).await;

    mock.assert_async().await;

    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("500"));
}

#[tokio::test]
async fn test_detail_invalid_json() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/movie/603")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("not json at all")
        .create_async()
        .await;

    let client = TmdbClient::with_base_url("test_key", server.url());
    let result = client.detail(MediaId::movie(603)).await;

    mock.assert_async().await;

    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("Invalid response"));
}
