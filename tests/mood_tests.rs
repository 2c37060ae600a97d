use moodreel::config::Config;
use moodreel::domain::{NewMovie, Provenance};
use moodreel::services::{MoodError, MoodQuery};
use moodreel::state::SharedState;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn spawn_state(tmdb: Option<&MockServer>) -> SharedState {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    config.general.max_db_connections = 1;
    config.general.min_db_connections = 1;
    if let Some(server) = tmdb {
        config.tmdb.api_key = Some("tmdb-key".to_string());
        config.tmdb.base_url = server.uri();
        config.tmdb.enrich_trailers = false;
    }

    let state = SharedState::new(config)
        .await
        .expect("Failed to create shared state");

    for (title, genres, poster) in [
        ("Paddington 2", vec!["Family", "Comedy"], Some("/paddington.jpg")),
        ("The Conjuring", vec!["Horror"], Some("/conjuring.jpg")),
        ("Posterless Comedy", vec!["Comedy"], None),
    ] {
        state
            .store
            .add_movie(&NewMovie {
                title: title.to_string(),
                year: Some(2017),
                genres: genres.into_iter().map(ToString::to_string).collect(),
                poster_url: poster.map(ToString::to_string),
                ..NewMovie::default()
            })
            .await
            .unwrap();
    }

    state
}

fn query(text: &str) -> MoodQuery {
    MoodQuery {
        mood_text: Some(text.to_string()),
        ..MoodQuery::default()
    }
}

#[tokio::test]
async fn test_static_table_fallback_filters_catalog() {
    let state = spawn_state(None).await;

    let results = state
        .mood
        .analyze_mood(&query("I'm feeling cheerful"))
        .await
        .unwrap();

    assert_eq!(results.mood, "happy");
    let titles: Vec<_> = results.movies.iter().map(|m| m.title.as_str()).collect();
    assert_eq!(titles, vec!["Paddington 2", "Posterless Comedy"]);
    assert!(results.movies.iter().all(|m| m.source == Provenance::Local));
}

#[tokio::test]
async fn test_unknown_mood_returns_unfiltered_page() {
    let state = spawn_state(None).await;

    let results = state.mood.analyze_mood(&query("qwerty")).await.unwrap();

    assert!(results.genres.is_empty());
    assert_eq!(results.movies.len(), 3);
    assert!(!results.movies[0].poster.is_empty());
    assert!(results.movies[2].poster.is_empty());
}

#[tokio::test]
async fn test_missing_mood_text() {
    let state = spawn_state(None).await;
    let err = state
        .mood
        .analyze_mood(&MoodQuery::default())
        .await
        .unwrap_err();
    assert_eq!(err, MoodError::MissingMoodText);
}

#[tokio::test]
async fn test_discovery_tops_up_short_results() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/genre/movie/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "genres": [{"id": 27, "name": "Horror"}, {"id": 53, "name": "Thriller"}]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/discover/movie"))
        .and(query_param("with_genres", "27,53"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {"id": 9001, "title": "Hereditary", "release_date": "2018-06-08", "genre_ids": [27]},
                {"id": 9002, "title": "Get Out", "release_date": "2017-02-24", "genre_ids": [27, 53]}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let state = spawn_state(Some(&server)).await;
    let results = state
        .mood
        .analyze_mood(&MoodQuery {
            limit: Some(2),
            ..query("something spooky")
        })
        .await
        .unwrap();

    assert_eq!(results.mood, "scared");
    assert_eq!(results.movies.len(), 2);
    assert_eq!(results.movies[0].title, "The Conjuring");
    assert_eq!(results.movies[1].title, "Hereditary");
    assert_eq!(results.movies[1].source, Provenance::ExternalDiscovery);
    assert_eq!(results.movies[1].genres, vec!["Horror"]);
}

#[tokio::test]
async fn test_list_moods() {
    let state = spawn_state(None).await;
    state.store.add_mood("happy").await.unwrap();
    state.store.add_mood("sad").await.unwrap();

    let moods = state.mood.list_moods().await.unwrap();
    let labels: Vec<_> = moods.iter().map(|m| m.mood_label.as_str()).collect();
    assert_eq!(labels, vec!["happy", "sad"]);
}
