//! Jellyfin client tests
//!
//! Tests endpoint paths, query parameters, response mapping and error
//! handling against a mock server.

use mockito::{Matcher, Server};
use std::sync::Arc;

use jellyqueue::api::{Catalog, CatalogError, EpisodeQuery, ItemField, JellyfinClient};
use jellyqueue::models::{EntryKind, Protocol, StreamKind};
use jellyqueue::playback::QueueBuilder;

const USER: &str = "user1";
const TOKEN: &str = "secret-token";

fn client(server: &Server) -> JellyfinClient {
    JellyfinClient::with_base_url(server.url(), TOKEN, USER)
}

// =============================================================================
// Items
// =============================================================================

#[tokio::test]
async fn test_intros_parses_items() {
    let mut server = Server::new_async().await;

    let mock_response = r#"{
        "Items": [
            {
                "Id": "trailer1",
                "Name": "Coming Soon",
                "Type": "Trailer",
                "MediaSources": [
                    { "Id": "trailer1-src", "Path": "/trailers/1.mp4", "Protocol": "File" }
                ]
            },
            { "Id": "folder", "Name": "Extras", "Type": "Folder" }
        ],
        "TotalRecordCount": 2
    }"#;

    let mock = server
        .mock("GET", "/Users/user1/Items/movie1/Intros")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(mock_response)
        .create_async()
        .await;

    let intros = client(&server).intros("movie1").await.unwrap();

    mock.assert_async().await;

    // Folders aren't playable entries
    assert_eq!(intros.len(), 1);
    assert_eq!(intros[0].id, "trailer1");
    assert_eq!(intros[0].kind, EntryKind::Movie);
    assert_eq!(intros[0].media_sources[0].protocol, Protocol::File);
}

#[tokio::test]
async fn test_next_up_query_and_mapping() {
    let mut server = Server::new_async().await;

    let mock_response = r#"{
        "Items": [
            {
                "Id": "ep5",
                "Name": "The Fifth",
                "Type": "Episode",
                "SeriesId": "show1",
                "SeasonId": "season2",
                "IndexNumber": 5,
                "ParentIndexNumber": 2,
                "UserData": { "PlaybackPositionTicks": 12000000000 },
                "MediaSources": [{ "Id": "ep5-src", "Protocol": "File" }]
            }
        ]
    }"#;

    let mock = server
        .mock("GET", "/Shows/NextUp")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("UserId".into(), USER.into()),
            Matcher::UrlEncoded("SeriesId".into(), "show1".into()),
            Matcher::UrlEncoded("Fields".into(), "MediaSources".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(mock_response)
        .create_async()
        .await;

    let next_up = client(&server).next_up("show1").await.unwrap();

    mock.assert_async().await;

    assert_eq!(next_up.len(), 1);
    let episode = &next_up[0];
    assert_eq!(
        episode.kind,
        EntryKind::Episode {
            show_id: "show1".to_string(),
            season_id: Some("season2".to_string()),
            season_index: Some(2),
            episode_index: Some(5),
        }
    );
    assert_eq!(episode.playback_position_ticks, 12_000_000_000);
    assert!(episode.has_sources());
    assert_eq!(episode.to_string(), "S02E05 - The Fifth");
}

#[tokio::test]
async fn test_seasons_in_catalog_order() {
    let mut server = Server::new_async().await;

    let mock_response = r#"{
        "Items": [
            { "Id": "s0", "Name": "Specials", "Type": "Season", "SeriesId": "show1", "IndexNumber": 0 },
            { "Id": "s1", "Name": "Season 1", "Type": "Season", "ParentId": "show1", "IndexNumber": 1 }
        ]
    }"#;

    let mock = server
        .mock("GET", "/Shows/show1/Seasons")
        .match_query(Matcher::UrlEncoded("UserId".into(), USER.into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(mock_response)
        .create_async()
        .await;

    let seasons = client(&server).seasons("show1").await.unwrap();

    mock.assert_async().await;

    let ids: Vec<&str> = seasons.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["s0", "s1"]);
    assert_eq!(
        seasons[1].kind,
        EntryKind::Season {
            show_id: "show1".to_string(),
            season_index: Some(1),
        }
    );
}

#[tokio::test]
async fn test_episodes_sends_every_query_option() {
    let mut server = Server::new_async().await;

    let mock_response = r#"{
        "Items": [
            {
                "Id": "ep3",
                "Name": "Third",
                "Type": "Episode",
                "SeriesId": "show1",
                "SeasonId": "s1",
                "IndexNumber": 3,
                "ParentIndexNumber": 1,
                "LocationType": "Virtual"
            }
        ]
    }"#;

    let mock = server
        .mock("GET", "/Shows/show1/Episodes")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("UserId".into(), USER.into()),
            Matcher::UrlEncoded("SeasonId".into(), "s1".into()),
            Matcher::UrlEncoded("Fields".into(), "MediaSources".into()),
            Matcher::UrlEncoded("StartItemId".into(), "ep3".into()),
            Matcher::UrlEncoded("Limit".into(), "1".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(mock_response)
        .create_async()
        .await;

    let query = EpisodeQuery::new("show1")
        .season(Some("s1".to_string()))
        .field(ItemField::MediaSources)
        .starting_at("ep3")
        .limit(Some(1));
    let episodes = client(&server).episodes(&query).await.unwrap();

    mock.assert_async().await;

    assert_eq!(episodes.len(), 1);
    assert!(episodes[0].is_virtual);
    assert!(!episodes[0].has_sources());
}

// =============================================================================
// Media sources and user policy
// =============================================================================

#[tokio::test]
async fn test_playback_info_parses_sources() {
    let mut server = Server::new_async().await;

    let mock_response = r#"{
        "MediaSources": [
            {
                "Id": "src-a",
                "Path": "https://cdn.example/a.m3u8",
                "Protocol": "Http",
                "MediaStreams": [
                    { "Type": "Video", "Codec": "h264" },
                    {
                        "Type": "Subtitle",
                        "Codec": "webvtt",
                        "Language": "spa",
                        "IsExternal": true,
                        "DeliveryUrl": "/Videos/m/src-a/Subtitles/2/0/Stream.srt"
                    }
                ]
            },
            { "Id": "src-b", "Protocol": "Rtsp" },
            { "Id": "src-c", "Protocol": "Smb" }
        ],
        "PlaySessionId": "abc"
    }"#;

    let mock = server
        .mock("GET", "/Items/movie1/PlaybackInfo")
        .match_query(Matcher::UrlEncoded("UserId".into(), USER.into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(mock_response)
        .create_async()
        .await;

    let sources = client(&server).media_sources("movie1").await.unwrap();

    mock.assert_async().await;

    assert_eq!(sources.len(), 3);
    assert_eq!(sources[0].protocol, Protocol::Http);
    assert_eq!(sources[0].path.as_deref(), Some("https://cdn.example/a.m3u8"));
    assert_eq!(sources[0].streams.len(), 2);
    assert_eq!(sources[0].streams[1].kind, StreamKind::Subtitle);
    assert!(sources[0].streams[1].is_external);
    assert!(!sources[0].streams[0].is_external);
    assert_eq!(sources[1].protocol, Protocol::Rtsp);
    assert_eq!(sources[2].protocol, Protocol::Unknown);
}

#[tokio::test]
async fn test_playback_policy_reads_user_configuration() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/Users/user1")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{ "Id": "user1", "Configuration": { "EnableNextEpisodeAutoPlay": false } }"#)
        .create_async()
        .await;

    let policy = client(&server).playback_policy().await.unwrap();

    mock.assert_async().await;
    assert!(!policy.auto_advance);
}

#[tokio::test]
async fn test_playback_policy_defaults_on() {
    let mut server = Server::new_async().await;

    let _mock = server
        .mock("GET", "/Users/user1")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{ "Id": "user1", "Configuration": {} }"#)
        .create_async()
        .await;

    let policy = client(&server).playback_policy().await.unwrap();
    assert!(policy.auto_advance);
}

#[tokio::test]
async fn test_item_lookup() {
    let mut server = Server::new_async().await;

    let _mock = server
        .mock("GET", "/Users/user1/Items/show1")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{ "Id": "show1", "Name": "Severance", "Type": "Series" }"#)
        .create_async()
        .await;

    let entry = client(&server).item("show1").await.unwrap();

    assert_eq!(entry.kind, EntryKind::Show);
    assert_eq!(entry.name, "Severance");
    assert_eq!(entry.playback_position_ticks, 0);
}

#[tokio::test]
async fn test_item_lookup_unsupported_type() {
    let mut server = Server::new_async().await;

    let _mock = server
        .mock("GET", "/Users/user1/Items/lib")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{ "Id": "lib", "Name": "Movies", "Type": "CollectionFolder" }"#)
        .create_async()
        .await;

    let err = client(&server).item("lib").await.unwrap_err();
    assert!(matches!(err, CatalogError::InvalidResponse(_)));
}

// =============================================================================
// Error Handling
// =============================================================================

#[tokio::test]
async fn test_handles_not_found() {
    let mut server = Server::new_async().await;

    let _mock = server
        .mock("GET", "/Items/gone/PlaybackInfo")
        .match_query(Matcher::Any)
        .with_status(404)
        .create_async()
        .await;

    let result = client(&server).media_sources("gone").await;
    assert!(matches!(result, Err(CatalogError::NotFound)));
}

#[tokio::test]
async fn test_handles_unauthorized() {
    let mut server = Server::new_async().await;

    let _mock = server
        .mock("GET", "/Shows/show1/Seasons")
        .match_query(Matcher::Any)
        .with_status(401)
        .create_async()
        .await;

    let result = client(&server).seasons("show1").await;
    assert!(matches!(result, Err(CatalogError::Unauthorized)));
}

#[tokio::test]
async fn test_handles_server_error() {
    let mut server = Server::new_async().await;

    let _mock = server
        .mock("GET", "/Shows/NextUp")
        .match_query(Matcher::Any)
        .with_status(500)
        .create_async()
        .await;

    let result = client(&server).next_up("show1").await;
    assert!(matches!(result, Err(CatalogError::ServerError(500))));
}

#[tokio::test]
async fn test_handles_invalid_json() {
    let mut server = Server::new_async().await;

    let _mock = server
        .mock("GET", "/Users/user1/Items/movie1/Intros")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("{ not json")
        .create_async()
        .await;

    let result = client(&server).intros("movie1").await;
    assert!(matches!(result, Err(CatalogError::InvalidResponse(_))));
}

#[tokio::test]
async fn test_sends_authorization_header() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", "/Users/user1")
        .match_query(Matcher::Any)
        .match_header(
            "authorization",
            Matcher::Regex(r#"^MediaBrowser Client="jellyqueue",.*Token="secret-token""#.into()),
        )
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{ "Id": "user1" }"#)
        .create_async()
        .await;

    client(&server).playback_policy().await.unwrap();

    mock.assert_async().await;
}

// =============================================================================
// Queue over HTTP
// =============================================================================

#[tokio::test]
async fn test_movie_queue_over_http() {
    let mut server = Server::new_async().await;

    let _intros = server
        .mock("GET", "/Users/user1/Items/movie1/Intros")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{ "Items": [
                { "Id": "t1", "Name": "Trailer", "Type": "Trailer",
                  "MediaSources": [{ "Id": "t1-src", "Protocol": "File" }] }
            ] }"#,
        )
        .create_async()
        .await;
    let _trailer_info = server
        .mock("GET", "/Items/t1/PlaybackInfo")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{ "MediaSources": [{ "Id": "t1-src", "Protocol": "File" }] }"#)
        .create_async()
        .await;
    let _movie_info = server
        .mock("GET", "/Items/movie1/PlaybackInfo")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{ "MediaSources": [{
                "Id": "m-src",
                "Path": "https://cdn.example/m.mp4",
                "Protocol": "Http",
                "MediaStreams": [{
                    "Type": "Subtitle", "Codec": "subrip", "Language": "eng",
                    "IsExternal": true, "DeliveryUrl": "/Videos/movie1/Subtitles/3/0/Stream.srt"
                }]
            }] }"#,
        )
        .create_async()
        .await;
    let _item = server
        .mock("GET", "/Users/user1/Items/movie1")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{ "Id": "movie1", "Name": "Heat", "Type": "Movie" }"#)
        .create_async()
        .await;

    let client = Arc::new(client(&server));
    let entry = client.item("movie1").await.unwrap();
    let builder = QueueBuilder::new(client);

    let result = builder.build(&entry, 0, 0).await;

    let items = result.items().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].item_id, "t1");
    assert!(items[0].locator.is_none());
    assert_eq!(items[1].item_id, "movie1");
    assert_eq!(items[1].locator.as_deref(), Some("https://cdn.example/m.mp4"));
    assert_eq!(
        items[1].external_subtitles[0].url,
        format!("{}/Videos/movie1/Subtitles/3/0/Stream.srt", server.url())
    );
}
