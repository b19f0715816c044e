//! Full submission against a mocked back-office server and storage endpoint.
//!
//! Run with: `cargo test -p bunny-uploader --test api_flow_test`

use chrono::NaiveDate;
use mockito::Matcher;
use std::sync::Arc;

use bunny_api_client::{ApiClient, Auth};
use bunny_core::models::{EventDetails, EventStatus};
use bunny_core::{ClientConfig, MediaRules};
use bunny_uploader::{
    CandidateFile, MediaSelection, NoopProgress, ProgressTracker, UploadCoordinator,
};

#[tokio::test]
async fn test_submit_event_through_api_client() {
    let mut server = mockito::Server::new_async().await;
    let base = server.url();

    let video_bytes: Vec<u8> = (0..1000u32).map(|i| b'a' + (i % 26) as u8).collect();
    let mut selection = MediaSelection::new(MediaRules::default());
    let cover_id = selection
        .set_cover(CandidateFile::from_bytes(
            "cover.jpg",
            "image/jpeg",
            vec![1u8; 2048],
        ))
        .unwrap();
    let video_id = selection
        .add_gallery_item(
            CandidateFile::from_bytes("race.mp4", "video/mp4", video_bytes.clone()),
            "Relay race",
            true,
        )
        .unwrap();

    let presign = server
        .mock("POST", "/api/uploads/presign")
        .match_header("authorization", "Bearer admin-token")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "title": "Sports Day",
            "mediaFiles": [
                { "id": cover_id.to_string(), "type": "image", "size": 2048 },
                { "id": video_id.to_string(), "type": "video", "size": 1000 }
            ]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            serde_json::json!({
                "files": [
                    {
                        "id": cover_id.to_string(),
                        "key": "events/sports-day/cover.jpg",
                        "multipart": false,
                        "url": format!("{}/storage/cover.jpg", base)
                    },
                    {
                        "id": video_id.to_string(),
                        "key": "events/sports-day/race.mp4",
                        "multipart": true,
                        "uploadId": "mpu-1",
                        "parts": [
                            { "partNumber": 2, "url": format!("{}/storage/race/2", base) },
                            { "partNumber": 1, "url": format!("{}/storage/race/1", base) }
                        ]
                    }
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let cover_put = server
        .mock("PUT", "/storage/cover.jpg")
        .match_header("content-type", "image/jpeg")
        .match_header("authorization", Matcher::Missing)
        .with_status(200)
        .create_async()
        .await;
    let part_one = server
        .mock("PUT", "/storage/race/1")
        .match_body(Matcher::Exact(
            String::from_utf8(video_bytes[..500].to_vec()).unwrap(),
        ))
        .with_status(200)
        .with_header("ETag", "\"e1\"")
        .create_async()
        .await;
    let part_two = server
        .mock("PUT", "/storage/race/2")
        .with_status(200)
        .with_header("ETag", "\"e2\"")
        .create_async()
        .await;

    let create = server
        .mock("POST", "/api/events")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "title": "Sports Day",
            "categoryId": "2",
            "startDate": "2026-05-12",
            "status": "published",
            "coverImageKey": "events/sports-day/cover.jpg",
            "media": [{
                "key": "events/sports-day/race.mp4",
                "type": "video",
                "caption": "Relay race",
                "featured": true,
                "uploadId": "mpu-1",
                "parts": [
                    { "partNumber": 1, "etag": "\"e1\"" },
                    { "partNumber": 2, "etag": "\"e2\"" }
                ]
            }]
        })))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"{"data":{"id":101,"title":"Sports Day","status":"published"}}"#)
        .create_async()
        .await;

    let client = ApiClient::new(base.clone(), Auth::Bearer("admin-token".to_string())).unwrap();
    let progress = ProgressTracker::new();
    let coordinator =
        UploadCoordinator::from_client(client, &ClientConfig::default(), Arc::new(progress.clone()));

    let details = EventDetails {
        title: "Sports Day".to_string(),
        description: "Races and games".to_string(),
        category_id: "2".to_string(),
        start_date: NaiveDate::from_ymd_opt(2026, 5, 12).unwrap(),
        end_date: None,
        time: None,
        location: "Playground".to_string(),
        status: EventStatus::Published,
        featured: false,
    };
    let event = coordinator.submit_event(&details, &selection).await.unwrap();

    presign.assert_async().await;
    cover_put.assert_async().await;
    part_one.assert_async().await;
    part_two.assert_async().await;
    create.assert_async().await;

    assert_eq!(event.id, "101");
    assert!(progress.is_empty());
}

#[tokio::test]
async fn test_storage_rejection_skips_event_creation() {
    let mut server = mockito::Server::new_async().await;
    let base = server.url();

    let mut selection = MediaSelection::new(MediaRules::default());
    let cover_id = selection
        .set_cover(CandidateFile::from_bytes(
            "cover.jpg",
            "image/jpeg",
            vec![1u8; 64],
        ))
        .unwrap();

    server
        .mock("POST", "/api/uploads/presign")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            serde_json::json!({
                "files": [{
                    "id": cover_id.to_string(),
                    "key": "events/cover.jpg",
                    "multipart": false,
                    "url": format!("{}/storage/cover.jpg", base)
                }]
            })
            .to_string(),
        )
        .create_async()
        .await;
    server
        .mock("PUT", "/storage/cover.jpg")
        .with_status(403)
        .with_body("<Error><Code>SignatureDoesNotMatch</Code></Error>")
        .create_async()
        .await;
    let create = server
        .mock("POST", "/api/events")
        .expect(0)
        .create_async()
        .await;

    let client = ApiClient::new(base.clone(), Auth::Bearer("t".to_string())).unwrap();
    let coordinator =
        UploadCoordinator::from_client(client, &ClientConfig::default(), Arc::new(NoopProgress));

    let details = EventDetails {
        title: "Art Week".to_string(),
        description: String::new(),
        category_id: "3".to_string(),
        start_date: NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
        end_date: None,
        time: None,
        location: "Studio".to_string(),
        status: EventStatus::Draft,
        featured: false,
    };
    let err = coordinator
        .submit_event(&details, &selection)
        .await
        .unwrap_err();

    assert_eq!(err.file_name(), Some("cover.jpg"));
    create.assert_async().await;
}
