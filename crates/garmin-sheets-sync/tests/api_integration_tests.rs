//! Integration tests for the Garmin and Google Sheets HTTP clients
//!
//! These tests use wiremock to mock API responses with recorded fixtures.

use garmin_sheets_sync::client::{
    ConnectApi, DetailSource, GarminClient, OAuth2Token, ProfileSource,
};
use garmin_sheets_sync::models::ActivitySummary;
use garmin_sheets_sync::SyncError;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Create a test OAuth2 token
fn test_token() -> OAuth2Token {
    OAuth2Token {
        scope: "test".to_string(),
        token_type: "Bearer".to_string(),
        access_token: "test-access-token".to_string(),
        refresh_token: "test-refresh-token".to_string(),
        expires_in: 3600,
        expires_at: chrono::Utc::now().timestamp() + 3600,
    }
}

/// Create a GarminClient that points to the mock server
fn test_client(mock_server: &MockServer) -> GarminClient {
    GarminClient::new_with_base_url(&mock_server.uri(), test_token()).unwrap()
}

mod activity_tests {
    use super::*;

    #[tokio::test]
    async fn test_recent_activities() {
        let mock_server = MockServer::start().await;
        let fixture = include_str!("fixtures/activities_list.json");

        Mock::given(method("GET"))
            .and(path("/activitylist-service/activities/search/activities"))
            .and(query_param("start", "0"))
            .and(query_param("limit", "20"))
            .and(header("Authorization", "Bearer test-access-token"))
            .respond_with(ResponseTemplate::new(200).set_body_string(fixture))
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server);
        let activities = client
            .recent_activities(0, 20)
            .await
            .expect("Failed to get activities");

        assert_eq!(activities.len(), 3);
        assert_eq!(activities[0]["activityId"], 21247810009u64);
    }

    #[tokio::test]
    async fn test_activity_list_parsing() {
        let raw: Vec<serde_json::Value> =
            serde_json::from_str(include_str!("fixtures/activities_list.json")).unwrap();
        let activities: Vec<ActivitySummary> = raw
            .into_iter()
            .map(|v| serde_json::from_value(v).unwrap())
            .collect();

        let first = &activities[0];
        assert_eq!(first.id_string(), "21247810009");
        assert_eq!(first.date(), "2026-10-14");
        assert_eq!(first.type_key(), Some("running"));

        let treadmill = &activities[2];
        assert_eq!(treadmill.type_key(), Some("treadmill_running"));
        assert!(treadmill.elevation_gain.is_none());
    }

    #[tokio::test]
    async fn test_activity_gear_payload() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/gear-service/gear/filterGear"))
            .and(query_param("activityId", "21247810009"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(include_str!("fixtures/activity_gear.json")),
            )
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server);
        let payload = client
            .activity_payload(DetailSource::ActivityGear, 21247810009)
            .await
            .unwrap();

        assert_eq!(payload[0]["gearPk"], 31877412);
        assert_eq!(payload[0]["customMakeModel"], "Nike Pegasus 41");
    }
}

mod profile_tests {
    use super::*;

    #[tokio::test]
    async fn test_social_profile() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/userprofile-service/socialProfile"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(include_str!("fixtures/social_profile.json")),
            )
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server);
        let profile = client.profile_payload(ProfileSource::SocialProfile).await.unwrap();
        assert_eq!(profile["profileId"], 88123401);
    }

    #[tokio::test]
    async fn test_gear_catalog_by_profile() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/gear-service/gear/filterGear"))
            .and(query_param("userProfilePk", "88123401"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(include_str!("fixtures/activity_gear.json")),
            )
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server);
        let catalog = client.gear_catalog(88123401).await.unwrap();
        assert!(catalog.is_array());
    }
}

mod error_tests {
    use super::*;

    #[tokio::test]
    async fn test_status_mapping() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/activity-service/activity/1"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/activity-service/activity/2"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/activity-service/activity/3"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server);

        assert!(matches!(
            client.activity_payload(DetailSource::Activity, 1).await,
            Err(SyncError::NotAuthenticated)
        ));
        assert!(matches!(
            client.activity_payload(DetailSource::Activity, 2).await,
            Err(SyncError::RateLimited)
        ));
        match client.activity_payload(DetailSource::Activity, 3).await {
            Err(SyncError::Api { status, message }) => {
                assert_eq!(status, 500);
                assert_eq!(message, "upstream exploded");
            }
            other => panic!("expected API error, got {:?}", other),
        }
        assert!(matches!(
            client.activity_payload(DetailSource::Activity, 4).await,
            Err(SyncError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_body_is_null() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/activity-service/activity/9/details"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server);
        let payload = client
            .activity_payload(DetailSource::ActivityDetails, 9)
            .await
            .unwrap();
        assert!(payload.is_null());
    }

    #[tokio::test]
    async fn test_garbage_body_is_invalid_response() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/userprofile-service/userprofile/settings"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server);
        let err = client
            .profile_payload(ProfileSource::UserProfile)
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::InvalidResponse(_)));
        assert!(err.is_unavailable());
    }
}

mod sheets_tests {
    use super::*;
    use garmin_sheets_sync::sheets::{RowStore, SheetsClient};
    use serde_json::json;
    use wiremock::matchers::{body_json, path_regex};

    fn sheets_client(mock_server: &MockServer) -> SheetsClient {
        SheetsClient::new_with_base_url(&mock_server.uri(), "Bearer ya29.test", "sheet-123")
            .unwrap()
            .with_tab("Runs")
    }

    #[tokio::test]
    async fn test_first_sheet_title() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v4/spreadsheets/sheet-123"))
            .and(query_param("fields", "sheets.properties.title"))
            .and(header("Authorization", "Bearer ya29.test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "sheets": [
                    {"properties": {"title": "Garmin Data"}},
                    {"properties": {"title": "Archive"}}
                ]
            })))
            .mount(&mock_server)
            .await;

        let client = sheets_client(&mock_server);
        assert_eq!(client.first_sheet_title().await.unwrap(), "Garmin Data");
    }

    #[tokio::test]
    async fn test_first_column_normalizes_ids() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path_regex(r"^/v4/spreadsheets/sheet-123/values/.+A%3AA$"))
            .and(query_param("valueRenderOption", "UNFORMATTED_VALUE"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "range": "Runs!A1:A4",
                "majorDimension": "ROWS",
                "values": [["activity_id"], [21247810009u64], [], ["21231877203"]]
            })))
            .mount(&mock_server)
            .await;

        let client = sheets_client(&mock_server);
        let column = client.first_column().await.unwrap();
        assert_eq!(column, vec!["activity_id", "21247810009", "", "21231877203"]);
    }

    #[tokio::test]
    async fn test_first_column_of_empty_sheet() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path_regex(r"A%3AA$"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "range": "Runs!A1:A1000",
                "majorDimension": "ROWS"
            })))
            .mount(&mock_server)
            .await;

        let client = sheets_client(&mock_server);
        assert!(client.first_column().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_append_row() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path_regex(r":append$"))
            .and(query_param("valueInputOption", "RAW"))
            .and(query_param("insertDataOption", "INSERT_ROWS"))
            .and(body_json(json!({
                "majorDimension": "ROWS",
                "values": [["21247810009", "2026-10-14", 8.01]]
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"updates": {"updatedRows": 1}})),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = sheets_client(&mock_server);
        client
            .append_row(&[json!("21247810009"), json!("2026-10-14"), json!(8.01)])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_permission_denied_is_sheets_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("PERMISSION_DENIED"))
            .mount(&mock_server)
            .await;

        let client = sheets_client(&mock_server);
        let err = client.append_row(&[json!("1")]).await.unwrap_err();
        assert!(matches!(err, SyncError::Sheets(_)));
        assert!(err.to_string().contains("PERMISSION_DENIED"));
    }
}
