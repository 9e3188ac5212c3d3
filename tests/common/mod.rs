// SPDX-License-Identifier: MIT

//! Shared helpers for the integration tests: a mock backend plus fixture
//! payloads matching the wire contract.

use paceline_client::config::Config;
use paceline_client::services::ApiClient;
use serde_json::json;
use tempfile::TempDir;
use wiremock::MockServer;

/// Config pointed at a mock backend, with session state in a temp dir.
///
/// Returns the `TempDir` so callers keep it alive for the test's duration.
#[allow(dead_code)]
pub fn test_config(server: &MockServer) -> (Config, TempDir) {
    let dir = TempDir::new().expect("temp dir");
    let config = Config {
        api_url: server.uri(),
        session_file: dir.path().join("session.json"),
        ..Config::default()
    };
    (config, dir)
}

/// An `ApiClient` talking to the mock backend.
#[allow(dead_code)]
pub fn test_client(server: &MockServer) -> ApiClient {
    let (config, _dir) = test_config(server);
    ApiClient::new(&config).expect("client should build")
}

/// A `/profile/` response body in the backend's envelope.
#[allow(dead_code)]
pub fn profile_body() -> serde_json::Value {
    json!({
        "success": true,
        "profile": {
            "firstname": "Jane",
            "lastname": "Doe",
            "email": "jane@example.com",
            "profile": "https://cdn.example.com/jane.png",
            "is_premium": false,
            "member_since": "2023-06-01",
            "preferences": {
                "race_distance": "10K",
                "race_date": "2024-10-13",
                "ideal_training_week": [
                    {"day": "sat", "session_type": "long run"}
                ]
            }
        }
    })
}

/// A `/training-week/` response body.
#[allow(dead_code)]
pub fn training_week_body() -> serde_json::Value {
    json!({
        "past_training_week": [
            {
                "activity": {"day_of_week": "mon", "distance_in_miles": 4.1},
                "coach_notes": "Nice relaxed effort."
            }
        ],
        "future_training_week": {
            "sessions": [
                {"day": "sat", "session_type": "long run", "distance": 12.0,
                 "notes": "easy pace"}
            ]
        }
    })
}
