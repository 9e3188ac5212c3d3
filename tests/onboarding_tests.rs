// SPDX-License-Identifier: MIT

//! Tests for the onboarding wizard: step gating, email validation, and
//! the session transitions each step drives.

use paceline_client::models::{Day, Preferences, RaceDistance, SessionType};
use paceline_client::services::{
    ApiClient, AuthMethod, OnboardingError, OnboardingFlow, OnboardingStep, SessionStatus,
    SessionStore,
};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;
use common::test_client;

fn harness(server: &MockServer) -> (ApiClient, SessionStore, TempDir) {
    let dir = TempDir::new().expect("temp dir");
    let store = SessionStore::open(dir.path().join("session.json"));
    store.sign_in(
        "abc".to_string(),
        Some("user-42".to_string()),
        AuthMethod::ExternalIdentity,
    );
    (test_client(server), store, dir)
}

#[tokio::test]
async fn test_invalid_email_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/email/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (api, store, _dir) = harness(&server);
    let flow = OnboardingFlow::new(&api, &store);

    let err = flow.submit_email("not-an-email").await.unwrap_err();
    assert!(matches!(err, OnboardingError::InvalidEmail), "got {err:?}");
    assert_eq!(flow.step(), OnboardingStep::Email);
}

#[tokio::test]
async fn test_submit_email_sends_exact_address() {
    // The signed-in session supplies both credentials in the body
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/email/"))
        .and(body_json(json!({
            "email": "runner@example.com",
            "token": "abc",
            "user_id": "user-42"
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let (api, store, _dir) = harness(&server);
    let flow = OnboardingFlow::new(&api, &store);

    flow.submit_email("runner@example.com").await.unwrap();
    assert_eq!(flow.step(), OnboardingStep::RaceSetup);
}

#[tokio::test]
async fn test_submit_email_failure_stays_on_email_step() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/email/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (api, store, _dir) = harness(&server);
    let flow = OnboardingFlow::new(&api, &store);

    let err = flow.submit_email("runner@example.com").await.unwrap_err();
    assert!(matches!(err, OnboardingError::Api(_)), "got {err:?}");
    assert_eq!(flow.step(), OnboardingStep::Email);
}

#[tokio::test]
async fn test_submit_email_without_credentials() {
    let server = MockServer::start().await;
    let dir = TempDir::new().expect("temp dir");
    let store = SessionStore::open(dir.path().join("session.json"));
    let api = test_client(&server);
    let flow = OnboardingFlow::new(&api, &store);

    let err = flow.submit_email("runner@example.com").await.unwrap_err();
    assert!(
        matches!(err, OnboardingError::NotAuthenticated),
        "got {err:?}"
    );
}

#[tokio::test]
async fn test_race_setup_moves_session_to_generating() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/email/"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/preferences/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let (api, store, _dir) = harness(&server);
    let flow = OnboardingFlow::new(&api, &store);
    flow.submit_email("runner@example.com").await.unwrap();

    let mut prefs = Preferences {
        race_distance: Some(RaceDistance::HalfMarathon),
        race_date: chrono::NaiveDate::from_ymd_opt(2024, 10, 13),
        ideal_training_week: vec![],
    };
    prefs.set_day(Day::Sat, SessionType::Long);
    flow.save_race_setup(&prefs).await.unwrap();

    assert_eq!(flow.step(), OnboardingStep::Generating);
    assert_eq!(store.status(), SessionStatus::GeneratingPlan);
}

#[tokio::test]
async fn test_skip_race_setup() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/email/"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/preferences/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (api, store, _dir) = harness(&server);
    let flow = OnboardingFlow::new(&api, &store);
    flow.submit_email("runner@example.com").await.unwrap();

    flow.skip_race_setup().unwrap();
    assert_eq!(flow.step(), OnboardingStep::Generating);
    assert_eq!(store.status(), SessionStatus::GeneratingPlan);
}

#[tokio::test]
async fn test_complete_logs_the_user_in() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/email/"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/refresh/"))
        .and(header("Authorization", "Bearer abc"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let (api, store, _dir) = harness(&server);
    let flow = OnboardingFlow::new(&api, &store);
    flow.submit_email("runner@example.com").await.unwrap();
    flow.skip_race_setup().unwrap();

    flow.complete().await.unwrap();
    assert_eq!(flow.step(), OnboardingStep::Done);
    assert_eq!(store.status(), SessionStatus::LoggedIn);
}

#[tokio::test]
async fn test_complete_failure_keeps_generating() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/email/"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/refresh/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (api, store, _dir) = harness(&server);
    let flow = OnboardingFlow::new(&api, &store);
    flow.submit_email("runner@example.com").await.unwrap();
    flow.skip_race_setup().unwrap();

    flow.complete().await.unwrap_err();
    assert_eq!(flow.step(), OnboardingStep::Generating);
    assert_eq!(store.status(), SessionStatus::GeneratingPlan);
}

#[tokio::test]
async fn test_steps_cannot_run_out_of_order() {
    let server = MockServer::start().await;
    let (api, store, _dir) = harness(&server);
    let flow = OnboardingFlow::new(&api, &store);

    let err = flow.skip_race_setup().unwrap_err();
    assert!(matches!(err, OnboardingError::OutOfOrder), "got {err:?}");

    let err = flow.complete().await.unwrap_err();
    assert!(matches!(err, OnboardingError::OutOfOrder), "got {err:?}");
}
