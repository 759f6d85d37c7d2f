mod common;

use advisor_client::config::{ApiConfig, Config, RetrySettings};
use advisor_client::context::PageContext;
use advisor_client::dto::{PasswordUpdate, PhotoUpload, RegistrationRequest, UserSettings};
use advisor_client::error::LoadError;
use advisor_client::fetch::FailureKind;
use advisor_client::loader::PageLoadState;
use advisor_client::notify::{NotificationLevel, Notifier};
use advisor_client::pages::{RoadmapPage, SettingsPage};
use advisor_client::AdvisorApiClient;
use common::{ok, ScriptedFetcher};
use mockito::Matcher;
use pretty_assertions::assert_eq;
use serde_json::json;

fn create_test_config(base_url: &str) -> Config {
    Config {
        api: ApiConfig {
            base_url: base_url.to_string(),
            timeout_ms: 2000,
        },
        retry: RetrySettings {
            max_attempts: 3,
            initial_delay_ms: 5,
            max_delay_ms: 20,
        },
        ..Default::default()
    }
}

#[test]
fn test_client_creation() {
    let client = AdvisorApiClient::new(create_test_config("http://advisor.test"));

    assert!(client.get_session_token().is_none());
    assert_eq!(client.context(), &PageContext::default());
    assert_eq!(client.config().retry.max_attempts, 3);
}

#[test]
fn test_get_and_set_session_token() {
    let mut client = AdvisorApiClient::new(create_test_config("http://advisor.test"));

    client.set_session_token("test_token".to_string());
    assert_eq!(client.get_session_token(), Some("test_token".to_string()));

    client.logout();
    assert!(client.get_session_token().is_none());
}

#[tokio::test]
async fn test_roadmap_page_over_http() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/career-roadmap")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("career".into(), "Data Scientist".into()),
            Matcher::UrlEncoded("country".into(), "".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "roadmap": [
                    {"title": "Statistics", "skills": ["Probability"], "video_url": "https://v/stats"},
                    {"title": "Machine Learning", "skills": "scikit-learn, PyTorch"}
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = AdvisorApiClient::new(create_test_config(&server.url()))
        .with_context(PageContext::new().with_career("Data Scientist"));

    let state = client.page(RoadmapPage).load().await;

    mock.assert_async().await;
    let steps = state.data().unwrap();
    assert_eq!(steps.len(), 2);
    assert_eq!(steps[0].video_url(), Some("https://v/stats"));
    assert_eq!(steps[1].skills, vec!["scikit-learn", "PyTorch"]);
}

#[tokio::test]
async fn test_server_errors_are_retried_then_surfaced() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/setting")
        .with_status(500)
        .with_body("oops")
        .expect(4)
        .create_async()
        .await;

    let (notifier, mut notes) = Notifier::channel();
    let client = AdvisorApiClient::new(create_test_config(&server.url()))
        .with_context(PageContext::new().with_user_email("ada@example.com"))
        .with_notifier(notifier);

    let state = client.page(SettingsPage).load().await;

    mock.assert_async().await;
    assert!(matches!(state, PageLoadState::Failed(_)));
    assert!(state.error_message().unwrap().contains("status 500"));

    let mut last = None;
    while let Ok(note) = notes.try_recv() {
        last = Some(note);
    }
    assert_eq!(last.unwrap().level, NotificationLevel::Error);
}

#[tokio::test]
async fn test_login_stores_session() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/login")
        .match_body(Matcher::Json(json!({
            "email": "ada@example.com",
            "password": "correct horse"
        })))
        .with_status(200)
        .with_body(r#"{"message":"Login successful","token":"jwt-123","user_id":42}"#)
        .create_async()
        .await;

    let mut client = AdvisorApiClient::new(create_test_config(&server.url()));
    let response = client.login(" ada@example.com ", "correct horse").await.unwrap();

    mock.assert_async().await;
    assert_eq!(response.message.as_deref(), Some("Login successful"));
    assert_eq!(client.get_session_token(), Some("jwt-123".to_string()));
    assert_eq!(client.context().user_id.as_deref(), Some("42"));
    assert_eq!(
        client.context().user_email.as_deref(),
        Some("ada@example.com")
    );
}

#[tokio::test]
async fn test_rejected_login_is_not_retried() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/login")
        .with_status(200)
        .with_body(r#"{"message":"Invalid credentials"}"#)
        .expect(1)
        .create_async()
        .await;

    let mut client = AdvisorApiClient::new(create_test_config(&server.url()));
    let response = client.login("ada@example.com", "wrong").await.unwrap();

    mock.assert_async().await;
    assert!(response.token.is_none());
    assert!(client.get_session_token().is_none());
}

#[tokio::test]
async fn test_wrong_password_is_sent_once_and_reports_server_text() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/login")
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":"Invalid email or password"}"#)
        .expect(1)
        .create_async()
        .await;

    let (notifier, mut notes) = Notifier::channel();
    let mut client =
        AdvisorApiClient::new(create_test_config(&server.url())).with_notifier(notifier);
    let err = client.login("ada@example.com", "wrongpass").await.unwrap_err();

    mock.assert_async().await;
    assert_eq!(
        err,
        LoadError::Rejected {
            status: 401,
            message: "Invalid email or password".to_string(),
        }
    );
    assert!(!err.is_retryable());
    assert!(client.get_session_token().is_none());

    let note = notes.try_recv().unwrap();
    assert_eq!(note.level, NotificationLevel::Error);
    assert_eq!(note.message, "Invalid email or password");
    assert!(notes.try_recv().is_err());
}

#[tokio::test]
async fn test_successful_login_announces_itself() {
    let fetcher = ScriptedFetcher::always(ok(r#"{"token":"jwt-1","email":"ada@example.com"}"#));
    let (notifier, mut notes) = Notifier::channel();
    let mut client =
        AdvisorApiClient::with_fetcher(create_test_config("http://advisor.test"), fetcher)
            .with_notifier(notifier);

    client.login("ada@example.com", "correct horse").await.unwrap();

    let note = notes.try_recv().unwrap();
    assert_eq!(note.level, NotificationLevel::Info);
    assert_eq!(note.message, "Logged in as ada@example.com");
}

#[tokio::test]
async fn test_registration_server_error_is_not_resent() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/submit_registration")
        .with_status(500)
        .with_body("internal error")
        .expect(1)
        .create_async()
        .await;

    let client = AdvisorApiClient::new(create_test_config(&server.url()));
    let err = client
        .submit_registration(&RegistrationRequest {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "longenough".to_string(),
            confirm_password: "longenough".to_string(),
            ..Default::default()
        })
        .await
        .unwrap_err();

    mock.assert_async().await;
    assert_eq!(err.failure_kind(), Some(FailureKind::HttpError));
    assert!(err.to_string().contains("status 500"));
}

#[tokio::test]
async fn test_settings_update_retries_server_errors_only() {
    let mut server = mockito::Server::new_async().await;
    let unavailable = server
        .mock("POST", "/api/update_setting")
        .with_status(503)
        .with_body(r#"{"message":"Try again later"}"#)
        .expect(4)
        .create_async()
        .await;

    let client = AdvisorApiClient::new(create_test_config(&server.url()))
        .with_context(PageContext::new().with_session_token("jwt"));
    let err = client
        .update_settings(&UserSettings {
            career: Some("Data Scientist".to_string()),
            ..Default::default()
        })
        .await
        .unwrap_err();

    unavailable.assert_async().await;
    assert_eq!(err.to_string(), "Try again later");
}

#[tokio::test]
async fn test_invalid_registration_sends_nothing() {
    let fetcher = ScriptedFetcher::always(ok(r#"{"message":"ok"}"#));
    let client = AdvisorApiClient::with_fetcher(create_test_config("http://advisor.test"), fetcher);

    let request = RegistrationRequest {
        name: "Ada".to_string(),
        email: "not-an-email".to_string(),
        password: "longenough".to_string(),
        confirm_password: "longenough".to_string(),
        ..Default::default()
    };
    let err = client.submit_registration(&request).await.unwrap_err();

    assert!(matches!(err, LoadError::Validation(_)));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_registration_and_settings_round() {
    let fetcher = ScriptedFetcher::new(vec![
        ok(r#"{"message":"Registration successful"}"#),
        ok(r#"{"message":"Settings updated","success":true}"#),
    ]);
    let client = AdvisorApiClient::with_fetcher(create_test_config("http://advisor.test"), fetcher)
        .with_context(PageContext::new().with_session_token("jwt"));

    let registered = client
        .submit_registration(&RegistrationRequest {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "longenough".to_string(),
            confirm_password: "longenough".to_string(),
            country: Some("UK".to_string()),
            education_level: None,
        })
        .await
        .unwrap();
    assert!(registered.is_success());

    let updated = client
        .update_settings(&UserSettings {
            email: Some("ada@example.com".to_string()),
            career: Some("Data Scientist".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(updated.message.as_deref(), Some("Settings updated"));
}

#[tokio::test]
async fn test_password_and_photo_validation() {
    let fetcher = ScriptedFetcher::always(ok("{}"));
    let client = AdvisorApiClient::with_fetcher(create_test_config("http://advisor.test"), fetcher);

    let same = PasswordUpdate {
        email: "ada@example.com".to_string(),
        current_password: "longenough".to_string(),
        new_password: "longenough".to_string(),
    };
    assert!(matches!(
        client.update_password(&same).await,
        Err(LoadError::Validation(_))
    ));

    let not_image = PhotoUpload {
        email: "ada@example.com".to_string(),
        file_name: "cv.pdf".to_string(),
        data_url: "data:application/pdf;base64,AAAA".to_string(),
    };
    assert!(matches!(
        client.upload_photo(&not_image).await,
        Err(LoadError::Validation(_))
    ));

    let photo = PhotoUpload {
        file_name: "me.png".to_string(),
        data_url: "data:image/png;base64,iVBORw0KGgo=".to_string(),
        ..not_image
    };
    tokio_test::assert_ok!(client.upload_photo(&photo).await);
}

#[tokio::test]
async fn test_unreachable_backend_reports_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = AdvisorApiClient::new(create_test_config(&format!("http://{addr}")));
    let err = client
        .update_password(&PasswordUpdate {
            email: "ada@example.com".to_string(),
            current_password: "oldpassword".to_string(),
            new_password: "newpassword".to_string(),
        })
        .await
        .unwrap_err();

    assert_eq!(err.failure_kind(), Some(FailureKind::NetworkError));
    assert!(err
        .to_string()
        .ends_with("Please check your connection and try again."));
}
