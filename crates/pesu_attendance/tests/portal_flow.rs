mod common;

use common::*;
use mockito::{Matcher, Server};
use pesu_attendance::portal::{
    collect_report, Credentials, CsrfToken, PortalClient, PortalConfig, PortalError, ReportFailure,
};
use serde_json::json;
use std::sync::Arc;

fn credentials() -> Credentials {
    Credentials::new("PES1UG20CS001", "secret")
}

#[tokio::test]
async fn test_bad_credentials_stop_the_pipeline() {
    let mut server = Server::new_async().await;

    let _login_page = server
        .mock("GET", LOGIN_PATH)
        .with_header("set-cookie", "JSESSIONID=abc123; Path=/")
        .with_body(LOGIN_PAGE)
        .create_async()
        .await;
    let auth = server
        .mock("POST", AUTH_PATH)
        .with_body("<div class=\"login-error\">Bad credentials</div>")
        .create_async()
        .await;
    let dashboard = server
        .mock("GET", DASHBOARD_PATH)
        .expect(0)
        .create_async()
        .await;

    let client = client_for(&server);
    let result = collect_report(&client, &credentials()).await;

    assert_eq!(result, Err(ReportFailure::Login(PortalError::InvalidCredentials)));
    auth.assert_async().await;
    dashboard.assert_async().await;
}

#[tokio::test]
async fn test_login_page_without_csrf_field() {
    let mut server = Server::new_async().await;

    let _login_page = server
        .mock("GET", LOGIN_PATH)
        .with_body("<html><body>Under maintenance</body></html>")
        .create_async()
        .await;
    let auth = server
        .mock("POST", AUTH_PATH)
        .expect(0)
        .create_async()
        .await;

    let client = client_for(&server);
    let result = client.login(&credentials()).await;

    assert!(matches!(result, Err(PortalError::ScrapeStructure { .. })));
    auth.assert_async().await;
}

#[tokio::test]
async fn test_login_without_cookies_fails() {
    let mut server = Server::new_async().await;

    let _login_page = server
        .mock("GET", LOGIN_PATH)
        .with_body(LOGIN_PAGE)
        .create_async()
        .await;
    let _auth = server
        .mock("POST", AUTH_PATH)
        .with_body("<html></html>")
        .create_async()
        .await;

    let client = client_for(&server);
    let result = client.login(&credentials()).await;

    assert!(matches!(result, Err(PortalError::LoginFailed { .. })));
}

#[tokio::test]
async fn test_login_accepts_cookie_scoped_to_narrower_path() {
    let mut server = Server::new_async().await;

    let _login_page = server
        .mock("GET", LOGIN_PATH)
        .with_header("set-cookie", "JSESSIONID=abc123; Path=/Academy/s")
        .with_body(LOGIN_PAGE)
        .create_async()
        .await;
    let _auth = server
        .mock("POST", AUTH_PATH)
        .with_body("<html><body>Welcome</body></html>")
        .create_async()
        .await;
    let dashboard = server
        .mock("GET", DASHBOARD_PATH)
        .match_header("cookie", "JSESSIONID=abc123")
        .with_body(DASHBOARD_PAGE)
        .create_async()
        .await;

    let client = client_for(&server);
    let session = client.login(&credentials()).await.unwrap();
    let profile = session.fetch_profile("PES1UG20CS001").await.unwrap();

    assert_eq!(profile.student_name, "Jane Doe");
    dashboard.assert_async().await;
}

#[tokio::test]
async fn test_login_accepts_cookie_set_during_redirect() {
    let mut server = Server::new_async().await;

    let _login_page = server
        .mock("GET", LOGIN_PATH)
        .with_body(LOGIN_PAGE)
        .create_async()
        .await;
    let _auth = server
        .mock("POST", AUTH_PATH)
        .with_status(302)
        .with_header("set-cookie", "JSESSIONID=abc123; Path=/Academy/s")
        .with_header("location", "/Academy/s/studentProfilePESU")
        .create_async()
        .await;
    let _dashboard = mock_dashboard(&mut server).await;

    let client = client_for(&server);
    let result = client.login(&credentials()).await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_dashboard_redirect_to_login_means_expired() {
    let mut server = Server::new_async().await;
    let _login = mock_successful_login(&mut server).await;

    let _dashboard = server
        .mock("GET", DASHBOARD_PATH)
        .with_status(302)
        .with_header("location", "/Academy/login")
        .create_async()
        .await;
    let _login_again = server
        .mock("GET", "/Academy/login")
        .with_body(LOGIN_PAGE)
        .create_async()
        .await;

    let client = client_for(&server);
    let session = client.login(&credentials()).await.unwrap();
    let result = session.fetch_profile("PES1UG20CS001").await;

    assert!(matches!(result, Err(PortalError::SessionExpired { .. })));
}

#[tokio::test]
async fn test_profile_uses_data_token_and_username_fallback() {
    let mut server = Server::new_async().await;
    let _login = mock_successful_login(&mut server).await;

    let _dashboard = server
        .mock("GET", DASHBOARD_PATH)
        .match_header("cookie", Matcher::Regex("JSESSIONID=abc123".to_string()))
        .with_body(r#"<input name="csrf" value="data-token-2"><select></select>"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let session = client.login(&credentials()).await.unwrap();
    let profile = session.fetch_profile("PES1UG20CS001").await.unwrap();

    assert_eq!(profile.csrf_token, CsrfToken::new("data-token-2"));
    assert_eq!(profile.student_name, "PES1UG20CS001");
    assert!(profile.semesters.is_empty());
    assert_eq!(profile.current_batch_id(), None);
}

#[tokio::test]
async fn test_attendance_without_batch_makes_no_request() {
    let mut server = Server::new_async().await;
    let _login = mock_successful_login(&mut server).await;

    let attendance = server
        .mock("POST", ATTENDANCE_PATH)
        .expect(0)
        .create_async()
        .await;

    let client = client_for(&server);
    let session = client.login(&credentials()).await.unwrap();
    let records = session
        .fetch_attendance(None, &CsrfToken::new("data-token-1"))
        .await
        .unwrap();

    assert!(records.is_empty());
    attendance.assert_async().await;
}

#[tokio::test]
async fn test_full_report() {
    let mut server = Server::new_async().await;
    let _login = mock_successful_login(&mut server).await;
    let _dashboard = mock_dashboard(&mut server).await;

    let attendance = server
        .mock("POST", ATTENDANCE_PATH)
        .match_header("x-csrf-token", "data-token-1")
        .match_header("x-requested-with", "XMLHttpRequest")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("controllerMode".into(), "6415".into()),
            Matcher::UrlEncoded("actionType".into(), "8".into()),
            Matcher::UrlEncoded("batchClassId".into(), "2345".into()),
            Matcher::UrlEncoded("menuId".into(), "660".into()),
        ]))
        .with_body(ATTENDANCE_PAGE)
        .create_async()
        .await;
    let calendar = server
        .mock("GET", CALENDAR_PATH)
        .match_header("x-csrf-token", "data-token-1")
        .with_body(CALENDAR_PAGE)
        .create_async()
        .await;
    let timetable = server
        .mock("GET", TIMETABLE_PATH)
        .match_header("x-csrf-token", "data-token-1")
        .with_body(TIMETABLE_PAGE)
        .create_async()
        .await;

    let client = client_for(&server);
    let report = collect_report(&client, &credentials()).await.unwrap();

    assert_eq!(report.student_name, "Jane Doe");
    assert_eq!(report.selected_batch_id.as_deref(), Some("2345"));
    assert_eq!(report.semesters.len(), 2);
    assert_eq!(report.semesters[1].name, "Sem-4");

    assert_eq!(
        serde_json::to_value(&report.attendance).unwrap(),
        json!([{
            "code": "CS301",
            "name": "Data Structures",
            "attended": 42,
            "total": 50,
            "percentage": 84
        }])
    );
    assert_eq!(report.calendar, json!([{"title": "ISA 1", "start": "2024-09-16"}]));
    assert_eq!(
        serde_json::to_value(&report.timetable).unwrap(),
        json!({"CS301": {"name": "Data Structures", "schedule": {"Tuesday": ["10:00 - 11:00"]}}})
    );

    attendance.assert_async().await;
    calendar.assert_async().await;
    timetable.assert_async().await;
}

#[tokio::test]
async fn test_data_failures_are_isolated() {
    let mut server = Server::new_async().await;
    let _login = mock_successful_login(&mut server).await;
    let _dashboard = mock_dashboard(&mut server).await;

    let _attendance = server
        .mock("POST", ATTENDANCE_PATH)
        .with_body(ATTENDANCE_PAGE)
        .create_async()
        .await;
    let _calendar = server
        .mock("GET", CALENDAR_PATH)
        .with_body("<html><body>No calendar published</body></html>")
        .create_async()
        .await;
    let _timetable = server
        .mock("GET", TIMETABLE_PATH)
        .with_status(500)
        .create_async()
        .await;

    let client = client_for(&server);
    let report = collect_report(&client, &credentials()).await.unwrap();

    assert_eq!(report.attendance.len(), 1);
    assert_eq!(report.calendar, json!([]));
    assert!(report.timetable.is_empty());
}

#[tokio::test]
async fn test_separate_logins_do_not_share_cookies() {
    let mut server = Server::new_async().await;
    let _login = mock_successful_login(&mut server).await;

    let client = client_for(&server);
    let first = client.login(&credentials()).await;
    let second = client.login(&credentials()).await;

    assert!(first.is_ok());
    assert!(second.is_ok());
}

#[tokio::test]
async fn test_silent_portal_times_out() {
    // Accepts connections and never answers
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let config = PortalConfig {
        timeout_secs: 1,
        ..PortalConfig::with_base_url(format!("http://{}/Academy", address))
    };
    let client = PortalClient::new(Arc::new(config)).unwrap();

    let result = client.login(&credentials()).await;

    assert!(matches!(result, Err(PortalError::Timeout)));
}

#[tokio::test]
async fn test_unreachable_portal() {
    let config = PortalConfig::with_base_url("http://127.0.0.1:1/Academy");
    let client = PortalClient::new(Arc::new(config)).unwrap();

    let result = client.login(&credentials()).await;

    assert!(matches!(result, Err(PortalError::Connection { .. })));
}
