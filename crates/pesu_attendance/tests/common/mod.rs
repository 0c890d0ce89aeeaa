//! Fixture pages and mock-portal helpers shared by the integration tests.
#![allow(dead_code)]

use mockito::{Matcher, Mock, ServerGuard};
use pesu_attendance::portal::{PortalClient, PortalConfig};
use std::sync::Arc;

pub const LOGIN_PATH: &str = "/Academy/";
pub const AUTH_PATH: &str = "/Academy/j_spring_security_check";
pub const DASHBOARD_PATH: &str = "/Academy/s/studentProfilePESU";
pub const ATTENDANCE_PATH: &str = "/Academy/s/studentProfilePESUAdmin";
pub const CALENDAR_PATH: &str =
    "/Academy/s/studentProfilePESUAdmin?menuId=668&controllerMode=6413&actionType=5";
pub const TIMETABLE_PATH: &str =
    "/Academy/s/studentProfilePESUAdmin?menuId=669&controllerMode=6415&actionType=5";

pub const LOGIN_PAGE: &str = r#"
<html><body>
  <form action="j_spring_security_check" method="post">
    <input type="text" name="j_username">
    <input type="password" name="j_password">
    <input type="hidden" name="_csrf" value="login-token-1">
  </form>
</body></html>
"#;

pub const DASHBOARD_PAGE: &str = r#"
<html>
<head><meta name="csrf-token" content="meta-token"></head>
<body>
  <span class="app-name-font">JANE DOE</span>
  <input type="hidden" id="csrf" name="csrf" value="data-token-1">
  <select id="batchId">
    <option value="">Select</option>
    <option value='"2345"'>Sem-5</option>
    <option value="2101">Sem-4</option>
  </select>
</body>
</html>
"#;

pub const ATTENDANCE_PAGE: &str = r#"
<table>
  <tr><th>Code</th><th>Name</th><th>Classes</th><th>%</th></tr>
  <tr><td>CS301</td><td>Data Structures</td><td>42/50</td><td>84</td></tr>
  <tr><td>CS302</td><td>Operating Systems</td><td>NA</td><td>NA</td></tr>
</table>
"#;

pub const CALENDAR_PAGE: &str = r#"
<script>
  var obj = JSON.parse('[{"title":"ISA 1","start":"2024-09-16"}]');
</script>
"#;

pub const TIMETABLE_PAGE: &str = r#"
<script>
  var timeTableTemplateDetailsJson=[{"orderedBy":3,"startTime":"10:00","endTime":"11:00"}];
  var timeTableJson={"ttDivText_2_3":["ttSubject&&CS301-Data Structures"]};
</script>
"#;

/// A client whose portal lives on the mock server.
pub fn client_for(server: &ServerGuard) -> PortalClient {
    let config = PortalConfig::with_base_url(format!("{}/Academy", server.url()));
    PortalClient::new(Arc::new(config)).unwrap()
}

/// Mocks the login page and a credentials POST that succeeds.
pub async fn mock_successful_login(server: &mut ServerGuard) -> (Mock, Mock) {
    let login_page = server
        .mock("GET", LOGIN_PATH)
        .with_status(200)
        .with_header("set-cookie", "JSESSIONID=abc123; Path=/")
        .with_body(LOGIN_PAGE)
        .create_async()
        .await;

    let auth = server
        .mock("POST", AUTH_PATH)
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("j_username".into(), "PES1UG20CS001".into()),
            Matcher::UrlEncoded("j_password".into(), "secret".into()),
            Matcher::UrlEncoded("_csrf".into(), "login-token-1".into()),
        ]))
        .with_status(200)
        .with_body("<html><body>Welcome</body></html>")
        .create_async()
        .await;

    (login_page, auth)
}

/// Mocks the dashboard page.
pub async fn mock_dashboard(server: &mut ServerGuard) -> Mock {
    server
        .mock("GET", DASHBOARD_PATH)
        .with_status(200)
        .with_body(DASHBOARD_PAGE)
        .create_async()
        .await
}
