// End-to-end polling pass against a mocked on-call API
//
// Numan Thabit 2025 Nov

use mockito::{Server, ServerGuard};
use oncall_exporter::aggregators::default_aggregators;
use oncall_exporter::metrics::ExporterMetrics;
use oncall_exporter::scheduler::{run_pass, PassReport};
use oncall_exporter::transport::OncallClient;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

async fn upstream() -> ServerGuard {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/")
        .with_status(200)
        .with_body("<html>oncall</html>")
        .create_async()
        .await;
    server
        .mock("GET", "/api/v0/users")
        .with_status(200)
        .with_body(
            r#"[
                {"name": "alice", "contacts": {"call": "+1", "email": "alice@example.com"}},
                {"name": "bob", "contacts": {"email": "bob@example.com"}},
                {"name": "carol", "contacts": {}}
            ]"#,
        )
        .create_async()
        .await;
    server
        .mock("GET", "/api/v0/teams")
        .with_status(200)
        .with_body(r#"["a", "b"]"#)
        .create_async()
        .await;
    server
        .mock("GET", "/api/v0/teams/a/summary")
        .with_status(200)
        .with_body(
            r#"{
                "current": {
                    "primary": [{"user_contacts": {"call": "+1"}}],
                    "secondary": [{"user_contacts": {"sms": "+2"}}, {"user_contacts": {"call": "+3"}}]
                },
                "next": null
            }"#,
        )
        .create_async()
        .await;
    server
        .mock("GET", "/api/v0/teams/b/summary")
        .with_status(500)
        .create_async()
        .await;
    server
}

fn line(text: &str, series: &str) -> Option<String> {
    text.lines()
        .find(|l| l.starts_with(series) && l[series.len()..].starts_with(' '))
        .map(|l| l[series.len() + 1..].to_string())
}

#[tokio::test]
async fn full_pass_publishes_expected_series() {
    let server = upstream().await;
    let metrics = Arc::new(ExporterMetrics::new().unwrap());
    let client = OncallClient::new(
        &Url::parse(&server.url()).unwrap(),
        Duration::from_secs(5),
        metrics.clone(),
    )
    .unwrap();
    let aggregators = default_aggregators(client, metrics.clone());

    let report = run_pass(&aggregators).await;
    assert_eq!(report, PassReport { succeeded: 3, failed: 0 });

    let first = metrics.encode().unwrap();
    let value = |series: &str| line(&first, series);

    assert_eq!(value("oncall_health_status").as_deref(), Some("1"));
    assert_eq!(value("oncall_users_total").as_deref(), Some("3"));
    assert_eq!(value("oncall_users_without_contacts_gauge").as_deref(), Some("1"));
    assert_eq!(value("oncall_users_without_phone").as_deref(), Some("2"));
    assert_eq!(value("oncall_teams_total").as_deref(), Some("2"));
    assert_eq!(value("oncall_teams_understaffed").as_deref(), Some("0"));
    assert_eq!(value("oncall_teams_total_unreachable_by_phone").as_deref(), Some("0"));
    assert_eq!(
        value(r#"oncall_team_rotation_staff_count{rotation="current",team_name="a"}"#).as_deref(),
        Some("3")
    );
    assert_eq!(
        value(r#"oncall_team_rotation_staff_count{rotation="next",team_name="a"}"#).as_deref(),
        Some("0")
    );
    assert_eq!(
        value(r#"oncall_team_unreachable_by_phone_count{rotation="current",team_name="a"}"#)
            .as_deref(),
        Some("0")
    );
    assert!(!first.contains(r#"team_name="b""#));
    // /, users, teams, a, b
    assert_eq!(value("oncall_api_requests_total").as_deref(), Some("5"));
    assert_eq!(value("oncall_api_requests_failed_total").as_deref(), Some("1"));

    // an unchanged upstream yields the same gauges on the next pass
    run_pass(&aggregators).await;
    let second = metrics.encode().unwrap();
    let gauges = |text: &str| -> Vec<String> {
        text.lines()
            .filter(|l| !l.starts_with('#') && !l.starts_with("oncall_api_requests"))
            .map(str::to_string)
            .collect()
    };
    assert_eq!(gauges(&first), gauges(&second));
    assert_eq!(line(&second, "oncall_api_requests_total").as_deref(), Some("10"));
}

#[tokio::test]
async fn unreachable_upstream_only_marks_health_down() {
    let metrics = Arc::new(ExporterMetrics::new().unwrap());
    let client = OncallClient::new(
        &Url::parse("http://127.0.0.1:9").unwrap(),
        Duration::from_secs(1),
        metrics.clone(),
    )
    .unwrap();
    metrics.users_total.set(12);
    metrics.teams_total.set(4);

    let report = run_pass(&default_aggregators(client, metrics.clone())).await;

    assert_eq!(report, PassReport { succeeded: 0, failed: 3 });
    assert_eq!(metrics.health_status.get(), 0);
    assert_eq!(metrics.users_total.get(), 12);
    assert_eq!(metrics.teams_total.get(), 4);
    assert_eq!(metrics.api_requests_total.get(), 3);
    assert_eq!(metrics.api_requests_failed_total.get(), 0);
}
