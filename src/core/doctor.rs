use crate::core::ent::*;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::{Duration, Instant};
use tokio::time;

pub const DEFAULT_CHECK_TIMEOUT: Duration = Duration::from_millis(5000);

const INFO_PATH: &str = "/info";

/// Checks a single node by asking its info endpoint how it is doing.
///
/// Every check is one attempt with a hard deadline. When the deadline passes
/// the in-flight request future is dropped, which closes the connection.
#[derive(Debug, Clone)]
pub struct Doctor {
    client: Client,
    timeout: Duration,
}

enum Reply {
    Answered { elapsed: Duration, info: NodeInfo },
    Rejected(StatusCode),
}

impl Doctor {
    pub fn new() -> Result<Doctor, reqwest::Error> {
        Doctor::with_timeout(DEFAULT_CHECK_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Doctor, reqwest::Error> {
        let client = Client::builder().build()?;
        Ok(Doctor { client, timeout })
    }

    pub async fn check_node(&self, url: &str) -> HealthCheckResult {
        let target = info_url(url);
        let started = Instant::now();
        let result = match time::timeout(self.timeout, self.fetch_info(&target, started)).await {
            Ok(Ok(Reply::Answered { elapsed, info })) => {
                HealthCheckResult::online(round_millis(elapsed), info)
            }
            Ok(Ok(Reply::Rejected(status))) => {
                HealthCheckResult::offline(None, format!("HTTP error: {}", status.as_u16()))
            }
            Ok(Err(err)) => {
                HealthCheckResult::offline(Some(round_millis(started.elapsed())), err.to_string())
            }
            Err(_) => HealthCheckResult::offline(
                Some(round_millis(started.elapsed())),
                format!("request timed out after {}ms", self.timeout.as_millis()),
            ),
        };
        if let Some(err) = &result.error_message {
            tracing::debug!(url = %target, error = %err, "node check failed");
        }
        result
    }

    async fn fetch_info(&self, url: &str, started: Instant) -> Result<Reply, reqwest::Error> {
        let response = self.client.get(url).send().await?;
        let elapsed = started.elapsed();
        let status = response.status();
        if !status.is_success() {
            return Ok(Reply::Rejected(status));
        }
        let payload: Value = response.json().await?;
        Ok(Reply::Answered {
            elapsed,
            info: NodeInfo::from_payload(&payload),
        })
    }
}

/// `<url>/info`, unless the url already points at the info endpoint.
pub fn info_url(url: &str) -> String {
    if url.ends_with(INFO_PATH) {
        url.to_string()
    } else {
        format!("{}{}", url, INFO_PATH)
    }
}

fn round_millis(elapsed: Duration) -> u64 {
    (elapsed.as_secs_f64() * 1000.0).round() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::{spawn_app, unused_addr};
    use axum::{http::StatusCode, routing::get, Json, Router};
    use serde_json::json;

    #[test]
    fn checks_time_out_after_five_seconds_by_default() {
        assert_eq!(DEFAULT_CHECK_TIMEOUT, Duration::from_millis(5000));
        assert_eq!(Doctor::new().unwrap().timeout, DEFAULT_CHECK_TIMEOUT);
    }

    #[test]
    fn info_suffix_is_appended_once() {
        assert_eq!(info_url("http://n1:8080"), "http://n1:8080/info");
        assert_eq!(info_url("http://n1:8080/info"), "http://n1:8080/info");
    }

    #[test]
    fn millis_are_rounded_to_nearest() {
        assert_eq!(round_millis(Duration::from_micros(1_499)), 1);
        assert_eq!(round_millis(Duration::from_micros(1_500)), 2);
    }

    #[tokio::test]
    async fn healthy_node_reports_info() {
        let app = Router::new().route(
            "/info",
            get(|| async { Json(json!({"version": "1.2.3", "identity": "abcdef1234567890"})) }),
        );
        let addr = spawn_app(app);

        let result = Doctor::new()
            .unwrap()
            .check_node(&format!("http://{}", addr))
            .await;

        assert!(result.success);
        assert!(result.response_time_millis.is_some());
        assert_eq!(result.error_message, None);
        let info = result.info.unwrap();
        assert_eq!(info.version.as_deref(), Some("1.2.3"));
        assert_eq!(info.identity.as_deref(), Some("abcdef1234567890"));
        assert_eq!(info.version_name, None);
    }

    #[tokio::test]
    async fn url_already_ending_in_info_is_used_as_is() {
        let app = Router::new().route("/info", get(|| async { Json(json!({})) }));
        let addr = spawn_app(app);

        let result = Doctor::new()
            .unwrap()
            .check_node(&format!("http://{}/info", addr))
            .await;

        assert!(result.success);
        assert_eq!(result.info, Some(NodeInfo::default()));
    }

    #[tokio::test]
    async fn server_error_is_reported_without_timing() {
        let app = Router::new().route("/info", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }));
        let addr = spawn_app(app);

        let result = Doctor::new()
            .unwrap()
            .check_node(&format!("http://{}", addr))
            .await;

        assert!(!result.success);
        assert_eq!(result.error_message.as_deref(), Some("HTTP error: 500"));
        assert_eq!(result.response_time_millis, None);
        assert_eq!(result.info, None);
    }

    #[tokio::test]
    async fn malformed_json_is_a_failure_with_timing() {
        let app = Router::new().route("/info", get(|| async { "definitely not json" }));
        let addr = spawn_app(app);

        let result = Doctor::new()
            .unwrap()
            .check_node(&format!("http://{}", addr))
            .await;

        assert!(!result.success);
        assert!(result.response_time_millis.is_some());
        assert!(result.error_message.is_some());
    }

    #[tokio::test]
    async fn refused_connection_is_a_failure() {
        let addr = unused_addr();

        let result = Doctor::new()
            .unwrap()
            .check_node(&format!("http://{}", addr))
            .await;

        assert!(!result.success);
        assert!(result.response_time_millis.is_some());
        assert!(!result.error_message.unwrap().is_empty());
    }

    #[tokio::test]
    async fn stalled_node_times_out() {
        let app = Router::new().route(
            "/info",
            get(|| async {
                time::sleep(Duration::from_secs(30)).await;
                Json(json!({}))
            }),
        );
        let addr = spawn_app(app);
        let doctor = Doctor::with_timeout(Duration::from_millis(200)).unwrap();

        let started = Instant::now();
        let result = doctor.check_node(&format!("http://{}", addr)).await;

        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(!result.success);
        let waited = result.response_time_millis.unwrap();
        assert!(waited >= 200 && waited < 2_000, "waited {}ms", waited);
        assert!(result.error_message.unwrap().contains("timed out"));
    }
}
