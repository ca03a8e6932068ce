use async_trait::async_trait;
use reqwest::Client;
use tracing::instrument;

use crate::{ForecastError, RequestDescriptor, WeatherResult, decode::decode_weather};

use super::ForecastProvider;

/// tomorrow.io timelines over HTTP.
#[derive(Debug, Clone, Default)]
pub struct TomorrowIoProvider {
    http: Client,
}

impl TomorrowIoProvider {
    pub fn new() -> Self {
        Self { http: Client::new() }
    }

    pub fn with_client(http: Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ForecastProvider for TomorrowIoProvider {
    #[instrument(skip_all, fields(url = %request.redacted_url()))]
    async fn fetch(&self, request: &RequestDescriptor) -> Result<WeatherResult, ForecastError> {
        let res = self
            .http
            .request(request.method.clone(), request.url.clone())
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "timelines request failed to send");
                ForecastError::network(None, format!("failed to send request to tomorrow.io: {e}"))
            })?;

        let status = res.status();
        let body = res.bytes().await.map_err(|e| {
            ForecastError::network(
                Some(status.as_u16()),
                format!("failed to read tomorrow.io response body: {e}"),
            )
        })?;

        if !status.is_success() {
            tracing::warn!(%status, "timelines request rejected");
            return Err(ForecastError::network(
                Some(status.as_u16()),
                format!(
                    "tomorrow.io request failed with status {}: {}",
                    status,
                    truncate_body(&String::from_utf8_lossy(&body)),
                ),
            ));
        }

        let result = decode_weather(&body).inspect_err(|e| {
            tracing::warn!(error = %e, "timelines response did not decode");
        })?;

        tracing::info!(
            timelines = result.timelines.len(),
            "decoded timelines response"
        );
        Ok(result)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}
