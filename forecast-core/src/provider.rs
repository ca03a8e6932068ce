use crate::{
    Config, ForecastError, HostDefaults, RequestBuilder, RequestDescriptor, WeatherResult,
    provider::tomorrow::TomorrowIoProvider,
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};
use tokio_util::sync::CancellationToken;

pub mod tomorrow;

/// Executes a built request and decodes the response.
///
/// One attempt per call: no retry, no caching, no coalescing of identical
/// requests. Every call returns a fresh [`WeatherResult`] owned by the caller.
#[async_trait]
pub trait ForecastProvider: Send + Sync + Debug {
    async fn fetch(&self, request: &RequestDescriptor) -> Result<WeatherResult, ForecastError>;
}

/// [`ForecastProvider::fetch`] that gives up with [`ForecastError::Cancelled`]
/// once `cancel` fires.
pub async fn fetch_cancellable(
    provider: &dyn ForecastProvider,
    request: &RequestDescriptor,
    cancel: &CancellationToken,
) -> Result<WeatherResult, ForecastError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            tracing::debug!("timelines fetch cancelled");
            Err(ForecastError::Cancelled)
        }
        result = provider.fetch(request) => result,
    }
}

/// Construct a request builder from config, failing when no API key is set.
pub fn request_builder_from_config(
    config: &Config,
    host: HostDefaults,
) -> anyhow::Result<RequestBuilder> {
    let api_key = config.api_key().ok_or_else(|| {
        anyhow::anyhow!(
            "No API key configured.\n\
                 Hint: run `forecast configure` or set TOMORROW_API_KEY."
        )
    })?;

    Ok(RequestBuilder::new(config.endpoint.clone(), api_key, host))
}

/// Construct the default provider.
pub fn default_provider() -> Arc<dyn ForecastProvider> {
    Arc::new(TomorrowIoProvider::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FieldSet, WeatherQuery};

    #[derive(Debug)]
    struct Pending;

    #[async_trait]
    impl ForecastProvider for Pending {
        async fn fetch(&self, _: &RequestDescriptor) -> Result<WeatherResult, ForecastError> {
            std::future::pending().await
        }
    }

    fn descriptor() -> RequestDescriptor {
        let builder = RequestBuilder::new(
            crate::TIMELINES_ENDPOINT,
            crate::ApiKey::new("k"),
            HostDefaults::default(),
        );
        builder
            .build(&WeatherQuery::new("1,2", FieldSet::parse("temperature")))
            .unwrap()
    }

    #[test]
    fn request_builder_from_config_errors_when_missing_api_key() {
        let cfg = Config::default();
        let err = request_builder_from_config(&cfg, HostDefaults::default()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("No API key configured"));
        assert!(msg.contains("Hint: run `forecast configure`"));
    }

    #[test]
    fn request_builder_from_config_uses_configured_endpoint() {
        let cfg = Config {
            api_key: Some("KEY".into()),
            endpoint: "http://localhost:9/v4/timelines".into(),
            ..Config::default()
        };
        let builder = request_builder_from_config(&cfg, HostDefaults::default()).unwrap();
        let req = builder
            .build(&WeatherQuery::new("here", FieldSet::parse("temperature")))
            .unwrap();
        assert_eq!(req.url.host_str(), Some("localhost"));
        assert_eq!(req.param("apikey").as_deref(), Some("KEY"));
    }

    #[tokio::test]
    async fn cancelled_token_stops_pending_fetch() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = fetch_cancellable(&Pending, &descriptor(), &cancel).await;
        assert_eq!(result, Err(ForecastError::Cancelled));
    }
}
