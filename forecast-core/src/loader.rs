//! Observable loading state for UI collaborators.
//!
//! [`ForecastLoader`] publishes `Idle → Loading → Loaded | Failed` through a
//! watch channel. Starting a new load cancels the one in flight, so a
//! superseded fetch never overwrites a newer result. An explicit
//! [`ForecastLoader::cancel`] puts back whatever was settled before `Loading`.

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::{
    ForecastError, ForecastProvider, RequestDescriptor, WeatherResult, provider::fetch_cancellable,
};

#[derive(Debug, Clone, PartialEq, Default)]
pub enum LoadingState<T> {
    #[default]
    Idle,
    Loading,
    Loaded(T),
    Failed(ForecastError),
}

impl<T> LoadingState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ForecastError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// The load currently running and the state it replaced.
struct InFlight {
    token: CancellationToken,
    settled: LoadingState<WeatherResult>,
}

pub struct ForecastLoader {
    provider: Arc<dyn ForecastProvider>,
    state: watch::Sender<LoadingState<WeatherResult>>,
    in_flight: Mutex<Option<InFlight>>,
}

impl ForecastLoader {
    pub fn new(provider: Arc<dyn ForecastProvider>) -> Self {
        let (state, _) = watch::channel(LoadingState::Idle);
        Self {
            provider,
            state,
            in_flight: Mutex::new(None),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<LoadingState<WeatherResult>> {
        self.state.subscribe()
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> LoadingState<WeatherResult> {
        self.state.borrow().clone()
    }

    /// Fetch `request`, publishing progress. Returns the outcome of this
    /// attempt; a superseded or cancelled attempt returns
    /// [`ForecastError::Cancelled`] and publishes nothing further.
    pub async fn load(&self, request: &RequestDescriptor) -> Result<WeatherResult, ForecastError> {
        let token = CancellationToken::new();
        {
            let mut in_flight = self.in_flight.lock();
            let settled = match in_flight.take() {
                Some(previous) => {
                    previous.token.cancel();
                    previous.settled
                }
                None => self.state(),
            };
            *in_flight = Some(InFlight {
                token: token.clone(),
                settled,
            });
            self.state.send_replace(LoadingState::Loading);
        }

        let result = fetch_cancellable(self.provider.as_ref(), request, &token).await;

        let mut in_flight = self.in_flight.lock();
        if token.is_cancelled() {
            return Err(ForecastError::Cancelled);
        }
        *in_flight = None;
        let next = match &result {
            Ok(weather) => LoadingState::Loaded(weather.clone()),
            Err(err) => LoadingState::Failed(err.clone()),
        };
        self.state.send_replace(next);
        result
    }

    /// Cancel the fetch in flight, if any, and republish the state it
    /// replaced.
    pub fn cancel(&self) {
        let mut in_flight = self.in_flight.lock();
        if let Some(InFlight { token, settled }) = in_flight.take() {
            token.cancel();
            tracing::debug!("forecast load cancelled");
            self.state.send_replace(settled);
        }
    }
}

impl std::fmt::Debug for ForecastLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForecastLoader")
            .field("provider", &self.provider)
            .field("state", &*self.state.borrow())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ApiKey, FieldSet, HostDefaults, RequestBuilder, Timeline, Timestep, WeatherQuery};
    use async_trait::async_trait;
    use chrono::DateTime;
    use std::time::Duration;

    /// Answers "slow" locations after a delay, "fail" with an error, anything
    /// else immediately. The result carries one timeline per character of
    /// the location so tests can tell results apart.
    #[derive(Debug)]
    struct Scripted;

    #[async_trait]
    impl ForecastProvider for Scripted {
        async fn fetch(&self, request: &RequestDescriptor) -> Result<WeatherResult, ForecastError> {
            let location = request.param("location").unwrap_or_default();
            if location == "slow" {
                tokio::time::sleep(Duration::from_millis(300)).await;
            }
            if location == "fail" {
                return Err(ForecastError::network(Some(500), "boom"));
            }
            let ts = DateTime::parse_from_rfc3339("2021-12-15T10:00:00-08:00").unwrap();
            let timeline = Timeline {
                timestep: Timestep::Current,
                start_time: ts,
                end_time: ts,
                intervals: Vec::new(),
            };
            Ok(WeatherResult {
                timelines: vec![timeline; location.len()],
            })
        }
    }

    fn request(location: &str) -> RequestDescriptor {
        let builder = RequestBuilder::new(
            crate::TIMELINES_ENDPOINT,
            ApiKey::new("k"),
            HostDefaults::default(),
        );
        let query = WeatherQuery::new(location, FieldSet::parse("temperature"));
        builder.build(&query).unwrap()
    }

    fn loader() -> ForecastLoader {
        ForecastLoader::new(Arc::new(Scripted))
    }

    fn loaded_len(loader: &ForecastLoader) -> Option<usize> {
        loader.state().value().map(|r| r.timelines.len())
    }

    #[tokio::test]
    async fn starts_idle_and_publishes_loaded() {
        let loader = loader();
        let mut rx = loader.subscribe();
        assert_eq!(loader.state(), LoadingState::Idle);

        let result = loader.load(&request("ab")).await.unwrap();
        assert_eq!(result.timelines.len(), 2);

        rx.changed().await.unwrap();
        let state = rx.borrow_and_update().clone();
        assert_eq!(state.value().map(|r| r.timelines.len()), Some(2));
    }

    #[tokio::test]
    async fn publishes_failure() {
        let loader = loader();
        let err = loader.load(&request("fail")).await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(loader.state().error(), Some(&err));
    }

    #[tokio::test]
    async fn superseded_fetch_does_not_publish() {
        let loader = loader();
        let slow = request("slow");
        let fast = request("abc");

        let (slow, fast) = tokio::join!(loader.load(&slow), async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            loader.load(&fast).await
        });

        assert_eq!(slow, Err(ForecastError::Cancelled));
        assert_eq!(fast.map(|r| r.timelines.len()), Ok(3));
        assert_eq!(loaded_len(&loader), Some(3));
    }

    #[tokio::test]
    async fn cancel_restores_previous_result() {
        let loader = loader();
        loader.load(&request("ab")).await.unwrap();
        let slow = request("slow");

        let (slow, _) = tokio::join!(loader.load(&slow), async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            assert!(loader.state().is_loading());
            loader.cancel();
        });

        assert_eq!(slow, Err(ForecastError::Cancelled));
        assert_eq!(loaded_len(&loader), Some(2));

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(loaded_len(&loader), Some(2));
    }

    #[tokio::test]
    async fn cancel_after_supersede_restores_last_settled_state() {
        let loader = loader();
        let first = request("slow");
        let second = request("slow");

        let (first, second, _) = tokio::join!(
            loader.load(&first),
            async {
                tokio::time::sleep(Duration::from_millis(20)).await;
                loader.load(&second).await
            },
            async {
                tokio::time::sleep(Duration::from_millis(40)).await;
                loader.cancel();
            }
        );

        assert_eq!(first, Err(ForecastError::Cancelled));
        assert_eq!(second, Err(ForecastError::Cancelled));
        assert_eq!(loader.state(), LoadingState::Idle);
    }

    #[test]
    fn cancel_without_load_is_a_no_op() {
        let loader = loader();
        loader.cancel();
        assert_eq!(loader.state(), LoadingState::Idle);
    }
}
