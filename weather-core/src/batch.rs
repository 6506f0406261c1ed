//! Batch retrieval across many locations.
//!
//! Both strategies return exactly one [`FetchOutcome`] per input location, in
//! input order. A failed location never aborts or contaminates its siblings.

use std::{collections::HashMap, fmt, num::NonZeroUsize, sync::Arc, time::Duration};

use tokio::{
    sync::Semaphore,
    task::{Id, JoinSet},
    time::{Instant, timeout_at},
};

use crate::{
    config::{DEFAULT_CONCURRENCY, FetchSettings},
    error::{ConfigError, FetchError},
    fetcher::{OpenWeatherFetcher, WeatherFetcher},
    model::WeatherRecord,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchMode {
    Sequential,
    Concurrent,
}

impl FetchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchMode::Sequential => "sequential",
            FetchMode::Concurrent => "concurrent",
        }
    }

    pub const fn all() -> &'static [FetchMode] {
        &[FetchMode::Sequential, FetchMode::Concurrent]
    }
}

impl fmt::Display for FetchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of fetching one location, tagged with its position in the request.
#[derive(Debug)]
pub struct FetchOutcome {
    pub index: usize,
    pub location: String,
    pub result: Result<WeatherRecord, FetchError>,
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Success/failure counts over a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchSummary {
    pub successes: usize,
    pub failures: usize,
}

impl BatchSummary {
    pub fn of(outcomes: &[FetchOutcome]) -> Self {
        let successes = outcomes.iter().filter(|o| o.is_success()).count();
        Self { successes, failures: outcomes.len() - successes }
    }
}

#[derive(Debug, Clone)]
pub struct BatchOrchestrator {
    fetcher: Arc<dyn WeatherFetcher>,
    concurrency: NonZeroUsize,
    deadline: Option<Duration>,
}

impl BatchOrchestrator {
    pub fn new(fetcher: Arc<dyn WeatherFetcher>) -> Self {
        Self {
            fetcher,
            concurrency: NonZeroUsize::new(DEFAULT_CONCURRENCY).unwrap_or(NonZeroUsize::MIN),
            deadline: None,
        }
    }

    /// Orchestrator backed by the HTTP fetcher, with the configured limits.
    pub fn from_settings(settings: &FetchSettings) -> Result<Self, ConfigError> {
        let fetcher = OpenWeatherFetcher::new(settings)?;
        let orchestrator =
            Self::new(Arc::new(fetcher)).with_concurrency(settings.concurrency);

        Ok(match settings.batch_deadline {
            Some(deadline) => orchestrator.with_deadline(deadline),
            None => orchestrator,
        })
    }

    /// Cap on simultaneous in-flight fetches in concurrent mode.
    pub fn with_concurrency(mut self, concurrency: NonZeroUsize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Overall deadline for a batch. Locations not finished in time are
    /// reported as [`FetchError::DeadlineExceeded`].
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub async fn fetch_all<S: AsRef<str>>(
        &self,
        locations: &[S],
        mode: FetchMode,
    ) -> Vec<FetchOutcome> {
        let locations: Vec<String> = locations.iter().map(|l| l.as_ref().to_string()).collect();
        let deadline = self.deadline.map(|d| Instant::now() + d);

        log::info!(
            "Fetching {} location(s), mode={mode}, concurrency={}",
            locations.len(),
            self.concurrency
        );

        let outcomes = match mode {
            FetchMode::Sequential => self.fetch_sequential(locations, deadline).await,
            FetchMode::Concurrent => self.fetch_concurrent(locations, deadline).await,
        };

        for outcome in &outcomes {
            if let Err(e) = &outcome.result {
                log::warn!("Fetch failed for '{}': {e}", outcome.location);
            }
        }

        outcomes
    }

    async fn fetch_sequential(
        &self,
        locations: Vec<String>,
        deadline: Option<Instant>,
    ) -> Vec<FetchOutcome> {
        let mut outcomes = Vec::with_capacity(locations.len());

        for (index, location) in locations.into_iter().enumerate() {
            let result = match deadline {
                Some(at) if Instant::now() >= at => Err(FetchError::DeadlineExceeded),
                Some(at) => timeout_at(at, self.fetcher.fetch(&location))
                    .await
                    .unwrap_or(Err(FetchError::DeadlineExceeded)),
                None => self.fetcher.fetch(&location).await,
            };

            outcomes.push(FetchOutcome { index, location, result });
        }

        outcomes
    }

    async fn fetch_concurrent(
        &self,
        locations: Vec<String>,
        deadline: Option<Instant>,
    ) -> Vec<FetchOutcome> {
        let permits = Arc::new(Semaphore::new(self.concurrency.get()));
        let mut tasks = JoinSet::new();
        let mut task_index: HashMap<Id, usize> = HashMap::with_capacity(locations.len());

        for (index, location) in locations.iter().enumerate() {
            let fetcher = Arc::clone(&self.fetcher);
            let permits = Arc::clone(&permits);
            let location = location.clone();

            let handle = tasks.spawn(async move {
                let Ok(_permit) = permits.acquire_owned().await else {
                    return (index, Err(FetchError::TaskFailed("worker pool closed".into())));
                };
                (index, fetcher.fetch(&location).await)
            });
            task_index.insert(handle.id(), index);
        }

        // Slots are addressed by input index; completion order is irrelevant.
        let mut slots: Vec<Option<Result<WeatherRecord, FetchError>>> =
            locations.iter().map(|_| None).collect();

        let collect = async {
            while let Some(joined) = tasks.join_next().await {
                match joined {
                    Ok((index, result)) => slots[index] = Some(result),
                    Err(e) => {
                        log::error!("Fetch task did not complete: {e}");
                        if let Some(&index) = task_index.get(&e.id()) {
                            slots[index] = Some(Err(FetchError::TaskFailed(e.to_string())));
                        }
                    }
                }
            }
        };

        let timed_out = match deadline {
            Some(at) => timeout_at(at, collect).await.is_err(),
            None => {
                collect.await;
                false
            }
        };

        if timed_out {
            log::warn!("Batch deadline elapsed with {} fetch(es) outstanding", tasks.len());
            tasks.abort_all();
        }

        locations
            .into_iter()
            .zip(slots)
            .enumerate()
            .map(|(index, (location, slot))| FetchOutcome {
                index,
                location,
                result: slot.unwrap_or_else(|| {
                    Err(if timed_out {
                        FetchError::DeadlineExceeded
                    } else {
                        FetchError::TaskFailed("worker task panicked or was cancelled".into())
                    })
                }),
            })
            .collect()
    }
}
