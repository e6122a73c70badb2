//! Scrape orchestration.
//!
//! One scrape covers admission, dialing the controller, login, fetching
//! the information page and deriving metrics, all bounded by a single
//! wall-clock deadline. A weighted admission semaphore caps the number of
//! scrapes executing concurrently; excess scrapes wait for a slot under
//! the same deadline.
//!
//! Within one scrape the protocol collection and an out-of-band HTTP time
//! check run concurrently. Failure of either is reported as a distinct,
//! labeled error without aborting the other; samples from whichever parts
//! succeeded are kept.

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use chrono::{DateTime, FixedOffset};
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::client::Client;
use crate::collector::floor::CounterFloor;
use crate::collector::pipeline::Pipeline;
use crate::collector::sample::{Sample, NODE_TIME};
use crate::error::{Error, Result};
use crate::lang::Terminology;

// ============================================================================
// CollectorOpts
// ============================================================================

/// Configuration for a [`Collector`].
#[derive(Debug, Clone)]
pub struct CollectorOpts {
    /// `host:port` of the controller websocket service.
    pub address: String,

    /// Password for the websocket service.
    pub password: String,

    /// Optional `host:port` of the controller HTTP service, used to
    /// retrieve the controller clock.
    pub http_address: Option<String>,

    /// Controller interface terminology.
    pub terms: Terminology,

    /// Timezone for parsing controller timestamps.
    pub timezone: FixedOffset,

    /// Maximum duration for one scrape, including admission.
    pub timeout: Duration,

    /// Maximum number of concurrently executing scrapes.
    pub max_concurrent: usize,
}

// ============================================================================
// Scrape
// ============================================================================

/// Result of one scrape.
///
/// Partial success is a first-class outcome: `samples` holds everything
/// the unaffected steps produced even when `error` is set.
#[derive(Debug)]
pub struct Scrape {
    /// Samples produced by the successful parts of the scrape.
    pub samples: Vec<Sample>,

    /// Aggregated error text, if any part failed.
    pub error: Option<String>,
}

impl Scrape {
    /// Returns `true` if the scrape completed without errors.
    #[inline]
    #[must_use]
    pub fn is_up(&self) -> bool {
        self.error.is_none()
    }

    fn failed(error: Error) -> Self {
        Self {
            samples: Vec::new(),
            error: Some(error.to_string()),
        }
    }
}

// ============================================================================
// Collector
// ============================================================================

/// Scrapes one controller and derives samples.
///
/// Each collector instance owns its own counter-floor map; on multi-target
/// deployments this scopes the floors to one target and avoids
/// cross-target interference.
pub struct Collector {
    address: String,
    password: String,
    http_address: Option<String>,
    terms: Terminology,
    timezone: FixedOffset,
    timeout: Duration,
    sem: Semaphore,
    floor: CounterFloor,
    http: reqwest::Client,
}

impl Collector {
    /// Creates a collector.
    #[must_use]
    pub fn new(opts: CollectorOpts) -> Self {
        Self {
            address: opts.address,
            password: opts.password,
            http_address: opts.http_address,
            terms: opts.terms,
            timezone: opts.timezone,
            timeout: opts.timeout,
            sem: Semaphore::new(opts.max_concurrent.max(1)),
            floor: CounterFloor::new(),
            http: reqwest::Client::new(),
        }
    }

    /// Performs one scrape.
    ///
    /// Never fails; errors are reported through [`Scrape::error`] so the
    /// exposition layer can turn them into the `luxws_up` indicator.
    pub async fn scrape(&self) -> Scrape {
        match tokio::time::timeout(self.timeout, self.scrape_inner()).await {
            Ok(scrape) => scrape,
            Err(_) => {
                warn!(timeout_ms = self.timeout.as_millis() as u64, "scrape timed out");
                Scrape::failed(Error::timeout("scrape", self.timeout.as_millis() as u64))
            }
        }
    }

    async fn scrape_inner(&self) -> Scrape {
        // Excess scrapes wait here, still bounded by the scrape deadline.
        let Ok(_permit) = self.sem.acquire().await else {
            return Scrape::failed(Error::connection("scrape limiter closed"));
        };

        let (ws, http) = tokio::join!(self.collect_ws(), self.collect_http());

        let (mut samples, ws_error) = ws;
        let mut failures = Vec::new();

        if let Some(e) = ws_error {
            failures.push(format!("collection via LuxWS protocol failed: {e}"));
        }

        match http {
            Ok(Some(sample)) => samples.push(sample),
            Ok(None) => {}
            Err(e) => failures.push(format!("collection via HTTP protocol failed: {e}")),
        }

        let error = if failures.is_empty() {
            None
        } else {
            Some(failures.join("; "))
        };

        Scrape { samples, error }
    }

    /// Collects samples over the LuxWS protocol.
    ///
    /// Returns whatever samples the pipeline produced together with the
    /// connection or aggregated step error. A fresh session is used for
    /// every scrape.
    async fn collect_ws(&self) -> (Vec<Sample>, Option<Error>) {
        let client = match Client::dial(&self.address).await {
            Ok(client) => client,
            Err(e) => return (Vec::new(), Some(e)),
        };

        let result = self.collect_ws_session(&client).await;

        if let Err(e) = client.close().await {
            debug!(error = %e, "closing connection failed");
        }

        match result {
            Ok((samples, step_error)) => (samples, step_error),
            Err(e) => (Vec::new(), Some(e)),
        }
    }

    async fn collect_ws_session(&self, client: &Client) -> Result<(Vec<Sample>, Option<Error>)> {
        let nav = client.login(&self.password).await?;

        let info = nav
            .find_by_name(self.terms.nav_information)
            .ok_or_else(|| Error::item_not_found(self.terms.nav_information))?;

        let content = client.get(&info.id).await?;

        let pipeline = Pipeline::new(&self.terms, self.timezone, &self.floor);
        Ok(pipeline.collect_all(&content))
    }

    /// Retrieves the controller clock from the HTTP `Date` header.
    ///
    /// Returns `Ok(None)` when no HTTP address is configured.
    async fn collect_http(&self) -> Result<Option<Sample>> {
        let Some(address) = &self.http_address else {
            return Ok(None);
        };

        let url = format!("http://{address}/");
        let response = self.http.get(&url).send().await?;

        let date = response
            .headers()
            .get(reqwest::header::DATE)
            .and_then(|value| value.to_str().ok())
            .ok_or(Error::MissingDateHeader)?;

        let ts = DateTime::parse_from_rfc2822(date).map_err(|_| Error::timestamp(date))?;

        Ok(Some(Sample::new(
            &NODE_TIME,
            ts.timestamp() as f64,
            Vec::<String>::new(),
        )))
    }
}

// ============================================================================
// Tests
// ============================================================================
