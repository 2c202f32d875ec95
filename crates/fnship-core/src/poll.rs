//! Report polling
//!
//! Repeatedly probes the deployed function's report endpoint until it
//! serves HTML or the budget elapses. Timing goes through the [`Clock`]
//! trait so the loop is testable without wall-clock waits, and
//! network-level failures are absorbed: a freshly deployed function may
//! take a while to become routable.

use indicatif::{ProgressBar, ProgressStyle};
use reqwest::StatusCode;
use std::time::{Duration, Instant};

use crate::{Error, Result};

/// Time source and sleep, injectable for tests
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, duration: Duration);
}

/// Wall-clock implementation
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Retry loop with a fixed interval and an overall deadline
pub struct Poller<'a> {
    clock: &'a dyn Clock,
    interval: Duration,
    deadline: Duration,
    show_progress: bool,
}

impl<'a> Poller<'a> {
    /// Create a poller over the given clock
    pub fn new(clock: &'a dyn Clock, interval: Duration, deadline: Duration) -> Self {
        Self {
            clock,
            interval,
            deadline,
            show_progress: false,
        }
    }

    /// Enable the console spinner
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Probe until `probe` returns a value or the deadline elapses.
    ///
    /// The probe itself decides what counts as "not ready" (including
    /// transient errors); the poller only accounts for time.
    pub fn wait_for<T>(&self, what: &str, mut probe: impl FnMut() -> Option<T>) -> Result<T> {
        let start = self.clock.now();
        let progress = self.show_progress.then(WaitProgress::new);
        let mut attempts = 0u32;

        while self.clock.now().duration_since(start) < self.deadline {
            attempts += 1;
            if let Some(value) = probe() {
                if let Some(ref bar) = progress {
                    bar.finish();
                }
                tracing::info!("{} became available after {} attempt(s)", what, attempts);
                return Ok(value);
            }

            let elapsed = self.clock.now().duration_since(start);
            tracing::debug!(
                "{} not ready yet (attempt {}, {}s elapsed)",
                what,
                attempts,
                elapsed.as_secs()
            );
            if let Some(ref bar) = progress {
                bar.attempt(attempts, elapsed);
            }

            self.clock.sleep(self.interval);
        }

        if let Some(ref bar) = progress {
            bar.finish();
        }
        Err(Error::timeout(
            format!(
                "{} did not become available within {} seconds",
                what,
                self.deadline.as_secs()
            ),
            "The function may still be starting. Run `fnship report` to poll again.",
        ))
    }
}

/// Spinner shown while polling. Ticked manually from the poll loop, so no
/// background thread is involved.
struct WaitProgress {
    bar: ProgressBar,
}

impl WaitProgress {
    fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .expect("Invalid progress template"),
        );
        Self { bar }
    }

    fn attempt(&self, attempts: u32, elapsed: Duration) {
        self.bar.set_message(format!(
            "Waiting for the report ({} attempts, {}s elapsed)",
            attempts,
            elapsed.as_secs()
        ));
        self.bar.tick();
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

/// Blocking HTTP probe for the report endpoint
pub struct ReportClient {
    client: reqwest::blocking::Client,
}

impl ReportClient {
    /// Create a client with the given per-request timeout
    pub fn new(request_timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(request_timeout)
            .build()?;
        Ok(Self { client })
    }

    /// One poll attempt: `Some(body)` iff the endpoint answered 200 with
    /// an HTML document. Non-200 responses, non-HTML bodies and
    /// network-level errors all mean "not ready yet".
    pub fn try_fetch(&self, url: &str) -> Option<String> {
        match self.client.get(url).send() {
            Ok(response) if response.status() == StatusCode::OK => match response.text() {
                Ok(body) if contains_html_marker(&body) => Some(body),
                Ok(_) => {
                    tracing::debug!("Response has no HTML root tag yet");
                    None
                }
                Err(err) => {
                    tracing::debug!("Could not read the response body: {}", err);
                    None
                }
            },
            Ok(response) => {
                tracing::debug!("Endpoint not ready: HTTP {}", response.status());
                None
            }
            Err(err) => {
                tracing::debug!("Endpoint not reachable yet: {}", err);
                None
            }
        }
    }
}

/// Poll `url` until it serves the HTML report, returning the body
pub fn wait_for_report(client: &ReportClient, poller: &Poller, url: &str) -> Result<String> {
    tracing::info!(
        "Waiting for the report at {} (budget: {}s)",
        url,
        poller.deadline.as_secs()
    );
    poller.wait_for(url, || client.try_fetch(url))
}

fn contains_html_marker(body: &str) -> bool {
    body.to_lowercase().contains("<html")
}
