// src/pipeline/poll.rs

//! Scrape, dedupe and notify loop.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::error::{AppError, Result};
use crate::models::Config;
use crate::pipeline::RetryPolicy;
use crate::services::{ListingExtractor, Notifier, PageSource};
use crate::storage::LinkStore;
use crate::utils::url::normalize;

/// Summary of one poll cycle.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub url: String,
    pub started_at: DateTime<Utc>,
    pub extracted: usize,
    pub notified: usize,
    pub delivery_failures: usize,
}

impl CycleReport {
    /// Listings that were new this cycle, whether or not delivery worked.
    pub fn new_listings(&self) -> usize {
        self.notified + self.delivery_failures
    }
}

/// Rotates through the search URLs, announcing listings not seen before.
pub struct PollLoop {
    urls: Vec<String>,
    index: usize,
    store: LinkStore,
    extractor: ListingExtractor,
    source: Arc<dyn PageSource>,
    notifier: Notifier,
    interval: Duration,
    retry: RetryPolicy,
}

impl PollLoop {
    pub fn new(
        urls: Vec<String>,
        store: LinkStore,
        extractor: ListingExtractor,
        source: Arc<dyn PageSource>,
        notifier: Notifier,
    ) -> Result<Self> {
        if urls.is_empty() {
            return Err(AppError::config("poll loop needs at least one search URL"));
        }
        Ok(Self {
            urls,
            index: 0,
            store,
            extractor,
            source,
            notifier,
            interval: Duration::from_secs(60),
            retry: RetryPolicy::default(),
        })
    }

    /// Apply `[poll]` timing from the configuration.
    pub fn with_timing(mut self, config: &Config) -> Self {
        self.interval = Duration::from_secs(config.poll.interval_secs);
        self.retry = RetryPolicy::from_config(&config.poll);
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Start the rotation at `index` (wrapped to the URL count).
    pub fn with_start_index(mut self, index: usize) -> Self {
        self.index = index % self.urls.len();
        self
    }

    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn store(&self) -> &LinkStore {
        &self.store
    }

    /// Process the current URL once.
    ///
    /// New listings are announced and then recorded, in page order. A failed
    /// announcement still records the link. On error the rotation does not
    /// advance, so the same URL is retried next time.
    pub async fn run_cycle(&mut self) -> Result<CycleReport> {
        let url = self.urls[self.index].clone();
        log::info!("Processing URL {}/{}: {}", self.index + 1, self.urls.len(), url);

        let started_at = Utc::now();
        let listings = self.extractor.extract(self.source.as_ref(), &url).await?;

        let mut report = CycleReport {
            url,
            started_at,
            extracted: listings.len(),
            notified: 0,
            delivery_failures: 0,
        };

        for listing in &listings {
            let link = normalize(&listing.link);
            if self.store.contains(&link) {
                continue;
            }

            if self.notifier.notify(listing).await {
                report.notified += 1;
            } else {
                report.delivery_failures += 1;
            }
            self.store.persist(&link).await?;
        }

        self.index = (self.index + 1) % self.urls.len();
        Ok(report)
    }

    /// Run until the task is dropped.
    pub async fn run(mut self) {
        log::info!(
            "Watching {} search pages, {} links already seen",
            self.urls.len(),
            self.store.len()
        );

        loop {
            match self.run_cycle().await {
                Ok(report) => {
                    let elapsed = Utc::now() - report.started_at;
                    log::info!(
                        "Cycle done in {}ms: {} listings, {} new, {} delivery failures",
                        elapsed.num_milliseconds(),
                        report.extracted,
                        report.new_listings(),
                        report.delivery_failures
                    );
                    tokio::time::sleep(self.interval).await;
                }
                Err(e) => {
                    let delay = self.retry.next_delay();
                    log::error!(
                        "Cycle for {} failed: {}. Retrying in {}s",
                        self.urls[self.index],
                        e,
                        delay.as_secs()
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
