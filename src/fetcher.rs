// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Retrieval of per-repository contributor statistics.
///
/// Drives the lazy-computation protocol of the statistics endpoint: pending
/// and throttled answers are retried in place, an empty answer yields no
/// contributors, and any other failure is returned with the repository, the
/// status and the raw body attached.
use std::sync::Arc;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::{
    error::Error,
    retry::RetryConfig,
    source::{ContributorWeeks, RepositoryRef, StatsResponse, StatsSource},
};

/// Fetches weekly contributor samples for single repositories.
///
/// The fetcher never touches shared aggregate state; callers merge the
/// returned samples themselves.
#[derive(Debug,)]
pub struct RepositoryStatsFetcher<S,>
{
    source: Arc<S,>,
    retry:  RetryConfig,
}

impl<S,> Clone for RepositoryStatsFetcher<S,>
{
    fn clone(&self,) -> Self
    {
        Self {
            source: Arc::clone(&self.source,), retry: self.retry.clone(),
        }
    }
}

impl<S: StatsSource,> RepositoryStatsFetcher<S,>
{
    pub fn new(source: Arc<S,>, retry: RetryConfig,) -> Self
    {
        Self {
            source,
            retry,
        }
    }

    /// Fetches the contributor statistics of `repository`.
    ///
    /// Pending and throttled answers are retried after
    /// [`RetryConfig::pending_delay`] and [`RetryConfig::throttle_delay`]
    /// respectively, indefinitely unless [`RetryConfig::max_attempts`] is set.
    ///
    /// # Errors
    ///
    /// * [`Error::Remote`] for any unrecoverable status.
    /// * [`Error::RetriesExhausted`] when the configured retry cap is hit.
    /// * Transport errors reported by the source.
    pub async fn fetch(&self, repository: &RepositoryRef,) -> Result<Vec<ContributorWeeks,>, Error,>
    {
        info!("Getting stats for repository: {}", repository);

        let mut retries = 0u32;
        loop {
            let delay = match self.source.contributor_stats(repository,).await? {
                StatsResponse::Ready(contributors,) => {
                    debug!(
                        "Received {} contributors for repository: {}",
                        contributors.len(),
                        repository
                    );
                    return Ok(contributors,);
                }
                StatsResponse::Empty => {
                    info!("No stats for repository: {}", repository);
                    return Ok(Vec::new(),);
                }
                StatsResponse::Failed {
                    status,
                    body,
                } => {
                    return Err(Error::Remote {
                        repository: repository.to_string(),
                        status,
                        body,
                    },);
                }
                StatsResponse::Pending => {
                    let delay = self.retry.pending_delay();
                    info!(
                        "Stats for repository {} are being computed, retrying in {:?}",
                        repository, delay
                    );
                    delay
                }
                StatsResponse::Throttled => {
                    let delay = self.retry.throttle_delay();
                    warn!("Rate limited, waiting {:?} on repository: {}", delay, repository);
                    delay
                }
            };

            if self.retry.exhausted(retries,) {
                return Err(Error::RetriesExhausted {
                    repository: repository.to_string(),
                    attempts:   retries,
                },);
            }

            sleep(delay,).await;
            retries += 1;
        }
    }
}
