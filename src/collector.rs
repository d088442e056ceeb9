// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Organization-wide collection of contributor statistics.
///
/// Lists every repository of an organization, fetches the statistics of each
/// one on a bounded set of concurrent tasks and merges the results into a
/// [`StatsStore`]. The first unrecoverable failure aborts the whole run: the
/// remaining tasks are cancelled and no snapshot is produced.
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::{sync::Semaphore, task::JoinSet};
use tracing::{error, info};

use crate::{
    config::CollectorConfig,
    error::Error,
    fetcher::RepositoryStatsFetcher,
    source::{RepositoryRef, StatsSource},
    store::{StatsSnapshot, StatsStore},
};

/// Drives a full collection run against a [`StatsSource`].
#[derive(Debug,)]
pub struct OrganizationCollector<S,>
{
    source:  Arc<S,>,
    fetcher: RepositoryStatsFetcher<S,>,
    config:  CollectorConfig,
}

impl<S: StatsSource + 'static,> OrganizationCollector<S,>
{
    pub fn new(source: Arc<S,>, config: CollectorConfig,) -> Self
    {
        let fetcher = RepositoryStatsFetcher::new(Arc::clone(&source,), config.retry.clone(),);
        Self {
            source,
            fetcher,
            config,
        }
    }

    /// Collects statistics for every repository of `organization`, measuring
    /// windows against the current instant.
    ///
    /// # Errors
    ///
    /// Returns the first listing or repository failure; see
    /// [`run_as_of`](Self::run_as_of).
    pub async fn run(&self, organization: &str,) -> Result<StatsSnapshot, Error,>
    {
        self.run_as_of(organization, Utc::now(),).await
    }

    /// Collects statistics for every repository of `organization`, measuring
    /// windows against `as_of`.
    ///
    /// # Errors
    ///
    /// * [`Error::Validation`] when the collector settings are out of range.
    /// * [`Error::Listing`] when a listing page cannot be fetched.
    /// * Any error returned by [`RepositoryStatsFetcher::fetch`]. The first
    ///   such error cancels every other in-flight repository.
    pub async fn run_as_of(
        &self,
        organization: &str,
        as_of: DateTime<Utc,>,
    ) -> Result<StatsSnapshot, Error,>
    {
        self.config.validate()?;
        let repositories = self.list_repositories(organization,).await?;

        let store = Arc::new(StatsStore::new(as_of,),);
        store.set_total_repositories(repositories.len() as u64,);
        info!("Collecting stats for {} repositories of {}", repositories.len(), organization);

        let permits = Arc::new(Semaphore::new(self.config.max_workers,),);
        let mut tasks = JoinSet::new();

        for repository in repositories {
            let permits = Arc::clone(&permits,);
            let fetcher = self.fetcher.clone();
            let store = Arc::clone(&store,);
            tasks.spawn(async move {
                let _permit = permits
                    .acquire_owned()
                    .await
                    .map_err(|e| Error::service(format!("worker pool closed: {e}"),),)?;
                collect_repository(&fetcher, &store, &repository,).await
            },);
        }

        while let Some(joined,) = tasks.join_next().await {
            let outcome = joined.map_err(|e| Error::service(format!("repository task failed: {e}"),),);
            if let Err(failure,) = outcome.and_then(|result| result,) {
                error!("Aborting collection for {}: {}", organization, failure);
                tasks.abort_all();
                return Err(failure,);
            }
        }

        Ok(store.snapshot(),)
    }

    /// Pages through the repository listing of `organization`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Listing`] (or the source's transport error) for the
    /// first page that cannot be fetched.
    pub async fn list_repositories(&self, organization: &str,) -> Result<Vec<RepositoryRef,>, Error,>
    {
        let mut repositories = Vec::new();
        let mut next_page = 1u32;

        loop {
            info!("Getting page {} of organization: {}", next_page, organization);
            let page = self
                .source
                .list_repositories(organization, next_page, self.config.per_page,)
                .await?;
            repositories.extend(page.repositories,);

            match page.next_page {
                Some(following,) if following > next_page => next_page = following,
                Some(following,) if following > 0 => {
                    return Err(Error::Listing {
                        organization: organization.to_owned(),
                        page: following,
                        message: format!("listing did not advance past page {next_page}"),
                    },);
                }
                _ => break,
            }
        }

        Ok(repositories,)
    }
}

async fn collect_repository<S: StatsSource,>(
    fetcher: &RepositoryStatsFetcher<S,>,
    store: &StatsStore,
    repository: &RepositoryRef,
) -> Result<(), Error,>
{
    let contributors = fetcher.fetch(repository,).await?;
    for contributor in &contributors {
        store.merge_contributor(contributor,);
    }

    let progress = store.record_completion();
    info!(
        "Got stats for repository: {} ({}/{}) ({:.2}%)",
        repository,
        progress.completed,
        progress.total,
        progress.percentage()
    );
    Ok((),)
}
